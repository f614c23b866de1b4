//! In-memory ledger store.
//!
//! `MemoryStore` backs the engines in tests, demos, and the reconciler job.
//! It implements the core storage traits with snapshot transactions and
//! version-checked optimistic commits, so concurrency behavior matches what
//! a database-backed store must provide.

pub mod memory;

pub use memory::{MemoryStore, MemoryTx};
