//! Invoice lifecycle, line items, and balance recalculation.
//!
//! This module implements the invoice side of the ledger:
//! - Invoice and line-item domain types
//! - Lifecycle transitions (draft, finalized, sent, cancelled)
//! - Pure balance/status derivation
//! - The recalculator that re-derives persisted invoice fields from
//!   committed allocations and disputes

pub mod balance;
pub mod error;
pub mod lifecycle;
pub mod recalc;
pub mod types;

#[cfg(test)]
mod balance_props;

pub use balance::{derive, BalanceDerivation, BalanceInputs};
pub use error::InvoiceError;
pub use recalc::recalculate;
pub use types::{Invoice, InvoiceLineItem, InvoiceStatus};
