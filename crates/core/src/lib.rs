//! Core business logic for Remita.
//!
//! This crate contains pure business logic with ZERO web or database dependencies.
//! All domain types, validation rules, and calculations live here.
//!
//! # Modules
//!
//! - `invoice` - Invoice lifecycle, line items, and balance recalculation
//! - `payment` - Received payments and posting state
//! - `allocation` - Splitting payments across invoices and line items
//! - `credit` - Overpayment credits and oldest-first application
//! - `dispute` - Line-item disputes and their effect on payable balance
//! - `reconciliation` - Read-only reporting and integrity sweeps
//! - `store` - Abstract storage boundary the engines are written against

pub mod allocation;
pub mod credit;
pub mod dispute;
pub mod invoice;
pub mod payment;
pub mod reconciliation;
pub mod store;
