//! Client credits: overpayment remainders and their application.
//!
//! A credit is a pseudo-payment: applying it reuses the allocation
//! validation rules against the credit's `remaining_amount`. [`service`]
//! holds the pure auto-application planner; [`manager`] orchestrates
//! creation, application, and expiry over a storage transaction.

pub mod error;
pub mod manager;
pub mod service;
pub mod types;

#[cfg(test)]
mod service_props;

pub use error::CreditError;
pub use manager::{CreditApplication, CreditManager};
pub use service::CreditService;
pub use types::{Credit, CreditStatus};
