//! Line-item disputes and their effect on the payable balance.
//!
//! While a dispute is open its amount is excluded from `balance_due`; on
//! resolution the waived portion is permanently removed from the effective
//! total and the rest returns to balance. [`service`] holds the pure cap and
//! resolution-split rules; [`adjuster`] orchestrates filing and resolution
//! over a storage transaction.

pub mod adjuster;
pub mod error;
pub mod service;
pub mod types;

pub use adjuster::DisputeAdjuster;
pub use error::DisputeError;
pub use service::DisputeService;
pub use types::{Dispute, DisputeOutcome, DisputeStatus};
