//! Payment allocation: splitting received money across invoices and
//! line items.
//!
//! The pure validation rules live in [`service`]; [`engine`] orchestrates a
//! full allocation batch over a storage transaction (stage rows, recalculate
//! affected invoices, post or close out the payment).

pub mod engine;
pub mod error;
pub mod service;
pub mod types;

#[cfg(test)]
mod service_props;

pub use engine::AllocationEngine;
pub use error::AllocationError;
pub use service::AllocationService;
pub use types::{
    Allocation, AllocationOutcome, AllocationSource, AllocationTarget, CloseOut,
    ResolvedAllocation, SourceFunds,
};
