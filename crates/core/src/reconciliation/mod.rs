//! Read-only reconciliation reporting and integrity sweeps.

pub mod integrity;
pub mod service;
pub mod types;

pub use integrity::{IntegrityChecker, IntegrityViolation};
pub use service::ReconciliationService;
pub use types::{
    AgingBucket, AgingLine, AgingSummary, ClientSummary, ReconciliationReport, ReportTotals,
    UnpostedPayment,
};
