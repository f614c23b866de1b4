//! Allocation error types.
//!
//! Every variant names the violated constraint and, where relevant, the
//! amounts involved, so callers can render an actionable message without
//! re-reading ledger state.

use remita_shared::types::{InvoiceId, LineItemId, PaymentId};
use rust_decimal::Decimal;
use thiserror::Error;

use crate::invoice::InvoiceStatus;
use crate::store::CommitError;

/// Errors that can occur during payment allocation.
#[derive(Debug, Error)]
pub enum AllocationError {
    // ========== Payment Errors ==========
    /// Payment not found.
    #[error("Payment not found: {0}")]
    PaymentNotFound(PaymentId),

    /// Payment has been voided and cannot fund allocations.
    #[error("Payment {0} is voided")]
    PaymentVoided(PaymentId),

    /// Payment is already posted; its funds are fully resolved.
    #[error("Payment {0} is already posted")]
    PaymentAlreadyPosted(PaymentId),

    /// A payment with committed allocations cannot be voided.
    #[error("Payment {0} has committed allocations and cannot be voided")]
    VoidWithAllocations(PaymentId),

    // ========== Batch Validation Errors ==========
    /// Allocation batch must contain at least one target.
    #[error("Allocation batch must contain at least one target")]
    EmptyBatch,

    /// Allocation amount cannot be zero.
    #[error("Allocation amount cannot be zero")]
    ZeroAmount,

    /// Allocation amount cannot be negative.
    #[error("Allocation amount cannot be negative")]
    NegativeAmount,

    /// Allocation amount has sub-cent precision.
    #[error("Allocation amount {0} is not at money scale (2 decimal places)")]
    InvalidScale(Decimal),

    // ========== Target Errors ==========
    /// Target invoice not found.
    #[error("Invoice not found: {0}")]
    InvoiceNotFound(InvoiceId),

    /// Target invoice is not in an allocatable status.
    #[error("Invoice {invoice_id} cannot accept allocations in status {status}")]
    InvoiceNotAllocatable {
        /// The target invoice.
        invoice_id: InvoiceId,
        /// Its current status.
        status: InvoiceStatus,
    },

    /// Target invoice belongs to a different organization than the source.
    #[error("Invoice {0} belongs to a different organization")]
    OrganizationMismatch(InvoiceId),

    /// Target invoice belongs to a different client than the source.
    #[error("Invoice {0} belongs to a different client")]
    ClientMismatch(InvoiceId),

    /// Named line item does not exist on the target invoice.
    #[error("Line item {line_item_id} not found on invoice {invoice_id}")]
    LineItemNotFound {
        /// The target invoice.
        invoice_id: InvoiceId,
        /// The missing line item.
        line_item_id: LineItemId,
    },

    /// Named line item has been deleted.
    #[error("Line item {0} is deleted and cannot accept allocations")]
    LineItemDeleted(LineItemId),

    // ========== Arithmetic Guards ==========
    /// Re-submission of an already committed allocation batch.
    #[error("This allocation batch was already committed")]
    AlreadyAllocated,

    /// A target would be paid beyond its remaining balance.
    #[error(
        "Allocation of {requested} exceeds remaining balance {remaining} on invoice {invoice_id}"
    )]
    OverAllocation {
        /// The target invoice.
        invoice_id: InvoiceId,
        /// The target line item, if the target was line-scoped.
        line_item_id: Option<LineItemId>,
        /// Requested amount, including earlier targets in the same batch.
        requested: Decimal,
        /// Remaining balance before this batch.
        remaining: Decimal,
    },

    /// The batch total exceeds the source's unallocated funds.
    #[error("Batch total {requested} exceeds unallocated funds {available}")]
    PaymentExceeded {
        /// Sum of all target amounts.
        requested: Decimal,
        /// Funds still available on the source.
        available: Decimal,
    },

    // ========== Concurrency / Storage ==========
    /// Concurrent modification detected.
    #[error("Concurrent modification detected, please retry")]
    ConcurrentModification,

    /// Storage error.
    #[error("Storage error: {0}")]
    Storage(String),

    /// Internal error.
    #[error("Internal error: {0}")]
    Internal(String),
}

impl AllocationError {
    /// Returns the error code for API responses.
    #[must_use]
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::PaymentNotFound(_) => "PAYMENT_NOT_FOUND",
            Self::PaymentVoided(_) => "PAYMENT_VOIDED",
            Self::PaymentAlreadyPosted(_) => "PAYMENT_ALREADY_POSTED",
            Self::VoidWithAllocations(_) => "VOID_WITH_ALLOCATIONS",
            Self::EmptyBatch => "EMPTY_BATCH",
            Self::ZeroAmount => "ZERO_AMOUNT",
            Self::NegativeAmount => "NEGATIVE_AMOUNT",
            Self::InvalidScale(_) => "INVALID_SCALE",
            Self::InvoiceNotFound(_) => "INVOICE_NOT_FOUND",
            Self::InvoiceNotAllocatable { .. } => "INVALID_TARGET",
            Self::OrganizationMismatch(_) => "INVALID_TARGET",
            Self::ClientMismatch(_) => "INVALID_TARGET",
            Self::LineItemNotFound { .. } => "LINE_ITEM_NOT_FOUND",
            Self::LineItemDeleted(_) => "INVALID_TARGET",
            Self::AlreadyAllocated => "ALREADY_ALLOCATED",
            Self::OverAllocation { .. } => "OVER_ALLOCATION",
            Self::PaymentExceeded { .. } => "PAYMENT_EXCEEDED",
            Self::ConcurrentModification => "CONCURRENT_MODIFICATION",
            Self::Storage(_) => "STORAGE_ERROR",
            Self::Internal(_) => "INTERNAL_ERROR",
        }
    }

    /// Returns the HTTP status code for this error.
    #[must_use]
    pub fn http_status_code(&self) -> u16 {
        match self {
            // 404 Not Found
            Self::PaymentNotFound(_)
            | Self::InvoiceNotFound(_)
            | Self::LineItemNotFound { .. } => 404,

            // 422 Unprocessable - valid request shape, rejected by ledger rules
            Self::AlreadyAllocated
            | Self::OverAllocation { .. }
            | Self::PaymentExceeded { .. } => 422,

            // 409 Conflict - retryable
            Self::ConcurrentModification => 409,

            // 500 Internal Server Error
            Self::Storage(_) | Self::Internal(_) => 500,

            // 400 Bad Request - everything else is a caller mistake
            _ => 400,
        }
    }

    /// Returns true if the operation can be retried after re-reading state.
    #[must_use]
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::ConcurrentModification)
    }
}

impl From<CommitError> for AllocationError {
    fn from(err: CommitError) -> Self {
        match err {
            CommitError::Conflict { .. } => Self::ConcurrentModification,
            CommitError::Storage(msg) => Self::Storage(msg),
        }
    }
}
