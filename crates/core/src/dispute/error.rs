//! Dispute error types.

use remita_shared::types::{DisputeId, InvoiceId, LineItemId};
use rust_decimal::Decimal;
use thiserror::Error;

use super::types::DisputeStatus;
use crate::invoice::InvoiceStatus;
use crate::store::CommitError;

/// Errors that can occur during dispute operations.
#[derive(Debug, Error)]
pub enum DisputeError {
    /// Dispute not found.
    #[error("Dispute not found: {0}")]
    NotFound(DisputeId),

    /// Line item not found on any invoice.
    #[error("Line item not found: {0}")]
    LineItemNotFound(LineItemId),

    /// Line item has been deleted.
    #[error("Line item {0} is deleted and cannot be disputed")]
    LineItemDeleted(LineItemId),

    /// Parent invoice is not in a billed state.
    #[error("Invoice {invoice_id} cannot be disputed in status {status}")]
    InvoiceNotDisputable {
        /// The parent invoice.
        invoice_id: InvoiceId,
        /// Its current status.
        status: InvoiceStatus,
    },

    /// Disputed amount cannot be zero.
    #[error("Disputed amount cannot be zero")]
    ZeroAmount,

    /// Disputed amount cannot be negative.
    #[error("Disputed amount cannot be negative")]
    NegativeAmount,

    /// Disputed amount has sub-cent precision.
    #[error("Disputed amount {0} is not at money scale (2 decimal places)")]
    InvalidScale(Decimal),

    /// Disputed amount exceeds the line item's undisputed, unpaid portion.
    #[error("Disputed amount {requested} exceeds disputable portion {disputable}")]
    ExceedsDisputable {
        /// Requested dispute amount.
        requested: Decimal,
        /// What the line item can still have disputed.
        disputable: Decimal,
    },

    /// Only open disputes can be resolved.
    #[error("Dispute {dispute_id} is not open (status: {status:?})")]
    NotOpen {
        /// The dispute.
        dispute_id: DisputeId,
        /// Its current status.
        status: DisputeStatus,
    },

    /// Resolution amount exceeds the disputed amount.
    #[error("Resolution amount {resolution} exceeds disputed amount {disputed}")]
    ResolutionExceedsDispute {
        /// Requested waived portion.
        resolution: Decimal,
        /// Amount under dispute.
        disputed: Decimal,
    },

    /// Concurrent modification detected.
    #[error("Concurrent modification detected, please retry")]
    ConcurrentModification,

    /// Internal error.
    #[error("Internal error: {0}")]
    Internal(String),
}

impl DisputeError {
    /// Returns the error code for API responses.
    #[must_use]
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::NotFound(_) => "DISPUTE_NOT_FOUND",
            Self::LineItemNotFound(_) => "LINE_ITEM_NOT_FOUND",
            Self::LineItemDeleted(_) => "INVALID_TARGET",
            Self::InvoiceNotDisputable { .. } => "INVALID_TARGET",
            Self::ZeroAmount => "ZERO_AMOUNT",
            Self::NegativeAmount => "NEGATIVE_AMOUNT",
            Self::InvalidScale(_) => "INVALID_SCALE",
            Self::ExceedsDisputable { .. } => "EXCEEDS_DISPUTABLE",
            Self::NotOpen { .. } => "DISPUTE_NOT_OPEN",
            Self::ResolutionExceedsDispute { .. } => "RESOLUTION_EXCEEDS_DISPUTE",
            Self::ConcurrentModification => "CONCURRENT_MODIFICATION",
            Self::Internal(_) => "INTERNAL_ERROR",
        }
    }

    /// Returns the HTTP status code for this error.
    #[must_use]
    pub fn http_status_code(&self) -> u16 {
        match self {
            Self::NotFound(_) | Self::LineItemNotFound(_) => 404,
            Self::ExceedsDisputable { .. }
            | Self::NotOpen { .. }
            | Self::ResolutionExceedsDispute { .. } => 422,
            Self::ConcurrentModification => 409,
            Self::Internal(_) => 500,
            _ => 400,
        }
    }

    /// Returns true if the operation can be retried after re-reading state.
    #[must_use]
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::ConcurrentModification)
    }
}

impl From<CommitError> for DisputeError {
    fn from(err: CommitError) -> Self {
        match err {
            CommitError::Conflict { .. } => Self::ConcurrentModification,
            CommitError::Storage(msg) => Self::Internal(msg),
        }
    }
}
