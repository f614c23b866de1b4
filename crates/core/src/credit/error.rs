//! Credit error types.

use remita_shared::types::{CreditId, InvoiceId};
use rust_decimal::Decimal;
use thiserror::Error;

use crate::allocation::AllocationError;
use crate::store::CommitError;

/// Errors that can occur during credit operations.
#[derive(Debug, Error)]
pub enum CreditError {
    /// Credit not found.
    #[error("Credit not found: {0}")]
    NotFound(CreditId),

    /// Credit has expired and can never be applied.
    #[error("Credit {credit_id} expired on {expired_on}")]
    Expired {
        /// The expired credit.
        credit_id: CreditId,
        /// Its expiry date.
        expired_on: chrono::NaiveDate,
    },

    /// Credit has no remaining funds.
    #[error("Credit {0} has no remaining funds")]
    Exhausted(CreditId),

    /// Credit amount cannot be zero.
    #[error("Credit amount cannot be zero")]
    ZeroAmount,

    /// Credit amount cannot be negative.
    #[error("Credit amount cannot be negative")]
    NegativeAmount,

    /// Credit amount has sub-cent precision.
    #[error("Credit amount {0} is not at money scale (2 decimal places)")]
    InvalidScale(Decimal),

    /// Credit amount exceeds the payment's unallocated remainder.
    #[error("Credit amount {requested} exceeds unallocated remainder {remainder}")]
    ExceedsRemainder {
        /// Requested credit amount.
        requested: Decimal,
        /// Unallocated remainder on the source payment.
        remainder: Decimal,
    },

    /// Target invoice belongs to a different client than the credit.
    #[error("Invoice {0} belongs to a different client than the credit")]
    ClientMismatch(InvoiceId),

    /// Target validation failed; credit application is a pseudo-payment and
    /// shares the allocation rules.
    #[error(transparent)]
    Allocation(#[from] AllocationError),
}

impl CreditError {
    /// Returns the error code for API responses.
    #[must_use]
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::NotFound(_) => "CREDIT_NOT_FOUND",
            Self::Expired { .. } => "CREDIT_EXPIRED",
            Self::Exhausted(_) => "CREDIT_EXHAUSTED",
            Self::ZeroAmount => "ZERO_AMOUNT",
            Self::NegativeAmount => "NEGATIVE_AMOUNT",
            Self::InvalidScale(_) => "INVALID_SCALE",
            Self::ExceedsRemainder { .. } => "EXCEEDS_REMAINDER",
            Self::ClientMismatch(_) => "INVALID_TARGET",
            Self::Allocation(err) => err.error_code(),
        }
    }

    /// Returns the HTTP status code for this error.
    #[must_use]
    pub fn http_status_code(&self) -> u16 {
        match self {
            Self::NotFound(_) => 404,
            Self::Expired { .. } | Self::Exhausted(_) | Self::ExceedsRemainder { .. } => 422,
            Self::ZeroAmount | Self::NegativeAmount | Self::InvalidScale(_) => 400,
            Self::ClientMismatch(_) => 400,
            Self::Allocation(err) => err.http_status_code(),
        }
    }

    /// Returns true if the operation can be retried after re-reading state.
    #[must_use]
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Allocation(err) if err.is_retryable())
    }
}

impl From<CommitError> for CreditError {
    fn from(err: CommitError) -> Self {
        Self::Allocation(err.into())
    }
}
