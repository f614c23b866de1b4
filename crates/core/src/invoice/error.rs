//! Invoice error types.

use chrono::NaiveDate;
use remita_shared::types::{InvoiceId, LineItemId};
use thiserror::Error;

use super::types::InvoiceStatus;

/// Invoice-related errors.
#[derive(Debug, Error)]
pub enum InvoiceError {
    /// Invoice not found.
    #[error("Invoice not found: {0}")]
    NotFound(InvoiceId),

    /// Line item not found.
    #[error("Line item not found: {0}")]
    LineItemNotFound(LineItemId),

    /// Line items can only be modified while the invoice is a draft.
    #[error("Line items are locked on a {0} invoice")]
    LineItemsLocked(InvoiceStatus),

    /// Cannot finalize an invoice with no active line items.
    #[error("Cannot finalize an invoice with no active line items")]
    EmptyInvoice,

    /// Cannot finalize an invoice with a zero total.
    #[error("Cannot finalize an invoice with a zero total")]
    ZeroTotal,

    /// Quantity and unit price must be positive.
    #[error("Line item quantity and unit price must be positive")]
    NonPositiveLine,

    /// Invalid lifecycle transition.
    #[error("Cannot transition invoice from {from} to {to}")]
    InvalidTransition {
        /// Current status.
        from: InvoiceStatus,
        /// Requested status.
        to: InvoiceStatus,
    },

    /// Due date precedes issue date.
    #[error("Due date {due} precedes issue date {issue}")]
    DueBeforeIssue {
        /// Issue date.
        issue: NaiveDate,
        /// Due date.
        due: NaiveDate,
    },

    /// Cannot cancel an invoice that has received allocations.
    #[error("Cannot cancel invoice {0}: allocations exist against it")]
    CancelWithAllocations(InvoiceId),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = InvoiceError::LineItemsLocked(InvoiceStatus::Sent);
        assert_eq!(err.to_string(), "Line items are locked on a sent invoice");

        let err = InvoiceError::InvalidTransition {
            from: InvoiceStatus::Draft,
            to: InvoiceStatus::Sent,
        };
        assert_eq!(err.to_string(), "Cannot transition invoice from draft to sent");
    }
}
