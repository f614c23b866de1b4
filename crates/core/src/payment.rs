//! Received payments and posting state.

use chrono::{DateTime, Utc};
use remita_shared::types::{ClientId, OrganizationId, PaymentId};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Payment status.
///
/// A payment is posted only once it is fully allocated, or its remainder has
/// been explicitly converted to a credit at close-out. Posted and voided
/// payments no longer appear in the actionable payment queue.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PaymentStatus {
    /// Received but not yet fully resolved.
    Unposted,
    /// Fully allocated and/or credited.
    Posted,
    /// Voided before any allocation.
    Voided,
}

impl PaymentStatus {
    /// Returns true if the payment can still fund allocations.
    #[must_use]
    pub fn is_allocatable(&self) -> bool {
        matches!(self, Self::Unposted)
    }
}

/// How the payment was received.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PaymentMethod {
    /// ACH transfer.
    Ach,
    /// Card payment.
    Card,
    /// Paper check.
    Check,
    /// Wire transfer.
    Wire,
    /// Cash.
    Cash,
    /// Anything else (adjustments, legacy imports).
    Other,
}

/// A payment received from a client.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Payment {
    /// Payment id.
    pub id: PaymentId,
    /// Owning organization.
    pub organization_id: OrganizationId,
    /// Paying client.
    pub client_id: ClientId,
    /// Received amount; fixed once recorded.
    pub amount: Decimal,
    /// How the payment was received.
    pub method: PaymentMethod,
    /// Processor or bank reference, if any.
    pub reference_number: Option<String>,
    /// Posting state.
    pub status: PaymentStatus,
    /// When the payment was received.
    pub received_at: DateTime<Utc>,
    /// Optimistic concurrency version.
    pub version: i64,
}

impl Payment {
    /// Records a newly received, unposted payment.
    #[must_use]
    pub fn new(
        organization_id: OrganizationId,
        client_id: ClientId,
        amount: Decimal,
        method: PaymentMethod,
        reference_number: Option<String>,
        received_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id: PaymentId::new(),
            organization_id,
            client_id,
            amount,
            method,
            reference_number,
            status: PaymentStatus::Unposted,
            received_at,
            version: 1,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_new_payment_is_unposted() {
        let p = Payment::new(
            OrganizationId::new(),
            ClientId::new(),
            dec!(150.00),
            PaymentMethod::Check,
            Some("CHK-1042".to_string()),
            Utc::now(),
        );
        assert_eq!(p.status, PaymentStatus::Unposted);
        assert_eq!(p.amount, dec!(150.00));
        assert_eq!(p.version, 1);
    }

    #[test]
    fn test_status_allocatable() {
        assert!(PaymentStatus::Unposted.is_allocatable());
        assert!(!PaymentStatus::Posted.is_allocatable());
        assert!(!PaymentStatus::Voided.is_allocatable());
    }
}
