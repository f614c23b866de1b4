//! Credit types.

use chrono::{DateTime, NaiveDate, Utc};
use remita_shared::types::{ClientId, CreditId, OrganizationId, PaymentId};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Credit status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CreditStatus {
    /// Has remaining funds and can be applied.
    Available,
    /// Fully consumed by applications.
    Applied,
    /// Expired with funds remaining; can never be applied.
    Expired,
}

/// A client credit, typically created from an overpayment remainder.
///
/// `remaining_amount` only ever decreases; a credit at zero is `Applied`.
/// Credits are never deleted, expired ones are retained for audit.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Credit {
    /// Credit id.
    pub id: CreditId,
    /// Owning organization.
    pub organization_id: OrganizationId,
    /// Client the credit belongs to.
    pub client_id: ClientId,
    /// Original credit amount.
    pub amount: Decimal,
    /// Unapplied remainder.
    pub remaining_amount: Decimal,
    /// Current status.
    pub status: CreditStatus,
    /// Payment whose remainder funded this credit, if any.
    pub source_payment_id: Option<PaymentId>,
    /// Last day the credit can be applied, if it expires at all.
    pub expires_at: Option<NaiveDate>,
    /// When the credit was created.
    pub created_at: DateTime<Utc>,
    /// Optimistic concurrency version.
    pub version: i64,
}

impl Credit {
    /// Creates a new available credit.
    #[must_use]
    pub fn new(
        organization_id: OrganizationId,
        client_id: ClientId,
        amount: Decimal,
        source_payment_id: Option<PaymentId>,
        expires_at: Option<NaiveDate>,
        created_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id: CreditId::new(),
            organization_id,
            client_id,
            amount,
            remaining_amount: amount,
            status: CreditStatus::Available,
            source_payment_id,
            expires_at,
            created_at,
            version: 1,
        }
    }

    /// Returns true if the credit's expiry date has passed.
    ///
    /// A credit is still applicable on its `expires_at` day itself.
    #[must_use]
    pub fn is_expired(&self, as_of: NaiveDate) -> bool {
        matches!(self.expires_at, Some(expires) if expires < as_of)
    }
}
