//! Dispute types.

use chrono::{DateTime, Utc};
use remita_shared::types::{DisputeId, InvoiceId, LineItemId};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Dispute status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DisputeStatus {
    /// Filed and unresolved; the disputed amount is out of the payable
    /// balance.
    Open,
    /// Closed with some or all of the amount permanently waived.
    Resolved,
    /// Closed with the full amount returned to the payable balance.
    Rejected,
}

/// Outcome requested when resolving an open dispute.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DisputeOutcome {
    /// Waive the disputed amount (or an explicit smaller portion).
    Approved,
    /// Return the full disputed amount to the payable balance.
    Rejected,
}

/// A client objection against one billed line item.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Dispute {
    /// Dispute id.
    pub id: DisputeId,
    /// Parent invoice of the disputed line item.
    pub invoice_id: InvoiceId,
    /// The disputed line item.
    pub line_item_id: LineItemId,
    /// Amount under dispute.
    pub disputed_amount: Decimal,
    /// Portion permanently waived on resolution; zero while open or
    /// rejected.
    pub waived_amount: Decimal,
    /// Current status.
    pub status: DisputeStatus,
    /// Client-stated reason.
    pub reason: String,
    /// When the dispute was filed.
    pub filed_at: DateTime<Utc>,
    /// When the dispute was resolved or rejected.
    pub resolved_at: Option<DateTime<Utc>>,
    /// Optimistic concurrency version.
    pub version: i64,
}

impl Dispute {
    /// Files a new open dispute.
    #[must_use]
    pub fn file(
        invoice_id: InvoiceId,
        line_item_id: LineItemId,
        disputed_amount: Decimal,
        reason: impl Into<String>,
        filed_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id: DisputeId::new(),
            invoice_id,
            line_item_id,
            disputed_amount,
            waived_amount: Decimal::ZERO,
            status: DisputeStatus::Open,
            reason: reason.into(),
            filed_at,
            resolved_at: None,
            version: 1,
        }
    }
}
