//! Invoice domain types.

use chrono::NaiveDate;
use remita_shared::types::money::line_total;
use remita_shared::types::{ClientId, InvoiceId, LineItemId, OrganizationId};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Invoice status.
///
/// `Draft` and `Finalized` are lifecycle states set explicitly; the
/// remaining non-`Cancelled` states are derived by the recalculator from
/// allocations and disputes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InvoiceStatus {
    /// Being drafted; line items are mutable.
    Draft,
    /// Line items and prices locked; not yet issued to the client.
    Finalized,
    /// Issued to the client and awaiting payment.
    Sent,
    /// Partially paid.
    Partial,
    /// Fully paid.
    Paid,
    /// Past due date with a balance outstanding.
    Overdue,
    /// At least one line item has an open dispute.
    Disputed,
    /// Cancelled; nothing payable.
    Cancelled,
}

impl InvoiceStatus {
    /// Returns true if line items can still be modified.
    #[must_use]
    pub fn is_editable(&self) -> bool {
        matches!(self, Self::Draft)
    }

    /// Returns true if payments may be allocated against the invoice.
    #[must_use]
    pub fn is_allocatable(&self) -> bool {
        matches!(self, Self::Sent | Self::Partial | Self::Overdue)
    }

    /// Returns true if the status is set by lifecycle operations rather
    /// than derived by the recalculator.
    #[must_use]
    pub fn is_lifecycle(&self) -> bool {
        matches!(self, Self::Draft | Self::Finalized | Self::Cancelled)
    }
}

impl std::fmt::Display for InvoiceStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::Draft => "draft",
            Self::Finalized => "finalized",
            Self::Sent => "sent",
            Self::Partial => "partial",
            Self::Paid => "paid",
            Self::Overdue => "overdue",
            Self::Disputed => "disputed",
            Self::Cancelled => "cancelled",
        };
        write!(f, "{s}")
    }
}

/// A single billed line on an invoice.
///
/// `allocated_amount` and `disputed_amount` are derived fields maintained by
/// the recalculator. Soft-deleted items are retained for audit but excluded
/// from totals and external views.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InvoiceLineItem {
    /// Line item id.
    pub id: LineItemId,
    /// Human-readable description (e.g. test panel name).
    pub description: String,
    /// Billed quantity.
    pub quantity: Decimal,
    /// Price per unit.
    pub unit_price: Decimal,
    /// `quantity x unit_price`, rounded to the money scale.
    pub line_total: Decimal,
    /// Derived: sum of allocations targeting this line item.
    pub allocated_amount: Decimal,
    /// Derived: sum of open disputed amounts on this line item.
    pub disputed_amount: Decimal,
    /// Soft delete flag; deleted items stay on the row for audit.
    pub is_deleted: bool,
}

impl InvoiceLineItem {
    /// Creates a new line item with derived fields zeroed.
    #[must_use]
    pub fn new(description: impl Into<String>, quantity: Decimal, unit_price: Decimal) -> Self {
        Self {
            id: LineItemId::new(),
            description: description.into(),
            quantity,
            unit_price,
            line_total: line_total(quantity, unit_price),
            allocated_amount: Decimal::ZERO,
            disputed_amount: Decimal::ZERO,
            is_deleted: false,
        }
    }
}

/// An invoice issued by an organization to a client.
///
/// `total_amount`, `paid_amount`, and `balance_due` are derived fields
/// maintained by the recalculator; they are stored so read paths never need
/// to re-aggregate allocation rows.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Invoice {
    /// Invoice id.
    pub id: InvoiceId,
    /// Owning organization.
    pub organization_id: OrganizationId,
    /// Billed client.
    pub client_id: ClientId,
    /// Ordered line items, including soft-deleted ones.
    pub line_items: Vec<InvoiceLineItem>,
    /// Derived: sum of active line totals.
    pub total_amount: Decimal,
    /// Derived: sum of allocations against this invoice.
    pub paid_amount: Decimal,
    /// Derived: `max(0, total - paid - open disputes - waived)`.
    pub balance_due: Decimal,
    /// Current status.
    pub status: InvoiceStatus,
    /// Date the invoice was issued (set on send).
    pub issue_date: Option<NaiveDate>,
    /// Date payment is due (set on send).
    pub due_date: Option<NaiveDate>,
    /// Optimistic concurrency version.
    pub version: i64,
}

impl Invoice {
    /// Creates a new draft invoice with no line items.
    #[must_use]
    pub fn new_draft(organization_id: OrganizationId, client_id: ClientId) -> Self {
        Self {
            id: InvoiceId::new(),
            organization_id,
            client_id,
            line_items: Vec::new(),
            total_amount: Decimal::ZERO,
            paid_amount: Decimal::ZERO,
            balance_due: Decimal::ZERO,
            status: InvoiceStatus::Draft,
            issue_date: None,
            due_date: None,
            version: 1,
        }
    }

    /// Active (non-deleted) line items in order.
    pub fn active_line_items(&self) -> impl Iterator<Item = &InvoiceLineItem> {
        self.line_items.iter().filter(|li| !li.is_deleted)
    }

    /// Finds a line item by id, including soft-deleted ones.
    #[must_use]
    pub fn line_item(&self, id: LineItemId) -> Option<&InvoiceLineItem> {
        self.line_items.iter().find(|li| li.id == id)
    }

    /// Sum of active line totals.
    #[must_use]
    pub fn compute_total(&self) -> Decimal {
        self.active_line_items().map(|li| li.line_total).sum()
    }
}
