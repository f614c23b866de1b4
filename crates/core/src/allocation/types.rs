//! Allocation types: committed rows, batch inputs, and engine outputs.

use chrono::{DateTime, NaiveDate, Utc};
use remita_shared::types::{
    AllocationId, ClientId, CreditId, InvoiceId, LineItemId, OrganizationId, PaymentId,
};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::credit::Credit;
use crate::invoice::Invoice;
use crate::payment::Payment;

/// The funding side of an allocation row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AllocationSource {
    /// Funded by a received payment.
    Payment(PaymentId),
    /// Funded by a client credit (overpayment or waived dispute).
    Credit(CreditId),
}

impl AllocationSource {
    /// Returns the funding payment id, if payment-funded.
    #[must_use]
    pub fn payment_id(&self) -> Option<PaymentId> {
        match self {
            Self::Payment(id) => Some(*id),
            Self::Credit(_) => None,
        }
    }

    /// Returns the funding credit id, if credit-funded.
    #[must_use]
    pub fn credit_id(&self) -> Option<CreditId> {
        match self {
            Self::Payment(_) => None,
            Self::Credit(id) => Some(*id),
        }
    }
}

/// A committed, append-only allocation of money to an invoice.
///
/// Allocation rows are the ledger's source of truth for `paid_amount`; they
/// are never updated or deleted, only inserted. Reversals are out of scope
/// for the core.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Allocation {
    /// Allocation id.
    pub id: AllocationId,
    /// Where the money came from.
    pub source: AllocationSource,
    /// Invoice the money was applied to.
    pub invoice_id: InvoiceId,
    /// Specific line item, or `None` for an invoice-level application.
    pub line_item_id: Option<LineItemId>,
    /// Applied amount, always positive and at money scale.
    pub amount: Decimal,
    /// When the allocation was committed.
    pub allocated_at: DateTime<Utc>,
}

impl Allocation {
    /// Builds a payment-funded allocation row.
    #[must_use]
    pub fn from_payment(
        payment_id: PaymentId,
        invoice_id: InvoiceId,
        line_item_id: Option<LineItemId>,
        amount: Decimal,
        allocated_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id: AllocationId::new(),
            source: AllocationSource::Payment(payment_id),
            invoice_id,
            line_item_id,
            amount,
            allocated_at,
        }
    }

    /// Builds a credit-funded allocation row.
    #[must_use]
    pub fn from_credit(
        credit_id: CreditId,
        invoice_id: InvoiceId,
        line_item_id: Option<LineItemId>,
        amount: Decimal,
        allocated_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id: AllocationId::new(),
            source: AllocationSource::Credit(credit_id),
            invoice_id,
            line_item_id,
            amount,
            allocated_at,
        }
    }
}

/// One requested application within an allocation batch.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AllocationTarget {
    /// Invoice to apply money to.
    pub invoice_id: InvoiceId,
    /// Specific line item, or `None` to apply at invoice level.
    pub line_item_id: Option<LineItemId>,
    /// Requested amount.
    pub amount: Decimal,
}

/// A target that passed validation and is ready to be staged.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedAllocation {
    /// Invoice to apply money to.
    pub invoice_id: InvoiceId,
    /// Specific line item, or `None` for invoice level.
    pub line_item_id: Option<LineItemId>,
    /// Validated amount.
    pub amount: Decimal,
}

/// What the funding source can still pay out, as read at validation time.
#[derive(Debug, Clone)]
pub struct SourceFunds {
    /// Organization the source belongs to.
    pub organization_id: OrganizationId,
    /// Client the source belongs to.
    pub client_id: ClientId,
    /// Total funded amount.
    pub total: Decimal,
    /// Amount already committed to earlier allocations.
    pub already_allocated: Decimal,
}

impl SourceFunds {
    /// Amount still available to allocate.
    #[must_use]
    pub fn remaining(&self) -> Decimal {
        self.total - self.already_allocated
    }
}

/// What to do with an unallocated remainder after the batch is applied.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CloseOut {
    /// Leave the remainder on the payment; it stays unposted.
    Hold,
    /// Convert the remainder to a client credit and post the payment.
    CreditRemainder {
        /// Expiry date for the created credit, if any.
        expires_at: Option<NaiveDate>,
    },
}

/// Result of a successful allocation batch.
#[derive(Debug, Clone)]
pub struct AllocationOutcome {
    /// Allocation rows staged by the batch, in target order.
    pub allocations: Vec<Allocation>,
    /// Affected invoices after recalculation, first-touched order.
    pub invoices: Vec<Invoice>,
    /// Credit created from the remainder, if the batch closed out.
    pub credit: Option<Credit>,
    /// The payment after posting rules were applied.
    pub payment: Payment,
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_source_accessors() {
        let pid = PaymentId::new();
        let cid = CreditId::new();
        assert_eq!(AllocationSource::Payment(pid).payment_id(), Some(pid));
        assert_eq!(AllocationSource::Payment(pid).credit_id(), None);
        assert_eq!(AllocationSource::Credit(cid).credit_id(), Some(cid));
        assert_eq!(AllocationSource::Credit(cid).payment_id(), None);
    }

    #[test]
    fn test_source_funds_remaining() {
        let funds = SourceFunds {
            organization_id: OrganizationId::new(),
            client_id: ClientId::new(),
            total: dec!(500.00),
            already_allocated: dec!(120.50),
        };
        assert_eq!(funds.remaining(), dec!(379.50));
    }
}
