//! Reconciliation report types.

use chrono::NaiveDate;
use remita_shared::types::{ClientId, InvoiceId, PaymentId};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// How far past due an open invoice is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AgingBucket {
    /// Not yet due (or no due date recorded).
    Current,
    /// 0-30 days past due.
    Days0To30,
    /// 31-60 days past due.
    Days31To60,
    /// 61-90 days past due.
    Days61To90,
    /// More than 90 days past due.
    Over90,
}

impl AgingBucket {
    /// Buckets an invoice by its due date relative to `as_of`.
    ///
    /// An invoice due on `as_of` itself is current, matching the overdue
    /// rule in balance derivation.
    #[must_use]
    pub fn for_due_date(due_date: Option<NaiveDate>, as_of: NaiveDate) -> Self {
        let Some(due) = due_date else {
            return Self::Current;
        };
        let days_past = (as_of - due).num_days();
        match days_past {
            i64::MIN..=0 => Self::Current,
            1..=30 => Self::Days0To30,
            31..=60 => Self::Days31To60,
            61..=90 => Self::Days61To90,
            _ => Self::Over90,
        }
    }
}

/// An unposted payment and what remains unallocated on it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UnpostedPayment {
    /// The payment.
    pub payment_id: PaymentId,
    /// Paying client.
    pub client_id: ClientId,
    /// Received amount.
    pub amount: Decimal,
    /// Amount already allocated to invoices.
    pub allocated: Decimal,
    /// Remainder awaiting allocation or close-out.
    pub unallocated: Decimal,
}

/// One open invoice in the aging view.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AgingLine {
    /// The invoice.
    pub invoice_id: InvoiceId,
    /// Billed client.
    pub client_id: ClientId,
    /// Due date, if the invoice was sent with one.
    pub due_date: Option<NaiveDate>,
    /// Open balance.
    pub balance_due: Decimal,
    /// Bucket relative to the report date.
    pub bucket: AgingBucket,
}

/// Open balances summed per aging bucket.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AgingSummary {
    /// Not yet due.
    pub current: Decimal,
    /// 0-30 days past due.
    pub days_0_30: Decimal,
    /// 31-60 days past due.
    pub days_31_60: Decimal,
    /// 61-90 days past due.
    pub days_61_90: Decimal,
    /// More than 90 days past due.
    pub over_90: Decimal,
    /// Sum of all buckets.
    pub total: Decimal,
}

impl AgingSummary {
    /// Adds an open balance to its bucket and the total.
    pub fn add(&mut self, bucket: AgingBucket, balance: Decimal) {
        match bucket {
            AgingBucket::Current => self.current += balance,
            AgingBucket::Days0To30 => self.days_0_30 += balance,
            AgingBucket::Days31To60 => self.days_31_60 += balance,
            AgingBucket::Days61To90 => self.days_61_90 += balance,
            AgingBucket::Over90 => self.over_90 += balance,
        }
        self.total += balance;
    }
}

/// Per-client subtotals.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ClientSummary {
    /// Sum of the client's open invoice balances.
    pub open_balance: Decimal,
    /// Sum of unallocated remainders on the client's unposted payments.
    pub unallocated_payments: Decimal,
    /// Sum of remaining amounts on the client's available credits.
    pub unapplied_credit: Decimal,
}

/// Grand totals across all clients.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ReportTotals {
    /// Total open invoice balance.
    pub open_balance: Decimal,
    /// Total unallocated payment funds.
    pub unallocated_payments: Decimal,
    /// Total unapplied credit.
    pub unapplied_credit: Decimal,
}

/// Point-in-time reconciliation view of the ledger.
///
/// Every row satisfies its own entity invariants, but no cross-view sum
/// identity is asserted between the sections; they answer different
/// questions about the same state.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReconciliationReport {
    /// Report reference date.
    pub as_of: NaiveDate,
    /// Payments still awaiting allocation or close-out.
    pub unposted_payments: Vec<UnpostedPayment>,
    /// Open invoices with their aging buckets.
    pub aging_lines: Vec<AgingLine>,
    /// Open balances summed per bucket.
    pub aging: AgingSummary,
    /// Per-client subtotals, keyed by client id in ascending order.
    pub clients: Vec<(ClientId, ClientSummary)>,
    /// Grand totals.
    pub totals: ReportTotals,
}
