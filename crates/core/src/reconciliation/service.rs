//! Reconciliation report projection.

use std::collections::BTreeMap;

use chrono::NaiveDate;
use remita_shared::types::ClientId;
use rust_decimal::Decimal;

use super::types::{
    AgingBucket, AgingLine, AgingSummary, ClientSummary, ReconciliationReport, ReportTotals,
    UnpostedPayment,
};
use crate::credit::CreditStatus;
use crate::payment::PaymentStatus;
use crate::store::LedgerReader;

/// Builds point-in-time reconciliation views.
pub struct ReconciliationService;

impl ReconciliationService {
    /// Projects the ledger into a reconciliation report as of a date.
    ///
    /// Strictly read-only: nothing is recalculated or persisted; stored
    /// derived fields are reported as-is. Staleness against them is the
    /// integrity checker's concern.
    #[must_use]
    pub fn report(reader: &dyn LedgerReader, as_of: NaiveDate) -> ReconciliationReport {
        let mut clients: BTreeMap<ClientId, ClientSummary> = BTreeMap::new();
        let mut totals = ReportTotals::default();

        let mut unposted_payments = Vec::new();
        for payment in reader.payments() {
            if payment.status != PaymentStatus::Unposted {
                continue;
            }
            let allocated: Decimal = reader
                .allocations_for_payment(payment.id)
                .iter()
                .map(|a| a.amount)
                .sum();
            let unallocated = payment.amount - allocated;
            clients
                .entry(payment.client_id)
                .or_default()
                .unallocated_payments += unallocated;
            totals.unallocated_payments += unallocated;
            unposted_payments.push(UnpostedPayment {
                payment_id: payment.id,
                client_id: payment.client_id,
                amount: payment.amount,
                allocated,
                unallocated,
            });
        }

        let mut aging_lines = Vec::new();
        let mut aging = AgingSummary::default();
        for invoice in reader.invoices() {
            if invoice.status.is_lifecycle() || invoice.balance_due <= Decimal::ZERO {
                continue;
            }
            let bucket = AgingBucket::for_due_date(invoice.due_date, as_of);
            aging.add(bucket, invoice.balance_due);
            clients.entry(invoice.client_id).or_default().open_balance += invoice.balance_due;
            totals.open_balance += invoice.balance_due;
            aging_lines.push(AgingLine {
                invoice_id: invoice.id,
                client_id: invoice.client_id,
                due_date: invoice.due_date,
                balance_due: invoice.balance_due,
                bucket,
            });
        }

        for credit in reader.credits() {
            if credit.status != CreditStatus::Available {
                continue;
            }
            clients.entry(credit.client_id).or_default().unapplied_credit +=
                credit.remaining_amount;
            totals.unapplied_credit += credit.remaining_amount;
        }

        ReconciliationReport {
            as_of,
            unposted_payments,
            aging_lines,
            aging,
            clients: clients.into_iter().collect(),
            totals,
        }
    }
}
