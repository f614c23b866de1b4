//! Pure credit application planning.

use remita_shared::types::InvoiceId;
use rust_decimal::Decimal;

use crate::invoice::Invoice;

/// Pure planning logic for credit application.
pub struct CreditService;

impl CreditService {
    /// Plans an oldest-first auto-application of `available` funds over a
    /// client's invoices.
    ///
    /// Eligible invoices are those in an allocatable status (disputed ones
    /// are skipped) with `balance_due > 0`. They are paid down oldest first,
    /// ordered by `issue_date` ascending then `id` ascending so the plan is
    /// deterministic, until the funds run out or no targets remain. An empty
    /// plan is a valid outcome.
    #[must_use]
    pub fn plan_auto_application(
        available: Decimal,
        invoices: &[Invoice],
    ) -> Vec<(InvoiceId, Decimal)> {
        let mut eligible: Vec<&Invoice> = invoices
            .iter()
            .filter(|inv| inv.status.is_allocatable() && inv.balance_due > Decimal::ZERO)
            .collect();
        eligible.sort_by(|a, b| {
            a.issue_date
                .cmp(&b.issue_date)
                .then_with(|| a.id.cmp(&b.id))
        });

        let mut remaining = available;
        let mut plan = Vec::new();
        for invoice in eligible {
            if remaining <= Decimal::ZERO {
                break;
            }
            let applied = remaining.min(invoice.balance_due);
            plan.push((invoice.id, applied));
            remaining -= applied;
        }
        plan
    }
}
