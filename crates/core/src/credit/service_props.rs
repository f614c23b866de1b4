//! Property-based tests for credit auto-application planning.

use chrono::NaiveDate;
use proptest::prelude::*;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

use super::service::CreditService;
use crate::invoice::{Invoice, InvoiceLineItem, InvoiceStatus};
use remita_shared::types::{ClientId, OrganizationId};

/// Strategy for positive money amounts (0.01 to 10,000.00).
fn positive_amount() -> impl Strategy<Value = Decimal> {
    (1i64..1_000_000i64).prop_map(|cents| Decimal::new(cents, 2))
}

/// Strategy for issue dates in a narrow window so ties happen often.
fn issue_date() -> impl Strategy<Value = NaiveDate> {
    (0u64..10u64).prop_map(|offset| {
        NaiveDate::from_ymd_opt(2026, 1, 1)
            .expect("valid date")
            + chrono::Days::new(offset)
    })
}

fn open_invoice(balance: Decimal, issued: NaiveDate) -> Invoice {
    let mut invoice = Invoice::new_draft(OrganizationId::new(), ClientId::new());
    invoice
        .line_items
        .push(InvoiceLineItem::new("Panel", dec!(1), balance));
    invoice.total_amount = balance;
    invoice.balance_due = balance;
    invoice.status = InvoiceStatus::Sent;
    invoice.issue_date = Some(issued);
    invoice
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(100))]

    /// The plan never spends more than the available funds, and never pays
    /// any invoice beyond its balance due.
    #[test]
    fn prop_plan_respects_funds_and_balances(
        available in positive_amount(),
        balances in prop::collection::vec((positive_amount(), issue_date()), 0..8),
    ) {
        let invoices: Vec<Invoice> = balances
            .iter()
            .map(|(balance, issued)| open_invoice(*balance, *issued))
            .collect();
        let plan = CreditService::plan_auto_application(available, &invoices);

        let planned_total: Decimal = plan.iter().map(|(_, amount)| *amount).sum();
        prop_assert!(planned_total <= available);

        for (invoice_id, amount) in &plan {
            let invoice = invoices
                .iter()
                .find(|inv| inv.id == *invoice_id)
                .expect("planned invoice exists");
            prop_assert!(*amount > Decimal::ZERO);
            prop_assert!(*amount <= invoice.balance_due);
        }
    }

    /// The plan visits invoices strictly oldest-first, ids breaking ties.
    #[test]
    fn prop_plan_is_oldest_first_deterministic(
        available in positive_amount(),
        balances in prop::collection::vec((positive_amount(), issue_date()), 2..8),
    ) {
        let invoices: Vec<Invoice> = balances
            .iter()
            .map(|(balance, issued)| open_invoice(*balance, *issued))
            .collect();
        let plan = CreditService::plan_auto_application(available, &invoices);

        for pair in plan.windows(2) {
            let first = invoices.iter().find(|inv| inv.id == pair[0].0).expect("exists");
            let second = invoices.iter().find(|inv| inv.id == pair[1].0).expect("exists");
            let first_key = (first.issue_date, first.id);
            let second_key = (second.issue_date, second.id);
            prop_assert!(first_key < second_key);
        }

        // Same inputs, same plan.
        let again = CreditService::plan_auto_application(available, &invoices);
        prop_assert_eq!(plan, again);
    }

    /// With enough funds, every open invoice is paid off in full.
    #[test]
    fn prop_sufficient_funds_cover_everything(
        balances in prop::collection::vec((positive_amount(), issue_date()), 1..8),
    ) {
        let invoices: Vec<Invoice> = balances
            .iter()
            .map(|(balance, issued)| open_invoice(*balance, *issued))
            .collect();
        let total: Decimal = invoices.iter().map(|inv| inv.balance_due).sum();
        let plan = CreditService::plan_auto_application(total, &invoices);

        prop_assert_eq!(plan.len(), invoices.len());
        let planned_total: Decimal = plan.iter().map(|(_, amount)| *amount).sum();
        prop_assert_eq!(planned_total, total);
    }
}
