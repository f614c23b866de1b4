//! Property-based tests for allocation batch validation.

use chrono::NaiveDate;
use proptest::prelude::*;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

use super::error::AllocationError;
use super::service::AllocationService;
use super::types::{AllocationTarget, SourceFunds};
use crate::invoice::{Invoice, InvoiceLineItem, InvoiceStatus};
use remita_shared::types::{ClientId, OrganizationId};

/// Strategy for positive money amounts (0.01 to 10,000.00).
fn positive_amount() -> impl Strategy<Value = Decimal> {
    (1i64..1_000_000i64).prop_map(|cents| Decimal::new(cents, 2))
}

fn funds(total: Decimal) -> SourceFunds {
    SourceFunds {
        organization_id: OrganizationId::new(),
        client_id: ClientId::new(),
        total,
        already_allocated: Decimal::ZERO,
    }
}

fn sent_invoice(funds: &SourceFunds, balance: Decimal) -> Invoice {
    let mut invoice = Invoice::new_draft(funds.organization_id, funds.client_id);
    invoice
        .line_items
        .push(InvoiceLineItem::new("Panel", dec!(1), balance));
    invoice.total_amount = balance;
    invoice.balance_due = balance;
    invoice.status = InvoiceStatus::Sent;
    invoice.issue_date = NaiveDate::from_ymd_opt(2026, 1, 10);
    invoice.due_date = NaiveDate::from_ymd_opt(2026, 2, 10);
    invoice
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(100))]

    /// A resolved batch never exceeds the source's unallocated funds, and
    /// resolves targets amount-for-amount in order.
    #[test]
    fn prop_resolved_batch_within_funds(
        total in positive_amount(),
        amounts in prop::collection::vec(positive_amount(), 1..6),
    ) {
        let funds = funds(total);
        let batch_total: Decimal = amounts.iter().copied().sum();
        // One invoice per target, each large enough for its own amount.
        let invoices: Vec<Invoice> = amounts
            .iter()
            .map(|amount| sent_invoice(&funds, *amount))
            .collect();
        let targets: Vec<AllocationTarget> = invoices
            .iter()
            .zip(&amounts)
            .map(|(invoice, amount)| AllocationTarget {
                invoice_id: invoice.id,
                line_item_id: None,
                amount: *amount,
            })
            .collect();

        let lookup = |id| invoices.iter().find(|inv| inv.id == id).cloned();
        let result = AllocationService::validate_and_resolve(&funds, &targets, &[], lookup);

        if batch_total <= funds.remaining() {
            let resolved = result.expect("batch within funds should resolve");
            prop_assert_eq!(resolved.len(), targets.len());
            for (r, t) in resolved.iter().zip(&targets) {
                prop_assert_eq!(r.invoice_id, t.invoice_id);
                prop_assert_eq!(r.amount, t.amount);
            }
            let resolved_total: Decimal = resolved.iter().map(|r| r.amount).sum();
            prop_assert!(resolved_total <= funds.remaining());
        } else {
            prop_assert!(
                matches!(result, Err(AllocationError::PaymentExceeded { .. })),
                "expected PaymentExceeded error"
            );
        }
    }

    /// A single target above the invoice's remaining balance is always an
    /// over-allocation, regardless of available funds.
    #[test]
    fn prop_single_target_cannot_exceed_balance(
        balance in positive_amount(),
        excess in positive_amount(),
    ) {
        let funds = funds(balance + excess);
        let invoice = sent_invoice(&funds, balance);
        let targets = [AllocationTarget {
            invoice_id: invoice.id,
            line_item_id: None,
            amount: balance + excess,
        }];
        let result = AllocationService::validate_and_resolve(&funds, &targets, &[], |_| {
            Some(invoice.clone())
        });
        prop_assert!(
            matches!(result, Err(AllocationError::OverAllocation { .. })),
            "expected OverAllocation error"
        );
    }

    /// Resubmitting a committed batch is always rejected as a replay, and an
    /// extended batch never is.
    #[test]
    fn prop_replay_guard(
        amounts in prop::collection::vec(positive_amount(), 1..5),
    ) {
        let per_invoice_headroom: Decimal = amounts.iter().copied().sum::<Decimal>() * dec!(2);
        let funds = funds(per_invoice_headroom * dec!(2));
        let invoice = sent_invoice(&funds, per_invoice_headroom);
        let targets: Vec<AllocationTarget> = amounts
            .iter()
            .map(|amount| AllocationTarget {
                invoice_id: invoice.id,
                line_item_id: None,
                amount: *amount,
            })
            .collect();
        let committed: Vec<_> = targets
            .iter()
            .map(|t| (t.invoice_id, t.line_item_id, t.amount))
            .collect();

        let result = AllocationService::validate_and_resolve(
            &funds,
            &targets,
            &committed,
            |_| Some(invoice.clone()),
        );
        prop_assert!(matches!(result, Err(AllocationError::AlreadyAllocated)));

        // One extra cent on the first target makes it new money.
        let mut extended = targets.clone();
        extended[0].amount += dec!(0.01);
        let result = AllocationService::validate_and_resolve(
            &funds,
            &extended,
            &committed,
            |_| Some(invoice.clone()),
        );
        prop_assert!(!matches!(result, Err(AllocationError::AlreadyAllocated)));
    }
}
