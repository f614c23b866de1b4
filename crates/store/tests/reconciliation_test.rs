//! Reconciliation report and integrity sweep over the in-memory store.

mod common;

use common::{date, now, today, Fixture};
use remita_core::allocation::{AllocationEngine, AllocationTarget, CloseOut};
use remita_core::reconciliation::{
    AgingBucket, IntegrityChecker, IntegrityViolation, ReconciliationService,
};
use remita_core::store::{LedgerReader, LedgerTx};
use remita_store::MemoryStore;
use rust_decimal_macros::dec;

fn target(invoice_id: remita_shared::types::InvoiceId, amount: rust_decimal::Decimal) -> AllocationTarget {
    AllocationTarget {
        invoice_id,
        line_item_id: None,
        amount,
    }
}

#[test]
fn test_report_sections_and_totals() {
    let mut store = MemoryStore::new();
    let fx = Fixture::new();

    // Overdue invoice, 40 days past due as of 2026-03-15.
    let overdue = fx.sent_invoice(
        &mut store,
        &[dec!(200.00)],
        date(2026, 1, 1),
        date(2026, 2, 3),
    );
    // Current invoice, partially paid.
    let current = fx.sent_invoice(
        &mut store,
        &[dec!(300.00)],
        date(2026, 3, 1),
        date(2026, 4, 1),
    );
    let payment = fx.payment(&mut store, dec!(250.00));

    let mut tx = store.begin();
    AllocationEngine::allocate(
        &mut tx,
        payment.id,
        &[target(current.id, dec!(100.00))],
        CloseOut::Hold,
        now(),
    )
    .expect("allocate");
    store.commit(tx).expect("commit");

    let report = ReconciliationService::report(&store, today());

    // The partially allocated payment is still unposted with 150 floating.
    assert_eq!(report.unposted_payments.len(), 1);
    assert_eq!(report.unposted_payments[0].allocated, dec!(100.00));
    assert_eq!(report.unposted_payments[0].unallocated, dec!(150.00));
    assert_eq!(report.totals.unallocated_payments, dec!(150.00));

    assert_eq!(report.aging_lines.len(), 2);
    assert_eq!(report.aging.days_31_60, dec!(200.00));
    assert_eq!(report.aging.current, dec!(200.00));
    assert_eq!(report.aging.total, dec!(400.00));
    let overdue_line = report
        .aging_lines
        .iter()
        .find(|line| line.invoice_id == overdue.id)
        .expect("overdue line");
    assert_eq!(overdue_line.bucket, AgingBucket::Days31To60);

    assert_eq!(report.clients.len(), 1);
    let (client_id, summary) = &report.clients[0];
    assert_eq!(*client_id, fx.client_id);
    assert_eq!(summary.open_balance, dec!(400.00));
    assert_eq!(summary.unallocated_payments, dec!(150.00));
    assert_eq!(summary.unapplied_credit, dec!(0.00));
    assert_eq!(report.totals.open_balance, dec!(400.00));
}

#[test]
fn test_report_counts_available_credit() {
    let mut store = MemoryStore::new();
    let fx = Fixture::new();
    let invoice = fx.sent_invoice(
        &mut store,
        &[dec!(100.00)],
        date(2026, 3, 1),
        date(2026, 4, 1),
    );
    let payment = fx.payment(&mut store, dec!(130.00));

    let mut tx = store.begin();
    AllocationEngine::allocate(
        &mut tx,
        payment.id,
        &[target(invoice.id, dec!(100.00))],
        CloseOut::CreditRemainder { expires_at: None },
        now(),
    )
    .expect("close out");
    store.commit(tx).expect("commit");

    let report = ReconciliationService::report(&store, today());
    assert!(report.unposted_payments.is_empty());
    assert!(report.aging_lines.is_empty());
    assert_eq!(report.totals.unapplied_credit, dec!(30.00));
}

#[test]
fn test_integrity_sweep_is_clean_after_engine_operations() {
    let mut store = MemoryStore::new();
    let fx = Fixture::new();
    let invoice = fx.sent_invoice(
        &mut store,
        &[dec!(500.00)],
        date(2026, 3, 1),
        date(2026, 4, 1),
    );
    let payment = fx.payment(&mut store, dec!(600.00));

    let mut tx = store.begin();
    AllocationEngine::allocate(
        &mut tx,
        payment.id,
        &[target(invoice.id, dec!(500.00))],
        CloseOut::CreditRemainder { expires_at: None },
        now(),
    )
    .expect("close out");
    store.commit(tx).expect("commit");

    assert!(IntegrityChecker::check(&store, today()).is_empty());
}

#[test]
fn test_integrity_sweep_detects_corrupted_balance() {
    let mut store = MemoryStore::new();
    let fx = Fixture::new();
    let invoice = fx.sent_invoice(
        &mut store,
        &[dec!(100.00)],
        date(2026, 3, 1),
        date(2026, 4, 1),
    );

    // Corrupt the stored balance behind the engines' back.
    let mut tx = store.begin();
    let mut corrupted = tx.invoice(invoice.id).expect("read");
    corrupted.balance_due = dec!(42.00);
    tx.update_invoice(corrupted);
    store.commit(tx).expect("commit");

    let violations = IntegrityChecker::check(&store, today());
    assert_eq!(violations.len(), 1);
    assert!(matches!(
        violations[0],
        IntegrityViolation::BalanceMismatch { invoice_id, stored, derived }
            if invoice_id == invoice.id && stored == dec!(42.00) && derived == dec!(100.00)
    ));
}

#[test]
fn test_integrity_sweep_detects_drift_past_due_date() {
    let mut store = MemoryStore::new();
    let fx = Fixture::new();
    // Sent with a due date that has passed, but never recalculated since.
    let invoice = fx.sent_invoice(
        &mut store,
        &[dec!(100.00)],
        date(2026, 1, 1),
        date(2026, 2, 1),
    );

    let violations = IntegrityChecker::check(&store, today());
    assert_eq!(violations.len(), 1);
    assert!(matches!(
        violations[0],
        IntegrityViolation::StatusMismatch { invoice_id, .. } if invoice_id == invoice.id
    ));
}
