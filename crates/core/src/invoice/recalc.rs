//! Invoice recalculation.
//!
//! `recalculate` is the single, explicit place where derived invoice fields
//! are refreshed from committed allocations and disputes. The allocation
//! engine, credit manager, and dispute adjuster all call it after staging
//! writes; it reads through the same transaction handle, so staged rows are
//! visible. It never mutates allocation or dispute rows, and calling it
//! twice over unchanged state produces identical results.

use chrono::NaiveDate;
use remita_shared::types::InvoiceId;
use rust_decimal::Decimal;

use super::balance::{self, BalanceInputs};
use super::error::InvoiceError;
use super::types::Invoice;
use crate::dispute::DisputeStatus;
use crate::store::LedgerTx;

/// Re-derives and persists an invoice's balance, status, and per-line-item
/// derived amounts from stored allocations and disputes.
///
/// `as_of` is the reference date for overdue checks.
///
/// # Errors
///
/// Returns `InvoiceError::NotFound` if the invoice does not exist.
pub fn recalculate(
    tx: &mut dyn LedgerTx,
    invoice_id: InvoiceId,
    as_of: NaiveDate,
) -> Result<Invoice, InvoiceError> {
    let mut invoice = tx
        .invoice(invoice_id)
        .ok_or(InvoiceError::NotFound(invoice_id))?;

    let allocations = tx.allocations_for_invoice(invoice_id);
    let disputes = tx.disputes_for_invoice(invoice_id);

    // Per-line-item derived amounts.
    for item in &mut invoice.line_items {
        item.allocated_amount = allocations
            .iter()
            .filter(|a| a.line_item_id == Some(item.id))
            .map(|a| a.amount)
            .sum();
        item.disputed_amount = disputes
            .iter()
            .filter(|d| d.line_item_id == item.id && d.status == DisputeStatus::Open)
            .map(|d| d.disputed_amount)
            .sum();
    }

    let paid_amount: Decimal = allocations.iter().map(|a| a.amount).sum();
    let open_dispute_amount: Decimal = disputes
        .iter()
        .filter(|d| d.status == DisputeStatus::Open)
        .map(|d| d.disputed_amount)
        .sum();
    let waived_amount: Decimal = disputes
        .iter()
        .filter(|d| d.status == DisputeStatus::Resolved)
        .map(|d| d.waived_amount)
        .sum();

    invoice.total_amount = invoice.compute_total();
    invoice.paid_amount = paid_amount;

    let derivation = balance::derive(&BalanceInputs {
        status: invoice.status,
        total_amount: invoice.total_amount,
        paid_amount,
        open_dispute_amount,
        waived_amount,
        due_date: invoice.due_date,
        as_of,
    });
    invoice.balance_due = derivation.balance_due;
    invoice.status = derivation.status;

    tx.update_invoice(invoice.clone());
    Ok(invoice)
}
