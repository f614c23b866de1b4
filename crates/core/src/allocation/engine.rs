//! Allocation engine: applies a validated batch inside one transaction.
//!
//! The engine owns the write choreography the validation service cannot:
//! staging allocation rows, recalculating every touched invoice, and posting
//! or closing out the payment. Callers own the transaction; nothing here
//! commits. A failed validation stages no writes at all.

use chrono::{DateTime, Utc};
use remita_shared::types::{InvoiceId, PaymentId};
use rust_decimal::Decimal;

use super::error::AllocationError;
use super::service::{AllocationService, CommittedTarget};
use super::types::{Allocation, AllocationOutcome, AllocationTarget, CloseOut, SourceFunds};
use crate::credit::CreditManager;
use crate::invoice::{self, Invoice};
use crate::payment::{Payment, PaymentStatus};
use crate::store::LedgerTx;

/// Orchestrates allocation batches against a storage transaction.
pub struct AllocationEngine;

impl AllocationEngine {
    /// Applies an allocation batch from a payment to one or more invoice
    /// targets.
    ///
    /// On success every target becomes a staged allocation row, every
    /// affected invoice is recalculated, and the payment is posted when its
    /// funds are fully resolved: either the batch consumed the remainder, or
    /// `close_out` converted it to a client credit.
    ///
    /// `now` is the commit timestamp for rows and the reference date for
    /// overdue recalculation.
    ///
    /// # Errors
    ///
    /// Returns `AllocationError` naming the first violated constraint; no
    /// writes are staged on any error path.
    pub fn allocate(
        tx: &mut dyn LedgerTx,
        payment_id: PaymentId,
        targets: &[AllocationTarget],
        close_out: CloseOut,
        now: DateTime<Utc>,
    ) -> Result<AllocationOutcome, AllocationError> {
        let payment = tx
            .payment(payment_id)
            .ok_or(AllocationError::PaymentNotFound(payment_id))?;
        match payment.status {
            PaymentStatus::Voided => return Err(AllocationError::PaymentVoided(payment_id)),
            PaymentStatus::Posted => {
                return Err(AllocationError::PaymentAlreadyPosted(payment_id))
            }
            PaymentStatus::Unposted => {}
        }

        let committed: Vec<CommittedTarget> = tx
            .allocations_for_payment(payment_id)
            .iter()
            .map(|a| (a.invoice_id, a.line_item_id, a.amount))
            .collect();
        let already_allocated: Decimal = committed.iter().map(|(_, _, amount)| *amount).sum();

        let funds = SourceFunds {
            organization_id: payment.organization_id,
            client_id: payment.client_id,
            total: payment.amount,
            already_allocated,
        };
        let resolved = AllocationService::validate_and_resolve(&funds, targets, &committed, |id| {
            tx.invoice(id)
        })?;

        let mut allocations = Vec::with_capacity(resolved.len());
        for r in &resolved {
            let allocation =
                Allocation::from_payment(payment_id, r.invoice_id, r.line_item_id, r.amount, now);
            tx.insert_allocation(allocation.clone());
            allocations.push(allocation);
        }

        let invoices = Self::recalculate_affected(tx, &allocations, now)?;

        let batch_total: Decimal = allocations.iter().map(|a| a.amount).sum();
        let unallocated = payment.amount - already_allocated - batch_total;

        let mut payment = payment;
        let mut credit = None;
        if unallocated == Decimal::ZERO {
            payment.status = PaymentStatus::Posted;
        } else if let CloseOut::CreditRemainder { expires_at } = close_out {
            let created =
                CreditManager::create_credit(tx, payment_id, unallocated, expires_at, now)
                    .map_err(|e| AllocationError::Internal(e.to_string()))?;
            credit = Some(created);
            payment.status = PaymentStatus::Posted;
        }
        // Written even when the payment stays Unposted: the funding source
        // must be in the commit's version check so concurrent batches drawing
        // on the same payment conflict.
        tx.update_payment(payment.clone());

        Ok(AllocationOutcome {
            allocations,
            invoices,
            credit,
            payment,
        })
    }

    /// Voids an unposted payment that has no committed allocations.
    ///
    /// # Errors
    ///
    /// Returns `PaymentNotFound`, `PaymentVoided`, `PaymentAlreadyPosted`,
    /// or `VoidWithAllocations`.
    pub fn void_payment(
        tx: &mut dyn LedgerTx,
        payment_id: PaymentId,
    ) -> Result<Payment, AllocationError> {
        let mut payment = tx
            .payment(payment_id)
            .ok_or(AllocationError::PaymentNotFound(payment_id))?;
        match payment.status {
            PaymentStatus::Voided => return Err(AllocationError::PaymentVoided(payment_id)),
            PaymentStatus::Posted => {
                return Err(AllocationError::PaymentAlreadyPosted(payment_id))
            }
            PaymentStatus::Unposted => {}
        }
        if !tx.allocations_for_payment(payment_id).is_empty() {
            return Err(AllocationError::VoidWithAllocations(payment_id));
        }
        payment.status = PaymentStatus::Voided;
        tx.update_payment(payment.clone());
        Ok(payment)
    }

    /// Recalculates each invoice touched by the staged rows, once, in
    /// first-touched order. Shared with credit application, which stages the
    /// same kind of rows.
    pub(crate) fn recalculate_affected(
        tx: &mut dyn LedgerTx,
        allocations: &[Allocation],
        now: DateTime<Utc>,
    ) -> Result<Vec<Invoice>, AllocationError> {
        let mut affected: Vec<InvoiceId> = Vec::new();
        for allocation in allocations {
            if !affected.contains(&allocation.invoice_id) {
                affected.push(allocation.invoice_id);
            }
        }
        let mut invoices = Vec::with_capacity(affected.len());
        for invoice_id in affected {
            // Targets were validated against this transaction's snapshot, so
            // a missing invoice here is a storage fault, not a caller error.
            let invoice = invoice::recalculate(tx, invoice_id, now.date_naive())
                .map_err(|e| AllocationError::Internal(e.to_string()))?;
            invoices.push(invoice);
        }
        Ok(invoices)
    }
}
