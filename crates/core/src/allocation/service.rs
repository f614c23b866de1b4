//! Pure allocation batch validation.
//!
//! `AllocationService` contains no storage access at all. The engine feeds it
//! a snapshot of the funding source, the source's committed allocation rows,
//! and an invoice lookup closure; it either rejects the whole batch with the
//! first violated constraint or resolves every target. Nothing is mutated on
//! any failure path.

use std::collections::BTreeMap;

use remita_shared::types::{InvoiceId, LineItemId};
use remita_shared::types::money::is_money_scale;
use rust_decimal::Decimal;

use super::error::AllocationError;
use super::types::{AllocationTarget, ResolvedAllocation, SourceFunds};
use crate::invoice::Invoice;

/// A committed allocation row flattened to the fields the replay check
/// compares on.
pub type CommittedTarget = (InvoiceId, Option<LineItemId>, Decimal);

/// Pure validation of allocation batches.
pub struct AllocationService;

impl AllocationService {
    /// Validates an allocation batch against a funding source and resolves
    /// every target.
    ///
    /// Checks run in a fixed order, so callers always see the most specific
    /// error first:
    /// 1. Batch is non-empty; every amount is positive and at money scale
    /// 2. Every target invoice exists, belongs to the source's organization
    ///    and client, is in an allocatable status, and any named line item
    ///    belongs to it and is not deleted
    /// 3. The batch is not a replay of already committed targets
    /// 4. No target exceeds its remaining balance, counting earlier targets
    ///    in the same batch against the same invoice or line item
    /// 5. The batch total fits in the source's unallocated funds
    ///
    /// # Errors
    ///
    /// Returns `AllocationError` naming the first violated constraint.
    pub fn validate_and_resolve<L>(
        funds: &SourceFunds,
        targets: &[AllocationTarget],
        committed: &[CommittedTarget],
        invoice_lookup: L,
    ) -> Result<Vec<ResolvedAllocation>, AllocationError>
    where
        L: Fn(InvoiceId) -> Option<Invoice>,
    {
        // 1. Batch shape
        if targets.is_empty() {
            return Err(AllocationError::EmptyBatch);
        }
        for target in targets {
            if target.amount == Decimal::ZERO {
                return Err(AllocationError::ZeroAmount);
            }
            if target.amount < Decimal::ZERO {
                return Err(AllocationError::NegativeAmount);
            }
            if !is_money_scale(target.amount) {
                return Err(AllocationError::InvalidScale(target.amount));
            }
        }

        // 2. Target resolution. Each invoice is read once so that within-batch
        // accumulation in step 4 runs against a single snapshot of it.
        let mut invoices: BTreeMap<InvoiceId, Invoice> = BTreeMap::new();
        for target in targets {
            if !invoices.contains_key(&target.invoice_id) {
                let invoice = invoice_lookup(target.invoice_id)
                    .ok_or(AllocationError::InvoiceNotFound(target.invoice_id))?;
                invoices.insert(target.invoice_id, invoice);
            }
            let invoice = &invoices[&target.invoice_id];

            if invoice.organization_id != funds.organization_id {
                return Err(AllocationError::OrganizationMismatch(invoice.id));
            }
            if invoice.client_id != funds.client_id {
                return Err(AllocationError::ClientMismatch(invoice.id));
            }
            if !invoice.status.is_allocatable() {
                return Err(AllocationError::InvoiceNotAllocatable {
                    invoice_id: invoice.id,
                    status: invoice.status,
                });
            }
            if let Some(line_item_id) = target.line_item_id {
                let item = invoice.line_item(line_item_id).ok_or(
                    AllocationError::LineItemNotFound {
                        invoice_id: invoice.id,
                        line_item_id,
                    },
                )?;
                if item.is_deleted {
                    return Err(AllocationError::LineItemDeleted(line_item_id));
                }
            }
        }

        // 3. Replay guard: a batch whose every target matches a distinct
        // already-committed row is a duplicate submission, not new money.
        if Self::is_replay(targets, committed) {
            return Err(AllocationError::AlreadyAllocated);
        }

        // 4. Remaining-balance checks with within-batch accumulation, so a
        // batch cannot overshoot an invoice by splitting across targets.
        let mut spent_on_invoice: BTreeMap<InvoiceId, Decimal> = BTreeMap::new();
        let mut spent_on_line: BTreeMap<LineItemId, Decimal> = BTreeMap::new();
        for target in targets {
            let invoice = &invoices[&target.invoice_id];
            let invoice_spent = spent_on_invoice
                .get(&target.invoice_id)
                .copied()
                .unwrap_or(Decimal::ZERO);

            if let Some(line_item_id) = target.line_item_id {
                // Lookup validated in step 2.
                let item = invoice
                    .line_item(line_item_id)
                    .ok_or(AllocationError::LineItemNotFound {
                        invoice_id: invoice.id,
                        line_item_id,
                    })?;
                let line_spent = spent_on_line
                    .get(&line_item_id)
                    .copied()
                    .unwrap_or(Decimal::ZERO);
                let remaining = item.line_total - item.allocated_amount - item.disputed_amount;
                if line_spent + target.amount > remaining {
                    return Err(AllocationError::OverAllocation {
                        invoice_id: invoice.id,
                        line_item_id: Some(line_item_id),
                        requested: line_spent + target.amount,
                        remaining,
                    });
                }
                spent_on_line.insert(line_item_id, line_spent + target.amount);
            }

            if invoice_spent + target.amount > invoice.balance_due {
                return Err(AllocationError::OverAllocation {
                    invoice_id: invoice.id,
                    line_item_id: target.line_item_id,
                    requested: invoice_spent + target.amount,
                    remaining: invoice.balance_due,
                });
            }
            spent_on_invoice.insert(target.invoice_id, invoice_spent + target.amount);
        }

        // 5. Source funds cap
        let batch_total: Decimal = targets.iter().map(|t| t.amount).sum();
        let available = funds.remaining();
        if batch_total > available {
            return Err(AllocationError::PaymentExceeded {
                requested: batch_total,
                available,
            });
        }

        Ok(targets
            .iter()
            .map(|t| ResolvedAllocation {
                invoice_id: t.invoice_id,
                line_item_id: t.line_item_id,
                amount: t.amount,
            })
            .collect())
    }

    /// Returns true if every target in the batch matches a distinct
    /// already-committed row on (invoice, line item, amount).
    fn is_replay(targets: &[AllocationTarget], committed: &[CommittedTarget]) -> bool {
        if committed.is_empty() {
            return false;
        }
        let mut unmatched: Vec<CommittedTarget> = committed.to_vec();
        for target in targets {
            let key = (target.invoice_id, target.line_item_id, target.amount);
            match unmatched.iter().position(|row| *row == key) {
                Some(idx) => {
                    unmatched.swap_remove(idx);
                }
                None => return false,
            }
        }
        true
    }
}
