//! Dispute filing and resolution over a storage transaction.

use chrono::{DateTime, Utc};
use remita_shared::types::{DisputeId, LineItemId};
use rust_decimal::Decimal;

use super::error::DisputeError;
use super::service::DisputeService;
use super::types::{Dispute, DisputeOutcome, DisputeStatus};
use crate::invoice::{self, Invoice};
use crate::store::LedgerTx;

/// Orchestrates dispute operations.
pub struct DisputeAdjuster;

impl DisputeAdjuster {
    /// Files a dispute against a billed line item and recalculates the
    /// parent invoice.
    ///
    /// The amount is capped at the line item's unpaid, not-yet-disputed
    /// portion. While the dispute stays open that amount is excluded from
    /// `balance_due` and the invoice reads as disputed.
    ///
    /// # Errors
    ///
    /// Returns `DisputeError` naming the violated constraint; no writes are
    /// staged on any error path.
    pub fn file_dispute(
        tx: &mut dyn LedgerTx,
        line_item_id: LineItemId,
        amount: Decimal,
        reason: impl Into<String>,
        now: DateTime<Utc>,
    ) -> Result<(Dispute, Invoice), DisputeError> {
        let (invoice, item) = tx
            .find_line_item(line_item_id)
            .ok_or(DisputeError::LineItemNotFound(line_item_id))?;
        if item.is_deleted {
            return Err(DisputeError::LineItemDeleted(line_item_id));
        }
        if invoice.status.is_lifecycle() {
            return Err(DisputeError::InvoiceNotDisputable {
                invoice_id: invoice.id,
                status: invoice.status,
            });
        }

        let open_disputed: Decimal = tx
            .disputes_for_invoice(invoice.id)
            .iter()
            .filter(|d| d.line_item_id == line_item_id && d.status == DisputeStatus::Open)
            .map(|d| d.disputed_amount)
            .sum();
        DisputeService::validate_filing(&item, open_disputed, amount)?;

        let dispute = Dispute::file(invoice.id, line_item_id, amount, reason, now);
        tx.insert_dispute(dispute.clone());

        let invoice = invoice::recalculate(tx, invoice.id, now.date_naive())
            .map_err(|e| DisputeError::Internal(e.to_string()))?;
        Ok((dispute, invoice))
    }

    /// Resolves an open dispute and recalculates the parent invoice.
    ///
    /// `Approved` permanently waives `resolution_amount` (defaulting to the
    /// full disputed amount); any remainder returns to the payable balance.
    /// `Rejected` returns everything, restoring the exact pre-dispute
    /// balance.
    ///
    /// # Errors
    ///
    /// Returns `NotFound`, `NotOpen`, or a resolution-amount validation
    /// error.
    pub fn resolve_dispute(
        tx: &mut dyn LedgerTx,
        dispute_id: DisputeId,
        outcome: DisputeOutcome,
        resolution_amount: Option<Decimal>,
        now: DateTime<Utc>,
    ) -> Result<(Dispute, Invoice), DisputeError> {
        let mut dispute = tx
            .dispute(dispute_id)
            .ok_or(DisputeError::NotFound(dispute_id))?;
        if dispute.status != DisputeStatus::Open {
            return Err(DisputeError::NotOpen {
                dispute_id,
                status: dispute.status,
            });
        }

        let split =
            DisputeService::resolution_split(dispute.disputed_amount, outcome, resolution_amount)?;
        dispute.status = match outcome {
            DisputeOutcome::Approved => DisputeStatus::Resolved,
            DisputeOutcome::Rejected => DisputeStatus::Rejected,
        };
        dispute.waived_amount = split.waived;
        dispute.resolved_at = Some(now);
        tx.update_dispute(dispute.clone());

        let invoice = invoice::recalculate(tx, dispute.invoice_id, now.date_naive())
            .map_err(|e| DisputeError::Internal(e.to_string()))?;
        Ok((dispute, invoice))
    }
}
