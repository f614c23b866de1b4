//! Pure dispute rules: the filing cap and the resolution split.

use remita_shared::types::money::is_money_scale;
use rust_decimal::Decimal;

use super::error::DisputeError;
use super::types::DisputeOutcome;
use crate::invoice::InvoiceLineItem;

/// How a resolved dispute's amount splits.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResolutionSplit {
    /// Portion permanently waived from the effective total.
    pub waived: Decimal,
    /// Portion returned to the payable balance.
    pub returned: Decimal,
}

/// Pure dispute validation logic.
pub struct DisputeService;

impl DisputeService {
    /// The portion of a line item that can still be disputed: its total less
    /// what is already paid and what is already under open dispute.
    ///
    /// Disputing a paid portion would require a refund flow, which the
    /// ledger does not model; the cap keeps filing and allocation from
    /// fighting over the same cents.
    #[must_use]
    pub fn disputable_amount(item: &InvoiceLineItem, open_disputed: Decimal) -> Decimal {
        item.line_total - item.allocated_amount - open_disputed
    }

    /// Validates a filing amount against the disputable portion.
    ///
    /// # Errors
    ///
    /// Returns `ZeroAmount`, `NegativeAmount`, `InvalidScale`, or
    /// `ExceedsDisputable`.
    pub fn validate_filing(
        item: &InvoiceLineItem,
        open_disputed: Decimal,
        amount: Decimal,
    ) -> Result<(), DisputeError> {
        if amount == Decimal::ZERO {
            return Err(DisputeError::ZeroAmount);
        }
        if amount < Decimal::ZERO {
            return Err(DisputeError::NegativeAmount);
        }
        if !is_money_scale(amount) {
            return Err(DisputeError::InvalidScale(amount));
        }
        let disputable = Self::disputable_amount(item, open_disputed);
        if amount > disputable {
            return Err(DisputeError::ExceedsDisputable {
                requested: amount,
                disputable,
            });
        }
        Ok(())
    }

    /// Splits a dispute's amount according to the resolution outcome.
    ///
    /// `Approved` waives `resolution_amount` (the full disputed amount when
    /// not given); the remainder returns to balance. `Rejected` returns
    /// everything.
    ///
    /// # Errors
    ///
    /// Returns `NegativeAmount`, `InvalidScale`, or
    /// `ResolutionExceedsDispute` for a bad explicit resolution amount.
    pub fn resolution_split(
        disputed_amount: Decimal,
        outcome: DisputeOutcome,
        resolution_amount: Option<Decimal>,
    ) -> Result<ResolutionSplit, DisputeError> {
        let waived = match outcome {
            DisputeOutcome::Rejected => Decimal::ZERO,
            DisputeOutcome::Approved => {
                let waived = resolution_amount.unwrap_or(disputed_amount);
                if waived < Decimal::ZERO {
                    return Err(DisputeError::NegativeAmount);
                }
                if !is_money_scale(waived) {
                    return Err(DisputeError::InvalidScale(waived));
                }
                if waived > disputed_amount {
                    return Err(DisputeError::ResolutionExceedsDispute {
                        resolution: waived,
                        disputed: disputed_amount,
                    });
                }
                waived
            }
        };
        Ok(ResolutionSplit {
            waived,
            returned: disputed_amount - waived,
        })
    }
}
