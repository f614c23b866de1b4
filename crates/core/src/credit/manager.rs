//! Credit creation, application, and expiry over a storage transaction.

use chrono::{DateTime, NaiveDate, Utc};
use remita_shared::types::money::is_money_scale;
use remita_shared::types::{CreditId, InvoiceId, PaymentId};
use rust_decimal::Decimal;

use super::error::CreditError;
use super::service::CreditService;
use super::types::{Credit, CreditStatus};
use crate::allocation::engine::AllocationEngine;
use crate::allocation::service::{AllocationService, CommittedTarget};
use crate::allocation::{Allocation, AllocationError, AllocationTarget, SourceFunds};
use crate::invoice::Invoice;
use crate::payment::PaymentStatus;
use crate::store::LedgerTx;

/// Result of applying a credit.
#[derive(Debug, Clone)]
pub struct CreditApplication {
    /// The credit after its remainder was decremented.
    pub credit: Credit,
    /// Allocation rows staged by the application.
    pub allocations: Vec<Allocation>,
    /// Affected invoices after recalculation.
    pub invoices: Vec<Invoice>,
}

/// Orchestrates credit operations.
pub struct CreditManager;

impl CreditManager {
    /// Creates a credit from a payment's unallocated remainder.
    ///
    /// The payment must be unposted; the amount must be positive, at money
    /// scale, and no larger than what the payment has not yet allocated.
    ///
    /// # Errors
    ///
    /// Returns `CreditError` naming the violated constraint.
    pub fn create_credit(
        tx: &mut dyn LedgerTx,
        payment_id: PaymentId,
        amount: Decimal,
        expires_at: Option<NaiveDate>,
        now: DateTime<Utc>,
    ) -> Result<Credit, CreditError> {
        let payment = tx
            .payment(payment_id)
            .ok_or(AllocationError::PaymentNotFound(payment_id))?;
        match payment.status {
            PaymentStatus::Voided => {
                return Err(AllocationError::PaymentVoided(payment_id).into())
            }
            PaymentStatus::Posted => {
                return Err(AllocationError::PaymentAlreadyPosted(payment_id).into())
            }
            PaymentStatus::Unposted => {}
        }

        if amount == Decimal::ZERO {
            return Err(CreditError::ZeroAmount);
        }
        if amount < Decimal::ZERO {
            return Err(CreditError::NegativeAmount);
        }
        if !is_money_scale(amount) {
            return Err(CreditError::InvalidScale(amount));
        }

        let allocated: Decimal = tx
            .allocations_for_payment(payment_id)
            .iter()
            .map(|a| a.amount)
            .sum();
        let remainder = payment.amount - allocated;
        if amount > remainder {
            return Err(CreditError::ExceedsRemainder {
                requested: amount,
                remainder,
            });
        }

        let credit = Credit::new(
            payment.organization_id,
            payment.client_id,
            amount,
            Some(payment_id),
            expires_at,
            now,
        );
        tx.insert_credit(credit.clone());
        // Touch the payment row so a concurrent writer minting a credit from
        // the same remainder conflicts at commit.
        tx.update_payment(payment);
        Ok(credit)
    }

    /// Applies a credit to an invoice, or auto-applies it oldest-first over
    /// the client's open invoices when no target is given.
    ///
    /// Application is a pseudo-payment: targets pass the same validation as
    /// payment allocations, funded by the credit's `remaining_amount`. A
    /// targeted application without an explicit amount applies
    /// `min(remaining, balance_due)`. Auto-application with no eligible
    /// invoices is a no-op, not an error.
    ///
    /// # Errors
    ///
    /// Returns `CreditError` naming the violated constraint; no writes are
    /// staged on any error path.
    pub fn apply_credit(
        tx: &mut dyn LedgerTx,
        credit_id: CreditId,
        target: Option<InvoiceId>,
        amount: Option<Decimal>,
        now: DateTime<Utc>,
    ) -> Result<CreditApplication, CreditError> {
        let mut credit = tx.credit(credit_id).ok_or(CreditError::NotFound(credit_id))?;
        let as_of = now.date_naive();

        match credit.status {
            CreditStatus::Applied => return Err(CreditError::Exhausted(credit_id)),
            CreditStatus::Expired => {
                return Err(CreditError::Expired {
                    credit_id,
                    expired_on: credit.expires_at.unwrap_or(as_of),
                })
            }
            CreditStatus::Available => {}
        }
        // The expiry sweep may not have run yet; expiry still blocks here.
        if let Some(expired_on) = credit.expires_at {
            if expired_on < as_of {
                return Err(CreditError::Expired {
                    credit_id,
                    expired_on,
                });
            }
        }
        if credit.remaining_amount <= Decimal::ZERO {
            return Err(CreditError::Exhausted(credit_id));
        }

        let targets = match target {
            Some(invoice_id) => {
                let invoice = tx
                    .invoice(invoice_id)
                    .ok_or(AllocationError::InvoiceNotFound(invoice_id))?;
                if invoice.client_id != credit.client_id {
                    return Err(CreditError::ClientMismatch(invoice_id));
                }
                let applied = amount.unwrap_or_else(|| {
                    credit.remaining_amount.min(invoice.balance_due)
                });
                vec![AllocationTarget {
                    invoice_id,
                    line_item_id: None,
                    amount: applied,
                }]
            }
            None => {
                let invoices = tx.invoices_for_client(credit.client_id);
                CreditService::plan_auto_application(credit.remaining_amount, &invoices)
                    .into_iter()
                    .map(|(invoice_id, amount)| AllocationTarget {
                        invoice_id,
                        line_item_id: None,
                        amount,
                    })
                    .collect()
            }
        };

        if targets.is_empty() {
            return Ok(CreditApplication {
                credit,
                allocations: Vec::new(),
                invoices: Vec::new(),
            });
        }

        let committed: Vec<CommittedTarget> = tx
            .allocations_for_credit(credit_id)
            .iter()
            .map(|a| (a.invoice_id, a.line_item_id, a.amount))
            .collect();
        let funds = SourceFunds {
            organization_id: credit.organization_id,
            client_id: credit.client_id,
            total: credit.amount,
            already_allocated: credit.amount - credit.remaining_amount,
        };
        let resolved =
            AllocationService::validate_and_resolve(&funds, &targets, &committed, |id| {
                tx.invoice(id)
            })
            .map_err(CreditError::Allocation)?;

        let mut allocations = Vec::with_capacity(resolved.len());
        for r in &resolved {
            let allocation =
                Allocation::from_credit(credit_id, r.invoice_id, r.line_item_id, r.amount, now);
            tx.insert_allocation(allocation.clone());
            allocations.push(allocation);
        }
        let invoices = AllocationEngine::recalculate_affected(tx, &allocations, now)
            .map_err(CreditError::Allocation)?;

        let applied_total: Decimal = allocations.iter().map(|a| a.amount).sum();
        credit.remaining_amount -= applied_total;
        if credit.remaining_amount == Decimal::ZERO {
            credit.status = CreditStatus::Applied;
        }
        tx.update_credit(credit.clone());

        Ok(CreditApplication {
            credit,
            allocations,
            invoices,
        })
    }

    /// Expires every available credit whose expiry date has passed.
    ///
    /// Returns the ids of newly expired credits. Remaining funds stay on the
    /// row for audit; expired credits can never be applied.
    pub fn expire_credits(tx: &mut dyn LedgerTx, as_of: NaiveDate) -> Vec<CreditId> {
        let mut expired = Vec::new();
        for mut credit in tx.credits() {
            if credit.status == CreditStatus::Available && credit.is_expired(as_of) {
                credit.status = CreditStatus::Expired;
                tx.update_credit(credit.clone());
                expired.push(credit.id);
            }
        }
        expired
    }
}
