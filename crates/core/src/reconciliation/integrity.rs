//! Post-write integrity sweep.
//!
//! Re-derives every invoice's balance and status from raw allocation and
//! dispute rows and compares against what is stored, plus arithmetic checks
//! on payments and credits. Violations are returned as data for the caller
//! to log as incidents; nothing is ever auto-corrected. Correct engine paths
//! never produce any of these.

use chrono::NaiveDate;
use remita_shared::types::{CreditId, InvoiceId, PaymentId};
use rust_decimal::Decimal;
use serde::Serialize;
use thiserror::Error;

use crate::credit::CreditStatus;
use crate::dispute::DisputeStatus;
use crate::invoice::{BalanceInputs, InvoiceStatus};
use crate::payment::PaymentStatus;
use crate::store::LedgerReader;

/// A detected ledger inconsistency.
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum IntegrityViolation {
    /// An invoice carries a negative balance.
    #[error("Invoice {invoice_id} has negative balance {balance_due}")]
    NegativeBalance {
        /// The invoice.
        invoice_id: InvoiceId,
        /// Its stored balance.
        balance_due: Decimal,
    },

    /// Stored balance disagrees with the one derived from rows.
    #[error("Invoice {invoice_id} stores balance {stored}, rows derive {derived}")]
    BalanceMismatch {
        /// The invoice.
        invoice_id: InvoiceId,
        /// Stored balance.
        stored: Decimal,
        /// Balance derived from allocation and dispute rows.
        derived: Decimal,
    },

    /// Stored status disagrees with the one derived from rows.
    ///
    /// Also fires when an invoice has simply drifted past its due date
    /// without a recalculation; the caller should recalculate it.
    #[error("Invoice {invoice_id} stores status {stored}, rows derive {derived}")]
    StatusMismatch {
        /// The invoice.
        invoice_id: InvoiceId,
        /// Stored status.
        stored: InvoiceStatus,
        /// Status derived from rows as of the sweep date.
        derived: InvoiceStatus,
    },

    /// A payment has more allocated against it than it is worth.
    #[error("Payment {payment_id} of {amount} has {allocated} allocated")]
    PaymentOverAllocated {
        /// The payment.
        payment_id: PaymentId,
        /// Received amount.
        amount: Decimal,
        /// Sum of its allocation rows.
        allocated: Decimal,
    },

    /// A posted payment still has unallocated funds and no credit for them.
    #[error("Posted payment {payment_id} has unresolved remainder {unallocated}")]
    PostedPaymentUnresolved {
        /// The payment.
        payment_id: PaymentId,
        /// The unaccounted remainder.
        unallocated: Decimal,
    },

    /// A credit's remainder is outside `[0, amount]`.
    #[error("Credit {credit_id} of {amount} has remainder {remaining}")]
    CreditRemainderOutOfRange {
        /// The credit.
        credit_id: CreditId,
        /// Original amount.
        amount: Decimal,
        /// Stored remainder.
        remaining: Decimal,
    },

    /// A credit's status disagrees with its remainder.
    #[error("Credit {credit_id} is applied but retains remainder {remaining}")]
    AppliedCreditWithRemainder {
        /// The credit.
        credit_id: CreditId,
        /// Stored remainder.
        remaining: Decimal,
    },
}

/// Sweeps the ledger for invariant violations.
pub struct IntegrityChecker;

impl IntegrityChecker {
    /// Checks every invoice, payment, and credit; returns all violations
    /// found, in entity-id order.
    #[must_use]
    pub fn check(reader: &dyn LedgerReader, as_of: NaiveDate) -> Vec<IntegrityViolation> {
        let mut violations = Vec::new();

        for invoice in reader.invoices() {
            if invoice.balance_due < Decimal::ZERO {
                violations.push(IntegrityViolation::NegativeBalance {
                    invoice_id: invoice.id,
                    balance_due: invoice.balance_due,
                });
                continue;
            }

            let allocations = reader.allocations_for_invoice(invoice.id);
            let disputes = reader.disputes_for_invoice(invoice.id);
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

            let derivation = crate::invoice::balance::derive(&BalanceInputs {
                status: invoice.status,
                total_amount: invoice.compute_total(),
                paid_amount,
                open_dispute_amount,
                waived_amount,
                due_date: invoice.due_date,
                as_of,
            });
            if derivation.balance_due != invoice.balance_due {
                violations.push(IntegrityViolation::BalanceMismatch {
                    invoice_id: invoice.id,
                    stored: invoice.balance_due,
                    derived: derivation.balance_due,
                });
            } else if derivation.status != invoice.status {
                violations.push(IntegrityViolation::StatusMismatch {
                    invoice_id: invoice.id,
                    stored: invoice.status,
                    derived: derivation.status,
                });
            }
        }

        let credits = reader.credits();
        for payment in reader.payments() {
            let allocated: Decimal = reader
                .allocations_for_payment(payment.id)
                .iter()
                .map(|a| a.amount)
                .sum();
            if allocated > payment.amount {
                violations.push(IntegrityViolation::PaymentOverAllocated {
                    payment_id: payment.id,
                    amount: payment.amount,
                    allocated,
                });
                continue;
            }
            let unallocated = payment.amount - allocated;
            if payment.status == PaymentStatus::Posted && unallocated > Decimal::ZERO {
                let credited = credits
                    .iter()
                    .any(|c| c.source_payment_id == Some(payment.id));
                if !credited {
                    violations.push(IntegrityViolation::PostedPaymentUnresolved {
                        payment_id: payment.id,
                        unallocated,
                    });
                }
            }
        }

        for credit in &credits {
            if credit.remaining_amount < Decimal::ZERO || credit.remaining_amount > credit.amount
            {
                violations.push(IntegrityViolation::CreditRemainderOutOfRange {
                    credit_id: credit.id,
                    amount: credit.amount,
                    remaining: credit.remaining_amount,
                });
            } else if credit.status == CreditStatus::Applied
                && credit.remaining_amount > Decimal::ZERO
            {
                violations.push(IntegrityViolation::AppliedCreditWithRemainder {
                    credit_id: credit.id,
                    remaining: credit.remaining_amount,
                });
            }
        }

        violations
    }
}
