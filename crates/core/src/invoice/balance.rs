//! Pure balance and status derivation.
//!
//! The recalculator's arithmetic lives here as a pure function of its
//! inputs so it can be tested (and property-tested) without storage. The
//! reference date is injected rather than read from the clock, which keeps
//! repeated derivations over unchanged state identical.

use chrono::NaiveDate;
use rust_decimal::Decimal;

use super::types::InvoiceStatus;

/// Inputs to balance derivation, aggregated from stored state.
#[derive(Debug, Clone)]
pub struct BalanceInputs {
    /// Current invoice status.
    pub status: InvoiceStatus,
    /// Sum of active line totals.
    pub total_amount: Decimal,
    /// Sum of committed allocations against the invoice.
    pub paid_amount: Decimal,
    /// Sum of disputed amounts on open disputes.
    pub open_dispute_amount: Decimal,
    /// Sum of amounts permanently waived by approved dispute resolutions.
    pub waived_amount: Decimal,
    /// Due date, if the invoice has been issued.
    pub due_date: Option<NaiveDate>,
    /// Reference date for overdue checks.
    pub as_of: NaiveDate,
}

/// Result of balance derivation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BalanceDerivation {
    /// The unpaid, non-disputed remainder owed.
    pub balance_due: Decimal,
    /// The derived status.
    pub status: InvoiceStatus,
}

/// Derives `balance_due` and status from aggregated state.
///
/// `balance_due = max(0, total - paid - open disputes - waived)`.
///
/// Status priority, first match wins:
/// cancelled -> disputed -> paid -> partial -> overdue -> sent.
/// Lifecycle statuses (draft, finalized, cancelled) are preserved; only
/// issued invoices get a derived status.
#[must_use]
pub fn derive(inputs: &BalanceInputs) -> BalanceDerivation {
    let balance_due = (inputs.total_amount
        - inputs.paid_amount
        - inputs.open_dispute_amount
        - inputs.waived_amount)
        .max(Decimal::ZERO);

    if inputs.status == InvoiceStatus::Cancelled {
        return BalanceDerivation {
            balance_due: Decimal::ZERO,
            status: InvoiceStatus::Cancelled,
        };
    }
    if inputs.status.is_lifecycle() {
        return BalanceDerivation {
            balance_due,
            status: inputs.status,
        };
    }

    let status = if inputs.open_dispute_amount > Decimal::ZERO {
        InvoiceStatus::Disputed
    } else if balance_due.is_zero() && inputs.paid_amount > Decimal::ZERO {
        InvoiceStatus::Paid
    } else if inputs.paid_amount > Decimal::ZERO && inputs.paid_amount < inputs.total_amount {
        InvoiceStatus::Partial
    } else if balance_due > Decimal::ZERO
        && inputs.due_date.is_some_and(|due| due < inputs.as_of)
    {
        InvoiceStatus::Overdue
    } else {
        InvoiceStatus::Sent
    };

    BalanceDerivation { balance_due, status }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn inputs(total: Decimal, paid: Decimal) -> BalanceInputs {
        BalanceInputs {
            status: InvoiceStatus::Sent,
            total_amount: total,
            paid_amount: paid,
            open_dispute_amount: Decimal::ZERO,
            waived_amount: Decimal::ZERO,
            due_date: Some(date(2026, 3, 31)),
            as_of: date(2026, 3, 1),
        }
    }

    #[test]
    fn test_fully_paid() {
        let d = derive(&inputs(dec!(500.00), dec!(500.00)));
        assert_eq!(d.balance_due, dec!(0.00));
        assert_eq!(d.status, InvoiceStatus::Paid);
    }

    #[test]
    fn test_partial_payment() {
        let d = derive(&inputs(dec!(500.00), dec!(300.00)));
        assert_eq!(d.balance_due, dec!(200.00));
        assert_eq!(d.status, InvoiceStatus::Partial);
    }

    #[test]
    fn test_unpaid_sent() {
        let d = derive(&inputs(dec!(500.00), dec!(0)));
        assert_eq!(d.balance_due, dec!(500.00));
        assert_eq!(d.status, InvoiceStatus::Sent);
    }

    #[test]
    fn test_overdue() {
        let mut i = inputs(dec!(500.00), dec!(0));
        i.as_of = date(2026, 4, 15);
        let d = derive(&i);
        assert_eq!(d.status, InvoiceStatus::Overdue);
    }

    #[test]
    fn test_partial_wins_over_overdue() {
        // Priority order: partial is checked before overdue.
        let mut i = inputs(dec!(500.00), dec!(300.00));
        i.as_of = date(2026, 4, 15);
        let d = derive(&i);
        assert_eq!(d.status, InvoiceStatus::Partial);
    }

    #[test]
    fn test_open_dispute_excluded_and_status_disputed() {
        let mut i = inputs(dec!(500.00), dec!(0));
        i.open_dispute_amount = dec!(80.00);
        let d = derive(&i);
        assert_eq!(d.balance_due, dec!(420.00));
        assert_eq!(d.status, InvoiceStatus::Disputed);
    }

    #[test]
    fn test_disputed_wins_over_paid() {
        let mut i = inputs(dec!(500.00), dec!(500.00));
        i.open_dispute_amount = dec!(10.00);
        let d = derive(&i);
        assert_eq!(d.status, InvoiceStatus::Disputed);
    }

    #[test]
    fn test_waived_amount_reduces_balance() {
        let mut i = inputs(dec!(500.00), dec!(420.00));
        i.waived_amount = dec!(80.00);
        let d = derive(&i);
        assert_eq!(d.balance_due, dec!(0.00));
        assert_eq!(d.status, InvoiceStatus::Paid);
    }

    #[test]
    fn test_fully_waived_no_cash_is_not_paid() {
        // Paid requires paid_amount > 0; a fully-waived invoice with no
        // cash lands back on sent.
        let mut i = inputs(dec!(80.00), dec!(0));
        i.waived_amount = dec!(80.00);
        let d = derive(&i);
        assert_eq!(d.balance_due, dec!(0.00));
        assert_eq!(d.status, InvoiceStatus::Sent);
    }

    #[test]
    fn test_balance_clamped_at_zero() {
        let mut i = inputs(dec!(100.00), dec!(100.00));
        i.waived_amount = dec!(50.00);
        let d = derive(&i);
        assert_eq!(d.balance_due, dec!(0.00));
    }

    #[test]
    fn test_cancelled_preserved_with_zero_balance() {
        let mut i = inputs(dec!(500.00), dec!(100.00));
        i.status = InvoiceStatus::Cancelled;
        let d = derive(&i);
        assert_eq!(d.status, InvoiceStatus::Cancelled);
        assert_eq!(d.balance_due, Decimal::ZERO);
    }

    #[test]
    fn test_draft_status_preserved() {
        let mut i = inputs(dec!(500.00), dec!(0));
        i.status = InvoiceStatus::Draft;
        i.due_date = None;
        let d = derive(&i);
        assert_eq!(d.status, InvoiceStatus::Draft);
        assert_eq!(d.balance_due, dec!(500.00));
    }

    #[test]
    fn test_due_today_is_not_overdue() {
        let mut i = inputs(dec!(500.00), dec!(0));
        i.due_date = Some(date(2026, 3, 1));
        i.as_of = date(2026, 3, 1);
        let d = derive(&i);
        assert_eq!(d.status, InvoiceStatus::Sent);
    }
}
