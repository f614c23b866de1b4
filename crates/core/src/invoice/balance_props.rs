//! Property-based tests for balance derivation.
//!
//! - Balance formula: `balance_due == max(0, total - paid - open - waived)`
//! - Derivation is deterministic: repeated recalculation over unchanged
//!   state cannot drift
//! - Status priority is total and consistent with the balance

use chrono::NaiveDate;
use proptest::prelude::*;
use rust_decimal::Decimal;

use super::balance::{derive, BalanceInputs};
use super::types::InvoiceStatus;

/// Strategy for monetary amounts (0.00 to 100,000.00).
fn amount() -> impl Strategy<Value = Decimal> {
    (0i64..10_000_000i64).prop_map(|cents| Decimal::new(cents, 2))
}

/// Strategy for a reference date within a plausible billing window.
fn day_offset() -> impl Strategy<Value = NaiveDate> {
    (0i64..720i64).prop_map(|d| {
        NaiveDate::from_ymd_opt(2025, 1, 1).unwrap() + chrono::Duration::days(d)
    })
}

fn issued_inputs(
    total: Decimal,
    paid: Decimal,
    open: Decimal,
    waived: Decimal,
    due: NaiveDate,
    as_of: NaiveDate,
) -> BalanceInputs {
    BalanceInputs {
        status: InvoiceStatus::Sent,
        total_amount: total,
        paid_amount: paid,
        open_dispute_amount: open,
        waived_amount: waived,
        due_date: Some(due),
        as_of,
    }
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(256))]

    /// Balance formula holds for any combination of inputs.
    #[test]
    fn prop_balance_formula(
        total in amount(),
        paid in amount(),
        open in amount(),
        waived in amount(),
        due in day_offset(),
        as_of in day_offset(),
    ) {
        let d = derive(&issued_inputs(total, paid, open, waived, due, as_of));
        let expected = (total - paid - open - waived).max(Decimal::ZERO);
        prop_assert_eq!(d.balance_due, expected);
    }

    /// Balance due is never negative.
    #[test]
    fn prop_balance_never_negative(
        total in amount(),
        paid in amount(),
        open in amount(),
        waived in amount(),
        due in day_offset(),
        as_of in day_offset(),
    ) {
        let d = derive(&issued_inputs(total, paid, open, waived, due, as_of));
        prop_assert!(d.balance_due >= Decimal::ZERO);
    }

    /// Derivation is a pure function: two runs over the same inputs agree.
    #[test]
    fn prop_derivation_deterministic(
        total in amount(),
        paid in amount(),
        open in amount(),
        due in day_offset(),
        as_of in day_offset(),
    ) {
        let inputs = issued_inputs(total, paid, open, Decimal::ZERO, due, as_of);
        let first = derive(&inputs);
        let second = derive(&inputs);
        prop_assert_eq!(first, second);
    }

    /// Any open dispute forces disputed status, regardless of payments.
    #[test]
    fn prop_open_dispute_dominates(
        total in amount(),
        paid in amount(),
        open in (1i64..1_000_000i64).prop_map(|c| Decimal::new(c, 2)),
        due in day_offset(),
        as_of in day_offset(),
    ) {
        let d = derive(&issued_inputs(total, paid, open, Decimal::ZERO, due, as_of));
        prop_assert_eq!(d.status, InvoiceStatus::Disputed);
    }

    /// Without disputes, a zero balance with cash received is always paid.
    #[test]
    fn prop_zero_balance_with_cash_is_paid(
        total in (1i64..1_000_000i64).prop_map(|c| Decimal::new(c, 2)),
        due in day_offset(),
        as_of in day_offset(),
    ) {
        let d = derive(&issued_inputs(
            total,
            total,
            Decimal::ZERO,
            Decimal::ZERO,
            due,
            as_of,
        ));
        prop_assert_eq!(d.status, InvoiceStatus::Paid);
        prop_assert_eq!(d.balance_due, Decimal::ZERO);
    }

    /// Cancelled invoices always derive a zero balance and stay cancelled.
    #[test]
    fn prop_cancelled_is_sticky(
        total in amount(),
        paid in amount(),
        due in day_offset(),
        as_of in day_offset(),
    ) {
        let mut inputs = issued_inputs(total, paid, Decimal::ZERO, Decimal::ZERO, due, as_of);
        inputs.status = InvoiceStatus::Cancelled;
        let d = derive(&inputs);
        prop_assert_eq!(d.status, InvoiceStatus::Cancelled);
        prop_assert_eq!(d.balance_due, Decimal::ZERO);
    }
}
