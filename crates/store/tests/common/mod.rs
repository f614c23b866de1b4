//! Shared fixtures for engine integration tests.

// Not every test binary uses every helper.
#![allow(dead_code)]

use chrono::{DateTime, NaiveDate, TimeZone, Utc};
use remita_core::invoice::Invoice;
use remita_core::payment::{Payment, PaymentMethod};
use remita_core::store::{LedgerReader, LedgerTx};
use remita_store::MemoryStore;
use remita_shared::types::{ClientId, OrganizationId};
use rust_decimal::Decimal;

/// A seeded organization/client pair.
pub struct Fixture {
    pub organization_id: OrganizationId,
    pub client_id: ClientId,
}

impl Fixture {
    pub fn new() -> Self {
        Self {
            organization_id: OrganizationId::new(),
            client_id: ClientId::new(),
        }
    }

    /// Builds and commits a sent invoice with one line item per amount.
    pub fn sent_invoice(
        &self,
        store: &mut MemoryStore,
        line_amounts: &[Decimal],
        issue_date: NaiveDate,
        due_date: NaiveDate,
    ) -> Invoice {
        let mut invoice = Invoice::new_draft(self.organization_id, self.client_id);
        for (i, amount) in line_amounts.iter().enumerate() {
            invoice
                .add_line_item(format!("Lab panel {}", i + 1), Decimal::ONE, *amount)
                .expect("draft accepts line items");
        }
        invoice.finalize().expect("finalize");
        invoice.send(issue_date, due_date).expect("send");

        let mut tx = store.begin();
        tx.insert_invoice(invoice.clone());
        store.commit(tx).expect("seed invoice");
        store
            .invoice(invoice.id)
            .expect("committed invoice readable")
    }

    /// Records and commits an unposted payment.
    pub fn payment(&self, store: &mut MemoryStore, amount: Decimal) -> Payment {
        let payment = Payment::new(
            self.organization_id,
            self.client_id,
            amount,
            PaymentMethod::Check,
            None,
            now(),
        );
        let mut tx = store.begin();
        tx.insert_payment(payment.clone());
        store.commit(tx).expect("seed payment");
        store
            .payment(payment.id)
            .expect("committed payment readable")
    }
}

/// Fixed reference instant for deterministic tests: 2026-03-15 12:00 UTC.
pub fn now() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2026, 3, 15, 12, 0, 0).unwrap()
}

/// Reference date matching [`now`].
pub fn today() -> NaiveDate {
    now().date_naive()
}

pub fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}
