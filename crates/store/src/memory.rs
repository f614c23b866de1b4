//! Snapshot-transaction in-memory store.
//!
//! `begin` clones the live state; every read and write in the transaction
//! runs against that snapshot, so staged writes are visible to later reads
//! and nothing leaks to other readers before commit. `commit` validates that
//! every written row is still at the version the transaction started from,
//! then applies all writes and bumps versions. A losing writer gets
//! `CommitError::Conflict` and the live state is untouched, so a retry can
//! simply begin again.

use std::collections::BTreeMap;

use remita_core::allocation::Allocation;
use remita_core::credit::Credit;
use remita_core::dispute::Dispute;
use remita_core::invoice::{Invoice, InvoiceLineItem};
use remita_core::payment::Payment;
use remita_core::store::{CommitError, LedgerReader, LedgerTx};
use remita_shared::types::{
    AllocationId, ClientId, CreditId, DisputeId, InvoiceId, LineItemId, PaymentId,
};

/// Full ledger state, keyed per entity family.
#[derive(Debug, Clone, Default)]
struct LedgerState {
    invoices: BTreeMap<InvoiceId, Invoice>,
    payments: BTreeMap<PaymentId, Payment>,
    allocations: BTreeMap<AllocationId, Allocation>,
    credits: BTreeMap<CreditId, Credit>,
    disputes: BTreeMap<DisputeId, Dispute>,
}

impl LedgerState {
    fn invoice(&self, id: InvoiceId) -> Option<Invoice> {
        self.invoices.get(&id).cloned()
    }

    fn invoices(&self) -> Vec<Invoice> {
        self.invoices.values().cloned().collect()
    }

    fn invoices_for_client(&self, client_id: ClientId) -> Vec<Invoice> {
        self.invoices
            .values()
            .filter(|inv| inv.client_id == client_id)
            .cloned()
            .collect()
    }

    fn find_line_item(&self, id: LineItemId) -> Option<(Invoice, InvoiceLineItem)> {
        self.invoices.values().find_map(|inv| {
            inv.line_item(id)
                .map(|item| (inv.clone(), item.clone()))
        })
    }

    fn payment(&self, id: PaymentId) -> Option<Payment> {
        self.payments.get(&id).cloned()
    }

    fn payments(&self) -> Vec<Payment> {
        self.payments.values().cloned().collect()
    }

    fn allocations_for_payment(&self, id: PaymentId) -> Vec<Allocation> {
        self.allocations
            .values()
            .filter(|a| a.source.payment_id() == Some(id))
            .cloned()
            .collect()
    }

    fn allocations_for_credit(&self, id: CreditId) -> Vec<Allocation> {
        self.allocations
            .values()
            .filter(|a| a.source.credit_id() == Some(id))
            .cloned()
            .collect()
    }

    fn allocations_for_invoice(&self, id: InvoiceId) -> Vec<Allocation> {
        self.allocations
            .values()
            .filter(|a| a.invoice_id == id)
            .cloned()
            .collect()
    }

    fn credit(&self, id: CreditId) -> Option<Credit> {
        self.credits.get(&id).cloned()
    }

    fn credits(&self) -> Vec<Credit> {
        self.credits.values().cloned().collect()
    }

    fn credits_for_client(&self, client_id: ClientId) -> Vec<Credit> {
        self.credits
            .values()
            .filter(|c| c.client_id == client_id)
            .cloned()
            .collect()
    }

    fn dispute(&self, id: DisputeId) -> Option<Dispute> {
        self.disputes.get(&id).cloned()
    }

    fn disputes_for_invoice(&self, id: InvoiceId) -> Vec<Dispute> {
        self.disputes
            .values()
            .filter(|d| d.invoice_id == id)
            .cloned()
            .collect()
    }
}

/// Base versions of rows a transaction has written, captured at first write.
///
/// `None` means the row did not exist when the transaction first touched it.
#[derive(Debug, Default)]
struct DirtySet {
    invoices: BTreeMap<InvoiceId, Option<i64>>,
    payments: BTreeMap<PaymentId, Option<i64>>,
    credits: BTreeMap<CreditId, Option<i64>>,
    disputes: BTreeMap<DisputeId, Option<i64>>,
    allocations: Vec<AllocationId>,
}

/// In-memory ledger store with optimistic concurrency.
#[derive(Debug, Default)]
pub struct MemoryStore {
    state: LedgerState,
}

impl MemoryStore {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Begins a transaction over a snapshot of the current state.
    #[must_use]
    pub fn begin(&self) -> MemoryTx {
        MemoryTx {
            snapshot: self.state.clone(),
            dirty: DirtySet::default(),
        }
    }

    /// Commits a transaction, all writes or none.
    ///
    /// # Errors
    ///
    /// Returns `CommitError::Conflict` if any written row was committed by
    /// another transaction since this one began; the store is unchanged.
    pub fn commit(&mut self, tx: MemoryTx) -> Result<(), CommitError> {
        // Validate everything before applying anything.
        Self::check_versions(
            &self.state.invoices,
            &tx.dirty.invoices,
            "invoice",
            |row| row.version,
        )?;
        Self::check_versions(
            &self.state.payments,
            &tx.dirty.payments,
            "payment",
            |row| row.version,
        )?;
        Self::check_versions(&self.state.credits, &tx.dirty.credits, "credit", |row| {
            row.version
        })?;
        Self::check_versions(
            &self.state.disputes,
            &tx.dirty.disputes,
            "dispute",
            |row| row.version,
        )?;
        for id in &tx.dirty.allocations {
            if self.state.allocations.contains_key(id) {
                tracing::warn!(entity = "allocation", id = %id, "optimistic commit conflict");
                return Err(CommitError::Conflict {
                    entity: "allocation",
                    id: id.to_string(),
                });
            }
        }

        let written = tx.dirty.invoices.len()
            + tx.dirty.payments.len()
            + tx.dirty.credits.len()
            + tx.dirty.disputes.len()
            + tx.dirty.allocations.len();

        Self::apply(
            &mut self.state.invoices,
            &tx.snapshot.invoices,
            &tx.dirty.invoices,
            |row, version| row.version = version,
        );
        Self::apply(
            &mut self.state.payments,
            &tx.snapshot.payments,
            &tx.dirty.payments,
            |row, version| row.version = version,
        );
        Self::apply(
            &mut self.state.credits,
            &tx.snapshot.credits,
            &tx.dirty.credits,
            |row, version| row.version = version,
        );
        Self::apply(
            &mut self.state.disputes,
            &tx.snapshot.disputes,
            &tx.dirty.disputes,
            |row, version| row.version = version,
        );
        for id in &tx.dirty.allocations {
            if let Some(allocation) = tx.snapshot.allocations.get(id) {
                self.state.allocations.insert(*id, allocation.clone());
            }
        }

        tracing::debug!(rows = written, "transaction committed");
        Ok(())
    }

    fn check_versions<K, V>(
        live: &BTreeMap<K, V>,
        dirty: &BTreeMap<K, Option<i64>>,
        entity: &'static str,
        version_of: impl Fn(&V) -> i64,
    ) -> Result<(), CommitError>
    where
        K: Ord + Copy + std::fmt::Display,
    {
        for (id, base) in dirty {
            let live_version = live.get(id).map(&version_of);
            if live_version != *base {
                tracing::warn!(entity, id = %id, "optimistic commit conflict");
                return Err(CommitError::Conflict {
                    entity,
                    id: id.to_string(),
                });
            }
        }
        Ok(())
    }

    fn apply<K, V>(
        live: &mut BTreeMap<K, V>,
        staged: &BTreeMap<K, V>,
        dirty: &BTreeMap<K, Option<i64>>,
        set_version: impl Fn(&mut V, i64),
    ) where
        K: Ord + Copy,
        V: Clone,
    {
        for (id, base) in dirty {
            if let Some(staged_row) = staged.get(id) {
                let mut row = staged_row.clone();
                set_version(&mut row, base.unwrap_or(0) + 1);
                live.insert(*id, row);
            }
        }
    }
}

impl LedgerReader for MemoryStore {
    fn invoice(&self, id: InvoiceId) -> Option<Invoice> {
        self.state.invoice(id)
    }

    fn invoices(&self) -> Vec<Invoice> {
        self.state.invoices()
    }

    fn invoices_for_client(&self, client_id: ClientId) -> Vec<Invoice> {
        self.state.invoices_for_client(client_id)
    }

    fn find_line_item(&self, id: LineItemId) -> Option<(Invoice, InvoiceLineItem)> {
        self.state.find_line_item(id)
    }

    fn payment(&self, id: PaymentId) -> Option<Payment> {
        self.state.payment(id)
    }

    fn payments(&self) -> Vec<Payment> {
        self.state.payments()
    }

    fn allocations_for_payment(&self, id: PaymentId) -> Vec<Allocation> {
        self.state.allocations_for_payment(id)
    }

    fn allocations_for_credit(&self, id: CreditId) -> Vec<Allocation> {
        self.state.allocations_for_credit(id)
    }

    fn allocations_for_invoice(&self, id: InvoiceId) -> Vec<Allocation> {
        self.state.allocations_for_invoice(id)
    }

    fn credit(&self, id: CreditId) -> Option<Credit> {
        self.state.credit(id)
    }

    fn credits(&self) -> Vec<Credit> {
        self.state.credits()
    }

    fn credits_for_client(&self, client_id: ClientId) -> Vec<Credit> {
        self.state.credits_for_client(client_id)
    }

    fn dispute(&self, id: DisputeId) -> Option<Dispute> {
        self.state.dispute(id)
    }

    fn disputes_for_invoice(&self, id: InvoiceId) -> Vec<Dispute> {
        self.state.disputes_for_invoice(id)
    }
}

/// A transaction over a snapshot of the store.
#[derive(Debug)]
pub struct MemoryTx {
    snapshot: LedgerState,
    dirty: DirtySet,
}

impl MemoryTx {
    fn stage_invoice(&mut self, invoice: Invoice) {
        if !self.dirty.invoices.contains_key(&invoice.id) {
            let base = self.snapshot.invoices.get(&invoice.id).map(|row| row.version);
            self.dirty.invoices.insert(invoice.id, base);
        }
        self.snapshot.invoices.insert(invoice.id, invoice);
    }

    fn stage_payment(&mut self, payment: Payment) {
        if !self.dirty.payments.contains_key(&payment.id) {
            let base = self.snapshot.payments.get(&payment.id).map(|row| row.version);
            self.dirty.payments.insert(payment.id, base);
        }
        self.snapshot.payments.insert(payment.id, payment);
    }

    fn stage_credit(&mut self, credit: Credit) {
        if !self.dirty.credits.contains_key(&credit.id) {
            let base = self.snapshot.credits.get(&credit.id).map(|row| row.version);
            self.dirty.credits.insert(credit.id, base);
        }
        self.snapshot.credits.insert(credit.id, credit);
    }

    fn stage_dispute(&mut self, dispute: Dispute) {
        if !self.dirty.disputes.contains_key(&dispute.id) {
            let base = self.snapshot.disputes.get(&dispute.id).map(|row| row.version);
            self.dirty.disputes.insert(dispute.id, base);
        }
        self.snapshot.disputes.insert(dispute.id, dispute);
    }
}

impl LedgerReader for MemoryTx {
    fn invoice(&self, id: InvoiceId) -> Option<Invoice> {
        self.snapshot.invoice(id)
    }

    fn invoices(&self) -> Vec<Invoice> {
        self.snapshot.invoices()
    }

    fn invoices_for_client(&self, client_id: ClientId) -> Vec<Invoice> {
        self.snapshot.invoices_for_client(client_id)
    }

    fn find_line_item(&self, id: LineItemId) -> Option<(Invoice, InvoiceLineItem)> {
        self.snapshot.find_line_item(id)
    }

    fn payment(&self, id: PaymentId) -> Option<Payment> {
        self.snapshot.payment(id)
    }

    fn payments(&self) -> Vec<Payment> {
        self.snapshot.payments()
    }

    fn allocations_for_payment(&self, id: PaymentId) -> Vec<Allocation> {
        self.snapshot.allocations_for_payment(id)
    }

    fn allocations_for_credit(&self, id: CreditId) -> Vec<Allocation> {
        self.snapshot.allocations_for_credit(id)
    }

    fn allocations_for_invoice(&self, id: InvoiceId) -> Vec<Allocation> {
        self.snapshot.allocations_for_invoice(id)
    }

    fn credit(&self, id: CreditId) -> Option<Credit> {
        self.snapshot.credit(id)
    }

    fn credits(&self) -> Vec<Credit> {
        self.snapshot.credits()
    }

    fn credits_for_client(&self, client_id: ClientId) -> Vec<Credit> {
        self.snapshot.credits_for_client(client_id)
    }

    fn dispute(&self, id: DisputeId) -> Option<Dispute> {
        self.snapshot.dispute(id)
    }

    fn disputes_for_invoice(&self, id: InvoiceId) -> Vec<Dispute> {
        self.snapshot.disputes_for_invoice(id)
    }
}

impl LedgerTx for MemoryTx {
    fn insert_invoice(&mut self, invoice: Invoice) {
        self.stage_invoice(invoice);
    }

    fn update_invoice(&mut self, invoice: Invoice) {
        self.stage_invoice(invoice);
    }

    fn insert_payment(&mut self, payment: Payment) {
        self.stage_payment(payment);
    }

    fn update_payment(&mut self, payment: Payment) {
        self.stage_payment(payment);
    }

    fn insert_allocation(&mut self, allocation: Allocation) {
        self.dirty.allocations.push(allocation.id);
        self.snapshot.allocations.insert(allocation.id, allocation);
    }

    fn insert_credit(&mut self, credit: Credit) {
        self.stage_credit(credit);
    }

    fn update_credit(&mut self, credit: Credit) {
        self.stage_credit(credit);
    }

    fn insert_dispute(&mut self, dispute: Dispute) {
        self.stage_dispute(dispute);
    }

    fn update_dispute(&mut self, dispute: Dispute) {
        self.stage_dispute(dispute);
    }
}
