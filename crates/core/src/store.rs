//! Abstract storage boundary for the ledger engines.
//!
//! The engines never touch a concrete database client. Every operation
//! receives a transaction handle (`&mut dyn LedgerTx`) injected by the
//! caller: reads observe writes staged earlier in the same transaction, and
//! nothing becomes visible to other readers until the handle is committed by
//! the owning store. A store detects conflicting committed writes via the
//! per-entity `version` counters and refuses the commit, which surfaces to
//! callers as a retryable concurrency error.

use remita_shared::types::{ClientId, CreditId, DisputeId, InvoiceId, LineItemId, PaymentId};
use remita_shared::AppError;
use thiserror::Error;

use crate::allocation::Allocation;
use crate::credit::Credit;
use crate::dispute::Dispute;
use crate::invoice::{Invoice, InvoiceLineItem};
use crate::payment::Payment;

/// Read access over ledger state.
///
/// Implementations return owned snapshots; list methods return rows in a
/// deterministic order (ascending id) so callers can rely on reproducible
/// iteration without re-sorting.
pub trait LedgerReader {
    /// Looks up an invoice by id.
    fn invoice(&self, id: InvoiceId) -> Option<Invoice>;

    /// All invoices, ascending by id.
    fn invoices(&self) -> Vec<Invoice>;

    /// All invoices belonging to a client, ascending by id.
    fn invoices_for_client(&self, client_id: ClientId) -> Vec<Invoice>;

    /// Finds a line item and its parent invoice.
    fn find_line_item(&self, id: LineItemId) -> Option<(Invoice, InvoiceLineItem)>;

    /// Looks up a payment by id.
    fn payment(&self, id: PaymentId) -> Option<Payment>;

    /// All payments, ascending by id.
    fn payments(&self) -> Vec<Payment>;

    /// Allocations funded by a payment, ascending by id.
    fn allocations_for_payment(&self, id: PaymentId) -> Vec<Allocation>;

    /// Allocations funded by a credit, ascending by id.
    fn allocations_for_credit(&self, id: CreditId) -> Vec<Allocation>;

    /// Allocations targeting an invoice (any source), ascending by id.
    fn allocations_for_invoice(&self, id: InvoiceId) -> Vec<Allocation>;

    /// Looks up a credit by id.
    fn credit(&self, id: CreditId) -> Option<Credit>;

    /// All credits, ascending by id.
    fn credits(&self) -> Vec<Credit>;

    /// All credits belonging to a client, ascending by id.
    fn credits_for_client(&self, client_id: ClientId) -> Vec<Credit>;

    /// Looks up a dispute by id.
    fn dispute(&self, id: DisputeId) -> Option<Dispute>;

    /// Disputes targeting an invoice's line items, ascending by id.
    fn disputes_for_invoice(&self, id: InvoiceId) -> Vec<Dispute>;
}

/// Staged write access within a single transaction.
///
/// Writes are buffered against the transaction's snapshot; the engines rely
/// on read-your-writes semantics when recalculating balances after staging
/// allocation or dispute rows.
pub trait LedgerTx: LedgerReader {
    /// Stages a new invoice.
    fn insert_invoice(&mut self, invoice: Invoice);

    /// Stages an update to an existing invoice.
    fn update_invoice(&mut self, invoice: Invoice);

    /// Stages a new payment.
    fn insert_payment(&mut self, payment: Payment);

    /// Stages an update to an existing payment.
    fn update_payment(&mut self, payment: Payment);

    /// Stages a new allocation row. Allocations are append-only.
    fn insert_allocation(&mut self, allocation: Allocation);

    /// Stages a new credit.
    fn insert_credit(&mut self, credit: Credit);

    /// Stages an update to an existing credit.
    fn update_credit(&mut self, credit: Credit);

    /// Stages a new dispute.
    fn insert_dispute(&mut self, dispute: Dispute);

    /// Stages an update to an existing dispute.
    fn update_dispute(&mut self, dispute: Dispute);
}

/// Errors surfaced when committing a transaction.
#[derive(Debug, Error)]
pub enum CommitError {
    /// Another writer committed a conflicting change first.
    #[error("Concurrent modification of {entity} {id}, please retry")]
    Conflict {
        /// Entity family name (e.g. "invoice").
        entity: &'static str,
        /// Display form of the conflicting entity id.
        id: String,
    },

    /// Storage-level failure.
    #[error("Storage error: {0}")]
    Storage(String),
}

impl CommitError {
    /// Returns true if the caller should re-read state and retry.
    #[must_use]
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Conflict { .. })
    }
}

impl From<CommitError> for AppError {
    fn from(err: CommitError) -> Self {
        match err {
            CommitError::Conflict { .. } => Self::Conflict(err.to_string()),
            CommitError::Storage(msg) => Self::Storage(msg),
        }
    }
}
