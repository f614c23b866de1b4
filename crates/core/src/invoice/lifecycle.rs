//! Invoice lifecycle transitions.
//!
//! Invoices move `Draft -> Finalized -> Sent`, after which status is derived
//! by the recalculator. Cancellation is allowed from any non-paid state as
//! long as nothing has been allocated against the invoice. These are pure
//! operations on the invoice value; persistence is the caller's concern.

use chrono::NaiveDate;
use remita_shared::types::LineItemId;
use rust_decimal::Decimal;

use super::error::InvoiceError;
use super::types::{Invoice, InvoiceLineItem, InvoiceStatus};

impl Invoice {
    /// Adds a line item to a draft invoice.
    ///
    /// # Errors
    ///
    /// Returns `LineItemsLocked` if the invoice is no longer a draft, or
    /// `NonPositiveLine` for zero/negative quantity or unit price.
    pub fn add_line_item(
        &mut self,
        description: impl Into<String>,
        quantity: Decimal,
        unit_price: Decimal,
    ) -> Result<LineItemId, InvoiceError> {
        if !self.status.is_editable() {
            return Err(InvoiceError::LineItemsLocked(self.status));
        }
        if quantity <= Decimal::ZERO || unit_price <= Decimal::ZERO {
            return Err(InvoiceError::NonPositiveLine);
        }

        let item = InvoiceLineItem::new(description, quantity, unit_price);
        let id = item.id;
        self.line_items.push(item);
        self.total_amount = self.compute_total();
        self.balance_due = self.total_amount;
        Ok(id)
    }

    /// Soft-deletes a line item on a draft invoice.
    ///
    /// The row is retained for audit and excluded from totals.
    pub fn remove_line_item(&mut self, id: LineItemId) -> Result<(), InvoiceError> {
        if !self.status.is_editable() {
            return Err(InvoiceError::LineItemsLocked(self.status));
        }

        let item = self
            .line_items
            .iter_mut()
            .find(|li| li.id == id)
            .ok_or(InvoiceError::LineItemNotFound(id))?;
        item.is_deleted = true;
        self.total_amount = self.compute_total();
        self.balance_due = self.total_amount;
        Ok(())
    }

    /// Finalizes a draft invoice, locking line items and prices.
    pub fn finalize(&mut self) -> Result<(), InvoiceError> {
        if self.status != InvoiceStatus::Draft {
            return Err(InvoiceError::InvalidTransition {
                from: self.status,
                to: InvoiceStatus::Finalized,
            });
        }
        if self.active_line_items().count() == 0 {
            return Err(InvoiceError::EmptyInvoice);
        }
        if self.compute_total() <= Decimal::ZERO {
            return Err(InvoiceError::ZeroTotal);
        }

        self.total_amount = self.compute_total();
        self.balance_due = self.total_amount;
        self.status = InvoiceStatus::Finalized;
        Ok(())
    }

    /// Issues a finalized invoice to the client.
    pub fn send(&mut self, issue_date: NaiveDate, due_date: NaiveDate) -> Result<(), InvoiceError> {
        if self.status != InvoiceStatus::Finalized {
            return Err(InvoiceError::InvalidTransition {
                from: self.status,
                to: InvoiceStatus::Sent,
            });
        }
        if due_date < issue_date {
            return Err(InvoiceError::DueBeforeIssue {
                issue: issue_date,
                due: due_date,
            });
        }

        self.issue_date = Some(issue_date);
        self.due_date = Some(due_date);
        self.status = InvoiceStatus::Sent;
        Ok(())
    }

    /// Cancels the invoice.
    ///
    /// `has_allocations` is established by the caller from stored state;
    /// invoices with money allocated against them cannot be cancelled.
    pub fn cancel(&mut self, has_allocations: bool) -> Result<(), InvoiceError> {
        if matches!(self.status, InvoiceStatus::Paid | InvoiceStatus::Cancelled) {
            return Err(InvoiceError::InvalidTransition {
                from: self.status,
                to: InvoiceStatus::Cancelled,
            });
        }
        if has_allocations {
            return Err(InvoiceError::CancelWithAllocations(self.id));
        }

        self.status = InvoiceStatus::Cancelled;
        self.balance_due = Decimal::ZERO;
        Ok(())
    }
}
