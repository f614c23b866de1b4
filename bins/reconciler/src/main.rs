//! Remita reconciliation job.
//!
//! Intended to run from cron: expires lapsed credits, sweeps the ledger for
//! integrity violations, and emits the reconciliation report as JSON on
//! stdout. Runs against a demo in-memory ledger; a deployment wires the same
//! calls to its own store.
//!
//! Usage: cargo run --bin reconciler

use anyhow::Context;
use chrono::{Days, Utc};
use rust_decimal_macros::dec;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use remita_core::allocation::{AllocationEngine, AllocationTarget, CloseOut};
use remita_core::credit::CreditManager;
use remita_core::dispute::DisputeAdjuster;
use remita_core::invoice::Invoice;
use remita_core::payment::{Payment, PaymentMethod};
use remita_core::reconciliation::{IntegrityChecker, ReconciliationService};
use remita_core::store::LedgerTx;
use remita_shared::types::{ClientId, OrganizationId};
use remita_shared::{AppConfig, AppError};
use remita_store::MemoryStore;

fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "remita=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let config = AppConfig::load().context("failed to load configuration")?;
    let now = Utc::now();
    let today = now.date_naive();

    let mut store = seed_demo_ledger(&config)?;

    // Expiry sweep.
    let mut tx = store.begin();
    let expired = CreditManager::expire_credits(&mut tx, today);
    store
        .commit(tx)
        .map_err(AppError::from)
        .context("expiry sweep commit failed")?;
    info!(count = expired.len(), "credit expiry sweep finished");

    // Integrity sweep: violations are incidents, never auto-corrected.
    let violations = IntegrityChecker::check(&store, today);
    for violation in &violations {
        warn!(%violation, "ledger integrity violation");
    }
    info!(count = violations.len(), "integrity sweep finished");

    let report = ReconciliationService::report(&store, today);
    let rendered = if config.reconciler.pretty {
        serde_json::to_string_pretty(&report)?
    } else {
        serde_json::to_string(&report)?
    };
    println!("{rendered}");
    Ok(())
}

/// Seeds a small ledger exercising every engine path: a paid invoice, a
/// partial payment, an overpayment closed out to credit, and an open
/// dispute.
fn seed_demo_ledger(config: &AppConfig) -> anyhow::Result<MemoryStore> {
    let mut store = MemoryStore::new();
    let organization_id = OrganizationId::new();
    let client_id = ClientId::new();
    let now = Utc::now();
    let today = now.date_naive();
    let issued = today
        .checked_sub_days(Days::new(45))
        .context("demo issue date")?;
    let due = issued
        .checked_add_days(Days::new(30))
        .context("demo due date")?;
    let credit_expiry = today
        .checked_add_days(Days::new(u64::from(config.ledger.credit_expiry_days)))
        .context("credit expiry date")?;

    let mut tx = store.begin();

    let build_invoice = |amounts: &[rust_decimal::Decimal]| -> anyhow::Result<Invoice> {
        let mut invoice = Invoice::new_draft(organization_id, client_id);
        for (i, amount) in amounts.iter().enumerate() {
            invoice
                .add_line_item(
                    format!("Lab panel {}", i + 1),
                    rust_decimal::Decimal::ONE,
                    *amount,
                )
                .map_err(|e| anyhow::anyhow!(e))?;
        }
        invoice.finalize().map_err(|e| anyhow::anyhow!(e))?;
        invoice.send(issued, due).map_err(|e| anyhow::anyhow!(e))?;
        Ok(invoice)
    };

    let settled = build_invoice(&[dec!(350.00), dec!(150.00)])?;
    let outstanding = build_invoice(&[dec!(300.00)])?;
    let contested = build_invoice(&[dec!(80.00), dec!(120.00)])?;
    for invoice in [&settled, &outstanding, &contested] {
        tx.insert_invoice(invoice.clone());
    }

    let record_payment = |amount: rust_decimal::Decimal| {
        Payment::new(
            organization_id,
            client_id,
            amount,
            PaymentMethod::Ach,
            None,
            now,
        )
    };
    let overpaid = record_payment(dec!(550.00));
    let partial = record_payment(dec!(100.00));
    tx.insert_payment(overpaid.clone());
    tx.insert_payment(partial.clone());

    // Overpayment: settles the first invoice, remainder becomes a credit.
    AllocationEngine::allocate(
        &mut tx,
        overpaid.id,
        &[AllocationTarget {
            invoice_id: settled.id,
            line_item_id: None,
            amount: dec!(500.00),
        }],
        CloseOut::CreditRemainder {
            expires_at: Some(credit_expiry),
        },
        now,
    )
    .map_err(|e| anyhow::anyhow!(e))?;

    // Partial payment against the outstanding invoice.
    AllocationEngine::allocate(
        &mut tx,
        partial.id,
        &[AllocationTarget {
            invoice_id: outstanding.id,
            line_item_id: None,
            amount: dec!(100.00),
        }],
        CloseOut::Hold,
        now,
    )
    .map_err(|e| anyhow::anyhow!(e))?;

    // Open dispute on the contested invoice's first line.
    DisputeAdjuster::file_dispute(
        &mut tx,
        contested.line_items[0].id,
        dec!(80.00),
        "panel billed twice",
        now,
    )
    .map_err(|e| anyhow::anyhow!(e))?;

    store
        .commit(tx)
        .map_err(AppError::from)
        .context("demo ledger commit failed")?;
    info!("demo ledger seeded");
    Ok(store)
}
