//! One scheduled run: compare → (maybe) rebook, then the expiry check.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use tracing::{error, info, warn};

use super::expiry::{ExpiryNotifier, ExpiryOutcome};
use super::rebooker::{RebookOutcome, Rebooker};
use crate::alerts::Mailer;
use crate::config::AppConfig;
use crate::provider::TransferProvider;
use crate::strategy::rates::RateComparator;
use crate::strategy::RateDecision;
use crate::types::{Transfer, WiselyResult};

/// Result of the rebooking half of a run.
#[derive(Debug, Clone, PartialEq)]
pub enum CycleReport {
    /// Live rate not good enough; booked transfer kept.
    NoAction { transfer: Transfer, live_rate: Decimal },
    /// A replacement transfer was booked.
    Rebooked(RebookOutcome),
}

/// Everything a run did, for logging and tests.
#[derive(Debug, Clone, PartialEq)]
pub struct RunReport {
    /// `None` when the rebooking pass failed (already logged).
    pub rebooking: Option<CycleReport>,
    pub expiry: ExpiryOutcome,
}

/// Compare the booked rate with the live rate and rebook if it pays off.
pub async fn check_and_process(
    provider: &dyn TransferProvider,
    margin: Decimal,
) -> WiselyResult<CycleReport> {
    let decision = RateComparator::new(provider, margin).compare_rates().await?;

    match decision {
        RateDecision::Hold {
            transfer,
            live_rate,
        } => Ok(CycleReport::NoAction {
            transfer,
            live_rate,
        }),
        RateDecision::Rebook { transfer, .. } => {
            let outcome = Rebooker::new(provider).create_transfer(&transfer).await?;
            Ok(CycleReport::Rebooked(outcome))
        }
    }
}

/// Run one full pass. Never fails; every error is logged.
pub async fn run_once(
    provider: &dyn TransferProvider,
    mailer: Option<&dyn Mailer>,
    cfg: &AppConfig,
    now: DateTime<Utc>,
) -> RunReport {
    let rebooking = match check_and_process(provider, cfg.margin).await {
        Ok(report) => {
            log_cycle_report(&report);
            Some(report)
        }
        Err(e) => {
            error!(error = %e, "Rate check failed");
            None
        }
    };

    let expiry = ExpiryNotifier::new(provider, mailer, cfg.expiry_threshold())
        .send_expiry_reminder(now)
        .await;

    RunReport { rebooking, expiry }
}

fn log_cycle_report(report: &CycleReport) {
    match report {
        CycleReport::NoAction {
            transfer,
            live_rate,
        } => info!(
            live_rate = %live_rate,
            transfer_id = transfer.id,
            pair = %transfer.pair(),
            booked_rate = %transfer.rate,
            amount = %transfer.source_amount,
            "No action needed"
        ),
        CycleReport::Rebooked(outcome) => {
            let t = outcome.new_transfer();
            info!(
                transfer_id = t.id,
                pair = %t.pair(),
                rate = %t.rate,
                amount = %t.source_amount,
                "New transfer booked"
            );
            if let RebookOutcome::OldTransferStillOpen {
                old_transfer_id, ..
            } = outcome
            {
                warn!(
                    old_transfer_id = *old_transfer_id,
                    "Old transfer still open; cancel it manually"
                );
            }
        }
    }
}
