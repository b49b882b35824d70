//! Expiry notifier.
//!
//! Mails a reminder when the booked transfer's quote will expire within the
//! configured threshold. Lookup, expiry-parse and delivery failures are
//! logged and end the check; nothing is retried.

use chrono::{DateTime, Duration, Utc};
use tracing::{debug, error, info, warn};

use crate::alerts::{reminder_body, Mailer, REMINDER_SUBJECT};
use crate::provider::TransferProvider;
use crate::strategy::rates::booked_transfer_with_quote;
use crate::types::WiselyResult;

/// What the expiry check did.
#[derive(Debug, Clone, PartialEq)]
pub enum ExpiryOutcome {
    /// Quote expires later than the threshold; nothing sent.
    NotDue {
        transfer_id: u64,
        expires_at: DateTime<Utc>,
    },
    /// Reminder delivered.
    Sent {
        transfer_id: u64,
        expires_at: DateTime<Utc>,
    },
    /// Reminder due but mail credentials are not configured.
    MailDisabled {
        transfer_id: u64,
        expires_at: DateTime<Utc>,
    },
    /// Lookup or delivery failed.
    Failed { reason: String },
}

/// True when less than `threshold` remains before `expires_at`.
pub fn reminder_due(expires_at: DateTime<Utc>, now: DateTime<Utc>, threshold: Duration) -> bool {
    expires_at - now < threshold
}

pub struct ExpiryNotifier<'a> {
    provider: &'a dyn TransferProvider,
    mailer: Option<&'a dyn Mailer>,
    threshold: Duration,
}

impl<'a> ExpiryNotifier<'a> {
    pub fn new(
        provider: &'a dyn TransferProvider,
        mailer: Option<&'a dyn Mailer>,
        threshold: Duration,
    ) -> Self {
        Self {
            provider,
            mailer,
            threshold,
        }
    }

    /// Check the booked transfer's quote and send a reminder if it is due.
    pub async fn send_expiry_reminder(&self, now: DateTime<Utc>) -> ExpiryOutcome {
        match self.check(now).await {
            Ok(outcome) => outcome,
            Err(e) => {
                error!(error = %e, "Expiry reminder check failed");
                ExpiryOutcome::Failed {
                    reason: e.to_string(),
                }
            }
        }
    }

    async fn check(&self, now: DateTime<Utc>) -> WiselyResult<ExpiryOutcome> {
        let (transfer, quote) = booked_transfer_with_quote(self.provider).await?;
        let expires_at = quote.expires_at()?;

        if !reminder_due(expires_at, now, self.threshold) {
            debug!(
                transfer_id = transfer.id,
                expires_at = %expires_at,
                hours_left = (expires_at - now).num_hours(),
                "Quote not close to expiry"
            );
            return Ok(ExpiryOutcome::NotDue {
                transfer_id: transfer.id,
                expires_at,
            });
        }

        let Some(mailer) = self.mailer else {
            warn!(
                transfer_id = transfer.id,
                expires_at = %expires_at,
                "Quote about to expire but TO_MAIL, FROM_MAIL, MAIL_PASS are not set"
            );
            return Ok(ExpiryOutcome::MailDisabled {
                transfer_id: transfer.id,
                expires_at,
            });
        };

        let body = reminder_body(&transfer, expires_at);
        mailer.send_html(REMINDER_SUBJECT, &body).await?;

        info!(
            transfer_id = transfer.id,
            expires_at = %expires_at,
            "Expiry reminder sent"
        );
        Ok(ExpiryOutcome::Sent {
            transfer_id: transfer.id,
            expires_at,
        })
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
