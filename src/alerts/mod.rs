//! Outbound notifications.
//!
//! Defines the `Mailer` trait and the reminder message sent when a booked
//! transfer's quote is about to expire. [`smtp::SmtpMailer`] delivers it.

pub mod smtp;

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::types::{Transfer, WiselyResult};

/// Subject line of the expiry reminder.
pub const REMINDER_SUBJECT: &str = "Reminder: Your transfer is about to expire";

/// Delivers HTML mail to the configured recipient.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait Mailer: Send + Sync {
    async fn send_html(&self, subject: &str, html_body: &str) -> WiselyResult<()>;
}

/// HTML body of the expiry reminder for `transfer`.
pub fn reminder_body(transfer: &Transfer, expires_at: DateTime<Utc>) -> String {
    format!(
        "<h4>&#128184; The following transfer is going to expire on <b>{}</b></h4>\
         <ul> <li>Transfer ID: {} </li> <li> {{{}}} --> {{{}}} </li> <li> Booked Rate: {} </li> \
         <li> Amount: {} {} </li> </ul>",
        expires_at.format("%Y-%m-%d %H:%M:%S UTC"),
        transfer.id,
        transfer.source_currency,
        transfer.target_currency,
        transfer.rate,
        transfer.source_currency,
        transfer.source_amount,
    )
}
