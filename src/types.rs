//! Shared types for the Transferwisely job.
//!
//! These mirror the provider's JSON records and are deserialized straight
//! from response bodies at the HTTP boundary. Only the fields the rebooking
//! and reminder logic need are modelled.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// Payout method that determines a quote's canonical source amount.
pub const BANK_TRANSFER_PAYOUT: &str = "BANK_TRANSFER";

/// Transfer status meaning "booked, waiting for the customer's payment".
pub const PENDING_STATUS: &str = "incoming_payment_waiting";

// ---------------------------------------------------------------------------
// Transfer
// ---------------------------------------------------------------------------

/// A provider-side transfer booking.
///
/// The list endpoint does not report `sourceAmount` or `profile`; both are
/// filled in from the transfer's quote once it has been selected.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Transfer {
    pub id: u64,
    #[serde(default)]
    pub profile: u64,
    pub target_account: u64,
    #[serde(default)]
    pub source_amount: Decimal,
    /// Exchange rate locked in by the transfer's quote.
    pub rate: Decimal,
    #[serde(default)]
    pub quote_uuid: String,
    pub source_currency: String,
    pub target_currency: String,
    #[serde(default)]
    pub details: TransferDetails,
}

impl Transfer {
    /// Currency pair rendered as `{SRC} --> {TGT}`.
    pub fn pair(&self) -> String {
        format!("{{{}}} --> {{{}}}", self.source_currency, self.target_currency)
    }

    /// Helper to build a test/sample EUR→USD transfer.
    #[cfg(test)]
    pub fn sample(id: u64, rate: Decimal) -> Self {
        Transfer {
            id,
            profile: 0,
            target_account: 555,
            source_amount: Decimal::ZERO,
            rate,
            quote_uuid: format!("q-{id}"),
            source_currency: "EUR".to_string(),
            target_currency: "USD".to_string(),
            details: TransferDetails {
                reference: "rent".to_string(),
                transfer_purpose: "verification.transfers.purpose.pay.bills".to_string(),
                source_of_funds: "verification.source.of.funds.salary".to_string(),
            },
        }
    }
}

impl fmt::Display for Transfer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Transfer ID: {} | {} | Rate: {} | Amount: {}",
            self.id,
            self.pair(),
            self.rate,
            self.source_amount,
        )
    }
}

/// Free-text details carried over verbatim when a transfer is rebooked.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransferDetails {
    #[serde(default)]
    pub reference: String,
    #[serde(default)]
    pub transfer_purpose: String,
    #[serde(default)]
    pub source_of_funds: String,
}

// ---------------------------------------------------------------------------
// Quote
// ---------------------------------------------------------------------------

/// A rate lock. Immutable once created; expires at `rate_expiration_time`.
///
/// The expiry stays as the provider sent it. Only the reminder check reads
/// it, through [`Quote::expires_at`], so a malformed value cannot block a
/// rebooking.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Quote {
    pub id: String,
    pub rate: Decimal,
    #[serde(default)]
    pub source_amount: Decimal,
    pub source_currency: String,
    pub target_currency: String,
    #[serde(default)]
    pub profile: u64,
    #[serde(default)]
    pub rate_expiration_time: String,
    #[serde(default)]
    pub payment_options: Vec<PaymentOption>,
}

impl Quote {
    /// Helper to build a test/sample quote with one bank-transfer option.
    #[cfg(test)]
    pub fn sample(id: &str, rate: Decimal, expires: DateTime<Utc>) -> Self {
        Quote {
            id: id.to_string(),
            rate,
            source_amount: rust_decimal_macros::dec!(1000),
            source_currency: "EUR".to_string(),
            target_currency: "USD".to_string(),
            profile: 42,
            rate_expiration_time: expires.to_rfc3339(),
            payment_options: vec![PaymentOption {
                disabled: false,
                pay_out: BANK_TRANSFER_PAYOUT.to_string(),
                source_amount: rust_decimal_macros::dec!(1004.5),
            }],
        }
    }

    /// Parse `rate_expiration_time` as RFC3339.
    pub fn expires_at(&self) -> WiselyResult<DateTime<Utc>> {
        DateTime::parse_from_rfc3339(&self.rate_expiration_time)
            .map(|t| t.with_timezone(&Utc))
            .map_err(|e| WiselyError::InvalidExpiry {
                quote_id: self.id.clone(),
                value: self.rate_expiration_time.clone(),
                message: e.to_string(),
            })
    }

    /// The first enabled bank-transfer payment option, if any.
    pub fn bank_transfer_option(&self) -> Option<&PaymentOption> {
        self.payment_options
            .iter()
            .find(|o| !o.disabled && o.pay_out == BANK_TRANSFER_PAYOUT)
    }

    /// Adopt the bank-transfer option's source amount as the quote's own.
    /// Leaves the provider-reported amount untouched when no option matches.
    pub fn with_bank_transfer_amount(mut self) -> Self {
        if let Some(amount) = self.bank_transfer_option().map(|o| o.source_amount) {
            self.source_amount = amount;
        }
        self
    }
}

/// One payout method attached to a quote.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymentOption {
    #[serde(default)]
    pub disabled: bool,
    #[serde(default)]
    pub pay_out: String,
    #[serde(default)]
    pub source_amount: Decimal,
}

/// Current market rate for a currency pair.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LiveRate {
    pub rate: Decimal,
}

// ---------------------------------------------------------------------------
// Requests
// ---------------------------------------------------------------------------

/// Filter for the transfer listing endpoint.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransferQuery {
    pub limit: u32,
    pub offset: u32,
    pub status: String,
}

impl TransferQuery {
    /// The three most recent transfers still awaiting incoming payment.
    pub fn pending() -> Self {
        Self {
            limit: 3,
            offset: 0,
            status: PENDING_STATUS.to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateQuoteRequest {
    pub source_currency: String,
    pub target_currency: String,
    pub source_amount: Decimal,
    pub profile: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateTransferRequest {
    pub target_account: u64,
    pub quote_uuid: String,
    /// Idempotency key; a fresh v4 UUID per creation attempt.
    pub customer_transaction_id: Uuid,
    pub details: TransferDetails,
}

// ---------------------------------------------------------------------------
// Error types
// ---------------------------------------------------------------------------

/// Errors surfaced by every provider call and by the job itself.
#[derive(Debug, thiserror::Error)]
pub enum WiselyError {
    #[error("error: make sure env variables ENV, API_TOKEN are both provided and are valid")]
    MissingCredentials,

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Transport error calling {endpoint}: {message}")]
    Transport { endpoint: String, message: String },

    #[error("Provider returned {status} for {endpoint}: {body}")]
    Status {
        endpoint: String,
        status: u16,
        body: String,
    },

    #[error("Failed to decode {endpoint} response: {message}")]
    Decode { endpoint: String, message: String },

    #[error("error: no current transfer found, please create a transfer before proceeding")]
    NoCurrentTransfer,

    #[error("No usable live rate for {pair}")]
    LiveRateUnavailable { pair: String },

    #[error("Quote {quote_id} has unreadable rateExpirationTime '{value}': {message}")]
    InvalidExpiry {
        quote_id: String,
        value: String,
        message: String,
    },

    #[error("Mail error: {0}")]
    Mail(String),
}

pub type WiselyResult<T> = Result<T, WiselyError>;

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
