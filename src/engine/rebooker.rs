//! Rebooking orchestrator.
//!
//! Replaces a booked transfer with one at the current rate: request a new
//! quote, create a transfer from it, then cancel the old transfer. A failed
//! cancellation does not undo the new transfer; it is reported as
//! [`RebookOutcome::OldTransferStillOpen`] so callers can act on it.

use rust_decimal::Decimal;
use tracing::{error, info};
use uuid::Uuid;

use crate::provider::TransferProvider;
use crate::types::{CreateQuoteRequest, CreateTransferRequest, Transfer, WiselyResult};

// ---------------------------------------------------------------------------
// Outcome
// ---------------------------------------------------------------------------

/// Result of a rebooking that got as far as creating the new transfer.
#[derive(Debug, Clone, PartialEq)]
pub enum RebookOutcome {
    /// New transfer created and the old one cancelled.
    Completed {
        new_transfer: Transfer,
        cancelled_id: u64,
    },
    /// New transfer created, but the old one could not be cancelled and is
    /// still open with the provider.
    OldTransferStillOpen {
        new_transfer: Transfer,
        old_transfer_id: u64,
        cancel_error: String,
    },
}

impl RebookOutcome {
    pub fn new_transfer(&self) -> &Transfer {
        match self {
            Self::Completed { new_transfer, .. } | Self::OldTransferStillOpen { new_transfer, .. } => {
                new_transfer
            }
        }
    }

    pub fn is_complete(&self) -> bool {
        matches!(self, Self::Completed { .. })
    }
}

// ---------------------------------------------------------------------------
// Rebooker
// ---------------------------------------------------------------------------

pub struct Rebooker<'a> {
    provider: &'a dyn TransferProvider,
}

impl<'a> Rebooker<'a> {
    pub fn new(provider: &'a dyn TransferProvider) -> Self {
        Self { provider }
    }

    /// Request a quote for the pair and amount under `profile`; returns its id.
    pub async fn generate_quote(
        &self,
        source: &str,
        target: &str,
        amount: Decimal,
        profile: u64,
    ) -> WiselyResult<String> {
        let request = CreateQuoteRequest {
            source_currency: source.to_string(),
            target_currency: target.to_string(),
            source_amount: amount,
            profile,
        };
        let quote = self.provider.create_quote(&request).await?;
        info!(quote_id = %quote.id, rate = %quote.rate, "Quote generated");
        Ok(quote.id)
    }

    /// Cancel a transfer by id.
    pub async fn cancel_transfer(&self, transfer_id: u64) -> WiselyResult<()> {
        self.provider.cancel_transfer(transfer_id).await?;
        info!(transfer_id, "Transfer cancelled");
        Ok(())
    }

    /// Book a replacement for `old` at the current rate, then cancel `old`.
    ///
    /// Errors before the new transfer exists abort the rebooking with the
    /// old transfer untouched. The returned transfer always carries `old`'s
    /// source amount rather than the figure in the creation response.
    pub async fn create_transfer(&self, old: &Transfer) -> WiselyResult<RebookOutcome> {
        let quote_id = self
            .generate_quote(
                &old.source_currency,
                &old.target_currency,
                old.source_amount,
                old.profile,
            )
            .await?;

        let request = CreateTransferRequest {
            target_account: old.target_account,
            quote_uuid: quote_id,
            customer_transaction_id: Uuid::new_v4(),
            details: old.details.clone(),
        };
        let mut new_transfer = self.provider.create_transfer(&request).await?;
        new_transfer.source_amount = old.source_amount;

        info!(
            old_transfer_id = old.id,
            new_transfer_id = new_transfer.id,
            rate = %new_transfer.rate,
            "Replacement transfer created"
        );

        match self.cancel_transfer(old.id).await {
            Ok(()) => Ok(RebookOutcome::Completed {
                new_transfer,
                cancelled_id: old.id,
            }),
            Err(e) => {
                error!(
                    old_transfer_id = old.id,
                    new_transfer_id = new_transfer.id,
                    error = %e,
                    "Error cancelling old transfer; both transfers remain open"
                );
                Ok(RebookOutcome::OldTransferStillOpen {
                    new_transfer,
                    old_transfer_id: old.id,
                    cancel_error: e.to_string(),
                })
            }
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
