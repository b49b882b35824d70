//! Rate comparison against the provider.
//!
//! Fetches the booked transfer and the live rate for its currency pair,
//! then applies the margin rule from the parent module.

use rust_decimal::Decimal;
use tracing::{debug, info};

use super::{decide, find_best_transfer, RateDecision};
use crate::provider::TransferProvider;
use crate::types::{Quote, Transfer, TransferQuery, WiselyError, WiselyResult};

/// Fetch a quote and adopt its bank-transfer source amount.
pub async fn quote_detail(provider: &dyn TransferProvider, quote_id: &str) -> WiselyResult<Quote> {
    let quote = provider.quote(quote_id).await?;
    Ok(quote.with_bank_transfer_amount())
}

/// The pending transfer with the highest locked rate, enriched with its
/// quote's source amount and profile.
///
/// Fails with `NoCurrentTransfer` if nothing is awaiting payment.
pub async fn booked_transfer(provider: &dyn TransferProvider) -> WiselyResult<Transfer> {
    booked_transfer_with_quote(provider).await.map(|(t, _)| t)
}

/// Like [`booked_transfer`], also returning the quote it was enriched from.
pub async fn booked_transfer_with_quote(
    provider: &dyn TransferProvider,
) -> WiselyResult<(Transfer, Quote)> {
    let transfers = provider.list_transfers(&TransferQuery::pending()).await?;
    debug!(count = transfers.len(), "Pending transfers listed");

    let mut booked = find_best_transfer(&transfers)
        .cloned()
        .ok_or(WiselyError::NoCurrentTransfer)?;

    let quote = quote_detail(provider, &booked.quote_uuid).await?;
    booked.source_amount = quote.source_amount;
    booked.profile = quote.profile;

    Ok((booked, quote))
}

/// Compares the currently booked transfer with the live market rate.
pub struct RateComparator<'a> {
    provider: &'a dyn TransferProvider,
    margin: Decimal,
}

impl<'a> RateComparator<'a> {
    pub fn new(provider: &'a dyn TransferProvider, margin: Decimal) -> Self {
        Self { provider, margin }
    }

    pub fn margin(&self) -> Decimal {
        self.margin
    }

    pub async fn booked_transfer(&self) -> WiselyResult<Transfer> {
        booked_transfer(self.provider).await
    }

    /// First live rate for the pair. A zero rate or an empty list is an error.
    pub async fn live_rate(&self, source: &str, target: &str) -> WiselyResult<Decimal> {
        let rates = self.provider.live_rates(source, target).await?;
        match rates.first() {
            Some(r) if !r.rate.is_zero() => Ok(r.rate),
            _ => Err(WiselyError::LiveRateUnavailable {
                pair: format!("{source} -> {target}"),
            }),
        }
    }

    /// Decide whether the booked transfer should be rebooked.
    pub async fn compare_rates(&self) -> WiselyResult<RateDecision> {
        let booked = self.booked_transfer().await?;
        let live = self
            .live_rate(&booked.source_currency, &booked.target_currency)
            .await?;

        let decision = decide(booked, live, self.margin);
        info!(
            transfer_id = decision.transfer().id,
            booked_rate = %decision.transfer().rate,
            live_rate = %live,
            margin = %self.margin,
            rebook = decision.should_rebook(),
            "Rates compared"
        );
        Ok(decision)
    }
}
