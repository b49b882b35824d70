//! Transfer provider integration.
//!
//! Defines the `TransferProvider` trait, the boundary to the money-transfer
//! provider's REST API, and the HTTPS implementation in [`wise`].
//! Every method is a single request; there is no retry.

pub mod wise;

use async_trait::async_trait;

use crate::types::{
    CreateQuoteRequest, CreateTransferRequest, LiveRate, Quote, Transfer, TransferQuery,
    WiselyResult,
};

/// Abstraction over the transfer provider's API.
///
/// Implementors map transport failures, non-200 statuses and undecodable
/// bodies onto the matching `WiselyError` variants.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait TransferProvider: Send + Sync {
    /// List transfers matching the query.
    async fn list_transfers(&self, query: &TransferQuery) -> WiselyResult<Vec<Transfer>>;

    /// Current market rates for a currency pair.
    async fn live_rates(&self, source: &str, target: &str) -> WiselyResult<Vec<LiveRate>>;

    /// Request a new quote.
    async fn create_quote(&self, request: &CreateQuoteRequest) -> WiselyResult<Quote>;

    /// Fetch a quote, including its payment options, exactly as reported.
    async fn quote(&self, quote_id: &str) -> WiselyResult<Quote>;

    /// Create a transfer from an accepted quote.
    async fn create_transfer(&self, request: &CreateTransferRequest) -> WiselyResult<Transfer>;

    /// Cancel a transfer. Succeeds only on HTTP 200.
    async fn cancel_transfer(&self, transfer_id: u64) -> WiselyResult<()>;
}
