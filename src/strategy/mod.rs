//! Strategy: picks the booked transfer and decides whether to rebook it.
//!
//! The pure decision rules live here; [`rates::RateComparator`] wires them
//! to the provider.

pub mod rates;

use rust_decimal::Decimal;

use crate::types::Transfer;

// ---------------------------------------------------------------------------
// Decision
// ---------------------------------------------------------------------------

/// Outcome of comparing the booked rate against the live market rate.
#[derive(Debug, Clone, PartialEq)]
pub enum RateDecision {
    /// Live rate beats the booked rate by at least the margin.
    Rebook { transfer: Transfer, live_rate: Decimal },
    /// Keep the current booking; `live_rate` is reported for logging only.
    Hold { transfer: Transfer, live_rate: Decimal },
}

impl RateDecision {
    pub fn should_rebook(&self) -> bool {
        matches!(self, Self::Rebook { .. })
    }

    /// The booked transfer the decision was made against.
    pub fn transfer(&self) -> &Transfer {
        match self {
            Self::Rebook { transfer, .. } | Self::Hold { transfer, .. } => transfer,
        }
    }

    pub fn live_rate(&self) -> Decimal {
        match self {
            Self::Rebook { live_rate, .. } | Self::Hold { live_rate, .. } => *live_rate,
        }
    }
}

// ---------------------------------------------------------------------------
// Rules
// ---------------------------------------------------------------------------

/// The transfer with the greatest locked rate.
///
/// Ties keep the earliest element: a later transfer replaces the current
/// best only when its rate is strictly higher.
pub fn find_best_transfer(transfers: &[Transfer]) -> Option<&Transfer> {
    transfers.iter().fold(None, |best, t| match best {
        Some(b) if b.rate >= t.rate => Some(b),
        _ => Some(t),
    })
}

/// `live > booked` and the improvement is at least `margin`.
pub fn should_rebook(booked_rate: Decimal, live_rate: Decimal, margin: Decimal) -> bool {
    live_rate > booked_rate && live_rate - booked_rate >= margin
}

/// Apply the margin rule to a booked transfer.
pub fn decide(transfer: Transfer, live_rate: Decimal, margin: Decimal) -> RateDecision {
    if should_rebook(transfer.rate, live_rate, margin) {
        RateDecision::Rebook { transfer, live_rate }
    } else {
        RateDecision::Hold { transfer, live_rate }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
