//! Signal classifier: recent warning history to one market signal.

use std::fmt;

use super::error::SigtraderError;
use super::warning::DailyWarnings;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MarketSignal {
    Bullish,
    Bearish,
    Neutral,
    Closed,
}

impl fmt::Display for MarketSignal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MarketSignal::Bullish => write!(f, "BULLISH"),
            MarketSignal::Bearish => write!(f, "BEARISH"),
            MarketSignal::Neutral => write!(f, "NEUTRAL"),
            MarketSignal::Closed => write!(f, "CLOSED"),
        }
    }
}

/// Classify the latest day of `warnings` (the last element is today).
///
/// First match wins: CLOSED, BEARISH on a warning today, NEUTRAL on a warning
/// in the prior `lookback - 1` days, otherwise BULLISH.
pub fn classify(
    warnings: &[DailyWarnings],
    market_open: bool,
    lookback: usize,
) -> Result<MarketSignal, SigtraderError> {
    if !market_open {
        return Ok(MarketSignal::Closed);
    }

    let Some((today, earlier)) = warnings.split_last() else {
        return Err(SigtraderError::InsufficientData {
            bars: 0,
            minimum: lookback,
        });
    };

    if today.any() {
        return Ok(MarketSignal::Bearish);
    }

    let prior = lookback.saturating_sub(1);
    let start = earlier.len().saturating_sub(prior);
    if earlier[start..].iter().any(DailyWarnings::any) {
        Ok(MarketSignal::Neutral)
    } else {
        Ok(MarketSignal::Bullish)
    }
}
