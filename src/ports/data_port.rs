//! Market data port.

use crate::domain::error::SigtraderError;
use crate::domain::ohlcv::PriceBar;

pub trait MarketDataPort {
    /// The trailing `lookback` daily bars for `symbol`, oldest first.
    ///
    /// Unknown symbols and unreachable sources fail with
    /// `SigtraderError::DataUnavailable`.
    fn fetch_bars(&self, symbol: &str, lookback: usize) -> Result<Vec<PriceBar>, SigtraderError>;
}
