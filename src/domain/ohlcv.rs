//! Daily price bar representation.

use chrono::NaiveDate;

use super::error::SigtraderError;

#[derive(Debug, Clone, PartialEq)]
pub struct PriceBar {
    pub date: NaiveDate,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub volume: f64,
}

impl PriceBar {
    /// max(high - low, |high - prev_close|, |low - prev_close|)
    pub fn true_range(&self, prev_close: f64) -> f64 {
        let hl = self.high - self.low;
        let hc = (self.high - prev_close).abs();
        let lc = (self.low - prev_close).abs();
        hl.max(hc).max(lc)
    }
}

/// Check that bars are strictly date-ordered and carry usable prices.
pub fn validate_bars(bars: &[PriceBar]) -> Result<(), SigtraderError> {
    for (i, bar) in bars.iter().enumerate() {
        let prices = [bar.open, bar.high, bar.low, bar.close];
        if prices.iter().any(|p| !p.is_finite() || *p <= 0.0) {
            return Err(SigtraderError::MalformedData {
                reason: format!("non-positive or non-finite price on {}", bar.date),
            });
        }
        if bar.high < bar.low {
            return Err(SigtraderError::MalformedData {
                reason: format!("high below low on {}", bar.date),
            });
        }
        if bar.close < bar.low || bar.close > bar.high {
            return Err(SigtraderError::MalformedData {
                reason: format!("close outside the day's range on {}", bar.date),
            });
        }
        if !bar.volume.is_finite() || bar.volume < 0.0 {
            return Err(SigtraderError::MalformedData {
                reason: format!("invalid volume on {}", bar.date),
            });
        }
        if i > 0 && bars[i - 1].date >= bar.date {
            return Err(SigtraderError::MalformedData {
                reason: format!("bars out of order at {}", bar.date),
            });
        }
    }
    Ok(())
}

/// Drop a trailing bar for `today`: when the run happens after the open that
/// session is still in progress and must not feed the indicators.
pub fn exclude_in_progress(bars: &[PriceBar], today: NaiveDate) -> &[PriceBar] {
    match bars.last() {
        Some(last) if last.date == today => &bars[..bars.len() - 1],
        _ => bars,
    }
}
