//! Closing range: where the close sits within the day's high-low range.

use crate::domain::error::SigtraderError;
use crate::domain::indicator::{IndicatorPoint, IndicatorSeries, IndicatorType};
use crate::domain::ohlcv::PriceBar;

/// (close - low) / (high - low) as a percentage.
pub fn closing_range(bar: &PriceBar) -> Result<f64, SigtraderError> {
    let range = bar.high - bar.low;
    if range == 0.0 {
        return Err(SigtraderError::MalformedData {
            reason: format!("closing range undefined on {}: high equals low", bar.date),
        });
    }
    Ok((bar.close - bar.low) / range * 100.0)
}

/// Days with an undefined closing range are marked invalid.
pub fn calculate_closing_range(bars: &[PriceBar]) -> IndicatorSeries {
    let values = bars
        .iter()
        .map(|bar| match closing_range(bar) {
            Ok(cr) => IndicatorPoint {
                date: bar.date,
                valid: true,
                value: cr,
            },
            Err(_) => IndicatorPoint {
                date: bar.date,
                valid: false,
                value: 0.0,
            },
        })
        .collect();

    IndicatorSeries {
        indicator_type: IndicatorType::ClosingRange,
        values,
    }
}
