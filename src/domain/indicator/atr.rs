//! True range and average true range.
//!
//! The first bar has no previous close, so its true range is high - low.
//! ATR is the simple rolling mean of true range, not Wilder smoothing.

use crate::domain::indicator::{IndicatorPoint, IndicatorSeries, IndicatorType};
use crate::domain::ohlcv::PriceBar;

pub fn calculate_true_range(bars: &[PriceBar]) -> IndicatorSeries {
    let values = bars
        .iter()
        .enumerate()
        .map(|(i, bar)| {
            let tr = if i == 0 {
                bar.high - bar.low
            } else {
                bar.true_range(bars[i - 1].close)
            };
            IndicatorPoint {
                date: bar.date,
                valid: true,
                value: tr,
            }
        })
        .collect();

    IndicatorSeries {
        indicator_type: IndicatorType::TrueRange,
        values,
    }
}

pub fn calculate_atr(bars: &[PriceBar], period: usize) -> IndicatorSeries {
    if period == 0 {
        return IndicatorSeries {
            indicator_type: IndicatorType::Atr(period),
            values: vec![],
        };
    }

    let tr: Vec<f64> = calculate_true_range(bars)
        .values
        .iter()
        .map(|p| p.value)
        .collect();

    let values = bars
        .iter()
        .enumerate()
        .map(|(i, bar)| {
            if i + 1 < period {
                IndicatorPoint {
                    date: bar.date,
                    valid: false,
                    value: 0.0,
                }
            } else {
                let sum: f64 = tr[i + 1 - period..=i].iter().sum();
                IndicatorPoint {
                    date: bar.date,
                    valid: true,
                    value: sum / period as f64,
                }
            }
        })
        .collect();

    IndicatorSeries {
        indicator_type: IndicatorType::Atr(period),
        values,
    }
}
