//! Simple moving average over closes or volumes.

use crate::domain::indicator::{IndicatorPoint, IndicatorSeries, IndicatorType};
use crate::domain::ohlcv::PriceBar;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PriceField {
    Close,
    Volume,
}

impl PriceField {
    fn of(self, bar: &PriceBar) -> f64 {
        match self {
            PriceField::Close => bar.close,
            PriceField::Volume => bar.volume,
        }
    }
}

/// Mean of the trailing `period` values ending at each bar.
/// Warmup: first (period - 1) bars are invalid.
pub fn calculate_sma(bars: &[PriceBar], period: usize, field: PriceField) -> IndicatorSeries {
    let indicator_type = match field {
        PriceField::Close => IndicatorType::CloseSma(period),
        PriceField::Volume => IndicatorType::VolumeSma(period),
    };

    if period == 0 {
        return IndicatorSeries {
            indicator_type,
            values: Vec::new(),
        };
    }

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
                let window = &bars[i + 1 - period..=i];
                let sum: f64 = window.iter().map(|b| field.of(b)).sum();
                IndicatorPoint {
                    date: bar.date,
                    valid: true,
                    value: sum / period as f64,
                }
            }
        })
        .collect();

    IndicatorSeries {
        indicator_type,
        values,
    }
}
