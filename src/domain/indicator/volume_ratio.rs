//! Up/down volume ratio.
//!
//! Up day: close > previous close. Down day: close < previous close.
//! UDVR[i] = sum(up volume) / sum(down volume) over the trailing window.
//! The first bar is neither up nor down.

use crate::domain::indicator::{IndicatorPoint, IndicatorSeries, IndicatorType};
use crate::domain::ohlcv::PriceBar;

pub fn calculate_up_down_volume_ratio(bars: &[PriceBar], period: usize) -> IndicatorSeries {
    let indicator_type = IndicatorType::UpDownVolumeRatio(period);
    if period == 0 {
        return IndicatorSeries {
            indicator_type,
            values: Vec::new(),
        };
    }

    let (up, down): (Vec<f64>, Vec<f64>) = bars
        .iter()
        .enumerate()
        .map(|(i, bar)| match i.checked_sub(1).map(|p| bars[p].close) {
            Some(prev) if bar.close > prev => (bar.volume, 0.0),
            Some(prev) if bar.close < prev => (0.0, bar.volume),
            _ => (0.0, 0.0),
        })
        .unzip();

    let values = bars
        .iter()
        .enumerate()
        .map(|(i, bar)| {
            if i + 1 < period {
                return IndicatorPoint {
                    date: bar.date,
                    valid: false,
                    value: 0.0,
                };
            }
            let start = i + 1 - period;
            let up_sum: f64 = up[start..=i].iter().sum();
            let down_sum: f64 = down[start..=i].iter().sum();
            if down_sum == 0.0 {
                IndicatorPoint {
                    date: bar.date,
                    valid: false,
                    value: 0.0,
                }
            } else {
                IndicatorPoint {
                    date: bar.date,
                    valid: true,
                    value: up_sum / down_sum,
                }
            }
        })
        .collect();

    IndicatorSeries {
        indicator_type,
        values,
    }
}
