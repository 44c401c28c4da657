//! Indicator engine: price history to per-day derived metrics.
//!
//! Each calculator produces an `IndicatorSeries` parallel to the input bars,
//! with warmup points marked invalid. `compute_indicators` joins the series
//! into one `IndicatorSet` per day once every window is full.

pub mod atr;
pub mod closing_range;
pub mod sma;
pub mod volume_ratio;

use chrono::NaiveDate;
use std::fmt;

use crate::domain::error::SigtraderError;
use crate::domain::ohlcv::{validate_bars, PriceBar};

use self::atr::{calculate_atr, calculate_true_range};
use self::closing_range::calculate_closing_range;
use self::sma::{calculate_sma, PriceField};
use self::volume_ratio::calculate_up_down_volume_ratio;

#[derive(Debug, Clone, PartialEq)]
pub struct IndicatorPoint {
    pub date: NaiveDate,
    pub valid: bool,
    pub value: f64,
}

impl IndicatorPoint {
    pub fn get(&self) -> Option<f64> {
        if self.valid { Some(self.value) } else { None }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum IndicatorType {
    CloseSma(usize),
    VolumeSma(usize),
    TrueRange,
    Atr(usize),
    ClosingRange,
    UpDownVolumeRatio(usize),
}

#[derive(Debug, Clone)]
pub struct IndicatorSeries {
    pub indicator_type: IndicatorType,
    pub values: Vec<IndicatorPoint>,
}

impl fmt::Display for IndicatorType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            IndicatorType::CloseSma(period) => write!(f, "SMA({})", period),
            IndicatorType::VolumeSma(period) => write!(f, "VOL_SMA({})", period),
            IndicatorType::TrueRange => write!(f, "TR"),
            IndicatorType::Atr(period) => write!(f, "ATR({})", period),
            IndicatorType::ClosingRange => write!(f, "CR"),
            IndicatorType::UpDownVolumeRatio(period) => write!(f, "UDVR({})", period),
        }
    }
}

/// Window lengths for the indicator engine.
#[derive(Debug, Clone, PartialEq)]
pub struct IndicatorParams {
    pub ma_period: usize,
    pub atr_period: usize,
    pub volume_ratio_period: usize,
    /// Trading days the classifier looks back over; extra history kept beyond
    /// the longest indicator window.
    pub signal_lookback: usize,
}

impl Default for IndicatorParams {
    fn default() -> Self {
        IndicatorParams {
            ma_period: 50,
            atr_period: 14,
            volume_ratio_period: 50,
            signal_lookback: 10,
        }
    }
}

impl IndicatorParams {
    pub fn longest_period(&self) -> usize {
        self.ma_period
            .max(self.atr_period)
            .max(self.volume_ratio_period)
    }

    /// Fewest bars that yield a full classifier lookback of indicator days.
    pub fn min_bars(&self) -> usize {
        self.longest_period() + self.signal_lookback
    }
}

/// Derived metrics for one trading day.
#[derive(Debug, Clone, PartialEq)]
pub struct IndicatorSet {
    pub date: NaiveDate,
    pub close: f64,
    pub volume: f64,
    pub close_ma: f64,
    pub volume_ma: f64,
    pub true_range: f64,
    pub atr: f64,
    /// Percent; `None` when high == low.
    pub closing_range: Option<f64>,
    /// `None` when the window holds no down-day volume.
    pub up_down_volume_ratio: Option<f64>,
}

/// Compute one `IndicatorSet` per bar from the first day on which every
/// window is full. Earlier days produce nothing.
pub fn compute_indicators(
    bars: &[PriceBar],
    params: &IndicatorParams,
) -> Result<Vec<IndicatorSet>, SigtraderError> {
    let minimum = params.min_bars();
    if bars.len() < minimum {
        return Err(SigtraderError::InsufficientData {
            bars: bars.len(),
            minimum,
        });
    }
    validate_bars(bars)?;

    let close_ma = calculate_sma(bars, params.ma_period, PriceField::Close);
    let volume_ma = calculate_sma(bars, params.ma_period, PriceField::Volume);
    let true_range = calculate_true_range(bars);
    let atr = calculate_atr(bars, params.atr_period);
    let closing_range = calculate_closing_range(bars);
    let udvr = calculate_up_down_volume_ratio(bars, params.volume_ratio_period);

    let first = params.longest_period() - 1;
    let mut sets = Vec::with_capacity(bars.len() - first);

    for i in first..bars.len() {
        let (Some(close_ma), Some(volume_ma), Some(tr), Some(atr)) = (
            close_ma.values[i].get(),
            volume_ma.values[i].get(),
            true_range.values[i].get(),
            atr.values[i].get(),
        ) else {
            return Err(SigtraderError::MalformedData {
                reason: format!("indicator window incomplete on {}", bars[i].date),
            });
        };

        sets.push(IndicatorSet {
            date: bars[i].date,
            close: bars[i].close,
            volume: bars[i].volume,
            close_ma,
            volume_ma,
            true_range: tr,
            atr,
            closing_range: closing_range.values[i].get(),
            up_down_volume_ratio: udvr.values[i].get(),
        });
    }

    Ok(sets)
}
