//! Warning detector: BlackDot and RedDot risk conditions.
//!
//! BlackDot(d): close(d) < MA(d) and some day e in the trailing window has
//! TR(e) > k * ATR(e), CR(e) < threshold and volume(e) > volume MA(e), all on
//! that same day e.
//!
//! RedDot(d): close(d) < MA(d) and UDVR < 1 on at least `red_dot_min_days`
//! days of the trailing window.
//!
//! Days before the first indicator set satisfy no sub-condition.

use chrono::NaiveDate;

use super::indicator::IndicatorSet;

/// Both detector outcomes for one trading day.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DailyWarnings {
    pub date: NaiveDate,
    pub black_dot: bool,
    pub red_dot: bool,
}

impl DailyWarnings {
    pub fn any(&self) -> bool {
        self.black_dot || self.red_dot
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct WarningParams {
    pub window: usize,
    pub range_multiple: f64,
    pub closing_range_max_pct: f64,
    pub red_dot_min_days: usize,
}

impl Default for WarningParams {
    fn default() -> Self {
        WarningParams {
            window: 5,
            range_multiple: 1.5,
            closing_range_max_pct: 10.0,
            red_dot_min_days: 3,
        }
    }
}

/// Volatility spike, close near the low and heavy volume, all on this day.
pub fn is_distribution_day(set: &IndicatorSet, params: &WarningParams) -> bool {
    let spike = set.true_range > params.range_multiple * set.atr;
    let weak_close = set
        .closing_range
        .is_some_and(|cr| cr < params.closing_range_max_pct);
    let heavy = set.volume > set.volume_ma;
    spike && weak_close && heavy
}

pub fn is_weak_volume_day(set: &IndicatorSet) -> bool {
    set.up_down_volume_ratio.is_some_and(|r| r < 1.0)
}

fn trailing<'a>(sets: &'a [IndicatorSet], i: usize, window: usize) -> &'a [IndicatorSet] {
    let start = (i + 1).saturating_sub(window);
    &sets[start..=i]
}

pub fn black_dot(sets: &[IndicatorSet], i: usize, params: &WarningParams) -> bool {
    let today = &sets[i];
    today.close < today.close_ma
        && trailing(sets, i, params.window)
            .iter()
            .any(|s| is_distribution_day(s, params))
}

pub fn red_dot(sets: &[IndicatorSet], i: usize, params: &WarningParams) -> bool {
    let today = &sets[i];
    let weak_days = trailing(sets, i, params.window)
        .iter()
        .filter(|s| is_weak_volume_day(s))
        .count();
    today.close < today.close_ma && weak_days >= params.red_dot_min_days
}

/// Evaluate both detectors on every day of the indicator history.
pub fn detect_warnings(sets: &[IndicatorSet], params: &WarningParams) -> Vec<DailyWarnings> {
    (0..sets.len())
        .map(|i| DailyWarnings {
            date: sets[i].date,
            black_dot: black_dot(sets, i, params),
            red_dot: red_dot(sets, i, params),
        })
        .collect()
}
