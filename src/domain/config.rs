//! Typed run configuration.
//!
//! Built once from a `ConfigPort` and passed by value into each component;
//! nothing reads configuration after construction.

use std::time::Duration;

use super::commission::CommissionSchedule;
use super::config_validation::validate_trader_config;
use super::error::SigtraderError;
use super::indicator::IndicatorParams;
use super::planner::PlannerConfig;
use super::retry::{Backoff, RetryPolicy};
use super::warning::WarningParams;
use crate::domain::error::BrokerFault;
use crate::ports::config_port::ConfigPort;

#[derive(Debug, Clone)]
pub struct TraderConfig {
    /// Instrument that is bought and sold.
    pub symbol: String,
    /// Series the signal is computed from; often an index tracked by `symbol`.
    pub signal_symbol: String,
    pub history_bars: usize,
    pub exclude_in_progress_bar: bool,
    pub indicators: IndicatorParams,
    pub warnings: WarningParams,
    pub planner: PlannerConfig,
    pub retry: RetryPolicy,
    pub attempt_timeout: Duration,
}

impl TraderConfig {
    pub fn for_symbol(symbol: &str) -> Self {
        TraderConfig {
            symbol: symbol.to_string(),
            signal_symbol: symbol.to_string(),
            history_bars: 120,
            exclude_in_progress_bar: true,
            indicators: IndicatorParams::default(),
            warnings: WarningParams::default(),
            planner: PlannerConfig::default(),
            retry: RetryPolicy::default(),
            attempt_timeout: Duration::from_secs(30),
        }
    }
}

fn non_negative(value: i64) -> u64 {
    value.max(0) as u64
}

fn build_commission(adapter: &dyn ConfigPort) -> Result<CommissionSchedule, SigtraderError> {
    let kind = adapter
        .get_string("planner", "commission_type")
        .unwrap_or_else(|| "TIERED".to_string());
    let schedule: CommissionSchedule =
        kind.parse()
            .map_err(|reason: String| SigtraderError::ConfigInvalid {
                section: "planner".into(),
                key: "commission_type".into(),
                reason,
            })?;

    Ok(match schedule {
        CommissionSchedule::Tiered {
            rate_per_share,
            minimum,
            max_pct,
        } => CommissionSchedule::Tiered {
            rate_per_share: adapter.get_double("planner", "rate_per_share", rate_per_share),
            minimum: adapter.get_double("planner", "minimum", minimum),
            max_pct: adapter.get_double("planner", "max_pct", max_pct),
        },
        CommissionSchedule::Fixed {
            rate_per_share,
            minimum,
        } => CommissionSchedule::Fixed {
            rate_per_share: adapter.get_double("planner", "rate_per_share", rate_per_share),
            minimum: adapter.get_double("planner", "minimum", minimum),
        },
    })
}

fn build_retry(adapter: &dyn ConfigPort) -> RetryPolicy {
    let backoff = match adapter
        .get_string("retry", "backoff")
        .map(|s| s.trim().to_lowercase())
        .as_deref()
    {
        Some("fixed") => Backoff::Fixed,
        _ => Backoff::Exponential {
            factor: adapter.get_double("retry", "backoff_factor", 2.0),
        },
    };
    RetryPolicy {
        max_attempts: adapter.get_int("retry", "max_attempts", 3).clamp(1, u32::MAX as i64) as u32,
        initial_delay: Duration::from_millis(non_negative(adapter.get_int("retry", "delay_ms", 2000))),
        backoff,
        retryable: BrokerFault::is_retryable,
    }
}

/// Validate then build the run configuration.
pub fn build_trader_config(adapter: &dyn ConfigPort) -> Result<TraderConfig, SigtraderError> {
    validate_trader_config(adapter)?;

    let symbol = adapter
        .get_string("trader", "symbol")
        .map(|s| s.trim().to_string())
        .ok_or_else(|| SigtraderError::ConfigMissing {
            section: "trader".into(),
            key: "symbol".into(),
        })?;
    let signal_symbol = adapter
        .get_string("trader", "signal_symbol")
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .unwrap_or_else(|| symbol.clone());

    let indicators = IndicatorParams {
        ma_period: non_negative(adapter.get_int("indicators", "ma_period", 50)) as usize,
        atr_period: non_negative(adapter.get_int("indicators", "atr_period", 14)) as usize,
        volume_ratio_period: non_negative(adapter.get_int("indicators", "volume_ratio_period", 50))
            as usize,
        signal_lookback: non_negative(adapter.get_int("indicators", "signal_lookback", 10)) as usize,
    };

    let warnings = WarningParams {
        window: non_negative(adapter.get_int("warnings", "window", 5)) as usize,
        range_multiple: adapter.get_double("warnings", "range_multiple", 1.5),
        closing_range_max_pct: adapter.get_double("warnings", "closing_range_max_pct", 10.0),
        red_dot_min_days: non_negative(adapter.get_int("warnings", "red_dot_min_days", 3)) as usize,
    };

    let planner = PlannerConfig {
        cash_buffer: adapter.get_double("planner", "cash_buffer", 1.0),
        min_cash: adapter.get_double("planner", "min_cash", 5.0),
        commission: build_commission(adapter)?,
        quantity_precision: non_negative(adapter.get_int("planner", "quantity_precision", 4)) as u32,
    };

    Ok(TraderConfig {
        symbol,
        signal_symbol,
        history_bars: non_negative(adapter.get_int("trader", "history_bars", 120)) as usize,
        exclude_in_progress_bar: adapter.get_bool("trader", "exclude_in_progress_bar", true),
        indicators,
        warnings,
        planner,
        retry: build_retry(adapter),
        attempt_timeout: Duration::from_millis(non_negative(adapter.get_int(
            "retry",
            "attempt_timeout_ms",
            30_000,
        ))),
    })
}
