//! Configuration validation.
//!
//! Runs before any data is fetched; every failure is a configuration error
//! and fatal at startup. A value that is present but does not parse is
//! rejected rather than replaced by its default.

use crate::domain::commission::CommissionSchedule;
use crate::domain::error::SigtraderError;
use crate::ports::config_port::ConfigPort;

/// Upper bound on total submission attempts per order.
pub const MAX_ATTEMPTS_LIMIT: i64 = 10;

pub fn validate_trader_config(config: &dyn ConfigPort) -> Result<(), SigtraderError> {
    validate_symbol(config)?;
    validate_periods(config)?;
    validate_history(config)?;
    validate_warnings(config)?;
    validate_cash_controls(config)?;
    validate_commission(config)?;
    validate_retry(config)?;
    validate_broker(config)?;
    Ok(())
}

fn invalid(section: &str, key: &str, reason: &str) -> SigtraderError {
    SigtraderError::ConfigInvalid {
        section: section.to_string(),
        key: key.to_string(),
        reason: reason.to_string(),
    }
}

fn int(
    config: &dyn ConfigPort,
    section: &str,
    key: &str,
    default: i64,
) -> Result<i64, SigtraderError> {
    Ok(config.checked_int(section, key)?.unwrap_or(default))
}

fn double(
    config: &dyn ConfigPort,
    section: &str,
    key: &str,
    default: f64,
) -> Result<f64, SigtraderError> {
    Ok(config.checked_double(section, key)?.unwrap_or(default))
}

fn validate_symbol(config: &dyn ConfigPort) -> Result<(), SigtraderError> {
    match config.get_string("trader", "symbol") {
        Some(s) if !s.trim().is_empty() => Ok(()),
        _ => Err(SigtraderError::ConfigMissing {
            section: "trader".to_string(),
            key: "symbol".to_string(),
        }),
    }
}

fn validate_periods(config: &dyn ConfigPort) -> Result<(), SigtraderError> {
    for (key, default) in [
        ("ma_period", 50),
        ("atr_period", 14),
        ("volume_ratio_period", 50),
        ("signal_lookback", 10),
    ] {
        if int(config, "indicators", key, default)? < 1 {
            return Err(invalid("indicators", key, &format!("{key} must be at least 1")));
        }
    }
    Ok(())
}

/// The fetched history must cover the longest window plus the classifier
/// lookback, and one more bar when today's in-progress bar is dropped.
fn validate_history(config: &dyn ConfigPort) -> Result<(), SigtraderError> {
    let mut longest = 0;
    for (key, default) in [("ma_period", 50), ("volume_ratio_period", 50), ("atr_period", 14)] {
        longest = longest.max(int(config, "indicators", key, default)?);
    }
    let exclude_in_progress = config
        .checked_bool("trader", "exclude_in_progress_bar")?
        .unwrap_or(true);
    let minimum = longest
        + int(config, "indicators", "signal_lookback", 10)?
        + i64::from(exclude_in_progress);
    let history = int(config, "trader", "history_bars", 120)?;
    if history < minimum {
        let reason = if exclude_in_progress {
            format!("history_bars must be at least {minimum} (one bar may be in progress)")
        } else {
            format!("history_bars must be at least {minimum}")
        };
        return Err(invalid("trader", "history_bars", &reason));
    }
    Ok(())
}

fn validate_warnings(config: &dyn ConfigPort) -> Result<(), SigtraderError> {
    let window = int(config, "warnings", "window", 5)?;
    if window < 1 {
        return Err(invalid("warnings", "window", "window must be at least 1"));
    }
    if double(config, "warnings", "range_multiple", 1.5)? <= 0.0 {
        return Err(invalid(
            "warnings",
            "range_multiple",
            "range_multiple must be positive",
        ));
    }
    let cr = double(config, "warnings", "closing_range_max_pct", 10.0)?;
    if cr <= 0.0 || cr > 100.0 {
        return Err(invalid(
            "warnings",
            "closing_range_max_pct",
            "closing_range_max_pct must be in (0, 100]",
        ));
    }
    let min_days = int(config, "warnings", "red_dot_min_days", 3)?;
    if min_days < 1 || min_days > window {
        return Err(invalid(
            "warnings",
            "red_dot_min_days",
            "red_dot_min_days must be between 1 and window",
        ));
    }
    Ok(())
}

fn validate_cash_controls(config: &dyn ConfigPort) -> Result<(), SigtraderError> {
    if double(config, "planner", "cash_buffer", 1.0)? < 0.0 {
        return Err(invalid(
            "planner",
            "cash_buffer",
            "cash_buffer must be non-negative",
        ));
    }
    if double(config, "planner", "min_cash", 5.0)? <= 0.0 {
        return Err(invalid("planner", "min_cash", "min_cash must be positive"));
    }
    let precision = int(config, "planner", "quantity_precision", 4)?;
    if !(0..=8).contains(&precision) {
        return Err(invalid(
            "planner",
            "quantity_precision",
            "quantity_precision must be between 0 and 8",
        ));
    }
    Ok(())
}

fn validate_commission(config: &dyn ConfigPort) -> Result<(), SigtraderError> {
    let kind = config
        .get_string("planner", "commission_type")
        .unwrap_or_else(|| "TIERED".to_string());
    let schedule: CommissionSchedule = kind
        .parse()
        .map_err(|reason: String| invalid("planner", "commission_type", &reason))?;

    for key in ["rate_per_share", "minimum"] {
        if double(config, "planner", key, 0.0)? < 0.0 {
            return Err(invalid("planner", key, &format!("{key} must be non-negative")));
        }
    }
    let max_pct = double(config, "planner", "max_pct", 1.0)?;
    if matches!(schedule, CommissionSchedule::Tiered { .. }) && max_pct <= 0.0 {
        return Err(invalid("planner", "max_pct", "max_pct must be positive"));
    }
    Ok(())
}

fn validate_retry(config: &dyn ConfigPort) -> Result<(), SigtraderError> {
    let attempts = int(config, "retry", "max_attempts", 3)?;
    if !(1..=MAX_ATTEMPTS_LIMIT).contains(&attempts) {
        return Err(invalid(
            "retry",
            "max_attempts",
            &format!("max_attempts must be between 1 and {MAX_ATTEMPTS_LIMIT}"),
        ));
    }
    if int(config, "retry", "delay_ms", 2000)? < 0 {
        return Err(invalid("retry", "delay_ms", "delay_ms must be non-negative"));
    }
    match config
        .get_string("retry", "backoff")
        .map(|s| s.trim().to_lowercase())
        .as_deref()
    {
        None | Some("exponential") | Some("fixed") => {}
        Some(_) => {
            return Err(invalid(
                "retry",
                "backoff",
                "backoff must be 'fixed' or 'exponential'",
            ));
        }
    }
    if double(config, "retry", "backoff_factor", 2.0)? < 1.0 {
        return Err(invalid(
            "retry",
            "backoff_factor",
            "backoff_factor must be at least 1",
        ));
    }
    if int(config, "retry", "attempt_timeout_ms", 30_000)? <= 0 {
        return Err(invalid(
            "retry",
            "attempt_timeout_ms",
            "attempt_timeout_ms must be positive",
        ));
    }
    Ok(())
}

/// Paper account settings; absent keys take the broker's defaults.
fn validate_broker(config: &dyn ConfigPort) -> Result<(), SigtraderError> {
    for key in ["cash", "quantity", "slippage_pct"] {
        if double(config, "broker", key, 0.0)? < 0.0 {
            return Err(invalid("broker", key, &format!("{key} must be non-negative")));
        }
    }
    config.checked_double("broker", "average_cost")?;
    if let Some(price) = config.checked_double("broker", "price")? {
        if price <= 0.0 {
            return Err(invalid("broker", "price", "price must be positive"));
        }
    }
    Ok(())
}
