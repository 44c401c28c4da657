//! One-shot session run: data to signal to plan to order to report.

use chrono::NaiveDate;
use tracing::{debug, info, warn};

use super::config::TraderConfig;
use super::error::SigtraderError;
use super::execution::{ExecutionEngine, OrderResult};
use super::indicator::compute_indicators;
use super::ohlcv::exclude_in_progress;
use super::planner::{OrderPlanner, TradePlan};
use super::retry::Sleeper;
use super::signal::{classify, MarketSignal};
use super::warning::{detect_warnings, DailyWarnings};
use crate::ports::broker_port::BrokerPort;
use crate::ports::data_port::MarketDataPort;
use crate::ports::report_port::ReportPort;

/// Everything one run touches. Borrowed so the caller keeps ownership of
/// adapters across runs.
pub struct SessionContext<'a> {
    pub config: &'a TraderConfig,
    pub data: &'a dyn MarketDataPort,
    pub broker: &'a dyn BrokerPort,
    pub sinks: Vec<&'a dyn ReportPort>,
    pub sleeper: &'a dyn Sleeper,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SignalEvaluation {
    pub signal: MarketSignal,
    /// Date of the last completed bar used; `None` when no data was read.
    pub as_of: Option<NaiveDate>,
    /// Warning history over the lookback window, oldest first.
    pub warnings: Vec<DailyWarnings>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SessionReport {
    pub symbol: String,
    pub session_date: NaiveDate,
    pub signal: MarketSignal,
    pub as_of: Option<NaiveDate>,
    pub warnings: Vec<DailyWarnings>,
    pub plan: TradePlan,
    pub result: Option<OrderResult>,
}

/// Market calendar check plus the signal pipeline. Never touches positions
/// or places orders.
pub fn evaluate_signal(
    config: &TraderConfig,
    data: &dyn MarketDataPort,
    broker: &dyn BrokerPort,
    today: NaiveDate,
) -> Result<SignalEvaluation, SigtraderError> {
    let market_open = broker.is_market_open(today)?;
    if !market_open {
        info!(%today, "market closed, skipping data fetch");
        return Ok(SignalEvaluation {
            signal: MarketSignal::Closed,
            as_of: None,
            warnings: Vec::new(),
        });
    }

    let bars = data.fetch_bars(&config.signal_symbol, config.history_bars)?;
    let bars = if config.exclude_in_progress_bar {
        exclude_in_progress(&bars, today)
    } else {
        &bars[..]
    };
    debug!(
        symbol = %config.signal_symbol,
        bars = bars.len(),
        first = ?bars.first().map(|b| b.date),
        last = ?bars.last().map(|b| b.date),
        "history loaded"
    );

    let sets = compute_indicators(bars, &config.indicators)?;
    let history = detect_warnings(&sets, &config.warnings);
    let signal = classify(&history, market_open, config.indicators.signal_lookback)?;

    let keep = history.len().saturating_sub(config.indicators.signal_lookback);
    let warnings = history[keep..].to_vec();
    let as_of = sets.last().map(|s| s.date);
    if let Some(latest) = warnings.last() {
        info!(
            date = %latest.date,
            black_dot = latest.black_dot,
            red_dot = latest.red_dot,
            "latest warnings"
        );
    }
    info!(%signal, as_of = ?as_of, "signal classified");

    Ok(SignalEvaluation {
        signal,
        as_of,
        warnings,
    })
}

/// Run one session. Data and indicator failures abort before anything is
/// planned; sink failures are logged and ignored.
pub fn run_session(
    ctx: &SessionContext<'_>,
    today: NaiveDate,
) -> Result<SessionReport, SigtraderError> {
    let config = ctx.config;
    info!(symbol = %config.symbol, %today, "session start");

    let evaluation = evaluate_signal(config, ctx.data, ctx.broker, today)?;

    let plan = if evaluation.signal == MarketSignal::Closed {
        TradePlan::hold(&config.symbol, "market closed")
    } else {
        let position = ctx.broker.position(&config.symbol)?;
        let cash = ctx.broker.available_cash()?;
        let price = ctx.broker.last_price(&config.symbol)?;
        info!(
            quantity = position.quantity,
            cash,
            price,
            "broker snapshot"
        );
        OrderPlanner::new(config.planner.clone()).plan(evaluation.signal, &position, cash, price)
    };
    info!(
        side = %plan.side,
        quantity = plan.quantity,
        commission = plan.commission_estimate,
        rationale = %plan.rationale,
        "trade plan"
    );

    let engine = ExecutionEngine::new(
        ctx.broker,
        config.retry.clone(),
        config.attempt_timeout,
        ctx.sleeper,
    );
    let result = engine.execute(&plan);

    let report = SessionReport {
        symbol: config.symbol.clone(),
        session_date: today,
        signal: evaluation.signal,
        as_of: evaluation.as_of,
        warnings: evaluation.warnings,
        plan,
        result,
    };

    for sink in &ctx.sinks {
        if let Err(e) = sink.publish(&report) {
            warn!(error = %e, "report sink failed");
        }
    }

    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::error::BrokerFault;
    use crate::domain::execution::{OrderAck, OrderStatus};
    use crate::domain::indicator::test_support::{day, flat_bars};
    use crate::domain::ohlcv::PriceBar;
    use crate::domain::planner::TradeSide;
    use crate::domain::position::Position;
    use std::cell::{Cell, RefCell};
    use std::time::Duration;

    struct FixedData {
        bars: Vec<PriceBar>,
        calls: Cell<u32>,
    }

    impl MarketDataPort for FixedData {
        fn fetch_bars(&self, _symbol: &str, lookback: usize) -> Result<Vec<PriceBar>, SigtraderError> {
            self.calls.set(self.calls.get() + 1);
            let start = self.bars.len().saturating_sub(lookback);
            Ok(self.bars[start..].to_vec())
        }
    }

    struct StubBroker {
        open: bool,
        held: f64,
        orders: Cell<u32>,
    }

    impl BrokerPort for StubBroker {
        fn is_market_open(&self, _date: NaiveDate) -> Result<bool, BrokerFault> {
            Ok(self.open)
        }

        fn position(&self, symbol: &str) -> Result<Position, BrokerFault> {
            Ok(Position {
                symbol: symbol.to_string(),
                quantity: self.held,
                average_cost: 90.0,
            })
        }

        fn available_cash(&self) -> Result<f64, BrokerFault> {
            Ok(10_000.0)
        }

        fn last_price(&self, _symbol: &str) -> Result<f64, BrokerFault> {
            Ok(100.0)
        }

        fn place_order(&self, plan: &TradePlan, _timeout: Duration) -> Result<OrderAck, BrokerFault> {
            self.orders.set(self.orders.get() + 1);
            Ok(OrderAck {
                order_id: "paper-1".into(),
                filled: true,
                filled_quantity: plan.quantity,
                fill_price: plan.price_estimate,
                commission: plan.commission_estimate,
            })
        }
    }

    struct NoSleep;

    impl Sleeper for NoSleep {
        fn sleep(&self, _duration: Duration) {}
    }

    struct FailingSink;

    impl ReportPort for FailingSink {
        fn publish(&self, _report: &SessionReport) -> Result<(), SigtraderError> {
            Err(SigtraderError::Io(std::io::Error::other("disk full")))
        }
    }

    #[derive(Default)]
    struct CollectingSink {
        reports: RefCell<Vec<SessionReport>>,
    }

    impl ReportPort for CollectingSink {
        fn publish(&self, report: &SessionReport) -> Result<(), SigtraderError> {
            self.reports.borrow_mut().push(report.clone());
            Ok(())
        }
    }

    fn broker(open: bool, held: f64) -> StubBroker {
        StubBroker {
            open,
            held,
            orders: Cell::new(0),
        }
    }

    fn data(count: usize) -> FixedData {
        FixedData {
            bars: flat_bars(count, 100.0, 1_000_000.0),
            calls: Cell::new(0),
        }
    }

    #[test]
    fn flat_history_buys() {
        let config = TraderConfig::for_symbol("TQQQ");
        let data = data(80);
        let broker = broker(true, 0.0);
        let sink = CollectingSink::default();
        let ctx = SessionContext {
            config: &config,
            data: &data,
            broker: &broker,
            sinks: vec![&sink as &dyn ReportPort],
            sleeper: &NoSleep,
        };
        let report = run_session(&ctx, day(80)).unwrap();
        assert_eq!(report.signal, MarketSignal::Bullish);
        assert_eq!(report.plan.side, TradeSide::Buy);
        assert_eq!(report.as_of, Some(day(79)));
        assert_eq!(report.warnings.len(), 10);
        assert_eq!(
            report.result.as_ref().map(|r| r.status),
            Some(OrderStatus::Filled)
        );
        assert_eq!(sink.reports.borrow().len(), 1);
    }

    #[test]
    fn closed_market_skips_everything() {
        let config = TraderConfig::for_symbol("TQQQ");
        let data = data(80);
        let broker = broker(false, 5.0);
        let ctx = SessionContext {
            config: &config,
            data: &data,
            broker: &broker,
            sinks: vec![],
            sleeper: &NoSleep,
        };
        let report = run_session(&ctx, day(80)).unwrap();
        assert_eq!(report.signal, MarketSignal::Closed);
        assert_eq!(report.plan.side, TradeSide::Hold);
        assert!(report.result.is_none());
        assert_eq!(data.calls.get(), 0);
        assert_eq!(broker.orders.get(), 0);
    }

    #[test]
    fn in_progress_bar_is_dropped() {
        let config = TraderConfig::for_symbol("TQQQ");
        let data = data(80);
        let broker = broker(true, 0.0);
        let evaluation = evaluate_signal(&config, &data, &broker, day(79)).unwrap();
        assert_eq!(evaluation.as_of, Some(day(78)));
    }

    #[test]
    fn short_history_places_no_order() {
        let config = TraderConfig::for_symbol("TQQQ");
        let data = data(59);
        let broker = broker(true, 5.0);
        let ctx = SessionContext {
            config: &config,
            data: &data,
            broker: &broker,
            sinks: vec![],
            sleeper: &NoSleep,
        };
        let err = run_session(&ctx, day(100)).unwrap_err();
        assert!(err.is_data_error());
        assert_eq!(broker.orders.get(), 0);
    }

    #[test]
    fn sink_failure_does_not_fail_run() {
        let config = TraderConfig::for_symbol("TQQQ");
        let data = data(80);
        let broker = broker(true, 0.0);
        let collecting = CollectingSink::default();
        let ctx = SessionContext {
            config: &config,
            data: &data,
            broker: &broker,
            sinks: vec![&FailingSink as &dyn ReportPort, &collecting],
            sleeper: &NoSleep,
        };
        assert!(run_session(&ctx, day(80)).is_ok());
        assert_eq!(collecting.reports.borrow().len(), 1);
    }
}
