#![allow(dead_code)]

use chrono::NaiveDate;
use sigtrader::domain::error::{BrokerFault, SigtraderError};
use sigtrader::domain::execution::OrderAck;
pub use sigtrader::domain::ohlcv::PriceBar;
use sigtrader::domain::planner::TradePlan;
use sigtrader::domain::position::Position;
use sigtrader::domain::retry::Sleeper;
use sigtrader::domain::session::SessionReport;
use sigtrader::ports::broker_port::BrokerPort;
use sigtrader::ports::data_port::MarketDataPort;
use sigtrader::ports::report_port::ReportPort;
use std::cell::{Cell, RefCell};
use std::collections::{HashMap, VecDeque};
use std::time::Duration;

pub struct MockDataPort {
    pub data: HashMap<String, Vec<PriceBar>>,
    pub errors: HashMap<String, String>,
    pub calls: Cell<u32>,
}

impl MockDataPort {
    pub fn new() -> Self {
        Self {
            data: HashMap::new(),
            errors: HashMap::new(),
            calls: Cell::new(0),
        }
    }

    pub fn with_bars(mut self, symbol: &str, bars: Vec<PriceBar>) -> Self {
        self.data.insert(symbol.to_string(), bars);
        self
    }

    pub fn with_error(mut self, symbol: &str, reason: &str) -> Self {
        self.errors.insert(symbol.to_string(), reason.to_string());
        self
    }
}

impl MarketDataPort for MockDataPort {
    fn fetch_bars(&self, symbol: &str, lookback: usize) -> Result<Vec<PriceBar>, SigtraderError> {
        self.calls.set(self.calls.get() + 1);
        if let Some(reason) = self.errors.get(symbol) {
            return Err(SigtraderError::DataUnavailable {
                symbol: symbol.to_string(),
                reason: reason.clone(),
            });
        }
        let bars = self.data.get(symbol).cloned().unwrap_or_default();
        let start = bars.len().saturating_sub(lookback);
        Ok(bars[start..].to_vec())
    }
}

/// Broker with a fixed snapshot and a script of order replies. Once the
/// script runs out every order fills in full at `price`.
pub struct MockBroker {
    pub open: bool,
    pub position: Position,
    pub cash: f64,
    pub price: f64,
    pub replies: RefCell<VecDeque<Result<OrderAck, BrokerFault>>>,
    pub orders: RefCell<Vec<TradePlan>>,
}

impl MockBroker {
    pub fn new(symbol: &str, cash: f64, price: f64) -> Self {
        Self {
            open: true,
            position: Position::flat(symbol),
            cash,
            price,
            replies: RefCell::new(VecDeque::new()),
            orders: RefCell::new(Vec::new()),
        }
    }

    pub fn closed(mut self) -> Self {
        self.open = false;
        self
    }

    pub fn holding(mut self, quantity: f64) -> Self {
        self.position.quantity = quantity;
        self.position.average_cost = self.price;
        self
    }

    pub fn with_replies(self, replies: Vec<Result<OrderAck, BrokerFault>>) -> Self {
        *self.replies.borrow_mut() = replies.into();
        self
    }

    pub fn order_count(&self) -> usize {
        self.orders.borrow().len()
    }
}

impl BrokerPort for MockBroker {
    fn is_market_open(&self, _date: NaiveDate) -> Result<bool, BrokerFault> {
        Ok(self.open)
    }

    fn position(&self, symbol: &str) -> Result<Position, BrokerFault> {
        if symbol == self.position.symbol {
            Ok(self.position.clone())
        } else {
            Ok(Position::flat(symbol))
        }
    }

    fn available_cash(&self) -> Result<f64, BrokerFault> {
        Ok(self.cash)
    }

    fn last_price(&self, _symbol: &str) -> Result<f64, BrokerFault> {
        Ok(self.price)
    }

    fn place_order(&self, plan: &TradePlan, _timeout: Duration) -> Result<OrderAck, BrokerFault> {
        self.orders.borrow_mut().push(plan.clone());
        match self.replies.borrow_mut().pop_front() {
            Some(reply) => reply,
            None => Ok(fill(plan.quantity, self.price, plan.commission_estimate)),
        }
    }
}

pub fn fill(quantity: f64, price: f64, commission: f64) -> OrderAck {
    OrderAck {
        order_id: "mock-1".into(),
        filled: true,
        filled_quantity: quantity,
        fill_price: price,
        commission,
    }
}

#[derive(Default)]
pub struct RecordingSleeper {
    pub slept: RefCell<Vec<Duration>>,
}

impl Sleeper for RecordingSleeper {
    fn sleep(&self, duration: Duration) {
        self.slept.borrow_mut().push(duration);
    }
}

#[derive(Default)]
pub struct CollectingSink {
    pub reports: RefCell<Vec<SessionReport>>,
}

impl ReportPort for CollectingSink {
    fn publish(&self, report: &SessionReport) -> Result<(), SigtraderError> {
        self.reports.borrow_mut().push(report.clone());
        Ok(())
    }
}

pub struct FailingSink;

impl ReportPort for FailingSink {
    fn publish(&self, _report: &SessionReport) -> Result<(), SigtraderError> {
        Err(SigtraderError::Io(std::io::Error::other("sink offline")))
    }
}

pub fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

/// `count` consecutive daily bars closing at `close` with a 2-point range.
pub fn flat_bars(start: NaiveDate, count: usize, close: f64, volume: f64) -> Vec<PriceBar> {
    (0..count)
        .map(|i| PriceBar {
            date: start + chrono::Duration::days(i as i64),
            open: close,
            high: close + 1.0,
            low: close - 1.0,
            close,
            volume,
        })
        .collect()
}

/// Turn bar `i` into a distribution day: wide range, close near the low and
/// triple volume. Assumes a flat history at 100 with 1M volume.
pub fn make_distribution_day(bars: &mut [PriceBar], i: usize) {
    let bar = &mut bars[i];
    bar.open = 100.0;
    bar.high = 104.0;
    bar.low = 96.0;
    bar.close = 96.5;
    bar.volume = 3_000_000.0;
}

/// Close back at 100 on matching volume so up and down volume balance.
pub fn make_recovery_day(bars: &mut [PriceBar], i: usize) {
    let bar = &mut bars[i];
    bar.open = 99.5;
    bar.high = 101.0;
    bar.low = 99.0;
    bar.close = 100.0;
    bar.volume = 3_000_000.0;
}

pub fn history_start() -> NaiveDate {
    date(2024, 1, 1)
}

/// The day after the last bar of a history built from `history_start`.
pub fn session_after(count: usize) -> NaiveDate {
    history_start() + chrono::Duration::days(count as i64)
}
