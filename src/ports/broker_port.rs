//! Broker session port.
//!
//! The session is already authenticated; implementations own login and
//! connection lifecycle.

use chrono::NaiveDate;
use std::time::Duration;

use crate::domain::error::BrokerFault;
use crate::domain::execution::OrderAck;
use crate::domain::planner::TradePlan;
use crate::domain::position::Position;

pub trait BrokerPort {
    fn is_market_open(&self, date: NaiveDate) -> Result<bool, BrokerFault>;

    fn position(&self, symbol: &str) -> Result<Position, BrokerFault>;

    fn available_cash(&self) -> Result<f64, BrokerFault>;

    fn last_price(&self, symbol: &str) -> Result<f64, BrokerFault>;

    /// Submit one market order. Implementations must give up after `timeout`
    /// and report `BrokerFault::Timeout`.
    fn place_order(&self, plan: &TradePlan, timeout: Duration) -> Result<OrderAck, BrokerFault>;
}
