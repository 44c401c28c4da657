//! In-process paper broker.
//!
//! Fills every market order immediately at the configured price, adjusted for
//! slippage, and charges the configured commission schedule. Cash and the
//! single position live in memory for the lifetime of the adapter.

use std::cell::RefCell;
use std::time::Duration;

use chrono::{Datelike, NaiveDate, Weekday};
use tracing::debug;

use crate::domain::commission::{round_cents, CommissionSchedule};
use crate::domain::error::BrokerFault;
use crate::domain::execution::OrderAck;
use crate::domain::planner::{TradePlan, TradeSide};
use crate::domain::position::Position;
use crate::ports::broker_port::BrokerPort;

#[derive(Debug, Clone, PartialEq)]
pub struct PaperBrokerConfig {
    pub symbol: String,
    pub cash: f64,
    pub quantity: f64,
    pub average_cost: f64,
    pub price: f64,
    /// Percent applied against the trader: buys fill higher, sells lower.
    pub slippage_pct: f64,
    pub commission: CommissionSchedule,
    pub holidays: Vec<NaiveDate>,
}

impl PaperBrokerConfig {
    pub fn new(symbol: &str, cash: f64, price: f64) -> Self {
        PaperBrokerConfig {
            symbol: symbol.to_string(),
            cash,
            quantity: 0.0,
            average_cost: 0.0,
            price,
            slippage_pct: 0.0,
            commission: CommissionSchedule::tiered(),
            holidays: Vec::new(),
        }
    }
}

#[derive(Debug)]
struct Account {
    cash: f64,
    position: Position,
    next_order: u32,
}

pub struct PaperBroker {
    config: PaperBrokerConfig,
    account: RefCell<Account>,
}

impl PaperBroker {
    pub fn new(config: PaperBrokerConfig) -> Self {
        let account = Account {
            cash: config.cash,
            position: Position {
                symbol: config.symbol.clone(),
                quantity: config.quantity,
                average_cost: config.average_cost,
            },
            next_order: 1,
        };
        PaperBroker {
            config,
            account: RefCell::new(account),
        }
    }

    fn fill_price(&self, side: TradeSide) -> f64 {
        let slip = self.config.slippage_pct / 100.0;
        match side {
            TradeSide::Buy => self.config.price * (1.0 + slip),
            TradeSide::Sell => self.config.price * (1.0 - slip),
            TradeSide::Hold => self.config.price,
        }
    }
}

impl BrokerPort for PaperBroker {
    fn is_market_open(&self, date: NaiveDate) -> Result<bool, BrokerFault> {
        let weekday = !matches!(date.weekday(), Weekday::Sat | Weekday::Sun);
        Ok(weekday && !self.config.holidays.contains(&date))
    }

    fn position(&self, symbol: &str) -> Result<Position, BrokerFault> {
        let account = self.account.borrow();
        if symbol == account.position.symbol {
            Ok(account.position.clone())
        } else {
            Ok(Position::flat(symbol))
        }
    }

    fn available_cash(&self) -> Result<f64, BrokerFault> {
        Ok(self.account.borrow().cash)
    }

    fn last_price(&self, symbol: &str) -> Result<f64, BrokerFault> {
        if symbol != self.config.symbol {
            return Err(BrokerFault::InvalidContract(format!(
                "no quote for {symbol}"
            )));
        }
        Ok(self.config.price)
    }

    fn place_order(&self, plan: &TradePlan, _timeout: Duration) -> Result<OrderAck, BrokerFault> {
        if plan.symbol != self.config.symbol {
            return Err(BrokerFault::InvalidContract(plan.symbol.clone()));
        }
        if plan.quantity <= 0.0 {
            return Err(BrokerFault::Rejected(format!(
                "non-positive quantity {}",
                plan.quantity
            )));
        }

        let mut account = self.account.borrow_mut();
        let fill_price = self.fill_price(plan.side);
        let value = plan.quantity * fill_price;
        let commission = self.config.commission.estimate(plan.quantity, fill_price);

        match plan.side {
            TradeSide::Buy => {
                let total = value + commission;
                if total > account.cash {
                    return Err(BrokerFault::InsufficientFunds(format!(
                        "need {:.2}, have {:.2}",
                        total, account.cash
                    )));
                }
                let held = account.position.quantity;
                let new_quantity = held + plan.quantity;
                account.position.average_cost =
                    (held * account.position.average_cost + value) / new_quantity;
                account.position.quantity = new_quantity;
                account.cash = round_cents(account.cash - total);
            }
            TradeSide::Sell => {
                if plan.quantity > account.position.quantity + 1e-9 {
                    return Err(BrokerFault::Rejected(format!(
                        "sell {} exceeds position {}",
                        plan.quantity, account.position.quantity
                    )));
                }
                account.position.quantity = (account.position.quantity - plan.quantity).max(0.0);
                if account.position.quantity == 0.0 {
                    account.position.average_cost = 0.0;
                }
                account.cash = round_cents(account.cash + value - commission);
            }
            TradeSide::Hold => {
                return Err(BrokerFault::Rejected("hold plans carry no order".into()));
            }
        }

        let order_id = format!("paper-{}", account.next_order);
        account.next_order += 1;
        debug!(
            %order_id,
            side = %plan.side,
            quantity = plan.quantity,
            fill_price,
            commission,
            cash = account.cash,
            "paper fill"
        );

        Ok(OrderAck {
            order_id,
            filled: true,
            filled_quantity: plan.quantity,
            fill_price,
            commission,
        })
    }
}
