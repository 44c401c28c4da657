//! Order planner: signal + position + cash to a single trade plan.
//!
//! Buys are sized so that quantity * price + commission never exceeds
//! `cash - cash_buffer`. The minimum-cash threshold is a go/no-go gate on that
//! same spendable amount. Sells always close the whole position.

use std::fmt;

use super::commission::CommissionSchedule;
use super::position::Position;
use super::signal::MarketSignal;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TradeSide {
    Buy,
    Sell,
    Hold,
}

impl fmt::Display for TradeSide {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TradeSide::Buy => write!(f, "BUY"),
            TradeSide::Sell => write!(f, "SELL"),
            TradeSide::Hold => write!(f, "NONE"),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct TradePlan {
    pub symbol: String,
    pub side: TradeSide,
    pub quantity: f64,
    pub price_estimate: f64,
    pub commission_estimate: f64,
    pub rationale: String,
}

impl TradePlan {
    pub fn hold(symbol: &str, rationale: impl Into<String>) -> Self {
        TradePlan {
            symbol: symbol.to_string(),
            side: TradeSide::Hold,
            quantity: 0.0,
            price_estimate: 0.0,
            commission_estimate: 0.0,
            rationale: rationale.into(),
        }
    }

    pub fn is_actionable(&self) -> bool {
        self.side != TradeSide::Hold && self.quantity > 0.0
    }

    pub fn notional(&self) -> f64 {
        self.quantity * self.price_estimate
    }

    /// Cash the plan consumes on a buy: notional plus commission.
    pub fn total_cost(&self) -> f64 {
        self.notional() + self.commission_estimate
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct PlannerConfig {
    pub cash_buffer: f64,
    pub min_cash: f64,
    pub commission: CommissionSchedule,
    /// Decimal places allowed in a share quantity; 0 means whole shares.
    pub quantity_precision: u32,
}

impl Default for PlannerConfig {
    fn default() -> Self {
        PlannerConfig {
            cash_buffer: 1.0,
            min_cash: 5.0,
            commission: CommissionSchedule::tiered(),
            quantity_precision: 4,
        }
    }
}

pub struct OrderPlanner {
    config: PlannerConfig,
}

impl OrderPlanner {
    pub fn new(config: PlannerConfig) -> Self {
        OrderPlanner { config }
    }

    pub fn config(&self) -> &PlannerConfig {
        &self.config
    }

    pub fn plan(
        &self,
        signal: MarketSignal,
        position: &Position,
        cash: f64,
        price: f64,
    ) -> TradePlan {
        let symbol = position.symbol.as_str();
        match signal {
            MarketSignal::Closed => TradePlan::hold(symbol, "market closed"),
            MarketSignal::Bullish if position.is_held() => TradePlan::hold(
                symbol,
                format!("bullish, already holding {} shares", position.quantity),
            ),
            MarketSignal::Bullish => self.plan_buy(symbol, cash, price),
            MarketSignal::Bearish | MarketSignal::Neutral if position.is_held() => {
                self.plan_sell(signal, position, price)
            }
            MarketSignal::Bearish | MarketSignal::Neutral => {
                TradePlan::hold(symbol, format!("{signal}, no position to sell"))
            }
        }
    }

    fn plan_sell(&self, signal: MarketSignal, position: &Position, price: f64) -> TradePlan {
        let quantity = position.quantity;
        let (price_estimate, commission_estimate) = if price.is_finite() && price > 0.0 {
            (price, self.config.commission.estimate(quantity, price))
        } else {
            (0.0, 0.0)
        };
        TradePlan {
            symbol: position.symbol.clone(),
            side: TradeSide::Sell,
            quantity,
            price_estimate,
            commission_estimate,
            rationale: format!("{signal}, closing full position of {quantity} shares"),
        }
    }

    fn plan_buy(&self, symbol: &str, cash: f64, price: f64) -> TradePlan {
        if !price.is_finite() || price <= 0.0 {
            return TradePlan::hold(symbol, format!("no usable price estimate ({price})"));
        }

        let spendable = cash - self.config.cash_buffer;
        if spendable.is_nan() || spendable < self.config.min_cash {
            return TradePlan::hold(
                symbol,
                format!(
                    "insufficient cash: {:.2} after buffer is below minimum {:.2}",
                    spendable, self.config.min_cash
                ),
            );
        }

        let quantity = self.max_affordable(spendable, price);
        if quantity <= 0.0 {
            return TradePlan::hold(
                symbol,
                format!("cash {spendable:.2} does not cover one lot at {price:.2}"),
            );
        }

        TradePlan {
            symbol: symbol.to_string(),
            side: TradeSide::Buy,
            quantity,
            price_estimate: price,
            commission_estimate: self.config.commission.estimate(quantity, price),
            rationale: format!("BULLISH, buying with {spendable:.2} available after buffer"),
        }
    }

    fn total_cost(&self, quantity: f64, price: f64) -> f64 {
        quantity * price + self.config.commission.estimate(quantity, price)
    }

    /// Largest quantity on the precision grid whose cost plus commission fits
    /// in `spendable`.
    pub fn max_affordable(&self, spendable: f64, price: f64) -> f64 {
        if spendable <= 0.0 || price <= 0.0 {
            return 0.0;
        }

        let rate = self.config.commission.rate_per_share();
        let minimum = self.config.commission.minimum();
        // Cost is the larger of the per-share and minimum pieces, so both
        // bounds must hold.
        let uncapped = (spendable / (price + rate)).min((spendable - minimum) / price);
        let exact = match self.config.commission {
            // The cap gives a third piece; the cost is below budget if either
            // the uncapped or the capped branch is.
            CommissionSchedule::Tiered { max_pct, .. } => {
                uncapped.max(spendable / (price * (1.0 + max_pct / 100.0)))
            }
            CommissionSchedule::Fixed { .. } => uncapped,
        };

        let scale = 10f64.powi(self.config.quantity_precision as i32);
        let step = 1.0 / scale;
        let mut quantity = (exact.max(0.0) * scale).floor() / scale;

        // Cent rounding of the commission can push the total just over budget.
        while quantity > 0.0 {
            let overshoot = self.total_cost(quantity, price) - spendable;
            if overshoot <= 0.0 {
                break;
            }
            let steps = (overshoot / price * scale).ceil().max(1.0);
            quantity = ((quantity - steps * step) * scale).round() / scale;
        }

        quantity.max(0.0)
    }
}
