//! Order execution against the broker.
//!
//! Each plan walks `Planned -> Submitted -> {Filled | Rejected | TimedOut}`.
//! Retryable faults are resubmitted under the injected `RetryPolicy`;
//! anything else stops at once. The outcome is always returned as an
//! `OrderResult`, including REJECTED and FAILED terminal states.

use std::fmt;
use std::time::Duration;

use tracing::{error, info, warn};

use super::error::{BrokerFault, FailedStatus, SigtraderError};
use super::planner::{TradePlan, TradeSide};
use super::retry::{RetryPolicy, Sleeper};
use crate::ports::broker_port::BrokerPort;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OrderState {
    Planned,
    Submitted,
    Filled,
    Rejected,
    TimedOut,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OrderStatus {
    Filled,
    Rejected,
    Pending,
    Failed,
}

impl fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OrderStatus::Filled => write!(f, "FILLED"),
            OrderStatus::Rejected => write!(f, "REJECTED"),
            OrderStatus::Pending => write!(f, "PENDING"),
            OrderStatus::Failed => write!(f, "FAILED"),
        }
    }
}

/// What the broker reports back for an accepted order.
#[derive(Debug, Clone, PartialEq)]
pub struct OrderAck {
    pub order_id: String,
    pub filled: bool,
    pub filled_quantity: f64,
    pub fill_price: f64,
    pub commission: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct OrderResult {
    pub order_id: Option<String>,
    pub side: TradeSide,
    pub status: OrderStatus,
    pub requested_quantity: f64,
    pub filled_quantity: f64,
    pub fill_price: f64,
    pub commission: f64,
    pub retry_count: u32,
    pub last_fault: Option<BrokerFault>,
    pub transitions: Vec<OrderState>,
}

impl OrderResult {
    pub fn attempts(&self) -> u32 {
        self.retry_count + 1
    }

    pub fn notional(&self) -> f64 {
        self.filled_quantity * self.fill_price
    }

    /// Escalate REJECTED and FAILED outcomes with their attempt context.
    pub fn ensure_filled(&self) -> Result<(), SigtraderError> {
        let status = match self.status {
            OrderStatus::Filled | OrderStatus::Pending => return Ok(()),
            OrderStatus::Rejected => FailedStatus::Rejected,
            OrderStatus::Failed => FailedStatus::Failed,
        };
        Err(SigtraderError::OrderExecution {
            status,
            attempts: self.attempts(),
            last_fault: self
                .last_fault
                .as_ref()
                .map(ToString::to_string)
                .unwrap_or_default(),
        })
    }
}

pub struct ExecutionEngine<'a> {
    broker: &'a dyn BrokerPort,
    policy: RetryPolicy,
    attempt_timeout: Duration,
    sleeper: &'a dyn Sleeper,
}

impl<'a> ExecutionEngine<'a> {
    pub fn new(
        broker: &'a dyn BrokerPort,
        policy: RetryPolicy,
        attempt_timeout: Duration,
        sleeper: &'a dyn Sleeper,
    ) -> Self {
        ExecutionEngine {
            broker,
            policy,
            attempt_timeout,
            sleeper,
        }
    }

    /// Submit `plan`. A plan with nothing to trade is never sent.
    pub fn execute(&self, plan: &TradePlan) -> Option<OrderResult> {
        if !plan.is_actionable() {
            info!(rationale = %plan.rationale, "no order to place");
            return None;
        }

        let mut result = OrderResult {
            order_id: None,
            side: plan.side,
            status: OrderStatus::Failed,
            requested_quantity: plan.quantity,
            filled_quantity: 0.0,
            fill_price: 0.0,
            commission: 0.0,
            retry_count: 0,
            last_fault: None,
            transitions: vec![OrderState::Planned],
        };

        let mut attempts = 0;
        loop {
            attempts += 1;
            result.retry_count = attempts - 1;
            result.transitions.push(OrderState::Submitted);
            info!(
                side = %plan.side,
                symbol = %plan.symbol,
                quantity = plan.quantity,
                attempt = attempts,
                "submitting order"
            );

            match self.broker.place_order(plan, self.attempt_timeout) {
                Ok(ack) => {
                    result.order_id = Some(ack.order_id);
                    if ack.filled {
                        result.transitions.push(OrderState::Filled);
                        result.status = OrderStatus::Filled;
                        result.filled_quantity = ack.filled_quantity;
                        result.fill_price = ack.fill_price;
                        result.commission = ack.commission;
                        info!(
                            quantity = result.filled_quantity,
                            price = result.fill_price,
                            commission = result.commission,
                            "order filled"
                        );
                    } else {
                        result.status = OrderStatus::Pending;
                        info!("order accepted, awaiting fill");
                    }
                    return Some(result);
                }
                Err(fault) => {
                    result.transitions.push(match fault {
                        BrokerFault::Timeout => OrderState::TimedOut,
                        _ => OrderState::Rejected,
                    });

                    if !(self.policy.retryable)(&fault) {
                        error!(%fault, attempt = attempts, "order rejected, not retrying");
                        result.status = OrderStatus::Rejected;
                        result.last_fault = Some(fault);
                        return Some(result);
                    }

                    if !self.policy.should_retry(&fault, attempts) {
                        error!(%fault, attempts, "order failed after exhausting retries");
                        result.status = OrderStatus::Failed;
                        result.last_fault = Some(fault);
                        return Some(result);
                    }

                    let delay = self.policy.delay_for(attempts);
                    warn!(
                        %fault,
                        attempt = attempts,
                        max_attempts = self.policy.max_attempts,
                        delay_ms = delay.as_millis() as u64,
                        "retryable order fault"
                    );
                    result.last_fault = Some(fault);
                    self.sleeper.sleep(delay);
                }
            }
        }
    }
}
