//! Broker commission schedules.
//!
//! TIERED: min(max(rate * qty, minimum), max_pct% * trade value)
//! FIXED:  max(rate * qty, minimum)
//!
//! Estimates are rounded to the cent.

use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum CommissionSchedule {
    Tiered {
        rate_per_share: f64,
        minimum: f64,
        max_pct: f64,
    },
    Fixed {
        rate_per_share: f64,
        minimum: f64,
    },
}

impl CommissionSchedule {
    pub fn tiered() -> Self {
        CommissionSchedule::Tiered {
            rate_per_share: 0.0035,
            minimum: 0.35,
            max_pct: 1.0,
        }
    }

    pub fn fixed() -> Self {
        CommissionSchedule::Fixed {
            rate_per_share: 0.005,
            minimum: 1.0,
        }
    }

    pub fn rate_per_share(&self) -> f64 {
        match self {
            CommissionSchedule::Tiered { rate_per_share, .. }
            | CommissionSchedule::Fixed { rate_per_share, .. } => *rate_per_share,
        }
    }

    pub fn minimum(&self) -> f64 {
        match self {
            CommissionSchedule::Tiered { minimum, .. } | CommissionSchedule::Fixed { minimum, .. } => {
                *minimum
            }
        }
    }

    /// Commission before rounding.
    pub fn raw(&self, quantity: f64, price: f64) -> f64 {
        if quantity <= 0.0 {
            return 0.0;
        }
        match *self {
            CommissionSchedule::Tiered {
                rate_per_share,
                minimum,
                max_pct,
            } => {
                let value = quantity * price;
                (rate_per_share * quantity)
                    .max(minimum)
                    .min(value * max_pct / 100.0)
            }
            CommissionSchedule::Fixed {
                rate_per_share,
                minimum,
            } => (rate_per_share * quantity).max(minimum),
        }
    }

    pub fn estimate(&self, quantity: f64, price: f64) -> f64 {
        round_cents(self.raw(quantity, price))
    }
}

pub fn round_cents(amount: f64) -> f64 {
    (amount * 100.0).round() / 100.0
}

impl fmt::Display for CommissionSchedule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CommissionSchedule::Tiered { .. } => write!(f, "TIERED"),
            CommissionSchedule::Fixed { .. } => write!(f, "FIXED"),
        }
    }
}

impl FromStr for CommissionSchedule {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_uppercase().as_str() {
            "TIERED" => Ok(CommissionSchedule::tiered()),
            "FIXED" => Ok(CommissionSchedule::fixed()),
            other => Err(format!(
                "unknown commission type '{other}', expected TIERED or FIXED"
            )),
        }
    }
}
