//! Core domain types and logic.

pub mod ohlcv;
pub mod indicator;
pub mod warning;
pub mod signal;
pub mod commission;
pub mod position;
pub mod planner;
pub mod retry;
pub mod execution;
pub mod session;
pub mod config;
pub mod config_validation;
pub mod error;
