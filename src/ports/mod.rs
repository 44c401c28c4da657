//! Port traits for the collaborators around the trading core.

pub mod broker_port;
pub mod config_port;
pub mod data_port;
pub mod report_port;
