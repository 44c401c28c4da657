//! Domain error types.
//!
//! Data and configuration errors are fatal for a run. Broker faults are
//! classified as retryable or not and consumed by the execution engine.

use std::fmt;

/// A fault reported by the broker for a single request.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum BrokerFault {
    #[error("network error: {0}")]
    Network(String),

    #[error("request timed out")]
    Timeout,

    #[error("transient broker fault: {0}")]
    Transient(String),

    #[error("permission denied: {0}")]
    PermissionDenied(String),

    #[error("invalid contract: {0}")]
    InvalidContract(String),

    #[error("insufficient funds: {0}")]
    InsufficientFunds(String),

    #[error("order rejected: {0}")]
    Rejected(String),
}

impl BrokerFault {
    /// Network, timeout and transient faults may succeed on resubmission.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            BrokerFault::Network(_) | BrokerFault::Timeout | BrokerFault::Transient(_)
        )
    }
}

/// Terminal order status carried in an execution error.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailedStatus {
    Rejected,
    Failed,
}

impl fmt::Display for FailedStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FailedStatus::Rejected => write!(f, "REJECTED"),
            FailedStatus::Failed => write!(f, "FAILED"),
        }
    }
}

/// Top-level error type for sigtrader.
#[derive(Debug, thiserror::Error)]
pub enum SigtraderError {
    #[error("insufficient price history: have {bars} bars, need {minimum}")]
    InsufficientData { bars: usize, minimum: usize },

    #[error("malformed price data: {reason}")]
    MalformedData { reason: String },

    #[error("market data unavailable for {symbol}: {reason}")]
    DataUnavailable { symbol: String, reason: String },

    #[error("config parse error in {file}: {reason}")]
    ConfigParse { file: String, reason: String },

    #[error("missing config key [{section}] {key}")]
    ConfigMissing { section: String, key: String },

    #[error("invalid config value [{section}] {key}: {reason}")]
    ConfigInvalid {
        section: String,
        key: String,
        reason: String,
    },

    #[error("broker request failed: {0}")]
    Broker(#[from] BrokerFault),

    #[error("order {status} after {attempts} attempt(s): {last_fault}")]
    OrderExecution {
        status: FailedStatus,
        attempts: u32,
        last_fault: String,
    },

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl SigtraderError {
    /// True for errors that mean no signal can be produced from the price history.
    pub fn is_data_error(&self) -> bool {
        matches!(
            self,
            SigtraderError::InsufficientData { .. }
                | SigtraderError::MalformedData { .. }
                | SigtraderError::DataUnavailable { .. }
        )
    }
}

impl From<&SigtraderError> for std::process::ExitCode {
    fn from(err: &SigtraderError) -> Self {
        let code: u8 = match err {
            SigtraderError::Io(_) => 1,
            SigtraderError::ConfigParse { .. }
            | SigtraderError::ConfigMissing { .. }
            | SigtraderError::ConfigInvalid { .. } => 2,
            SigtraderError::Broker(_) => 3,
            SigtraderError::InsufficientData { .. }
            | SigtraderError::MalformedData { .. }
            | SigtraderError::DataUnavailable { .. } => 5,
            SigtraderError::OrderExecution { .. } => 6,
        };
        std::process::ExitCode::from(code)
    }
}
