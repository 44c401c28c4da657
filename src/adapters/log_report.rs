//! Session summary through `tracing`.

use tracing::{info, warn};

use crate::domain::error::SigtraderError;
use crate::domain::execution::OrderStatus;
use crate::domain::session::SessionReport;
use crate::ports::report_port::ReportPort;

pub struct LogReport;

impl ReportPort for LogReport {
    fn publish(&self, report: &SessionReport) -> Result<(), SigtraderError> {
        let warning_days = report.warnings.iter().filter(|w| w.any()).count();
        info!(
            symbol = %report.symbol,
            date = %report.session_date,
            signal = %report.signal,
            as_of = ?report.as_of,
            warning_days,
            side = %report.plan.side,
            quantity = report.plan.quantity,
            "session summary"
        );

        match &report.result {
            None => info!(rationale = %report.plan.rationale, "no order placed"),
            Some(result) => match result.status {
                OrderStatus::Filled | OrderStatus::Pending => info!(
                    order_id = result.order_id.as_deref().unwrap_or("-"),
                    status = %result.status,
                    filled = result.filled_quantity,
                    price = result.fill_price,
                    notional = result.notional(),
                    commission = result.commission,
                    retries = result.retry_count,
                    "order outcome"
                ),
                OrderStatus::Rejected | OrderStatus::Failed => warn!(
                    status = %result.status,
                    attempts = result.attempts(),
                    last_fault = ?result.last_fault,
                    "order outcome"
                ),
            },
        }
        Ok(())
    }
}
