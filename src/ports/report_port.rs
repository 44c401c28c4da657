//! Reporting sink port.

use crate::domain::error::SigtraderError;
use crate::domain::session::SessionReport;

/// Receives the structured summary of each run. Failures are logged by the
/// caller and never abort a run.
pub trait ReportPort {
    fn publish(&self, report: &SessionReport) -> Result<(), SigtraderError>;
}
