//! Append-only CSV trade history.

use std::fs::{self, OpenOptions};
use std::path::PathBuf;

use chrono::NaiveDate;
use serde::Serialize;
use tracing::info;

use crate::domain::error::SigtraderError;
use crate::domain::session::SessionReport;
use crate::ports::report_port::ReportPort;

#[derive(Debug, Serialize)]
struct JournalRow<'a> {
    date: NaiveDate,
    order_id: &'a str,
    action: String,
    symbol: &'a str,
    quantity: f64,
    fill_price: f64,
    dollar_amount: f64,
    commission: f64,
    status: String,
    retries: u32,
    signal: String,
}

pub struct CsvTradeJournal {
    path: PathBuf,
}

impl CsvTradeJournal {
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }

    fn csv_error(&self, e: csv::Error) -> SigtraderError {
        SigtraderError::Io(std::io::Error::other(format!(
            "failed to write {}: {}",
            self.path.display(),
            e
        )))
    }
}

impl ReportPort for CsvTradeJournal {
    /// One row per submitted order; runs without an order write nothing.
    fn publish(&self, report: &SessionReport) -> Result<(), SigtraderError> {
        let Some(result) = &report.result else {
            return Ok(());
        };

        if let Some(dir) = self.path.parent().filter(|d| !d.as_os_str().is_empty()) {
            fs::create_dir_all(dir)?;
        }
        let is_new = fs::metadata(&self.path).map(|m| m.len() == 0).unwrap_or(true);
        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)?;

        let mut wtr = csv::WriterBuilder::new()
            .has_headers(is_new)
            .from_writer(file);
        wtr.serialize(JournalRow {
            date: report.session_date,
            order_id: result.order_id.as_deref().unwrap_or(""),
            action: result.side.to_string(),
            symbol: &report.symbol,
            quantity: result.filled_quantity,
            fill_price: result.fill_price,
            dollar_amount: (result.notional() * 100.0).round() / 100.0,
            commission: result.commission,
            status: result.status.to_string(),
            retries: result.retry_count,
            signal: report.signal.to_string(),
        })
        .map_err(|e| self.csv_error(e))?;
        wtr.flush()?;

        info!(path = %self.path.display(), "trade logged");
        Ok(())
    }
}
