//! CSV file market data adapter.
//!
//! One file per symbol, `date,open,high,low,close,volume` with a header row
//! (the stooq daily export layout).

use crate::domain::error::SigtraderError;
use crate::domain::ohlcv::PriceBar;
use crate::ports::data_port::MarketDataPort;
use chrono::NaiveDate;
use std::fs;
use std::path::PathBuf;

pub struct CsvMarketData {
    base_path: PathBuf,
}

impl CsvMarketData {
    pub fn new(base_path: PathBuf) -> Self {
        Self { base_path }
    }

    fn csv_path(&self, symbol: &str) -> Option<PathBuf> {
        [symbol.to_string(), symbol.to_lowercase()]
            .into_iter()
            .map(|name| self.base_path.join(format!("{name}.csv")))
            .find(|path| path.is_file())
    }
}

fn field(record: &csv::StringRecord, index: usize, name: &str, line: u64) -> Result<f64, SigtraderError> {
    let raw = record.get(index).ok_or_else(|| SigtraderError::MalformedData {
        reason: format!("line {line}: missing {name} column"),
    })?;
    raw.trim().parse().map_err(|e| SigtraderError::MalformedData {
        reason: format!("line {line}: invalid {name} value '{raw}': {e}"),
    })
}

impl MarketDataPort for CsvMarketData {
    fn fetch_bars(&self, symbol: &str, lookback: usize) -> Result<Vec<PriceBar>, SigtraderError> {
        let path = self
            .csv_path(symbol)
            .ok_or_else(|| SigtraderError::DataUnavailable {
                symbol: symbol.to_string(),
                reason: format!("no {symbol}.csv under {}", self.base_path.display()),
            })?;
        let content = fs::read_to_string(&path).map_err(|e| SigtraderError::DataUnavailable {
            symbol: symbol.to_string(),
            reason: format!("failed to read {}: {}", path.display(), e),
        })?;

        let mut rdr = csv::Reader::from_reader(content.as_bytes());
        let mut bars = Vec::new();

        for result in rdr.records() {
            let record = result.map_err(|e| SigtraderError::MalformedData {
                reason: format!("CSV parse error: {}", e),
            })?;
            let line = record.position().map(|p| p.line()).unwrap_or(0);

            let date_str = record.get(0).ok_or_else(|| SigtraderError::MalformedData {
                reason: format!("line {line}: missing date column"),
            })?;
            let date = NaiveDate::parse_from_str(date_str.trim(), "%Y-%m-%d").map_err(|e| {
                SigtraderError::MalformedData {
                    reason: format!("line {line}: invalid date '{date_str}': {e}"),
                }
            })?;

            bars.push(PriceBar {
                date,
                open: field(&record, 1, "open", line)?,
                high: field(&record, 2, "high", line)?,
                low: field(&record, 3, "low", line)?,
                close: field(&record, 4, "close", line)?,
                volume: field(&record, 5, "volume", line)?,
            });
        }

        if bars.is_empty() {
            return Err(SigtraderError::DataUnavailable {
                symbol: symbol.to_string(),
                reason: format!("{} holds no rows", path.display()),
            });
        }

        bars.sort_by_key(|b| b.date);
        let start = bars.len().saturating_sub(lookback);
        Ok(bars.split_off(start))
    }
}
