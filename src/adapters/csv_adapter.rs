//! CSV file price data adapter.
//!
//! Columns are located by header name: `timestamp` (or `date`), `open`,
//! `high`, `low`, `close`, `volume`. Extra columns are ignored.

use crate::domain::error::StratforgeError;
use crate::domain::ohlcv::{check_series, PriceBar};
use crate::ports::data_port::DataPort;
use chrono::{NaiveDate, NaiveDateTime};
use std::fs;
use std::path::PathBuf;

const DATETIME_FORMATS: [&str; 3] = ["%Y-%m-%d %H:%M:%S", "%Y-%m-%dT%H:%M:%S", "%Y-%m-%d %H:%M"];

pub struct CsvAdapter {
    base_path: PathBuf,
}

impl CsvAdapter {
    /// `source` names passed to `fetch_bars` resolve against `base_path`;
    /// absolute sources are used as-is.
    pub fn new(base_path: PathBuf) -> Self {
        Self { base_path }
    }
}

struct Columns {
    timestamp: usize,
    open: usize,
    high: usize,
    low: usize,
    close: usize,
    volume: usize,
}

impl Columns {
    fn from_headers(headers: &csv::StringRecord) -> Result<Self, StratforgeError> {
        let find = |names: &[&str]| {
            headers
                .iter()
                .position(|h| names.iter().any(|n| h.trim().eq_ignore_ascii_case(n)))
                .ok_or_else(|| StratforgeError::PriceData {
                    reason: format!("missing {} column", names[0]),
                })
        };
        Ok(Self {
            timestamp: find(&["timestamp", "date", "datetime"])?,
            open: find(&["open"])?,
            high: find(&["high"])?,
            low: find(&["low"])?,
            close: find(&["close"])?,
            volume: find(&["volume"])?,
        })
    }
}

fn parse_timestamp(raw: &str) -> Result<NaiveDateTime, StratforgeError> {
    let raw = raw.trim();
    for format in DATETIME_FORMATS {
        if let Ok(ts) = NaiveDateTime::parse_from_str(raw, format) {
            return Ok(ts);
        }
    }
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .ok_or_else(|| StratforgeError::PriceData {
            reason: format!("invalid timestamp: {}", raw),
        })
}

fn parse_field(record: &csv::StringRecord, index: usize, name: &str, line: usize) -> Result<f64, StratforgeError> {
    record
        .get(index)
        .ok_or_else(|| StratforgeError::PriceData {
            reason: format!("row {}: missing {} value", line, name),
        })?
        .trim()
        .parse()
        .map_err(|e| StratforgeError::PriceData {
            reason: format!("row {}: invalid {} value: {}", line, name, e),
        })
}

impl DataPort for CsvAdapter {
    fn fetch_bars(&self, source: &str) -> Result<Vec<PriceBar>, StratforgeError> {
        let path = self.base_path.join(source);
        let content = fs::read_to_string(&path).map_err(|e| StratforgeError::PriceData {
            reason: format!("failed to read {}: {}", path.display(), e),
        })?;

        let mut rdr = csv::Reader::from_reader(content.as_bytes());
        let headers = rdr.headers().map_err(|e| StratforgeError::PriceData {
            reason: format!("CSV header error: {}", e),
        })?;
        let columns = Columns::from_headers(headers)?;

        let mut bars = Vec::new();
        for (i, result) in rdr.records().enumerate() {
            let line = i + 1;
            let record = result.map_err(|e| StratforgeError::PriceData {
                reason: format!("CSV parse error: {}", e),
            })?;

            let raw_ts = record.get(columns.timestamp).ok_or_else(|| StratforgeError::PriceData {
                reason: format!("row {}: missing timestamp value", line),
            })?;

            bars.push(PriceBar {
                timestamp: parse_timestamp(raw_ts)?,
                open: parse_field(&record, columns.open, "open", line)?,
                high: parse_field(&record, columns.high, "high", line)?,
                low: parse_field(&record, columns.low, "low", line)?,
                close: parse_field(&record, columns.close, "close", line)?,
                volume: parse_field(&record, columns.volume, "volume", line)?,
            });
        }

        bars.sort_by_key(|b| b.timestamp);
        if let Some(pair) = bars.windows(2).find(|w| w[0].timestamp == w[1].timestamp) {
            return Err(StratforgeError::PriceData {
                reason: format!("duplicate timestamp {} in {}", pair[0].timestamp, path.display()),
            });
        }
        check_series(&bars)?;

        tracing::debug!(path = %path.display(), bars = bars.len(), "loaded price series");
        Ok(bars)
    }
}
