//! Price loading: CSV files or synthetic series, validated before use.
//!
//! CSV files need a header with `timestamp,open,high,low,close,volume`.
//! Timestamps may be unix milliseconds, RFC 3339 date-times or plain
//! `YYYY-MM-DD` dates (midnight UTC).

use std::io::Read;
use std::path::{Path, PathBuf};

use chrono::{DateTime, NaiveDate};
use serde::Deserialize;
use thiserror::Error;
use tracing::{debug, info};

use perpsim_core::domain::{validate_series, DataError, PricePoint};

use crate::config::DataSource;
use crate::synthetic;

#[derive(Debug, Error)]
pub enum LoadError {
    #[error("failed to open {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
    #[error("row {row}: unrecognized timestamp '{value}'")]
    BadTimestamp { row: usize, value: String },
    #[error("price series is empty")]
    Empty,
    #[error("data error: {0}")]
    Data(#[from] DataError),
}

/// A validated series plus its provenance.
#[derive(Debug, Clone)]
pub struct LoadedData {
    pub points: Vec<PricePoint>,
    /// blake3 over every bar, for reproducibility checks.
    pub dataset_hash: String,
    pub synthetic: bool,
}

#[derive(Debug, Deserialize)]
struct CsvRow {
    timestamp: String,
    open: f64,
    high: f64,
    low: f64,
    close: f64,
    volume: f64,
}

/// Load the series a run config points at.
pub fn load_prices(source: &DataSource) -> Result<LoadedData, LoadError> {
    let (points, synthetic) = match source {
        DataSource::Csv { path } => (load_csv(path)?, false),
        DataSource::Synthetic(spec) => (synthetic::generate(spec), true),
    };
    if points.is_empty() {
        return Err(LoadError::Empty);
    }
    validate_series(&points)?;
    let dataset_hash = dataset_hash(&points);
    info!(bars = points.len(), synthetic, hash = %&dataset_hash[..12], "loaded price series");
    Ok(LoadedData {
        points,
        dataset_hash,
        synthetic,
    })
}

pub fn load_csv(path: &Path) -> Result<Vec<PricePoint>, LoadError> {
    let file = std::fs::File::open(path).map_err(|source| LoadError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    debug!(path = %path.display(), "reading price CSV");
    read_csv(file)
}

/// Parse CSV rows from any reader. Rows are returned in file order; ordering
/// is checked by `load_prices`.
pub fn read_csv<R: Read>(reader: R) -> Result<Vec<PricePoint>, LoadError> {
    let mut rdr = csv::ReaderBuilder::new().trim(csv::Trim::All).from_reader(reader);
    let mut points = Vec::new();
    for (row, record) in rdr.deserialize::<CsvRow>().enumerate() {
        let r = record?;
        let timestamp = parse_timestamp(&r.timestamp).ok_or_else(|| LoadError::BadTimestamp {
            row: row + 1,
            value: r.timestamp.clone(),
        })?;
        points.push(PricePoint::new(timestamp, r.open, r.high, r.low, r.close, r.volume));
    }
    Ok(points)
}

/// Unix milliseconds from an integer, RFC 3339 string or `YYYY-MM-DD` date.
pub fn parse_timestamp(value: &str) -> Option<i64> {
    if let Ok(ms) = value.parse::<i64>() {
        return Some(ms);
    }
    if let Ok(dt) = DateTime::parse_from_rfc3339(value) {
        return Some(dt.timestamp_millis());
    }
    NaiveDate::parse_from_str(value, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .map(|dt| dt.and_utc().timestamp_millis())
}

/// Content hash over timestamps and OHLCV values.
pub fn dataset_hash(points: &[PricePoint]) -> String {
    let mut hasher = blake3::Hasher::new();
    for p in points {
        hasher.update(&p.timestamp.to_le_bytes());
        for v in [p.open, p.high, p.low, p.close, p.volume] {
            hasher.update(&v.to_le_bytes());
        }
    }
    hasher.finalize().to_hex().to_string()
}
