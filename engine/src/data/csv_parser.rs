// File-backed market data provider.
//
// Layout of the data directory:
//   listing_<market>.csv   Code,Name,Market,Marcap,Close,Amount   (market in lowercase, e.g. listing_kosdaq.csv)
//   history/<code>.csv     Date,Open,High,Low,Close,Volume[,Amount]
//
// Listing cells are kept as text; the candidate selector owns their coercion.
// History numbers may carry thousands separators ("1,234,500").
use anyhow::{anyhow, Result};
use async_trait::async_trait;
use chrono::NaiveDate;
use csv::{ReaderBuilder, StringRecord};
use shared::models::{CellValue, DailyBar, ListingRow, Market};
use shared::utils::parse_decimal;
use std::path::{Path, PathBuf};

use super::provider::{normalize_bars, MarketDataProvider};
use crate::error::EngineError;

const DATE_FORMAT: &str = "%Y-%m-%d";

pub struct CsvMarketDataProvider {
    root: PathBuf,
}

impl CsvMarketDataProvider {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn listing_path(&self, market: Market) -> PathBuf {
        self.root.join(format!("listing_{}.csv", market.as_str().to_ascii_lowercase()))
    }

    pub fn history_path(&self, code: &str) -> PathBuf {
        self.root.join("history").join(format!("{}.csv", code))
    }

    async fn read_file(path: &Path, what: &str) -> Result<String, EngineError> {
        match tokio::fs::read_to_string(path).await {
            Ok(content) => Ok(content),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                Err(EngineError::unavailable(what, format!("file not found: {}", path.display())))
            }
            Err(e) => Err(e.into()),
        }
    }

    /// Parses a universe listing. Rows with an empty code, or a Market cell
    /// naming another exchange, are skipped; a missing Market column means
    /// every row belongs to `market`.
    pub fn parse_listing(content: &str, market: Market) -> Result<Vec<ListingRow>> {
        let mut rdr = ReaderBuilder::new()
            .has_headers(true)
            .flexible(true)
            .trim(csv::Trim::All)
            .from_reader(content.as_bytes());
        let headers = rdr.headers()?.clone();
        for required in ["Code", "Name"] {
            if !headers.iter().any(|h| h == required) {
                return Err(anyhow!("Missing '{}' column in listing header", required));
            }
        }

        let mut rows = Vec::new();
        for (idx, result) in rdr.records().enumerate() {
            let record = result.map_err(|e| anyhow!("Error reading listing record at line {}: {}", idx + 2, e))?;

            let code = match Self::get_field(&record, &headers, "Code") {
                Some(code) if !code.is_empty() => code,
                _ => {
                    tracing::debug!(line = idx + 2, "Skipping listing row without a code");
                    continue;
                }
            };
            let row_market = match Self::get_field(&record, &headers, "Market") {
                Some(m) if !m.is_empty() => m.parse::<Market>().ok(),
                _ => Some(market),
            };
            if row_market != Some(market) {
                continue;
            }

            let cell = |name: &str| Self::get_field(&record, &headers, name).map(CellValue::from).unwrap_or(CellValue::Empty);
            rows.push(ListingRow {
                code: code.to_string(),
                name: Self::get_field(&record, &headers, "Name").unwrap_or(code).to_string(),
                market,
                market_cap: cell("Marcap"),
                close: cell("Close"),
                traded_value: cell("Amount"),
            });
        }
        Ok(rows)
    }

    /// Parses a daily history file into ascending, date-unique bars.
    pub fn parse_history(content: &str) -> Result<Vec<DailyBar>> {
        let mut rdr = ReaderBuilder::new()
            .has_headers(true)
            .trim(csv::Trim::All)
            .from_reader(content.as_bytes());
        let headers = rdr.headers()?.clone();

        let mut bars = Vec::new();
        for (idx, result) in rdr.records().enumerate() {
            let line = idx + 2;
            let record = result.map_err(|e| anyhow!("Error reading history record at line {}: {}", line, e))?;

            let field = |name: &str| {
                Self::get_field(&record, &headers, name)
                    .filter(|v| !v.is_empty())
                    .ok_or_else(|| anyhow!("Missing '{}' field in history record at line {}", name, line))
            };
            let number = |name: &str| -> Result<f64> {
                parse_decimal(field(name)?).map_err(|e| anyhow!("Error parsing '{}' at line {}: {}", name, line, e))
            };

            let date_str = field("Date")?;
            let date = NaiveDate::parse_from_str(date_str, DATE_FORMAT)
                .map_err(|e| anyhow!("Error parsing 'Date' at line {}: '{}': {}", line, date_str, e))?;

            let amount = match Self::get_field(&record, &headers, "Amount") {
                Some(v) if !v.is_empty() => Some(number("Amount")?),
                _ => None,
            };

            bars.push(DailyBar {
                date,
                open: number("Open")?,
                high: number("High")?,
                low: number("Low")?,
                close: number("Close")?,
                volume: number("Volume")?,
                amount,
            });
        }
        normalize_bars(&mut bars);
        Ok(bars)
    }

    // Looks a field up by header name so column order does not matter.
    fn get_field<'a>(record: &'a StringRecord, headers: &StringRecord, name: &str) -> Option<&'a str> {
        headers.iter().position(|header| header == name).and_then(|pos| record.get(pos))
    }
}

#[async_trait]
impl MarketDataProvider for CsvMarketDataProvider {
    async fn list_universe(&self, market: Market) -> Result<Vec<ListingRow>, EngineError> {
        let path = self.listing_path(market);
        let content = Self::read_file(&path, market.as_str()).await?;
        let rows = Self::parse_listing(&content, market)
            .map_err(|e| EngineError::CsvDataFormatError(format!("{}: {}", path.display(), e)))?;
        tracing::debug!(%market, rows = rows.len(), path = %path.display(), "Loaded universe listing");
        Ok(rows)
    }

    async fn daily_history(&self, code: &str, from: NaiveDate) -> Result<Vec<DailyBar>, EngineError> {
        let path = self.history_path(code);
        let content = Self::read_file(&path, code).await?;
        let mut bars = Self::parse_history(&content)
            .map_err(|e| EngineError::CsvDataFormatError(format!("{}: {}", path.display(), e)))?;
        bars.retain(|b| b.date >= from);
        Ok(bars)
    }
}
