use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// One trading session of an instrument. Series are kept ascending by date,
/// one bar per date; non-trading days are simply absent.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DailyBar {
    pub date: NaiveDate,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub volume: f64,
    /// Traded value for the session, when the provider reports it.
    pub amount: Option<f64>,
}

/// The exchanges a scan can target.
///
/// `Kospi` is the primary exchange, `Kosdaq` the secondary exchange and
/// `Nasdaq` the foreign exchange; each one selects its candidates differently.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "UPPERCASE")]
pub enum Market {
    Kospi,
    Kosdaq,
    Nasdaq,
}

impl Market {
    pub fn as_str(&self) -> &'static str {
        match self {
            Market::Kospi => "KOSPI",
            Market::Kosdaq => "KOSDAQ",
            Market::Nasdaq => "NASDAQ",
        }
    }

    /// Korean markets quote whole won, Nasdaq quotes dollars and cents.
    pub fn is_domestic(&self) -> bool {
        !matches!(self, Market::Nasdaq)
    }
}

impl fmt::Display for Market {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Market {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "kospi" | "primary" => Ok(Market::Kospi),
            "kosdaq" | "secondary" => Ok(Market::Kosdaq),
            "nasdaq" | "foreign" => Ok(Market::Nasdaq),
            other => Err(format!("Unknown market '{}'. Use KOSPI, KOSDAQ or NASDAQ.", other)),
        }
    }
}

/// An instrument picked for analysis.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct InstrumentRef {
    pub code: String,
    pub name: String,
    pub market: Market,
}

/// A loosely-typed cell from a provider listing. Listings mix real numbers,
/// thousands-separated strings and blanks in the same column.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum CellValue {
    Number(f64),
    Text(String),
    Empty,
}

impl From<f64> for CellValue {
    fn from(value: f64) -> Self {
        CellValue::Number(value)
    }
}

impl From<&str> for CellValue {
    fn from(value: &str) -> Self {
        if value.trim().is_empty() {
            CellValue::Empty
        } else {
            CellValue::Text(value.to_string())
        }
    }
}

/// One row of the provider's universe listing, before any coercion.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ListingRow {
    pub code: String,
    pub name: String,
    pub market: Market,
    pub market_cap: CellValue,
    pub close: CellValue,
    pub traded_value: CellValue,
}

/// Status label of a qualifying instrument, in precedence order.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum SignalStatus {
    Overheated,
    StrongBuy,
    BuyTiming,
    HoldWatch,
}

impl SignalStatus {
    pub fn label(&self) -> &'static str {
        match self {
            SignalStatus::Overheated => "Overheated (caution)",
            SignalStatus::StrongBuy => "Strong buy",
            SignalStatus::BuyTiming => "Buy timing",
            SignalStatus::HoldWatch => "Hold / watch",
        }
    }
}

impl fmt::Display for SignalStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// A qualifying instrument as handed to the presentation layer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScanResult {
    pub name: String,
    pub current_price: f64,
    pub status: SignalStatus,
    /// Slope of the 20-day average over the last 5 sessions, in percent.
    pub trend_strength: f64,
    /// Position inside the 52-week range, 0.0 at the low and 1.0 at the high.
    pub progress: f64,
    pub rsi: f64,
    pub code: String,
}
