// Terminal rendering of scan output.
use shared::models::{InstrumentRef, Market, ScanResult};
use shared::utils::format_price;
use tabled::settings::Style;
use tabled::{Table, Tabled};

#[derive(Tabled)]
struct ResultRow {
    #[tabled(rename = "Name")]
    name: String,
    #[tabled(rename = "Price")]
    price: String,
    #[tabled(rename = "Status")]
    status: String,
    #[tabled(rename = "Trend strength")]
    trend_strength: String,
    #[tabled(rename = "52w position")]
    progress: String,
    #[tabled(rename = "RSI")]
    rsi: String,
    #[tabled(rename = "Code")]
    code: String,
}

#[derive(Tabled)]
struct CandidateRow {
    #[tabled(rename = "#")]
    rank: usize,
    #[tabled(rename = "Code")]
    code: String,
    #[tabled(rename = "Name")]
    name: String,
}

pub fn render_results(market: Market, results: &[ScanResult]) -> String {
    let rows = results.iter().map(|r| ResultRow {
        name: r.name.clone(),
        price: format_price(market, r.current_price),
        status: r.status.label().to_string(),
        trend_strength: format!("{:.2}%", r.trend_strength),
        progress: format!("{:.0}%", r.progress * 100.0),
        rsi: format!("{:.1}", r.rsi),
        code: r.code.clone(),
    });
    Table::new(rows).with(Style::rounded()).to_string()
}

pub fn render_candidates(candidates: &[InstrumentRef]) -> String {
    let rows = candidates.iter().enumerate().map(|(i, c)| CandidateRow {
        rank: i + 1,
        code: c.code.clone(),
        name: c.name.clone(),
    });
    Table::new(rows).with(Style::rounded()).to_string()
}
