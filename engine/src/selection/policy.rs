use shared::models::{InstrumentRef, ListingRow, Market};
use shared::utils::coerce_cell;

/// How a market's listing is turned into an ordered candidate list.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SelectionPolicy {
    /// Drop rows without a usable market cap or close, rank by traded value.
    LiquidityRanked,
    /// As `LiquidityRanked`, after dropping rows below a market-cap floor.
    LiquidityRankedWithFloor { min_market_cap: f64 },
    /// Provider order, untouched. The foreign listing is too large to rank on
    /// the same fields, so the first N rows are taken as they come.
    ListingOrder,
}

impl SelectionPolicy {
    pub fn for_market(market: Market, secondary_min_market_cap: f64) -> Self {
        match market {
            Market::Kospi => SelectionPolicy::LiquidityRanked,
            Market::Kosdaq => SelectionPolicy::LiquidityRankedWithFloor {
                min_market_cap: secondary_min_market_cap,
            },
            Market::Nasdaq => SelectionPolicy::ListingOrder,
        }
    }

    /// At most `count` candidates from `rows`; rows listed under another
    /// market are ignored. Rows failing numeric coercion are dropped.
    pub fn select(&self, rows: &[ListingRow], market: Market, count: usize) -> Vec<InstrumentRef> {
        let in_market = rows.iter().filter(|row| row.market == market);

        match self {
            SelectionPolicy::ListingOrder => in_market.take(count).map(to_ref).collect(),
            SelectionPolicy::LiquidityRanked => rank_by_liquidity(in_market, None, count),
            SelectionPolicy::LiquidityRankedWithFloor { min_market_cap } => {
                rank_by_liquidity(in_market, Some(*min_market_cap), count)
            }
        }
    }
}

fn to_ref(row: &ListingRow) -> InstrumentRef {
    InstrumentRef {
        code: row.code.clone(),
        name: row.name.clone(),
        market: row.market,
    }
}

fn rank_by_liquidity<'a>(
    rows: impl Iterator<Item = &'a ListingRow>,
    min_market_cap: Option<f64>,
    count: usize,
) -> Vec<InstrumentRef> {
    let mut ranked: Vec<(f64, &ListingRow)> = rows
        .filter_map(|row| {
            let market_cap = coerce_cell(&row.market_cap)?;
            coerce_cell(&row.close)?;
            if min_market_cap.is_some_and(|floor| market_cap < floor) {
                return None;
            }
            // Unknown traded value ranks last rather than dropping the row.
            let traded_value = coerce_cell(&row.traded_value).unwrap_or(f64::NEG_INFINITY);
            Some((traded_value, row))
        })
        .collect();

    // Stable: equal traded values keep listing order.
    ranked.sort_by(|a, b| b.0.total_cmp(&a.0));
    ranked.into_iter().take(count).map(|(_, row)| to_ref(row)).collect()
}
