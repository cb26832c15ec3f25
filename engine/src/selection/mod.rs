//! Candidate universe selection: per-market policies over the provider
//! listing, with a time-bounded listing cache.
pub mod cache;
pub mod policy;

pub use cache::ListingCache;
pub use policy::SelectionPolicy;

use chrono::Utc;
use shared::models::{InstrumentRef, Market};
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::config::{EngineSettings, MAX_LISTING_TTL_SECS};
use crate::data::MarketDataProvider;
use crate::error::EngineError;

pub struct CandidateSelector {
    provider: Arc<dyn MarketDataProvider>,
    cache: RwLock<ListingCache>,
    secondary_min_market_cap: f64,
}

impl CandidateSelector {
    pub fn new(provider: Arc<dyn MarketDataProvider>, settings: &EngineSettings) -> Self {
        CandidateSelector {
            provider,
            cache: RwLock::new(ListingCache::new(chrono::Duration::seconds(
                settings.listing_ttl_secs.clamp(0, MAX_LISTING_TTL_SECS),
            ))),
            secondary_min_market_cap: settings.secondary_min_market_cap,
        }
    }

    pub fn policy_for(&self, market: Market) -> SelectionPolicy {
        SelectionPolicy::for_market(market, self.secondary_min_market_cap)
    }

    /// Ordered candidates for `market`, at most `count` of them. The listing
    /// is served from the cache while fresh.
    pub async fn select(&self, market: Market, count: usize) -> Result<Vec<InstrumentRef>, EngineError> {
        let rows = {
            let cached = self.cache.read().await.get_at(market, Utc::now());
            match cached {
                Some(rows) => {
                    tracing::debug!(%market, rows = rows.len(), "Universe listing served from cache");
                    rows
                }
                None => {
                    let rows = Arc::new(self.provider.list_universe(market).await?);
                    self.cache.write().await.insert_at(market, rows.clone(), Utc::now());
                    rows
                }
            }
        };

        let policy = self.policy_for(market);
        let candidates = policy.select(&rows, market, count);
        tracing::info!(
            %market,
            ?policy,
            listed = rows.len(),
            selected = candidates.len(),
            requested = count,
            "Selected scan candidates"
        );
        Ok(candidates)
    }

    pub async fn invalidate(&self, market: Market) {
        self.cache.write().await.invalidate(market);
    }

    pub async fn clear_cache(&self) {
        self.cache.write().await.clear();
    }
}
