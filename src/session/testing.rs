// ============================================================================
// Faux backend pour les tests
// ============================================================================
// Implémente MarketApi en mémoire. Chaque appel est enregistré sous une clé
// lisible ("news AAPL 2", "add MSFT", "watchlist"...) qui sert aussi à
// programmer des échecs avec fail_on().
// ============================================================================

use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;

use crate::api::{AddOutcome, ApiError, MarketApi, PageWindow};
use crate::models::{
    AnalysisRecord, LatestAnalysis, NewsItem, NewsPage, PricePoint, PriceSeries, Sentiment,
    Ticker,
};

/// Nombre de pages de news servies par ticker
const NEWS_PAGES: u32 = 3;

#[derive(Debug, Default)]
struct FakeState {
    watchlist: Vec<Ticker>,
    calls: Vec<String>,
    failures: HashMap<String, (u16, String)>,
    panics: Vec<String>,
}

#[derive(Debug, Default)]
pub struct FakeMarketApi {
    state: Mutex<FakeState>,
}

impl FakeMarketApi {
    pub fn with_watchlist(symbols: &[&str]) -> Self {
        let api = Self::default();
        api.state.lock().unwrap().watchlist =
            symbols.iter().filter_map(|s| Ticker::normalize(s)).collect();
        api
    }

    /// Programme une réponse non-2xx pour la clé d'appel donnée
    pub fn fail_on(&self, key: &str, status: u16, body: &str) {
        self.state
            .lock()
            .unwrap()
            .failures
            .insert(key.to_string(), (status, body.to_string()));
    }

    /// Retire un échec programmé
    pub fn heal(&self, key: &str) {
        self.state.lock().unwrap().failures.remove(key);
    }

    /// Programme une panique (simule un bug dans la tâche)
    pub fn panic_on(&self, key: &str) {
        self.state.lock().unwrap().panics.push(key.to_string());
    }

    /// Appels reçus, dans l'ordre d'arrivée
    pub fn calls(&self) -> Vec<String> {
        self.state.lock().unwrap().calls.clone()
    }

    pub fn clear_calls(&self) {
        self.state.lock().unwrap().calls.clear();
    }

    fn enter(&self, key: String) -> Result<(), ApiError> {
        let mut state = self.state.lock().unwrap();
        state.calls.push(key.clone());
        let should_panic = state.panics.contains(&key);
        let failure = state.failures.get(&key).cloned();
        drop(state);

        if should_panic {
            panic!("scripted panic on {key}");
        }
        match failure {
            Some((status, body)) => Err(ApiError::Status { status, body }),
            None => Ok(()),
        }
    }
}

#[async_trait]
impl MarketApi for FakeMarketApi {
    async fn health(&self) -> Result<String, ApiError> {
        self.enter("health".to_string())?;
        Ok("ok".to_string())
    }

    async fn watchlist(&self) -> Result<Vec<Ticker>, ApiError> {
        self.enter("watchlist".to_string())?;
        Ok(self.state.lock().unwrap().watchlist.clone())
    }

    async fn add_ticker(&self, ticker: &Ticker) -> Result<AddOutcome, ApiError> {
        self.enter(format!("add {ticker}"))?;
        let mut state = self.state.lock().unwrap();
        if state.watchlist.contains(ticker) {
            return Ok(AddOutcome::AlreadyPresent);
        }
        state.watchlist.push(ticker.clone());
        Ok(AddOutcome::Created)
    }

    async fn remove_ticker(&self, ticker: &Ticker) -> Result<(), ApiError> {
        self.enter(format!("remove {ticker}"))?;
        self.state.lock().unwrap().watchlist.retain(|t| t != ticker);
        Ok(())
    }

    async fn prices(&self, ticker: &Ticker, window: PageWindow) -> Result<PriceSeries, ApiError> {
        self.enter(format!("prices {ticker}"))?;
        // Plus récent en premier, comme le vrai backend
        let points = (0..window.limit.min(3))
            .map(|i| PricePoint::new(100.0 - i as f64, None))
            .collect();
        Ok(PriceSeries::from_server_order(points))
    }

    async fn news(&self, ticker: &Ticker, window: PageWindow) -> Result<NewsPage, ApiError> {
        self.enter(format!("news {ticker} {}", window.page))?;
        let items = (0..window.limit)
            .filter_map(|i| {
                NewsItem::normalized(
                    &format!("{ticker} headline p{}#{i}", window.page),
                    Some("Reuters"),
                    None,
                    Some("2024-05-02T10:00:00Z"),
                    None,
                )
            })
            .collect();
        Ok(NewsPage {
            items,
            has_next: window.page < NEWS_PAGES,
        })
    }

    async fn latest(&self, ticker: &Ticker) -> Result<LatestAnalysis, ApiError> {
        self.enter(format!("latest {ticker}"))?;
        Ok(LatestAnalysis::Ready(AnalysisRecord {
            summary: format!("{ticker} moved +1.00%"),
            sentiment: Sentiment::Positive,
            hypothesis: None,
            trigger_reason: Some("price_move_above_threshold".to_string()),
            confidence: None,
            movement_delta: Some(1.0),
            created_at: None,
        }))
    }
}
