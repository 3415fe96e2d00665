// ============================================================================
// Module : api
// ============================================================================
// Client de l'API market-observability (watchlist, prix, news, analyses).
//
// CONCEPT RUST : Trait comme point de jonction
// - MarketApi décrit ce que la console attend du backend
// - HttpMarketApi l'implémente avec reqwest
// - Les tests de session utilisent un faux backend en mémoire
// ============================================================================

use async_trait::async_trait;

use crate::models::{LatestAnalysis, NewsPage, PriceSeries, Ticker};

pub mod error; // ApiError
pub mod http;  // Client reqwest

pub use error::ApiError;
pub use http::HttpMarketApi;

/// Fenêtre de pagination (?page=&limit=)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageWindow {
    pub page: u32,
    pub limit: u32,
}

impl PageWindow {
    pub fn new(page: u32, limit: u32) -> Self {
        Self { page, limit }
    }
}

/// Résultat d'un POST /watchlist
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AddOutcome {
    /// 2xx : ticker créé
    Created,
    /// 409 : déjà présent, traité comme un succès
    AlreadyPresent,
}

/// Opérations exposées par le backend
///
/// CONCEPT RUST : async_trait
/// - Les méthodes async dans un trait utilisé en `dyn` passent par async-trait
/// - Send + Sync : l'implémentation est partagée (Arc) entre tâches tokio
#[async_trait]
pub trait MarketApi: Send + Sync {
    /// GET /health
    async fn health(&self) -> Result<String, ApiError>;

    /// GET /watchlist
    async fn watchlist(&self) -> Result<Vec<Ticker>, ApiError>;

    /// POST /watchlist
    async fn add_ticker(&self, ticker: &Ticker) -> Result<AddOutcome, ApiError>;

    /// DELETE /watchlist/{ticker}
    async fn remove_ticker(&self, ticker: &Ticker) -> Result<(), ApiError>;

    /// GET /prices/{ticker}?page&limit
    async fn prices(&self, ticker: &Ticker, window: PageWindow) -> Result<PriceSeries, ApiError>;

    /// GET /news/{ticker}?page&limit
    async fn news(&self, ticker: &Ticker, window: PageWindow) -> Result<NewsPage, ApiError>;

    /// GET /latest/{ticker}
    async fn latest(&self, ticker: &Ticker) -> Result<LatestAnalysis, ApiError>;
}
