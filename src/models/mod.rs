// ============================================================================
// Module : models
// ============================================================================
// Structures de données manipulées par la console : tickers, prix, news,
// analyses. Aucune logique réseau ici.
// ============================================================================

pub mod analysis; // Analyse LLM la plus récente
pub mod news;     // Pages de news
pub mod price;    // Historique de prix
pub mod ticker;   // Symboles normalisés + politique de validation

// Re-export des structures principales pour simplifier les imports
// On peut faire : use marketscope::models::Ticker;
pub use analysis::{AnalysisRecord, LatestAnalysis, Sentiment};
pub use news::{NewsItem, NewsPage};
pub use price::{PricePoint, PriceSeries};
pub use ticker::{Ticker, TickerPolicy};
