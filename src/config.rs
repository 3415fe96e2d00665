// ============================================================================
// Configuration : ligne de commande + variables d'environnement
// ============================================================================
// CONCEPT RUST : clap derive
// - Chaque champ est une option --kebab-case
// - `env = "..."` : repli sur une variable d'environnement (le .env est
//   chargé par dotenvy avant le parsing)
// - Valeurs par défaut déclaratives, validées au démarrage
// ============================================================================

use std::path::PathBuf;
use std::time::Duration;

use clap::Parser;

use crate::models::{Ticker, TickerPolicy};
use crate::session::SessionConfig;

/// Console de suivi de marché (watchlist, prix, news, analyses)
#[derive(Debug, Clone, Parser)]
#[command(name = "marketscope", version, about, long_about = None)]
pub struct Settings {
    /// URL de base de l'API market-observability
    #[arg(long, env = "MARKET_API_BASE_URL", default_value = "http://localhost:8000")]
    pub api_base_url: String,

    /// Timeout des requêtes HTTP, en secondes
    #[arg(long, env = "MARKET_API_TIMEOUT_SECS", default_value_t = 10)]
    pub request_timeout_secs: u64,

    /// Nombre de points de prix demandés
    #[arg(long, env = "MARKETSCOPE_PRICE_LIMIT", default_value_t = 50)]
    pub price_limit: u32,

    /// Nombre de news par page
    #[arg(long, env = "MARKETSCOPE_NEWS_PAGE_SIZE", default_value_t = 5)]
    pub news_page_size: u32,

    /// Tickers proposés en ajout rapide (touches 1-9)
    #[arg(
        long,
        env = "MARKETSCOPE_SUGGESTED",
        value_delimiter = ',',
        default_value = "AAPL,MSFT,TSLA,NVDA,AMZN"
    )]
    pub suggested: Vec<String>,

    /// Longueur maximale d'un ticker (0 = illimitée)
    #[arg(long, env = "MARKETSCOPE_TICKER_MAX_LEN", default_value_t = 12)]
    pub ticker_max_len: usize,

    /// N'accepte que A-Z, 0-9, '.' et '-'
    #[arg(long, env = "MARKETSCOPE_STRICT_TICKERS")]
    pub strict_tickers: bool,

    #[arg(long, env = "GRAFANA_URL", default_value = "http://localhost:3000")]
    pub grafana_url: String,

    #[arg(long, env = "PROMETHEUS_URL", default_value = "http://localhost:9090")]
    pub prometheus_url: String,

    /// Répertoire des logs (défaut : <data_local_dir>/marketscope/logs)
    #[arg(long, env = "MARKETSCOPE_LOG_DIR")]
    pub log_dir: Option<PathBuf>,
}

/// Lien affiché dans l'en-tête
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ObservabilityLink {
    pub label: &'static str,
    pub url: String,
}

impl Settings {
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs.max(1))
    }

    pub fn ticker_policy(&self) -> TickerPolicy {
        TickerPolicy {
            max_len: (self.ticker_max_len > 0).then_some(self.ticker_max_len),
            strict_charset: self.strict_tickers,
        }
    }

    pub fn session_config(&self) -> SessionConfig {
        SessionConfig {
            ticker_policy: self.ticker_policy(),
            price_limit: self.price_limit.max(1),
            news_page_size: self.news_page_size.max(1),
        }
    }

    /// Tickers suggérés, normalisés et dédoublonnés (9 au maximum)
    pub fn suggested_tickers(&self) -> Vec<Ticker> {
        let mut tickers: Vec<Ticker> = Vec::new();
        for ticker in self.suggested.iter().filter_map(|s| Ticker::normalize(s)) {
            if !tickers.contains(&ticker) {
                tickers.push(ticker);
            }
        }
        tickers.truncate(9);
        tickers
    }

    /// Liens de l'en-tête : docs et métriques de l'API, Grafana, Prometheus
    pub fn observability_links(&self) -> Vec<ObservabilityLink> {
        let base = self.api_base_url.trim_end_matches('/');
        vec![
            ObservabilityLink {
                label: "API docs",
                url: format!("{}/docs", base),
            },
            ObservabilityLink {
                label: "Metrics",
                url: format!("{}/metrics", base),
            },
            ObservabilityLink {
                label: "Grafana",
                url: self.grafana_url.clone(),
            },
            ObservabilityLink {
                label: "Prometheus",
                url: self.prometheus_url.clone(),
            },
        ]
    }

    /// Répertoire des logs effectif
    pub fn resolve_log_dir(&self) -> PathBuf {
        self.log_dir.clone().unwrap_or_else(|| {
            dirs::data_local_dir()
                .unwrap_or_else(|| PathBuf::from("."))
                .join("marketscope")
                .join("logs")
        })
    }
}
