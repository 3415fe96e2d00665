// ============================================================================
// API Client : backend market-observability (HTTP/JSON)
// ============================================================================
// Implémente MarketApi avec reqwest.
//
// CONCEPTS RUST :
// 1. async/await : chaque appel est une Future exécutée par tokio
// 2. Structures privées "wire" : elles collent au JSON du serveur,
//    puis sont converties vers nos modèles (Ticker, PriceSeries, ...)
// 3. #[instrument] : chaque appel crée un span avec le ticker
// ============================================================================

use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, NaiveDateTime, Utc};
use reqwest::{RequestBuilder, Response, StatusCode, Url};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use tracing::{debug, instrument, warn};

use crate::api::{AddOutcome, ApiError, MarketApi, PageWindow};
use crate::models::{
    AnalysisRecord, LatestAnalysis, NewsItem, NewsPage, PricePoint, PriceSeries, Sentiment,
    Ticker,
};

// ============================================================================
// Structures pour parser les réponses JSON du backend
// ============================================================================

#[derive(Debug, Deserialize)]
struct HealthResponse {
    status: String,
}

#[derive(Debug, Deserialize)]
struct WatchlistResponse {
    tickers: Vec<String>,
}

#[derive(Debug, Serialize)]
struct AddTickerRequest<'a> {
    ticker: &'a str,
}

#[derive(Debug, Deserialize)]
struct PricesResponse {
    #[serde(default)]
    items: Vec<PriceRow>,
}

/// Un relevé de prix (price peut être null si la source a échoué)
#[derive(Debug, Deserialize)]
struct PriceRow {
    price: Option<f64>,
    #[serde(alias = "timestamp")]
    captured_at: Option<String>,
    source: Option<String>,
}

#[derive(Debug, Deserialize)]
struct NewsResponse {
    #[serde(default)]
    items: Vec<NewsRow>,
    #[serde(default)]
    has_next: bool,
}

#[derive(Debug, Deserialize)]
struct NewsRow {
    headline: Option<String>,
    source: Option<String>,
    url: Option<String>,
    published_at: Option<String>,
    fetched_at: Option<String>,
}

/// GET /latest : soit une analyse, soit { status: "pending", message }
#[derive(Debug, Deserialize)]
struct LatestResponse {
    status: Option<String>,
    message: Option<String>,
    summary: Option<String>,
    sentiment: Option<String>,
    hypothesis: Option<String>,
    trigger_reason: Option<String>,
    confidence: Option<f64>,
    movement_delta: Option<f64>,
    created_at: Option<String>,
}

// ============================================================================
// HttpMarketApi
// ============================================================================

/// Client HTTP du backend
#[derive(Debug, Clone)]
pub struct HttpMarketApi {
    http: reqwest::Client,
    base_url: Url,
}

impl HttpMarketApi {
    /// Crée un client avec un timeout global
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self, ApiError> {
        let http = reqwest::Client::builder()
            .timeout(timeout)
            .user_agent(concat!("marketscope/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| ApiError::Transport {
                url: base_url.to_string(),
                message: e.to_string(),
            })?;
        Self::with_client(base_url, http)
    }

    /// Crée un client à partir d'un reqwest::Client déjà configuré
    pub fn with_client(base_url: &str, http: reqwest::Client) -> Result<Self, ApiError> {
        let base_url =
            Url::parse(base_url).map_err(|e| ApiError::InvalidUrl(format!("{base_url} ({e})")))?;
        if base_url.cannot_be_a_base() {
            return Err(ApiError::InvalidUrl(base_url.to_string()));
        }
        Ok(Self { http, base_url })
    }

    /// Construit l'URL d'un endpoint
    ///
    /// Les segments sont encodés par Url : un ticker "BRK/B" ne peut pas
    /// sortir de son segment de chemin.
    fn endpoint(&self, segments: &[&str]) -> Result<Url, ApiError> {
        let mut url = self.base_url.clone();
        {
            let mut path = url
                .path_segments_mut()
                .map_err(|_| ApiError::InvalidUrl(self.base_url.to_string()))?;
            path.pop_if_empty().extend(segments);
        }
        Ok(url)
    }

    /// Envoie la requête et convertit les statuts non-2xx en ApiError::Status
    async fn send(&self, request: RequestBuilder, url: &Url) -> Result<Response, ApiError> {
        let response = request.send().await.map_err(|e| ApiError::Transport {
            url: url.to_string(),
            message: e.to_string(),
        })?;

        let status = response.status();
        debug!(%status, %url, "Received HTTP response");

        if status.is_success() {
            return Ok(response);
        }

        // Le corps devient le détail de l'erreur (vide s'il est illisible)
        let body = response.text().await.unwrap_or_default();
        Err(ApiError::Status {
            status: status.as_u16(),
            body: body.trim().to_string(),
        })
    }

    async fn get_json<T: DeserializeOwned>(&self, request: RequestBuilder, url: &Url) -> Result<T, ApiError> {
        let response = self.send(request, url).await?;
        response
            .json::<T>()
            .await
            .map_err(|e| ApiError::Decode(e.to_string()))
    }
}

#[async_trait]
impl MarketApi for HttpMarketApi {
    #[instrument(skip(self))]
    async fn health(&self) -> Result<String, ApiError> {
        let url = self.endpoint(&["health"])?;
        let health: HealthResponse = self.get_json(self.http.get(url.clone()), &url).await?;
        Ok(health.status)
    }

    #[instrument(skip(self))]
    async fn watchlist(&self) -> Result<Vec<Ticker>, ApiError> {
        let url = self.endpoint(&["watchlist"])?;
        let body: WatchlistResponse = self.get_json(self.http.get(url.clone()), &url).await?;

        let tickers: Vec<Ticker> = body
            .tickers
            .iter()
            .filter_map(|raw| Ticker::normalize(raw))
            .collect();
        debug!(count = tickers.len(), "Fetched watchlist");
        Ok(tickers)
    }

    #[instrument(skip(self, ticker), fields(ticker = %ticker))]
    async fn add_ticker(&self, ticker: &Ticker) -> Result<AddOutcome, ApiError> {
        let url = self.endpoint(&["watchlist"])?;
        let request = self.http.post(url.clone()).json(&AddTickerRequest {
            ticker: ticker.as_str(),
        });

        match self.send(request, &url).await {
            Ok(_) => Ok(AddOutcome::Created),
            Err(e) if e.status() == Some(StatusCode::CONFLICT.as_u16()) => {
                debug!("Ticker already in watchlist");
                Ok(AddOutcome::AlreadyPresent)
            }
            Err(e) => Err(e),
        }
    }

    #[instrument(skip(self, ticker), fields(ticker = %ticker))]
    async fn remove_ticker(&self, ticker: &Ticker) -> Result<(), ApiError> {
        let url = self.endpoint(&["watchlist", ticker.as_str()])?;
        self.send(self.http.delete(url.clone()), &url).await?;
        Ok(())
    }

    #[instrument(skip(self, ticker, window), fields(ticker = %ticker, page = window.page, limit = window.limit))]
    async fn prices(&self, ticker: &Ticker, window: PageWindow) -> Result<PriceSeries, ApiError> {
        let url = self.endpoint(&["prices", ticker.as_str()])?;
        let request = self
            .http
            .get(url.clone())
            .query(&[("page", window.page), ("limit", window.limit)]);
        let body: PricesResponse = self.get_json(request, &url).await?;
        Ok(parse_prices(body))
    }

    #[instrument(skip(self, ticker, window), fields(ticker = %ticker, page = window.page, limit = window.limit))]
    async fn news(&self, ticker: &Ticker, window: PageWindow) -> Result<NewsPage, ApiError> {
        let url = self.endpoint(&["news", ticker.as_str()])?;
        let request = self
            .http
            .get(url.clone())
            .query(&[("page", window.page), ("limit", window.limit)]);
        let body: NewsResponse = self.get_json(request, &url).await?;
        Ok(parse_news(body))
    }

    #[instrument(skip(self, ticker), fields(ticker = %ticker))]
    async fn latest(&self, ticker: &Ticker) -> Result<LatestAnalysis, ApiError> {
        let url = self.endpoint(&["latest", ticker.as_str()])?;
        match self.get_json::<LatestResponse>(self.http.get(url.clone()), &url).await {
            Ok(body) => Ok(parse_latest(body)),
            // Aucune analyse connue pour ce ticker : ce n'est pas une panne
            Err(e) if e.status() == Some(StatusCode::NOT_FOUND.as_u16()) => {
                debug!("No analysis stored for ticker");
                Ok(LatestAnalysis::Missing)
            }
            Err(e) => Err(e),
        }
    }
}

// ============================================================================
// Conversion wire -> modèles
// ============================================================================

fn parse_prices(body: PricesResponse) -> PriceSeries {
    let total = body.items.len();
    let points: Vec<PricePoint> = body
        .items
        .into_iter()
        .filter_map(|row| {
            let price = row.price?;
            Some(PricePoint {
                price,
                captured_at: row.captured_at.as_deref().and_then(parse_timestamp),
                source: row.source,
            })
        })
        .collect();

    let skipped = total - points.len();
    if skipped > 0 {
        warn!(skipped, total, "Skipped price rows without a price");
    }

    PriceSeries::from_server_order(points)
}

fn parse_news(body: NewsResponse) -> NewsPage {
    let items = body
        .items
        .iter()
        .filter_map(|row| {
            NewsItem::normalized(
                row.headline.as_deref().unwrap_or_default(),
                row.source.as_deref(),
                row.url.as_deref(),
                row.published_at.as_deref(),
                row.fetched_at.as_deref(),
            )
        })
        .collect();

    NewsPage {
        items,
        has_next: body.has_next,
    }
}

fn parse_latest(body: LatestResponse) -> LatestAnalysis {
    let pending = body
        .status
        .as_deref()
        .is_some_and(|s| s.eq_ignore_ascii_case("pending"));

    match body.summary {
        Some(summary) if !pending => LatestAnalysis::Ready(AnalysisRecord {
            summary,
            sentiment: Sentiment::parse(body.sentiment.as_deref()),
            hypothesis: body.hypothesis,
            trigger_reason: body.trigger_reason,
            confidence: body.confidence,
            movement_delta: body.movement_delta,
            created_at: body.created_at,
        }),
        _ => LatestAnalysis::Pending {
            message: body.message,
        },
    }
}

/// Parse un timestamp ISO 8601, avec ou sans fuseau (UTC supposé)
fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    let raw = raw.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.with_timezone(&Utc));
    }
    ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"]
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(raw, fmt).ok())
        .map(|naive| naive.and_utc())
}

// ============================================================================
// Tests unitaires
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::{TcpListener, TcpStream};
    use tokio::task::JoinHandle;

    /// Lit une requête HTTP complète (en-têtes + corps selon Content-Length)
    async fn read_request(stream: &mut TcpStream) -> String {
        let mut buf = Vec::new();
        let mut chunk = [0u8; 1024];
        loop {
            let n = stream.read(&mut chunk).await.unwrap();
            if n == 0 {
                break;
            }
            buf.extend_from_slice(&chunk[..n]);

            let text = String::from_utf8_lossy(&buf).to_string();
            if let Some(end) = text.find("\r\n\r\n") {
                let content_length = text[..end]
                    .lines()
                    .find_map(|line| {
                        let (key, value) = line.split_once(':')?;
                        if key.eq_ignore_ascii_case("content-length") {
                            value.trim().parse::<usize>().ok()
                        } else {
                            None
                        }
                    })
                    .unwrap_or(0);
                if buf.len() >= end + 4 + content_length {
                    return text;
                }
            }
        }
        String::from_utf8_lossy(&buf).to_string()
    }

    /// Serveur jetable : répond une fois avec le statut et le corps donnés,
    /// et renvoie la requête reçue
    async fn serve_once(status_line: &'static str, body: &'static str) -> (String, JoinHandle<String>) {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let base_url = format!("http://{}/", listener.local_addr().unwrap());

        let handle = tokio::spawn(async move {
            let (mut stream, _) = listener.accept().await.unwrap();
            let request = read_request(&mut stream).await;
            let response = format!(
                "HTTP/1.1 {}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
                status_line,
                body.len(),
                body
            );
            stream.write_all(response.as_bytes()).await.unwrap();
            stream.shutdown().await.ok();
            request
        });

        (base_url, handle)
    }

    fn client(base_url: &str) -> HttpMarketApi {
        let http = reqwest::Client::builder().no_proxy().build().unwrap();
        HttpMarketApi::with_client(base_url, http).unwrap()
    }

    fn ticker(raw: &str) -> Ticker {
        Ticker::normalize(raw).unwrap()
    }

    #[test]
    fn test_endpoint_encodes_segments() {
        let api = client("http://localhost:8000/api/");
        let url = api.endpoint(&["latest", "BRK/B"]).unwrap();
        assert_eq!(url.as_str(), "http://localhost:8000/api/latest/BRK%2FB");

        let api = client("http://localhost:8000");
        let url = api.endpoint(&["watchlist"]).unwrap();
        assert_eq!(url.as_str(), "http://localhost:8000/watchlist");
    }

    #[test]
    fn test_invalid_base_url() {
        let http = reqwest::Client::new();
        assert!(matches!(
            HttpMarketApi::with_client("not a url", http),
            Err(ApiError::InvalidUrl(_))
        ));
    }

    #[test]
    fn test_parse_latest_pending() {
        let body: LatestResponse = serde_json::from_str(
            r#"{"ticker":"AAPL","status":"pending","message":"No analysis stored yet."}"#,
        )
        .unwrap();
        assert_eq!(
            parse_latest(body),
            LatestAnalysis::Pending {
                message: Some("No analysis stored yet.".to_string())
            }
        );
    }

    #[test]
    fn test_parse_latest_ready() {
        let body: LatestResponse = serde_json::from_str(
            r#"{"ticker":"AAPL","summary":"AAPL moved +1.20%","sentiment":"positive",
                "hypothesis":"Earnings beat","trigger_reason":"price_move_above_threshold",
                "movement_delta":1.2}"#,
        )
        .unwrap();

        let latest = parse_latest(body);
        let record = latest.record().unwrap();
        assert_eq!(record.summary, "AAPL moved +1.20%");
        assert_eq!(record.sentiment, Sentiment::Positive);
        assert_eq!(record.trigger_reason.as_deref(), Some("price_move_above_threshold"));
    }

    #[test]
    fn test_parse_prices_skips_null_and_orders_oldest_first() {
        let body: PricesResponse = serde_json::from_str(
            r#"{"items":[
                {"price":103.0,"captured_at":"2024-05-02T12:00:00+00:00","source":"mock"},
                {"price":null,"captured_at":"2024-05-02T11:00:00+00:00"},
                {"price":101.0,"captured_at":"2024-05-02T10:00:00"}
            ]}"#,
        )
        .unwrap();

        let series = parse_prices(body);
        let prices: Vec<f64> = series.points().iter().map(|p| p.price).collect();
        assert_eq!(prices, vec![101.0, 103.0]);
    }

    #[test]
    fn test_parse_timestamp_formats() {
        assert!(parse_timestamp("2024-05-02T10:00:00Z").is_some());
        assert!(parse_timestamp("2024-05-02T10:00:00.123456").is_some());
        assert!(parse_timestamp("2024-05-02 10:00:00").is_some());
        assert!(parse_timestamp("yesterday").is_none());
    }

    #[tokio::test]
    async fn test_add_conflict_is_already_present() {
        let (base_url, server) = serve_once("409 Conflict", r#"{"detail":"exists"}"#).await;
        let api = client(&base_url);

        let outcome = api.add_ticker(&ticker("msft")).await.unwrap();
        assert_eq!(outcome, AddOutcome::AlreadyPresent);

        let request = server.await.unwrap();
        assert!(request.starts_with("POST /watchlist"));
        assert!(request.contains(r#"{"ticker":"MSFT"}"#));
    }

    #[tokio::test]
    async fn test_server_error_keeps_body() {
        let (base_url, server) = serve_once("500 Internal Server Error", "boom").await;
        let api = client(&base_url);

        let err = api
            .news(&ticker("AAPL"), PageWindow::new(2, 5))
            .await
            .unwrap_err();
        assert_eq!(
            err,
            ApiError::Status {
                status: 500,
                body: "boom".to_string()
            }
        );

        let request = server.await.unwrap();
        assert!(request.starts_with("GET /news/AAPL?page=2&limit=5"));
    }

    #[tokio::test]
    async fn test_latest_not_found_is_missing() {
        let (base_url, server) = serve_once("404 Not Found", r#"{"detail":"Not Found"}"#).await;
        let api = client(&base_url);

        let latest = api.latest(&ticker("tsla")).await.unwrap();
        assert_eq!(latest, LatestAnalysis::Missing);
        server.await.unwrap();
    }

    #[tokio::test]
    async fn test_watchlist_normalizes_tickers() {
        let (base_url, server) =
            serve_once("200 OK", r#"{"tickers":["aapl"," MSFT ",""]}"#).await;
        let api = client(&base_url);

        let tickers = api.watchlist().await.unwrap();
        assert_eq!(tickers, vec![ticker("AAPL"), ticker("MSFT")]);
        server.await.unwrap();
    }

    #[tokio::test]
    async fn test_unreachable_server_is_transport_error() {
        // Port libéré juste après le bind : personne n'écoute
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let base_url = format!("http://{}/", listener.local_addr().unwrap());
        drop(listener);

        let err = client(&base_url).health().await.unwrap_err();
        assert!(matches!(err, ApiError::Transport { .. }));
    }
}
