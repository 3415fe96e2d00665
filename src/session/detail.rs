// ============================================================================
// DetailLoader : prix + news + analyse du ticker sélectionné
// ============================================================================
// CONCEPT : Request tagging
// - Chaque chargement reçoit un numéro de génération croissant
// - Un résultat n'est appliqué que s'il porte la dernière génération émise
// - Les réponses arrivées en retard (ticker ou page abandonnés) sont
//   simplement jetées : pas d'annulation réseau, pas de mélange d'états
//
// CONCEPT : Tout ou rien
// - Les trois ressources arrivent ensemble (DetailBundle) ou pas du tout
// - En cas d'échec, la vue précédente reste affichée telle quelle
// ============================================================================

use tracing::{debug, info, warn};

use crate::api::PageWindow;
use crate::models::{LatestAnalysis, NewsPage, PriceSeries, Ticker};
use crate::session::ConsoleError;

/// Un chargement émis, tel qu'envoyé à l'executor
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DetailRequest {
    pub ticker: Ticker,

    /// Page de news demandée
    pub page: u32,

    /// Génération du chargement (tag anti-réponses périmées)
    pub generation: u64,

    /// Fenêtre fixe de l'historique de prix
    pub price_window: PageWindow,

    /// Fenêtre de la page de news (page = self.page)
    pub news_window: PageWindow,
}

/// Les trois ressources d'un chargement réussi
#[derive(Debug, Clone, PartialEq)]
pub struct DetailBundle {
    pub prices: PriceSeries,
    pub news: NewsPage,
    pub analysis: LatestAnalysis,
}

/// Vue affichée dans la colonne de détail
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DetailView {
    /// Ticker auquel appartiennent les données affichées
    pub ticker: Option<Ticker>,

    /// Page de news affichée
    pub page: u32,
    pub prices: PriceSeries,
    pub news: NewsPage,
    pub analysis: LatestAnalysis,
}

impl DetailView {
    pub fn is_empty(&self) -> bool {
        self.ticker.is_none()
    }
}

/// Résultat de l'application d'une réponse
#[derive(Debug, Clone, PartialEq)]
pub enum DetailOutcome {
    /// Vue remplacée, avec le drapeau has_next de la page de news
    Applied { has_next: bool },

    /// Chargement courant en échec, vue inchangée
    Failed(ConsoleError),

    /// Réponse d'un chargement abandonné, ignorée
    Stale,
}

/// Dernier chargement émis
#[derive(Debug, Clone, PartialEq, Eq)]
struct Issued {
    ticker: Ticker,
    page: u32,
    generation: u64,
    failed: bool,
}

/// Chargeur de détail
#[derive(Debug, Clone, Default)]
pub struct DetailLoader {
    view: DetailView,
    generation: u64,
    issued: Option<Issued>,
    price_limit: u32,
    news_page_size: u32,
}

impl DetailLoader {
    pub fn new(price_limit: u32, news_page_size: u32) -> Self {
        Self {
            view: DetailView::default(),
            generation: 0,
            issued: None,
            price_limit,
            news_page_size,
        }
    }

    pub fn view(&self) -> &DetailView {
        &self.view
    }

    /// Vrai si un chargement est nécessaire pour la paire (ticker, page)
    ///
    /// La paire est le seul déclencheur : rien à faire si elle n'a pas
    /// changé depuis le dernier chargement émis, sauf si celui-ci a échoué.
    pub fn needs_load(&self, ticker: Option<&Ticker>, page: u32) -> bool {
        match (ticker, &self.issued) {
            (None, None) => !self.view.is_empty(),
            (None, Some(_)) => true,
            (Some(_), None) => true,
            (Some(ticker), Some(issued)) => {
                issued.failed || issued.ticker != *ticker || issued.page != page
            }
        }
    }

    /// Charge la paire (ticker, page)
    ///
    /// - ticker None : vide la vue et invalide tout chargement en vol
    /// - sinon : émet une nouvelle requête taguée
    pub fn load(&mut self, ticker: Option<Ticker>, page: u32) -> Option<DetailRequest> {
        self.generation += 1;

        let Some(ticker) = ticker else {
            debug!(generation = self.generation, "Selection cleared, resetting detail view");
            self.issued = None;
            self.view = DetailView::default();
            return None;
        };

        info!(ticker = %ticker, page, generation = self.generation, "Issuing detail load");
        self.issued = Some(Issued {
            ticker: ticker.clone(),
            page,
            generation: self.generation,
            failed: false,
        });

        Some(DetailRequest {
            ticker,
            page,
            generation: self.generation,
            price_window: PageWindow::new(1, self.price_limit),
            news_window: PageWindow::new(page, self.news_page_size),
        })
    }

    /// Vrai si la requête est la dernière émise
    pub fn is_current(&self, request: &DetailRequest) -> bool {
        self.issued
            .as_ref()
            .is_some_and(|issued| issued.generation == request.generation)
    }

    /// Applique la réponse d'un chargement
    pub fn apply(
        &mut self,
        request: &DetailRequest,
        outcome: Result<DetailBundle, ConsoleError>,
    ) -> DetailOutcome {
        if !self.is_current(request) {
            debug!(
                ticker = %request.ticker,
                page = request.page,
                generation = request.generation,
                latest = self.generation,
                "Discarding stale detail response"
            );
            return DetailOutcome::Stale;
        }

        match outcome {
            Ok(bundle) => {
                let has_next = bundle.news.has_next;
                info!(
                    ticker = %request.ticker,
                    page = request.page,
                    prices = bundle.prices.len(),
                    news = bundle.news.items.len(),
                    has_next,
                    sentiment = ?bundle.analysis.record().map(|r| r.sentiment),
                    "Detail view updated"
                );
                self.view = DetailView {
                    ticker: Some(request.ticker.clone()),
                    page: request.page,
                    prices: bundle.prices,
                    news: bundle.news,
                    analysis: bundle.analysis,
                };
                DetailOutcome::Applied { has_next }
            }
            Err(err) => {
                warn!(ticker = %request.ticker, page = request.page, error = %err, "Detail load failed, keeping previous view");
                if let Some(issued) = self.issued.as_mut() {
                    issued.failed = true;
                }
                DetailOutcome::Failed(err)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{NewsItem, PricePoint};

    fn t(symbol: &str) -> Ticker {
        Ticker::normalize(symbol).unwrap()
    }

    fn bundle(headline: &str, has_next: bool) -> DetailBundle {
        DetailBundle {
            prices: PriceSeries::from_server_order(vec![PricePoint::new(100.0, None)]),
            news: NewsPage {
                items: vec![NewsItem::normalized(headline, Some("Reuters"), None, None, None).unwrap()],
                has_next,
            },
            analysis: LatestAnalysis::Missing,
        }
    }

    #[test]
    fn test_load_builds_windows() {
        let mut loader = DetailLoader::new(50, 5);
        let request = loader.load(Some(t("AAPL")), 3).unwrap();
        assert_eq!(request.price_window, PageWindow::new(1, 50));
        assert_eq!(request.news_window, PageWindow::new(3, 5));
        assert!(loader.is_current(&request));
    }

    #[test]
    fn test_only_latest_generation_is_applied() {
        let mut loader = DetailLoader::new(50, 5);
        let first = loader.load(Some(t("AAPL")), 1).unwrap();
        let second = loader.load(Some(t("MSFT")), 1).unwrap();

        // La réponse la plus récente arrive en premier
        assert_eq!(
            loader.apply(&second, Ok(bundle("MSFT news", false))),
            DetailOutcome::Applied { has_next: false }
        );
        // La réponse périmée arrive ensuite : ignorée
        assert_eq!(loader.apply(&first, Ok(bundle("AAPL news", true))), DetailOutcome::Stale);

        assert_eq!(loader.view().ticker, Some(t("MSFT")));
        assert_eq!(loader.view().news.items[0].headline, "MSFT news");
    }

    #[test]
    fn test_failure_keeps_previous_view() {
        let mut loader = DetailLoader::new(50, 5);
        let first = loader.load(Some(t("AAPL")), 1).unwrap();
        loader.apply(&first, Ok(bundle("page one", true)));

        let second = loader.load(Some(t("AAPL")), 2).unwrap();
        let err = ConsoleError::detail(&t("AAPL"), 2, "HTTP 500 : boom");
        assert_eq!(
            loader.apply(&second, Err(err.clone())),
            DetailOutcome::Failed(err)
        );

        assert_eq!(loader.view().page, 1);
        assert_eq!(loader.view().news.items[0].headline, "page one");
        // L'échec rend la même paire rechargeable
        assert!(loader.needs_load(Some(&t("AAPL")), 2));
    }

    #[test]
    fn test_clear_invalidates_in_flight() {
        let mut loader = DetailLoader::new(50, 5);
        let first = loader.load(Some(t("AAPL")), 1).unwrap();
        loader.apply(&first, Ok(bundle("AAPL news", false)));

        let pending = loader.load(Some(t("AAPL")), 2).unwrap();
        assert!(loader.load(None, 1).is_none());
        assert!(loader.view().is_empty());
        assert_eq!(loader.apply(&pending, Ok(bundle("late", false))), DetailOutcome::Stale);
        assert!(!loader.needs_load(None, 1));
    }

    #[test]
    fn test_needs_load_only_on_pair_change() {
        let mut loader = DetailLoader::new(50, 5);
        assert!(loader.needs_load(Some(&t("AAPL")), 1));
        loader.load(Some(t("AAPL")), 1);
        assert!(!loader.needs_load(Some(&t("AAPL")), 1));
        assert!(loader.needs_load(Some(&t("AAPL")), 2));
        assert!(loader.needs_load(Some(&t("MSFT")), 1));
    }
}
