// ============================================================================
// Module : session
// ============================================================================
// Couche d'orchestration côté client. Session regroupe quatre composants,
// chacun propriétaire de ses propres champs :
//
// - WatchlistStore     : tickers suivis + sélection
// - DetailLoader       : prix / news / analyse du ticker sélectionné
// - Pagination         : page de news courante + has_next
// - RequestCoordinator : requêtes en vol + dernière erreur
//
// PATTERN : chaque action utilisateur modifie l'état canonique et retourne
// les AppCommand à exécuter ; chaque AppResult est réinjecté par complete().
// Le chargement du détail est déclenché uniquement par un changement de la
// paire (ticker, page).
// ============================================================================

pub mod command;     // AppCommand / AppResult
pub mod coordinator; // État occupé / erreur
pub mod detail;      // Chargement du détail
pub mod error;       // ConsoleError
pub mod executor;    // Exécution des commandes (tokio)
pub mod pagination;  // Pagination des news
pub mod watchlist;   // Watchlist + sélection

#[cfg(test)]
pub(crate) mod testing;

pub use command::{AppCommand, AppResult, Operation, OperationKind, Payload, RequestId};
pub use coordinator::{Activity, RequestCoordinator};
pub use detail::{DetailBundle, DetailLoader, DetailOutcome, DetailRequest, DetailView};
pub use error::ConsoleError;
pub use pagination::Pagination;
pub use watchlist::WatchlistStore;

use tracing::{debug, info, warn};

use crate::models::{Ticker, TickerPolicy};

/// Paramètres de la session (issus de la configuration)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SessionConfig {
    pub ticker_policy: TickerPolicy,

    /// Taille de la fenêtre d'historique de prix
    pub price_limit: u32,

    /// Nombre de news par page
    pub news_page_size: u32,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            ticker_policy: TickerPolicy::default(),
            price_limit: 50,
            news_page_size: 5,
        }
    }
}

/// Dernier état connu du backend
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum ApiHealth {
    #[default]
    Unknown,
    Up(String),
    Down,
}

/// Contrôles actifs, dérivés de l'état à chaque lecture
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Controls {
    pub can_add: bool,
    pub can_remove: bool,
    pub can_refresh: bool,
    pub can_next: bool,
    pub can_prev: bool,
}

/// État de la session
#[derive(Debug, Clone)]
pub struct Session {
    config: SessionConfig,
    watchlist: WatchlistStore,
    detail: DetailLoader,
    pagination: Pagination,
    coordinator: RequestCoordinator,
    health: ApiHealth,
}

impl Session {
    pub fn new(config: SessionConfig) -> Self {
        Self {
            config,
            watchlist: WatchlistStore::new(),
            detail: DetailLoader::new(config.price_limit, config.news_page_size),
            pagination: Pagination::new(),
            coordinator: RequestCoordinator::new(),
            health: ApiHealth::Unknown,
        }
    }

    // ========================================================================
    // Lecture
    // ========================================================================

    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    pub fn watchlist(&self) -> &WatchlistStore {
        &self.watchlist
    }

    pub fn selected(&self) -> Option<&Ticker> {
        self.watchlist.selected()
    }

    pub fn detail(&self) -> &DetailView {
        self.detail.view()
    }

    pub fn pagination(&self) -> &Pagination {
        &self.pagination
    }

    pub fn coordinator(&self) -> &RequestCoordinator {
        &self.coordinator
    }

    pub fn activity(&self) -> Activity {
        self.coordinator.activity()
    }

    pub fn last_error(&self) -> Option<&ConsoleError> {
        self.coordinator.last_error()
    }

    pub fn health(&self) -> &ApiHealth {
        &self.health
    }

    pub fn controls(&self) -> Controls {
        let watchlist_busy = self
            .coordinator
            .is_busy_with(|kind| kind.touches_watchlist());
        Controls {
            can_add: !watchlist_busy,
            can_remove: !watchlist_busy && self.watchlist.selected_in_watchlist(),
            can_refresh: !watchlist_busy,
            can_next: self.pagination.has_next(),
            can_prev: self.pagination.can_prev(),
        }
    }

    // ========================================================================
    // Actions utilisateur
    // ========================================================================

    /// Commandes de démarrage : santé de l'API puis watchlist
    pub fn bootstrap(&mut self) -> Vec<AppCommand> {
        vec![self.check_health(), self.refresh()]
    }

    pub fn check_health(&mut self) -> AppCommand {
        self.coordinator.begin(Operation::CheckHealth)
    }

    /// Resynchronise la watchlist avec le serveur
    pub fn refresh(&mut self) -> AppCommand {
        self.coordinator.begin(Operation::RefreshWatchlist)
    }

    /// Ajoute un ticker saisi librement
    ///
    /// - Saisie vide : rien
    /// - Politique de validation non respectée : erreur, pas d'appel réseau
    pub fn add(&mut self, raw: &str) -> Option<AppCommand> {
        let Some(ticker) = Ticker::normalize(raw) else {
            debug!("Empty ticker input, ignoring");
            return None;
        };

        if let Err(reason) = self.config.ticker_policy.check(&ticker) {
            self.coordinator.record(ConsoleError::add(&ticker, reason));
            return None;
        }

        info!(ticker = %ticker, "Adding ticker");
        Some(self.coordinator.begin(Operation::AddTicker(ticker)))
    }

    /// Supprime un ticker : uniquement la sélection courante
    pub fn remove(&mut self, ticker: &Ticker) -> Option<AppCommand> {
        if !self.watchlist.can_remove(ticker) {
            warn!(
                ticker = %ticker,
                selected = ?self.watchlist.selected(),
                "Remove rejected: ticker is not the current selection"
            );
            return None;
        }

        info!(ticker = %ticker, "Removing ticker");
        Some(self.coordinator.begin(Operation::RemoveTicker(ticker.clone())))
    }

    /// Supprime la sélection courante
    pub fn remove_selected(&mut self) -> Option<AppCommand> {
        let ticker = self.watchlist.selected()?.clone();
        self.remove(&ticker)
    }

    /// Sélectionne un ticker de la watchlist
    pub fn select(&mut self, ticker: &Ticker) -> Option<AppCommand> {
        if self.watchlist.selected() == Some(ticker) {
            return self.sync_detail();
        }
        if !self.watchlist.select(ticker) {
            debug!(ticker = %ticker, "Ignoring selection of ticker outside watchlist");
            return None;
        }

        // Pagination propre au ticker : retour page 1 AVANT le chargement
        self.pagination.reset();
        self.sync_detail()
    }

    /// Navigation ↑↓ dans la watchlist
    pub fn select_relative(&mut self, offset: isize) -> Option<AppCommand> {
        let target = self.watchlist.neighbour(offset)?.clone();
        self.select(&target)
    }

    pub fn next_page(&mut self) -> Option<AppCommand> {
        if !self.pagination.next() {
            return None;
        }
        self.sync_detail()
    }

    pub fn prev_page(&mut self) -> Option<AppCommand> {
        if !self.pagination.prev() {
            return None;
        }
        self.sync_detail()
    }

    pub fn dismiss_error(&mut self) {
        self.coordinator.dismiss_error();
    }

    // ========================================================================
    // Résultats
    // ========================================================================

    /// Applique le résultat d'une commande
    ///
    /// Retourne éventuellement une commande de suivi (chargement du détail
    /// quand la sélection ou la page a changé).
    pub fn complete(&mut self, result: AppResult) -> Option<AppCommand> {
        let AppResult { command, outcome } = result;
        let AppCommand { id, operation } = command;

        match (operation, outcome) {
            (Operation::LoadDetail(request), outcome) => {
                let outcome = outcome.and_then(|payload| match payload {
                    Payload::Detail(bundle) => Ok(bundle),
                    other => Err(unexpected(&Operation::LoadDetail(request.clone()), &other)),
                });
                match self.detail.apply(&request, outcome) {
                    DetailOutcome::Applied { has_next } => {
                        self.pagination.record_has_next(has_next);
                        self.coordinator.succeed(id);
                    }
                    DetailOutcome::Failed(err) => self.coordinator.fail(id, err),
                    DetailOutcome::Stale => self.coordinator.discard(id),
                }
                None
            }

            (Operation::CheckHealth, Ok(Payload::Health(status))) => {
                self.health = ApiHealth::Up(status);
                self.coordinator.succeed(id);
                None
            }

            (Operation::RefreshWatchlist, Ok(Payload::Watchlist(tickers))) => {
                self.apply_watchlist(tickers, None, false);
                self.coordinator.succeed(id);
                self.sync_detail()
            }

            (Operation::AddTicker(ticker), Ok(Payload::Watchlist(tickers))) => {
                self.apply_watchlist(tickers, Some(&ticker), true);
                self.coordinator.succeed(id);
                self.sync_detail()
            }

            (Operation::RemoveTicker(ticker), Ok(Payload::Watchlist(tickers))) => {
                if tickers.contains(&ticker) {
                    warn!(ticker = %ticker, "Removed ticker still present after refresh");
                }
                self.apply_watchlist(tickers, None, true);
                self.coordinator.succeed(id);
                self.sync_detail()
            }

            (operation, Err(err)) => {
                if operation == Operation::CheckHealth {
                    self.health = ApiHealth::Down;
                }
                self.coordinator.fail(id, err);
                None
            }

            (operation, Ok(payload)) => {
                let err = unexpected(&operation, &payload);
                self.coordinator.fail(id, err);
                None
            }
        }
    }

    /// Remplace la watchlist par la version serveur
    ///
    /// - select : ticker à sélectionner (ajout)
    /// - reset_page : ajout/suppression remettent toujours la page à 1
    fn apply_watchlist(&mut self, tickers: Vec<Ticker>, select: Option<&Ticker>, reset_page: bool) {
        let before = self.watchlist.selected().cloned();
        self.watchlist.replace(tickers);

        if let Some(ticker) = select {
            if !self.watchlist.select(ticker) {
                warn!(ticker = %ticker, "Added ticker missing from refreshed watchlist");
            }
        }

        let selection_changed = self.watchlist.selected() != before.as_ref();
        if reset_page || selection_changed {
            self.pagination.reset();
        }

        info!(
            count = self.watchlist.tickers().len(),
            selected = ?self.watchlist.selected(),
            page = self.pagination.page(),
            "Watchlist updated"
        );
    }

    /// Émet un chargement si la paire (ticker, page) a changé
    fn sync_detail(&mut self) -> Option<AppCommand> {
        let ticker = self.watchlist.selected().cloned();
        let page = self.pagination.page();

        if !self.detail.needs_load(ticker.as_ref(), page) {
            return None;
        }

        let request = self.detail.load(ticker, page)?;
        Some(self.coordinator.begin(Operation::LoadDetail(request)))
    }
}

fn unexpected(operation: &Operation, payload: &Payload) -> ConsoleError {
    warn!(?operation, ?payload, "Unexpected payload for operation");
    operation.failure("réponse inattendue")
}

// ============================================================================
// Tests
// ============================================================================
