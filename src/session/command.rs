// ============================================================================
// AppCommand / AppResult : messages entre la session et l'executor
// ============================================================================
// CONCEPT RUST : Command pattern avec channels
// - La session décide QUOI faire et émet un AppCommand
// - L'executor fait les appels réseau sur le runtime tokio
// - Un AppResult revient par un channel, toujours exactement un par commande
// ============================================================================

use crate::models::Ticker;
use crate::session::detail::{DetailBundle, DetailRequest};
use crate::session::ConsoleError;

/// Identifiant d'une requête suivie par le coordinateur
pub type RequestId = u64;

/// Travail réseau à effectuer
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Operation {
    /// GET /health
    CheckHealth,

    /// GET /watchlist
    RefreshWatchlist,

    /// POST /watchlist puis GET /watchlist
    AddTicker(Ticker),

    /// DELETE /watchlist/{ticker} puis GET /watchlist
    RemoveTicker(Ticker),

    /// prix + news + analyse, en parallèle
    LoadDetail(DetailRequest),
}

/// Catégorie d'opération (sans données), utilisée par le coordinateur
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OperationKind {
    Health,
    Refresh,
    Add,
    Remove,
    Detail,
}

impl OperationKind {
    /// Opérations qui modifient ou resynchronisent la watchlist
    pub fn touches_watchlist(&self) -> bool {
        matches!(self, OperationKind::Refresh | OperationKind::Add | OperationKind::Remove)
    }
}

impl Operation {
    pub fn kind(&self) -> OperationKind {
        match self {
            Operation::CheckHealth => OperationKind::Health,
            Operation::RefreshWatchlist => OperationKind::Refresh,
            Operation::AddTicker(_) => OperationKind::Add,
            Operation::RemoveTicker(_) => OperationKind::Remove,
            Operation::LoadDetail(_) => OperationKind::Detail,
        }
    }

    /// Construit l'erreur correspondant à un échec de cette opération
    pub fn failure(&self, message: impl std::fmt::Display) -> ConsoleError {
        match self {
            Operation::CheckHealth => ConsoleError::network("santé de l'API", message),
            Operation::RefreshWatchlist => {
                ConsoleError::network("rafraîchissement de la watchlist", message)
            }
            Operation::AddTicker(ticker) => ConsoleError::add(ticker, message),
            Operation::RemoveTicker(ticker) => ConsoleError::remove(ticker, message),
            Operation::LoadDetail(request) => {
                ConsoleError::detail(&request.ticker, request.page, message)
            }
        }
    }

    /// Message de chargement affiché pendant l'opération
    pub fn describe(&self) -> String {
        match self {
            Operation::CheckHealth => "Vérification de l'API...".to_string(),
            Operation::RefreshWatchlist => "Rafraîchissement de la watchlist...".to_string(),
            Operation::AddTicker(ticker) => format!("Ajout de {}...", ticker),
            Operation::RemoveTicker(ticker) => format!("Suppression de {}...", ticker),
            Operation::LoadDetail(request) => {
                format!("Chargement de {} (page {})...", request.ticker, request.page)
            }
        }
    }
}

/// Commande envoyée à l'executor
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppCommand {
    pub id: RequestId,
    pub operation: Operation,
}

/// Données renvoyées par une opération réussie
#[derive(Debug, Clone, PartialEq)]
pub enum Payload {
    /// Statut renvoyé par /health (ex: "ok")
    Health(String),

    /// Watchlist faisant autorité après l'opération
    Watchlist(Vec<Ticker>),

    Detail(DetailBundle),
}

/// Résultat d'une commande
#[derive(Debug, Clone, PartialEq)]
pub struct AppResult {
    pub command: AppCommand,
    pub outcome: Result<Payload, ConsoleError>,
}
