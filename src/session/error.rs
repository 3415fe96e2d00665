// ============================================================================
// ConsoleError : erreurs affichées à l'utilisateur
// ============================================================================
// Une seule erreur est retenue à la fois (voir coordinator.rs).
// Chaque variante est un simple message lisible, construit à partir de
// l'ApiError d'origine et du contexte de l'opération.
// ============================================================================

use std::fmt::Display;

use thiserror::Error;

use crate::models::Ticker;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConsoleError {
    /// Échec réseau ou statut non-2xx (watchlist, santé de l'API...)
    #[error("erreur réseau ({context}) : {message}")]
    Network { context: String, message: String },

    #[error("impossible d'ajouter {ticker} : {message}")]
    AddTicker { ticker: String, message: String },

    #[error("impossible de supprimer {ticker} : {message}")]
    RemoveTicker { ticker: String, message: String },

    #[error("impossible de charger {ticker} (news page {page}) : {message}")]
    DetailLoad {
        ticker: String,
        page: u32,
        message: String,
    },
}

impl ConsoleError {
    pub fn network(context: &str, cause: impl Display) -> Self {
        ConsoleError::Network {
            context: context.to_string(),
            message: cause.to_string(),
        }
    }

    pub fn add(ticker: &Ticker, cause: impl Display) -> Self {
        ConsoleError::AddTicker {
            ticker: ticker.to_string(),
            message: cause.to_string(),
        }
    }

    pub fn remove(ticker: &Ticker, cause: impl Display) -> Self {
        ConsoleError::RemoveTicker {
            ticker: ticker.to_string(),
            message: cause.to_string(),
        }
    }

    pub fn detail(ticker: &Ticker, page: u32, cause: impl Display) -> Self {
        ConsoleError::DetailLoad {
            ticker: ticker.to_string(),
            page,
            message: cause.to_string(),
        }
    }

    /// Ticker concerné, s'il y en a un
    pub fn ticker(&self) -> Option<&str> {
        match self {
            ConsoleError::Network { .. } => None,
            ConsoleError::AddTicker { ticker, .. }
            | ConsoleError::RemoveTicker { ticker, .. }
            | ConsoleError::DetailLoad { ticker, .. } => Some(ticker),
        }
    }
}
