// ============================================================================
// Erreurs du client API
// ============================================================================
// CONCEPT RUST : thiserror
// - #[derive(Error)] implémente std::error::Error
// - #[error("...")] génère Display à partir des champs
// - Contrairement à anyhow, le type est inspectable : on peut matcher sur
//   Status { status: 409, .. } pour traiter le doublon comme un succès
// ============================================================================

use thiserror::Error;

/// Toutes les erreurs produites par un `MarketApi`
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ApiError {
    /// Le serveur n'a pas pu être joint (DNS, connexion, timeout...)
    #[error("requête impossible vers {url} : {message}")]
    Transport { url: String, message: String },

    /// Réponse non-2xx, le corps est conservé comme détail
    #[error("HTTP {status} : {body}")]
    Status { status: u16, body: String },

    /// Réponse 2xx mais JSON inattendu
    #[error("réponse JSON invalide : {0}")]
    Decode(String),

    /// L'URL de base ne permet pas d'ajouter des segments de chemin
    #[error("URL d'API invalide : {0}")]
    InvalidUrl(String),
}

impl ApiError {
    /// Code HTTP si l'erreur vient d'une réponse du serveur
    pub fn status(&self) -> Option<u16> {
        match self {
            ApiError::Status { status, .. } => Some(*status),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_display_keeps_body() {
        let err = ApiError::Status {
            status: 500,
            body: "database locked".to_string(),
        };
        assert_eq!(err.to_string(), "HTTP 500 : database locked");
        assert_eq!(err.status(), Some(500));
        assert_eq!(ApiError::Decode("eof".to_string()).status(), None);
    }
}
