// ============================================================================
// RequestCoordinator : état occupé / erreur
// ============================================================================
// CONCEPT : State machine dérivée
// - Idle : aucune requête en vol
// - Busy : au moins une requête en vol, pas d'erreur affichée
// - BusyWithPendingErrorClear : requête en vol alors qu'une erreur est
//   affichée ; elle sera effacée si cette requête réussit
//
// L'état n'est jamais stocké : il est recalculé à partir de l'ensemble des
// requêtes en vol et de la dernière erreur. Une seule erreur est retenue.
// ============================================================================

use std::collections::BTreeMap;

use tracing::{debug, warn};

use crate::session::command::{AppCommand, Operation, OperationKind, RequestId};
use crate::session::ConsoleError;

/// État visible du coordinateur
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Activity {
    Idle,
    Busy,
    BusyWithPendingErrorClear,
}

#[derive(Debug, Clone, Default)]
pub struct RequestCoordinator {
    next_id: RequestId,

    /// Requêtes en vol et message de chargement associé
    in_flight: BTreeMap<RequestId, (OperationKind, String)>,
    last_error: Option<ConsoleError>,
}

impl RequestCoordinator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Démarre une opération : elle reste "en vol" jusqu'à settle/discard
    pub fn begin(&mut self, operation: Operation) -> AppCommand {
        self.next_id += 1;
        let id = self.next_id;
        debug!(id, kind = ?operation.kind(), "Request started");
        self.in_flight
            .insert(id, (operation.kind(), operation.describe()));
        AppCommand { id, operation }
    }

    /// Termine une opération réussie : efface l'erreur retenue
    pub fn succeed(&mut self, id: RequestId) {
        if self.release(id) {
            self.last_error = None;
        }
    }

    /// Termine une opération en échec : l'erreur remplace la précédente
    pub fn fail(&mut self, id: RequestId, error: ConsoleError) {
        if self.release(id) {
            self.record(error);
        }
    }

    /// Termine une opération dont le résultat a été ignoré (réponse périmée)
    pub fn discard(&mut self, id: RequestId) {
        self.release(id);
    }

    /// Enregistre une erreur survenue hors requête (validation locale)
    pub fn record(&mut self, error: ConsoleError) {
        warn!(error = %error, "Operation failed");
        self.last_error = Some(error);
    }

    /// Efface l'erreur affichée (action utilisateur)
    pub fn dismiss_error(&mut self) {
        self.last_error = None;
    }

    fn release(&mut self, id: RequestId) -> bool {
        match self.in_flight.remove(&id) {
            Some((kind, _)) => {
                debug!(id, ?kind, remaining = self.in_flight.len(), "Request settled");
                true
            }
            None => {
                warn!(id, "Settling unknown request, ignored");
                false
            }
        }
    }

    pub fn activity(&self) -> Activity {
        match (self.in_flight.is_empty(), self.last_error.is_some()) {
            (true, _) => Activity::Idle,
            (false, false) => Activity::Busy,
            (false, true) => Activity::BusyWithPendingErrorClear,
        }
    }

    /// Vrai si une opération de la catégorie donnée est en vol
    pub fn is_busy_with(&self, predicate: impl Fn(OperationKind) -> bool) -> bool {
        self.in_flight.values().any(|(kind, _)| predicate(*kind))
    }

    /// Nombre de requêtes en vol
    pub fn in_flight(&self) -> usize {
        self.in_flight.len()
    }

    /// Message de l'opération en vol la plus récente
    pub fn loading_message(&self) -> Option<&str> {
        self.in_flight
            .values()
            .next_back()
            .map(|(_, message)| message.as_str())
    }

    pub fn last_error(&self) -> Option<&ConsoleError> {
        self.last_error.as_ref()
    }
}
