// ============================================================================
// Executor : exécution des AppCommand sur le runtime tokio
// ============================================================================
// CONCEPTS RUST :
// 1. tokio::try_join! : les trois fetchs du détail partent en même temps,
//    le premier échec interrompt l'attente (tout ou rien)
// 2. Chaînes séquentielles : ajout/suppression PUIS rafraîchissement,
//    chaque étape dépend de l'effet confirmé de la précédente
// 3. JoinHandle : une tâche qui panique produit quand même un AppResult,
//    l'état occupé est donc toujours libéré
// ============================================================================

use std::sync::Arc;

use tokio::runtime::Handle;
use tokio::sync::mpsc::UnboundedSender;
use tracing::{debug, error, info, instrument};

use crate::api::{AddOutcome, MarketApi};
use crate::session::command::{AppCommand, AppResult, Operation, Payload};
use crate::session::detail::{DetailBundle, DetailRequest};
use crate::session::ConsoleError;

/// Exécute une commande et retourne son résultat
#[instrument(skip(api, command), fields(id = command.id, kind = ?command.operation.kind()))]
pub async fn execute(api: &dyn MarketApi, command: &AppCommand) -> Result<Payload, ConsoleError> {
    match &command.operation {
        Operation::CheckHealth => {
            let status = api
                .health()
                .await
                .map_err(|e| command.operation.failure(e))?;
            info!(%status, "API health checked");
            Ok(Payload::Health(status))
        }

        Operation::RefreshWatchlist => {
            let tickers = api
                .watchlist()
                .await
                .map_err(|e| command.operation.failure(e))?;
            Ok(Payload::Watchlist(tickers))
        }

        Operation::AddTicker(ticker) => {
            match api
                .add_ticker(ticker)
                .await
                .map_err(|e| command.operation.failure(e))?
            {
                AddOutcome::Created => info!(ticker = %ticker, "Ticker added"),
                AddOutcome::AlreadyPresent => info!(ticker = %ticker, "Ticker already present"),
            }
            refresh_after_write(api).await
        }

        Operation::RemoveTicker(ticker) => {
            api.remove_ticker(ticker)
                .await
                .map_err(|e| command.operation.failure(e))?;
            info!(ticker = %ticker, "Ticker removed");
            refresh_after_write(api).await
        }

        Operation::LoadDetail(request) => fetch_detail(api, request).await.map(Payload::Detail),
    }
}

/// Relit la watchlist après une écriture
///
/// Un échec ici est une erreur réseau : l'écriture elle-même a réussi.
async fn refresh_after_write(api: &dyn MarketApi) -> Result<Payload, ConsoleError> {
    let tickers = api
        .watchlist()
        .await
        .map_err(|e| Operation::RefreshWatchlist.failure(e))?;
    Ok(Payload::Watchlist(tickers))
}

/// Récupère prix, news et analyse en parallèle
pub async fn fetch_detail(
    api: &dyn MarketApi,
    request: &DetailRequest,
) -> Result<DetailBundle, ConsoleError> {
    let (prices, news, analysis) = tokio::try_join!(
        api.prices(&request.ticker, request.price_window),
        api.news(&request.ticker, request.news_window),
        api.latest(&request.ticker),
    )
    .map_err(|e| ConsoleError::detail(&request.ticker, request.page, e))?;

    debug!(
        ticker = %request.ticker,
        page = request.page,
        prices = prices.len(),
        news = news.items.len(),
        "Detail fetched"
    );

    Ok(DetailBundle {
        prices,
        news,
        analysis,
    })
}

/// Lance une commande en arrière-plan et renvoie son AppResult sur `results`
///
/// CONCEPT : Garantie de libération
/// - La commande tourne dans sa propre tâche
/// - Une seconde tâche attend le JoinHandle : panique ou annulation
///   deviennent un AppResult en erreur, jamais un silence
pub fn dispatch(
    runtime: &Handle,
    api: Arc<dyn MarketApi>,
    command: AppCommand,
    results: UnboundedSender<AppResult>,
) {
    debug!(id = command.id, kind = ?command.operation.kind(), "Dispatching command");

    let worker = {
        let command = command.clone();
        runtime.spawn(async move { execute(api.as_ref(), &command).await })
    };

    runtime.spawn(async move {
        let outcome = match worker.await {
            Ok(outcome) => outcome,
            Err(join_error) => {
                error!(id = command.id, error = %join_error, "Command task aborted");
                Err(command
                    .operation
                    .failure(format!("tâche interrompue ({join_error})")))
            }
        };

        if results.send(AppResult { command, outcome }).is_err() {
            debug!("Result channel closed, dropping result");
        }
    });
}

// ============================================================================
// Tests
// ============================================================================
