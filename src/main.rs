// ============================================================================
// MarketScope - Point d'entrée
// ============================================================================
// Console TUI pour l'API market-observability : watchlist, prix, news
// paginées et dernière analyse LLM.
//
// CONCEPTS RUST CLÉS :
// 1. Async dans sync : la boucle TUI est synchrone, les requêtes tournent
//    sur un runtime tokio
// 2. Channels : chaque commande renvoie exactement un AppResult
// 3. Toujours restaurer le terminal, même en cas d'erreur
// ============================================================================

use std::io;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::Parser;
use crossterm::{
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{backend::CrosstermBackend, Terminal};
use tokio::runtime::{Handle, Runtime};
use tokio::sync::mpsc::{self, error::TryRecvError, UnboundedReceiver, UnboundedSender};
use tracing::{debug, error, info, warn};

use marketscope::api::{HttpMarketApi, MarketApi};
use marketscope::app::App;
use marketscope::config::Settings;
use marketscope::session::{executor, AppCommand, AppResult, Session};
use marketscope::ui::{render, EventHandler, ReadFailures};

// ============================================================================
// Initialisation du logging
// ============================================================================
// Les println! ne fonctionnent pas une fois le TUI lancé : on log vers un
// fichier avec rotation quotidienne.
//
// # Utilisation
// ```bash
// tail -f ~/.local/share/marketscope/logs/marketscope.log.*
// RUST_LOG=marketscope=trace marketscope
// ```
// ============================================================================

fn init_logging(log_dir: &Path) -> Result<()> {
    use tracing_appender::rolling::{RollingFileAppender, Rotation};
    use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

    std::fs::create_dir_all(log_dir).with_context(|| {
        format!("Échec de la création du répertoire de logs {}", log_dir.display())
    })?;

    let file_appender = RollingFileAppender::new(Rotation::DAILY, log_dir, "marketscope.log");

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(file_appender)
                .with_ansi(false)
                .with_target(true)
                .with_thread_ids(true)
                .with_line_number(true),
        )
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "marketscope=debug,info".into()),
        )
        .init();

    info!(log_dir = %log_dir.display(), "Logging initialisé");
    Ok(())
}

// ============================================================================
// Point d'entrée du programme
// ============================================================================

fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    let settings = Settings::parse();

    if let Err(e) = init_logging(&settings.resolve_log_dir()) {
        eprintln!("⚠️  Warning: Failed to initialize logging: {:#}", e);
        eprintln!("   Continuing without logging...");
    }

    info!(api = %settings.api_base_url, "MarketScope starting up");

    let runtime = Runtime::new().context("Échec de la création du runtime tokio")?;

    let api: Arc<dyn MarketApi> = Arc::new(
        HttpMarketApi::new(&settings.api_base_url, settings.request_timeout())
            .context("Configuration du client HTTP invalide")?,
    );

    let session = Session::new(settings.session_config());
    let mut app = App::new(
        session,
        settings.suggested_tickers(),
        settings.observability_links(),
    );

    let (result_tx, result_rx) = mpsc::unbounded_channel::<AppResult>();
    let dispatcher = Dispatcher {
        runtime: runtime.handle().clone(),
        api,
        results: result_tx,
    };

    for command in app.bootstrap() {
        dispatcher.send(command);
    }

    debug!("Setting up terminal");
    let mut terminal = setup_terminal()?;

    info!("Starting event loop");
    let result = run(&mut terminal, &mut app, &dispatcher, result_rx);

    debug!("Restoring terminal");
    restore_terminal(&mut terminal)?;

    match &result {
        Ok(_) => info!("Application exited normally"),
        Err(e) => error!(error = ?e, "Application exited with error"),
    }

    // Les requêtes encore en vol sont abandonnées
    runtime.shutdown_timeout(Duration::from_millis(500));

    result
}

// ============================================================================
// Dispatcher : envoi des commandes au runtime
// ============================================================================

struct Dispatcher {
    runtime: Handle,
    api: Arc<dyn MarketApi>,
    results: UnboundedSender<AppResult>,
}

impl Dispatcher {
    fn send(&self, command: AppCommand) {
        executor::dispatch(
            &self.runtime,
            Arc::clone(&self.api),
            command,
            self.results.clone(),
        );
    }
}

// ============================================================================
// Event Loop Principal
// ============================================================================
// À chaque itération :
//   1. Appliquer les résultats arrivés (et lancer les commandes de suivi)
//   2. Dessiner l'interface
//   3. Traiter l'événement clavier
// Une série d'échecs de lecture du terminal termine la boucle avec l'erreur.
// ============================================================================

fn run(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    app: &mut App,
    dispatcher: &Dispatcher,
    mut results: UnboundedReceiver<AppResult>,
) -> Result<()> {
    let events = EventHandler::default();
    let mut failures = ReadFailures::default();

    while app.is_running() {
        // try_recv ne bloque pas : on vide tout ce qui est arrivé
        loop {
            match results.try_recv() {
                Ok(result) => {
                    if let Some(follow_up) = app.complete(result) {
                        dispatcher.send(follow_up);
                    }
                }
                Err(TryRecvError::Empty) => break,
                Err(TryRecvError::Disconnected) => {
                    // Impossible tant que le dispatcher garde un sender
                    warn!("Result channel disconnected");
                    break;
                }
            }
        }

        terminal.draw(|frame| render(frame, app))?;

        if let Some(event) = failures.track(events.next())? {
            if let Some(command) = app.handle_event(&event) {
                dispatcher.send(command);
            }
        }
    }

    Ok(())
}

// ============================================================================
// Setup et restauration du terminal
// ============================================================================

fn setup_terminal() -> Result<Terminal<CrosstermBackend<io::Stdout>>> {
    enable_raw_mode().context("Impossible d'activer le raw mode")?;

    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen).context("Impossible d'ouvrir l'écran alternatif")?;

    let backend = CrosstermBackend::new(stdout);
    Terminal::new(backend).context("Impossible d'initialiser le terminal")
}

fn restore_terminal(terminal: &mut Terminal<CrosstermBackend<io::Stdout>>) -> Result<()> {
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;
    Ok(())
}
