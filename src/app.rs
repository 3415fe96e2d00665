// ============================================================================
// Structure : App
// ============================================================================
// État de l'interface TUI autour de la Session
//
// - Session : état métier (watchlist, détail, pagination, requêtes)
// - App     : état purement visuel (écran, confirmations, saisie)
//
// PATTERN : handle_event() traduit une touche en action sur la Session et
// retourne les AppCommand à exécuter. App ne fait jamais d'appel réseau.
// ============================================================================

use tracing::{debug, info};

use crate::config::ObservabilityLink;
use crate::models::Ticker;
use crate::session::{AppCommand, AppResult, Session};
use crate::ui::events::{
    get_char_from_event, is_add_event, is_backspace_event, is_delete_event, is_down_event,
    is_enter_event, is_escape_event, is_health_event, is_next_page_event, is_prev_page_event,
    is_quit_event, is_refresh_event, is_ticker_char_event, is_up_event, suggestion_index, Event,
};

/// Écrans de l'application
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Screen {
    /// Vue principale : watchlist + détail
    Dashboard,

    /// Mode saisie (Vim-like) : Enter valide, ESC annule
    InputMode,
}

/// État principal de l'application
pub struct App {
    /// Indique si l'application doit continuer à tourner
    pub running: bool,

    /// Écran actuellement affiché
    pub current_screen: Screen,

    /// Two-step quit : première pression de 'q' arme, la seconde quitte
    pub confirm_quit: bool,

    /// Two-step delete : première pression de 'd' arme, la seconde supprime
    pub confirm_delete: bool,

    /// Buffer de saisie pour le mode Input
    pub input_buffer: String,

    /// Prompt affiché en mode Input
    pub input_prompt: String,

    /// État métier
    pub session: Session,

    /// Tickers proposés en ajout rapide (touches 1-9)
    pub suggestions: Vec<Ticker>,

    /// Liens affichés dans l'en-tête
    pub links: Vec<ObservabilityLink>,
}

impl App {
    pub fn new(session: Session, suggestions: Vec<Ticker>, links: Vec<ObservabilityLink>) -> Self {
        Self {
            running: true,
            current_screen: Screen::Dashboard,
            confirm_quit: false,
            confirm_delete: false,
            input_buffer: String::new(),
            input_prompt: String::new(),
            session,
            suggestions,
            links,
        }
    }

    pub fn quit(&mut self) {
        self.running = false;
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    // ========================================================================
    // Confirmations
    // ========================================================================

    pub fn request_quit(&mut self) {
        self.confirm_quit = true;
    }

    pub fn cancel_quit(&mut self) {
        self.confirm_quit = false;
    }

    pub fn is_awaiting_quit_confirmation(&self) -> bool {
        self.confirm_quit
    }

    pub fn request_delete(&mut self) {
        self.confirm_delete = true;
    }

    pub fn cancel_delete(&mut self) {
        self.confirm_delete = false;
    }

    pub fn is_awaiting_delete_confirmation(&self) -> bool {
        self.confirm_delete
    }

    fn cancel_confirmations(&mut self) {
        self.cancel_quit();
        self.cancel_delete();
    }

    // ========================================================================
    // Input Mode Management
    // ========================================================================

    pub fn start_input(&mut self, prompt: String) {
        self.current_screen = Screen::InputMode;
        self.input_buffer.clear();
        self.input_prompt = prompt;
    }

    pub fn cancel_input(&mut self) {
        self.current_screen = Screen::Dashboard;
        self.input_buffer.clear();
        self.input_prompt.clear();
    }

    /// Récupère la valeur saisie et retourne au dashboard
    pub fn submit_input(&mut self) -> String {
        let value = std::mem::take(&mut self.input_buffer);
        self.current_screen = Screen::Dashboard;
        self.input_prompt.clear();
        value
    }

    /// Ajoute un caractère, dans la limite de longueur de la politique
    pub fn append_char(&mut self, c: char) {
        let max_len = self.session.config().ticker_policy.max_len;
        if max_len.is_some_and(|max| self.input_buffer.chars().count() >= max) {
            return;
        }
        self.input_buffer.push(c);
    }

    pub fn backspace(&mut self) {
        self.input_buffer.pop();
    }

    pub fn is_in_input_mode(&self) -> bool {
        self.current_screen == Screen::InputMode
    }

    pub fn is_on_dashboard(&self) -> bool {
        self.current_screen == Screen::Dashboard
    }

    // ========================================================================
    // Session
    // ========================================================================

    /// Commandes de démarrage
    pub fn bootstrap(&mut self) -> Vec<AppCommand> {
        self.session.bootstrap()
    }

    /// Réinjecte un résultat de l'executor
    pub fn complete(&mut self, result: AppResult) -> Option<AppCommand> {
        self.session.complete(result)
    }

    /// Ajoute le n-ième ticker suggéré
    fn add_suggestion(&mut self, index: usize) -> Option<AppCommand> {
        let ticker = self.suggestions.get(index)?.clone();
        if !self.session.controls().can_add {
            debug!(ticker = %ticker, "Add ignored: watchlist operation in flight");
            return None;
        }
        info!(ticker = %ticker, "User added suggested ticker");
        self.session.add(ticker.as_str())
    }

    // ========================================================================
    // Gestion des événements
    // ========================================================================

    /// Traite un événement et retourne les commandes à exécuter
    ///
    /// CONCEPT RUST : Pattern matching avec guards
    /// - Le mode input capture toutes les touches (un 'q' saisi ne quitte pas)
    /// - Les contrôles désactivés par la Session sont ignorés ici
    pub fn handle_event(&mut self, event: &Event) -> Option<AppCommand> {
        if self.is_in_input_mode() {
            return self.handle_input_event(event);
        }

        let controls = self.session.controls();

        match event {
            Event::Tick => None,

            Event::Key(_) if is_quit_event(event) => {
                self.cancel_delete();
                if self.is_awaiting_quit_confirmation() {
                    info!("User confirmed quit");
                    self.quit();
                } else {
                    info!("User requested quit (awaiting confirmation)");
                    self.request_quit();
                }
                None
            }

            Event::Key(_) if is_delete_event(event) => {
                self.cancel_quit();
                if !controls.can_remove {
                    self.cancel_delete();
                    return None;
                }
                if self.is_awaiting_delete_confirmation() {
                    self.cancel_delete();
                    info!(ticker = ?self.session.selected(), "User confirmed delete");
                    self.session.remove_selected()
                } else {
                    info!("User requested delete (awaiting confirmation)");
                    self.request_delete();
                    None
                }
            }

            Event::Key(_) => {
                self.cancel_confirmations();
                self.handle_dashboard_key(event)
            }
        }
    }

    fn handle_dashboard_key(&mut self, event: &Event) -> Option<AppCommand> {
        let controls = self.session.controls();

        if let Some(index) = suggestion_index(event) {
            return self.add_suggestion(index);
        }

        if is_add_event(event) {
            if controls.can_add {
                info!("User requested add ticker");
                self.start_input("Ajouter un ticker : ".to_string());
            }
            None
        } else if is_up_event(event) {
            self.session.select_relative(-1)
        } else if is_down_event(event) {
            self.session.select_relative(1)
        } else if is_next_page_event(event) {
            self.session.next_page()
        } else if is_prev_page_event(event) {
            self.session.prev_page()
        } else if is_refresh_event(event) {
            if !controls.can_refresh {
                return None;
            }
            info!("User requested watchlist refresh");
            Some(self.session.refresh())
        } else if is_health_event(event) {
            Some(self.session.check_health())
        } else if is_escape_event(event) {
            self.session.dismiss_error();
            None
        } else {
            None
        }
    }

    fn handle_input_event(&mut self, event: &Event) -> Option<AppCommand> {
        if is_escape_event(event) {
            info!("User cancelled input");
            self.cancel_input();
            None
        } else if is_enter_event(event) {
            let raw = self.submit_input();
            info!(input = %raw, "User submitted ticker for adding");
            self.session.add(&raw)
        } else if is_backspace_event(event) {
            self.backspace();
            None
        } else if is_ticker_char_event(event) {
            if let Some(c) = get_char_from_event(event) {
                self.append_char(c);
            }
            None
        } else {
            None
        }
    }
}

// ============================================================================
// Tests unitaires
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::{DetailBundle, Operation, Payload, SessionConfig};
    use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

    fn t(symbol: &str) -> Ticker {
        Ticker::normalize(symbol).unwrap()
    }

    fn key(code: KeyCode) -> Event {
        Event::Key(KeyEvent::new(code, KeyModifiers::empty()))
    }

    fn press(app: &mut App, c: char) -> Option<AppCommand> {
        app.handle_event(&key(KeyCode::Char(c)))
    }

    /// App avec une watchlist déjà synchronisée (sans réseau)
    fn app_with(symbols: &[&str]) -> App {
        let mut session = Session::new(SessionConfig::default());
        let refresh = session.refresh();
        let load = session.complete(AppResult {
            command: refresh,
            outcome: Ok(Payload::Watchlist(symbols.iter().map(|s| t(s)).collect())),
        });
        // Détail vide, une seule page de news : la session revient à Idle
        if let Some(load) = load {
            session.complete(AppResult {
                command: load,
                outcome: Ok(Payload::Detail(DetailBundle {
                    prices: Default::default(),
                    news: Default::default(),
                    analysis: Default::default(),
                })),
            });
        }
        App::new(session, vec![t("NVDA"), t("TSLA")], Vec::new())
    }

    #[test]
    fn test_app_creation() {
        let app = app_with(&[]);
        assert!(app.is_running());
        assert!(app.is_on_dashboard());
        assert!(app.session.watchlist().is_empty());
    }

    #[test]
    fn test_two_step_quit() {
        let mut app = app_with(&["AAPL"]);
        press(&mut app, 'q');
        assert!(app.is_running());
        assert!(app.is_awaiting_quit_confirmation());

        press(&mut app, 'q');
        assert!(!app.is_running());
    }

    #[test]
    fn test_other_key_cancels_quit() {
        let mut app = app_with(&["AAPL"]);
        press(&mut app, 'q');
        press(&mut app, 'x');
        assert!(!app.is_awaiting_quit_confirmation());
        press(&mut app, 'q');
        assert!(app.is_running());
    }

    #[test]
    fn test_two_step_delete_removes_selection() {
        let mut app = app_with(&["AAPL", "MSFT"]);
        assert!(press(&mut app, 'd').is_none());
        assert!(app.is_awaiting_delete_confirmation());

        let cmd = press(&mut app, 'd').unwrap();
        assert_eq!(cmd.operation, Operation::RemoveTicker(t("AAPL")));
        assert!(!app.is_awaiting_delete_confirmation());
    }

    #[test]
    fn test_delete_ignored_on_empty_watchlist() {
        let mut app = app_with(&[]);
        assert!(press(&mut app, 'd').is_none());
        assert!(!app.is_awaiting_delete_confirmation());
    }

    #[test]
    fn test_input_mode_captures_letters() {
        let mut app = app_with(&["AAPL"]);
        press(&mut app, 'a');
        assert!(app.is_in_input_mode());

        for c in ['q', 'q', 'd'] {
            assert!(press(&mut app, c).is_none());
        }
        assert!(app.is_running());
        assert_eq!(app.input_buffer, "qqd");

        app.handle_event(&key(KeyCode::Backspace));
        assert_eq!(app.input_buffer, "qq");

        app.handle_event(&key(KeyCode::Esc));
        assert!(app.is_on_dashboard());
        assert!(app.input_buffer.is_empty());
    }

    #[test]
    fn test_input_submit_adds_normalized_ticker() {
        let mut app = app_with(&["AAPL"]);
        press(&mut app, 'a');
        for c in "msft".chars() {
            press(&mut app, c);
        }

        let cmd = app.handle_event(&key(KeyCode::Enter)).unwrap();
        assert_eq!(cmd.operation, Operation::AddTicker(t("MSFT")));
        assert!(app.is_on_dashboard());
    }

    #[test]
    fn test_input_capped_at_policy_length() {
        let mut app = app_with(&["AAPL"]);
        press(&mut app, 'a');
        for _ in 0..20 {
            press(&mut app, 'x');
        }
        assert_eq!(app.input_buffer.len(), 12);
    }

    #[test]
    fn test_digit_adds_suggestion() {
        let mut app = app_with(&["AAPL"]);
        let cmd = press(&mut app, '2').unwrap();
        assert_eq!(cmd.operation, Operation::AddTicker(t("TSLA")));
        assert!(press(&mut app, '9').is_none());
    }

    #[test]
    fn test_watchlist_keys_disabled_while_busy() {
        let mut app = app_with(&["AAPL"]);
        assert!(press(&mut app, 'r').is_some());

        // Refresh en vol : ajout, suppression et refresh sont ignorés
        assert!(press(&mut app, 'r').is_none());
        assert!(press(&mut app, '1').is_none());
        press(&mut app, 'a');
        assert!(app.is_on_dashboard());
        press(&mut app, 'd');
        assert!(!app.is_awaiting_delete_confirmation());
    }

    #[test]
    fn test_navigation_issues_detail_load() {
        let mut app = app_with(&["AAPL", "MSFT"]);
        let cmd = app.handle_event(&key(KeyCode::Down)).unwrap();
        assert!(matches!(cmd.operation, Operation::LoadDetail(ref r) if r.ticker == t("MSFT")));
        assert_eq!(app.session.selected(), Some(&t("MSFT")));

        // Déjà en bas : pas de nouvelle commande pour la même paire
        assert!(app.handle_event(&key(KeyCode::Down)).is_none());
    }

    #[test]
    fn test_next_page_requires_has_next() {
        let mut app = app_with(&["AAPL"]);
        assert!(press(&mut app, 'n').is_none());
        assert_eq!(app.session.pagination().page(), 1);
    }
}
