// ============================================================================
// Gestion des événements
// ============================================================================
// Lit le clavier via crossterm et fournit des helpers de reconnaissance des
// touches. Le mapping touche -> action vit dans App::handle_event.
//
// CONCEPTS RUST :
// 1. Enums avec variants : Key(KeyEvent) ou Tick
// 2. Poll avec timeout : la boucle principale n'est jamais bloquée, les
//    résultats réseau sont traités au plus tard au tick suivant
// ============================================================================

use std::time::Duration;

use anyhow::Result;
use crossterm::event::{self, Event as CrosstermEvent, KeyCode, KeyEvent, KeyEventKind};
use tracing::warn;

/// Échecs de lecture consécutifs tolérés avant d'abandonner
pub const MAX_CONSECUTIVE_READ_FAILURES: u32 = 10;

/// Événements de l'application
#[derive(Debug, Clone)]
pub enum Event {
    /// Touche pressée
    Key(KeyEvent),

    /// Aucun événement pendant la durée du poll
    Tick,
}

/// Gestionnaire d'événements
pub struct EventHandler {
    tick_rate: Duration,
}

impl EventHandler {
    pub fn new(tick_rate: Duration) -> Self {
        Self { tick_rate }
    }

    /// Lit le prochain événement (bloquant au plus `tick_rate`)
    pub fn next(&self) -> Result<Event> {
        if !event::poll(self.tick_rate)? {
            return Ok(Event::Tick);
        }

        match event::read()? {
            // Sur certains OS on reçoit Press ET Release : on ne garde que Press
            CrosstermEvent::Key(key) if key.kind == KeyEventKind::Press => Ok(Event::Key(key)),
            _ => Ok(Event::Tick),
        }
    }
}

impl Default for EventHandler {
    fn default() -> Self {
        Self::new(Duration::from_millis(100))
    }
}

/// Compteur d'échecs de lecture du terminal
///
/// Un échec isolé est ignoré. Une série d'échecs remonte l'erreur pour que
/// la boucle principale s'arrête et restaure le terminal.
#[derive(Debug, Default)]
pub struct ReadFailures {
    consecutive: u32,
}

impl ReadFailures {
    /// Filtre le résultat d'une lecture
    ///
    /// - Ok(Some(event)) : événement à traiter, le compteur repart à zéro
    /// - Ok(None)        : échec toléré
    /// - Err(_)          : trop d'échecs d'affilée
    pub fn track(&mut self, result: Result<Event>) -> Result<Option<Event>> {
        match result {
            Ok(event) => {
                self.consecutive = 0;
                Ok(Some(event))
            }
            Err(e) => {
                self.consecutive += 1;
                if self.consecutive >= MAX_CONSECUTIVE_READ_FAILURES {
                    return Err(e.context(format!(
                        "{} lectures du terminal échouées d'affilée",
                        self.consecutive
                    )));
                }
                warn!(error = %e, consecutive = self.consecutive, "Failed to read terminal event");
                Ok(None)
            }
        }
    }
}

// ============================================================================
// Helpers : reconnaissance des touches
// ============================================================================

fn key_code(event: &Event) -> Option<KeyCode> {
    match event {
        Event::Key(key) => Some(key.code),
        Event::Tick => None,
    }
}

/// 'q' : quitter (deux pressions)
pub fn is_quit_event(event: &Event) -> bool {
    matches!(key_code(event), Some(KeyCode::Char('q') | KeyCode::Char('Q')))
}

pub fn is_escape_event(event: &Event) -> bool {
    matches!(key_code(event), Some(KeyCode::Esc))
}

pub fn is_enter_event(event: &Event) -> bool {
    matches!(key_code(event), Some(KeyCode::Enter))
}

pub fn is_backspace_event(event: &Event) -> bool {
    matches!(key_code(event), Some(KeyCode::Backspace))
}

/// Flèche haut ou 'k' (vim)
pub fn is_up_event(event: &Event) -> bool {
    matches!(
        key_code(event),
        Some(KeyCode::Up | KeyCode::Char('k') | KeyCode::Char('K'))
    )
}

/// Flèche bas ou 'j' (vim)
pub fn is_down_event(event: &Event) -> bool {
    matches!(
        key_code(event),
        Some(KeyCode::Down | KeyCode::Char('j') | KeyCode::Char('J'))
    )
}

/// 'a' : ouvre la saisie d'un ticker
pub fn is_add_event(event: &Event) -> bool {
    matches!(key_code(event), Some(KeyCode::Char('a') | KeyCode::Char('A')))
}

/// 'd' : supprime la sélection (deux pressions)
pub fn is_delete_event(event: &Event) -> bool {
    matches!(key_code(event), Some(KeyCode::Char('d') | KeyCode::Char('D')))
}

/// 'n' ou → : page de news suivante
pub fn is_next_page_event(event: &Event) -> bool {
    matches!(
        key_code(event),
        Some(KeyCode::Right | KeyCode::Char('n') | KeyCode::Char('N'))
    )
}

/// 'p' ou ← : page de news précédente
pub fn is_prev_page_event(event: &Event) -> bool {
    matches!(
        key_code(event),
        Some(KeyCode::Left | KeyCode::Char('p') | KeyCode::Char('P'))
    )
}

/// 'r' : resynchronise la watchlist
pub fn is_refresh_event(event: &Event) -> bool {
    matches!(key_code(event), Some(KeyCode::Char('r') | KeyCode::Char('R')))
}

/// 'h' : vérifie la santé de l'API
pub fn is_health_event(event: &Event) -> bool {
    matches!(key_code(event), Some(KeyCode::Char('h') | KeyCode::Char('H')))
}

/// Touches 1-9 : index (0-based) du ticker suggéré
pub fn suggestion_index(event: &Event) -> Option<usize> {
    match key_code(event)? {
        KeyCode::Char(c @ '1'..='9') => c.to_digit(10).map(|d| d as usize - 1),
        _ => None,
    }
}

/// Caractère acceptable dans une saisie de ticker
pub fn is_ticker_char_event(event: &Event) -> bool {
    matches!(
        key_code(event),
        Some(KeyCode::Char(c)) if c.is_alphanumeric() || c == '-' || c == '.' || c == '^' || c == '='
    )
}

/// Extrait le caractère d'un événement clavier
pub fn get_char_from_event(event: &Event) -> Option<char> {
    match key_code(event)? {
        KeyCode::Char(c) => Some(c),
        _ => None,
    }
}
