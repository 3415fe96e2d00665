// ============================================================================
// Dashboard - Rendu de l'interface principale
// ============================================================================
// Découpage :
//
//   ┌ header : titre, santé de l'API, liens d'observabilité ┐
//   │ watchlist      │ prix (chart)                          │
//   │ suggestions    │ news paginées  │ dernière analyse     │
//   └ footer : raccourcis / confirmation / saisie / erreur  ┘
//
// CONCEPTS RATATUI :
// 1. Layout imbriqués (vertical puis horizontal)
// 2. List + ListItem, Paragraph, Span/Line
// 3. Style : couleurs et modifiers
// ============================================================================

use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, List, ListItem, Paragraph},
    Frame,
};

use crate::app::{App, Screen};
use crate::session::{Activity, ApiHealth};
use crate::ui::{chart, detail};

/// Dessine l'interface complète
pub fn render(frame: &mut Frame, app: &App) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(4), // Header : titre + liens
            Constraint::Min(0),    // Contenu
            Constraint::Length(4), // Footer : raccourcis + statut
        ])
        .split(frame.size());

    render_header(frame, app, chunks[0]);
    render_main_content(frame, app, chunks[1]);

    match app.current_screen {
        Screen::Dashboard => render_footer(frame, app, chunks[2]),
        Screen::InputMode => render_input_footer(frame, app, chunks[2]),
    }
}

// ============================================================================
// Header
// ============================================================================

fn render_header(frame: &mut Frame, app: &App, area: Rect) {
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Cyan))
        .title(" MarketScope ")
        .title_alignment(Alignment::Center);

    let health = match app.session.health() {
        ApiHealth::Unknown => Span::styled("● API ?", Style::default().fg(Color::Gray)),
        ApiHealth::Up(status) => Span::styled(
            format!("● API {}", status),
            Style::default().fg(Color::Green).add_modifier(Modifier::BOLD),
        ),
        ApiHealth::Down => Span::styled(
            "● API injoignable",
            Style::default().fg(Color::Red).add_modifier(Modifier::BOLD),
        ),
    };

    let mut links = Vec::new();
    for link in &app.links {
        if !links.is_empty() {
            links.push(Span::styled("  │  ", Style::default().fg(Color::DarkGray)));
        }
        links.push(Span::styled(
            format!("{} ", link.label),
            Style::default().fg(Color::Yellow),
        ));
        links.push(Span::styled(
            link.url.clone(),
            Style::default().fg(Color::Gray).add_modifier(Modifier::UNDERLINED),
        ));
    }

    let paragraph = Paragraph::new(vec![Line::from(health), Line::from(links)])
        .block(block)
        .alignment(Alignment::Center);

    frame.render_widget(paragraph, area);
}

// ============================================================================
// Contenu principal
// ============================================================================

fn render_main_content(frame: &mut Frame, app: &App, area: Rect) {
    let columns = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Length(26), Constraint::Min(0)])
        .split(area);

    let sidebar = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Min(0),
            Constraint::Length(app.suggestions.len() as u16 + 2),
        ])
        .split(columns[0]);

    render_watchlist(frame, app, sidebar[0]);
    render_suggestions(frame, app, sidebar[1]);

    let detail_rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Percentage(45), Constraint::Percentage(55)])
        .split(columns[1]);

    let bottom = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(55), Constraint::Percentage(45)])
        .split(detail_rows[1]);

    let view = app.session.detail();
    chart::render_price_chart(frame, view, detail_rows[0]);
    detail::render_news(frame, view, app.session.pagination(), bottom[0]);
    detail::render_analysis(frame, view, bottom[1]);
}

/// Watchlist : la sélection est affichée en vidéo inverse, le ticker en
/// erreur est marqué d'une croix
fn render_watchlist(frame: &mut Frame, app: &App, area: Rect) {
    let watchlist = app.session.watchlist();
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Cyan))
        .title(format!(" 📊 Watchlist ({}) ", watchlist.tickers().len()));

    if watchlist.is_empty() {
        let text = vec![
            Line::from(""),
            Line::from(Span::styled("Watchlist vide", Style::default().fg(Color::Gray))),
            Line::from(Span::styled("[a] pour ajouter", Style::default().fg(Color::Gray))),
        ];
        let paragraph = Paragraph::new(text).block(block).alignment(Alignment::Center);
        frame.render_widget(paragraph, area);
        return;
    }

    let selected = watchlist.selected();
    // Ticker visé par l'erreur affichée
    let errored = app.session.last_error().and_then(|e| e.ticker());
    let items: Vec<ListItem> = watchlist
        .tickers()
        .iter()
        .map(|ticker| {
            let mut line = vec![Span::raw(format!(" {}", ticker))];
            if errored == Some(ticker.as_str()) {
                line.push(Span::styled(" ✖", Style::default().fg(Color::Red)));
            }
            let item = ListItem::new(Line::from(line));
            if Some(ticker) == selected {
                item.style(
                    Style::default()
                        .fg(Color::White)
                        .add_modifier(Modifier::BOLD)
                        .add_modifier(Modifier::REVERSED),
                )
            } else {
                item
            }
        })
        .collect();

    frame.render_widget(List::new(items).block(block), area);
}

/// Tickers suggérés : grisés s'ils sont déjà suivis
fn render_suggestions(frame: &mut Frame, app: &App, area: Rect) {
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Cyan))
        .title(" ➕ Suggestions ");

    let can_add = app.session.controls().can_add;
    let items: Vec<ListItem> = app
        .suggestions
        .iter()
        .enumerate()
        .map(|(index, ticker)| {
            let tracked = app.session.watchlist().contains(ticker);
            let style = if tracked || !can_add {
                Style::default().fg(Color::DarkGray)
            } else {
                Style::default().fg(Color::Green)
            };
            ListItem::new(Line::from(vec![
                Span::styled(format!("[{}] ", index + 1), style.add_modifier(Modifier::BOLD)),
                Span::styled(ticker.to_string(), style),
            ]))
        })
        .collect();

    frame.render_widget(List::new(items).block(block), area);
}

// ============================================================================
// Footer
// ============================================================================

fn render_footer(frame: &mut Frame, app: &App, area: Rect) {
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Cyan));

    let warning = Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD);
    let blinking = Style::default()
        .fg(Color::Red)
        .add_modifier(Modifier::BOLD)
        .add_modifier(Modifier::SLOW_BLINK);

    let shortcuts = if app.is_awaiting_delete_confirmation() {
        let ticker = app
            .session
            .selected()
            .map(|t| t.to_string())
            .unwrap_or_else(|| "?".to_string());
        Line::from(vec![
            Span::styled("⚠  Appuyez sur ", warning),
            Span::styled("[d]", blinking),
            Span::styled(
                format!(" à nouveau pour supprimer {} ou autre touche pour annuler ⚠", ticker),
                warning,
            ),
        ])
    } else if app.is_awaiting_quit_confirmation() {
        Line::from(vec![
            Span::styled("⚠  Appuyez sur ", warning),
            Span::styled("[q]", blinking),
            Span::styled(
                " à nouveau pour quitter, ou n'importe quelle autre touche pour annuler ⚠",
                warning,
            ),
        ])
    } else {
        let controls = app.session.controls();
        Line::from(vec![
            key_span("[q]", true),
            Span::raw(" Quit  "),
            key_span("[↑↓ / j k]", true),
            Span::raw(" Navigate  "),
            key_span("[a]", controls.can_add),
            Span::raw(" Add  "),
            key_span("[1-9]", controls.can_add),
            Span::raw(" Suggest  "),
            key_span("[d]", controls.can_remove),
            Span::raw(" Delete  "),
            key_span("[n/p]", controls.can_next || controls.can_prev),
            Span::raw(" Page  "),
            key_span("[r]", controls.can_refresh),
            Span::raw(" Refresh  "),
            key_span("[h]", true),
            Span::raw(" Health"),
        ])
    };

    let paragraph = Paragraph::new(vec![shortcuts, status_line(app)])
        .block(block)
        .alignment(Alignment::Center);

    frame.render_widget(paragraph, area);
}

fn key_span(label: &'static str, enabled: bool) -> Span<'static> {
    if enabled {
        Span::styled(label, Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD))
    } else {
        Span::styled(label, Style::default().fg(Color::DarkGray))
    }
}

/// Ligne de statut : chargement en cours et/ou dernière erreur
fn status_line(app: &App) -> Line<'static> {
    let coordinator = app.session.coordinator();
    let mut spans = Vec::new();

    if app.session.activity() != Activity::Idle {
        let message = coordinator.loading_message().unwrap_or("Chargement...");
        let text = match coordinator.in_flight() {
            n if n > 1 => format!("⏳ {} (+{} en cours)", message, n - 1),
            _ => format!("⏳ {}", message),
        };
        spans.push(Span::styled(text, Style::default().fg(Color::Cyan)));
    }

    if let Some(error) = app.session.last_error() {
        if !spans.is_empty() {
            spans.push(Span::raw("  "));
        }
        spans.push(Span::styled(
            format!("✖ {}", error),
            Style::default().fg(Color::Red).add_modifier(Modifier::BOLD),
        ));
        spans.push(Span::styled(" [Esc]", Style::default().fg(Color::DarkGray)));
    }

    Line::from(spans)
}

/// Footer en mode input : ligne de saisie
fn render_input_footer(frame: &mut Frame, app: &App, area: Rect) {
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Green));

    let input_line = Line::from(vec![
        Span::styled(
            app.input_prompt.as_str(),
            Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD),
        ),
        Span::styled(app.input_buffer.as_str(), Style::default().fg(Color::White)),
        Span::styled(
            "█",
            Style::default().fg(Color::White).add_modifier(Modifier::SLOW_BLINK),
        ),
    ]);

    let help_line = Line::from(vec![
        Span::styled("[Enter]", Style::default().fg(Color::Green).add_modifier(Modifier::BOLD)),
        Span::raw(" Confirm  "),
        Span::styled("[ESC]", Style::default().fg(Color::Red).add_modifier(Modifier::BOLD)),
        Span::raw(" Cancel"),
    ]);

    let paragraph = Paragraph::new(vec![input_line, help_line])
        .block(block)
        .alignment(Alignment::Left);

    frame.render_widget(paragraph, area);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ObservabilityLink;
    use crate::models::Ticker;
    use crate::session::{AppResult, ConsoleError, Payload, Session, SessionConfig};
    use ratatui::{backend::TestBackend, Terminal};

    fn buffer_text(terminal: &Terminal<TestBackend>) -> String {
        let buffer = terminal.backend().buffer();
        buffer.content().iter().map(|cell| cell.symbol()).collect()
    }

    #[test]
    fn test_render_shows_links_and_error() {
        let mut session = Session::new(SessionConfig::default());
        assert!(session.add("waytoolongticker").is_none());

        let app = App::new(
            session,
            vec![Ticker::normalize("AAPL").unwrap()],
            vec![ObservabilityLink {
                label: "Grafana",
                url: "http://localhost:3000".to_string(),
            }],
        );

        let mut terminal = Terminal::new(TestBackend::new(160, 40)).unwrap();
        terminal.draw(|frame| render(frame, &app)).unwrap();

        let text = buffer_text(&terminal);
        assert!(text.contains("Grafana"));
        assert!(text.contains("WAYTOOLONGTICKER"));
        assert!(text.contains("Watchlist vide"));
    }

    fn draw(session: Session) -> String {
        let app = App::new(session, Vec::new(), Vec::new());
        let mut terminal = Terminal::new(TestBackend::new(160, 40)).unwrap();
        terminal.draw(|frame| render(frame, &app)).unwrap();
        buffer_text(&terminal)
    }

    #[test]
    fn test_failed_ticker_is_marked_in_watchlist() {
        let aapl = Ticker::normalize("AAPL").unwrap();
        let mut session = Session::new(SessionConfig::default());
        let refresh = session.refresh();
        let load = session
            .complete(AppResult {
                command: refresh,
                outcome: Ok(Payload::Watchlist(vec![aapl.clone()])),
            })
            .unwrap();
        session.complete(AppResult {
            command: load,
            outcome: Err(ConsoleError::detail(&aapl, 1, "boom")),
        });

        let text = draw(session);
        assert!(text.contains(" AAPL ✖"));
    }

    #[test]
    fn test_status_line_counts_concurrent_requests() {
        let mut session = Session::new(SessionConfig::default());
        session.check_health();
        session.refresh();

        let text = draw(session);
        assert!(text.contains("(+1 en cours)"));
    }
}
