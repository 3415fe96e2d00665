// ============================================================================
// Détail - News paginées et dernière analyse
// ============================================================================

use ratatui::{
    layout::{Alignment, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{
        block::{Position, Title},
        Block, Borders, List, ListItem, Paragraph, Wrap,
    },
    Frame,
};

use crate::models::{LatestAnalysis, Sentiment};
use crate::session::{DetailView, Pagination};

/// Dessine la page de news courante
pub fn render_news(frame: &mut Frame, view: &DetailView, pagination: &Pagination, area: Rect) {
    let mut title = format!(" 📰 News - page {} ", pagination.page());
    if view.ticker.is_some() && view.page != pagination.page() {
        // La page demandée n'est pas encore (ou pas) chargée
        title = format!(" 📰 News - page {} (affichée : {}) ", pagination.page(), view.page);
    }

    let nav = Line::from(vec![
        nav_span("[p] ◀", pagination.can_prev()),
        Span::raw("  "),
        nav_span("▶ [n]", pagination.has_next()),
    ]);

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Cyan))
        .title(title)
        .title(
            Title::from(nav)
                .position(Position::Bottom)
                .alignment(Alignment::Right),
        );

    if view.news.is_empty() {
        let message = if view.ticker.is_some() {
            "Aucune news pour cette page"
        } else {
            "Sélectionnez un ticker"
        };
        let paragraph = Paragraph::new(Line::from(Span::styled(
            message,
            Style::default().fg(Color::Gray),
        )))
        .block(block)
        .alignment(Alignment::Center);
        frame.render_widget(paragraph, area);
        return;
    }

    let items: Vec<ListItem> = view
        .news
        .items
        .iter()
        .map(|item| {
            let meta = match item.timestamp() {
                Some(ts) => format!("{} · {}", item.source, ts),
                None => item.source.clone(),
            };
            ListItem::new(vec![
                Line::from(Span::styled(
                    item.headline.clone(),
                    Style::default().add_modifier(Modifier::BOLD),
                )),
                Line::from(Span::styled(meta, Style::default().fg(Color::Gray))),
            ])
        })
        .collect();

    frame.render_widget(List::new(items).block(block), area);
}

fn nav_span(label: &'static str, enabled: bool) -> Span<'static> {
    let style = if enabled {
        Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD)
    } else {
        Style::default().fg(Color::DarkGray)
    };
    Span::styled(label, style)
}

/// Dessine la dernière analyse du ticker
pub fn render_analysis(frame: &mut Frame, view: &DetailView, area: Rect) {
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Cyan))
        .title(" 🧠 Dernière analyse ");

    let lines = match &view.analysis {
        _ if view.ticker.is_none() => vec![Line::from(Span::styled(
            "Sélectionnez un ticker",
            Style::default().fg(Color::Gray),
        ))],
        LatestAnalysis::Missing => vec![Line::from(Span::styled(
            "Aucune analyse disponible",
            Style::default().fg(Color::Gray),
        ))],
        LatestAnalysis::Pending { message } => vec![Line::from(Span::styled(
            message
                .clone()
                .unwrap_or_else(|| "Analyse en attente...".to_string()),
            Style::default().fg(Color::Yellow),
        ))],
        LatestAnalysis::Ready(record) => {
            let mut header = vec![Span::styled(
                record.sentiment.to_string(),
                Style::default()
                    .fg(sentiment_color(record.sentiment))
                    .add_modifier(Modifier::BOLD),
            )];
            if let Some(delta) = record.movement_delta {
                header.push(Span::raw(format!("  Δ {:+.2}%", delta)));
            }
            if let Some(confidence) = record.confidence {
                header.push(Span::raw(format!("  confiance {:.0}%", confidence * 100.0)));
            }
            if let Some(created_at) = &record.created_at {
                header.push(Span::styled(
                    format!("  {}", created_at),
                    Style::default().fg(Color::Gray),
                ));
            }

            let mut lines = vec![Line::from(header), Line::from(record.summary.clone())];
            if let Some(hypothesis) = &record.hypothesis {
                lines.push(Line::from(Span::styled(
                    format!("Hypothèse : {}", hypothesis),
                    Style::default().fg(Color::Gray),
                )));
            }
            if let Some(reason) = &record.trigger_reason {
                lines.push(Line::from(Span::styled(
                    format!("Déclencheur : {}", reason),
                    Style::default().fg(Color::DarkGray),
                )));
            }
            lines
        }
    };

    let paragraph = Paragraph::new(lines)
        .block(block)
        .wrap(Wrap { trim: true });
    frame.render_widget(paragraph, area);
}

fn sentiment_color(sentiment: Sentiment) -> Color {
    match sentiment {
        Sentiment::Positive => Color::Green,
        Sentiment::Negative => Color::Red,
        Sentiment::Neutral => Color::Yellow,
        Sentiment::Unknown => Color::Gray,
    }
}
