// ============================================================================
// Chart - Historique de prix du ticker sélectionné
// ============================================================================
// CONCEPTS RATATUI :
// 1. Chart widget : graphique ligne
// 2. Dataset : série de points (x, y)
// 3. Axis : bornes et labels
// ============================================================================

use ratatui::{
    layout::{Alignment, Rect},
    style::{Color, Modifier, Style},
    symbols,
    text::{Line, Span},
    widgets::{Axis, Block, Borders, Chart, Dataset, GraphType, Paragraph},
    Frame,
};

use crate::models::PriceSeries;
use crate::session::DetailView;

/// Dessine l'historique de prix de la vue de détail
pub fn render_price_chart(frame: &mut Frame, view: &DetailView, area: Rect) {
    let Some(ticker) = view.ticker.as_ref() else {
        render_placeholder(frame, area, "Aucun ticker sélectionné");
        return;
    };

    let points = view.prices.chart_points();
    let Some((y_min, y_max)) = y_bounds(&view.prices) else {
        render_placeholder(frame, area, &format!("Pas encore de prix pour {}", ticker));
        return;
    };

    let color = match view.prices.change_percent() {
        Some(change) if change < 0.0 => Color::Red,
        _ => Color::Green,
    };

    let title = match (view.prices.last(), view.prices.change_percent()) {
        (Some(last), Some(change)) => {
            let arrow = if change >= 0.0 { "▲" } else { "▼" };
            format!(" 📈 {} : {:.2}  {} {:+.2}% ", ticker, last.price, arrow, change)
        }
        (Some(last), None) => format!(" 📈 {} : {:.2} ", ticker, last.price),
        _ => format!(" 📈 {} ", ticker),
    };

    let datasets = vec![Dataset::default()
        .name(ticker.as_str())
        .marker(symbols::Marker::Dot)
        .graph_type(GraphType::Line)
        .style(Style::default().fg(color))
        .data(&points)];

    let x_max = (points.len().saturating_sub(1) as f64).max(1.0);
    let x_axis = Axis::default()
        .style(Style::default().fg(Color::Gray))
        .bounds([0.0, x_max])
        .labels(vec![
            Span::raw(""),
            Span::raw(format!("{} relevés", points.len())),
            Span::raw(""),
        ]);

    let y_axis = Axis::default()
        .title("Prix")
        .style(Style::default().fg(Color::Gray))
        .bounds([y_min, y_max])
        .labels(vec![
            Span::raw(format!("{:.2}", y_min)),
            Span::raw(format!("{:.2}", (y_min + y_max) / 2.0)),
            Span::raw(format!("{:.2}", y_max)),
        ]);

    let chart = Chart::new(datasets)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(Style::default().fg(Color::Cyan))
                .title(Span::styled(title, Style::default().add_modifier(Modifier::BOLD))),
        )
        .x_axis(x_axis)
        .y_axis(y_axis);

    frame.render_widget(chart, area);
}

/// Bornes de l'axe Y avec une marge de 5%
///
/// Une série plate reçoit une marge minimale pour rester visible.
fn y_bounds(prices: &PriceSeries) -> Option<(f64, f64)> {
    let (min, max) = prices.bounds()?;
    let spread = max - min;
    let margin = if spread > 0.0 {
        spread * 0.05
    } else {
        (max.abs() * 0.01).max(0.01)
    };
    Some(((min - margin).max(0.0), max + margin))
}

fn render_placeholder(frame: &mut Frame, area: Rect, message: &str) {
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Cyan))
        .title(" 📈 Prix ");

    let text = vec![
        Line::from(""),
        Line::from(Span::styled(message, Style::default().fg(Color::Gray))),
    ];

    let paragraph = Paragraph::new(text)
        .block(block)
        .alignment(Alignment::Center);

    frame.render_widget(paragraph, area);
}
