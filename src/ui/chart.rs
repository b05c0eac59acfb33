// ============================================================================
// Chart - Graphique de l'historique des prix
// ============================================================================
// Affiche un graphique ligne (line chart) pour la période sélectionnée
//
// CONCEPTS RUST :
// 1. Iterator chaining : transformer les HistoryPoint en points (x, y)
// 2. Option handling : série vide, série d'un seul point
//
// CONCEPTS RATATUI :
// 1. Chart widget : graphique ligne
// 2. Dataset : série de données à afficher
// 3. Axis : configuration des axes X (temps) et Y (prix)
// ============================================================================

use chrono::{DateTime, Utc};
use ratatui::{
    layout::{Alignment, Rect},
    style::{Color, Style},
    symbols,
    text::{Line, Span},
    widgets::{Axis, Block, Borders, Chart, Dataset, GraphType, Paragraph},
    Frame,
};

use crate::models::format;
use crate::models::CoinHistory;

/// Convertit la série en points (secondes depuis l'epoch, prix)
pub(crate) fn to_points(history: &CoinHistory) -> Vec<(f64, f64)> {
    history
        .points
        .iter()
        .map(|point| (point.timestamp.timestamp() as f64, point.price))
        .collect()
}

/// Bornes de l'axe Y avec une marge de 5%
///
/// Une série plate reçoit une marge de 1% du prix pour rester visible.
pub(crate) fn y_bounds(history: &CoinHistory) -> Option<[f64; 2]> {
    let (min_price, max_price) = history.price_bounds()?;

    let spread = max_price - min_price;
    let margin = if spread > 0.0 {
        spread * 0.05
    } else {
        (max_price.abs() * 0.01).max(1e-9)
    };

    Some([(min_price - margin).max(0.0), max_price + margin])
}

fn x_bounds(points: &[(f64, f64)]) -> [f64; 2] {
    let first = points.first().map(|p| p.0).unwrap_or_default();
    let last = points.last().map(|p| p.0).unwrap_or_default();
    if last > first {
        [first, last]
    } else {
        [first - 1.0, first + 1.0]
    }
}

fn time_label(seconds: f64, pattern: &str) -> String {
    DateTime::<Utc>::from_timestamp(seconds as i64, 0)
        .map(|ts| ts.format(pattern).to_string())
        .unwrap_or_default()
}

/// Dessine le graphique ligne de l'historique
///
/// `name` et `current_price` viennent de la fiche, déjà chargée.
pub fn render_history_chart(
    frame: &mut Frame,
    history: &CoinHistory,
    name: &str,
    current_price: &str,
    area: Rect,
) {
    let points = to_points(history);

    let Some([y_min, y_max]) = y_bounds(history) else {
        render_no_data(frame, area, "Pas de données à afficher");
        return;
    };

    let color = match history.change {
        Some(change) if change < 0.0 => Color::Red,
        _ => Color::Green,
    };

    let datasets = vec![Dataset::default()
        .name("Price In USD")
        .marker(symbols::Marker::Braille)
        .graph_type(GraphType::Line)
        .style(Style::default().fg(color))
        .data(&points)];

    let [x_min, x_max] = x_bounds(&points);
    let pattern = history.period.axis_format();

    let x_axis = Axis::default()
        .style(Style::default().fg(Color::Gray))
        .bounds([x_min, x_max])
        .labels(vec![
            Span::raw(time_label(x_min, pattern)),
            Span::raw(time_label((x_min + x_max) / 2.0, pattern)),
            Span::raw(time_label(x_max, pattern)),
        ]);

    let y_axis = Axis::default()
        .title("$")
        .style(Style::default().fg(Color::Gray))
        .bounds([y_min, y_max])
        .labels(vec![
            Span::raw(format::compact(y_min)),
            Span::raw(format::compact((y_min + y_max) / 2.0)),
            Span::raw(format::compact(y_max)),
        ]);

    let title = format!(
        " {} Price Chart | {} | Change: {} | Current {} Price: $ {} ",
        name,
        history.period,
        format::percent(history.change),
        name,
        current_price
    );

    let chart = Chart::new(datasets)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(Style::default().fg(Color::White))
                .title(title),
        )
        .x_axis(x_axis)
        .y_axis(y_axis);

    frame.render_widget(chart, area);
}

/// Affiche un message quand il n'y a pas de série à tracer
fn render_no_data(frame: &mut Frame, area: Rect, message: &str) {
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::DarkGray))
        .title(" Price Chart ");

    let text = vec![
        Line::from(""),
        Line::from(Span::styled(message, Style::default().fg(Color::Gray))),
    ];

    let paragraph = Paragraph::new(text)
        .block(block)
        .alignment(Alignment::Center);

    frame.render_widget(paragraph, area);
}

// ============================================================================
// Tests unitaires
// ============================================================================
