// ============================================================================
// Liste - Grille des cartes du classement
// ============================================================================
// Une carte par crypto : "rang. nom", prix, capitalisation, variation 24h
//
// CONCEPTS RATATUI :
// 1. Layout imbriqué : lignes puis colonnes pour former une grille
// 2. Fenêtre de défilement : seules les lignes visibles sont dessinées
// ============================================================================

use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
    Frame,
};

use crate::models::format;
use crate::models::CoinSummary;
use crate::query::MarketQueries;
use crate::views::list::{self, ListView, ListViewState};

/// Hauteur d'une carte (bordures comprises)
const CARD_HEIGHT: u16 = 5;

/// Largeur minimale d'une carte
const CARD_MIN_WIDTH: u16 = 30;

/// Nombre maximum de colonnes
const MAX_COLUMNS: usize = 4;

/// Dessine la vue liste : en-tête (recherche) + grille
pub fn render_list(frame: &mut Frame, state: &ListViewState, queries: &MarketQueries, area: Rect) {
    let query = queries.coins(state.page_size());

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(3), Constraint::Min(0)])
        .split(area)
        .to_vec();

    match list::derive(state, &query) {
        ListView::Loading => {
            render_header(frame, state, query.is_fetching, None, chunks[0]);
            super::render_loading(frame, chunks[1], "Cryptocurrencies");
        }
        ListView::Failed { message } => {
            render_header(frame, state, query.is_fetching, None, chunks[0]);
            super::render_failure(frame, chunks[1], &message);
        }
        ListView::Ready {
            cards,
            selected,
            total,
            refresh_error,
        } => {
            render_header(frame, state, query.is_fetching, refresh_error, chunks[0]);
            render_grid(frame, &cards, selected, total, chunks[1]);
        }
    }
}

/// En-tête : titre, barre de recherche (hors mode simplifié)
///
/// `refresh_error` : échec de la dernière revalidation, les cartes affichées
/// sont celles du cache
fn render_header(
    frame: &mut Frame,
    state: &ListViewState,
    is_fetching: bool,
    refresh_error: Option<&str>,
    area: Rect,
) {
    let title = if state.simplified {
        format!(" Top {} Cryptos In The World ", state.page_size())
    } else {
        " Cryptoverse ".to_string()
    };

    let mut spans = Vec::new();

    if state.shows_search() {
        let search_style = if state.editing_search {
            Style::default().fg(Color::Green).add_modifier(Modifier::BOLD)
        } else {
            Style::default().fg(Color::Gray)
        };
        spans.push(Span::styled("🔍 Search Cryptocurrency: ", search_style));
        spans.push(Span::styled(
            state.search_term.clone(),
            Style::default().fg(Color::White),
        ));
        if state.editing_search {
            spans.push(Span::styled(
                "█",
                Style::default().fg(Color::White).add_modifier(Modifier::SLOW_BLINK),
            ));
        }
    }

    if is_fetching {
        spans.push(Span::styled("  ⟳", Style::default().fg(Color::Gray)));
    }

    if let Some(message) = refresh_error {
        spans.push(Span::styled(
            format!("  ⚠ {} [r] Réessayer", message),
            Style::default().fg(Color::Red),
        ));
    }

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Cyan))
        .title(title)
        .title_alignment(Alignment::Center);

    frame.render_widget(Paragraph::new(Line::from(spans)).block(block), area);
}

// ============================================================================
// Grille
// ============================================================================

/// Nombre de colonnes qui tiennent dans `width`
pub(crate) fn column_count(width: u16) -> usize {
    ((width / CARD_MIN_WIDTH) as usize).clamp(1, MAX_COLUMNS)
}

/// Première ligne de la grille à dessiner pour garder la sélection visible
///
/// CONCEPT : Défilement minimal
/// - On ne décale la fenêtre que lorsque la sélection en sort par le bas
pub(crate) fn first_visible_row(selected: usize, columns: usize, visible_rows: usize) -> usize {
    let row = selected / columns.max(1);
    (row + 1).saturating_sub(visible_rows.max(1))
}

fn render_grid(
    frame: &mut Frame,
    cards: &[&CoinSummary],
    selected: Option<usize>,
    total: usize,
    area: Rect,
) {
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Cyan))
        .title(format!(" {} / {} ", cards.len(), total));

    let inner = block.inner(area);
    frame.render_widget(block, area);

    // Filtre sans résultat : grille vide
    if cards.is_empty() || inner.height < CARD_HEIGHT {
        return;
    }

    let columns = column_count(inner.width);
    let visible_rows = (inner.height / CARD_HEIGHT) as usize;
    let first_row = first_visible_row(selected.unwrap_or(0), columns, visible_rows);

    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints(vec![Constraint::Length(CARD_HEIGHT); visible_rows])
        .split(inner)
        .to_vec();

    for (row_offset, row_area) in rows.into_iter().enumerate() {
        let cells = Layout::default()
            .direction(Direction::Horizontal)
            .constraints(vec![Constraint::Ratio(1, columns as u32); columns])
            .split(row_area);

        for (column, cell) in cells.iter().enumerate() {
            let index = (first_row + row_offset) * columns + column;
            if let Some(coin) = cards.get(index) {
                render_card(frame, coin, selected == Some(index), *cell);
            }
        }
    }
}

/// Dessine une carte
fn render_card(frame: &mut Frame, coin: &CoinSummary, is_selected: bool, area: Rect) {
    let change_color = if coin.change.is_none() {
        Color::Gray
    } else if coin.is_positive() {
        Color::Green
    } else {
        Color::Red
    };

    let border_style = if is_selected {
        Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD)
    } else {
        Style::default().fg(Color::DarkGray)
    };

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(border_style)
        .title(format!(" {} ", coin.title()));

    let text = vec![
        Line::from(vec![Span::raw("Price: "), Span::raw(format::usd(coin.price))]),
        Line::from(vec![
            Span::raw("Market Cap: "),
            Span::raw(format::usd(coin.market_cap)),
        ]),
        Line::from(vec![
            Span::raw("Daily Change: "),
            Span::styled(format::percent(coin.change), Style::default().fg(change_color)),
        ]),
    ];

    frame.render_widget(Paragraph::new(text).block(block), area);
}

// ============================================================================
// Tests unitaires
// ============================================================================
