// ============================================================================
// Module : ui
// ============================================================================
// Gère toute l'interface utilisateur (Terminal User Interface)
//
// CONCEPT : Le rendu déclare ses besoins
// - Chaque rendu demande ses données à MarketQueries (appel idempotent)
// - Le cache lance le fetch si besoin, sinon renvoie l'état connu
// - Les vues (crate::views) décident quoi afficher ; ce module dessine
// ============================================================================

pub mod chart;  // Graphique ligne de l'historique des prix
pub mod detail; // Fiche d'une crypto
pub mod events; // Gestion des événements clavier
pub mod list;   // Grille des cartes du classement

use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph, Wrap},
    Frame,
};

use crate::app::{App, Screen};
use crate::query::MarketQueries;

// Re-exports pour simplifier les imports
pub use events::{Event, EventHandler};

/// Dessine l'écran courant
///
/// CONCEPT RUST : Routing avec match sur enum
/// - Le compilateur garantit l'exhaustivité (tous les écrans gérés)
pub fn render(frame: &mut Frame, app: &App, queries: &MarketQueries) {
    let chunks = create_layout(frame.size());

    match (app.screen, &app.detail) {
        (Screen::Detail, Some(state)) => detail::render_detail(frame, state, queries, chunks[0]),
        _ => list::render_list(frame, &app.list, queries, chunks[0]),
    }

    render_footer(frame, app, chunks[1]);
}

/// Découpe l'écran : contenu + footer
fn create_layout(area: Rect) -> Vec<Rect> {
    Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Min(0),    // Contenu : tout le reste
            Constraint::Length(3), // Footer : 3 lignes
        ])
        .split(area)
        .to_vec()
}

// ============================================================================
// Footer : raccourcis clavier
// ============================================================================

fn key_style() -> Style {
    Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD)
}

fn shortcut<'a>(key: &'a str, label: &'a str) -> [Span<'a>; 2] {
    [Span::styled(key, key_style()), Span::raw(label)]
}

/// Dessine le footer avec les raccourcis de l'écran courant
fn render_footer(frame: &mut Frame, app: &App, area: Rect) {
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Cyan));

    let line = if app.is_awaiting_quit_confirmation() {
        Line::from(vec![
            Span::styled(
                "⚠  Appuyez sur ",
                Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD),
            ),
            Span::styled(
                "[q]",
                Style::default()
                    .fg(Color::Red)
                    .add_modifier(Modifier::BOLD)
                    .add_modifier(Modifier::SLOW_BLINK),
            ),
            Span::styled(
                " à nouveau pour quitter, ou n'importe quelle autre touche pour annuler ⚠",
                Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD),
            ),
        ])
    } else if app.is_searching() {
        Line::from(
            [shortcut("[Enter]", " Valider  "), shortcut("[ESC]", " Effacer")].concat(),
        )
    } else if app.is_on_detail() {
        Line::from(
            [
                shortcut("[ESC]", " Retour  "),
                shortcut("[← → / h l]", " Période  "),
                shortcut("[r]", " Rafraîchir  "),
                shortcut("[q]", " Quit"),
            ]
            .concat(),
        )
    } else {
        let mut spans = [
            shortcut("[↑↓ / j k]", " Navigate  "),
            shortcut("[Enter]", " Détail  "),
        ]
        .concat();
        if app.list.shows_search() {
            spans.extend(shortcut("[/]", " Search  "));
        }
        spans.extend(shortcut("[r]", " Rafraîchir  "));
        spans.extend(shortcut("[q]", " Quit"));
        Line::from(spans)
    };

    let paragraph = Paragraph::new(vec![line])
        .block(block)
        .alignment(Alignment::Center);

    frame.render_widget(paragraph, area);
}

// ============================================================================
// Helpers partagés : chargement et erreur
// ============================================================================

/// Indicateur de chargement (aucune donnée encore disponible)
pub(crate) fn render_loading(frame: &mut Frame, area: Rect, title: &str) {
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Cyan))
        .title(format!(" {} ", title));

    let text = vec![
        Line::from(""),
        Line::from(Span::styled(
            "⏳ Chargement...",
            Style::default().fg(Color::Gray),
        )),
    ];

    let paragraph = Paragraph::new(text)
        .block(block)
        .alignment(Alignment::Center);

    frame.render_widget(paragraph, area);
}

/// Message d'échec d'une requête, avec l'invite de relance
pub(crate) fn render_failure(frame: &mut Frame, area: Rect, message: &str) {
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Red))
        .title(" ⚠ Erreur ");

    let text = vec![
        Line::from(""),
        Line::from(Span::styled(message, Style::default().fg(Color::Red))),
        Line::from(""),
        Line::from(Span::styled(
            "[r] Réessayer",
            Style::default().fg(Color::Gray),
        )),
    ];

    let paragraph = Paragraph::new(text)
        .block(block)
        .alignment(Alignment::Center)
        .wrap(Wrap { trim: true });

    frame.render_widget(paragraph, area);
}
