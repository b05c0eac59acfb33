// ============================================================================
// Détail - Fiche d'une crypto
// ============================================================================
// Disposition :
// - Titre "{name} ({slug}) Price"
// - Sélecteur de période (9 valeurs)
// - Graphique de l'historique
// - Deux panneaux de statistiques (valeur / général)
// - Description interprétée + liens externes
// ============================================================================

use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, List, ListItem, Paragraph, Tabs, Wrap},
    Frame,
};

use crate::models::{CoinLink, TimePeriod};
use crate::query::MarketQueries;
use crate::views::detail::{self, ChartState, DetailModel, DetailView, DetailViewState, StatValue, Statistic};
use crate::views::rich_text::{RichLine, RichStyle, SanitizingRenderer};

/// Dessine la fiche d'une crypto
pub fn render_detail(frame: &mut Frame, state: &DetailViewState, queries: &MarketQueries, area: Rect) {
    // Les deux requêtes partent ensemble, sans s'attendre
    let detail_query = queries.coin_detail(&state.coin_id);
    let history_query = queries.coin_history(&state.coin_id, state.period);

    match detail::derive(state, &detail_query, &history_query, &SanitizingRenderer) {
        DetailView::Loading => super::render_loading(frame, area, &state.coin_id),
        DetailView::Failed { message } => super::render_failure(frame, area, &message),
        DetailView::Ready(model) => render_model(frame, &model, detail_query.is_fetching, area),
    }
}

fn render_model(frame: &mut Frame, model: &DetailModel, is_fetching: bool, area: Rect) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),  // Titre
            Constraint::Length(3),  // Sélecteur de période
            Constraint::Min(10),    // Graphique
            Constraint::Length(7),  // Statistiques
            Constraint::Length(10), // Description + liens
        ])
        .split(area)
        .to_vec();

    render_heading(frame, model, is_fetching, chunks[0]);
    render_period_selector(frame, model.period, chunks[1]);

    match &model.chart {
        ChartState::Ready(history) => super::chart::render_history_chart(
            frame,
            history,
            model.name,
            &model.current_price,
            chunks[2],
        ),
        ChartState::Loading => super::render_loading(frame, chunks[2], "Price Chart"),
        ChartState::Failed { message } => super::render_failure(frame, chunks[2], message),
    }

    let stats = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(50), Constraint::Percentage(50)])
        .split(chunks[3]);
    render_statistics(frame, &format!(" {} Value Statistics ", model.name), &model.value_stats, stats[0]);
    render_statistics(frame, " Other Statistics ", &model.generic_stats, stats[1]);

    let bottom = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(60), Constraint::Percentage(40)])
        .split(chunks[4]);
    render_description(frame, model.name, &model.description, bottom[0]);
    render_links(frame, model.name, model.links, bottom[1]);
}

fn render_heading(frame: &mut Frame, model: &DetailModel, is_fetching: bool, area: Rect) {
    let mut spans = vec![Span::styled(
        model.heading.clone(),
        Style::default().fg(Color::Green).add_modifier(Modifier::BOLD),
    )];
    if is_fetching {
        spans.push(Span::styled("  ⟳", Style::default().fg(Color::Gray)));
    }

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Cyan));

    let paragraph = Paragraph::new(Line::from(spans))
        .block(block)
        .alignment(Alignment::Center);

    frame.render_widget(paragraph, area);
}

fn render_period_selector(frame: &mut Frame, period: TimePeriod, area: Rect) {
    let selected = TimePeriod::ALL
        .iter()
        .position(|p| *p == period)
        .unwrap_or_default();

    let tabs = Tabs::new(TimePeriod::ALL.iter().map(|p| p.label()).collect::<Vec<_>>())
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(Style::default().fg(Color::Cyan))
                .title(" Time Period "),
        )
        .style(Style::default().fg(Color::Gray))
        .highlight_style(
            Style::default()
                .fg(Color::Yellow)
                .add_modifier(Modifier::BOLD | Modifier::REVERSED),
        )
        .select(selected);

    frame.render_widget(tabs, area);
}

/// Ligne "titre ....... valeur" d'un panneau
fn statistic_line(stat: &Statistic) -> Line<'static> {
    let value = match &stat.value {
        StatValue::Text(text) => Span::styled(
            text.clone(),
            Style::default().fg(Color::White).add_modifier(Modifier::BOLD),
        ),
        StatValue::Check(true) => Span::styled("✔", Style::default().fg(Color::Green)),
        StatValue::Check(false) => Span::styled("⛔", Style::default().fg(Color::Red)),
    };

    Line::from(vec![
        Span::styled(format!("{:<28}", stat.title), Style::default().fg(Color::Gray)),
        value,
    ])
}

fn render_statistics(frame: &mut Frame, title: &str, stats: &[Statistic], area: Rect) {
    let lines: Vec<Line> = stats.iter().map(statistic_line).collect();

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Cyan))
        .title(title.to_string());

    frame.render_widget(Paragraph::new(lines).block(block), area);
}

fn rich_line(line: &RichLine) -> Line<'static> {
    match line.style {
        RichStyle::Heading => Line::from(Span::styled(
            line.text.clone(),
            Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD),
        )),
        RichStyle::ListItem => Line::from(format!("  • {}", line.text)),
        RichStyle::Paragraph => Line::from(line.text.clone()),
    }
}

fn render_description(frame: &mut Frame, name: &str, description: &[RichLine], area: Rect) {
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Cyan))
        .title(format!(" What is {}? ", name));

    let lines: Vec<Line> = if description.is_empty() {
        vec![Line::from(Span::styled(
            "Pas de description",
            Style::default().fg(Color::Gray),
        ))]
    } else {
        description.iter().map(rich_line).collect()
    };

    let paragraph = Paragraph::new(lines)
        .block(block)
        .wrap(Wrap { trim: true });

    frame.render_widget(paragraph, area);
}

fn render_links(frame: &mut Frame, name: &str, links: &[CoinLink], area: Rect) {
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Cyan))
        .title(format!(" {} Links ", name));

    // URL affichée telle quelle : le terminal l'ouvre dans le navigateur
    let items: Vec<ListItem> = links
        .iter()
        .map(|link| {
            ListItem::new(vec![
                Line::from(vec![
                    Span::styled(
                        link.link_type.clone(),
                        Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD),
                    ),
                    Span::raw(" "),
                    Span::raw(link.name.clone()),
                ]),
                Line::from(Span::styled(
                    format!("  {}", link.url),
                    Style::default()
                        .fg(Color::Blue)
                        .add_modifier(Modifier::UNDERLINED),
                )),
            ])
        })
        .collect();

    frame.render_widget(List::new(items).block(block), area);
}

// ============================================================================
// Tests unitaires
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_check_statistic_symbols() {
        let approved = Statistic {
            title: "Approved Supply",
            value: StatValue::Check(true),
        };
        let line = statistic_line(&approved);
        assert_eq!(line.spans[1].content, "✔");

        let refused = Statistic {
            title: "Approved Supply",
            value: StatValue::Check(false),
        };
        assert_eq!(statistic_line(&refused).spans[1].content, "⛔");
    }

    #[test]
    fn test_list_item_prefix() {
        let line = rich_line(&RichLine::new(RichStyle::ListItem, "Fast"));
        assert_eq!(line.spans[0].content, "  • Fast");
    }
}
