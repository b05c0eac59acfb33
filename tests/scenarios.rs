// ============================================================================
// Tests d'intégration : cache de requêtes + vues + App
// ============================================================================
// Les requêtes tournent sur le runtime du test ; chaque requête terminée
// est attendue sur le canal de notification avant de lire le cache.
// ============================================================================

mod common;

use std::sync::Arc;
use std::time::Duration;

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use ratatui::backend::TestBackend;
use ratatui::Terminal;
use tokio::runtime::Handle;
use tokio::sync::mpsc::UnboundedReceiver;
use tokio::time::timeout;

use common::{FakeMarket, MARKET_SIZE};
use cryptoverse::app::App;
use cryptoverse::models::TimePeriod;
use cryptoverse::query::{MarketQueries, QueryKey};
use cryptoverse::ui::{self, Event};
use cryptoverse::views::detail::{self, ChartState, DetailView, DetailViewState};
use cryptoverse::views::list::{self, ListView};
use cryptoverse::views::SanitizingRenderer;

fn setup(market: FakeMarket) -> (Arc<FakeMarket>, MarketQueries, UnboundedReceiver<QueryKey>) {
    let market = Arc::new(market);
    let (queries, notifications) = MarketQueries::new(market.clone(), Handle::current(), None);
    (market, queries, notifications)
}

async fn settled(notifications: &mut UnboundedReceiver<QueryKey>) -> QueryKey {
    timeout(Duration::from_secs(5), notifications.recv())
        .await
        .expect("requête terminée à temps")
        .expect("canal ouvert")
}

fn key(code: KeyCode) -> Event {
    Event::Key(KeyEvent::new(code, KeyModifiers::empty()))
}

fn screen_text(terminal: &Terminal<TestBackend>) -> String {
    terminal
        .backend()
        .buffer()
        .content
        .iter()
        .map(|cell| cell.symbol())
        .collect()
}

// ============================================================================
// Vue liste
// ============================================================================

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn simplified_view_shows_ten_cards_without_search() {
    let (market, queries, mut notifications) = setup(FakeMarket::new());
    let mut app = App::new(true);

    queries.coins(app.list.page_size());
    assert_eq!(settled(&mut notifications).await, QueryKey::coins(10));

    // '/' n'ouvre pas de recherche en mode simplifié
    app.handle_event(&key(KeyCode::Char('/')), &queries);
    app.handle_event(&key(KeyCode::Char('b')), &queries);
    assert!(!app.is_searching());
    assert!(app.list.search_term.is_empty());

    let query = queries.coins(app.list.page_size());
    match list::derive(&app.list, &query) {
        ListView::Ready { cards, total, .. } => {
            assert_eq!(cards.len(), 10);
            assert_eq!(total, 10);
        }
        other => panic!("unexpected view: {:?}", other),
    }
    assert!(!app.list.shows_search());
    assert_eq!(market.list_calls(), 1);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn typing_bit_filters_and_clearing_restores_all() {
    let (market, queries, mut notifications) = setup(FakeMarket::new());
    let mut app = App::new(false);

    queries.coins(app.list.page_size());
    assert_eq!(settled(&mut notifications).await, QueryKey::coins(MARKET_SIZE));

    let expected: Vec<String> = market
        .all_coins()
        .iter()
        .filter(|coin| coin.name.to_lowercase().contains("bit"))
        .map(|coin| coin.id.clone())
        .collect();
    assert!(!expected.is_empty() && expected.len() < MARKET_SIZE);

    app.handle_event(&key(KeyCode::Char('/')), &queries);
    for c in "bit".chars() {
        app.handle_event(&key(KeyCode::Char(c)), &queries);
    }
    assert_eq!(app.list.search_term, "bit");

    let query = queries.coins(app.list.page_size());
    match list::derive(&app.list, &query) {
        ListView::Ready { cards, .. } => {
            let ids: Vec<String> = cards.iter().map(|coin| coin.id.clone()).collect();
            assert_eq!(ids, expected);
        }
        other => panic!("unexpected view: {:?}", other),
    }

    // ESC efface la recherche : les 100 cryptos reviennent
    app.handle_event(&key(KeyCode::Esc), &queries);
    match list::derive(&app.list, &query) {
        ListView::Ready { cards, .. } => assert_eq!(cards.len(), MARKET_SIZE),
        other => panic!("unexpected view: {:?}", other),
    }

    // Filtrer ne relance jamais le fetch
    assert_eq!(market.list_calls(), 1);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn enter_opens_detail_of_selected_card() {
    let (_market, queries, mut notifications) = setup(FakeMarket::new());
    let mut app = App::new(false);

    queries.coins(app.list.page_size());
    settled(&mut notifications).await;

    app.handle_event(&key(KeyCode::Down), &queries);
    app.handle_event(&key(KeyCode::Enter), &queries);

    assert!(app.is_on_detail());
    assert_eq!(
        app.detail.as_ref().map(|state| state.coin_id.as_str()),
        Some("coin-2")
    );
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn failed_list_refresh_keeps_cards_and_flags_error() {
    let (market, queries, mut notifications) = setup(FakeMarket::new());
    let mut app = App::new(false);

    queries.coins(app.list.page_size());
    settled(&mut notifications).await;

    market.set_list_failing(true);
    app.handle_event(&key(KeyCode::Char('r')), &queries);
    assert!(app.is_dependent(&settled(&mut notifications).await));
    assert_eq!(market.list_calls(), 2);

    let mut terminal = Terminal::new(TestBackend::new(130, 30)).unwrap();
    terminal.draw(|frame| ui::render(frame, &app, &queries)).unwrap();
    let text = screen_text(&terminal);

    // Les cartes du cache restent, avec le symbole à côté du nom
    assert!(text.contains("1. Bitcoin 1 (C1)"));
    assert!(text.contains("simulated rate limit"));
}

// ============================================================================
// Cache partagé
// ============================================================================

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn concurrent_detail_requests_share_one_fetch() {
    let (market, queries, mut notifications) = setup(FakeMarket::new());
    let release = market.gate_detail();

    // Deux vues demandent la même fiche pendant que le fetch est en cours
    let first = queries.coin_detail("bitcoin");
    let second = queries.coin_detail("bitcoin");
    assert!(first.is_loading());
    assert!(second.is_loading());

    release.send(()).unwrap();
    assert_eq!(settled(&mut notifications).await, QueryKey::coin_detail("bitcoin"));

    let third = queries.coin_detail("bitcoin");
    assert_eq!(third.data().map(|coin| coin.name.as_str()), Some("Bitcoin"));
    assert_eq!(market.detail_calls(), 1);
}

// ============================================================================
// Vue détail
// ============================================================================

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn switching_period_shows_latest_series_even_out_of_order() {
    let (market, queries, mut notifications) = setup(FakeMarket::new());
    let release_one_year = market.gate_history(TimePeriod::OneYear);

    let mut state = DetailViewState::new("bitcoin");
    state.set_period(TimePeriod::OneYear);
    queries.coin_history(&state.coin_id, state.period);

    state.set_period(TimePeriod::ThreeMonths);
    queries.coin_history(&state.coin_id, state.period);

    // 3M arrive d'abord, puis la réponse tardive de 1Y
    assert_eq!(
        settled(&mut notifications).await,
        QueryKey::coin_history("bitcoin", TimePeriod::ThreeMonths)
    );
    release_one_year.send(()).unwrap();
    assert_eq!(
        settled(&mut notifications).await,
        QueryKey::coin_history("bitcoin", TimePeriod::OneYear)
    );

    let history = queries.coin_history(&state.coin_id, state.period);
    match detail::chart_state(&state, &history) {
        ChartState::Ready(series) => {
            assert_eq!(series.period, TimePeriod::ThreeMonths);
            assert_eq!(*series, common::fake_history("bitcoin", TimePeriod::ThreeMonths));
        }
        other => panic!("unexpected chart: {:?}", other),
    }

    let calls = market.history_calls();
    assert_eq!(calls.len(), 2);
    assert!(calls.contains(&("bitcoin".to_string(), TimePeriod::OneYear)));
    assert!(calls.contains(&("bitcoin".to_string(), TimePeriod::ThreeMonths)));
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn failed_detail_renders_error_without_panicking() {
    let (market, queries, mut notifications) = setup(FakeMarket::new().failing_detail());
    let mut app = App::with_coin(false, "bitcoin");
    let state = app.detail.clone().unwrap();

    queries.coin_detail(&state.coin_id);
    queries.coin_history(&state.coin_id, state.period);
    settled(&mut notifications).await;
    settled(&mut notifications).await;

    let detail_query = queries.coin_detail(&state.coin_id);
    let history_query = queries.coin_history(&state.coin_id, state.period);
    match detail::derive(&state, &detail_query, &history_query, &SanitizingRenderer) {
        DetailView::Failed { message } => assert!(message.contains("simulated network error")),
        other => panic!("unexpected view: {:?}", other),
    }

    // Pas de relance automatique, seulement sur 'r'
    assert_eq!(market.detail_calls(), 1);

    let mut terminal = Terminal::new(TestBackend::new(100, 40)).unwrap();
    terminal.draw(|frame| ui::render(frame, &app, &queries)).unwrap();
    assert!(screen_text(&terminal).contains("simulated network error"));

    // 'r' relance la fiche et l'historique
    app.handle_event(&key(KeyCode::Char('r')), &queries);
    assert!(app.is_dependent(&settled(&mut notifications).await));
    assert!(app.is_dependent(&settled(&mut notifications).await));
    assert_eq!(market.detail_calls(), 2);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn detail_screen_renders_statistics_and_links() {
    let (_market, queries, mut notifications) = setup(FakeMarket::new());
    let app = App::with_coin(false, "bitcoin");

    let mut terminal = Terminal::new(TestBackend::new(120, 50)).unwrap();

    // Premier rendu : déclare les deux requêtes, affiche le chargement
    terminal.draw(|frame| ui::render(frame, &app, &queries)).unwrap();
    assert!(screen_text(&terminal).contains("Chargement"));

    settled(&mut notifications).await;
    settled(&mut notifications).await;

    terminal.draw(|frame| ui::render(frame, &app, &queries)).unwrap();
    let text = screen_text(&terminal);
    assert!(text.contains("Bitcoin (bitcoin-btc) Price"));
    assert!(text.contains("$ 68.1K"));
    assert!(text.contains("Approved Supply"));
    assert!(text.contains("https://bitcoin.org"));
    assert!(text.contains("Peer-to-peer cash."));
}
