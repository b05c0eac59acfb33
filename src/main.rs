// ============================================================================
// Cryptoverse - Point d'entrée
// ============================================================================
// Programme TUI : classement des cryptomonnaies et fiche détaillée
// Données Coinranking, mises en cache par clé de requête
//
// CONCEPTS RUST CLÉS :
// 1. Terminal raw mode : contrôle total du terminal
// 2. Event loop : notifications → rendu → entrée clavier
// 3. Async dans sync : runtime tokio pour les requêtes, UI synchrone
// 4. Channels : les requêtes terminées notifient l'event loop
// ============================================================================

use std::io;
use std::path::Path;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use crossterm::{
    event::{DisableMouseCapture, EnableMouseCapture},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{backend::CrosstermBackend, Terminal};
use tokio::sync::mpsc::error::TryRecvError;
use tokio::sync::mpsc::UnboundedReceiver;
use tracing::{debug, error, info, warn};

use cryptoverse::api::CoinrankingClient;
use cryptoverse::app::App;
use cryptoverse::config::{Config, APP_NAME};
use cryptoverse::query::{MarketQueries, QueryKey};
use cryptoverse::ui::{self, Event, EventHandler};

// ============================================================================
// Logging
// ============================================================================

/// Initialise le système de logging avec tracing
///
/// Les logs sont écrits dans `<log_dir>/cryptoverse.log` (rotation
/// quotidienne), jamais sur le terminal occupé par l'interface.
///
/// # Utilisation
/// ```bash
/// tail -f ~/.local/share/cryptoverse/logs/cryptoverse.log
/// RUST_LOG=cryptoverse=trace cryptoverse
/// ```
fn init_logging(log_dir: &Path) -> Result<()> {
    use tracing_appender::rolling::{RollingFileAppender, Rotation};
    use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

    std::fs::create_dir_all(log_dir).context("Échec de la création du répertoire de logs")?;

    let file_appender =
        RollingFileAppender::new(Rotation::DAILY, log_dir, format!("{}.log", APP_NAME));

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(file_appender)
                .with_ansi(false)
                .with_target(true)
                .with_thread_ids(true) // Utile : les requêtes tournent sur les workers tokio
                .with_line_number(true),
        )
        .with(
            // Par défaut : debug pour cryptoverse, info pour les dépendances
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "cryptoverse=debug,info".into()),
        )
        .init();

    info!(?log_dir, "Logging initialisé");
    Ok(())
}

// ============================================================================
// Point d'entrée du programme
// ============================================================================
// CONCEPT RUST : Async dans sync
// - main() est synchrone (pour la TUI)
// - Les requêtes HTTP tournent sur un runtime tokio multi-thread
// - Le cache leur passe un Handle du runtime pour spawn
// ============================================================================

fn main() -> Result<()> {
    let config = Config::parse();

    // Logging avant tout le reste ; un échec n'empêche pas de démarrer
    init_logging(&config.resolve_log_dir()).unwrap_or_else(|e| {
        eprintln!("⚠️  Warning: Failed to initialize logging: {:#}", e);
        eprintln!("   Continuing without logging...");
    });

    info!(
        simplified = config.simplified,
        coin = ?config.coin,
        base_url = %config.base_url,
        stale_secs = config.stale_secs,
        "Cryptoverse starting up"
    );

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .thread_name("cryptoverse-fetch")
        .build()
        .context("Échec de la création du runtime tokio")?;

    let client = CoinrankingClient::new(config.base_url.clone(), config.api_key.clone())?;
    let (queries, notifications) =
        MarketQueries::new(Arc::new(client), runtime.handle().clone(), config.stale_after());

    let mut app = match &config.coin {
        Some(coin_id) => App::with_coin(config.simplified, coin_id.clone()),
        None => App::new(config.simplified),
    };

    debug!("Setting up terminal");
    let mut terminal = setup_terminal()?;

    let events = EventHandler::new();

    info!("Starting event loop");
    let result = run(&mut terminal, &mut app, &queries, &events, notifications);

    // Restaure le terminal (même en cas d'erreur)
    debug!("Restoring terminal");
    restore_terminal(&mut terminal)?;

    match &result {
        Ok(_) => info!("Application exited normally"),
        Err(e) => error!(error = ?e, "Application exited with error"),
    }

    // Les requêtes encore en vol sont abandonnées avec le runtime
    runtime.shutdown_background();

    result
}

// ============================================================================
// Event loop
// ============================================================================
// 0. NOTIFICATIONS : vide le canal du cache (try_recv, non bloquant)
// 1. RENDER : redessine si nécessaire (le rendu déclare ses requêtes)
// 2. INPUT : attend une touche au plus TICK_RATE
// ============================================================================

fn run(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    app: &mut App,
    queries: &MarketQueries,
    events: &EventHandler,
    mut notifications: UnboundedReceiver<QueryKey>,
) -> Result<()> {
    while app.is_running() {
        // ========================================
        // 0. NOTIFICATIONS
        // ========================================
        drain_notifications(app, &mut notifications);

        // ========================================
        // 1. RENDER
        // ========================================
        if app.take_redraw() {
            terminal
                .draw(|frame| ui::render(frame, app, queries))
                .context("Échec du rendu du terminal")?;
        }

        // ========================================
        // 2. INPUT
        // ========================================
        let event = events.next().unwrap_or_else(|e| {
            warn!(error = %e, "Failed to read terminal event");
            Event::Error
        });
        app.handle_event(&event, queries);
    }

    Ok(())
}

/// Vide les notifications du cache et marque l'écran à redessiner si une
/// requête dont dépend la vue affichée vient de se terminer
fn drain_notifications(app: &mut App, notifications: &mut UnboundedReceiver<QueryKey>) {
    loop {
        match notifications.try_recv() {
            Ok(key) if app.is_dependent(&key) => {
                debug!(?key, "Dependent query settled, re-rendering");
                app.mark_dirty();
            }
            Ok(key) => {
                debug!(?key, "Query settled for an inactive view");
            }
            Err(TryRecvError::Empty) => break,
            Err(TryRecvError::Disconnected) => {
                error!("Query notification channel disconnected");
                break;
            }
        }
    }
}

// ============================================================================
// Setup et restauration du terminal
// ============================================================================
// IMPORTANT : Toujours restaurer le terminal avant de quitter !
// ============================================================================

/// Configure le terminal en mode TUI
fn setup_terminal() -> Result<Terminal<CrosstermBackend<io::Stdout>>> {
    enable_raw_mode().context("Échec de l'activation du raw mode")?;

    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)
        .context("Échec de l'ouverture de l'écran alternatif")?;

    let backend = CrosstermBackend::new(stdout);
    Terminal::new(backend).context("Échec de la création du terminal")
}

/// Restaure le terminal à son état normal
fn restore_terminal(terminal: &mut Terminal<CrosstermBackend<io::Stdout>>) -> Result<()> {
    disable_raw_mode()?;

    execute!(
        terminal.backend_mut(),
        LeaveAlternateScreen,
        DisableMouseCapture
    )?;

    terminal.show_cursor()?;

    Ok(())
}
