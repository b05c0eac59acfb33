// ============================================================================
// Module : api
// ============================================================================
// Sources de données de marché : le trait MarketDataSource et le client
// Coinranking qui l'implémente
// ============================================================================

pub mod coinranking; // Client API Coinranking

use anyhow::Result;
use async_trait::async_trait;

use crate::models::{CoinDetail, CoinHistory, CoinSummary, TimePeriod};

// Re-export du client principal
pub use coinranking::CoinrankingClient;

/// Les trois opérations consommées par l'application
///
/// CONCEPT RUST : Trait object (dyn MarketDataSource)
/// - Le cache de requêtes ne connaît que ce trait
/// - En production : CoinrankingClient (HTTP)
/// - En test : une fausse source en mémoire qui compte les appels
///
/// CONCEPT : #[async_trait]
/// - Les méthodes async d'un trait utilisé en `dyn` passent par cette macro
/// - Send + Sync : la source est partagée entre tâches tokio via Arc
#[async_trait]
pub trait MarketDataSource: Send + Sync {
    /// Classement des `limit` premières cryptos
    async fn list_coins(&self, limit: usize) -> Result<Vec<CoinSummary>>;

    /// Fiche complète d'une crypto
    async fn coin_detail(&self, coin_id: &str) -> Result<CoinDetail>;

    /// Historique des prix d'une crypto sur une période
    async fn coin_history(&self, coin_id: &str, period: TimePeriod) -> Result<CoinHistory>;
}
