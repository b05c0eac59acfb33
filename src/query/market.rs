// ============================================================================
// MarketQueries : les requêtes de l'application
// ============================================================================
// Relie le cache générique à la source de données de marché
//
// Trois caches, une seule famille de clés (QueryKey) :
// - Coins { limit }                  → classement
// - CoinDetail { coin_id }           → fiche
// - CoinHistory { coin_id, period }  → historique
//
// Toutes les notifications arrivent sur le même canal : l'event loop
// compare la clé reçue aux clés dont dépend la vue affichée.
// ============================================================================

use std::sync::Arc;
use std::time::Duration;

use tokio::runtime::Handle;
use tokio::sync::mpsc::{self, UnboundedReceiver};
use tracing::debug;

use super::{QueryCache, QueryState};
use crate::api::MarketDataSource;
use crate::models::{CoinDetail, CoinHistory, CoinSummary, TimePeriod};

/// Clé de requête : endpoint + paramètres
///
/// CONCEPT RUST : Enum comme clé de HashMap
/// - derive(Hash, Eq) suffit pour l'utiliser dans le cache
/// - Deux clés égales = même requête = même entrée
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum QueryKey {
    Coins { limit: usize },
    CoinDetail { coin_id: String },
    CoinHistory { coin_id: String, period: TimePeriod },
}

impl QueryKey {
    pub fn coins(limit: usize) -> Self {
        QueryKey::Coins { limit }
    }

    pub fn coin_detail(coin_id: &str) -> Self {
        QueryKey::CoinDetail {
            coin_id: coin_id.to_string(),
        }
    }

    pub fn coin_history(coin_id: &str, period: TimePeriod) -> Self {
        QueryKey::CoinHistory {
            coin_id: coin_id.to_string(),
            period,
        }
    }
}

/// Point d'accès unique aux données de marché pour les vues
pub struct MarketQueries {
    source: Arc<dyn MarketDataSource>,
    coins: QueryCache<QueryKey, Vec<CoinSummary>>,
    details: QueryCache<QueryKey, CoinDetail>,
    histories: QueryCache<QueryKey, CoinHistory>,
}

impl MarketQueries {
    /// Crée les caches et le canal de notification
    ///
    /// # Retourne
    /// * `(MarketQueries, receiver)` - le receiver reçoit la clé de chaque
    ///   requête terminée (succès ou échec)
    pub fn new(
        source: Arc<dyn MarketDataSource>,
        runtime: Handle,
        stale_after: Option<Duration>,
    ) -> (Self, UnboundedReceiver<QueryKey>) {
        let (notifier, receiver) = mpsc::unbounded_channel();

        let queries = Self {
            source,
            coins: QueryCache::new(runtime.clone())
                .with_stale_after(stale_after)
                .with_notifier(notifier.clone()),
            details: QueryCache::new(runtime.clone())
                .with_stale_after(stale_after)
                .with_notifier(notifier.clone()),
            histories: QueryCache::new(runtime)
                .with_stale_after(stale_after)
                .with_notifier(notifier),
        };

        (queries, receiver)
    }

    /// Classement des `limit` premières cryptos
    pub fn coins(&self, limit: usize) -> QueryState<Vec<CoinSummary>> {
        let source = Arc::clone(&self.source);
        self.coins.request(QueryKey::coins(limit), move || async move {
            source.list_coins(limit).await
        })
    }

    /// Fiche d'une crypto
    pub fn coin_detail(&self, coin_id: &str) -> QueryState<CoinDetail> {
        let source = Arc::clone(&self.source);
        let id = coin_id.to_string();
        self.details.request(QueryKey::coin_detail(coin_id), move || async move {
            source.coin_detail(&id).await
        })
    }

    /// Historique d'une crypto sur une période
    pub fn coin_history(&self, coin_id: &str, period: TimePeriod) -> QueryState<CoinHistory> {
        let source = Arc::clone(&self.source);
        let id = coin_id.to_string();
        self.histories
            .request(QueryKey::coin_history(coin_id, period), move || async move {
                source.coin_history(&id, period).await
            })
    }

    /// Relance explicitement la requête d'une clé
    pub fn refetch(&self, key: &QueryKey) {
        debug!(?key, "Refetch requested");
        let source = Arc::clone(&self.source);

        match key.clone() {
            QueryKey::Coins { limit } => {
                self.coins.refetch(key.clone(), move || async move {
                    source.list_coins(limit).await
                });
            }
            QueryKey::CoinDetail { coin_id } => {
                self.details.refetch(key.clone(), move || async move {
                    source.coin_detail(&coin_id).await
                });
            }
            QueryKey::CoinHistory { coin_id, period } => {
                self.histories.refetch(key.clone(), move || async move {
                    source.coin_history(&coin_id, period).await
                });
            }
        }
    }
}
