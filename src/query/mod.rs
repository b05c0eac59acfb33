// ============================================================================
// Module : query
// ============================================================================
// Cache de requêtes : une entrée par clé de requête (endpoint + paramètres)
//
// CONCEPTS RUST :
// 1. Arc<Mutex<HashMap>> : état partagé entre l'UI et les tâches tokio
// 2. Génériques : QueryCache<K, V> ne connaît ni l'API ni les modèles
// 3. Channels (tokio mpsc) : notification des clés dont la requête a abouti
//
// RÈGLES :
// - Deux demandes identiques pendant un fetch → un seul appel réseau
// - Une réponse est toujours rangée sous SA clé : une réponse tardive pour
//   une ancienne clé ne peut pas apparaître sous la clé courante
// - Une erreur garde les dernières données connues et n'est pas retentée
//   automatiquement (seul refetch() relance)
// ============================================================================

pub mod market; // Les trois requêtes de l'application (classement, fiche, historique)

use std::collections::HashMap;
use std::fmt::Debug;
use std::future::Future;
use std::hash::Hash;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::{Duration, Instant};

use tokio::runtime::Handle;
use tokio::sync::mpsc::UnboundedSender;
use tracing::{debug, info, warn};

pub use market::{MarketQueries, QueryKey};

// ============================================================================
// QueryStatus / QueryState : ce que voit une vue
// ============================================================================

/// État d'une requête du point de vue d'une vue
///
/// CONCEPT : State machine idle → fetching → {ready | error}
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QueryStatus {
    /// Jamais demandée
    Idle,
    /// Requête en cours (avec ou sans données en cache)
    Fetching,
    /// Données disponibles, pas d'erreur
    Ready,
    /// La dernière requête a échoué
    Error,
}

/// Photo de l'entrée du cache au moment de la lecture
///
/// CONCEPT RUST : Arc<V>
/// - Les données ne sont jamais copiées : la vue reçoit un pointeur partagé
/// - Deux vues qui lisent la même clé voient exactement la même valeur
#[derive(Debug)]
pub struct QueryState<V> {
    pub data: Option<Arc<V>>,
    pub is_fetching: bool,
    pub error: Option<String>,
}

// Clone à la main : Arc<V> est clonable même si V ne l'est pas
impl<V> Clone for QueryState<V> {
    fn clone(&self) -> Self {
        Self {
            data: self.data.clone(),
            is_fetching: self.is_fetching,
            error: self.error.clone(),
        }
    }
}

impl<V> Default for QueryState<V> {
    fn default() -> Self {
        Self {
            data: None,
            is_fetching: false,
            error: None,
        }
    }
}

impl<V> QueryState<V> {
    pub fn status(&self) -> QueryStatus {
        if self.is_fetching {
            QueryStatus::Fetching
        } else if self.error.is_some() {
            QueryStatus::Error
        } else if self.data.is_some() {
            QueryStatus::Ready
        } else {
            QueryStatus::Idle
        }
    }

    /// Pas encore de données et une requête en cours
    pub fn is_loading(&self) -> bool {
        self.data.is_none() && self.is_fetching
    }

    /// Accès emprunté aux données
    pub fn data(&self) -> Option<&V> {
        self.data.as_deref()
    }
}

// ============================================================================
// Entrée interne du cache
// ============================================================================

struct Entry<V> {
    data: Option<Arc<V>>,
    error: Option<String>,
    in_flight: bool,
    /// Instant du dernier succès (pour la revalidation)
    updated_at: Option<Instant>,
}

impl<V> Default for Entry<V> {
    fn default() -> Self {
        Self {
            data: None,
            error: None,
            in_flight: false,
            updated_at: None,
        }
    }
}

impl<V> Entry<V> {
    fn snapshot(&self) -> QueryState<V> {
        QueryState {
            data: self.data.clone(),
            is_fetching: self.in_flight,
            error: self.error.clone(),
        }
    }
}

// ============================================================================
// QueryCache
// ============================================================================

/// Cache de requêtes asynchrones, indexé par clé
///
/// CONCEPT RUST : Trait bounds sur les génériques
/// - K : clé hashable, clonée dans chaque tâche (Send + 'static)
/// - V : valeur partagée entre threads via Arc (Send + Sync + 'static)
pub struct QueryCache<K, V> {
    entries: Arc<Mutex<HashMap<K, Entry<V>>>>,
    runtime: Handle,
    stale_after: Option<Duration>,
    notifier: Option<UnboundedSender<K>>,
}

impl<K, V> QueryCache<K, V>
where
    K: Clone + Eq + Hash + Debug + Send + 'static,
    V: Send + Sync + 'static,
{
    /// Crée un cache vide dont les requêtes tournent sur `runtime`
    ///
    /// Par défaut : pas de revalidation, pas de notification.
    pub fn new(runtime: Handle) -> Self {
        Self {
            entries: Arc::new(Mutex::new(HashMap::new())),
            runtime,
            stale_after: None,
            notifier: None,
        }
    }

    /// Âge au-delà duquel une donnée en cache est revalidée en arrière-plan
    pub fn with_stale_after(mut self, stale_after: Option<Duration>) -> Self {
        self.stale_after = stale_after;
        self
    }

    /// Canal sur lequel la clé est envoyée à chaque requête terminée
    pub fn with_notifier(mut self, notifier: UnboundedSender<K>) -> Self {
        self.notifier = Some(notifier);
        self
    }

    /// Déclare un besoin de données pour `key`
    ///
    /// CONCEPT : Appel idempotent (comme un hook de vue)
    /// - Peut être appelé à chaque rendu sans coût réseau
    /// - Lance un fetch seulement si l'entrée est absente, ou périmée
    ///   (revalidation) et sans erreur, et qu'aucun fetch n'est en cours
    /// - `fetcher` n'est appelé que si un fetch démarre
    pub fn request<F, Fut>(&self, key: K, fetcher: F) -> QueryState<V>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = anyhow::Result<V>> + Send + 'static,
    {
        let mut entries = lock(&self.entries);
        let entry = entries.entry(key.clone()).or_default();

        let should_fetch = !entry.in_flight
            && entry.error.is_none()
            && (entry.data.is_none() || self.is_stale(entry));

        if !should_fetch {
            return entry.snapshot();
        }

        if entry.data.is_some() {
            debug!(?key, "Revalidating stale query");
        } else {
            debug!(?key, "Starting query");
        }

        // Marqué en cours AVANT de relâcher le verrou : un second appel
        // pour la même clé verra in_flight et ne relancera rien
        entry.in_flight = true;
        let state = entry.snapshot();
        drop(entries);

        self.spawn_fetch(key, fetcher());
        state
    }

    /// Relance explicitement la requête (touche 'r')
    ///
    /// Toujours dédupliqué : sans effet si un fetch est déjà en cours.
    pub fn refetch<F, Fut>(&self, key: K, fetcher: F) -> QueryState<V>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = anyhow::Result<V>> + Send + 'static,
    {
        let mut entries = lock(&self.entries);
        let entry = entries.entry(key.clone()).or_default();

        if entry.in_flight {
            debug!(?key, "Refetch ignored, query already in flight");
            return entry.snapshot();
        }

        info!(?key, "Refetching query");
        entry.in_flight = true;
        let state = entry.snapshot();
        drop(entries);

        self.spawn_fetch(key, fetcher());
        state
    }

    /// Lit l'état d'une clé sans rien déclencher
    pub fn peek(&self, key: &K) -> QueryState<V> {
        lock(&self.entries)
            .get(key)
            .map(Entry::snapshot)
            .unwrap_or_default()
    }

    /// Nombre de clés connues du cache
    pub fn len(&self) -> usize {
        lock(&self.entries).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn is_stale(&self, entry: &Entry<V>) -> bool {
        match (self.stale_after, entry.updated_at) {
            (Some(stale_after), Some(updated_at)) => updated_at.elapsed() >= stale_after,
            _ => false,
        }
    }

    /// Exécute le fetch dans une tâche tokio puis range le résultat
    ///
    /// CONCEPT : Remplacement atomique sous verrou
    /// - Succès : nouvelles données, erreur effacée
    /// - Échec : erreur posée, anciennes données conservées
    /// - Dans les deux cas : in_flight = false puis notification de la clé
    fn spawn_fetch<Fut>(&self, key: K, fetch: Fut)
    where
        Fut: Future<Output = anyhow::Result<V>> + Send + 'static,
    {
        let entries = Arc::clone(&self.entries);
        let notifier = self.notifier.clone();

        self.runtime.spawn(async move {
            let result = fetch.await;

            {
                let mut entries = lock(&entries);
                let entry = entries.entry(key.clone()).or_default();
                entry.in_flight = false;

                match result {
                    Ok(value) => {
                        debug!(?key, "Query settled");
                        entry.data = Some(Arc::new(value));
                        entry.error = None;
                        entry.updated_at = Some(Instant::now());
                    }
                    Err(e) => {
                        warn!(?key, error = %e, "Query failed");
                        entry.error = Some(format!("{:#}", e));
                    }
                }
            }

            if let Some(notifier) = notifier {
                // Receiver fermé = application en cours d'arrêt
                let _ = notifier.send(key);
            }
        });
    }
}

/// Verrouille le mutex, même empoisonné (une tâche a paniqué)
fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

// ============================================================================
// Tests unitaires
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use tokio::sync::{mpsc, oneshot};

    fn cache() -> (QueryCache<String, u32>, mpsc::UnboundedReceiver<String>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (QueryCache::new(Handle::current()).with_notifier(tx), rx)
    }

    #[tokio::test]
    async fn test_first_request_starts_fetch() {
        let (cache, mut rx) = cache();

        let state = cache.request("btc".to_string(), || async { Ok(42) });
        assert!(state.is_loading());
        assert_eq!(state.status(), QueryStatus::Fetching);

        assert_eq!(rx.recv().await.as_deref(), Some("btc"));

        let state = cache.peek(&"btc".to_string());
        assert_eq!(state.status(), QueryStatus::Ready);
        assert_eq!(state.data(), Some(&42));
    }

    #[tokio::test]
    async fn test_concurrent_requests_are_deduplicated() {
        let (cache, mut rx) = cache();
        let calls = Arc::new(AtomicUsize::new(0));
        let (release, gate) = oneshot::channel::<()>();

        let counter = Arc::clone(&calls);
        cache.request("btc".to_string(), move || {
            counter.fetch_add(1, Ordering::SeqCst);
            async move {
                let _ = gate.await;
                Ok(7)
            }
        });

        // Deuxième demande pendant le fetch : aucun nouvel appel
        let counter = Arc::clone(&calls);
        let second = cache.request("btc".to_string(), move || {
            counter.fetch_add(1, Ordering::SeqCst);
            async { Ok(8) }
        });
        assert!(second.is_fetching);
        assert_eq!(calls.load(Ordering::SeqCst), 1);

        release.send(()).unwrap();
        rx.recv().await;

        assert_eq!(cache.peek(&"btc".to_string()).data(), Some(&7));
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_cached_data_returned_without_refetch() {
        let (cache, mut rx) = cache();
        let calls = Arc::new(AtomicUsize::new(0));

        let counter = Arc::clone(&calls);
        cache.request("eth".to_string(), move || {
            counter.fetch_add(1, Ordering::SeqCst);
            async { Ok(1) }
        });
        rx.recv().await;

        let counter = Arc::clone(&calls);
        let state = cache.request("eth".to_string(), move || {
            counter.fetch_add(1, Ordering::SeqCst);
            async { Ok(99) }
        });
        assert_eq!(state.status(), QueryStatus::Ready);
        assert_eq!(state.data(), Some(&1));
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_different_keys_fetch_independently() {
        let (cache, mut rx) = cache();

        cache.request("btc".to_string(), || async { Ok(1) });
        cache.request("eth".to_string(), || async { Ok(2) });
        rx.recv().await;
        rx.recv().await;

        assert_eq!(cache.len(), 2);
        assert_eq!(cache.peek(&"btc".to_string()).data(), Some(&1));
        assert_eq!(cache.peek(&"eth".to_string()).data(), Some(&2));
    }

    #[tokio::test]
    async fn test_error_keeps_previous_data_and_is_not_retried() {
        let (cache, mut rx) = cache();

        cache.request("btc".to_string(), || async { Ok(10) });
        rx.recv().await;

        cache.refetch("btc".to_string(), || async {
            Err(anyhow::anyhow!("connexion refusée"))
        });
        rx.recv().await;

        let state = cache.peek(&"btc".to_string());
        assert_eq!(state.status(), QueryStatus::Error);
        assert_eq!(state.data(), Some(&10));
        assert!(state.error.unwrap().contains("connexion refusée"));

        // Pas de nouvelle tentative automatique
        let calls = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&calls);
        let state = cache.request("btc".to_string(), move || {
            counter.fetch_add(1, Ordering::SeqCst);
            async { Ok(11) }
        });
        assert!(!state.is_fetching);
        assert_eq!(calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_failed_first_fetch_has_no_data() {
        let (cache, mut rx) = cache();

        cache.request("doge".to_string(), || async { Err(anyhow::anyhow!("HTTP 500")) });
        rx.recv().await;

        let state = cache.peek(&"doge".to_string());
        assert!(state.data().is_none());
        assert!(!state.is_fetching);
        assert_eq!(state.status(), QueryStatus::Error);
    }

    #[tokio::test]
    async fn test_stale_entry_is_revalidated_in_background() {
        let (tx, mut rx) = mpsc::unbounded_channel();
        let cache: QueryCache<String, u32> = QueryCache::new(Handle::current())
            .with_stale_after(Some(Duration::ZERO))
            .with_notifier(tx);

        cache.request("btc".to_string(), || async { Ok(1) });
        rx.recv().await;

        // Donnée périmée : renvoyée immédiatement, revalidation lancée
        let state = cache.request("btc".to_string(), || async { Ok(2) });
        assert_eq!(state.data(), Some(&1));
        assert!(state.is_fetching);
        assert!(!state.is_loading());

        rx.recv().await;
        assert_eq!(cache.peek(&"btc".to_string()).data(), Some(&2));
    }

    #[test]
    fn test_peek_unknown_key_is_idle() {
        let runtime = tokio::runtime::Runtime::new().unwrap();
        let cache: QueryCache<String, u32> = QueryCache::new(runtime.handle().clone());
        assert_eq!(cache.peek(&"nope".to_string()).status(), QueryStatus::Idle);
        assert!(cache.is_empty());
    }
}
