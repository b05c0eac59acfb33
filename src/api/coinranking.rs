// ============================================================================
// API Client : Coinranking
// ============================================================================
// Récupère le classement, les fiches et l'historique des cryptos
//
// CONCEPTS RUST AVANCÉS :
// 1. async/await : requêtes HTTP non-bloquantes
// 2. Result<T, E> : gestion d'erreurs avec contexte (anyhow)
// 3. Serde : désérialisation JSON vers des structures privées, puis
//    conversion vers les modèles du domaine
// 4. Génériques : une seule fonction get_json<T> pour les trois endpoints
// ============================================================================

use std::time::Duration;

use anyhow::{Context, Result};
use async_trait::async_trait;
use chrono::DateTime;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer};
use tracing::{debug, error, info, instrument, warn};

use super::MarketDataSource;
use crate::models::{
    AllTimeHigh, CoinDetail, CoinHistory, CoinLink, CoinSummary, HistoryPoint, TimePeriod,
};

/// URL par défaut de l'API publique
pub const DEFAULT_BASE_URL: &str = "https://api.coinranking.com/v2";

/// Timeout d'une requête
const REQUEST_TIMEOUT: Duration = Duration::from_secs(15);

// ============================================================================
// Structures pour parser la réponse JSON de Coinranking
// ============================================================================
// Toutes les réponses ont la forme { "status": "success", "data": { ... } }
//
// Les montants arrivent en chaînes ("68123.4512") ou null : ils passent par
// de_opt_f64. Deux formes de fiche existent (v1 à plat, v2 avec "supply"
// imbriqué), les deux sont acceptées.
// ============================================================================

/// Enveloppe commune à toutes les réponses
#[derive(Debug, Deserialize)]
struct Envelope<T> {
    status: Option<String>,
    message: Option<String>,
    data: Option<T>,
}

#[derive(Debug, Deserialize)]
struct CoinsData {
    coins: Vec<RawCoin>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawCoin {
    #[serde(rename = "uuid", alias = "id", deserialize_with = "de_id")]
    id: String,
    rank: u32,
    name: String,
    #[serde(default)]
    symbol: String,
    icon_url: Option<String>,
    #[serde(default, deserialize_with = "de_opt_f64")]
    price: Option<f64>,
    #[serde(default, deserialize_with = "de_opt_f64")]
    market_cap: Option<f64>,
    #[serde(default, deserialize_with = "de_opt_f64")]
    change: Option<f64>,
}

#[derive(Debug, Deserialize)]
struct CoinData {
    coin: RawCoinDetail,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawCoinDetail {
    #[serde(rename = "uuid", alias = "id", deserialize_with = "de_id")]
    id: String,
    name: String,
    slug: Option<String>,
    #[serde(default)]
    symbol: String,
    description: Option<String>,
    #[serde(default, deserialize_with = "de_opt_f64")]
    price: Option<f64>,
    rank: Option<u32>,
    #[serde(rename = "24hVolume", alias = "volume", default, deserialize_with = "de_opt_f64")]
    volume: Option<f64>,
    #[serde(default, deserialize_with = "de_opt_f64")]
    market_cap: Option<f64>,
    all_time_high: Option<RawAllTimeHigh>,
    number_of_markets: Option<u64>,
    number_of_exchanges: Option<u64>,

    // Forme v1 (à plat)
    approved_supply: Option<bool>,
    #[serde(default, deserialize_with = "de_opt_f64")]
    total_supply: Option<f64>,
    #[serde(default, deserialize_with = "de_opt_f64")]
    circulating_supply: Option<f64>,

    // Forme v2 (imbriquée)
    supply: Option<RawSupply>,

    #[serde(default)]
    links: Option<Vec<RawLink>>,
}

#[derive(Debug, Deserialize)]
struct RawAllTimeHigh {
    #[serde(default, deserialize_with = "de_opt_f64")]
    price: Option<f64>,
}

#[derive(Debug, Deserialize)]
struct RawSupply {
    confirmed: Option<bool>,
    #[serde(default, deserialize_with = "de_opt_f64")]
    total: Option<f64>,
    #[serde(default, deserialize_with = "de_opt_f64")]
    circulating: Option<f64>,
}

#[derive(Debug, Deserialize)]
struct RawLink {
    name: String,
    #[serde(rename = "type")]
    link_type: String,
    url: String,
}

#[derive(Debug, Deserialize)]
struct HistoryData {
    #[serde(default, deserialize_with = "de_opt_f64")]
    change: Option<f64>,
    history: Vec<RawHistoryPoint>,
}

#[derive(Debug, Deserialize)]
struct RawHistoryPoint {
    #[serde(default, deserialize_with = "de_opt_f64")]
    price: Option<f64>,
    timestamp: i64,
}

// ============================================================================
// Désérialiseurs personnalisés
// ============================================================================
// CONCEPT RUST : deserialize_with
// - Permet de contrôler la conversion d'un champ JSON
// - Ici : accepter "12.5", 12.5 ou null pour un même champ
// ============================================================================

fn de_opt_f64<'de, D>(deserializer: D) -> std::result::Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<serde_json::Value>::deserialize(deserializer)?;
    Ok(match value {
        Some(serde_json::Value::Number(n)) => n.as_f64(),
        Some(serde_json::Value::String(s)) => s.trim().parse::<f64>().ok(),
        _ => None,
    })
}

/// L'API v1 renvoie des ids numériques, la v2 des uuid en chaîne
fn de_id<'de, D>(deserializer: D) -> std::result::Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    match serde_json::Value::deserialize(deserializer)? {
        serde_json::Value::String(s) => Ok(s),
        serde_json::Value::Number(n) => Ok(n.to_string()),
        other => Err(serde::de::Error::custom(format!(
            "identifiant de crypto invalide : {}",
            other
        ))),
    }
}

// ============================================================================
// Client
// ============================================================================

/// Client HTTP pour l'API Coinranking
///
/// CONCEPT : Un seul reqwest::Client réutilisé
/// - Le client garde un pool de connexions
/// - Clone bon marché (Arc interne)
#[derive(Debug, Clone)]
pub struct CoinrankingClient {
    http: reqwest::Client,
    base_url: String,
    api_key: Option<String>,
}

impl CoinrankingClient {
    /// Crée le client
    ///
    /// # Arguments
    /// * `base_url` - Racine de l'API (ex: "https://api.coinranking.com/v2")
    /// * `api_key` - Clé envoyée dans l'en-tête `x-access-token`, optionnelle
    pub fn new(base_url: impl Into<String>, api_key: Option<String>) -> Result<Self> {
        debug!("Creating HTTP client");
        let http = reqwest::Client::builder()
            .user_agent(concat!("cryptoverse/", env!("CARGO_PKG_VERSION")))
            .timeout(REQUEST_TIMEOUT)
            .build()
            .context("Échec de la création du client HTTP")?;

        Ok(Self {
            http,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            api_key: api_key.filter(|key| !key.trim().is_empty()),
        })
    }

    /// Construit l'URL d'un endpoint
    fn build_url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }

    /// Envoie un GET et désérialise le champ `data` de la réponse
    ///
    /// CONCEPT RUST : Génériques avec trait bound
    /// - T: DeserializeOwned : n'importe quel type désérialisable sans emprunt
    /// - Le type est choisi par l'appelant (CoinsData, CoinData, HistoryData)
    async fn get_json<T: DeserializeOwned>(&self, path: &str, query: &[(&str, String)]) -> Result<T> {
        let url = self.build_url(path);
        debug!(url = %url, ?query, "Sending HTTP request to Coinranking");

        let mut request = self.http.get(&url).query(query);
        if let Some(key) = &self.api_key {
            request = request.header("x-access-token", key);
        }

        let response = request
            .send()
            .await
            .context("Échec de la requête HTTP vers Coinranking")?;

        let status = response.status();
        debug!(status = %status, "Received HTTP response");

        if !status.is_success() {
            error!(status = %status, url = %url, "Coinranking returned error status");
            anyhow::bail!("Coinranking a retourné une erreur : HTTP {}", status);
        }

        let envelope: Envelope<T> = response
            .json()
            .await
            .context("Échec du parsing JSON de la réponse Coinranking")?;

        unwrap_envelope(envelope)
    }
}

#[async_trait]
impl MarketDataSource for CoinrankingClient {
    #[instrument(skip(self))]
    async fn list_coins(&self, limit: usize) -> Result<Vec<CoinSummary>> {
        let data: CoinsData = self
            .get_json("coins", &[("limit", limit.to_string())])
            .await?;

        let coins = into_summaries(data);
        info!(coins = coins.len(), "Successfully fetched coin listing");
        Ok(coins)
    }

    #[instrument(skip(self))]
    async fn coin_detail(&self, coin_id: &str) -> Result<CoinDetail> {
        let data: CoinData = self.get_json(&format!("coin/{}", coin_id), &[]).await?;

        let detail = into_detail(data.coin);
        info!(coin = %detail.name, "Successfully fetched coin detail");
        Ok(detail)
    }

    #[instrument(skip(self, period), fields(period = %period))]
    async fn coin_history(&self, coin_id: &str, period: TimePeriod) -> Result<CoinHistory> {
        let data: HistoryData = self
            .get_json(
                &format!("coin/{}/history", coin_id),
                &[("timePeriod", period.to_query_param().to_string())],
            )
            .await?;

        let history = into_history(coin_id, period, data);
        info!(points = history.len(), "Successfully fetched coin history");
        Ok(history)
    }
}

// ============================================================================
// Conversion vers les modèles du domaine
// ============================================================================

/// Extrait `data` de l'enveloppe, ou l'erreur renvoyée par l'API
fn unwrap_envelope<T>(envelope: Envelope<T>) -> Result<T> {
    if let Some(status) = envelope.status.as_deref() {
        if status != "success" {
            let message = envelope.message.unwrap_or_else(|| status.to_string());
            error!(status = %status, message = %message, "Coinranking request failed");
            anyhow::bail!("Coinranking a refusé la requête : {}", message);
        }
    }

    envelope
        .data
        .context("Réponse Coinranking sans champ data")
}

fn into_summaries(data: CoinsData) -> Vec<CoinSummary> {
    data.coins
        .into_iter()
        .map(|raw| CoinSummary {
            id: raw.id,
            rank: raw.rank,
            name: raw.name,
            symbol: raw.symbol,
            icon_url: raw.icon_url,
            price: raw.price,
            market_cap: raw.market_cap,
            change: raw.change,
        })
        .collect()
}

/// Convertit une fiche brute, quelle que soit sa forme (v1 ou v2)
///
/// CONCEPT RUST : Option::or / or_else
/// - Prend la valeur à plat si présente, sinon celle de `supply`
fn into_detail(raw: RawCoinDetail) -> CoinDetail {
    let supply = raw.supply.as_ref();

    let approved_supply = raw
        .approved_supply
        .or_else(|| supply.and_then(|s| s.confirmed))
        .unwrap_or(false);
    let total_supply = raw.total_supply.or_else(|| supply.and_then(|s| s.total));
    let circulating_supply = raw
        .circulating_supply
        .or_else(|| supply.and_then(|s| s.circulating));

    let slug = raw
        .slug
        .filter(|slug| !slug.is_empty())
        .unwrap_or_else(|| raw.symbol.clone());

    let links = raw
        .links
        .unwrap_or_default()
        .into_iter()
        .map(|link| CoinLink {
            link_type: link.link_type,
            name: link.name,
            url: link.url,
        })
        .collect();

    CoinDetail {
        id: raw.id,
        name: raw.name,
        slug,
        description: raw.description,
        price: raw.price,
        rank: raw.rank,
        volume: raw.volume,
        market_cap: raw.market_cap,
        all_time_high: AllTimeHigh {
            price: raw.all_time_high.and_then(|ath| ath.price),
        },
        number_of_markets: raw.number_of_markets,
        number_of_exchanges: raw.number_of_exchanges,
        approved_supply,
        total_supply,
        circulating_supply,
        links,
    }
}

/// Convertit l'historique brut, en ignorant les points sans prix ou dont
/// le timestamp est hors de la plage de chrono
fn into_history(coin_id: &str, period: TimePeriod, data: HistoryData) -> CoinHistory {
    let total = data.history.len();
    let mut points = Vec::with_capacity(total);
    let mut missing_price = 0;
    let mut invalid_timestamp = 0;

    for raw in data.history {
        let Some(price) = raw.price else {
            missing_price += 1;
            continue;
        };

        let Some(datetime) = DateTime::from_timestamp(normalize_timestamp(raw.timestamp), 0) else {
            invalid_timestamp += 1;
            continue;
        };
        points.push(HistoryPoint::new(datetime, price));
    }

    if missing_price > 0 {
        warn!(skipped = missing_price, total, "Skipped history points without price");
    }
    if invalid_timestamp > 0 {
        warn!(skipped = invalid_timestamp, total, "Skipped history points with invalid timestamp");
    }

    CoinHistory::from_points(coin_id.to_string(), period, data.change, points)
}

/// L'API v1 donne des millisecondes, la v2 des secondes
fn normalize_timestamp(timestamp: i64) -> i64 {
    if timestamp > 10_000_000_000 {
        timestamp / 1000
    } else {
        timestamp
    }
}

// ============================================================================
// Tests unitaires
// ============================================================================
