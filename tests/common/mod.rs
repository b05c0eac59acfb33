// ============================================================================
// Fausse source de données de marché pour les tests d'intégration
// ============================================================================
// - Compte les appels par opération
// - Des "portes" (oneshot) retiennent une réponse jusqu'à ce que le test
//   la libère : on contrôle l'ordre d'arrivée des réponses
// ============================================================================

#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Mutex;

use anyhow::{bail, Result};
use async_trait::async_trait;
use chrono::{TimeZone, Utc};
use tokio::sync::oneshot;

use cryptoverse::api::MarketDataSource;
use cryptoverse::models::{
    AllTimeHigh, CoinDetail, CoinHistory, CoinLink, CoinSummary, HistoryPoint, TimePeriod,
};

/// Taille du classement complet servi par la fausse source
pub const MARKET_SIZE: usize = 100;

pub struct FakeMarket {
    coins: Vec<CoinSummary>,
    fail_detail: bool,
    fail_list: AtomicBool,
    list_calls: AtomicUsize,
    detail_calls: AtomicUsize,
    history_calls: Mutex<Vec<(String, TimePeriod)>>,
    detail_gate: Mutex<Option<oneshot::Receiver<()>>>,
    history_gates: Mutex<HashMap<TimePeriod, oneshot::Receiver<()>>>,
}

impl FakeMarket {
    pub fn new() -> Self {
        Self {
            coins: (1..=MARKET_SIZE as u32).map(fake_coin).collect(),
            fail_detail: false,
            fail_list: AtomicBool::new(false),
            list_calls: AtomicUsize::new(0),
            detail_calls: AtomicUsize::new(0),
            history_calls: Mutex::new(Vec::new()),
            detail_gate: Mutex::new(None),
            history_gates: Mutex::new(HashMap::new()),
        }
    }

    /// Toute demande de fiche échoue (erreur réseau simulée)
    pub fn failing_detail(mut self) -> Self {
        self.fail_detail = true;
        self
    }

    /// Les prochains classements échouent (ou réussissent à nouveau)
    pub fn set_list_failing(&self, failing: bool) {
        self.fail_list.store(failing, Ordering::SeqCst);
    }

    /// Retient la prochaine fiche jusqu'à l'envoi sur le sender
    pub fn gate_detail(&self) -> oneshot::Sender<()> {
        let (tx, rx) = oneshot::channel();
        *self.detail_gate.lock().unwrap() = Some(rx);
        tx
    }

    /// Retient l'historique de `period` jusqu'à l'envoi sur le sender
    pub fn gate_history(&self, period: TimePeriod) -> oneshot::Sender<()> {
        let (tx, rx) = oneshot::channel();
        self.history_gates.lock().unwrap().insert(period, rx);
        tx
    }

    pub fn all_coins(&self) -> &[CoinSummary] {
        &self.coins
    }

    pub fn list_calls(&self) -> usize {
        self.list_calls.load(Ordering::SeqCst)
    }

    pub fn detail_calls(&self) -> usize {
        self.detail_calls.load(Ordering::SeqCst)
    }

    pub fn history_calls(&self) -> Vec<(String, TimePeriod)> {
        self.history_calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl MarketDataSource for FakeMarket {
    async fn list_coins(&self, limit: usize) -> Result<Vec<CoinSummary>> {
        self.list_calls.fetch_add(1, Ordering::SeqCst);
        if self.fail_list.load(Ordering::SeqCst) {
            bail!("simulated rate limit");
        }
        Ok(self.coins.iter().take(limit).cloned().collect())
    }

    async fn coin_detail(&self, coin_id: &str) -> Result<CoinDetail> {
        self.detail_calls.fetch_add(1, Ordering::SeqCst);

        let gate = self.detail_gate.lock().unwrap().take();
        if let Some(gate) = gate {
            let _ = gate.await;
        }

        if self.fail_detail {
            bail!("simulated network error");
        }
        Ok(fake_detail(coin_id))
    }

    async fn coin_history(&self, coin_id: &str, period: TimePeriod) -> Result<CoinHistory> {
        self.history_calls
            .lock()
            .unwrap()
            .push((coin_id.to_string(), period));

        let gate = self.history_gates.lock().unwrap().remove(&period);
        if let Some(gate) = gate {
            let _ = gate.await;
        }

        Ok(fake_history(coin_id, period))
    }
}

/// Un nom sur dix contient "Bit", un sur sept "BIT" en majuscules
fn fake_coin(rank: u32) -> CoinSummary {
    let name = if rank % 10 == 1 {
        format!("Bitcoin {}", rank)
    } else if rank % 7 == 0 {
        format!("WrappedBIT {}", rank)
    } else {
        format!("Coin {}", rank)
    };

    CoinSummary {
        id: format!("coin-{}", rank),
        rank,
        name,
        symbol: format!("C{}", rank),
        icon_url: None,
        price: Some(1000.0 / rank as f64),
        market_cap: Some(1e9 / rank as f64),
        change: Some(if rank % 2 == 0 { -1.5 } else { 2.25 }),
    }
}

pub fn fake_detail(coin_id: &str) -> CoinDetail {
    CoinDetail {
        id: coin_id.to_string(),
        name: "Bitcoin".to_string(),
        slug: "bitcoin-btc".to_string(),
        description: Some("<h3>What is Bitcoin?</h3><p>Peer-to-peer cash.</p>".to_string()),
        price: Some(68_123.45),
        rank: Some(1),
        volume: Some(3.1e10),
        market_cap: Some(1.34e12),
        all_time_high: AllTimeHigh {
            price: Some(73_750.0),
        },
        number_of_markets: Some(10_432),
        number_of_exchanges: Some(178),
        approved_supply: true,
        total_supply: Some(21_000_000.0),
        circulating_supply: Some(19_690_000.0),
        links: vec![CoinLink {
            link_type: "website".to_string(),
            name: "bitcoin.org".to_string(),
            url: "https://bitcoin.org".to_string(),
        }],
    }
}

/// Série dont les prix dépendent de la période (pour la reconnaître)
pub fn fake_history(coin_id: &str, period: TimePeriod) -> CoinHistory {
    let base = TimePeriod::ALL
        .iter()
        .position(|p| *p == period)
        .unwrap_or_default() as f64
        * 1000.0;

    let points = (0..5)
        .map(|i| {
            let ts = Utc.with_ymd_and_hms(2024, 3, 1 + i, 0, 0, 0).unwrap();
            HistoryPoint::new(ts, base + 100.0 * i as f64 + 1.0)
        })
        .collect();

    CoinHistory::from_points(coin_id.to_string(), period, Some(3.5), points)
}
