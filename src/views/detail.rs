// ============================================================================
// Vue détail : fiche d'une crypto
// ============================================================================
// Deux requêtes indépendantes alimentent la vue :
// - la fiche (clé CoinDetail { coin_id })
// - l'historique (clé CoinHistory { coin_id, period })
//
// Aucune n'attend l'autre : la fiche peut arriver avant ou après
// l'historique. Tant que la fiche manque, la vue entière est en chargement ;
// l'état de l'historique ne concerne que le panneau du graphique.
// ============================================================================

use crate::models::format::{self, MISSING};
use crate::models::{CoinDetail, CoinHistory, CoinLink, TimePeriod};
use crate::query::{QueryKey, QueryState, QueryStatus};
use crate::views::rich_text::{RichLine, RichTextRenderer};

/// État local de la vue détail
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DetailViewState {
    /// Identifiant de la crypto affichée
    pub coin_id: String,

    /// Période sélectionnée (7D par défaut)
    pub period: TimePeriod,
}

impl DetailViewState {
    pub fn new(coin_id: impl Into<String>) -> Self {
        Self {
            coin_id: coin_id.into(),
            period: TimePeriod::default(),
        }
    }

    pub fn detail_key(&self) -> QueryKey {
        QueryKey::coin_detail(&self.coin_id)
    }

    pub fn history_key(&self) -> QueryKey {
        QueryKey::coin_history(&self.coin_id, self.period)
    }

    /// Clés dont dépend la vue (pour filtrer les notifications)
    pub fn keys(&self) -> [QueryKey; 2] {
        [self.detail_key(), self.history_key()]
    }

    pub fn set_period(&mut self, period: TimePeriod) {
        self.period = period;
    }

    pub fn next_period(&mut self) {
        self.period = self.period.next();
    }

    pub fn previous_period(&mut self) {
        self.period = self.period.previous();
    }
}

// ============================================================================
// Panneaux de statistiques
// ============================================================================

/// Valeur d'une ligne de statistique
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StatValue {
    /// Montant ou compteur déjà abrégé
    Text(String),

    /// Indicateur oui/non (✔ / ⛔)
    Check(bool),
}

/// Une ligne d'un panneau : titre + valeur
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Statistic {
    pub title: &'static str,
    pub value: StatValue,
}

impl Statistic {
    fn text(title: &'static str, value: String) -> Self {
        Self {
            title,
            value: StatValue::Text(value),
        }
    }
}

fn count(value: Option<u64>) -> String {
    format::compact_opt(value.map(|n| n as f64))
}

/// Panneau "valeur" : prix, rang, volume, capitalisation, record
pub fn value_statistics(detail: &CoinDetail) -> Vec<Statistic> {
    vec![
        Statistic::text("Price to USD", format::usd(detail.price)),
        Statistic::text("Rank", count(detail.rank.map(u64::from))),
        Statistic::text("24h Volume", format::usd(detail.volume)),
        Statistic::text("Market Cap", format::usd(detail.market_cap)),
        Statistic::text("All-time-high (daily avg.)", format::usd(detail.all_time_high.price)),
    ]
}

/// Panneau "général" : marchés, plateformes, supply
pub fn generic_statistics(detail: &CoinDetail) -> Vec<Statistic> {
    vec![
        Statistic::text("Number Of Markets", count(detail.number_of_markets)),
        Statistic::text("Number Of Exchanges", count(detail.number_of_exchanges)),
        Statistic {
            title: "Approved Supply",
            value: StatValue::Check(detail.approved_supply),
        },
        Statistic::text("Total Supply", format::compact_opt(detail.total_supply)),
        Statistic::text("Circulating Supply", format::compact_opt(detail.circulating_supply)),
    ]
}

// ============================================================================
// Graphique
// ============================================================================

/// Ce que le panneau du graphique doit afficher
#[derive(Debug, PartialEq)]
pub enum ChartState<'a> {
    Loading,
    Failed { message: String },
    Ready(&'a CoinHistory),
}

/// Dérive l'état du graphique pour la période courante
///
/// La série n'est affichée que si elle correspond exactement à la crypto et
/// à la période sélectionnées.
pub fn chart_state<'a>(state: &DetailViewState, history: &'a QueryState<CoinHistory>) -> ChartState<'a> {
    match history.data() {
        Some(series) if series.coin_id == state.coin_id && series.period == state.period => {
            ChartState::Ready(series)
        }
        _ => match history.status() {
            QueryStatus::Error => ChartState::Failed {
                message: history.error.clone().unwrap_or_default(),
            },
            QueryStatus::Idle | QueryStatus::Fetching | QueryStatus::Ready => ChartState::Loading,
        },
    }
}

// ============================================================================
// Modèle complet de la vue
// ============================================================================

/// Tout ce que le rendu de la fiche doit afficher
#[derive(Debug, PartialEq)]
pub struct DetailModel<'a> {
    /// "Bitcoin (bitcoin-btc) Price"
    pub heading: String,

    pub name: &'a str,
    pub period: TimePeriod,

    /// Prix courant abrégé, pour le titre du graphique
    pub current_price: String,

    pub value_stats: Vec<Statistic>,
    pub generic_stats: Vec<Statistic>,

    /// Description interprétée (vide si absente)
    pub description: Vec<RichLine>,

    pub links: &'a [CoinLink],
    pub chart: ChartState<'a>,
}

impl DetailModel<'_> {
    /// Variation sur la période affichée, si la série est chargée
    pub fn period_change(&self) -> String {
        match &self.chart {
            ChartState::Ready(history) => format::percent(history.change),
            _ => MISSING.to_string(),
        }
    }
}

/// Ce que la vue détail doit afficher
#[derive(Debug, PartialEq)]
pub enum DetailView<'a> {
    /// Fiche pas encore reçue
    Loading,

    /// Fiche en échec, sans donnée en cache
    Failed { message: String },

    Ready(DetailModel<'a>),
}

/// Dérive l'affichage de la fiche à partir des deux requêtes
///
/// CONCEPT RUST : Pattern matching sur Option
/// - Aucun champ de la fiche n'est lu tant que `detail.data()` vaut None
pub fn derive<'a>(
    state: &DetailViewState,
    detail: &'a QueryState<CoinDetail>,
    history: &'a QueryState<CoinHistory>,
    renderer: &dyn RichTextRenderer,
) -> DetailView<'a> {
    let Some(coin) = detail.data() else {
        return match detail.status() {
            QueryStatus::Error => DetailView::Failed {
                message: detail.error.clone().unwrap_or_default(),
            },
            QueryStatus::Idle | QueryStatus::Fetching | QueryStatus::Ready => DetailView::Loading,
        };
    };

    let description = coin
        .description
        .as_deref()
        .map(|markup| renderer.render(markup))
        .unwrap_or_default();

    DetailView::Ready(DetailModel {
        heading: format!("{} ({}) Price", coin.name, coin.slug),
        name: &coin.name,
        period: state.period,
        current_price: format::compact_opt(coin.price),
        value_stats: value_statistics(coin),
        generic_stats: generic_statistics(coin),
        description,
        links: &coin.links,
        chart: chart_state(state, history),
    })
}

// ============================================================================
// Tests unitaires
// ============================================================================
