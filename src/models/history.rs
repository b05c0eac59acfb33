// ============================================================================
// Structures : TimePeriod, HistoryPoint, CoinHistory
// ============================================================================
// Historique des prix d'une crypto sur une fenêtre de temps sélectionnable
//
// CONCEPTS RUST :
// 1. Enum Copy : TimePeriod est une petite valeur copiée implicitement
// 2. DateTime<Utc> : timestamps des points de l'historique
// 3. Vec<T> trié : la série est toujours en ordre chronologique croissant
// ============================================================================

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Fenêtre de temps de l'historique des prix
///
/// CONCEPT : Sélecteur de période (touches h / l dans la vue détail)
/// - Chaque valeur correspond à une requête d'historique différente
/// - L'ordre des variants est l'ordre d'affichage du sélecteur
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TimePeriod {
    /// 3 heures
    ThreeHours,
    /// 1 jour
    OneDay,
    /// 7 jours
    SevenDays,
    /// 1 mois
    OneMonth,
    /// 3 mois
    ThreeMonths,
    /// 6 mois
    SixMonths,
    /// 1 an
    OneYear,
    /// 3 ans
    ThreeYears,
    /// 5 ans
    FiveYears,
}

impl TimePeriod {
    /// Toutes les périodes, dans l'ordre du sélecteur
    pub const ALL: [TimePeriod; 9] = [
        TimePeriod::ThreeHours,
        TimePeriod::OneDay,
        TimePeriod::SevenDays,
        TimePeriod::OneMonth,
        TimePeriod::ThreeMonths,
        TimePeriod::SixMonths,
        TimePeriod::OneYear,
        TimePeriod::ThreeYears,
        TimePeriod::FiveYears,
    ];

    /// Retourne le label pour l'affichage
    pub fn label(&self) -> &'static str {
        match self {
            TimePeriod::ThreeHours => "3H",
            TimePeriod::OneDay => "1D",
            TimePeriod::SevenDays => "7D",
            TimePeriod::OneMonth => "1M",
            TimePeriod::ThreeMonths => "3M",
            TimePeriod::SixMonths => "6M",
            TimePeriod::OneYear => "1Y",
            TimePeriod::ThreeYears => "3Y",
            TimePeriod::FiveYears => "5Y",
        }
    }

    /// Convertit la période en valeur du paramètre `timePeriod` de Coinranking
    ///
    /// L'API attend "24h" et "30d" là où le sélecteur affiche 1D et 1M.
    pub fn to_query_param(&self) -> &'static str {
        match self {
            TimePeriod::ThreeHours => "3h",
            TimePeriod::OneDay => "24h",
            TimePeriod::SevenDays => "7d",
            TimePeriod::OneMonth => "30d",
            TimePeriod::ThreeMonths => "3m",
            TimePeriod::SixMonths => "6m",
            TimePeriod::OneYear => "1y",
            TimePeriod::ThreeYears => "3y",
            TimePeriod::FiveYears => "5y",
        }
    }

    /// Format chrono des labels de l'axe X du graphique
    pub fn axis_format(&self) -> &'static str {
        match self {
            TimePeriod::ThreeHours | TimePeriod::OneDay => "%H:%M",
            TimePeriod::SevenDays | TimePeriod::OneMonth | TimePeriod::ThreeMonths => "%d/%m",
            TimePeriod::SixMonths | TimePeriod::OneYear => "%b %Y",
            TimePeriod::ThreeYears | TimePeriod::FiveYears => "%Y",
        }
    }

    /// Retourne la période suivante (cycle)
    pub fn next(&self) -> TimePeriod {
        let index = self.index();
        Self::ALL[(index + 1) % Self::ALL.len()]
    }

    /// Retourne la période précédente (cycle)
    pub fn previous(&self) -> TimePeriod {
        let index = self.index();
        Self::ALL[(index + Self::ALL.len() - 1) % Self::ALL.len()]
    }

    fn index(&self) -> usize {
        Self::ALL
            .iter()
            .position(|period| period == self)
            .unwrap_or_default()
    }
}

impl Default for TimePeriod {
    /// Période par défaut : 7 jours
    fn default() -> Self {
        TimePeriod::SevenDays
    }
}

impl std::fmt::Display for TimePeriod {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

/// Un point de l'historique : prix à un instant donné
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistoryPoint {
    pub timestamp: DateTime<Utc>,
    pub price: f64,
}

impl HistoryPoint {
    pub fn new(timestamp: DateTime<Utc>, price: f64) -> Self {
        Self { timestamp, price }
    }
}

/// Série de prix d'une crypto pour une période donnée
///
/// CONCEPT RUST : Ownership
/// - CoinHistory possède ses points
/// - Le cache la partage ensuite via Arc, sans copie
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CoinHistory {
    /// Identifiant de la crypto
    pub coin_id: String,

    /// Période demandée
    pub period: TimePeriod,

    /// Variation sur la période, en pourcentage
    pub change: Option<f64>,

    /// Points triés par timestamp croissant
    pub points: Vec<HistoryPoint>,
}

impl CoinHistory {
    /// Crée une série à partir de points dans un ordre quelconque
    ///
    /// Coinranking renvoie les points du plus récent au plus ancien,
    /// on les remet dans l'ordre chronologique.
    pub fn from_points(
        coin_id: String,
        period: TimePeriod,
        change: Option<f64>,
        mut points: Vec<HistoryPoint>,
    ) -> Self {
        points.sort_by_key(|point| point.timestamp);
        Self {
            coin_id,
            period,
            change,
            points,
        }
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Bornes (min, max) des prix, None si la série est vide
    ///
    /// CONCEPT RUST : fold pour calculer min et max en un seul passage
    pub fn price_bounds(&self) -> Option<(f64, f64)> {
        if self.points.is_empty() {
            return None;
        }

        Some(self.points.iter().fold((f64::MAX, f64::MIN), |(min, max), point| {
            (min.min(point.price), max.max(point.price))
        }))
    }
}

// ============================================================================
// Tests unitaires
// ============================================================================
