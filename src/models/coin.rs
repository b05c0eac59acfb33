// ============================================================================
// Structures : CoinSummary, CoinDetail
// ============================================================================
// Représente une cryptomonnaie telle que renvoyée par Coinranking
//
// CONCEPTS RUST :
// 1. Option<f64> : l'API renvoie des montants nullables (supply inconnue, etc.)
// 2. Données immuables : le cache possède ces valeurs, les vues les lisent
// 3. String vs &str : les structures possèdent leurs textes (String)
// ============================================================================

use serde::{Deserialize, Serialize};

/// Résumé d'une crypto dans le classement (une carte de la vue liste)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CoinSummary {
    /// Identifiant Coinranking (uuid), utilisé pour la vue détail
    pub id: String,

    /// Position dans le classement
    pub rank: u32,

    /// Nom complet (ex: "Bitcoin")
    pub name: String,

    /// Symbole (ex: "BTC")
    pub symbol: String,

    /// URL de l'icône
    pub icon_url: Option<String>,

    /// Prix en USD
    pub price: Option<f64>,

    /// Capitalisation en USD
    pub market_cap: Option<f64>,

    /// Variation sur 24h en pourcentage
    pub change: Option<f64>,
}

impl CoinSummary {
    /// Titre de la carte : "1. Bitcoin (BTC)"
    pub fn title(&self) -> String {
        if self.symbol.is_empty() {
            return format!("{}. {}", self.rank, self.name);
        }
        format!("{}. {} ({})", self.rank, self.name, self.symbol)
    }

    /// Vérifie si le nom contient le terme cherché (insensible à la casse)
    ///
    /// CONCEPT : `needle_lower` est déjà en minuscules
    /// - L'appelant convertit le terme une seule fois pour toute la liste
    pub fn name_matches(&self, needle_lower: &str) -> bool {
        self.name.to_lowercase().contains(needle_lower)
    }

    /// Retourne true si la crypto est en hausse sur 24h
    pub fn is_positive(&self) -> bool {
        self.change.map(|c| c >= 0.0).unwrap_or(false)
    }
}

/// Record du prix le plus haut
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AllTimeHigh {
    pub price: Option<f64>,
}

/// Lien externe (site web, explorer, réseaux sociaux...)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CoinLink {
    /// Catégorie du lien (ex: "website", "reddit")
    pub link_type: String,

    /// Libellé affiché
    pub name: String,

    pub url: String,
}

/// Fiche complète d'une crypto (vue détail)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CoinDetail {
    pub id: String,
    pub name: String,

    /// Slug lisible (ex: "bitcoin-btc"), à défaut le symbole
    pub slug: String,

    /// Description en HTML, à interpréter avec un RichTextRenderer
    pub description: Option<String>,

    pub price: Option<f64>,
    pub rank: Option<u32>,

    /// Volume échangé sur 24h en USD
    pub volume: Option<f64>,

    pub market_cap: Option<f64>,
    pub all_time_high: AllTimeHigh,
    pub number_of_markets: Option<u64>,
    pub number_of_exchanges: Option<u64>,

    /// Supply confirmée par Coinranking
    pub approved_supply: bool,

    pub total_supply: Option<f64>,
    pub circulating_supply: Option<f64>,

    /// Liens externes, dans l'ordre de l'API
    pub links: Vec<CoinLink>,
}

// ============================================================================
// Tests unitaires
// ============================================================================
