// ============================================================================
// Vue liste : classement filtrable des cryptos
// ============================================================================
// Logique pure de la vue liste, testable sans terminal
//
// CONCEPTS RUST :
// 1. État explicite : ListViewState est passé aux fonctions, pas caché
// 2. Lifetimes : ListView<'a> emprunte les cryptos du cache (pas de copie)
// 3. Iterator chaining : filtre appliqué à chaque frappe
//
// RÈGLE : le filtre est TOUJOURS recalculé sur la liste complète du cache,
// jamais sur un résultat filtré précédent.
// ============================================================================

use crate::models::CoinSummary;
use crate::query::{QueryKey, QueryState, QueryStatus};

/// Taille de la liste en mode simplifié (intégré)
pub const SIMPLIFIED_PAGE_SIZE: usize = 10;

/// Taille de la liste complète
pub const FULL_PAGE_SIZE: usize = 100;

/// État local de la vue liste
///
/// CONCEPT : Pas de persistance
/// - Le terme cherché est remis à vide quand on quitte la vue (reset)
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ListViewState {
    /// Mode simplifié : 10 cryptos, pas de recherche
    pub simplified: bool,

    /// Terme cherché (vide = pas de filtre)
    pub search_term: String,

    /// Saisie de recherche active (touche '/')
    pub editing_search: bool,

    /// Index de la carte sélectionnée dans la liste FILTRÉE
    pub selected: usize,
}

impl ListViewState {
    pub fn new(simplified: bool) -> Self {
        Self {
            simplified,
            ..Self::default()
        }
    }

    /// Nombre de cryptos demandées à l'API
    pub fn page_size(&self) -> usize {
        if self.simplified {
            SIMPLIFIED_PAGE_SIZE
        } else {
            FULL_PAGE_SIZE
        }
    }

    /// Clé de la requête de classement, dérivée de l'état
    pub fn key(&self) -> QueryKey {
        QueryKey::coins(self.page_size())
    }

    /// La barre de recherche n'existe pas en mode simplifié
    pub fn shows_search(&self) -> bool {
        !self.simplified
    }

    // ========================================================================
    // Recherche
    // ========================================================================

    pub fn start_search(&mut self) {
        if self.shows_search() {
            self.editing_search = true;
        }
    }

    /// Termine la saisie en gardant le filtre
    pub fn stop_search(&mut self) {
        self.editing_search = false;
    }

    /// Ajoute un caractère au terme cherché
    pub fn push_search_char(&mut self, c: char) {
        if self.shows_search() {
            self.search_term.push(c);
            self.selected = 0;
        }
    }

    /// Supprime le dernier caractère du terme cherché
    pub fn pop_search_char(&mut self) {
        if self.search_term.pop().is_some() {
            self.selected = 0;
        }
    }

    /// Vide le terme cherché : la liste complète réapparaît
    pub fn clear_search(&mut self) {
        self.search_term.clear();
        self.editing_search = false;
        self.selected = 0;
    }

    /// Démontage de la vue : l'état transitoire est oublié
    pub fn reset(&mut self) {
        self.clear_search();
    }

    // ========================================================================
    // Navigation
    // ========================================================================

    /// CONCEPT RUST : Saturating arithmetic
    /// - saturating_sub() ne descend pas en dessous de 0
    pub fn select_previous(&mut self) {
        self.selected = self.selected.saturating_sub(1);
    }

    /// `visible` : nombre de cartes actuellement affichées
    pub fn select_next(&mut self, visible: usize) {
        let max_index = visible.saturating_sub(1);
        self.selected = (self.selected + 1).min(max_index);
    }
}

/// Filtre les cryptos dont le nom contient `search_term` (insensible à la casse)
///
/// CONCEPT RUST : Vec<&'a T>
/// - On renvoie des références vers la liste du cache
/// - La liste du cache n'est jamais modifiée
pub fn filter_coins<'a>(coins: &'a [CoinSummary], search_term: &str) -> Vec<&'a CoinSummary> {
    let needle = search_term.to_lowercase();
    coins
        .iter()
        .filter(|coin| coin.name_matches(&needle))
        .collect()
}

/// Ce que la vue liste doit afficher
#[derive(Debug, PartialEq)]
pub enum ListView<'a> {
    /// Premier chargement en cours : indicateur, pas de grille
    Loading,

    /// Échec sans aucune donnée en cache
    Failed { message: String },

    /// Grille de cartes (éventuellement vide)
    Ready {
        cards: Vec<&'a CoinSummary>,
        /// None quand la grille est vide
        selected: Option<usize>,
        /// Nombre total de cryptos avant filtre
        total: usize,
        /// Échec de la dernière revalidation, les cartes restent affichées
        refresh_error: Option<&'a str>,
    },
}

/// Dérive l'affichage à partir de l'état local et de l'état de la requête
///
/// Des données en cache priment toujours sur le statut de la requête.
pub fn derive<'a>(state: &ListViewState, query: &'a QueryState<Vec<CoinSummary>>) -> ListView<'a> {
    let status = query.status();

    let Some(coins) = query.data() else {
        return match status {
            QueryStatus::Error => ListView::Failed {
                message: query.error.clone().unwrap_or_default(),
            },
            QueryStatus::Idle | QueryStatus::Fetching | QueryStatus::Ready => ListView::Loading,
        };
    };

    let cards = filter_coins(coins, &state.search_term);
    let selected = if cards.is_empty() {
        None
    } else {
        Some(state.selected.min(cards.len() - 1))
    };

    ListView::Ready {
        cards,
        selected,
        total: coins.len(),
        refresh_error: match status {
            QueryStatus::Error => query.error.as_deref(),
            _ => None,
        },
    }
}

/// Identifiant de la crypto sous la sélection, pour ouvrir la vue détail
pub fn selected_coin_id(state: &ListViewState, query: &QueryState<Vec<CoinSummary>>) -> Option<String> {
    match derive(state, query) {
        ListView::Ready {
            cards,
            selected: Some(index),
            ..
        } => cards.get(index).map(|coin| coin.id.clone()),
        _ => None,
    }
}

// ============================================================================
// Tests unitaires
// ============================================================================
