// ============================================================================
// Structure : App
// ============================================================================
// Gère l'état global de l'application TUI
//
// CONCEPTS RUST :
// 1. State Management : centraliser l'état dans une seule structure
// 2. Mutabilité contrôlée : &mut self pour modifier l'état
// 3. Enums pour state machines : un seul écran actif à la fois
//
// PATTERN : "Application State"
// - Le rendu lit App et demande ses données au cache (MarketQueries)
// - Les touches modifient App ; les clés de requête en sont dérivées
// - Les notifications du cache ne redessinent que si la vue en dépend
// ============================================================================

use tracing::{debug, info};

use crate::query::{MarketQueries, QueryKey};
use crate::ui::events::{
    get_char_from_event, is_backspace_event, is_down_event, is_enter_event, is_escape_event,
    is_interrupt_event, is_next_period_event, is_previous_period_event, is_quit_event,
    is_refetch_event, is_search_event, is_up_event, Event,
};
use crate::views::list;
use crate::views::{DetailViewState, ListViewState};

/// Écrans de l'application
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Screen {
    /// Classement des cryptos
    List,

    /// Fiche d'une crypto
    Detail,
}

/// État principal de l'application
pub struct App {
    /// Indique si l'application doit continuer à tourner
    pub running: bool,

    /// Écran actuellement affiché
    pub screen: Screen,

    /// État local de la vue liste
    pub list: ListViewState,

    /// État local de la vue détail (Some seulement sur l'écran Detail)
    pub detail: Option<DetailViewState>,

    /// Indique si l'utilisateur a demandé à quitter (attend confirmation)
    /// CONCEPT : Two-step quit pour éviter les sorties accidentelles
    /// - Première pression de 'q' : confirm_quit = true
    /// - Deuxième pression de 'q' : running = false (quit réel)
    /// - N'importe quelle autre touche : annulation
    pub confirm_quit: bool,

    /// L'écran doit être redessiné au prochain tour de boucle
    needs_redraw: bool,
}

impl App {
    /// Démarre sur la vue liste
    pub fn new(simplified: bool) -> Self {
        Self {
            running: true,
            screen: Screen::List,
            list: ListViewState::new(simplified),
            detail: None,
            confirm_quit: false,
            needs_redraw: true,
        }
    }

    /// Démarre directement sur la fiche d'une crypto (--coin)
    pub fn with_coin(simplified: bool, coin_id: impl Into<String>) -> Self {
        let mut app = Self::new(simplified);
        app.open_detail(coin_id);
        app
    }

    pub fn quit(&mut self) {
        self.running = false;
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    // ========================================================================
    // Navigation entre écrans
    // ========================================================================

    /// Ouvre la fiche d'une crypto
    ///
    /// La vue liste est démontée : son terme de recherche est oublié.
    pub fn open_detail(&mut self, coin_id: impl Into<String>) {
        let coin_id = coin_id.into();
        info!(coin_id = %coin_id, "Opening detail view");

        self.list.reset();
        self.detail = Some(DetailViewState::new(coin_id));
        self.screen = Screen::Detail;
        self.mark_dirty();
    }

    /// Revient au classement
    pub fn back_to_list(&mut self) {
        debug!("Back to list view");
        self.detail = None;
        self.screen = Screen::List;
        self.mark_dirty();
    }

    pub fn is_on_list(&self) -> bool {
        self.screen == Screen::List
    }

    pub fn is_on_detail(&self) -> bool {
        self.screen == Screen::Detail
    }

    /// Saisie de recherche en cours (les touches deviennent du texte)
    pub fn is_searching(&self) -> bool {
        self.is_on_list() && self.list.editing_search
    }

    // ========================================================================
    // Dépendances de la vue affichée
    // ========================================================================

    /// Clés de requête dont dépend l'écran affiché
    pub fn active_keys(&self) -> Vec<QueryKey> {
        match (&self.screen, &self.detail) {
            (Screen::Detail, Some(detail)) => detail.keys().to_vec(),
            _ => vec![self.list.key()],
        }
    }

    /// Vérifie si une requête terminée concerne l'écran affiché
    ///
    /// CONCEPT : Re-render sélectif
    /// - Une réponse tardive pour une ancienne période ne redessine rien
    pub fn is_dependent(&self, key: &QueryKey) -> bool {
        self.active_keys().iter().any(|active| active == key)
    }

    /// Relance les requêtes de l'écran affiché (touche 'r')
    pub fn refetch_active(&self, queries: &MarketQueries) {
        for key in self.active_keys() {
            queries.refetch(&key);
        }
    }

    // ========================================================================
    // Redessin
    // ========================================================================

    pub fn mark_dirty(&mut self) {
        self.needs_redraw = true;
    }

    /// Consomme le besoin de redessin
    pub fn take_redraw(&mut self) -> bool {
        std::mem::take(&mut self.needs_redraw)
    }

    // ========================================================================
    // Quit en deux temps
    // ========================================================================

    pub fn request_quit(&mut self) {
        self.confirm_quit = true;
    }

    pub fn cancel_quit(&mut self) {
        self.confirm_quit = false;
    }

    pub fn is_awaiting_quit_confirmation(&self) -> bool {
        self.confirm_quit
    }

    // ========================================================================
    // Gestion des événements
    // ========================================================================

    /// Traite un événement et met à jour l'état de l'application
    ///
    /// CONCEPT RUST : Pattern matching avec guards
    /// - L'ordre des branches compte : la saisie de recherche capture les
    ///   caractères avant les raccourcis
    pub fn handle_event(&mut self, event: &Event, queries: &MarketQueries) {
        match event {
            Event::Key(_) if is_interrupt_event(event) => {
                info!("Interrupted by user");
                self.quit();
            }

            Event::Key(_) => {
                self.handle_key(event, queries);
                self.mark_dirty();
            }

            Event::Resize => self.mark_dirty(),

            Event::Tick | Event::Error => {}
        }
    }

    fn handle_key(&mut self, event: &Event, queries: &MarketQueries) {
        if self.is_searching() {
            self.handle_search_key(event);
            return;
        }

        if is_quit_event(event) {
            if self.is_awaiting_quit_confirmation() {
                info!("User confirmed quit");
                self.quit();
            } else {
                info!("User requested quit (awaiting confirmation)");
                self.request_quit();
            }
            return;
        }

        // Toute autre touche annule la confirmation
        self.cancel_quit();

        if is_refetch_event(event) {
            self.refetch_active(queries);
            return;
        }

        match self.screen {
            Screen::List => self.handle_list_key(event, queries),
            Screen::Detail => self.handle_detail_key(event),
        }
    }

    fn handle_search_key(&mut self, event: &Event) {
        if is_escape_event(event) {
            self.list.clear_search();
        } else if is_enter_event(event) {
            self.list.stop_search();
        } else if is_backspace_event(event) {
            self.list.pop_search_char();
        } else if let Some(c) = get_char_from_event(event) {
            self.list.push_search_char(c);
        }
    }

    fn handle_list_key(&mut self, event: &Event, queries: &MarketQueries) {
        let coins = queries.coins(self.list.page_size());

        if is_search_event(event) {
            self.list.start_search();
        } else if is_escape_event(event) {
            self.list.clear_search();
        } else if is_up_event(event) {
            self.list.select_previous();
        } else if is_down_event(event) {
            let visible = coins
                .data()
                .map(|all| list::filter_coins(all, &self.list.search_term).len())
                .unwrap_or(0);
            self.list.select_next(visible);
        } else if is_enter_event(event) {
            if let Some(coin_id) = list::selected_coin_id(&self.list, &coins) {
                self.open_detail(coin_id);
            }
        }
    }

    fn handle_detail_key(&mut self, event: &Event) {
        if is_escape_event(event) {
            self.back_to_list();
            return;
        }

        let Some(detail) = self.detail.as_mut() else {
            return;
        };

        if is_next_period_event(event) {
            detail.next_period();
            debug!(period = %detail.period, "Period changed");
        } else if is_previous_period_event(event) {
            detail.previous_period();
            debug!(period = %detail.period, "Period changed");
        }
    }
}

// ============================================================================
// Tests unitaires
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::TimePeriod;

    #[test]
    fn test_app_creation() {
        let app = App::new(false);
        assert!(app.is_running());
        assert!(app.is_on_list());
        assert!(app.detail.is_none());
        assert_eq!(app.active_keys(), vec![QueryKey::coins(100)]);
    }

    #[test]
    fn test_app_with_coin() {
        let app = App::with_coin(true, "bitcoin");
        assert!(app.is_on_detail());
        assert_eq!(
            app.active_keys(),
            vec![
                QueryKey::coin_detail("bitcoin"),
                QueryKey::coin_history("bitcoin", TimePeriod::SevenDays)
            ]
        );
    }

    #[test]
    fn test_open_detail_resets_search() {
        let mut app = App::new(false);
        app.list.start_search();
        app.list.push_search_char('b');

        app.open_detail("bitcoin");
        assert!(app.list.search_term.is_empty());

        app.back_to_list();
        assert!(app.is_on_list());
        assert!(app.detail.is_none());
    }

    #[test]
    fn test_is_dependent_follows_current_period() {
        let mut app = App::with_coin(false, "bitcoin");
        let old_key = QueryKey::coin_history("bitcoin", TimePeriod::SevenDays);
        assert!(app.is_dependent(&old_key));

        if let Some(detail) = app.detail.as_mut() {
            detail.set_period(TimePeriod::ThreeMonths);
        }

        assert!(!app.is_dependent(&old_key));
        assert!(app.is_dependent(&QueryKey::coin_history("bitcoin", TimePeriod::ThreeMonths)));
        assert!(app.is_dependent(&QueryKey::coin_detail("bitcoin")));
        assert!(!app.is_dependent(&QueryKey::coins(100)));
    }

    #[test]
    fn test_two_step_quit() {
        let mut app = App::new(false);
        app.request_quit();
        assert!(app.is_awaiting_quit_confirmation());
        app.cancel_quit();
        assert!(!app.is_awaiting_quit_confirmation());

        app.request_quit();
        app.quit();
        assert!(!app.is_running());
    }

    #[test]
    fn test_redraw_flag_is_consumed() {
        let mut app = App::new(false);
        assert!(app.take_redraw());
        assert!(!app.take_redraw());

        app.mark_dirty();
        assert!(app.take_redraw());
    }
}
