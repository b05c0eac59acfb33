// ============================================================================
// Module : views
// ============================================================================
// Logique des vues, sans terminal : état local explicite + dérivation pure
// de ce qu'il faut afficher à partir de l'état des requêtes
// ============================================================================

pub mod detail;    // Fiche d'une crypto (statistiques, graphique, description)
pub mod list;      // Classement filtrable
pub mod rich_text; // Interprétation de la description HTML

pub use detail::{DetailView, DetailViewState};
pub use list::{ListView, ListViewState};
pub use rich_text::{RichTextRenderer, SanitizingRenderer};
