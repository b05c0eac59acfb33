// ============================================================================
// Cryptoverse - Library
// ============================================================================
// Expose les modules publics pour le binaire et les tests d'intégration
// ============================================================================

pub mod api;    // Client Coinranking (trait MarketDataSource)
pub mod app;    // État de l'application
pub mod config; // Arguments de la ligne de commande
pub mod models; // Structures de données
pub mod query;  // Cache de requêtes par clé
pub mod ui;     // Interface utilisateur
pub mod views;  // Logique des vues (filtre, statistiques, graphique)
