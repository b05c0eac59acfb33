// ============================================================================
// Module : models
// ============================================================================
// Structures de données du domaine : cryptos, historique, formatage
//
// CONCEPT RUST : Modules et visibilité
// - "pub mod" : déclare un sous-module public (accessible depuis l'extérieur)
// - Sans "pub", le module serait privé au crate
// ============================================================================

pub mod coin;    // CoinSummary, CoinDetail
pub mod format;  // Abréviation des nombres (K, M, B...)
pub mod history; // TimePeriod, HistoryPoint, CoinHistory

// Re-export des structures principales pour simplifier les imports
// Au lieu de : use cryptoverse::models::coin::CoinSummary;
// On peut faire : use cryptoverse::models::CoinSummary;
pub use coin::{AllTimeHigh, CoinDetail, CoinLink, CoinSummary};
pub use history::{CoinHistory, HistoryPoint, TimePeriod};
