// ============================================================================
// Configuration : arguments de la ligne de commande
// ============================================================================
// CONCEPT RUST : clap derive
// - Une struct décrit les options, clap génère le parsing et --help
// - `env = "..."` : chaque option peut aussi venir d'une variable d'env
// ============================================================================

use std::path::PathBuf;
use std::time::Duration;

use clap::{Parser, ValueHint};

use crate::api::coinranking::DEFAULT_BASE_URL;

/// Âge (secondes) au-delà duquel une donnée en cache est revalidée
pub const DEFAULT_STALE_SECS: u64 = 300;

/// Nom de l'application (répertoire de logs, fichier de log)
pub const APP_NAME: &str = "cryptoverse";

/// Cryptoverse : classement et fiches des cryptomonnaies dans le terminal
#[derive(Parser, Debug, Clone)]
#[command(author, version, about)]
pub struct Config {
    /// Mode simplifié : top 10 sans recherche
    #[arg(long)]
    pub simplified: bool,

    /// Ouvre directement la fiche de cette crypto (uuid Coinranking)
    #[arg(long, value_name = "COIN_ID")]
    pub coin: Option<String>,

    /// URL de base de l'API Coinranking
    #[arg(
        long,
        value_hint = ValueHint::Url,
        env = "COINRANKING_BASE_URL",
        default_value = DEFAULT_BASE_URL
    )]
    pub base_url: String,

    /// Clé d'API Coinranking (header x-access-token)
    #[arg(long, env = "COINRANKING_API_KEY", hide_env_values = true)]
    pub api_key: Option<String>,

    /// Revalidation des données en cache après N secondes (0 = jamais)
    #[arg(long, env = "CRYPTOVERSE_STALE_SECS", default_value_t = DEFAULT_STALE_SECS)]
    pub stale_secs: u64,

    /// Répertoire des fichiers de log
    #[arg(long, value_hint = ValueHint::DirPath, env = "CRYPTOVERSE_LOG_DIR")]
    pub log_dir: Option<PathBuf>,
}

impl Config {
    /// Durée de fraîcheur du cache, None si la revalidation est désactivée
    pub fn stale_after(&self) -> Option<Duration> {
        (self.stale_secs > 0).then(|| Duration::from_secs(self.stale_secs))
    }

    /// Répertoire de logs effectif
    ///
    /// Ordre : --log-dir, puis répertoire de données de l'OS
    /// (~/.local/share/cryptoverse/logs sous Linux), puis ./logs
    pub fn resolve_log_dir(&self) -> PathBuf {
        self.log_dir.clone().unwrap_or_else(|| {
            dirs::data_local_dir()
                .map(|dir| dir.join(APP_NAME).join("logs"))
                .unwrap_or_else(|| PathBuf::from("./logs"))
        })
    }
}

// ============================================================================
// Tests unitaires
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> Config {
        Config::try_parse_from(std::iter::once("cryptoverse").chain(args.iter().copied()))
            .expect("arguments valides")
    }

    #[test]
    fn test_explicit_flags() {
        let config = parse(&[
            "--simplified",
            "--coin",
            "Qwsogvtv82FCd",
            "--base-url",
            "http://localhost:8080/v2",
            "--stale-secs",
            "60",
            "--log-dir",
            "/tmp/cv-logs",
        ]);

        assert!(config.simplified);
        assert_eq!(config.coin.as_deref(), Some("Qwsogvtv82FCd"));
        assert_eq!(config.base_url, "http://localhost:8080/v2");
        assert_eq!(config.stale_after(), Some(Duration::from_secs(60)));
        assert_eq!(config.resolve_log_dir(), PathBuf::from("/tmp/cv-logs"));
    }

    #[test]
    fn test_zero_disables_revalidation() {
        let config = parse(&["--stale-secs", "0"]);
        assert_eq!(config.stale_after(), None);
    }

    #[test]
    fn test_default_log_dir_ends_with_app_logs() {
        let config = parse(&["--log-dir", "logs"]);
        assert!(config.resolve_log_dir().ends_with("logs"));

        let config = Config {
            log_dir: None,
            ..config
        };
        assert!(config.resolve_log_dir().ends_with("logs"));
    }
}
