// ============================================================================
// Formatage compact des nombres
// ============================================================================
// Abrège les grandes valeurs pour l'affichage : 1234 → "1.2K",
// 45_000_000 → "45M", 1.2e12 → "1.2T"
//
// Une décimale au plus, zéros inutiles supprimés ("12K" et pas "12.0K").
// ============================================================================

/// Suffixes successifs (puissances de 1000)
const UNITS: [&str; 7] = ["", "K", "M", "B", "T", "P", "E"];

/// Texte affiché quand la valeur est absente ou invalide
pub const MISSING: &str = "N/A";

/// Abrège un nombre avec un suffixe K/M/B/T/P/E
///
/// CONCEPT : Arrondi avant choix du suffixe
/// - 999_960 arrondi donne 1000K, on passe alors au suffixe suivant (1M)
///
/// # Exemple
/// assert_eq!(compact(45_123.45), "45.1K");
pub fn compact(value: f64) -> String {
    if !value.is_finite() {
        return MISSING.to_string();
    }

    let sign = if value < 0.0 { "-" } else { "" };
    let mut scaled = value.abs();
    let mut unit = 0;

    while scaled >= 1000.0 && unit < UNITS.len() - 1 {
        scaled /= 1000.0;
        unit += 1;
    }

    let mut rounded = round_one_decimal(scaled);
    if rounded >= 1000.0 && unit < UNITS.len() - 1 {
        rounded = round_one_decimal(rounded / 1000.0);
        unit += 1;
    }

    // -0.04 s'arrondit à 0 : pas de "-0"
    let sign = if rounded == 0.0 { "" } else { sign };

    format!("{}{}{}", sign, trim_decimals(rounded), UNITS[unit])
}

/// Variante pour les champs optionnels de l'API
pub fn compact_opt(value: Option<f64>) -> String {
    value.map(compact).unwrap_or_else(|| MISSING.to_string())
}

/// Montant en dollars abrégé : "$ 45.1K"
pub fn usd(value: Option<f64>) -> String {
    match value {
        Some(v) if v.is_finite() => format!("$ {}", compact(v)),
        _ => MISSING.to_string(),
    }
}

/// Pourcentage signé : "+2.1%" / "-0.5%"
pub fn percent(value: Option<f64>) -> String {
    match value {
        Some(v) if v.is_finite() => format!("{:+.2}%", v),
        _ => MISSING.to_string(),
    }
}

fn round_one_decimal(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}

fn trim_decimals(value: f64) -> String {
    let text = format!("{:.1}", value);
    text.trim_end_matches('0').trim_end_matches('.').to_string()
}

// ============================================================================
// Tests unitaires
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_small_values() {
        assert_eq!(compact(0.0), "0");
        assert_eq!(compact(0.5), "0.5");
        assert_eq!(compact(512.34), "512.3");
        assert_eq!(compact(999.0), "999");
    }

    #[test]
    fn test_suffixes() {
        assert_eq!(compact(1_000.0), "1K");
        assert_eq!(compact(45_123.45), "45.1K");
        assert_eq!(compact(12_000_000.0), "12M");
        assert_eq!(compact(1_230_000_000.0), "1.2B");
        assert_eq!(compact(850_000_000_000.0), "850B");
        assert_eq!(compact(1.5e12), "1.5T");
    }

    #[test]
    fn test_rounding_carries_to_next_unit() {
        assert_eq!(compact(999_960.0), "1M");
        assert_eq!(compact(999.96), "1K");
    }

    #[test]
    fn test_negative_values() {
        assert_eq!(compact(-2.345), "-2.3");
        assert_eq!(compact(-15_500.0), "-15.5K");
        assert_eq!(compact(-0.04), "0");
    }

    #[test]
    fn test_missing_values() {
        assert_eq!(compact(f64::NAN), MISSING);
        assert_eq!(compact_opt(None), MISSING);
        assert_eq!(usd(None), MISSING);
        assert_eq!(usd(Some(68_000.0)), "$ 68K");
        assert_eq!(percent(Some(2.114)), "+2.11%");
        assert_eq!(percent(Some(-0.5)), "-0.50%");
    }
}
