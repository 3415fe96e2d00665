// ============================================================================
// Structure : Ticker
// ============================================================================
// Représente un symbole boursier normalisé (ex: "AAPL", "BRK.B")
//
// CONCEPTS RUST :
// 1. Newtype pattern : Ticker(String) au lieu d'un String brut
//    - Impossible de construire un Ticker sans passer par normalize()
//    - Le compilateur garantit qu'aucun symbole non normalisé n'est envoyé
// 2. Option<Self> : la normalisation peut ne rien produire (saisie vide)
// 3. serde(try_from) : la désérialisation passe elle aussi par normalize()
// ============================================================================

use std::fmt;

use serde::{Deserialize, Serialize};

/// Longueur maximale par défaut d'un symbole (indice UI, pas une règle serveur)
pub const DEFAULT_MAX_LEN: usize = 12;

/// Symbole boursier normalisé : trim + majuscules
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(into = "String", try_from = "String")]
pub struct Ticker(String);

impl Ticker {
    /// Normalise une saisie brute
    ///
    /// CONCEPT RUST : Option comme résultat de validation
    /// - "  msft " -> Some(Ticker("MSFT"))
    /// - "   "     -> None (rien à ajouter)
    pub fn normalize(raw: &str) -> Option<Self> {
        let symbol = raw.trim().to_uppercase();
        if symbol.is_empty() {
            None
        } else {
            Some(Self(symbol))
        }
    }

    /// Retourne le symbole sous forme de &str
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for Ticker {
    type Error = String;

    fn try_from(raw: String) -> Result<Self, Self::Error> {
        Ticker::normalize(&raw).ok_or_else(|| "symbole vide".to_string())
    }
}

impl From<Ticker> for String {
    fn from(ticker: Ticker) -> Self {
        ticker.0
    }
}

impl fmt::Display for Ticker {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for Ticker {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

// ============================================================================
// TickerPolicy : validation configurable
// ============================================================================
// Le backend n'impose rien au-delà de trim + majuscules.
// Les règles supplémentaires sont donc une politique locale, réglable via la
// configuration (--ticker-max-len, --strict-tickers).
// ============================================================================

/// Règles de validation appliquées avant l'ajout d'un ticker
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TickerPolicy {
    /// Longueur maximale (None = illimitée)
    pub max_len: Option<usize>,

    /// Restreint aux caractères A-Z, 0-9, '.' et '-'
    pub strict_charset: bool,
}

impl TickerPolicy {
    /// Vérifie un ticker normalisé
    ///
    /// Retourne un message lisible en cas de refus.
    pub fn check(&self, ticker: &Ticker) -> Result<(), String> {
        if let Some(max_len) = self.max_len {
            let len = ticker.as_str().chars().count();
            if len > max_len {
                return Err(format!(
                    "symbole trop long ({} caractères, maximum {})",
                    len, max_len
                ));
            }
        }

        if self.strict_charset {
            if let Some(c) = ticker
                .as_str()
                .chars()
                .find(|c| !(c.is_ascii_alphanumeric() || *c == '.' || *c == '-'))
            {
                return Err(format!("caractère non autorisé : '{}'", c));
            }
        }

        Ok(())
    }
}

impl Default for TickerPolicy {
    fn default() -> Self {
        Self {
            max_len: Some(DEFAULT_MAX_LEN),
            strict_charset: false,
        }
    }
}

// ============================================================================
// Tests unitaires
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_trims_and_uppercases() {
        let ticker = Ticker::normalize("  msft ").unwrap();
        assert_eq!(ticker.as_str(), "MSFT");
        assert_eq!(ticker.to_string(), "MSFT");
    }

    #[test]
    fn test_deserialize_goes_through_normalize() {
        let ticker: Ticker = serde_json::from_str("\" brk.b \"").unwrap();
        assert_eq!(ticker.as_str(), "BRK.B");
        assert_eq!(serde_json::to_string(&ticker).unwrap(), "\"BRK.B\"");
        assert!(serde_json::from_str::<Ticker>("\"   \"").is_err());
    }

    #[test]
    fn test_normalize_empty_is_none() {
        assert!(Ticker::normalize("").is_none());
        assert!(Ticker::normalize(" \t ").is_none());
    }

    #[test]
    fn test_default_policy_limits_length() {
        let policy = TickerPolicy::default();
        assert!(policy.check(&Ticker::normalize("BRK.B").unwrap()).is_ok());

        let long = Ticker::normalize("ABCDEFGHIJKLM").unwrap();
        let err = policy.check(&long).unwrap_err();
        assert!(err.contains("13"));
    }

    #[test]
    fn test_strict_charset() {
        let policy = TickerPolicy {
            max_len: None,
            strict_charset: true,
        };

        assert!(policy.check(&Ticker::normalize("btc-usd").unwrap()).is_ok());
        assert!(policy.check(&Ticker::normalize("AA PL").unwrap()).is_err());
        let lenient = TickerPolicy {
            strict_charset: false,
            ..policy
        };
        assert!(lenient.check(&Ticker::normalize("AA PL").unwrap()).is_ok());
    }
}
