// ============================================================================
// Structure : AnalysisRecord / LatestAnalysis
// ============================================================================
// Dernière explication générée par le LLM pour un ticker
//
// CONCEPT RUST : Enum pour représenter les états possibles
// - Ready : une analyse existe
// - Pending : le backend n'a encore rien produit (status "pending")
// - Missing : le backend ne connaît pas d'analyse (404)
// Les deux derniers s'affichent pareil ("pas d'analyse"), mais on garde
// la distinction pour les logs et le message serveur.
// ============================================================================

use std::fmt;

use serde::{Deserialize, Serialize};

/// Tonalité de l'analyse
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Sentiment {
    Positive,
    Neutral,
    Negative,
    Unknown,
}

impl Sentiment {
    /// Parse tolérant : toute valeur inconnue donne Unknown
    pub fn parse(raw: Option<&str>) -> Self {
        match raw.map(|s| s.trim().to_ascii_lowercase()).as_deref() {
            Some("positive") => Sentiment::Positive,
            Some("neutral") => Sentiment::Neutral,
            Some("negative") => Sentiment::Negative,
            _ => Sentiment::Unknown,
        }
    }
}

impl fmt::Display for Sentiment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Sentiment::Positive => write!(f, "positive"),
            Sentiment::Neutral => write!(f, "neutral"),
            Sentiment::Negative => write!(f, "negative"),
            Sentiment::Unknown => write!(f, "unknown"),
        }
    }
}

/// Analyse stockée par le worker
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisRecord {
    pub summary: String,
    pub sentiment: Sentiment,
    pub hypothesis: Option<String>,

    /// Pourquoi le LLM a été déclenché (ex: "price_move_above_threshold")
    pub trigger_reason: Option<String>,
    pub confidence: Option<f64>,

    /// Variation de prix ayant motivé l'analyse, en pourcentage
    pub movement_delta: Option<f64>,
    pub created_at: Option<String>,
}

/// Résultat de GET /latest/{ticker}
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub enum LatestAnalysis {
    Ready(AnalysisRecord),
    Pending { message: Option<String> },
    #[default]
    Missing,
}

impl LatestAnalysis {
    /// Retourne l'analyse si elle est exploitable
    pub fn record(&self) -> Option<&AnalysisRecord> {
        match self {
            LatestAnalysis::Ready(record) => Some(record),
            LatestAnalysis::Pending { .. } | LatestAnalysis::Missing => None,
        }
    }
}
