// ============================================================================
// Structure : NewsItem / NewsPage
// ============================================================================
// Une page de news pour un ticker, avec le drapeau de continuation serveur
// ============================================================================

use serde::{Deserialize, Serialize};

/// Source affichée quand le fournisseur n'en donne pas
pub const UNKNOWN_SOURCE: &str = "unknown-source";

/// Un article de news
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewsItem {
    pub headline: String,
    pub source: String,
    pub url: Option<String>,
    pub published_at: Option<String>,
    pub fetched_at: Option<String>,
}

impl NewsItem {
    /// Normalise un article reçu du serveur
    ///
    /// - headline vide après trim : l'article est ignoré (None)
    /// - source vide : "unknown-source"
    /// - champs optionnels vides : None
    pub fn normalized(
        headline: &str,
        source: Option<&str>,
        url: Option<&str>,
        published_at: Option<&str>,
        fetched_at: Option<&str>,
    ) -> Option<Self> {
        let headline = headline.trim();
        if headline.is_empty() {
            return None;
        }

        let source = source
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .unwrap_or(UNKNOWN_SOURCE);

        Some(Self {
            headline: headline.to_string(),
            source: source.to_string(),
            url: non_empty(url),
            published_at: non_empty(published_at),
            fetched_at: non_empty(fetched_at),
        })
    }

    /// Date à afficher : publication, sinon date de récupération
    pub fn timestamp(&self) -> Option<&str> {
        self.published_at.as_deref().or(self.fetched_at.as_deref())
    }
}

fn non_empty(value: Option<&str>) -> Option<String> {
    value
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
}

/// Une page de news
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewsPage {
    pub items: Vec<NewsItem>,

    /// Le serveur signale qu'une page suivante existe
    pub has_next: bool,
}

impl NewsPage {
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}
