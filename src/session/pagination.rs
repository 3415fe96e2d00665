// ============================================================================
// Pagination des news
// ============================================================================
// page >= 1 en permanence, has_next vient du dernier chargement appliqué.
// Après next(), has_next repasse à false jusqu'à ce que la nouvelle page
// l'annonce : on ne demande jamais une page que le serveur n'a pas promise.
// La pagination est propre à un ticker : reset() à chaque changement.
// ============================================================================

/// Contrôleur de pagination
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Pagination {
    page: u32,
    has_next: bool,
}

impl Pagination {
    pub fn new() -> Self {
        Self {
            page: 1,
            has_next: false,
        }
    }

    pub fn page(&self) -> u32 {
        self.page
    }

    pub fn has_next(&self) -> bool {
        self.has_next
    }

    pub fn can_prev(&self) -> bool {
        self.page > 1
    }

    /// Page suivante, seulement si le serveur en a annoncé une
    ///
    /// Retourne true si la page a changé.
    pub fn next(&mut self) -> bool {
        if !self.has_next {
            return false;
        }
        self.page = self.page.saturating_add(1);
        self.has_next = false;
        true
    }

    /// Page précédente, plancher à 1
    ///
    /// La page quittée a été annoncée par celle-ci : has_next redevient vrai.
    pub fn prev(&mut self) -> bool {
        if self.page <= 1 {
            return false;
        }
        self.page -= 1;
        self.has_next = true;
        true
    }

    /// Retour à la page 1 (changement de ticker, ajout, suppression)
    pub fn reset(&mut self) {
        self.page = 1;
        self.has_next = false;
    }

    /// Enregistre le drapeau de continuation de la dernière page de news
    pub fn record_has_next(&mut self, has_next: bool) {
        self.has_next = has_next;
    }
}

impl Default for Pagination {
    fn default() -> Self {
        Self::new()
    }
}
