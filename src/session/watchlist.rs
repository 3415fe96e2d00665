// ============================================================================
// WatchlistStore : tickers suivis + ticker sélectionné
// ============================================================================
// CONCEPTS RUST :
// 1. Encapsulation : les champs sont privés, l'invariant est garanti par
//    les méthodes (la sélection est toujours membre de la liste, ou None)
// 2. Option<Ticker> pour la sélection plutôt qu'un index : un index devient
//    faux dès que le serveur renvoie une liste réordonnée
// ============================================================================

use std::collections::HashSet;

use crate::models::Ticker;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WatchlistStore {
    tickers: Vec<Ticker>,
    selected: Option<Ticker>,
}

impl WatchlistStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Crée un store déjà rempli (premier ticker sélectionné)
    #[cfg(test)]
    pub fn with_tickers(tickers: Vec<Ticker>) -> Self {
        let mut store = Self::new();
        store.replace(tickers);
        store
    }

    pub fn tickers(&self) -> &[Ticker] {
        &self.tickers
    }

    pub fn is_empty(&self) -> bool {
        self.tickers.is_empty()
    }

    pub fn selected(&self) -> Option<&Ticker> {
        self.selected.as_ref()
    }

    pub fn contains(&self, ticker: &Ticker) -> bool {
        self.tickers.contains(ticker)
    }

    /// Position de la sélection dans la liste
    pub fn selected_index(&self) -> Option<usize> {
        let selected = self.selected.as_ref()?;
        self.tickers.iter().position(|t| t == selected)
    }

    /// Vrai si la sélection est membre de la liste (dérivé, jamais stocké)
    pub fn selected_in_watchlist(&self) -> bool {
        self.selected_index().is_some()
    }

    /// Remplace la liste par celle du serveur
    ///
    /// - Doublons supprimés (première occurrence conservée)
    /// - Sélection conservée si toujours présente
    /// - Sinon : premier ticker, ou aucune sélection si la liste est vide
    pub fn replace(&mut self, tickers: Vec<Ticker>) {
        let mut seen = HashSet::new();
        self.tickers = tickers
            .into_iter()
            .filter(|t| seen.insert(t.clone()))
            .collect();

        let keep = self
            .selected
            .as_ref()
            .is_some_and(|selected| self.tickers.contains(selected));
        if !keep {
            self.selected = self.tickers.first().cloned();
        }
    }

    /// Sélectionne un ticker de la liste
    ///
    /// Retourne false si le ticker n'est pas membre (sélection inchangée).
    pub fn select(&mut self, ticker: &Ticker) -> bool {
        if !self.contains(ticker) {
            return false;
        }
        self.selected = Some(ticker.clone());
        true
    }

    /// Ticker voisin de la sélection (navigation ↑↓)
    ///
    /// CONCEPT RUST : saturating arithmetic, comme navigate_up/down
    pub fn neighbour(&self, offset: isize) -> Option<&Ticker> {
        if self.tickers.is_empty() {
            return None;
        }
        let max_index = self.tickers.len() - 1;
        let target = match self.selected_index() {
            Some(index) if offset < 0 => index.saturating_sub(offset.unsigned_abs()),
            Some(index) => index.saturating_add(offset as usize).min(max_index),
            None => 0,
        };
        self.tickers.get(target)
    }

    /// Une suppression n'est permise que sur la sélection courante
    pub fn can_remove(&self, ticker: &Ticker) -> bool {
        self.selected_in_watchlist() && self.selected.as_ref() == Some(ticker)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tickers(symbols: &[&str]) -> Vec<Ticker> {
        symbols.iter().filter_map(|s| Ticker::normalize(s)).collect()
    }

    fn t(symbol: &str) -> Ticker {
        Ticker::normalize(symbol).unwrap()
    }

    #[test]
    fn test_replace_selects_first_when_empty_selection() {
        let store = WatchlistStore::with_tickers(tickers(&["AAPL", "MSFT"]));
        assert_eq!(store.selected(), Some(&t("AAPL")));
        assert!(store.selected_in_watchlist());
    }

    #[test]
    fn test_replace_preserves_selection() {
        let mut store = WatchlistStore::with_tickers(tickers(&["AAPL", "MSFT"]));
        assert!(store.select(&t("MSFT")));

        store.replace(tickers(&["TSLA", "MSFT", "AAPL"]));
        assert_eq!(store.selected(), Some(&t("MSFT")));
        assert_eq!(store.selected_index(), Some(1));
    }

    #[test]
    fn test_replace_falls_back_to_first_or_none() {
        let mut store = WatchlistStore::with_tickers(tickers(&["AAPL", "MSFT"]));
        store.replace(tickers(&["MSFT"]));
        assert_eq!(store.selected(), Some(&t("MSFT")));

        store.replace(Vec::new());
        assert_eq!(store.selected(), None);
        assert!(!store.selected_in_watchlist());
    }

    #[test]
    fn test_replace_dedups() {
        let store = WatchlistStore::with_tickers(tickers(&["AAPL", "MSFT", "AAPL"]));
        assert_eq!(store.tickers(), tickers(&["AAPL", "MSFT"]).as_slice());
    }

    #[test]
    fn test_select_rejects_non_member() {
        let mut store = WatchlistStore::with_tickers(tickers(&["AAPL"]));
        assert!(!store.select(&t("NVDA")));
        assert_eq!(store.selected(), Some(&t("AAPL")));
    }

    #[test]
    fn test_neighbour_saturates() {
        let store = WatchlistStore::with_tickers(tickers(&["AAPL", "MSFT", "TSLA"]));
        assert_eq!(store.neighbour(-1), Some(&t("AAPL")));
        assert_eq!(store.neighbour(1), Some(&t("MSFT")));
        assert_eq!(store.neighbour(10), Some(&t("TSLA")));
        assert_eq!(WatchlistStore::new().neighbour(1), None);
    }

    #[test]
    fn test_can_remove_only_selected() {
        let store = WatchlistStore::with_tickers(tickers(&["AAPL", "MSFT"]));
        assert!(store.can_remove(&t("AAPL")));
        assert!(!store.can_remove(&t("MSFT")));
        assert!(!store.can_remove(&t("NVDA")));
    }
}
