// ============================================================================
// Structure : PricePoint / PriceSeries
// ============================================================================
// Historique de prix d'un ticker, tel que capturé par le worker backend
//
// CONCEPTS RUST :
// 1. Option<DateTime<Utc>> : le timestamp peut manquer côté serveur
// 2. sort_by_key stable : l'ordre serveur est conservé à timestamp égal
// 3. Invariant porté par le type : PriceSeries est toujours du plus ancien
//    au plus récent, le graphique n'a jamais à se poser la question
// ============================================================================

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Un relevé de prix
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PricePoint {
    /// Prix relevé
    pub price: f64,

    /// Moment de la capture (None si le serveur ne l'a pas fourni)
    pub captured_at: Option<DateTime<Utc>>,

    /// Source de la donnée (ex: "alpha_vantage", "mock")
    pub source: Option<String>,
}

impl PricePoint {
    pub fn new(price: f64, captured_at: Option<DateTime<Utc>>) -> Self {
        Self {
            price,
            captured_at,
            source: None,
        }
    }
}

/// Série de prix, triée du plus ancien au plus récent
///
/// Pas de Deserialize : une série ne se construit que via from_server_order().
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct PriceSeries {
    points: Vec<PricePoint>,
}

impl PriceSeries {
    /// Construit une série à partir de l'ordre renvoyé par le serveur
    ///
    /// Le serveur renvoie les relevés les plus récents en premier.
    /// - Si tous les points ont un timestamp : tri croissant (stable)
    /// - Sinon : on inverse simplement l'ordre serveur
    pub fn from_server_order(mut points: Vec<PricePoint>) -> Self {
        if points.iter().all(|p| p.captured_at.is_some()) {
            points.sort_by_key(|p| p.captured_at);
        } else {
            points.reverse();
        }
        Self { points }
    }

    pub fn points(&self) -> &[PricePoint] {
        &self.points
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Dernier relevé (le plus récent)
    pub fn last(&self) -> Option<&PricePoint> {
        self.points.last()
    }

    /// Points (x, y) pour le widget Chart de ratatui
    pub fn chart_points(&self) -> Vec<(f64, f64)> {
        self.points
            .iter()
            .enumerate()
            .map(|(i, p)| (i as f64, p.price))
            .collect()
    }

    /// Bornes (min, max) des prix
    ///
    /// CONCEPT RUST : fold pour min/max en un seul passage
    pub fn bounds(&self) -> Option<(f64, f64)> {
        if self.points.is_empty() {
            return None;
        }
        Some(self.points.iter().fold((f64::MAX, f64::MIN), |(min, max), p| {
            (min.min(p.price), max.max(p.price))
        }))
    }

    /// Variation en pourcentage entre le premier et le dernier relevé
    pub fn change_percent(&self) -> Option<f64> {
        let first = self.points.first()?;
        let last = self.points.last()?;
        if first.price == 0.0 {
            return None;
        }
        Some(((last.price - first.price) / first.price) * 100.0)
    }
}

// ============================================================================
// Tests unitaires
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn at(hour: u32) -> Option<DateTime<Utc>> {
        Some(Utc.with_ymd_and_hms(2024, 5, 2, hour, 0, 0).unwrap())
    }

    #[test]
    fn test_newest_first_is_reversed_without_timestamps() {
        let series = PriceSeries::from_server_order(vec![
            PricePoint::new(103.0, None),
            PricePoint::new(102.0, None),
            PricePoint::new(101.0, None),
        ]);

        let prices: Vec<f64> = series.points().iter().map(|p| p.price).collect();
        assert_eq!(prices, vec![101.0, 102.0, 103.0]);
        assert_eq!(series.last().unwrap().price, 103.0);
    }

    #[test]
    fn test_timestamps_win_over_server_order() {
        // Ordre serveur déjà croissant : ne doit pas être inversé
        let series = PriceSeries::from_server_order(vec![
            PricePoint::new(10.0, at(9)),
            PricePoint::new(11.0, at(10)),
            PricePoint::new(12.0, at(11)),
        ]);

        let prices: Vec<f64> = series.points().iter().map(|p| p.price).collect();
        assert_eq!(prices, vec![10.0, 11.0, 12.0]);
    }

    #[test]
    fn test_bounds_and_change() {
        let series = PriceSeries::from_server_order(vec![
            PricePoint::new(110.0, at(12)),
            PricePoint::new(90.0, at(11)),
            PricePoint::new(100.0, at(10)),
        ]);

        assert_eq!(series.bounds(), Some((90.0, 110.0)));
        let change = series.change_percent().unwrap();
        assert!((change - 10.0).abs() < 1e-9);
        assert_eq!(series.chart_points()[0], (0.0, 100.0));
    }

    #[test]
    fn test_empty_series() {
        let series = PriceSeries::default();
        assert!(series.is_empty());
        assert!(series.bounds().is_none());
        assert!(series.change_percent().is_none());
    }
}
