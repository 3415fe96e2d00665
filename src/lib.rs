// ============================================================================
// MarketScope - Library
// ============================================================================
// Console de suivi de marché : watchlist, prix, news et analyses servis par
// l'API market-observability.
// ============================================================================

pub mod api;     // Client HTTP de l'API
pub mod app;     // État de l'interface
pub mod config;  // Ligne de commande + environnement
pub mod models;  // Structures de données
pub mod session; // Orchestration (watchlist, détail, pagination, requêtes)
pub mod ui;      // Interface utilisateur
