// ============================================================================
// Module : ui
// ============================================================================
// Interface utilisateur (Terminal User Interface)
// ============================================================================

pub mod chart;     // Historique de prix
pub mod dashboard; // Rendu de l'interface principale
pub mod detail;    // News paginées + dernière analyse
pub mod events;    // Gestion des événements clavier

// Re-exports pour simplifier les imports
pub use dashboard::render;
pub use events::{Event, EventHandler, ReadFailures};
