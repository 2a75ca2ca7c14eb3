//! Planner configuration.

use crate::models::Coordinate;
use serde::{Deserialize, Serialize};

/// Longitude of the home base (Appleton Tower, Edinburgh).
pub const DEFAULT_BASE_LNG: f64 = -3.186874;
/// Latitude of the home base.
pub const DEFAULT_BASE_LAT: f64 = 55.944494;

/// Configuration for one planning run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlannerConfig {
    /// Where every delivery round trip starts and ends
    pub base: Coordinate,
    /// Total moves (hovers included) the drone may make in one day
    pub move_budget: u32,
    /// Weight of the heuristic against path cost in search ordering (1.0 = heuristic only)
    pub greedy_factor: f64,
    /// Padding around the zones and endpoints that bounds the search region, in degrees
    pub search_margin_deg: f64,
    /// Popped nodes after which a search gives up with `NoRoute`
    pub max_expansions: usize,
}

impl Default for PlannerConfig {
    fn default() -> Self {
        Self {
            base: Coordinate::from_trusted(DEFAULT_BASE_LNG, DEFAULT_BASE_LAT),
            move_budget: 2000,
            greedy_factor: 1.0,
            search_margin_deg: 0.01,
            max_expansions: 200_000,
        }
    }
}

impl PlannerConfig {
    pub fn with_base(mut self, base: Coordinate) -> Self {
        self.base = base;
        self
    }

    pub fn with_move_budget(mut self, move_budget: u32) -> Self {
        self.move_budget = move_budget;
        self
    }
}
