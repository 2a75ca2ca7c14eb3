//! Airspace model: the central area and the no-fly zones.
//!
//! Built once per run from the retrieved polygons and only read afterwards.

use crate::error::CoreError;
use crate::models::Coordinate;
use crate::spatial::{self, Bounds};
use serde::Serialize;

/// A named polygon, implicitly closed.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Zone {
    name: String,
    vertices: Vec<Coordinate>,
}

impl Zone {
    /// Build a zone from its ring. A repeated closing vertex is dropped;
    /// fewer than three remaining vertices is an error.
    pub fn new(name: impl Into<String>, mut vertices: Vec<Coordinate>) -> Result<Self, CoreError> {
        let name = name.into();
        if vertices.len() > 1 && vertices.first() == vertices.last() {
            vertices.pop();
        }
        if vertices.len() < 3 {
            return Err(CoreError::InvalidZone {
                name,
                reason: format!("polygon must have at least 3 vertices, got {}", vertices.len()),
            });
        }
        Ok(Self { name, vertices })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn vertices(&self) -> &[Coordinate] {
        &self.vertices
    }

    pub fn contains(&self, point: Coordinate) -> bool {
        spatial::point_in_polygon(point, &self.vertices)
    }

    pub fn intersects_segment(&self, a: Coordinate, b: Coordinate) -> bool {
        spatial::segment_intersects_polygon(a, b, &self.vertices)
    }
}

/// The central area plus the ordered list of no-fly zones.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ZoneModel {
    central_area: Zone,
    no_fly_zones: Vec<Zone>,
}

impl ZoneModel {
    pub fn new(central_area: Zone, no_fly_zones: Vec<Zone>) -> Self {
        Self {
            central_area,
            no_fly_zones,
        }
    }

    pub fn central_area(&self) -> &Zone {
        &self.central_area
    }

    pub fn no_fly_zones(&self) -> &[Zone] {
        &self.no_fly_zones
    }

    pub fn in_central_area(&self, point: Coordinate) -> bool {
        self.central_area.contains(point)
    }

    /// First no-fly zone (in load order) that the segment `a-b` enters.
    pub fn first_blocking_zone(&self, a: Coordinate, b: Coordinate) -> Option<&Zone> {
        self.no_fly_zones
            .iter()
            .find(|zone| zone.intersects_segment(a, b))
    }

    pub fn crosses_no_fly_zone(&self, a: Coordinate, b: Coordinate) -> bool {
        self.first_blocking_zone(a, b).is_some()
    }

    /// Bounding box of every zone vertex.
    pub fn bounds(&self) -> Bounds {
        // Zones always hold at least three vertices.
        let seed = Bounds::around(self.central_area.vertices[0]);
        std::iter::once(&self.central_area)
            .chain(&self.no_fly_zones)
            .flat_map(|zone| zone.vertices.iter().copied())
            .fold(seed, Bounds::including)
    }
}
