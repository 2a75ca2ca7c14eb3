//! Append-only record of every move flown in a planning run.

use crate::models::{CompassDirection, Coordinate};
use crate::pathfinder::Route;
use serde::{Deserialize, Serialize};
use std::time::Instant;

/// One move of the drone.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FlightPathPoint {
    pub order_no: String,
    pub from: Coordinate,
    pub to: Coordinate,
    /// Compass angle in degrees; `None` for a hover.
    pub angle: Option<f64>,
    /// Nanoseconds since planning began, strictly increasing along the log.
    pub ticks_since_start: u64,
}

#[derive(Debug, Clone)]
pub struct FlightLog {
    points: Vec<FlightPathPoint>,
    started: Instant,
    last_tick: Option<u64>,
}

impl Default for FlightLog {
    fn default() -> Self {
        Self::new()
    }
}

impl FlightLog {
    pub fn new() -> Self {
        Self::starting_at(Instant::now())
    }

    /// A log whose ticks count from `started`.
    pub fn starting_at(started: Instant) -> Self {
        Self {
            points: Vec::new(),
            started,
            last_tick: None,
        }
    }

    pub fn record(
        &mut self,
        order_no: &str,
        from: Coordinate,
        direction: CompassDirection,
        to: Coordinate,
    ) {
        let elapsed = u64::try_from(self.started.elapsed().as_nanos()).unwrap_or(u64::MAX);
        let tick = match self.last_tick {
            Some(last) if elapsed <= last => last.saturating_add(1),
            _ => elapsed,
        };
        self.last_tick = Some(tick);
        self.points.push(FlightPathPoint {
            order_no: order_no.to_string(),
            from,
            to,
            angle: direction.angle(),
            ticks_since_start: tick,
        });
    }

    /// Append every move of `route`, tagged with `order_no`.
    pub fn record_route(&mut self, order_no: &str, route: &Route) {
        for (from, direction, to) in route.steps() {
            self.record(order_no, from, direction, to);
        }
    }

    pub fn points(&self) -> &[FlightPathPoint] {
        &self.points
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn moves_for(&self, order_no: &str) -> usize {
        self.points
            .iter()
            .filter(|point| point.order_no == order_no)
            .count()
    }

    /// Polyline of the whole flight: the first departure point, then every
    /// move's destination.
    pub fn trace(&self) -> Vec<Coordinate> {
        let Some(first) = self.points.first() else {
            return Vec::new();
        };
        std::iter::once(first.from)
            .chain(self.points.iter().map(|point| point.to))
            .collect()
    }
}
