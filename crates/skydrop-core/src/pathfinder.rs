//! Geofenced best-first search over compass moves.
//!
//! Nodes are ordered by `g * (1 - greedy_factor) + h * greedy_factor`. With
//! the default factor of 1 the search is purely greedy on the heuristic, so
//! routes are short but not guaranteed optimal.

use crate::config::PlannerConfig;
use crate::models::{CompassDirection, Coordinate};
use crate::spatial::{self, CLOSE_TOLERANCE_DEG, STEP_LENGTH_DEG};
use crate::zones::ZoneModel;
use std::cmp::{Ordering, Reverse};
use std::collections::{BinaryHeap, HashMap};
use thiserror::Error;
use tracing::{debug, warn};

/// Neighbours exactly one step from a closed node must not be pruned by
/// rounding in the distance computation.
const CLOSED_SET_SLACK_DEG: f64 = 1e-12;

/// The search exhausted its region (or expansion cap) without reaching the goal.
#[derive(Debug, Clone, Copy, PartialEq, Error)]
#[error("no route from {from} to {to}")]
pub struct NoRoute {
    pub from: Coordinate,
    pub to: Coordinate,
}

/// A planned sequence of moves. Always ends with a hover.
#[derive(Debug, Clone, PartialEq)]
pub struct Route {
    start: Coordinate,
    directions: Vec<CompassDirection>,
    /// Position after each move, parallel to `directions`.
    positions: Vec<Coordinate>,
}

impl Route {
    fn arrival(start: Coordinate) -> Self {
        Self {
            start,
            directions: vec![CompassDirection::Hover],
            positions: vec![start],
        }
    }

    pub fn start(&self) -> Coordinate {
        self.start
    }

    /// Where the drone is once the route has been flown.
    pub fn end(&self) -> Coordinate {
        self.positions.last().copied().unwrap_or(self.start)
    }

    pub fn directions(&self) -> &[CompassDirection] {
        &self.directions
    }

    /// Number of moves, the closing hover included.
    pub fn len(&self) -> usize {
        self.directions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.directions.is_empty()
    }

    /// `(from, direction, to)` for every move in order.
    pub fn steps(&self) -> impl Iterator<Item = (Coordinate, CompassDirection, Coordinate)> + '_ {
        let froms = std::iter::once(self.start)
            .chain(self.positions.iter().copied());
        froms
            .zip(self.directions.iter().copied())
            .zip(self.positions.iter().copied())
            .map(|((from, direction), to)| (from, direction, to))
    }
}

#[derive(Debug, Clone)]
struct SearchNode {
    position: Coordinate,
    /// Path cost so far (steps x step length)
    g: f64,
    /// Estimated remaining distance to the goal
    h: f64,
    parent: Option<usize>,
    direction: Option<CompassDirection>,
}

/// Open-set entry; equal scores pop in insertion order.
#[derive(Debug, Clone, Copy)]
struct OpenNode {
    score: f64,
    seq: u64,
    index: usize,
}

impl Ord for OpenNode {
    fn cmp(&self, other: &Self) -> Ordering {
        self.score
            .total_cmp(&other.score)
            .then_with(|| self.seq.cmp(&other.seq))
    }
}

impl PartialOrd for OpenNode {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl PartialEq for OpenNode {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for OpenNode {}

/// Visited positions bucketed on a tolerance-sized grid, so a proximity
/// query only inspects the 3x3 cells around the probe.
#[derive(Debug, Default)]
struct ClosedSet {
    cells: HashMap<(i64, i64), Vec<Coordinate>>,
}

impl ClosedSet {
    fn cell(point: Coordinate) -> (i64, i64) {
        (
            (point.longitude() / CLOSE_TOLERANCE_DEG).floor() as i64,
            (point.latitude() / CLOSE_TOLERANCE_DEG).floor() as i64,
        )
    }

    fn insert(&mut self, point: Coordinate) {
        self.cells.entry(Self::cell(point)).or_default().push(point);
    }

    fn contains_near(&self, point: Coordinate) -> bool {
        let threshold = CLOSE_TOLERANCE_DEG - CLOSED_SET_SLACK_DEG;
        let (cx, cy) = Self::cell(point);
        for dx in -1..=1 {
            for dy in -1..=1 {
                if let Some(points) = self.cells.get(&(cx + dx, cy + dy)) {
                    if points
                        .iter()
                        .any(|visited| spatial::distance(*visited, point) < threshold)
                    {
                        return true;
                    }
                }
            }
        }
        false
    }
}

/// Route planner over a fixed airspace.
#[derive(Debug, Clone, Copy)]
pub struct Pathfinder<'a> {
    zones: &'a ZoneModel,
    config: &'a PlannerConfig,
}

impl<'a> Pathfinder<'a> {
    pub fn new(zones: &'a ZoneModel, config: &'a PlannerConfig) -> Self {
        Self { zones, config }
    }

    /// Plan moves from `start` until within tolerance of `goal`.
    ///
    /// With a `lookahead` target, the final move is chosen among every legal
    /// arrival step so that the next leg towards `lookahead` is shortest.
    pub fn route(
        &self,
        start: Coordinate,
        goal: Coordinate,
        lookahead: Option<Coordinate>,
    ) -> Result<Route, NoRoute> {
        if spatial::close_to(start, goal) {
            return Ok(Route::arrival(start));
        }

        let mut region = self.zones.bounds().including(start).including(goal);
        if let Some(next) = lookahead {
            region = region.including(next);
        }
        let region = region.padded(self.config.search_margin_deg);

        let goal_in_central = self.zones.in_central_area(goal);
        let no_route = NoRoute {
            from: start,
            to: goal,
        };

        let root = SearchNode {
            position: start,
            g: 0.0,
            h: self.heuristic(start, goal),
            parent: None,
            direction: None,
        };
        let mut open_set: BinaryHeap<Reverse<OpenNode>> = BinaryHeap::new();
        let mut seq = 0u64;
        open_set.push(Reverse(OpenNode {
            score: self.score(&root),
            seq,
            index: 0,
        }));
        let mut nodes = vec![root];
        let mut closed_set = ClosedSet::default();
        let mut expansions = 0usize;

        while let Some(Reverse(current)) = open_set.pop() {
            let position = nodes[current.index].position;

            if spatial::close_to(position, goal) {
                debug!(
                    expansions,
                    nodes = nodes.len(),
                    "reached {goal} from {start}"
                );
                let arrival = lookahead.and_then(|next| {
                    self.arrive_towards(&nodes, current.index, goal, next, goal_in_central)
                });
                return Ok(
                    arrival.unwrap_or_else(|| reconstruct(&nodes, start, current.index, None))
                );
            }

            if closed_set.contains_near(position) {
                continue;
            }
            expansions += 1;
            if expansions > self.config.max_expansions {
                warn!(expansions, "search cap reached: {no_route}");
                return Err(no_route);
            }
            closed_set.insert(position);

            let parent_in_central = goal_in_central && self.zones.in_central_area(position);
            let g = nodes[current.index].g + STEP_LENGTH_DEG;

            for direction in CompassDirection::MOVES {
                let Ok(child) = spatial::next_position(position, direction) else {
                    continue;
                };
                if !region.contains(child)
                    || closed_set.contains_near(child)
                    || !self.is_legal_move(position, child, goal_in_central, parent_in_central)
                {
                    continue;
                }

                let node = SearchNode {
                    position: child,
                    g,
                    h: self.heuristic(child, goal),
                    parent: Some(current.index),
                    direction: Some(direction),
                };
                seq += 1;
                open_set.push(Reverse(OpenNode {
                    score: self.score(&node),
                    seq,
                    index: nodes.len(),
                }));
                nodes.push(node);
            }
        }

        debug!(expansions, "open set exhausted: {no_route}");
        Err(no_route)
    }

    /// Length of the plain route from `from` to `goal`, `None` when unreachable.
    pub fn moves_to(&self, from: Coordinate, goal: Coordinate) -> Option<usize> {
        self.route(from, goal, None).ok().map(|route| route.len())
    }

    fn score(&self, node: &SearchNode) -> f64 {
        let gamma = self.config.greedy_factor;
        node.g * (1.0 - gamma) + node.h * gamma
    }

    /// Straight-line distance, or the cheapest single detour via a vertex of
    /// the first no-fly zone blocking the straight line.
    fn heuristic(&self, from: Coordinate, goal: Coordinate) -> f64 {
        match self.zones.first_blocking_zone(from, goal) {
            None => spatial::distance(from, goal),
            Some(zone) => zone
                .vertices()
                .iter()
                .map(|v| spatial::distance(from, *v) + spatial::distance(*v, goal))
                .fold(f64::INFINITY, f64::min),
        }
    }

    /// A move may not touch a no-fly zone, and once inside the central area
    /// on the way to a central-area goal it may not leave again.
    fn is_legal_move(
        &self,
        from: Coordinate,
        to: Coordinate,
        goal_in_central: bool,
        from_in_central: bool,
    ) -> bool {
        if self.zones.crosses_no_fly_zone(from, to) {
            return false;
        }
        !(goal_in_central && from_in_central && !self.zones.in_central_area(to))
    }

    /// Re-pick the arrival step from the reached node's parent: among all
    /// legal steps landing within tolerance of `goal`, fewest moves on to
    /// `next` wins, then keeping the parent's heading.
    fn arrive_towards(
        &self,
        nodes: &[SearchNode],
        reached: usize,
        goal: Coordinate,
        next: Coordinate,
        goal_in_central: bool,
    ) -> Option<Route> {
        let parent_index = nodes[reached].parent?;
        let parent = &nodes[parent_index];
        let parent_in_central = goal_in_central && self.zones.in_central_area(parent.position);

        let (_, _, direction, position) = CompassDirection::MOVES
            .iter()
            .copied()
            .filter_map(|direction| {
                let child = spatial::next_position(parent.position, direction).ok()?;
                let legal = spatial::close_to(child, goal)
                    && self.is_legal_move(
                        parent.position,
                        child,
                        goal_in_central,
                        parent_in_central,
                    );
                legal.then_some((direction, child))
            })
            .map(|(direction, child)| {
                let onward = self.moves_to(child, next).unwrap_or(usize::MAX);
                let turns = parent.direction != Some(direction);
                (onward, turns, direction, child)
            })
            .min_by_key(|(onward, turns, _, _)| (*onward, *turns))?;

        Some(reconstruct(
            nodes,
            nodes[0].position,
            parent_index,
            Some((direction, position)),
        ))
    }
}

/// Walk parent links back to the start, optionally append one final step,
/// and close with a hover.
fn reconstruct(
    nodes: &[SearchNode],
    start: Coordinate,
    last: usize,
    final_step: Option<(CompassDirection, Coordinate)>,
) -> Route {
    let mut steps = Vec::new();
    let mut cursor = Some(last);
    while let Some(index) = cursor {
        let node = &nodes[index];
        if let Some(direction) = node.direction {
            steps.push((direction, node.position));
        }
        cursor = node.parent;
    }
    steps.reverse();
    steps.extend(final_step);

    let end = steps.last().map(|(_, position)| *position).unwrap_or(start);
    steps.push((CompassDirection::Hover, end));

    let (directions, positions) = steps.into_iter().unzip();
    Route {
        start,
        directions,
        positions,
    }
}
