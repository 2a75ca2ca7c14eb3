//! Planar geometry in degree space: distances, unit moves and geofencing.
//!
//! The drone's operating area is a few kilometres across, so longitude and
//! latitude are treated as plain Cartesian axes.

use crate::error::CoreError;
use crate::models::{CompassDirection, Coordinate};

/// Distance covered by one non-hover move, in degrees.
pub const STEP_LENGTH_DEG: f64 = 0.00015;

/// Two points closer than this are treated as the same place.
pub const CLOSE_TOLERANCE_DEG: f64 = 0.00015;

/// Euclidean distance in degrees.
pub fn distance(a: Coordinate, b: Coordinate) -> f64 {
    (b.longitude() - a.longitude()).hypot(b.latitude() - a.latitude())
}

pub fn close_to(a: Coordinate, b: Coordinate) -> bool {
    distance(a, b) < CLOSE_TOLERANCE_DEG
}

/// Bearing from `from` to `to` in degrees, East = 0, counter-clockwise,
/// normalised to [0, 360).
pub fn bearing_deg(from: Coordinate, to: Coordinate) -> f64 {
    let dlat = to.latitude() - from.latitude();
    let dlng = to.longitude() - from.longitude();
    dlat.atan2(dlng).to_degrees().rem_euclid(360.0)
}

/// Position after one move. Hover returns `from` unchanged; a step that
/// would leave the valid coordinate range fails with `InvalidCoordinate`.
pub fn next_position(
    from: Coordinate,
    direction: CompassDirection,
) -> Result<Coordinate, CoreError> {
    let Some(angle) = direction.angle() else {
        return Ok(from);
    };
    let radians = angle.to_radians();
    Coordinate::new(
        from.longitude() + STEP_LENGTH_DEG * radians.cos(),
        from.latitude() + STEP_LENGTH_DEG * radians.sin(),
    )
}

/// Ray casting towards increasing longitude. Polygons with fewer than three
/// vertices contain nothing.
pub fn point_in_polygon(point: Coordinate, vertices: &[Coordinate]) -> bool {
    let n = vertices.len();
    if n < 3 {
        return false;
    }

    let (lng, lat) = (point.longitude(), point.latitude());
    let mut inside = false;
    let mut j = n - 1;
    for i in 0..n {
        let (xi, yi) = (vertices[i].longitude(), vertices[i].latitude());
        let (xj, yj) = (vertices[j].longitude(), vertices[j].latitude());

        if ((yi > lat) != (yj > lat)) && (lng < (xj - xi) * (lat - yi) / (yj - yi) + xi) {
            inside = !inside;
        }
        j = i;
    }

    inside
}

/// True if `a` lies inside the polygon or the segment `a-b` touches any of
/// its edges (closing edge included).
pub fn segment_intersects_polygon(
    a: Coordinate,
    b: Coordinate,
    vertices: &[Coordinate],
) -> bool {
    if vertices.len() < 3 {
        return false;
    }
    if point_in_polygon(a, vertices) {
        return true;
    }

    let seg = (xy(a), xy(b));
    vertices
        .iter()
        .zip(vertices.iter().cycle().skip(1))
        .any(|(v1, v2)| segments_intersect_2d(seg.0, seg.1, xy(*v1), xy(*v2)))
}

fn xy(c: Coordinate) -> (f64, f64) {
    (c.longitude(), c.latitude())
}

/// Coordinates within this many ulps of their magnitude count as the same
/// place when deciding collinearity.
const ROUNDING_ULPS: f64 = 4.0;

/// Slack on the bounding-box test for collinear points, in degrees.
const BOX_SLACK_DEG: f64 = 1e-12;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Turn {
    Left,
    Right,
    Straight,
}

/// Direction of the turn `p -> q -> r`. The collinearity band scales with
/// the operands: near 55 degrees a coordinate's own rounding is ~1e-15, and
/// the cross product multiplies that by the offsets involved.
fn turn(p: (f64, f64), q: (f64, f64), r: (f64, f64)) -> Turn {
    let (ux, uy) = (q.0 - p.0, q.1 - p.1);
    let (vx, vy) = (r.0 - p.0, r.1 - p.1);
    let cross = ux * vy - uy * vx;

    let magnitude = [p.0, p.1, q.0, q.1, r.0, r.1]
        .iter()
        .fold(0.0_f64, |max, v| max.max(v.abs()));
    let noise =
        ROUNDING_ULPS * f64::EPSILON * magnitude * (ux.abs() + uy.abs() + vx.abs() + vy.abs());

    if cross > noise {
        Turn::Left
    } else if cross < -noise {
        Turn::Right
    } else {
        Turn::Straight
    }
}

/// `r` lies on segment `p-q`, given that the three are collinear.
fn in_span(p: (f64, f64), q: (f64, f64), r: (f64, f64)) -> bool {
    fn within(a: f64, b: f64, v: f64) -> bool {
        v >= a.min(b) - BOX_SLACK_DEG && v <= a.max(b) + BOX_SLACK_DEG
    }
    within(p.0, q.0, r.0) && within(p.1, q.1, r.1)
}

/// Closed-segment intersection: touching endpoints and collinear overlap
/// both count.
pub(crate) fn segments_intersect_2d(
    a1: (f64, f64),
    a2: (f64, f64),
    b1: (f64, f64),
    b2: (f64, f64),
) -> bool {
    let touches = |p, q, r| turn(p, q, r) == Turn::Straight && in_span(p, q, r);
    if touches(a1, a2, b1)
        || touches(a1, a2, b2)
        || touches(b1, b2, a1)
        || touches(b1, b2, a2)
    {
        return true;
    }

    let separates = |p, q, r, s| {
        matches!(
            (turn(p, q, r), turn(p, q, s)),
            (Turn::Left, Turn::Right) | (Turn::Right, Turn::Left)
        )
    };
    separates(a1, a2, b1, b2) && separates(b1, b2, a1, a2)
}

/// Axis-aligned bounding box in degree space.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Bounds {
    pub min_lng: f64,
    pub max_lng: f64,
    pub min_lat: f64,
    pub max_lat: f64,
}

impl Bounds {
    pub fn around(point: Coordinate) -> Self {
        Self {
            min_lng: point.longitude(),
            max_lng: point.longitude(),
            min_lat: point.latitude(),
            max_lat: point.latitude(),
        }
    }

    pub fn including(self, point: Coordinate) -> Self {
        Self {
            min_lng: self.min_lng.min(point.longitude()),
            max_lng: self.max_lng.max(point.longitude()),
            min_lat: self.min_lat.min(point.latitude()),
            max_lat: self.max_lat.max(point.latitude()),
        }
    }

    pub fn padded(self, margin_deg: f64) -> Self {
        let margin = margin_deg.max(0.0);
        Self {
            min_lng: self.min_lng - margin,
            max_lng: self.max_lng + margin,
            min_lat: self.min_lat - margin,
            max_lat: self.max_lat + margin,
        }
    }

    pub fn contains(&self, point: Coordinate) -> bool {
        (self.min_lng..=self.max_lng).contains(&point.longitude())
            && (self.min_lat..=self.max_lat).contains(&point.latitude())
    }
}
