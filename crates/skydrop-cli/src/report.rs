//! Result files for one planning date.

use anyhow::{Context, Result};
use chrono::NaiveDate;
use serde::Serialize;
use serde_json::{json, Value};
use skydrop_core::{Coordinate, DayPlan, FlightPathPoint, Order, OrderOutcome};
use std::fs;
use std::path::{Path, PathBuf};

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct DeliveryRow<'a> {
    order_no: &'a str,
    outcome: Option<OrderOutcome>,
    cost_in_pence: i64,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct FlightPathRow<'a> {
    order_no: &'a str,
    from_longitude: f64,
    from_latitude: f64,
    angle: Option<f64>,
    to_longitude: f64,
    to_latitude: f64,
    ticks_since_start_of_calculation: u64,
}

/// Paths of the files written for one run.
#[derive(Debug, Clone)]
pub struct ReportPaths {
    pub deliveries: PathBuf,
    pub flightpath: PathBuf,
    pub geojson: PathBuf,
}

pub fn deliveries_json(orders: &[Order]) -> Value {
    let rows: Vec<_> = orders
        .iter()
        .map(|order| DeliveryRow {
            order_no: &order.order_no,
            outcome: order.outcome(),
            cost_in_pence: order.cost_in_pence(),
        })
        .collect();
    json!(rows)
}

pub fn flightpath_json(points: &[FlightPathPoint]) -> Value {
    let rows: Vec<_> = points
        .iter()
        .map(|point| FlightPathRow {
            order_no: &point.order_no,
            from_longitude: point.from.longitude(),
            from_latitude: point.from.latitude(),
            angle: point.angle,
            to_longitude: point.to.longitude(),
            to_latitude: point.to.latitude(),
            ticks_since_start_of_calculation: point.ticks_since_start,
        })
        .collect();
    json!(rows)
}

/// A single LineString feature tracing the whole flight.
pub fn drone_geojson(trace: &[Coordinate]) -> Value {
    let coordinates: Vec<[f64; 2]> = trace
        .iter()
        .map(|c| [c.longitude(), c.latitude()])
        .collect();
    json!({
        "type": "FeatureCollection",
        "features": [{
            "type": "Feature",
            "properties": {},
            "geometry": {
                "type": "LineString",
                "coordinates": coordinates,
            }
        }]
    })
}

pub fn write_reports(dir: &Path, date: NaiveDate, plan: &DayPlan) -> Result<ReportPaths> {
    fs::create_dir_all(dir)
        .with_context(|| format!("Failed to create output directory {}", dir.display()))?;

    let paths = ReportPaths {
        deliveries: dir.join(format!("deliveries-{date}.json")),
        flightpath: dir.join(format!("flightpath-{date}.json")),
        geojson: dir.join(format!("drone-{date}.geojson")),
    };

    write_json(&paths.deliveries, &deliveries_json(&plan.orders))?;
    write_json(&paths.flightpath, &flightpath_json(plan.flight_log.points()))?;
    write_json(&paths.geojson, &drone_geojson(&plan.flight_log.trace()))?;
    Ok(paths)
}

fn write_json(path: &Path, value: &Value) -> Result<()> {
    let body = serde_json::to_string_pretty(value).context("Failed to serialize report")?;
    fs::write(path, body).with_context(|| format!("Failed to write {}", path.display()))
}
