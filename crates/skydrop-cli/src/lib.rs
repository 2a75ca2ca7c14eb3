//! Skydrop CLI
//!
//! Fetches a day's data, plans the deliveries and writes the result files.

pub mod config;
pub mod report;

use anyhow::{Context, Result};
use chrono::NaiveDate;
use skydrop_client::DataSource;
use skydrop_core::{plan_day, DayPlan, PlannerConfig, Restaurant};
use std::path::Path;
use tracing::{info, warn};

pub use config::Config;
pub use report::{write_reports, ReportPaths};

/// Load everything for `date` from `source`, plan it and write the reports.
pub fn plan_and_report(
    source: &dyn DataSource,
    date: NaiveDate,
    planner: &PlannerConfig,
    output_dir: &Path,
) -> Result<(DayPlan, ReportPaths)> {
    let restaurants = source.restaurants().context("Failed to load restaurants")?;
    let orders = source
        .orders_on(date)
        .with_context(|| format!("Failed to load orders for {date}"))?;
    let zones = source.zone_model().context("Failed to load airspace")?;
    info!(
        %date,
        restaurants = restaurants.len(),
        orders = orders.len(),
        no_fly_zones = zones.no_fly_zones().len(),
        "data loaded"
    );

    let plan = plan_day(orders, &restaurants, &zones, planner).context("Planning failed")?;
    warn_closed_restaurants(&plan, &restaurants, date);

    let paths = write_reports(output_dir, date, &plan)?;
    info!(
        delivered = plan.delivered_count(),
        orders = plan.orders.len(),
        moves = plan.flight_log.len(),
        remaining_moves = plan.remaining_moves,
        output = %output_dir.display(),
        "run complete"
    );
    Ok((plan, paths))
}

fn warn_closed_restaurants(plan: &DayPlan, restaurants: &[Restaurant], date: NaiveDate) {
    for order in &plan.orders {
        let Some(name) = order.restaurant_name() else {
            continue;
        };
        let closed = restaurants
            .iter()
            .find(|r| r.name == name)
            .is_some_and(|r| !r.is_open_on(date));
        if closed {
            warn!(
                order_no = %order.order_no,
                restaurant = name,
                %date,
                "restaurant closed on order date"
            );
        }
    }
}
