//! Offline data source reading the service's JSON documents from a directory.

use crate::error::SourceError;
use crate::source::DataSource;
use crate::wire::{self, NamedVertex, NoFlyZoneDto};
use chrono::NaiveDate;
use serde::de::DeserializeOwned;
use skydrop_core::{Order, Restaurant, Zone};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

pub const RESTAURANTS_FILE: &str = "restaurants.json";
pub const ORDERS_FILE: &str = "orders.json";
pub const CENTRAL_AREA_FILE: &str = "central-area.json";
pub const NO_FLY_ZONES_FILE: &str = "no-fly-zones.json";

#[derive(Debug, Clone)]
pub struct FileSource {
    dir: PathBuf,
}

impl FileSource {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn read<T: DeserializeOwned>(&self, file: &str) -> Result<T, SourceError> {
        let path = self.dir.join(file);
        debug!(path = %path.display(), "reading");
        let body = fs::read_to_string(&path).map_err(|source| SourceError::Io {
            path: path.clone(),
            source,
        })?;
        wire::decode(&path.display().to_string(), &body)
    }
}

impl DataSource for FileSource {
    fn restaurants(&self) -> Result<Vec<Restaurant>, SourceError> {
        self.read(RESTAURANTS_FILE)
    }

    /// The orders file holds every day; only `date`'s orders are returned.
    /// Orders without a readable date belong to no day and are left out.
    fn orders_on(&self, date: NaiveDate) -> Result<Vec<Order>, SourceError> {
        let orders: Vec<Order> = self.read(ORDERS_FILE)?;
        let (dated, undated): (Vec<_>, Vec<_>) = orders
            .into_iter()
            .partition(|order| order.order_date.is_some());
        if !undated.is_empty() {
            warn!(
                count = undated.len(),
                "skipping orders without a readable orderDate"
            );
        }
        Ok(dated
            .into_iter()
            .filter(|order| order.order_date == Some(date))
            .collect())
    }

    fn central_area(&self) -> Result<Zone, SourceError> {
        let vertices: Vec<NamedVertex> = self.read(CENTRAL_AREA_FILE)?;
        wire::central_area_from_vertices(vertices)
    }

    fn no_fly_zones(&self) -> Result<Vec<Zone>, SourceError> {
        let dtos: Vec<NoFlyZoneDto> = self.read(NO_FLY_ZONES_FILE)?;
        wire::no_fly_zones_from_dtos(dtos)
    }
}
