//! JSON shapes shared by the REST service and the on-disk data files.

use crate::error::SourceError;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use skydrop_core::{Coordinate, Zone};

/// Name given to the central-area polygon, which arrives as a bare vertex list.
pub const CENTRAL_AREA_NAME: &str = "Central Area";

/// One vertex of the central area.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NamedVertex {
    #[serde(default)]
    pub name: String,
    pub longitude: f64,
    pub latitude: f64,
}

/// A no-fly zone as `[[lng, lat], ...]`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NoFlyZoneDto {
    pub name: String,
    pub coordinates: Vec<[f64; 2]>,
}

pub fn central_area_from_vertices(vertices: Vec<NamedVertex>) -> Result<Zone, SourceError> {
    let ring = vertices
        .into_iter()
        .map(|vertex| Coordinate::new(vertex.longitude, vertex.latitude))
        .collect::<Result<Vec<_>, _>>()?;
    Ok(Zone::new(CENTRAL_AREA_NAME, ring)?)
}

impl TryFrom<NoFlyZoneDto> for Zone {
    type Error = SourceError;

    fn try_from(dto: NoFlyZoneDto) -> Result<Self, Self::Error> {
        let ring = dto
            .coordinates
            .into_iter()
            .map(|[lng, lat]| Coordinate::new(lng, lat))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Zone::new(dto.name, ring)?)
    }
}

pub fn no_fly_zones_from_dtos(dtos: Vec<NoFlyZoneDto>) -> Result<Vec<Zone>, SourceError> {
    dtos.into_iter().map(Zone::try_from).collect()
}

/// Parse a JSON document, tagging failures with where it came from.
pub fn decode<T: DeserializeOwned>(origin: &str, body: &str) -> Result<T, SourceError> {
    serde_json::from_str(body).map_err(|source| SourceError::Json {
        origin: origin.to_string(),
        source,
    })
}
