//! Blocking HTTP client for the delivery data service.

use crate::error::SourceError;
use crate::source::DataSource;
use crate::wire::{self, NamedVertex, NoFlyZoneDto};
use chrono::NaiveDate;
use reqwest::blocking::Client;
use reqwest::Url;
use serde::de::DeserializeOwned;
use skydrop_core::{Order, Restaurant, Zone};
use std::time::Duration;
use tracing::debug;

pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

pub struct RestClient {
    client: Client,
    base_url: Url,
}

impl RestClient {
    pub fn new(base_url: &str) -> Result<Self, SourceError> {
        Self::with_timeout(base_url, DEFAULT_TIMEOUT)
    }

    pub fn with_timeout(base_url: &str, timeout: Duration) -> Result<Self, SourceError> {
        let base_url = parse_base_url(base_url)?;
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|source| SourceError::Http {
                url: base_url.to_string(),
                source,
            })?;
        Ok(Self { client, base_url })
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// The service answers `GET /isAlive` with a JSON `true`.
    pub fn is_alive(&self) -> Result<bool, SourceError> {
        let (_, body) = self.get_text("isAlive")?;
        Ok(body.trim() == "true")
    }

    pub fn ensure_alive(&self) -> Result<(), SourceError> {
        if self.is_alive()? {
            Ok(())
        } else {
            Err(SourceError::NotAlive(self.base_url.to_string()))
        }
    }

    fn endpoint(&self, path: &str) -> Result<Url, SourceError> {
        self.base_url
            .join(path)
            .map_err(|err| SourceError::InvalidUrl {
                url: format!("{}{}", self.base_url, path),
                reason: err.to_string(),
            })
    }

    fn get_text(&self, path: &str) -> Result<(String, String), SourceError> {
        let url = self.endpoint(path)?;
        debug!(%url, "GET");

        let response = self
            .client
            .get(url.clone())
            .send()
            .map_err(|source| SourceError::Http {
                url: url.to_string(),
                source,
            })?;

        if !response.status().is_success() {
            return Err(SourceError::Status {
                url: url.to_string(),
                status: response.status(),
            });
        }

        let body = response.text().map_err(|source| SourceError::Http {
            url: url.to_string(),
            source,
        })?;
        debug!(%url, bytes = body.len(), "response received");
        Ok((url.to_string(), body))
    }

    fn get_json<T: DeserializeOwned>(&self, path: &str) -> Result<T, SourceError> {
        let (url, body) = self.get_text(path)?;
        wire::decode(&url, &body)
    }
}

impl DataSource for RestClient {
    fn restaurants(&self) -> Result<Vec<Restaurant>, SourceError> {
        self.get_json("restaurants")
    }

    fn orders_on(&self, date: NaiveDate) -> Result<Vec<Order>, SourceError> {
        self.get_json(&orders_path(date))
    }

    fn central_area(&self) -> Result<Zone, SourceError> {
        let vertices: Vec<NamedVertex> = self.get_json("centralArea")?;
        wire::central_area_from_vertices(vertices)
    }

    fn no_fly_zones(&self) -> Result<Vec<Zone>, SourceError> {
        let dtos: Vec<NoFlyZoneDto> = self.get_json("noFlyZones")?;
        wire::no_fly_zones_from_dtos(dtos)
    }
}

fn orders_path(date: NaiveDate) -> String {
    format!("orders/{}", date.format("%Y-%m-%d"))
}

/// Parse an http(s) base URL, making sure relative joins land beneath it.
pub fn parse_base_url(raw: &str) -> Result<Url, SourceError> {
    let invalid = |reason: String| SourceError::InvalidUrl {
        url: raw.to_string(),
        reason,
    };

    let mut url = Url::parse(raw.trim()).map_err(|err| invalid(err.to_string()))?;
    if !matches!(url.scheme(), "http" | "https") {
        return Err(invalid(format!("unsupported scheme {}", url.scheme())));
    }
    if url.cannot_be_a_base() {
        return Err(invalid("cannot be a base".to_string()));
    }
    if !url.path().ends_with('/') {
        let path = format!("{}/", url.path());
        url.set_path(&path);
    }
    Ok(url)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn base_url_gets_trailing_slash() {
        let url = parse_base_url("https://ilp-rest.example.net/api").unwrap();
        assert_eq!(url.as_str(), "https://ilp-rest.example.net/api/");
        assert_eq!(
            url.join("noFlyZones").unwrap().as_str(),
            "https://ilp-rest.example.net/api/noFlyZones"
        );
    }

    #[test]
    fn trailing_slash_is_tolerated() {
        let with = parse_base_url("http://localhost:8080/").unwrap();
        let without = parse_base_url("http://localhost:8080").unwrap();
        assert_eq!(with, without);
    }

    #[test]
    fn non_http_urls_are_rejected() {
        for raw in ["not a url", "ftp://example.com", "mailto:ops@example.com"] {
            assert!(
                matches!(parse_base_url(raw), Err(SourceError::InvalidUrl { .. })),
                "{raw} was accepted"
            );
        }
    }

    #[test]
    fn orders_path_uses_iso_date() {
        let date = NaiveDate::from_ymd_opt(2025, 3, 3).unwrap();
        assert_eq!(orders_path(date), "orders/2025-03-03");
    }

    #[test]
    fn endpoints_resolve_under_base() {
        let client = RestClient::new("http://localhost:8080/ilp").unwrap();
        assert_eq!(client.base_url().as_str(), "http://localhost:8080/ilp/");
        assert_eq!(
            client.endpoint("orders/2025-03-03").unwrap().as_str(),
            "http://localhost:8080/ilp/orders/2025-03-03"
        );
    }
}
