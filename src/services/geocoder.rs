use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::Deserialize;
use std::time::Duration;
use thiserror::Error;

use crate::models::Geocoordinate;

/// Reasons a postal code lookup produced no location
#[derive(Debug, Error)]
pub enum GeocodeError {
    #[error("HTTP request failed: {0}")]
    RequestError(#[from] reqwest::Error),

    #[error("No places found for postal code {0}")]
    NotFound(String),

    #[error("Lookup returned status {0}")]
    ApiError(StatusCode),

    #[error("Invalid response format: {0}")]
    InvalidResponse(String),
}

/// Resolves postal codes to coordinates.
///
/// Absence is a normal outcome: implementations never fail, they return `None`.
#[async_trait]
pub trait Geocoder: Send + Sync {
    async fn resolve(&self, postal_code: &str) -> Option<Geocoordinate>;
}

#[derive(Debug, Deserialize)]
struct PostalCodeResponse {
    #[serde(default)]
    places: Vec<Place>,
}

#[derive(Debug, Deserialize)]
struct Place {
    #[serde(rename = "place name")]
    place_name: String,
    #[serde(rename = "state abbreviation")]
    state_abbreviation: String,
    latitude: String,
    longitude: String,
}

/// Client for the Zippopotam postal code API
///
/// `GET {base_url}/{country}/{postal_code}`
pub struct ZippopotamClient {
    base_url: String,
    country: String,
    client: Client,
}

impl ZippopotamClient {
    pub fn new(base_url: String, country: String, timeout_secs: u64) -> Result<Self, GeocodeError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .build()?;

        Ok(Self {
            base_url,
            country,
            client,
        })
    }

    /// Look up a postal code, reporting why nothing came back
    pub async fn lookup(&self, postal_code: &str) -> Result<Geocoordinate, GeocodeError> {
        let url = format!(
            "{}/{}/{}",
            self.base_url.trim_end_matches('/'),
            self.country,
            urlencoding::encode(postal_code)
        );

        let response = self.client.get(&url).send().await?;

        match response.status() {
            status if status.is_success() => {}
            StatusCode::NOT_FOUND => return Err(GeocodeError::NotFound(postal_code.to_string())),
            status => return Err(GeocodeError::ApiError(status)),
        }

        let body: PostalCodeResponse = response
            .json()
            .await
            .map_err(|e| GeocodeError::InvalidResponse(e.to_string()))?;

        let place = body
            .places
            .into_iter()
            .next()
            .ok_or_else(|| GeocodeError::NotFound(postal_code.to_string()))?;

        let latitude = parse_coordinate(&place.latitude)?;
        let longitude = parse_coordinate(&place.longitude)?;

        Ok(Geocoordinate {
            latitude,
            longitude,
            city: place.place_name,
            state: place.state_abbreviation,
        })
    }
}

fn parse_coordinate(raw: &str) -> Result<f64, GeocodeError> {
    raw.trim()
        .parse::<f64>()
        .ok()
        .filter(|v| v.is_finite())
        .ok_or_else(|| GeocodeError::InvalidResponse(format!("bad coordinate {:?}", raw)))
}

#[async_trait]
impl Geocoder for ZippopotamClient {
    async fn resolve(&self, postal_code: &str) -> Option<Geocoordinate> {
        match self.lookup(postal_code).await {
            Ok(location) => Some(location),
            Err(GeocodeError::NotFound(code)) => {
                tracing::debug!("No location for postal code {:?}", code);
                None
            }
            Err(e) => {
                tracing::warn!("Geocode lookup failed for {:?}: {}", postal_code, e);
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const NEW_YORK_10001: &str = r#"{
        "post code": "10001",
        "country": "United States",
        "country abbreviation": "US",
        "places": [
            {
                "place name": "New York City",
                "longitude": "-73.9967",
                "state": "New York",
                "state abbreviation": "NY",
                "latitude": "40.7484"
            }
        ]
    }"#;

    fn client_for(server: &mockito::ServerGuard) -> ZippopotamClient {
        ZippopotamClient::new(server.url(), "us".to_string(), 5).unwrap()
    }

    #[tokio::test]
    async fn test_resolve_first_place() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("GET", "/us/10001")
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(NEW_YORK_10001)
            .create_async()
            .await;

        let location = client_for(&server).resolve("10001").await.unwrap();

        mock.assert_async().await;
        assert_eq!(location.city, "New York City");
        assert_eq!(location.state, "NY");
        assert!((location.latitude - 40.7484).abs() < 1e-9);
        assert!((location.longitude + 73.9967).abs() < 1e-9);
    }

    #[tokio::test]
    async fn test_unknown_postal_code_is_absent() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", "/us/00000")
            .with_status(404)
            .with_body("{}")
            .create_async()
            .await;

        let client = client_for(&server);
        assert!(client.resolve("00000").await.is_none());
        assert!(matches!(client.lookup("00000").await, Err(GeocodeError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_empty_places_is_absent() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", "/us/99999")
            .with_status(200)
            .with_body(r#"{"places": []}"#)
            .create_async()
            .await;

        assert!(client_for(&server).resolve("99999").await.is_none());
    }

    #[tokio::test]
    async fn test_malformed_response_is_absent() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", "/us/12345")
            .with_status(200)
            .with_body(r#"{"places": [{"place name": "X", "state abbreviation": "Y", "latitude": "north", "longitude": "1"}]}"#)
            .create_async()
            .await;

        let client = client_for(&server);
        assert!(matches!(client.lookup("12345").await, Err(GeocodeError::InvalidResponse(_))));
        assert!(client.resolve("12345").await.is_none());
    }

    #[tokio::test]
    async fn test_server_error_is_absent() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", "/us/10001")
            .with_status(503)
            .create_async()
            .await;

        assert!(client_for(&server).resolve("10001").await.is_none());
    }

    #[tokio::test]
    async fn test_repeated_lookups_are_not_cached() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("GET", "/us/10001")
            .with_status(200)
            .with_body(NEW_YORK_10001)
            .expect(2)
            .create_async()
            .await;

        let client = client_for(&server);
        client.resolve("10001").await;
        client.resolve("10001").await;

        mock.assert_async().await;
    }
}
