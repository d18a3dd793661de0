//! Geocoder
//!
//! Resolves filming addresses to coordinates through a Google-style
//! geocoding API. Lookups are retried on HTTP errors and on any response
//! whose `status` is not `OK`; an address that cannot be resolved keeps no
//! coordinates.

use std::time::Duration;

use serde::Deserialize;
use tracing::{debug, warn};

use crate::config::Config;
use crate::movies::{Location, Movie};

/// Pause between two lookups of the same address
const DEFAULT_RETRY_DELAY: Duration = Duration::from_secs(1);

/// Prefix narrowing every address to the city
const CITY: &str = "san francisco";

// == API Response ==
#[derive(Debug, Deserialize)]
struct GeocodeResponse {
    status: String,
    #[serde(default)]
    results: Vec<GeocodeResult>,
}

#[derive(Debug, Deserialize)]
struct GeocodeResult {
    geometry: Geometry,
}

#[derive(Debug, Deserialize)]
struct Geometry {
    location: Coordinates,
}

#[derive(Debug, Clone, Copy, Deserialize)]
struct Coordinates {
    lat: f64,
    lng: f64,
}

// == Geocoder ==
#[derive(Debug, Clone)]
pub struct Geocoder {
    client: reqwest::Client,
    endpoint: String,
    api_key: Option<String>,
    /// Lookups per address, at least one
    attempts: u32,
    retry_delay: Duration,
}

impl Geocoder {
    // == Constructor ==
    /// Creates a geocoder querying `endpoint` up to `attempts` times per
    /// address.
    pub fn new(endpoint: impl Into<String>, attempts: u32) -> Self {
        Self {
            client: reqwest::Client::new(),
            endpoint: endpoint.into(),
            api_key: None,
            attempts: attempts.max(1),
            retry_delay: DEFAULT_RETRY_DELAY,
        }
    }

    /// Creates the configured geocoder, or None when geocoding is disabled.
    pub fn from_config(config: &Config) -> Option<Self> {
        if config.geocode_attempts == 0 {
            return None;
        }

        let geocoder = Self::new(&config.geocode_endpoint, config.geocode_attempts);
        Some(match &config.geocode_api_key {
            Some(key) => geocoder.with_api_key(key),
            None => geocoder,
        })
    }

    pub fn with_api_key(mut self, api_key: impl Into<String>) -> Self {
        self.api_key = Some(api_key.into());
        self
    }

    pub fn with_retry_delay(mut self, retry_delay: Duration) -> Self {
        self.retry_delay = retry_delay;
        self
    }

    // == Locate ==
    /// Returns the location of `address`, without coordinates if the lookup
    /// failed.
    pub async fn locate(&self, address: &str) -> Location {
        match self.coordinates(address).await {
            Some(Coordinates { lat, lng }) => Location {
                address: address.to_string(),
                lat: Some(lat),
                lng: Some(lng),
            },
            None => {
                warn!("Could not find coordinates for address {}", address);
                Location::from_address(address)
            }
        }
    }

    /// Resolves every location of `movies` in place, one address at a time.
    pub async fn locate_movies(&self, movies: &mut [Movie]) {
        for location in movies.iter_mut().flat_map(|movie| movie.locations.iter_mut()) {
            let located = self.locate(&location.address).await;
            *location = located;
        }
    }

    async fn coordinates(&self, address: &str) -> Option<Coordinates> {
        let query = format!("{} {}", CITY, address);

        for attempt in 1..=self.attempts {
            match self.lookup(&query).await {
                Ok(response) if response.status == "OK" => {
                    return response
                        .results
                        .first()
                        .map(|result| result.geometry.location);
                }
                Ok(response) => {
                    debug!(attempt, status = %response.status, address, "Geocoding not OK");
                }
                Err(err) => {
                    debug!(attempt, error = %err, address, "Geocoding request failed");
                }
            }

            if attempt < self.attempts {
                tokio::time::sleep(self.retry_delay).await;
            }
        }

        None
    }

    async fn lookup(&self, query: &str) -> reqwest::Result<GeocodeResponse> {
        let mut request = self.client.get(&self.endpoint).query(&[("address", query)]);
        if let Some(key) = &self.api_key {
            request = request.query(&[("key", key.as_str())]);
        }

        request
            .send()
            .await?
            .error_for_status()?
            .json::<GeocodeResponse>()
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    use axum::{
        extract::{Query, State},
        http::StatusCode,
        response::{IntoResponse, Response},
        routing::get,
        Json, Router,
    };
    use parking_lot::Mutex;
    use serde_json::json;

    /// Failure served by the stub before it starts answering
    #[derive(Clone, Copy)]
    enum Failure {
        Status,
        ServerError,
    }

    #[derive(Clone)]
    struct Stub {
        failures: usize,
        failure: Failure,
        calls: Arc<AtomicUsize>,
        params: Arc<Mutex<Vec<HashMap<String, String>>>>,
    }

    async fn geocode(
        State(stub): State<Stub>,
        Query(params): Query<HashMap<String, String>>,
    ) -> Response {
        stub.params.lock().push(params);
        let call = stub.calls.fetch_add(1, Ordering::SeqCst);

        if call < stub.failures {
            return match stub.failure {
                Failure::Status => {
                    Json(json!({"status": "OVER_QUERY_LIMIT", "results": []})).into_response()
                }
                Failure::ServerError => StatusCode::INTERNAL_SERVER_ERROR.into_response(),
            };
        }

        Json(json!({
            "status": "OK",
            "results": [{"geometry": {"location": {"lat": 37.81, "lng": -122.47}}}]
        }))
        .into_response()
    }

    /// Serves the geocoding API locally and returns its endpoint.
    async fn spawn_stub(failures: usize, failure: Failure) -> (String, Stub) {
        let stub = Stub {
            failures,
            failure,
            calls: Arc::new(AtomicUsize::new(0)),
            params: Arc::new(Mutex::new(Vec::new())),
        };
        let app = Router::new()
            .route("/geocode/json", get(geocode))
            .with_state(stub.clone());

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        (format!("http://{}/geocode/json", addr), stub)
    }

    fn geocoder(endpoint: &str, attempts: u32) -> Geocoder {
        Geocoder::new(endpoint, attempts).with_retry_delay(Duration::from_millis(1))
    }

    #[tokio::test]
    async fn test_locate_success() {
        let (endpoint, stub) = spawn_stub(0, Failure::Status).await;

        let location = geocoder(&endpoint, 5)
            .with_api_key("secret")
            .locate("Fort Point")
            .await;

        assert_eq!(location.address, "Fort Point");
        assert_eq!(location.lat, Some(37.81));
        assert_eq!(location.lng, Some(-122.47));
        assert_eq!(stub.calls.load(Ordering::SeqCst), 1);

        let params = stub.params.lock();
        assert_eq!(params[0]["address"], "san francisco Fort Point");
        assert_eq!(params[0]["key"], "secret");
    }

    #[tokio::test]
    async fn test_locate_retries_until_ok() {
        let (endpoint, stub) = spawn_stub(2, Failure::Status).await;

        let location = geocoder(&endpoint, 5).locate("Fort Point").await;

        assert_eq!(location.lat, Some(37.81));
        assert_eq!(stub.calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn test_locate_retries_on_server_error() {
        let (endpoint, stub) = spawn_stub(1, Failure::ServerError).await;

        let location = geocoder(&endpoint, 5).locate("Fort Point").await;

        assert_eq!(location.lng, Some(-122.47));
        assert_eq!(stub.calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_locate_gives_up_after_attempts() {
        let (endpoint, stub) = spawn_stub(10, Failure::Status).await;

        let location = geocoder(&endpoint, 3).locate("Fort Point").await;

        assert_eq!(location, Location::from_address("Fort Point"));
        assert_eq!(stub.calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn test_locate_unreachable_endpoint() {
        let location = geocoder("http://127.0.0.1:1/geocode/json", 2)
            .locate("Fort Point")
            .await;

        assert_eq!(location, Location::from_address("Fort Point"));
    }

    #[tokio::test]
    async fn test_locate_movies_fills_every_location() {
        let (endpoint, stub) = spawn_stub(0, Failure::Status).await;
        let mut movies = vec![
            Movie {
                title: "Vertigo".to_string(),
                locations: vec![
                    Location::from_address("Fort Point"),
                    Location::from_address("Mission Dolores"),
                ],
                ..Movie::default()
            },
            Movie {
                title: "Bullitt".to_string(),
                ..Movie::default()
            },
        ];

        geocoder(&endpoint, 1).locate_movies(&mut movies).await;

        assert_eq!(stub.calls.load(Ordering::SeqCst), 2);
        assert_eq!(movies[0].locations[1].address, "Mission Dolores");
        assert!(movies[0]
            .locations
            .iter()
            .all(|location| location.lat.is_some() && location.lng.is_some()));
        assert!(movies[1].locations.is_empty());
    }

    #[test]
    fn test_from_config() {
        let disabled = Config {
            geocode_attempts: 0,
            ..Config::default()
        };
        assert!(Geocoder::from_config(&disabled).is_none());

        let enabled = Config {
            geocode_api_key: Some("secret".to_string()),
            ..Config::default()
        };
        let geocoder = Geocoder::from_config(&enabled).unwrap();
        assert_eq!(geocoder.attempts, 5);
        assert_eq!(geocoder.api_key.as_deref(), Some("secret"));
    }
}
