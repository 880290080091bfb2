//! Geocoding abstraction layer
//!
//! Turns the free text of an incoming job into a [`GeoLocation`] before the
//! slot engine runs. Two backends:
//! - "district" → DistrictGeocoder (offline Kraków district table, default)
//! - "nominatim" → RateLimitedNominatimGeocoder (rate limited, circuit breaker)
//!
//! Unknown text is a visible `LocationUnresolved` failure; no backend invents
//! coordinates.

use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use tokio::sync::Mutex;
use tracing::{error, info, warn};

use crate::config::Config;
use crate::error::GeocodeError;
use crate::services::nominatim::NominatimClient;
use crate::types::GeoLocation;

/// Below this confidence a resolved location is logged as doubtful
pub const LOW_CONFIDENCE_THRESHOLD: f64 = 0.3;

/// Geocoder trait - abstraction for all geocoding implementations
#[async_trait]
pub trait Geocoder: Send + Sync {
    /// Resolve free text to a location
    async fn resolve(&self, text: &str) -> Result<GeocodingResult, GeocodeError>;

    /// Get the name of this geocoder implementation
    fn name(&self) -> &'static str;
}

/// Result of geocoding operation
#[derive(Debug, Clone, PartialEq)]
pub struct GeocodingResult {
    pub location: GeoLocation,
    /// Confidence score 0.0-1.0
    pub confidence: f64,
}

impl GeocodingResult {
    pub fn is_low_confidence(&self) -> bool {
        self.confidence < LOW_CONFIDENCE_THRESHOLD
    }
}

// ==========================================================================
// DistrictGeocoder
// ==========================================================================

/// Known Kraków districts. Specific districts come before the city itself so
/// "Nowa Huta, Kraków" resolves to the district.
const DISTRICTS: &[(&str, f64, f64)] = &[
    ("olsza", 50.0811, 19.9606),
    ("kazimierz", 50.0526, 19.9442),
    ("nowa huta", 50.0722, 20.0382),
    ("podgorze", 50.0413, 19.9501),
    ("bronowice", 50.0863, 19.8974),
    ("ruczaj", 50.0125, 19.9142),
    ("pradnik", 50.0934, 19.9324),
    ("krakow", 50.0647, 19.9450),
];

/// Offline geocoder matching district names anywhere in the text
pub struct DistrictGeocoder;

impl DistrictGeocoder {
    pub fn new() -> Self {
        Self
    }

    /// Lowercase and strip Polish diacritics so "Podgórze" matches "podgorze"
    fn normalize(text: &str) -> String {
        text.trim()
            .to_lowercase()
            .chars()
            .map(|c| match c {
                'ą' => 'a',
                'ć' => 'c',
                'ę' => 'e',
                'ł' => 'l',
                'ń' => 'n',
                'ó' => 'o',
                'ś' => 's',
                'ź' | 'ż' => 'z',
                other => other,
            })
            .collect()
    }

    fn lookup(text: &str) -> Option<(f64, f64)> {
        let query = Self::normalize(text);
        DISTRICTS
            .iter()
            .find(|(key, _, _)| query.contains(key))
            .map(|&(_, lat, lng)| (lat, lng))
    }
}

impl Default for DistrictGeocoder {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Geocoder for DistrictGeocoder {
    async fn resolve(&self, text: &str) -> Result<GeocodingResult, GeocodeError> {
        let (lat, lng) = Self::lookup(text)
            .ok_or_else(|| GeocodeError::LocationUnresolved(text.trim().to_string()))?;

        Ok(GeocodingResult {
            // Keep the caller's text for display
            location: GeoLocation::new(lat, lng, text.trim()),
            confidence: 0.9,
        })
    }

    fn name(&self) -> &'static str {
        "district"
    }
}

// ==========================================================================
// RateLimiter
// ==========================================================================

/// Rate limiter that enforces minimum interval between calls
pub struct RateLimiter {
    last_call: Arc<Mutex<Option<Instant>>>,
    min_interval: Duration,
}

impl RateLimiter {
    pub fn new(min_interval: Duration) -> Self {
        Self {
            last_call: Arc::new(Mutex::new(None)),
            min_interval,
        }
    }

    /// Wait until it's safe to make another call
    pub async fn wait(&self) {
        let mut last = self.last_call.lock().await;

        if let Some(last_time) = *last {
            let elapsed = last_time.elapsed();
            if elapsed < self.min_interval {
                tokio::time::sleep(self.min_interval - elapsed).await;
            }
        }

        *last = Some(Instant::now());
    }
}

// ==========================================================================
// CircuitBreaker
// ==========================================================================

/// Circuit breaker to prevent hammering a failing service
pub struct CircuitBreaker {
    failure_count: AtomicU32,
    threshold: u32,
    last_failure: parking_lot::Mutex<Option<Instant>>,
    recovery_time: Duration,
}

impl CircuitBreaker {
    pub fn new(threshold: u32, recovery_time: Duration) -> Self {
        Self {
            failure_count: AtomicU32::new(0),
            threshold,
            last_failure: parking_lot::Mutex::new(None),
            recovery_time,
        }
    }

    /// Check if circuit is open (blocking calls)
    pub fn is_open(&self) -> bool {
        if self.failure_count.load(Ordering::Relaxed) < self.threshold {
            return false;
        }
        // Half-open once the recovery time has passed
        match *self.last_failure.lock() {
            Some(last_time) => last_time.elapsed() < self.recovery_time,
            None => true,
        }
    }

    pub fn record_failure(&self) {
        self.failure_count.fetch_add(1, Ordering::Relaxed);
        *self.last_failure.lock() = Some(Instant::now());
    }

    /// Record a success (resets failure count)
    pub fn record_success(&self) {
        self.failure_count.store(0, Ordering::Relaxed);
    }
}

// ==========================================================================
// RateLimitedNominatimGeocoder
// ==========================================================================

/// Default rate limit interval (1.5 seconds - Nominatim allows 1 req/s)
pub const DEFAULT_RATE_LIMIT_MS: u64 = 1500;

pub const DEFAULT_CIRCUIT_BREAKER_THRESHOLD: u32 = 3;

pub const DEFAULT_CIRCUIT_BREAKER_RECOVERY_SECS: u64 = 300;

/// Confidence reported when Nominatim gives no importance value
const DEFAULT_NOMINATIM_CONFIDENCE: f64 = 0.8;

/// Nominatim geocoder with rate limiting and circuit breaker protection
pub struct RateLimitedNominatimGeocoder {
    client: NominatimClient,
    rate_limiter: RateLimiter,
    pub(crate) circuit_breaker: CircuitBreaker,
}

impl RateLimitedNominatimGeocoder {
    pub fn with_config(
        client: NominatimClient,
        rate_limit_interval: Duration,
        circuit_breaker_threshold: u32,
        circuit_breaker_recovery: Duration,
    ) -> Self {
        Self {
            client,
            rate_limiter: RateLimiter::new(rate_limit_interval),
            circuit_breaker: CircuitBreaker::new(circuit_breaker_threshold, circuit_breaker_recovery),
        }
    }
}

#[async_trait]
impl Geocoder for RateLimitedNominatimGeocoder {
    async fn resolve(&self, text: &str) -> Result<GeocodingResult, GeocodeError> {
        let query = text.trim();
        if query.is_empty() {
            return Err(GeocodeError::LocationUnresolved(String::new()));
        }

        if self.circuit_breaker.is_open() {
            warn!("Circuit breaker is open, rejecting geocoding request");
            return Err(GeocodeError::Unavailable);
        }

        self.rate_limiter.wait().await;

        match self.client.search(query).await {
            Ok(Some(hit)) => {
                self.circuit_breaker.record_success();
                Ok(GeocodingResult {
                    location: GeoLocation::new(hit.lat, hit.lng, query),
                    confidence: hit
                        .importance
                        .map(|i| i.clamp(0.0, 1.0))
                        .unwrap_or(DEFAULT_NOMINATIM_CONFIDENCE),
                })
            }
            Ok(None) => {
                // No result found is not a service failure
                self.circuit_breaker.record_success();
                Err(GeocodeError::LocationUnresolved(query.to_string()))
            }
            Err(e) => {
                self.circuit_breaker.record_failure();
                error!("Geocoding failed: {}", e);
                Err(GeocodeError::Backend(e))
            }
        }
    }

    fn name(&self) -> &'static str {
        "nominatim"
    }
}

// ==========================================================================
// Factory function
// ==========================================================================

/// Create geocoder based on `GEOCODER_BACKEND`
pub fn create_geocoder(config: &Config) -> anyhow::Result<Box<dyn Geocoder>> {
    match config.geocoder_backend.as_str() {
        "district" => {
            info!("Using DistrictGeocoder");
            Ok(Box::new(DistrictGeocoder::new()))
        }
        "nominatim" => {
            info!("Using RateLimitedNominatimGeocoder at {}", config.nominatim_url);
            let client = NominatimClient::new(&config.nominatim_url, config.nominatim_country_codes.clone())?;
            Ok(Box::new(RateLimitedNominatimGeocoder::with_config(
                client,
                Duration::from_millis(DEFAULT_RATE_LIMIT_MS),
                DEFAULT_CIRCUIT_BREAKER_THRESHOLD,
                Duration::from_secs(DEFAULT_CIRCUIT_BREAKER_RECOVERY_SECS),
            )))
        }
        other => {
            warn!("Unknown GEOCODER_BACKEND '{}', using district table", other);
            Ok(Box::new(DistrictGeocoder::new()))
        }
    }
}
