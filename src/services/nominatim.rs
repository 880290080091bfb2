//! Nominatim geocoding client

use anyhow::{Context, Result};
use serde::Deserialize;

/// Nominatim search response entry
#[derive(Debug, Deserialize)]
pub struct NominatimResult {
    pub lat: String,
    pub lon: String,
    pub display_name: String,
    #[serde(default)]
    pub importance: Option<f64>,
}

/// A parsed search hit
#[derive(Debug, Clone, PartialEq)]
pub struct NominatimHit {
    pub lat: f64,
    pub lng: f64,
    pub display_name: String,
    pub importance: Option<f64>,
}

impl TryFrom<&NominatimResult> for NominatimHit {
    type Error = anyhow::Error;

    fn try_from(result: &NominatimResult) -> Result<Self> {
        Ok(Self {
            lat: result.lat.parse().context("Invalid latitude")?,
            lng: result.lon.parse().context("Invalid longitude")?,
            display_name: result.display_name.clone(),
            importance: result.importance,
        })
    }
}

/// Nominatim geocoding client
pub struct NominatimClient {
    base_url: String,
    country_codes: Option<String>,
    client: reqwest::Client,
}

impl NominatimClient {
    /// Create a new client
    pub fn new(base_url: &str, country_codes: Option<String>) -> Result<Self> {
        let client = reqwest::Client::builder()
            .user_agent("ServiceRoute/0.1 (field service scheduling)")
            .build()
            .context("Failed to create HTTP client")?;

        Ok(Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            country_codes,
            client,
        })
    }

    /// Build the free-text search URL
    pub fn search_url(&self, query: &str) -> String {
        let mut url = format!(
            "{}/search?q={}&format=json&limit=1",
            self.base_url,
            urlencoding::encode(query)
        );
        if let Some(codes) = &self.country_codes {
            url.push_str("&countrycodes=");
            url.push_str(&urlencoding::encode(codes));
        }
        url
    }

    /// Geocode free text to the best matching point
    pub async fn search(&self, query: &str) -> Result<Option<NominatimHit>> {
        let url = self.search_url(query);

        let response = self.client
            .get(&url)
            .send()
            .await
            .context("Failed to send geocoding request")?;

        if !response.status().is_success() {
            anyhow::bail!("Nominatim returned HTTP {}", response.status());
        }

        let results: Vec<NominatimResult> = response
            .json()
            .await
            .context("Failed to parse geocoding response")?;

        results.first().map(NominatimHit::try_from).transpose()
    }
}
