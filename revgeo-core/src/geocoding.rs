use crate::address::{AddressResult, GeocodeStatus};
use crate::error::GeocodeError;
use anyhow::{Context, Result};
use serde::Deserialize;
use std::time::Duration;

/// Baidu Maps reverse geocoding (v3) endpoint
pub const BAIDU_REVERSE_GEOCODING_URL: &str = "https://api.map.baidu.com/reverse_geocoding/v3/";

/// Upper bound on a single provider request
pub const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

/// A reverse geocoding provider.
///
/// `resolve` never fails: every problem (network, provider status, bad
/// payload) is logged and turned into an [`AddressResult`] with
/// `status = error` and empty address fields.
pub trait GeocodingService {
    /// Short provider name for logs
    fn name(&self) -> &str;

    /// Resolve one location string. The value is passed to the provider
    /// untouched, so it must already be in the provider's coordinate format.
    fn resolve(&self, location: &str) -> AddressResult;
}

/// Baidu API response structure
#[derive(Debug, Deserialize)]
struct BaiduResponse {
    status: i64,
    #[serde(alias = "msg")]
    message: Option<String>,
    result: Option<BaiduResult>,
}

#[derive(Debug, Default, Deserialize)]
struct BaiduResult {
    formatted_address: Option<String>,
    #[serde(rename = "addressComponent")]
    address_component: Option<AddressComponent>,
}

#[derive(Debug, Default, Deserialize)]
struct AddressComponent {
    town: Option<String>,
    street: Option<String>,
}

/// Reverse geocoder backed by the Baidu Maps web API
pub struct BaiduGeocoder {
    client: reqwest::blocking::Client,
    api_key: String,
    base_url: String,
}

impl BaiduGeocoder {
    /// Create a geocoder for the public Baidu endpoint
    pub fn new(api_key: impl Into<String>) -> Result<Self> {
        Self::with_endpoint(api_key, BAIDU_REVERSE_GEOCODING_URL, REQUEST_TIMEOUT)
    }

    /// Create a geocoder for a custom endpoint and request timeout
    pub fn with_endpoint(
        api_key: impl Into<String>,
        base_url: impl Into<String>,
        timeout: Duration,
    ) -> Result<Self> {
        let user_agent = format!("revgeo/{}", env!("CARGO_PKG_VERSION"));

        let client = reqwest::blocking::Client::builder()
            .user_agent(user_agent)
            .timeout(timeout)
            .build()
            .context("Failed to build HTTP client")?;

        Ok(Self {
            client,
            api_key: api_key.into(),
            base_url: base_url.into(),
        })
    }

    /// Make the actual API request
    pub fn fetch(&self, location: &str) -> Result<AddressResult, GeocodeError> {
        log::debug!("Reverse geocoding {} via Baidu", location);

        let response = self
            .client
            .get(&self.base_url)
            .query(&[
                ("location", location),
                ("output", "json"),
                ("ak", self.api_key.as_str()),
            ])
            .send()?
            .error_for_status()?;

        let body = response.text()?;
        parse_response(location, &body)
    }
}

impl GeocodingService for BaiduGeocoder {
    fn name(&self) -> &str {
        "baidu"
    }

    fn resolve(&self, location: &str) -> AddressResult {
        match self.fetch(location) {
            Ok(result) => result,
            Err(e @ GeocodeError::Provider { .. }) => {
                log::warn!("Baidu API error for {}: {}", location, e);
                AddressResult::error(location)
            }
            Err(GeocodeError::Timeout) => {
                log::error!("Request timed out: {}", location);
                AddressResult::error(location)
            }
            Err(e) => {
                log::error!("Failed to geocode {}: {}", location, e);
                AddressResult::error(location)
            }
        }
    }
}

/// Map a raw Baidu response body to an address
fn parse_response(location: &str, body: &str) -> Result<AddressResult, GeocodeError> {
    let data: BaiduResponse =
        serde_json::from_str(body).map_err(|e| GeocodeError::Parse(e.to_string()))?;

    if data.status != 0 {
        return Err(GeocodeError::Provider {
            status: data.status,
            message: data.message.unwrap_or_else(|| "unknown".to_string()),
        });
    }

    let result = data.result.unwrap_or_default();
    let component = result.address_component.unwrap_or_default();

    Ok(AddressResult {
        origin: location.to_string(),
        formatted_address: result.formatted_address.unwrap_or_default(),
        town: component.town.unwrap_or_default(),
        street: component.street.unwrap_or_default(),
        status: GeocodeStatus::Success,
    })
}
