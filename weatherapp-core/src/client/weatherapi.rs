use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use tracing::debug;

use crate::{
    ClientError,
    model::{Condition, Current, Location, WeatherRecord},
};

use super::WeatherClient;

pub const DEFAULT_BASE_URL: &str = "https://api.weatherapi.com";
pub const CURRENT_PATH: &str = "/v1/current.json";

/// WeatherAPI.com `current.json` client.
#[derive(Debug, Clone)]
pub struct WeatherApiClient {
    base_url: String,
    http: Client,
}

impl Default for WeatherApiClient {
    fn default() -> Self {
        Self::new()
    }
}

impl WeatherApiClient {
    pub fn new() -> Self {
        Self::with_base_url(DEFAULT_BASE_URL)
    }

    pub fn with_base_url(base_url: impl Into<String>) -> Self {
        let base_url: String = base_url.into();
        Self { base_url: base_url.trim_end_matches('/').to_string(), http: Client::new() }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn current_url(&self) -> String {
        format!("{}{}", self.base_url, CURRENT_PATH)
    }
}

#[derive(Debug, Deserialize)]
struct WaLocation {
    name: String,
    country: String,
    localtime: String,
}

#[derive(Debug, Deserialize)]
struct WaCondition {
    icon: String,
}

#[derive(Debug, Deserialize)]
struct WaCurrent {
    temp_c: f64,
    humidity: u8,
    wind_kph: f64,
    uv: f64,
    precip_mm: f64,
    condition: WaCondition,
}

#[derive(Debug, Deserialize)]
struct WaResponse {
    location: WaLocation,
    current: WaCurrent,
}

impl From<WaResponse> for WeatherRecord {
    fn from(parsed: WaResponse) -> Self {
        WeatherRecord {
            location: Location {
                name: parsed.location.name,
                country: parsed.location.country,
                local_time: parsed.location.localtime,
            },
            current: Current {
                temperature_c: parsed.current.temp_c,
                humidity_percent: parsed.current.humidity,
                wind_kph: parsed.current.wind_kph,
                uv_index: parsed.current.uv,
                precipitation_mm: parsed.current.precip_mm,
                condition: Condition { icon_url: parsed.current.condition.icon },
            },
        }
    }
}

/// Decode a `current.json` body into a [`WeatherRecord`].
pub fn decode_current(body: &str) -> Result<WeatherRecord, ClientError> {
    let parsed: WaResponse = serde_json::from_str(body)?;
    Ok(parsed.into())
}

#[async_trait]
impl WeatherClient for WeatherApiClient {
    async fn fetch(&self, api_key: &str, city: &str) -> Result<WeatherRecord, ClientError> {
        debug!(city, base_url = %self.base_url, "requesting current weather");

        let res = self
            .http
            .get(self.current_url())
            .query(&[("key", api_key), ("q", city)])
            .send()
            .await
            .map_err(ClientError::Transport)?;

        let status = res.status();
        let body = res.text().await.map_err(ClientError::Transport)?;

        if !status.is_success() {
            return Err(ClientError::Server { status: status.as_u16(), body: truncate_body(&body) });
        }

        decode_current(&body)
    }
}

fn truncate_body(body: &str) -> String {
    const MAX: usize = 200;
    if body.len() > MAX {
        let mut end = MAX;
        while !body.is_char_boundary(end) {
            end -= 1;
        }
        format!("{}...", &body[..end])
    } else {
        body.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const LONDON: &str = r#"{
        "location": {
            "name": "London",
            "region": "City of London, Greater London",
            "country": "United Kingdom",
            "localtime": "2024-05-01 13:45"
        },
        "current": {
            "temp_c": 15.0,
            "humidity": 72,
            "wind_kph": 11.2,
            "uv": 4.0,
            "precip_mm": 0.1,
            "condition": { "text": "Partly cloudy", "icon": "//cdn.weatherapi.com/weather/64x64/day/116.png" }
        }
    }"#;

    #[test]
    fn decodes_consumed_fields_and_ignores_the_rest() {
        let record = decode_current(LONDON).expect("valid body");

        assert_eq!(record.location.name, "London");
        assert_eq!(record.location.country, "United Kingdom");
        assert_eq!(record.location.local_time, "2024-05-01 13:45");
        assert_eq!(record.current.temperature_c, 15.0);
        assert_eq!(record.current.humidity_percent, 72);
        assert_eq!(record.current.wind_kph, 11.2);
        assert_eq!(record.current.uv_index, 4.0);
        assert_eq!(record.current.precipitation_mm, 0.1);
        assert_eq!(
            record.current.condition.icon_url,
            "//cdn.weatherapi.com/weather/64x64/day/116.png"
        );
    }

    #[test]
    fn missing_field_is_a_decode_error() {
        let err = decode_current(r#"{"location": {"name": "London"}}"#).unwrap_err();
        assert!(matches!(err, ClientError::Decode(_)));
    }

    #[test]
    fn base_url_trailing_slash_is_dropped() {
        let client = WeatherApiClient::with_base_url("http://localhost:8080/");
        assert_eq!(client.current_url(), "http://localhost:8080/v1/current.json");
    }

    #[test]
    fn truncate_body_respects_char_boundaries() {
        let body = "é".repeat(150);
        let truncated = truncate_body(&body);
        assert!(truncated.ends_with("..."));
        assert!(truncated.len() <= 203);
    }
}
