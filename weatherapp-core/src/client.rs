use crate::{ClientError, WeatherRecord};
use async_trait::async_trait;
use std::fmt::Debug;

pub mod weatherapi;

pub use weatherapi::WeatherApiClient;

/// Single-call contract for fetching current conditions.
///
/// `city` is forwarded as given, including the empty string; the server
/// decides whether it names a location.
#[async_trait]
pub trait WeatherClient: Send + Sync + Debug {
    async fn fetch(&self, api_key: &str, city: &str) -> Result<WeatherRecord, ClientError>;
}
