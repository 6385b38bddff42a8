use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

/// Format of `location.localtime` as sent by WeatherAPI.com.
pub const LOCAL_TIME_FORMAT: &str = "%Y-%m-%d %H:%M";

/// Current conditions for one location, as decoded from the API.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeatherRecord {
    pub location: Location,
    pub current: Current,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Location {
    pub name: String,
    pub country: String,
    /// Server-local wall clock, `"YYYY-MM-DD HH:MM"`.
    pub local_time: String,
}

impl Location {
    /// Local date as `YYYY-MM-DD`, or the raw date half when unparseable.
    pub fn local_date(&self) -> String {
        match self.parsed_local_time() {
            Some(parsed) => parsed.format("%Y-%m-%d").to_string(),
            None => self.raw_halves().0.to_string(),
        }
    }

    /// Local time of day as zero-padded `HH:MM`, or the raw time half when
    /// unparseable.
    pub fn local_clock(&self) -> String {
        match self.parsed_local_time() {
            Some(parsed) => parsed.format("%H:%M").to_string(),
            None => self.raw_halves().1.to_string(),
        }
    }

    pub fn parsed_local_time(&self) -> Option<NaiveDateTime> {
        NaiveDateTime::parse_from_str(&self.local_time, LOCAL_TIME_FORMAT).ok()
    }

    fn raw_halves(&self) -> (&str, &str) {
        self.local_time.split_once(' ').unwrap_or((self.local_time.as_str(), ""))
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Current {
    pub temperature_c: f64,
    pub humidity_percent: u8,
    pub wind_kph: f64,
    pub uv_index: f64,
    pub precipitation_mm: f64,
    pub condition: Condition,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Condition {
    /// Protocol-relative icon URL exactly as the server sent it.
    pub icon_url: String,
}

impl Condition {
    /// Absolute URL of the larger icon variant.
    pub fn display_icon_url(&self) -> String {
        upgrade_icon_url(&self.icon_url)
    }
}

/// `"//cdn/img_64x64.png"` becomes `"https://cdn/img_128x128.png"`.
pub fn upgrade_icon_url(raw: &str) -> String {
    format!("https:{raw}").replace("64x64", "128x128")
}
