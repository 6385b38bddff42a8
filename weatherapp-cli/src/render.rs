use std::fmt::Write;

use weatherapp_core::{ResultState, WeatherRecord};

pub const LOADING: &str = "Loading...";

/// Text for one state. `Idle` renders nothing.
pub fn render(state: &ResultState) -> String {
    match state {
        ResultState::Idle => String::new(),
        ResultState::Loading => LOADING.to_string(),
        ResultState::Error(message) => message.clone(),
        ResultState::Success(record) => render_details(record),
    }
}

fn render_details(data: &WeatherRecord) -> String {
    let mut out = String::new();
    let current = &data.current;

    let _ = writeln!(out, "{}, {}", data.location.name, data.location.country);
    let _ = writeln!(out);
    let _ = writeln!(out, "{:.1} °C", current.temperature_c);
    let _ = writeln!(out, "{}", current.condition.display_icon_url());
    let _ = writeln!(out);

    let rows = [
        ("Humidity", current.humidity_percent.to_string()),
        ("Wind Speed", format!("{} km/h", current.wind_kph)),
        ("UV", current.uv_index.to_string()),
        ("Precipitation", format!("{} mm", current.precipitation_mm)),
        ("Local Time", data.location.local_clock()),
        ("Local Date", data.location.local_date()),
    ];
    for (key, value) in rows {
        let _ = writeln!(out, "  {key:<14}{value}");
    }

    out
}
