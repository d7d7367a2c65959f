use weather_today_core::{Units, WeatherResponse, WeatherState};

pub const NO_NETWORK: &str = "No network connection";
pub const PERMISSION_REQUIRED: &str = "Location permission is required";

/// Everything the single screen can show.
#[derive(Debug)]
pub enum Screen<'a> {
    NoNetwork,
    PermissionRequired,
    Weather(&'a WeatherState),
}

pub fn render(screen: &Screen<'_>, units: Units) -> String {
    match screen {
        Screen::NoNetwork => notice("[no wifi]", NO_NETWORK),
        Screen::PermissionRequired => notice("[location]", PERMISSION_REQUIRED),
        Screen::Weather(WeatherState::Loading) => "Loading...".to_string(),
        Screen::Weather(WeatherState::Error(message)) => notice("[error]", message),
        Screen::Weather(WeatherState::Success(weather)) => weather_card(weather, units),
    }
}

fn notice(icon: &str, message: &str) -> String {
    format!("{icon}\n{message}")
}

fn weather_card(weather: &WeatherResponse, units: Units) -> String {
    let mut lines = Vec::new();

    match weather.sys.country.as_deref() {
        Some(country) if !country.is_empty() => lines.push(format!("{}, {}", weather.name, country)),
        _ => lines.push(weather.name.clone()),
    }

    if let (Some(condition), Some(url)) = (weather.primary_condition(), weather.icon_url()) {
        lines.push(format!("[{}] {}", condition.icon, url));
    }

    // Whole degrees, truncated like the original display.
    lines.push(format!(
        "{}{}",
        weather.main.temperature as i64,
        units.temperature_symbol()
    ));

    let description = weather.description_capitalized();
    if !description.is_empty() {
        lines.push(description);
    }

    lines.push(format!(
        "Feels like {}{} · Humidity {}% · Wind {:.1} {}",
        weather.main.feels_like as i64,
        units.temperature_symbol(),
        weather.main.humidity,
        weather.wind.speed,
        units.speed_symbol(),
    ));

    if let Some(local) = weather.local_observed_at() {
        lines.push(format!("Observed {}", local.format("%H:%M (UTC%:z)")));
    }

    lines.join("\n")
}
