use std::time::Duration;

use crate::config::{endpoint, ToolsConfig};
use crate::error::ToolsError;
use crate::http::get_json;
use crate::prelude::*;
use reqwest::Client;

/// Input for looking up the current weather
#[derive(Debug, Deserialize, JsonSchema)]
pub struct WeatherInput {
    /// The city name to get weather for
    pub city: String,

    /// The two letter state abbreviation (or region name) to get weather for
    pub state: String,

    /// The two letter country abbreviation to get weather for
    #[serde(default)]
    pub country: Option<String>,
}

/// Everything the `CurrentWeather` component renders
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CurrentWeather {
    pub city: String,
    pub state: String,
    /// Degrees Fahrenheit
    pub temperature: f64,
    pub condition: String,
}

#[derive(Debug, Deserialize)]
struct GeocodingResponse {
    #[serde(default)]
    results: Vec<Place>,
}

#[derive(Debug, Clone, Deserialize)]
struct Place {
    name: String,
    latitude: f64,
    longitude: f64,
    #[serde(default)]
    admin1: Option<String>,
    #[serde(default)]
    country_code: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ForecastResponse {
    current: CurrentConditions,
}

#[derive(Debug, Deserialize)]
struct CurrentConditions {
    temperature_2m: f64,
    weather_code: u8,
}

/// Human-readable description of a WMO weather interpretation code.
pub fn describe_weather_code(code: u8) -> &'static str {
    match code {
        0 => "Clear sky",
        1 => "Mainly clear",
        2 => "Partly cloudy",
        3 => "Overcast",
        45 | 48 => "Fog",
        51 | 53 | 55 => "Drizzle",
        56 | 57 => "Freezing drizzle",
        61 | 63 | 65 => "Rain",
        66 | 67 => "Freezing rain",
        71 | 73 | 75 => "Snow",
        77 => "Snow grains",
        80..=82 => "Rain showers",
        85 | 86 => "Snow showers",
        95 => "Thunderstorm",
        96 | 99 => "Thunderstorm with hail",
        _ => "Unknown",
    }
}

/// Pick the place matching `state` (and `country`, when given).
///
/// Country narrows the candidates only if something matches it; the first
/// remaining candidate wins when no `admin1` matches.
fn choose_place<'a>(places: &'a [Place], state: &str, country: Option<&str>) -> Option<&'a Place> {
    let in_country: Vec<&Place> = match country {
        Some(country) => places
            .iter()
            .filter(|place| {
                place
                    .country_code
                    .as_deref()
                    .is_some_and(|code| code.eq_ignore_ascii_case(country))
            })
            .collect(),
        None => Vec::new(),
    };
    let candidates: Vec<&Place> = if in_country.is_empty() {
        places.iter().collect()
    } else {
        in_country
    };

    candidates
        .iter()
        .find(|place| {
            place
                .admin1
                .as_deref()
                .is_some_and(|admin1| admin1.eq_ignore_ascii_case(state))
        })
        .or_else(|| candidates.first())
        .copied()
}

/// Renders the current weather for a city
pub struct WeatherTool {
    client: Client,
    geocoding_url: String,
    forecast_url: String,
    loading_delay: Duration,
}

impl WeatherTool {
    pub fn new(config: &ToolsConfig, client: Client) -> Self {
        Self {
            client,
            geocoding_url: endpoint(&config.geocoding_api_url, "v1/search"),
            forecast_url: endpoint(&config.weather_api_url, "v1/forecast"),
            loading_delay: config.loading_delay,
        }
    }

    async fn lookup(&self, input: &WeatherInput) -> Result<CurrentWeather, ToolsError> {
        let geocoding: GeocodingResponse = get_json(
            &self.client,
            &self.geocoding_url,
            &[("name", input.city.as_str()), ("count", "10")],
        )
        .await?;

        let place = choose_place(&geocoding.results, &input.state, input.country.as_deref())
            .ok_or_else(|| ToolsError::NotFound(format!("city '{}'", input.city)))?;
        log::debug!(
            "geocoded {} to {} ({}, {})",
            input.city,
            place.name,
            place.latitude,
            place.longitude
        );

        let latitude = place.latitude.to_string();
        let longitude = place.longitude.to_string();
        let forecast: ForecastResponse = get_json(
            &self.client,
            &self.forecast_url,
            &[
                ("latitude", latitude.as_str()),
                ("longitude", longitude.as_str()),
                ("current", "temperature_2m,weather_code"),
                ("temperature_unit", "fahrenheit"),
            ],
        )
        .await?;

        Ok(CurrentWeather {
            city: input.city.clone(),
            state: input.state.clone(),
            temperature: forecast.current.temperature_2m,
            condition: describe_weather_code(forecast.current.weather_code).to_string(),
        })
    }
}

impl Tool for WeatherTool {
    type Input = WeatherInput;

    fn name(&self) -> &str {
        "get_weather"
    }

    fn description(&self) -> &str {
        "A tool to fetch the current weather, given a city and state. \
         If the city/state is not provided, ask the user for both the city and state."
    }

    async fn execute(&self, input: Self::Input, ui: &ToolUi) -> Result<ToolOutput, ToolError> {
        ui.update(Fragment::bare("CurrentWeatherLoading"))?;

        let weather = self.lookup(&input).await?;

        if !self.loading_delay.is_zero() {
            tokio::time::sleep(self.loading_delay).await;
        }

        ui.done(Fragment::component(
            "CurrentWeather",
            serde_json::to_value(&weather)?,
        ))?;
        Ok(ToolOutput::json(&weather)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use tapedeck_core::EventSink;
    use wiremock::matchers::{method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn place(name: &str, admin1: &str, country_code: &str, latitude: f64) -> Place {
        Place {
            name: name.to_string(),
            latitude,
            longitude: -100.0,
            admin1: Some(admin1.to_string()),
            country_code: Some(country_code.to_string()),
        }
    }

    fn weather_input(city: &str, state: &str) -> WeatherInput {
        WeatherInput {
            city: city.to_string(),
            state: state.to_string(),
            country: None,
        }
    }

    async fn mount_portland(server: &MockServer) {
        Mock::given(method("GET"))
            .and(path("/v1/search"))
            .and(query_param("name", "Portland"))
            .and(query_param("count", "10"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "results": [
                    {"name": "Portland", "latitude": 45.52, "longitude": -122.68,
                     "admin1": "Oregon", "country_code": "US"},
                    {"name": "Portland", "latitude": 43.66, "longitude": -70.26,
                     "admin1": "Maine", "country_code": "US"}
                ]
            })))
            .mount(server)
            .await;
    }

    #[test]
    fn test_weather_codes() {
        let cases = [
            (0, "Clear sky"),
            (3, "Overcast"),
            (48, "Fog"),
            (63, "Rain"),
            (81, "Rain showers"),
            (99, "Thunderstorm with hail"),
            (42, "Unknown"),
        ];
        for (code, expected) in cases {
            assert_eq!(describe_weather_code(code), expected, "Failed for code={}", code);
        }
    }

    #[test]
    fn test_choose_place_matches_state_case_insensitively() {
        let places = vec![
            place("Springfield", "Illinois", "US", 39.8),
            place("Springfield", "Missouri", "US", 37.2),
        ];
        let chosen = choose_place(&places, "missouri", None).unwrap();
        assert_eq!(chosen.latitude, 37.2);

        let fallback = choose_place(&places, "Nowhere", None).unwrap();
        assert_eq!(fallback.latitude, 39.8);

        assert!(choose_place(&[], "Oregon", None).is_none());
    }

    #[test]
    fn test_choose_place_prefers_country() {
        let places = vec![
            place("London", "England", "GB", 51.5),
            place("London", "Ontario", "CA", 42.9),
        ];
        assert_eq!(choose_place(&places, "", Some("ca")).unwrap().latitude, 42.9);
        // Unknown country falls back to every candidate
        assert_eq!(choose_place(&places, "", Some("FR")).unwrap().latitude, 51.5);
    }

    #[tokio::test]
    async fn test_weather_lookup() {
        let server = MockServer::start().await;
        mount_portland(&server).await;
        Mock::given(method("GET"))
            .and(path("/v1/forecast"))
            .and(query_param("latitude", "43.66"))
            .and(query_param("current", "temperature_2m,weather_code"))
            .and(query_param("temperature_unit", "fahrenheit"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "current": {"time": "2024-06-01T12:00", "temperature_2m": 61.3, "weather_code": 2}
            })))
            .mount(&server)
            .await;

        let config = ToolsConfig::default()
            .with_geocoding_api_url(server.uri())
            .with_weather_api_url(server.uri());
        let tool = WeatherTool::new(&config, config.http_client().unwrap());
        let (sink, _events) = EventSink::channel();
        let ui = ToolUi::new("weather-run", sink);

        let output = tool.execute(weather_input("Portland", "maine"), &ui).await.unwrap();
        let weather: CurrentWeather = serde_json::from_str(&output.as_text()).unwrap();
        assert_eq!(
            weather,
            CurrentWeather {
                city: "Portland".to_string(),
                state: "maine".to_string(),
                temperature: 61.3,
                condition: "Partly cloudy".to_string(),
            }
        );
        assert!(ui.is_done());
    }

    #[tokio::test]
    async fn test_unknown_city_fails() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/v1/search"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"generationtime_ms": 0.5})))
            .mount(&server)
            .await;

        let config = ToolsConfig::default().with_geocoding_api_url(server.uri());
        let tool = WeatherTool::new(&config, config.http_client().unwrap());
        let (sink, _events) = EventSink::channel();
        let ui = ToolUi::new("weather-run", sink);

        let err = tool
            .execute(weather_input("Atlantis", "Ocean"), &ui)
            .await
            .unwrap_err();
        assert_eq!(err.to_string(), "No results for city 'Atlantis'");
    }

    #[tokio::test]
    async fn test_forecast_error_status() {
        let server = MockServer::start().await;
        mount_portland(&server).await;
        Mock::given(method("GET"))
            .and(path("/v1/forecast"))
            .respond_with(ResponseTemplate::new(503))
            .mount(&server)
            .await;

        let config = ToolsConfig::default()
            .with_geocoding_api_url(server.uri())
            .with_weather_api_url(server.uri());
        let tool = WeatherTool::new(&config, config.http_client().unwrap());
        let (sink, _events) = EventSink::channel();
        let ui = ToolUi::new("weather-run", sink);

        let err = tool
            .execute(weather_input("Portland", "Oregon"), &ui)
            .await
            .unwrap_err();
        assert!(err.to_string().contains("HTTP error 503"));
    }
}
