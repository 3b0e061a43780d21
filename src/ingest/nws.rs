/// NWS (National Weather Service) Forecast API Client
///
/// Retrieves hourly forecasts from api.weather.gov for a sensor location.
/// The API is a two-step chain: resolve the lat/lon to a forecast grid
/// cell via /points/{lat},{lon}, then fetch the gridpoint's hourly
/// forecast.
///
/// API Documentation: https://www.weather.gov/documentation/services-web-api
///
/// The NWS rejects requests without a User-Agent identifying the caller.

use serde::Deserialize;

const NWS_BASE_URL: &str = "https://api.weather.gov";

/// Identifies this service to the NWS, as their terms of use require.
pub const NWS_USER_AGENT: &str = "floodrisk_service (flood-risk monitoring, ops@floodrisk.dev)";

// ============================================================================
// NWS API Response Structures
// ============================================================================

#[derive(Debug, Deserialize)]
struct PointsResponse {
    properties: PointsProperties,
}

#[derive(Debug, Deserialize)]
struct PointsProperties {
    #[serde(rename = "gridId")]
    grid_id: String,
    #[serde(rename = "gridX")]
    grid_x: i64,
    #[serde(rename = "gridY")]
    grid_y: i64,
}

#[derive(Debug, Deserialize)]
struct HourlyForecastResponse {
    properties: HourlyForecastProperties,
}

#[derive(Debug, Deserialize)]
struct HourlyForecastProperties {
    periods: Vec<ForecastPeriod>,
}

/// One hourly slot of the gridpoint forecast.
#[derive(Debug, Clone, Deserialize)]
pub struct ForecastPeriod {
    #[serde(rename = "startTime")]
    pub start_time: String, // ISO 8601 with offset
    pub temperature: f64,
    #[serde(rename = "temperatureUnit")]
    pub temperature_unit: String,
    /// Free text like "10 mph" or "10 to 15 mph".
    #[serde(rename = "windSpeed")]
    pub wind_speed: String,
    #[serde(rename = "shortForecast")]
    pub short_forecast: String,
    #[serde(rename = "probabilityOfPrecipitation", default)]
    pub precip_probability: Option<UnitValue>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct UnitValue {
    pub value: Option<f64>,
}

/// Forecast grid cell resolved from a lat/lon.
#[derive(Debug, Clone)]
pub struct GridCell {
    pub office: String,
    pub x: i64,
    pub y: i64,
}

// ============================================================================
// API Client Functions
// ============================================================================

/// Resolve a latitude/longitude to its NWS forecast grid cell.
pub fn fetch_grid_cell(
    client: &reqwest::blocking::Client,
    latitude: f64,
    longitude: f64,
) -> Result<GridCell, Box<dyn std::error::Error>> {
    // NWS redirects coordinates with more than 4 decimal places.
    let url = format!("{}/points/{:.4},{:.4}", NWS_BASE_URL, latitude, longitude);

    let response = client
        .get(&url)
        .header("Accept", "application/geo+json")
        .header("User-Agent", NWS_USER_AGENT)
        .send()?;

    if !response.status().is_success() {
        return Err(format!("NWS points API error: {}", response.status()).into());
    }

    let points: PointsResponse = response.json()?;
    Ok(GridCell {
        office: points.properties.grid_id,
        x: points.properties.grid_x,
        y: points.properties.grid_y,
    })
}

/// Fetch the hourly forecast for a grid cell.
pub fn fetch_hourly_forecast(
    client: &reqwest::blocking::Client,
    cell: &GridCell,
) -> Result<Vec<ForecastPeriod>, Box<dyn std::error::Error>> {
    let url = format!(
        "{}/gridpoints/{}/{},{}/forecast/hourly",
        NWS_BASE_URL, cell.office, cell.x, cell.y
    );

    let response = client
        .get(&url)
        .header("Accept", "application/geo+json")
        .header("User-Agent", NWS_USER_AGENT)
        .send()?;

    if !response.status().is_success() {
        return Err(format!("NWS gridpoints API error: {}", response.status()).into());
    }

    let text = response.text()?;
    parse_hourly_forecast(&text)
}

/// Parse a gridpoints hourly forecast response body.
pub fn parse_hourly_forecast(
    json: &str,
) -> Result<Vec<ForecastPeriod>, Box<dyn std::error::Error>> {
    let forecast: HourlyForecastResponse = serde_json::from_str(json)?;
    Ok(forecast.properties.periods)
}

/// Parse a points response body into the grid cell it names.
pub fn parse_grid_cell(json: &str) -> Result<GridCell, Box<dyn std::error::Error>> {
    let points: PointsResponse = serde_json::from_str(json)?;
    Ok(GridCell {
        office: points.properties.grid_id,
        x: points.properties.grid_x,
        y: points.properties.grid_y,
    })
}

// ============================================================================
// CSV Export
// ============================================================================

/// Serialize forecast periods as CSV for the offline tools.
pub fn forecast_to_csv(periods: &[ForecastPeriod]) -> String {
    let mut out = String::from(
        "startTime,temperature,temperatureUnit,windSpeed,precipProbability,shortForecast\n",
    );
    for p in periods {
        let precip = p
            .precip_probability
            .as_ref()
            .and_then(|u| u.value)
            .map(|v| v.to_string())
            .unwrap_or_default();
        out.push_str(&format!(
            "{},{},{},{},{},{}\n",
            p.start_time, p.temperature, p.temperature_unit, p.wind_speed, precip, p.short_forecast
        ));
    }
    out
}

// ============================================================================
// Tests
// ============================================================================
