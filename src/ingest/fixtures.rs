/// Captured CSV and JSON fixtures for the ingest parser tests.
///
/// Each fixture is a trimmed copy of a real payload: the sensor CSV from
/// the gauge network portal, the hourly weather CSV, a merged table in
/// the shape the offline merge tool writes, and two NWS API responses.
/// Trimmed to a handful of rows but otherwise unaltered, including the
/// unused columns and blank cells the live exports contain.

#[cfg(test)]
pub(crate) fn fixture_sensor_csv() -> &'static str {
    "\
Time,Value,State
2024-04-01 08:00:00,11.2,Normal
2024-04-01 09:00:00,11.6,Normal
2024-04-01 10:00:00,12.9,Normal
2024-04-01 11:00:00,18.4,High High
"
}

#[cfg(test)]
pub(crate) fn fixture_weather_csv() -> &'static str {
    "\
Date,Temperature (C),Humidity (%),Precipitation (mm),Snow Depth (cm),Wind Speed (km/h),Wind Gust (km/h),Pressure (hPa),Sunshine (min),Cloud Cover (%),Weather Code
2024-04-01 08:00:00,21.3,74,0.0,,9.4,16.6,1012.4,42,61,3
2024-04-01 09:00:00,22.8,70,0.2,,11.2,,1011.9,55,74,61
2024-04-01 10:00:00,22.1,88,4.6,,14.7,27.3,1010.2,0,100,63
"
}

#[cfg(test)]
pub(crate) fn fixture_merged_csv() -> &'static str {
    "\
Time,Value,State,Temperature (C),Humidity (%),Precipitation (mm),Wind Speed (km/h),Wind Gust (km/h),Pressure (hPa),Cloud Cover (%),Weather Code
2024-04-01 08:00:00,11.2,Normal,21.3,74,0,9.4,16.6,1012.4,61,3
2024-04-01 09:00:00,11.6,Normal,22.8,70,0.2,11.2,,1011.9,74,61
2024-04-01 10:00:00,12.9,Normal,,,,,,,,
2024-04-01 11:00:00,18.4,High High,22.1,88,4.6,14.7,27.3,1010.2,100,63
"
}

/// Response from https://api.weather.gov/points/{lat},{lon} — the grid
/// lookup that precedes the hourly forecast call.
#[cfg(test)]
pub(crate) fn fixture_nws_points_json() -> &'static str {
    r#"{
  "properties": {
    "gridId": "HGX",
    "gridX": 73,
    "gridY": 109,
    "forecastHourly": "https://api.weather.gov/gridpoints/HGX/73,109/forecast/hourly"
  }
}"#
}

/// Truncated hourly forecast from the gridpoints endpoint.
#[cfg(test)]
pub(crate) fn fixture_nws_hourly_json() -> &'static str {
    r#"{
  "properties": {
    "periods": [
      {
        "number": 1,
        "startTime": "2024-04-01T08:00:00-05:00",
        "temperature": 72,
        "temperatureUnit": "F",
        "windSpeed": "10 mph",
        "shortForecast": "Chance Showers And Thunderstorms",
        "probabilityOfPrecipitation": {"unitCode": "wmoUnit:percent", "value": 64}
      },
      {
        "number": 2,
        "startTime": "2024-04-01T09:00:00-05:00",
        "temperature": 74,
        "temperatureUnit": "F",
        "windSpeed": "10 to 15 mph",
        "shortForecast": "Showers And Thunderstorms",
        "probabilityOfPrecipitation": {"unitCode": "wmoUnit:percent", "value": 81}
      }
    ]
  }
}"#
}
