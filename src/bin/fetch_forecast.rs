#!/usr/bin/env rust
//! NWS Forecast Fetch
//!
//! Fetches the NWS hourly forecast for a registered sensor location and
//! writes it to CSV. Resolves the sensor's lat/lon to a forecast grid
//! cell, then pulls the gridpoint hourly forecast.
//!
//! Usage:
//!   cargo run --bin fetch_forecast -- SENSOR_NAME OUTPUT_CSV

use floodrisk_service::ingest::nws;
use floodrisk_service::sensors::{all_sensor_names, find_sensor};
use std::env;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    println!("🌦  NWS Forecast Fetch");
    println!("=====================\n");

    let args: Vec<String> = env::args().collect();
    if args.len() != 3 {
        eprintln!("Usage: {} SENSOR_NAME OUTPUT_CSV", args[0]);
        eprintln!("Registered sensors:");
        for name in all_sensor_names() {
            eprintln!("  {}", name);
        }
        std::process::exit(1);
    }

    let sensor = match find_sensor(&args[1]) {
        Some(sensor) => sensor,
        None => {
            eprintln!("Unknown sensor: {}", args[1]);
            std::process::exit(1);
        }
    };

    let client = reqwest::blocking::Client::builder()
        .user_agent(nws::NWS_USER_AGENT)
        .build()?;

    println!(
        "📍 Resolving grid cell for {} ({:.5}, {:.5})...",
        sensor.name, sensor.latitude, sensor.longitude
    );
    let cell = nws::fetch_grid_cell(&client, sensor.latitude, sensor.longitude)?;
    println!("✓ Grid {}/{},{}\n", cell.office, cell.x, cell.y);

    println!("📥 Fetching hourly forecast...");
    let periods = nws::fetch_hourly_forecast(&client, &cell)?;
    println!("✓ {} forecast periods", periods.len());

    std::fs::write(&args[2], nws::forecast_to_csv(&periods))?;
    println!("✓ Wrote {}", args[2]);

    Ok(())
}
