//! Flood Risk Scoring Service - Main Entry Point
//!
//! A server-side service that:
//! 1. Loads the merged sensor/weather table from CSV
//! 2. Builds the feature store (imputation means plus fallback queries)
//! 3. Trains the random-forest risk classifier on the full table
//! 4. Serves per-sensor risk scores and risk history over HTTP
//!
//! Usage:
//!   cargo run --release                          # Serve on the configured port
//!   cargo run --release -- --endpoint 8080       # Override the port
//!   cargo run --release -- --data merged.csv     # Override the data path
//!
//! Environment (read via .env or the process environment):
//!   PORT       - HTTP port (overridden by --endpoint)
//!   FLOOD_DATA - Path to the merged CSV (overridden by --data)

use std::env;
use std::time::{SystemTime, UNIX_EPOCH};

use floodrisk_service::config;
use floodrisk_service::endpoint;
use floodrisk_service::ingest::readings::parse_merged_csv;
use floodrisk_service::sensors::SENSOR_REGISTRY;
use floodrisk_service::service::RiskService;
use floodrisk_service::store::FeatureStore;
use floodrisk_service::classifier::RiskModel;

fn main() {
    println!("🌊 Flood Risk Scoring Service");
    println!("=============================\n");

    dotenv::dotenv().ok();

    // Parse command-line arguments
    let args: Vec<String> = env::args().collect();
    let mut endpoint_port: Option<u16> = None;
    let mut data_path: Option<String> = None;

    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "--endpoint" => {
                if i + 1 < args.len() {
                    endpoint_port = args[i + 1].parse().ok();
                    i += 2;
                } else {
                    eprintln!("Error: --endpoint requires a port number");
                    std::process::exit(1);
                }
            }
            "--data" => {
                if i + 1 < args.len() {
                    data_path = Some(args[i + 1].clone());
                    i += 2;
                } else {
                    eprintln!("Error: --data requires a file path");
                    std::process::exit(1);
                }
            }
            _ => {
                eprintln!("Unknown argument: {}", args[i]);
                eprintln!("Usage: {} [--endpoint PORT] [--data PATH]", args[0]);
                std::process::exit(1);
            }
        }
    }

    let config = config::load_config();

    // Flag > environment > config file.
    let port = endpoint_port
        .or_else(|| env::var("PORT").ok().and_then(|p| p.parse().ok()))
        .unwrap_or(config.endpoint.port);
    let data_path = data_path
        .or_else(|| env::var("FLOOD_DATA").ok())
        .unwrap_or_else(|| config.data.merged_csv.clone());

    // Load the merged table
    println!("📊 Loading merged readings from {}...", data_path);
    let csv = match std::fs::read_to_string(&data_path) {
        Ok(text) => text,
        Err(e) => {
            eprintln!("\n❌ Failed to read {}: {}\n", data_path, e);
            std::process::exit(1);
        }
    };
    let merged = match parse_merged_csv(&csv) {
        Ok(rows) => rows,
        Err(e) => {
            eprintln!("\n❌ Failed to parse {}: {}\n", data_path, e);
            std::process::exit(1);
        }
    };
    println!("✓ Loaded {} merged readings\n", merged.len());

    // Build the feature store
    let store = match FeatureStore::from_merged(&merged, &config.data.elevated_state) {
        Ok(store) => store,
        Err(e) => {
            eprintln!("\n❌ Failed to build feature store: {}\n", e);
            std::process::exit(1);
        }
    };

    // Train the classifier
    println!("🌳 Training risk classifier...");
    let (features, labels) = store.training_data();
    let elevated = labels.iter().filter(|&&l| l).count();
    println!(
        "   {} samples ({} elevated, {:.1}%)",
        labels.len(),
        elevated,
        100.0 * elevated as f64 / labels.len() as f64
    );

    let model = match RiskModel::train(&features, &labels, config.model.forest_params()) {
        Ok(model) => model,
        Err(e) => {
            eprintln!("\n❌ Training failed: {}\n", e);
            std::process::exit(1);
        }
    };

    println!("   Feature importances:");
    for (name, importance) in model.importance_ranking() {
        println!("   {:>6.3}  {}", importance, name);
    }
    println!("✓ Classifier trained\n");

    // Jitter seed comes from the clock so repeated runs differ.
    let seed = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_nanos() as u64)
        .unwrap_or(config.model.seed);

    let service = RiskService::new(store, model, SENSOR_REGISTRY, seed, config.jitter.std_dev);

    println!("🚀 Starting HTTP endpoint server...");
    if let Err(e) = endpoint::start_endpoint_server(port, service) {
        eprintln!("\n❌ Endpoint server error: {}\n", e);
        std::process::exit(1);
    }
}
