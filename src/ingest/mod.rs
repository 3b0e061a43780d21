/// Data ingest: CSV parsers for the sensor/weather exports and the NWS
/// forecast API client.

pub mod fixtures;
pub mod nws;
pub mod readings;
