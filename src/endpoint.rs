/// HTTP endpoint serving risk scores
///
/// Provides the JSON API the dashboard frontend polls.
///
/// Endpoints:
/// - GET /api/risk?date=YYYY-MM-DD&hour=H - Per-sensor risk for an hour
/// - GET /api/risk-history?date=YYYY-MM-DD&hour=H - 13-point risk series
/// - GET /health - Service health check
///
/// Both query parameters are optional on both routes; the feature store's
/// fallback ladder handles anything missing or malformed, so every request
/// that reaches a handler produces a 200 unless scoring itself fails.

use crate::service::RiskService;

// ---------------------------------------------------------------------------
// Query String Parsing
// ---------------------------------------------------------------------------

/// Split a request URL into its path and query parameters.
///
/// Minimal parser for our two known parameters: no percent-decoding, since
/// dates and hours never need it.
fn split_url(url: &str) -> (&str, Vec<(&str, &str)>) {
    match url.split_once('?') {
        None => (url, Vec::new()),
        Some((path, query)) => {
            let params = query
                .split('&')
                .filter(|p| !p.is_empty())
                .map(|p| p.split_once('=').unwrap_or((p, "")))
                .collect();
            (path, params)
        }
    }
}

fn query_param<'a>(params: &[(&'a str, &'a str)], name: &str) -> Option<&'a str> {
    params
        .iter()
        .find(|(k, _)| *k == name)
        .map(|(_, v)| *v)
        .filter(|v| !v.is_empty())
}

// ---------------------------------------------------------------------------
// HTTP Server
// ---------------------------------------------------------------------------

/// Start the HTTP endpoint server on the specified port. Blocks serving
/// requests until the process exits.
pub fn start_endpoint_server(port: u16, service: RiskService) -> Result<(), String> {
    let server = tiny_http::Server::http(format!("0.0.0.0:{}", port))
        .map_err(|e| format!("Failed to start HTTP server: {}", e))?;

    println!("📡 HTTP endpoint listening on http://0.0.0.0:{}", port);
    println!("   GET /api/risk?date=YYYY-MM-DD&hour=H - Per-sensor risk scores");
    println!("   GET /api/risk-history?date=YYYY-MM-DD&hour=H - Risk history window");
    println!("   GET /health - Service health check\n");

    for request in server.incoming_requests() {
        let (path, params) = split_url(request.url());
        let date = query_param(&params, "date");
        let hour = query_param(&params, "hour");

        let response = match path {
            "/health" => handle_health(),
            "/api/risk" => handle_risk(&service, date, hour),
            "/api/risk-history" => handle_risk_history(&service, date, hour),
            _ => create_response(
                404,
                serde_json::json!({
                    "error": "Not found",
                    "available_endpoints": ["/health", "/api/risk", "/api/risk-history"]
                }),
            ),
        };

        if let Err(e) = request.respond(response) {
            eprintln!("Failed to send response: {}", e);
        }
    }

    Ok(())
}

/// Handle /health endpoint
fn handle_health() -> tiny_http::Response<std::io::Cursor<Vec<u8>>> {
    create_response(
        200,
        serde_json::json!({
            "status": "ok",
            "service": "floodrisk_service",
            "version": env!("CARGO_PKG_VERSION")
        }),
    )
}

/// Handle /api/risk endpoint
fn handle_risk(
    service: &RiskService,
    date: Option<&str>,
    hour: Option<&str>,
) -> tiny_http::Response<std::io::Cursor<Vec<u8>>> {
    match service.current_risk(date, hour) {
        Ok(risk) => match serde_json::to_value(&risk) {
            Ok(json) => create_response(200, json),
            Err(e) => server_error(e.to_string()),
        },
        Err(e) => server_error(e.to_string()),
    }
}

/// Handle /api/risk-history endpoint
fn handle_risk_history(
    service: &RiskService,
    date: Option<&str>,
    hour: Option<&str>,
) -> tiny_http::Response<std::io::Cursor<Vec<u8>>> {
    match service.risk_history(date, hour) {
        Ok(history) => match serde_json::to_value(&history) {
            Ok(json) => create_response(200, json),
            Err(e) => server_error(e.to_string()),
        },
        Err(e) => server_error(e.to_string()),
    }
}

fn server_error(message: String) -> tiny_http::Response<std::io::Cursor<Vec<u8>>> {
    create_response(500, serde_json::json!({ "error": message }))
}

/// Create HTTP response with JSON body
fn create_response(
    status_code: u16,
    json: serde_json::Value,
) -> tiny_http::Response<std::io::Cursor<Vec<u8>>> {
    let body = serde_json::to_string_pretty(&json).unwrap_or_else(|_| "{}".to_string());
    let bytes = body.into_bytes();

    tiny_http::Response::from_data(bytes)
        .with_status_code(tiny_http::StatusCode::from(status_code))
        .with_header(
            tiny_http::Header::from_bytes(&b"Content-Type"[..], &b"application/json"[..])
                .expect("static header is valid"),
        )
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_split_url_without_query() {
        let (path, params) = split_url("/api/risk");
        assert_eq!(path, "/api/risk");
        assert!(params.is_empty());
    }

    #[test]
    fn test_split_url_with_date_and_hour() {
        let (path, params) = split_url("/api/risk?date=2024-04-01&hour=13");
        assert_eq!(path, "/api/risk");
        assert_eq!(query_param(&params, "date"), Some("2024-04-01"));
        assert_eq!(query_param(&params, "hour"), Some("13"));
    }

    #[test]
    fn test_query_param_empty_value_counts_as_absent() {
        let (_, params) = split_url("/api/risk?date=&hour=5");
        assert_eq!(query_param(&params, "date"), None);
        assert_eq!(query_param(&params, "hour"), Some("5"));
    }

    #[test]
    fn test_split_url_valueless_parameter() {
        let (_, params) = split_url("/api/risk-history?date");
        assert_eq!(query_param(&params, "date"), None);
    }
}
