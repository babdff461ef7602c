//! CORS policy for browser frontends.
//!
//! Origins are matched exactly against `gateway.allowed_origins`, then
//! against `gateway.allow_origin_regex` (loopback on any port by default).

use axum::http::{HeaderValue, request::Parts};
use chatrelay_config::GatewayConfig;
use regex_lite::Regex;
use tower_http::cors::{AllowHeaders, AllowMethods, AllowOrigin, CorsLayer};
use tracing::warn;

/// Build the CORS layer from gateway configuration.
///
/// Credentials are allowed, so methods and headers mirror the preflight
/// request instead of using a wildcard.
pub fn cors_layer(config: &GatewayConfig) -> CorsLayer {
    let exact: Vec<HeaderValue> = config
        .allowed_origins
        .iter()
        .filter_map(|origin| match HeaderValue::from_str(origin) {
            Ok(value) => Some(value),
            Err(_) => {
                warn!(origin = %origin, "Ignoring invalid CORS origin");
                None
            }
        })
        .collect();
    let pattern = origin_pattern(config);

    let origins = AllowOrigin::predicate(move |origin: &HeaderValue, _parts: &Parts| {
        if exact.iter().any(|allowed| allowed == origin) {
            return true;
        }
        match (&pattern, origin.to_str()) {
            (Some(re), Ok(origin)) => re.is_match(origin),
            _ => false,
        }
    });

    CorsLayer::new()
        .allow_origin(origins)
        .allow_methods(AllowMethods::mirror_request())
        .allow_headers(AllowHeaders::mirror_request())
        .allow_credentials(true)
}

/// Compile `allow_origin_regex` once. Config validation rejects bad
/// patterns on load; one built by hand is logged and ignored.
fn origin_pattern(config: &GatewayConfig) -> Option<Regex> {
    let pattern = config.origin_regex()?;
    match Regex::new(pattern) {
        Ok(re) => Some(re),
        Err(e) => {
            warn!(pattern = %pattern, error = %e, "Ignoring invalid CORS origin pattern");
            None
        }
    }
}
