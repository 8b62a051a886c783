//! Per-IP rate limiting built on governor and `tower_governor`.
//!
//! Two tiers share one key extractor: a strict limiter on the write
//! endpoints (review submission, checkout) and a relaxed one wrapping the
//! whole API. The numbers come from [`RateLimitConfig`], not from here.

use std::net::IpAddr;
use std::sync::Arc;

use axum::http::Request;
use governor::clock::QuantaInstant;
use governor::middleware::NoOpMiddleware;
use tower_governor::{GovernorError, GovernorLayer, governor::GovernorConfigBuilder};

use crate::config::RateLimitConfig;

/// Keys requests by client IP as reported by the reverse proxy.
///
/// The service runs behind a single proxy that sets `X-Forwarded-For`;
/// the first entry is the client. `X-Real-IP` is accepted as a fallback.
/// A request with neither header cannot be keyed and is refused.
#[derive(Clone, Copy)]
pub struct ProxyIpKeyExtractor;

impl tower_governor::key_extractor::KeyExtractor for ProxyIpKeyExtractor {
    type Key = IpAddr;

    fn extract<T>(&self, req: &Request<T>) -> Result<Self::Key, GovernorError> {
        let headers = req.headers();

        if let Some(ip) = headers
            .get("x-forwarded-for")
            .and_then(|v| v.to_str().ok())
            .and_then(|s| s.split(',').next())
            .and_then(|s| s.trim().parse::<IpAddr>().ok())
        {
            return Ok(ip);
        }

        if let Some(ip) = headers
            .get("x-real-ip")
            .and_then(|v| v.to_str().ok())
            .and_then(|s| s.trim().parse::<IpAddr>().ok())
        {
            return Ok(ip);
        }

        Err(GovernorError::UnableToExtractKey)
    }
}

/// Rate limiter layer type for Axum.
pub type RateLimiterLayer =
    GovernorLayer<ProxyIpKeyExtractor, NoOpMiddleware<QuantaInstant>, axum::body::Body>;

/// Limiter for the write endpoints, from the configured write tier.
///
/// # Panics
///
/// Panics if the configured interval or burst is zero; config loading
/// rejects both, so a `RateLimitConfig` built through `from_env` or
/// `default` never trips this.
#[must_use]
pub fn write_rate_limiter(limits: &RateLimitConfig) -> RateLimiterLayer {
    let config = GovernorConfigBuilder::default()
        .key_extractor(ProxyIpKeyExtractor)
        .per_second(limits.write_replenish_seconds)
        .burst_size(limits.write_burst)
        .finish()
        .expect("write rate limit interval and burst are nonzero");
    GovernorLayer::new(Arc::new(config))
}

/// Limiter wrapping the whole API, from the configured relaxed tier.
///
/// # Panics
///
/// Panics if the configured interval or burst is zero; config loading
/// rejects both, so a `RateLimitConfig` built through `from_env` or
/// `default` never trips this.
#[must_use]
pub fn api_rate_limiter(limits: &RateLimitConfig) -> RateLimiterLayer {
    let config = GovernorConfigBuilder::default()
        .key_extractor(ProxyIpKeyExtractor)
        .per_second(limits.api_replenish_seconds)
        .burst_size(limits.api_burst)
        .finish()
        .expect("api rate limit interval and burst are nonzero");
    GovernorLayer::new(Arc::new(config))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tower_governor::key_extractor::KeyExtractor;

    fn request(headers: &[(&str, &str)]) -> Request<()> {
        let mut builder = Request::builder().uri("/api/products");
        for (name, value) in headers {
            builder = builder.header(*name, *value);
        }
        builder.body(()).expect("request")
    }

    #[test]
    fn test_forwarded_for_first_hop_wins() {
        let req = request(&[
            ("x-forwarded-for", "203.0.113.7, 10.0.0.1"),
            ("x-real-ip", "198.51.100.2"),
        ]);
        let key = ProxyIpKeyExtractor.extract(&req).expect("key");
        assert_eq!(key, "203.0.113.7".parse::<IpAddr>().expect("ip"));
    }

    #[test]
    fn test_real_ip_fallback() {
        let req = request(&[("x-real-ip", "198.51.100.2")]);
        let key = ProxyIpKeyExtractor.extract(&req).expect("key");
        assert_eq!(key, "198.51.100.2".parse::<IpAddr>().expect("ip"));
    }

    #[test]
    fn test_unkeyable_request_is_refused() {
        let req = request(&[]);
        assert!(ProxyIpKeyExtractor.extract(&req).is_err());
    }

    #[test]
    fn test_garbage_forwarded_for_falls_through() {
        let req = request(&[
            ("x-forwarded-for", "not-an-ip"),
            ("x-real-ip", "198.51.100.2"),
        ]);
        let key = ProxyIpKeyExtractor.extract(&req).expect("key");
        assert_eq!(key, "198.51.100.2".parse::<IpAddr>().expect("ip"));
    }

    #[test]
    fn test_limiters_build_from_defaults() {
        let limits = RateLimitConfig::default();
        let _ = write_rate_limiter(&limits);
        let _ = api_rate_limiter(&limits);
    }
}
