use axum::{
    http::{HeaderMap, StatusCode},
    Json,
};
use serde_json::json;

/// Checks a rate limit counter stored in Redis.
///
/// Uses the INCR + EXPIRE strategy:
/// - Increments a counter for `key`
/// - On first increment, sets TTL to `window_secs`
/// - Returns 429 if counter exceeds `max_attempts`
///
/// Redis being unreachable counts as zero attempts.
pub async fn check_rate_limit(
    redis: &mut redis::aio::MultiplexedConnection,
    key: &str,
    max_attempts: u64,
    window_secs: u64,
) -> Result<(), (StatusCode, Json<serde_json::Value>)> {
    let count: u64 = redis::cmd("INCR")
        .arg(key)
        .query_async(redis)
        .await
        .unwrap_or(0);

    if count == 1 {
        // TTL only on the first hit, so retries don't extend the window
        let _: Result<(), _> = redis::cmd("EXPIRE")
            .arg(key)
            .arg(window_secs)
            .query_async(redis)
            .await;
    }

    if count > max_attempts {
        tracing::warn!(key, count, "rate limit exceeded");
        return Err((
            StatusCode::TOO_MANY_REQUESTS,
            Json(json!({ "success": false, "error": "Too many requests. Try again in a few minutes." })),
        ));
    }

    Ok(())
}

/// Client IP from proxy headers: X-Real-IP first, then the first X-Forwarded-For hop.
pub fn real_ip(headers: &HeaderMap) -> String {
    if let Some(ip) = headers.get("x-real-ip").and_then(|v| v.to_str().ok()) {
        return ip.to_string();
    }
    if let Some(xff) = headers.get("x-forwarded-for").and_then(|v| v.to_str().ok()) {
        if let Some(first) = xff.split(',').next() {
            return first.trim().to_string();
        }
    }
    "unknown".to_string()
}

#[cfg(test)]
mod tests {
    use axum::http::HeaderValue;

    use super::*;

    #[test]
    fn test_real_ip_prefers_x_real_ip() {
        let mut headers = HeaderMap::new();
        headers.insert("x-forwarded-for", HeaderValue::from_static("10.0.0.1, 10.0.0.2"));
        assert_eq!(real_ip(&headers), "10.0.0.1");

        headers.insert("x-real-ip", HeaderValue::from_static("203.0.113.9"));
        assert_eq!(real_ip(&headers), "203.0.113.9");

        assert_eq!(real_ip(&HeaderMap::new()), "unknown");
    }
}
