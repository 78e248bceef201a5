//! Inbound request inspection.
//!
//! # Responsibilities
//! - Detect Kubernetes probes so they bypass the filter entirely
//! - Select the inbound headers that travel with a forwarded webhook
//!
//! # Design Decisions
//! - Header names are stored lowercased, so the `X-` prefix test is done on
//!   `x-`; this matches any header whose canonical form starts with `X-`
//! - Every value of a repeated header is kept

use axum::http::header::USER_AGENT;
use axum::http::HeaderMap;

const PROBE_USER_AGENT: &str = "kube-probe";
const FORWARDED_PREFIX: &str = "x-";

/// Returns true if the request comes from a liveness/readiness probe.
pub fn is_probe(headers: &HeaderMap) -> bool {
    headers
        .get(USER_AGENT)
        .and_then(|v| v.to_str().ok())
        .is_some_and(|ua| ua.starts_with(PROBE_USER_AGENT))
}

/// Copy every `X-` header, with all of its values.
pub fn forwarded_headers(inbound: &HeaderMap) -> HeaderMap {
    let mut headers = HeaderMap::new();
    for (name, value) in inbound {
        if name.as_str().starts_with(FORWARDED_PREFIX) {
            headers.append(name.clone(), value.clone());
        }
    }
    headers
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::{HeaderName, HeaderValue};

    #[test]
    fn test_is_probe() {
        let mut headers = HeaderMap::new();
        assert!(!is_probe(&headers));

        headers.insert(USER_AGENT, HeaderValue::from_static("kube-probe/1.29"));
        assert!(is_probe(&headers));

        headers.insert(USER_AGENT, HeaderValue::from_static("GogsServer"));
        assert!(!is_probe(&headers));

        headers.insert(USER_AGENT, HeaderValue::from_static("not-kube-probe"));
        assert!(!is_probe(&headers));
    }

    #[test]
    fn test_forwarded_headers() {
        let mut inbound = HeaderMap::new();
        let event = HeaderName::from_bytes(b"X-Gogs-Event").unwrap();
        inbound.insert(event, HeaderValue::from_static("push"));
        inbound.insert("x-gogs-delivery", HeaderValue::from_static("abc"));
        inbound.append("x-multi", HeaderValue::from_static("one"));
        inbound.append("x-multi", HeaderValue::from_static("two"));
        inbound.insert("content-type", HeaderValue::from_static("text/plain"));
        inbound.insert("authorization", HeaderValue::from_static("secret"));
        inbound.insert("xylophone", HeaderValue::from_static("no"));

        let forwarded = forwarded_headers(&inbound);
        assert_eq!(forwarded.get("x-gogs-event").unwrap(), "push");
        assert_eq!(forwarded.get("X-Gogs-Delivery").unwrap(), "abc");
        let multi: Vec<_> = forwarded.get_all("x-multi").iter().collect();
        assert_eq!(multi, vec!["one", "two"]);
        assert!(forwarded.get("content-type").is_none());
        assert!(forwarded.get("authorization").is_none());
        assert!(forwarded.get("xylophone").is_none());
        assert_eq!(forwarded.len(), 4);
    }
}
