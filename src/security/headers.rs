//! Header filtering between client and upstream.
//!
//! # Responsibilities
//! - Drop `Host` and hop-by-hop headers from the outbound request
//! - Drop origin browser policy and hop-by-hop headers from the response
//! - Copy everything else, keeping multi-value headers intact

use axum::http::header::{self, HeaderMap, HeaderName};

/// Connection-scoped headers, owned by each side's transport.
static HOP_BY_HOP: [HeaderName; 8] = [
    header::CONNECTION,
    HeaderName::from_static("keep-alive"),
    header::PROXY_AUTHENTICATE,
    header::PROXY_AUTHORIZATION,
    header::TE,
    header::TRAILER,
    header::TRANSFER_ENCODING,
    header::UPGRADE,
];

/// Origin policies that must not apply to content served from the proxy.
static ORIGIN_POLICY: [HeaderName; 3] = [
    header::CONTENT_SECURITY_POLICY,
    header::REFERRER_POLICY,
    header::STRICT_TRANSPORT_SECURITY,
];

pub fn is_hop_by_hop(name: &HeaderName) -> bool {
    HOP_BY_HOP.contains(name)
}

/// Headers to send upstream.
pub fn outbound_request_headers(inbound: &HeaderMap) -> HeaderMap {
    filter(inbound, |name| *name == header::HOST || is_hop_by_hop(name))
}

/// Headers to send back to the client.
pub fn client_response_headers(upstream: &HeaderMap) -> HeaderMap {
    filter(upstream, |name| ORIGIN_POLICY.contains(name) || is_hop_by_hop(name))
}

fn filter(source: &HeaderMap, skip: impl Fn(&HeaderName) -> bool) -> HeaderMap {
    let mut out = HeaderMap::with_capacity(source.len());
    for (name, value) in source.iter() {
        if !skip(name) {
            out.append(name.clone(), value.clone());
        }
    }
    out
}
