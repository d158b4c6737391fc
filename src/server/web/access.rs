use axum::{
    extract::{ConnectInfo, Request},
    http::StatusCode,
    middleware::Next,
    response::{IntoResponse, Response},
    Json,
};
use std::net::{IpAddr, Ipv4Addr, Ipv6Addr, SocketAddr};
use tracing::warn;

use super::types::ApiError;

/// Gate every request on the caller's remote address before any other
/// processing. Only loopback, RFC 1918 private, and link-local sources are
/// served; everything else gets a structured 403 and never sees data.
pub async fn require_local_caller(
    ConnectInfo(addr): ConnectInfo<SocketAddr>,
    request: Request,
    next: Next,
) -> Response {
    if is_allowed_source(addr.ip()) {
        return next.run(request).await;
    }
    warn!("Rejected request from non-local address {}", addr);
    (
        StatusCode::FORBIDDEN,
        Json(ApiError {
            error: "forbidden".to_string(),
            detail: "only local-network callers are allowed".to_string(),
        }),
    )
        .into_response()
}

pub fn is_allowed_source(ip: IpAddr) -> bool {
    match ip {
        IpAddr::V4(v4) => is_allowed_v4(v4),
        IpAddr::V6(v6) => {
            if let Some(v4) = v6.to_ipv4_mapped() {
                return is_allowed_v4(v4);
            }
            v6.is_loopback() || is_unique_local_v6(&v6) || is_link_local_v6(&v6)
        }
    }
}

fn is_allowed_v4(ip: Ipv4Addr) -> bool {
    ip.is_loopback() || ip.is_private() || ip.is_link_local()
}

// fc00::/7
fn is_unique_local_v6(ip: &Ipv6Addr) -> bool {
    (ip.segments()[0] & 0xfe00) == 0xfc00
}

// fe80::/10
fn is_link_local_v6(ip: &Ipv6Addr) -> bool {
    (ip.segments()[0] & 0xffc0) == 0xfe80
}
