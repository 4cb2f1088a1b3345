//! Client address resolution for access logs.

use std::net::IpAddr;

/// Address to log for a request.
///
/// When the peer is a trusted gateway, the first `X-Forwarded-For` entry is
/// used instead of the peer itself.
pub fn client_ip(peer: Option<IpAddr>, forwarded_for: Option<&str>, trusted: &[IpAddr]) -> String {
    let Some(peer) = peer else {
        return "-".to_string();
    };

    if trusted.contains(&peer)
        && let Some(first) = forwarded_for
            .and_then(|value| value.split(',').next())
            .map(str::trim)
            .filter(|first| !first.is_empty())
    {
        return first.to_string();
    }

    peer.to_string()
}
