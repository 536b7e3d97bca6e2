use std::net::SocketAddr;

use axum::{
    extract::ConnectInfo,
    http::{header::USER_AGENT, Extensions, HeaderMap},
};

pub const CF_CONNECTING_IP: &str = "cf-connecting-ip";

/// Network details captured from the inbound request.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ClientInfo {
    pub ip: Option<String>,
    pub user_agent: Option<String>,
}

impl ClientInfo {
    /// The peer address is only known when the server was started with
    /// connect info.
    pub fn from_http(headers: &HeaderMap, extensions: &Extensions) -> Self {
        let peer = extensions
            .get::<ConnectInfo<SocketAddr>>()
            .map(|ConnectInfo(addr)| *addr);
        Self {
            ip: client_ip(headers, peer),
            user_agent: extract_user_agent(headers),
        }
    }
}

/// The proxy-supplied address wins over the socket peer.
pub fn client_ip(headers: &HeaderMap, peer: Option<SocketAddr>) -> Option<String> {
    let peer_ip = peer.map(|addr| addr.ip().to_string());
    let forwarded = headers
        .get(CF_CONNECTING_IP)
        .and_then(|v| v.to_str().ok())
        .map(|ip| ip.trim().to_string())
        .filter(|ip| !ip.is_empty());

    match (forwarded, peer_ip) {
        (Some(forwarded), Some(peer_ip)) => {
            if forwarded != peer_ip {
                tracing::info!(
                    cf_connecting_ip = %forwarded,
                    peer_ip = %peer_ip,
                    "client ip differs from socket address"
                );
            }
            Some(forwarded)
        }
        (Some(forwarded), None) => Some(forwarded),
        (None, peer_ip) => peer_ip,
    }
}

pub fn extract_user_agent(headers: &HeaderMap) -> Option<String> {
    headers
        .get(USER_AGENT)
        .and_then(|v| v.to_str().ok())
        .map(|agent| agent.trim().to_string())
        .filter(|agent| !agent.is_empty())
}
