//! Which local address a renderer should use to reach us.

use std::net::{IpAddr, SocketAddr, ToSocketAddrs, UdpSocket};
use url::{Host, Url};

use crate::error::PlayerError;

/// Local IP of the interface that routes to the renderer behind `control_endpoint`.
///
/// Connecting a UDP socket sends nothing; it only asks the kernel to pick
/// the outgoing interface, whose address is then read back.
pub fn local_ip_as_seen_by(control_endpoint: &str) -> Result<IpAddr, PlayerError> {
    let url = Url::parse(control_endpoint).map_err(|e| {
        PlayerError::ConnectivityError(format!("Invalid control endpoint {}: {}", control_endpoint, e))
    })?;

    let target = resolve_host(&url)?;
    let bind_addr: SocketAddr = if target.is_ipv4() {
        ([0, 0, 0, 0], 0).into()
    } else {
        (std::net::Ipv6Addr::UNSPECIFIED, 0).into()
    };

    let connectivity = |e: std::io::Error| {
        PlayerError::ConnectivityError(format!("No route to renderer at {}: {}", target, e))
    };
    let socket = UdpSocket::bind(bind_addr).map_err(connectivity)?;
    socket.connect(target).map_err(connectivity)?;
    Ok(socket.local_addr().map_err(connectivity)?.ip())
}

fn resolve_host(url: &Url) -> Result<SocketAddr, PlayerError> {
    match url.host() {
        Some(Host::Ipv4(ip)) => Ok((ip, 80).into()),
        Some(Host::Ipv6(ip)) => Ok((ip, 80).into()),
        Some(Host::Domain(name)) => (name, 80)
            .to_socket_addrs()
            .map_err(|e| PlayerError::ConnectivityError(format!("Cannot resolve {}: {}", name, e)))?
            .next()
            .ok_or_else(|| PlayerError::ConnectivityError(format!("{} resolved to no address", name))),
        None => Err(PlayerError::ConnectivityError(format!("{} has no host", url))),
    }
}
