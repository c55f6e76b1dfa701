use std::io;
use std::net::{IpAddr, Ipv4Addr, SocketAddr, TcpListener, TcpStream, ToSocketAddrs, UdpSocket};

use log::{info, warn};

use crate::error::SessionError;
use crate::internal_error_message;
use crate::presenter::Presenter;
use crate::role::Role;
use crate::session::SessionContext;


#[derive(Clone, Copy, Debug)]
pub struct HostOptions {
    pub bind_address: SocketAddr,
    // Any routable address works: connecting a UDP socket sends nothing, it only makes the OS pick
    // the outgoing interface.
    pub route_probe: SocketAddr,
}

impl Default for HostOptions {
    fn default() -> Self {
        HostOptions {
            bind_address: SocketAddr::new(IpAddr::V4(Ipv4Addr::UNSPECIFIED), 0),
            route_probe: SocketAddr::new(IpAddr::V4(Ipv4Addr::new(8, 8, 8, 8)), 80),
        }
    }
}

pub fn discover_local_ip(route_probe: SocketAddr) -> io::Result<IpAddr> {
    let unspecified = match route_probe {
        SocketAddr::V4(_) => IpAddr::V4(Ipv4Addr::UNSPECIFIED),
        SocketAddr::V6(_) => IpAddr::V6(std::net::Ipv6Addr::UNSPECIFIED),
    };
    let socket = UdpSocket::bind(SocketAddr::new(unspecified, 0))?;
    socket.connect(route_probe)?;
    Ok(socket.local_addr()?.ip())
}

// Listens on an ephemeral port, publishes `ip:port` and waits for exactly one peer.
pub fn host_session(
    options: HostOptions, presenter: &mut dyn Presenter,
) -> Result<TcpStream, SessionError> {
    let listener = TcpListener::bind(options.bind_address)
        .map_err(|err| SessionError::setup(format!("binding {}", options.bind_address), err))?;
    let port = listener
        .local_addr()
        .map_err(|err| SessionError::setup("reading listener address", err))?
        .port();
    let ip = match discover_local_ip(options.route_probe) {
        Ok(ip) => ip,
        Err(err) => {
            warn!("Cannot discover LAN address ({err}), publishing loopback instead");
            IpAddr::V4(Ipv4Addr::LOCALHOST)
        }
    };
    info!("Hosting session at {}", SocketAddr::new(ip, port));
    presenter.present_session_address(ip, port);

    let (stream, peer) = listener
        .accept()
        .map_err(|err| SessionError::setup("accepting connection", err))?;
    info!("Peer connected from {peer}");
    Ok(stream)
}

// Dials `address` once. There is no retry: an unreachable host ends the session.
pub fn join_session(address: &str) -> Result<TcpStream, SessionError> {
    info!("Joining session at {address}");
    let addrs: Vec<SocketAddr> = address
        .to_socket_addrs()
        .map_err(|err| SessionError::setup(format!("resolving {address:?}"), err))?
        .collect();
    let stream = TcpStream::connect(&addrs[..])
        .map_err(|err| SessionError::setup(format!("connecting to {address}"), err))?;
    info!("Connected to {address}");
    Ok(stream)
}

pub fn establish(
    ctx: &SessionContext, options: HostOptions, presenter: &mut dyn Presenter,
) -> Result<TcpStream, SessionError> {
    let stream = match ctx.role {
        Role::Initiator => host_session(options, presenter)?,
        Role::Joiner => {
            let address = ctx
                .peer_address
                .as_deref()
                .unwrap_or_else(|| panic!("{}", internal_error_message!("joiner without address")));
            join_session(address)?
        }
    };
    // Tokens are tiny and every hand-off is latency sensitive.
    if let Err(err) = stream.set_nodelay(true) {
        warn!("Cannot set TCP_NODELAY: {err}");
    }
    Ok(stream)
}
