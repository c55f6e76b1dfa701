// Rust-upgrade (https://github.com/rust-lang/rust/issues/46379):
//   remove `#[allow(dead_code)]` before public functions.

use std::net::{IpAddr, Ipv4Addr, SocketAddr, TcpStream};
use std::sync::mpsc;
use std::thread;

use bombgame::error::SessionError;
use bombgame::role::Role;
use bombgame::session::{SessionConfig, SessionContext};
use bombgame::test_util::{RecordingPresenter, ScriptedInput, Unpaced};
use bombgame::transport::{self, HostOptions};
use bombgame::turn_engine::{Outcome, TurnEngine};


#[allow(dead_code)]
pub fn loopback_host_options() -> HostOptions {
    HostOptions {
        bind_address: SocketAddr::new(IpAddr::V4(Ipv4Addr::LOCALHOST), 0),
        // Any address works for route discovery, and this one needs no network.
        route_probe: SocketAddr::new(IpAddr::V4(Ipv4Addr::LOCALHOST), 9),
    }
}

#[allow(dead_code)]
pub fn context(role: Role, name: &str, peer_address: Option<String>) -> SessionContext {
    SessionContext::new(role, name.to_owned(), peer_address, SessionConfig::default())
}

// Hosts on loopback in a background thread. Returns the published port and a handle yielding the
// accepted stream together with everything the host presented.
#[allow(dead_code)]
pub fn spawn_host() -> (
    u16,
    thread::JoinHandle<(Result<TcpStream, SessionError>, RecordingPresenter)>,
) {
    let (address_tx, address_rx) = mpsc::channel();
    let handle = thread::spawn(move || {
        let mut presenter = RecordingPresenter::with_address_channel(address_tx);
        let stream = transport::host_session(loopback_host_options(), &mut presenter);
        (stream, presenter)
    });
    let (_ip, port) = address_rx.recv().unwrap();
    (port, handle)
}

#[allow(dead_code)]
pub fn play(
    ctx: SessionContext, stream: TcpStream, mut input: ScriptedInput,
) -> (Result<Outcome, SessionError>, RecordingPresenter) {
    let mut presenter = RecordingPresenter::default();
    let mut pacer = Unpaced;
    let result = TurnEngine::new(&ctx, stream, &mut input, &mut pacer, &mut presenter).run();
    (result, presenter)
}
