// Scripted collaborators for the turn engine. Public because integration tests use them too.

use std::collections::VecDeque;
use std::io::{self, Read, Write};
use std::net::IpAddr;
use std::sync::mpsc;
use std::time::Duration;

use rand::SeedableRng;
use rand::rngs::StdRng;

use crate::error::InputError;
use crate::input::{InputEvent, InputSource};
use crate::network;
use crate::presenter::{Presenter, Prompter};
use crate::role::Role;
use crate::ticker::Pacer;
use crate::token::{Token, TokenState};
use crate::turn_engine::Outcome;


// In theory random tests verify statistical properties that should always hold, but let's fix
// the seed to avoid sporadic failures.
pub fn deterministic_rng() -> StdRng { StdRng::from_seed([0; 32]) }

pub fn token_state(countdown: f64, holder: Role) -> TokenState {
    TokenState { countdown, holder, terminal: countdown <= 0.0 }
}

pub fn encode_states(states: &[TokenState]) -> Vec<u8> {
    let mut buf = Vec::new();
    for &state in states {
        network::send_token(&mut buf, &Token::from_state(state).unwrap()).unwrap();
    }
    buf
}

pub fn decode_states(mut data: &[u8]) -> Vec<TokenState> {
    let mut states = Vec::new();
    while !data.is_empty() {
        states.push(network::receive_token(&mut data).unwrap().snapshot());
    }
    states
}

// Ticks without sleeping.
pub struct Unpaced;

impl Pacer for Unpaced {
    fn start(&mut self) {}
    fn wait_tick(&mut self) {}
}

pub struct ScriptedInput {
    events: VecDeque<Result<InputEvent, InputError>>,
    // How many times stale input was discarded, i.e. how many local turns began.
    pub discards: usize,
}

impl ScriptedInput {
    pub fn new(events: impl IntoIterator<Item = InputEvent>) -> Self {
        ScriptedInput { events: events.into_iter().map(Ok).collect(), discards: 0 }
    }
    pub fn holds_then_pass(holds: usize) -> Self {
        let mut events = vec![InputEvent::Hold; holds];
        events.push(InputEvent::Pass);
        ScriptedInput::new(events)
    }
    pub fn push_error(&mut self, err: InputError) { self.events.push_back(Err(err)); }
    pub fn remaining(&self) -> usize { self.events.len() }
}

impl InputSource for ScriptedInput {
    fn read_event(&mut self, _timeout: Duration) -> Result<InputEvent, InputError> {
        self.events.pop_front().unwrap_or_else(|| {
            Err(InputError::Device(io::Error::other("input script exhausted")))
        })
    }
    fn discard_pending(&mut self) -> Result<(), InputError> {
        self.discards += 1;
        Ok(())
    }
}

#[derive(Clone, PartialEq, Debug)]
pub enum PresenterCall {
    SessionAddress(IpAddr, u16),
    TurnState(Role),
    HoldDuration,
    Result(Role),
    FatalWarning(String),
}

#[derive(Default)]
pub struct RecordingPresenter {
    pub calls: Vec<PresenterCall>,
    // Lets a test learn the published port while the host blocks on accept.
    pub address_tx: Option<mpsc::Sender<(IpAddr, u16)>>,
}

impl RecordingPresenter {
    pub fn with_address_channel(address_tx: mpsc::Sender<(IpAddr, u16)>) -> Self {
        RecordingPresenter { calls: Vec::new(), address_tx: Some(address_tx) }
    }
}

impl Presenter for RecordingPresenter {
    fn present_session_address(&mut self, ip: IpAddr, port: u16) {
        self.calls.push(PresenterCall::SessionAddress(ip, port));
        if let Some(ref tx) = self.address_tx {
            tx.send((ip, port)).unwrap();
        }
    }
    fn present_turn_state(&mut self, holder: Role) {
        self.calls.push(PresenterCall::TurnState(holder));
    }
    fn present_hold_duration(&mut self, _held: Duration) {
        self.calls.push(PresenterCall::HoldDuration);
    }
    fn present_result(&mut self, outcome: &Outcome) {
        self.calls.push(PresenterCall::Result(outcome.loser));
    }
    fn present_fatal_warning(&mut self, message: &str) {
        self.calls.push(PresenterCall::FatalWarning(message.to_owned()));
    }
}

pub struct ScriptedPrompter {
    pub role: Role,
    pub names: Vec<String>,
    pub address: String,
    pub prompts: usize,
}

impl Default for ScriptedPrompter {
    fn default() -> Self {
        ScriptedPrompter {
            role: Role::Initiator,
            names: Vec::new(),
            address: String::new(),
            prompts: 0,
        }
    }
}

impl Prompter for ScriptedPrompter {
    fn prompt_role_choice(&mut self) -> Result<Role, InputError> {
        self.prompts += 1;
        Ok(self.role)
    }
    // Running out of names behaves like a closed standard input.
    fn prompt_player_name(&mut self) -> Result<String, InputError> {
        self.prompts += 1;
        if self.names.is_empty() {
            return Err(InputError::Device(io::ErrorKind::UnexpectedEof.into()));
        }
        Ok(self.names.remove(0))
    }
    fn prompt_join_address(&mut self) -> Result<String, InputError> {
        self.prompts += 1;
        Ok(self.address.clone())
    }
}

// A connection with canned incoming bytes that records everything written to it.
pub struct MemoryStream {
    incoming: io::Cursor<Vec<u8>>,
    pub outgoing: Vec<u8>,
}

impl MemoryStream {
    pub fn new(incoming: Vec<u8>) -> Self {
        MemoryStream { incoming: io::Cursor::new(incoming), outgoing: Vec::new() }
    }
    pub fn sent_states(&self) -> Vec<TokenState> { decode_states(&self.outgoing) }
}

impl Read for MemoryStream {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> { self.incoming.read(buf) }
}

impl Write for MemoryStream {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> { self.outgoing.write(buf) }
    fn flush(&mut self) -> io::Result<()> { Ok(()) }
}
