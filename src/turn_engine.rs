// The bomb is replicated by message passing: each peer keeps a local copy and only the holder may
// mutate it. A peer is either draining its copy inside the hold loop or blocked on receive, never
// both, which is what keeps the two copies from diverging.

use std::io;
use std::time::Duration;

use instant::Instant;
use log::{debug, info};

use crate::error::SessionError;
use crate::input::{InputEvent, InputSource};
use crate::internal_error_message;
use crate::network;
use crate::presenter::Presenter;
use crate::role::Role;
use crate::session::SessionContext;
use crate::ticker::Pacer;
use crate::token::{Token, TokenState};


#[derive(Debug)]
pub enum TurnState {
    AwaitingToken,
    LocalTurn(Token),
    RemoteTurn(Role),
    GameOver(TokenState),
}

#[derive(Clone, PartialEq, Debug)]
pub struct Outcome {
    pub loser: Role,
    pub local_role: Role,
    // Number of local turns, including the one that ended in an explosion.
    pub local_turns: u32,
    pub local_hold_time: Duration,
}

impl Outcome {
    pub fn local_won(&self) -> bool { self.loser != self.local_role }
}

pub struct TurnEngine<'a, S> {
    ctx: &'a SessionContext,
    stream: S,
    input: &'a mut dyn InputSource,
    pacer: &'a mut dyn Pacer,
    presenter: &'a mut dyn Presenter,
    game_over: bool,
    local_turns: u32,
    local_hold_time: Duration,
}

impl<'a, S: io::Read + io::Write> TurnEngine<'a, S> {
    pub fn new(
        ctx: &'a SessionContext, stream: S, input: &'a mut dyn InputSource,
        pacer: &'a mut dyn Pacer, presenter: &'a mut dyn Presenter,
    ) -> Self {
        TurnEngine {
            ctx,
            stream,
            input,
            pacer,
            presenter,
            game_over: false,
            local_turns: 0,
            local_hold_time: Duration::ZERO,
        }
    }

    pub fn into_stream(self) -> S { self.stream }

    // Plays the session to the end. Every error is fatal for the session.
    pub fn run(&mut self) -> Result<Outcome, SessionError> {
        info!("Game started for {} as {}", self.ctx.player_name, self.ctx.role);
        match self.ctx.role {
            Role::Initiator => {
                let countdown_range = self.ctx.config.countdown_range.clone();
                self.initiate(Token::new_random(&mut rand::rng(), countdown_range))
            }
            Role::Joiner => self.play(TurnState::AwaitingToken),
        }
    }

    // Only the initiator creates the bomb, so the random holder and countdown are decided in
    // exactly one place. Creation is not a turn: the creator sends the bomb first and then treats
    // it like any received version.
    pub fn initiate(&mut self, token: Token) -> Result<Outcome, SessionError> {
        assert_eq!(self.ctx.role, Role::Initiator);
        assert!(!token.is_terminal(), "{}", internal_error_message!("created exploded bomb"));
        info!("New bomb: {:?}", token.snapshot());
        self.send(&token)?;
        let state = self.observe(token);
        self.play(state)
    }

    fn play(&mut self, mut state: TurnState) -> Result<Outcome, SessionError> {
        loop {
            state = match state {
                TurnState::AwaitingToken => self.await_token()?,
                TurnState::LocalTurn(token) => self.hold_loop(token)?,
                TurnState::RemoteTurn(holder) => {
                    debug!("Waiting for {holder}");
                    TurnState::AwaitingToken
                }
                TurnState::GameOver(final_state) => {
                    let outcome = Outcome {
                        loser: final_state.holder,
                        local_role: self.ctx.role,
                        local_turns: self.local_turns,
                        local_hold_time: self.local_hold_time,
                    };
                    info!("Bomb exploded in the hands of {}", outcome.loser);
                    self.presenter.present_result(&outcome);
                    return Ok(outcome);
                }
            };
        }
    }

    fn await_token(&mut self) -> Result<TurnState, SessionError> {
        let token = network::receive_token(&mut self.stream)?;
        let state = token.snapshot();
        debug!("Received {state:?}");
        if state.terminal {
            self.game_over = true;
            return Ok(TurnState::GameOver(state));
        }
        Ok(self.observe(token))
    }

    fn observe(&mut self, token: Token) -> TurnState {
        let holder = token.who_holds();
        self.presenter.present_turn_state(holder);
        if holder == self.ctx.role {
            TurnState::LocalTurn(token)
        } else {
            TurnState::RemoteTurn(holder)
        }
    }

    fn hold_loop(&mut self, token: Token) -> Result<TurnState, SessionError> {
        let config = &self.ctx.config;
        let drain = config.tick.as_secs_f64();
        let input_timeout = config.input_timeout;
        self.input.discard_pending()?;
        let start = Instant::now();
        self.local_turns += 1;
        self.pacer.start();
        loop {
            self.pacer.wait_tick();
            match self.input.read_event(input_timeout)? {
                InputEvent::Hold => {
                    token.decrease(drain);
                    if token.is_terminal() {
                        self.local_hold_time += start.elapsed();
                        info!("Bomb exploded in {}'s hands", self.ctx.player_name);
                        self.send(&token)?;
                        self.game_over = true;
                        return Ok(TurnState::GameOver(token.snapshot()));
                    }
                }
                InputEvent::Pass => {
                    let held = start.elapsed();
                    self.local_hold_time += held;
                    self.presenter.present_hold_duration(held);
                    token.switch_holder();
                    info!(
                        "Turn switched after {:.2}s, {:.1}s left",
                        held.as_secs_f64(),
                        token.countdown()
                    );
                    self.send(&token)?;
                    self.presenter.present_turn_state(token.who_holds());
                    return Ok(TurnState::AwaitingToken);
                }
            }
        }
    }

    fn send(&mut self, token: &Token) -> Result<(), SessionError> {
        assert!(!self.game_over, "{}", internal_error_message!("sending after game over"));
        network::send_token(&mut self.stream, token)?;
        Ok(())
    }
}
