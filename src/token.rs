use std::ops::Range;
use std::sync::Mutex;

use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::internal_error_message;
use crate::role::Role;


// Remaining countdown this close to zero is snapped to zero. Draining by decimal steps (e.g. 0.1 s)
// accumulates binary rounding error: a token drained by exactly its budget must explode.
const EXHAUSTION_EPSILON: f64 = 1e-9;

// Everything about the token that travels over the wire.
#[derive(Clone, Copy, PartialEq, Debug, Serialize, Deserialize)]
pub struct TokenState {
    pub countdown: f64,
    pub holder: Role,
    pub terminal: bool,
}

impl TokenState {
    pub fn validate(&self) -> Result<(), String> {
        if self.countdown.is_nan() {
            return Err("countdown is NaN".to_owned());
        }
        if self.terminal != (self.countdown <= 0.0) {
            return Err(format!(
                "terminal flag {} does not match countdown {}",
                self.terminal, self.countdown
            ));
        }
        Ok(())
    }
}

// The bomb. Each peer owns a local replica; replicas are kept consistent only by transmitting
// full snapshots, so the mutex guards this process's copy and nothing else.
#[derive(Debug)]
pub struct Token {
    state: Mutex<TokenState>,
}

impl Token {
    pub fn new(countdown: f64, holder: Role) -> Self {
        let terminal = countdown <= 0.0;
        Token {
            state: Mutex::new(TokenState { countdown, holder, terminal }),
        }
    }

    // Fair coin flip for the holder, uniformly random whole number of seconds in `countdown_range`.
    pub fn new_random(rng: &mut impl Rng, countdown_range: Range<u32>) -> Self {
        let holder = if rng.random_bool(0.5) { Role::Initiator } else { Role::Joiner };
        let countdown = f64::from(rng.random_range(countdown_range));
        Token::new(countdown, holder)
    }

    pub fn from_state(state: TokenState) -> Result<Self, String> {
        state.validate()?;
        Ok(Token { state: Mutex::new(state) })
    }

    pub fn decrease(&self, amount: f64) {
        let mut state = self.state.lock().unwrap();
        assert!(!state.terminal, "{}", internal_error_message!("decreasing exploded token"));
        state.countdown -= amount;
        if state.countdown.abs() <= EXHAUSTION_EPSILON {
            state.countdown = 0.0;
        }
        if state.countdown <= 0.0 {
            state.terminal = true;
        }
    }

    pub fn switch_holder(&self) {
        let mut state = self.state.lock().unwrap();
        assert!(!state.terminal, "{}", internal_error_message!("passing exploded token"));
        state.holder = state.holder.other();
    }

    pub fn is_terminal(&self) -> bool { self.state.lock().unwrap().terminal }
    pub fn who_holds(&self) -> Role { self.state.lock().unwrap().holder }
    pub fn countdown(&self) -> f64 { self.state.lock().unwrap().countdown }
    pub fn snapshot(&self) -> TokenState { *self.state.lock().unwrap() }
}


#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::test_util::deterministic_rng;

    #[test]
    fn decrease_is_monotonic_and_explodes_exactly_at_zero() {
        let token = Token::new(1.0, Role::Joiner);
        let mut prev = token.countdown();
        for _ in 0..9 {
            token.decrease(0.1);
            assert!(token.countdown() <= prev);
            assert!(!token.is_terminal());
            prev = token.countdown();
        }
        token.decrease(0.1);
        assert!(token.is_terminal());
        assert_eq!(token.countdown(), 0.0);
    }

    #[test]
    fn overshoot_keeps_negative_countdown() {
        let token = Token::new(0.5, Role::Initiator);
        token.decrease(2.0);
        let state = token.snapshot();
        assert!(state.terminal);
        assert_eq!(state.countdown, -1.5);
        assert_eq!(state.holder, Role::Initiator);
    }

    #[test]
    fn long_hold_explodes_in_holder_hands() {
        let token = Token::new(25.0, Role::Initiator);
        for _ in 0..249 {
            token.decrease(0.1);
        }
        assert!(!token.is_terminal());
        token.decrease(0.1);
        assert!(token.is_terminal());
        assert_eq!(token.who_holds(), Role::Initiator);
    }

    #[test]
    fn switch_holder_is_involution() {
        let token = Token::new(10.0, Role::Joiner);
        token.switch_holder();
        assert_eq!(token.who_holds(), Role::Initiator);
        token.switch_holder();
        assert_eq!(token.who_holds(), Role::Joiner);
        assert_eq!(token.countdown(), 10.0);
    }

    #[test]
    #[should_panic]
    fn switch_after_explosion_panics() {
        let token = Token::new(0.1, Role::Joiner);
        token.decrease(0.1);
        token.switch_holder();
    }

    #[test]
    fn random_token_respects_range() {
        let mut rng = deterministic_rng();
        let mut holders = Vec::new();
        for _ in 0..100 {
            let token = Token::new_random(&mut rng, 20..80);
            let state = token.snapshot();
            assert!((20.0..80.0).contains(&state.countdown));
            assert_eq!(state.countdown.fract(), 0.0);
            assert!(!state.terminal);
            holders.push(state.holder);
        }
        assert!(holders.contains(&Role::Initiator));
        assert!(holders.contains(&Role::Joiner));
    }

    #[test]
    fn from_state_rejects_inconsistent_terminal_flag() {
        let not_exploded = TokenState { countdown: 0.0, holder: Role::Joiner, terminal: false };
        assert!(Token::from_state(not_exploded).is_err());
        let exploded_early = TokenState { countdown: 3.0, holder: Role::Joiner, terminal: true };
        assert!(Token::from_state(exploded_early).is_err());
        let nan = TokenState { countdown: f64::NAN, holder: Role::Joiner, terminal: false };
        assert!(Token::from_state(nan).is_err());
        let ok = TokenState { countdown: -0.25, holder: Role::Initiator, terminal: true };
        assert_eq!(Token::from_state(ok).unwrap().snapshot(), ok);
    }
}
