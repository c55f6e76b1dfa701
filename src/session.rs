use std::ops::Range;
use std::time::Duration;

use derive_new::new;
use serde::{Deserialize, Serialize};

use crate::error::InputError;
use crate::presenter::Prompter;
use crate::role::Role;


#[derive(Clone, PartialEq, Eq, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionConfig {
    // How often the hold loop polls input. Each hold event drains exactly this much countdown.
    #[serde(with = "humantime_serde")]
    pub tick: Duration,

    // How long a single poll waits for a key. Should exceed the keyboard auto-repeat delay
    // (660 ms by default on X11), otherwise the gap between the first press and the first repeat
    // reads as a release.
    #[serde(with = "humantime_serde")]
    pub input_timeout: Duration,

    // Whole seconds; the initiator draws the starting countdown uniformly from this range.
    pub countdown_range: Range<u32>,

    // How long the result stays on screen before the process exits.
    #[serde(with = "humantime_serde")]
    pub result_linger: Duration,
}

impl Default for SessionConfig {
    fn default() -> Self {
        SessionConfig {
            tick: Duration::from_millis(100),
            input_timeout: Duration::from_millis(750),
            countdown_range: 20..80,
            result_linger: Duration::from_secs(4),
        }
    }
}

impl SessionConfig {
    pub fn validate(&self) -> Result<(), String> {
        if self.tick.is_zero() {
            return Err("tick must be positive".to_owned());
        }
        if self.input_timeout < self.tick {
            return Err(format!(
                "input timeout {:?} must not be shorter than tick {:?}",
                self.input_timeout, self.tick
            ));
        }
        if self.countdown_range.is_empty() || self.countdown_range.start == 0 {
            return Err(format!(
                "countdown range {}..{} must be non-empty and positive",
                self.countdown_range.start, self.countdown_range.end
            ));
        }
        Ok(())
    }
}

pub const MIN_PLAYER_NAME_LEN: usize = 2;

// Everything a peer knows about itself. Created once at startup and handed to whoever needs it.
#[derive(Clone, Debug, new)]
pub struct SessionContext {
    pub role: Role,
    pub player_name: String,
    // Present iff `role` is `Joiner`.
    pub peer_address: Option<String>,
    pub config: SessionConfig,
}

// Values already known from the command line. Missing ones are asked for interactively.
#[derive(Clone, Default, Debug)]
pub struct SessionPreset {
    pub role: Option<Role>,
    pub player_name: Option<String>,
    pub peer_address: Option<String>,
}

impl SessionContext {
    pub fn resolve(
        preset: SessionPreset, config: SessionConfig, prompter: &mut dyn Prompter,
    ) -> Result<SessionContext, InputError> {
        let role = match preset.role {
            Some(role) => role,
            None => prompter.prompt_role_choice()?,
        };
        let mut player_name = preset.player_name.map(|name| name.trim().to_owned());
        while !player_name.as_ref().is_some_and(|name| is_valid_player_name(name)) {
            player_name = Some(prompter.prompt_player_name()?.trim().to_owned());
        }
        let peer_address = match (role, preset.peer_address) {
            (Role::Initiator, _) => None,
            (Role::Joiner, Some(address)) => Some(address.trim().to_owned()),
            (Role::Joiner, None) => Some(prompter.prompt_join_address()?.trim().to_owned()),
        };
        Ok(SessionContext {
            role,
            player_name: player_name.unwrap_or_default(),
            peer_address,
            config,
        })
    }
}

pub fn is_valid_player_name(name: &str) -> bool { name.chars().count() >= MIN_PLAYER_NAME_LEN }


#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::test_util::ScriptedPrompter;

    #[test]
    fn default_config_is_valid() {
        assert_eq!(SessionConfig::default().validate(), Ok(()));
    }

    #[test]
    fn invalid_configs() {
        let zero_tick = SessionConfig { tick: Duration::ZERO, ..SessionConfig::default() };
        assert!(zero_tick.validate().is_err());
        let empty_range = SessionConfig { countdown_range: 30..30, ..SessionConfig::default() };
        assert!(empty_range.validate().is_err());
        let zero_start = SessionConfig { countdown_range: 0..10, ..SessionConfig::default() };
        assert!(zero_start.validate().is_err());
        let short_timeout = SessionConfig {
            input_timeout: Duration::from_millis(50),
            ..SessionConfig::default()
        };
        assert!(short_timeout.validate().is_err());
    }

    #[test]
    fn default_timeout_outlasts_auto_repeat_delay() {
        assert!(SessionConfig::default().input_timeout > Duration::from_millis(660));
    }

    #[test]
    fn resolve_uses_preset_without_prompting() {
        let mut prompter = ScriptedPrompter::default();
        let ctx = SessionContext::resolve(
            SessionPreset {
                role: Some(Role::Joiner),
                player_name: Some(" Alice ".to_owned()),
                peer_address: Some("192.168.1.5:40000".to_owned()),
            },
            SessionConfig::default(),
            &mut prompter,
        )
        .unwrap();
        assert_eq!(ctx.role, Role::Joiner);
        assert_eq!(ctx.player_name, "Alice");
        assert_eq!(ctx.peer_address.as_deref(), Some("192.168.1.5:40000"));
        assert_eq!(prompter.prompts, 0);
    }

    #[test]
    fn resolve_reprompts_short_names() {
        let mut prompter = ScriptedPrompter {
            role: Role::Initiator,
            names: vec!["B".to_owned(), " ".to_owned(), "Bob".to_owned()],
            address: String::new(),
            prompts: 0,
        };
        let ctx =
            SessionContext::resolve(SessionPreset::default(), SessionConfig::default(), &mut prompter)
                .unwrap();
        assert_eq!(ctx.role, Role::Initiator);
        assert_eq!(ctx.player_name, "Bob");
        assert_eq!(ctx.peer_address, None);
        assert_eq!(prompter.prompts, 4);
    }

    #[test]
    fn resolve_fails_when_player_cannot_be_asked() {
        let mut prompter = ScriptedPrompter {
            role: Role::Joiner,
            names: vec!["B".to_owned()],
            address: String::new(),
            prompts: 0,
        };
        let result =
            SessionContext::resolve(SessionPreset::default(), SessionConfig::default(), &mut prompter);
        assert!(matches!(result, Err(InputError::Device(_))));
        assert_eq!(prompter.prompts, 3);
    }
}
