use std::net::IpAddr;
use std::time::Duration;

use crate::error::InputError;
use crate::role::Role;
use crate::turn_engine::Outcome;


pub trait Presenter {
    // Called once by the initiator, after binding and before blocking on accept.
    fn present_session_address(&mut self, ip: IpAddr, port: u16);
    fn present_turn_state(&mut self, holder: Role);
    fn present_hold_duration(&mut self, held: Duration);
    fn present_result(&mut self, outcome: &Outcome);
    fn present_fatal_warning(&mut self, message: &str);
}

// Asks the player for whatever the command line did not give. Fails only when the player cannot
// be asked at all, e.g. standard input is closed.
pub trait Prompter {
    fn prompt_role_choice(&mut self) -> Result<Role, InputError>;
    fn prompt_player_name(&mut self) -> Result<String, InputError>;
    fn prompt_join_address(&mut self) -> Result<String, InputError>;
}
