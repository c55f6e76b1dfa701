use std::time::Duration;

use crate::error::InputError;


#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum InputEvent {
    // Keep holding the bomb: drain one tick of countdown.
    Hold,
    // Anything else, including no input before the timeout: hand the bomb over.
    Pass,
}

pub trait InputSource {
    // Waits at most `timeout` for a single event. Returning `Pass` on timeout is expected.
    fn read_event(&mut self, timeout: Duration) -> Result<InputEvent, InputError>;

    // Called when a local turn starts. Input buffered during the friend's turn must not count.
    fn discard_pending(&mut self) -> Result<(), InputError> { Ok(()) }
}
