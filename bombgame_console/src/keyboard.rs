use std::io;
use std::time::Duration;

use crossterm::event::{self as term_event, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use crossterm::terminal;
use instant::Instant;
use log::{debug, warn};

use bombgame::error::InputError;
use bombgame::input::{InputEvent, InputSource};


// Returns `None` for keys that carry no decision. Releasing any key but Space is such a key: the
// press of that key has already passed the bomb.
pub fn map_key(key: KeyEvent) -> Result<Option<InputEvent>, InputError> {
    // Raw mode swallows SIGINT, so Ctrl+C arrives as a regular key.
    if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
        return Err(InputError::Interrupted);
    }
    Ok(match (key.code, key.kind) {
        (KeyCode::Char(' '), KeyEventKind::Press | KeyEventKind::Repeat) => Some(InputEvent::Hold),
        (KeyCode::Char(' '), KeyEventKind::Release) => Some(InputEvent::Pass),
        (_, KeyEventKind::Release) => None,
        _ => Some(InputEvent::Pass),
    })
}

// Collapses a burst of keys into the most recent decision. Auto-repeat delivers Space faster than
// the hold loop ticks, so reading one key per tick would keep draining long after the release.
pub fn latest_event(
    keys: impl IntoIterator<Item = KeyEvent>,
) -> Result<Option<InputEvent>, InputError> {
    let mut latest = None;
    for key in keys {
        if let Some(event) = map_key(key)? {
            latest = Some(event);
        }
    }
    Ok(latest)
}

fn next_key(timeout: Duration) -> io::Result<Option<KeyEvent>> {
    while term_event::poll(timeout)? {
        // Resize, focus and mouse events are not input as far as the bomb is concerned.
        if let Event::Key(key) = term_event::read()? {
            return Ok(Some(key));
        }
    }
    Ok(None)
}

// Puts the terminal into raw mode for as long as it lives, so that single key presses are
// delivered without waiting for Enter.
pub struct CrosstermKeyboard {
    _private: (),
}

impl CrosstermKeyboard {
    pub fn open() -> io::Result<Self> {
        terminal::enable_raw_mode()?;
        Ok(CrosstermKeyboard { _private: () })
    }
}

impl Drop for CrosstermKeyboard {
    fn drop(&mut self) {
        if let Err(err) = terminal::disable_raw_mode() {
            warn!("Cannot restore terminal mode: {err}");
        }
    }
}

impl InputSource for CrosstermKeyboard {
    fn read_event(&mut self, timeout: Duration) -> Result<InputEvent, InputError> {
        let deadline = Instant::now() + timeout;
        loop {
            let remaining = deadline.saturating_duration_since(Instant::now());
            let Some(first) = next_key(remaining)? else {
                return Ok(InputEvent::Pass);
            };
            let mut keys = vec![first];
            while let Some(key) = next_key(Duration::ZERO)? {
                keys.push(key);
            }
            if let Some(event) = latest_event(keys)? {
                return Ok(event);
            }
        }
    }

    fn discard_pending(&mut self) -> Result<(), InputError> {
        let mut discarded = 0;
        while let Some(key) = next_key(Duration::ZERO)? {
            // Ctrl+C still quits, even when pressed during the friend's turn.
            map_key(key)?;
            discarded += 1;
        }
        if discarded > 0 {
            debug!("Discarded {discarded} keys pressed before the turn");
        }
        Ok(())
    }
}


#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    fn key(code: KeyCode, kind: KeyEventKind) -> KeyEvent {
        KeyEvent::new_with_kind(code, KeyModifiers::NONE, kind)
    }

    #[test]
    fn space_holds() {
        assert_eq!(
            map_key(key(KeyCode::Char(' '), KeyEventKind::Press)).unwrap(),
            Some(InputEvent::Hold)
        );
        assert_eq!(
            map_key(key(KeyCode::Char(' '), KeyEventKind::Repeat)).unwrap(),
            Some(InputEvent::Hold)
        );
    }

    #[test]
    fn anything_else_passes() {
        for code in [KeyCode::Char('x'), KeyCode::Enter, KeyCode::Esc, KeyCode::Char('c')] {
            assert_eq!(map_key(key(code, KeyEventKind::Press)).unwrap(), Some(InputEvent::Pass));
        }
        assert_eq!(
            map_key(key(KeyCode::Char(' '), KeyEventKind::Release)).unwrap(),
            Some(InputEvent::Pass)
        );
    }

    #[test]
    fn releasing_other_keys_is_ignored() {
        for code in [KeyCode::Char('x'), KeyCode::Enter, KeyCode::Esc] {
            assert_eq!(map_key(key(code, KeyEventKind::Release)).unwrap(), None);
        }
    }

    #[test]
    fn ctrl_c_interrupts() {
        let ctrl_c = KeyEvent::new(KeyCode::Char('c'), KeyModifiers::CONTROL);
        assert!(matches!(map_key(ctrl_c), Err(InputError::Interrupted)));
        assert!(matches!(
            latest_event([key(KeyCode::Char(' '), KeyEventKind::Repeat), ctrl_c]),
            Err(InputError::Interrupted)
        ));
    }

    #[test]
    fn repeat_burst_counts_once() {
        let burst = vec![key(KeyCode::Char(' '), KeyEventKind::Repeat); 3];
        assert_eq!(latest_event(burst).unwrap(), Some(InputEvent::Hold));
    }

    #[test]
    fn release_after_repeats_passes() {
        let mut keys = vec![key(KeyCode::Char(' '), KeyEventKind::Repeat); 5];
        keys.push(key(KeyCode::Char(' '), KeyEventKind::Release));
        assert_eq!(latest_event(keys).unwrap(), Some(InputEvent::Pass));
    }

    #[test]
    fn last_decision_wins() {
        let keys = [
            key(KeyCode::Char('x'), KeyEventKind::Press),
            key(KeyCode::Char(' '), KeyEventKind::Press),
            key(KeyCode::Char('x'), KeyEventKind::Release),
        ];
        assert_eq!(latest_event(keys).unwrap(), Some(InputEvent::Hold));
    }

    #[test]
    fn only_releases_carry_no_decision() {
        let keys = [
            key(KeyCode::Char('x'), KeyEventKind::Release),
            key(KeyCode::Enter, KeyEventKind::Release),
        ];
        assert_eq!(latest_event(keys).unwrap(), None);
        assert_eq!(latest_event(Vec::<KeyEvent>::new()).unwrap(), None);
    }
}
