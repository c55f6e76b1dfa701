use std::io;

use thiserror::Error;

use crate::network::CodecError;


#[macro_export]
macro_rules! internal_error_message {
    () => {
        format!("Internal error at {}:{}.", file!(), line!())
    };
    ($($arg:tt)+) => {
        format!("Internal error at {}:{}: {}.", file!(), line!(), format!($($arg)*))
    };
}

#[derive(Debug, Error)]
pub enum InputError {
    #[error("input device unavailable: {0}")]
    Device(#[from] io::Error),
    #[error("interrupted by user")]
    Interrupted,
}

// Every variant is fatal: a session has no resumption story, so callers are expected to report
// the error and terminate.
#[derive(Debug, Error)]
pub enum SessionError {
    #[error("cannot establish session: {context}: {source}")]
    Setup {
        context: String,
        #[source]
        source: io::Error,
    },
    #[error("connection lost: {0}")]
    Transport(#[source] io::Error),
    #[error("connection lost: {0}")]
    Codec(#[source] CodecError),
    #[error("keyboard input error: {0}")]
    Input(#[from] InputError),
}

impl SessionError {
    pub fn setup(context: impl Into<String>, source: io::Error) -> Self {
        SessionError::Setup { context: context.into(), source }
    }

    // Short user-facing text shown right before the process terminates.
    pub fn warning(&self) -> &'static str {
        match self {
            SessionError::Setup { .. } => "CANNOT CONNECT :(",
            SessionError::Transport(_) | SessionError::Codec(_) => "CONNECTION LOST :(",
            SessionError::Input(_) => "Keyboard input error.",
        }
    }
}

impl From<CodecError> for SessionError {
    fn from(err: CodecError) -> Self {
        match err {
            CodecError::Io(err) => SessionError::Transport(err),
            err => SessionError::Codec(err),
        }
    }
}
