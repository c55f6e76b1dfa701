#![forbid(unsafe_code)]
#![cfg_attr(feature = "strict", deny(warnings))]

pub mod error;
pub mod input;
pub mod network;
pub mod presenter;
pub mod role;
pub mod session;
pub mod test_util;
pub mod ticker;
pub mod token;
pub mod transport;
pub mod turn_engine;
