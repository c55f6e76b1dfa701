use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter};


#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, Display, EnumIter, Serialize, Deserialize)]
pub enum Role {
    // The peer that listens for the connection. It is the only one allowed to create the token,
    // so that the random holder and countdown are never in conflict.
    Initiator,

    // The peer that dials an address published by the initiator.
    Joiner,
}

impl Role {
    pub fn other(self) -> Role {
        match self {
            Role::Initiator => Role::Joiner,
            Role::Joiner => Role::Initiator,
        }
    }
}
