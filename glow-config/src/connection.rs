use crate::endpoint::Endpoint;
use serde::{Deserialize, Serialize};

/// One connection request: a channel of `capacity` shared by all `endpoints`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Connection {
    /// The channel buffer size. Zero, the default, makes a rendezvous channel.
    #[serde(default)]
    pub capacity: usize,
    /// The ports that receive the channel, written as `node:port`.
    pub endpoints: Vec<Endpoint>,
}

impl Connection {
    /// Iterate over outgoing endpoints.
    pub fn outgoing(&self) -> impl Iterator<Item = &Endpoint> {
        self.endpoints
            .iter()
            .filter(|ep| ep.direction() == crate::Direction::Outgoing)
    }

    /// Iterate over incoming endpoints.
    pub fn incoming(&self) -> impl Iterator<Item = &Endpoint> {
        self.endpoints
            .iter()
            .filter(|ep| ep.direction() == crate::Direction::Incoming)
    }
}
