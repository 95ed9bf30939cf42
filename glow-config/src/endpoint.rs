use crate::ident::Ident;
use serde::{de::Error as _, Deserialize, Deserializer, Serialize, Serializer};
use std::{fmt, fmt::Display, str::FromStr};

/// Port name suffix that marks a port as outgoing in diagrams.
pub const OUTGOING_SUFFIX: &str = "Out";

/// A reference to one port of one node, written as `node:port`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Endpoint {
    pub node: Ident,
    pub port: Ident,
}

/// The direction of an endpoint as drawn in a diagram.
///
/// Wiring treats every endpoint the same. The direction only decides which
/// way the arrow points.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Direction {
    /// The node reads from the channel.
    Incoming,
    /// The node writes into the channel.
    Outgoing,
}

impl Endpoint {
    pub fn new(node: Ident, port: Ident) -> Self {
        Self { node, port }
    }

    /// Ports named with the `Out` suffix are outgoing, all others incoming.
    pub fn direction(&self) -> Direction {
        if self.port.as_str().ends_with(OUTGOING_SUFFIX) {
            Direction::Outgoing
        } else {
            Direction::Incoming
        }
    }
}

impl FromStr for Endpoint {
    type Err = String;

    fn from_str(text: &str) -> Result<Self, Self::Err> {
        let (node, port) = text
            .split_once(':')
            .ok_or_else(|| format!("endpoint '{}' is not in the form 'node:port'", text))?;
        let node = Ident::from_str(node)?;
        let port = Ident::from_str(port)?;
        Ok(Self { node, port })
    }
}

impl Display for Endpoint {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}:{}", self.node, self.port)
    }
}

impl Serialize for Endpoint {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        self.to_string().serialize(serializer)
    }
}

impl<'a> Deserialize<'a> for Endpoint {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'a>,
    {
        let text = String::deserialize(deserializer)?;
        Endpoint::from_str(&text).map_err(D::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_node_and_port() {
        let endpoint: Endpoint = "Source:Out".parse().unwrap();
        assert_eq!(endpoint.node.as_str(), "Source");
        assert_eq!(endpoint.port.as_str(), "Out");
        assert_eq!(endpoint.to_string(), "Source:Out");
    }

    #[test]
    fn reject_malformed_endpoints() {
        for text in ["Source", "Source:", ":Out", "a:b:c", "So urce:Out"] {
            assert!(text.parse::<Endpoint>().is_err(), "{text:?} should fail");
        }
    }

    #[test]
    fn direction_follows_port_suffix() {
        let out: Endpoint = "Gen:valuesOut".parse().unwrap();
        let inp: Endpoint = "Sink:In".parse().unwrap();
        let other: Endpoint = "Sink:Outer".parse().unwrap();
        assert_eq!(out.direction(), Direction::Outgoing);
        assert_eq!(inp.direction(), Direction::Incoming);
        assert_eq!(other.direction(), Direction::Incoming);
    }
}
