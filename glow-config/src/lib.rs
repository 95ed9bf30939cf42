//! Declarative description of a dataflow graph.
//!
//! The crate defines the names used to wire a graph together and a JSON5
//! configuration format that lists the nodes, their ports and the
//! connections between them.
//!
//! - [Ident]: a node or port name.
//! - [Endpoint]: one port of one node, written as `node:port`.
//! - [GraphConfig]: the whole graph, loaded with [GraphConfig::open].

mod connection;
mod endpoint;
mod graph;
mod ident;

pub use connection::*;
pub use endpoint::*;
pub use graph::*;
pub use ident::*;
