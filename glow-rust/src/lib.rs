//! A minimal dataflow framework.
//!
//! A [Graph] holds named *nodes*. Each node is a function whose
//! parameters are *ports*. Ports are wired with bounded typed channels,
//! and launching the graph runs every node on its own thread, except one
//! optional *foreground* node that runs on the launching thread.
//!
//! The first parameter of every node function is a shared reference to the
//! graph *globals*. The remaining parameters are [Channel]s, [Param]s or a
//! trailing [Variadic] list of channels. Their names are given when the
//! node is added.
//!
//! # Usage
//!
//! ```
//! use glow::{Channel, Graph};
//!
//! struct Globals {
//!     scale: i32,
//! }
//!
//! let mut graph = Graph::new(Globals { scale: 10 });
//!
//! graph.add_node(
//!     |globals: &Globals, output: Channel<i32>| {
//!         for value in 1..=3 {
//!             output.send(value * globals.scale)?;
//!         }
//!         anyhow::Ok(())
//!     },
//!     "Source",
//!     &["Out"],
//! )?;
//!
//! graph.add_node(
//!     |_: &Globals, input: Channel<i32>| {
//!         let values: Vec<_> = (0..3).map(|_| input.recv()).collect::<Result<_, _>>()?;
//!         assert_eq!(values, [10, 20, 30]);
//!         anyhow::Ok(())
//!     },
//!     "Sink",
//!     &["In"],
//! )?;
//!
//! // One channel with capacity 1 shared by both ports.
//! graph.connect(1, &["Source:Out", "Sink:In"])?;
//!
//! // Run Sink on this thread. launch() returns when Sink returns.
//! graph.set_foreground("Sink")?;
//! let launched = graph.launch()?;
//! assert!(launched.foreground_result().unwrap().is_ok());
//! # Ok::<_, glow::Error>(())
//! ```
//!
//! Graphs can also be declared in a JSON5 file and built with
//! [Graph::from_config] from a set of registered [NodeKinds].

mod diagram;
mod error;
mod graph;
mod kinds;
mod launch;
mod node;
mod signature;

pub use diagram::{ConnectionRecord, Diagram, NodeDescription};
pub use error::Error;
pub use glow_config::{Connection, Direction, Endpoint, GraphConfig, Ident, NodeConfig};
pub use glow_link::{Channel, ChannelHandle};
pub use graph::Graph;
pub use kinds::NodeKinds;
pub use launch::Launched;
pub use node::{Node, Port, GLOBALS};
pub use signature::{
    BoundValue, NodeFn, NodeReturn, Param, PortArg, PortKind, PortParam, PortType, Signature,
    Variadic,
};
