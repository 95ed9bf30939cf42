use crate::{Connection, Ident};
use anyhow::{bail, ensure, Result};
use indexmap::IndexMap;
use itertools::Itertools as _;
use serde::{Deserialize, Serialize};
use serde_loader::Json5Path;
use serde_semver::SemverReq;
use std::path::Path;

#[derive(Debug, Clone, PartialEq, Eq, Hash, SemverReq)]
#[version("0.1.0")]
pub struct Version;

/// The serialized/deserialized graph configuration.
///
/// The graph configuration is valid if
/// - Node and port names are valid identifiers.
/// - Port names are unique within each node.
/// - Connection endpoints refer to declared nodes and their declared ports.
/// - Every connection lists at least one endpoint.
/// - The foreground node, if any, is a declared node.
///
/// The configuration consists of these components.
/// - `nodes`: The node declarations, each naming a registered kind and its ports.
/// - `connections`: Channels and the `node:port` endpoints sharing each one.
/// - `foreground`: The node to run on the launching thread.
///
/// ```json5
/// {
///     "version": "0.1.0",
///     "nodes": {
///         "Source": { "kind": "counter", "ports": ["Out"] },
///         "Sink": { "kind": "printer", "ports": ["In"] },
///     },
///     "connections": [
///         { "capacity": 1, "endpoints": ["Source:Out", "Sink:In"] },
///     ],
///     "foreground": "Sink",
/// }
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GraphConfig {
    /// Format version
    pub version: Version,
    /// Node declarations in registration order.
    pub nodes: IndexMap<Ident, NodeConfig>,
    /// Connection requests in wiring order.
    #[serde(default)]
    pub connections: Vec<Connection>,
    /// The node run in the foreground.
    #[serde(default)]
    pub foreground: Option<Ident>,
}

/// The declaration of one node.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NodeConfig {
    /// The registered kind that implements the node.
    pub kind: Ident,
    /// Port names in the order of the implementing function's parameters.
    #[serde(default)]
    pub ports: Vec<Ident>,
}

impl GraphConfig {
    /// Open a graph configuration file in JSON5 format and validate it.
    pub fn open<P>(file: P) -> Result<Self>
    where
        P: AsRef<Path>,
    {
        let config: Self = Json5Path::open_and_take(file)?;
        config.validate()?;
        Ok(config)
    }

    /// Check cross references between nodes, connections and the foreground.
    pub fn validate(&self) -> Result<()> {
        // check that port names are unique within each node
        self.nodes.iter().try_for_each(|(name, node)| {
            let dups: Vec<_> = node.ports.iter().duplicates().collect();
            ensure!(
                dups.is_empty(),
                "node '{}' declares duplicated ports: {}",
                name,
                dups.iter().join(", ")
            );
            Ok(())
        })?;

        // check that endpoints refer to declared nodes and ports
        self.connections.iter().try_for_each(|conn| {
            ensure!(
                !conn.endpoints.is_empty(),
                "a connection must list at least one endpoint"
            );

            conn.endpoints.iter().try_for_each(|ep| {
                let Some(node) = self.nodes.get(&ep.node) else {
                    bail!("'{}' is not a declared node", ep.node);
                };
                ensure!(
                    node.ports.contains(&ep.port),
                    "'{}' is not a declared port of node '{}'",
                    ep.port,
                    ep.node
                );
                Ok(())
            })
        })?;

        // check that a port joins at most one connection
        let dups: Vec<_> = self
            .connections
            .iter()
            .flat_map(|conn| &conn.endpoints)
            .duplicates()
            .collect();
        ensure!(
            dups.is_empty(),
            "ports connected more than once: {}",
            dups.iter().join(", ")
        );

        if let Some(fg) = &self.foreground {
            ensure!(
                self.nodes.contains_key(fg),
                "foreground node '{}' is not a declared node",
                fg
            );
        }

        Ok(())
    }
}
