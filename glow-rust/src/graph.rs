use crate::{
    diagram::{ConnectionRecord, Diagram},
    error::Error,
    kinds::NodeKinds,
    launch::Launched,
    node::Node,
    signature::NodeFn,
};
use glow_config::{Endpoint, GraphConfig, Ident};
use glow_link::ChannelHandle;
use indexmap::IndexMap;
use itertools::Itertools;
use log::{debug, info, warn};
use std::{
    fs::File,
    io::{self, BufWriter, Write},
    path::Path,
    sync::Arc,
    thread,
};

/// A dataflow graph under construction.
///
/// Nodes are registered with [Graph::add_node], wired with
/// [Graph::connect] and started with [Graph::launch], which consumes the
/// graph.
#[derive(Debug)]
pub struct Graph<G> {
    globals: Arc<G>,
    nodes: IndexMap<String, Node<G>>,
    connections: Vec<ConnectionRecord>,
    foreground: Option<String>,
}

impl<G> Graph<G>
where
    G: Send + Sync + 'static,
{
    /// Create an empty graph sharing `globals` with every node.
    pub fn new(globals: G) -> Self {
        Self::with_shared(Arc::new(globals))
    }

    pub fn with_shared(globals: Arc<G>) -> Self {
        Self {
            globals,
            nodes: IndexMap::new(),
            connections: vec![],
            foreground: None,
        }
    }

    /// Build a graph from a configuration file.
    ///
    /// Node kinds are looked up in `kinds`. Connections are wired in the
    /// order they are listed.
    pub fn from_config(
        globals: G,
        config: &GraphConfig,
        kinds: &NodeKinds<G>,
    ) -> Result<Self, Error> {
        config.validate()?;
        let mut graph = Self::new(globals);

        for (name, node_config) in &config.nodes {
            let ports: Vec<_> = node_config.ports.iter().map(Ident::as_str).collect();
            let node = kinds.build(node_config.kind.as_str(), name.as_str(), &ports)?;
            graph.insert_node(node)?;
        }

        for connection in &config.connections {
            graph.connect_endpoints(connection.capacity, connection.endpoints.clone())?;
        }

        if let Some(foreground) = &config.foreground {
            graph.set_foreground(foreground.as_str())?;
        }

        Ok(graph)
    }

    pub fn globals(&self) -> &Arc<G> {
        &self.globals
    }

    /// Register a node named `name` that runs `func`.
    ///
    /// `port_names` name the parameters of `func` after the globals
    /// reference, in order.
    pub fn add_node<F, Args>(&mut self, func: F, name: &str, port_names: &[&str]) -> Result<(), Error>
    where
        F: NodeFn<G, Args>,
        Args: 'static,
    {
        if self.nodes.contains_key(name) {
            return Err(Error::duplicate_node_name(name));
        }
        let node = Node::new(func, name, port_names)?;
        self.insert_node(node)
    }

    /// Register an already built node.
    pub fn insert_node(&mut self, mut node: Node<G>) -> Result<(), Error> {
        if self.nodes.contains_key(node.name()) {
            return Err(Error::duplicate_node_name(node.name()));
        }
        node.bind_globals(self.globals.clone())?;
        debug!(
            "add node `{}` with ports [{}]",
            node.name(),
            node.describe().ports.iter().join(", ")
        );
        self.nodes.insert(node.name().to_string(), node);
        Ok(())
    }

    pub fn node(&self, name: &str) -> Option<&Node<G>> {
        self.nodes.get(name)
    }

    /// Registered nodes in registration order.
    pub fn nodes(&self) -> impl Iterator<Item = &Node<G>> {
        self.nodes.values()
    }

    /// Create one channel and bind it into every listed `node:port` endpoint.
    ///
    /// The element type comes from the first endpoint. Every endpoint is
    /// checked before anything is bound, so on error no node is modified.
    pub fn connect(&mut self, capacity: usize, endpoints: &[&str]) -> Result<ChannelHandle, Error> {
        if endpoints.is_empty() {
            return Err(Error::EmptyConnection);
        }

        let endpoints: Vec<Endpoint> = endpoints
            .iter()
            .map(|&text| {
                text.parse::<Endpoint>()
                    .map_err(|reason: String| Error::invalid_endpoint(text, reason))
            })
            .collect::<Result<_, _>>()?;

        self.connect_endpoints(capacity, endpoints)
    }

    fn connect_endpoints(
        &mut self,
        capacity: usize,
        endpoints: Vec<Endpoint>,
    ) -> Result<ChannelHandle, Error> {
        let first = endpoints.first().ok_or(Error::EmptyConnection)?;
        let channel = self
            .lookup(first)?
            .synthesize_channel(first.port.as_str(), capacity)?;

        for endpoint in &endpoints {
            self.lookup(endpoint)?
                .check_channel(endpoint.port.as_str(), &channel)?;
        }
        if let Some(dup) = endpoints.iter().duplicates().next() {
            return Err(Error::port_already_bound(dup.node.as_str(), dup.port.as_str()));
        }

        for endpoint in &endpoints {
            let node = self
                .nodes
                .get_mut(endpoint.node.as_str())
                .ok_or_else(|| Error::unknown_node(endpoint.node.as_str()))?;
            node.bind_channel(endpoint.port.as_str(), &channel)?;
        }

        let record = ConnectionRecord {
            id: self.connections.len(),
            capacity,
            endpoints,
        };
        debug!(
            "connect {} with capacity {} ({}) to [{}]",
            record.channel_name(),
            capacity,
            channel.element_type_name(),
            record.endpoints.iter().join(", ")
        );
        self.connections.push(record);

        Ok(channel)
    }

    /// Bind a plain value into a parameter port.
    pub fn bind<T>(&mut self, endpoint: &str, value: T) -> Result<(), Error>
    where
        T: Send + 'static,
    {
        let parsed: Endpoint = endpoint
            .parse()
            .map_err(|reason: String| Error::invalid_endpoint(endpoint, reason))?;
        let node = self
            .nodes
            .get_mut(parsed.node.as_str())
            .ok_or_else(|| Error::unknown_node(parsed.node.as_str()))?;
        node.bind_value(parsed.port.as_str(), value)?;
        debug!("bind value to {}", parsed);
        Ok(())
    }

    /// Run node `name` on the launching thread. The last call wins.
    pub fn set_foreground(&mut self, name: &str) -> Result<(), Error> {
        if !self.nodes.contains_key(name) {
            return Err(Error::unknown_node(name));
        }
        if let Some(prev) = self.foreground.replace(name.to_string()) {
            if prev != name {
                warn!("foreground node `{}` is replaced by `{}`", prev, name);
            }
        }
        Ok(())
    }

    pub fn foreground(&self) -> Option<&str> {
        self.foreground.as_deref()
    }

    /// Realized connections in connection order.
    pub fn connections(&self) -> &[ConnectionRecord] {
        &self.connections
    }

    /// Take a snapshot of the graph structure.
    pub fn diagram(&self) -> Diagram {
        Diagram {
            nodes: self.nodes.values().map(Node::describe).collect(),
            connections: self.connections.clone(),
        }
    }

    pub fn render_dot<W>(&self, writer: &mut W) -> io::Result<()>
    where
        W: Write,
    {
        self.diagram().render(writer)
    }

    /// Save the graph to a GraphViz DOT file.
    pub fn save_dot_file<P>(&self, file: P) -> io::Result<()>
    where
        P: AsRef<Path>,
    {
        let mut writer = BufWriter::new(File::create(file)?);
        self.render_dot(&mut writer)?;
        writer.flush()?;
        Ok(())
    }

    /// Start every node.
    ///
    /// Each node except the foreground one runs on its own thread. The
    /// foreground node then runs on the calling thread and this returns
    /// once it finishes. Without a foreground node this returns as soon as
    /// all threads are spawned.
    ///
    /// Nothing is started if any port is still unbound.
    ///
    /// If the OS refuses to spawn a thread, [Error::Io] is returned and the
    /// nodes started before it keep running detached, with no handle left
    /// to join them.
    pub fn launch(self) -> Result<Launched, Error> {
        let Self {
            mut nodes,
            foreground,
            ..
        } = self;

        for node in nodes.values() {
            if let Some(port) = node.first_unbound() {
                return Err(Error::port_unbound(node.name(), port));
            }
        }

        info!(
            "launch {} node(s), foreground: {}",
            nodes.len(),
            foreground.as_deref().unwrap_or("none")
        );

        let foreground =
            foreground.and_then(|name| nodes.shift_remove(&name).map(|node| (name, node)));

        let mut background = IndexMap::with_capacity(nodes.len());
        for (name, node) in nodes {
            let handle = thread::Builder::new()
                .name(name.clone())
                .spawn(move || node.execute())
                .map_err(|err| {
                    warn!(
                        "cannot spawn node `{}`, {} started node(s) are left detached",
                        name,
                        background.len()
                    );
                    err
                })?;
            debug!("spawned thread for node `{}`", name);
            background.insert(name, handle);
        }

        let foreground = foreground.map(|(name, node)| {
            let result = node.execute();
            (name, result)
        });

        Ok(Launched {
            background,
            foreground,
        })
    }

    fn lookup(&self, endpoint: &Endpoint) -> Result<&Node<G>, Error> {
        self.nodes
            .get(endpoint.node.as_str())
            .ok_or_else(|| Error::unknown_node(endpoint.node.as_str()))
    }
}
