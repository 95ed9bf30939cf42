use glow_config::{Direction, Endpoint};
use std::io::{self, Write};

/// A node as drawn in a diagram.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NodeDescription {
    pub name: String,
    /// Port names in declaration order, without the globals port.
    pub ports: Vec<String>,
}

/// A realized connection: one channel and the ports sharing it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConnectionRecord {
    /// Sequential number in connection order, starting at 0.
    pub id: usize,
    pub capacity: usize,
    pub endpoints: Vec<Endpoint>,
}

impl ConnectionRecord {
    /// The synthetic channel name, `chan_<id>`.
    pub fn channel_name(&self) -> String {
        format!("chan_{}", self.id)
    }
}

/// A read-only snapshot of a graph's structure.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Diagram {
    pub nodes: Vec<NodeDescription>,
    pub connections: Vec<ConnectionRecord>,
}

impl Diagram {
    /// Write the diagram in GraphViz DOT format.
    pub fn render<W>(&self, writer: &mut W) -> io::Result<()>
    where
        W: Write,
    {
        dot::render(self, writer)
    }

    pub fn to_dot_string(&self) -> io::Result<String> {
        let mut buf = vec![];
        self.render(&mut buf)?;
        String::from_utf8(buf).map_err(|err| io::Error::new(io::ErrorKind::InvalidData, err))
    }
}

mod graphviz {
    use super::*;
    use dot::{Edges, GraphWalk, Id, LabelText, Labeller, Nodes};
    use std::borrow::Cow;

    #[derive(Clone)]
    pub(crate) enum Vertex<'a> {
        Node(usize, &'a NodeDescription),
        Channel(&'a ConnectionRecord),
    }

    #[derive(Clone)]
    pub(crate) struct Edge<'a> {
        node: (usize, &'a NodeDescription),
        port: &'a str,
        channel: &'a ConnectionRecord,
        direction: Direction,
    }

    impl<'a> Labeller<'a, Vertex<'a>, Edge<'a>> for Diagram {
        fn graph_id(&'a self) -> Id<'a> {
            Id::new("glow").unwrap()
        }

        fn node_id(&'a self, vertex: &Vertex<'a>) -> Id<'a> {
            let name = match vertex {
                Vertex::Node(index, _) => format!("node_{}", index),
                Vertex::Channel(conn) => conn.channel_name(),
            };
            Id::new(name).unwrap()
        }

        fn node_label(&'a self, vertex: &Vertex<'a>) -> LabelText<'a> {
            let label = match vertex {
                // record label: "name|<port>port|..."
                Vertex::Node(_, node) => {
                    let mut label = node.name.clone();
                    for port in &node.ports {
                        label.push_str(&format!("|<{0}>{0}", port));
                    }
                    label
                }
                Vertex::Channel(conn) => conn.capacity.to_string(),
            };
            LabelText::LabelStr(Into::into(label))
        }

        fn node_shape(&'a self, vertex: &Vertex<'a>) -> Option<LabelText<'a>> {
            match vertex {
                Vertex::Node(..) => Some(LabelText::LabelStr(Into::into("record"))),
                Vertex::Channel(_) => None,
            }
        }

        fn edge_label(&'a self, edge: &Edge<'a>) -> LabelText<'a> {
            LabelText::LabelStr(Into::into(edge.port))
        }
    }

    impl<'a> GraphWalk<'a, Vertex<'a>, Edge<'a>> for Diagram {
        fn nodes(&'a self) -> Nodes<'a, Vertex<'a>> {
            let nodes = self
                .nodes
                .iter()
                .enumerate()
                .map(|(index, node)| Vertex::Node(index, node));
            let channels = self.connections.iter().map(Vertex::Channel);
            Cow::Owned(nodes.chain(channels).collect())
        }

        fn edges(&'a self) -> Edges<'a, Edge<'a>> {
            let edges: Vec<_> = self
                .connections
                .iter()
                .flat_map(|channel| {
                    channel.endpoints.iter().filter_map(move |ep| {
                        let node = self
                            .nodes
                            .iter()
                            .enumerate()
                            .find(|(_, n)| n.name == ep.node.as_str())?;
                        Some(Edge {
                            node,
                            port: ep.port.as_str(),
                            channel,
                            direction: ep.direction(),
                        })
                    })
                })
                .collect();
            Cow::Owned(edges)
        }

        fn source(&'a self, edge: &Edge<'a>) -> Vertex<'a> {
            match edge.direction {
                Direction::Outgoing => Vertex::Node(edge.node.0, edge.node.1),
                Direction::Incoming => Vertex::Channel(edge.channel),
            }
        }

        fn target(&'a self, edge: &Edge<'a>) -> Vertex<'a> {
            match edge.direction {
                Direction::Outgoing => Vertex::Channel(edge.channel),
                Direction::Incoming => Vertex::Node(edge.node.0, edge.node.1),
            }
        }
    }
}
