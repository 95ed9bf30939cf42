use std::io;

/// Faults raised while building or launching a graph.
///
/// Every variant names the node, port or endpoint that caused it.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("node `{node}` is already added")]
    DuplicateNodeName { node: String },
    #[error("node `{node}` not found")]
    UnknownNode { node: String },
    #[error("port `{port}` not found on node `{node}`")]
    UnknownPort { node: String, port: String },
    #[error("port `{port}` on node `{node}` is already bound")]
    PortAlreadyBound { node: String, port: String },
    #[error("node `{node}` takes {expected} port name(s), but {actual} were given")]
    SignatureArityMismatch {
        node: String,
        expected: String,
        actual: usize,
    },
    #[error("node `{node}` declares a variadic port that is not the last parameter")]
    MisplacedVariadic { node: String },
    #[error("port `{port}` is declared more than once on node `{node}`")]
    DuplicatePortName { node: String, port: String },
    #[error("`{name}` is not a valid identifier")]
    InvalidName { name: String },
    #[error("invalid endpoint `{endpoint}`: {reason}")]
    InvalidEndpoint { endpoint: String, reason: String },
    #[error("a connection must list at least one endpoint")]
    EmptyConnection,
    #[error("port `{port}` on node `{node}` is a parameter and cannot take a channel")]
    NotAChannelPort { node: String, port: String },
    #[error("port `{port}` on node `{node}` expects `{expected}`, but `{actual}` was given")]
    PortTypeMismatch {
        node: String,
        port: String,
        expected: &'static str,
        actual: &'static str,
    },
    #[error("port `{port}` on node `{node}` is not bound")]
    PortUnbound { node: String, port: String },
    #[error("node kind `{kind}` is not registered")]
    UnknownNodeKind { kind: String },
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
    #[error("internal error: {0}")]
    Other(#[from] anyhow::Error),
}

impl Error {
    pub fn duplicate_node_name(node: impl Into<String>) -> Self {
        Self::DuplicateNodeName { node: node.into() }
    }

    pub fn unknown_node(node: impl Into<String>) -> Self {
        Self::UnknownNode { node: node.into() }
    }

    pub fn unknown_port(node: impl Into<String>, port: impl Into<String>) -> Self {
        Self::UnknownPort {
            node: node.into(),
            port: port.into(),
        }
    }

    pub fn port_already_bound(node: impl Into<String>, port: impl Into<String>) -> Self {
        Self::PortAlreadyBound {
            node: node.into(),
            port: port.into(),
        }
    }

    pub fn signature_arity_mismatch(
        node: impl Into<String>,
        expected: impl Into<String>,
        actual: usize,
    ) -> Self {
        Self::SignatureArityMismatch {
            node: node.into(),
            expected: expected.into(),
            actual,
        }
    }

    pub fn misplaced_variadic(node: impl Into<String>) -> Self {
        Self::MisplacedVariadic { node: node.into() }
    }

    pub fn duplicate_port_name(node: impl Into<String>, port: impl Into<String>) -> Self {
        Self::DuplicatePortName {
            node: node.into(),
            port: port.into(),
        }
    }

    pub fn invalid_name(name: impl Into<String>) -> Self {
        Self::InvalidName { name: name.into() }
    }

    pub fn invalid_endpoint(endpoint: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidEndpoint {
            endpoint: endpoint.into(),
            reason: reason.into(),
        }
    }

    pub fn not_a_channel_port(node: impl Into<String>, port: impl Into<String>) -> Self {
        Self::NotAChannelPort {
            node: node.into(),
            port: port.into(),
        }
    }

    pub fn port_type_mismatch(
        node: impl Into<String>,
        port: impl Into<String>,
        expected: &'static str,
        actual: &'static str,
    ) -> Self {
        Self::PortTypeMismatch {
            node: node.into(),
            port: port.into(),
            expected,
            actual,
        }
    }

    pub fn port_unbound(node: impl Into<String>, port: impl Into<String>) -> Self {
        Self::PortUnbound {
            node: node.into(),
            port: port.into(),
        }
    }

    pub fn unknown_node_kind(kind: impl Into<String>) -> Self {
        Self::UnknownNodeKind { kind: kind.into() }
    }
}
