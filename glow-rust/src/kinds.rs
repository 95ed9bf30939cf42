use crate::{error::Error, node::Node, signature::NodeFn};
use glow_config::Ident;
use indexmap::IndexMap;
use log::{debug, warn};

type Factory<G> = Box<dyn Fn(&str, &[&str]) -> Result<Node<G>, Error> + Send + Sync>;

/// Node implementations by kind name, used to build graphs from configuration.
pub struct NodeKinds<G> {
    factories: IndexMap<String, Factory<G>>,
}

impl<G> NodeKinds<G>
where
    G: Send + Sync + 'static,
{
    pub fn new() -> Self {
        Self {
            factories: IndexMap::new(),
        }
    }

    /// Register `make` as the node kind `kind`.
    ///
    /// `make` is called once per configured node of this kind and returns
    /// the function the node runs. Registering a kind again replaces it.
    pub fn register<M, F, Args>(&mut self, kind: &str, make: M) -> Result<(), Error>
    where
        M: Fn() -> F + Send + Sync + 'static,
        F: NodeFn<G, Args>,
        Args: 'static,
    {
        if Ident::new(kind).is_none() {
            return Err(Error::invalid_name(kind));
        }

        let factory: Factory<G> =
            Box::new(move |name: &str, ports: &[&str]| Node::new::<F, Args>(make(), name, ports));
        if self.factories.insert(kind.to_string(), factory).is_some() {
            warn!("node kind `{}` is registered again", kind);
        } else {
            debug!("register node kind `{}`", kind);
        }
        Ok(())
    }

    pub fn contains(&self, kind: &str) -> bool {
        self.factories.contains_key(kind)
    }

    /// Registered kind names in registration order.
    pub fn kinds(&self) -> impl Iterator<Item = &str> {
        self.factories.keys().map(String::as_str)
    }

    /// Build a node of kind `kind`.
    pub fn build(&self, kind: &str, name: &str, ports: &[&str]) -> Result<Node<G>, Error> {
        let factory = self
            .factories
            .get(kind)
            .ok_or_else(|| Error::unknown_node_kind(kind))?;
        factory(name, ports)
    }
}

impl<G> Default for NodeKinds<G>
where
    G: Send + Sync + 'static,
{
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use glow_link::Channel;

    #[test]
    fn build_registered_kind() {
        let mut kinds = NodeKinds::<()>::new();
        kinds
            .register("sink", || |_: &(), _input: Channel<u8>| {})
            .unwrap();
        assert!(kinds.contains("sink"));
        assert_eq!(kinds.kinds().collect::<Vec<_>>(), ["sink"]);

        let node = kinds.build("sink", "Sink", &["In"]).unwrap();
        assert_eq!(node.name(), "Sink");
        assert_eq!(node.ports().len(), 2);
    }

    #[test]
    fn unknown_kind_fails() {
        let kinds = NodeKinds::<()>::new();
        assert!(matches!(
            kinds.build("nope", "N", &[]),
            Err(Error::UnknownNodeKind { .. })
        ));
    }

    #[test]
    fn factory_checks_arity() {
        let mut kinds = NodeKinds::<()>::new();
        kinds
            .register("sink", || |_: &(), _input: Channel<u8>| {})
            .unwrap();
        assert!(matches!(
            kinds.build("sink", "Sink", &["In", "Extra"]),
            Err(Error::SignatureArityMismatch { .. })
        ));
    }
}
