use crate::{
    diagram::NodeDescription,
    error::Error,
    signature::{BoundValue, NodeFn, PortKind, PortType},
};
use anyhow::anyhow;
use derivative::Derivative;
use glow_config::Ident;
use glow_link::{Channel, ChannelHandle};
use log::{debug, warn};
use std::{
    any::{self, TypeId},
    sync::Arc,
};

/// The name of the implicit first port that carries the graph globals.
pub const GLOBALS: &str = "globals";

type Invoker<G> = Box<dyn FnOnce(&G, Vec<BoundValue>) -> anyhow::Result<()> + Send>;

/// A named, typed argument slot of a node.
#[derive(Debug)]
pub struct Port {
    name: String,
    port_type: PortType,
    value: Option<BoundValue>,
}

impl Port {
    fn new(name: impl Into<String>, port_type: PortType) -> Self {
        Self {
            name: name.into(),
            port_type,
            value: None,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn port_type(&self) -> &PortType {
        &self.port_type
    }

    pub fn is_bound(&self) -> bool {
        self.value.is_some()
    }
}

/// A processing unit: one function plus its named ports.
///
/// Port 0 is always [GLOBALS]. The remaining ports follow the names given
/// at construction. The structure is fixed once built and each port can be
/// bound once.
#[derive(Derivative)]
#[derivative(Debug(bound = ""))]
pub struct Node<G> {
    name: String,
    ports: Vec<Port>,
    #[derivative(Debug = "ignore")]
    invoker: Invoker<G>,
}

impl<G> Node<G>
where
    G: Send + Sync + 'static,
{
    /// Build a node named `name` that runs `func`.
    ///
    /// `port_names` name the parameters of `func` after the globals
    /// reference, in order.
    pub fn new<F, Args>(func: F, name: &str, port_names: &[&str]) -> Result<Self, Error>
    where
        F: NodeFn<G, Args>,
        Args: 'static,
    {
        check_ident(name)?;
        let types = F::signature().resolve(name, port_names.len())?;

        let mut ports = Vec::with_capacity(port_names.len() + 1);
        ports.push(Port::new(GLOBALS, PortType::globals::<G>()));

        for (&port, port_type) in port_names.iter().zip(types) {
            check_ident(port)?;
            if ports.iter().any(|p| p.name == port) {
                return Err(Error::duplicate_port_name(name, port));
            }
            ports.push(Port::new(port, port_type));
        }

        let invoker: Invoker<G> =
            Box::new(move |globals: &G, values: Vec<BoundValue>| func.invoke(globals, values));

        Ok(Self {
            name: name.to_string(),
            ports,
            invoker,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// All ports, starting with [GLOBALS].
    pub fn ports(&self) -> &[Port] {
        &self.ports
    }

    pub fn port(&self, name: &str) -> Option<&Port> {
        self.ports.iter().find(|port| port.name == name)
    }

    /// Create a new channel whose element type matches port `port`.
    pub fn synthesize_channel(&self, port: &str, capacity: usize) -> Result<ChannelHandle, Error> {
        let index = self.position(port)?;
        self.ports[index]
            .port_type
            .synthesize(capacity)
            .ok_or_else(|| Error::not_a_channel_port(&self.name, port))
    }

    /// Bind a channel into port `port`.
    pub fn bind_channel(&mut self, port: &str, channel: &ChannelHandle) -> Result<(), Error> {
        let index = self.check_channel(port, channel)?;
        self.ports[index].value = Some(channel.to_any());
        Ok(())
    }

    /// Bind a plain value into port `port`.
    pub fn bind_value<T>(&mut self, port: &str, value: T) -> Result<(), Error>
    where
        T: Send + 'static,
    {
        let index = self.check_unbound(port)?;
        let expected = &self.ports[index].port_type;
        if expected.type_id() != TypeId::of::<T>() {
            return Err(Error::port_type_mismatch(
                &self.name,
                port,
                expected.type_name(),
                any::type_name::<T>(),
            ));
        }
        self.ports[index].value = Some(Box::new(value));
        Ok(())
    }

    pub(crate) fn bind_globals(&mut self, globals: Arc<G>) -> Result<(), Error> {
        self.bind_value(GLOBALS, globals)
    }

    /// Check that `channel` could be bound into port `port`.
    pub(crate) fn check_channel(&self, port: &str, channel: &ChannelHandle) -> Result<usize, Error> {
        let index = self.check_unbound(port)?;
        let expected = &self.ports[index].port_type;
        if expected.kind() != PortKind::Channel {
            return Err(Error::not_a_channel_port(&self.name, port));
        }
        if expected.type_id() != channel.channel_type_id() {
            return Err(Error::port_type_mismatch(
                &self.name,
                port,
                expected.type_name(),
                channel.element_type_name(),
            ));
        }
        Ok(index)
    }

    /// Return a clone of the channel bound into port `port`.
    pub fn channel<T>(&self, port: &str) -> Option<Channel<T>>
    where
        T: Send + 'static,
    {
        self.port(port)?
            .value
            .as_ref()?
            .downcast_ref::<Channel<T>>()
            .cloned()
    }

    pub fn is_bound(&self, port: &str) -> bool {
        self.port(port).map_or(false, Port::is_bound)
    }

    /// The name of the first port that is still unbound.
    pub fn first_unbound(&self) -> Option<&str> {
        self.ports
            .iter()
            .find(|port| !port.is_bound())
            .map(|port| port.name.as_str())
    }

    /// The node name and its port names without [GLOBALS].
    pub fn describe(&self) -> NodeDescription {
        NodeDescription {
            name: self.name.clone(),
            ports: self.ports[1..].iter().map(|port| port.name.clone()).collect(),
        }
    }

    /// Run the node function with every bound port value.
    ///
    /// All ports must be bound. An unbound port yields [Error::PortUnbound]
    /// without calling the function.
    pub fn execute(self) -> anyhow::Result<()> {
        let Self {
            name,
            ports,
            invoker,
        } = self;

        let mut values = Vec::with_capacity(ports.len());
        for Port {
            name: port, value, ..
        } in ports
        {
            let value = value.ok_or_else(|| Error::port_unbound(&name, &port))?;
            values.push(value);
        }

        let mut values = values.into_iter();
        let globals = values
            .next()
            .and_then(|value| value.downcast::<Arc<G>>().ok())
            .map(|globals| *globals)
            .ok_or_else(|| {
                Error::Other(anyhow!(
                    "port `{}` on node `{}` does not hold `{}`",
                    GLOBALS,
                    name,
                    any::type_name::<Arc<G>>()
                ))
            })?;

        debug!("node `{}` started", name);
        let result = invoker(globals.as_ref(), values.collect());
        match &result {
            Ok(()) => debug!("node `{}` finished", name),
            Err(err) => warn!("node `{}` failed: {:#}", name, err),
        }
        result
    }

    fn position(&self, port: &str) -> Result<usize, Error> {
        self.ports
            .iter()
            .position(|p| p.name == port)
            .ok_or_else(|| Error::unknown_port(&self.name, port))
    }

    fn check_unbound(&self, port: &str) -> Result<usize, Error> {
        let index = self.position(port)?;
        if self.ports[index].is_bound() {
            return Err(Error::port_already_bound(&self.name, port));
        }
        Ok(index)
    }
}

fn check_ident(name: &str) -> Result<(), Error> {
    Ident::new(name)
        .map(|_| ())
        .ok_or_else(|| Error::invalid_name(name))
}
