//! Port signature inspection.
//!
//! A node function takes a reference to the graph globals followed by its
//! ports. Each port parameter implements [PortArg], which tells the graph
//! what the port is ([PortType]) and how to pull the bound value back out
//! when the node runs. [NodeFn] ties the pieces together for functions and
//! closures of up to eight ports.

use crate::error::Error;
use anyhow::anyhow;
use derivative::Derivative;
use glow_link::{Channel, ChannelHandle};
use std::{
    any::{self, Any, TypeId},
    ops::Deref,
    sync::Arc,
};

/// A type-erased value bound into a port.
pub type BoundValue = Box<dyn Any + Send>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PortKind {
    /// The implicit first slot holding the graph globals.
    Globals,
    /// A port that takes a channel.
    Channel,
    /// A port that takes a plain value.
    Param,
}

/// The declared type of a port.
#[derive(Debug, Clone, Copy, Derivative)]
#[derivative(PartialEq, Eq)]
pub struct PortType {
    kind: PortKind,
    type_id: TypeId,
    type_name: &'static str,
    #[derivative(PartialEq = "ignore")]
    synthesize: Option<fn(usize) -> ChannelHandle>,
}

impl PortType {
    /// A port carrying `Channel<T>`.
    pub fn channel<T>() -> Self
    where
        T: Send + 'static,
    {
        Self {
            kind: PortKind::Channel,
            type_id: TypeId::of::<Channel<T>>(),
            type_name: any::type_name::<T>(),
            synthesize: Some(ChannelHandle::bounded::<T>),
        }
    }

    /// A port carrying a plain `T`.
    pub fn param<T>() -> Self
    where
        T: Send + 'static,
    {
        Self {
            kind: PortKind::Param,
            type_id: TypeId::of::<T>(),
            type_name: any::type_name::<T>(),
            synthesize: None,
        }
    }

    pub(crate) fn globals<G>() -> Self
    where
        G: Send + Sync + 'static,
    {
        Self {
            kind: PortKind::Globals,
            type_id: TypeId::of::<Arc<G>>(),
            type_name: any::type_name::<G>(),
            synthesize: None,
        }
    }

    pub fn kind(&self) -> PortKind {
        self.kind
    }

    /// The `TypeId` of the value stored in the port.
    pub fn type_id(&self) -> TypeId {
        self.type_id
    }

    /// The element type name for channel ports, the value type name otherwise.
    pub fn type_name(&self) -> &'static str {
        self.type_name
    }

    /// Create a new channel matching this port, if it is a channel port.
    pub fn synthesize(&self, capacity: usize) -> Option<ChannelHandle> {
        self.synthesize.map(|make| make(capacity))
    }
}

/// A node function parameter that is bound through a port.
pub trait PortArg: Sized + Send + 'static {
    /// Set if the parameter absorbs every remaining port.
    const VARIADIC: bool = false;

    /// The declared type of each port mapped to this parameter.
    fn port_type() -> PortType;

    /// Take the parameter value out of the bound port values.
    fn extract<I>(values: &mut I) -> Option<Self>
    where
        I: Iterator<Item = BoundValue>;
}

impl<T> PortArg for Channel<T>
where
    T: Send + 'static,
{
    fn port_type() -> PortType {
        PortType::channel::<T>()
    }

    fn extract<I>(values: &mut I) -> Option<Self>
    where
        I: Iterator<Item = BoundValue>,
    {
        values.next()?.downcast::<Channel<T>>().ok().map(|chan| *chan)
    }
}

/// A port that carries a plain value instead of a channel.
///
/// The value is bound with [Graph::bind](crate::Graph::bind) before launch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Param<T>(pub T);

impl<T> Param<T> {
    pub fn into_inner(self) -> T {
        self.0
    }
}

impl<T> Deref for Param<T> {
    type Target = T;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl<T> PortArg for Param<T>
where
    T: Send + 'static,
{
    fn port_type() -> PortType {
        PortType::param::<T>()
    }

    fn extract<I>(values: &mut I) -> Option<Self>
    where
        I: Iterator<Item = BoundValue>,
    {
        values.next()?.downcast::<T>().ok().map(|value| Param(*value))
    }
}

/// A variable-length tail of channel ports.
///
/// It must be the last parameter. Every port name at or beyond its position
/// becomes a `Channel<T>` port, in order.
#[derive(Derivative)]
#[derivative(Debug(bound = ""), Clone(bound = ""))]
pub struct Variadic<T>(Vec<Channel<T>>);

impl<T> Variadic<T> {
    pub fn into_inner(self) -> Vec<Channel<T>> {
        self.0
    }
}

impl<T> Deref for Variadic<T> {
    type Target = [Channel<T>];

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl<T> IntoIterator for Variadic<T> {
    type Item = Channel<T>;
    type IntoIter = std::vec::IntoIter<Channel<T>>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}

impl<'a, T> IntoIterator for &'a Variadic<T> {
    type Item = &'a Channel<T>;
    type IntoIter = std::slice::Iter<'a, Channel<T>>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

impl<T> PortArg for Variadic<T>
where
    T: Send + 'static,
{
    const VARIADIC: bool = true;

    fn port_type() -> PortType {
        PortType::channel::<T>()
    }

    fn extract<I>(values: &mut I) -> Option<Self>
    where
        I: Iterator<Item = BoundValue>,
    {
        values
            .map(|value| value.downcast::<Channel<T>>().ok().map(|chan| *chan))
            .collect::<Option<Vec<_>>>()
            .map(Variadic)
    }
}

/// One parameter of a node function after the globals reference.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PortParam {
    pub port_type: PortType,
    pub variadic: bool,
}

/// The ordered port parameters of a node function.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Signature {
    params: Vec<PortParam>,
}

impl Signature {
    pub fn new(params: Vec<PortParam>) -> Self {
        Self { params }
    }

    pub fn params(&self) -> &[PortParam] {
        &self.params
    }

    /// Return true if the last parameter is a variadic tail.
    pub fn is_variadic(&self) -> bool {
        self.params.last().map_or(false, |param| param.variadic)
    }

    /// The number of parameters before the variadic tail, if any.
    pub fn fixed_len(&self) -> usize {
        if self.is_variadic() {
            self.params.len() - 1
        } else {
            self.params.len()
        }
    }

    /// Map `count` port names onto the parameters of node `node`.
    ///
    /// Returns the declared type of each named port. Names beyond the fixed
    /// parameters all resolve to the element type of the variadic tail.
    pub fn resolve(&self, node: &str, count: usize) -> Result<Vec<PortType>, Error> {
        let fixed = self.fixed_len();
        if self.params[..fixed].iter().any(|param| param.variadic) {
            return Err(Error::misplaced_variadic(node));
        }

        if self.is_variadic() {
            if count < fixed {
                return Err(Error::signature_arity_mismatch(
                    node,
                    format!("at least {}", fixed),
                    count,
                ));
            }
        } else if count != fixed {
            return Err(Error::signature_arity_mismatch(
                node,
                format!("exactly {}", fixed),
                count,
            ));
        }

        let types = (0..count)
            .map(|index| self.params[index.min(self.params.len() - 1)].port_type)
            .collect();
        Ok(types)
    }
}

/// The return value of a node function.
pub trait NodeReturn {
    fn into_result(self) -> anyhow::Result<()>;
}

impl NodeReturn for () {
    fn into_result(self) -> anyhow::Result<()> {
        Ok(())
    }
}

impl<E> NodeReturn for Result<(), E>
where
    E: Into<anyhow::Error>,
{
    fn into_result(self) -> anyhow::Result<()> {
        self.map_err(Into::into)
    }
}

/// A function that can run as a node.
///
/// It is implemented for every `FnOnce(&G, A1, .., An) -> R` with up to
/// eight port arguments, where each `Ai` is a [PortArg] and `R` is a
/// [NodeReturn]. `Args` is the tuple of port argument types and only
/// serves to tell the implementations apart.
pub trait NodeFn<G, Args>: Send + 'static {
    /// The port parameters, in declaration order.
    fn signature() -> Signature;

    /// Call the function with the bound port values, globals excluded.
    fn invoke(self, globals: &G, values: Vec<BoundValue>) -> anyhow::Result<()>;
}

macro_rules! impl_node_fn {
    ($($arg:ident $val:ident),*) => {
        impl<G, F, R, $($arg,)*> NodeFn<G, ($($arg,)*)> for F
        where
            F: FnOnce(&G, $($arg),*) -> R + Send + 'static,
            R: NodeReturn,
            $($arg: PortArg,)*
        {
            fn signature() -> Signature {
                Signature::new(vec![$(
                    PortParam {
                        port_type: $arg::port_type(),
                        variadic: $arg::VARIADIC,
                    },
                )*])
            }

            #[allow(unused_mut, unused_variables)]
            fn invoke(self, globals: &G, values: Vec<BoundValue>) -> anyhow::Result<()> {
                let mut values = values.into_iter();
                $(
                    let $val = $arg::extract(&mut values).ok_or_else(|| {
                        anyhow!("missing argument of type `{}`", any::type_name::<$arg>())
                    })?;
                )*
                (self)(globals, $($val),*).into_result()
            }
        }
    };
}

impl_node_fn!();
impl_node_fn!(A1 a1);
impl_node_fn!(A1 a1, A2 a2);
impl_node_fn!(A1 a1, A2 a2, A3 a3);
impl_node_fn!(A1 a1, A2 a2, A3 a3, A4 a4);
impl_node_fn!(A1 a1, A2 a2, A3 a3, A4 a4, A5 a5);
impl_node_fn!(A1 a1, A2 a2, A3 a3, A4 a4, A5 a5, A6 a6);
impl_node_fn!(A1 a1, A2 a2, A3 a3, A4 a4, A5 a5, A6 a6, A7 a7);
impl_node_fn!(A1 a1, A2 a2, A3 a3, A4 a4, A5 a5, A6 a6, A7 a7, A8 a8);

#[cfg(test)]
mod tests {
    use super::*;

    fn signature_of<F, Args>(_: &F) -> Signature
    where
        F: NodeFn<(), Args>,
    {
        F::signature()
    }

    #[test]
    fn fixed_ports_resolve_in_order() {
        let func = |_: &(), _: Channel<i32>, _: Param<String>| {};
        let sig = signature_of(&func);
        assert!(!sig.is_variadic());

        let types = sig.resolve("n", 2).unwrap();
        assert_eq!(types[0], PortType::channel::<i32>());
        assert_eq!(types[1], PortType::param::<String>());
        assert_eq!(types[1].kind(), PortKind::Param);
    }

    #[test]
    fn fixed_ports_require_exact_count() {
        let func = |_: &(), _: Channel<i32>| {};
        let sig = signature_of(&func);
        for count in [0, 2] {
            let err = sig.resolve("n", count).unwrap_err();
            assert!(matches!(err, Error::SignatureArityMismatch { actual, .. } if actual == count));
        }
    }

    #[test]
    fn variadic_tail_repeats_element_type() {
        let func = |_: &(), _: Param<u8>, _: Variadic<f64>| {};
        let sig = signature_of(&func);
        assert!(sig.is_variadic());
        assert_eq!(sig.fixed_len(), 1);

        let types = sig.resolve("n", 4).unwrap();
        assert_eq!(types.len(), 4);
        assert!(types[1..].iter().all(|ty| *ty == PortType::channel::<f64>()));

        assert_eq!(sig.resolve("n", 1).unwrap().len(), 1);
        assert!(matches!(
            sig.resolve("n", 0),
            Err(Error::SignatureArityMismatch { .. })
        ));
    }

    #[test]
    fn variadic_must_be_last() {
        let func = |_: &(), _: Variadic<u8>, _: Channel<u8>| {};
        let sig = signature_of(&func);
        assert!(matches!(
            sig.resolve("n", 3),
            Err(Error::MisplacedVariadic { .. })
        ));
    }

    #[test]
    fn invoke_passes_bound_values() {
        let chan = Channel::<i32>::bounded(1);
        let func = |_: &(), out: Channel<i32>, Param(value): Param<i32>| out.send(value);
        let values: Vec<BoundValue> = vec![Box::new(chan.clone()), Box::new(41)];

        NodeFn::invoke(func, &(), values).unwrap();
        assert_eq!(chan.recv().unwrap(), 41);
    }

    #[test]
    fn invoke_rejects_mistyped_values() {
        let func = |_: &(), _: Param<i32>| {};
        let values: Vec<BoundValue> = vec![Box::new("not an i32")];
        assert!(NodeFn::invoke(func, &(), values).is_err());
    }

    #[test]
    fn node_errors_surface() {
        let func = |_: &()| -> anyhow::Result<()> { Err(anyhow!("boom")) };
        let err = NodeFn::invoke(func, &(), vec![]).unwrap_err();
        assert_eq!(err.to_string(), "boom");
    }
}
