use crate::{channel::Channel, common::*};
use log::trace;

/// A [Channel] with its element type erased.
///
/// The wiring layer only knows element types at the point where a
/// channel is synthesized. Afterwards it moves channels around through
/// this trait and hands the concrete `Channel<T>` back to the node that
/// declared it.
pub trait AnyChannel: Send + Sync + 'static {
    /// The `TypeId` of the concrete `Channel<T>`.
    fn channel_type_id(&self) -> TypeId;

    /// The type name of the element `T`.
    fn element_type_name(&self) -> &'static str;

    fn capacity(&self) -> usize;

    /// Clone the underlying channel handle into a new box.
    fn clone_boxed(&self) -> Box<dyn AnyChannel>;

    fn as_any(&self) -> &dyn Any;

    fn into_any(self: Box<Self>) -> Box<dyn Any + Send>;
}

impl<T> AnyChannel for Channel<T>
where
    T: Send + 'static,
{
    fn channel_type_id(&self) -> TypeId {
        TypeId::of::<Channel<T>>()
    }

    fn element_type_name(&self) -> &'static str {
        any::type_name::<T>()
    }

    fn capacity(&self) -> usize {
        Channel::capacity(self)
    }

    fn clone_boxed(&self) -> Box<dyn AnyChannel> {
        Box::new(self.clone())
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn into_any(self: Box<Self>) -> Box<dyn Any + Send> {
        self
    }
}

/// A cloneable, type-erased reference to a channel.
pub struct ChannelHandle {
    inner: Box<dyn AnyChannel>,
}

impl ChannelHandle {
    /// Synthesize a new channel of element type `T`.
    pub fn bounded<T>(capacity: usize) -> Self
    where
        T: Send + 'static,
    {
        trace!(
            "synthesize channel<{}> with capacity {}",
            any::type_name::<T>(),
            capacity
        );
        Channel::<T>::bounded(capacity).into()
    }

    pub fn channel_type_id(&self) -> TypeId {
        self.inner.channel_type_id()
    }

    pub fn element_type_name(&self) -> &'static str {
        self.inner.element_type_name()
    }

    pub fn capacity(&self) -> usize {
        self.inner.capacity()
    }

    /// Return true if the handle holds a `Channel<T>`.
    pub fn is<T>(&self) -> bool
    where
        T: Send + 'static,
    {
        self.channel_type_id() == TypeId::of::<Channel<T>>()
    }

    /// Recover the typed channel if the element type is `T`.
    pub fn downcast<T>(&self) -> Option<Channel<T>>
    where
        T: Send + 'static,
    {
        self.inner.as_any().downcast_ref::<Channel<T>>().cloned()
    }

    /// Turn a clone of the channel into a plain boxed value.
    pub fn to_any(&self) -> Box<dyn Any + Send> {
        self.inner.clone_boxed().into_any()
    }
}

impl Clone for ChannelHandle {
    fn clone(&self) -> Self {
        Self {
            inner: self.inner.clone_boxed(),
        }
    }
}

impl fmt::Debug for ChannelHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ChannelHandle")
            .field("element", &self.element_type_name())
            .field("capacity", &self.capacity())
            .finish()
    }
}

impl<T> From<Channel<T>> for ChannelHandle
where
    T: Send + 'static,
{
    fn from(channel: Channel<T>) -> Self {
        Self {
            inner: Box::new(channel),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn downcast_recovers_the_same_queue() {
        let handle = ChannelHandle::bounded::<u32>(2);
        assert!(handle.is::<u32>());
        assert!(!handle.is::<i32>());
        assert_eq!(handle.capacity(), 2);
        assert_eq!(handle.element_type_name(), "u32");

        let a = handle.downcast::<u32>().unwrap();
        let b = handle.clone().downcast::<u32>().unwrap();
        assert!(a.same_channel(&b));
        assert!(handle.downcast::<String>().is_none());
    }

    #[test]
    fn to_any_yields_a_typed_channel() {
        let handle = ChannelHandle::bounded::<String>(1);
        let value = handle.to_any();
        let chan = value.downcast::<Channel<String>>().unwrap();

        chan.send("x".to_string()).unwrap();
        let peer = handle.downcast::<String>().unwrap();
        assert_eq!(peer.recv().unwrap(), "x");
    }
}
