//! Typed channels that carry data between dataflow nodes.
//!
//! [Channel] is a bounded multi-producer, multi-consumer FIFO queue.
//! [ChannelHandle] is its type-erased form, which the wiring layer uses to
//! create one channel and bind clones of it into several node ports.

pub mod channel;
mod common;
pub mod erased;

pub use channel::Channel;
pub use erased::{AnyChannel, ChannelHandle};
pub use flume::{RecvError, RecvTimeoutError, SendError, TryRecvError, TrySendError};
