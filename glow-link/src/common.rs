pub use derivative::Derivative;
pub use flume::{RecvError, RecvTimeoutError, SendError, TryRecvError, TrySendError};
pub use futures::{sink::Sink, stream::Stream};
pub use std::{
    any::{self, Any, TypeId},
    fmt,
    time::Duration,
};
