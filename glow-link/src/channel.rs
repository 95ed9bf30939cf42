use crate::common::*;

/// A typed, bounded FIFO queue shared by every node it is bound into.
///
/// The channel holds both ends of one flume queue. Cloning it yields
/// another handle to the same queue, so any clone may put and get.
/// A capacity of zero makes a rendezvous channel: each `send` blocks
/// until a receiver takes the item.
///
/// Because every handle keeps both ends alive, the queue never reports
/// disconnection while a node still holds it. Ending a stream is a
/// protocol between the communicating nodes.
#[derive(Derivative)]
#[derivative(Clone(bound = ""), Debug(bound = ""))]
pub struct Channel<T> {
    capacity: usize,
    tx: flume::Sender<T>,
    rx: flume::Receiver<T>,
}

impl<T> Channel<T> {
    /// Create a channel that buffers up to `capacity` items.
    pub fn bounded(capacity: usize) -> Self {
        let (tx, rx) = flume::bounded(capacity);
        Self { capacity, tx, rx }
    }

    /// The buffer capacity the channel was created with.
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// The number of buffered items.
    pub fn len(&self) -> usize {
        self.rx.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rx.is_empty()
    }

    pub fn is_full(&self) -> bool {
        self.tx.is_full()
    }

    /// Return true if both handles refer to the same queue.
    pub fn same_channel(&self, other: &Self) -> bool {
        self.tx.same_channel(&other.tx)
    }

    /// Put an item, blocking while the queue is full.
    pub fn send(&self, item: T) -> Result<(), SendError<T>> {
        self.tx.send(item)
    }

    /// Put an item without blocking.
    pub fn try_send(&self, item: T) -> Result<(), TrySendError<T>> {
        self.tx.try_send(item)
    }

    /// Take an item, blocking while the queue is empty.
    pub fn recv(&self) -> Result<T, RecvError> {
        self.rx.recv()
    }

    /// Take an item without blocking.
    pub fn try_recv(&self) -> Result<T, TryRecvError> {
        self.rx.try_recv()
    }

    /// Take an item, giving up once `timeout` elapses.
    pub fn recv_timeout(&self, timeout: Duration) -> Result<T, RecvTimeoutError> {
        self.rx.recv_timeout(timeout)
    }

    pub async fn send_async(&self, item: T) -> Result<(), SendError<T>> {
        self.tx.send_async(item).await
    }

    pub async fn recv_async(&self) -> Result<T, RecvError> {
        self.rx.recv_async().await
    }

    /// Iterate over received items, blocking for each one.
    pub fn iter(&self) -> flume::Iter<'_, T> {
        self.rx.iter()
    }

    /// Take every item that is buffered right now.
    pub fn drain(&self) -> flume::Drain<'_, T> {
        self.rx.drain()
    }

    pub fn into_stream(self) -> impl Stream<Item = T>
    where
        T: 'static,
    {
        self.rx.into_stream()
    }

    pub fn into_sink(self) -> impl Sink<T, Error = SendError<T>>
    where
        T: 'static,
    {
        self.tx.into_sink()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::thread;

    #[test]
    fn fifo_within_capacity() {
        let chan = Channel::bounded(3);
        for value in [1, 2, 3] {
            chan.try_send(value).unwrap();
        }
        assert!(chan.is_full());
        assert!(matches!(chan.try_send(4), Err(TrySendError::Full(4))));

        let received: Vec<i32> = chan.drain().collect();
        assert_eq!(received, [1, 2, 3]);
        assert!(chan.is_empty());
    }

    #[test]
    fn clones_share_one_queue() {
        let a = Channel::bounded(1);
        let b = a.clone();
        assert!(a.same_channel(&b));
        assert!(!a.same_channel(&Channel::bounded(1)));

        a.send("hello").unwrap();
        assert_eq!(b.recv().unwrap(), "hello");
    }

    #[test]
    fn rendezvous_blocks_until_taken() {
        let chan = Channel::bounded(0);
        assert_eq!(chan.capacity(), 0);
        assert!(matches!(chan.try_send(1), Err(TrySendError::Full(1))));

        let consumer = {
            let chan = chan.clone();
            thread::spawn(move || chan.recv().unwrap())
        };
        chan.send(7).unwrap();
        assert_eq!(consumer.join().unwrap(), 7);
    }

    #[test]
    fn recv_timeout_on_empty_queue() {
        let chan: Channel<u8> = Channel::bounded(1);
        let result = chan.recv_timeout(Duration::from_millis(10));
        assert!(matches!(result, Err(RecvTimeoutError::Timeout)));
    }
}
