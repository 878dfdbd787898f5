use crossbeam_channel as chan;

/// Send half of a [`Queue`].
///
/// [`Queue`]: struct.Queue.html
pub type Sender<T> = chan::Sender<T>;

/// Receive half of a [`Queue`].
///
/// [`Queue`]: struct.Queue.html
pub type Receiver<T> = chan::Receiver<T>;

/// A thread-safe queue of object names awaiting deletion.
///
/// Unbounded so that dropping a handle never blocks the thread that owns
/// the factory.
#[derive(Clone)]
pub struct Queue<T> {
    /// Send half of the queue.
    tx: Sender<T>,

    /// Receive half of the queue.
    rx: Receiver<T>,
}

impl<T> Queue<T> {
    /// Constructor.
    pub fn new() -> Self {
        let (tx, rx) = chan::unbounded();
        Self { tx, rx }
    }

    /// Clone the send half of the queue.
    pub fn tx(&self) -> Sender<T> {
        self.tx.clone()
    }

    /// Remove the item from the front of the queue.
    pub fn next(&self) -> Option<T> {
        self.rx.try_recv().ok()
    }

    /// Returns `true` if nothing is waiting in the queue.
    pub fn is_empty(&self) -> bool {
        self.rx.is_empty()
    }
}

impl<T> Default for Queue<T> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn items_come_out_in_send_order() {
        let queue = Queue::new();
        let tx = queue.tx();
        tx.send(3u32).unwrap();
        tx.send(7u32).unwrap();
        assert!(!queue.is_empty());
        assert_eq!(queue.next(), Some(3));
        assert_eq!(queue.next(), Some(7));
        assert_eq!(queue.next(), None);
        assert!(queue.is_empty());
    }
}
