//! Message queue shared between the receive loop and the tick loop
//!
//! The lock is only held for a single push or pop.

use std::collections::VecDeque;
use std::sync::Arc;

use parking_lot::Mutex;
use serde::Deserialize;

/// Default number of pending messages kept before overflow kicks in
pub const DEFAULT_QUEUE_CAPACITY: usize = 256;

/// What to do with a message arriving at a full queue
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OverflowPolicy {
    /// Evict the oldest pending message to make room
    #[default]
    DropOldest,
    /// Discard the incoming message
    DropNewest,
}

/// Queue counters
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct QueueStats {
    pub enqueued: u64,
    pub dequeued: u64,
    pub dropped: u64,
}

#[derive(Debug)]
struct Inner {
    messages: VecDeque<String>,
    capacity: usize,
    policy: OverflowPolicy,
    stats: QueueStats,
}

/// Anything the tick loop can pull raw messages from
pub trait MessageSource {
    /// Pop at most one pending message
    fn poll(&self) -> Option<String>;

    /// Release any background resources
    fn stop(&mut self) {}
}

/// Bounded FIFO of raw text messages
#[derive(Debug, Clone)]
pub struct MessageQueue {
    inner: Arc<Mutex<Inner>>,
}

impl Default for MessageQueue {
    fn default() -> Self {
        Self::new(DEFAULT_QUEUE_CAPACITY, OverflowPolicy::default())
    }
}

impl MessageQueue {
    /// Create a queue. A capacity of zero is treated as one.
    pub fn new(capacity: usize, policy: OverflowPolicy) -> Self {
        let capacity = capacity.max(1);
        Self {
            inner: Arc::new(Mutex::new(Inner {
                messages: VecDeque::with_capacity(capacity.min(1024)),
                capacity,
                policy,
                stats: QueueStats::default(),
            })),
        }
    }

    /// Enqueue a message. Returns false if it was discarded.
    pub fn push(&self, message: String) -> bool {
        let mut inner = self.inner.lock();
        if inner.messages.len() >= inner.capacity {
            inner.stats.dropped += 1;
            match inner.policy {
                OverflowPolicy::DropNewest => return false,
                OverflowPolicy::DropOldest => {
                    inner.messages.pop_front();
                }
            }
        }
        inner.messages.push_back(message);
        inner.stats.enqueued += 1;
        true
    }

    /// Dequeue the oldest pending message
    pub fn pop(&self) -> Option<String> {
        let mut inner = self.inner.lock();
        let message = inner.messages.pop_front();
        if message.is_some() {
            inner.stats.dequeued += 1;
        }
        message
    }

    pub fn len(&self) -> usize {
        self.inner.lock().messages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.lock().messages.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.inner.lock().capacity
    }

    pub fn stats(&self) -> QueueStats {
        self.inner.lock().stats.clone()
    }
}

impl MessageSource for MessageQueue {
    fn poll(&self) -> Option<String> {
        self.pop()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_fifo_order() {
        let queue = MessageQueue::default();
        queue.push("a".into());
        queue.push("b".into());

        assert_eq!(queue.pop().as_deref(), Some("a"));
        assert_eq!(queue.pop().as_deref(), Some("b"));
        assert_eq!(queue.pop(), None);
    }

    #[test]
    fn test_drop_oldest() {
        let queue = MessageQueue::new(2, OverflowPolicy::DropOldest);
        assert!(queue.push("1".into()));
        assert!(queue.push("2".into()));
        assert!(queue.push("3".into()));

        assert_eq!(queue.len(), 2);
        assert_eq!(queue.pop().as_deref(), Some("2"));
        assert_eq!(queue.pop().as_deref(), Some("3"));
        assert_eq!(queue.stats().dropped, 1);
    }

    #[test]
    fn test_drop_newest() {
        let queue = MessageQueue::new(2, OverflowPolicy::DropNewest);
        queue.push("1".into());
        queue.push("2".into());
        assert!(!queue.push("3".into()));

        assert_eq!(queue.pop().as_deref(), Some("1"));
        assert_eq!(queue.pop().as_deref(), Some("2"));
        assert!(queue.is_empty());

        let stats = queue.stats();
        assert_eq!(stats.enqueued, 2);
        assert_eq!(stats.dequeued, 2);
        assert_eq!(stats.dropped, 1);
    }

    #[test]
    fn test_zero_capacity_holds_one() {
        let queue = MessageQueue::new(0, OverflowPolicy::DropOldest);
        assert_eq!(queue.capacity(), 1);
        queue.push("x".into());
        queue.push("y".into());
        assert_eq!(queue.pop().as_deref(), Some("y"));
    }

    #[test]
    fn test_shared_between_threads() {
        let queue = MessageQueue::new(1000, OverflowPolicy::DropNewest);
        let producer = queue.clone();
        let handle = std::thread::spawn(move || {
            for i in 0..100 {
                producer.push(i.to_string());
            }
        });
        handle.join().unwrap();

        let drained: Vec<String> = std::iter::from_fn(|| queue.pop()).collect();
        assert_eq!(drained.len(), 100);
        assert_eq!(drained[0], "0");
        assert_eq!(drained[99], "99");
    }

    proptest! {
        #[test]
        fn prop_bounded_and_accounted(
            ops in prop::collection::vec(any::<bool>(), 0..200),
            capacity in 1usize..16,
            newest in any::<bool>(),
        ) {
            let policy = if newest { OverflowPolicy::DropNewest } else { OverflowPolicy::DropOldest };
            let queue = MessageQueue::new(capacity, policy);
            let mut accepted = 0u64;
            for (i, push) in ops.into_iter().enumerate() {
                if push {
                    accepted += queue.push(i.to_string()) as u64;
                } else {
                    queue.pop();
                }
                prop_assert!(queue.len() <= capacity);
            }

            let stats = queue.stats();
            prop_assert_eq!(stats.enqueued, accepted);
            // Every accepted message is either still pending, popped, or evicted
            let evicted = if newest { 0 } else { stats.dropped };
            prop_assert_eq!(stats.enqueued, stats.dequeued + evicted + queue.len() as u64);
        }
    }
}
