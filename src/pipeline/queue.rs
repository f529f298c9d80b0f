//! Single-slot queue where a newer job replaces the pending one.
//!
//! Producers never block. The consumer always receives the most recent
//! item; anything that was replaced before being taken is gone for good.

#[cfg(test)]
use std::time::{Duration, Instant};

use parking_lot::{Condvar, Mutex};

struct Slot<T> {
    item: Option<T>,
    closed: bool,
}

pub struct CoalescingQueue<T> {
    slot: Mutex<Slot<T>>,
    ready: Condvar,
}

impl<T> CoalescingQueue<T> {
    pub fn new() -> Self {
        Self {
            slot: Mutex::new(Slot {
                item: None,
                closed: false,
            }),
            ready: Condvar::new(),
        }
    }

    /// Store `item`, returning the pending item it superseded.
    pub fn put(&self, item: T) -> Option<T> {
        let superseded = self.slot.lock().item.replace(item);
        self.ready.notify_one();
        superseded
    }

    /// Block until an item is available and return the latest one.
    ///
    /// Returns `None` once the queue is closed.
    pub fn take_latest(&self) -> Option<T> {
        let mut slot = self.slot.lock();
        loop {
            if slot.closed {
                return None;
            }
            if let Some(item) = slot.item.take() {
                return Some(item);
            }
            self.ready.wait(&mut slot);
        }
    }

    /// Like [`take_latest`](Self::take_latest), giving up after `timeout`.
    #[cfg(test)]
    pub fn take_timeout(&self, timeout: Duration) -> Option<T> {
        let deadline = Instant::now() + timeout;
        let mut slot = self.slot.lock();
        loop {
            if slot.closed {
                return None;
            }
            if let Some(item) = slot.item.take() {
                return Some(item);
            }
            if self.ready.wait_until(&mut slot, deadline).timed_out() {
                return slot.item.take();
            }
        }
    }

    pub fn try_take(&self) -> Option<T> {
        self.slot.lock().item.take()
    }

    pub fn is_empty(&self) -> bool {
        self.slot.lock().item.is_none()
    }

    /// Wake the consumer and make every further take return `None`.
    pub fn close(&self) {
        self.slot.lock().closed = true;
        self.ready.notify_all();
    }

    #[cfg(test)]
    pub fn is_closed(&self) -> bool {
        self.slot.lock().closed
    }
}

impl<T> Default for CoalescingQueue<T> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::thread;

    #[test]
    fn test_put_replaces_pending() {
        let queue = CoalescingQueue::new();
        assert_eq!(queue.put(1), None);
        assert_eq!(queue.put(2), Some(1));
        assert_eq!(queue.put(3), Some(2));
        assert_eq!(queue.take_latest(), Some(3));
        assert!(queue.is_empty());
    }

    #[test]
    fn test_try_take_empty() {
        let queue: CoalescingQueue<u32> = CoalescingQueue::new();
        assert_eq!(queue.try_take(), None);
        queue.put(5);
        assert_eq!(queue.try_take(), Some(5));
        assert_eq!(queue.try_take(), None);
    }

    #[test]
    fn test_take_blocks_until_put() {
        let queue = Arc::new(CoalescingQueue::new());
        let consumer = {
            let queue = Arc::clone(&queue);
            thread::spawn(move || queue.take_latest())
        };

        thread::sleep(Duration::from_millis(50));
        queue.put("letter");
        assert_eq!(consumer.join().unwrap(), Some("letter"));
    }

    #[test]
    fn test_take_timeout_expires() {
        let queue: CoalescingQueue<u32> = CoalescingQueue::new();
        let start = Instant::now();
        assert_eq!(queue.take_timeout(Duration::from_millis(50)), None);
        assert!(start.elapsed() >= Duration::from_millis(50));
    }

    #[test]
    fn test_close_wakes_consumer() {
        let queue: Arc<CoalescingQueue<u32>> = Arc::new(CoalescingQueue::new());
        let consumer = {
            let queue = Arc::clone(&queue);
            thread::spawn(move || queue.take_latest())
        };

        thread::sleep(Duration::from_millis(50));
        queue.close();
        assert_eq!(consumer.join().unwrap(), None);
        assert!(queue.is_closed());
    }

    #[test]
    fn test_closed_queue_drops_pending() {
        let queue = CoalescingQueue::new();
        queue.put(1);
        queue.close();
        assert_eq!(queue.take_latest(), None);
    }
}
