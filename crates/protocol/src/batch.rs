//! MessageBatch - Bounded message queue with atomic drain
//!
//! Many producers append concurrently while one owner periodically flushes.
//! A flush swaps the whole buffer out under the lock, so a message is handed
//! to exactly one drain call and messages appended during a drain land in
//! the fresh buffer.
//!
//! ```text
//! producers --enqueue--> [queue] --flush (swap)--> drain(Vec<Message>)
//! ```

use std::sync::atomic::{AtomicBool, Ordering};
use std::time::{Duration, Instant};

use parking_lot::{Condvar, Mutex};

use crate::message::Message;

/// Why a non-blocking append was refused
///
/// The message is handed back so the caller can flush and retry or route it
/// elsewhere.
#[derive(Debug)]
pub enum Rejected {
    /// Batch is at capacity
    Full(Message),
    /// Batch has been closed
    Closed(Message),
}

impl Rejected {
    /// Take back the rejected message
    pub fn into_message(self) -> Message {
        match self {
            Self::Full(msg) | Self::Closed(msg) => msg,
        }
    }

    /// Whether the batch refused because it is closed
    pub fn is_closed(&self) -> bool {
        matches!(self, Self::Closed(_))
    }
}

/// Result of closing a batch
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CloseOutcome {
    /// Messages handed to the final drain
    pub drained: usize,
    /// Messages left behind because the timeout expired
    pub lost: usize,
}

impl CloseOutcome {
    /// True when nothing was lost
    #[inline]
    pub fn is_complete(&self) -> bool {
        self.lost == 0
    }
}

/// Fixed-capacity, concurrency-safe message queue
pub struct MessageBatch {
    capacity: usize,
    queue: Mutex<Vec<Message>>,
    /// Signalled whenever a flush frees space or the batch closes
    space: Condvar,
    closed: AtomicBool,
    /// Serializes drains so close can wait for an in-flight flush
    flushing: Mutex<()>,
}

impl MessageBatch {
    /// Create a batch holding at most `capacity` messages (minimum 1)
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            capacity,
            queue: Mutex::new(Vec::with_capacity(capacity)),
            space: Condvar::new(),
            closed: AtomicBool::new(false),
            flushing: Mutex::new(()),
        }
    }

    /// Maximum number of queued messages
    #[inline]
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Number of queued messages
    pub fn len(&self) -> usize {
        self.queue.lock().len()
    }

    /// Whether nothing is queued
    pub fn is_empty(&self) -> bool {
        self.queue.lock().is_empty()
    }

    /// Whether the batch refuses new messages
    #[inline]
    pub fn is_closed(&self) -> bool {
        self.closed.load(Ordering::Acquire)
    }

    /// Append without blocking
    pub fn try_enqueue(&self, message: Message) -> Result<(), Rejected> {
        let mut queue = self.queue.lock();
        if self.is_closed() {
            return Err(Rejected::Closed(message));
        }
        if queue.len() >= self.capacity {
            return Err(Rejected::Full(message));
        }
        queue.push(message);
        Ok(())
    }

    /// Append, blocking while the batch is full
    ///
    /// Returns the message back if the batch is (or becomes) closed.
    pub fn enqueue(&self, message: Message) -> Result<(), Message> {
        let mut queue = self.queue.lock();
        loop {
            if self.is_closed() {
                return Err(message);
            }
            if queue.len() < self.capacity {
                queue.push(message);
                return Ok(());
            }
            self.space.wait(&mut queue);
        }
    }

    /// Swap out the current contents and hand them to `drain`
    ///
    /// `drain` is not called when the batch is empty. Returns the number of
    /// drained messages.
    pub fn flush<F>(&self, drain: F) -> usize
    where
        F: FnOnce(Vec<Message>),
    {
        let _guard = self.flushing.lock();
        self.drain_queued(drain)
    }

    /// Close the batch and perform a final drain
    ///
    /// Blocked producers are woken and get their message back. The whole
    /// close is bounded by `timeout`: waiting for a running flush and the
    /// final drain share one deadline. `drain` receives that deadline and
    /// returns how many of its messages it left unprocessed when the
    /// deadline passed; those, and everything still queued if the running
    /// flush outlasts `timeout`, are reported as lost.
    pub fn close<F>(&self, drain: F, timeout: Duration) -> CloseOutcome
    where
        F: FnOnce(Vec<Message>, Instant) -> usize,
    {
        let deadline = Instant::now() + timeout;
        {
            let _queue = self.queue.lock();
            self.closed.store(true, Ordering::Release);
        }
        self.space.notify_all();

        let Some(_guard) = self.flushing.try_lock_until(deadline) else {
            return CloseOutcome {
                drained: 0,
                lost: self.len(),
            };
        };

        let mut left = 0;
        let count = self.drain_queued(|messages| left = drain(messages, deadline));
        let lost = left.min(count);
        CloseOutcome {
            drained: count - lost,
            lost,
        }
    }

    /// Caller must hold `flushing`
    fn drain_queued<F>(&self, drain: F) -> usize
    where
        F: FnOnce(Vec<Message>),
    {
        let messages = {
            let mut queue = self.queue.lock();
            if queue.is_empty() {
                return 0;
            }
            std::mem::replace(&mut *queue, Vec::with_capacity(self.capacity))
        };
        self.space.notify_all();

        let count = messages.len();
        drain(messages);
        count
    }
}

impl Default for MessageBatch {
    fn default() -> Self {
        Self::new(crate::DEFAULT_BATCH_CAPACITY)
    }
}

impl std::fmt::Debug for MessageBatch {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MessageBatch")
            .field("capacity", &self.capacity)
            .field("len", &self.len())
            .field("closed", &self.is_closed())
            .finish()
    }
}
