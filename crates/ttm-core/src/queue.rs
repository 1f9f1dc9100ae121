//! Bounded relay queues
//!
//! Each direction gets one [`RelayQueue`] with exactly one producer (the
//! peer's receive task) and one consumer (the owner's transmit task).
//! Overflow evicts the oldest record: under load the gateway prefers recent
//! data over complete data.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use parking_lot::Mutex;
use tokio::sync::Notify;
use tracing::debug;

use crate::record::Record;

/// Default bound for each direction
pub const DEFAULT_QUEUE_CAPACITY: usize = 1024;

/// Capacity-limited FIFO of records with drop-oldest overflow
#[derive(Debug)]
pub struct RelayQueue {
    name: &'static str,
    capacity: usize,
    items: Mutex<VecDeque<Record>>,
    /// Wakes the consumer after each push
    available: Notify,
    dropped: AtomicU64,
}

impl RelayQueue {
    pub fn new(name: &'static str) -> Self {
        Self::with_capacity(name, DEFAULT_QUEUE_CAPACITY)
    }

    /// Create a queue with a custom bound (clamped to at least one entry)
    pub fn with_capacity(name: &'static str, capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            name,
            capacity,
            items: Mutex::new(VecDeque::with_capacity(capacity)),
            available: Notify::new(),
            dropped: AtomicU64::new(0),
        }
    }

    /// Append a record; returns the evicted oldest record on overflow
    pub fn push(&self, record: Record) -> Option<Record> {
        let evicted = {
            let mut items = self.items.lock();
            items.push_back(record);
            if items.len() > self.capacity {
                items.pop_front()
            } else {
                None
            }
        };

        if let Some(ref old) = evicted {
            let total = self.dropped.fetch_add(1, Ordering::Relaxed) + 1;
            debug!(
                queue = self.name,
                stream = old.stream_number(),
                total_dropped = total,
                "Queue full, evicted oldest record"
            );
        }

        self.available.notify_one();
        evicted
    }

    /// Remove the oldest record without waiting
    pub fn try_pop(&self) -> Option<Record> {
        self.items.lock().pop_front()
    }

    /// Wait until a record is available and remove it
    pub async fn pop(&self) -> Record {
        loop {
            if let Some(record) = self.try_pop() {
                return record;
            }
            // notify_one stores a permit when nobody is waiting, so a push
            // landing between try_pop and here is not lost
            self.available.notified().await;
        }
    }

    pub fn len(&self) -> usize {
        self.items.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.lock().is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Total records evicted by overflow since creation
    pub fn dropped(&self) -> u64 {
        self.dropped.load(Ordering::Relaxed)
    }

    pub fn name(&self) -> &'static str {
        self.name
    }
}

/// The two directional queues, shared by both endpoints
///
/// Endpoints only see queues, never each other.
#[derive(Debug, Clone)]
pub struct Relay {
    /// Mabx → TTM, drained by the TTM endpoint
    pub to_ttm: Arc<RelayQueue>,
    /// TTM → Mabx, drained by the Mabx endpoint
    pub to_mabx: Arc<RelayQueue>,
}

impl Relay {
    pub fn new(capacity: usize) -> Self {
        Self {
            to_ttm: Arc::new(RelayQueue::with_capacity("to_ttm", capacity)),
            to_mabx: Arc::new(RelayQueue::with_capacity("to_mabx", capacity)),
        }
    }
}

impl Default for Relay {
    fn default() -> Self {
        Self::new(DEFAULT_QUEUE_CAPACITY)
    }
}
