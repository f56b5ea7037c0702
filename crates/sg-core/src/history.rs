//! Fixed-capacity ring buffer of recent event timestamps.
//!
//! The buffer answers the two questions the rate estimator asks for every
//! event: which timestamp is about to leave the window, and which timestamp
//! came immediately before the one being recorded. Slots that have never
//! been written are reported as `None` rather than as a zero timestamp, so
//! callers decide explicitly what an unfilled slot stands for.

use sg_common::{Error, Result, Timestamp};

/// What the buffer looked like around one `record` call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Window {
    /// Timestamp evicted by this write (`None` while the buffer is filling).
    pub oldest: Option<Timestamp>,
    /// Timestamp recorded just before this one (`None` on the first event).
    pub previous: Option<Timestamp>,
    /// Number of timestamps held after the write, capped at capacity.
    pub filled: usize,
}

/// Circular store of the most recent `capacity` timestamps.
#[derive(Debug, Clone)]
pub struct HistoryBuffer {
    slots: Vec<Option<Timestamp>>,
    write_index: usize,
    count: usize,
}

impl HistoryBuffer {
    /// Create an empty buffer. Capacity must be at least 2.
    pub fn new(capacity: usize) -> Result<Self> {
        if capacity < 2 {
            return Err(Error::InvalidConfig {
                field: "capacity".to_string(),
                message: format!("Must be at least 2, got {}", capacity),
            });
        }
        Ok(Self {
            slots: vec![None; capacity],
            write_index: 0,
            count: 0,
        })
    }

    /// Store `timestamp`, returning the evicted and preceding timestamps.
    ///
    /// Ordering is not checked here; the estimator rejects out-of-order
    /// timestamps before they reach the buffer.
    pub fn record(&mut self, timestamp: Timestamp) -> Window {
        let window = self.preview();
        self.slots[self.write_index] = Some(timestamp);
        self.write_index = (self.write_index + 1) % self.slots.len();
        self.count = window.filled;
        window
    }

    /// The [`Window`] the next `record` call will return, without writing.
    pub fn preview(&self) -> Window {
        Window {
            oldest: self.slots[self.write_index],
            previous: self.slots[self.previous_index()],
            filled: (self.count + 1).min(self.slots.len()),
        }
    }

    /// Most recently recorded timestamp.
    pub fn latest(&self) -> Option<Timestamp> {
        self.slots[self.previous_index()]
    }

    /// Timestamp the next `record` call will evict.
    pub fn next_eviction(&self) -> Option<Timestamp> {
        self.slots[self.write_index]
    }

    pub fn capacity(&self) -> usize {
        self.slots.len()
    }

    pub fn len(&self) -> usize {
        self.count
    }

    pub fn is_empty(&self) -> bool {
        self.count == 0
    }

    /// True once every slot holds a recorded timestamp.
    pub fn is_full(&self) -> bool {
        self.count == self.slots.len()
    }

    /// Recorded timestamps from oldest to newest.
    pub fn iter(&self) -> impl Iterator<Item = Timestamp> + '_ {
        let (head, tail) = if self.is_full() {
            (&self.slots[self.write_index..], &self.slots[..self.write_index])
        } else {
            (&self.slots[..self.count], &self.slots[..0])
        };
        head.iter().chain(tail.iter()).flatten().copied()
    }

    fn previous_index(&self) -> usize {
        let capacity = self.slots.len();
        (self.write_index + capacity - 1) % capacity
    }
}
