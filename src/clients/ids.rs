use std::sync::atomic::{AtomicU16, Ordering};

/// Source of transaction ids for outgoing queries.
///
/// Shared between concurrent queries, so implementations must be thread safe.
pub trait IdGenerator: Send + Sync {
    fn next_id(&self) -> u16;
}

/// Picks each id at random, making responses harder to spoof. The default.
#[derive(Debug, Default)]
pub struct RandomIds;

impl IdGenerator for RandomIds {
    fn next_id(&self) -> u16 {
        rand::random()
    }
}

/// Hands out ids in increasing order, wrapping at 65535. Mostly useful in
/// tests, where predictable ids are wanted.
#[derive(Debug, Default)]
pub struct SequentialIds {
    next: AtomicU16,
}

impl SequentialIds {
    pub fn starting_at(id: u16) -> SequentialIds {
        SequentialIds {
            next: AtomicU16::new(id),
        }
    }
}

impl IdGenerator for SequentialIds {
    fn next_id(&self) -> u16 {
        self.next.fetch_add(1, Ordering::Relaxed)
    }
}
