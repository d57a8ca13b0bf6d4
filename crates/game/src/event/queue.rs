use std::collections::VecDeque;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use super::types::NetworkEvent;

type SharedQueue = Arc<Mutex<VecDeque<NetworkEvent>>>;

#[derive(Debug, Clone)]
pub struct DispatchSender {
    queue: SharedQueue,
}

impl DispatchSender {
    pub fn send(&self, event: NetworkEvent) {
        lock(&self.queue).push_back(event);
    }
}

#[derive(Debug, Default)]
pub struct Dispatcher {
    queue: SharedQueue,
}

impl Dispatcher {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn sender(&self) -> DispatchSender {
        DispatchSender {
            queue: Arc::clone(&self.queue),
        }
    }

    // Swapped under the lock so a reused `out` stays allocation-free.
    pub fn drain_into(&self, out: &mut VecDeque<NetworkEvent>) {
        let mut queue = lock(&self.queue);
        if out.is_empty() {
            std::mem::swap(&mut *queue, out);
        } else {
            out.extend(queue.drain(..));
        }
    }

    pub fn len(&self) -> usize {
        lock(&self.queue).len()
    }

    pub fn is_empty(&self) -> bool {
        lock(&self.queue).is_empty()
    }

    pub fn clear(&self) {
        lock(&self.queue).clear();
    }
}

fn lock(queue: &Mutex<VecDeque<NetworkEvent>>) -> MutexGuard<'_, VecDeque<NetworkEvent>> {
    // A panicking producer cannot leave a VecDeque half-written.
    queue.lock().unwrap_or_else(PoisonError::into_inner)
}
