use crate::{
    sync::{Condvar, Mutex},
    types::NodeId,
};
use std::collections::VecDeque;

/// FIFO of nodes whose dependencies are all satisfied for the current cycle.
///
/// One mutex guards both the buffer and the `active` flag; one condition
/// variable wakes idle workers. FIFO order is a fairness property, not a
/// correctness requirement: it makes single-worker runs deterministic and
/// gives overlapping dequeues a stable tie-break.
///
/// Shutdown is `active = false` followed by a broadcast, so that every
/// waiter re-checks the predicate and drains out. Pushes also broadcast
/// rather than signal: a wake-up that finds the queue already drained by a
/// faster worker is absorbed by the wait loop.
pub(crate) struct ReadyQueue {
    state: Mutex<QueueState>,
    available: Condvar,
}

struct QueueState {
    items: VecDeque<NodeId>,
    active: bool,
}

impl ReadyQueue {
    /// Queue pre-sized to the graph's node count, the most that can ever be
    /// pending at once.
    pub(crate) fn with_capacity(capacity: usize) -> Self {
        Self {
            state: Mutex::new(QueueState {
                items: VecDeque::with_capacity(capacity),
                active: true,
            }),
            available: Condvar::new(),
        }
    }

    /// Append a ready node and wake the pool.
    ///
    /// The broadcast happens after the lock is released.
    pub(crate) fn push_back(&self, id: NodeId) {
        {
            let mut state = self.state.lock().expect("ReadyQueue::push_back");
            state.items.push_back(id);
        }
        self.available.notify_all();
    }

    /// Block until a node is ready or the engine shuts down.
    ///
    /// Returns `None` once the engine is inactive. Shutdown wins over
    /// pending items; items can only still be queued at that point when a
    /// panic aborted the cycle they belong to.
    pub(crate) fn pop_front_blocking(&self) -> Option<NodeId> {
        let mut state = self.state.lock().expect("ReadyQueue::pop_front_blocking");
        loop {
            if !state.active {
                return None;
            }
            if let Some(id) = state.items.pop_front() {
                return Some(id);
            }
            state = self
                .available
                .wait(state)
                .expect("ReadyQueue::pop_front_blocking: wait");
        }
    }

    /// Flip the engine inactive and wake every waiter.
    pub(crate) fn shutdown(&self) {
        {
            let mut state = self.state.lock().expect("ReadyQueue::shutdown");
            state.active = false;
        }
        self.available.notify_all();
    }
}
