//! Deferred lifecycle requests collected during a tick.
//!
//! Agents never add or erase live agents directly. They append to the two
//! buffers here (additions and removals), and the registry applies both
//! between ticks: removals first, then additions, each in FIFO order.
//!
//! The buffers sit behind their own mutex, separate from the engine's
//! play/pause handshake, so any thread holding a handle may enqueue. Only
//! the engine thread drains.
//!
//! Identifier issuance lives here too: an agent naming its offspring during
//! `act` only has shared access to the queue, and identifiers must be unique
//! across every thread that can enqueue.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Mutex, MutexGuard, PoisonError};

use terrarium_types::AgentId;

use crate::agent::PendingAgent;

/// First identifier handed out by a fresh queue.
pub const FIRST_AGENT_ID: u64 = 1;

#[derive(Debug, Default)]
struct Buffers {
    additions: Vec<PendingAgent>,
    removals: Vec<AgentId>,
}

/// The two pending-mutation buffers plus the identifier counter.
#[derive(Debug)]
pub struct MutationQueue {
    next_id: AtomicU64,
    buffers: Mutex<Buffers>,
}

/// Contents of the queue at drain time.
#[derive(Debug, Default)]
pub struct DrainedMutations {
    /// Removal requests in the order they were made.
    pub removals: Vec<AgentId>,
    /// Pending agents in the order they were enqueued.
    pub additions: Vec<PendingAgent>,
}

impl Default for MutationQueue {
    fn default() -> Self {
        Self::new()
    }
}

impl MutationQueue {
    /// Create an empty queue whose first issued identifier is
    /// [`FIRST_AGENT_ID`].
    pub const fn new() -> Self {
        Self {
            next_id: AtomicU64::new(FIRST_AGENT_ID),
            buffers: Mutex::new(Buffers {
                additions: Vec::new(),
                removals: Vec::new(),
            }),
        }
    }

    fn lock(&self) -> MutexGuard<'_, Buffers> {
        // A panic while holding the lock cannot leave the buffers half
        // written: every critical section is a single push or a swap.
        self.buffers.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Hand out the next identifier. Identifiers are never reused.
    pub fn issue_id(&self) -> AgentId {
        AgentId(self.next_id.fetch_add(1, Ordering::Relaxed))
    }

    /// Append a pending addition.
    pub fn push_addition(&self, pending: PendingAgent) {
        self.lock().additions.push(pending);
    }

    /// Append a removal request. Duplicates are kept; removal is idempotent
    /// at drain time.
    pub fn push_removal(&self, id: AgentId) {
        self.lock().removals.push(id);
    }

    /// Whether a removal of `id` has already been requested.
    pub fn is_removal_pending(&self, id: AgentId) -> bool {
        self.lock().removals.contains(&id)
    }

    /// Number of queued (additions, removals).
    pub fn pending_counts(&self) -> (usize, usize) {
        let buffers = self.lock();
        (buffers.additions.len(), buffers.removals.len())
    }

    /// Take everything queued, leaving both buffers empty.
    pub fn take(&self) -> DrainedMutations {
        let mut buffers = self.lock();
        DrainedMutations {
            removals: std::mem::take(&mut buffers.removals),
            additions: std::mem::take(&mut buffers.additions),
        }
    }
}
