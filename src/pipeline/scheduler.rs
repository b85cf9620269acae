//! Scheduler seam - the work loop the facade hands updates to.
//!
//! The reconciler only queues updates; when and how they are rendered is the
//! scheduler's business. Batching helpers default to running the closure
//! immediately.

use crate::engine::FiberArena;
use crate::types::{FiberId, Priority};

pub trait Scheduler {
    /// A fiber has new work at `priority`.
    fn schedule_update(&mut self, arena: &mut FiberArena, fiber: FiberId, priority: Priority);

    /// Priority for a new update.
    fn priority_context(&self, force_async: bool) -> Priority {
        if force_async {
            Priority::LOW
        } else {
            Priority::SYNCHRONOUS
        }
    }

    fn batched_updates<R>(&mut self, f: impl FnOnce() -> R) -> R {
        f()
    }

    fn unbatched_updates<R>(&mut self, f: impl FnOnce() -> R) -> R {
        f()
    }

    fn deferred_updates<R>(&mut self, f: impl FnOnce() -> R) -> R {
        f()
    }

    fn flush_sync<R>(&mut self, f: impl FnOnce() -> R) -> R {
        f()
    }
}

/// Records scheduled work instead of performing it.
///
/// Useful for renderers that drive their own loop, and in tests.
#[derive(Debug, Clone, Default)]
pub struct RecordingScheduler {
    scheduled: Vec<(FiberId, Priority)>,
}

impl RecordingScheduler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Every `(fiber, priority)` scheduled so far, oldest first.
    pub fn scheduled(&self) -> &[(FiberId, Priority)] {
        &self.scheduled
    }

    /// Drain the record.
    pub fn take_scheduled(&mut self) -> Vec<(FiberId, Priority)> {
        std::mem::take(&mut self.scheduled)
    }
}

impl Scheduler for RecordingScheduler {
    fn schedule_update(&mut self, _arena: &mut FiberArena, fiber: FiberId, priority: Priority) {
        self.scheduled.push((fiber, priority));
    }
}
