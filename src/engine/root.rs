//! Root records.
//!
//! A root and its root fiber refer to each other: the root holds the id of
//! its current fiber, the fiber's state node holds the root id. Both live in
//! the arena so neither owns the other.

use std::any::Any;
use std::rc::Rc;

use crate::error::{ReconcilerError, Result};
use crate::types::{ContainerInfo, FiberId, InternalContext, RootId, WorkTag};

use super::fiber::{FiberArena, StateNode};

/// Top-level context propagated into a subtree.
pub type SubtreeContext = Rc<dyn Any>;

/// The context used when nothing above the subtree provides one.
pub fn empty_context() -> SubtreeContext {
    Rc::new(())
}

/// A mounted tree.
#[derive(Debug, Clone)]
pub struct FiberRoot {
    /// The currently committed root fiber.
    pub current: FiberId,
    /// Host container this root renders into.
    pub container_info: ContainerInfo,
    pub is_scheduled: bool,
    /// Next root in the scheduler's list of roots with pending work.
    pub next_scheduled_root: Option<RootId>,
    pub context: Option<SubtreeContext>,
    /// Context to apply on the next commit.
    pub pending_context: Option<SubtreeContext>,
}

impl FiberArena {
    /// A fiber for the root of a host tree.
    pub fn create_host_root_fiber(&mut self) -> FiberId {
        self.create_fiber(WorkTag::HostRoot, None, InternalContext::NO_CONTEXT)
    }

    /// Create a root record and its initial, empty root fiber.
    pub fn create_fiber_root(&mut self, container_info: ContainerInfo) -> RootId {
        let uninitialized = self.create_host_root_fiber();
        let root_id = RootId(self.roots.len() as u32);
        self.roots.push(FiberRoot {
            current: uninitialized,
            container_info,
            is_scheduled: false,
            next_scheduled_root: None,
            context: None,
            pending_context: None,
        });
        self[uninitialized].state_node = StateNode::Root(root_id);
        root_id
    }

    pub fn root(&self, id: RootId) -> Result<&FiberRoot> {
        self.roots
            .get(id.index())
            .ok_or(ReconcilerError::UnknownRoot(id))
    }

    pub fn root_mut(&mut self, id: RootId) -> Result<&mut FiberRoot> {
        self.roots
            .get_mut(id.index())
            .ok_or(ReconcilerError::UnknownRoot(id))
    }

    pub fn root_count(&self) -> usize {
        self.roots.len()
    }

    /// Root record behind a `HostRoot` fiber.
    pub fn root_of(&self, fiber: FiberId) -> Result<&FiberRoot> {
        match &self.get(fiber)?.state_node {
            StateNode::Root(root) => self.root(*root),
            _ => Err(ReconcilerError::InvariantViolation(
                "expected a host root fiber to point at its root",
            )),
        }
    }
}
