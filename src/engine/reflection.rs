//! Tree reflection - from any buffer of a fiber to the committed host nodes
//! under it.

use crate::error::{ReconcilerError, Result};
use crate::types::{FiberId, HostInstance, WorkTag};

use super::fiber::{FiberArena, StateNode};

impl FiberArena {
    /// Topmost ancestor of `fiber`, if it is a host root.
    fn host_root_above(&self, fiber: FiberId) -> Result<Option<FiberId>> {
        let mut node = fiber;
        while let Some(parent) = self.get(node)?.return_fiber {
            node = parent;
        }
        Ok((self[node].tag == WorkTag::HostRoot).then_some(node))
    }

    /// The committed buffer of `fiber`.
    ///
    /// Walks up to the host root: if that root fiber is the root's current
    /// fiber, so is `fiber`; otherwise its alternate is.
    pub fn find_current_fiber(&self, fiber: FiberId) -> Result<FiberId> {
        let top = self
            .host_root_above(fiber)?
            .ok_or(ReconcilerError::UnmountedComponent)?;
        if self.root_of(top)?.current == top {
            return Ok(fiber);
        }
        // Only exists in the work-in-progress tree: not mounted yet.
        self[fiber].alternate.ok_or(ReconcilerError::UnmountedComponent)
    }

    /// First host fiber (element or text) in the committed subtree of `fiber`.
    pub fn find_current_host_fiber(&self, fiber: FiberId) -> Result<Option<FiberId>> {
        let current = self.find_current_fiber(fiber)?;
        Ok(self.find_host_fiber_below(current, true))
    }

    /// Like [`find_current_host_fiber`](Self::find_current_host_fiber), but
    /// never descends into portals.
    pub fn find_current_host_fiber_with_no_portals(&self, fiber: FiberId) -> Result<Option<FiberId>> {
        let current = self.find_current_fiber(fiber)?;
        Ok(self.find_host_fiber_below(current, false))
    }

    fn find_host_fiber_below(&self, start: FiberId, enter_portals: bool) -> Option<FiberId> {
        let mut node = start;
        loop {
            let fiber = &self[node];
            if fiber.tag.is_host() {
                return Some(node);
            }
            let descend = enter_portals || fiber.tag != WorkTag::HostPortal;
            if let (true, Some(child)) = (descend, fiber.child) {
                node = child;
                continue;
            }
            if node == start {
                return None;
            }
            while self[node].sibling.is_none() {
                match self[node].return_fiber {
                    Some(parent) if parent != start => node = parent,
                    _ => return None,
                }
            }
            node = self[node].sibling?;
        }
    }

    /// Host instance bound to a host fiber, if any.
    pub fn host_instance_of(&self, fiber: FiberId) -> Option<HostInstance> {
        match &self.get(fiber).ok()?.state_node {
            StateNode::Host(instance) => Some(*instance),
            _ => None,
        }
    }
}
