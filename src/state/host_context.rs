//! Host context stack.
//!
//! Tracks, per host depth, the root container and the environment context
//! the renderer derives for it. Three cursors on the shared [`FiberStack`]:
//!
//! - root instance: the container of the nearest root or portal
//! - context: the current host context
//! - context fiber: the fiber that pushed the current context
//!
//! A host component only pushes when its derived context is a different
//! `Rc` than its parent's, and only the fiber that pushed ever pops.

use std::rc::Rc;

use crate::engine::FiberArena;
use crate::error::{ReconcilerError, Result};
use crate::host::HostConfig;
use crate::types::{ContainerInfo, FiberId};

use super::stack::{Cursor, FiberStack};

pub struct HostContextStack<H: HostConfig> {
    context: Cursor<Option<Rc<H::HostContext>>>,
    context_fiber: Cursor<Option<FiberId>>,
    root_instance: Cursor<Option<ContainerInfo>>,
}

impl<H: HostConfig> Default for HostContextStack<H> {
    fn default() -> Self {
        Self::new()
    }
}

impl<H: HostConfig> HostContextStack<H> {
    pub fn new() -> Self {
        Self {
            context: Cursor::new(None),
            context_fiber: Cursor::new(None),
            root_instance: Cursor::new(None),
        }
    }

    /// Container of the nearest root or portal being worked on.
    pub fn get_root_host_container(&self) -> Result<ContainerInfo> {
        self.root_instance
            .current()
            .ok_or(ReconcilerError::MissingHostContext)
    }

    pub fn get_host_context(&self) -> Result<Rc<H::HostContext>> {
        self.context
            .current()
            .clone()
            .ok_or(ReconcilerError::MissingHostContext)
    }

    /// Fiber that pushed the current context, if any.
    pub fn context_fiber(&self) -> Option<FiberId> {
        *self.context_fiber.current()
    }

    /// Enter a root or portal: push its container and root context.
    pub fn push_host_container(
        &mut self,
        stack: &mut FiberStack,
        host: &H,
        fiber: FiberId,
        next_root_instance: ContainerInfo,
    ) {
        // Saving the previous root lets portals restore it when popped.
        stack.push(&mut self.root_instance, Some(next_root_instance), fiber);

        let next_root_context = host.get_root_host_context(next_root_instance);

        stack.push(&mut self.context_fiber, Some(fiber), fiber);
        stack.push(&mut self.context, Some(next_root_context), fiber);
    }

    pub fn pop_host_container(&mut self, stack: &mut FiberStack, fiber: FiberId) {
        stack.pop(&mut self.context, fiber);
        stack.pop(&mut self.context_fiber, fiber);
        stack.pop(&mut self.root_instance, fiber);
    }

    /// Enter a host component: push its context if it differs from the
    /// parent's.
    pub fn push_host_context(
        &mut self,
        stack: &mut FiberStack,
        host: &H,
        arena: &FiberArena,
        fiber: FiberId,
    ) -> Result<()> {
        let root_instance = self.get_root_host_container()?;
        let context = self.get_host_context()?;
        let element_type = arena.get(fiber)?.host_type();
        let next_context = host.get_child_host_context(&context, element_type, root_instance);

        if Rc::ptr_eq(&context, &next_context) {
            return Ok(());
        }

        stack.push(&mut self.context_fiber, Some(fiber), fiber);
        stack.push(&mut self.context, Some(next_context), fiber);
        Ok(())
    }

    /// Leave a host component. No-op unless `fiber` pushed the current
    /// context.
    pub fn pop_host_context(&mut self, stack: &mut FiberStack, fiber: FiberId) {
        if *self.context_fiber.current() != Some(fiber) {
            return;
        }

        stack.pop(&mut self.context, fiber);
        stack.pop(&mut self.context_fiber, fiber);
    }

    /// Forget every context. Used when a pass is abandoned or finished.
    pub fn reset_host_container(&mut self) {
        self.context.reset_to(None);
        self.context_fiber.reset_to(None);
        self.root_instance.reset_to(None);
    }
}
