//! Reconciler facade - the surface a renderer is built on.
//!
//! Owns the fiber arena, the host, and the scheduler. Containers are created
//! here, top-level elements are queued here, and committed host nodes are
//! looked up from here.
//!
//! # Example
//!
//! ```ignore
//! let mut reconciler = Reconciler::new(MemoryHost::new(), RecordingScheduler::new());
//! let container = reconciler.host_mut().create_container();
//! let root = reconciler.create_container(container);
//!
//! reconciler.update_container(Some(Element::host("div", Props::new())), root, None, None)?;
//! ```

use tracing::debug;

use crate::config::ReconcilerConfig;
use crate::engine::{
    Element, FiberArena, RootState, StateNode, SubtreeContext, UpdateCallback, empty_context,
};
use crate::error::Result;
use crate::host::HostConfig;
use crate::state::WorkContext;
use crate::types::{ContainerInfo, FiberId, HostInstance, Priority, RootId, WorkTag};

use super::devtools::{DevToolsHook, FiberObserver};
use super::scheduler::Scheduler;

/// Computes the subtree context a root inherits from a parent component.
pub type ContextResolver = Box<dyn Fn(&FiberArena, FiberId) -> SubtreeContext>;

/// What sits at the top of a container.
#[derive(Debug, Clone)]
pub enum PublicRootInstance<P> {
    /// A host element, as the renderer exposes it.
    Host(P),
    /// Anything else: the fiber's state node as is.
    Component(StateNode),
}

// =============================================================================
// Reconciler
// =============================================================================

pub struct Reconciler<H: HostConfig, S: Scheduler> {
    host: H,
    scheduler: S,
    arena: FiberArena,
    config: ReconcilerConfig,
    devtools: DevToolsHook,
    context_resolver: Option<ContextResolver>,
}

impl<H: HostConfig, S: Scheduler> Reconciler<H, S> {
    pub fn new(host: H, scheduler: S) -> Self {
        Self::with_config(host, scheduler, ReconcilerConfig::default())
    }

    pub fn with_config(host: H, scheduler: S, config: ReconcilerConfig) -> Self {
        Self {
            host,
            scheduler,
            arena: FiberArena::with_config(&config),
            config,
            devtools: DevToolsHook::new(),
            context_resolver: None,
        }
    }

    /// Attach a development-tools observer.
    pub fn with_observer(mut self, observer: impl FiberObserver + 'static) -> Self {
        self.devtools.inject(Box::new(observer));
        self
    }

    pub fn inject_context_resolver(
        &mut self,
        resolver: impl Fn(&FiberArena, FiberId) -> SubtreeContext + 'static,
    ) {
        self.context_resolver = Some(Box::new(resolver));
    }

    pub fn host(&self) -> &H {
        &self.host
    }

    pub fn host_mut(&mut self) -> &mut H {
        &mut self.host
    }

    pub fn scheduler(&self) -> &S {
        &self.scheduler
    }

    pub fn scheduler_mut(&mut self) -> &mut S {
        &mut self.scheduler
    }

    pub fn arena(&self) -> &FiberArena {
        &self.arena
    }

    pub fn arena_mut(&mut self) -> &mut FiberArena {
        &mut self.arena
    }

    pub fn config(&self) -> &ReconcilerConfig {
        &self.config
    }

    /// Fresh traversal state for one render pass.
    pub fn new_work_context(&self) -> WorkContext<H> {
        WorkContext::new(&self.config)
    }

    // =========================================================================
    // Containers
    // =========================================================================

    pub fn create_container(&mut self, container_info: ContainerInfo) -> RootId {
        let root = self.arena.create_fiber_root(container_info);
        debug!(%root, container = container_info.0, "created container");
        root
    }

    /// Render `element` into `root`, or unmount it with `None`.
    pub fn update_container(
        &mut self,
        element: Option<Element>,
        root: RootId,
        parent_component: Option<FiberId>,
        callback: Option<UpdateCallback>,
    ) -> Result<()> {
        let current = self.arena.root(root)?.current;

        if self.config.diagnostics {
            if self.arena[current].alternate.is_none() {
                self.devtools.on_mount_container(&self.arena, root);
            } else if element.is_none() {
                self.devtools.on_unmount_container(&self.arena, root);
            } else {
                self.devtools.on_update_container(&self.arena, root);
            }
        }

        let context = self.context_for_subtree(parent_component);
        let record = self.arena.root_mut(root)?;
        if record.context.is_none() {
            record.context = Some(context);
        } else {
            record.pending_context = Some(context);
        }

        debug!(%root, unmount = element.is_none(), "updating container");
        self.schedule_top_level_update(current, element, callback)
    }

    /// Queue `{ element }` on a root fiber and hand it to the scheduler.
    pub fn schedule_top_level_update(
        &mut self,
        fiber: FiberId,
        element: Option<Element>,
        callback: Option<UpdateCallback>,
    ) -> Result<()> {
        let force_async = self.config.enable_async_subtree_api
            && element
                .as_ref()
                .and_then(|element| element.element_type.as_component())
                .is_some_and(|component| component.async_subtree);
        let priority = self.scheduler.priority_context(force_async);

        self.arena
            .add_top_level_update(fiber, RootState { element }, callback, priority)?;
        self.scheduler.schedule_update(&mut self.arena, fiber, priority);
        Ok(())
    }

    fn context_for_subtree(&self, parent_component: Option<FiberId>) -> SubtreeContext {
        match (parent_component, &self.context_resolver) {
            (Some(parent), Some(resolve)) => resolve(&self.arena, parent),
            _ => empty_context(),
        }
    }

    // =========================================================================
    // Lookups
    // =========================================================================

    /// The instance at the top of `root`, if anything is mounted.
    pub fn get_public_root_instance(
        &self,
        root: RootId,
    ) -> Result<Option<PublicRootInstance<H::PublicInstance>>> {
        let current = self.arena.root(root)?.current;
        let Some(child) = self.arena[current].child else {
            return Ok(None);
        };

        let fiber = &self.arena[child];
        let instance = match (fiber.tag, fiber.state_node.host_instance()) {
            (WorkTag::HostComponent, Some(instance)) => {
                PublicRootInstance::Host(self.host.get_public_instance(instance))
            }
            _ => PublicRootInstance::Component(fiber.state_node.clone()),
        };
        Ok(Some(instance))
    }

    /// First committed host node under `fiber`.
    pub fn find_host_instance(&self, fiber: FiberId) -> Result<Option<HostInstance>> {
        let host_fiber = self.arena.find_current_host_fiber(fiber)?;
        Ok(host_fiber.and_then(|found| self.arena.host_instance_of(found)))
    }

    /// Like [`find_host_instance`](Self::find_host_instance), ignoring
    /// anything rendered through a portal.
    pub fn find_host_instance_with_no_portals(&self, fiber: FiberId) -> Result<Option<HostInstance>> {
        let host_fiber = self.arena.find_current_host_fiber_with_no_portals(fiber)?;
        Ok(host_fiber.and_then(|found| self.arena.host_instance_of(found)))
    }

    /// Most urgent update queued on `root`.
    pub fn pending_priority(&self, root: RootId) -> Result<Priority> {
        let current = self.arena.root(root)?.current;
        Ok(self.arena.pending_update_priority(current))
    }

    // =========================================================================
    // Scheduling pass-through
    // =========================================================================

    pub fn batched_updates<R>(&mut self, f: impl FnOnce() -> R) -> R {
        self.scheduler.batched_updates(f)
    }

    pub fn unbatched_updates<R>(&mut self, f: impl FnOnce() -> R) -> R {
        self.scheduler.unbatched_updates(f)
    }

    pub fn deferred_updates<R>(&mut self, f: impl FnOnce() -> R) -> R {
        self.scheduler.deferred_updates(f)
    }

    pub fn flush_sync<R>(&mut self, f: impl FnOnce() -> R) -> R {
        self.scheduler.flush_sync(f)
    }

    // =========================================================================
    // Commit notifications
    // =========================================================================

    pub fn on_commit_root(&mut self, root: RootId) {
        self.devtools.on_commit_root(&self.arena, root);
    }

    pub fn on_commit_unmount(&mut self, fiber: FiberId) {
        self.devtools.on_commit_unmount(&self.arena, fiber);
    }
}
