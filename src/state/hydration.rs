//! Hydration - adopting a host tree rendered before we got here.
//!
//! While the work loop walks fibers depth-first, this machine walks the
//! existing host tree in lockstep, one lookahead node at a time:
//!
//! ```text
//!                enter(root)
//!   Idle ───────────────────────▶ Hydrating ◀──────────┐
//!    ▲                              │    │              │ pop(inserted fiber)
//!    │ reset                  claim │    │ claim: no    │
//!    │                        match │    │ match        │
//!    │                              ▼    ▼              │
//!    └─────────────────────── (descend)  Exhausted ─────┘
//! ```
//!
//! - claim binds a host fiber to the lookahead node (or to the node after it,
//!   scheduling the skipped one for deletion), or falls back to insertion
//! - pop deletes unmatched leftovers under a hydrated fiber, then moves the
//!   lookahead to the sibling after that fiber's node
//! - entering at a portal saves the outer position; popping the portal
//!   restores it, so siblings after the portal keep hydrating
//!
//! Every host node is claimed at most once and deleted at most once.

use tracing::{debug, trace};

use crate::config::ReconcilerConfig;
use crate::engine::{FiberArena, Props, StateNode, UpdateQueue};
use crate::error::{ReconcilerError, Result};
use crate::host::{HostConfig, HydrationHooks};
use crate::types::{ContainerInfo, EffectTag, FiberId, HostInstance, HostParent, WorkTag};

/// Host elements that commonly hold unrelated markup; leftovers under them
/// are never deleted.
const EXEMPT_ELEMENTS: [&str; 2] = ["head", "body"];

/// Observable phase of the machine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HydrationPhase {
    /// No hydration context.
    Idle,
    /// Matching fibers against the lookahead node.
    Hydrating,
    /// The current hydration parent was inserted; its subtree is new content.
    Exhausted,
}

/// Outer position saved while a portal hydrates its own container.
#[derive(Debug, Clone, Copy)]
struct SavedPosition {
    portal: FiberId,
    hydration_parent_fiber: Option<FiberId>,
    next_hydratable_instance: Option<HostInstance>,
    is_hydrating: bool,
}

#[derive(Debug, Clone, Default)]
pub struct HydrationContext {
    /// The deepest fiber on the stack involved in a hydration context. This
    /// may have been an insertion or a hydration.
    hydration_parent_fiber: Option<FiberId>,
    next_hydratable_instance: Option<HostInstance>,
    is_hydrating: bool,
    /// Innermost portal last.
    portals: Vec<SavedPosition>,
    diagnostics: bool,
}

impl HydrationContext {
    pub fn new() -> Self {
        Self::with_config(&ReconcilerConfig::default())
    }

    pub fn with_config(config: &ReconcilerConfig) -> Self {
        Self {
            diagnostics: config.diagnostics,
            ..Self::default()
        }
    }

    pub fn phase(&self) -> HydrationPhase {
        match (self.is_hydrating, self.hydration_parent_fiber) {
            (true, _) => HydrationPhase::Hydrating,
            (false, Some(_)) => HydrationPhase::Exhausted,
            (false, None) => HydrationPhase::Idle,
        }
    }

    pub fn is_hydrating(&self) -> bool {
        self.is_hydrating
    }

    pub fn hydration_parent_fiber(&self) -> Option<FiberId> {
        self.hydration_parent_fiber
    }

    pub fn next_hydratable_instance(&self) -> Option<HostInstance> {
        self.next_hydratable_instance
    }

    // =========================================================================
    // Enter / reset
    // =========================================================================

    /// Start hydrating under a root or portal fiber.
    ///
    /// Returns false when the renderer has no hydration support or the fiber
    /// has no backing container. A portal saves the current position, which
    /// its [`pop_hydration_state`](Self::pop_hydration_state) restores.
    pub fn enter_hydration_state<H: HostConfig>(
        &mut self,
        arena: &FiberArena,
        host: &H,
        fiber: FiberId,
    ) -> bool {
        let Some(hooks) = host.hydration() else {
            return false;
        };
        let Some(container) = container_of(arena, fiber) else {
            return false;
        };

        if arena[fiber].tag == WorkTag::HostPortal {
            self.portals.push(SavedPosition {
                portal: fiber,
                hydration_parent_fiber: self.hydration_parent_fiber,
                next_hydratable_instance: self.next_hydratable_instance,
                is_hydrating: self.is_hydrating,
            });
        }

        self.next_hydratable_instance =
            hooks.get_first_hydratable_child(HostParent::Container(container));
        self.hydration_parent_fiber = Some(fiber);
        self.is_hydrating = true;
        debug!(%fiber, first = ?self.next_hydratable_instance, "entered hydration");
        true
    }

    pub fn reset_hydration_state(&mut self) {
        self.hydration_parent_fiber = None;
        self.next_hydratable_instance = None;
        self.is_hydrating = false;
        self.portals.clear();
    }

    // =========================================================================
    // Claim
    // =========================================================================

    /// Bind a host fiber to the next matching host node, or mark it for
    /// insertion.
    pub fn try_to_claim_next_hydratable_instance<H: HostConfig>(
        &mut self,
        arena: &mut FiberArena,
        host: &H,
        fiber: FiberId,
    ) -> Result<()> {
        arena.get(fiber)?;
        if !self.is_hydrating {
            return Ok(());
        }
        let Some(hooks) = host.hydration() else {
            return Ok(());
        };

        let Some(first) = self.next_hydratable_instance else {
            // Nothing left to hydrate. Make it an insertion.
            self.insert_non_hydrated_instance(arena, hooks, fiber);
            return Ok(());
        };

        let mut claimed = first;
        if !can_hydrate(arena, hooks, fiber, first) {
            // One spurious node is tolerated: try the one after it.
            match hooks.get_next_hydratable_sibling(first) {
                Some(next) if can_hydrate(arena, hooks, fiber, next) => {
                    // The first one was superfluous. It cannot be removed
                    // eagerly, so schedule its deletion.
                    if let Some(parent) = self.hydration_parent_fiber {
                        self.delete_hydratable_instance(arena, hooks, parent, first)?;
                    }
                    claimed = next;
                }
                _ => {
                    self.insert_non_hydrated_instance(arena, hooks, fiber);
                    return Ok(());
                }
            }
        }

        trace!(%fiber, instance = claimed.0, "claimed host instance");
        arena[fiber].state_node = StateNode::Host(claimed);
        self.hydration_parent_fiber = Some(fiber);
        self.next_hydratable_instance = hooks.get_first_hydratable_child(HostParent::Instance(claimed));
        Ok(())
    }

    fn insert_non_hydrated_instance<C>(
        &mut self,
        arena: &mut FiberArena,
        hooks: &dyn HydrationHooks<C>,
        fiber: FiberId,
    ) {
        arena[fiber].effect_tag |= EffectTag::PLACEMENT;

        if self.diagnostics {
            // Insertions straight into the root are not reported: without
            // hydration everything is inserted there.
            let parent = self
                .hydration_parent_fiber
                .filter(|&parent| arena[parent].tag == WorkTag::HostComponent)
                .and_then(|parent| arena[parent].state_node.host_instance());
            if let Some(parent) = parent {
                let parent = HostParent::Instance(parent);
                let inserted = &arena[fiber];
                match inserted.tag {
                    WorkTag::HostComponent => {
                        let empty = Props::default();
                        let props = inserted.pending_props.as_ref().and_then(|p| p.props()).unwrap_or(&empty);
                        hooks.did_not_find_hydratable_instance(parent, inserted.host_type().unwrap_or_default(), props);
                    }
                    WorkTag::HostText => {
                        let text = inserted.pending_props.as_ref().and_then(|p| p.text()).unwrap_or_default();
                        hooks.did_not_find_hydratable_text_instance(parent, text);
                    }
                    _ => {}
                }
            }
        }

        trace!(%fiber, "no hydratable instance, inserting");
        self.is_hydrating = false;
        self.hydration_parent_fiber = Some(fiber);
    }

    fn delete_hydratable_instance<C>(
        &self,
        arena: &mut FiberArena,
        hooks: &dyn HydrationHooks<C>,
        return_fiber: FiberId,
        instance: HostInstance,
    ) -> Result<()> {
        arena.get(return_fiber)?;
        if self.diagnostics {
            if let Some(parent) = host_parent_of(arena, return_fiber) {
                hooks.did_not_hydrate_instance(parent, instance);
            }
        }

        let child_to_delete = arena.create_fiber_from_host_instance_for_deletion();
        let deletion = &mut arena[child_to_delete];
        deletion.state_node = StateNode::Host(instance);
        deletion.return_fiber = Some(return_fiber);
        deletion.effect_tag = EffectTag::DELETION;

        // Not part of the reconciled children: if the pass is redone, these
        // nodes are still in the host tree and get scheduled again.
        arena.append_effect(return_fiber, child_to_delete)?;
        trace!(parent = %return_fiber, instance = instance.0, "scheduled deletion");
        Ok(())
    }

    // =========================================================================
    // Prepare
    // =========================================================================

    /// Adopt the host node claimed by an element fiber. Returns true when the
    /// node needs an update, whose payload is stored as the fiber's update
    /// queue.
    pub fn prepare_to_hydrate_host_instance<H: HostConfig>(
        &self,
        arena: &mut FiberArena,
        host: &H,
        fiber: FiberId,
        root_container: ContainerInfo,
        host_context: &H::HostContext,
    ) -> Result<bool> {
        let hooks = host.hydration().ok_or(ReconcilerError::InvariantViolation(
            "prepare_to_hydrate_host_instance called without hydration support",
        ))?;

        let target = arena.get(fiber)?;
        let instance = target.state_node.host_instance().ok_or(ReconcilerError::InvariantViolation(
            "hydrated fiber has no host instance",
        ))?;
        let empty = Props::default();
        let props = target.memoized_props.as_ref().and_then(|p| p.props()).unwrap_or(&empty);
        let element_type = target.host_type().unwrap_or_default();

        let update_payload =
            hooks.hydrate_instance(instance, element_type, props, root_container, host_context, fiber);

        let needs_update = update_payload.is_some();
        arena[fiber].update_queue = update_payload.map(|payload| UpdateQueue::HostPayload(payload.into()));
        Ok(needs_update)
    }

    /// Adopt the text node claimed by a text fiber. Returns true when its
    /// content must be updated.
    pub fn prepare_to_hydrate_host_text_instance<H: HostConfig>(
        &self,
        arena: &FiberArena,
        host: &H,
        fiber: FiberId,
    ) -> Result<bool> {
        let hooks = host.hydration().ok_or(ReconcilerError::InvariantViolation(
            "prepare_to_hydrate_host_text_instance called without hydration support",
        ))?;

        let target = arena.get(fiber)?;
        let instance = target.state_node.host_instance().ok_or(ReconcilerError::InvariantViolation(
            "hydrated fiber has no host instance",
        ))?;
        let text = target.memoized_props.as_ref().and_then(|p| p.text()).unwrap_or_default();
        Ok(hooks.hydrate_text_instance(instance, text, fiber))
    }

    // =========================================================================
    // Pop
    // =========================================================================

    /// Leave `fiber` on the way back up. Returns true when `fiber` was
    /// hydrated and its host node can be reused.
    pub fn pop_hydration_state<H: HostConfig>(
        &mut self,
        arena: &mut FiberArena,
        host: &H,
        fiber: FiberId,
    ) -> Result<bool> {
        arena.get(fiber)?;
        let Some(hooks) = host.hydration() else {
            return Ok(false);
        };

        if self.portals.last().is_some_and(|saved| saved.portal == fiber) {
            return self.pop_portal(arena, host, hooks, fiber);
        }

        if self.hydration_parent_fiber != Some(fiber) {
            // Deeper than the current hydration context, inside an inserted
            // tree.
            return Ok(false);
        }

        if !self.is_hydrating {
            // This fiber was an insertion; re-enter hydration for its
            // siblings.
            self.pop_to_next_host_parent(arena, fiber);
            self.is_hydrating = true;
            return Ok(false);
        }

        self.delete_leftovers(arena, host, hooks, fiber)?;

        self.pop_to_next_host_parent(arena, fiber);
        self.next_hydratable_instance = match self.hydration_parent_fiber {
            Some(_) => arena[fiber]
                .state_node
                .host_instance()
                .and_then(|instance| hooks.get_next_hydratable_sibling(instance)),
            None => None,
        };
        Ok(true)
    }

    /// Leave a portal that entered hydration: clean up its container, then
    /// resume the outer tree where it was left.
    fn pop_portal<H: HostConfig>(
        &mut self,
        arena: &mut FiberArena,
        host: &H,
        hooks: &dyn HydrationHooks<H::HostContext>,
        fiber: FiberId,
    ) -> Result<bool> {
        let hydrated = self.is_hydrating && self.hydration_parent_fiber == Some(fiber);
        if hydrated {
            self.delete_leftovers(arena, host, hooks, fiber)?;
        }

        if let Some(saved) = self.portals.pop() {
            self.hydration_parent_fiber = saved.hydration_parent_fiber;
            self.next_hydratable_instance = saved.next_hydratable_instance;
            self.is_hydrating = saved.is_hydrating;
        }
        debug!(%fiber, next = ?self.next_hydratable_instance, "left portal hydration");
        Ok(hydrated)
    }

    fn delete_leftovers<H: HostConfig>(
        &self,
        arena: &mut FiberArena,
        host: &H,
        hooks: &dyn HydrationHooks<H::HostContext>,
        fiber: FiberId,
    ) -> Result<()> {
        if !should_delete_leftovers(arena, host, fiber) {
            return Ok(());
        }
        let mut next = self.next_hydratable_instance;
        while let Some(instance) = next {
            self.delete_hydratable_instance(arena, hooks, fiber, instance)?;
            next = hooks.get_next_hydratable_sibling(instance);
        }
        Ok(())
    }

    fn pop_to_next_host_parent(&mut self, arena: &FiberArena, fiber: FiberId) {
        let mut parent = arena[fiber].return_fiber;
        while let Some(candidate) = parent {
            match arena[candidate].tag {
                WorkTag::HostComponent | WorkTag::HostRoot => break,
                // A portal that entered hydration is the host parent of its
                // children.
                WorkTag::HostPortal if self.portals.iter().any(|saved| saved.portal == candidate) => break,
                WorkTag::IndeterminateComponent
                | WorkTag::ClassComponent
                | WorkTag::HostPortal
                | WorkTag::HostText
                | WorkTag::CoroutineComponent
                | WorkTag::YieldComponent
                | WorkTag::Fragment => parent = arena[candidate].return_fiber,
            }
        }
        self.hydration_parent_fiber = parent;
    }
}

// =============================================================================
// Helpers
// =============================================================================

fn container_of(arena: &FiberArena, fiber: FiberId) -> Option<ContainerInfo> {
    match &arena.get(fiber).ok()?.state_node {
        StateNode::Root(root) => arena.root(*root).ok().map(|root| root.container_info),
        StateNode::Portal(portal) => Some(portal.container_info),
        StateNode::None | StateNode::Host(_) | StateNode::Instance(_) => None,
    }
}

fn host_parent_of(arena: &FiberArena, fiber: FiberId) -> Option<HostParent> {
    match arena[fiber].tag {
        WorkTag::HostRoot | WorkTag::HostPortal => container_of(arena, fiber).map(HostParent::Container),
        WorkTag::HostComponent => arena[fiber].state_node.host_instance().map(HostParent::Instance),
        _ => None,
    }
}

fn can_hydrate<C>(
    arena: &FiberArena,
    hooks: &dyn HydrationHooks<C>,
    fiber: FiberId,
    instance: HostInstance,
) -> bool {
    let fiber = &arena[fiber];
    match fiber.tag {
        WorkTag::HostComponent => {
            let empty = Props::default();
            let props = fiber.pending_props.as_ref().and_then(|p| p.props()).unwrap_or(&empty);
            match fiber.host_type() {
                Some(element_type) => hooks.can_hydrate_instance(instance, element_type, props),
                None => false,
            }
        }
        WorkTag::HostText => {
            let text = fiber.pending_props.as_ref().and_then(|p| p.text()).unwrap_or_default();
            hooks.can_hydrate_text_instance(instance, text)
        }
        WorkTag::IndeterminateComponent
        | WorkTag::ClassComponent
        | WorkTag::HostRoot
        | WorkTag::HostPortal
        | WorkTag::CoroutineComponent
        | WorkTag::YieldComponent
        | WorkTag::Fragment => false,
    }
}

/// Leftovers are only deleted below `head`/`body`, and never under an
/// element whose content is plain text.
fn should_delete_leftovers<H: HostConfig>(arena: &FiberArena, host: &H, fiber: FiberId) -> bool {
    let fiber = &arena[fiber];
    if fiber.tag != WorkTag::HostComponent {
        return true;
    }
    let Some(element_type) = fiber.host_type() else {
        return true;
    };
    if EXEMPT_ELEMENTS.contains(&element_type) {
        return false;
    }
    let empty = Props::default();
    let props = fiber.memoized_props.as_ref().and_then(|p| p.props()).unwrap_or(&empty);
    !host.should_set_text_content(element_type, props)
}
