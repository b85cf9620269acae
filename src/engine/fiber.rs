//! Fiber records and the double-buffer arena.
//!
//! A fiber is work on a component that needs to be done or was done. There
//! can be at most two per component instance: the `current` one (last
//! committed) and its `alternate` (work in progress). The arena owns every
//! record; links between fibers are [`FiberId`]s.
//!
//! ```text
//! current:   Root ── child ──▶ App ── child ──▶ div ── sibling ──▶ span
//!              ▲ alternate      ▲ alternate
//!              ▼                ▼
//! work:      Root' ─ child ──▶ App'
//! ```
//!
//! Records are never freed. A cancelled work-in-progress buffer is simply
//! overwritten the next time [`FiberArena::create_work_in_progress`] runs on
//! its current fiber.

use std::any::Any;
use std::ops::{Index, IndexMut};
use std::rc::Rc;

use crate::config::ReconcilerConfig;
use crate::error::{ReconcilerError, Result};
use crate::types::{
    ContainerInfo, EffectTag, FiberId, HostInstance, InternalContext, Priority, RootId, WorkTag,
};

use super::element::{Coroutine, ElementType, Node, Props, RefHandle};
use super::root::FiberRoot;
use super::update_queue::UpdateQueue;

/// Opaque memoized state (component state, root state, ...).
pub type MemoizedState = Rc<dyn Any>;

// =============================================================================
// State node
// =============================================================================

/// What a fiber is bound to.
#[derive(Debug, Clone, Default)]
pub enum StateNode {
    #[default]
    None,
    /// Root fibers point back at their root record.
    Root(RootId),
    /// Host element or text node owned by the renderer.
    Host(HostInstance),
    Portal(PortalState),
    /// Component instance, opaque to the reconciler.
    Instance(Rc<dyn Any>),
}

impl StateNode {
    pub fn host_instance(&self) -> Option<HostInstance> {
        match self {
            StateNode::Host(instance) => Some(*instance),
            _ => None,
        }
    }

    pub fn root(&self) -> Option<RootId> {
        match self {
            StateNode::Root(root) => Some(*root),
            _ => None,
        }
    }
}

/// Container record of a portal fiber.
#[derive(Debug, Clone)]
pub struct PortalState {
    pub container_info: ContainerInfo,
    pub implementation: Option<Rc<dyn Any>>,
}

// =============================================================================
// Payload
// =============================================================================

/// Snapshot of a fiber's input, before (`pending_props`) or after
/// (`memoized_props`) processing.
#[derive(Debug, Clone)]
pub enum Payload {
    Props(Rc<Props>),
    Text(Rc<str>),
    /// Children of fragments and portals.
    Children(Rc<[Node]>),
    Coroutine(Rc<Coroutine>),
}

impl Payload {
    pub fn props(&self) -> Option<&Props> {
        match self {
            Payload::Props(props) => Some(props),
            Payload::Coroutine(coroutine) => Some(&coroutine.props),
            _ => None,
        }
    }

    pub fn text(&self) -> Option<&str> {
        match self {
            Payload::Text(text) => Some(text),
            _ => None,
        }
    }

    pub fn children(&self) -> Option<&[Node]> {
        match self {
            Payload::Children(children) => Some(children),
            Payload::Props(props) => Some(&props.children),
            Payload::Coroutine(coroutine) => Some(&coroutine.children),
            Payload::Text(_) => None,
        }
    }
}

// =============================================================================
// Fiber
// =============================================================================

/// One buffer of one component instance.
#[derive(Debug, Clone)]
pub struct Fiber {
    // Instance
    pub tag: WorkTag,
    pub key: Option<String>,
    pub element_type: Option<ElementType>,
    pub state_node: StateNode,

    // Tree
    pub return_fiber: Option<FiberId>,
    pub child: Option<FiberId>,
    pub sibling: Option<FiberId>,
    pub index: usize,

    pub ref_handle: Option<RefHandle>,

    pub pending_props: Option<Payload>,
    pub memoized_props: Option<Payload>,
    pub update_queue: Option<UpdateQueue>,
    pub memoized_state: Option<MemoizedState>,

    pub internal_context: InternalContext,

    // Effects
    pub effect_tag: EffectTag,
    pub next_effect: Option<FiberId>,
    pub first_effect: Option<FiberId>,
    pub last_effect: Option<FiberId>,

    pub pending_work_priority: Priority,

    pub alternate: Option<FiberId>,
}

impl Fiber {
    /// A zero-initialized fiber.
    pub fn new(tag: WorkTag, key: Option<String>, internal_context: InternalContext) -> Self {
        Self {
            tag,
            key,
            element_type: None,
            state_node: StateNode::None,
            return_fiber: None,
            child: None,
            sibling: None,
            index: 0,
            ref_handle: None,
            pending_props: None,
            memoized_props: None,
            update_queue: None,
            memoized_state: None,
            internal_context,
            effect_tag: EffectTag::NO_EFFECT,
            next_effect: None,
            first_effect: None,
            last_effect: None,
            pending_work_priority: Priority::NO_WORK,
            alternate: None,
        }
    }

    /// Host element name, for host component fibers.
    pub fn host_type(&self) -> Option<&str> {
        self.element_type.as_ref().and_then(ElementType::host_name)
    }
}

// =============================================================================
// Arena
// =============================================================================

/// Owner of every fiber and root record.
#[derive(Debug, Default)]
pub struct FiberArena {
    fibers: Vec<Fiber>,
    pub(crate) roots: Vec<FiberRoot>,
    pub(crate) diagnostics: bool,
}

impl FiberArena {
    pub fn new() -> Self {
        Self::with_config(&ReconcilerConfig::default())
    }

    pub fn with_config(config: &ReconcilerConfig) -> Self {
        Self {
            fibers: Vec::new(),
            roots: Vec::new(),
            diagnostics: config.diagnostics,
        }
    }

    /// Number of fiber records ever allocated.
    pub fn len(&self) -> usize {
        self.fibers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fibers.is_empty()
    }

    pub fn contains(&self, id: FiberId) -> bool {
        id.index() < self.fibers.len()
    }

    pub fn get(&self, id: FiberId) -> Result<&Fiber> {
        self.fibers
            .get(id.index())
            .ok_or(ReconcilerError::UnknownFiber(id))
    }

    pub fn get_mut(&mut self, id: FiberId) -> Result<&mut Fiber> {
        self.fibers
            .get_mut(id.index())
            .ok_or(ReconcilerError::UnknownFiber(id))
    }

    /// Allocate a zero-initialized fiber.
    pub fn create_fiber(
        &mut self,
        tag: WorkTag,
        key: Option<String>,
        internal_context: InternalContext,
    ) -> FiberId {
        self.insert(Fiber::new(tag, key, internal_context))
    }

    pub(crate) fn insert(&mut self, fiber: Fiber) -> FiberId {
        let id = FiberId(self.fibers.len() as u32);
        self.fibers.push(fiber);
        id
    }

    /// The other buffer of `id`, if one was ever created.
    pub fn alternate(&self, id: FiberId) -> Option<FiberId> {
        self.fibers.get(id.index()).and_then(|fiber| fiber.alternate)
    }

    /// Get (or lazily create) the work-in-progress buffer for `current`.
    ///
    /// Reuses `current.alternate` when it exists, resetting its effects.
    /// Otherwise allocates exactly one new record and pairs the two for good.
    pub fn create_work_in_progress(
        &mut self,
        current: FiberId,
        render_priority: Priority,
    ) -> Result<FiberId> {
        let source = self.get(current)?.clone();

        let work_in_progress = match source.alternate {
            Some(alternate) => {
                let wip = &mut self[alternate];
                wip.effect_tag = EffectTag::NO_EFFECT;
                // The effect list is no longer valid.
                wip.next_effect = None;
                wip.first_effect = None;
                wip.last_effect = None;
                alternate
            }
            None => {
                let mut wip = Fiber::new(source.tag, source.key.clone(), source.internal_context);
                wip.element_type = source.element_type.clone();
                wip.state_node = source.state_node.clone();
                wip.alternate = Some(current);
                let id = self.insert(wip);
                self[current].alternate = Some(id);
                id
            }
        };

        let wip = &mut self[work_in_progress];
        wip.pending_work_priority = render_priority;

        wip.child = source.child;
        wip.memoized_props = source.memoized_props;
        wip.memoized_state = source.memoized_state;
        wip.update_queue = source.update_queue;

        // Overridden by the parent's reconciliation.
        wip.sibling = source.sibling;
        wip.index = source.index;
        wip.ref_handle = source.ref_handle;

        Ok(work_in_progress)
    }

    /// Link `children` under `parent` in order: child, sibling chain, return
    /// pointers and indices.
    pub fn set_children(&mut self, parent: FiberId, children: &[FiberId]) -> Result<()> {
        self.get(parent)?;
        for &child in children {
            self.get(child)?;
        }

        self[parent].child = children.first().copied();
        for (index, &child) in children.iter().enumerate() {
            let fiber = &mut self[child];
            fiber.return_fiber = Some(parent);
            fiber.index = index;
            fiber.sibling = children.get(index + 1).copied();
        }
        Ok(())
    }

    /// Children of `parent`, following the sibling chain.
    pub fn children(&self, parent: FiberId) -> Vec<FiberId> {
        let mut children = Vec::new();
        let mut next = self.fibers.get(parent.index()).and_then(|f| f.child);
        while let Some(child) = next {
            children.push(child);
            next = self[child].sibling;
        }
        children
    }

    /// Append `effect` to the end of `parent`'s effect list.
    pub fn append_effect(&mut self, parent: FiberId, effect: FiberId) -> Result<()> {
        self.get(effect)?;
        match self.get(parent)?.last_effect {
            Some(last) => {
                self[last].next_effect = Some(effect);
                self[parent].last_effect = Some(effect);
            }
            None => {
                let fiber = &mut self[parent];
                fiber.first_effect = Some(effect);
                fiber.last_effect = Some(effect);
            }
        }
        Ok(())
    }

    /// Fibers on `parent`'s effect list, in order.
    pub fn effects(&self, parent: FiberId) -> Vec<FiberId> {
        let mut effects = Vec::new();
        let mut next = self.fibers.get(parent.index()).and_then(|f| f.first_effect);
        while let Some(effect) = next {
            effects.push(effect);
            next = self[effect].next_effect;
        }
        effects
    }
}

impl Index<FiberId> for FiberArena {
    type Output = Fiber;

    fn index(&self, id: FiberId) -> &Fiber {
        &self.fibers[id.index()]
    }
}

impl IndexMut<FiberId> for FiberArena {
    fn index_mut(&mut self, id: FiberId) -> &mut Fiber {
        &mut self.fibers[id.index()]
    }
}
