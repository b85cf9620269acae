//! In-memory host - a tiny renderer-owned tree.
//!
//! Nodes are indices into a flat array (the same ECS-style layout the rest of
//! the crate uses for fibers). Handy as a reference renderer and for driving
//! hydration without a real backend.
//!
//! ```ignore
//! let mut host = MemoryHost::new();
//! let container = host.create_container();
//! let div = host.append_element(HostParent::Container(container), "div");
//! host.append_text(HostParent::Instance(div), "hello");
//! ```

use std::cell::RefCell;
use std::collections::BTreeMap;
use std::rc::Rc;

use crate::engine::{Props, UpdatePayload};
use crate::types::{ContainerInfo, FiberId, HostInstance, HostParent};

use super::{HostConfig, HydrationHooks};

// =============================================================================
// Nodes
// =============================================================================

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MemoryNodeKind {
    Container,
    Element(String),
    Text(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MemoryNode {
    pub kind: MemoryNodeKind,
    pub attributes: BTreeMap<String, String>,
    pub children: Vec<HostInstance>,
    pub parent: Option<usize>,
}

/// Host context: the namespace elements are created in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Namespace {
    Html,
    Svg,
}

/// Everything the hydration hooks were told or asked to do.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HydrationEvent {
    DidNotHydrate { parent: HostParent, instance: HostInstance },
    DidNotFindInstance { parent: HostParent, element_type: String },
    DidNotFindText { parent: HostParent, text: String },
    Hydrated(HostInstance),
    HydratedText(HostInstance),
}

// =============================================================================
// MemoryHost
// =============================================================================

pub struct MemoryHost {
    nodes: Vec<MemoryNode>,
    events: RefCell<Vec<HydrationEvent>>,
    supports_hydration: bool,
    html: Rc<Namespace>,
    svg: Rc<Namespace>,
}

impl Default for MemoryHost {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryHost {
    pub fn new() -> Self {
        Self {
            nodes: Vec::new(),
            events: RefCell::new(Vec::new()),
            supports_hydration: true,
            html: Rc::new(Namespace::Html),
            svg: Rc::new(Namespace::Svg),
        }
    }

    /// A host whose renderer has no hydration support.
    pub fn without_hydration() -> Self {
        Self {
            supports_hydration: false,
            ..Self::new()
        }
    }

    pub fn create_container(&mut self) -> ContainerInfo {
        ContainerInfo(self.push(MemoryNodeKind::Container, None))
    }

    pub fn append_element(&mut self, parent: HostParent, name: &str) -> HostInstance {
        self.append(parent, MemoryNodeKind::Element(name.to_string()))
    }

    pub fn append_text(&mut self, parent: HostParent, text: &str) -> HostInstance {
        self.append(parent, MemoryNodeKind::Text(text.to_string()))
    }

    pub fn set_attribute(&mut self, instance: HostInstance, name: &str, value: &str) {
        if let Some(node) = self.nodes.get_mut(instance.0) {
            node.attributes.insert(name.to_string(), value.to_string());
        }
    }

    pub fn node(&self, instance: HostInstance) -> Option<&MemoryNode> {
        self.nodes.get(instance.0)
    }

    /// Recorded hydration events, oldest first.
    pub fn events(&self) -> Vec<HydrationEvent> {
        self.events.borrow().clone()
    }

    pub fn clear_events(&self) {
        self.events.borrow_mut().clear();
    }

    fn append(&mut self, parent: HostParent, kind: MemoryNodeKind) -> HostInstance {
        let parent_index = parent_index(parent);
        let index = self.push(kind, Some(parent_index));
        if let Some(parent) = self.nodes.get_mut(parent_index) {
            parent.children.push(HostInstance(index));
        }
        HostInstance(index)
    }

    fn push(&mut self, kind: MemoryNodeKind, parent: Option<usize>) -> usize {
        self.nodes.push(MemoryNode {
            kind,
            attributes: BTreeMap::new(),
            children: Vec::new(),
            parent,
        });
        self.nodes.len() - 1
    }

    fn record(&self, event: HydrationEvent) {
        self.events.borrow_mut().push(event);
    }
}

fn parent_index(parent: HostParent) -> usize {
    match parent {
        HostParent::Container(container) => container.0,
        HostParent::Instance(instance) => instance.0,
    }
}

impl HostConfig for MemoryHost {
    type HostContext = Namespace;
    type PublicInstance = HostInstance;

    fn get_root_host_context(&self, _root: ContainerInfo) -> Rc<Namespace> {
        self.html.clone()
    }

    fn get_child_host_context(
        &self,
        parent: &Rc<Namespace>,
        element_type: Option<&str>,
        _root: ContainerInfo,
    ) -> Rc<Namespace> {
        match (**parent, element_type) {
            (Namespace::Html, Some("svg")) => self.svg.clone(),
            (Namespace::Svg, Some("foreignObject")) => self.html.clone(),
            _ => parent.clone(),
        }
    }

    fn should_set_text_content(&self, element_type: &str, props: &Props) -> bool {
        element_type == "textarea" || props.text_content().is_some()
    }

    fn get_public_instance(&self, instance: HostInstance) -> HostInstance {
        instance
    }

    fn hydration(&self) -> Option<&dyn HydrationHooks<Namespace>> {
        if self.supports_hydration {
            Some(self)
        } else {
            None
        }
    }
}

impl HydrationHooks<Namespace> for MemoryHost {
    fn can_hydrate_instance(&self, instance: HostInstance, element_type: &str, _props: &Props) -> bool {
        matches!(
            self.node(instance).map(|n| &n.kind),
            Some(MemoryNodeKind::Element(name)) if name.eq_ignore_ascii_case(element_type)
        )
    }

    fn can_hydrate_text_instance(&self, instance: HostInstance, _text: &str) -> bool {
        matches!(self.node(instance).map(|n| &n.kind), Some(MemoryNodeKind::Text(_)))
    }

    fn get_next_hydratable_sibling(&self, instance: HostInstance) -> Option<HostInstance> {
        let parent = self.node(instance)?.parent?;
        let siblings = &self.nodes[parent].children;
        let position = siblings.iter().position(|&child| child == instance)?;
        siblings.get(position + 1).copied()
    }

    fn get_first_hydratable_child(&self, parent: HostParent) -> Option<HostInstance> {
        self.nodes.get(parent_index(parent))?.children.first().copied()
    }

    fn hydrate_instance(
        &self,
        instance: HostInstance,
        _element_type: &str,
        props: &Props,
        _root: ContainerInfo,
        _host_context: &Namespace,
        _fiber: FiberId,
    ) -> Option<UpdatePayload> {
        self.record(HydrationEvent::Hydrated(instance));
        let node = self.node(instance)?;
        let payload: UpdatePayload = props
            .attributes
            .iter()
            .filter(|(name, value)| node.attributes.get(*name) != Some(*value))
            .map(|(name, value)| (name.clone(), value.clone()))
            .collect();
        (!payload.is_empty()).then_some(payload)
    }

    fn hydrate_text_instance(&self, instance: HostInstance, text: &str, _fiber: FiberId) -> bool {
        self.record(HydrationEvent::HydratedText(instance));
        !matches!(
            self.node(instance).map(|n| &n.kind),
            Some(MemoryNodeKind::Text(existing)) if existing == text
        )
    }

    fn did_not_hydrate_instance(&self, parent: HostParent, instance: HostInstance) {
        self.record(HydrationEvent::DidNotHydrate { parent, instance });
    }

    fn did_not_find_hydratable_instance(&self, parent: HostParent, element_type: &str, _props: &Props) {
        self.record(HydrationEvent::DidNotFindInstance {
            parent,
            element_type: element_type.to_string(),
        });
    }

    fn did_not_find_hydratable_text_instance(&self, parent: HostParent, text: &str) {
        self.record(HydrationEvent::DidNotFindText {
            parent,
            text: text.to_string(),
        });
    }
}
