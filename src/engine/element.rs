//! Element model - the virtual descriptors fibers are built from.
//!
//! A render produces a tree of [`Node`]s. The reconciler never interprets
//! props beyond handing them to the renderer; it only cares about element
//! types, keys, and text content.

use std::any::Any;
use std::collections::BTreeMap;
use std::rc::Rc;

use crate::types::{ContainerInfo, FiberId};

/// Opaque ref attached to an element and carried on its fiber.
pub type RefHandle = Rc<dyn Any>;

// =============================================================================
// Element types
// =============================================================================

/// Descriptor of a composite component.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ComponentType {
    /// Display name, used in diagnostics.
    pub name: String,
    /// Component-instance marker: instances are constructed, not called.
    pub is_component_instance: bool,
    /// Opts the subtree into async update semantics.
    pub async_subtree: bool,
}

impl ComponentType {
    /// A plain callable component (resolved on first render).
    pub fn function(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            is_component_instance: false,
            async_subtree: false,
        }
    }

    /// A component carrying the component-instance marker.
    pub fn class(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            is_component_instance: true,
            async_subtree: false,
        }
    }

    pub fn with_async_subtree(mut self) -> Self {
        self.async_subtree = true;
        self
    }
}

/// The `type` of an element, as produced by a render.
#[derive(Debug, Clone)]
pub enum ElementType {
    /// Built-in host element, by name.
    Host(String),
    /// Composite component.
    Component(Rc<ComponentType>),
    /// A fiber handed back as an element type (coroutine continuation).
    Continuation(FiberId),
    /// Anything else. Carries the kind of the offending value for errors.
    Unknown(String),
}

impl ElementType {
    pub fn host(name: impl Into<String>) -> Self {
        ElementType::Host(name.into())
    }

    pub fn component(component: ComponentType) -> Self {
        ElementType::Component(Rc::new(component))
    }

    /// Host element name, if this is a host type.
    pub fn host_name(&self) -> Option<&str> {
        match self {
            ElementType::Host(name) => Some(name),
            _ => None,
        }
    }

    /// Component descriptor, if this is a composite type.
    pub fn as_component(&self) -> Option<&ComponentType> {
        match self {
            ElementType::Component(component) => Some(component),
            _ => None,
        }
    }

    /// Human readable name (host name or component name).
    pub fn display_name(&self) -> Option<&str> {
        match self {
            ElementType::Host(name) => Some(name),
            ElementType::Component(component) => Some(&component.name),
            ElementType::Continuation(_) | ElementType::Unknown(_) => None,
        }
    }
}

// =============================================================================
// Props
// =============================================================================

/// Input data for an element.
#[derive(Debug, Clone, Default)]
pub struct Props {
    pub attributes: BTreeMap<String, String>,
    pub children: Vec<Node>,
}

impl Props {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_attribute(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.attributes.insert(name.into(), value.into());
        self
    }

    pub fn with_children(mut self, children: Vec<Node>) -> Self {
        self.children = children;
        self
    }

    /// Props whose only child is a text node.
    pub fn with_text(self, text: impl Into<String>) -> Self {
        self.with_children(vec![Node::Text(text.into())])
    }

    /// Text content, when the only child is text.
    pub fn text_content(&self) -> Option<&str> {
        match self.children.as_slice() {
            [Node::Text(text)] => Some(text),
            _ => None,
        }
    }
}

// =============================================================================
// Nodes
// =============================================================================

/// An element: type + key + props.
#[derive(Debug, Clone)]
pub struct Element {
    pub element_type: ElementType,
    pub key: Option<String>,
    pub ref_handle: Option<RefHandle>,
    pub props: Rc<Props>,
    /// Fiber of the component whose render produced this element.
    pub owner: Option<FiberId>,
}

impl Element {
    pub fn new(element_type: ElementType, props: Props) -> Self {
        Self {
            element_type,
            key: None,
            ref_handle: None,
            props: Rc::new(props),
            owner: None,
        }
    }

    /// Host element shorthand: `Element::host("div", Props::new())`.
    pub fn host(name: impl Into<String>, props: Props) -> Self {
        Self::new(ElementType::host(name), props)
    }

    pub fn component(component: ComponentType, props: Props) -> Self {
        Self::new(ElementType::component(component), props)
    }

    pub fn with_key(mut self, key: impl Into<String>) -> Self {
        self.key = Some(key.into());
        self
    }

    pub fn with_owner(mut self, owner: FiberId) -> Self {
        self.owner = Some(owner);
        self
    }

    pub fn with_ref(mut self, ref_handle: RefHandle) -> Self {
        self.ref_handle = Some(ref_handle);
        self
    }
}

/// Children rendered into another container.
#[derive(Debug, Clone)]
pub struct Portal {
    pub key: Option<String>,
    pub container_info: ContainerInfo,
    /// Renderer-specific payload carried alongside the container.
    pub implementation: Option<Rc<dyn Any>>,
    pub children: Vec<Node>,
}

impl Portal {
    pub fn new(container_info: ContainerInfo, children: Vec<Node>) -> Self {
        Self {
            key: None,
            container_info,
            implementation: None,
            children,
        }
    }
}

#[derive(Debug, Clone)]
pub struct Coroutine {
    pub key: Option<String>,
    pub handler: Rc<ComponentType>,
    pub props: Rc<Props>,
    pub children: Vec<Node>,
}

#[derive(Debug, Clone)]
pub struct Yield {
    pub value: Rc<dyn Any>,
}

/// Anything a render can return.
#[derive(Debug, Clone)]
pub enum Node {
    Element(Element),
    Text(String),
    Fragment(Vec<Node>),
    Portal(Portal),
    Coroutine(Rc<Coroutine>),
    Yield(Yield),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_text_content() {
        let props = Props::new().with_text("hello");
        assert_eq!(props.text_content(), Some("hello"));

        let props = Props::new().with_children(vec![
            Node::Text("a".into()),
            Node::Text("b".into()),
        ]);
        assert_eq!(props.text_content(), None);
    }

    #[test]
    fn test_element_type_names() {
        let host = ElementType::host("div");
        assert_eq!(host.host_name(), Some("div"));
        assert_eq!(host.display_name(), Some("div"));

        let component = ElementType::component(ComponentType::class("App"));
        assert_eq!(component.host_name(), None);
        assert_eq!(component.display_name(), Some("App"));
        assert!(component.as_component().is_some_and(|c| c.is_component_instance));

        assert_eq!(ElementType::Unknown("number".into()).display_name(), None);
    }
}
