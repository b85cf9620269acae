//! Fiber constructors - one per kind of node a render can produce.

use std::rc::Rc;

use crate::error::{ReconcilerError, Result};
use crate::types::{FiberId, InternalContext, Priority, WorkTag};

use super::element::{Coroutine, Element, ElementType, Node, Portal, Yield};
use super::fiber::{FiberArena, Payload, PortalState, StateNode};

/// Element type given to the synthetic fibers that delete host nodes.
pub const DELETED_TYPE: &str = "DELETED";

impl FiberArena {
    /// Fiber for an element, with the element's props as pending input.
    pub fn create_fiber_from_element(
        &mut self,
        element: &Element,
        internal_context: InternalContext,
        priority: Priority,
    ) -> Result<FiberId> {
        let id = self.create_fiber_from_element_type(
            &element.element_type,
            element.key.clone(),
            internal_context,
            element.owner,
        )?;
        let fiber = &mut self[id];
        fiber.pending_props = Some(Payload::Props(element.props.clone()));
        fiber.pending_work_priority = priority;
        if element.ref_handle.is_some() {
            fiber.ref_handle = element.ref_handle.clone();
        }
        Ok(id)
    }

    /// Resolve an element type into a fiber.
    ///
    /// `owner` is only consulted for diagnostics.
    pub fn create_fiber_from_element_type(
        &mut self,
        element_type: &ElementType,
        key: Option<String>,
        internal_context: InternalContext,
        owner: Option<FiberId>,
    ) -> Result<FiberId> {
        match element_type {
            ElementType::Component(component) => {
                let tag = if component.is_component_instance {
                    WorkTag::ClassComponent
                } else {
                    WorkTag::IndeterminateComponent
                };
                let id = self.create_fiber(tag, key, internal_context);
                self[id].element_type = Some(element_type.clone());
                Ok(id)
            }
            ElementType::Host(_) => {
                let id = self.create_fiber(WorkTag::HostComponent, key, internal_context);
                self[id].element_type = Some(element_type.clone());
                Ok(id)
            }
            // Assumed to be a continuation and therefore a fiber already.
            ElementType::Continuation(fiber) if self.contains(*fiber) => Ok(*fiber),
            ElementType::Continuation(_) => Err(self.invalid_element_type("object", owner)),
            ElementType::Unknown(kind) => Err(self.invalid_element_type(kind, owner)),
        }
    }

    fn invalid_element_type(&self, kind: &str, owner: Option<FiberId>) -> ReconcilerError {
        let mut info = String::new();
        if self.diagnostics {
            if kind == "undefined" || kind == "empty object" {
                info.push_str(
                    " You likely forgot to export your component from the file it's defined in.",
                );
            }
            if let Some(name) = owner.and_then(|owner| self.component_name(owner)) {
                info.push_str(&format!("\n\nCheck the render method of `{name}`."));
            }
        }
        ReconcilerError::InvalidElementType {
            kind: kind.to_string(),
            info,
        }
    }

    /// Display name of the component behind `fiber`, if derivable.
    pub fn component_name(&self, fiber: FiberId) -> Option<String> {
        let fiber = self.get(fiber).ok()?;
        match fiber.tag {
            WorkTag::ClassComponent
            | WorkTag::IndeterminateComponent
            | WorkTag::HostComponent
            | WorkTag::CoroutineComponent => fiber
                .element_type
                .as_ref()
                .and_then(ElementType::display_name)
                .map(str::to_string),
            WorkTag::HostText
            | WorkTag::HostRoot
            | WorkTag::HostPortal
            | WorkTag::YieldComponent
            | WorkTag::Fragment => None,
        }
    }

    pub fn create_fiber_from_fragment(
        &mut self,
        elements: Vec<Node>,
        internal_context: InternalContext,
        priority: Priority,
    ) -> FiberId {
        let id = self.create_fiber(WorkTag::Fragment, None, internal_context);
        let fiber = &mut self[id];
        fiber.pending_props = Some(Payload::Children(elements.into()));
        fiber.pending_work_priority = priority;
        id
    }

    pub fn create_fiber_from_text(
        &mut self,
        content: &str,
        internal_context: InternalContext,
        priority: Priority,
    ) -> FiberId {
        let id = self.create_fiber(WorkTag::HostText, None, internal_context);
        let fiber = &mut self[id];
        fiber.pending_props = Some(Payload::Text(content.into()));
        fiber.pending_work_priority = priority;
        id
    }

    pub fn create_fiber_from_coroutine(
        &mut self,
        coroutine: Rc<Coroutine>,
        internal_context: InternalContext,
        priority: Priority,
    ) -> FiberId {
        let id = self.create_fiber(
            WorkTag::CoroutineComponent,
            coroutine.key.clone(),
            internal_context,
        );
        let fiber = &mut self[id];
        fiber.element_type = Some(ElementType::Component(coroutine.handler.clone()));
        fiber.pending_props = Some(Payload::Coroutine(coroutine));
        fiber.pending_work_priority = priority;
        id
    }

    /// Yields carry no input; the value is read by the enclosing coroutine.
    pub fn create_fiber_from_yield(
        &mut self,
        _yield_node: &Yield,
        internal_context: InternalContext,
        _priority: Priority,
    ) -> FiberId {
        self.create_fiber(WorkTag::YieldComponent, None, internal_context)
    }

    pub fn create_fiber_from_portal(
        &mut self,
        portal: &Portal,
        internal_context: InternalContext,
        priority: Priority,
    ) -> FiberId {
        let id = self.create_fiber(WorkTag::HostPortal, portal.key.clone(), internal_context);
        let fiber = &mut self[id];
        fiber.pending_props = Some(Payload::Children(portal.children.clone().into()));
        fiber.pending_work_priority = priority;
        fiber.state_node = StateNode::Portal(PortalState {
            container_info: portal.container_info,
            implementation: portal.implementation.clone(),
        });
        id
    }

    /// Placeholder fiber used to schedule deletion of a stray host node.
    pub fn create_fiber_from_host_instance_for_deletion(&mut self) -> FiberId {
        let id = self.create_fiber(WorkTag::HostComponent, None, InternalContext::NO_CONTEXT);
        self[id].element_type = Some(ElementType::host(DELETED_TYPE));
        id
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::element::{ComponentType, Props};
    use crate::types::ContainerInfo;

    fn arena() -> FiberArena {
        FiberArena::with_config(&crate::ReconcilerConfig::diagnostic())
    }

    #[test]
    fn test_type_resolution() {
        let mut arena = arena();
        let ctx = InternalContext::NO_CONTEXT;

        let class = arena
            .create_fiber_from_element_type(&ElementType::component(ComponentType::class("App")), None, ctx, None)
            .unwrap();
        assert_eq!(arena[class].tag, WorkTag::ClassComponent);

        let function = arena
            .create_fiber_from_element_type(&ElementType::component(ComponentType::function("Row")), None, ctx, None)
            .unwrap();
        assert_eq!(arena[function].tag, WorkTag::IndeterminateComponent);

        let host = arena
            .create_fiber_from_element_type(&ElementType::host("div"), Some("a".into()), ctx, None)
            .unwrap();
        assert_eq!(arena[host].tag, WorkTag::HostComponent);
        assert_eq!(arena[host].host_type(), Some("div"));
        assert_eq!(arena[host].key.as_deref(), Some("a"));

        let continuation = arena
            .create_fiber_from_element_type(&ElementType::Continuation(host), None, ctx, None)
            .unwrap();
        assert_eq!(continuation, host);
    }

    #[test]
    fn test_invalid_type_names_owner() {
        let mut arena = arena();
        let owner = arena
            .create_fiber_from_element_type(
                &ElementType::component(ComponentType::class("Parent")),
                None,
                InternalContext::NO_CONTEXT,
                None,
            )
            .unwrap();

        let err = arena
            .create_fiber_from_element_type(
                &ElementType::Unknown("undefined".into()),
                None,
                InternalContext::NO_CONTEXT,
                Some(owner),
            )
            .unwrap_err();

        match err {
            ReconcilerError::InvalidElementType { kind, info } => {
                assert_eq!(kind, "undefined");
                assert!(info.contains("forgot to export"));
                assert!(info.contains("Check the render method of `Parent`."));
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_invalid_type_without_diagnostics() {
        let mut arena = FiberArena::with_config(&crate::ReconcilerConfig::default().with_diagnostics(false));
        let err = arena
            .create_fiber_from_element_type(
                &ElementType::Continuation(FiberId(99)),
                None,
                InternalContext::NO_CONTEXT,
                None,
            )
            .unwrap_err();
        assert_eq!(
            err,
            ReconcilerError::InvalidElementType {
                kind: "object".into(),
                info: String::new(),
            }
        );
    }

    #[test]
    fn test_element_props_become_pending() {
        let mut arena = arena();
        let element = Element::host("p", Props::new().with_text("hi")).with_key("k");
        let id = arena
            .create_fiber_from_element(&element, InternalContext::NO_CONTEXT, Priority::HIGH)
            .unwrap();
        let fiber = &arena[id];
        assert_eq!(fiber.pending_work_priority, Priority::HIGH);
        assert_eq!(
            fiber.pending_props.as_ref().and_then(Payload::props).and_then(Props::text_content),
            Some("hi")
        );
    }

    #[test]
    fn test_specialized_constructors() {
        let mut arena = arena();
        let ctx = InternalContext::NO_CONTEXT;

        let text = arena.create_fiber_from_text("hello", ctx, Priority::TASK);
        assert_eq!(arena[text].tag, WorkTag::HostText);
        assert_eq!(arena[text].pending_props.as_ref().and_then(Payload::text), Some("hello"));

        let fragment = arena.create_fiber_from_fragment(vec![Node::Text("x".into())], ctx, Priority::TASK);
        assert_eq!(arena[fragment].tag, WorkTag::Fragment);
        assert_eq!(arena[fragment].pending_props.as_ref().and_then(Payload::children).map(<[Node]>::len), Some(1));

        let portal = Portal::new(ContainerInfo(4), vec![]);
        let portal_fiber = arena.create_fiber_from_portal(&portal, ctx, Priority::TASK);
        assert_eq!(arena[portal_fiber].tag, WorkTag::HostPortal);
        assert!(matches!(
            &arena[portal_fiber].state_node,
            StateNode::Portal(state) if state.container_info == ContainerInfo(4)
        ));

        let coroutine = Rc::new(Coroutine {
            key: Some("co".into()),
            handler: Rc::new(ComponentType::function("Handler")),
            props: Rc::new(Props::new()),
            children: vec![],
        });
        let co = arena.create_fiber_from_coroutine(coroutine, ctx, Priority::TASK);
        assert_eq!(arena[co].tag, WorkTag::CoroutineComponent);
        assert_eq!(arena[co].key.as_deref(), Some("co"));
        assert_eq!(arena.component_name(co).as_deref(), Some("Handler"));

        let yield_node = Yield { value: Rc::new(1u8) };
        let y = arena.create_fiber_from_yield(&yield_node, ctx, Priority::TASK);
        assert_eq!(arena[y].tag, WorkTag::YieldComponent);

        let deleted = arena.create_fiber_from_host_instance_for_deletion();
        assert_eq!(arena[deleted].tag, WorkTag::HostComponent);
        assert_eq!(arena[deleted].host_type(), Some(DELETED_TYPE));
    }
}
