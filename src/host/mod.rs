//! Host configuration - what a renderer supplies.
//!
//! The reconciler never touches host nodes directly. It asks the renderer
//! through [`HostConfig`] for contexts and public instances, and through
//! [`HydrationHooks`] to match and adopt nodes from a prior render.
//!
//! A renderer without hydration support returns `None` from
//! [`HostConfig::hydration`] and the whole hydration machine goes inert.

use std::rc::Rc;

use crate::engine::{Props, UpdatePayload};
use crate::types::{ContainerInfo, FiberId, HostInstance, HostParent};

pub mod memory;

pub use memory::{HydrationEvent, MemoryHost, MemoryNode, MemoryNodeKind, Namespace};

/// Capabilities every renderer provides.
pub trait HostConfig {
    /// Environment context derived per host depth (namespaces, ...).
    ///
    /// Contexts are compared by identity (`Rc::ptr_eq`): return a clone of
    /// the parent `Rc` when nothing changes.
    type HostContext: 'static;

    /// What user code gets handed for a host node.
    type PublicInstance;

    fn get_root_host_context(&self, root: ContainerInfo) -> Rc<Self::HostContext>;

    fn get_child_host_context(
        &self,
        parent: &Rc<Self::HostContext>,
        element_type: Option<&str>,
        root: ContainerInfo,
    ) -> Rc<Self::HostContext>;

    /// True when the element's content is set as text rather than children.
    fn should_set_text_content(&self, element_type: &str, props: &Props) -> bool;

    fn get_public_instance(&self, instance: HostInstance) -> Self::PublicInstance;

    /// Hydration support, if the renderer has it.
    fn hydration(&self) -> Option<&dyn HydrationHooks<Self::HostContext>> {
        None
    }
}

/// Hooks for adopting an existing host tree.
pub trait HydrationHooks<C> {
    fn can_hydrate_instance(&self, instance: HostInstance, element_type: &str, props: &Props) -> bool;

    fn can_hydrate_text_instance(&self, instance: HostInstance, text: &str) -> bool;

    fn get_next_hydratable_sibling(&self, instance: HostInstance) -> Option<HostInstance>;

    fn get_first_hydratable_child(&self, parent: HostParent) -> Option<HostInstance>;

    /// Adopt `instance` for an element; returns the changes still needed.
    fn hydrate_instance(
        &self,
        instance: HostInstance,
        element_type: &str,
        props: &Props,
        root: ContainerInfo,
        host_context: &C,
        fiber: FiberId,
    ) -> Option<UpdatePayload>;

    /// Adopt a text node; returns true when its content must be updated.
    fn hydrate_text_instance(&self, instance: HostInstance, text: &str, fiber: FiberId) -> bool;

    /// Diagnostic: `instance` under `parent` was not adopted and will be deleted.
    fn did_not_hydrate_instance(&self, _parent: HostParent, _instance: HostInstance) {}

    /// Diagnostic: no node could be adopted for an element.
    fn did_not_find_hydratable_instance(&self, _parent: HostParent, _element_type: &str, _props: &Props) {}

    /// Diagnostic: no node could be adopted for a text fiber.
    fn did_not_find_hydratable_text_instance(&self, _parent: HostParent, _text: &str) {}
}
