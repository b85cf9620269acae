//! The reconciler facade driven the way a renderer would drive it.

mod common;

use std::cell::{Cell, RefCell};
use std::rc::Rc;

use common::{build, el, text};
use spark_reconciler::engine::{Portal, SubtreeContext};
use spark_reconciler::{
    ComponentType, Element, FiberArena, FiberObserver, HostParent, MemoryHost, Node, ObserverError,
    Priority, Props, PublicRootInstance, Reconciler, ReconcilerConfig, ReconcilerError,
    RecordingScheduler, RootId, StateNode, WorkTag,
};
use spark_reconciler::{FiberId, InternalContext};

type TestReconciler = Reconciler<MemoryHost, RecordingScheduler>;

fn reconciler() -> TestReconciler {
    Reconciler::with_config(
        MemoryHost::new(),
        RecordingScheduler::new(),
        ReconcilerConfig::diagnostic(),
    )
}

fn mounted(r: &mut TestReconciler) -> (RootId, FiberId) {
    let container = r.host_mut().create_container();
    let root = r.create_container(container);
    let current = r.arena().root(root).unwrap().current;
    (root, current)
}

#[derive(Clone, Default)]
struct Recorder(Rc<RefCell<Vec<&'static str>>>);

impl FiberObserver for Recorder {
    fn on_commit_root(&mut self, _arena: &FiberArena, _root: RootId) -> Result<(), ObserverError> {
        self.0.borrow_mut().push("commit");
        Ok(())
    }

    fn on_mount_container(&mut self, _arena: &FiberArena, _root: RootId) -> Result<(), ObserverError> {
        self.0.borrow_mut().push("mount");
        Ok(())
    }

    fn on_update_container(&mut self, _arena: &FiberArena, _root: RootId) -> Result<(), ObserverError> {
        self.0.borrow_mut().push("update");
        Ok(())
    }

    fn on_unmount_container(&mut self, _arena: &FiberArena, _root: RootId) -> Result<(), ObserverError> {
        self.0.borrow_mut().push("unmount");
        Ok(())
    }
}

#[test]
fn test_container_lifecycle_is_observed() {
    let recorder = Recorder::default();
    let mut r = reconciler().with_observer(recorder.clone());
    let (root, current) = mounted(&mut r);

    r.update_container(Some(Element::host("div", Props::new())), root, None, None)
        .unwrap();
    // A render pass pairs the root fiber with its alternate.
    r.arena_mut()
        .create_work_in_progress(current, Priority::SYNCHRONOUS)
        .unwrap();
    r.update_container(Some(Element::host("p", Props::new())), root, None, None)
        .unwrap();
    r.update_container(None, root, None, None).unwrap();
    r.on_commit_root(root);

    assert_eq!(*recorder.0.borrow(), vec!["mount", "update", "unmount", "commit"]);
}

#[test]
fn test_observer_is_silent_without_diagnostics() {
    let recorder = Recorder::default();
    let mut r = Reconciler::with_config(
        MemoryHost::new(),
        RecordingScheduler::new(),
        ReconcilerConfig::default().with_diagnostics(false),
    )
    .with_observer(recorder.clone());
    let (root, _) = mounted(&mut r);

    r.update_container(None, root, None, None).unwrap();
    assert!(recorder.0.borrow().is_empty());

    // Commit notifications are not instrumentation and always go through.
    r.on_commit_root(root);
    assert_eq!(*recorder.0.borrow(), vec!["commit"]);
}

struct Broken;

impl FiberObserver for Broken {
    fn on_commit_root(&mut self, _arena: &FiberArena, _root: RootId) -> Result<(), ObserverError> {
        Err(ObserverError::new("devtools disconnected"))
    }

    fn on_mount_container(&mut self, _arena: &FiberArena, _root: RootId) -> Result<(), ObserverError> {
        panic!("devtools bug");
    }
}

#[test]
fn test_failing_observer_never_propagates() {
    let mut r = reconciler().with_observer(Broken);
    let (root, current) = mounted(&mut r);

    r.update_container(Some(Element::host("div", Props::new())), root, None, None)
        .unwrap();
    r.on_commit_root(root);
    r.on_commit_unmount(current);

    assert_eq!(r.scheduler().scheduled().len(), 1);
}

#[test]
fn test_updates_queue_in_priority_order() {
    let mut r = reconciler();
    let (root, current) = mounted(&mut r);
    let lazy = ComponentType::function("Lazy").with_async_subtree();

    r.update_container(Some(Element::component(lazy, Props::new())), root, None, None)
        .unwrap();
    assert_eq!(r.pending_priority(root).unwrap(), Priority::LOW);

    r.update_container(Some(Element::host("a", Props::new())), root, None, None)
        .unwrap();
    r.update_container(Some(Element::host("b", Props::new())), root, None, None)
        .unwrap();
    assert_eq!(r.pending_priority(root).unwrap(), Priority::SYNCHRONOUS);

    let queue = r.arena()[current].update_queue.clone().unwrap();
    let list = queue.updates().unwrap().borrow();
    let order: Vec<Option<String>> = list
        .iter()
        .map(|update| {
            update
                .partial_state
                .element
                .as_ref()
                .and_then(|element| element.element_type.display_name().map(str::to_string))
        })
        .collect();
    assert_eq!(
        order,
        vec![Some("a".to_string()), Some("b".to_string()), Some("Lazy".to_string())]
    );
}

#[test]
fn test_unmount_drops_less_urgent_updates() {
    let mut r = reconciler();
    let (root, current) = mounted(&mut r);
    let lazy = ComponentType::function("Lazy").with_async_subtree();

    r.update_container(Some(Element::component(lazy, Props::new())), root, None, None)
        .unwrap();
    r.update_container(None, root, None, None).unwrap();

    let queue = r.arena()[current].update_queue.clone().unwrap();
    let list = queue.updates().unwrap().borrow();
    assert_eq!(list.len(), 1);
    assert!(list.iter().all(|update| update.is_top_level_unmount));
    assert_eq!(r.scheduler().scheduled().len(), 2);
}

#[test]
fn test_callbacks_ride_along_with_the_update() {
    let mut r = reconciler();
    let (root, current) = mounted(&mut r);
    let called = Rc::new(Cell::new(false));
    let flag = called.clone();

    r.update_container(None, root, None, Some(Box::new(move || flag.set(true))))
        .unwrap();

    let queue = r.arena()[current].update_queue.clone().unwrap();
    let mut updates = queue.updates().unwrap().borrow_mut().take_pending(Priority::SYNCHRONOUS);
    let callback = updates.pop().and_then(|update| update.callback).unwrap();
    callback();
    assert!(called.get());
}

#[test]
fn test_parent_component_context_is_resolved() {
    let mut r = reconciler();
    let (root, _) = mounted(&mut r);
    let parent = r
        .arena_mut()
        .create_fiber(WorkTag::ClassComponent, None, InternalContext::NO_CONTEXT);
    r.inject_context_resolver(move |_, fiber| Rc::new(fiber) as SubtreeContext);

    r.update_container(None, root, Some(parent), None).unwrap();
    r.update_container(None, root, None, None).unwrap();

    let record = r.arena().root(root).unwrap();
    let context = record.context.clone().unwrap();
    assert_eq!(context.downcast_ref::<FiberId>(), Some(&parent));
    // Later updates go to the pending slot; no parent means empty context.
    let pending = record.pending_context.clone().unwrap();
    assert!(pending.downcast_ref::<FiberId>().is_none());
}

#[test]
fn test_host_lookups_respect_portals() {
    let mut r = reconciler();
    let (root, current) = mounted(&mut r);
    let elsewhere = r.host_mut().create_container();
    let outside = r
        .host_mut()
        .append_element(HostParent::Container(elsewhere), "dialog");

    let app = Node::Element(Element::component(
        ComponentType::class("App"),
        Props::new().with_children(vec![
            Node::Portal(Portal::new(elsewhere, vec![el("dialog", vec![])])),
            el("main", vec![text("body")]),
        ]),
    ));
    let app = build(r.arena_mut(), current, &[app]).unwrap()[0];
    let children = r.arena().children(app);
    let (portal, main) = (children[0], children[1]);
    let dialog = r.arena().children(portal)[0];

    let main_node = r
        .host_mut()
        .append_element(HostParent::Container(elsewhere), "main");
    r.arena_mut()[dialog].state_node = StateNode::Host(outside);
    r.arena_mut()[main].state_node = StateNode::Host(main_node);

    assert_eq!(r.find_host_instance(app).unwrap(), Some(outside));
    assert_eq!(r.find_host_instance_with_no_portals(app).unwrap(), Some(main_node));

    match r.get_public_root_instance(root).unwrap() {
        Some(PublicRootInstance::Component(StateNode::None)) => {}
        other => panic!("unexpected root instance: {other:?}"),
    }
}

#[test]
fn test_lookups_on_detached_fibers_fail() {
    let mut r = reconciler();
    let detached = r
        .arena_mut()
        .create_fiber(WorkTag::HostComponent, None, InternalContext::NO_CONTEXT);

    assert_eq!(
        r.find_host_instance(detached).unwrap_err(),
        ReconcilerError::UnmountedComponent
    );
    let (root, _) = mounted(&mut r);
    assert!(r.get_public_root_instance(root).unwrap().is_none());

    let mut other = reconciler();
    mounted(&mut other);
    let (missing, _) = mounted(&mut other);
    assert_eq!(
        r.update_container(None, missing, None, None).unwrap_err(),
        ReconcilerError::UnknownRoot(missing)
    );
}

#[test]
fn test_batching_helpers_return_closure_results() {
    let mut r = reconciler();
    assert_eq!(r.batched_updates(|| "batched"), "batched");
    assert_eq!(r.unbatched_updates(|| 1 + 1), 2);
    assert_eq!(r.deferred_updates(|| Some(3)), Some(3));
    assert_eq!(r.flush_sync(|| vec![4]), vec![4]);
}
