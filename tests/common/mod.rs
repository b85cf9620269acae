//! Shared fixtures: build fiber trees from nodes and run a minimal
//! depth-first pass over them the way a work loop would.

#![allow(dead_code)]

use spark_reconciler::engine::{Payload, StateNode};
use spark_reconciler::{
    Element, FiberArena, MemoryHost, Node, Props, Result, WorkContext, WorkTag,
};
use spark_reconciler::{FiberId, InternalContext, Priority};

pub fn el(name: &str, children: Vec<Node>) -> Node {
    Node::Element(Element::host(name, Props::new().with_children(children)))
}

pub fn el_with(name: &str, props: Props) -> Node {
    Node::Element(Element::host(name, props))
}

pub fn text(content: &str) -> Node {
    Node::Text(content.to_string())
}

/// Create fibers for `nodes` and link them under `parent`.
///
/// Component elements render their `children` prop as is.
pub fn build(arena: &mut FiberArena, parent: FiberId, nodes: &[Node]) -> Result<Vec<FiberId>> {
    let ctx = InternalContext::NO_CONTEXT;
    let priority = Priority::SYNCHRONOUS;
    let mut fibers = Vec::with_capacity(nodes.len());
    let leaf: &[Node] = &[];

    for node in nodes {
        let (fiber, children): (FiberId, &[Node]) = match node {
            Node::Element(element) => (
                arena.create_fiber_from_element(element, ctx, priority)?,
                element.props.children.as_slice(),
            ),
            Node::Text(content) => (arena.create_fiber_from_text(content, ctx, priority), leaf),
            Node::Fragment(children) => (
                arena.create_fiber_from_fragment(children.clone(), ctx, priority),
                children.as_slice(),
            ),
            Node::Portal(portal) => (
                arena.create_fiber_from_portal(portal, ctx, priority),
                portal.children.as_slice(),
            ),
            Node::Coroutine(coroutine) => (
                arena.create_fiber_from_coroutine(coroutine.clone(), ctx, priority),
                coroutine.children.as_slice(),
            ),
            Node::Yield(value) => (arena.create_fiber_from_yield(value, ctx, priority), leaf),
        };
        arena[fiber].memoized_props = arena[fiber].pending_props.clone();
        build(arena, fiber, children)?;
        fibers.push(fiber);
    }

    arena.set_children(parent, &fibers)?;
    Ok(fibers)
}

/// Walk the tree under `root_fiber`, hydrating host fibers. Returns the
/// fibers whose adopted host node still needs an update.
pub fn hydrate(
    arena: &mut FiberArena,
    host: &MemoryHost,
    work: &mut WorkContext<MemoryHost>,
    root_fiber: FiberId,
) -> Result<Vec<FiberId>> {
    let mut needs_update = Vec::new();
    visit(arena, host, work, root_fiber, &mut needs_update)?;
    Ok(needs_update)
}

fn visit(
    arena: &mut FiberArena,
    host: &MemoryHost,
    work: &mut WorkContext<MemoryHost>,
    fiber: FiberId,
    needs_update: &mut Vec<FiberId>,
) -> Result<()> {
    // Begin
    match arena.get(fiber)?.tag {
        WorkTag::HostRoot => {
            let container = arena.root_of(fiber)?.container_info;
            work.host_context
                .push_host_container(&mut work.stack, host, fiber, container);
            work.hydration.enter_hydration_state(arena, host, fiber);
        }
        WorkTag::HostPortal => {
            if let StateNode::Portal(portal) = &arena[fiber].state_node {
                let container = portal.container_info;
                work.host_context
                    .push_host_container(&mut work.stack, host, fiber, container);
                work.hydration.enter_hydration_state(arena, host, fiber);
            }
        }
        WorkTag::HostComponent => {
            work.host_context
                .push_host_context(&mut work.stack, host, arena, fiber)?;
            work.hydration
                .try_to_claim_next_hydratable_instance(arena, host, fiber)?;
        }
        WorkTag::HostText => {
            work.hydration
                .try_to_claim_next_hydratable_instance(arena, host, fiber)?;
        }
        _ => {}
    }

    for child in arena.children(fiber) {
        visit(arena, host, work, child, needs_update)?;
    }

    // Complete
    match arena[fiber].tag {
        WorkTag::HostRoot => {
            work.hydration.pop_hydration_state(arena, host, fiber)?;
            work.host_context.pop_host_container(&mut work.stack, fiber);
            work.hydration.reset_hydration_state();
        }
        WorkTag::HostPortal => {
            work.hydration.pop_hydration_state(arena, host, fiber)?;
            work.host_context.pop_host_container(&mut work.stack, fiber);
        }
        WorkTag::HostComponent => {
            let root_container = work.host_context.get_root_host_container()?;
            let context = work.host_context.get_host_context()?;
            if work.hydration.pop_hydration_state(arena, host, fiber)?
                && work.hydration.prepare_to_hydrate_host_instance(
                    arena,
                    host,
                    fiber,
                    root_container,
                    &context,
                )?
            {
                needs_update.push(fiber);
            }
            work.host_context.pop_host_context(&mut work.stack, fiber);
        }
        WorkTag::HostText => {
            if work.hydration.pop_hydration_state(arena, host, fiber)?
                && work
                    .hydration
                    .prepare_to_hydrate_host_text_instance(arena, host, fiber)?
            {
                needs_update.push(fiber);
            }
        }
        _ => {}
    }
    Ok(())
}

/// Host node bound to `fiber`, if any.
pub fn bound(arena: &FiberArena, fiber: FiberId) -> Option<spark_reconciler::HostInstance> {
    arena[fiber].state_node.host_instance()
}

/// Host nodes scheduled for deletion under `parent`.
pub fn deletions(arena: &FiberArena, parent: FiberId) -> Vec<spark_reconciler::HostInstance> {
    arena
        .effects(parent)
        .into_iter()
        .filter(|&effect| arena[effect].effect_tag.contains(spark_reconciler::EffectTag::DELETION))
        .filter_map(|effect| bound(arena, effect))
        .collect()
}

pub fn text_of(arena: &FiberArena, fiber: FiberId) -> Option<String> {
    arena[fiber]
        .memoized_props
        .as_ref()
        .and_then(Payload::text)
        .map(str::to_string)
}
