//! # spark-reconciler
//!
//! Core data structures of a fiber-based UI reconciler.
//!
//! ## Architecture
//!
//! Component instances are tracked as fibers: records in one flat arena,
//! linked by index. Each instance has at most two buffers, the committed
//! `current` and the `work-in-progress` alternate, paired for good once both
//! exist.
//!
//! A render pass walks the tree with explicit traversal state:
//! ```text
//! Reconciler → update queue → Scheduler → WorkContext { FiberStack, HostContextStack, HydrationContext }
//! ```
//!
//! The renderer supplies a [`HostConfig`]. With hydration hooks, the pass can
//! adopt host nodes rendered earlier instead of creating them.
//!
//! ## Modules
//!
//! - [`types`] - Ids, handles, work tags, priorities, effect flags
//! - [`engine`] - Fiber arena, roots, elements, update queues, reflection
//! - [`state`] - Cursor stack, host context stack, hydration state machine
//! - [`host`] - Renderer traits and an in-memory reference host
//! - [`pipeline`] - Reconciler facade, scheduler and observer seams

pub mod config;
pub mod engine;
pub mod error;
pub mod host;
pub mod pipeline;
pub mod state;
pub mod types;

// Re-export commonly used items
pub use types::*;

pub use config::ReconcilerConfig;
pub use error::{ReconcilerError, Result};

pub use engine::{
    ComponentType, Element, ElementType, Fiber, FiberArena, FiberRoot, Node, Payload, Props,
    StateNode, UpdateQueue,
};

pub use host::{HostConfig, HydrationHooks, MemoryHost};

pub use state::{Cursor, FiberStack, HostContextStack, HydrationContext, HydrationPhase, WorkContext};

pub use pipeline::{
    DevToolsHook, FiberObserver, NoopObserver, ObserverError, PublicRootInstance, Reconciler,
    RecordingScheduler, Scheduler,
};
