//! Reconciler Pipeline
//!
//! The outward-facing layer: what a renderer drives, and the seams it plugs
//! its own pieces into.
//!
//! # Pipeline Architecture
//!
//! ```text
//! update_container → update queue → Scheduler::schedule_update → (work loop) → commit
//!                                                                     │
//!                                                 DevToolsHook ◀──────┘
//! ```
//!
//! ## Seams
//!
//! 1. **Scheduler** - Owns the work loop; decides priority and batching
//! 2. **FiberObserver** - Development tools; failures never propagate
//! 3. **ContextResolver** - Subtree context inherited from a parent component

pub mod devtools;
pub mod reconciler;
pub mod scheduler;

// Re-exports
pub use devtools::{DevToolsHook, FiberObserver, NoopObserver, ObserverError};
pub use reconciler::{ContextResolver, PublicRootInstance, Reconciler};
pub use scheduler::{RecordingScheduler, Scheduler};
