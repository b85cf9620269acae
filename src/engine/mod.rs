//! Engine - Fiber records, roots, and the element model.
//!
//! The engine manages the core data structures:
//! - Element: What user code describes (types, props, portals, coroutines)
//! - Fiber: One buffer of one component instance, stored in a flat arena
//! - Root: Per-container record linking to its current root fiber
//! - Update queue: Priority-ordered top-level updates on a root
//!
//! # Architecture
//!
//! Fibers are NOT heap objects linked by pointers. They are indices into one
//! arena, and every link (`child`, `sibling`, `return_fiber`, `alternate`)
//! is a [`FiberId`](crate::types::FiberId):
//!
//! ```text
//! Index 0: HostRoot      (return=-, child=2,  alternate=1)
//! Index 1: HostRoot'     (return=-, child=2,  alternate=0)
//! Index 2: HostComponent (return=0, sibling=3, type="div")
//! Index 3: HostText      (return=0, text="hello")
//! ```
//!
//! This keeps the double-buffered tree free of reference cycles and makes
//! pooling the alternate a matter of reusing an index.

mod create;
mod element;
mod fiber;
mod reflection;
mod root;
mod update_queue;

pub use create::*;
pub use element::*;
pub use fiber::*;
pub use root::*;
pub use update_queue::*;
