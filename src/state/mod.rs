//! State Module - Traversal state threaded through a render pass
//!
//! - **Stack** - Cursors with save/restore on one shared stack
//! - **Host context** - Root container and per-depth host context
//! - **Hydration** - Adopting a pre-existing host tree
//! - **Work** - The bundle the work loop carries

mod host_context;
mod hydration;
mod stack;
mod work;

pub use host_context::*;
pub use hydration::*;
pub use stack::*;
pub use work::*;
