//! Per-pass traversal context.
//!
//! Everything the work loop threads through a render pass lives here and is
//! passed explicitly, so independent reconcilers never share state.

use crate::config::ReconcilerConfig;
use crate::host::HostConfig;

use super::host_context::HostContextStack;
use super::hydration::HydrationContext;
use super::stack::FiberStack;

pub struct WorkContext<H: HostConfig> {
    pub stack: FiberStack,
    pub host_context: HostContextStack<H>,
    pub hydration: HydrationContext,
}

impl<H: HostConfig> WorkContext<H> {
    pub fn new(config: &ReconcilerConfig) -> Self {
        Self {
            stack: FiberStack::with_config(config),
            host_context: HostContextStack::new(),
            hydration: HydrationContext::with_config(config),
        }
    }

    /// Unwind an abandoned or finished pass.
    pub fn reset(&mut self) {
        self.stack.reset();
        self.host_context.reset_host_container();
        self.hydration.reset_hydration_state();
    }
}
