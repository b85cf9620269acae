//! Reconciler configuration.
//!
//! One small value handed to every piece at construction time. Diagnostics
//! are a runtime switch rather than a compile-time one, so the same build can
//! run with owner-checked stacks and mismatch callbacks in tests.

/// Construction-time switches for the reconciler.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReconcilerConfig {
    /// Owner checks on stack pops, hydration mismatch callbacks, owner names
    /// in invalid-type errors, and container instrumentation.
    pub diagnostics: bool,
    /// Treat a top-level element whose component opts into async subtree
    /// semantics as async work.
    pub enable_async_subtree_api: bool,
}

impl Default for ReconcilerConfig {
    fn default() -> Self {
        Self {
            diagnostics: cfg!(debug_assertions),
            enable_async_subtree_api: true,
        }
    }
}

impl ReconcilerConfig {
    /// Config with diagnostics explicitly on, whatever the build profile.
    pub fn diagnostic() -> Self {
        Self::default().with_diagnostics(true)
    }

    pub fn with_diagnostics(mut self, enabled: bool) -> Self {
        self.diagnostics = enabled;
        self
    }

    pub fn with_async_subtree_api(mut self, enabled: bool) -> Self {
        self.enable_async_subtree_api = enabled;
        self
    }
}
