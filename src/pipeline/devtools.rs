//! Observer hook for development tools.
//!
//! An observer sees commits and container lifecycle. It is instrumentation:
//! whatever it does, including failing or panicking, must never affect
//! reconciliation. [`DevToolsHook`] enforces that and logs the first failure
//! once per process.

use std::panic::{AssertUnwindSafe, catch_unwind};
use std::sync::atomic::{AtomicBool, Ordering};

use thiserror::Error;
use tracing::warn;

use crate::engine::FiberArena;
use crate::types::{FiberId, RootId};

static HAS_LOGGED_ERROR: AtomicBool = AtomicBool::new(false);

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("observer failed: {0}")]
pub struct ObserverError(pub String);

impl ObserverError {
    pub fn new(message: impl Into<String>) -> Self {
        Self(message.into())
    }
}

/// Receives lifecycle notifications. Every method defaults to a no-op.
pub trait FiberObserver {
    fn on_commit_root(&mut self, _arena: &FiberArena, _root: RootId) -> Result<(), ObserverError> {
        Ok(())
    }

    fn on_commit_unmount(&mut self, _arena: &FiberArena, _fiber: FiberId) -> Result<(), ObserverError> {
        Ok(())
    }

    fn on_mount_container(&mut self, _arena: &FiberArena, _root: RootId) -> Result<(), ObserverError> {
        Ok(())
    }

    fn on_update_container(&mut self, _arena: &FiberArena, _root: RootId) -> Result<(), ObserverError> {
        Ok(())
    }

    fn on_unmount_container(&mut self, _arena: &FiberArena, _root: RootId) -> Result<(), ObserverError> {
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct NoopObserver;

impl FiberObserver for NoopObserver {}

/// Failure-isolating wrapper around an optional observer.
#[derive(Default)]
pub struct DevToolsHook {
    observer: Option<Box<dyn FiberObserver>>,
}

impl DevToolsHook {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn inject(&mut self, observer: Box<dyn FiberObserver>) {
        self.observer = Some(observer);
    }

    pub fn is_injected(&self) -> bool {
        self.observer.is_some()
    }

    pub fn on_commit_root(&mut self, arena: &FiberArena, root: RootId) {
        self.notify("on_commit_root", |observer| observer.on_commit_root(arena, root));
    }

    pub fn on_commit_unmount(&mut self, arena: &FiberArena, fiber: FiberId) {
        self.notify("on_commit_unmount", |observer| observer.on_commit_unmount(arena, fiber));
    }

    pub fn on_mount_container(&mut self, arena: &FiberArena, root: RootId) {
        self.notify("on_mount_container", |observer| observer.on_mount_container(arena, root));
    }

    pub fn on_update_container(&mut self, arena: &FiberArena, root: RootId) {
        self.notify("on_update_container", |observer| observer.on_update_container(arena, root));
    }

    pub fn on_unmount_container(&mut self, arena: &FiberArena, root: RootId) {
        self.notify("on_unmount_container", |observer| observer.on_unmount_container(arena, root));
    }

    fn notify(
        &mut self,
        event: &'static str,
        call: impl FnOnce(&mut dyn FiberObserver) -> Result<(), ObserverError>,
    ) {
        let Some(observer) = self.observer.as_deref_mut() else {
            return;
        };

        let failure = match catch_unwind(AssertUnwindSafe(|| call(observer))) {
            Ok(Ok(())) => return,
            Ok(Err(err)) => err.to_string(),
            Err(_) => "observer panicked".to_string(),
        };

        if !HAS_LOGGED_ERROR.swap(true, Ordering::Relaxed) {
            warn!(event, error = %failure, "devtools observer failed");
        }
    }
}
