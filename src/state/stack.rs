//! Cursor stack - scoped values across an interruptible traversal.
//!
//! A [`Cursor`] is a single slot. Its history lives in a [`FiberStack`]
//! shared by every cursor of a pass, so the whole pass can be unwound in
//! one call when it is abandoned:
//!
//! ```text
//! push(c, v1, A)   stack: [default]          c = v1
//! push(c, v2, B)   stack: [default, v1]      c = v2
//! pop(c, B)        stack: [default]          c = v1
//! pop(c, A)        stack: []                 c = default
//! ```
//!
//! Callers pair every push on entering a fiber with exactly one pop on
//! leaving it. The stack only detects violations (with diagnostics on), it
//! does not prevent them.

use std::any::Any;

use tracing::warn;

use crate::config::ReconcilerConfig;
use crate::types::FiberId;

// =============================================================================
// Cursor
// =============================================================================

/// A single mutable slot with stack-discipline save/restore.
#[derive(Debug, Clone)]
pub struct Cursor<T> {
    current: T,
}

impl<T> Cursor<T> {
    pub fn new(default_value: T) -> Self {
        Self {
            current: default_value,
        }
    }

    pub fn current(&self) -> &T {
        &self.current
    }

    /// Overwrite the slot without touching the stack.
    pub fn reset_to(&mut self, value: T) {
        self.current = value;
    }
}

// =============================================================================
// FiberStack
// =============================================================================

struct StackEntry {
    value: Box<dyn Any>,
    owner: FiberId,
}

/// History shared by every cursor of one traversal.
pub struct FiberStack {
    entries: Vec<StackEntry>,
    diagnostics: bool,
    violations: usize,
}

impl Default for FiberStack {
    fn default() -> Self {
        Self::new()
    }
}

impl FiberStack {
    pub fn new() -> Self {
        Self::with_config(&ReconcilerConfig::default())
    }

    pub fn with_config(config: &ReconcilerConfig) -> Self {
        Self {
            entries: Vec::new(),
            diagnostics: config.diagnostics,
            violations: 0,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Number of outstanding pushes.
    pub fn depth(&self) -> usize {
        self.entries.len()
    }

    /// Discipline violations seen so far. Owner mismatches and empty pops
    /// are only counted with diagnostics on.
    pub fn violations(&self) -> usize {
        self.violations
    }

    /// Save the cursor's value and replace it with `value`.
    pub fn push<T: 'static>(&mut self, cursor: &mut Cursor<T>, value: T, owner: FiberId) {
        let previous = std::mem::replace(&mut cursor.current, value);
        self.entries.push(StackEntry {
            value: Box::new(previous),
            owner,
        });
    }

    /// Restore the value saved by the matching push.
    ///
    /// An owner mismatch is reported but the value is still restored.
    pub fn pop<T: 'static>(&mut self, cursor: &mut Cursor<T>, owner: FiberId) {
        let Some(entry) = self.entries.pop() else {
            if self.diagnostics {
                self.violations += 1;
                warn!(%owner, "unexpected pop");
            }
            return;
        };

        if self.diagnostics && entry.owner != owner {
            self.violations += 1;
            warn!(expected = %entry.owner, popped = %owner, "unexpected fiber popped");
        }

        match entry.value.downcast::<T>() {
            Ok(previous) => cursor.current = *previous,
            Err(_) => {
                // Saved by a cursor of another type: nothing to restore.
                self.violations += 1;
                warn!(%owner, "unbalanced pop: saved value belongs to another cursor");
            }
        }
    }

    /// Drop every outstanding push. Used when a pass is abandoned.
    pub fn reset(&mut self) {
        self.entries.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const A: FiberId = FiberId(1);
    const B: FiberId = FiberId(2);

    fn stack() -> FiberStack {
        FiberStack::with_config(&ReconcilerConfig::diagnostic())
    }

    #[test]
    fn test_round_trip() {
        let mut stack = stack();
        let mut cursor = Cursor::new("default");

        stack.push(&mut cursor, "v1", A);
        stack.push(&mut cursor, "v2", B);
        assert_eq!(*cursor.current(), "v2");

        stack.pop(&mut cursor, B);
        assert_eq!(*cursor.current(), "v1");

        stack.pop(&mut cursor, A);
        assert_eq!(*cursor.current(), "default");
        assert!(stack.is_empty());
        assert_eq!(stack.violations(), 0);
    }

    #[test]
    fn test_cursors_share_one_stack() {
        let mut stack = stack();
        let mut names = Cursor::new(String::from("root"));
        let mut depth = Cursor::new(0usize);

        stack.push(&mut names, "div".to_string(), A);
        stack.push(&mut depth, 1, A);
        assert_eq!(stack.depth(), 2);

        stack.pop(&mut depth, A);
        stack.pop(&mut names, A);
        assert_eq!(names.current(), "root");
        assert_eq!(*depth.current(), 0);
    }

    #[test]
    fn test_owner_mismatch_still_restores() {
        let mut stack = stack();
        let mut cursor = Cursor::new(0);

        stack.push(&mut cursor, 1, A);
        stack.pop(&mut cursor, B);

        assert_eq!(*cursor.current(), 0);
        assert_eq!(stack.violations(), 1);
    }

    #[test]
    fn test_unexpected_pop() {
        let mut stack = stack();
        let mut cursor = Cursor::new(7);
        stack.pop(&mut cursor, A);
        assert_eq!(*cursor.current(), 7);
        assert_eq!(stack.violations(), 1);
    }

    #[test]
    fn test_no_checks_without_diagnostics() {
        let mut stack = FiberStack::with_config(&ReconcilerConfig::default().with_diagnostics(false));
        let mut cursor = Cursor::new(0);
        stack.push(&mut cursor, 1, A);
        stack.pop(&mut cursor, B);
        stack.pop(&mut cursor, B);
        assert_eq!(*cursor.current(), 0);
        assert_eq!(stack.violations(), 0);
    }

    #[test]
    fn test_reset_unwinds() {
        let mut stack = stack();
        let mut cursor = Cursor::new(0);
        stack.push(&mut cursor, 1, A);
        stack.push(&mut cursor, 2, B);

        stack.reset();
        assert!(stack.is_empty());
        // Reset leaves the slot alone; owners restore their own defaults.
        assert_eq!(*cursor.current(), 2);
    }

    proptest::proptest! {
        #[test]
        fn prop_balanced_pushes_restore_default(values in proptest::collection::vec(0i32..1000, 0..32)) {
            let mut stack = stack();
            let mut cursor = Cursor::new(-1);
            for (i, value) in values.iter().enumerate() {
                stack.push(&mut cursor, *value, FiberId(i as u32));
            }
            for i in (0..values.len()).rev() {
                stack.pop(&mut cursor, FiberId(i as u32));
                let expected = if i == 0 { -1 } else { values[i - 1] };
                proptest::prop_assert_eq!(*cursor.current(), expected);
            }
            proptest::prop_assert!(stack.is_empty());
            proptest::prop_assert_eq!(stack.violations(), 0);
        }
    }
}
