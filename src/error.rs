//! Error type shared by every fallible reconciler operation.

use thiserror::Error;

use crate::types::{FiberId, RootId};

/// Result alias used across the crate.
pub type Result<T> = std::result::Result<T, ReconcilerError>;

/// Everything the reconciler core can fail with.
///
/// Apart from `InvalidElementType`, these signal an internal consistency bug
/// in whoever drives the traversal and are not meant to be recovered from.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ReconcilerError {
    /// Host context was read before any container was pushed.
    #[error("expected host context to exist; this is a bug in the reconciler driver")]
    MissingHostContext,

    /// An internal invariant did not hold.
    #[error("invariant violated: {0}")]
    InvariantViolation(&'static str),

    /// An element carried a type the reconciler cannot build a fiber for.
    #[error(
        "element type is invalid: expected a string (for built-in components) or a \
         class/function (for composite components) but got: {kind}.{info}"
    )]
    InvalidElementType {
        /// Kind of the offending value (`undefined`, `object`, `number`, ...).
        kind: String,
        /// Diagnostic addendum, empty unless diagnostics are enabled.
        info: String,
    },

    /// Reflection was asked about a fiber that is not attached to a root.
    #[error("unable to find node on an unmounted component")]
    UnmountedComponent,

    #[error("unknown fiber: {0}")]
    UnknownFiber(FiberId),

    #[error("unknown root: {0}")]
    UnknownRoot(RootId),
}
