//! Core types for spark-reconciler.
//!
//! These types define the vocabulary every other module speaks: what kind of
//! work a fiber represents, how urgent it is, which side effects it carries,
//! and the opaque handles a renderer hands us for its own nodes.

use std::fmt;

// =============================================================================
// Ids
// =============================================================================

/// Stable address of a fiber record inside a [`FiberArena`](crate::FiberArena).
///
/// Fibers are NOT objects. They are indices into the arena, so links between
/// them never form reference cycles.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct FiberId(pub(crate) u32);

impl FiberId {
    /// Raw index into the arena.
    #[inline]
    pub const fn index(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Display for FiberId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "fiber#{}", self.0)
    }
}

/// Stable address of a [`FiberRoot`](crate::FiberRoot) inside the arena.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct RootId(pub(crate) u32);

impl RootId {
    /// Raw index into the arena's root table.
    #[inline]
    pub const fn index(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Display for RootId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "root#{}", self.0)
    }
}

// =============================================================================
// Host handles
// =============================================================================

/// Opaque handle to a renderer-owned node (element or text).
///
/// The renderer decides what the number means; the reconciler only stores,
/// compares and hands it back.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct HostInstance(pub usize);

/// Opaque handle to a renderer-owned container (the thing a root or portal
/// renders into).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ContainerInfo(pub usize);

/// A parent in the host tree: either a container or a host node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HostParent {
    Container(ContainerInfo),
    Instance(HostInstance),
}

// =============================================================================
// WorkTag
// =============================================================================

/// The kind of work a fiber represents.
///
/// Every branch point matches on this exhaustively.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum WorkTag {
    /// Component whose kind is resolved on first render.
    IndeterminateComponent,
    /// Component carrying the component-instance marker.
    ClassComponent,
    /// Root of a host tree.
    HostRoot,
    /// Subtree rendered into a different container.
    HostPortal,
    /// Host element (`div`, `box`, ...).
    HostComponent,
    /// Host text node.
    HostText,
    CoroutineComponent,
    YieldComponent,
    Fragment,
}

impl WorkTag {
    /// True for tags that own a host node.
    #[inline]
    pub const fn is_host(self) -> bool {
        matches!(self, WorkTag::HostComponent | WorkTag::HostText)
    }
}

// =============================================================================
// Priority
// =============================================================================

/// Urgency of pending work.
///
/// Lower non-zero values are MORE urgent. `NO_WORK` (zero) means nothing is
/// pending and loses to every real priority.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub struct Priority(pub u8);

impl Priority {
    pub const NO_WORK: Self = Self(0);
    pub const SYNCHRONOUS: Self = Self(1);
    pub const TASK: Self = Self(2);
    pub const HIGH: Self = Self(3);
    pub const LOW: Self = Self(4);
    pub const OFFSCREEN: Self = Self(5);

    /// Check if this is the `NO_WORK` sentinel.
    #[inline]
    pub const fn is_no_work(self) -> bool {
        self.0 == 0
    }
}

/// Return whichever priority is more urgent.
///
/// `NO_WORK` always loses to a real priority; if both are `NO_WORK` the
/// result is `NO_WORK`.
#[inline]
pub fn larger_priority(p1: Priority, p2: Priority) -> Priority {
    if !p1.is_no_work() && (p2.is_no_work() || p2 > p1) {
        p1
    } else {
        p2
    }
}

// =============================================================================
// Side effects (bitflags)
// =============================================================================

bitflags::bitflags! {
    /// Pending side effects on a fiber, applied by the commit phase.
    ///
    /// Combine with bitwise OR: `EffectTag::PLACEMENT | EffectTag::UPDATE`
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct EffectTag: u16 {
        const NO_EFFECT = 0;
        const PERFORMED_WORK = 1 << 0;
        const PLACEMENT = 1 << 1;
        const UPDATE = 1 << 2;
        const PLACEMENT_AND_UPDATE = Self::PLACEMENT.bits() | Self::UPDATE.bits();
        const DELETION = 1 << 3;
        const CONTENT_RESET = 1 << 4;
        const CALLBACK = 1 << 5;
        const ERR = 1 << 6;
        const REF = 1 << 7;
    }
}

bitflags::bitflags! {
    /// Mode bits inherited by every fiber in a subtree.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct InternalContext: u8 {
        const NO_CONTEXT = 0;
        const ASYNC_UPDATES = 1 << 0;
    }
}
