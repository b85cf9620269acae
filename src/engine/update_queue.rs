//! Update queues.
//!
//! Pending updates on a fiber, kept sorted by urgency. Updates of equal
//! priority are processed first-submitted-first. The queue is shared between
//! a fiber and its alternate, so a work-in-progress pass sees the same list
//! the current tree does.

use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

use crate::error::Result;
use crate::types::{FiberId, Priority};

use super::element::Element;
use super::fiber::FiberArena;

/// Attribute changes computed by the renderer while hydrating a host node.
pub type UpdatePayload = Vec<(String, String)>;

/// Callback run once an update has been committed.
pub type UpdateCallback = Box<dyn FnOnce()>;

/// Partial state carried by a top-level update.
#[derive(Debug, Clone, Default)]
pub struct RootState {
    pub element: Option<Element>,
}

pub struct Update {
    pub priority: Priority,
    pub partial_state: RootState,
    pub callback: Option<UpdateCallback>,
    /// Set when the element is `None`: the tree is being unmounted.
    pub is_top_level_unmount: bool,
}

impl fmt::Debug for Update {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Update")
            .field("priority", &self.priority)
            .field("partial_state", &self.partial_state)
            .field("has_callback", &self.callback.is_some())
            .field("is_top_level_unmount", &self.is_top_level_unmount)
            .finish()
    }
}

// =============================================================================
// UpdateList
// =============================================================================

/// Priority-ordered list of updates.
#[derive(Debug, Default)]
pub struct UpdateList {
    updates: Vec<Update>,
}

impl UpdateList {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.updates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.updates.is_empty()
    }

    /// Insert after every update that is at least as urgent. Returns the
    /// position the update landed at.
    pub fn insert(&mut self, update: Update) -> usize {
        let position = self
            .updates
            .iter()
            .position(|existing| existing.priority > update.priority)
            .unwrap_or(self.updates.len());
        self.updates.insert(position, update);
        position
    }

    /// Most urgent pending priority, or `NO_WORK`.
    pub fn pending_priority(&self) -> Priority {
        self.updates
            .first()
            .map(|update| update.priority)
            .unwrap_or(Priority::NO_WORK)
    }

    /// Remove and return every update at least as urgent as `priority`, in
    /// processing order.
    pub fn take_pending(&mut self, priority: Priority) -> Vec<Update> {
        let split = self
            .updates
            .iter()
            .position(|update| update.priority > priority)
            .unwrap_or(self.updates.len());
        self.updates.drain(..split).collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Update> {
        self.updates.iter()
    }

    fn truncate_after(&mut self, position: usize) {
        self.updates.truncate(position + 1);
    }
}

// =============================================================================
// UpdateQueue
// =============================================================================

/// What a fiber's `update_queue` slot holds.
#[derive(Debug, Clone)]
pub enum UpdateQueue {
    /// Pending updates, shared with the alternate.
    Updates(Rc<RefCell<UpdateList>>),
    /// Host node changes found during hydration.
    HostPayload(Rc<UpdatePayload>),
}

impl UpdateQueue {
    pub fn updates(&self) -> Option<&Rc<RefCell<UpdateList>>> {
        match self {
            UpdateQueue::Updates(list) => Some(list),
            UpdateQueue::HostPayload(_) => None,
        }
    }

    pub fn host_payload(&self) -> Option<&UpdatePayload> {
        match self {
            UpdateQueue::HostPayload(payload) => Some(payload),
            UpdateQueue::Updates(_) => None,
        }
    }
}

impl FiberArena {
    /// The update list of `fiber`, created (and shared with the alternate)
    /// on first use.
    pub fn ensure_update_list(&mut self, fiber: FiberId) -> Result<Rc<RefCell<UpdateList>>> {
        if let Some(list) = self.get(fiber)?.update_queue.as_ref().and_then(UpdateQueue::updates) {
            return Ok(list.clone());
        }

        let list = Rc::new(RefCell::new(UpdateList::new()));
        self[fiber].update_queue = Some(UpdateQueue::Updates(list.clone()));
        if let Some(alternate) = self[fiber].alternate {
            let shared = self[alternate].update_queue.as_ref().and_then(UpdateQueue::updates).cloned();
            match shared {
                // The alternate already had a list; share that one instead.
                Some(existing) => {
                    self[fiber].update_queue = Some(UpdateQueue::Updates(existing.clone()));
                    return Ok(existing);
                }
                None => self[alternate].update_queue = Some(UpdateQueue::Updates(list.clone())),
            }
        }
        Ok(list)
    }

    /// Queue a top-level update carrying `{ element }` on a root fiber.
    ///
    /// Unmounting (`element == None`) drops every update queued after it so
    /// the tree is not remounted by a stale update.
    pub fn add_top_level_update(
        &mut self,
        fiber: FiberId,
        partial_state: RootState,
        callback: Option<UpdateCallback>,
        priority: Priority,
    ) -> Result<()> {
        let is_top_level_unmount = partial_state.element.is_none();
        let update = Update {
            priority,
            partial_state,
            callback,
            is_top_level_unmount,
        };

        let list = self.ensure_update_list(fiber)?;
        let mut list = list.borrow_mut();
        let position = list.insert(update);
        if is_top_level_unmount {
            list.truncate_after(position);
        }
        Ok(())
    }

    /// Most urgent priority queued on `fiber`.
    pub fn pending_update_priority(&self, fiber: FiberId) -> Priority {
        self.get(fiber)
            .ok()
            .and_then(|f| f.update_queue.as_ref())
            .and_then(UpdateQueue::updates)
            .map(|list| list.borrow().pending_priority())
            .unwrap_or(Priority::NO_WORK)
    }
}
