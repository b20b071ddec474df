//! Placeholder bookkeeping for values that are not available yet.
//!
//! When the walk meets a [`Pending`] value it registers it here and emits a marker
//! comment in its place. After the walk, the engine drains the queue: it awaits
//! every registered value, renders what it settled to and substitutes the result
//! for the marker. Rendering a settled value may register new entries, so draining
//! runs in rounds until the queue stays empty.

use alloc::string::String;
use alloc::vec::Vec;
use core::cell::RefCell;

use indexmap::IndexMap;
use uuid::Uuid;

use crate::context::Context;
use crate::node::Pending;

/// The marker comment for a queue entry.
#[must_use]
pub fn marker(id: &str) -> String {
    format!("<!-- core-async:{id} -->")
}

/// The comment that replaces a marker when its value rejects.
///
/// `--` sequences in the message are broken up so the comment cannot be closed
/// early.
#[must_use]
pub fn error_comment(message: &str) -> String {
    format!("<!-- core-async-error: {} -->", message.replace("--", "- -"))
}

/// One registered pending value.
#[derive(Debug, Clone)]
pub struct Entry {
    /// The marker emitted in its place.
    pub marker: String,
    /// The value being waited on.
    pub pending: Pending,
    /// The user context active where the value was met.
    pub context: Context,
}

/// Pending values registered during a render, keyed by marker id.
#[derive(Debug, Default)]
pub struct DeferredQueue {
    entries: RefCell<IndexMap<String, Entry>>,
}

impl DeferredQueue {
    /// Creates an empty queue.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a pending value and returns the marker to emit in its place.
    pub fn register(&self, pending: Pending, context: &Context) -> String {
        let id = Uuid::new_v4().simple().to_string();
        let marker = marker(&id);
        tracing::trace!(%id, "registered pending value");
        self.entries.borrow_mut().insert(
            id,
            Entry {
                marker: marker.clone(),
                pending,
                context: context.clone(),
            },
        );
        marker
    }

    /// Removes every entry, returning them in registration order.
    pub fn take(&self) -> Vec<Entry> {
        self.entries.borrow_mut().drain(..).map(|(_, entry)| entry).collect()
    }

    /// Forgets every entry.
    pub fn clear(&self) {
        self.entries.borrow_mut().clear();
    }

    /// Number of entries waiting.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.borrow().len()
    }

    /// Returns `true` if nothing is waiting.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.borrow().is_empty()
    }
}
