//! Weakly-held observer registries.
//!
//! An [`ObserverList<T>`] keeps a set of trait-object observers keyed by an
//! [`ObserverId`]. Observers are held through `Weak`, so registering with a
//! subject never extends the observer's lifetime; dropped observers are
//! skipped and pruned the next time the list is walked.
//!
//! Notification goes through [`ObserverList::snapshot`], which upgrades the
//! live observers and releases the internal lock before returning. Observers
//! may therefore register or unregister other observers while being notified.
//!
//! # Example
//!
//! ```
//! use std::sync::Arc;
//! use trellis_core::ObserverList;
//!
//! trait Listener: Send + Sync {
//!     fn notify(&self, value: i32);
//! }
//!
//! struct Printer;
//! impl Listener for Printer {
//!     fn notify(&self, value: i32) {
//!         println!("got {value}");
//!     }
//! }
//!
//! let listeners: ObserverList<dyn Listener> = ObserverList::new();
//! let printer: Arc<dyn Listener> = Arc::new(Printer);
//! let id = listeners.register(&printer);
//!
//! for listener in listeners.snapshot() {
//!     listener.notify(1);
//! }
//!
//! assert!(listeners.unregister(id));
//! ```

use std::sync::{Arc, Weak};

use parking_lot::Mutex;
use slotmap::{SlotMap, new_key_type};

new_key_type! {
    /// Identifies one registration in an [`ObserverList`].
    pub struct ObserverId;
}

/// A registry of weakly-held observers.
pub struct ObserverList<T: ?Sized> {
    entries: Mutex<SlotMap<ObserverId, Weak<T>>>,
}

impl<T: ?Sized> Default for ObserverList<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: ?Sized> ObserverList<T> {
    /// Create an empty observer list.
    pub fn new() -> Self {
        Self {
            entries: Mutex::new(SlotMap::with_key()),
        }
    }

    /// Register an observer.
    ///
    /// Registering the same observer twice returns the existing id.
    pub fn register(&self, observer: &Arc<T>) -> ObserverId {
        let mut entries = self.entries.lock();
        let existing = entries.iter().find_map(|(id, weak)| {
            std::ptr::addr_eq(weak.as_ptr(), Arc::as_ptr(observer)).then_some(id)
        });
        if let Some(id) = existing {
            return id;
        }
        let id = entries.insert(Arc::downgrade(observer));
        tracing::trace!(target: crate::logging::targets::OBSERVER, observer_count = entries.len(), "observer registered");
        id
    }

    /// Remove a registration by id.
    ///
    /// Returns `true` if the id was registered.
    pub fn unregister(&self, id: ObserverId) -> bool {
        self.entries.lock().remove(id).is_some()
    }

    /// Remove a registration by observer identity.
    ///
    /// Returns `true` if the observer was registered.
    pub fn unregister_observer(&self, observer: &Arc<T>) -> bool {
        let mut entries = self.entries.lock();
        let before = entries.len();
        entries.retain(|_, weak| !std::ptr::addr_eq(weak.as_ptr(), Arc::as_ptr(observer)));
        entries.len() != before
    }

    /// Returns `true` if the id refers to a live registration.
    pub fn contains(&self, id: ObserverId) -> bool {
        self.entries
            .lock()
            .get(id)
            .is_some_and(|weak| weak.strong_count() > 0)
    }

    /// Number of registrations whose observer is still alive.
    pub fn len(&self) -> usize {
        self.entries
            .lock()
            .values()
            .filter(|weak| weak.strong_count() > 0)
            .count()
    }

    /// Returns `true` if no live observer is registered.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Collect the live observers.
    ///
    /// Registrations whose observer has been dropped are pruned.
    pub fn snapshot(&self) -> Vec<Arc<T>> {
        let mut entries = self.entries.lock();
        let before = entries.len();
        entries.retain(|_, weak| weak.strong_count() > 0);
        if entries.len() != before {
            crate::trellis_debug!(dropped = before - entries.len(), "pruned dead observers");
        }
        entries.values().filter_map(Weak::upgrade).collect()
    }

    /// Remove every registration.
    pub fn clear(&self) {
        self.entries.lock().clear();
    }
}
