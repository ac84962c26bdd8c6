// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Callback registry.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use parking_lot::RwLock;

use crate::state::{CapabilityChange, CapabilityValues};

/// Identifies a registered callback so it can be removed again.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

impl SubscriptionId {
    /// Returns the raw id.
    #[must_use]
    pub fn value(&self) -> u64 {
        self.0
    }
}

impl fmt::Display for SubscriptionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Sub({})", self.0)
    }
}

type ReconciledCallback = Arc<dyn Fn(&CapabilityValues) + Send + Sync>;
type ChangeCallback = Arc<dyn Fn(&CapabilityChange) + Send + Sync>;
type HaltedCallback = Arc<dyn Fn() + Send + Sync>;

/// Callbacks registered for one device.
///
/// Dispatch takes a snapshot of the registered callbacks before calling
/// them, so a callback may register or unsubscribe without deadlocking.
pub struct CallbackRegistry {
    next_id: AtomicU64,
    reconciled: RwLock<HashMap<SubscriptionId, ReconciledCallback>>,
    changed: RwLock<HashMap<SubscriptionId, ChangeCallback>>,
    halted: RwLock<HashMap<SubscriptionId, HaltedCallback>>,
}

impl CallbackRegistry {
    /// Creates an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self {
            next_id: AtomicU64::new(1),
            reconciled: RwLock::new(HashMap::new()),
            changed: RwLock::new(HashMap::new()),
            halted: RwLock::new(HashMap::new()),
        }
    }

    fn next_id(&self) -> SubscriptionId {
        SubscriptionId(self.next_id.fetch_add(1, Ordering::Relaxed))
    }

    /// Registers a callback run once per successful poll with all values.
    pub fn on_reconciled<F>(&self, callback: F) -> SubscriptionId
    where
        F: Fn(&CapabilityValues) + Send + Sync + 'static,
    {
        let id = self.next_id();
        self.reconciled.write().insert(id, Arc::new(callback));
        id
    }

    /// Registers a callback run for each value a poll actually changed.
    pub fn on_capability_changed<F>(&self, callback: F) -> SubscriptionId
    where
        F: Fn(&CapabilityChange) + Send + Sync + 'static,
    {
        let id = self.next_id();
        self.changed.write().insert(id, Arc::new(callback));
        id
    }

    /// Registers a callback run when the bridge rejects the token.
    pub fn on_halted<F>(&self, callback: F) -> SubscriptionId
    where
        F: Fn() + Send + Sync + 'static,
    {
        let id = self.next_id();
        self.halted.write().insert(id, Arc::new(callback));
        id
    }

    /// Removes a callback. Returns `true` if it was registered.
    pub fn unsubscribe(&self, id: SubscriptionId) -> bool {
        self.reconciled.write().remove(&id).is_some()
            || self.changed.write().remove(&id).is_some()
            || self.halted.write().remove(&id).is_some()
    }

    /// Removes every callback.
    pub fn clear(&self) {
        self.reconciled.write().clear();
        self.changed.write().clear();
        self.halted.write().clear();
    }

    /// Returns the number of registered callbacks.
    #[must_use]
    pub fn len(&self) -> usize {
        self.reconciled.read().len() + self.changed.read().len() + self.halted.read().len()
    }

    /// Returns `true` if no callback is registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Runs the callbacks for a successful poll.
    pub(crate) fn dispatch_reconciled(&self, values: &CapabilityValues, changes: &[CapabilityChange]) {
        let changed: Vec<ChangeCallback> = self.changed.read().values().cloned().collect();
        for change in changes {
            for callback in &changed {
                callback(change);
            }
        }

        let reconciled: Vec<ReconciledCallback> = self.reconciled.read().values().cloned().collect();
        for callback in reconciled {
            callback(values);
        }
    }

    /// Runs the callbacks for a halted device.
    pub(crate) fn dispatch_halted(&self) {
        let halted: Vec<HaltedCallback> = self.halted.read().values().cloned().collect();
        for callback in halted {
            callback();
        }
    }
}

impl Default for CallbackRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for CallbackRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CallbackRegistry")
            .field("reconciled", &self.reconciled.read().len())
            .field("changed", &self.changed.read().len())
            .field("halted", &self.halted.read().len())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::AtomicUsize;

    use super::*;
    use crate::capabilities::Capability;

    #[test]
    fn ids_are_unique() {
        let registry = CallbackRegistry::new();
        let a = registry.on_halted(|| {});
        let b = registry.on_reconciled(|_| {});
        assert_ne!(a, b);
        assert_eq!(registry.len(), 2);
    }

    #[test]
    fn reconciled_runs_once_per_dispatch() {
        let registry = CallbackRegistry::new();
        let calls = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&calls);
        registry.on_reconciled(move |_| {
            counter.fetch_add(1, Ordering::SeqCst);
        });

        registry.dispatch_reconciled(&CapabilityValues::new(), &[]);
        registry.dispatch_reconciled(&CapabilityValues::new(), &[]);
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn change_callbacks_see_each_change() {
        let registry = CallbackRegistry::new();
        let seen = Arc::new(parking_lot::Mutex::new(Vec::new()));
        let sink = Arc::clone(&seen);
        registry.on_capability_changed(move |change| sink.lock().push(change.capability));

        let changes = [
            CapabilityChange::new(Capability::OnOff, true),
            CapabilityChange::new(Capability::FanMode, "low"),
        ];
        registry.dispatch_reconciled(&CapabilityValues::new(), &changes);
        assert_eq!(*seen.lock(), vec![Capability::OnOff, Capability::FanMode]);
    }

    #[test]
    fn unsubscribe_stops_delivery() {
        let registry = CallbackRegistry::new();
        let calls = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&calls);
        let id = registry.on_halted(move || {
            counter.fetch_add(1, Ordering::SeqCst);
        });

        registry.dispatch_halted();
        assert!(registry.unsubscribe(id));
        assert!(!registry.unsubscribe(id));
        registry.dispatch_halted();
        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert!(registry.is_empty());
    }

    #[test]
    fn callback_may_unsubscribe_itself() {
        let registry = Arc::new(CallbackRegistry::new());
        let inner = Arc::clone(&registry);
        let own_id = Arc::new(parking_lot::Mutex::new(None::<SubscriptionId>));
        let slot = Arc::clone(&own_id);
        let id = registry.on_halted(move || {
            if let Some(id) = *slot.lock() {
                inner.unsubscribe(id);
            }
        });
        *own_id.lock() = Some(id);

        registry.dispatch_halted();
        assert!(registry.is_empty());
    }

    #[test]
    fn clear_removes_everything() {
        let registry = CallbackRegistry::new();
        registry.on_halted(|| {});
        registry.on_capability_changed(|_| {});
        registry.clear();
        assert!(registry.is_empty());
        assert!(format!("{registry:?}").starts_with("CallbackRegistry"));
    }
}
