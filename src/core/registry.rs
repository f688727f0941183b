//! Per-tenant registry of live limiter instances.
//!
//! Maps each API key to the single instance currently enforcing its policy.
//! The map is read-hot: decisions take the read lock plus one per-slot mutex;
//! the write lock is only taken for first creation, reconfiguration
//! replacement, eviction, and reset.

use parking_lot::{Mutex, RwLock};
use std::collections::HashMap;
use std::sync::Arc;
use tracing::debug;

use super::algorithms::{Limiter, LimiterParams};
use super::models::Algorithm;

/// A live limiter and the parameters it was built from.
///
/// `params` is immutable for the slot's lifetime; a parameter change replaces
/// the whole slot. Decisions lock only `limiter`.
#[derive(Debug)]
pub struct LimiterSlot {
    /// Effective parameters this instance enforces
    pub params: LimiterParams,
    /// The algorithm instance, guarded for exclusive decisions
    pub limiter: Mutex<Limiter>,
}

/// Registry of live limiter instances, one per API key.
#[derive(Debug, Default)]
pub struct LimiterRegistry {
    slots: RwLock<HashMap<String, Arc<LimiterSlot>>>,
}

impl LimiterRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Return the live slot for `api_key`, creating or replacing it so that
    /// its parameters equal `params`.
    ///
    /// Replacement discards accumulated state; reconfiguration resets the
    /// tenant's quota.
    pub fn resolve(&self, api_key: &str, params: &LimiterParams, now: f64) -> Arc<LimiterSlot> {
        {
            let slots = self.slots.read();
            if let Some(slot) = slots.get(api_key) {
                if slot.params == *params {
                    return Arc::clone(slot);
                }
            }
        }

        let mut slots = self.slots.write();
        // Re-check: another resolver may have installed the slot while we
        // waited for the write lock.
        if let Some(slot) = slots.get(api_key) {
            if slot.params == *params {
                return Arc::clone(slot);
            }
            debug!(
                api_key,
                algorithm = %params.algorithm,
                "Replacing limiter instance after reconfiguration"
            );
        } else {
            debug!(
                api_key,
                algorithm = %params.algorithm,
                max_requests = params.max_requests,
                window_seconds = params.window_seconds,
                "Creating limiter instance"
            );
        }

        let slot = Arc::new(LimiterSlot {
            params: params.clone(),
            limiter: Mutex::new(Limiter::from_params(params, now)),
        });
        slots.insert(api_key.to_string(), Arc::clone(&slot));
        slot
    }

    /// Drop the live instance for `api_key`, if any.
    ///
    /// The next decision rebuilds it from the stored configuration.
    pub fn evict(&self, api_key: &str) {
        if self.slots.write().remove(api_key).is_some() {
            debug!(api_key, "Evicted limiter instance");
        }
    }

    /// Discard all instances.
    pub fn reset(&self) {
        self.slots.write().clear();
    }

    /// Number of live instances.
    pub fn len(&self) -> usize {
        self.slots.read().len()
    }

    /// Whether any instances are live.
    pub fn is_empty(&self) -> bool {
        self.slots.read().is_empty()
    }

    /// Live instance count per algorithm, for the system status view.
    pub fn active_counts(&self) -> HashMap<Algorithm, usize> {
        let mut counts: HashMap<Algorithm, usize> =
            Algorithm::ALL.iter().map(|&a| (a, 0)).collect();
        for slot in self.slots.read().values() {
            *counts.entry(slot.params.algorithm).or_insert(0) += 1;
        }
        counts
    }
}
