//! Operation registry
//!
//! Holds retry failure counters and circuit records in two separate maps.
//! The registry is an ordinary value: the application builds one at startup
//! and hands `Arc` clones to every executor and breaker that should share
//! history. Entries are created lazily and removed only by an explicit
//! clear or reset.

use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;
use std::time::Instant;

use chrono::{DateTime, Utc};
use dashmap::DashMap;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use super::circuit_breaker::{CircuitRecord, CircuitState};
use super::clock::{Clock, SystemClock};

/// Keyed store of retry counters and circuit state
pub struct OperationRegistry {
    retry_failures: DashMap<String, u32>,
    circuits: DashMap<String, CircuitRecord>,
    clock: Arc<dyn Clock>,
}

impl fmt::Debug for OperationRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OperationRegistry")
            .field("retry_failures", &self.retry_failures.len())
            .field("circuits", &self.circuits.len())
            .finish_non_exhaustive()
    }
}

impl Default for OperationRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl OperationRegistry {
    /// Registry on the system clock
    pub fn new() -> Self {
        Self::with_clock(SystemClock)
    }

    /// Registry on a custom clock (use `MockClock` in tests)
    pub fn with_clock<C: Clock>(clock: C) -> Self {
        Self { retry_failures: DashMap::new(), circuits: DashMap::new(), clock: Arc::new(clock) }
    }

    /// Shared handle, the usual way to inject the registry
    pub fn shared() -> Arc<Self> {
        Arc::new(Self::new())
    }

    pub fn clock(&self) -> &dyn Clock {
        self.clock.as_ref()
    }

    // -------------------------------------------------------------------------
    // Retry counters
    // -------------------------------------------------------------------------

    /// Add one final failure for `operation`, returning the new count
    pub fn increment_failure(&self, operation: &str) -> u32 {
        let mut entry = self.retry_failures.entry(operation.to_string()).or_insert(0);
        *entry = entry.saturating_add(1);
        *entry
    }

    /// Drop the failure counter for `operation`; `true` if one existed
    pub fn clear_failure(&self, operation: &str) -> bool {
        self.retry_failures.remove(operation).is_some()
    }

    pub fn failure_count(&self, operation: &str) -> u32 {
        self.retry_failures.get(operation).map_or(0, |count| *count)
    }

    // -------------------------------------------------------------------------
    // Circuits
    // -------------------------------------------------------------------------

    /// Snapshot of the circuit for `operation`, creating a closed one if absent
    pub fn get_or_create_circuit(&self, operation: &str) -> CircuitRecord {
        let now = self.clock.now();
        self.circuits
            .entry(operation.to_string())
            .or_insert_with(|| CircuitRecord::new(now))
            .clone()
    }

    /// Snapshot of the circuit for `operation`, if one exists
    pub fn circuit(&self, operation: &str) -> Option<CircuitRecord> {
        self.circuits.get(operation).map(|record| record.clone())
    }

    /// Mutate the circuit for `operation` under its shard lock.
    ///
    /// The closure must not block; it receives the current instant from the
    /// registry clock.
    pub(crate) fn update_circuit<R>(
        &self,
        operation: &str,
        update: impl FnOnce(&mut CircuitRecord, Instant) -> R,
    ) -> R {
        let now = self.clock.now();
        let mut record =
            self.circuits.entry(operation.to_string()).or_insert_with(|| CircuitRecord::new(now));
        update(&mut *record, now)
    }

    pub(crate) fn release_trial(&self, operation: &str) {
        if let Some(mut record) = self.circuits.get_mut(operation) {
            record.trial_in_flight = false;
            debug!(operation, "Released abandoned half-open trial");
        }
    }

    /// Remove the circuit for `operation`; `true` if one existed
    pub fn reset_circuit(&self, operation: &str) -> bool {
        let removed = self.circuits.remove(operation).is_some();
        if removed {
            info!(operation, "Circuit reset");
        }
        removed
    }

    // -------------------------------------------------------------------------
    // Whole registry
    // -------------------------------------------------------------------------

    /// Clear every retry counter and circuit
    pub fn reset_all(&self) {
        let counters = self.retry_failures.len();
        let circuits = self.circuits.len();
        self.retry_failures.clear();
        self.circuits.clear();
        info!(counters, circuits, "Operation registry reset");
    }

    pub fn is_empty(&self) -> bool {
        self.retry_failures.is_empty() && self.circuits.is_empty()
    }

    /// Point-in-time snapshot suitable for display or serialization
    pub fn get_stats(&self) -> RegistryStats {
        let now = self.clock.now();
        let since = |at: Option<Instant>| {
            at.map(|at| u64::try_from(now.saturating_duration_since(at).as_millis()).unwrap_or(u64::MAX))
        };

        let retry_failures = self
            .retry_failures
            .iter()
            .map(|entry| (entry.key().clone(), *entry.value()))
            .collect();

        let circuits = self
            .circuits
            .iter()
            .map(|entry| {
                let record = entry.value();
                let stats = CircuitStats {
                    state: record.state,
                    failure_count: record.failure_count,
                    millis_since_last_failure: since(record.last_failure_time),
                    millis_since_last_success: since(record.last_success_time),
                    trial_in_flight: record.trial_in_flight,
                };
                (entry.key().clone(), stats)
            })
            .collect();

        RegistryStats {
            captured_at: DateTime::<Utc>::from(self.clock.system_time()),
            retry_failures,
            circuits,
        }
    }
}

/// Serializable view of one circuit
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CircuitStats {
    pub state: CircuitState,
    pub failure_count: u32,
    pub millis_since_last_failure: Option<u64>,
    pub millis_since_last_success: Option<u64>,
    pub trial_in_flight: bool,
}

/// Serializable snapshot of the whole registry
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RegistryStats {
    pub captured_at: DateTime<Utc>,
    pub retry_failures: BTreeMap<String, u32>,
    pub circuits: BTreeMap<String, CircuitStats>,
}

impl RegistryStats {
    /// Keys whose circuit is currently open
    pub fn open_circuits(&self) -> impl Iterator<Item = &str> {
        self.circuits
            .iter()
            .filter(|(_, stats)| stats.state == CircuitState::Open)
            .map(|(key, _)| key.as_str())
    }

    pub fn total_failures(&self) -> u64 {
        self.retry_failures.values().map(|count| u64::from(*count)).sum()
    }
}
