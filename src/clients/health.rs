use std::sync::{
    Arc, RwLock,
    atomic::{AtomicU64, Ordering},
};

use chrono::{SecondsFormat, Utc};
use tracing::debug;

use crate::models::{
    health::{HealthCheckResponse, HealthStatus, MessageCounters},
    status::WorkerState,
};

#[derive(Debug)]
struct StatusInner {
    state: RwLock<WorkerState>,
    received: AtomicU64,
    delivered: AtomicU64,
    failed: AtomicU64,
    malformed: AtomicU64,
}

/// Shared view of the consumer. Written by the worker, read by the health
/// endpoint.
#[derive(Debug, Clone)]
pub struct WorkerStatus {
    inner: Arc<StatusInner>,
}

impl Default for WorkerStatus {
    fn default() -> Self {
        Self::new()
    }
}

impl WorkerStatus {
    pub fn new() -> Self {
        Self {
            inner: Arc::new(StatusInner {
                state: RwLock::new(WorkerState::Disconnected),
                received: AtomicU64::new(0),
                delivered: AtomicU64::new(0),
                failed: AtomicU64::new(0),
                malformed: AtomicU64::new(0),
            }),
        }
    }

    pub fn state(&self) -> WorkerState {
        match self.inner.state.read() {
            Ok(state) => *state,
            Err(poisoned) => *poisoned.into_inner(),
        }
    }

    pub fn transition(&self, next: WorkerState) {
        let mut state = match self.inner.state.write() {
            Ok(state) => state,
            Err(poisoned) => poisoned.into_inner(),
        };

        if *state == WorkerState::Terminated {
            return;
        }

        let previous = *state;
        debug!(from = %previous, to = %next, "Worker state changed");
        *state = next;
    }

    pub fn record_received(&self) {
        self.inner.received.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_delivered(&self) {
        self.inner.delivered.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_failed(&self) {
        self.inner.failed.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_malformed(&self) {
        self.inner.malformed.fetch_add(1, Ordering::Relaxed);
    }

    pub fn counters(&self) -> MessageCounters {
        MessageCounters {
            received: self.inner.received.load(Ordering::Relaxed),
            delivered: self.inner.delivered.load(Ordering::Relaxed),
            failed: self.inner.failed.load(Ordering::Relaxed),
            malformed: self.inner.malformed.load(Ordering::Relaxed),
        }
    }
}

pub struct HealthChecker {
    status: WorkerStatus,
}

impl HealthChecker {
    pub fn new(status: WorkerStatus) -> Self {
        Self { status }
    }

    pub fn check(&self) -> HealthCheckResponse {
        let state = self.status.state();

        let status = match state {
            WorkerState::Consuming => HealthStatus::Healthy,
            _ => HealthStatus::Unhealthy,
        };

        HealthCheckResponse {
            status,
            state,
            counters: self.status.counters(),
            timestamp: Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true),
        }
    }
}
