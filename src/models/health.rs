use serde::Serialize;

use crate::models::status::WorkerState;

#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "lowercase")]
pub enum HealthStatus {
    Healthy,
    Unhealthy,
}

#[derive(Debug, Clone, Copy, Default, Serialize, PartialEq, Eq)]
pub struct MessageCounters {
    pub received: u64,
    pub delivered: u64,
    pub failed: u64,
    pub malformed: u64,
}

#[derive(Debug, Clone, Serialize)]
pub struct HealthCheckResponse {
    pub status: HealthStatus,
    pub state: WorkerState,
    pub counters: MessageCounters,
    pub timestamp: String,
}
