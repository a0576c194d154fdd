use std::fmt::{Display, Formatter, Result};

use serde::Serialize;

/// Lifecycle of the single consumer. There is no way back from `Terminated`;
/// recovery from a broker disconnect is a process restart.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum WorkerState {
    Disconnected,
    Connecting,
    Connected,
    DeclaringQueue,
    Consuming,
    Terminated,
}

impl Display for WorkerState {
    fn fmt(&self, f: &mut Formatter<'_>) -> Result {
        match self {
            WorkerState::Disconnected => write!(f, "disconnected"),
            WorkerState::Connecting => write!(f, "connecting"),
            WorkerState::Connected => write!(f, "connected"),
            WorkerState::DeclaringQueue => write!(f, "declaring_queue"),
            WorkerState::Consuming => write!(f, "consuming"),
            WorkerState::Terminated => write!(f, "terminated"),
        }
    }
}
