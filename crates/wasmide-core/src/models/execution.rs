use crate::models::command::Command;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Outcome of dispatching one [`Command`]. Exactly one is produced per command.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum ExecutionResult {
    /// The backend answered with a success status.
    Success { output: String },
    /// The backend answered with a non-success status; `error` is its body.
    Failure { error: String },
    /// No response was obtained.
    TransportError { message: String },
}

impl ExecutionResult {
    pub fn is_success(&self) -> bool {
        matches!(self, ExecutionResult::Success { .. })
    }

    /// Text written to the transcript for this result.
    pub fn transcript_text(&self) -> String {
        match self {
            ExecutionResult::Success { output } => output.clone(),
            ExecutionResult::Failure { error } => format!("Error: {}", error),
            ExecutionResult::TransportError { message } => format!("Error: {}", message),
        }
    }
}

impl fmt::Display for ExecutionResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.transcript_text())
    }
}

/// Bookkeeping for one dispatch: which command, when, and how it ended.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExecutionRecord {
    /// Submission order within the owning session, starting at 0.
    pub seq: u64,
    pub command: Command,
    pub started_at: DateTime<Utc>,
    pub finished_at: Option<DateTime<Utc>>,
    pub result: Option<ExecutionResult>,
}

impl ExecutionRecord {
    pub fn new(seq: u64, command: Command) -> Self {
        Self {
            seq,
            command,
            started_at: Utc::now(),
            finished_at: None,
            result: None,
        }
    }

    pub fn finish(&mut self, result: ExecutionResult) {
        self.finished_at = Some(Utc::now());
        self.result = Some(result);
    }

    pub fn duration_secs(&self) -> Option<f64> {
        self.finished_at
            .map(|end| (end - self.started_at).num_milliseconds() as f64 / 1000.0)
    }

    pub fn is_running(&self) -> bool {
        self.finished_at.is_none()
    }

    pub fn succeeded(&self) -> bool {
        self.result.as_ref().is_some_and(ExecutionResult::is_success)
    }
}
