use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DocumentLocation {
    pub bucket: String,
    pub key: String,
}

/// Service-reported job status. Timed-out and never-submitted outcomes are
/// local to the orchestrator and live in its error taxonomy instead.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum JobStatus {
    InProgress,
    Succeeded,
    PartialSuccess,
    Failed,
}

/// One page of a status query: current status, the line texts on this page
/// (empty while the job is pending), and a continuation token when more
/// result pages remain.
#[derive(Debug, Clone)]
pub struct StatusPage {
    pub status: JobStatus,
    pub lines: Vec<String>,
    pub next_token: Option<String>,
    pub failure_reason: Option<String>,
}
