pub mod textract;
pub mod types;

use anyhow::Result;

pub use types::{DocumentLocation, JobStatus, StatusPage};

/// Asynchronous text-detection service boundary. `start_job` kicks off a
/// detection job against a stored document; `job_status` reports the current
/// status plus one page of line results, with a continuation token while more
/// pages remain. Errors from either call are transport-level; a job failure is
/// reported in-band via [`StatusPage`].
#[allow(async_fn_in_trait)]
pub trait TextDetection {
    async fn start_job(&self, location: &DocumentLocation) -> Result<String>;
    async fn job_status(&self, job_id: &str, next_token: Option<&str>) -> Result<StatusPage>;
}
