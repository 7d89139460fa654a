use crate::{
    config::Ocr,
    error::ExtractError,
    ocr::{DocumentLocation, JobStatus, StatusPage, TextDetection},
};
use anyhow::{ensure, Result};
use std::time::Duration;
use tokio::time::sleep;
use tracing::{debug, info, warn};

/// Drives one asynchronous text-detection job to a terminal state: submit,
/// poll on a fixed interval under a hard attempt budget, then aggregate
/// paginated line results into one ordered text blob.
///
/// Each job is owned by exactly one call; the attempt counter and accumulated
/// lines are local to that call. The loop suspends at every poll boundary, so
/// many jobs can be polled concurrently without holding a thread each.
pub struct Orchestrator<D: TextDetection> {
    detector: D,
    interval: Duration,
    max_attempts: u32,
}

/// Final text plus the stats a job report wants.
#[derive(Debug)]
pub struct ExtractOutcome {
    pub job_id: String,
    pub text: String,
    pub line_count: usize,
    pub result_pages: u32,
    pub status_queries: u32,
}

impl<D: TextDetection> Orchestrator<D> {
    pub fn new(cfg: &Ocr, detector: D) -> Result<Self> {
        ensure!(cfg.max_poll_attempts > 0, "ocr.max_poll_attempts must be positive");
        Ok(Self {
            detector,
            interval: Duration::from_secs(cfg.poll_interval_seconds),
            max_attempts: cfg.max_poll_attempts,
        })
    }

    /// Starts a detection job against a stored document. Submission failures
    /// are surfaced immediately; the orchestrator never retries them.
    pub async fn submit(&self, location: &DocumentLocation) -> Result<String, ExtractError> {
        let job_id = self
            .detector
            .start_job(location)
            .await
            .map_err(|source| ExtractError::Submission { source })?;
        info!("started text detection job {job_id} for s3://{}/{}", location.bucket, location.key);
        Ok(job_id)
    }

    /// Polls until the job reaches a terminal state, then returns the
    /// aggregated text (all line texts across all result pages, in service
    /// order, joined by newline).
    ///
    /// A transient error while querying status consumes one attempt from the
    /// same budget and retries after the same delay; a service-reported job
    /// failure is fatal. Exhausting the budget while the job is still pending
    /// is a timeout, distinct from failure.
    pub async fn poll_until_complete(&self, job_id: &str) -> Result<ExtractOutcome, ExtractError> {
        let mut attempt: u32 = 0;
        let mut queries: u32 = 0;

        while attempt < self.max_attempts {
            queries += 1;
            match self.detector.job_status(job_id, None).await {
                Ok(page) => match page.status {
                    JobStatus::Succeeded | JobStatus::PartialSuccess => {
                        return self.aggregate(job_id, page, attempt, queries).await;
                    }
                    JobStatus::Failed => {
                        let reason = page
                            .failure_reason
                            .unwrap_or_else(|| "unknown error".to_string());
                        return Err(ExtractError::JobFailed { reason });
                    }
                    JobStatus::InProgress => {
                        debug!("job {job_id} in progress (attempt {attempt})");
                        sleep(self.interval).await;
                        attempt += 1;
                    }
                },
                Err(err) => {
                    if attempt + 1 < self.max_attempts {
                        warn!("status query for job {job_id} failed (attempt {attempt}): {err:#}");
                        sleep(self.interval).await;
                        attempt += 1;
                    } else {
                        return Err(ExtractError::Polling {
                            attempts: attempt + 1,
                            source: err,
                        });
                    }
                }
            }
        }

        Err(ExtractError::JobTimeout {
            attempts: self.max_attempts,
        })
    }

    pub async fn extract(
        &self,
        location: &DocumentLocation,
    ) -> Result<ExtractOutcome, ExtractError> {
        let job_id = self.submit(location).await?;
        self.poll_until_complete(&job_id).await
    }

    /// Follows continuation tokens from a succeeded first page until the
    /// result set is complete. A transient error during pagination retries
    /// the same token on the shared attempt budget; lines collected so far
    /// are never discarded.
    async fn aggregate(
        &self,
        job_id: &str,
        first: StatusPage,
        mut attempt: u32,
        mut queries: u32,
    ) -> Result<ExtractOutcome, ExtractError> {
        let mut lines = first.lines;
        let mut pages: u32 = 1;
        let mut token = first.next_token;

        while let Some(t) = token {
            queries += 1;
            match self.detector.job_status(job_id, Some(&t)).await {
                Ok(page) => {
                    lines.extend(page.lines);
                    pages += 1;
                    token = page.next_token;
                }
                Err(err) => {
                    if attempt + 1 < self.max_attempts {
                        warn!("pagination query for job {job_id} failed (attempt {attempt}): {err:#}");
                        sleep(self.interval).await;
                        attempt += 1;
                        token = Some(t);
                    } else {
                        return Err(ExtractError::Polling {
                            attempts: attempt + 1,
                            source: err,
                        });
                    }
                }
            }
        }

        info!(
            "job {job_id} succeeded: {} lines over {pages} result pages ({queries} status queries)",
            lines.len()
        );

        Ok(ExtractOutcome {
            job_id: job_id.to_string(),
            line_count: lines.len(),
            text: lines.join("\n"),
            result_pages: pages,
            status_queries: queries,
        })
    }
}
