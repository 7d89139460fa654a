use thiserror::Error;

/// Terminal outcomes of OCR job orchestration. None of these are retried
/// beyond the polling loop's own attempt budget; in particular a failed or
/// timed-out job is never re-submitted.
#[derive(Debug, Error)]
pub enum ExtractError {
    /// The service rejected the submission; no job was created.
    #[error("failed to start text detection job: {source}")]
    Submission {
        #[source]
        source: anyhow::Error,
    },

    /// The service ran the job and reported failure.
    #[error("text detection job failed: {reason}")]
    JobFailed { reason: String },

    /// The attempt budget was exhausted while the job was still pending.
    #[error("text detection job still pending after {attempts} polls")]
    JobTimeout { attempts: u32 },

    /// Status queries kept failing until the retry budget ran out.
    #[error("failed to query job status after {attempts} attempts: {source}")]
    Polling {
        attempts: u32,
        #[source]
        source: anyhow::Error,
    },
}
