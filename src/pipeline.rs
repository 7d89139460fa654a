use crate::{
    chunker,
    config::Config,
    ocr::TextDetection,
    orchestrator::Orchestrator,
    report::{ChunkingReport, InputReport, JobReport, OcrReport},
    store::{content_type, DocumentStore},
};
use anyhow::{anyhow, Context, Result};
use std::path::Path;
use tracing::info;

/// Sequences one document end to end: upload, extract, chunk.
pub struct Pipeline<S: DocumentStore, D: TextDetection> {
    cfg: Config,
    store: S,
    orchestrator: Orchestrator<D>,
}

#[derive(Debug)]
pub struct JobOutput {
    pub text: String,
    pub chunks: Vec<String>,
    pub report: JobReport,
}

impl<S: DocumentStore, D: TextDetection> Pipeline<S, D> {
    pub fn new(cfg: &Config, store: S, orchestrator: Orchestrator<D>) -> Self {
        Self {
            cfg: cfg.clone(),
            store,
            orchestrator,
        }
    }

    pub async fn run_job(&self, input: &Path) -> Result<JobOutput> {
        let meta = std::fs::metadata(input)
            .with_context(|| format!("stat input: {}", input.display()))?;
        let file_bytes = meta.len();
        if file_bytes == 0 {
            return Err(anyhow!("input is empty: {}", input.display()));
        }
        if file_bytes > self.cfg.limits.max_input_file_bytes {
            return Err(anyhow!(
                "input exceeds max_input_file_bytes: {file_bytes}"
            ));
        }

        let ext = input.extension().and_then(|s| s.to_str()).unwrap_or("bin");

        let location = self.store.put(input).await?;

        let outcome = self.orchestrator.extract(&location).await?;

        let chunks = chunker::chunk(&outcome.text, self.cfg.chunking.max_chars)?;
        info!(
            "chunked {} chars into {} chunks (max_chars={})",
            outcome.text.chars().count(),
            chunks.len(),
            self.cfg.chunking.max_chars
        );

        let report = JobReport {
            input: InputReport {
                path: input.display().to_string(),
                file_bytes,
                content_type: content_type(ext).to_string(),
            },
            location,
            ocr: OcrReport {
                job_id: outcome.job_id,
                status_queries: outcome.status_queries,
                result_pages: outcome.result_pages,
                line_count: outcome.line_count,
            },
            chunking: ChunkingReport {
                max_chars: self.cfg.chunking.max_chars,
                chunk_count: chunks.len(),
                total_chars: chunks.iter().map(|c| c.chars().count()).sum(),
            },
        };

        Ok(JobOutput {
            text: outcome.text,
            chunks,
            report,
        })
    }
}
