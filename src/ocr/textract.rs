use super::{DocumentLocation, JobStatus, StatusPage, TextDetection};
use crate::awscli::AwsCli;
use crate::config::{Aws, Ocr};
use anyhow::Result;
use serde::Deserialize;
use std::time::Duration;

/// Textract text detection driven through the `aws` CLI. Credentials and
/// signing stay with the ambient AWS configuration; this only shapes requests
/// and parses the JSON responses.
pub struct TextractCli {
    aws: AwsCli,
    request_timeout: Duration,
}

impl TextractCli {
    pub fn new(aws_cfg: &Aws, ocr_cfg: &Ocr) -> Result<Self> {
        Ok(Self {
            aws: AwsCli::new(&aws_cfg.exe, &aws_cfg.region)?,
            request_timeout: Duration::from_secs(ocr_cfg.request_timeout_seconds.max(1)),
        })
    }
}

impl TextDetection for TextractCli {
    async fn start_job(&self, location: &DocumentLocation) -> Result<String> {
        let document_location = serde_json::json!({
            "S3Object": { "Bucket": location.bucket, "Name": location.key }
        })
        .to_string();

        let out: StartOut = self
            .aws
            .run_json(
                &[
                    "textract",
                    "start-document-text-detection",
                    "--document-location",
                    &document_location,
                ],
                self.request_timeout,
            )
            .await?;
        Ok(out.job_id)
    }

    async fn job_status(&self, job_id: &str, next_token: Option<&str>) -> Result<StatusPage> {
        let mut args = vec![
            "textract",
            "get-document-text-detection",
            "--job-id",
            job_id,
        ];
        if let Some(token) = next_token {
            args.push("--next-token");
            args.push(token);
        }

        let out: GetOut = self.aws.run_json(&args, self.request_timeout).await?;

        let lines = out
            .blocks
            .into_iter()
            .filter(|b| b.block_type == "LINE")
            .filter_map(|b| b.text)
            .collect();

        Ok(StatusPage {
            status: out.job_status,
            lines,
            next_token: out.next_token,
            failure_reason: out.status_message,
        })
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct StartOut {
    job_id: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct GetOut {
    job_status: JobStatus,
    #[serde(default)]
    blocks: Vec<Block>,
    next_token: Option<String>,
    status_message: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct Block {
    block_type: String,
    text: Option<String>,
}
