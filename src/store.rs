use crate::awscli::AwsCli;
use crate::config::{Aws, Storage};
use crate::ocr::DocumentLocation;
use anyhow::{anyhow, Context, Result};
use std::path::Path;
use std::time::Duration;
use tracing::info;
use uuid::Uuid;

/// Object-storage boundary: stores a local document and hands back the
/// location reference the OCR service reads from. The orchestrator never
/// mutates storage.
#[allow(async_fn_in_trait)]
pub trait DocumentStore {
    async fn put(&self, file: &Path) -> Result<DocumentLocation>;
}

/// S3 upload through the `aws` CLI, keyed `<prefix>/<uuid>_<filename>`.
pub struct S3CliStore {
    aws: AwsCli,
    bucket: String,
    key_prefix: String,
    request_timeout: Duration,
}

impl S3CliStore {
    pub fn new(aws_cfg: &Aws, storage_cfg: &Storage) -> Result<Self> {
        if storage_cfg.bucket.trim().is_empty() {
            return Err(anyhow!("storage.bucket is not configured"));
        }
        Ok(Self {
            aws: AwsCli::new(&aws_cfg.exe, &aws_cfg.region)?,
            bucket: storage_cfg.bucket.clone(),
            key_prefix: storage_cfg.key_prefix.clone(),
            request_timeout: Duration::from_secs(storage_cfg.request_timeout_seconds.max(1)),
        })
    }
}

impl DocumentStore for S3CliStore {
    async fn put(&self, file: &Path) -> Result<DocumentLocation> {
        let filename = file
            .file_name()
            .ok_or_else(|| anyhow!("input has no filename: {}", file.display()))?
            .to_string_lossy();

        let ext = file
            .extension()
            .and_then(|s| s.to_str())
            .unwrap_or("bin");

        let key = format!("{}/{}_{}", self.key_prefix, Uuid::new_v4(), filename);
        let body = file.display().to_string();

        self.aws
            .run(
                &[
                    "s3api",
                    "put-object",
                    "--bucket",
                    &self.bucket,
                    "--key",
                    &key,
                    "--body",
                    &body,
                    "--content-type",
                    content_type(ext),
                ],
                self.request_timeout,
            )
            .await
            .with_context(|| format!("uploading {}", file.display()))?;

        info!("stored {} as s3://{}/{}", file.display(), self.bucket, key);

        Ok(DocumentLocation {
            bucket: self.bucket.clone(),
            key,
        })
    }
}

/// Document types the OCR service accepts, plus a binary fallback.
pub fn content_type(ext: &str) -> &'static str {
    match ext.to_ascii_lowercase().as_str() {
        "pdf" => "application/pdf",
        "png" => "image/png",
        "jpg" | "jpeg" => "image/jpeg",
        "tiff" | "tif" => "image/tiff",
        _ => "application/octet-stream",
    }
}

pub fn supported_extension(ext: &str) -> bool {
    matches!(
        ext.to_ascii_lowercase().as_str(),
        "pdf" | "png" | "jpg" | "jpeg" | "tiff" | "tif"
    )
}
