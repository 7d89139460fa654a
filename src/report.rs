use crate::ocr::DocumentLocation;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JobReport {
    pub input: InputReport,
    pub location: DocumentLocation,
    pub ocr: OcrReport,
    pub chunking: ChunkingReport,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InputReport {
    pub path: String,
    pub file_bytes: u64,
    pub content_type: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OcrReport {
    pub job_id: String,
    pub status_queries: u32,
    pub result_pages: u32,
    pub line_count: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChunkingReport {
    pub max_chars: usize,
    pub chunk_count: usize,
    pub total_chars: usize,
}
