use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub global: Global,
    #[serde(default)]
    pub paths: Paths,
    #[serde(default)]
    pub hashing: Hashing,
    #[serde(default)]
    pub limits: Limits,
    #[serde(default)]
    pub aws: Aws,
    #[serde(default)]
    pub storage: Storage,
    #[serde(default)]
    pub ocr: Ocr,
    #[serde(default)]
    pub chunking: Chunking,
    #[serde(default)]
    pub output: Output,
    #[serde(default)]
    pub logging: Logging,
}

impl Config {
    pub fn load(path: &Path) -> Result<Self> {
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("reading config: {}", path.display()))?;
        let cfg: Config = toml::from_str(&raw).with_context(|| "parsing TOML")?;
        Ok(cfg)
    }

    /// A stable, normalization-friendly string for hashing.
    pub fn normalized_for_hash(&self) -> String {
        toml::to_string(self).unwrap_or_default()
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            global: Default::default(),
            paths: Default::default(),
            hashing: Default::default(),
            limits: Default::default(),
            aws: Default::default(),
            storage: Default::default(),
            ocr: Default::default(),
            chunking: Default::default(),
            output: Default::default(),
            logging: Default::default(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Global {
    pub resume: bool,
    pub print_summary: bool,
}
impl Default for Global {
    fn default() -> Self {
        Self {
            resume: true,
            print_summary: true,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Paths {
    pub out_dir: String,
}
impl Default for Paths {
    fn default() -> Self {
        Self {
            out_dir: "out".into(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Hashing {
    pub mode: String,
    pub fast_window_bytes: u64,
}
impl Default for Hashing {
    fn default() -> Self {
        Self {
            mode: "fast_2x16mb".into(),
            fast_window_bytes: 16 * 1024 * 1024,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Limits {
    pub max_input_file_bytes: u64,
}
impl Default for Limits {
    fn default() -> Self {
        Self {
            // Textract's async API caps documents at 500 MB.
            max_input_file_bytes: 500_000_000,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Aws {
    pub exe: String,
    pub region: String,
}
impl Default for Aws {
    fn default() -> Self {
        Self {
            exe: "auto".into(),
            region: "".into(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Storage {
    pub bucket: String,
    pub key_prefix: String,
    pub request_timeout_seconds: u64,
}
impl Default for Storage {
    fn default() -> Self {
        Self {
            bucket: "".into(),
            key_prefix: "reports".into(),
            request_timeout_seconds: 300,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Ocr {
    pub poll_interval_seconds: u64,
    pub max_poll_attempts: u32,
    pub request_timeout_seconds: u64,
}
impl Default for Ocr {
    fn default() -> Self {
        Self {
            poll_interval_seconds: 5,
            max_poll_attempts: 60,
            request_timeout_seconds: 60,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Chunking {
    pub max_chars: usize,
}
impl Default for Chunking {
    fn default() -> Self {
        Self { max_chars: 2000 }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Output {
    pub write_text: bool,
    pub write_chunks: bool,
    pub write_report_json: bool,
    pub write_index_json: bool,
    pub text_filename: String,
    pub report_filename: String,
}
impl Default for Output {
    fn default() -> Self {
        Self {
            write_text: true,
            write_chunks: true,
            write_report_json: true,
            write_index_json: true,
            text_filename: "extracted.txt".into(),
            report_filename: "report.json".into(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Logging {
    pub level: String,
    pub json: bool,
    pub write_to_file: bool,
    pub file_path: String,
}
impl Default for Logging {
    fn default() -> Self {
        Self {
            level: "info".into(),
            json: false,
            write_to_file: true,
            file_path: "".into(),
        }
    }
}
