use crate::{
    chunker,
    config::Config,
    ocr::{textract::TextractCli, DocumentLocation},
    orchestrator::Orchestrator,
    store::{supported_extension, S3CliStore},
    util::{ensure_dir, hash_file, now_rfc3339, sha256_hex},
};
use anyhow::{anyhow, Context, Result};
use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};
use tracing::{info, warn};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Layer};

#[derive(Parser, Debug)]
#[command(name = "textsift")]
#[command(about = "Async OCR extraction orchestrator (Textract polling + sentence-aware chunking)")]
pub struct Args {
    #[command(subcommand)]
    pub cmd: Command,

    /// Path to config TOML. If omitted, uses ./textsift.toml if present.
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Override log level (trace/debug/info/warn/error).
    #[arg(long)]
    pub log_level: Option<String>,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Check AWS CLI reachability and configured region/bucket.
    Doctor {},
    /// Chunk a local text file and print the chunks as JSON.
    Chunk {
        #[arg(long)]
        input: PathBuf,
        /// Override chunking.max_chars from the config.
        #[arg(long)]
        max_chars: Option<usize>,
    },
    /// Run OCR for a document already present in the configured bucket.
    Extract {
        #[arg(long)]
        key: String,
    },
    /// Upload a document, extract its text, and chunk it.
    Run {
        #[arg(long)]
        input: PathBuf,
        #[arg(long)]
        out_dir: Option<PathBuf>,
    },
}

pub async fn dispatch(args: Args) -> Result<()> {
    let cfg_path = resolve_config_path(args.config.as_deref())?;
    let cfg = Config::load(&cfg_path)?;

    match &args.cmd {
        Command::Doctor {} => {
            let log_path = resolve_log_path(&cfg, None);
            let _guard = init_logging(&args, &cfg, log_path.as_deref())?;
            doctor(&cfg).await
        }
        Command::Chunk { input, max_chars } => {
            let log_path = resolve_log_path(&cfg, None);
            let _guard = init_logging(&args, &cfg, log_path.as_deref())?;
            chunk_file(&cfg, input, *max_chars)
        }
        Command::Extract { key } => {
            let log_path = resolve_log_path(&cfg, None);
            let _guard = init_logging(&args, &cfg, log_path.as_deref())?;
            extract(&cfg, key).await
        }
        Command::Run { input, out_dir } => run(&args, &cfg, input, out_dir.as_deref()).await,
    }
}

fn resolve_config_path(user: Option<&Path>) -> Result<PathBuf> {
    if let Some(p) = user {
        return Ok(p.to_path_buf());
    }
    let default = PathBuf::from("textsift.toml");
    if default.exists() {
        Ok(default)
    } else {
        Ok(PathBuf::from("textsift.example.toml"))
    }
}

fn init_logging(args: &Args, cfg: &Config, file_path: Option<&Path>) -> Result<Option<WorkerGuard>> {
    let level = args
        .log_level
        .as_deref()
        .unwrap_or(cfg.logging.level.as_str());

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    let stdout_layer = if cfg.logging.json {
        tracing_subscriber::fmt::layer()
            .json()
            .with_target(true)
            .boxed()
    } else {
        tracing_subscriber::fmt::layer()
            .with_target(true)
            .boxed()
    };

    let (file_layer, guard) = if let Some(path) = file_path {
        let parent = path.parent().unwrap_or_else(|| Path::new("."));
        ensure_dir(parent)?;
        let file = std::fs::File::create(path)
            .with_context(|| format!("create log file: {}", path.display()))?;
        let (non_blocking, guard) = tracing_appender::non_blocking(file);
        let layer = tracing_subscriber::fmt::layer()
            .with_writer(non_blocking)
            .with_ansi(false)
            .with_target(true)
            .boxed();
        (Some(layer), Some(guard))
    } else {
        (None, None)
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(stdout_layer)
        .with(file_layer)
        .try_init()
        .map_err(|e| anyhow!("failed to init logging: {e}"))?;

    Ok(guard)
}

async fn doctor(cfg: &Config) -> Result<()> {
    let aws = crate::awscli::AwsCli::new(&cfg.aws.exe, &cfg.aws.region)?;
    let identity: Result<serde_json::Value> = aws
        .run_json(
            &["sts", "get-caller-identity"],
            std::time::Duration::from_secs(30),
        )
        .await;

    let diag = match identity {
        Ok(id) => serde_json::json!({
            "ok": true,
            "region": cfg.aws.region,
            "bucket": cfg.storage.bucket,
            "caller_arn": id.get("Arn"),
        }),
        Err(err) => serde_json::json!({
            "ok": false,
            "region": cfg.aws.region,
            "bucket": cfg.storage.bucket,
            "error": format!("{err:#}"),
        }),
    };

    println!("{}", serde_json::to_string_pretty(&diag)?);
    Ok(())
}

fn chunk_file(cfg: &Config, input: &Path, max_chars: Option<usize>) -> Result<()> {
    let text = std::fs::read_to_string(input)
        .with_context(|| format!("reading text file: {}", input.display()))?;
    let max_chars = max_chars.unwrap_or(cfg.chunking.max_chars);
    let chunks = chunker::chunk(&text, max_chars)?;
    println!(
        "{}",
        serde_json::to_string_pretty(&serde_json::json!({
            "max_chars": max_chars,
            "chunk_count": chunks.len(),
            "chunks": chunks,
        }))?
    );
    Ok(())
}

async fn extract(cfg: &Config, key: &str) -> Result<()> {
    if cfg.storage.bucket.trim().is_empty() {
        return Err(anyhow!("storage.bucket is not configured"));
    }
    let detector = TextractCli::new(&cfg.aws, &cfg.ocr)?;
    let orchestrator = Orchestrator::new(&cfg.ocr, detector)?;
    let location = DocumentLocation {
        bucket: cfg.storage.bucket.clone(),
        key: key.to_string(),
    };

    let outcome = orchestrator.extract(&location).await?;

    println!(
        "{}",
        serde_json::to_string_pretty(&serde_json::json!({
            "job_id": outcome.job_id,
            "status_queries": outcome.status_queries,
            "result_pages": outcome.result_pages,
            "line_count": outcome.line_count,
            "text": outcome.text,
        }))?
    );
    Ok(())
}

async fn run(args: &Args, cfg: &Config, input: &Path, out_override: Option<&Path>) -> Result<()> {
    validate_input(input)?;

    let cfg_norm = cfg.normalized_for_hash();
    let cfg_hash = sha256_hex(cfg_norm.as_bytes());
    let input_hash = hash_file(&cfg.hashing, input)
        .with_context(|| format!("hashing input: {}", input.display()))?;
    let job_id = sha256_hex(format!("{}:{}", cfg_hash, input_hash).as_bytes());

    let out_root = out_override
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from(&cfg.paths.out_dir));
    let job_dir = out_root.join(&job_id);

    if job_dir.exists() && !cfg.global.resume {
        return Err(anyhow!(
            "job_dir already exists and resume=false: {}",
            job_dir.display()
        ));
    }

    ensure_dir(&job_dir)?;
    ensure_dir(&job_dir.join("final"))?;
    ensure_dir(&job_dir.join("logs"))?;
    ensure_dir(&job_dir.join("chunks"))?;

    let log_path = resolve_log_path(cfg, Some(&job_dir));
    let _guard = init_logging(args, cfg, log_path.as_deref())?;

    info!("job_id={job_id} out={}", job_dir.display());

    let store = S3CliStore::new(&cfg.aws, &cfg.storage)?;
    let detector = TextractCli::new(&cfg.aws, &cfg.ocr)?;
    let orchestrator = Orchestrator::new(&cfg.ocr, detector)?;
    let pipeline = crate::pipeline::Pipeline::new(cfg, store, orchestrator);

    let started = now_rfc3339();
    let result = pipeline.run_job(input).await?;

    if cfg.output.write_text {
        std::fs::write(
            job_dir.join("final").join(&cfg.output.text_filename),
            &result.text,
        )?;
    }

    if cfg.output.write_chunks {
        for (i, chunk) in result.chunks.iter().enumerate() {
            std::fs::write(job_dir.join("chunks").join(format!("chunk_{:05}.txt", i)), chunk)?;
        }
    }

    if cfg.output.write_report_json {
        std::fs::write(
            job_dir.join("final").join(&cfg.output.report_filename),
            serde_json::to_string_pretty(&result.report)?,
        )?;
    }

    if cfg.output.write_index_json {
        let index = serde_json::json!({
            "job_id": job_id,
            "started": started,
            "finished": now_rfc3339(),
            "final_text": format!("final/{}", cfg.output.text_filename),
            "report": format!("final/{}", cfg.output.report_filename),
            "chunk_count": result.chunks.len(),
        });
        std::fs::write(job_dir.join("index.json"), serde_json::to_string_pretty(&index)?)?;
    }

    if cfg.global.print_summary {
        println!(
            "{}",
            serde_json::to_string_pretty(&serde_json::json!({
                "job_id": job_id,
                "job_dir": job_dir,
                "chunk_count": result.chunks.len(),
                "status": "ok"
            }))?
        );
    }

    Ok(())
}

fn validate_input(input: &Path) -> Result<()> {
    if !input.exists() {
        return Err(anyhow!("input does not exist: {}", input.display()));
    }

    if let Some(ext) = input.extension().and_then(|s| s.to_str()) {
        if !supported_extension(ext) {
            return Err(anyhow!("unsupported input type: {}", input.display()));
        }
    } else {
        warn!("input has no extension; assuming PDF: {}", input.display());
    }

    Ok(())
}

fn resolve_log_path(cfg: &Config, job_dir: Option<&Path>) -> Option<PathBuf> {
    if !cfg.logging.write_to_file {
        return None;
    }

    if !cfg.logging.file_path.is_empty() {
        return Some(PathBuf::from(&cfg.logging.file_path));
    }

    if let Some(job_dir) = job_dir {
        return Some(job_dir.join("logs").join("textsift.log"));
    }

    Some(PathBuf::from(&cfg.paths.out_dir).join("textsift.log"))
}
