use anyhow::{anyhow, Context, Result};
use serde::de::DeserializeOwned;
use std::path::PathBuf;
use std::process::Stdio;
use std::time::Duration;
use tracing::debug;

/// Thin wrapper around the `aws` CLI. Every call is a short-lived subprocess
/// with `--output json`, parsed with serde, and killed if it outlives the
/// per-request timeout.
#[derive(Debug, Clone)]
pub struct AwsCli {
    exe: PathBuf,
    region: String,
}

impl AwsCli {
    pub fn new(exe: &str, region: &str) -> Result<Self> {
        if region.trim().is_empty() {
            return Err(anyhow!("aws.region is not configured"));
        }
        Ok(Self {
            exe: resolve_aws_exe(exe),
            region: region.to_string(),
        })
    }

    pub async fn run_json<O: DeserializeOwned>(
        &self,
        args: &[&str],
        timeout: Duration,
    ) -> Result<O> {
        let stdout = self.run(args, timeout).await?;
        let out: O = serde_json::from_slice(&stdout)
            .with_context(|| format!("parsing aws JSON output: aws {}", args.join(" ")))?;
        Ok(out)
    }

    pub async fn run(&self, args: &[&str], timeout: Duration) -> Result<Vec<u8>> {
        debug!("aws {} timeout={:?}", args.join(" "), timeout);

        let mut cmd = tokio::process::Command::new(&self.exe);
        cmd.args(args)
            .arg("--region")
            .arg(&self.region)
            .arg("--output")
            .arg("json")
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            // Dropping the wait future on timeout must not leave the CLI running.
            .kill_on_drop(true);

        let child = cmd
            .spawn()
            .with_context(|| format!("spawning aws CLI: {}", self.exe.display()))?;

        let output = tokio::time::timeout(timeout, child.wait_with_output())
            .await
            .map_err(|_| anyhow!("aws command exceeded timeout ({:?}): aws {}", timeout, args.join(" ")))?
            .with_context(|| "waiting for aws CLI")?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(anyhow!(
                "aws command failed: aws {}\n{}",
                args.join(" "),
                stderr.trim()
            ));
        }

        Ok(output.stdout)
    }
}

fn resolve_aws_exe(raw: &str) -> PathBuf {
    let raw = raw.trim();
    if raw.is_empty() || raw.eq_ignore_ascii_case("auto") {
        if let Ok(env_val) = std::env::var("TEXTSIFT_AWS_EXE") {
            let p = expand_tilde(&env_val);
            if p.exists() {
                return p;
            }
        }
        return PathBuf::from("aws");
    }
    expand_tilde(raw)
}

fn expand_tilde(path: &str) -> PathBuf {
    if let Some(rest) = path.strip_prefix("~/") {
        if let Ok(home) = std::env::var("HOME") {
            return PathBuf::from(home).join(rest);
        }
    }
    PathBuf::from(path)
}
