//! Container probing via ffprobe.

use anyhow::{anyhow, Context, Result};
use async_trait::async_trait;
use std::path::{Path, PathBuf};
use tokio::process::Command;

use medcap_core::models::MediaAttributes;

use crate::traits::MediaProber;

/// Validate that a path doesn't contain shell metacharacters or dangerous sequences
fn validate_path(path: &str) -> Result<()> {
    let dangerous_chars = [';', '|', '&', '$', '`', '(', ')', '<', '>', '\n', '\r'];
    if path.chars().any(|c| dangerous_chars.contains(&c)) {
        return Err(anyhow!("Path contains dangerous characters: {}", path));
    }

    if path.contains("..") {
        return Err(anyhow!("Path contains directory traversal: {}", path));
    }

    Ok(())
}

/// Validate and canonicalize a file path to prevent directory traversal
fn validate_and_canonicalize_path(path: &Path) -> Result<PathBuf> {
    let path_str = path.to_string_lossy();
    validate_path(&path_str)?;

    path.canonicalize()
        .map_err(|err| anyhow!("Failed to canonicalize path: {}", err))
}

/// Probes media containers by invoking ffprobe with JSON output.
pub struct FfprobeProber {
    ffprobe_path: String,
}

impl FfprobeProber {
    pub fn new(ffprobe_path: String) -> Result<Self> {
        validate_path(&ffprobe_path)
            .context("Invalid ffprobe_path: contains dangerous characters")?;

        if !ffprobe_path.chars().all(|c| {
            c.is_alphanumeric() || c == '/' || c == '-' || c == '_' || c == '.' || c == '\\'
        }) {
            return Err(anyhow!("Invalid ffprobe_path: contains unsafe characters"));
        }

        Ok(Self { ffprobe_path })
    }
}

#[async_trait]
impl MediaProber for FfprobeProber {
    #[tracing::instrument(skip(self, media_path), fields(
        process.executable.path = %self.ffprobe_path,
        ffprobe.operation = "probe"
    ))]
    async fn probe(&self, media_path: &Path) -> Result<MediaAttributes> {
        let start = std::time::Instant::now();

        let validated_path =
            validate_and_canonicalize_path(media_path).context("Invalid media path")?;

        let output = Command::new(&self.ffprobe_path)
            .args([
                "-v",
                "quiet",
                "-print_format",
                "json",
                "-show_format",
                "-show_streams",
                "-select_streams",
                "v:0",
            ])
            .arg(&validated_path)
            .output()
            .await
            .context("Failed to execute ffprobe")?;

        if !output.status.success() {
            return Err(anyhow!(
                "ffprobe failed: {}",
                String::from_utf8_lossy(&output.stderr)
            ));
        }

        let probe_data: serde_json::Value =
            serde_json::from_slice(&output.stdout).context("Failed to parse ffprobe output")?;

        let stream = probe_data["streams"]
            .get(0)
            .ok_or_else(|| anyhow!("No video stream found"))?;

        let format = &probe_data["format"];

        let duration_secs = format["duration"]
            .as_str()
            .and_then(|d| d.parse::<f64>().ok())
            .or_else(|| stream["duration"].as_str().and_then(|d| d.parse::<f64>().ok()));

        let width = stream["width"].as_i64();
        let height = stream["height"].as_i64();
        let mime_type = format["format_name"].as_str().map(|s| s.to_string());

        let elapsed = start.elapsed();
        tracing::info!(
            duration_ms = elapsed.as_millis(),
            media_duration = duration_secs,
            width = width,
            height = height,
            "Probe completed"
        );

        Ok(MediaAttributes {
            duration_secs,
            width,
            height,
            mime_type,
        })
    }
}
