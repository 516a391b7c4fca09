//! Audio download and segmentation via yt-dlp, ffmpeg and ffprobe.

use crate::error::{Result, VidbriefError};
use std::path::{Path, PathBuf};
use std::process::Stdio;
use tokio::process::Command;
use tracing::{debug, info, instrument, warn};

/// Container formats yt-dlp may leave behind for an audio-only download.
const AUDIO_EXTENSIONS: [&str; 5] = ["mp3", "m4a", "opus", "webm", "ogg"];

/// Download the audio track of a video as `<video_id>.mp3` in `output_dir`.
#[instrument(skip(output_dir), fields(video_id = %video_id))]
pub async fn download_audio(url: &str, video_id: &str, output_dir: &Path) -> Result<PathBuf> {
    std::fs::create_dir_all(output_dir)?;

    let target_path = output_dir.join(format!("{}.mp3", video_id));
    if target_path.exists() {
        info!("Reusing audio left from a previous run");
        return Ok(target_path);
    }

    info!("Downloading audio from {}", url);
    let template = output_dir.join(format!("{}.%(ext)s", video_id));

    let output = Command::new("yt-dlp")
        .arg("--format").arg("bestaudio/best")
        .arg("--extract-audio")
        .arg("--audio-format").arg("mp3")
        .arg("--audio-quality").arg("192K")
        .arg("--output").arg(&template)
        .arg("--no-playlist")
        .arg("--quiet")
        .arg("--no-warnings")
        .arg(url)
        .stdout(Stdio::null())
        .stderr(Stdio::piped())
        .output()
        .await
        .map_err(|e| tool_error("yt-dlp", e))?;

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        return Err(VidbriefError::AudioDownload(format!(
            "yt-dlp failed: {}",
            stderr.trim()
        )));
    }

    let downloaded = locate_download(output_dir, video_id)?;
    if downloaded != target_path {
        convert_to_mp3(&downloaded, &target_path).await?;
        if let Err(e) = std::fs::remove_file(&downloaded) {
            warn!("Could not remove intermediate file {:?}: {}", downloaded, e);
        }
    }

    Ok(target_path)
}

/// Find the file yt-dlp produced for `video_id`.
fn locate_download(dir: &Path, video_id: &str) -> Result<PathBuf> {
    AUDIO_EXTENSIONS
        .iter()
        .map(|ext| dir.join(format!("{}.{}", video_id, ext)))
        .find(|candidate| candidate.exists())
        .ok_or_else(|| {
            VidbriefError::AudioDownload(format!("No audio file for {} after download", video_id))
        })
}

async fn convert_to_mp3(source: &Path, dest: &Path) -> Result<()> {
    debug!("Converting {:?} to MP3", source);

    let output = Command::new("ffmpeg")
        .arg("-i").arg(source)
        .arg("-vn")
        .arg("-codec:a").arg("libmp3lame")
        .arg("-qscale:a").arg("2")
        .arg("-y")
        .arg("-loglevel").arg("error")
        .arg(dest)
        .stdout(Stdio::null())
        .stderr(Stdio::piped())
        .output()
        .await
        .map_err(|e| tool_error("ffmpeg", e))?;

    if output.status.success() {
        Ok(())
    } else {
        Err(VidbriefError::AudioDownload(format!(
            "ffmpeg conversion failed: {}",
            String::from_utf8_lossy(&output.stderr).trim()
        )))
    }
}

/// Cut an audio file into pieces of at most `piece_seconds`.
///
/// Returns `(path, offset_seconds)` pairs in playback order. Audio that
/// already fits is returned as a single piece without copying.
#[instrument(skip_all)]
pub async fn split_audio(
    source: &Path,
    output_dir: &Path,
    piece_seconds: u32,
) -> Result<Vec<(PathBuf, f64)>> {
    let total = probe_duration(source).await?;
    let piece_len = f64::from(piece_seconds.max(1));
    info!("Audio is {:.1}s long", total);

    if total <= piece_len {
        return Ok(vec![(source.to_path_buf(), 0.0)]);
    }

    std::fs::create_dir_all(output_dir)?;
    let stem = source
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("audio");

    let mut pieces = Vec::new();
    let mut offset = 0.0;
    while offset < total {
        let path = output_dir.join(format!("{}_part{:03}.mp3", stem, pieces.len()));
        cut_piece(source, &path, offset, piece_len.min(total - offset)).await?;
        pieces.push((path, offset));
        offset += piece_len;
    }

    info!("Split audio into {} pieces", pieces.len());
    Ok(pieces)
}

async fn cut_piece(source: &Path, dest: &Path, start: f64, length: f64) -> Result<()> {
    let copied = Command::new("ffmpeg")
        .arg("-ss").arg(format!("{:.3}", start))
        .arg("-i").arg(source)
        .arg("-t").arg(format!("{:.3}", length))
        .arg("-c").arg("copy")
        .arg("-y")
        .arg("-loglevel").arg("error")
        .arg(dest)
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .status()
        .await;

    if matches!(copied, Ok(status) if status.success()) && dest.exists() {
        return Ok(());
    }

    warn!("Stream copy failed at {:.0}s, re-encoding", start);

    let output = Command::new("ffmpeg")
        .arg("-ss").arg(format!("{:.3}", start))
        .arg("-i").arg(source)
        .arg("-t").arg(format!("{:.3}", length))
        .arg("-codec:a").arg("libmp3lame")
        .arg("-qscale:a").arg("2")
        .arg("-y")
        .arg("-loglevel").arg("error")
        .arg(dest)
        .stdout(Stdio::null())
        .stderr(Stdio::piped())
        .output()
        .await
        .map_err(|e| tool_error("ffmpeg", e))?;

    if output.status.success() {
        Ok(())
    } else {
        Err(VidbriefError::AudioDownload(format!(
            "Cutting audio at {:.0}s failed: {}",
            start,
            String::from_utf8_lossy(&output.stderr).trim()
        )))
    }
}

/// Read the duration of a media file in seconds.
async fn probe_duration(path: &Path) -> Result<f64> {
    let output = Command::new("ffprobe")
        .arg("-v").arg("quiet")
        .arg("-print_format").arg("json")
        .arg("-show_format")
        .arg(path)
        .output()
        .await
        .map_err(|e| tool_error("ffprobe", e))?;

    if !output.status.success() {
        return Err(VidbriefError::AudioDownload(format!(
            "ffprobe could not read {:?}",
            path
        )));
    }

    parse_probe_duration(&String::from_utf8_lossy(&output.stdout))
}

fn parse_probe_duration(json: &str) -> Result<f64> {
    let parsed: serde_json::Value = serde_json::from_str(json)?;
    parsed["format"]["duration"]
        .as_str()
        .and_then(|s| s.parse::<f64>().ok())
        .ok_or_else(|| VidbriefError::AudioDownload("ffprobe reported no duration".into()))
}

fn tool_error(tool: &str, e: std::io::Error) -> VidbriefError {
    if e.kind() == std::io::ErrorKind::NotFound {
        VidbriefError::ToolNotFound(tool.to_string())
    } else {
        VidbriefError::AudioDownload(format!("{} could not be started: {}", tool, e))
    }
}
