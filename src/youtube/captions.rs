//! Caption tracks via yt-dlp subtitle downloads.

use super::{watch_url, CaptionSource};
use crate::error::{Result, VidbriefError};
use crate::transcription::{Transcript, TranscriptEntry, TranscriptSource};
use async_trait::async_trait;
use regex::Regex;
use std::path::{Path, PathBuf};
use std::process::Stdio;
use std::sync::OnceLock;
use tokio::process::Command;
use tracing::{debug, info, instrument};

/// Downloads manual or auto-generated subtitles as WebVTT.
pub struct YtDlpCaptions {
    /// Language codes or yt-dlp language patterns, most preferred first.
    languages: Vec<String>,
    temp_root: PathBuf,
}

impl YtDlpCaptions {
    pub fn new(languages: Vec<String>, temp_root: PathBuf) -> Self {
        Self {
            languages,
            temp_root,
        }
    }

    /// Pick the subtitle file whose language ranks highest in `languages`.
    fn pick_track(&self, files: &[PathBuf], video_id: &str) -> Option<PathBuf> {
        let language_of = |path: &PathBuf| -> Option<String> {
            let name = path.file_name()?.to_str()?;
            let rest = name.strip_prefix(video_id)?.strip_prefix('.')?;
            rest.strip_suffix(".vtt").map(str::to_string)
        };

        for wanted in &self.languages {
            let pattern = Regex::new(&format!("^(?:{})$", wanted))
                .or_else(|_| Regex::new(&format!("^{}$", regex::escape(wanted))));
            let Ok(pattern) = pattern else { continue };

            if let Some(found) = files
                .iter()
                .find(|f| language_of(f).is_some_and(|lang| pattern.is_match(&lang)))
            {
                return Some(found.clone());
            }
        }

        files.first().cloned()
    }
}

#[async_trait]
impl CaptionSource for YtDlpCaptions {
    #[instrument(skip(self))]
    async fn fetch_captions(&self, video_id: &str) -> Result<Transcript> {
        std::fs::create_dir_all(&self.temp_root)?;
        let work_dir = tempfile::Builder::new()
            .prefix("captions-")
            .tempdir_in(&self.temp_root)?;
        let template = work_dir.path().join("%(id)s.%(ext)s");

        let output = Command::new("yt-dlp")
            .arg("--skip-download")
            .arg("--write-sub")
            .arg("--write-auto-sub")
            .arg("--sub-langs").arg(self.languages.join(","))
            .arg("--sub-format").arg("vtt")
            .arg("--output").arg(&template)
            .arg("--no-playlist")
            .arg("--no-warnings")
            .arg(watch_url(video_id))
            .stdout(Stdio::null())
            .stderr(Stdio::piped())
            .output()
            .await
            .map_err(|e| {
                if e.kind() == std::io::ErrorKind::NotFound {
                    VidbriefError::ToolNotFound("yt-dlp".to_string())
                } else {
                    VidbriefError::VideoSource(format!("Failed to run yt-dlp: {}", e))
                }
            })?;

        if !output.status.success() {
            return Err(VidbriefError::MissingCaptions(format!(
                "yt-dlp could not fetch subtitles: {}",
                String::from_utf8_lossy(&output.stderr).trim()
            )));
        }

        let files = list_vtt_files(work_dir.path())?;
        debug!("Subtitle files: {:?}", files);

        let track = self.pick_track(&files, video_id).ok_or_else(|| {
            VidbriefError::MissingCaptions(format!("video {} has no subtitle tracks", video_id))
        })?;

        let vtt = std::fs::read_to_string(&track)?;
        let entries = parse_vtt(&vtt);
        if entries.is_empty() {
            return Err(VidbriefError::MissingCaptions(format!(
                "subtitle track {:?} contains no text",
                track.file_name().unwrap_or_default()
            )));
        }

        info!("Loaded {} caption entries", entries.len());
        Ok(Transcript::new(video_id, TranscriptSource::Captions, entries))
    }
}

fn list_vtt_files(dir: &Path) -> Result<Vec<PathBuf>> {
    let mut files: Vec<PathBuf> = std::fs::read_dir(dir)?
        .flatten()
        .map(|entry| entry.path())
        .filter(|p| p.extension().and_then(|e| e.to_str()) == Some("vtt"))
        .collect();
    files.sort();
    Ok(files)
}

fn tag_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"<[^>]*>").expect("tag pattern is valid"))
}

/// Word-level timing tags only appear in auto-generated tracks.
fn inline_time_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"<\d{2}:\d{2}:\d{2}\.\d{3}>").expect("inline time pattern is valid"))
}

/// Parse a WebVTT document into transcript entries.
///
/// Inline timing and styling tags are removed. Auto-generated tracks carry
/// each line over into the next cue; those carried lines are collapsed so
/// each spoken line appears once. Manual tracks keep every line.
pub fn parse_vtt(vtt: &str) -> Vec<TranscriptEntry> {
    let normalized = vtt.replace("\r\n", "\n");
    let rolling = inline_time_regex().is_match(&normalized);
    let mut entries = Vec::new();
    let mut previous: Vec<String> = Vec::new();

    for block in normalized.split("\n\n") {
        let mut lines = block.lines().skip_while(|l| !l.contains("-->"));
        let Some(timing) = lines.next() else { continue };
        let Some((start, end)) = parse_cue_timing(timing) else { continue };

        let cue: Vec<String> = lines.map(clean_cue_text).filter(|t| !t.is_empty()).collect();
        let fresh: Vec<String> = if rolling {
            cue.iter().filter(|t| !previous.contains(t)).cloned().collect()
        } else {
            cue.clone()
        };
        previous = cue;

        if !fresh.is_empty() {
            entries.push(TranscriptEntry::new(fresh.join(" "), start, (end - start).max(0.0)));
        }
    }

    entries
}

fn clean_cue_text(line: &str) -> String {
    let stripped = tag_regex().replace_all(line, "");
    let decoded = stripped
        .replace("&nbsp;", " ")
        .replace("&amp;", "&")
        .replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&quot;", "\"")
        .replace("&#39;", "'");
    decoded.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Parse `00:00:01.000 --> 00:00:04.000 align:start` into seconds.
fn parse_cue_timing(line: &str) -> Option<(f64, f64)> {
    let (start, rest) = line.split_once("-->")?;
    let end = rest.split_whitespace().next()?;
    Some((parse_vtt_time(start.trim())?, parse_vtt_time(end)?))
}

fn parse_vtt_time(value: &str) -> Option<f64> {
    let value = value.replace(',', ".");
    let mut parts: Vec<&str> = value.split(':').collect();
    let seconds: f64 = parts.pop()?.parse().ok()?;
    let minutes: f64 = match parts.pop() {
        Some(m) => m.parse().ok()?,
        None => 0.0,
    };
    let hours: f64 = match parts.pop() {
        Some(h) => h.parse().ok()?,
        None => 0.0,
    };
    Some(hours * 3600.0 + minutes * 60.0 + seconds)
}
