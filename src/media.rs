//! Probing of locally materialized media. The core never decodes pixels or
//! samples itself; it only needs dimensions, duration, and frame rate, which
//! `ffprobe` reports without touching the stream payload.

use std::path::{Path, PathBuf};

use crate::error::{ReelError, ReelResult};

/// A fully materialized, decodable video source. Read-only after probing;
/// decoder handles are owned by the ffmpeg child process at encode time, so
/// nothing here needs explicit release.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct MediaAsset {
    pub path: PathBuf,
    pub width: u32,
    pub height: u32,
    pub duration_sec: f64,
    pub fps_num: u32,
    pub fps_den: u32,
    pub has_audio: bool,
}

/// The narration track: the master clock for the whole composition.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct NarrationAsset {
    pub path: PathBuf,
    pub duration_sec: f64,
}

impl MediaAsset {
    /// Validated constructor for already-known metadata (tests, callers that
    /// probed elsewhere).
    pub fn from_parts(
        path: impl Into<PathBuf>,
        width: u32,
        height: u32,
        duration_sec: f64,
        fps_num: u32,
        fps_den: u32,
        has_audio: bool,
    ) -> ReelResult<Self> {
        let asset = Self {
            path: path.into(),
            width,
            height,
            duration_sec,
            fps_num,
            fps_den,
            has_audio,
        };
        asset.validate()?;
        Ok(asset)
    }

    pub fn validate(&self) -> ReelResult<()> {
        if self.width == 0 || self.height == 0 {
            return Err(ReelError::invalid_media(format!(
                "'{}' has zero dimensions ({}x{})",
                self.path.display(),
                self.width,
                self.height
            )));
        }
        if !self.duration_sec.is_finite() || self.duration_sec <= 0.0 {
            return Err(ReelError::invalid_media(format!(
                "'{}' has non-positive duration {}",
                self.path.display(),
                self.duration_sec
            )));
        }
        Ok(())
    }

    pub fn source_fps(&self) -> f64 {
        if self.fps_den == 0 {
            0.0
        } else {
            f64::from(self.fps_num) / f64::from(self.fps_den)
        }
    }

    /// Probe a local video file with ffprobe.
    pub fn probe(source_path: &Path) -> ReelResult<Self> {
        let parsed = run_ffprobe(source_path)?;
        let video_stream = parsed
            .streams
            .iter()
            .find(|s| s.codec_type.as_deref() == Some("video"))
            .ok_or_else(|| {
                ReelError::invalid_media(format!(
                    "no video stream in '{}'",
                    source_path.display()
                ))
            })?;
        let width = video_stream
            .width
            .ok_or_else(|| ReelError::invalid_media("missing video width from ffprobe"))?;
        let height = video_stream
            .height
            .ok_or_else(|| ReelError::invalid_media("missing video height from ffprobe"))?;
        let (fps_num, fps_den) =
            parse_ff_ratio(video_stream.r_frame_rate.as_deref().unwrap_or("0/1"))
                .ok_or_else(|| ReelError::invalid_media("invalid video r_frame_rate"))?;
        let duration_sec = parsed.duration_sec();
        let has_audio = parsed
            .streams
            .iter()
            .any(|s| s.codec_type.as_deref() == Some("audio"));

        Self::from_parts(
            source_path,
            width,
            height,
            duration_sec,
            fps_num,
            fps_den,
            has_audio,
        )
    }
}

impl NarrationAsset {
    pub fn from_parts(path: impl Into<PathBuf>, duration_sec: f64) -> ReelResult<Self> {
        if !duration_sec.is_finite() || duration_sec <= 0.0 {
            return Err(ReelError::invalid_media(format!(
                "narration duration must be > 0 seconds (got {duration_sec})"
            )));
        }
        Ok(Self {
            path: path.into(),
            duration_sec,
        })
    }

    /// Probe a local audio file with ffprobe.
    pub fn probe(source_path: &Path) -> ReelResult<Self> {
        let parsed = run_ffprobe(source_path)?;
        if !parsed
            .streams
            .iter()
            .any(|s| s.codec_type.as_deref() == Some("audio"))
        {
            return Err(ReelError::invalid_media(format!(
                "no audio stream in '{}'",
                source_path.display()
            )));
        }
        Self::from_parts(source_path, parsed.duration_sec())
    }
}

pub fn is_ffprobe_on_path() -> bool {
    std::process::Command::new("ffprobe")
        .arg("-version")
        .stdout(std::process::Stdio::null())
        .stderr(std::process::Stdio::null())
        .status()
        .map(|s| s.success())
        .unwrap_or(false)
}

#[derive(serde::Deserialize)]
struct ProbeStream {
    codec_type: Option<String>,
    width: Option<u32>,
    height: Option<u32>,
    r_frame_rate: Option<String>,
}

#[derive(serde::Deserialize)]
struct ProbeFormat {
    duration: Option<String>,
}

#[derive(serde::Deserialize)]
struct ProbeOut {
    streams: Vec<ProbeStream>,
    format: Option<ProbeFormat>,
}

impl ProbeOut {
    fn duration_sec(&self) -> f64 {
        self.format
            .as_ref()
            .and_then(|f| f.duration.as_ref())
            .and_then(|s| s.parse::<f64>().ok())
            .unwrap_or(0.0)
    }
}

fn run_ffprobe(source_path: &Path) -> ReelResult<ProbeOut> {
    let out = std::process::Command::new("ffprobe")
        .args([
            "-v",
            "error",
            "-print_format",
            "json",
            "-show_streams",
            "-show_format",
        ])
        .arg(source_path)
        .output()
        .map_err(|e| ReelError::invalid_media(format!("failed to run ffprobe: {e}")))?;
    if !out.status.success() {
        return Err(ReelError::invalid_media(format!(
            "ffprobe failed for '{}': {}",
            source_path.display(),
            String::from_utf8_lossy(&out.stderr).trim()
        )));
    }
    serde_json::from_slice(&out.stdout)
        .map_err(|e| ReelError::invalid_media(format!("ffprobe json parse failed: {e}")))
}

fn parse_ff_ratio(s: &str) -> Option<(u32, u32)> {
    let (num, den) = s.split_once('/')?;
    let num = num.trim().parse::<u32>().ok()?;
    let den = den.trim().parse::<u32>().ok()?;
    if den == 0 { None } else { Some((num, den)) }
}
