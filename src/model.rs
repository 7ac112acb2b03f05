//! Timeline data model. Everything here is plain data: deterministic to
//! build, serde-serializable, and validated structurally before the encoder
//! is allowed to touch it. Times are seconds on the master timeline.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::{
    error::{ReelError, ReelResult},
    geometry::GeometryTransform,
    template::{TemplateSettings, WatermarkPosition},
};

/// Tolerance for float drift when checking interval tiling.
pub const TILING_EPSILON: f64 = 1e-6;

/// One footage asset's allotted interval `[start, start+duration)` on the
/// master timeline.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Clip {
    /// Index into the job's ordered asset list.
    pub asset_index: usize,
    pub start: f64,
    pub duration: f64,
    /// True when the source was shorter than its share and had to be
    /// internally repeated before trimming.
    pub looped: bool,
    /// Extra whole repeats of the source needed to cover the share
    /// (0 when not looped).
    pub loop_count: u32,
}

/// A clip paired with the cover-crop transform that maps its native frame
/// into the output frame.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct PlacedClip {
    pub clip: Clip,
    pub geometry: GeometryTransform,
}

/// One timed caption word-group, pre-split into two display lines.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct CaptionCue {
    pub line1: String,
    pub line2: String,
    pub start: f64,
    pub duration: f64,
    /// Vertical anchor as a fraction of frame height; horizontally centered.
    pub anchor_frac: f64,
}

/// Where a non-caption overlay sits in the output frame.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OverlayPosition {
    /// Band across the top of the frame.
    TopBand,
    /// Band across the bottom of the frame.
    BottomBand,
    /// Watermark corner/edge anchor.
    Anchor(WatermarkPosition),
    /// Centered both ways (intro banner).
    Center,
    /// Horizontal quarter points at vertical center (outro call-to-actions).
    LeftQuarter,
    RightQuarter,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OverlayContent {
    /// Solid dimming band, frame_height/4 tall.
    DimBand,
    /// Small persistent channel-handle text.
    Watermark { text: String },
    /// Large banner text (intro title, outro call-to-action).
    Banner { text: String, color: String },
}

/// A positioned, time-bounded visual layer. Stateless once constructed; any
/// portion outside the owning segment's time range is simply invisible.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Overlay {
    pub content: OverlayContent,
    pub position: OverlayPosition,
    pub opacity: f64,
    pub start: f64,
    pub duration: f64,
    /// Linear fade-in applied over the first `fade_in_sec` seconds; 0 = none.
    pub fade_in_sec: f64,
}

/// The continuous zoom-in ramp over the base track.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct ZoomSpec {
    /// Fractional ceiling reached at the end of the master timeline.
    pub amount: f64,
}

/// The composited middle of the output: base track + dimming bands +
/// caption cues + optional watermark, all on one timebase.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct MainSegment {
    pub duration: f64,
    pub base: Vec<PlacedClip>,
    pub zoom: Option<ZoomSpec>,
    pub overlays: Vec<Overlay>,
    pub cues: Vec<CaptionCue>,
    pub watermark: Option<Overlay>,
}

/// A fixed-duration bumper independent of narration/footage content.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Bumper {
    pub duration: f64,
    pub background: String,
    pub overlays: Vec<Overlay>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Segment {
    Intro(Bumper),
    Main(MainSegment),
    Outro(Bumper),
}

impl Segment {
    pub fn duration(&self) -> f64 {
        match self {
            Segment::Intro(b) | Segment::Outro(b) => b.duration,
            Segment::Main(m) => m.duration,
        }
    }
}

/// The complete, deterministic description of one output video. Building the
/// plan touches no pixels; the encoder translates it into a single ffmpeg
/// invocation.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct RenderPlan {
    pub width: u32,
    pub height: u32,
    pub fps: u32,
    /// Master timeline length (main segment), post-truncation.
    pub master_duration: f64,
    pub narration_path: PathBuf,
    pub clip_paths: Vec<PathBuf>,
    pub template: TemplateSettings,
    pub segments: Vec<Segment>,
}

impl RenderPlan {
    /// intro + main + outro.
    pub fn total_duration(&self) -> f64 {
        self.segments.iter().map(Segment::duration).sum()
    }

    pub fn main(&self) -> Option<&MainSegment> {
        self.segments.iter().find_map(|s| match s {
            Segment::Main(m) => Some(m),
            _ => None,
        })
    }

    pub fn intro(&self) -> Option<&Bumper> {
        self.segments.iter().find_map(|s| match s {
            Segment::Intro(b) => Some(b),
            _ => None,
        })
    }

    pub fn outro(&self) -> Option<&Bumper> {
        self.segments.iter().find_map(|s| match s {
            Segment::Outro(b) => Some(b),
            _ => None,
        })
    }

    pub fn validate(&self) -> ReelResult<()> {
        if self.width == 0 || self.height == 0 || self.fps == 0 {
            return Err(ReelError::validation(
                "plan width/height/fps must be non-zero",
            ));
        }
        if self.master_duration <= 0.0 {
            return Err(ReelError::validation("plan master_duration must be > 0"));
        }

        // Segment order: optional intro, exactly one main, optional outro.
        let mut seen_main = false;
        for (i, seg) in self.segments.iter().enumerate() {
            match seg {
                Segment::Intro(_) if i != 0 => {
                    return Err(ReelError::validation("intro must be the first segment"));
                }
                Segment::Outro(_) if i + 1 != self.segments.len() => {
                    return Err(ReelError::validation("outro must be the last segment"));
                }
                Segment::Main(_) if seen_main => {
                    return Err(ReelError::validation("plan must have exactly one main"));
                }
                Segment::Main(_) => seen_main = true,
                _ => {}
            }
            if seg.duration() <= 0.0 {
                return Err(ReelError::validation("segment durations must be > 0"));
            }
        }
        let main = self
            .main()
            .ok_or_else(|| ReelError::validation("plan must contain a main segment"))?;

        if (main.duration - self.master_duration).abs() > TILING_EPSILON {
            return Err(ReelError::validation(
                "main segment duration must equal master_duration",
            ));
        }

        validate_tiling(&main.base, self.master_duration)?;
        validate_cues(&main.cues, self.master_duration)?;

        for placed in &main.base {
            if placed.clip.asset_index >= self.clip_paths.len() {
                return Err(ReelError::validation(format!(
                    "clip asset_index {} out of range ({} assets)",
                    placed.clip.asset_index,
                    self.clip_paths.len()
                )));
            }
        }

        Ok(())
    }
}

/// Clip intervals must exactly tile `[0, master)` with no gaps or overlaps.
fn validate_tiling(base: &[PlacedClip], master: f64) -> ReelResult<()> {
    if base.is_empty() {
        return Err(ReelError::validation("base track has no clips"));
    }
    let mut expected_start = 0.0_f64;
    for placed in base {
        let clip = &placed.clip;
        if clip.duration <= 0.0 {
            return Err(ReelError::validation("clip duration must be > 0"));
        }
        if (clip.start - expected_start).abs() > TILING_EPSILON {
            return Err(ReelError::validation(format!(
                "clip intervals must be contiguous (expected start {expected_start}, got {})",
                clip.start
            )));
        }
        expected_start = clip.start + clip.duration;
    }
    if (expected_start - master).abs() > TILING_EPSILON {
        return Err(ReelError::validation(format!(
            "clip intervals must span [0, {master}) exactly (end {expected_start})"
        )));
    }
    Ok(())
}

/// Cues must be ordered by start and contiguous. An empty list is allowed
/// (fully degraded captions).
fn validate_cues(cues: &[CaptionCue], master: f64) -> ReelResult<()> {
    let mut expected_start = 0.0_f64;
    for cue in cues {
        if cue.duration <= 0.0 {
            return Err(ReelError::validation("cue duration must be > 0"));
        }
        if (cue.start - expected_start).abs() > TILING_EPSILON {
            return Err(ReelError::validation(format!(
                "cues must be contiguous (expected start {expected_start}, got {})",
                cue.start
            )));
        }
        expected_start = cue.start + cue.duration;
    }
    if !cues.is_empty() && (expected_start - master).abs() > TILING_EPSILON {
        return Err(ReelError::validation(format!(
            "cue durations must sum to {master} (got {expected_start})"
        )));
    }
    Ok(())
}
