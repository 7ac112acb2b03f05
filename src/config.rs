use serde::{Deserialize, Serialize};

use crate::{
    error::{ReelError, ReelResult},
    template::{TemplateKind, WatermarkPosition},
};

/// Platform ceiling for a short: the master timeline is truncated to this
/// many seconds before allocation when the narration runs longer.
pub const MAX_SHORT_SECS: f64 = 60.0;

/// All knobs for one render, constructed once and passed by reference into
/// each stage. No component reads ambient process state.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RenderConfig {
    /// Output frame width in pixels (must be even for yuv420p).
    pub width: u32,
    /// Output frame height in pixels (must be even for yuv420p).
    pub height: u32,
    pub fps: u32,

    /// Words shown per caption cue (two display lines).
    pub words_per_group: usize,
    /// Vertical anchor of captions as a fraction of frame height.
    pub caption_anchor: f64,

    pub zoom_enabled: bool,
    /// Fractional zoom ceiling reached at the end of the master timeline
    /// (0.15 = 15%).
    pub zoom_amount: f64,

    /// Opacity of the top/bottom dimming bands behind captions.
    pub dim_opacity: f64,

    /// Intro bumper length in seconds; 0 disables the intro.
    pub intro_duration: f64,
    /// Outro bumper length in seconds; 0 disables the outro.
    pub outro_duration: f64,

    pub watermark_enabled: bool,
    /// Overrides the template's watermark anchor when set.
    pub watermark_position: Option<WatermarkPosition>,

    pub template: TemplateKind,
    /// Shown on the intro banner.
    pub channel_name: String,
    /// Shown as the text watermark.
    pub channel_handle: String,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            width: 1080,
            height: 1920,
            fps: 30,
            words_per_group: 6,
            caption_anchor: 0.40,
            zoom_enabled: true,
            zoom_amount: 0.15,
            dim_opacity: 0.3,
            intro_duration: 0.0,
            outro_duration: 2.0,
            watermark_enabled: true,
            watermark_position: None,
            template: TemplateKind::Default,
            channel_name: "My Channel".to_string(),
            channel_handle: "@mychannel".to_string(),
        }
    }
}

impl RenderConfig {
    pub fn validate(&self) -> ReelResult<()> {
        if self.width == 0 || self.height == 0 {
            return Err(ReelError::validation("output width/height must be > 0"));
        }
        if !self.width.is_multiple_of(2) || !self.height.is_multiple_of(2) {
            return Err(ReelError::validation(
                "output width/height must be even (required for yuv420p mp4 output)",
            ));
        }
        if self.fps == 0 {
            return Err(ReelError::validation("fps must be > 0"));
        }
        if self.words_per_group == 0 {
            return Err(ReelError::validation("words_per_group must be >= 1"));
        }
        if !self.caption_anchor.is_finite() || !(0.0..1.0).contains(&self.caption_anchor) {
            return Err(ReelError::validation("caption_anchor must be in [0, 1)"));
        }
        if !self.zoom_amount.is_finite() || self.zoom_amount < 0.0 {
            return Err(ReelError::validation("zoom_amount must be finite and >= 0"));
        }
        if !self.dim_opacity.is_finite() || !(0.0..=1.0).contains(&self.dim_opacity) {
            return Err(ReelError::validation("dim_opacity must be in [0, 1]"));
        }
        if self.intro_duration < 0.0 || self.outro_duration < 0.0 {
            return Err(ReelError::validation(
                "intro/outro durations must be >= 0 seconds",
            ));
        }
        Ok(())
    }

    /// Watermark anchor after applying the template default.
    pub fn watermark_anchor(&self) -> WatermarkPosition {
        self.watermark_position
            .unwrap_or(self.template.resolve().watermark_position)
    }
}
