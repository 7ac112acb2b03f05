//! Layer composition. The compositor only *declares* the merge as a
//! [`MainSegment`] with a fixed paint order; it never resamples or
//! re-encodes a layer. Pixel work belongs to the encode stage.
//!
//! Paint order, bottom to top and not configurable:
//! base video+audio track, top dim band, bottom dim band, caption cues,
//! watermark.

use tracing::warn;

use crate::{
    error::{ReelError, ReelResult},
    model::{
        CaptionCue, MainSegment, Overlay, OverlayContent, OverlayPosition, PlacedClip, ZoomSpec,
    },
    template::WatermarkPosition,
};

/// Semi-transparent bands behind the caption area, frame_height/4 tall,
/// anchored top and bottom, spanning the whole main segment.
pub fn dim_bands(opacity: f64, duration: f64) -> ReelResult<Vec<Overlay>> {
    if !(0.0..=1.0).contains(&opacity) || !opacity.is_finite() {
        return Err(ReelError::overlay(format!(
            "dim band opacity must be in [0, 1] (got {opacity})"
        )));
    }
    if duration <= 0.0 {
        return Err(ReelError::overlay("dim band duration must be > 0"));
    }
    let band = |position| Overlay {
        content: OverlayContent::DimBand,
        position,
        opacity,
        start: 0.0,
        duration,
        fade_in_sec: 0.0,
    };
    Ok(vec![
        band(OverlayPosition::TopBand),
        band(OverlayPosition::BottomBand),
    ])
}

/// Persistent channel-handle watermark for the whole main segment.
pub fn watermark(
    text: &str,
    position: WatermarkPosition,
    opacity: f64,
    duration: f64,
) -> ReelResult<Overlay> {
    if text.trim().is_empty() {
        return Err(ReelError::overlay("watermark text is empty"));
    }
    if duration <= 0.0 {
        return Err(ReelError::overlay("watermark duration must be > 0"));
    }
    Ok(Overlay {
        content: OverlayContent::Watermark {
            text: text.trim().to_string(),
        },
        position: OverlayPosition::Anchor(position),
        opacity,
        start: 0.0,
        duration,
        fade_in_sec: 0.0,
    })
}

/// Merge the geometry-corrected base track with its overlay layers.
///
/// All layers share the base track's timebase; an overlay reaching outside
/// `[0, duration)` is simply invisible for that portion. An empty cue list is
/// a degraded output (base + overlays only), logged as a warning, never an
/// error.
pub fn compose(
    duration: f64,
    base: Vec<PlacedClip>,
    zoom: Option<ZoomSpec>,
    overlays: Vec<Overlay>,
    cues: Vec<CaptionCue>,
    watermark: Option<Overlay>,
) -> MainSegment {
    if cues.is_empty() {
        warn!("no caption cues survived segmentation; rendering without captions");
    }
    MainSegment {
        duration,
        base,
        zoom,
        overlays,
        cues,
        watermark,
    }
}
