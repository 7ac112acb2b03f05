//! Intro/outro bumpers: fixed-duration segments built once from
//! configuration, independent of clip and caption content. A banner that
//! fails to build is skipped with a warning; the bumper itself is only
//! dropped when its configured duration is zero.

use tracing::warn;

use crate::{
    config::RenderConfig,
    error::{ReelError, ReelResult},
    model::{Bumper, Overlay, OverlayContent, OverlayPosition},
    template::TemplateSettings,
};

pub const INTRO_FADE_SECS: f64 = 0.5;
pub const OUTRO_FADE_SECS: f64 = 0.3;

fn banner(
    text: &str,
    color: &str,
    position: OverlayPosition,
    duration: f64,
    fade_in_sec: f64,
) -> ReelResult<Overlay> {
    if text.trim().is_empty() {
        return Err(ReelError::overlay("banner text is empty"));
    }
    Ok(Overlay {
        content: OverlayContent::Banner {
            text: text.trim().to_string(),
            color: color.to_string(),
        },
        position,
        opacity: 1.0,
        start: 0.0,
        duration,
        fade_in_sec,
    })
}

/// Black background with the channel name fading in at center.
/// Returns `None` when the configured intro duration is zero.
pub fn intro(config: &RenderConfig, template: &TemplateSettings) -> Option<Bumper> {
    if config.intro_duration <= 0.0 {
        return None;
    }
    let mut overlays = Vec::with_capacity(1);
    match banner(
        &config.channel_name.to_uppercase(),
        &template.colors.primary,
        OverlayPosition::Center,
        config.intro_duration,
        INTRO_FADE_SECS,
    ) {
        Ok(b) => overlays.push(b),
        Err(e) => warn!("intro banner skipped: {e}"),
    }
    Some(Bumper {
        duration: config.intro_duration,
        background: "black".to_string(),
        overlays,
    })
}

/// Black background with the two call-to-action banners ("LIKE" at the left
/// quarter, "SUBSCRIBE" at the right quarter) fading in together.
/// Returns `None` when the configured outro duration is zero.
pub fn outro(config: &RenderConfig, template: &TemplateSettings) -> Option<Bumper> {
    if config.outro_duration <= 0.0 {
        return None;
    }
    let mut overlays = Vec::with_capacity(2);
    let ctas = [
        ("LIKE", &template.colors.primary, OverlayPosition::LeftQuarter),
        (
            "SUBSCRIBE",
            &template.colors.accent,
            OverlayPosition::RightQuarter,
        ),
    ];
    for (text, color, position) in ctas {
        match banner(text, color, position, config.outro_duration, OUTRO_FADE_SECS) {
            Ok(b) => overlays.push(b),
            Err(e) => warn!("outro banner skipped: {e}"),
        }
    }
    Some(Bumper {
        duration: config.outro_duration,
        background: "black".to_string(),
        overlays,
    })
}
