//! Final encode: translate a validated [`RenderPlan`] into one ffmpeg
//! invocation. The plan declares the merge; ffmpeg owns all pixel and sample
//! work. We intentionally use the system `ffmpeg` binary rather than
//! `ffmpeg-next` to avoid native FFmpeg dev header/lib requirements.

use std::{
    path::{Path, PathBuf},
    process::{Command, Stdio},
};

use tracing::warn;

use crate::{
    error::{ReelError, ReelResult},
    model::{
        Bumper, CaptionCue, MainSegment, Overlay, OverlayContent, OverlayPosition, RenderPlan,
    },
    template::{TemplateSettings, WatermarkPosition},
    zoom,
};

#[derive(Clone, Debug)]
pub struct EncodeConfig {
    pub out_path: PathBuf,
    pub overwrite: bool,
}

impl EncodeConfig {
    pub fn new(out_path: impl Into<PathBuf>) -> Self {
        Self {
            out_path: out_path.into(),
            overwrite: true,
        }
    }
}

pub fn is_ffmpeg_on_path() -> bool {
    Command::new("ffmpeg")
        .arg("-version")
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .status()
        .map(|s| s.success())
        .unwrap_or(false)
}

pub fn ensure_parent_dir(path: &Path) -> ReelResult<()> {
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        use anyhow::Context as _;
        std::fs::create_dir_all(parent)
            .with_context(|| format!("failed to create output directory '{}'", parent.display()))?;
    }
    Ok(())
}

/// Encode `plan` to `cfg.out_path`. Any ffmpeg failure surfaces as
/// [`ReelError::Encode`]; the caller owns cleanup of partial output.
pub fn encode(plan: &RenderPlan, cfg: &EncodeConfig) -> ReelResult<()> {
    plan.validate()?;
    ensure_parent_dir(&cfg.out_path)?;

    if !cfg.overwrite && cfg.out_path.exists() {
        return Err(ReelError::encode(format!(
            "output file '{}' already exists",
            cfg.out_path.display()
        )));
    }
    if !is_ffmpeg_on_path() {
        return Err(ReelError::encode(
            "ffmpeg is required for MP4 encoding, but was not found on PATH",
        ));
    }

    let args = build_ffmpeg_args(plan, cfg)?;
    let output = Command::new("ffmpeg")
        .args(&args)
        .stdin(Stdio::null())
        .stdout(Stdio::null())
        .stderr(Stdio::piped())
        .output()
        .map_err(|e| ReelError::encode(format!("failed to spawn ffmpeg: {e}")))?;

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        return Err(ReelError::encode(format!(
            "ffmpeg exited with status {}: {}",
            output.status,
            stderr.trim()
        )));
    }
    Ok(())
}

/// Deterministic argument list for the whole encode: inputs, filtergraph,
/// stream maps, codec settings. Pure with respect to the plan, so it is
/// testable without ffmpeg installed.
pub fn build_ffmpeg_args(plan: &RenderPlan, cfg: &EncodeConfig) -> ReelResult<Vec<String>> {
    let main = plan
        .main()
        .ok_or_else(|| ReelError::validation("plan has no main segment"))?;

    let mut args: Vec<String> = vec!["-hide_banner".into(), "-loglevel".into(), "error".into()];
    args.push(if cfg.overwrite { "-y" } else { "-n" }.into());

    // Clip inputs, in base-track order. Looping happens at the input level so
    // the trim in the filtergraph sees an already-repeated stream.
    for placed in &main.base {
        if placed.clip.loop_count > 0 {
            args.push("-stream_loop".into());
            args.push(placed.clip.loop_count.to_string());
        }
        args.push("-i".into());
        args.push(plan.clip_paths[placed.clip.asset_index].display().to_string());
    }
    let narration_index = main.base.len();
    args.push("-i".into());
    args.push(plan.narration_path.display().to_string());

    // Bumper backgrounds are synthesized color sources.
    let mut next_input = narration_index + 1;
    let intro_index = plan.intro().map(|b| {
        let idx = next_input;
        next_input += 1;
        push_color_input(&mut args, b, plan);
        idx
    });
    let outro_index = plan.outro().map(|b| {
        let idx = next_input;
        next_input += 1;
        push_color_input(&mut args, b, plan);
        idx
    });

    args.push("-filter_complex".into());
    args.push(build_filtergraph(plan, main, intro_index, outro_index)?);

    args.push("-map".into());
    args.push("[outv]".into());
    args.push("-map".into());
    args.push("[outa]".into());

    args.extend(
        [
            "-c:v",
            "libx264",
            "-preset",
            "medium",
            "-pix_fmt",
            "yuv420p",
            "-r",
        ]
        .map(String::from),
    );
    args.push(plan.fps.to_string());
    args.extend(["-c:a", "aac", "-b:a", "192k", "-movflags", "+faststart"].map(String::from));
    args.push("-t".into());
    args.push(plan.total_duration().to_string());
    args.push(cfg.out_path.display().to_string());

    Ok(args)
}

fn push_color_input(args: &mut Vec<String>, bumper: &Bumper, plan: &RenderPlan) {
    args.push("-f".into());
    args.push("lavfi".into());
    args.push("-t".into());
    args.push(bumper.duration.to_string());
    args.push("-i".into());
    args.push(format!(
        "color=c={}:s={}x{}:r={}",
        bumper.background, plan.width, plan.height, plan.fps
    ));
}

fn build_filtergraph(
    plan: &RenderPlan,
    main: &MainSegment,
    intro_index: Option<usize>,
    outro_index: Option<usize>,
) -> ReelResult<String> {
    let mut chains: Vec<String> = Vec::new();

    // Per-clip normalization: trim to the allocated share, reset timestamps,
    // cover-crop into the output frame.
    for (i, placed) in main.base.iter().enumerate() {
        let g = &placed.geometry;
        chains.push(format!(
            "[{i}:v]trim=duration={dur},setpts=PTS-STARTPTS,\
             scale={sw}:{sh},crop={w}:{h}:{cx}:{cy},fps={fps},setsar=1[v{i}]",
            dur = placed.clip.duration,
            sw = g.scaled_w,
            sh = g.scaled_h,
            w = plan.width,
            h = plan.height,
            cx = g.crop_x,
            cy = g.crop_y,
            fps = plan.fps,
        ));
    }

    // Concatenate into the base track.
    let concat_inputs: String = (0..main.base.len()).map(|i| format!("[v{i}]")).collect();
    chains.push(format!(
        "{concat_inputs}concat=n={}:v=1:a=0[base]",
        main.base.len()
    ));

    // Main chain: zoom ramp, dim bands, caption cues, watermark, in that
    // fixed paint order.
    let mut stages: Vec<String> = Vec::new();
    if let Some(spec) = main.zoom {
        if spec.amount.is_finite() && spec.amount > 0.0 {
            stages.push(zoom::zoompan_filter(
                spec,
                main.duration,
                plan.fps,
                plan.width,
                plan.height,
            ));
        } else {
            warn!("zoom spec unusable (amount {}); rendering unzoomed", spec.amount);
        }
    }
    for overlay in &main.overlays {
        match dim_band_filter(overlay) {
            Ok(f) => stages.push(f),
            Err(e) if e.is_recoverable() => warn!("overlay layer skipped: {e}"),
            Err(e) => return Err(e),
        }
    }
    for cue in &main.cues {
        match cue_filters(cue, &plan.template, plan.width) {
            Ok(mut f) => stages.append(&mut f),
            Err(e) if e.is_recoverable() => warn!("caption cue skipped: {e}"),
            Err(e) => return Err(e),
        }
    }
    if let Some(wm) = &main.watermark {
        match watermark_filter(wm, &plan.template, plan.width) {
            Ok(f) => stages.push(f),
            Err(e) if e.is_recoverable() => warn!("watermark skipped: {e}"),
            Err(e) => return Err(e),
        }
    }
    if stages.is_empty() {
        chains.push("[base]null[vmain]".to_string());
    } else {
        chains.push(format!("[base]{}[vmain]", stages.join(",")));
    }

    // Bumper chains, each a color source with its banners drawn on.
    if let (Some(idx), Some(bumper)) = (intro_index, plan.intro()) {
        chains.push(bumper_chain(idx, bumper, &plan.template, plan.width, "vintro")?);
    }
    if let (Some(idx), Some(bumper)) = (outro_index, plan.outro()) {
        chains.push(bumper_chain(idx, bumper, &plan.template, plan.width, "voutro")?);
    }

    // Segment concatenation in plan order.
    let mut segment_labels = Vec::new();
    if intro_index.is_some() {
        segment_labels.push("[vintro]");
    }
    segment_labels.push("[vmain]");
    if outro_index.is_some() {
        segment_labels.push("[voutro]");
    }
    if segment_labels.len() == 1 {
        chains.push("[vmain]null[outv]".to_string());
    } else {
        chains.push(format!(
            "{}concat=n={}:v=1:a=0[outv]",
            segment_labels.concat(),
            segment_labels.len()
        ));
    }

    // Narration audio: trim to the master timeline, shift past the intro,
    // pad through the outro so bumpers stay silent.
    let narration_index = main.base.len();
    let intro_ms = (plan.intro().map_or(0.0, |b| b.duration) * 1000.0).round() as u64;
    let mut audio = format!(
        "[{narration_index}:a]atrim=duration={},asetpts=PTS-STARTPTS",
        main.duration
    );
    if intro_ms > 0 {
        audio.push_str(&format!(",adelay={intro_ms}:all=1"));
    }
    audio.push_str(&format!(",apad=whole_dur={}[outa]", plan.total_duration()));
    chains.push(audio);

    Ok(chains.join(";"))
}

fn bumper_chain(
    input_index: usize,
    bumper: &Bumper,
    template: &TemplateSettings,
    width: u32,
    label: &str,
) -> ReelResult<String> {
    let mut stages = Vec::new();
    for overlay in &bumper.overlays {
        match banner_filter(overlay, template, width) {
            Ok(f) => stages.push(f),
            Err(e) if e.is_recoverable() => warn!("bumper banner skipped: {e}"),
            Err(e) => return Err(e),
        }
    }
    if stages.is_empty() {
        Ok(format!("[{input_index}:v]null[{label}]"))
    } else {
        Ok(format!("[{input_index}:v]{}[{label}]", stages.join(",")))
    }
}

fn dim_band_filter(overlay: &Overlay) -> ReelResult<String> {
    if overlay.content != OverlayContent::DimBand {
        return Err(ReelError::overlay("expected a dim band overlay"));
    }
    let y = match overlay.position {
        OverlayPosition::TopBand => "0",
        OverlayPosition::BottomBand => "ih-ih/4",
        _ => {
            return Err(ReelError::overlay(
                "dim bands must anchor to the top or bottom band position",
            ));
        }
    };
    Ok(format!(
        "drawbox=x=0:y={y}:w=iw:h=ih/4:color=black@{}:t=fill:\
         enable='between(t,{},{})'",
        overlay.opacity,
        overlay.start,
        overlay.start + overlay.duration,
    ))
}

/// Two drawtext filters per cue, one per display line, gated to the cue's
/// interval on the main timebase.
fn cue_filters(
    cue: &CaptionCue,
    template: &TemplateSettings,
    width: u32,
) -> ReelResult<Vec<String>> {
    if !cue.start.is_finite() || !cue.duration.is_finite() || cue.duration <= 0.0 {
        return Err(ReelError::overlay(format!(
            "cue has unusable timing (start {}, duration {})",
            cue.start, cue.duration
        )));
    }
    let size = scaled_px(template.text_size, width);
    let end = cue.start + cue.duration;
    let mut filters = Vec::with_capacity(2);
    for (line_no, line) in [&cue.line1, &cue.line2].into_iter().enumerate() {
        if line.is_empty() {
            continue;
        }
        // Line 2 sits one line-height (plus a small gap) below the anchor.
        let y = format!(
            "h*{anchor}+{offset}",
            anchor = cue.anchor_frac,
            offset = line_no as u32 * (size + size / 8),
        );
        filters.push(format!(
            "drawtext=text='{text}':fontsize={size}:fontcolor={color}:\
             bordercolor={border}:borderw={bw}:x=(w-text_w)/2:y={y}:\
             enable='between(t,{start},{end})'",
            text = escape_drawtext(line),
            color = template.colors.primary,
            border = template.colors.background,
            bw = template.stroke_width,
            start = cue.start,
        ));
    }
    Ok(filters)
}

fn watermark_filter(
    overlay: &Overlay,
    template: &TemplateSettings,
    width: u32,
) -> ReelResult<String> {
    let OverlayContent::Watermark { text } = &overlay.content else {
        return Err(ReelError::overlay("expected a watermark overlay"));
    };
    let OverlayPosition::Anchor(anchor) = overlay.position else {
        return Err(ReelError::overlay("watermark must use an anchor position"));
    };
    let (x, y) = anchor_expr(anchor);
    Ok(format!(
        "drawtext=text='{text}':fontsize={size}:fontcolor={color}:\
         bordercolor={border}:borderw=2:alpha={alpha}:x={x}:y={y}:\
         enable='between(t,{start},{end})'",
        text = escape_drawtext(text),
        size = scaled_px(30, width),
        color = template.colors.secondary,
        border = template.colors.background,
        alpha = overlay.opacity,
        start = overlay.start,
        end = overlay.start + overlay.duration,
    ))
}

fn banner_filter(
    overlay: &Overlay,
    template: &TemplateSettings,
    width: u32,
) -> ReelResult<String> {
    let OverlayContent::Banner { text, color } = &overlay.content else {
        return Err(ReelError::overlay("expected a banner overlay"));
    };
    let (size, x, y) = match overlay.position {
        OverlayPosition::Center => (
            scaled_px(80, width),
            "(w-text_w)/2".to_string(),
            "(h-text_h)/2".to_string(),
        ),
        OverlayPosition::LeftQuarter => (
            scaled_px(50, width),
            "w/4-text_w/2".to_string(),
            "h/2-text_h/2".to_string(),
        ),
        OverlayPosition::RightQuarter => (
            scaled_px(50, width),
            "3*w/4-text_w/2".to_string(),
            "h/2-text_h/2".to_string(),
        ),
        _ => return Err(ReelError::overlay("banner has no quarter/center position")),
    };
    // Linear fade-in via the alpha expression; after fade_in_sec the banner
    // holds at full opacity for the rest of the bumper.
    let alpha = if overlay.fade_in_sec > 0.0 {
        format!("'min(t/{},1)'", overlay.fade_in_sec)
    } else {
        "1".to_string()
    };
    Ok(format!(
        "drawtext=text='{text}':fontsize={size}:fontcolor={color}:\
         bordercolor={border}:borderw={bw}:alpha={alpha}:x={x}:y={y}",
        text = escape_drawtext(text),
        border = template.colors.background,
        bw = template.stroke_width,
    ))
}

fn anchor_expr(anchor: WatermarkPosition) -> (&'static str, &'static str) {
    match anchor {
        WatermarkPosition::TopLeft => ("20", "20"),
        WatermarkPosition::TopRight => ("w-text_w-20", "20"),
        WatermarkPosition::TopCenter => ("(w-text_w)/2", "20"),
        WatermarkPosition::BottomLeft => ("20", "h-text_h-20"),
        WatermarkPosition::BottomRight => ("w-text_w-20", "h-text_h-20"),
    }
}

/// Font sizes are authored against a 1080-wide frame; scale them with the
/// actual output width.
fn scaled_px(size_at_1080: u32, width: u32) -> u32 {
    ((u64::from(size_at_1080) * u64::from(width)) / 1080) as u32
}

/// Escape text for use inside a drawtext `text=` value within a
/// `-filter_complex` argument. Both the filtergraph parser and the drawtext
/// option parser get a pass, so every special character needs a backslash.
fn escape_drawtext(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '\\' | '\'' | ':' | ',' | ';' | '[' | ']' | '=' | '%' => {
                out.push('\\');
                out.push(c);
            }
            _ => out.push(c),
        }
    }
    out
}
