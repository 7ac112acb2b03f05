//! Full render through the system ffmpeg binary. Skips (passes trivially)
//! when ffmpeg/ffprobe are not installed, the same way synthetic media is
//! generated for the fixtures.

use std::{path::Path, process::Command};

use reelkit::{
    EncodeConfig, MediaAsset, NarrationAsset, RenderConfig, RenderDriver, RenderJob,
};

fn ffmpeg_tools_available() -> bool {
    let ok = |bin: &str| {
        Command::new(bin)
            .arg("-version")
            .stdout(std::process::Stdio::null())
            .stderr(std::process::Stdio::null())
            .status()
            .map(|s| s.success())
            .unwrap_or(false)
    };
    ok("ffmpeg") && ok("ffprobe")
}

fn synth_clip(path: &Path, size: &str, secs: &str) -> anyhow::Result<()> {
    let status = Command::new("ffmpeg")
        .args([
            "-v", "error", "-y", "-f", "lavfi", "-i",
            &format!("testsrc=size={size}:rate=30"),
            "-t", secs, "-pix_fmt", "yuv420p", "-c:v", "libx264",
        ])
        .arg(path)
        .status()?;
    anyhow::ensure!(status.success(), "ffmpeg failed creating {}", path.display());
    Ok(())
}

fn synth_narration(path: &Path, secs: &str) -> anyhow::Result<()> {
    let status = Command::new("ffmpeg")
        .args([
            "-v", "error", "-y", "-f", "lavfi", "-i",
            "sine=frequency=440:sample_rate=48000",
            "-t", secs, "-c:a", "aac",
        ])
        .arg(path)
        .status()?;
    anyhow::ensure!(status.success(), "ffmpeg failed creating {}", path.display());
    Ok(())
}

fn probe_duration(path: &Path) -> anyhow::Result<f64> {
    let out = Command::new("ffprobe")
        .args([
            "-v", "error", "-show_entries", "format=duration", "-of",
            "default=noprint_wrappers=1:nokey=1",
        ])
        .arg(path)
        .output()?;
    anyhow::ensure!(out.status.success(), "ffprobe failed");
    Ok(String::from_utf8_lossy(&out.stdout).trim().parse::<f64>()?)
}

#[test]
fn renders_a_short_with_bumpers_and_captions() -> anyhow::Result<()> {
    if !ffmpeg_tools_available() {
        eprintln!("skipping: ffmpeg/ffprobe not on PATH");
        return Ok(());
    }

    let dir = std::env::temp_dir().join("reelkit_render_smoke");
    std::fs::create_dir_all(&dir)?;
    let clip_a = dir.join("clip_a.mp4");
    let clip_b = dir.join("clip_b.mp4");
    let narration = dir.join("narration.m4a");
    let out = dir.join("short.mp4");

    // One landscape and one portrait source exercise both cover-crop arms;
    // clip_a (1s) is shorter than its 2s share so it must loop.
    synth_clip(&clip_a, "320x180", "1")?;
    synth_clip(&clip_b, "180x320", "5")?;
    synth_narration(&narration, "4")?;

    let job = RenderJob {
        narration: NarrationAsset::probe(&narration)?,
        narration_text: "six words drive one caption cue".to_string(),
        clips: vec![MediaAsset::probe(&clip_a)?, MediaAsset::probe(&clip_b)?],
    };

    let config = RenderConfig {
        width: 270,
        height: 480,
        intro_duration: 0.0,
        outro_duration: 1.0,
        ..Default::default()
    };
    let mut driver = RenderDriver::new(config)?;
    let plan = driver.render(&job, &EncodeConfig::new(&out))?;

    assert!(out.exists());
    let expected = plan.total_duration();
    let actual = probe_duration(&out)?;
    assert!(
        (actual - expected).abs() < 0.5,
        "output duration {actual} vs planned {expected}"
    );

    std::fs::remove_dir_all(&dir).ok();
    Ok(())
}
