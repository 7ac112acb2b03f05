//! Render driver: strictly sequential orchestration of the composition
//! stages. Each stage consumes the complete output of the previous one;
//! there is no pipelining and no cancellation mid-render. Frame-level
//! parallelism inside the encode belongs to ffmpeg, not to this crate.

use tracing::{info, warn};

use crate::{
    allocate, bumpers, captions, compose,
    config::{MAX_SHORT_SECS, RenderConfig},
    encode_ffmpeg::{self, EncodeConfig},
    error::{ReelError, ReelResult},
    geometry,
    media::{MediaAsset, NarrationAsset},
    model::{PlacedClip, RenderPlan, Segment, ZoomSpec},
};

/// Driver progression. `Failed` is terminal and reachable from any step.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DriverState {
    Idle,
    Allocating,
    Compositing,
    Bracketing,
    Encoding,
    Done,
    Failed,
}

/// One render job: the narration collaborator's output plus the footage
/// collaborator's fully materialized clips.
#[derive(Clone, Debug)]
pub struct RenderJob {
    pub narration: NarrationAsset,
    pub narration_text: String,
    pub clips: Vec<MediaAsset>,
}

pub struct RenderDriver {
    config: RenderConfig,
    state: DriverState,
}

impl RenderDriver {
    pub fn new(config: RenderConfig) -> ReelResult<Self> {
        config.validate()?;
        Ok(Self {
            config,
            state: DriverState::Idle,
        })
    }

    pub fn state(&self) -> DriverState {
        self.state
    }

    fn advance(&mut self, next: DriverState) {
        info!(from = ?self.state, to = ?next, "driver state");
        self.state = next;
    }

    /// Build the deterministic [`RenderPlan`] for `job`, stopping short of
    /// the encode. Used by the `plan` CLI subcommand and tests; [`render`]
    /// goes through the same path.
    ///
    /// [`render`]: RenderDriver::render
    pub fn plan(&mut self, job: &RenderJob) -> ReelResult<RenderPlan> {
        match self.build_plan(job) {
            Ok(plan) => Ok(plan),
            Err(e) => {
                self.advance(DriverState::Failed);
                Err(e)
            }
        }
    }

    /// Run the full pipeline: plan then encode to `out`. On failure the
    /// driver is left in `Failed` and any partial output file is the
    /// caller's to discard.
    #[tracing::instrument(skip(self, job))]
    pub fn render(&mut self, job: &RenderJob, out: &EncodeConfig) -> ReelResult<RenderPlan> {
        let plan = self.plan(job)?;

        self.advance(DriverState::Encoding);
        if let Err(e) = encode_ffmpeg::encode(&plan, out) {
            self.advance(DriverState::Failed);
            return Err(e);
        }

        self.advance(DriverState::Done);
        info!(out = %out.out_path.display(), duration = plan.total_duration(), "render complete");
        Ok(plan)
    }

    fn build_plan(&mut self, job: &RenderJob) -> ReelResult<RenderPlan> {
        let cfg = self.config.clone();
        let template = cfg.template.resolve();

        // The narration is the master clock, truncated once to the platform
        // ceiling; every downstream stage sees the truncated duration.
        if job.narration.duration_sec <= 0.0 {
            return Err(ReelError::invalid_media("narration duration must be > 0"));
        }
        let master = if job.narration.duration_sec > MAX_SHORT_SECS {
            warn!(
                narration = job.narration.duration_sec,
                ceiling = MAX_SHORT_SECS,
                "narration exceeds the shorts ceiling; truncating master timeline"
            );
            MAX_SHORT_SECS
        } else {
            job.narration.duration_sec
        };

        self.advance(DriverState::Allocating);
        let clips = allocate::allocate(&job.clips, master)?;
        let base: Vec<PlacedClip> = clips
            .into_iter()
            .map(|clip| {
                let asset = &job.clips[clip.asset_index];
                Ok(PlacedClip {
                    geometry: geometry::resolve(
                        asset.width,
                        asset.height,
                        cfg.width,
                        cfg.height,
                    )?,
                    clip,
                })
            })
            .collect::<ReelResult<_>>()?;

        self.advance(DriverState::Compositing);
        let cues = captions::segment(
            &job.narration_text,
            master,
            cfg.words_per_group,
            cfg.caption_anchor,
        );
        let overlays = match compose::dim_bands(cfg.dim_opacity, master) {
            Ok(bands) => bands,
            Err(e) if e.is_recoverable() => {
                warn!("dim bands skipped: {e}");
                Vec::new()
            }
            Err(e) => return Err(e),
        };
        let watermark = if cfg.watermark_enabled {
            match compose::watermark(
                &cfg.channel_handle,
                cfg.watermark_anchor(),
                template.watermark_opacity,
                master,
            ) {
                Ok(wm) => Some(wm),
                Err(e) if e.is_recoverable() => {
                    warn!("watermark skipped: {e}");
                    None
                }
                Err(e) => return Err(e),
            }
        } else {
            None
        };
        let zoom = cfg.zoom_enabled.then_some(ZoomSpec {
            amount: cfg.zoom_amount,
        });
        let main = compose::compose(master, base, zoom, overlays, cues, watermark);

        self.advance(DriverState::Bracketing);
        let mut segments = Vec::with_capacity(3);
        if let Some(bumper) = bumpers::intro(&cfg, &template) {
            segments.push(Segment::Intro(bumper));
        }
        segments.push(Segment::Main(main));
        if let Some(bumper) = bumpers::outro(&cfg, &template) {
            segments.push(Segment::Outro(bumper));
        }

        let plan = RenderPlan {
            width: cfg.width,
            height: cfg.height,
            fps: cfg.fps,
            master_duration: master,
            narration_path: job.narration.path.clone(),
            clip_paths: job.clips.iter().map(|a| a.path.clone()).collect(),
            template,
            segments,
        };
        plan.validate()?;
        Ok(plan)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn asset(duration_sec: f64) -> MediaAsset {
        MediaAsset::from_parts("clip.mp4", 1920, 1080, duration_sec, 30, 1, false).unwrap()
    }

    fn job(narration_sec: f64, clip_durations: &[f64], words: usize) -> RenderJob {
        let text = (0..words)
            .map(|i| format!("word{i}"))
            .collect::<Vec<_>>()
            .join(" ");
        RenderJob {
            narration: NarrationAsset::from_parts("narration.mp3", narration_sec).unwrap(),
            narration_text: text,
            clips: clip_durations.iter().copied().map(asset).collect(),
        }
    }

    #[test]
    fn new_driver_starts_idle_and_validates_config() {
        let driver = RenderDriver::new(RenderConfig::default()).unwrap();
        assert_eq!(driver.state(), DriverState::Idle);

        let bad = RenderConfig {
            fps: 0,
            ..Default::default()
        };
        assert!(RenderDriver::new(bad).is_err());
    }

    #[test]
    fn plan_ends_in_bracketing_not_encoding() {
        let mut driver = RenderDriver::new(RenderConfig::default()).unwrap();
        driver.plan(&job(27.4, &[5.0, 40.0, 3.0], 42)).unwrap();
        assert_eq!(driver.state(), DriverState::Bracketing);
    }

    #[test]
    fn zero_footage_fails_driver_without_output() {
        let mut driver = RenderDriver::new(RenderConfig::default()).unwrap();
        let err = driver.plan(&job(27.4, &[], 42)).unwrap_err();
        assert!(matches!(err, ReelError::NoFootage(_)));
        assert_eq!(driver.state(), DriverState::Failed);
    }

    #[test]
    fn scenario_27_4s_three_clips_42_words() {
        let mut driver = RenderDriver::new(RenderConfig {
            intro_duration: 0.0,
            outro_duration: 0.0,
            ..Default::default()
        })
        .unwrap();
        let plan = driver.plan(&job(27.4, &[5.0, 40.0, 3.0], 42)).unwrap();

        let main = plan.main().unwrap();
        let share = 27.4 / 3.0;
        assert_eq!(main.base.len(), 3);
        assert!((main.base[0].clip.duration - share).abs() < 1e-9);
        assert!(main.base[0].clip.looped);
        assert!(!main.base[1].clip.looped);
        assert!(main.base[2].clip.looped);

        assert_eq!(main.cues.len(), 7);
        let cue_total: f64 = main.cues.iter().map(|c| c.duration).sum();
        assert!((cue_total - 27.4).abs() < 1e-9);
        let per_cue = 27.4 / 42.0 * 6.0;
        assert!((main.cues[0].duration - per_cue).abs() < 1e-9);
    }

    #[test]
    fn narration_over_60s_truncates_master_before_allocation() {
        let mut driver = RenderDriver::new(RenderConfig::default()).unwrap();
        let plan = driver.plan(&job(75.0, &[100.0], 10)).unwrap();
        assert!((plan.master_duration - 60.0).abs() < 1e-9);
        let main = plan.main().unwrap();
        assert!((main.duration - 60.0).abs() < 1e-9);
        let cue_total: f64 = main.cues.iter().map(|c| c.duration).sum();
        assert!((cue_total - 60.0).abs() < 1e-9);
    }

    #[test]
    fn outro_only_bracketing_adds_two_seconds() {
        let mut driver = RenderDriver::new(RenderConfig {
            intro_duration: 0.0,
            outro_duration: 2.0,
            ..Default::default()
        })
        .unwrap();
        let plan = driver.plan(&job(27.4, &[40.0], 10)).unwrap();
        assert!(plan.intro().is_none());
        let outro = plan.outro().unwrap();
        assert_eq!(outro.overlays.len(), 2);
        assert!(
            outro
                .overlays
                .iter()
                .all(|o| (o.fade_in_sec - 0.3).abs() < 1e-12)
        );
        assert!((plan.total_duration() - 29.4).abs() < 1e-9);
    }

    #[test]
    fn plan_is_idempotent_for_identical_inputs() {
        let j = job(27.4, &[5.0, 40.0, 3.0], 42);
        let mut d1 = RenderDriver::new(RenderConfig::default()).unwrap();
        let mut d2 = RenderDriver::new(RenderConfig::default()).unwrap();
        let p1 = d1.plan(&j).unwrap();
        let p2 = d2.plan(&j).unwrap();
        assert_eq!(
            serde_json::to_string(&p1).unwrap(),
            serde_json::to_string(&p2).unwrap()
        );
    }

    #[test]
    fn watermark_disabled_leaves_main_without_watermark() {
        let mut driver = RenderDriver::new(RenderConfig {
            watermark_enabled: false,
            ..Default::default()
        })
        .unwrap();
        let plan = driver.plan(&job(10.0, &[20.0], 6)).unwrap();
        assert!(plan.main().unwrap().watermark.is_none());
    }

    #[test]
    fn empty_watermark_text_degrades_instead_of_failing() {
        let mut driver = RenderDriver::new(RenderConfig {
            channel_handle: String::new(),
            ..Default::default()
        })
        .unwrap();
        let plan = driver.plan(&job(10.0, &[20.0], 6)).unwrap();
        assert!(plan.main().unwrap().watermark.is_none());
        assert_eq!(driver.state(), DriverState::Bracketing);
    }

    #[test]
    fn zoom_disabled_passes_base_through() {
        let mut driver = RenderDriver::new(RenderConfig {
            zoom_enabled: false,
            ..Default::default()
        })
        .unwrap();
        let plan = driver.plan(&job(10.0, &[20.0], 6)).unwrap();
        assert!(plan.main().unwrap().zoom.is_none());
    }

    #[test]
    fn empty_narration_text_yields_caption_free_plan() {
        let mut driver = RenderDriver::new(RenderConfig::default()).unwrap();
        let plan = driver.plan(&job(10.0, &[20.0], 0)).unwrap();
        assert!(plan.main().unwrap().cues.is_empty());
        plan.validate().unwrap();
    }
}
