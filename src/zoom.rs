//! Linear zoom-in ramp over the base track. The factor is a pure function of
//! *global* elapsed time on the master timeline, so the zoom grows
//! monotonically across clip boundaries instead of resetting per clip, and
//! every frame is testable without a decoder.

use crate::model::ZoomSpec;

/// Zoom factor at `global_elapsed` seconds into a `master`-second timeline:
/// `1 + amount * (elapsed / master)`, clamped to `[1, 1 + amount]`.
pub fn zoom_factor(amount: f64, global_elapsed: f64, master: f64) -> f64 {
    if master <= 0.0 || amount <= 0.0 {
        return 1.0;
    }
    let progress = (global_elapsed / master).clamp(0.0, 1.0);
    1.0 + amount * progress
}

/// Center-crop window after scaling a `w`x`h` frame by `factor`: the region
/// of the scaled frame that maps back onto the original dimensions.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ZoomWindow {
    pub scaled_w: u32,
    pub scaled_h: u32,
    pub crop_x: u32,
    pub crop_y: u32,
}

pub fn zoom_window(w: u32, h: u32, factor: f64) -> ZoomWindow {
    let factor = factor.max(1.0);
    let scaled_w = ((f64::from(w) * factor) as u32).max(w);
    let scaled_h = ((f64::from(h) * factor) as u32).max(h);
    ZoomWindow {
        scaled_w,
        scaled_h,
        crop_x: (scaled_w - w) / 2,
        crop_y: (scaled_h - h) / 2,
    }
}

/// The `zoompan` filter equivalent of [`zoom_factor`], evaluated by ffmpeg
/// per output frame (`on` = output frame index). Deterministic string for
/// deterministic plans.
pub fn zoompan_filter(spec: ZoomSpec, master: f64, fps: u32, out_w: u32, out_h: u32) -> String {
    let ceiling = 1.0 + spec.amount;
    format!(
        "zoompan=z='min(1+{amount}*on/({fps}*{master}),{ceiling})'\
         :d=1:x='iw/2-(iw/zoom/2)':y='ih/2-(ih/zoom/2)':s={out_w}x{out_h}:fps={fps}",
        amount = spec.amount,
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn factor_ramps_linearly_to_ceiling() {
        assert_eq!(zoom_factor(0.15, 0.0, 30.0), 1.0);
        assert!((zoom_factor(0.15, 15.0, 30.0) - 1.075).abs() < 1e-12);
        assert!((zoom_factor(0.15, 30.0, 30.0) - 1.15).abs() < 1e-12);
    }

    #[test]
    fn factor_is_driven_by_global_time_across_clip_boundaries() {
        // A frame 9.2s in (start of clip 2 of 3) zooms more than the last
        // frame of clip 1, never resetting to 1.
        let end_of_first = zoom_factor(0.15, 9.13, 27.4);
        let start_of_second = zoom_factor(0.15, 9.2, 27.4);
        assert!(start_of_second > end_of_first);
        assert!(end_of_first > 1.0);
    }

    #[test]
    fn factor_is_monotonic() {
        let mut prev = 0.0;
        for i in 0..=100 {
            let f = zoom_factor(0.15, f64::from(i) * 0.274, 27.4);
            assert!(f >= prev);
            prev = f;
        }
    }

    #[test]
    fn factor_clamps_outside_timeline() {
        assert_eq!(zoom_factor(0.15, -5.0, 30.0), 1.0);
        assert!((zoom_factor(0.15, 99.0, 30.0) - 1.15).abs() < 1e-12);
    }

    #[test]
    fn zero_amount_or_master_disables_zoom() {
        assert_eq!(zoom_factor(0.0, 10.0, 30.0), 1.0);
        assert_eq!(zoom_factor(0.15, 10.0, 0.0), 1.0);
    }

    #[test]
    fn window_is_centered_and_covers_frame() {
        let w = zoom_window(1080, 1920, 1.1);
        assert_eq!(w.scaled_w, 1188);
        assert_eq!(w.scaled_h, 2112);
        assert_eq!(w.crop_x, (1188 - 1080) / 2);
        assert_eq!(w.crop_y, (2112 - 1920) / 2);
        assert!(w.crop_x + 1080 <= w.scaled_w);
        assert!(w.crop_y + 1920 <= w.scaled_h);
    }

    #[test]
    fn unit_factor_window_is_identity() {
        let w = zoom_window(1080, 1920, 1.0);
        assert_eq!((w.scaled_w, w.scaled_h), (1080, 1920));
        assert_eq!((w.crop_x, w.crop_y), (0, 0));
    }

    #[test]
    fn zoompan_filter_embeds_ramp_parameters() {
        let f = zoompan_filter(ZoomSpec { amount: 0.15 }, 27.4, 30, 1080, 1920);
        assert!(f.contains("0.15*on/(30*27.4)"));
        assert!(f.contains("s=1080x1920"));
        assert!(f.contains("1.15"));
    }
}
