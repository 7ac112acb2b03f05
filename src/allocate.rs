//! Clip allocation: partition the master timeline into equal shares, one per
//! footage asset, looping sources that are individually shorter than their
//! share. Byte-for-byte reproducible for identical inputs.
//!
//! Ranking-weighted shares (longer allotments for higher-ranked search
//! results) are a deliberate extension point; equal-share is the only policy
//! implemented here.

use crate::{
    error::{ReelError, ReelResult},
    media::MediaAsset,
    model::Clip,
};

/// Partition `[0, master)` across `assets`, in input order.
///
/// Each asset gets an equal share `master / k`. Sources shorter than their
/// share are marked looped with enough whole repeats to cover it; all sources
/// are then trimmed to exactly the share. The final clip's end is pinned to
/// `master` so the intervals tile the timeline with no float drift.
pub fn allocate(assets: &[MediaAsset], master: f64) -> ReelResult<Vec<Clip>> {
    if assets.is_empty() {
        return Err(ReelError::no_footage(
            "allocator received zero clips; retry with a different search term upstream",
        ));
    }
    if !master.is_finite() || master <= 0.0 {
        return Err(ReelError::validation(format!(
            "master duration must be > 0 seconds (got {master})"
        )));
    }

    for asset in assets {
        asset.validate()?;
    }

    let k = assets.len();
    let share = master / k as f64;
    let mut clips = Vec::with_capacity(k);

    for (i, asset) in assets.iter().enumerate() {
        let start = i as f64 * share;
        // Last share absorbs accumulated rounding so the track ends at
        // exactly `master`.
        let duration = if i + 1 == k { master - start } else { share };

        let looped = asset.duration_sec < duration;
        let loop_count = if looped {
            ((duration / asset.duration_sec).ceil() as u32).saturating_sub(1)
        } else {
            0
        };

        clips.push(Clip {
            asset_index: i,
            start,
            duration,
            looped,
            loop_count,
        });
    }

    Ok(clips)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn asset(duration_sec: f64) -> MediaAsset {
        MediaAsset::from_parts("clip.mp4", 1920, 1080, duration_sec, 30, 1, false).unwrap()
    }

    #[test]
    fn zero_clips_is_no_footage() {
        let err = allocate(&[], 30.0).unwrap_err();
        assert!(matches!(err, ReelError::NoFootage(_)));
    }

    #[test]
    fn rejects_non_positive_master() {
        assert!(allocate(&[asset(5.0)], 0.0).is_err());
        assert!(allocate(&[asset(5.0)], -3.0).is_err());
    }

    #[test]
    fn rejects_invalid_asset() {
        let mut bad = asset(5.0);
        bad.width = 0;
        assert!(matches!(
            allocate(&[bad], 10.0),
            Err(ReelError::InvalidMedia(_))
        ));
    }

    #[test]
    fn single_long_clip_is_trimmed_not_looped() {
        let clips = allocate(&[asset(40.0)], 27.4).unwrap();
        assert_eq!(clips.len(), 1);
        assert_eq!(clips[0].start, 0.0);
        assert!((clips[0].duration - 27.4).abs() < 1e-9);
        assert!(!clips[0].looped);
        assert_eq!(clips[0].loop_count, 0);
    }

    #[test]
    fn shares_tile_master_exactly() {
        for k in 1..=7 {
            let assets: Vec<MediaAsset> = (0..k).map(|_| asset(12.0)).collect();
            let clips = allocate(&assets, 27.4).unwrap();
            assert_eq!(clips.len(), k);
            let mut expected = 0.0;
            for clip in &clips {
                assert!((clip.start - expected).abs() < 1e-9);
                assert!(clip.duration > 0.0);
                expected = clip.start + clip.duration;
            }
            assert!((expected - 27.4).abs() < 1e-12);
        }
    }

    #[test]
    fn short_clips_loop_to_cover_their_share() {
        // 27.4s over 3 clips -> each share = 9.1333...s
        let clips = allocate(&[asset(5.0), asset(40.0), asset(3.0)], 27.4).unwrap();
        let share = 27.4 / 3.0;

        assert!(clips[0].looped);
        assert_eq!(clips[0].loop_count, 1); // 2 x 5s covers 9.13s
        assert!((clips[0].duration - share).abs() < 1e-9);

        assert!(!clips[1].looped);
        assert!((clips[1].duration - share).abs() < 1e-9);

        assert!(clips[2].looped);
        assert_eq!(clips[2].loop_count, 3); // 4 x 3s covers 9.13s
        assert!((clips[2].start + clips[2].duration - 27.4).abs() < 1e-12);
    }

    #[test]
    fn exact_fit_does_not_loop() {
        let clips = allocate(&[asset(10.0), asset(10.0)], 20.0).unwrap();
        assert!(clips.iter().all(|c| !c.looped && c.loop_count == 0));
    }

    #[test]
    fn allocation_is_deterministic() {
        let assets = [asset(5.0), asset(40.0), asset(3.0)];
        let a = allocate(&assets, 27.4).unwrap();
        let b = allocate(&assets, 27.4).unwrap();
        assert_eq!(a, b);
    }
}
