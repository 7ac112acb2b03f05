//! Cover-crop geometry: scale a source frame until it fully covers the target
//! frame, then crop the overflow symmetrically. Edges are lost by design;
//! the output is never letterboxed or stretched.

use serde::{Deserialize, Serialize};

use crate::error::{ReelError, ReelResult};

/// Scale-then-center-crop transform into a fixed output frame.
///
/// `scaled_w`/`scaled_h` are the source dimensions after scaling (each
/// `>=` the target dimension), and `crop_x`/`crop_y` the top-left corner of
/// the target-sized window inside the scaled frame.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct GeometryTransform {
    pub scale: f64,
    pub scaled_w: u32,
    pub scaled_h: u32,
    pub crop_x: u32,
    pub crop_y: u32,
}

pub fn resolve(
    native_w: u32,
    native_h: u32,
    target_w: u32,
    target_h: u32,
) -> ReelResult<GeometryTransform> {
    if native_w == 0 || native_h == 0 {
        return Err(ReelError::invalid_media(format!(
            "source dimensions must be > 0 (got {native_w}x{native_h})"
        )));
    }
    if target_w == 0 || target_h == 0 {
        return Err(ReelError::validation(format!(
            "target dimensions must be > 0 (got {target_w}x{target_h})"
        )));
    }

    let src_aspect = f64::from(native_w) / f64::from(native_h);
    let tgt_aspect = f64::from(target_w) / f64::from(target_h);

    let scale = if src_aspect > tgt_aspect {
        // Source relatively wider: pin height, crop excess width.
        f64::from(target_h) / f64::from(native_h)
    } else {
        // Source relatively taller (or matching): pin width, crop excess height.
        f64::from(target_w) / f64::from(native_w)
    };

    // Round up so the scaled frame always covers the target window.
    let scaled_w = ((f64::from(native_w) * scale).round() as u32).max(target_w);
    let scaled_h = ((f64::from(native_h) * scale).round() as u32).max(target_h);

    Ok(GeometryTransform {
        scale,
        scaled_w,
        scaled_h,
        crop_x: (scaled_w - target_w) / 2,
        crop_y: (scaled_h - target_h) / 2,
    })
}
