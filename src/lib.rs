#![forbid(unsafe_code)]

pub mod allocate;
pub mod bumpers;
pub mod captions;
pub mod compose;
pub mod config;
pub mod driver;
pub mod encode_ffmpeg;
pub mod error;
pub mod geometry;
pub mod media;
pub mod model;
pub mod template;
pub mod zoom;

pub use config::{MAX_SHORT_SECS, RenderConfig};
pub use driver::{DriverState, RenderDriver, RenderJob};
pub use encode_ffmpeg::EncodeConfig;
pub use error::{ReelError, ReelResult};
pub use geometry::GeometryTransform;
pub use media::{MediaAsset, NarrationAsset};
pub use model::{CaptionCue, Clip, MainSegment, Overlay, RenderPlan, Segment};
pub use template::{TemplateKind, TemplateSettings, WatermarkPosition};
