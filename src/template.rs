//! Visual templates: a fixed set of named looks resolved once at startup into
//! a concrete [`TemplateSettings`] value, so render-time code never does
//! string-keyed lookups.

use serde::{Deserialize, Serialize};

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TemplateKind {
    #[default]
    Default,
    BluePlanet,
    Modern,
    Minimal,
    Energetic,
}

/// Corner/edge anchor for the watermark layer.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum WatermarkPosition {
    TopLeft,
    TopRight,
    TopCenter,
    BottomLeft,
    BottomRight,
}

/// Caption/banner color palette. Colors are ffmpeg-compatible strings
/// (named colors or `#RRGGBB`).
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Palette {
    pub primary: String,
    pub secondary: String,
    pub background: String,
    pub accent: String,
}

/// Fully resolved template: everything the overlay builders need, by value.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TemplateSettings {
    pub name: String,
    pub colors: Palette,
    /// Caption font size in pixels at 1080-wide output.
    pub text_size: u32,
    pub stroke_width: u32,
    pub watermark_position: WatermarkPosition,
    pub watermark_opacity: f64,
}

impl TemplateKind {
    pub fn resolve(self) -> TemplateSettings {
        match self {
            TemplateKind::Default => TemplateSettings {
                name: "default".into(),
                colors: Palette {
                    primary: "yellow".into(),
                    secondary: "white".into(),
                    background: "black".into(),
                    accent: "#FF6B6B".into(),
                },
                text_size: 65,
                stroke_width: 5,
                watermark_position: WatermarkPosition::TopRight,
                watermark_opacity: 0.7,
            },
            TemplateKind::BluePlanet => TemplateSettings {
                name: "blue_planet".into(),
                colors: Palette {
                    primary: "#00D4FF".into(),
                    secondary: "#FFFFFF".into(),
                    background: "#001F3F".into(),
                    accent: "#00FFFF".into(),
                },
                text_size: 68,
                stroke_width: 6,
                watermark_position: WatermarkPosition::TopCenter,
                watermark_opacity: 0.8,
            },
            TemplateKind::Modern => TemplateSettings {
                name: "modern".into(),
                colors: Palette {
                    primary: "#00D9FF".into(),
                    secondary: "white".into(),
                    background: "black".into(),
                    accent: "#FF00FF".into(),
                },
                text_size: 70,
                stroke_width: 6,
                watermark_position: WatermarkPosition::TopLeft,
                watermark_opacity: 0.8,
            },
            TemplateKind::Minimal => TemplateSettings {
                name: "minimal".into(),
                colors: Palette {
                    primary: "white".into(),
                    secondary: "#CCCCCC".into(),
                    background: "black".into(),
                    accent: "#FFD700".into(),
                },
                text_size: 60,
                stroke_width: 3,
                watermark_position: WatermarkPosition::BottomRight,
                watermark_opacity: 0.5,
            },
            TemplateKind::Energetic => TemplateSettings {
                name: "energetic".into(),
                colors: Palette {
                    primary: "#FF4500".into(),
                    secondary: "yellow".into(),
                    background: "black".into(),
                    accent: "#00FF00".into(),
                },
                text_size: 75,
                stroke_width: 7,
                watermark_position: WatermarkPosition::TopCenter,
                watermark_opacity: 0.9,
            },
        }
    }
}
