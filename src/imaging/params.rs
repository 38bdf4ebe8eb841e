//! Parameter types for image operations.
//!
//! These structs describe *what* to do, not *how* to do it. They are the
//! interface between the [`PreviewGenerator`](crate::preview::PreviewGenerator)
//! (which decides what images to create and where) and the
//! [`backend`](super::backend) (which does the actual pixel work). Swapping the
//! backend for a mock in tests leaves all geometry decisions untouched.
//!
//! ## Types
//!
//! - [`Quality`]: Lossy encoding quality (1–100, default 85). Clamped on construction.
//! - [`Color`]: Opaque RGB fill colour, written as `#rrggbb` in config.
//! - [`OutputFormat`]: Encoded file format for every written image.
//! - [`RenderParams`]: Source + [`TransformPlan`] → one fit/fill canvas.
//! - [`ResizeParams`]: Source → exact width/height (original preview, thumbnails).
//! - [`ComposeParams`]: Several sources laid out as panels on one canvas.

use super::transform::{Dimensions, TransformPlan};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

/// Quality setting for lossy image encoding (1-100).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Quality(pub u32);

impl Quality {
    pub fn new(value: u32) -> Self {
        Self(value.clamp(1, 100))
    }

    pub fn value(self) -> u32 {
        self.0
    }
}

impl Default for Quality {
    fn default() -> Self {
        Self(85)
    }
}

/// Opaque RGB colour.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Color {
    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// Mid-gray, the padding colour for letterboxed previews.
    pub const NEUTRAL_GRAY: Color = Color::rgb(128, 128, 128);
    pub const WHITE: Color = Color::rgb(255, 255, 255);

    pub fn to_rgba(self) -> [u8; 4] {
        [self.r, self.g, self.b, 255]
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
    }
}

impl FromStr for Color {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let hex = s
            .trim()
            .strip_prefix('#')
            .ok_or_else(|| format!("colour '{s}' must start with '#'"))?;
        let channel = |i: usize| {
            hex.get(i..i + 2)
                .and_then(|pair| u8::from_str_radix(pair, 16).ok())
                .ok_or_else(|| format!("colour '{s}' is not #rrggbb"))
        };
        if hex.len() != 6 {
            return Err(format!("colour '{s}' is not #rrggbb"));
        }
        Ok(Color::rgb(channel(0)?, channel(2)?, channel(4)?))
    }
}

impl TryFrom<String> for Color {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<Color> for String {
    fn from(color: Color) -> Self {
        color.to_string()
    }
}

/// Encoded format of every image the crate writes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// Lossy, honours [`Quality`].
    #[default]
    Jpeg,
    Png,
    /// Lossless WebP.
    Webp,
}

impl OutputFormat {
    pub fn extension(self) -> &'static str {
        match self {
            OutputFormat::Jpeg => "jpg",
            OutputFormat::Png => "png",
            OutputFormat::Webp => "webp",
        }
    }
}

/// Parameters for rendering one fit/fill canvas.
#[derive(Debug, Clone, PartialEq)]
pub struct RenderParams {
    pub source: PathBuf,
    pub output: PathBuf,
    pub plan: TransformPlan,
    pub target: Dimensions,
    /// Padding colour for `fit`. Unused by `fill`.
    pub background: Color,
    pub quality: Quality,
}

/// Parameters for an aspect-preserving resize to exact dimensions.
///
/// When `width`/`height` equal the source size the image is re-encoded as is.
#[derive(Debug, Clone, PartialEq)]
pub struct ResizeParams {
    pub source: PathBuf,
    pub output: PathBuf,
    pub width: u32,
    pub height: u32,
    pub quality: Quality,
}

/// One image placed on a composed canvas.
#[derive(Debug, Clone, PartialEq)]
pub struct PanelParams {
    pub source: PathBuf,
    pub x: u32,
    pub y: u32,
    /// Size the source is resized to before placement.
    pub width: u32,
    pub height: u32,
}

/// Parameters for composing several images onto one canvas.
#[derive(Debug, Clone, PartialEq)]
pub struct ComposeParams {
    pub output: PathBuf,
    pub canvas: Dimensions,
    pub background: Color,
    pub panels: Vec<PanelParams>,
    pub quality: Quality,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn quality_clamps_to_valid_range() {
        assert_eq!(Quality::new(0).value(), 1);
        assert_eq!(Quality::new(50).value(), 50);
        assert_eq!(Quality::new(150).value(), 100);
    }

    #[test]
    fn quality_default_is_85() {
        assert_eq!(Quality::default().value(), 85);
    }

    #[test]
    fn color_parses_hex() {
        assert_eq!("#808080".parse::<Color>().unwrap(), Color::NEUTRAL_GRAY);
        assert_eq!("#FFffFF".parse::<Color>().unwrap(), Color::WHITE);
        assert_eq!(
            "#1a2b3c".parse::<Color>().unwrap(),
            Color::rgb(0x1a, 0x2b, 0x3c)
        );
    }

    #[test]
    fn color_rejects_malformed() {
        assert!("808080".parse::<Color>().is_err());
        assert!("#fff".parse::<Color>().is_err());
        assert!("#gggggg".parse::<Color>().is_err());
        assert!("#1234567".parse::<Color>().is_err());
    }

    #[test]
    fn color_displays_lowercase_hex() {
        assert_eq!(Color::rgb(255, 0, 171).to_string(), "#ff00ab");
    }

    #[test]
    fn output_format_extensions() {
        assert_eq!(OutputFormat::default(), OutputFormat::Jpeg);
        assert_eq!(OutputFormat::Jpeg.extension(), "jpg");
        assert_eq!(OutputFormat::Webp.extension(), "webp");
    }
}
