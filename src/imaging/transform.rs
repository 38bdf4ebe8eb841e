//! Transform planning: how a source of one aspect ratio lands on a target
//! canvas of another.
//!
//! Everything here is pure. [`plan`] takes two [`Dimensions`] and a
//! [`FitMethod`] and returns a [`TransformPlan`] describing the uniform scale,
//! the scaled size, and either the padding (`fit`) or the crop (`fill`) that
//! turns the scaled source into exactly the target canvas.
//!
//! ## Strategies
//!
//! | Method | Scale | Result |
//! |---|---|---|
//! | `fit` | `min(tw/sw, th/sh)` | whole source visible, letterbox or pillarbox bars |
//! | `fill` | `max(tw/sw, th/sh)` | canvas fully covered, overflow cropped |
//!
//! Odd leftovers are never split: padding and crop both put the base share
//! on the leading side (left/top) and the extra pixel on the trailing side
//! (right/bottom).
//!
//! ```text
//! 1920x1080 → 1920x1920
//!
//!   fit                      fill
//!   ┌──────────────┐         ┌──┬──────────┬──┐
//!   │   bar 420    │         │  │          │  │
//!   ├──────────────┤         │c │  1920 x  │c │
//!   │ 1920 x 1080  │         │r │   1920   │r │
//!   ├──────────────┤         │o │          │o │
//!   │   bar 420    │         │p │          │p │
//!   └──────────────┘         └──┴──────────┴──┘
//! ```

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TransformError {
    #[error("invalid {role} dimensions {width}x{height}: width and height must be positive")]
    InvalidDimension {
        role: &'static str,
        width: u32,
        height: u32,
    },
    #[error("cannot parse dimensions '{0}': expected WIDTHxHEIGHT")]
    Parse(String),
    #[error("plan does not match target: {0}")]
    Inconsistent(String),
}

/// Pixel size of a source asset or a target canvas.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Dimensions {
    pub width: u32,
    pub height: u32,
}

impl Dimensions {
    pub const fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    pub fn aspect_ratio(self) -> f64 {
        self.width as f64 / self.height as f64
    }

    pub fn longer_edge(self) -> u32 {
        self.width.max(self.height)
    }

    /// Reject zero-sized input before any ratio is computed.
    pub fn validate(self, role: &'static str) -> Result<Self, TransformError> {
        if self.width == 0 || self.height == 0 {
            return Err(TransformError::InvalidDimension {
                role,
                width: self.width,
                height: self.height,
            });
        }
        Ok(self)
    }

    /// Exact aspect equality by cross-multiplication (no float tolerance needed).
    pub fn same_aspect_as(self, other: Dimensions) -> bool {
        self.width as u64 * other.height as u64 == self.height as u64 * other.width as u64
    }
}

impl fmt::Display for Dimensions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}x{}", self.width, self.height)
    }
}

impl FromStr for Dimensions {
    type Err = TransformError;

    /// Parses `1920x1080` (also `1920X1080` and `1920×1080`).
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let parse_err = || TransformError::Parse(s.to_string());
        let (w, h) = s
            .trim()
            .split_once(['x', 'X', '×'])
            .ok_or_else(parse_err)?;
        let width: u32 = w.trim().parse().map_err(|_| parse_err())?;
        let height: u32 = h.trim().parse().map_err(|_| parse_err())?;
        Dimensions::new(width, height).validate("parsed")
    }
}

/// Fitting strategy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FitMethod {
    /// Shrink until the whole source is visible; pad the rest.
    Fit,
    /// Grow until the canvas is covered; crop the overflow.
    Fill,
}

impl FitMethod {
    pub const ALL: [FitMethod; 2] = [FitMethod::Fit, FitMethod::Fill];

    pub fn as_str(self) -> &'static str {
        match self {
            FitMethod::Fit => "fit",
            FitMethod::Fill => "fill",
        }
    }
}

impl fmt::Display for FitMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.as_str())
    }
}

impl FromStr for FitMethod {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "fit" => Ok(FitMethod::Fit),
            "fill" => Ok(FitMethod::Fill),
            other => Err(format!("unknown fit method '{other}' (expected fit or fill)")),
        }
    }
}

/// Where padding goes when scaled content does not cover the canvas.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Bars {
    None,
    /// Letterbox: bars above and below.
    Horizontal,
    /// Pillarbox: bars left and right.
    Vertical,
}

impl Bars {
    pub fn as_str(self) -> &'static str {
        match self {
            Bars::None => "none",
            Bars::Horizontal => "horizontal",
            Bars::Vertical => "vertical",
        }
    }
}

impl fmt::Display for Bars {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.as_str())
    }
}

/// Geometric plan for one strategy. See the [module docs](self).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TransformPlan {
    pub method: FitMethod,
    pub scale: f64,
    pub scaled_width: u32,
    pub scaled_height: u32,
    pub bars: Bars,
    pub offset_x: u32,
    pub offset_y: u32,
    pub crop_left: u32,
    pub crop_top: u32,
    pub crop_right: u32,
    pub crop_bottom: u32,
}

/// Padding on each side of the placed content (`fit` only; zero for `fill`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct Padding {
    pub left: u32,
    pub top: u32,
    pub right: u32,
    pub bottom: u32,
}

/// An axis-aligned pixel rectangle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Region {
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
}

impl TransformPlan {
    pub fn scaled(&self) -> Dimensions {
        Dimensions::new(self.scaled_width, self.scaled_height)
    }

    pub fn has_crop(&self) -> bool {
        self.crop_left > 0 || self.crop_top > 0 || self.crop_right > 0 || self.crop_bottom > 0
    }

    pub fn padding(&self, target: Dimensions) -> Padding {
        Padding {
            left: self.offset_x,
            top: self.offset_y,
            right: target
                .width
                .saturating_sub(self.scaled_width)
                .saturating_sub(self.offset_x),
            bottom: target
                .height
                .saturating_sub(self.scaled_height)
                .saturating_sub(self.offset_y),
        }
    }

    /// Where the scaled content sits on the canvas.
    ///
    /// Errors if the content would spill past the canvas edge.
    pub fn placement(&self, target: Dimensions) -> Result<Region, TransformError> {
        let right = self.offset_x as u64 + self.scaled_width as u64;
        let bottom = self.offset_y as u64 + self.scaled_height as u64;
        if right > target.width as u64 || bottom > target.height as u64 {
            return Err(TransformError::Inconsistent(format!(
                "{}x{} content at ({}, {}) overflows {target} canvas",
                self.scaled_width, self.scaled_height, self.offset_x, self.offset_y
            )));
        }
        Ok(Region {
            x: self.offset_x,
            y: self.offset_y,
            width: self.scaled_width,
            height: self.scaled_height,
        })
    }

    /// The part of the scaled source that survives cropping.
    ///
    /// Errors if a crop consumes a whole axis or the surviving region is not
    /// exactly `target`.
    pub fn crop_region(&self, target: Dimensions) -> Result<Region, TransformError> {
        let horizontal = self.crop_left as u64 + self.crop_right as u64;
        let vertical = self.crop_top as u64 + self.crop_bottom as u64;
        if horizontal >= self.scaled_width as u64 {
            return Err(TransformError::Inconsistent(format!(
                "horizontal crop {}+{} consumes the {}px scaled width",
                self.crop_left, self.crop_right, self.scaled_width
            )));
        }
        if vertical >= self.scaled_height as u64 {
            return Err(TransformError::Inconsistent(format!(
                "vertical crop {}+{} consumes the {}px scaled height",
                self.crop_top, self.crop_bottom, self.scaled_height
            )));
        }
        let region = Region {
            x: self.crop_left,
            y: self.crop_top,
            width: self.scaled_width - horizontal as u32,
            height: self.scaled_height - vertical as u32,
        };
        if region.width != target.width || region.height != target.height {
            return Err(TransformError::Inconsistent(format!(
                "crop leaves {}x{}, expected {target}",
                region.width, region.height
            )));
        }
        Ok(region)
    }
}

/// Plan how `source` lands on `target` with the given strategy.
pub fn plan(
    source: Dimensions,
    target: Dimensions,
    method: FitMethod,
) -> Result<TransformPlan, TransformError> {
    let source = source.validate("source")?;
    let target = target.validate("target")?;

    if source.same_aspect_as(target) {
        return Ok(exact_plan(source, target, method));
    }

    let scale_x = target.width as f64 / source.width as f64;
    let scale_y = target.height as f64 / source.height as f64;

    Ok(match method {
        FitMethod::Fit => plan_fit(source, target, scale_x.min(scale_y)),
        FitMethod::Fill => plan_fill(source, target, scale_x.max(scale_y)),
    })
}

/// Plan both strategies at once, `fit` first.
pub fn plan_all(
    source: Dimensions,
    target: Dimensions,
) -> Result<[TransformPlan; 2], TransformError> {
    Ok([
        plan(source, target, FitMethod::Fit)?,
        plan(source, target, FitMethod::Fill)?,
    ])
}

fn exact_plan(source: Dimensions, target: Dimensions, method: FitMethod) -> TransformPlan {
    TransformPlan {
        method,
        scale: target.width as f64 / source.width as f64,
        scaled_width: target.width,
        scaled_height: target.height,
        bars: Bars::None,
        offset_x: 0,
        offset_y: 0,
        crop_left: 0,
        crop_top: 0,
        crop_right: 0,
        crop_bottom: 0,
    }
}

fn plan_fit(source: Dimensions, target: Dimensions, scale: f64) -> TransformPlan {
    let mut width = scale_edge(source.width, scale).min(target.width);
    let mut height = scale_edge(source.height, scale).min(target.height);

    // Less than a pixel short on both axes is rounding, not a bar.
    if within_rounding(source.width, scale, target.width)
        && within_rounding(source.height, scale, target.height)
    {
        width = target.width;
        height = target.height;
    }

    let (bars, offset_x, offset_y) = if width < target.width {
        (Bars::Vertical, (target.width - width) / 2, 0)
    } else if height < target.height {
        (Bars::Horizontal, 0, (target.height - height) / 2)
    } else {
        (Bars::None, 0, 0)
    };

    TransformPlan {
        method: FitMethod::Fit,
        scale,
        scaled_width: width,
        scaled_height: height,
        bars,
        offset_x,
        offset_y,
        crop_left: 0,
        crop_top: 0,
        crop_right: 0,
        crop_bottom: 0,
    }
}

fn plan_fill(source: Dimensions, target: Dimensions, scale: f64) -> TransformPlan {
    let width = scale_edge(source.width, scale).max(target.width);
    let height = scale_edge(source.height, scale).max(target.height);

    let (crop_left, crop_right) = split_excess(width - target.width);
    let (crop_top, crop_bottom) = split_excess(height - target.height);

    TransformPlan {
        method: FitMethod::Fill,
        scale,
        scaled_width: width,
        scaled_height: height,
        bars: Bars::None,
        offset_x: 0,
        offset_y: 0,
        crop_left,
        crop_top,
        crop_right,
        crop_bottom,
    }
}

fn scale_edge(edge: u32, scale: f64) -> u32 {
    ((edge as f64 * scale).round() as u32).max(1)
}

fn within_rounding(edge: u32, scale: f64, target: u32) -> bool {
    (target as f64 - edge as f64 * scale).abs() < 1.0
}

/// Leading side gets the floor, trailing side the remainder.
fn split_excess(excess: u32) -> (u32, u32) {
    let lead = excess / 2;
    (lead, excess - lead)
}
