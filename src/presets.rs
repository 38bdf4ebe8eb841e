//! Named target presets.
//!
//! A `TARGET` on the command line is either `WIDTHxHEIGHT` or one of these
//! names. Names are matched case-insensitively.

use crate::imaging::{Dimensions, TransformError};
use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Preset {
    pub name: &'static str,
    pub dimensions: Dimensions,
    pub description: &'static str,
}

pub const PRESETS: &[Preset] = &[
    Preset {
        name: "square",
        dimensions: Dimensions::new(1080, 1080),
        description: "1:1 feed post",
    },
    Preset {
        name: "landscape",
        dimensions: Dimensions::new(1920, 1080),
        description: "16:9 widescreen",
    },
    Preset {
        name: "portrait",
        dimensions: Dimensions::new(1080, 1920),
        description: "9:16 story / vertical video",
    },
    Preset {
        name: "social",
        dimensions: Dimensions::new(1080, 1350),
        description: "4:5 portrait post",
    },
    Preset {
        name: "uhd",
        dimensions: Dimensions::new(3840, 2160),
        description: "16:9 4K",
    },
    Preset {
        name: "cinema",
        dimensions: Dimensions::new(2560, 1080),
        description: "21:9 ultrawide",
    },
];

pub fn find_preset(name: &str) -> Option<&'static Preset> {
    PRESETS.iter().find(|p| p.name.eq_ignore_ascii_case(name))
}

/// Resolve a preset name or `WIDTHxHEIGHT` into validated target dimensions.
pub fn parse_target(text: &str) -> Result<Dimensions, TransformError> {
    let text = text.trim();
    match find_preset(text) {
        Some(preset) => Ok(preset.dimensions),
        None => text.parse::<Dimensions>()?.validate("target"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn preset_names_are_unique() {
        for (i, a) in PRESETS.iter().enumerate() {
            for b in &PRESETS[i + 1..] {
                assert_ne!(a.name, b.name);
            }
        }
    }

    #[test]
    fn find_preset_ignores_case() {
        assert_eq!(
            find_preset("Square").map(|p| p.dimensions),
            Some(Dimensions::new(1080, 1080))
        );
        assert!(find_preset("octagon").is_none());
    }

    #[test]
    fn parse_target_by_name() {
        assert_eq!(parse_target("portrait").unwrap(), Dimensions::new(1080, 1920));
        assert_eq!(parse_target(" cinema ").unwrap(), Dimensions::new(2560, 1080));
    }

    #[test]
    fn parse_target_explicit() {
        assert_eq!(parse_target("800x600").unwrap(), Dimensions::new(800, 600));
    }

    #[test]
    fn parse_target_rejects_zero_and_garbage() {
        assert!(matches!(
            parse_target("0x600"),
            Err(TransformError::InvalidDimension { .. })
        ));
        assert!(parse_target("wide").is_err());
    }

    #[test]
    fn presets_are_valid_targets() {
        for preset in PRESETS {
            assert!(preset.dimensions.validate("target").is_ok(), "{}", preset.name);
        }
    }
}
