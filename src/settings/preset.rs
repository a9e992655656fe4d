use super::{RefreshMode, ResolvedSettings, SettingsError, SettingsRequest};
use clap::ValueEnum;
use std::fmt;
use std::str::FromStr;

/// Use-case oriented display configurations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Preset {
    Text,
    Speed,
    Image,
    Video,
    Read,
}

impl Preset {
    pub const ALL: [Preset; 5] = [
        Preset::Text,
        Preset::Speed,
        Preset::Image,
        Preset::Video,
        Preset::Read,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Preset::Text => "text",
            Preset::Speed => "speed",
            Preset::Image => "image",
            Preset::Video => "video",
            Preset::Read => "read",
        }
    }

    /// Field values the preset stands for. Every preset ends with a clear so
    /// the panel redraws under its new configuration.
    pub fn settings(self) -> SettingsRequest {
        let (refresh_mode, contrast, speed, dither_mode, white, black) = match self {
            Preset::Text => (RefreshMode::A2, 7, 6, 1, 0, 0),
            Preset::Speed => (RefreshMode::A2, 8, 7, 0, 0, 0),
            Preset::Image => (RefreshMode::DirectUpdate, 7, 5, 0, 0, 0),
            Preset::Video => (RefreshMode::A2, 7, 6, 2, 10, 0),
            Preset::Read => (RefreshMode::DirectUpdate, 7, 5, 3, 12, 10),
        };

        SettingsRequest {
            refresh_mode: Some(refresh_mode),
            clear: Some(true),
            speed: Some(speed),
            contrast: Some(contrast),
            dither_mode: Some(dither_mode),
            white_filter: Some(white),
            black_filter: Some(black),
            ..Default::default()
        }
    }
}

impl fmt::Display for Preset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Preset {
    type Err = SettingsError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Preset::ALL
            .into_iter()
            .find(|p| p.name() == s)
            .ok_or_else(|| SettingsError::UnknownPreset(s.to_string()))
    }
}

/// Merge `overrides` onto the preset (if any) and validate the result.
///
/// Nothing is partially applied: either every field passes its range check
/// or the whole request is rejected.
pub fn resolve(
    preset: Option<Preset>,
    overrides: &SettingsRequest,
) -> Result<ResolvedSettings, SettingsError> {
    let merged = match preset {
        Some(preset) => preset.settings().overlay(overrides),
        None => *overrides,
    };
    ResolvedSettings::validate(&merged)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::settings::ColourFilter;

    #[test]
    fn test_text_preset_without_overrides() {
        let resolved = resolve(Some(Preset::Text), &SettingsRequest::default()).unwrap();
        assert_eq!(resolved.refresh_mode(), Some(RefreshMode::A2));
        assert_eq!(resolved.contrast(), Some(7));
        assert_eq!(resolved.speed(), Some(6));
        assert_eq!(resolved.dither_mode(), Some(1));
        assert_eq!(
            resolved.colour_filter(),
            Some(ColourFilter { white: 0, black: 0 })
        );
        assert!(resolved.clear());
        assert_eq!(resolved.cool_light(), None);
        assert_eq!(resolved.warm_light(), None);
        assert_eq!(resolved.antiflicker(), None);
    }

    #[test]
    fn test_override_changes_only_that_field() {
        let plain = resolve(Some(Preset::Text), &SettingsRequest::default()).unwrap();
        let overrides = SettingsRequest {
            contrast: Some(3),
            ..Default::default()
        };
        let tuned = resolve(Some(Preset::Text), &overrides).unwrap();

        assert_eq!(tuned.contrast(), Some(3));
        let expected = resolve(
            None,
            &SettingsRequest {
                contrast: Some(3),
                ..Preset::Text.settings()
            },
        )
        .unwrap();
        assert_eq!(tuned, expected);
        assert_ne!(tuned, plain);
    }

    #[test]
    fn test_no_preset_passes_overrides_through() {
        let overrides = SettingsRequest {
            cool_light: Some(40),
            ..Default::default()
        };
        let resolved = resolve(None, &overrides).unwrap();
        assert_eq!(resolved.cool_light(), Some(40));
        assert_eq!(resolved.speed(), None);
        assert!(!resolved.clear());
    }

    #[test]
    fn test_no_clear_override_suppresses_preset_clear() {
        let overrides = SettingsRequest {
            clear: Some(false),
            ..Default::default()
        };
        let resolved = resolve(Some(Preset::Video), &overrides).unwrap();
        assert!(!resolved.clear());
        assert_eq!(resolved.dither_mode(), Some(2));
    }

    #[test]
    fn test_partial_filter_override_keeps_preset_partner() {
        let overrides = SettingsRequest {
            white_filter: Some(100),
            ..Default::default()
        };
        let resolved = resolve(Some(Preset::Read), &overrides).unwrap();
        assert_eq!(
            resolved.colour_filter(),
            Some(ColourFilter {
                white: 100,
                black: 10
            })
        );
    }

    #[test]
    fn test_out_of_range_override_rejects_preset() {
        let overrides = SettingsRequest {
            speed: Some(9),
            ..Default::default()
        };
        assert!(matches!(
            resolve(Some(Preset::Speed), &overrides),
            Err(SettingsError::ValueOutOfRange { value: 9, .. })
        ));
    }

    #[test]
    fn test_every_preset_is_valid() {
        for preset in Preset::ALL {
            let resolved = resolve(Some(preset), &SettingsRequest::default()).unwrap();
            assert!(resolved.clear(), "{preset} should clear");
            assert!(resolved.colour_filter().is_some());
        }
    }

    #[test]
    fn test_preset_from_str() {
        assert_eq!("read".parse::<Preset>(), Ok(Preset::Read));
        assert_eq!(
            "comic".parse::<Preset>(),
            Err(SettingsError::UnknownPreset("comic".to_string()))
        );
    }
}
