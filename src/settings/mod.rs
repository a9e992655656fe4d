pub mod preset;

use clap::ValueEnum;
use std::fmt;
use std::ops::RangeInclusive;
use thiserror::Error;

pub const SPEED_RANGE: RangeInclusive<u8> = 1..=7;
pub const CONTRAST_RANGE: RangeInclusive<u8> = 0..=15;
pub const DITHER_RANGE: RangeInclusive<u8> = 0..=3;
pub const FILTER_RANGE: RangeInclusive<u8> = 0..=254;
pub const LIGHT_RANGE: RangeInclusive<u8> = 0..=254;

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum RefreshMode {
    #[value(name = "direct_update")]
    DirectUpdate,
    #[value(name = "grey_update")]
    GreyUpdate,
    #[value(name = "a2")]
    A2,
}

impl RefreshMode {
    pub fn wire_value(self) -> u8 {
        match self {
            RefreshMode::DirectUpdate => 1,
            RefreshMode::GreyUpdate => 2,
            RefreshMode::A2 => 3,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum AntiFlicker {
    Disabled,
    Low,
    Middle,
    High,
}

impl AntiFlicker {
    pub fn payload(self) -> [u8; 4] {
        match self {
            AntiFlicker::Disabled => [0, 0, 0, 0],
            AntiFlicker::Low => [1, 0, 30, 10],
            AntiFlicker::Middle => [1, 0, 40, 20],
            AntiFlicker::High => [1, 0, 50, 30],
        }
    }
}

/// Names of the range-checked numeric fields, used in validation errors.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Field {
    Speed,
    Contrast,
    DitherMode,
    WhiteFilter,
    BlackFilter,
    CoolLight,
    WarmLight,
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Field::Speed => "speed",
            Field::Contrast => "contrast",
            Field::DitherMode => "dither_mode",
            Field::WhiteFilter => "white_filter",
            Field::BlackFilter => "black_filter",
            Field::CoolLight => "cool_light",
            Field::WarmLight => "warm_light",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SettingsError {
    #[error("unknown display preset: {0}")]
    UnknownPreset(String),
    #[error("{field} = {value} is outside {}..={}", .allowed.start(), .allowed.end())]
    ValueOutOfRange {
        field: Field,
        value: u8,
        allowed: RangeInclusive<u8>,
    },
    #[error("white_filter and black_filter must be given together")]
    IncompleteColourFilter,
}

/// What the caller asked for. `None` leaves the attribute untouched on the panel.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SettingsRequest {
    pub refresh_mode: Option<RefreshMode>,
    /// `Some(false)` suppresses a preset's implicit clear.
    pub clear: Option<bool>,
    pub speed: Option<u8>,
    pub contrast: Option<u8>,
    pub dither_mode: Option<u8>,
    pub white_filter: Option<u8>,
    pub black_filter: Option<u8>,
    pub cool_light: Option<u8>,
    pub warm_light: Option<u8>,
    pub antiflicker: Option<AntiFlicker>,
}

impl SettingsRequest {
    /// Field-wise merge where every field set in `overrides` wins.
    pub fn overlay(&self, overrides: &SettingsRequest) -> SettingsRequest {
        SettingsRequest {
            refresh_mode: overrides.refresh_mode.or(self.refresh_mode),
            clear: overrides.clear.or(self.clear),
            speed: overrides.speed.or(self.speed),
            contrast: overrides.contrast.or(self.contrast),
            dither_mode: overrides.dither_mode.or(self.dither_mode),
            white_filter: overrides.white_filter.or(self.white_filter),
            black_filter: overrides.black_filter.or(self.black_filter),
            cool_light: overrides.cool_light.or(self.cool_light),
            warm_light: overrides.warm_light.or(self.warm_light),
            antiflicker: overrides.antiflicker.or(self.antiflicker),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ColourFilter {
    pub white: u8,
    pub black: u8,
}

/// A request whose every present field has passed its range check.
///
/// Only obtainable through [`ResolvedSettings::validate`] (or
/// [`preset::resolve`]), so the encoder never sees an out-of-range value.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ResolvedSettings {
    refresh_mode: Option<RefreshMode>,
    clear: bool,
    speed: Option<u8>,
    contrast: Option<u8>,
    dither_mode: Option<u8>,
    colour_filter: Option<ColourFilter>,
    cool_light: Option<u8>,
    warm_light: Option<u8>,
    antiflicker: Option<AntiFlicker>,
}

fn check(
    field: Field,
    value: Option<u8>,
    allowed: RangeInclusive<u8>,
) -> Result<Option<u8>, SettingsError> {
    match value {
        Some(v) if !allowed.contains(&v) => Err(SettingsError::ValueOutOfRange {
            field,
            value: v,
            allowed,
        }),
        other => Ok(other),
    }
}

impl ResolvedSettings {
    pub fn validate(request: &SettingsRequest) -> Result<Self, SettingsError> {
        let speed = check(Field::Speed, request.speed, SPEED_RANGE)?;
        let contrast = check(Field::Contrast, request.contrast, CONTRAST_RANGE)?;
        let dither_mode = check(Field::DitherMode, request.dither_mode, DITHER_RANGE)?;
        let white = check(Field::WhiteFilter, request.white_filter, FILTER_RANGE)?;
        let black = check(Field::BlackFilter, request.black_filter, FILTER_RANGE)?;
        let cool_light = check(Field::CoolLight, request.cool_light, LIGHT_RANGE)?;
        let warm_light = check(Field::WarmLight, request.warm_light, LIGHT_RANGE)?;

        let colour_filter = match (white, black) {
            (Some(white), Some(black)) => Some(ColourFilter { white, black }),
            (None, None) => None,
            _ => return Err(SettingsError::IncompleteColourFilter),
        };

        Ok(Self {
            refresh_mode: request.refresh_mode,
            clear: request.clear.unwrap_or(false),
            speed,
            contrast,
            dither_mode,
            colour_filter,
            cool_light,
            warm_light,
            antiflicker: request.antiflicker,
        })
    }

    pub fn refresh_mode(&self) -> Option<RefreshMode> {
        self.refresh_mode
    }

    pub fn clear(&self) -> bool {
        self.clear
    }

    pub fn speed(&self) -> Option<u8> {
        self.speed
    }

    pub fn contrast(&self) -> Option<u8> {
        self.contrast
    }

    pub fn dither_mode(&self) -> Option<u8> {
        self.dither_mode
    }

    pub fn colour_filter(&self) -> Option<ColourFilter> {
        self.colour_filter
    }

    pub fn cool_light(&self) -> Option<u8> {
        self.cool_light
    }

    pub fn warm_light(&self) -> Option<u8> {
        self.warm_light
    }

    pub fn antiflicker(&self) -> Option<AntiFlicker> {
        self.antiflicker
    }
}
