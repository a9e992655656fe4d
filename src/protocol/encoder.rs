use super::{Command, Setting};
use crate::settings::ResolvedSettings;

/// Speed is sent inverted: 1 (slowest) goes out as 10, 7 (fastest) as 4.
fn speed_wire(speed: u8) -> u8 {
    11 - speed
}

/// The panel expects the white threshold counted down from 255.
fn white_filter_wire(white: u8) -> u8 {
    255 - white
}

/// Turn validated settings into the command sequence for one device.
///
/// Appearance settings that a preset can carry come first, then the
/// frontlight/antiflicker overrides, and the clear always goes last so the
/// redraw happens under the final configuration.
pub fn encode(settings: &ResolvedSettings) -> Vec<Command> {
    let mut commands = Vec::new();

    if let Some(speed) = settings.speed() {
        commands.push(Command::new(Setting::Speed, &[speed_wire(speed)]));
    }
    if let Some(contrast) = settings.contrast() {
        commands.push(Command::new(Setting::Contrast, &[contrast]));
    }
    if let Some(dither_mode) = settings.dither_mode() {
        commands.push(Command::new(Setting::DitherMode, &[dither_mode]));
    }
    if let Some(mode) = settings.refresh_mode() {
        commands.push(Command::new(Setting::RefreshMode, &[mode.wire_value()]));
    }
    if let Some(filter) = settings.colour_filter() {
        commands.push(Command::new(
            Setting::ColourFilter,
            &[white_filter_wire(filter.white), filter.black],
        ));
    }

    if let Some(level) = settings.antiflicker() {
        commands.push(Command::new(Setting::AntiFlicker, &level.payload()));
    }
    if let Some(cool) = settings.cool_light() {
        commands.push(Command::new(Setting::CoolLight, &[cool]));
    }
    if let Some(warm) = settings.warm_light() {
        commands.push(Command::new(Setting::WarmLight, &[warm]));
    }

    if settings.clear() {
        commands.push(Command::new(Setting::Clear, &[]));
    }

    commands
}
