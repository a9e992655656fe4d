pub mod encoder;

use std::fmt;

const OP_CLEAR: u8 = 0x01;
const OP_REFRESH_MODE: u8 = 0x02;
const OP_SPEED: u8 = 0x04;
const OP_CONTRAST: u8 = 0x05;
const OP_COOL_LIGHT: u8 = 0x06;
const OP_WARM_LIGHT: u8 = 0x07;
const OP_DITHER_MODE: u8 = 0x09;
const OP_COLOUR_FILTER: u8 = 0x0B;
const OP_ANTIFLICKER: u8 = 0x12;

/// Every device function the panel exposes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Setting {
    Clear,
    RefreshMode,
    Speed,
    Contrast,
    CoolLight,
    WarmLight,
    DitherMode,
    ColourFilter,
    AntiFlicker,
}

impl Setting {
    pub const fn opcode(self) -> u8 {
        match self {
            Setting::Clear => OP_CLEAR,
            Setting::RefreshMode => OP_REFRESH_MODE,
            Setting::Speed => OP_SPEED,
            Setting::Contrast => OP_CONTRAST,
            Setting::CoolLight => OP_COOL_LIGHT,
            Setting::WarmLight => OP_WARM_LIGHT,
            Setting::DitherMode => OP_DITHER_MODE,
            Setting::ColourFilter => OP_COLOUR_FILTER,
            Setting::AntiFlicker => OP_ANTIFLICKER,
        }
    }

    /// Number of payload bytes following the opcode.
    pub const fn arity(self) -> usize {
        match self {
            Setting::Clear => 0,
            Setting::ColourFilter => 2,
            Setting::AntiFlicker => 4,
            _ => 1,
        }
    }

    /// Commands that drive the frontlight or the refresh hardware need the
    /// panel to settle before the next command arrives.
    pub const fn needs_settle(self) -> bool {
        matches!(
            self,
            Setting::Clear | Setting::RefreshMode | Setting::CoolLight | Setting::WarmLight
        )
    }

    pub fn name(self) -> &'static str {
        match self {
            Setting::Clear => "clear",
            Setting::RefreshMode => "refresh_mode",
            Setting::Speed => "speed",
            Setting::Contrast => "contrast",
            Setting::CoolLight => "cool_light",
            Setting::WarmLight => "warm_light",
            Setting::DitherMode => "dither_mode",
            Setting::ColourFilter => "colour_filter",
            Setting::AntiFlicker => "antiflicker",
        }
    }
}

/// One opcode plus its fixed-arity payload, exactly as written to the device.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Command {
    setting: Setting,
    bytes: Vec<u8>,
}

impl Command {
    /// Panics if `payload` does not match the setting's arity; that is a bug
    /// in the encoder, never a runtime condition.
    pub fn new(setting: Setting, payload: &[u8]) -> Self {
        assert_eq!(
            payload.len(),
            setting.arity(),
            "{} takes {} payload bytes",
            setting.name(),
            setting.arity()
        );
        let mut bytes = Vec::with_capacity(1 + payload.len());
        bytes.push(setting.opcode());
        bytes.extend_from_slice(payload);
        Self { setting, bytes }
    }

    pub fn setting(&self) -> Setting {
        self.setting
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }

    #[allow(dead_code)]
    pub fn payload(&self) -> &[u8] {
        &self.bytes[1..]
    }
}

impl fmt::Display for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:<13}", self.setting.name())?;
        for byte in &self.bytes {
            write!(f, " {:02X}", byte)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_opcode_table() {
        let table = [
            (Setting::Clear, 0x01, 0),
            (Setting::RefreshMode, 0x02, 1),
            (Setting::Speed, 0x04, 1),
            (Setting::Contrast, 0x05, 1),
            (Setting::CoolLight, 0x06, 1),
            (Setting::WarmLight, 0x07, 1),
            (Setting::DitherMode, 0x09, 1),
            (Setting::ColourFilter, 0x0B, 2),
            (Setting::AntiFlicker, 0x12, 4),
        ];
        for (setting, opcode, arity) in table {
            assert_eq!(setting.opcode(), opcode, "{}", setting.name());
            assert_eq!(setting.arity(), arity, "{}", setting.name());
        }
    }

    #[test]
    fn test_command_bytes() {
        let cmd = Command::new(Setting::ColourFilter, &[245, 3]);
        assert_eq!(cmd.as_bytes(), &[0x0B, 245, 3]);
        assert_eq!(cmd.payload(), &[245, 3]);
        assert_eq!(cmd.to_string(), "colour_filter 0B F5 03");
    }

    #[test]
    fn test_clear_is_opcode_only() {
        let cmd = Command::new(Setting::Clear, &[]);
        assert_eq!(cmd.as_bytes(), &[0x01]);
        assert!(cmd.payload().is_empty());
    }

    #[test]
    #[should_panic(expected = "contrast takes 1 payload bytes")]
    fn test_wrong_arity_panics() {
        Command::new(Setting::Contrast, &[1, 2]);
    }

    #[test]
    fn test_settle_sensitive_settings() {
        assert!(Setting::Clear.needs_settle());
        assert!(Setting::CoolLight.needs_settle());
        assert!(Setting::WarmLight.needs_settle());
        assert!(Setting::RefreshMode.needs_settle());
        assert!(!Setting::Contrast.needs_settle());
        assert!(!Setting::AntiFlicker.needs_settle());
    }
}
