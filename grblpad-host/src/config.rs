use grblpad_core::DEFAULT_BAUD;
use grblpad_launchpad::DEVICE_KEYWORD;

pub const PORT_VAR: &str = "GRBLPAD_PORT";
pub const BAUD_VAR: &str = "GRBLPAD_BAUD";
pub const MIDI_VAR: &str = "GRBLPAD_MIDI";
pub const LOG_VAR: &str = "GRBLPAD_LOG";

const DEFAULT_PORT: &str = "/dev/ttyACM0";

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("GRBLPAD_BAUD must be a baud rate, got `{0}`")]
    Baud(String),
}

/// Where to find the controller and the Launchpad
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub port: String,
    pub baud: u32,
    pub midi_keyword: String,
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let baud = match lookup(BAUD_VAR) {
            Some(baud) => baud.trim().parse().map_err(|_| ConfigError::Baud(baud))?,
            None => DEFAULT_BAUD,
        };
        Ok(Self {
            port: lookup(PORT_VAR).unwrap_or_else(|| DEFAULT_PORT.to_owned()),
            baud,
            midi_keyword: lookup(MIDI_VAR).unwrap_or_else(|| DEVICE_KEYWORD.to_owned()),
        })
    }
}
