use std::{fmt, ops::Deref};

use crate::Error;

/// Firmware state token exactly as reported, e.g. `Idle`, `Run` or `Hold:0`.
///
/// GRBL may report states this program has no special handling for,
/// so the token is kept as an open string instead of a closed enum.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub struct MachineState(String);

impl MachineState {
    pub fn new(token: impl Into<String>) -> Self {
        Self(token.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// State without its substate code, `Hold:0` becomes `Hold`
    pub fn base(&self) -> &str {
        self.0.split_once(':').map_or(&self.0, |(base, _)| base)
    }
}

impl Deref for MachineState {
    type Target = str;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl fmt::Display for MachineState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for MachineState {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

/// Machine position in controller units
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Position {
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

/// One status report
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Status {
    pub state: MachineState,
    pub position: Position,
}

fn strip_markers(line: &str) -> Option<&str> {
    let mut chars = line.chars();
    chars.next()?;
    chars.next_back()?;
    Some(chars.as_str())
}

fn parse_field(value: Option<&str>) -> f64 {
    value.and_then(|v| v.parse().ok()).unwrap_or(0.0)
}

fn parse_triple(value: &str) -> Position {
    let mut values = value.split(',');
    Position {
        x: parse_field(values.next()),
        y: parse_field(values.next()),
        z: parse_field(values.next()),
    }
}

/// Parse a `<STATE|MPos:x,y,z|...>` status report.
///
/// Only `MPos` is interpreted, other fields are skipped.
/// Numbers that don't parse are read as zero since reports get garbled under load.
pub fn parse_status(line: &str) -> Result<Status, Error> {
    let malformed = || Error::MalformedStatus(line.to_owned());
    let body = strip_markers(line).ok_or_else(malformed)?;
    let mut components = body.split('|');
    let state = components.next().ok_or_else(malformed)?;
    let fields: Vec<&str> = components.collect();
    if fields.is_empty() {
        return Err(malformed());
    }

    let mut status = Status {
        state: MachineState::new(state),
        ..Default::default()
    };
    for field in fields {
        if let Some(("MPos", value)) = field.split_once(':') {
            status.position = parse_triple(value);
        }
    }
    Ok(status)
}
