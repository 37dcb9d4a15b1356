//! # grblpad-launchpad
//! Novation Launchpad Pro as position display and jog pad for grblpad.
//!

use grblpad_core::{Cell, Grid, GridDisplay, MachineState, RequestSender};
use midir::{MidiIO, MidiInput, MidiInputConnection, MidiOutput, MidiOutputConnection};

mod input;
pub mod sysex;

pub use input::decode;

/// Name the MIDI ports are opened under
const CLIENT_NAME: &str = "grblpad";

/// Default keyword to look for in port names
pub const DEVICE_KEYWORD: &str = "Launchpad Pro";

const ARROW_COLOR: u8 = 75;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("MIDI initialization failed: {0}")]
    Init(#[from] midir::InitError),

    #[error("No MIDI {direction} port matching `{keyword}`")]
    NotFound {
        direction: &'static str,
        keyword: String,
    },

    #[error("Couldn't connect to MIDI port\nError message: {0}")]
    Connect(String),

    #[error("Couldn't send to Launchpad\nError message: {0}")]
    Send(#[from] midir::SendError),

    #[error("No color for state `{0}`")]
    UnknownState(String),
}

fn cell_color(cell: Cell) -> u8 {
    match cell {
        Cell::Background => 127,
        Cell::Row => 13,
        Cell::Cursor => 5,
    }
}

/// Solid and pulse color of the status light for a firmware state
fn state_colors(state: &MachineState) -> Option<(u8, u8)> {
    let colors = match state.base() {
        "Idle" => (96, 96),
        "Run" => (75, 76),
        "Jog" => (76, 76),
        "Hold" => (9, 9),
        "Alarm" => (5, 5),
        "Home" => (45, 45),
        "Door" => (53, 53),
        "Check" => (21, 21),
        "Sleep" => (1, 1),
        _ => return None,
    };
    Some(colors)
}

/// Messages lighting the status button for `state`
pub fn state_messages(state: &MachineState) -> Result<Vec<Vec<u8>>, Error> {
    let (color, pulse_color) =
        state_colors(state).ok_or_else(|| Error::UnknownState(state.to_string()))?;
    let mut messages = vec![sysex::set_leds([(sysex::STATUS_LED, color)])];
    if pulse_color != color {
        messages.push(sysex::pulse(sysex::STATUS_LED, pulse_color));
    }
    Ok(messages)
}

/// Single message painting the whole 8x8 grid
pub fn grid_message(grid: &Grid) -> Vec<u8> {
    sysex::set_leds(grid.iter().enumerate().flat_map(|(row, cells)| {
        cells
            .iter()
            .enumerate()
            .map(move |(column, cell)| (sysex::grid_led(row, column), cell_color(*cell)))
    }))
}

fn find_port<T: MidiIO>(
    midi_io: &T,
    keyword: &str,
    direction: &'static str,
) -> Result<T::Port, Error> {
    for port in midi_io.ports() {
        let Ok(name) = midi_io.port_name(&port) else {
            continue;
        };
        if name.contains(keyword) {
            tracing::info!("Using MIDI {direction} port `{name}`");
            return Ok(port);
        }
    }
    Err(Error::NotFound {
        direction,
        keyword: keyword.to_owned(),
    })
}

/// Connected Launchpad Pro.
///
/// Button messages are decoded on the MIDI thread and sent as requests;
/// a jog arriving while the channel is full is dropped.
/// Both MIDI connections close when this is dropped.
pub struct Launchpad {
    output: MidiOutputConnection,
    _input: MidiInputConnection<()>,
}

impl Launchpad {
    /// Connect to the first device whose port names contain `keyword` and set it up for jogging
    #[tracing::instrument(level = "debug", skip(requests))]
    pub fn connect(keyword: &str, requests: RequestSender) -> Result<Self, Error> {
        let midi_output = MidiOutput::new(CLIENT_NAME)?;
        let port = find_port(&midi_output, keyword, "output")?;
        let output = midi_output
            .connect(&port, "grblpad-out")
            .map_err(|e| Error::Connect(e.to_string()))?;

        let midi_input = MidiInput::new(CLIENT_NAME)?;
        let port = find_port(&midi_input, keyword, "input")?;
        let input = midi_input
            .connect(
                &port,
                "grblpad-in",
                move |_, message, _| match decode(message) {
                    Some(request) => {
                        tracing::debug!("Jog request {request:?}");
                        if requests.try_send(request).is_err() {
                            tracing::debug!("Request channel busy, dropped {request:?}");
                        }
                    }
                    None => tracing::trace!("Ignored MIDI message {message:02X?}"),
                },
                (),
            )
            .map_err(|e| Error::Connect(e.to_string()))?;

        let mut launchpad = Self {
            output,
            _input: input,
        };
        launchpad.send(&sysex::select_layout(sysex::PROGRAMMER_LAYOUT))?;
        launchpad.send(&sysex::set_all(sysex::OFF))?;
        launchpad.send(&sysex::set_leds(
            sysex::ARROW_LEDS.map(|led| (led, ARROW_COLOR)),
        ))?;
        Ok(launchpad)
    }

    fn send(&mut self, message: &[u8]) -> Result<(), Error> {
        self.output.send(message)?;
        Ok(())
    }
}

impl GridDisplay for Launchpad {
    type Error = Error;

    fn set_state(&mut self, state: &MachineState) -> Result<(), Self::Error> {
        for message in state_messages(state)? {
            self.send(&message)?;
        }
        Ok(())
    }

    fn set_grid(&mut self, grid: &Grid) -> Result<(), Self::Error> {
        self.send(&grid_message(grid))
    }

    fn reset(&mut self) -> Result<(), Self::Error> {
        self.send(&sysex::set_all(sysex::OFF))
    }
}
