use grblpad_core::PositionChangeRequest;

use crate::sysex::{grid_cell, ARROW_LEDS};

const CONTROL_CHANGE: u8 = 0xB0;
const NOTE_ON: u8 = 0x90;

/// Control value sent when a side button goes down
const PRESSED: u8 = 127;

/// Translate a MIDI message from the Launchpad into a jog request.
///
/// Arrow buttons jog one cell when released, grid pads move to that cell when pressed.
pub fn decode(message: &[u8]) -> Option<PositionChangeRequest> {
    match *message {
        [CONTROL_CHANGE, control, value] if value != PRESSED => {
            let (x, y) = match ARROW_LEDS.iter().position(|led| *led == control)? {
                0 => (0, 1),
                1 => (0, -1),
                2 => (-1, 0),
                _ => (1, 0),
            };
            Some(PositionChangeRequest::relative(x, y))
        }
        [NOTE_ON, note, velocity] if velocity > 0 => {
            let (row, column) = grid_cell(note)?;
            Some(PositionChangeRequest::absolute(column as i32, row as i32))
        }
        _ => None,
    }
}
