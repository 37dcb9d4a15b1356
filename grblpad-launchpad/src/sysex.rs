//! Launchpad Pro system exclusive messages

const HEADER: [u8; 6] = [0xF0, 0x00, 0x20, 0x29, 0x02, 0x10];
const END: u8 = 0xF7;

const SELECT_LAYOUT: u8 = 0x2C;
const SET_ALL: u8 = 0x0E;
const SET_LEDS: u8 = 0x0A;
const PULSE_LED: u8 = 0x28;

/// Layout where every pad reports its LED number
pub const PROGRAMMER_LAYOUT: u8 = 0x03;

/// Side button used as status light
pub const STATUS_LED: u8 = 10;

/// Up, down, left, right
pub const ARROW_LEDS: [u8; 4] = [0x5B, 0x5C, 0x5D, 0x5E];

pub const OFF: u8 = 0;

fn message(command: u8, data: impl IntoIterator<Item = u8>) -> Vec<u8> {
    let mut bytes = HEADER.to_vec();
    bytes.push(command);
    bytes.extend(data);
    bytes.push(END);
    bytes
}

pub fn select_layout(layout: u8) -> Vec<u8> {
    message(SELECT_LAYOUT, [layout])
}

pub fn set_all(color: u8) -> Vec<u8> {
    message(SET_ALL, [color])
}

/// Set any number of LEDs in one message, given as (led, color) pairs
pub fn set_leds(leds: impl IntoIterator<Item = (u8, u8)>) -> Vec<u8> {
    message(SET_LEDS, leds.into_iter().flat_map(|(led, color)| [led, color]))
}

pub fn pulse(led: u8, color: u8) -> Vec<u8> {
    message(PULSE_LED, [led, color])
}

/// LED number of a grid pad, row 0 is the bottom row
pub fn grid_led(row: usize, column: usize) -> u8 {
    ((row + 1) * 10 + column + 1) as u8
}

/// Grid pad (row, column) for an LED number, if it is on the 8x8 grid
pub fn grid_cell(led: u8) -> Option<(usize, usize)> {
    let (row, column) = (led / 10, led % 10);
    if (1..=8).contains(&row) && (1..=8).contains(&column) {
        Some((row as usize - 1, column as usize - 1))
    } else {
        None
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn envelopes() {
        assert_eq!(
            select_layout(PROGRAMMER_LAYOUT),
            [0xF0, 0x00, 0x20, 0x29, 0x02, 0x10, 0x2C, 0x03, 0xF7]
        );
        assert_eq!(
            set_all(OFF),
            [0xF0, 0x00, 0x20, 0x29, 0x02, 0x10, 0x0E, 0x00, 0xF7]
        );
        assert_eq!(
            set_leds(ARROW_LEDS.map(|led| (led, 75))),
            [
                0xF0, 0x00, 0x20, 0x29, 0x02, 0x10, 0x0A, 0x5B, 0x4B, 0x5C, 0x4B, 0x5D, 0x4B, 0x5E,
                0x4B, 0xF7
            ]
        );
        assert_eq!(
            pulse(STATUS_LED, 76),
            [0xF0, 0x00, 0x20, 0x29, 0x02, 0x10, 0x28, 0x0A, 0x4C, 0xF7]
        );
    }

    #[test]
    fn grid_numbering() {
        assert_eq!(grid_led(0, 0), 11);
        assert_eq!(grid_led(7, 7), 88);
        assert_eq!(grid_led(2, 3), 34);
        for row in 0..8 {
            for column in 0..8 {
                assert_eq!(grid_cell(grid_led(row, column)), Some((row, column)));
            }
        }
        assert_eq!(grid_cell(STATUS_LED), None);
        assert_eq!(grid_cell(19), None);
        assert_eq!(grid_cell(91), None);
    }
}
