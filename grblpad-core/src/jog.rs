use std::fmt;

/// Controller units moved per grid cell
pub const UNITS_PER_CELL: i32 = 100;

/// Single character status query, answered with a `<...>` report
pub const STATUS_QUERY: &[u8] = b"?";

/// Request to move the machine, either by a number of cells or to a given cell.
///
/// Only X and Y are driven.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct PositionChangeRequest {
    pub x: i32,
    pub y: i32,
    pub relative: bool,
}

impl PositionChangeRequest {
    /// Move by `x`, `y` cells from the current position
    pub fn relative(x: i32, y: i32) -> Self {
        Self {
            x,
            y,
            relative: true,
        }
    }

    /// Move to cell (`x`, `y`)
    pub fn absolute(x: i32, y: i32) -> Self {
        Self {
            x,
            y,
            relative: false,
        }
    }

    /// Gcode line to send for this request, `\r` terminated
    pub fn to_command(&self) -> String {
        self.to_string()
    }
}

impl fmt::Display for PositionChangeRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mode = if self.relative { "G91" } else { "G90" };
        let x = f64::from(self.x * UNITS_PER_CELL);
        let y = f64::from(self.y * UNITS_PER_CELL);
        write!(f, "{mode} X{x:.3} Y{y:.3}\r")
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn relative_jog() {
        assert_eq!(
            PositionChangeRequest::relative(1, -1).to_command(),
            "G91 X100.000 Y-100.000\r"
        );
        assert_eq!(
            PositionChangeRequest::relative(0, 1).to_command(),
            "G91 X0.000 Y100.000\r"
        );
    }

    #[test]
    fn absolute_jog() {
        assert_eq!(
            PositionChangeRequest::absolute(3, 7).to_command(),
            "G90 X300.000 Y700.000\r"
        );
    }
}
