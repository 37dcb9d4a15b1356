use crate::{jog::UNITS_PER_CELL, Status};

/// Cells per side of the button grid
pub const GRID_SIZE: usize = 8;

/// What a grid cell should show; the display driver picks the actual color.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Cell {
    #[default]
    Background,
    /// Row the machine is currently on
    Row,
    /// Cell the machine is currently at
    Cursor,
}

/// Rows indexed by Y, columns by X; row 0 is the bottom row of the device.
pub type Grid = [[Cell; GRID_SIZE]; GRID_SIZE];

fn cell_index(value: f64) -> Option<usize> {
    let index = (value / f64::from(UNITS_PER_CELL)).round();
    if (0.0..GRID_SIZE as f64).contains(&index) {
        Some(index as usize)
    } else {
        None
    }
}

/// Highlight the row and cell matching the reported machine position.
///
/// Positions off the grid leave that axis unmarked.
pub fn render(status: &Status) -> Grid {
    let mut grid: Grid = [[Cell::Background; GRID_SIZE]; GRID_SIZE];
    let column = cell_index(status.position.x);
    if let Some(row) = cell_index(status.position.y) {
        grid[row] = [Cell::Row; GRID_SIZE];
        if let Some(column) = column {
            grid[row][column] = Cell::Cursor;
        }
    }
    grid
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::Position;

    fn at(x: f64, y: f64) -> Status {
        Status {
            state: "Idle".into(),
            position: Position { x, y, z: 0.0 },
        }
    }

    #[test]
    fn cursor_and_row() {
        let grid = render(&at(250.0, 150.0));
        for (row, cells) in grid.iter().enumerate() {
            for (column, cell) in cells.iter().enumerate() {
                let expected = match (row, column) {
                    (2, 3) => Cell::Cursor,
                    (2, _) => Cell::Row,
                    _ => Cell::Background,
                };
                assert_eq!(*cell, expected, "row {row} column {column}");
            }
        }
    }

    #[test]
    fn off_grid_column_keeps_row() {
        let grid = render(&at(900.0, 0.0));
        assert_eq!(grid[0], [Cell::Row; GRID_SIZE]);
        assert!(grid[1..].iter().flatten().all(|c| *c == Cell::Background));
    }

    #[test]
    fn off_grid_row_is_blank() {
        for status in [at(100.0, -60.0), at(100.0, 750.0), at(-100.0, 1000.0)] {
            let grid = render(&status);
            assert!(grid.iter().flatten().all(|c| *c == Cell::Background));
        }
    }

    #[test]
    fn rounds_half_away_from_zero() {
        let grid = render(&at(-40.0, 749.0));
        assert_eq!(grid[7][0], Cell::Cursor);
        let grid = render(&at(50.0, 0.0));
        assert_eq!(grid[0][1], Cell::Cursor);
    }
}
