use crate::{Grid, MachineState};

/// Device showing the machine state and position.
///
/// Implementations own their wire protocol. Input from the device reaches the
/// coordinator separately, as [`crate::PositionChangeRequest`]s on a channel.
pub trait GridDisplay {
    type Error: std::error::Error;

    /// Show the firmware state, only called when it changes
    fn set_state(&mut self, state: &MachineState) -> Result<(), Self::Error>;

    /// Show a full grid, called for every status report
    fn set_grid(&mut self, grid: &Grid) -> Result<(), Self::Error>;

    /// Return to the idle layout
    fn reset(&mut self) -> Result<(), Self::Error>;
}
