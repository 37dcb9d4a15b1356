//! # grblpad-core
//! Keeps a GRBL motion controller and a button grid in sync:
//! serial line reassembly, status parsing, receive buffer flow control and the event loop tying them together.

use tokio::sync::mpsc;

mod coordinator;
mod display;
mod grid;
mod jog;
mod lines;
mod response;
mod serial;
mod stack;
mod status;

pub use coordinator::{Coordinator, POLL_PERIOD};
pub use display::GridDisplay;
pub use grid::{render, Cell, Grid, GRID_SIZE};
pub use jog::{PositionChangeRequest, STATUS_QUERY, UNITS_PER_CELL};
pub use lines::{LineReassembler, RingBuffer, DEFAULT_CAPACITY, DELIMITER};
pub use response::{response, Response};
pub use serial::{open, Grbl, DEFAULT_BAUD, READ_QUANTUM};
pub use stack::{CommandStack, RX_BUFFER_SIZE};
pub use status::{parse_status, MachineState, Position, Status};

/// Depth of the line and request channels feeding the coordinator
pub const CHANNEL_DEPTH: usize = 2;

pub type LineReceiver = mpsc::Receiver<String>;
pub type RequestSender = mpsc::Sender<PositionChangeRequest>;
pub type RequestReceiver = mpsc::Receiver<PositionChangeRequest>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Malformed status report `{0}`")]
    MalformedStatus(String),

    #[error("Acknowledgment received with no command in flight")]
    EmptyQueue,

    #[error("Command of {needed} bytes doesn't fit in the {remaining} bytes left in the receive buffer")]
    BufferFull { needed: usize, remaining: usize },

    #[error("Received {0} bytes without a line ending")]
    RingBufferOverflow(usize),

    #[error("Couldn't read from controller\nError message: {0}")]
    Read(#[source] std::io::Error),

    #[error("Couldn't write to controller\nError message: {0}")]
    Write(#[source] std::io::Error),

    #[error("Serial port error: {0}")]
    Serial(#[from] tokio_serial::Error),

    #[error("IO error: {0}")]
    IO(#[from] std::io::Error),

    #[error("Underlying controller connection was closed")]
    Disconnected,
}
