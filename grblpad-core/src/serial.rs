use std::time::Duration;

use tokio::{
    io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt, WriteHalf},
    sync::mpsc,
    task::JoinHandle,
};
use tokio_serial::{ClearBuffer, SerialPort, SerialPortBuilderExt, SerialStream};

use crate::{lines::LineReassembler, Error, LineReceiver, CHANNEL_DEPTH};

pub const DEFAULT_BAUD: u32 = 115_200;

/// Largest single read from the port
pub const READ_QUANTUM: usize = 80;

const WAKE_UP: &[u8] = b"\r\n\r\n";
const RESET_SETTLE: Duration = Duration::from_secs(2);

/// Open a serial port to GRBL and wake it up.
///
/// The firmware resets when the port opens, so this waits for it to settle
/// and throws away the startup chatter before returning.
#[tracing::instrument(level = "debug")]
pub async fn open(path: &str, baud: u32) -> Result<SerialStream, Error> {
    let mut port = tokio_serial::new(path, baud).open_native_async()?;
    port.write_all(WAKE_UP).await?;
    port.flush().await?;
    tokio::time::sleep(RESET_SETTLE).await;
    port.clear(ClearBuffer::Input)?;
    tracing::info!("Connected to {path} at {baud} baud");
    Ok(port)
}

/// Loop reading the port and forwarding reassembled lines until the port or the receiver goes away
async fn read_lines<R: AsyncRead + Unpin>(
    mut reader: R,
    mut reassembler: LineReassembler,
    lines: mpsc::Sender<String>,
) -> Result<(), Error> {
    let mut chunk = [0u8; READ_QUANTUM];
    tracing::debug!("Started reading from controller");
    loop {
        let n = reader.read(&mut chunk).await.map_err(Error::Read)?;
        let line = if n == 0 {
            // end of stream, hand over what is already complete before stopping
            match reassembler.next_line() {
                Some(line) => line,
                None => break Err(Error::Disconnected),
            }
        } else {
            match reassembler.push(&chunk[..n])? {
                Some(line) => line,
                None => continue,
            }
        };
        tracing::debug!("Received `{line}` from controller");
        if lines.send(line).await.is_err() {
            break Ok(());
        }
    }
}

/// Handle for asynchronous serial communication with a GRBL controller.
///
/// Reading happens in a background task which owns the read half of the stream
/// and sends every complete line on the channel returned by [`Grbl::new`].
/// The task is stopped when the handle is closed or dropped.
#[derive(Debug)]
pub struct Grbl<S> {
    writer: WriteHalf<S>,
    reader: JoinHandle<Result<(), Error>>,
}

impl<S> Drop for Grbl<S> {
    fn drop(&mut self) {
        self.reader.abort()
    }
}

impl<S> Grbl<S>
where
    S: AsyncRead + AsyncWrite + Send + 'static,
{
    pub fn new(stream: S) -> (Self, LineReceiver) {
        Self::with_capacity(stream, crate::lines::DEFAULT_CAPACITY)
    }

    /// Like [`Grbl::new`] with a custom line buffer size
    pub fn with_capacity(stream: S, capacity: usize) -> (Self, LineReceiver) {
        let (read_half, writer) = tokio::io::split(stream);
        let (sender, lines) = mpsc::channel(CHANNEL_DEPTH);
        let reassembler = LineReassembler::with_capacity(capacity);
        let reader = tokio::task::spawn(async move {
            let result = read_lines(read_half, reassembler, sender).await;
            if let Err(e) = &result {
                tracing::error!("Stopped reading from controller: {e}");
            }
            result
        });
        (Self { writer, reader }, lines)
    }
}

impl<S: AsyncWrite> Grbl<S> {
    /// Write raw bytes to the controller
    pub async fn write(&mut self, bytes: &[u8]) -> Result<(), Error> {
        self.writer.write_all(bytes).await.map_err(Error::Write)?;
        self.writer.flush().await.map_err(Error::Write)?;
        tracing::debug!(
            "Sent `{}` to controller",
            String::from_utf8_lossy(bytes).trim_end()
        );
        Ok(())
    }

    /// Wait for the background reader to finish and report why it did
    pub async fn stopped(&mut self) -> Error {
        match (&mut self.reader).await {
            Ok(Err(e)) => e,
            Ok(Ok(())) | Err(_) => Error::Disconnected,
        }
    }

    /// Close the connection, no more lines will be received
    pub async fn close(&mut self) {
        if let Err(e) = self.writer.shutdown().await {
            tracing::debug!("Error closing serial connection: {e}");
        }
        self.reader.abort();
        tracing::info!("Closed serial connection");
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[tokio::test]
    async fn forwards_lines_and_writes() {
        let (host, mut controller) = tokio::io::duplex(64);
        let (mut grbl, mut lines) = Grbl::new(host);

        controller.write_all(b"Grbl 1.1h ['$' for help]\r\n").await.unwrap();
        assert_eq!(lines.recv().await.unwrap(), "Grbl 1.1h ['$' for help]");

        grbl.write(b"?").await.unwrap();
        let mut query = [0u8; 1];
        controller.read_exact(&mut query).await.unwrap();
        assert_eq!(&query, b"?");
    }

    #[tokio::test]
    async fn delivers_buffered_lines_at_end_of_stream() {
        let (host, mut controller) = tokio::io::duplex(64);
        let (mut grbl, mut lines) = Grbl::new(host);

        controller.write_all(b"ok\r\nok\r\npartial").await.unwrap();
        drop(controller);

        assert_eq!(lines.recv().await.unwrap(), "ok");
        assert_eq!(lines.recv().await.unwrap(), "ok");
        assert!(lines.recv().await.is_none());
        assert!(matches!(grbl.stopped().await, Error::Disconnected));
    }

    #[tokio::test]
    async fn overflow_stops_reader() {
        let (host, mut controller) = tokio::io::duplex(64);
        let (mut grbl, mut lines) = Grbl::with_capacity(host, 16);

        controller.write_all(&[b'x'; 20]).await.unwrap();

        assert!(lines.recv().await.is_none());
        assert!(matches!(
            grbl.stopped().await,
            Error::RingBufferOverflow(16)
        ));
    }
}
