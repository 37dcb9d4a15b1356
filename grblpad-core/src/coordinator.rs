use std::{future::Future, time::Duration};

use tokio::{
    io::{AsyncRead, AsyncWrite},
    time::MissedTickBehavior,
};

use crate::{
    grid, parse_status, response, CommandStack, Error, Grbl, GridDisplay, LineReceiver,
    MachineState, PositionChangeRequest, RequestReceiver, Response, Status, STATUS_QUERY,
};

/// Interval between status queries
pub const POLL_PERIOD: Duration = Duration::from_secs(1);

/// Event loop between the controller and the display.
///
/// Sole owner of the [`CommandStack`], so nothing else can send buffered commands.
pub struct Coordinator<S, D> {
    grbl: Grbl<S>,
    display: D,
    stack: CommandStack,
    current_state: Option<MachineState>,
}

impl<S, D> Coordinator<S, D>
where
    S: AsyncRead + AsyncWrite,
    D: GridDisplay,
{
    pub fn new(grbl: Grbl<S>, display: D) -> Self {
        Self {
            grbl,
            display,
            stack: CommandStack::default(),
            current_state: None,
        }
    }

    /// Replace the ledger, e.g. for firmware built with a different receive buffer size
    pub fn with_stack(mut self, stack: CommandStack) -> Self {
        self.stack = stack;
        self
    }

    /// Run until `shutdown` completes or the controller connection is lost.
    ///
    /// Losing the connection still resets the display, then returns the reason the reader stopped.
    pub async fn run(
        mut self,
        mut lines: LineReceiver,
        mut requests: RequestReceiver,
        shutdown: impl Future<Output = ()>,
    ) -> Result<(), Error> {
        let mut poll = tokio::time::interval(POLL_PERIOD);
        poll.set_missed_tick_behavior(MissedTickBehavior::Delay);
        tokio::pin!(shutdown);
        tracing::info!("Started coordinating controller and display");

        loop {
            tokio::select! {
                () = &mut shutdown => {
                    tracing::info!("Received shutdown signal");
                    self.shutdown(&mut requests).await;
                    break Ok(());
                },
                line = lines.recv() => match line {
                    Some(line) => self.handle_line(&line),
                    None => {
                        let reason = self.grbl.stopped().await;
                        tracing::error!("Lost controller connection: {reason}");
                        self.shutdown(&mut requests).await;
                        break Err(reason);
                    }
                },
                Some(request) = requests.recv() => self.handle_request(request).await,
                _ = poll.tick() => self.poll().await,
            }
        }
    }

    fn handle_line(&mut self, line: &str) {
        match response(line) {
            Response::Status(report) => match parse_status(report) {
                Ok(status) => self.show(&status),
                Err(e) => tracing::warn!("Dropped status: {e}"),
            },
            Response::Ok => self.acknowledge(),
            Response::Error(code) => {
                tracing::warn!("Controller rejected a command with error {code}");
                self.acknowledge();
            }
            Response::Alarm(code) => tracing::warn!("Controller raised alarm {code}"),
            Response::Welcome(version) => {
                tracing::info!("Controller reset, running Grbl {version}");
                self.stack.clear();
                self.current_state = None;
            }
            Response::Message(message) => tracing::info!("Controller says [{message}]"),
            Response::Other(other) => tracing::debug!("Ignored `{other}`"),
        }
    }

    fn acknowledge(&mut self) {
        if let Err(e) = self.stack.pop() {
            tracing::warn!("{e}");
        }
    }

    fn show(&mut self, status: &Status) {
        if self.current_state.as_ref() != Some(&status.state) {
            if let Err(e) = self.display.set_state(&status.state) {
                tracing::warn!("Failed to show state {}: {e}", status.state);
            }
            self.current_state = Some(status.state.clone());
        }
        if let Err(e) = self.display.set_grid(&grid::render(status)) {
            tracing::warn!("Failed to show position: {e}");
        }
    }

    async fn handle_request(&mut self, request: PositionChangeRequest) {
        let command = request.to_command();
        if !self.stack.can_push(&command) {
            // a newer request from the operator supersedes this one, no retry
            tracing::debug!(
                remaining = self.stack.remaining(),
                "Dropped `{}`, controller buffer is full",
                command.trim_end()
            );
            return;
        }
        match self.grbl.write(command.as_bytes()).await {
            Ok(()) => {
                if let Err(e) = self.stack.push(command) {
                    tracing::error!("{e}");
                }
            }
            Err(e) => tracing::warn!("Failed to send `{}`: {e}", command.trim_end()),
        }
    }

    async fn poll(&mut self) {
        if let Err(e) = self.grbl.write(STATUS_QUERY).await {
            tracing::warn!("Failed to query status: {e}");
        }
    }

    async fn shutdown(&mut self, requests: &mut RequestReceiver) {
        self.grbl.close().await;
        if let Err(e) = self.display.reset() {
            tracing::warn!("Failed to reset display: {e}");
        }
        requests.close();
    }
}
