//! Console command reader.
//!
//! Parses one command per input line and forwards it to the main application
//! over an async channel. End of input is treated as `quit`.

use crate::{AppCommand, AppError, AppResult};

use std::panic::Location;

use error_location::ErrorLocation;
use tokio::{
    io::{AsyncBufRead, AsyncBufReadExt},
    sync::{mpsc, watch},
};
use tracing::{debug, info, instrument, warn};

/// Reads commands from a line-oriented input.
pub struct ConsoleHandler {
    command_tx: mpsc::Sender<AppCommand>,
}

impl ConsoleHandler {
    /// Create a handler forwarding to `command_tx`.
    pub fn new(command_tx: mpsc::Sender<AppCommand>) -> Self {
        Self { command_tx }
    }

    /// Run until end of input or a shutdown signal.
    ///
    /// Unparseable lines are logged and skipped.
    #[instrument(skip(self, input, shutdown_rx))]
    pub async fn run<R>(&self, input: R, mut shutdown_rx: watch::Receiver<bool>) -> AppResult<()>
    where
        R: AsyncBufRead + Unpin,
    {
        let mut lines = input.lines();

        loop {
            tokio::select! {
                _ = shutdown_rx.changed() => {
                    info!("Console handler shutting down");
                    break;
                }
                line = lines.next_line() => {
                    let Some(line) = line? else {
                        info!("Console input closed");
                        self.send(AppCommand::Quit).await?;
                        break;
                    };

                    if line.trim().is_empty() {
                        continue;
                    }

                    match line.parse::<AppCommand>() {
                        Ok(command) => {
                            debug!(?command, "Console command");
                            let quit = command == AppCommand::Quit;
                            self.send(command).await?;
                            if quit {
                                break;
                            }
                        }
                        Err(e) => warn!(error = %e, "Ignoring console input"),
                    }
                }
            }
        }

        Ok(())
    }

    async fn send(&self, command: AppCommand) -> AppResult<()> {
        self.command_tx
            .send(command)
            .await
            .map_err(|e| AppError::ChannelSendFailed {
                message: format!("Failed to send {:?}: {}", e.0, e),
                location: ErrorLocation::from(Location::caller()),
            })
    }
}
