use crate::AppError;

use std::{panic::Location, str::FromStr};

use error_location::ErrorLocation;

/// Commands sent from the console to the main application.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AppCommand {
    /// Re-enumerate and print the cameras.
    ListDevices,
    /// Select a camera, switching the live stream if one is running.
    SelectDevice {
        /// Device id from the last enumeration.
        device_id: String,
    },
    /// Start recording the output surface.
    StartRecording,
    /// Stop recording and persist the result.
    StopRecording,
    /// Replace the order code. Empty hides the overlay.
    SetOrder {
        /// New order code.
        order_code: String,
    },
    /// Replace the product name.
    SetProduct {
        /// New product name.
        product_name: String,
    },
    /// Print the pipeline state.
    Status,
    /// Persist any running recording and exit.
    Quit,
}

impl FromStr for AppCommand {
    type Err = AppError;

    #[track_caller]
    fn from_str(input: &str) -> Result<Self, Self::Err> {
        let line = input.trim();
        let (verb, rest) = match line.split_once(char::is_whitespace) {
            Some((verb, rest)) => (verb, rest.trim()),
            None => (line, ""),
        };

        let invalid = |reason: &str| AppError::InvalidCommand {
            input: line.to_string(),
            reason: reason.to_string(),
            location: ErrorLocation::from(Location::caller()),
        };

        match verb.to_ascii_lowercase().as_str() {
            "devices" => Ok(AppCommand::ListDevices),
            "select" if rest.is_empty() => Err(invalid("expected a device id")),
            "select" => Ok(AppCommand::SelectDevice {
                device_id: rest.to_string(),
            }),
            "start" => Ok(AppCommand::StartRecording),
            "stop" => Ok(AppCommand::StopRecording),
            "order" => Ok(AppCommand::SetOrder {
                order_code: rest.to_string(),
            }),
            "product" => Ok(AppCommand::SetProduct {
                product_name: rest.to_string(),
            }),
            "status" => Ok(AppCommand::Status),
            "quit" | "exit" => Ok(AppCommand::Quit),
            "" => Err(invalid("empty command")),
            _ => Err(invalid(
                "expected one of: devices, select <id>, start, stop, order <code>, \
                 product <name>, status, quit",
            )),
        }
    }
}
