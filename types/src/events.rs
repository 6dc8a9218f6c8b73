//! Bus events observed on a running pipeline.

use serde::{Deserialize, Serialize};

/// A bus message reduced to the fields this crate acts on.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "data")]
pub enum BusEvent {
    /// The pipeline reached end of stream
    Eos,
    /// An element posted an error
    Error {
        message: String,
        debug: Option<String>,
        source: Option<String>,
    },
    /// An element posted a warning
    Warning {
        message: String,
        debug: Option<String>,
        source: Option<String>,
    },
    /// The pipeline selected a new clock
    NewClock { source: Option<String> },
    /// The selected clock became unusable
    ClockLost { source: Option<String> },
    /// Any other message type, by name
    Other { kind: String },
}

impl BusEvent {
    /// Whether this event ends the pipeline run.
    pub fn is_terminal(&self) -> bool {
        matches!(self, BusEvent::Eos | BusEvent::Error { .. })
    }

    /// Get a human-readable description of the event.
    pub fn description(&self) -> String {
        match self {
            BusEvent::Eos => "End-of-stream, quitting.".to_string(),
            BusEvent::Error { message, debug, .. } => {
                format!("Error: {}: {}", message, debug.as_deref().unwrap_or("none"))
            }
            BusEvent::Warning { message, debug, .. } => {
                format!(
                    "Warning: {}: {}",
                    message,
                    debug.as_deref().unwrap_or("none")
                )
            }
            BusEvent::NewClock { .. } => "New clock source selected.".to_string(),
            BusEvent::ClockLost { .. } => "Clock lost!".to_string(),
            BusEvent::Other { kind } => format!("Unhandled bus message: {}", kind),
        }
    }
}
