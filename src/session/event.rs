//! Application-visible session events.

use super::error::SessionError;
use crate::datatypes::{CommandId, CommandStatus};
use std::fmt;

/// Log-event severity, ordered from chattiest to most severe.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord)]
#[repr(u8)]
pub enum Severity {
    Debug = 0,
    Info = 1,
    Warning = 2,
    Error = 3,
}

impl From<Severity> for u8 {
    fn from(severity: Severity) -> u8 {
        severity as u8
    }
}

impl From<u8> for Severity {
    fn from(raw: u8) -> Severity {
        match raw {
            0 => Severity::Debug,
            1 => Severity::Info,
            2 => Severity::Warning,
            _ => Severity::Error,
        }
    }
}

/// Session event stream payload. Events are advisory; the session never
/// blocks on the event queue and drops events when it is full.
#[derive(Debug)]
pub enum Event {
    Log {
        severity: Severity,
        message: String,
    },
    Error(SessionError),
    InWindowChanged(i32),
    OutWindowChanged(i32),
    PduReceived {
        id: CommandId,
        status: CommandStatus,
    },
    PduSent {
        id: CommandId,
        status: CommandStatus,
    },
}

impl fmt::Display for Event {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Event::Log { message, .. } => f.write_str(message),
            Event::Error(error) => write!(f, "{error}"),
            Event::InWindowChanged(value) => write!(f, "in window changed to [{value}]"),
            Event::OutWindowChanged(value) => write!(f, "out window changed to [{value}]"),
            Event::PduReceived { id, status } => write!(f, "received pdu:[{id}][{status}]"),
            Event::PduSent { id, status } => write!(f, "sent pdu:[{id}][{status}]"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn severity_orders_and_round_trips() {
        assert!(Severity::Debug < Severity::Info);
        assert!(Severity::Info < Severity::Warning);
        assert!(Severity::Warning < Severity::Error);
        for severity in [
            Severity::Debug,
            Severity::Info,
            Severity::Warning,
            Severity::Error,
        ] {
            assert_eq!(Severity::from(u8::from(severity)), severity);
        }
    }

    #[test]
    fn display_formats() {
        let event = Event::PduReceived {
            id: CommandId::SubmitSmResp,
            status: CommandStatus::Throttled,
        };
        assert_eq!(
            event.to_string(),
            "received pdu:[SubmitSmResp][throttling error]"
        );
        assert_eq!(Event::OutWindowChanged(3).to_string(), "out window changed to [3]");
    }
}
