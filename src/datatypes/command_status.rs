//! SMPP v3.4 command status codes.
//!
//! The command_status field of a response reports the outcome of the
//! paired request; requests carry 0. Codes outside the closed set are
//! preserved verbatim through the `Other` variant.

use num_enum::{FromPrimitive, IntoPrimitive};
use std::fmt;

#[derive(FromPrimitive, IntoPrimitive)]
#[repr(u32)]
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum CommandStatus {
    Ok = 0x0000_0000,
    InvalidMsgLength = 0x0000_0001,
    InvalidCommandLength = 0x0000_0002,
    InvalidCommandId = 0x0000_0003,
    IncorrectBindStatus = 0x0000_0004,
    AlreadyBound = 0x0000_0005,
    InvalidPriorityFlag = 0x0000_0006,
    InvalidRegisteredDeliveryFlag = 0x0000_0007,
    SystemError = 0x0000_0008,
    InvalidSourceAddress = 0x0000_000A,
    InvalidDestinationAddress = 0x0000_000B,
    InvalidMessageId = 0x0000_000C,
    BindFailed = 0x0000_000D,
    InvalidPassword = 0x0000_000E,
    InvalidSystemId = 0x0000_000F,
    CancelSmFailed = 0x0000_0011,
    ReplaceSmFailed = 0x0000_0013,
    MessageQueueFull = 0x0000_0014,
    InvalidServiceType = 0x0000_0015,
    InvalidNumberOfDestinations = 0x0000_0033,
    InvalidDistributionListName = 0x0000_0034,
    InvalidDestinationFlag = 0x0000_0040,
    InvalidSubmitWithReplace = 0x0000_0042,
    InvalidEsmClass = 0x0000_0043,
    CannotSubmitToDistributionList = 0x0000_0044,
    SubmitFailed = 0x0000_0045,
    InvalidSourceTon = 0x0000_0048,
    InvalidSourceNpi = 0x0000_0049,
    InvalidDestinationTon = 0x0000_0050,
    InvalidDestinationNpi = 0x0000_0051,
    InvalidSystemType = 0x0000_0053,
    InvalidReplaceIfPresentFlag = 0x0000_0054,
    InvalidNumberOfMessages = 0x0000_0055,
    Throttled = 0x0000_0058,
    InvalidScheduledDeliveryTime = 0x0000_0061,
    InvalidValidityPeriod = 0x0000_0062,
    InvalidDefaultMsgId = 0x0000_0063,
    ReceiverTemporaryAppError = 0x0000_0064,
    ReceiverPermanentAppError = 0x0000_0065,
    ReceiverRejectAppError = 0x0000_0066,
    QuerySmFailed = 0x0000_0067,
    InvalidOptionalParamStream = 0x0000_00C0,
    OptionalParamNotAllowed = 0x0000_00C1,
    InvalidParamLength = 0x0000_00C2,
    MissingOptionalParam = 0x0000_00C3,
    InvalidOptionalParamValue = 0x0000_00C4,
    DeliveryFailure = 0x0000_00FE,
    UnknownError = 0x0000_00FF,

    #[num_enum(catch_all)]
    Other(u32),
}

impl CommandStatus {
    /// Raw 32-bit wire value.
    pub fn as_u32(self) -> u32 {
        u32::from(self)
    }
}

impl fmt::Display for CommandStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        use CommandStatus::*;
        let text = match self {
            Ok => "ok",
            InvalidMsgLength => "invalid message length",
            InvalidCommandLength => "invalid command length",
            InvalidCommandId => "invalid command id",
            IncorrectBindStatus => "incorrect bind status for given command",
            AlreadyBound => "already in bound state",
            InvalidPriorityFlag => "invalid priority flag",
            InvalidRegisteredDeliveryFlag => "invalid registered delivery flag",
            SystemError => "system error",
            InvalidSourceAddress => "invalid source address",
            InvalidDestinationAddress => "invalid destination address",
            InvalidMessageId => "invalid message id",
            BindFailed => "bind failed",
            InvalidPassword => "invalid password",
            InvalidSystemId => "invalid system id",
            CancelSmFailed => "cancel_sm failed",
            ReplaceSmFailed => "replace_sm failed",
            MessageQueueFull => "message queue full",
            InvalidServiceType => "invalid service type",
            InvalidNumberOfDestinations => "invalid number of destinations",
            InvalidDistributionListName => "invalid distribution list name",
            InvalidDestinationFlag => "invalid destination flag",
            InvalidSubmitWithReplace => "invalid 'submit with replace' request",
            InvalidEsmClass => "invalid esm class field data",
            CannotSubmitToDistributionList => "cannot submit to distribution list",
            SubmitFailed => "submit_sm or submit_multi failed",
            InvalidSourceTon => "invalid source address ton",
            InvalidSourceNpi => "invalid source address npi",
            InvalidDestinationTon => "invalid destination address ton",
            InvalidDestinationNpi => "invalid destination address npi",
            InvalidSystemType => "invalid system type field",
            InvalidReplaceIfPresentFlag => "invalid replace_if_present flag",
            InvalidNumberOfMessages => "invalid number of messages",
            Throttled => "throttling error",
            InvalidScheduledDeliveryTime => "invalid scheduled delivery time",
            InvalidValidityPeriod => "invalid message validity period",
            InvalidDefaultMsgId => "predefined message invalid or not found",
            ReceiverTemporaryAppError => "esme receiver temporary app error code",
            ReceiverPermanentAppError => "esme receiver permanent app error code",
            ReceiverRejectAppError => "esme receiver reject message error code",
            QuerySmFailed => "query_sm request failed",
            InvalidOptionalParamStream => "error in the optional part of the pdu body",
            OptionalParamNotAllowed => "optional parameter not allowed",
            InvalidParamLength => "invalid parameter length",
            MissingOptionalParam => "expected optional parameter missing",
            InvalidOptionalParamValue => "invalid optional parameter value",
            DeliveryFailure => "delivery failure",
            UnknownError => "unknown error",
            Other(raw) => return write!(f, "unknown ({raw:#010x})"),
        };
        f.write_str(text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn known_codes() {
        assert_eq!(CommandStatus::from(0x58u32), CommandStatus::Throttled);
        assert_eq!(CommandStatus::Throttled.as_u32(), 0x58);
        assert_eq!(CommandStatus::from(0u32), CommandStatus::Ok);
    }

    #[test]
    fn unknown_codes_preserved_verbatim() {
        let status = CommandStatus::from(0x0000_0416u32);
        assert_eq!(status, CommandStatus::Other(0x416));
        assert_eq!(status.as_u32(), 0x416);
    }
}
