//! SMPP v3.4 command identifiers (specification Table 4-1).
//!
//! The high bit of the 32-bit command_id distinguishes requests (0) from
//! responses (1). Ids outside the closed set are carried through the
//! `Other` variant so a peer speaking a vendor extension does not kill the
//! session; such PDUs decode with a raw, schema-less body.

use num_enum::{FromPrimitive, IntoPrimitive};
use std::fmt;

#[derive(FromPrimitive, IntoPrimitive)]
#[repr(u32)]
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum CommandId {
    GenericNack = 0x8000_0000,
    BindReceiver = 0x0000_0001,
    BindReceiverResp = 0x8000_0001,
    BindTransmitter = 0x0000_0002,
    BindTransmitterResp = 0x8000_0002,
    QuerySm = 0x0000_0003,
    QuerySmResp = 0x8000_0003,
    SubmitSm = 0x0000_0004,
    SubmitSmResp = 0x8000_0004,
    DeliverSm = 0x0000_0005,
    DeliverSmResp = 0x8000_0005,
    Unbind = 0x0000_0006,
    UnbindResp = 0x8000_0006,
    ReplaceSm = 0x0000_0007,
    ReplaceSmResp = 0x8000_0007,
    CancelSm = 0x0000_0008,
    CancelSmResp = 0x8000_0008,
    BindTransceiver = 0x0000_0009,
    BindTransceiverResp = 0x8000_0009,
    Outbind = 0x0000_000B,
    EnquireLink = 0x0000_0015,
    EnquireLinkResp = 0x8000_0015,
    SubmitMulti = 0x0000_0021,
    SubmitMultiResp = 0x8000_0021,
    AlertNotification = 0x0000_0102,
    DataSm = 0x0000_0103,
    DataSmResp = 0x8000_0103,

    #[num_enum(catch_all)]
    Other(u32),
}

impl CommandId {
    /// Raw 32-bit wire value.
    pub fn as_u32(self) -> u32 {
        u32::from(self)
    }

    /// Response PDUs carry the high bit of the command id.
    pub fn is_response(self) -> bool {
        self.as_u32() & 0x8000_0000 != 0
    }

    pub fn is_request(self) -> bool {
        !self.is_response()
    }

    /// Whether this id is part of the closed, schema-bearing set.
    pub fn is_known(self) -> bool {
        !matches!(self, CommandId::Other(_))
    }

    /// The paired response id for a request, if the pairing exists.
    pub fn response_id(self) -> Option<CommandId> {
        use CommandId::*;
        match self {
            BindReceiver => Some(BindReceiverResp),
            BindTransmitter => Some(BindTransmitterResp),
            QuerySm => Some(QuerySmResp),
            SubmitSm => Some(SubmitSmResp),
            DeliverSm => Some(DeliverSmResp),
            Unbind => Some(UnbindResp),
            ReplaceSm => Some(ReplaceSmResp),
            CancelSm => Some(CancelSmResp),
            BindTransceiver => Some(BindTransceiverResp),
            EnquireLink => Some(EnquireLinkResp),
            SubmitMulti => Some(SubmitMultiResp),
            DataSm => Some(DataSmResp),
            _ => None,
        }
    }
}

impl fmt::Display for CommandId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        use CommandId::*;
        let name = match self {
            GenericNack => "GenericNack",
            BindReceiver => "BindReceiver",
            BindReceiverResp => "BindReceiverResp",
            BindTransmitter => "BindTransmitter",
            BindTransmitterResp => "BindTransmitterResp",
            QuerySm => "QuerySm",
            QuerySmResp => "QuerySmResp",
            SubmitSm => "SubmitSm",
            SubmitSmResp => "SubmitSmResp",
            DeliverSm => "DeliverSm",
            DeliverSmResp => "DeliverSmResp",
            Unbind => "Unbind",
            UnbindResp => "UnbindResp",
            ReplaceSm => "ReplaceSm",
            ReplaceSmResp => "ReplaceSmResp",
            CancelSm => "CancelSm",
            CancelSmResp => "CancelSmResp",
            BindTransceiver => "BindTransceiver",
            BindTransceiverResp => "BindTransceiverResp",
            Outbind => "Outbind",
            EnquireLink => "EnquireLink",
            EnquireLinkResp => "EnquireLinkResp",
            SubmitMulti => "SubmitMulti",
            SubmitMultiResp => "SubmitMultiResp",
            AlertNotification => "AlertNotification",
            DataSm => "DataSm",
            DataSmResp => "DataSmResp",
            Other(raw) => return write!(f, "Unknown({raw:#010x})"),
        };
        f.write_str(name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn request_response_bit() {
        assert!(!CommandId::EnquireLink.is_response());
        assert!(CommandId::EnquireLinkResp.is_response());
        assert!(!CommandId::SubmitSm.is_response());
        assert!(CommandId::SubmitSmResp.is_response());
        assert!(CommandId::GenericNack.is_response());
    }

    #[test]
    fn unknown_ids_round_trip() {
        let id = CommandId::from(0x0000_00F3u32);
        assert_eq!(id, CommandId::Other(0x0000_00F3));
        assert_eq!(id.as_u32(), 0x0000_00F3);
        assert!(!id.is_known());
        assert!(id.is_request());
        assert!(CommandId::from(0x8000_00F3u32).is_response());
    }

    #[test]
    fn known_ids_keep_wire_value() {
        assert_eq!(CommandId::from(0x0000_0004u32), CommandId::SubmitSm);
        assert_eq!(CommandId::SubmitSm.as_u32(), 0x0000_0004);
        assert_eq!(CommandId::GenericNack.as_u32(), 0x8000_0000);
        assert_eq!(CommandId::DataSmResp.as_u32(), 0x8000_0103);
    }

    #[test]
    fn response_pairing() {
        assert_eq!(
            CommandId::SubmitSm.response_id(),
            Some(CommandId::SubmitSmResp)
        );
        assert_eq!(
            CommandId::EnquireLink.response_id(),
            Some(CommandId::EnquireLinkResp)
        );
        assert_eq!(CommandId::Outbind.response_id(), None);
        assert_eq!(CommandId::AlertNotification.response_id(), None);
        assert_eq!(CommandId::SubmitSmResp.response_id(), None);
    }
}
