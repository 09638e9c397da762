//! Mandatory-parameter schema.
//!
//! The set and order of mandatory parameters is fixed by the command id
//! and is part of the wire format; the tables here are data, consulted
//! when a PDU is constructed or decoded.

use super::command_id::CommandId;
use super::value::Value;
use std::fmt;

/// Names of the mandatory body parameters defined by SMPP v3.4.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ParamName {
    AddrNpi,
    AddrTon,
    AddressRange,
    DataCoding,
    DestAddrNpi,
    DestAddrTon,
    DestinationAddr,
    EsmClass,
    ErrorCode,
    FinalDate,
    InterfaceVersion,
    MessageId,
    MessageState,
    Password,
    PriorityFlag,
    ProtocolId,
    RegisteredDelivery,
    ReplaceIfPresentFlag,
    SmDefaultMsgId,
    SmLength,
    ScheduleDeliveryTime,
    ServiceType,
    ShortMessage,
    SourceAddr,
    SourceAddrNpi,
    SourceAddrTon,
    SystemId,
    SystemType,
    ValidityPeriod,
    EsmeAddr,
    EsmeAddrTon,
    EsmeAddrNpi,
}

impl ParamName {
    /// The ordered mandatory-parameter list for a command id. Empty-body
    /// PDUs and unknown ids map to the empty slice.
    pub fn mandatory_for(id: CommandId) -> &'static [ParamName] {
        use CommandId::*;
        use ParamName::*;
        match id {
            BindReceiver | BindTransceiver | BindTransmitter => &[
                SystemId,
                Password,
                SystemType,
                InterfaceVersion,
                AddrTon,
                AddrNpi,
                AddressRange,
            ],
            BindReceiverResp | BindTransceiverResp | BindTransmitterResp => &[SystemId],
            SubmitSm | DeliverSm => &[
                ServiceType,
                SourceAddrTon,
                SourceAddrNpi,
                SourceAddr,
                DestAddrTon,
                DestAddrNpi,
                DestinationAddr,
                EsmClass,
                ProtocolId,
                PriorityFlag,
                ScheduleDeliveryTime,
                ValidityPeriod,
                RegisteredDelivery,
                ReplaceIfPresentFlag,
                DataCoding,
                SmDefaultMsgId,
                SmLength,
                ShortMessage,
            ],
            SubmitSmResp | DeliverSmResp | DataSmResp => &[MessageId],
            Outbind => &[SystemId, Password],
            DataSm => &[
                ServiceType,
                SourceAddrTon,
                SourceAddrNpi,
                SourceAddr,
                DestAddrTon,
                DestAddrNpi,
                DestinationAddr,
                EsmClass,
                RegisteredDelivery,
                DataCoding,
            ],
            QuerySm => &[MessageId, SourceAddrTon, SourceAddrNpi, SourceAddr],
            QuerySmResp => &[MessageId, FinalDate, MessageState, ErrorCode],
            CancelSm => &[
                ServiceType,
                MessageId,
                SourceAddrTon,
                SourceAddrNpi,
                SourceAddr,
                DestAddrTon,
                DestAddrNpi,
                DestinationAddr,
            ],
            ReplaceSm => &[
                MessageId,
                SourceAddrTon,
                SourceAddrNpi,
                SourceAddr,
                ScheduleDeliveryTime,
                ValidityPeriod,
                RegisteredDelivery,
                SmDefaultMsgId,
                SmLength,
                ShortMessage,
            ],
            AlertNotification => &[
                SourceAddrTon,
                SourceAddrNpi,
                SourceAddr,
                EsmeAddrTon,
                EsmeAddrNpi,
                EsmeAddr,
            ],
            _ => &[],
        }
    }

    /// Fresh value of the shape this parameter carries on the wire.
    pub fn template(self) -> Value {
        use ParamName::*;
        match self {
            InterfaceVersion | AddrTon | AddrNpi | SourceAddrTon | SourceAddrNpi | DestAddrTon
            | DestAddrNpi | EsmeAddrTon | EsmeAddrNpi | EsmClass | ProtocolId | PriorityFlag
            | RegisteredDelivery | ReplaceIfPresentFlag | DataCoding | SmDefaultMsgId
            | SmLength | MessageState | ErrorCode => Value::U8(0),
            ScheduleDeliveryTime | ValidityPeriod | FinalDate => Value::fixed_cstring(17),
            SourceAddr | DestinationAddr => Value::cstring(21),
            ShortMessage => Value::octet(0),
            SystemId => Value::cstring(16),
            Password => Value::cstring(9),
            SystemType => Value::cstring(13),
            AddressRange => Value::cstring(41),
            MessageId | EsmeAddr => Value::cstring(65),
            ServiceType => Value::cstring(6),
        }
    }
}

impl fmt::Display for ParamName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        use ParamName::*;
        let name = match self {
            AddrNpi => "addr_npi",
            AddrTon => "addr_ton",
            AddressRange => "address_range",
            DataCoding => "data_coding",
            DestAddrNpi => "dest_addr_npi",
            DestAddrTon => "dest_addr_ton",
            DestinationAddr => "destination_addr",
            EsmClass => "esm_class",
            ErrorCode => "error_code",
            FinalDate => "final_date",
            InterfaceVersion => "interface_version",
            MessageId => "message_id",
            MessageState => "message_state",
            Password => "password",
            PriorityFlag => "priority_flag",
            ProtocolId => "protocol_id",
            RegisteredDelivery => "registered_delivery",
            ReplaceIfPresentFlag => "replace_if_present_flag",
            SmDefaultMsgId => "sm_default_msg_id",
            SmLength => "sm_length",
            ScheduleDeliveryTime => "schedule_delivery_time",
            ServiceType => "service_type",
            ShortMessage => "short_message",
            SourceAddr => "source_addr",
            SourceAddrNpi => "source_addr_npi",
            SourceAddrTon => "source_addr_ton",
            SystemId => "system_id",
            SystemType => "system_type",
            ValidityPeriod => "validity_period",
            EsmeAddr => "esme_addr",
            EsmeAddrTon => "esme_addr_ton",
            EsmeAddrNpi => "esme_addr_npi",
        };
        f.write_str(name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bind_layout_matches_spec_order() {
        use ParamName::*;
        let names = ParamName::mandatory_for(CommandId::BindTransmitter);
        assert_eq!(
            names,
            &[
                SystemId,
                Password,
                SystemType,
                InterfaceVersion,
                AddrTon,
                AddrNpi,
                AddressRange
            ]
        );
        assert_eq!(
            ParamName::mandatory_for(CommandId::BindReceiverResp),
            &[SystemId]
        );
    }

    #[test]
    fn message_layout_ends_with_length_and_payload() {
        let names = ParamName::mandatory_for(CommandId::SubmitSm);
        assert_eq!(names.len(), 18);
        assert_eq!(names[16], ParamName::SmLength);
        assert_eq!(names[17], ParamName::ShortMessage);
        assert_eq!(names, ParamName::mandatory_for(CommandId::DeliverSm));
    }

    #[test]
    fn empty_body_ids_have_no_params() {
        for id in [
            CommandId::EnquireLink,
            CommandId::EnquireLinkResp,
            CommandId::Unbind,
            CommandId::UnbindResp,
            CommandId::GenericNack,
            CommandId::CancelSmResp,
            CommandId::ReplaceSmResp,
            CommandId::Other(0xF3),
        ] {
            assert!(ParamName::mandatory_for(id).is_empty());
        }
    }

    #[test]
    fn templates_have_wire_shapes() {
        assert_eq!(ParamName::SystemId.template(), Value::cstring(16));
        assert_eq!(ParamName::Password.template(), Value::cstring(9));
        assert_eq!(ParamName::SystemType.template(), Value::cstring(13));
        assert_eq!(ParamName::AddressRange.template(), Value::cstring(41));
        assert_eq!(
            ParamName::ValidityPeriod.template(),
            Value::fixed_cstring(17)
        );
        assert_eq!(ParamName::ShortMessage.template(), Value::octet(0));
        assert_eq!(ParamName::SmLength.template(), Value::U8(0));
    }
}
