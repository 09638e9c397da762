//! Optional-parameter (TLV) schema.
//!
//! Every optional parameter is encoded as `[tag:u16][length:u16][value]`.
//! The tag determines the value shape; tags outside the table decode as
//! plain octet strings of the declared length.

use super::value::Value;

/// Standard TLV tag constants per SMPP v3.4 specification Table 5-1.
pub mod tags {
    pub const DEST_ADDR_SUBUNIT: u16 = 0x0005;
    pub const DEST_NETWORK_TYPE: u16 = 0x0006;
    pub const DEST_BEARER_TYPE: u16 = 0x0007;
    pub const DEST_TELEMATICS_ID: u16 = 0x0008;
    pub const SOURCE_ADDR_SUBUNIT: u16 = 0x000D;
    pub const SOURCE_NETWORK_TYPE: u16 = 0x000E;
    pub const SOURCE_BEARER_TYPE: u16 = 0x000F;
    pub const SOURCE_TELEMATICS_ID: u16 = 0x0010;
    pub const QOS_TIME_TO_LIVE: u16 = 0x0017;
    pub const PAYLOAD_TYPE: u16 = 0x0019;
    pub const ADDITIONAL_STATUS_INFO_TEXT: u16 = 0x001D;
    pub const RECEIPTED_MESSAGE_ID: u16 = 0x001E;
    pub const MS_MSG_WAIT_FACILITIES: u16 = 0x0030;
    pub const PRIVACY_INDICATOR: u16 = 0x0201;
    pub const SOURCE_SUBADDRESS: u16 = 0x0202;
    pub const DEST_SUBADDRESS: u16 = 0x0203;
    pub const USER_MESSAGE_REFERENCE: u16 = 0x0204;
    pub const USER_RESPONSE_CODE: u16 = 0x0205;
    pub const SOURCE_PORT: u16 = 0x020A;
    pub const DESTINATION_PORT: u16 = 0x020B;
    pub const SAR_MSG_REF_NUM: u16 = 0x020C;
    pub const LANGUAGE_INDICATOR: u16 = 0x020D;
    pub const SAR_TOTAL_SEGMENTS: u16 = 0x020E;
    pub const SAR_SEGMENT_SEQNUM: u16 = 0x020F;
    pub const SC_INTERFACE_VERSION: u16 = 0x0210;
    pub const CALLBACK_NUM_PRES_IND: u16 = 0x0302;
    pub const CALLBACK_NUM_ATAG: u16 = 0x0303;
    pub const NUMBER_OF_MESSAGES: u16 = 0x0304;
    pub const CALLBACK_NUM: u16 = 0x0381;
    pub const DPF_RESULT: u16 = 0x0420;
    pub const SET_DPF: u16 = 0x0421;
    pub const MS_AVAILABILITY_STATUS: u16 = 0x0422;
    pub const NETWORK_ERROR_CODE: u16 = 0x0423;
    pub const MESSAGE_PAYLOAD: u16 = 0x0424;
    pub const DELIVERY_FAILURE_REASON: u16 = 0x0425;
    pub const MORE_MESSAGES_TO_SEND: u16 = 0x0426;
    pub const MESSAGE_STATE: u16 = 0x0427;
    pub const USSD_SERVICE_OP: u16 = 0x0501;
    pub const DISPLAY_TIME: u16 = 0x1201;
    pub const SMS_SIGNAL: u16 = 0x1203;
    pub const MS_VALIDITY: u16 = 0x1204;
    pub const ALERT_ON_MESSAGE_DELIVERY: u16 = 0x130C;
    pub const ITS_REPLY_TYPE: u16 = 0x1380;
    pub const ITS_SESSION_INFO: u16 = 0x1383;
}

/// Fresh value of the shape a TLV tag carries. `len` is the declared
/// length field, consulted only by the variable-length octet shapes.
pub fn template(tag: u16, len: u16) -> Value {
    use tags::*;
    match tag {
        DEST_ADDR_SUBUNIT | DEST_NETWORK_TYPE | SOURCE_NETWORK_TYPE | DEST_BEARER_TYPE
        | SOURCE_BEARER_TYPE | SOURCE_ADDR_SUBUNIT | SOURCE_TELEMATICS_ID | PAYLOAD_TYPE
        | MS_MSG_WAIT_FACILITIES | PRIVACY_INDICATOR | USER_RESPONSE_CODE | LANGUAGE_INDICATOR
        | SAR_TOTAL_SEGMENTS | SAR_SEGMENT_SEQNUM | SC_INTERFACE_VERSION | DISPLAY_TIME
        | MS_VALIDITY | DPF_RESULT | SET_DPF | MS_AVAILABILITY_STATUS | DELIVERY_FAILURE_REASON
        | MORE_MESSAGES_TO_SEND | MESSAGE_STATE | CALLBACK_NUM_PRES_IND | NUMBER_OF_MESSAGES
        | ITS_REPLY_TYPE | USSD_SERVICE_OP => Value::U8(0),
        DEST_TELEMATICS_ID | USER_MESSAGE_REFERENCE | SOURCE_PORT | DESTINATION_PORT
        | SAR_MSG_REF_NUM | SMS_SIGNAL | ITS_SESSION_INFO => Value::U16(0),
        QOS_TIME_TO_LIVE => Value::U32(0),
        ADDITIONAL_STATUS_INFO_TEXT => Value::cstring(256),
        RECEIPTED_MESSAGE_ID => Value::cstring(65),
        SOURCE_SUBADDRESS | DEST_SUBADDRESS => Value::octet(usize::from(len.min(23))),
        NETWORK_ERROR_CODE => Value::octet(3),
        MESSAGE_PAYLOAD => Value::octet(usize::from(len)),
        CALLBACK_NUM => Value::octet(usize::from(len.min(19))),
        _ => Value::octet(usize::from(len)),
    }
}

/// Human name of a tag, for logs and events.
pub fn tag_name(tag: u16) -> Option<&'static str> {
    use tags::*;
    Some(match tag {
        DEST_ADDR_SUBUNIT => "dest_addr_subunit",
        DEST_NETWORK_TYPE => "dest_network_type",
        DEST_BEARER_TYPE => "dest_bearer_type",
        DEST_TELEMATICS_ID => "dest_telematics_id",
        SOURCE_ADDR_SUBUNIT => "source_addr_subunit",
        SOURCE_NETWORK_TYPE => "source_network_type",
        SOURCE_BEARER_TYPE => "source_bearer_type",
        SOURCE_TELEMATICS_ID => "source_telematics_id",
        QOS_TIME_TO_LIVE => "qos_time_to_live",
        PAYLOAD_TYPE => "payload_type",
        ADDITIONAL_STATUS_INFO_TEXT => "additional_status_info_text",
        RECEIPTED_MESSAGE_ID => "receipted_message_id",
        MS_MSG_WAIT_FACILITIES => "ms_msg_wait_facilities",
        PRIVACY_INDICATOR => "privacy_indicator",
        SOURCE_SUBADDRESS => "source_subaddress",
        DEST_SUBADDRESS => "dest_subaddress",
        USER_MESSAGE_REFERENCE => "user_message_reference",
        USER_RESPONSE_CODE => "user_response_code",
        SOURCE_PORT => "source_port",
        DESTINATION_PORT => "destination_port",
        SAR_MSG_REF_NUM => "sar_msg_ref_num",
        LANGUAGE_INDICATOR => "language_indicator",
        SAR_TOTAL_SEGMENTS => "sar_total_segments",
        SAR_SEGMENT_SEQNUM => "sar_segment_seqnum",
        SC_INTERFACE_VERSION => "sc_interface_version",
        CALLBACK_NUM_PRES_IND => "callback_num_pres_ind",
        CALLBACK_NUM_ATAG => "callback_num_atag",
        NUMBER_OF_MESSAGES => "number_of_messages",
        CALLBACK_NUM => "callback_num",
        DPF_RESULT => "dpf_result",
        SET_DPF => "set_dpf",
        MS_AVAILABILITY_STATUS => "ms_availability_status",
        NETWORK_ERROR_CODE => "network_error_code",
        MESSAGE_PAYLOAD => "message_payload",
        DELIVERY_FAILURE_REASON => "delivery_failure_reason",
        MORE_MESSAGES_TO_SEND => "more_messages_to_send",
        MESSAGE_STATE => "message_state",
        USSD_SERVICE_OP => "ussd_service_op",
        DISPLAY_TIME => "display_time",
        SMS_SIGNAL => "sms_signal",
        MS_VALIDITY => "ms_validity",
        ALERT_ON_MESSAGE_DELIVERY => "alert_on_message_delivery",
        ITS_REPLY_TYPE => "its_reply_type",
        ITS_SESSION_INFO => "its_session_info",
        _ => return None,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn shapes_follow_the_table() {
        assert_eq!(template(tags::SC_INTERFACE_VERSION, 1), Value::U8(0));
        assert_eq!(template(tags::SAR_TOTAL_SEGMENTS, 1), Value::U8(0));
        assert_eq!(template(tags::SAR_MSG_REF_NUM, 2), Value::U16(0));
        assert_eq!(template(tags::QOS_TIME_TO_LIVE, 4), Value::U32(0));
        assert_eq!(template(tags::RECEIPTED_MESSAGE_ID, 37), Value::cstring(65));
        assert_eq!(template(tags::NETWORK_ERROR_CODE, 3), Value::octet(3));
    }

    #[test]
    fn variable_octet_shapes_clamp_declared_length() {
        assert_eq!(template(tags::MESSAGE_PAYLOAD, 300), Value::octet(300));
        assert_eq!(template(tags::SOURCE_SUBADDRESS, 40), Value::octet(23));
        assert_eq!(template(tags::CALLBACK_NUM, 4), Value::octet(4));
        assert_eq!(template(tags::CALLBACK_NUM, 64), Value::octet(19));
        // unknown tag: raw octets of the declared length
        assert_eq!(template(0x1400, 5), Value::octet(5));
    }

    #[test]
    fn tag_names() {
        assert_eq!(tag_name(tags::RECEIPTED_MESSAGE_ID), Some("receipted_message_id"));
        assert_eq!(tag_name(0x1400), None);
    }
}
