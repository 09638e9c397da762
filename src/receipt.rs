//! Delivery-receipt text handling.
//!
//! An SMSC reports final message state through a deliver_sm whose
//! esm_class marks it as a delivery receipt and whose short_message holds
//! a `k:v`-field text line:
//!
//! `id:<id> sub:001 dlvrd:001 submit date:2010241205 done date:2010241206 stat:DELIVRD err:000`

use crate::datatypes::{CommandId, ParamName};
use crate::pdu::Pdu;
use chrono::{DateTime, Utc};
use std::fmt;

/// esm_class message-type bits that mark an SMSC delivery receipt.
const ESM_CLASS_RECEIPT_MASK: u32 = 0x24;

/// Final message states carried in the `stat` field. The numbering
/// matches the message_state TLV.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[repr(u8)]
pub enum DeliveryState {
    EnRoute = 1,
    Delivered = 2,
    Expired = 3,
    Deleted = 4,
    Undeliverable = 5,
    Accepted = 6,
    Unknown = 7,
    Rejected = 8,
}

impl DeliveryState {
    fn parse(token: &str) -> Option<DeliveryState> {
        use DeliveryState::*;
        Some(match token {
            "ENROUTE" => EnRoute,
            "DELIVRD" => Delivered,
            "EXPIRED" => Expired,
            "DELETED" => Deleted,
            "UNDELIV" => Undeliverable,
            "ACCEPTD" => Accepted,
            "UNKNOWN" => Unknown,
            "REJECTD" => Rejected,
            _ => return None,
        })
    }
}

impl fmt::Display for DeliveryState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        use DeliveryState::*;
        f.write_str(match self {
            EnRoute => "ENROUTE",
            Delivered => "DELIVRD",
            Expired => "EXPIRED",
            Deleted => "DELETED",
            Undeliverable => "UNDELIV",
            Accepted => "ACCEPTD",
            Unknown => "UNKNOWN",
            Rejected => "REJECTD",
        })
    }
}

/// Fields extracted from (or composed into) a delivery-receipt text.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DeliveryReceipt {
    pub id: String,
    pub state: DeliveryState,
    pub err: u16,
    pub text: String,
}

impl Default for DeliveryReceipt {
    fn default() -> Self {
        DeliveryReceipt {
            id: String::new(),
            state: DeliveryState::Unknown,
            err: 0,
            text: String::new(),
        }
    }
}

impl DeliveryReceipt {
    /// Extract receipt fields from a deliver_sm. Anything that is not a
    /// receipt (wrong id, receipt bits clear, unreadable payload) yields
    /// the default value; unrecognized fields inside the text are
    /// skipped.
    pub fn from_pdu(pdu: &Pdu) -> DeliveryReceipt {
        let mut receipt = DeliveryReceipt::default();

        if pdu.id() != CommandId::DeliverSm {
            return receipt;
        }

        match pdu.get_main_as_u32(ParamName::EsmClass) {
            Ok(esm_class) if esm_class & ESM_CLASS_RECEIPT_MASK != 0 => {}
            _ => return receipt,
        }

        let Ok(raw) = pdu.get_main_octets(ParamName::ShortMessage) else {
            return receipt;
        };
        receipt.text = String::from_utf8_lossy(raw).into_owned();

        for field in receipt.text.split(' ') {
            let mut parts = field.split(':');
            let (Some(key), Some(value), None) = (parts.next(), parts.next(), parts.next())
            else {
                continue;
            };

            match key {
                "id" => receipt.id = value.to_owned(),
                "stat" => {
                    if let Some(state) = DeliveryState::parse(value) {
                        receipt.state = state;
                    }
                }
                "err" => {
                    if let Ok(err) = value.parse::<u64>() {
                        receipt.err = u16::try_from(err).unwrap_or(u16::MAX);
                    }
                }
                _ => {}
            }
        }

        receipt
    }

    /// Compose a receipt with the canonical text layout.
    pub fn new(
        msg_id: &str,
        submit_time: DateTime<Utc>,
        done_time: DateTime<Utc>,
        state: DeliveryState,
        err: u16,
    ) -> DeliveryReceipt {
        let success = u8::from(state == DeliveryState::Delivered);
        DeliveryReceipt {
            id: msg_id.to_owned(),
            state,
            err,
            text: format!(
                "id:{} sub:001 dlvrd:00{} submit date:{} done date:{} stat:{} err:{:03}",
                msg_id,
                success,
                submit_time.format("%y%m%d%H%M"),
                done_time.format("%y%m%d%H%M"),
                state,
                err % 1000
            ),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    const RECEIPT_TEXT: &str = "id:cb9c40f1-0aa1-4b3e-afb8-7dd24d03a716 sub:001 dlvrd:001 \
submit date:2010241205 done date:2010241206 stat:DELIVRD err:000";

    fn receipt_pdu(esm_class: u8, text: &str) -> Pdu {
        let mut pdu = Pdu::new(CommandId::DeliverSm);
        pdu.set_main(ParamName::EsmClass, esm_class).unwrap();
        pdu.set_main(ParamName::ShortMessage, text.as_bytes()).unwrap();
        pdu
    }

    #[test]
    fn parses_receipt_fields() {
        let receipt = DeliveryReceipt::from_pdu(&receipt_pdu(0x04, RECEIPT_TEXT));
        assert_eq!(receipt.id, "cb9c40f1-0aa1-4b3e-afb8-7dd24d03a716");
        assert_eq!(receipt.state, DeliveryState::Delivered);
        assert_eq!(receipt.err, 0);
        assert_eq!(receipt.text, RECEIPT_TEXT);
    }

    #[test]
    fn either_receipt_bit_qualifies() {
        assert_eq!(
            DeliveryReceipt::from_pdu(&receipt_pdu(0x20, RECEIPT_TEXT)).state,
            DeliveryState::Delivered
        );
        // plain deliver_sm: receipt bits clear
        let receipt = DeliveryReceipt::from_pdu(&receipt_pdu(0x00, RECEIPT_TEXT));
        assert_eq!(receipt, DeliveryReceipt::default());
    }

    #[test]
    fn non_deliver_pdu_yields_default() {
        let mut pdu = Pdu::new(CommandId::SubmitSm);
        pdu.set_main(ParamName::EsmClass, 0x04u8).unwrap();
        pdu.set_main(ParamName::ShortMessage, RECEIPT_TEXT.as_bytes())
            .unwrap();
        assert_eq!(DeliveryReceipt::from_pdu(&pdu), DeliveryReceipt::default());
    }

    #[test]
    fn malformed_fields_are_skipped() {
        let receipt = DeliveryReceipt::from_pdu(&receipt_pdu(
            0x04,
            "id:abc stat:NONSENSE err:notanumber orphan text",
        ));
        assert_eq!(receipt.id, "abc");
        assert_eq!(receipt.state, DeliveryState::Unknown);
        assert_eq!(receipt.err, 0);
    }

    #[test]
    fn oversized_err_saturates() {
        let receipt =
            DeliveryReceipt::from_pdu(&receipt_pdu(0x04, "id:x stat:EXPIRED err:70000"));
        assert_eq!(receipt.err, u16::MAX);
    }

    #[test]
    fn composed_receipt_parses_back() {
        let submit = Utc.with_ymd_and_hms(2020, 10, 24, 12, 5, 0).unwrap();
        let done = Utc.with_ymd_and_hms(2020, 10, 24, 12, 6, 0).unwrap();
        let composed = DeliveryReceipt::new(
            "cb9c40f1-0aa1-4b3e-afb8-7dd24d03a716",
            submit,
            done,
            DeliveryState::Delivered,
            0,
        );
        assert_eq!(composed.text, RECEIPT_TEXT);

        let parsed = DeliveryReceipt::from_pdu(&receipt_pdu(0x04, &composed.text));
        assert_eq!(parsed.id, composed.id);
        assert_eq!(parsed.state, composed.state);
        assert_eq!(parsed.err, composed.err);
    }

    #[test]
    fn failed_receipt_reports_dlvrd_zero() {
        let submit = Utc.with_ymd_and_hms(2021, 1, 2, 3, 4, 0).unwrap();
        let done = Utc.with_ymd_and_hms(2021, 1, 2, 3, 5, 0).unwrap();
        let composed = DeliveryReceipt::new("m1", submit, done, DeliveryState::Undeliverable, 34);
        assert!(composed.text.contains("dlvrd:000"));
        assert!(composed.text.contains("stat:UNDELIV"));
        assert!(composed.text.contains("err:034"));
    }
}
