//! Builds one or more message PDUs from a text payload.
//!
//! Text that fits the GSM 03.38 default alphabet is sent with data_coding
//! 0, anything else as UCS-2. Payloads over the single-part capacity are
//! split into parts carried under a 7-octet concatenation UDH with a
//! 16-bit reference number.

use crate::codec::CodecError;
use crate::datatypes::{CommandId, ParamName};
use crate::encoding::{self, schemes};
use crate::pdu::Pdu;

/// Message-type bit of esm_class: UDH present in short_message.
const ESM_CLASS_UDHI: u8 = 0x40;

const GSM7_SINGLE_CAPACITY: usize = 160;
const GSM7_PART_CAPACITY: usize = 153;
const UCS2_SINGLE_CAPACITY: usize = 140;
const UCS2_PART_CAPACITY: usize = 132;

/// Split `text` into submit_sm PDUs. `msg_ref` supplies the 16-bit
/// concatenation reference and is consulted once, only when the text
/// needs more than one part.
pub fn create_submits(
    text: &str,
    msg_ref: impl FnMut() -> u16,
) -> Result<Vec<Pdu>, CodecError> {
    create_message_pdus(text, msg_ref, CommandId::SubmitSm)
}

/// Split `text` into deliver_sm PDUs.
pub fn create_deliveries(
    text: &str,
    msg_ref: impl FnMut() -> u16,
) -> Result<Vec<Pdu>, CodecError> {
    create_message_pdus(text, msg_ref, CommandId::DeliverSm)
}

fn create_message_pdus(
    text: &str,
    mut msg_ref: impl FnMut() -> u16,
    id: CommandId,
) -> Result<Vec<Pdu>, CodecError> {
    let (bytes, dcs, single_capacity, part_capacity) = match encoding::encode_gsm7(text) {
        Ok(bytes) => (
            bytes,
            schemes::SMSC_DEFAULT_ALPHABET,
            GSM7_SINGLE_CAPACITY,
            GSM7_PART_CAPACITY,
        ),
        Err(_) => (
            encoding::encode_ucs2(text),
            schemes::UCS2,
            UCS2_SINGLE_CAPACITY,
            UCS2_PART_CAPACITY,
        ),
    };

    if bytes.len() <= single_capacity {
        let mut pdu = Pdu::new(id);
        pdu.set_main(ParamName::DataCoding, dcs)?;
        pdu.set_main(ParamName::ShortMessage, bytes)?;
        return Ok(vec![pdu]);
    }

    let count = (bytes.len() - 1) / part_capacity + 1;
    let reference = msg_ref();
    let mut pdus = Vec::with_capacity(count);
    for (index, chunk) in bytes.chunks(part_capacity).enumerate() {
        let udh = [
            0x06, // user data header length
            0x08, // information element: concatenation, 16-bit reference
            0x04, // information element length
            (reference >> 8) as u8,
            reference as u8,
            count as u8,
            (index + 1) as u8,
        ];
        let mut short_message = Vec::with_capacity(udh.len() + chunk.len());
        short_message.extend_from_slice(&udh);
        short_message.extend_from_slice(chunk);

        let mut pdu = Pdu::new(id);
        pdu.set_main(ParamName::DataCoding, dcs)?;
        pdu.set_main(ParamName::EsmClass, ESM_CLASS_UDHI)?;
        pdu.set_main(ParamName::ShortMessage, short_message)?;
        pdus.push(pdu);
    }

    Ok(pdus)
}
