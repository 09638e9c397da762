//! Segmentation metadata extraction.
//!
//! Long messages arrive either with a GSM 03.40 user data header inlined
//! in short_message (esm_class UDHI bit set) or with the sar_* optional
//! parameters. Anything else is a single-part message.

use crate::datatypes::{tlv::tags, ParamName};
use crate::pdu::Pdu;

/// esm_class bit: user data header present in short_message.
const ESM_CLASS_UDHI: u32 = 0x40;

/// Concatenation information-element identifiers.
const IEI_CONCAT_8BIT: u8 = 0x00;
const IEI_CONCAT_16BIT: u8 = 0x08;

/// Position of one part within a segmented message. Unsegmented messages
/// read as part 1 of 1 with reference 0.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SegmentInfo {
    pub part: u32,
    pub total_parts: u32,
    pub ref_id: u32,
}

impl Default for SegmentInfo {
    fn default() -> Self {
        SegmentInfo {
            part: 1,
            total_parts: 1,
            ref_id: 0,
        }
    }
}

impl SegmentInfo {
    /// Determine the segmentation of an inbound message PDU. Parsing is
    /// best-effort: a truncated or unparseable header falls back to the
    /// single-part default.
    pub fn from_pdu(pdu: &Pdu) -> SegmentInfo {
        let info = SegmentInfo::default();

        let Ok(esm_class) = pdu.get_main_as_u32(ParamName::EsmClass) else {
            return info;
        };

        if esm_class & ESM_CLASS_UDHI != 0 {
            match pdu.get_main_octets(ParamName::ShortMessage) {
                Ok(sm) if !sm.is_empty() => Self::from_udh(sm).unwrap_or(info),
                _ => info,
            }
        } else {
            Self::from_sar_tlvs(pdu).unwrap_or(info)
        }
    }

    /// Scan the user data header for a concatenation information element.
    fn from_udh(sm: &[u8]) -> Option<SegmentInfo> {
        // udhl counts the bytes after itself; clamp to what is actually
        // present and scan best-effort
        let udh_end = (usize::from(sm[0]) + 1).min(sm.len());

        let mut i = 1;
        while i + 1 < udh_end {
            let iei = sm[i];
            let iel = usize::from(sm[i + 1]);
            i += 2;

            let data = sm.get(i..i + iel)?;
            match (iei, iel) {
                (IEI_CONCAT_8BIT, 3) => {
                    return Some(SegmentInfo {
                        ref_id: u32::from(data[0]),
                        total_parts: u32::from(data[1]),
                        part: u32::from(data[2]),
                    });
                }
                (IEI_CONCAT_16BIT, 4) => {
                    return Some(SegmentInfo {
                        ref_id: (u32::from(data[0]) << 8) | u32::from(data[1]),
                        total_parts: u32::from(data[2]),
                        part: u32::from(data[3]),
                    });
                }
                _ => i += iel,
            }
        }

        None
    }

    /// The TLV-based equivalent: all three sar_* parameters must be
    /// present.
    fn from_sar_tlvs(pdu: &Pdu) -> Option<SegmentInfo> {
        let total_parts = pdu.get_opt_as_u32(tags::SAR_TOTAL_SEGMENTS).ok()?;
        let ref_id = pdu.get_opt_as_u32(tags::SAR_MSG_REF_NUM).ok()?;
        let part = pdu.get_opt_as_u32(tags::SAR_SEGMENT_SEQNUM).ok()?;
        Some(SegmentInfo {
            part,
            total_parts,
            ref_id,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::datatypes::CommandId;

    fn message_pdu(esm_class: u8, sm: &[u8]) -> Pdu {
        let mut pdu = Pdu::new(CommandId::DeliverSm);
        pdu.set_main(ParamName::EsmClass, esm_class).unwrap();
        pdu.set_main(ParamName::ShortMessage, sm).unwrap();
        pdu
    }

    #[test]
    fn plain_message_is_single_part() {
        let pdu = message_pdu(0x00, b"Hello World");
        assert_eq!(SegmentInfo::from_pdu(&pdu), SegmentInfo::default());
    }

    #[test]
    fn udh_with_16bit_concat_reference() {
        let mut sm = vec![0x06, 0x08, 0x04, 0x4C, 0xAC, 0x02, 0x01];
        sm.extend_from_slice(b"part one");
        let info = SegmentInfo::from_pdu(&message_pdu(0x40, &sm));
        assert_eq!(
            info,
            SegmentInfo {
                part: 1,
                total_parts: 2,
                ref_id: 0x4CAC
            }
        );
    }

    #[test]
    fn udh_with_8bit_concat_reference() {
        let mut sm = vec![0x05, 0x00, 0x03, 0x7F, 0x03, 0x02];
        sm.extend_from_slice(b"part two");
        let info = SegmentInfo::from_pdu(&message_pdu(0x40, &sm));
        assert_eq!(
            info,
            SegmentInfo {
                part: 2,
                total_parts: 3,
                ref_id: 0x7F
            }
        );
    }

    #[test]
    fn unrelated_information_elements_are_skipped() {
        // port-addressing IE first, then the concatenation IE
        let sm = vec![
            0x0B, 0x05, 0x04, 0x0B, 0x84, 0x23, 0xF0, 0x00, 0x03, 0x55, 0x02, 0x02, 0x41,
        ];
        let info = SegmentInfo::from_pdu(&message_pdu(0x40, &sm));
        assert_eq!(
            info,
            SegmentInfo {
                part: 2,
                total_parts: 2,
                ref_id: 0x55
            }
        );
    }

    #[test]
    fn oversized_udhl_is_clamped() {
        // udhl claims 0x20 bytes but only 6 follow
        let sm = vec![0x20, 0x08, 0x04, 0x12, 0x34, 0x02, 0x01];
        let info = SegmentInfo::from_pdu(&message_pdu(0x40, &sm));
        assert_eq!(
            info,
            SegmentInfo {
                part: 1,
                total_parts: 2,
                ref_id: 0x1234
            }
        );
    }

    #[test]
    fn truncated_ie_data_falls_back_to_default() {
        let sm = vec![0x06, 0x08, 0x04, 0x12];
        let info = SegmentInfo::from_pdu(&message_pdu(0x40, &sm));
        assert_eq!(info, SegmentInfo::default());
    }

    #[test]
    fn sar_tlvs_require_all_three() {
        let mut pdu = message_pdu(0x00, b"chunk");
        pdu.set_opt(tags::SAR_MSG_REF_NUM, 0x6343u16).unwrap();
        pdu.set_opt(tags::SAR_TOTAL_SEGMENTS, 2u8).unwrap();
        assert_eq!(SegmentInfo::from_pdu(&pdu), SegmentInfo::default());

        pdu.set_opt(tags::SAR_SEGMENT_SEQNUM, 1u8).unwrap();
        assert_eq!(
            SegmentInfo::from_pdu(&pdu),
            SegmentInfo {
                part: 1,
                total_parts: 2,
                ref_id: 0x6343
            }
        );
    }
}
