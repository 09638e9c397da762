//! Schema-driven PDU model: a 16-byte header, an ordered mandatory block
//! whose layout is selected by the command id, and an unordered optional
//! TLV block.
//!
//! `deserialize . serialize` is the identity for well-formed PDUs, and the
//! `command_length` header field always equals the serialized byte count.

use crate::codec::{CodecError, HEADER_SIZE};
use crate::datatypes::{tlv, CommandId, CommandStatus, FieldValue, ParamName, Value};
use bytes::{Buf, BufMut, Bytes, BytesMut};
use std::collections::HashMap;
use std::fmt;
use std::io::Cursor;

#[derive(Clone, Debug)]
pub struct Pdu {
    id: CommandId,
    status: CommandStatus,
    seq: u32,
    mandatory: Vec<(ParamName, Value)>,
    optional: HashMap<u16, Value>,
    /// Body bytes of a PDU whose command id carries no schema. Unknown
    /// ids are accepted as raw only.
    raw_body: Option<Bytes>,
}

impl Pdu {
    /// Empty PDU for `id`, mandatory parameters instantiated to their
    /// schema shapes.
    pub fn new(id: CommandId) -> Pdu {
        Pdu {
            id,
            status: CommandStatus::Ok,
            seq: 0,
            mandatory: ParamName::mandatory_for(id)
                .iter()
                .map(|name| (*name, name.template()))
                .collect(),
            optional: HashMap::new(),
            raw_body: None,
        }
    }

    pub fn id(&self) -> CommandId {
        self.id
    }

    pub fn status(&self) -> CommandStatus {
        self.status
    }

    pub fn set_status(&mut self, status: CommandStatus) {
        self.status = status;
    }

    pub fn seq(&self) -> u32 {
        self.seq
    }

    pub fn set_seq(&mut self, seq: u32) {
        self.seq = seq;
    }

    pub fn is_request(&self) -> bool {
        self.id.is_request()
    }

    /// Response PDU paired with this request: paired command id, echoed
    /// sequence number, the supplied status. Fails for ids with no
    /// response pairing.
    pub fn create_response(&self, status: CommandStatus) -> Result<Pdu, CodecError> {
        let resp_id = self
            .id
            .response_id()
            .ok_or(CodecError::NoResponsePairing(self.id))?;
        let mut resp = Pdu::new(resp_id);
        resp.set_seq(self.seq);
        resp.set_status(status);
        Ok(resp)
    }

    /// Total encoded byte count, the value of the `command_length` header
    /// field.
    pub fn len(&self) -> u32 {
        let mandatory: usize = self.mandatory.iter().map(|(_, v)| v.encoded_len()).sum();
        let optional: usize = self.optional.values().map(|v| 4 + v.encoded_len()).sum();
        let raw = self.raw_body.as_ref().map_or(0, Bytes::len);
        (HEADER_SIZE + mandatory + optional + raw) as u32
    }

    pub fn is_empty(&self) -> bool {
        self.len() as usize == HEADER_SIZE
    }

    /// Encode into a fresh buffer.
    pub fn serialize(&self) -> Bytes {
        let len = self.len();
        let mut buf = BytesMut::with_capacity(len as usize);
        buf.put_u32(len);
        buf.put_u32(self.id.as_u32());
        buf.put_u32(self.status.as_u32());
        buf.put_u32(self.seq);
        for (_, value) in &self.mandatory {
            value.write_into(&mut buf);
        }
        for (tag, value) in &self.optional {
            buf.put_u16(*tag);
            buf.put_u16(value.encoded_len() as u16);
            value.write_into(&mut buf);
        }
        if let Some(raw) = &self.raw_body {
            buf.put_slice(raw);
        }
        buf.freeze()
    }

    /// Decode a complete frame. The declared length must equal the buffer
    /// size exactly.
    pub fn deserialize(raw: &[u8]) -> Result<Pdu, CodecError> {
        let mut buf = Cursor::new(raw);
        if buf.remaining() < HEADER_SIZE {
            return Err(CodecError::ShortBuffer);
        }

        let declared = buf.get_u32();
        if declared as usize != raw.len() {
            return Err(CodecError::BadLength {
                declared,
                actual: raw.len(),
            });
        }

        let id = CommandId::from(buf.get_u32());
        let status = CommandStatus::from(buf.get_u32());
        let seq = buf.get_u32();

        let mut pdu = Pdu::new(id);
        pdu.status = status;
        pdu.seq = seq;

        if !id.is_known() {
            pdu.raw_body = Some(Bytes::copy_from_slice(&raw[buf.position() as usize..]));
            return Ok(pdu);
        }

        let mut sm_length: Option<usize> = None;
        for (name, value) in pdu.mandatory.iter_mut() {
            if *name == ParamName::ShortMessage {
                if let Some(len) = sm_length {
                    *value = Value::octet(len);
                }
            }
            value.read_from(&mut buf)?;
            if *name == ParamName::SmLength {
                sm_length = Some(value.as_u32()? as usize);
            }
        }

        while buf.has_remaining() {
            if buf.remaining() < 4 {
                return Err(CodecError::ShortBuffer);
            }
            let tag = buf.get_u16();
            let declared = buf.get_u16();
            let mut value = tlv::template(tag, declared);
            value.read_from(&mut buf)?;
            if usize::from(declared) != value.encoded_len() {
                return Err(CodecError::BadTlv {
                    tag,
                    declared,
                    actual: value.encoded_len(),
                });
            }
            // duplicates on the wire resolve to last-wins
            pdu.optional.insert(tag, value);
        }

        Ok(pdu)
    }

    /// Set a mandatory parameter. Writes to `short_message` keep
    /// `sm_length` in sync; writes to `sm_length` that disagree with the
    /// current `short_message` length are rejected.
    pub fn set_main(
        &mut self,
        name: ParamName,
        input: impl Into<FieldValue>,
    ) -> Result<(), CodecError> {
        let input = input.into();

        if name == ParamName::SmLength {
            if let (FieldValue::Uint(declared), Ok(sm)) =
                (&input, self.get_main(ParamName::ShortMessage))
            {
                let actual = sm.encoded_len();
                if *declared as usize != actual {
                    return Err(CodecError::InconsistentSmLength {
                        declared: *declared,
                        actual,
                    });
                }
            }
        }

        let value = self
            .mandatory
            .iter_mut()
            .find(|(n, _)| *n == name)
            .map(|(_, v)| v)
            .ok_or(CodecError::UnknownParam(name))?;
        value.set(input)?;

        if name == ParamName::ShortMessage {
            let len = self
                .get_main(ParamName::ShortMessage)
                .map(Value::encoded_len)
                .unwrap_or(0);
            if let Some((_, sm_len)) = self
                .mandatory
                .iter_mut()
                .find(|(n, _)| *n == ParamName::SmLength)
            {
                sm_len.set(len)?;
            }
        }

        Ok(())
    }

    pub fn get_main(&self, name: ParamName) -> Result<&Value, CodecError> {
        self.mandatory
            .iter()
            .find(|(n, _)| *n == name)
            .map(|(_, v)| v)
            .ok_or(CodecError::UnknownParam(name))
    }

    pub fn get_main_as_u32(&self, name: ParamName) -> Result<u32, CodecError> {
        self.get_main(name)?.as_u32()
    }

    pub fn get_main_text(&self, name: ParamName) -> Result<String, CodecError> {
        self.get_main(name)?.text()
    }

    pub fn get_main_octets(&self, name: ParamName) -> Result<&[u8], CodecError> {
        self.get_main(name)?.octets()
    }

    /// Set (or replace) an optional parameter.
    pub fn set_opt(&mut self, tag: u16, input: impl Into<FieldValue>) -> Result<(), CodecError> {
        let mut value = tlv::template(tag, 0);
        value.set(input)?;
        self.optional.insert(tag, value);
        Ok(())
    }

    pub fn remove_opt(&mut self, tag: u16) {
        self.optional.remove(&tag);
    }

    pub fn get_opt(&self, tag: u16) -> Result<&Value, CodecError> {
        self.optional.get(&tag).ok_or(CodecError::NotFound)
    }

    pub fn get_opt_as_u32(&self, tag: u16) -> Result<u32, CodecError> {
        self.get_opt(tag)?.as_u32()
    }

    pub fn get_opt_text(&self, tag: u16) -> Result<String, CodecError> {
        self.get_opt(tag)?.text()
    }

    pub fn get_opt_octets(&self, tag: u16) -> Result<&[u8], CodecError> {
        self.get_opt(tag)?.octets()
    }

    /// Mandatory parameter names in wire order.
    pub fn mandatory_names(&self) -> impl Iterator<Item = ParamName> + '_ {
        self.mandatory.iter().map(|(n, _)| *n)
    }

    /// Optional parameter tags, in no particular order.
    pub fn optional_tags(&self) -> impl Iterator<Item = u16> + '_ {
        self.optional.keys().copied()
    }
}

impl fmt::Display for Pdu {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "id:{} status:{} seq:{}", self.id, self.status, self.seq)
    }
}
