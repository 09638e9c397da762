//! Shared codec definitions: the PDU header layout and the error type used
//! by every (de)serialization path in the crate.

use crate::datatypes::{CommandId, ParamName};
use thiserror::Error;

/// Size of one header field (command_length, command_id, command_status,
/// sequence_number are each 4 octets).
pub const HEADER_PART_SIZE: usize = 4;

/// Total size of the fixed PDU header.
pub const HEADER_SIZE: usize = 4 * HEADER_PART_SIZE;

/// Maximum allowed PDU size to prevent memory exhaustion on bad length
/// fields read off the wire.
pub const MAX_PDU_SIZE: u32 = 65536;

/// Codec errors with enough context to debug a malformed peer.
#[derive(Debug, Error)]
pub enum CodecError {
    #[error("short buffer: need more data")]
    ShortBuffer,

    #[error("parameter not found")]
    NotFound,

    #[error("bad type for parameter value")]
    BadType,

    #[error("length {actual} exceeded the maximum length {max}")]
    LengthExceeded { actual: usize, max: usize },

    #[error("length {actual} not equal 1 or {fixed} fixed length")]
    FixedLengthMismatch { actual: usize, fixed: usize },

    #[error("bad pdu length: in field {declared}, received {actual}")]
    BadLength { declared: u32, actual: usize },

    #[error("frame too small: {0} < 16")]
    FrameTooSmall(u32),

    #[error("frame too large: {0} > {MAX_PDU_SIZE}")]
    FrameTooLarge(u32),

    #[error("sm_length {declared} does not match short_message length {actual}")]
    InconsistentSmLength { declared: u32, actual: usize },

    #[error("bad optional param {tag:#06x}: declared len {declared}, real len {actual}")]
    BadTlv {
        tag: u16,
        declared: u16,
        actual: usize,
    },

    #[error("no mandatory parameter [{0}] for this command id")]
    UnknownParam(ParamName),

    #[error("can't create response for command id [{0}]")]
    NoResponsePairing(CommandId),

    #[error("command id [{0}] is not a response")]
    NotAResponse(CommandId),

    #[error("text not representable in the target alphabet")]
    Unencodable,
}
