//! Short-message text transforms: the GSM 03.38 default alphabet
//! (unpacked, one septet per octet), Latin-1 and UCS-2 (UTF-16 big-endian,
//! no BOM), plus the data_coding scheme values that advertise them.

use crate::codec::CodecError;

/// data_coding values for the supported alphabets.
pub mod schemes {
    pub const SMSC_DEFAULT_ALPHABET: u8 = 0x00;
    pub const ASCII: u8 = 0x01;
    pub const LATIN1: u8 = 0x03;
    pub const UCS2: u8 = 0x08;
}

const ESCAPE: u8 = 0x1B;

/// GSM 03.38 basic character set, indexed by septet value.
const BASIC: [char; 128] = [
    '@', '£', '$', '¥', 'è', 'é', 'ù', 'ì', 'ò', 'Ç', '\n', 'Ø', 'ø', '\r', 'Å', 'å', //
    'Δ', '_', 'Φ', 'Γ', 'Λ', 'Ω', 'Π', 'Ψ', 'Σ', 'Θ', 'Ξ', '\u{1B}', 'Æ', 'æ', 'ß', 'É', //
    ' ', '!', '"', '#', '¤', '%', '&', '\'', '(', ')', '*', '+', ',', '-', '.', '/', //
    '0', '1', '2', '3', '4', '5', '6', '7', '8', '9', ':', ';', '<', '=', '>', '?', //
    '¡', 'A', 'B', 'C', 'D', 'E', 'F', 'G', 'H', 'I', 'J', 'K', 'L', 'M', 'N', 'O', //
    'P', 'Q', 'R', 'S', 'T', 'U', 'V', 'W', 'X', 'Y', 'Z', 'Ä', 'Ö', 'Ñ', 'Ü', '§', //
    '¿', 'a', 'b', 'c', 'd', 'e', 'f', 'g', 'h', 'i', 'j', 'k', 'l', 'm', 'n', 'o', //
    'p', 'q', 'r', 's', 't', 'u', 'v', 'w', 'x', 'y', 'z', 'ä', 'ö', 'ñ', 'ü', 'à',
];

fn basic_septet(c: char) -> Option<u8> {
    // the hot range is plain ASCII that maps to itself; '$' is the one
    // exception below 0x40 (GSM puts the currency sign there)
    match c {
        ' '..='?' | 'A'..='Z' | 'a'..='z' if c != '$' => Some(c as u8),
        _ => BASIC.iter().position(|&b| b == c).map(|i| i as u8),
    }
}

fn extension_septet(c: char) -> Option<u8> {
    match c {
        '\u{0C}' => Some(0x0A),
        '^' => Some(0x14),
        '{' => Some(0x28),
        '}' => Some(0x29),
        '\\' => Some(0x2F),
        '[' => Some(0x3C),
        '~' => Some(0x3D),
        ']' => Some(0x3E),
        '|' => Some(0x40),
        '€' => Some(0x65),
        _ => None,
    }
}

fn extension_char(code: u8) -> Option<char> {
    match code {
        0x0A => Some('\u{0C}'),
        0x14 => Some('^'),
        0x28 => Some('{'),
        0x29 => Some('}'),
        0x2F => Some('\\'),
        0x3C => Some('['),
        0x3D => Some('~'),
        0x3E => Some(']'),
        0x40 => Some('|'),
        0x65 => Some('€'),
        _ => None,
    }
}

/// Encode text as unpacked GSM 03.38 septets, one per octet. Extension
/// characters occupy two octets (escape + code). Fails with
/// [`CodecError::Unencodable`] on the first character outside the
/// alphabet.
pub fn encode_gsm7(text: &str) -> Result<Vec<u8>, CodecError> {
    let mut out = Vec::with_capacity(text.len());
    for c in text.chars() {
        if let Some(septet) = basic_septet(c) {
            out.push(septet);
        } else if let Some(code) = extension_septet(c) {
            out.push(ESCAPE);
            out.push(code);
        } else {
            return Err(CodecError::Unencodable);
        }
    }
    Ok(out)
}

/// Decode unpacked GSM 03.38 septets back to text. Septets above 0x7F and
/// unassigned escape codes fail.
pub fn decode_gsm7(data: &[u8]) -> Result<String, CodecError> {
    let mut out = String::with_capacity(data.len());
    let mut iter = data.iter();
    while let Some(&septet) = iter.next() {
        if septet > 0x7F {
            return Err(CodecError::Unencodable);
        }
        if septet == ESCAPE {
            let &code = iter.next().ok_or(CodecError::ShortBuffer)?;
            out.push(extension_char(code).ok_or(CodecError::Unencodable)?);
        } else {
            out.push(BASIC[usize::from(septet)]);
        }
    }
    Ok(out)
}

/// Encode text as ISO 8859-1.
pub fn encode_latin1(text: &str) -> Result<Vec<u8>, CodecError> {
    text.chars()
        .map(|c| {
            let code = c as u32;
            if code <= 0xFF {
                Ok(code as u8)
            } else {
                Err(CodecError::Unencodable)
            }
        })
        .collect()
}

/// Decode ISO 8859-1 bytes.
pub fn decode_latin1(data: &[u8]) -> String {
    data.iter().map(|&b| char::from(b)).collect()
}

/// Encode text as UCS-2 (UTF-16 big-endian, no BOM).
pub fn encode_ucs2(text: &str) -> Vec<u8> {
    let mut out = Vec::with_capacity(text.len() * 2);
    for unit in text.encode_utf16() {
        out.extend_from_slice(&unit.to_be_bytes());
    }
    out
}

/// Decode UCS-2 bytes. Fails on an odd byte count.
pub fn decode_ucs2(data: &[u8]) -> Result<String, CodecError> {
    if data.len() % 2 != 0 {
        return Err(CodecError::ShortBuffer);
    }
    let units: Vec<u16> = data
        .chunks_exact(2)
        .map(|pair| u16::from_be_bytes([pair[0], pair[1]]))
        .collect();
    Ok(String::from_utf16_lossy(&units))
}
