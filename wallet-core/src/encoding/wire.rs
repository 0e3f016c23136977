// wallet-core\src\encoding\wire.rs
//
// Protobuf-compatible wire primitives: varint, length-delimited, field tag.
// Output phải khớp byte-by-byte với node, vì hash của body được ký.

use crate::error::EncodingError;

/// Protobuf wire types used by the transaction schema.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WireType {
    Varint = 0,
    LengthDelimited = 2,
}

impl WireType {
    fn from_u64(v: u64) -> Result<Self, EncodingError> {
        match v {
            0 => Ok(WireType::Varint),
            2 => Ok(WireType::LengthDelimited),
            other => Err(EncodingError::Wire(format!("unsupported wire type {}", other))),
        }
    }
}

// =============================================================================
// WRITERS
// =============================================================================

/// LEB128: 7 bits per byte, high bit set on every byte but the last.
pub fn write_varint(out: &mut Vec<u8>, value: u64) {
    let mut v = value;
    loop {
        let mut byte = (v & 0x7f) as u8;
        v >>= 7;
        if v != 0 {
            byte |= 0x80;
        }
        out.push(byte);
        if v == 0 {
            break;
        }
    }
}

pub fn varint(value: u64) -> Vec<u8> {
    let mut out = Vec::with_capacity(10);
    write_varint(&mut out, value);
    out
}

/// `varint(len) ‖ bytes`
pub fn write_length_delimited(out: &mut Vec<u8>, bytes: &[u8]) {
    write_varint(out, bytes.len() as u64);
    out.extend_from_slice(bytes);
}

/// `varint(field << 3 | wire_type)`
#[inline]
pub fn write_tag(out: &mut Vec<u8>, field: u32, wire_type: WireType) {
    write_varint(out, (u64::from(field) << 3) | wire_type as u64);
}

/// Varint field, always written.
pub fn write_varint_field(out: &mut Vec<u8>, field: u32, value: u64) {
    write_tag(out, field, WireType::Varint);
    write_varint(out, value);
}

/// Varint field omitted when zero (proto3 default).
pub fn write_varint_field_nonzero(out: &mut Vec<u8>, field: u32, value: u64) {
    if value != 0 {
        write_varint_field(out, field, value);
    }
}

pub fn write_bytes_field(out: &mut Vec<u8>, field: u32, bytes: &[u8]) {
    write_tag(out, field, WireType::LengthDelimited);
    write_length_delimited(out, bytes);
}

/// Types with a fixed hand-written wire encoding.
pub trait WireEncode {
    fn encode_to(&self, out: &mut Vec<u8>);

    fn to_wire_bytes(&self) -> Vec<u8> {
        let mut out = Vec::new();
        self.encode_to(&mut out);
        out
    }
}

/// Inverse of [`WireEncode`] for the message types that are decoded.
pub trait WireDecode: Sized {
    fn decode(bytes: &[u8]) -> Result<Self, EncodingError>;
}

// =============================================================================
// READER
// =============================================================================

/// Field value as read from the wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldValue<'a> {
    Varint(u64),
    Bytes(&'a [u8]),
}

/// Cursor over protobuf-encoded bytes. Truncation is always an error.
#[derive(Debug, Clone)]
pub struct WireReader<'a> {
    data: &'a [u8],
    pos: usize,
}

impl<'a> WireReader<'a> {
    pub fn new(data: &'a [u8]) -> Self {
        Self { data, pos: 0 }
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.pos >= self.data.len()
    }

    pub fn read_varint(&mut self) -> Result<u64, EncodingError> {
        let mut result: u64 = 0;
        let mut shift = 0u32;
        loop {
            let byte = *self
                .data
                .get(self.pos)
                .ok_or_else(|| EncodingError::Wire("truncated varint".to_string()))?;
            self.pos += 1;
            if shift == 63 && byte > 1 {
                return Err(EncodingError::Wire("varint overflows u64".to_string()));
            }
            result |= u64::from(byte & 0x7f) << shift;
            if byte & 0x80 == 0 {
                return Ok(result);
            }
            shift += 7;
            if shift > 63 {
                return Err(EncodingError::Wire("varint too long".to_string()));
            }
        }
    }

    pub fn read_length_delimited(&mut self) -> Result<&'a [u8], EncodingError> {
        let len = self.read_varint()? as usize;
        let end = self
            .pos
            .checked_add(len)
            .filter(|&end| end <= self.data.len())
            .ok_or_else(|| {
                EncodingError::Wire(format!(
                    "length {} exceeds remaining {} bytes",
                    len,
                    self.data.len() - self.pos
                ))
            })?;
        let slice = &self.data[self.pos..end];
        self.pos = end;
        Ok(slice)
    }

    /// Next `(field number, value)` pair, or `None` at the end.
    pub fn next_field(&mut self) -> Result<Option<(u32, FieldValue<'a>)>, EncodingError> {
        if self.is_empty() {
            return Ok(None);
        }
        let key = self.read_varint()?;
        let field = u32::try_from(key >> 3)
            .map_err(|_| EncodingError::Wire(format!("field number {} too large", key >> 3)))?;
        if field == 0 {
            return Err(EncodingError::Wire("field number 0".to_string()));
        }
        let value = match WireType::from_u64(key & 0x7)? {
            WireType::Varint => FieldValue::Varint(self.read_varint()?),
            WireType::LengthDelimited => FieldValue::Bytes(self.read_length_delimited()?),
        };
        Ok(Some((field, value)))
    }
}

/// Error for a field that a message does not define.
pub fn unexpected_field(message: &str, field: u32) -> EncodingError {
    EncodingError::Wire(format!("unexpected field {} in {}", field, message))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_varint_vectors() {
        assert_eq!(varint(0), vec![0x00]);
        assert_eq!(varint(1), vec![0x01]);
        assert_eq!(varint(127), vec![0x7f]);
        assert_eq!(varint(128), vec![0x80, 0x01]);
        assert_eq!(hex::encode(varint(300)), "ac02");
        assert_eq!(hex::encode(varint(1 << 32)), "8080808010");
        assert_eq!(varint(u64::MAX).len(), 10);
    }

    #[test]
    fn test_reader_varints() {
        for v in [0u64, 1, 300, 1 << 32, u64::MAX] {
            let bytes = varint(v);
            let mut reader = WireReader::new(&bytes);
            assert_eq!(reader.read_varint().unwrap(), v);
            assert!(reader.is_empty());
        }
    }

    #[test]
    fn test_reader_rejects_overflow_and_truncation() {
        let mut too_long = WireReader::new(&[0xff; 11]);
        assert!(too_long.read_varint().is_err());

        let mut truncated = WireReader::new(&[0x80, 0x80]);
        assert!(truncated.read_varint().is_err());

        let mut short_body = WireReader::new(&[0x0a, 0x05, 0x01, 0x02]);
        assert!(short_body.next_field().is_err());
    }

    #[test]
    fn test_fields() {
        let mut out = Vec::new();
        write_bytes_field(&mut out, 1, &[0xaa, 0xbb]);
        write_varint_field_nonzero(&mut out, 2, 0);
        write_varint_field_nonzero(&mut out, 3, 5);
        write_varint_field(&mut out, 2, 0);
        assert_eq!(hex::encode(&out), "0a02aabb18051000");

        let mut reader = WireReader::new(&out);
        assert_eq!(
            reader.next_field().unwrap(),
            Some((1, FieldValue::Bytes(&[0xaa, 0xbb])))
        );
        assert_eq!(reader.next_field().unwrap(), Some((3, FieldValue::Varint(5))));
        assert_eq!(reader.next_field().unwrap(), Some((2, FieldValue::Varint(0))));
        assert_eq!(reader.next_field().unwrap(), None);
    }

    #[test]
    fn test_unsupported_wire_type() {
        // field 1, wire type 5 (fixed32)
        let mut reader = WireReader::new(&[0x0d, 0, 0, 0, 0]);
        assert!(matches!(reader.next_field(), Err(EncodingError::Wire(_))));
    }
}
