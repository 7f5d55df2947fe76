//! Tag / wire-type / varint record codec.
//!
//! # Wire rules
//! Every field starts with a key varint `(field_number << 3) | wire_type`,
//! followed by a value whose length the wire type alone determines:
//!
//! | wire type | value                                  |
//! |-----------|----------------------------------------|
//! | 0         | base-128 varint                        |
//! | 1         | 8 raw bytes                            |
//! | 2         | varint length, then that many bytes    |
//! | 5         | 4 raw bytes                            |
//!
//! Readers skip fields they do not know, so new fields can be appended
//! without breaking old readers.  Group wire types (3, 4) and the reserved
//! values (6, 7) are rejected.  Writers omit default values, so an empty
//! record encodes to zero bytes.

use crate::error::{Error, Result};

/// Maximum encoded size of a u64 varint.
pub const MAX_VARINT_LEN: usize = 10;

// ── Wire types ───────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WireType {
    Varint,
    Fixed64,
    LengthDelimited,
    Fixed32,
}

impl WireType {
    pub fn from_bits(bits: u8) -> Result<Self> {
        match bits {
            0 => Ok(WireType::Varint),
            1 => Ok(WireType::Fixed64),
            2 => Ok(WireType::LengthDelimited),
            5 => Ok(WireType::Fixed32),
            3 | 4 => Err(Error::invalid_data("group wire types are not supported")),
            other => Err(Error::invalid_data(format!("illegal wire type {other}"))),
        }
    }

    pub fn bits(self) -> u8 {
        match self {
            WireType::Varint          => 0,
            WireType::Fixed64         => 1,
            WireType::LengthDelimited => 2,
            WireType::Fixed32         => 5,
        }
    }
}

// ── Record trait ─────────────────────────────────────────────────────────────

/// A message that can be stored as one length-prefixed container record.
pub trait Record: Sized {
    /// Short name used in error messages.
    const NAME: &'static str;

    fn encode(&self) -> Vec<u8>;
    fn decode(buf: &[u8]) -> Result<Self>;
}

// ── Encoder ──────────────────────────────────────────────────────────────────

#[derive(Debug, Default)]
pub struct Encoder {
    buf: Vec<u8>,
}

impl Encoder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn put_varint(&mut self, mut v: u64) {
        while v >= 0x80 {
            self.buf.push((v as u8 & 0x7f) | 0x80);
            v >>= 7;
        }
        self.buf.push(v as u8);
    }

    pub fn put_key(&mut self, field: u32, wire: WireType) {
        self.put_varint(((field as u64) << 3) | wire.bits() as u64);
    }

    /// Varint field; zero is omitted.
    pub fn varint_field(&mut self, field: u32, v: u64) {
        if v != 0 {
            self.put_key(field, WireType::Varint);
            self.put_varint(v);
        }
    }

    /// Bool field; `false` is omitted.
    pub fn bool_field(&mut self, field: u32, v: bool) {
        self.varint_field(field, v as u64);
    }

    /// Length-delimited field; an empty slice is omitted.
    pub fn bytes_field(&mut self, field: u32, v: &[u8]) {
        if !v.is_empty() {
            self.put_key(field, WireType::LengthDelimited);
            self.put_varint(v.len() as u64);
            self.buf.extend_from_slice(v);
        }
    }

    pub fn finish(self) -> Vec<u8> {
        self.buf
    }
}

// ── Decoder ──────────────────────────────────────────────────────────────────

#[derive(Debug)]
pub struct Decoder<'a> {
    buf: &'a [u8],
    pos: usize,
}

impl<'a> Decoder<'a> {
    pub fn new(buf: &'a [u8]) -> Self {
        Self { buf, pos: 0 }
    }

    pub fn is_empty(&self) -> bool {
        self.pos >= self.buf.len()
    }

    fn take(&mut self, n: usize) -> Result<&'a [u8]> {
        let end = self.pos.checked_add(n)
            .filter(|&end| end <= self.buf.len())
            .ok_or_else(|| Error::invalid_data(format!(
                "field of {n} bytes runs past end of record at offset {}", self.pos
            )))?;
        let out = &self.buf[self.pos..end];
        self.pos = end;
        Ok(out)
    }

    pub fn read_varint(&mut self) -> Result<u64> {
        let mut value = 0u64;
        for i in 0..MAX_VARINT_LEN {
            let b = *self.buf.get(self.pos)
                .ok_or_else(|| Error::invalid_data("truncated varint"))?;
            self.pos += 1;
            value |= ((b & 0x7f) as u64) << (7 * i);
            if b < 0x80 {
                return Ok(value);
            }
        }
        Err(Error::invalid_data("varint overflows 64 bits"))
    }

    /// Read a field key.  Field number 0 is illegal.
    pub fn read_key(&mut self) -> Result<(u32, WireType)> {
        let key = self.read_varint()?;
        let field = key >> 3;
        if field == 0 || field > u32::MAX as u64 {
            return Err(Error::invalid_data(format!("illegal field number {field}")));
        }
        Ok((field as u32, WireType::from_bits((key & 0x7) as u8)?))
    }

    pub fn read_bytes(&mut self) -> Result<&'a [u8]> {
        let len = self.read_varint()?;
        let len = usize::try_from(len)
            .map_err(|_| Error::invalid_data(format!("field length {len} too large")))?;
        self.take(len)
    }

    /// Skip the value of a field whose key has already been read.
    pub fn skip(&mut self, wire: WireType) -> Result<()> {
        match wire {
            WireType::Varint          => self.read_varint().map(drop),
            WireType::Fixed64         => self.take(8).map(drop),
            WireType::LengthDelimited => self.read_bytes().map(drop),
            WireType::Fixed32         => self.take(4).map(drop),
        }
    }
}

/// Reject a known field carrying the wrong wire type.
pub fn expect_wire(record: &str, field: &str, got: WireType, want: WireType) -> Result<()> {
    if got == want {
        Ok(())
    } else {
        Err(Error::invalid_data(format!(
            "{record}.{field}: wire type {} where {} expected", got.bits(), want.bits()
        )))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn varint_bytes(v: u64) -> Vec<u8> {
        let mut enc = Encoder::new();
        enc.put_varint(v);
        enc.finish()
    }

    #[test]
    fn varint_known_encodings() {
        assert_eq!(varint_bytes(0), [0x00]);
        assert_eq!(varint_bytes(1), [0x01]);
        assert_eq!(varint_bytes(127), [0x7f]);
        assert_eq!(varint_bytes(128), [0x80, 0x01]);
        assert_eq!(varint_bytes(300), [0xac, 0x02]);
        assert_eq!(varint_bytes(u64::MAX).len(), MAX_VARINT_LEN);
    }

    #[test]
    fn varint_decodes_max() {
        let bytes = varint_bytes(u64::MAX);
        assert_eq!(Decoder::new(&bytes).read_varint().unwrap(), u64::MAX);
    }

    #[test]
    fn truncated_varint_is_invalid() {
        let err = Decoder::new(&[0x80, 0x80]).read_varint().unwrap_err();
        assert!(matches!(err, Error::InvalidData(_)));
    }

    #[test]
    fn overlong_varint_is_invalid() {
        let bytes = [0xffu8; 11];
        assert!(matches!(Decoder::new(&bytes).read_varint(), Err(Error::InvalidData(_))));
    }

    #[test]
    fn defaults_are_omitted() {
        let mut enc = Encoder::new();
        enc.varint_field(1, 0);
        enc.bytes_field(2, b"");
        enc.bool_field(3, false);
        assert!(enc.finish().is_empty());
    }

    #[test]
    fn skips_every_supported_wire_type() {
        let mut enc = Encoder::new();
        enc.put_key(9, WireType::Varint);
        enc.put_varint(123_456);
        enc.put_key(10, WireType::Fixed64);
        let mut buf = enc.finish();
        buf.extend_from_slice(&[0u8; 8]);
        let mut enc = Encoder::new();
        enc.put_key(11, WireType::Fixed32);
        buf.extend(enc.finish());
        buf.extend_from_slice(&[0u8; 4]);
        let mut enc = Encoder::new();
        enc.bytes_field(12, b"opaque");
        buf.extend(enc.finish());

        let mut dec = Decoder::new(&buf);
        while !dec.is_empty() {
            let (_, wire) = dec.read_key().unwrap();
            dec.skip(wire).unwrap();
        }
    }

    #[test]
    fn group_wire_type_is_rejected() {
        // field 1, wire type 3
        assert!(matches!(Decoder::new(&[0x0b]).read_key(), Err(Error::InvalidData(_))));
    }

    #[test]
    fn field_zero_is_rejected() {
        assert!(matches!(Decoder::new(&[0x00]).read_key(), Err(Error::InvalidData(_))));
    }

    #[test]
    fn bytes_past_end_are_rejected() {
        // length 5, only 2 bytes follow
        let mut dec = Decoder::new(&[0x05, 0xaa, 0xbb]);
        assert!(matches!(dec.read_bytes(), Err(Error::InvalidData(_))));
    }
}
