use crate::codec::{expect_wire, Decoder, Encoder, Record, WireType};
use crate::error::Result;

const FIELD_IV:   u32 = 1;
const FIELD_DATA: u32 = 2;
const FIELD_HASH: u32 = 3;

/// One encrypted, checksummed chunk of the source file.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Frame {
    /// Per-frame IV, encrypted under the fixed key and fixed IV.
    pub iv:   Vec<u8>,
    /// Chunk ciphertext under the fixed key and the plaintext `iv`.
    pub data: Vec<u8>,
    /// Checksum of the plaintext chunk.
    pub hash: u32,
}

impl Record for Frame {
    const NAME: &'static str = "Frame";

    fn encode(&self) -> Vec<u8> {
        let mut enc = Encoder::new();
        enc.bytes_field(FIELD_IV, &self.iv);
        enc.bytes_field(FIELD_DATA, &self.data);
        enc.varint_field(FIELD_HASH, self.hash as u64);
        enc.finish()
    }

    fn decode(buf: &[u8]) -> Result<Self> {
        let mut frame = Frame::default();
        let mut dec = Decoder::new(buf);
        while !dec.is_empty() {
            let (field, wire) = dec.read_key()?;
            match field {
                FIELD_IV => {
                    expect_wire(Self::NAME, "iv", wire, WireType::LengthDelimited)?;
                    frame.iv = dec.read_bytes()?.to_vec();
                }
                FIELD_DATA => {
                    expect_wire(Self::NAME, "data", wire, WireType::LengthDelimited)?;
                    frame.data = dec.read_bytes()?.to_vec();
                }
                FIELD_HASH => {
                    expect_wire(Self::NAME, "hash", wire, WireType::Varint)?;
                    frame.hash = dec.read_varint()? as u32;
                }
                _ => dec.skip(wire)?,
            }
        }
        Ok(frame)
    }
}
