use crate::codec::{expect_wire, Decoder, Encoder, Record, WireType};
use crate::error::{Error, Result};

const FIELD_FRAMES: u32 = 1;
const FIELD_NAME:   u32 = 2;
const FIELD_SECRET: u32 = 3;

/// The single record preceding all frames in a container.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Header {
    /// Number of frames that follow.
    pub frames: i64,
    /// Original base name; ciphertext when `secret` is set.
    pub name:   Vec<u8>,
    pub secret: bool,
}

impl Header {
    pub fn new(frames: i64, name: Vec<u8>, secret: bool) -> Self {
        Self { frames, name, secret }
    }
}

impl Record for Header {
    const NAME: &'static str = "Header";

    fn encode(&self) -> Vec<u8> {
        let mut enc = Encoder::new();
        enc.varint_field(FIELD_FRAMES, self.frames as u64);
        enc.bytes_field(FIELD_NAME, &self.name);
        enc.bool_field(FIELD_SECRET, self.secret);
        enc.finish()
    }

    fn decode(buf: &[u8]) -> Result<Self> {
        let mut header = Header::default();
        let mut dec = Decoder::new(buf);
        while !dec.is_empty() {
            let (field, wire) = dec.read_key()?;
            match field {
                FIELD_FRAMES => {
                    expect_wire(Self::NAME, "frames", wire, WireType::Varint)?;
                    header.frames = dec.read_varint()? as i64;
                }
                FIELD_NAME => {
                    expect_wire(Self::NAME, "name", wire, WireType::LengthDelimited)?;
                    header.name = dec.read_bytes()?.to_vec();
                }
                FIELD_SECRET => {
                    expect_wire(Self::NAME, "secret", wire, WireType::Varint)?;
                    header.secret = dec.read_varint()? != 0;
                }
                _ => dec.skip(wire)?,
            }
        }
        if header.frames < 0 {
            return Err(Error::invalid_data(format!("negative frame count {}", header.frames)));
        }
        Ok(header)
    }
}
