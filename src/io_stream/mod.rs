//! Container framing: writer and reader.
//!
//! # Layout
//! ```text
//! [ MAGIC            u64 BE ]
//! [ header length L  u64 BE ][ L bytes: Header ]
//! [ frame length M   u64 BE ][ M bytes: Frame  ]   × header.frames
//! ```
//! The magic tag appears once, before the header.  Frames carry no tag.
//!
//! # Reads
//! Every length prefix is exactly 8 bytes and every payload exactly its
//! declared size.  Short reads are retried until the buffer is full or the
//! stream ends; a record cut short is `InvalidData`.  The only clean stop is
//! end-of-stream before the first byte of a frame length, which
//! [`ContainerReader::read_frame`] reports as `Ok(None)`.

use std::io::{self, Read, Write};

use byteorder::{BigEndian, ByteOrder, WriteBytesExt};

use crate::codec::Record;
use crate::error::{Error, Result};
use crate::frame::Frame;
use crate::header::Header;

/// Format sentinel written before the header.
pub const MAGIC: u64 = 8848;
/// Byte width of the magic tag and of every length prefix.
pub const PREFIX_LEN: usize = 8;
/// Upper bound accepted for a single record length.
pub const MAX_RECORD_LEN: u64 = 16 * 1024 * 1024;

// ── Writer ───────────────────────────────────────────────────────────────────

pub struct ContainerWriter<W: Write> {
    writer:      W,
    frames_out:  i64,
    bytes_out:   u64,
}

impl<W: Write> ContainerWriter<W> {
    pub fn new(writer: W) -> Self {
        Self { writer, frames_out: 0, bytes_out: 0 }
    }

    /// Write the magic tag, then the length-prefixed header.
    pub fn write_header(&mut self, header: &Header) -> Result<()> {
        self.writer.write_u64::<BigEndian>(MAGIC)?;
        self.bytes_out += PREFIX_LEN as u64;
        self.write_record(header)
    }

    /// Write one length-prefixed frame.
    pub fn write_frame(&mut self, frame: &Frame) -> Result<()> {
        self.write_record(frame)?;
        self.frames_out += 1;
        Ok(())
    }

    fn write_record<T: Record>(&mut self, record: &T) -> Result<()> {
        let payload = record.encode();
        self.writer.write_u64::<BigEndian>(payload.len() as u64)?;
        self.writer.write_all(&payload)?;
        self.bytes_out += (PREFIX_LEN + payload.len()) as u64;
        Ok(())
    }

    /// Frames written so far.
    pub fn frames_written(&self) -> i64 {
        self.frames_out
    }

    /// Container bytes written so far.
    pub fn bytes_written(&self) -> u64 {
        self.bytes_out
    }

    pub fn flush(&mut self) -> Result<()> {
        self.writer.flush()?;
        Ok(())
    }

    pub fn into_inner(self) -> W {
        self.writer
    }
}

// ── Reader ───────────────────────────────────────────────────────────────────

pub struct ContainerReader<R: Read> {
    reader:    R,
    frames_in: i64,
}

impl<R: Read> ContainerReader<R> {
    pub fn new(reader: R) -> Self {
        Self { reader, frames_in: 0 }
    }

    /// Check the magic tag and decode the header.
    pub fn read_header(&mut self) -> Result<Header> {
        let mut tag = [0u8; PREFIX_LEN];
        if read_full(&mut self.reader, &mut tag)? != PREFIX_LEN {
            return Err(Error::InvalidFile);
        }
        if BigEndian::read_u64(&tag) != MAGIC {
            return Err(Error::InvalidFile);
        }
        let len = self.read_len()?
            .ok_or_else(|| Error::invalid_data("missing header length"))?;
        self.read_record(len)
    }

    /// Decode the next frame, or `None` once the stream is exhausted.
    pub fn read_frame(&mut self) -> Result<Option<Frame>> {
        let Some(len) = self.read_len()? else {
            return Ok(None);
        };
        let frame = self.read_record(len)?;
        self.frames_in += 1;
        Ok(Some(frame))
    }

    /// Frames read so far.
    pub fn frames_read(&self) -> i64 {
        self.frames_in
    }

    pub fn into_inner(self) -> R {
        self.reader
    }

    fn read_len(&mut self) -> Result<Option<u64>> {
        let mut prefix = [0u8; PREFIX_LEN];
        match read_full(&mut self.reader, &mut prefix)? {
            0 => Ok(None),
            PREFIX_LEN => Ok(Some(BigEndian::read_u64(&prefix))),
            n => Err(Error::invalid_data(format!(
                "length prefix cut short: {n} of {PREFIX_LEN} bytes"
            ))),
        }
    }

    fn read_record<T: Record>(&mut self, len: u64) -> Result<T> {
        if len == 0 || len > i64::MAX as u64 {
            return Err(Error::invalid_data(format!("{} length {} is not positive", T::NAME, len as i64)));
        }
        if len > MAX_RECORD_LEN {
            return Err(Error::invalid_data(format!(
                "{} length {len} exceeds limit {MAX_RECORD_LEN}", T::NAME
            )));
        }
        let mut payload = vec![0u8; len as usize];
        let n = read_full(&mut self.reader, &mut payload)?;
        if n != payload.len() {
            return Err(Error::invalid_data(format!(
                "{} payload cut short: {n} of {len} bytes", T::NAME
            )));
        }
        T::decode(&payload)
    }
}

/// Read until `buf` is full or the stream ends.  Returns bytes read.
pub fn read_full<R: Read + ?Sized>(reader: &mut R, buf: &mut [u8]) -> io::Result<usize> {
    let mut filled = 0;
    while filled < buf.len() {
        match reader.read(&mut buf[filled..]) {
            Ok(0) => break,
            Ok(n) => filled += n,
            Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
            Err(e) => return Err(e),
        }
    }
    Ok(filled)
}
