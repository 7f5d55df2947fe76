//! File-level encrypt and decrypt: the primary embedding surface.
//!
//! ```no_run
//! use std::path::Path;
//! use sccrypt::pipeline::{self, DecryptOptions, EncryptOptions};
//!
//! let opts = EncryptOptions { password: "correct horse".into(), ..Default::default() };
//! let sealed = pipeline::encrypt(Path::new("notes.txt"), &opts, &mut rand::thread_rng(), None)?;
//!
//! let opts = DecryptOptions {
//!     password:   "correct horse".into(),
//!     output_dir: Some("restored".into()),
//!     ..Default::default()
//! };
//! pipeline::decrypt(&sealed.destination, &opts, None)?;
//! # Ok::<(), sccrypt::Error>(())
//! ```
//!
//! Both directions are single-pass and strictly sequential: one chunk of
//! [`CHUNK_SIZE`] bytes becomes one frame, in file order.  Any failure aborts
//! the call and leaves whatever was already written at the destination.

use std::fs::File;
use std::io::{BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};

use rand::RngCore;

use crate::crypto::{self, SecretKey, CryptoError, IV_LEN};
use crate::error::{Error, Result};
use crate::frame::Frame;
use crate::header::Header;
use crate::io_stream::{read_full, ContainerReader, ContainerWriter};
use crate::naming;

/// Plaintext bytes per frame.
pub const CHUNK_SIZE: usize = 4096;

// ── Options ──────────────────────────────────────────────────────────────────

/// Configuration for [`encrypt`].
#[derive(Clone, Default)]
pub struct EncryptOptions {
    /// Where to place the container; ignored unless it is an existing directory.
    pub output_dir: Option<PathBuf>,
    pub password:   String,
    /// Give the container a random on-disk name.
    pub obfuscate:  bool,
    /// Store the original name encrypted inside the header.
    pub secret:     bool,
    /// Truncate and reuse an existing destination.
    pub overwrite:  bool,
}

/// Configuration for [`decrypt`].
#[derive(Clone, Default)]
pub struct DecryptOptions {
    pub output_dir: Option<PathBuf>,
    pub password:   String,
    pub overwrite:  bool,
}

impl std::fmt::Debug for EncryptOptions {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EncryptOptions")
            .field("output_dir", &self.output_dir)
            .field("password", &"[REDACTED]")
            .field("obfuscate", &self.obfuscate)
            .field("secret", &self.secret)
            .field("overwrite", &self.overwrite)
            .finish()
    }
}

impl std::fmt::Debug for DecryptOptions {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DecryptOptions")
            .field("output_dir", &self.output_dir)
            .field("password", &"[REDACTED]")
            .field("overwrite", &self.overwrite)
            .finish()
    }
}

// ── Reports ──────────────────────────────────────────────────────────────────

/// Emitted after every frame.  `index` is 1-based.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FrameProgress {
    pub index: i64,
    pub total: i64,
    pub bytes: usize,
}

pub type ProgressFn<'a> = dyn FnMut(FrameProgress) + 'a;

#[derive(Debug, Clone)]
pub struct EncryptReport {
    pub destination: PathBuf,
    pub frames:      i64,
    /// Plaintext bytes consumed.
    pub bytes:       u64,
}

#[derive(Debug, Clone)]
pub struct DecryptReport {
    pub destination: PathBuf,
    /// Original file name recovered from the header.
    pub name:        String,
    pub frames:      i64,
    /// Plaintext bytes written.
    pub bytes:       u64,
}

/// Header summary returned by [`inspect`].
#[derive(Debug, Clone)]
pub struct ContainerInfo {
    pub frames:         i64,
    pub secret:         bool,
    /// Plaintext name; `None` when it is stored encrypted.
    pub name:           Option<String>,
    pub container_size: u64,
}

/// `ceil(size / CHUNK_SIZE)`.
pub fn frame_count(size: u64) -> i64 {
    let chunk = CHUNK_SIZE as u64;
    (size / chunk + u64::from(size % chunk != 0)) as i64
}

// ── Frames ───────────────────────────────────────────────────────────────────

/// Checksum and encrypt one plaintext chunk under a fresh IV from `rng`.
pub fn seal_frame<R: RngCore + ?Sized>(
    chunk:    &[u8],
    key:      &SecretKey,
    fixed_iv: &[u8; IV_LEN],
    rng:      &mut R,
) -> Result<Frame> {
    let hash = crypto::checksum(chunk);
    let mut iv = [0u8; IV_LEN];
    rng.fill_bytes(&mut iv);
    Ok(Frame {
        iv:   crypto::encrypt(&iv, key.as_bytes(), fixed_iv)?,
        data: crypto::encrypt(chunk, key.as_bytes(), &iv)?,
        hash,
    })
}

/// Decrypt one frame and verify its checksum.  `index` is used for errors only.
pub fn open_frame(
    frame:    &Frame,
    index:    i64,
    key:      &SecretKey,
    fixed_iv: &[u8; IV_LEN],
) -> Result<Vec<u8>> {
    if frame.iv.is_empty() {
        return Err(Error::MissingField("iv"));
    }
    if frame.data.is_empty() {
        return Err(Error::MissingField("data"));
    }
    let iv: [u8; IV_LEN] = crypto::decrypt(&frame.iv, key.as_bytes(), fixed_iv)?
        .as_slice()
        .try_into()
        .map_err(|_| Error::invalid_data(format!(
            "frame {index}: IV is {} bytes, expected {IV_LEN}", frame.iv.len()
        )))?;
    let plain = crypto::decrypt(&frame.data, key.as_bytes(), &iv)?;
    let actual = crypto::checksum(&plain);
    if actual != frame.hash {
        return Err(Error::ChecksumMismatch { index, expected: frame.hash, actual });
    }
    Ok(plain)
}

/// Recover the original file name from a header.
fn recover_name(header: &Header, key: &SecretKey, fixed_iv: &[u8; IV_LEN]) -> Result<String> {
    let name = if header.secret {
        let plain = crypto::decrypt(&header.name, key.as_bytes(), fixed_iv)?;
        String::from_utf8(plain).map_err(|_| CryptoError::DecryptionFailed)?
    } else {
        String::from_utf8(header.name.clone())
            .map_err(|_| Error::invalid_data("header name is not UTF-8"))?
    };
    if name.is_empty() {
        return Err(Error::MissingField("name"));
    }
    Ok(name)
}

fn report(progress: &mut Option<&mut ProgressFn<'_>>, p: FrameProgress) {
    if let Some(cb) = progress.as_deref_mut() {
        cb(p);
    }
}

// ── Encrypt ──────────────────────────────────────────────────────────────────

/// Encrypt `input` into a new container.
pub fn encrypt<R: RngCore + ?Sized>(
    input:        &Path,
    opts:         &EncryptOptions,
    rng:          &mut R,
    mut progress: Option<&mut ProgressFn<'_>>,
) -> Result<EncryptReport> {
    let destination = naming::encryption_path(input, opts.output_dir.as_deref(), opts.obfuscate, rng)?;
    naming::check_same_name(&destination, input)?;

    let mut source = File::open(input)?;
    let size   = source.metadata()?.len();
    let frames = frame_count(size);

    let key      = crypto::derive_key(&opts.password);
    let fixed_iv = crypto::fixed_iv();

    let mut name = input.file_name()
        .ok_or(Error::MissingField("input file name"))?
        .to_str()
        .ok_or_else(|| Error::invalid_data(format!("file name {} is not UTF-8", input.display())))?
        .as_bytes()
        .to_vec();
    if opts.secret {
        name = crypto::encrypt(&name, key.as_bytes(), &fixed_iv)?;
    }

    let sink = naming::prepare_destination(&destination, opts.overwrite)?;
    let mut writer = ContainerWriter::new(BufWriter::new(sink));
    writer.write_header(&Header::new(frames, name, opts.secret))?;
    tracing::debug!(
        input = %input.display(),
        destination = %destination.display(),
        size, frames, secret = opts.secret,
        "header written"
    );

    let mut chunk = vec![0u8; CHUNK_SIZE];
    let mut bytes = 0u64;
    for written in 0..frames {
        let n = read_full(&mut source, &mut chunk)?;
        if n == 0 {
            return Err(Error::MissingFrames { expected: frames, actual: written });
        }
        let frame = seal_frame(&chunk[..n], &key, &fixed_iv, rng)?;
        writer.write_frame(&frame)?;
        bytes += n as u64;

        let index = written + 1;
        tracing::trace!(index, total = frames, bytes = n, "frame sealed");
        report(&mut progress, FrameProgress { index, total: frames, bytes: n });
    }
    writer.flush()?;

    tracing::info!(
        destination = %destination.display(),
        frames = writer.frames_written(),
        container_bytes = writer.bytes_written(),
        "encrypted"
    );
    Ok(EncryptReport { destination, frames, bytes })
}

// ── Decrypt ──────────────────────────────────────────────────────────────────

/// Decrypt the container at `input`, restoring the original file name.
pub fn decrypt(
    input:        &Path,
    opts:         &DecryptOptions,
    mut progress: Option<&mut ProgressFn<'_>>,
) -> Result<DecryptReport> {
    let mut reader = ContainerReader::new(BufReader::new(File::open(input)?));
    let header = reader.read_header()?;

    let key      = crypto::derive_key(&opts.password);
    let fixed_iv = crypto::fixed_iv();

    let name = recover_name(&header, &key, &fixed_iv)?;
    let destination = naming::decryption_path(input, opts.output_dir.as_deref(), &name)?;
    naming::check_same_name(&destination, input)?;
    tracing::debug!(
        input = %input.display(),
        destination = %destination.display(),
        frames = header.frames, secret = header.secret,
        "header read"
    );

    let mut sink = BufWriter::new(naming::prepare_destination(&destination, opts.overwrite)?);
    let mut bytes = 0u64;
    while let Some(frame) = reader.read_frame()? {
        let index = reader.frames_read();
        let plain = open_frame(&frame, index, &key, &fixed_iv)?;
        sink.write_all(&plain)?;
        bytes += plain.len() as u64;

        tracing::trace!(index, total = header.frames, bytes = plain.len(), "frame opened");
        report(&mut progress, FrameProgress { index, total: header.frames, bytes: plain.len() });
    }
    sink.flush()?;

    let frames = reader.frames_read();
    if frames != header.frames {
        return Err(Error::MissingFrames { expected: header.frames, actual: frames });
    }

    tracing::info!(destination = %destination.display(), frames, bytes, "decrypted");
    Ok(DecryptReport { destination, name, frames, bytes })
}

// ── Inspect ──────────────────────────────────────────────────────────────────

/// Read only the header of a container.  Needs no password.
pub fn inspect(input: &Path) -> Result<ContainerInfo> {
    let file = File::open(input)?;
    let container_size = file.metadata()?.len();
    let header = ContainerReader::new(BufReader::new(file)).read_header()?;
    let name = (!header.secret).then(|| String::from_utf8_lossy(&header.name).into_owned());
    Ok(ContainerInfo { frames: header.frames, secret: header.secret, name, container_size })
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn frame_count_is_ceiling_division() {
        assert_eq!(frame_count(0), 0);
        assert_eq!(frame_count(1), 1);
        assert_eq!(frame_count(4096), 1);
        assert_eq!(frame_count(4097), 2);
        assert_eq!(frame_count(10_000), 3);
    }

    #[test]
    fn sealed_frame_opens() {
        let key = crypto::derive_key("pw");
        let fixed_iv = crypto::fixed_iv();
        let chunk = b"some plaintext chunk".to_vec();
        let frame = seal_frame(&chunk, &key, &fixed_iv, &mut StdRng::seed_from_u64(7)).unwrap();
        assert_eq!(frame.hash, crypto::checksum(&chunk));
        assert_eq!(frame.iv.len(), IV_LEN);
        assert_ne!(frame.data, chunk);
        assert_eq!(open_frame(&frame, 1, &key, &fixed_iv).unwrap(), chunk);
    }

    #[test]
    fn flipped_bit_is_checksum_mismatch() {
        let key = crypto::derive_key("pw");
        let fixed_iv = crypto::fixed_iv();
        let mut frame = seal_frame(&[0x5a; 64], &key, &fixed_iv, &mut StdRng::seed_from_u64(7)).unwrap();
        frame.data[10] ^= 0x04;
        let err = open_frame(&frame, 4, &key, &fixed_iv).unwrap_err();
        assert!(matches!(err, Error::ChecksumMismatch { index: 4, .. }));
    }

    #[test]
    fn wrong_password_fails_checksum() {
        let fixed_iv = crypto::fixed_iv();
        let frame = seal_frame(
            b"payload", &crypto::derive_key("right"), &fixed_iv, &mut StdRng::seed_from_u64(7),
        ).unwrap();
        let err = open_frame(&frame, 1, &crypto::derive_key("wrong"), &fixed_iv).unwrap_err();
        assert!(matches!(err, Error::ChecksumMismatch { .. }));
    }

    #[test]
    fn empty_fields_are_missing() {
        let key = crypto::derive_key("pw");
        let fixed_iv = crypto::fixed_iv();
        let no_iv = Frame { iv: vec![], data: vec![1], hash: 0 };
        let no_data = Frame { iv: vec![1; IV_LEN], data: vec![], hash: 0 };
        assert!(matches!(open_frame(&no_iv, 1, &key, &fixed_iv), Err(Error::MissingField("iv"))));
        assert!(matches!(open_frame(&no_data, 1, &key, &fixed_iv), Err(Error::MissingField("data"))));
    }

    #[test]
    fn short_iv_is_invalid_data() {
        let key = crypto::derive_key("pw");
        let fixed_iv = crypto::fixed_iv();
        let frame = Frame { iv: vec![1; 8], data: vec![1], hash: 0 };
        assert!(matches!(open_frame(&frame, 1, &key, &fixed_iv), Err(Error::InvalidData(_))));
    }

    #[test]
    fn secret_name_roundtrips_through_header() {
        let key = crypto::derive_key("pw");
        let fixed_iv = crypto::fixed_iv();
        let sealed = crypto::encrypt(b"diary.md", key.as_bytes(), &fixed_iv).unwrap();
        let header = Header::new(0, sealed, true);
        assert_eq!(recover_name(&header, &key, &fixed_iv).unwrap(), "diary.md");
    }

    #[test]
    fn empty_name_is_missing_field() {
        let key = crypto::derive_key("pw");
        let header = Header::new(0, Vec::new(), false);
        assert!(matches!(
            recover_name(&header, &key, &crypto::fixed_iv()),
            Err(Error::MissingField("name"))
        ));
    }

    #[test]
    fn options_debug_hides_password() {
        let opts = EncryptOptions { password: "hunter2".into(), ..Default::default() };
        assert!(!format!("{opts:?}").contains("hunter2"));
    }
}
