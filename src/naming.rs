//! Output path resolution and destination collision policy.
//!
//! Encryption writes `<dir>/<stem>.scc`, where `<stem>` is either the input's
//! file stem or, when obfuscating, a random token digested with BLAKE3.
//! Decryption writes `<dir>/<real name>` using the name stored in the header.
//! `<dir>` is the requested output directory if it exists, else the input's
//! own directory.

use std::ffi::OsString;
use std::fs::{self, File, OpenOptions};
use std::path::{Path, PathBuf};

use rand::distributions::Alphanumeric;
use rand::{Rng, RngCore};

use crate::error::{Error, Result};

/// Extension reserved for containers (without the dot).
pub const EXTENSION: &str = "scc";
/// Length of the random token behind an obfuscated name.
pub const TOKEN_LEN: usize = 32;
/// Digest bytes kept for an obfuscated name (hex doubles it).
const OBFUSCATED_DIGEST_LEN: usize = 16;

/// Fixed-length random alphanumeric string.
pub fn random_token<R: RngCore + ?Sized>(rng: &mut R, len: usize) -> String {
    (0..len).map(|_| rng.sample(Alphanumeric) as char).collect()
}

/// On-disk stem for an obfuscated container: 32 hex characters.
pub fn obfuscated_stem<R: RngCore + ?Sized>(rng: &mut R) -> String {
    let token = random_token(rng, TOKEN_LEN);
    let digest = blake3::hash(token.as_bytes());
    hex::encode(&digest.as_bytes()[..OBFUSCATED_DIGEST_LEN])
}

fn target_dir(input: &Path, output_dir: Option<&Path>) -> PathBuf {
    match output_dir {
        Some(dir) if dir.is_dir() => dir.to_path_buf(),
        _ => input.parent().map(Path::to_path_buf).unwrap_or_default(),
    }
}

/// Destination of `input` once encrypted.
pub fn encryption_path<R: RngCore + ?Sized>(
    input:      &Path,
    output_dir: Option<&Path>,
    obfuscate:  bool,
    rng:        &mut R,
) -> Result<PathBuf> {
    let mut file_name: OsString = if obfuscate {
        obfuscated_stem(rng).into()
    } else {
        input.file_stem()
            .ok_or(Error::MissingField("input file name"))?
            .to_os_string()
    };
    file_name.push(".");
    file_name.push(EXTENSION);
    Ok(target_dir(input, output_dir).join(file_name))
}

/// Destination of a decrypted container whose header names `real_name`.
///
/// Only the final component of `real_name` is used.
pub fn decryption_path(input: &Path, output_dir: Option<&Path>, real_name: &str) -> Result<PathBuf> {
    let file_name = Path::new(real_name)
        .file_name()
        .ok_or(Error::MissingField("name"))?;
    Ok(target_dir(input, output_dir).join(file_name))
}

/// Refuse a destination that equals the input, ignoring case.
///
/// An existing destination is also refused when it resolves to the same file
/// as the input under another spelling (`d/x.scc` and `./d/x.scc`).
pub fn check_same_name(destination: &Path, input: &Path) -> Result<()> {
    let dest = destination.to_string_lossy().to_lowercase();
    let src  = input.to_string_lossy().to_lowercase();
    if dest == src {
        return Err(Error::SameFileName(destination.to_path_buf()));
    }
    if destination.exists() && fs::canonicalize(destination)? == fs::canonicalize(input)? {
        return Err(Error::SameFileName(destination.to_path_buf()));
    }
    Ok(())
}

/// Open `destination` for writing under the collision policy.
///
/// An existing file is an error unless `overwrite` is set, in which case it
/// is truncated to zero length.
pub fn prepare_destination(destination: &Path, overwrite: bool) -> Result<File> {
    if destination.exists() {
        if !overwrite {
            return Err(Error::DestinationExists(destination.to_path_buf()));
        }
        tracing::debug!(path = %destination.display(), "truncating existing destination");
        return Ok(OpenOptions::new().write(true).truncate(true).open(destination)?);
    }
    Ok(OpenOptions::new().write(true).create_new(true).open(destination)?)
}
