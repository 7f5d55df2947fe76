pub mod error;
pub mod codec;
pub mod header;
pub mod frame;
pub mod crypto;
pub mod io_stream;
pub mod naming;
pub mod pipeline;
pub mod advice;

pub use error::{Error, Result};
pub use header::Header;
pub use frame::Frame;
pub use codec::Record;
pub use io_stream::{ContainerReader, ContainerWriter, MAGIC};
pub use pipeline::{decrypt, encrypt, inspect, DecryptOptions, EncryptOptions, CHUNK_SIZE};
