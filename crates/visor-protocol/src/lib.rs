pub mod handle;
pub mod commands;
pub mod codec;
pub mod wire;
pub mod error;

pub use handle::{Handle, ResourceKind};
pub use commands::{Command, CommandTag};
pub use codec::{decode_stream, encode_command, CommandReader, CommandWriter};
pub use error::DecodeError;
