//! Protocol error types.

use thiserror::Error;

/// Errors that can occur while decoding boundary messages.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ProtocolError {
    #[error("Invalid packet opcode: {0:#04x}")]
    InvalidOpcode(u8),

    #[error("Unexpected end of data")]
    UnexpectedEof,

    #[error("Unknown body kind: {0}")]
    InvalidBodyKind(u8),

    #[error("Non-finite coordinate in packet")]
    NonFinite,
}
