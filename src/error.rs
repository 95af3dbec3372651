//! # Error Types
//!
//! Custom error types for iBUS Bridge using `thiserror`.

use thiserror::Error;

/// Reasons the decoder rejects a received frame.
///
/// Rejections are absorbed by the receive loop: the published snapshot and
/// the freshness flag are left untouched and the next frame is awaited.
/// These values exist for logging and for tests, not for control flow.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum FrameError {
    /// Byte 0 or byte 1 does not carry the expected header tags
    #[error("header mismatch: length tag 0x{length:02X}, command tag 0x{command:02X}")]
    HeaderMismatch { length: u8, command: u8 },

    /// Computed checksum differs from the transmitted trailer
    #[error("checksum mismatch: computed 0x{computed:04X}, received 0x{received:04X}")]
    ChecksumMismatch { computed: u16, received: u16 },
}

/// Main error type for iBUS Bridge
#[derive(Debug, Error)]
pub enum IbusBridgeError {
    /// Frame validation errors
    #[error("iBUS frame error: {0}")]
    Frame(#[from] FrameError),

    /// Serial port errors
    #[error("Serial error: {0}")]
    Serial(String),

    /// Configuration errors
    #[error("Configuration error: {0}")]
    Config(#[from] toml::de::Error),

    /// Snapshot record serialization errors
    #[error("Record error: {0}")]
    Record(#[from] serde_json::Error),

    /// I/O errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type alias for iBUS Bridge
pub type Result<T> = std::result::Result<T, IbusBridgeError>;
