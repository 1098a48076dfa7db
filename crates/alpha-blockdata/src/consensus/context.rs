//! Serialization contexts.
//!
//! Every consensus stream carries a type bitmask and a version. Two bits
//! change how block data is laid out: [`SERIALIZE_BLOCK_LEGACY`] in the
//! version selects the legacy header layout, and [`SER_GETHASH`] in the type
//! marks a stream that only exists to be hashed.

use crate::blockdata::block::HeaderFormat;

/// Serialization type bit for network messages.
pub const SER_NETWORK: i32 = 1 << 0;
/// Serialization type bit for disk storage.
pub const SER_DISK: i32 = 1 << 1;
/// Serialization type bit for streams that are only hashed.
pub const SER_GETHASH: i32 = 1 << 2;

/// Version bit selecting the legacy block header layout.
pub const SERIALIZE_BLOCK_LEGACY: i32 = 0x0400_0000;

/// The protocol version spoken by this implementation.
pub const PROTOCOL_VERSION: i32 = 70016;

/// The type and version of a consensus stream.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SerializationContext {
    ser_type: i32,
    version: i32,
}

impl SerializationContext {
    /// Creates a context from a raw type bitmask and version.
    pub const fn new(ser_type: i32, version: i32) -> Self {
        Self { ser_type, version }
    }

    /// A network stream at the current protocol version.
    pub const fn network() -> Self {
        Self::new(SER_NETWORK, PROTOCOL_VERSION)
    }

    /// A disk stream at the current protocol version.
    pub const fn disk() -> Self {
        Self::new(SER_DISK, PROTOCOL_VERSION)
    }

    /// A hash-only stream at the current protocol version.
    pub const fn get_hash() -> Self {
        Self::new(SER_GETHASH, PROTOCOL_VERSION)
    }

    /// Returns the same context with the legacy block layout selected.
    pub const fn with_legacy_blocks(self) -> Self {
        Self::new(self.ser_type, self.version | SERIALIZE_BLOCK_LEGACY)
    }

    /// The raw type bitmask.
    pub const fn ser_type(&self) -> i32 {
        self.ser_type
    }

    /// The stream version, flag bits included.
    pub const fn version(&self) -> i32 {
        self.version
    }

    /// Returns true if the legacy block layout is selected.
    pub const fn is_legacy(&self) -> bool {
        self.version & SERIALIZE_BLOCK_LEGACY != 0
    }

    /// Returns true if the stream is only hashed.
    pub const fn is_get_hash(&self) -> bool {
        self.ser_type & SER_GETHASH != 0
    }

    /// The header layout this context selects.
    pub const fn header_format(&self) -> HeaderFormat {
        if self.is_legacy() {
            HeaderFormat::Legacy
        } else {
            HeaderFormat::Extended
        }
    }
}

impl Default for SerializationContext {
    fn default() -> Self {
        Self::network()
    }
}
