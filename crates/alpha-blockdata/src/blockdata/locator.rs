//! Block locators.
//!
//! A locator describes a position in the chain to a peer as a list of
//! ancestor block hashes. The peer answers from the first hash it knows.

use tracing::trace;

use crate::{
    blockdata::block::BlockHash,
    consensus::{
        Decodable, DecodeError, Encodable, EncodeDecodeError, EncodeError, SerializationContext,
    },
    hashes::{BlockHasher, Sha256dHasher},
    io::{Error as IoError, Read, Write},
};

/// An ordered list of ancestor block hashes.
///
/// Ordering is the caller's convention; the locator stores the hashes as
/// given. An empty locator is null.
///
/// ## Encoding
///
/// 1. `version` (4 bytes): the stream version, omitted in hash-only streams.
/// 2. `hashes_count` (1-9 bytes, varint): number of hashes.
/// 3. `hashes` (32 bytes each).
///
/// The version is read back only to keep the stream aligned and is then
/// dropped.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct BlockLocator {
    hashes: Vec<BlockHash>,
}

impl BlockLocator {
    /// Creates a locator from a list of block hashes.
    pub fn new(hashes: Vec<BlockHash>) -> Self {
        BlockLocator { hashes }
    }

    /// Returns the hashes of the locator.
    pub fn hashes(&self) -> &[BlockHash] {
        &self.hashes
    }

    /// Number of hashes.
    pub fn len(&self) -> usize {
        self.hashes.len()
    }

    /// Returns true if the locator holds no hashes.
    pub fn is_empty(&self) -> bool {
        self.hashes.is_empty()
    }

    /// Same as [`BlockLocator::is_empty`].
    pub fn is_null(&self) -> bool {
        self.is_empty()
    }

    /// Drops every hash.
    pub fn set_null(&mut self) {
        self.hashes.clear();
    }

    /// Encodes the locator for the stream described by `ctx`.
    ///
    /// The version field is the context's version, flag bits included, and
    /// is left out entirely for hash-only contexts.
    pub fn consensus_encode_with<W: Write + ?Sized>(
        &self,
        ctx: SerializationContext,
        writer: &mut W,
    ) -> Result<usize, EncodeError> {
        let mut len: usize = 0;
        if !ctx.is_get_hash() {
            len = len.saturating_add(ctx.version().consensus_encode(writer)?);
        }
        len = len.saturating_add(self.hashes.consensus_encode(writer)?);
        Ok(len)
    }

    /// Decodes a locator from the stream described by `ctx`.
    pub fn consensus_decode_with<R: Read + ?Sized>(
        ctx: SerializationContext,
        reader: &mut R,
    ) -> Result<Self, DecodeError> {
        if !ctx.is_get_hash() {
            let version = i32::consensus_decode(reader)?;
            trace!(version, "Discarding locator version");
        }
        let hashes = Vec::<BlockHash>::consensus_decode(reader)?;
        Ok(BlockLocator { hashes })
    }

    /// Hash of the hash-only encoding, which identifies the locator's
    /// contents independently of the stream version.
    pub fn locator_hash(&self) -> BlockHash {
        let mut encoded = Vec::new();
        #[allow(clippy::expect_used, reason = "Writing into a Vec can't fail")]
        self.hashes
            .consensus_encode(&mut encoded)
            .expect("Writing into a Vec can't fail");
        Sha256dHasher.hash_header(&encoded)
    }
}

impl From<Vec<BlockHash>> for BlockLocator {
    fn from(hashes: Vec<BlockHash>) -> Self {
        BlockLocator::new(hashes)
    }
}

impl Encodable for BlockLocator {
    fn consensus_encode<W: Write + ?Sized>(&self, writer: &mut W) -> Result<usize, IoError> {
        Ok(self.consensus_encode_with(SerializationContext::network(), writer)?)
    }
}

impl Decodable for BlockLocator {
    fn consensus_decode<R: Read + ?Sized>(reader: &mut R) -> Result<Self, EncodeDecodeError> {
        Ok(BlockLocator::consensus_decode_with(
            SerializationContext::network(),
            reader,
        )?)
    }
}
