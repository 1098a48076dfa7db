pub use bitcoin::hashes::{sha256d::Hash as Sha256Hash, Hash};

use crate::blockdata::block::BlockHash;

/// The hash primitive applied to an encoded block header.
///
/// Headers only guarantee the byte string fed into the primitive; the
/// algorithm itself is chosen by the implementor, which lets consensus
/// parameters swap it per network.
pub trait BlockHasher {
    /// Hashes the encoded header bytes into a block identity hash.
    fn hash_header(&self, encoded_header: &[u8]) -> BlockHash;
}

/// Double SHA-256, the block identity hash of every Alpha network.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct Sha256dHasher;

impl BlockHasher for Sha256dHasher {
    fn hash_header(&self, encoded_header: &[u8]) -> BlockHash {
        BlockHash::hash(encoded_header)
    }
}

impl<T: BlockHasher + ?Sized> BlockHasher for &T {
    fn hash_header(&self, encoded_header: &[u8]) -> BlockHash {
        (**self).hash_header(encoded_header)
    }
}
