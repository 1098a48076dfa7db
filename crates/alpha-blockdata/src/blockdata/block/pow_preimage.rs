//! Proof-of-work preimage.

use super::{BlockHash, Header, Reserved, TxMerkleNode};
use crate::{
    consensus::{encode::serialize, ConsensusCodec},
    pow::CompactTarget,
};

/// The header fields a proof-of-work search hashes, without nonce and
/// solution.
///
/// Always encoded in the extended field order, whatever layout the source
/// header was decoded from. Candidate nonces and solutions are appended by
/// the search itself.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, ConsensusCodec)]
pub struct PowPreimage {
    version: i32,
    prev_blockhash: BlockHash,
    merkle_root: TxMerkleNode,
    height: u32,
    reserved: Reserved,
    time: u32,
    bits: CompactTarget,
}

impl PowPreimage {
    /// Encoded size in bytes.
    pub const SIZE: usize = Header::EXTENDED_FIXED_SIZE - 32; // 108

    /// Copies the preimage fields out of `header`.
    pub fn new(header: &Header) -> Self {
        PowPreimage {
            version: header.version,
            prev_blockhash: header.prev_blockhash,
            merkle_root: header.merkle_root,
            height: header.height,
            reserved: header.reserved,
            time: header.time,
            bits: header.bits,
        }
    }

    /// The encoded preimage.
    pub fn to_bytes(&self) -> Vec<u8> {
        serialize(self)
    }

    /// Block version.
    pub fn version(&self) -> i32 {
        self.version
    }

    /// Hash of the previous block.
    pub fn prev_blockhash(&self) -> BlockHash {
        self.prev_blockhash
    }

    /// Merkle root of the transactions.
    pub fn merkle_root(&self) -> TxMerkleNode {
        self.merkle_root
    }

    /// Block height.
    pub fn height(&self) -> u32 {
        self.height
    }

    /// Reserved words.
    pub fn reserved(&self) -> Reserved {
        self.reserved
    }

    /// Block timestamp.
    pub fn time(&self) -> u32 {
        self.time
    }

    /// Compact difficulty target.
    pub fn bits(&self) -> CompactTarget {
        self.bits
    }
}

impl From<&Header> for PowPreimage {
    fn from(header: &Header) -> Self {
        PowPreimage::new(header)
    }
}
