//! Alpha block header.
//!
//! A single [`Header`] type holds every field of both layouts. Which fields
//! reach the wire is decided by the [`HeaderCodec`] the caller picks, while
//! the block identity hash is always taken over the extended layout.

mod codec;

use std::fmt;

pub use codec::{
    ExtendedHeaderCodec, HeaderCodec, HeaderFormat, HeaderFormatError, LegacyHeaderCodec,
    MAX_SOLUTION_SIZE,
};
use hex::FromHex;
use serde::{de, Deserialize, Deserializer, Serialize, Serializer};

use super::{BlockHash, PowPreimage, TxMerkleNode};
use crate::{
    consensus::{Decodable, DecodeError, Encodable, EncodeDecodeError, EncodeError, Params},
    hashes::{BlockHasher, Hash, Sha256dHasher},
    io::{Error as IoError, Read, Write},
    pow::{CompactTarget, Target},
};

/// Number of reserved words in an extended header.
pub const RESERVED_WORDS: usize = 7;

/// Forward-compatibility words carried by the extended layout.
///
/// Always exactly [`RESERVED_WORDS`] long, zero unless a future rule
/// assigns them.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
pub struct Reserved([u32; RESERVED_WORDS]);

impl Reserved {
    /// All words zero.
    pub const ZERO: Self = Reserved([0; RESERVED_WORDS]);

    /// Wraps a full set of reserved words.
    pub const fn new(words: [u32; RESERVED_WORDS]) -> Self {
        Reserved(words)
    }

    /// The words in encoding order.
    pub const fn words(&self) -> &[u32; RESERVED_WORDS] {
        &self.0
    }

    /// Returns true if every word is zero.
    pub fn is_zero(&self) -> bool {
        self.0.iter().all(|word| *word == 0)
    }
}

impl From<[u32; RESERVED_WORDS]> for Reserved {
    fn from(words: [u32; RESERVED_WORDS]) -> Self {
        Reserved(words)
    }
}

impl TryFrom<&[u32]> for Reserved {
    type Error = DecodeError;

    fn try_from(words: &[u32]) -> Result<Self, Self::Error> {
        <[u32; RESERVED_WORDS]>::try_from(words)
            .map(Reserved)
            .map_err(|_| DecodeError::ReservedLength {
                expected: RESERVED_WORDS,
                actual: words.len(),
            })
    }
}

impl Encodable for Reserved {
    fn consensus_encode<W: Write + ?Sized>(&self, writer: &mut W) -> Result<usize, IoError> {
        let mut len: usize = 0;
        for word in &self.0 {
            len = len.saturating_add(word.consensus_encode(writer)?);
        }
        Ok(len)
    }
}

impl Decodable for Reserved {
    fn consensus_decode<R: Read + ?Sized>(reader: &mut R) -> Result<Self, EncodeDecodeError> {
        let mut words = [0u32; RESERVED_WORDS];
        for word in &mut words {
            *word = u32::consensus_decode(reader)?;
        }
        Ok(Reserved(words))
    }
}

/// The 256-bit header nonce.
///
/// Stored as 32 little-endian bytes, which is also its encoding. Displayed
/// and serialized as big-endian hex.
#[derive(Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Nonce([u8; 32]);

impl Nonce {
    /// The zero nonce.
    pub const ZERO: Self = Nonce([0; 32]);

    /// Creates a nonce from its little-endian bytes.
    pub const fn from_le_bytes(bytes: [u8; 32]) -> Self {
        Nonce(bytes)
    }

    /// The little-endian bytes of the nonce.
    pub const fn to_le_bytes(self) -> [u8; 32] {
        self.0
    }

    /// Zero-extends a 32-bit nonce.
    pub fn from_u32(value: u32) -> Self {
        let mut bytes = [0u8; 32];
        for (dst, src) in bytes.iter_mut().zip(value.to_le_bytes()) {
            *dst = src;
        }
        Nonce(bytes)
    }

    /// The low 32 bits of the nonce.
    pub fn low_u32(&self) -> u32 {
        let [b0, b1, b2, b3, ..] = self.0;
        u32::from_le_bytes([b0, b1, b2, b3])
    }

    /// Returns true if any bit above the low 32 is set.
    pub fn has_high_bits(&self) -> bool {
        self.0.iter().skip(4).any(|byte| *byte != 0)
    }

    /// Returns true if the nonce is zero.
    pub fn is_zero(&self) -> bool {
        self.0.iter().all(|byte| *byte == 0)
    }

    /// Parses a big-endian hex string of exactly 64 digits.
    pub fn from_hex(s: &str) -> Result<Self, hex::FromHexError> {
        let mut bytes = <[u8; 32]>::from_hex(s)?;
        bytes.reverse();
        Ok(Nonce(bytes))
    }

    /// The big-endian hex form of the nonce.
    pub fn to_hex(&self) -> String {
        let mut bytes = self.0;
        bytes.reverse();
        hex::encode(bytes)
    }
}

impl From<u32> for Nonce {
    fn from(value: u32) -> Self {
        Nonce::from_u32(value)
    }
}

impl fmt::Display for Nonce {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}

impl fmt::Debug for Nonce {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Nonce({})", self.to_hex())
    }
}

impl Serialize for Nonce {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_hex())
    }
}

impl<'de> Deserialize<'de> for Nonce {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        Nonce::from_hex(&s).map_err(de::Error::custom)
    }
}

impl Encodable for Nonce {
    fn consensus_encode<W: Write + ?Sized>(&self, writer: &mut W) -> Result<usize, IoError> {
        self.0.consensus_encode(writer)
    }
}

impl Decodable for Nonce {
    fn consensus_decode<R: Read + ?Sized>(reader: &mut R) -> Result<Self, EncodeDecodeError> {
        Ok(Nonce(<[u8; 32]>::consensus_decode(reader)?))
    }
}

/// Alpha block header.
///
/// `bits == 0` marks a null header, whatever the other fields hold.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Header {
    /// Block version, selects the consensus rules.
    pub version: i32,
    /// Hash of the previous block.
    pub prev_blockhash: BlockHash,
    /// Merkle root of the block's transactions.
    pub merkle_root: TxMerkleNode,
    /// Block height. Extended layout only.
    pub height: u32,
    /// Reserved words. Extended layout only.
    pub reserved: Reserved,
    /// Block timestamp, as claimed by the miner.
    pub time: u32,
    /// Compact difficulty target.
    pub bits: CompactTarget,
    /// Proof-of-work nonce. The legacy layout keeps the low 32 bits.
    pub nonce: Nonce,
    /// Proof-of-work solution. Extended layout only.
    #[serde(with = "hex::serde")]
    pub solution: Vec<u8>,
}

impl Header {
    /// Size of the legacy-compatible field subset: version, previous hash,
    /// merkle root, time, bits and a 32-bit word.
    pub const HEADER_SIZE: usize = 4 + 32 + 32 + 4 + 4 + 4; // 80

    /// Size of the extended layout up to, not including, the solution's
    /// length prefix.
    pub const EXTENDED_FIXED_SIZE: usize = 4 + 32 + 32 + 4 + 4 * RESERVED_WORDS + 4 + 4 + 32; // 140

    /// A null header: every field zero, `bits == 0`.
    pub fn null() -> Self {
        Header {
            version: 0,
            prev_blockhash: BlockHash::all_zeros(),
            merkle_root: TxMerkleNode::all_zeros(),
            height: 0,
            reserved: Reserved::ZERO,
            time: 0,
            bits: CompactTarget::from_consensus(0),
            nonce: Nonce::ZERO,
            solution: Vec::new(),
        }
    }

    /// Resets every field to zero.
    pub fn set_null(&mut self) {
        *self = Header::null();
    }

    /// Returns true if the header is uninitialized (`bits == 0`).
    pub fn is_null(&self) -> bool {
        self.bits.to_consensus() == 0
    }

    /// The block timestamp widened to `i64`.
    pub fn block_time(&self) -> i64 {
        i64::from(self.time)
    }

    /// Computes the block identity hash.
    ///
    /// The hash is the double SHA-256 of the extended encoding, whichever
    /// layout the header was decoded from.
    pub fn block_hash(&self) -> BlockHash {
        self.block_hash_with(&Sha256dHasher)
    }

    /// Computes the block identity hash with the hasher of `params`.
    pub fn block_hash_with_params(&self, params: &Params) -> BlockHash {
        self.block_hash_with(params)
    }

    /// Hashes the extended encoding with a caller-supplied primitive.
    pub fn block_hash_with<H: BlockHasher + ?Sized>(&self, hasher: &H) -> BlockHash {
        let mut encoded = Vec::with_capacity(self.encoded_len(HeaderFormat::Extended));
        #[allow(clippy::expect_used, reason = "Writing into a Vec can't fail")]
        codec::write_extended(self, &mut encoded).expect("Writing into a Vec can't fail");
        hasher.hash_header(&encoded)
    }

    /// Expands `bits` into the full target.
    ///
    /// # Returns
    ///
    /// * `Some(Target)` - The expanded target
    /// * `None` - If `bits` is negative, zero or overflows 256 bits
    pub fn target(&self) -> Option<Target> {
        Target::from_compact(self.bits)
    }

    /// Difficulty of `bits` relative to the network's maximum target.
    pub fn difficulty(&self, params: &Params) -> Option<u128> {
        self.target()?.difficulty(params.max_attainable_target)
    }

    /// The proof-of-work preimage of this header.
    pub fn pow_preimage(&self) -> PowPreimage {
        PowPreimage::from(self)
    }

    /// Number of bytes the header occupies in `format`.
    pub fn encoded_len(&self, format: HeaderFormat) -> usize {
        format.encoded_len(self)
    }

    /// Encodes the header in `format`.
    pub fn consensus_encode_with<W: Write + ?Sized>(
        &self,
        format: HeaderFormat,
        writer: &mut W,
    ) -> Result<usize, EncodeError> {
        format.encode(self, writer)
    }

    /// Decodes a header in `format`.
    ///
    /// Fields the layout does not carry are left null.
    pub fn consensus_decode_with<R: Read + ?Sized>(
        format: HeaderFormat,
        reader: &mut R,
    ) -> Result<Self, DecodeError> {
        format.decode(reader)
    }

    /// Decodes the fields of `format` into this header.
    ///
    /// Fields the layout does not carry keep their current value.
    pub fn decode_into<R: Read + ?Sized>(
        &mut self,
        format: HeaderFormat,
        reader: &mut R,
    ) -> Result<(), DecodeError> {
        format.decode_into(self, reader)
    }

    /// Encodes the header in `format` into a new buffer.
    pub fn serialize_with(&self, format: HeaderFormat) -> Result<Vec<u8>, EncodeError> {
        let mut buf = Vec::with_capacity(self.encoded_len(format));
        self.consensus_encode_with(format, &mut buf)?;
        Ok(buf)
    }
}

impl Default for Header {
    fn default() -> Self {
        Header::null()
    }
}

impl fmt::Display for Header {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Header(hash={}, ver=0x{:08x}, prev={}, merkle={}, height={}, time={}, bits={:08x}, nonce={}, solution={} bytes)",
            self.block_hash(),
            self.version,
            self.prev_blockhash,
            self.merkle_root,
            self.height,
            self.time,
            self.bits.to_consensus(),
            self.nonce,
            self.solution.len(),
        )
    }
}

/// Encodes the extended layout.
///
/// A solution above [`MAX_SOLUTION_SIZE`] is reported as an `InvalidInput`
/// I/O error. `bitcoin`'s `serialize` treats any encoding error as a bug and
/// panics, so callers that need [`EncodeError::SolutionTooLarge`] use
/// [`Header::serialize_with`] or [`Header::consensus_encode_with`].
impl Encodable for Header {
    fn consensus_encode<W: Write + ?Sized>(&self, writer: &mut W) -> Result<usize, IoError> {
        Ok(ExtendedHeaderCodec.encode(self, writer)?)
    }
}

impl Decodable for Header {
    fn consensus_decode<R: Read + ?Sized>(reader: &mut R) -> Result<Self, EncodeDecodeError> {
        Ok(ExtendedHeaderCodec.decode(reader)?)
    }
}

#[cfg(test)]
mod tests {
    use std::error::Error;

    use super::*;
    use crate::{
        consensus::encode::{deserialize, serialize},
        hashes::Sha256Hash,
        io::Cursor,
        util::test_util::{scenario_header, SCENARIO_EXTENDED_HEX, SCENARIO_LEGACY_HEX},
    };

    #[test]
    fn test_null_header() {
        let mut header = Header::null();
        assert!(header.is_null());
        assert_eq!(header, Header::default());
        assert_eq!(header.nonce, Nonce::ZERO);
        assert!(header.reserved.is_zero());

        header.version = 4;
        header.time = 1_600_000_000;
        assert!(header.is_null(), "only bits decide nullness");

        header.bits = CompactTarget::from_consensus(0x1d00ffff);
        assert!(!header.is_null());

        header.set_null();
        assert_eq!(header, Header::null());
    }

    #[test]
    fn test_block_time_widens() {
        let mut header = scenario_header();
        header.time = u32::MAX;
        assert_eq!(header.block_time(), 4_294_967_295);
    }

    #[test]
    fn test_extended_scenario_round_trip() -> Result<(), Box<dyn Error>> {
        let header = scenario_header();

        let encoded = header.serialize_with(HeaderFormat::Extended)?;
        assert_eq!(hex::encode(&encoded), SCENARIO_EXTENDED_HEX);
        assert_eq!(encoded.len(), 141);
        assert_eq!(encoded.len(), header.encoded_len(HeaderFormat::Extended));

        let decoded =
            Header::consensus_decode_with(HeaderFormat::Extended, &mut Cursor::new(&encoded))?;
        assert_eq!(decoded, header);
        assert!(!decoded.is_null());
        Ok(())
    }

    #[test]
    fn test_legacy_layout() -> Result<(), Box<dyn Error>> {
        let header = scenario_header();

        let encoded = header.serialize_with(HeaderFormat::Legacy)?;
        assert_eq!(hex::encode(&encoded), SCENARIO_LEGACY_HEX);
        assert_eq!(encoded.len(), Header::HEADER_SIZE);

        let decoded =
            Header::consensus_decode_with(HeaderFormat::Legacy, &mut Cursor::new(&encoded))?;
        assert_eq!(decoded.version, header.version);
        assert_eq!(decoded.prev_blockhash, header.prev_blockhash);
        assert_eq!(decoded.merkle_root, header.merkle_root);
        assert_eq!(decoded.time, header.time);
        assert_eq!(decoded.bits, header.bits);
        assert_eq!(decoded.nonce, header.nonce);
        assert_eq!(decoded.height, 0);
        assert!(decoded.reserved.is_zero());
        assert!(decoded.solution.is_empty());
        Ok(())
    }

    #[test]
    fn test_legacy_nonce_narrowing() -> Result<(), Box<dyn Error>> {
        let mut header = scenario_header();
        let mut wide = [0u8; 32];
        wide[0] = 0x78;
        wide[1] = 0x56;
        wide[2] = 0x34;
        wide[3] = 0x12;
        wide[31] = 0xff;
        header.nonce = Nonce::from_le_bytes(wide);
        assert!(header.nonce.has_high_bits());

        let encoded = header.serialize_with(HeaderFormat::Legacy)?;
        assert_eq!(&encoded[76..], &[0x78, 0x56, 0x34, 0x12]);

        let decoded =
            Header::consensus_decode_with(HeaderFormat::Legacy, &mut Cursor::new(&encoded))?;
        assert_eq!(decoded.nonce.low_u32(), 0x1234_5678);
        assert!(!decoded.nonce.has_high_bits());
        assert_eq!(decoded.nonce, Nonce::from_u32(0x1234_5678));
        Ok(())
    }

    #[test]
    fn test_legacy_decode_keeps_extended_fields() -> Result<(), Box<dyn Error>> {
        let encoded = hex::decode(SCENARIO_LEGACY_HEX)?;

        let mut header = Header::null();
        header.height = 7;
        header.reserved = Reserved::new([1, 2, 3, 4, 5, 6, 7]);
        header.solution = vec![0xde, 0xad];
        header.decode_into(HeaderFormat::Legacy, &mut Cursor::new(&encoded))?;

        assert_eq!(header.height, 7);
        assert_eq!(header.reserved.words(), &[1, 2, 3, 4, 5, 6, 7]);
        assert_eq!(header.solution, vec![0xde, 0xad]);
        assert_eq!(header.time, 1_600_000_000);
        assert_eq!(header.nonce, Nonce::from_u32(1));
        Ok(())
    }

    #[test]
    fn test_hash_uses_extended_layout() -> Result<(), Box<dyn Error>> {
        let header = scenario_header();
        let extended = hex::decode(SCENARIO_EXTENDED_HEX)?;
        let expected = BlockHash::from_byte_array(Sha256Hash::hash(&extended).to_byte_array());
        assert_eq!(header.block_hash(), expected);
        assert_eq!(
            header.block_hash(),
            "058eb317521ad19f10a110e34d718c2d65ade86bfe33d9ae3ff2bdb1f3d8c49b".parse::<BlockHash>()?
        );

        // Decoding the legacy bytes into a header that already holds the
        // extended-only fields yields the same identity.
        let mut from_legacy = Header::null();
        from_legacy.height = header.height;
        from_legacy.decode_into(
            HeaderFormat::Legacy,
            &mut Cursor::new(hex::decode(SCENARIO_LEGACY_HEX)?),
        )?;
        assert_eq!(from_legacy.block_hash(), header.block_hash());

        assert_eq!(header.block_hash_with_params(&Params::MAINNET), header.block_hash());
        assert_eq!(header.block_hash_with(&Sha256dHasher), header.block_hash());
        Ok(())
    }

    #[test]
    fn test_hash_covers_solution() {
        let mut header = scenario_header();
        header.solution = vec![0; 16];
        let first = header.block_hash();
        assert_eq!(first, header.clone().block_hash());
        header.solution.push(0);
        assert_ne!(first, header.block_hash());
    }

    #[test]
    fn test_truncated_header() -> Result<(), Box<dyn Error>> {
        let encoded = hex::decode(SCENARIO_EXTENDED_HEX)?;
        for cut in [0, 3, 50, 100, 139] {
            let result =
                Header::consensus_decode_with(HeaderFormat::Extended, &mut Cursor::new(&encoded[..cut]));
            assert!(
                matches!(result, Err(DecodeError::Consensus(_))),
                "cut at {cut}"
            );
        }

        let legacy = hex::decode(SCENARIO_LEGACY_HEX)?;
        let result =
            Header::consensus_decode_with(HeaderFormat::Legacy, &mut Cursor::new(&legacy[..79]));
        assert!(matches!(result, Err(DecodeError::Consensus(_))));
        Ok(())
    }

    #[test]
    fn test_plain_codec_is_extended() -> Result<(), Box<dyn Error>> {
        let header = scenario_header();
        let bytes = serialize(&header);
        assert_eq!(hex::encode(&bytes), SCENARIO_EXTENDED_HEX);
        let decoded: Header = deserialize(&bytes)?;
        assert_eq!(decoded, header);
        Ok(())
    }

    #[test]
    fn test_plain_encode_reports_oversized_solution() {
        let mut header = scenario_header();
        header.solution = vec![0; MAX_SOLUTION_SIZE + 1];

        let err = header.consensus_encode(&mut Vec::<u8>::new()).unwrap_err();
        assert_eq!(err.kind(), crate::io::ErrorKind::InvalidInput);

        let err = header.serialize_with(HeaderFormat::Extended).unwrap_err();
        assert!(matches!(err, EncodeError::SolutionTooLarge { .. }));
    }

    #[test]
    fn test_target_and_difficulty() {
        let header = scenario_header();
        let target = header.target().unwrap();
        assert_eq!(target.to_compact(), Some(header.bits));
        // 0x0fffff / 0x00ffff, truncated.
        assert_eq!(header.difficulty(&Params::MAINNET), Some(16));

        let mut header = header;
        header.bits = CompactTarget::from_consensus(0x1d0fffff);
        assert_eq!(header.difficulty(&Params::MAINNET), Some(1));

        assert_eq!(Header::null().target(), None);
        assert_eq!(Header::null().difficulty(&Params::MAINNET), None);
    }

    #[test]
    fn test_reserved_length() {
        let words = [0u32; RESERVED_WORDS];
        assert_eq!(Reserved::try_from(&words[..]).unwrap(), Reserved::ZERO);

        let err = Reserved::try_from(&words[..6]).unwrap_err();
        assert!(matches!(
            err,
            DecodeError::ReservedLength {
                expected: 7,
                actual: 6
            }
        ));
        let too_many = [0u32; 8];
        assert!(Reserved::try_from(&too_many[..]).is_err());
    }

    #[test]
    fn test_nonce_hex() -> Result<(), Box<dyn Error>> {
        let nonce = Nonce::from_u32(1);
        assert_eq!(
            nonce.to_string(),
            "0000000000000000000000000000000000000000000000000000000000000001"
        );
        assert_eq!(Nonce::from_hex(&nonce.to_hex())?, nonce);
        assert!(Nonce::from_hex("01").is_err());
        assert_eq!(Nonce::from(0xdead_beef_u32).low_u32(), 0xdead_beef);
        Ok(())
    }

    #[test]
    fn test_header_json() -> Result<(), Box<dyn Error>> {
        let mut header = scenario_header();
        header.solution = vec![0xca, 0xfe];

        let json = serde_json::to_value(&header)?;
        assert_eq!(json["height"], 12345);
        assert_eq!(json["solution"], "cafe");
        assert_eq!(
            json["nonce"],
            "0000000000000000000000000000000000000000000000000000000000000001"
        );

        let back: Header = serde_json::from_value(json)?;
        assert_eq!(back, header);
        Ok(())
    }

    #[test]
    fn test_display() {
        let header = scenario_header();
        let shown = header.to_string();
        assert!(shown.contains(&header.block_hash().to_string()));
        assert!(shown.contains("ver=0x00000004"));
        assert!(shown.contains("bits=1d00ffff"));
        assert!(shown.contains("height=12345"));
    }
}
