//! Legacy and extended header layouts.
//!
//! Both layouts start with `version`, `prev_blockhash` and `merkle_root`.
//! The extended layout follows with `height` and the reserved words, and
//! ends with the full 256-bit nonce and the length-prefixed solution. The
//! legacy layout carries a 32-bit nonce only.

use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::trace;

use super::{Header, Nonce, Reserved};
use crate::{
    blockdata::block::{BlockHash, TxMerkleNode},
    consensus::{
        Decodable, DecodeError, Encodable, EncodeDecodeError, EncodeError, VarInt, MAX_VEC_SIZE,
    },
    io::{Error as IoError, Read, Write},
    pow::CompactTarget,
};

/// Largest solution accepted by the extended layout, in bytes.
pub const MAX_SOLUTION_SIZE: usize = MAX_VEC_SIZE;

/// Initial buffer reserved while reading a solution.
const SOLUTION_READ_CHUNK: usize = 32 * 1024;

/// Encodes and decodes a [`Header`] in one byte layout.
pub trait HeaderCodec {
    /// Writes `header` to `writer`, returning the number of bytes written.
    fn encode<W: Write + ?Sized>(&self, header: &Header, writer: &mut W)
        -> Result<usize, EncodeError>;

    /// Reads the fields of this layout from `reader` into `header`.
    ///
    /// Fields outside the layout keep their current value. On error, fields
    /// read before the failure may already be overwritten.
    fn decode_into<R: Read + ?Sized>(
        &self,
        header: &mut Header,
        reader: &mut R,
    ) -> Result<(), DecodeError>;

    /// Decodes a header into a fresh null header.
    fn decode<R: Read + ?Sized>(&self, reader: &mut R) -> Result<Header, DecodeError> {
        let mut header = Header::null();
        self.decode_into(&mut header, reader)?;
        Ok(header)
    }

    /// Number of bytes [`HeaderCodec::encode`] writes for `header`.
    fn encoded_len(&self, header: &Header) -> usize;
}

/// The historical layout with a 32-bit nonce.
///
/// Encoding keeps only the low 32 bits of the nonce. Decoding zero-extends
/// the nonce and leaves `height`, `reserved` and `solution` untouched.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct LegacyHeaderCodec;

/// The current layout: height, reserved words, 256-bit nonce and solution.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct ExtendedHeaderCodec;

impl HeaderCodec for LegacyHeaderCodec {
    fn encode<W: Write + ?Sized>(
        &self,
        header: &Header,
        writer: &mut W,
    ) -> Result<usize, EncodeError> {
        let mut len = write_prefix(header, writer)?;
        len = len.saturating_add(header.time.consensus_encode(writer)?);
        len = len.saturating_add(header.bits.consensus_encode(writer)?);
        len = len.saturating_add(header.nonce.low_u32().consensus_encode(writer)?);
        Ok(len)
    }

    fn decode_into<R: Read + ?Sized>(
        &self,
        header: &mut Header,
        reader: &mut R,
    ) -> Result<(), DecodeError> {
        read_prefix(header, reader)?;
        header.time = u32::consensus_decode(reader)?;
        header.bits = CompactTarget::consensus_decode(reader)?;
        let nonce = u32::consensus_decode(reader)?;
        header.nonce = Nonce::from_u32(nonce);
        trace!(nonce, "Zero-extended legacy nonce");
        Ok(())
    }

    fn encoded_len(&self, _header: &Header) -> usize {
        Header::HEADER_SIZE
    }
}

impl HeaderCodec for ExtendedHeaderCodec {
    fn encode<W: Write + ?Sized>(
        &self,
        header: &Header,
        writer: &mut W,
    ) -> Result<usize, EncodeError> {
        if header.solution.len() > MAX_SOLUTION_SIZE {
            return Err(EncodeError::SolutionTooLarge {
                len: header.solution.len(),
                max: MAX_SOLUTION_SIZE,
            });
        }
        Ok(write_extended(header, writer)?)
    }

    fn decode_into<R: Read + ?Sized>(
        &self,
        header: &mut Header,
        reader: &mut R,
    ) -> Result<(), DecodeError> {
        read_prefix(header, reader)?;
        header.height = u32::consensus_decode(reader)?;
        header.reserved = Reserved::consensus_decode(reader)?;
        header.time = u32::consensus_decode(reader)?;
        header.bits = CompactTarget::consensus_decode(reader)?;
        header.nonce = Nonce::consensus_decode(reader)?;
        header.solution = read_solution(reader)?;
        Ok(())
    }

    fn encoded_len(&self, header: &Header) -> usize {
        let solution_len = header.solution.len();
        Header::EXTENDED_FIXED_SIZE
            .saturating_add(varint_len(solution_len))
            .saturating_add(solution_len)
    }
}

/// Writes the extended layout without checking the solution size.
pub(super) fn write_extended<W: Write + ?Sized>(
    header: &Header,
    writer: &mut W,
) -> Result<usize, IoError> {
    let mut len = write_prefix(header, writer)?;
    len = len.saturating_add(header.height.consensus_encode(writer)?);
    len = len.saturating_add(header.reserved.consensus_encode(writer)?);
    len = len.saturating_add(header.time.consensus_encode(writer)?);
    len = len.saturating_add(header.bits.consensus_encode(writer)?);
    len = len.saturating_add(header.nonce.consensus_encode(writer)?);
    len = len.saturating_add(header.solution.consensus_encode(writer)?);
    Ok(len)
}

fn write_prefix<W: Write + ?Sized>(header: &Header, writer: &mut W) -> Result<usize, IoError> {
    let mut len = header.version.consensus_encode(writer)?;
    len = len.saturating_add(header.prev_blockhash.consensus_encode(writer)?);
    len = len.saturating_add(header.merkle_root.consensus_encode(writer)?);
    Ok(len)
}

fn read_prefix<R: Read + ?Sized>(
    header: &mut Header,
    reader: &mut R,
) -> Result<(), EncodeDecodeError> {
    header.version = i32::consensus_decode(reader)?;
    header.prev_blockhash = BlockHash::consensus_decode(reader)?;
    header.merkle_root = TxMerkleNode::consensus_decode(reader)?;
    Ok(())
}

fn read_solution<R: Read + ?Sized>(reader: &mut R) -> Result<Vec<u8>, DecodeError> {
    let VarInt(len) = VarInt::consensus_decode(reader)?;
    let declared = usize::try_from(len)
        .ok()
        .filter(|declared| *declared <= MAX_SOLUTION_SIZE)
        .ok_or(DecodeError::SolutionTooLarge {
            len,
            max: MAX_SOLUTION_SIZE,
        })?;

    // Grow with the data actually read so a large prefix on a short input
    // does not allocate the declared size up front.
    let mut solution = Vec::with_capacity(declared.min(SOLUTION_READ_CHUNK));
    Read::take(&mut *reader, len).read_to_end(&mut solution)?;
    if solution.len() < declared {
        return Err(DecodeError::SolutionTruncated { declared });
    }
    Ok(solution)
}

/// Width of the CompactSize prefix for a length of `n`.
const fn varint_len(n: usize) -> usize {
    match n {
        0..=0xfc => 1,
        0xfd..=0xffff => 3,
        0x1_0000..=0xffff_ffff => 5,
        _ => 9,
    }
}

/// Error returned when parsing a [`HeaderFormat`] from a string.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Invalid header format: {0} (expected `legacy` or `extended`)")]
pub struct HeaderFormatError(String);

/// Selects the header layout used by a codec call.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HeaderFormat {
    /// The historical layout with a 32-bit nonce.
    Legacy,
    /// The current layout with height, reserved words, 256-bit nonce and solution.
    #[default]
    Extended,
}

impl HeaderFormat {
    /// The lowercase name of the format.
    pub const fn as_str(&self) -> &'static str {
        match self {
            HeaderFormat::Legacy => "legacy",
            HeaderFormat::Extended => "extended",
        }
    }
}

impl HeaderCodec for HeaderFormat {
    fn encode<W: Write + ?Sized>(
        &self,
        header: &Header,
        writer: &mut W,
    ) -> Result<usize, EncodeError> {
        match self {
            HeaderFormat::Legacy => LegacyHeaderCodec.encode(header, writer),
            HeaderFormat::Extended => ExtendedHeaderCodec.encode(header, writer),
        }
    }

    fn decode_into<R: Read + ?Sized>(
        &self,
        header: &mut Header,
        reader: &mut R,
    ) -> Result<(), DecodeError> {
        trace!(format = %self, "Decoding block header");
        match self {
            HeaderFormat::Legacy => LegacyHeaderCodec.decode_into(header, reader),
            HeaderFormat::Extended => ExtendedHeaderCodec.decode_into(header, reader),
        }
    }

    fn encoded_len(&self, header: &Header) -> usize {
        match self {
            HeaderFormat::Legacy => LegacyHeaderCodec.encoded_len(header),
            HeaderFormat::Extended => ExtendedHeaderCodec.encoded_len(header),
        }
    }
}

impl fmt::Display for HeaderFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for HeaderFormat {
    type Err = HeaderFormatError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "legacy" => Ok(HeaderFormat::Legacy),
            "extended" => Ok(HeaderFormat::Extended),
            _ => Err(HeaderFormatError(s.to_string())),
        }
    }
}
