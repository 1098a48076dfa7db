//! Blocks and their headers.
//!
//! A [`Block`] owns a [`Header`] and the transactions that follow it on the
//! wire. The header layout is chosen per call with [`HeaderFormat`].

mod header;
mod pow_preimage;

use std::{cell::Cell, fmt};

pub use bitcoin::{BlockHash, TxMerkleNode};
pub use header::{
    ExtendedHeaderCodec, Header, HeaderCodec, HeaderFormat, HeaderFormatError, LegacyHeaderCodec,
    Nonce, Reserved, MAX_SOLUTION_SIZE, RESERVED_WORDS,
};
pub use pow_preimage::PowPreimage;
use tracing::trace;

use crate::{
    blockdata::transaction::Transaction,
    consensus::{Decodable, DecodeError, Encodable, EncodeDecodeError, EncodeError},
    io::{Error as IoError, Read, Write},
};

/// A block: a header followed by its transactions.
///
/// The block owns its header by value. The `checked` flag is a memo for an
/// external validator; it is never encoded and is ignored by equality.
/// Because the flag uses a [`Cell`], a `Block` is not `Sync` and callers
/// sharing one across threads must synchronize themselves.
#[derive(Clone, Debug, Default)]
pub struct Block {
    /// The block header
    pub header: Header,
    /// List of transactions contained in the block
    pub transactions: Vec<Transaction>,
    checked: Cell<bool>,
}

impl Block {
    /// Creates a block from a header and its transactions.
    pub fn new(header: Header, transactions: Vec<Transaction>) -> Self {
        Block {
            header,
            transactions,
            checked: Cell::new(false),
        }
    }

    /// A block with a null header and no transactions.
    pub fn null() -> Self {
        Block::new(Header::null(), Vec::new())
    }

    /// Nulls the header, drops the transactions and clears the checked flag.
    pub fn set_null(&mut self) {
        self.header.set_null();
        self.transactions.clear();
        self.checked.set(false);
    }

    /// Gets a reference to the block header
    pub fn header(&self) -> &Header {
        &self.header
    }

    /// Returns a copy of the header, detached from the block.
    pub fn block_header(&self) -> Header {
        self.header.clone()
    }

    /// Adds a transaction to the block
    pub fn add_transaction(&mut self, tx: Transaction) {
        self.transactions.push(tx);
    }

    /// Gets the number of transactions in the block
    pub fn transaction_count(&self) -> usize {
        self.transactions.len()
    }

    /// Gets a reference to the transactions
    pub fn transactions(&self) -> &[Transaction] {
        &self.transactions
    }

    /// Gets a mutable reference to the transactions
    pub fn transactions_mut(&mut self) -> &mut Vec<Transaction> {
        &mut self.transactions
    }

    /// Returns true if a validator has marked the block as checked.
    pub fn is_checked(&self) -> bool {
        self.checked.get()
    }

    /// Sets the validator memo.
    pub fn set_checked(&self, checked: bool) {
        self.checked.set(checked);
    }

    /// The block identity hash, taken from the header.
    pub fn block_hash(&self) -> BlockHash {
        self.header.block_hash()
    }

    /// Encodes the header in `format` followed by the transaction list.
    pub fn consensus_encode_with<W: Write + ?Sized>(
        &self,
        format: HeaderFormat,
        writer: &mut W,
    ) -> Result<usize, EncodeError> {
        let mut len = self.header.consensus_encode_with(format, writer)?;
        len = len.saturating_add(self.transactions.consensus_encode(writer)?);
        Ok(len)
    }

    /// Decodes a header in `format` followed by the transaction list.
    pub fn consensus_decode_with<R: Read + ?Sized>(
        format: HeaderFormat,
        reader: &mut R,
    ) -> Result<Self, DecodeError> {
        let header = Header::consensus_decode_with(format, reader)?;
        let transactions = Vec::<Transaction>::consensus_decode(reader)?;
        trace!(%format, tx_count = transactions.len(), "Decoded block");
        Ok(Block::new(header, transactions))
    }
}

impl From<Header> for Block {
    fn from(header: Header) -> Self {
        Block::new(header, Vec::new())
    }
}

impl PartialEq for Block {
    fn eq(&self, other: &Self) -> bool {
        self.header == other.header && self.transactions == other.transactions
    }
}

impl Eq for Block {}

impl fmt::Display for Block {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Block({}, vtx={})", self.header, self.transactions.len())?;
        for tx in &self.transactions {
            writeln!(f, "  {}", tx.txid())?;
        }
        Ok(())
    }
}

/// Encodes with the extended header layout. An oversized solution surfaces
/// as an `InvalidInput` I/O error; `bitcoin`'s `serialize` panics on it, so
/// use [`Block::consensus_encode_with`] where the solution is untrusted.
impl Encodable for Block {
    fn consensus_encode<W: Write + ?Sized>(&self, writer: &mut W) -> Result<usize, IoError> {
        Ok(self.consensus_encode_with(HeaderFormat::Extended, writer)?)
    }
}

impl Decodable for Block {
    fn consensus_decode<R: Read + ?Sized>(reader: &mut R) -> Result<Self, EncodeDecodeError> {
        Ok(Block::consensus_decode_with(HeaderFormat::Extended, reader)?)
    }
}

#[cfg(test)]
mod tests {
    use std::error::Error;

    use bitcoin::{absolute::LockTime, transaction::Version, Amount, ScriptBuf, TxIn, TxOut};

    use super::*;
    use crate::{
        consensus::encode::{deserialize, serialize},
        io::Cursor,
        util::test_util::{scenario_header, SCENARIO_EXTENDED_HEX, SCENARIO_LEGACY_HEX},
    };

    fn sample_tx(value: u64) -> Transaction {
        Transaction {
            version: Version::ONE,
            lock_time: LockTime::ZERO,
            input: vec![TxIn::default()],
            output: vec![TxOut {
                value: Amount::from_sat(value),
                script_pubkey: ScriptBuf::new(),
            }],
        }
    }

    #[test]
    fn test_block_from_header() {
        let header = scenario_header();
        let block = Block::from(header.clone());

        assert_eq!(block.header(), &header);
        assert_eq!(block.transaction_count(), 0);
        assert!(!block.is_checked());
        assert_eq!(block.block_hash(), header.block_hash());
    }

    #[test]
    fn test_header_view_is_a_copy() {
        let mut block = Block::from(scenario_header());
        let view = block.block_header();
        block.header.height = 1;

        assert_eq!(view.height, 12345);
        assert_ne!(view, block.header);
    }

    #[test]
    fn test_set_null() {
        let mut block = Block::new(scenario_header(), vec![sample_tx(1)]);
        block.set_checked(true);

        block.set_null();
        assert!(block.header.is_null());
        assert!(block.transactions().is_empty());
        assert!(!block.is_checked());
        assert_eq!(block, Block::null());
    }

    #[test]
    fn test_checked_flag_ignored() -> Result<(), Box<dyn Error>> {
        let block = Block::new(scenario_header(), vec![sample_tx(50)]);
        let copy = block.clone();
        block.set_checked(true);

        assert_eq!(block, copy);
        assert_eq!(serialize(&block), serialize(&copy));

        let decoded: Block = deserialize(&serialize(&block))?;
        assert!(!decoded.is_checked());
        Ok(())
    }

    #[test]
    fn test_extended_block_layout() -> Result<(), Box<dyn Error>> {
        let mut block = Block::from(scenario_header());
        block.add_transaction(sample_tx(7));
        block.transactions_mut().push(sample_tx(8));

        let encoded = serialize(&block);
        let header_len = block.header.encoded_len(HeaderFormat::Extended);
        assert_eq!(hex::encode(&encoded[..header_len]), SCENARIO_EXTENDED_HEX);
        assert_eq!(encoded[header_len], 2, "transaction count");
        assert_eq!(&encoded[header_len + 1..], &serialize(&block.transactions)[1..]);

        let decoded = Block::consensus_decode_with(HeaderFormat::Extended, &mut Cursor::new(&encoded))?;
        assert_eq!(decoded, block);
        Ok(())
    }

    #[test]
    fn test_legacy_block_round_trip() -> Result<(), Box<dyn Error>> {
        let block = Block::new(scenario_header(), vec![sample_tx(21)]);

        let mut encoded = Vec::new();
        let written = block.consensus_encode_with(HeaderFormat::Legacy, &mut encoded)?;
        assert_eq!(written, encoded.len());
        assert_eq!(hex::encode(&encoded[..Header::HEADER_SIZE]), SCENARIO_LEGACY_HEX);

        let decoded = Block::consensus_decode_with(HeaderFormat::Legacy, &mut Cursor::new(&encoded))?;
        assert_eq!(decoded.transactions, block.transactions);
        assert_eq!(decoded.header.nonce, block.header.nonce);
        assert_eq!(decoded.header.height, 0);
        Ok(())
    }

    #[test]
    fn test_truncated_transactions() {
        let block = Block::new(scenario_header(), vec![sample_tx(21)]);
        let encoded = serialize(&block);

        let result = Block::consensus_decode_with(
            HeaderFormat::Extended,
            &mut Cursor::new(&encoded[..encoded.len() - 1]),
        );
        assert!(matches!(result, Err(DecodeError::Consensus(_))));
    }

    #[test]
    fn test_display_lists_txids() {
        let tx = sample_tx(3);
        let block = Block::new(scenario_header(), vec![tx.clone()]);
        let shown = block.to_string();

        assert!(shown.contains("vtx=1"));
        assert!(shown.contains(&tx.txid().to_string()));
    }
}
