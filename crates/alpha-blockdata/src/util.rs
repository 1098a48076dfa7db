use hex::FromHex;

use crate::{
    blockdata::block::{BlockHash, TxMerkleNode},
    hashes::Hash,
};

/// Convert a hex string to a 32-byte hash type, in internal byte order.
pub fn hex_to_hash<T>(hex: &str) -> Result<T, hex::FromHexError>
where
    T: Hash<Bytes = [u8; 32]>,
{
    let bytes = <[u8; 32]>::from_hex(hex)?;
    Ok(T::from_byte_array(bytes))
}

/// Convert a hex string to a BlockHash.
/// The hex string is taken in internal byte order, i.e. reversed relative to
/// the usual display form.
pub fn hex_to_blockhash(hex: &str) -> Result<BlockHash, hex::FromHexError> {
    hex_to_hash(hex)
}

/// Convert a hex string to a TxMerkleNode, in internal byte order.
pub fn hex_to_merkle_node(hex: &str) -> Result<TxMerkleNode, hex::FromHexError> {
    hex_to_hash(hex)
}


#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hex_to_blockhash() {
        let hex = "00000000839a8e6886ab5951d76f411475428afc90947ee320161bbf18eb6048";
        let blockhash = hex_to_blockhash(hex).unwrap();
        // Hashes are displayed in reverse byte order
        assert_eq!(
            blockhash.to_string(),
            "4860eb18bf1b1620e37e9490fc8a427514416fd75159ab86688e9a8300000000"
        );
    }

    #[test]
    fn test_hex_to_merkle_node() {
        let node = hex_to_merkle_node(&"ab".repeat(32)).unwrap();
        assert_eq!(node.to_byte_array(), [0xab; 32]);
    }

    #[test]
    fn test_invalid_hex() {
        assert!(hex_to_blockhash("invalid_hex").is_err());
        assert!(hex_to_merkle_node("abcd").is_err());
    }

    #[test]
    fn test_scenario_fixtures_agree() {
        let header = test_util::scenario_header();
        assert_eq!(
            hex::encode(header.serialize_with(crate::HeaderFormat::Extended).unwrap()),
            test_util::SCENARIO_EXTENDED_HEX
        );
    }
}
