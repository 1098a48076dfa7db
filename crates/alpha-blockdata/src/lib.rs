//! Block data primitives for the Unicity Alpha chain.
//!
//! This library defines the consensus byte layouts of Alpha block headers in
//! both the legacy and the extended format, the proof-of-work preimage that
//! miners hash, full blocks, and the block locators exchanged during chain
//! synchronization.

#![cfg_attr(test, allow(clippy::arithmetic_side_effects))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]
#![cfg_attr(test, allow(clippy::cast_sign_loss))]
#![cfg_attr(test, allow(clippy::indexing_slicing))]
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::cast_possible_truncation))]

/// Block, header, preimage and locator data structures.
pub mod blockdata;
/// Consensus encoding, serialization contexts and chain parameters.
pub mod consensus;
/// Hash functions and types used by the chain.
pub mod hashes;
/// I/O traits used by the consensus codecs.
pub mod io;
/// Network types and constants.
pub mod network;
/// Proof of work target arithmetic.
pub mod pow;
/// Various utility functions and types.
pub mod util;

pub use blockdata::{
    block::{
        Block, ExtendedHeaderCodec, Header, HeaderCodec, HeaderFormat, LegacyHeaderCodec, Nonce,
        PowPreimage, Reserved,
    },
    locator::BlockLocator,
};
pub use consensus::{DecodeError, EncodeError, Params, SerializationContext};
pub use network::Network;

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
