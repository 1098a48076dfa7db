/// Block headers, full blocks and the proof-of-work preimage.
pub mod block;

/// Chain locators used to find a common ancestor with a peer.
pub mod locator;

/// Transaction types carried inside blocks.
pub mod transaction;
