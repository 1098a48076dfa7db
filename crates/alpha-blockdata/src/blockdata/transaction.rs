//! Transactions are opaque to this crate: they are carried, encoded and
//! decoded through the `bitcoin` consensus codec and never inspected.

pub use bitcoin::{transaction::Version, Transaction, Txid};
