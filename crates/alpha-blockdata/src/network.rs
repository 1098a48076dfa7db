use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::consensus::Params;

/// Errors that can occur when parsing a chain type.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum ChainTypeError {
    /// The provided chain type string is invalid.
    #[error("Invalid chain type: {0}")]
    InvalidChainType(String),
}

/// The Unicity network variants.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Network {
    /// Mainnet Unicity network.
    Mainnet,
    /// Testnet Unicity network.
    Testnet,
    /// Regtest Unicity network.
    Regtest,
}

impl Network {
    /// Returns the string representation of this network.
    ///
    /// # Returns
    ///
    /// A string slice representing the network name
    pub fn as_str(&self) -> &'static str {
        match self {
            Network::Mainnet => "alpha",
            Network::Testnet => "alphatestnet",
            Network::Regtest => "alpharegtest",
        }
    }

    /// Returns the consensus parameters for this network.
    ///
    /// # Returns
    ///
    /// * `Params` - The consensus parameters for this network
    pub fn consensus_params(self) -> Params {
        match self {
            Network::Mainnet => Params::MAINNET,
            Network::Testnet => Params::TESTNET,
            Network::Regtest => Params::REGTEST,
        }
    }
}

impl fmt::Display for Network {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Network {
    type Err = ChainTypeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Network::try_from(s)
    }
}

impl TryFrom<&str> for Network {
    type Error = ChainTypeError;

    fn try_from(s: &str) -> Result<Self, Self::Error> {
        match s {
            "alpha" | "mainnet" => Ok(Network::Mainnet),
            "alphatestnet" | "testnet" => Ok(Network::Testnet),
            "alpharegtest" | "regtest" => Ok(Network::Regtest),
            other => Err(ChainTypeError::InvalidChainType(other.to_string())),
        }
    }
}
