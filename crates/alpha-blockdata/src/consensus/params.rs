use crate::{
    blockdata::block::BlockHash,
    hashes::{BlockHasher, Sha256dHasher},
    network::Network,
    pow::Target,
};

/// Consensus parameters for different networks.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Params {
    /// Network for which these parameters are defined.
    pub network: Network,
    /// The maximum attainable target value for these params.
    pub max_attainable_target: Target,
    /// Expected amount of time to mine one block.
    pub pow_target_spacing: u64,
    /// Difficulty recalculation interval.
    pub pow_target_timespan: u64,
    /// Determines whether minimal difficulty may be used for blocks or not.
    pub allow_min_difficulty_blocks: bool,
    /// Determines whether retargeting is disabled for this network or not.
    pub no_pow_retargeting: bool,
}

impl Params {
    /// Consensus parameters for the Unicity mainnet network.
    pub const MAINNET: Self = Self {
        network: Network::Mainnet,
        max_attainable_target: Target::mainnet_max_target(),
        pow_target_spacing: 2 * 60,                 // 2 minutes
        pow_target_timespan: 14 * 24 * 60 * 60 / 5, // two weeks / 5
        allow_min_difficulty_blocks: false,
        no_pow_retargeting: false,
    };
    /// Consensus parameters for the Unicity testnet network.
    pub const TESTNET: Self = Self {
        network: Network::Testnet,
        max_attainable_target: Target::mainnet_max_target(),
        pow_target_spacing: 2 * 60,
        pow_target_timespan: 14 * 24 * 60 * 60 / 5,
        allow_min_difficulty_blocks: true,
        no_pow_retargeting: false,
    };
    /// Consensus parameters for the Unicity regtest network.
    pub const REGTEST: Self = Self {
        network: Network::Regtest,
        max_attainable_target: Target::regtest_max_target(),
        pow_target_spacing: 2 * 60,
        pow_target_timespan: 14 * 24 * 60 * 60 / 5,
        allow_min_difficulty_blocks: true,
        no_pow_retargeting: true,
    };

    /// Number of blocks between difficulty adjustments.
    #[allow(
        clippy::arithmetic_side_effects,
        reason = "Spacing is a non-zero constant"
    )]
    pub const fn difficulty_adjustment_interval(&self) -> u64 {
        self.pow_target_timespan / self.pow_target_spacing
    }
}

impl BlockHasher for Params {
    /// Every Alpha network identifies blocks by the double SHA-256 of the
    /// extended header encoding.
    fn hash_header(&self, encoded_header: &[u8]) -> BlockHash {
        match self.network {
            Network::Mainnet | Network::Testnet | Network::Regtest => {
                Sha256dHasher.hash_header(encoded_header)
            }
        }
    }
}
