//! Proposer layer configuration.
//!
//! Fixes the activation point of proposer scheduling, the identity of the
//! wrapped chain, and the clock-skew tolerance applied to inbound blocks.

use solana_hash::Hash;

/// Configuration for the proposer VM.
///
/// Timestamps are unix seconds; envelope timestamps carry seconds
/// resolution on the wire.
#[derive(Debug, Clone)]
pub struct ProposerVmConfig {
    /// Unix time at which proposer scheduling activates. Blocks whose
    /// parent timestamp is at or after this instant must carry envelopes.
    pub activation_time: i64,

    /// Lowest P-reference height any envelope may declare. Raised at
    /// network upgrades to stop new blocks from snapshotting ancient
    /// validator sets.
    pub minimum_p_chain_height: u64,

    /// Identity of the wrapped chain; bound into every envelope signature.
    pub chain_id: Hash,

    /// Subnet whose validator set drives the proposer ordering.
    pub subnet_id: Hash,

    /// How far ahead of local time a block timestamp may be (seconds).
    /// Default: 10.
    pub max_skew_secs: i64,
}

impl Default for ProposerVmConfig {
    fn default() -> Self {
        Self {
            activation_time: 0,
            minimum_p_chain_height: 0,
            chain_id: Hash::default(),
            subnet_id: Hash::default(),
            max_skew_secs: 10,
        }
    }
}

impl ProposerVmConfig {
    /// Validate configuration parameters.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.max_skew_secs <= 0 {
            return Err(ConfigError::InvalidMaxSkew(self.max_skew_secs));
        }
        if self.activation_time < 0 {
            return Err(ConfigError::InvalidActivationTime(self.activation_time));
        }
        Ok(())
    }

    /// Create a config suitable for tests: activation at the epoch and no
    /// minimum height, so fixtures control the transition explicitly.
    #[cfg(any(test, feature = "dev-context-only-utils"))]
    pub fn dev_default() -> Self {
        Self::default()
    }
}

/// Errors in proposer VM configuration.
#[derive(Debug, Clone, thiserror::Error)]
pub enum ConfigError {
    #[error("max_skew_secs must be > 0, got {0}")]
    InvalidMaxSkew(i64),
    #[error("activation_time must be >= 0, got {0}")]
    InvalidActivationTime(i64),
}
