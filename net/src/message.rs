//! Wire types shared by the peer and gossip trackers.
//!
//! These cross the wire inside the host's gossip messages, so they derive
//! serde and encode with bincode like the rest of the stack.

use {
    crate::error::Result,
    serde::{Deserialize, Serialize},
    solana_hash::Hash,
    solana_pubkey::Pubkey,
};

/// Application version advertised by a peer on connect. Ordered
/// lexicographically: major, then minor, then patch.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
pub struct Version {
    pub major: u16,
    pub minor: u16,
    pub patch: u16,
}

impl Version {
    pub const fn new(major: u16, minor: u16, patch: u16) -> Self {
        Self {
            major,
            minor,
            patch,
        }
    }
}

impl std::fmt::Display for Version {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}.{}.{}", self.major, self.minor, self.patch)
    }
}

/// A validator identity as gossiped between peers: the node id together
/// with the staking transaction that registered it. A re-registered
/// validator carries a fresh tx id and counts as a new identity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidatorId {
    pub node_id: Pubkey,
    pub tx_id: Hash,
}

/// A bounded batch of validator identities a peer has not yet been told
/// about.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GossipDelta {
    pub validators: Vec<ValidatorId>,
}

impl GossipDelta {
    /// Serialize this delta to bytes using bincode.
    pub fn serialize(&self) -> Result<Vec<u8>> {
        Ok(bincode::serialize(self)?)
    }

    /// Deserialize a delta from bytes.
    pub fn deserialize(data: &[u8]) -> Result<Self> {
        Ok(bincode::deserialize(data)?)
    }
}
