//! Error types for the peer-tracking layer.

use {solana_pubkey::Pubkey, thiserror::Error};

/// Errors that can occur while tracking peers and gossip state.
#[derive(Error, Debug)]
pub enum NetError {
    /// Failed to serialize a wire message.
    #[error("serialization error: {0}")]
    Serialization(#[from] bincode::Error),

    /// The peer is not being tracked by the gossip tracker.
    #[error("peer not tracked: {0}")]
    PeerNotTracked(Pubkey),

    /// A query was made with a non-positive limit.
    #[error("invalid limit: {0}")]
    InvalidLimit(usize),
}

/// Convenience result type for peer-tracking operations.
pub type Result<T> = std::result::Result<T, NetError>;
