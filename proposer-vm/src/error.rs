//! Error types for the proposer layer.

use {solana_hash::Hash, thiserror::Error};

/// Errors surfaced by block verification, building, and persistence.
#[derive(Error, Debug)]
pub enum ProposerVmError {
    /// The requested block is unknown to this layer and the inner chain.
    #[error("block not found: {0}")]
    NotFound(Hash),

    /// The bytes do not decode as a block envelope or an inner block.
    #[error("parse error: {0}")]
    Parse(String),

    /// A signed envelope failed signature or certificate validation.
    #[error("invalid signature: {0}")]
    InvalidSignature(String),

    /// The child's P-reference height is below its parent's.
    #[error("P-chain height too low: {height} < {minimum}")]
    PChainHeightTooLow { height: u64, minimum: u64 },

    /// The child's P-reference height is above the validator-state tip.
    #[error("P-chain height not reached: {height} > {current}")]
    PChainHeightNotReached { height: u64, current: u64 },

    /// The child's timestamp precedes its parent's.
    #[error("timestamp not monotonic: {child_timestamp} < {parent_timestamp}")]
    TimeNotMonotonic {
        child_timestamp: i64,
        parent_timestamp: i64,
    },

    /// The child's timestamp is further ahead of local time than the
    /// configured skew allows.
    #[error("timestamp too advanced: {child_timestamp} > {max_timestamp}")]
    TimeTooAdvanced {
        child_timestamp: i64,
        max_timestamp: i64,
    },

    /// The proposer's window at this height has not opened yet.
    #[error("proposer window not started: timestamp {timestamp} < {window_start}")]
    ProposerWindowNotStarted { timestamp: i64, window_start: i64 },

    /// The wrapped inner block does not reference the parent's inner block.
    #[error("inner parent mismatch: expected {expected}, got {got}")]
    InnerParentMismatch { expected: Hash, got: Hash },

    /// The (parent variant, child variant) pairing is not admissible.
    #[error("unexpected block type")]
    UnexpectedBlockType,

    /// A post-fork child was built on a parent that predates activation.
    #[error("proposers are not activated yet")]
    ProposersNotActivated,

    /// An option child does not match its parent oracle: wrong inner
    /// block, or non-inherited timestamp / P-reference height.
    #[error("invalid option child: {0}")]
    InvalidOption(String),

    /// `options` was called on a block that does not wrap an oracle.
    #[error("block is not an oracle")]
    NotOracle,

    /// The engine's cancellation token fired.
    #[error("operation canceled")]
    Canceled,

    /// The persistent store failed or returned corrupt data.
    #[error("database error: {0}")]
    Database(String),

    /// The validator-state oracle failed.
    #[error("validator state error: {0}")]
    ValidatorState(String),

    /// The inner chain VM failed.
    #[error("inner VM error: {0}")]
    Inner(String),

    /// The VM was constructed with an invalid configuration.
    #[error("config error: {0}")]
    Config(#[from] crate::config::ConfigError),
}

/// Convenience result type for proposer-layer operations.
pub type Result<T> = std::result::Result<T, ProposerVmError>;
