//! Tempo proposer VM
//!
//! A block-production and verification shim between an outer consensus
//! engine and an inner application chain. Every inner block is wrapped in
//! an envelope carrying a proposer identity, a parent reference, a
//! timestamp, and a reference height into the validator-state chain. The
//! layer imposes a *proposer schedule* on an otherwise leaderless
//! consensus: at each height, validators take turns at exclusive
//! proposal windows, cutting contention and equivocation.
//!
//! # Architecture
//!
//! ```text
//! ┌───────────────────────────────────────────────────┐
//! │                   ProposerVm                      │
//! │  ┌──────────┐ ┌──────────┐ ┌───────────────────┐  │
//! │  │  Config  │ │ Windower │ │ Envelope codec    │  │
//! │  └──────────┘ └──────────┘ └───────────────────┘  │
//! │  ┌─────────────────────────────────────────────┐  │
//! │  │ Block state machine                         │  │
//! │  │  preFork → postFork → postForkOption        │  │
//! │  │  fork pinning, verified-inner memoization   │  │
//! │  └─────────────────────────────────────────────┘  │
//! │  ┌──────────────┐  ┌─────────────────────────┐    │
//! │  │ Persisted    │  │ Inner VM / validator    │    │
//! │  │ state (KV)   │  │ state interfaces        │    │
//! │  └──────────────┘  └─────────────────────────┘    │
//! └───────────────────────────────────────────────────┘
//! ```
//!
//! # Key properties
//!
//! - **Deterministic scheduling**: the proposer ordering at a height is a
//!   pure function of the validator set snapshot at the declared
//!   P-reference height, identical on every node.
//! - **Monotone chains**: timestamps and P-reference heights never move
//!   backwards along accepted parent/child edges.
//! - **One-shot activation**: the first accepted wrapper pins the fork
//!   height permanently; pre-fork blocks at or above it are masked.
//! - **Envelope/inner independence**: rejecting a wrapper never rejects
//!   the inner block it wraps, since a sibling wrapper may still carry it.

pub mod block;
pub mod clock;
pub mod config;
pub mod envelope;
pub mod error;
pub mod inner;
pub mod state;
pub mod vm;
pub mod windower;

// Re-exports for convenience
pub use block::{BlockVariant, PostForkCore};
pub use clock::{SystemClock, TimeSource};
pub use config::ProposerVmConfig;
pub use envelope::Envelope;
pub use error::{ProposerVmError, Result};
pub use inner::{InnerBlock, InnerVm, Status, ValidatorState};
pub use state::{Database, State, WriteBatch};
pub use vm::{Block, ProposerVm};
pub use windower::{
    Windower, MAX_BUILD_DELAY, MAX_BUILD_WINDOWS, MAX_VERIFY_DELAY, MAX_VERIFY_WINDOWS,
    WINDOW_DURATION,
};

#[cfg(any(test, feature = "dev-context-only-utils"))]
pub use {
    clock::ManualClock,
    inner::{TestInnerBlock, TestInnerVm, TestValidatorState},
    state::MemDb,
};
