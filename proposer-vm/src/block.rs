//! Block variants and the edge checks between them.
//!
//! The proposer layer sees three kinds of block, fixed at parse or build
//! time: a bare pre-fork inner block, a post-fork envelope wrapper, and an
//! option child of a post-fork oracle wrapper. Post-fork wrappers and
//! option blocks share one state core: the envelope, the parsed inner
//! block, and the decision status.
//!
//! Admissibility of a parent/child edge depends on both variants; the
//! dispatch over the pairing lives in the VM, while the individual checks
//! (timestamp monotonicity, clock skew, P-reference bounds) live here.

use {
    crate::{
        envelope::Envelope,
        error::{ProposerVmError, Result},
        inner::{InnerBlock, Status},
    },
    parking_lot::Mutex,
    solana_hash::Hash,
    std::sync::Arc,
};

/// State shared by post-fork wrappers and their option children.
pub struct PostForkCore {
    pub(crate) envelope: Envelope,
    pub(crate) inner: Arc<dyn InnerBlock>,
    status: Mutex<Status>,
}

impl PostForkCore {
    pub(crate) fn new(envelope: Envelope, inner: Arc<dyn InnerBlock>, status: Status) -> Self {
        Self {
            envelope,
            inner,
            status: Mutex::new(status),
        }
    }

    pub fn status(&self) -> Status {
        *self.status.lock()
    }

    pub(crate) fn set_status(&self, status: Status) {
        *self.status.lock() = status;
    }
}

/// A block as classified by the proposer layer.
#[derive(Clone)]
pub enum BlockVariant {
    /// A bare inner block from before fork activation.
    PreFork(Arc<dyn InnerBlock>),
    /// An envelope-wrapped inner block.
    PostFork(Arc<PostForkCore>),
    /// One of the two children of a post-fork oracle wrapper.
    PostForkOption(Arc<PostForkCore>),
}

impl BlockVariant {
    pub fn id(&self) -> Hash {
        match self {
            BlockVariant::PreFork(inner) => inner.id(),
            BlockVariant::PostFork(core) | BlockVariant::PostForkOption(core) => {
                core.envelope.id()
            }
        }
    }

    pub fn parent(&self) -> Hash {
        match self {
            BlockVariant::PreFork(inner) => inner.parent(),
            BlockVariant::PostFork(core) | BlockVariant::PostForkOption(core) => {
                core.envelope.parent_id()
            }
        }
    }

    /// Height of the wrapped chain; the envelope adds none of its own.
    pub fn height(&self) -> u64 {
        match self {
            BlockVariant::PreFork(inner) => inner.height(),
            BlockVariant::PostFork(core) | BlockVariant::PostForkOption(core) => {
                core.inner.height()
            }
        }
    }

    pub fn timestamp(&self) -> i64 {
        match self {
            BlockVariant::PreFork(inner) => inner.timestamp(),
            BlockVariant::PostFork(core) | BlockVariant::PostForkOption(core) => {
                core.envelope.timestamp()
            }
        }
    }

    /// Declared P-reference height; pre-fork blocks predate the schedule.
    pub fn p_chain_height(&self) -> u64 {
        match self {
            BlockVariant::PreFork(_) => 0,
            BlockVariant::PostFork(core) | BlockVariant::PostForkOption(core) => {
                core.envelope.p_chain_height()
            }
        }
    }

    /// Transport and persistence form of the block.
    pub fn bytes(&self) -> &[u8] {
        match self {
            BlockVariant::PreFork(inner) => inner.bytes(),
            BlockVariant::PostFork(core) | BlockVariant::PostForkOption(core) => {
                core.envelope.bytes()
            }
        }
    }

    pub(crate) fn inner(&self) -> &Arc<dyn InnerBlock> {
        match self {
            BlockVariant::PreFork(inner) => inner,
            BlockVariant::PostFork(core) | BlockVariant::PostForkOption(core) => &core.inner,
        }
    }
}

/// Child timestamps never move backwards along an edge.
pub(crate) fn check_monotonic(parent_timestamp: i64, child_timestamp: i64) -> Result<()> {
    if child_timestamp < parent_timestamp {
        return Err(ProposerVmError::TimeNotMonotonic {
            child_timestamp,
            parent_timestamp,
        });
    }
    Ok(())
}

/// Child timestamps stay within the skew bound of local time.
pub(crate) fn check_skew(child_timestamp: i64, now: i64, max_skew_secs: i64) -> Result<()> {
    let max_timestamp = now.saturating_add(max_skew_secs);
    if child_timestamp > max_timestamp {
        return Err(ProposerVmError::TimeTooAdvanced {
            child_timestamp,
            max_timestamp,
        });
    }
    Ok(())
}

/// The declared P-reference height sits between the edge's floor and the
/// validator-state tip.
pub(crate) fn check_p_chain_bounds(height: u64, floor: u64, current: u64) -> Result<()> {
    if height < floor {
        return Err(ProposerVmError::PChainHeightTooLow {
            height,
            minimum: floor,
        });
    }
    if height > current {
        return Err(ProposerVmError::PChainHeightNotReached { height, current });
    }
    Ok(())
}
