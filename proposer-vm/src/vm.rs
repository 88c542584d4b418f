//! The proposer VM: the engine-facing surface of the wrapper layer.
//!
//! Translates every engine call (build, parse, get, verify, accept,
//! reject, options) into the equivalent call on the wrapped chain, after
//! enforcing the proposer schedule and envelope invariants. Mutations to
//! the fork height, the verified-inner-block memo, and the last-accepted
//! pointer are serialized through one VM-wide lock held for the duration
//! of each engine callback.

use {
    crate::{
        block::{check_monotonic, check_p_chain_bounds, check_skew, BlockVariant, PostForkCore},
        clock::TimeSource,
        config::ProposerVmConfig,
        envelope::Envelope,
        error::{ProposerVmError, Result},
        inner::{InnerBlock, InnerVm, Status, ValidatorState},
        state::{Database, State},
        windower::{Windower, MAX_BUILD_DELAY, MAX_BUILD_WINDOWS, MAX_VERIFY_DELAY, MAX_VERIFY_WINDOWS},
    },
    ed25519_dalek::SigningKey,
    log::{debug, info},
    parking_lot::Mutex,
    solana_hash::Hash,
    solana_pubkey::Pubkey,
    std::{
        collections::{HashMap, HashSet},
        sync::Arc,
    },
    tokio_util::sync::CancellationToken,
};

/// Mutable VM state behind the VM-wide lock.
#[derive(Default)]
struct VmCore {
    /// Wrappers known to this layer, keyed by wrapper id. Parsed and built
    /// wrappers live here until rejected; accepted wrappers stay so parent
    /// lookups avoid a database round-trip.
    live: HashMap<Hash, BlockVariant>,
    /// Inner blocks verified under some wrapper, keyed by inner id, with
    /// the wrapper ids referencing them. An inner block verifies at most
    /// once while any wrapper holds it; rejecting a wrapper evicts only
    /// its own membership.
    verified_inner: HashMap<Hash, HashSet<Hash>>,
    /// Preferred tip set by the engine.
    preference: Option<Hash>,
    /// Most recently accepted wrapper.
    last_accepted: Option<Hash>,
    /// Pinned fork height; write-once.
    fork_height: Option<u64>,
}

struct Shared {
    config: ProposerVmConfig,
    windower: Windower,
    clock: Arc<dyn TimeSource>,
    signer: SigningKey,
    node_id: Pubkey,
    inner_vm: Arc<dyn InnerVm>,
    validator_state: Arc<dyn ValidatorState>,
    state: State,
    core: Mutex<VmCore>,
}

/// The proposer-scheduling wrapper VM.
pub struct ProposerVm {
    shared: Arc<Shared>,
}

/// A block handle returned to the engine. Cheap to clone; handles with the
/// same id share one status cell.
#[derive(Clone)]
pub struct Block {
    shared: Arc<Shared>,
    variant: BlockVariant,
}

impl ProposerVm {
    pub fn new(
        config: ProposerVmConfig,
        inner_vm: Arc<dyn InnerVm>,
        validator_state: Arc<dyn ValidatorState>,
        database: Arc<dyn Database>,
        clock: Arc<dyn TimeSource>,
        signer: SigningKey,
    ) -> Result<Self> {
        config.validate()?;
        let windower = Windower::new(&config.chain_id, config.subnet_id);
        let state = State::new(database);
        let core = VmCore {
            fork_height: state.fork_height()?,
            last_accepted: state.last_accepted()?,
            ..VmCore::default()
        };
        let node_id = Pubkey::new_from_array(signer.verifying_key().to_bytes());
        Ok(Self {
            shared: Arc::new(Shared {
                config,
                windower,
                clock,
                signer,
                node_id,
                inner_vm,
                validator_state,
                state,
                core: Mutex::new(core),
            }),
        })
    }

    /// This node's proposer identity.
    pub fn node_id(&self) -> Pubkey {
        self.shared.node_id
    }

    /// Build a child of the preferred block, subject to the proposer
    /// schedule.
    pub fn build_block(&self, token: &CancellationToken) -> Result<Block> {
        ensure_active(token)?;
        let shared = &self.shared;
        let mut core = shared.core.lock();
        let preferred = match core.preference.or(core.last_accepted) {
            Some(id) => id,
            None => shared.inner_vm.last_accepted()?,
        };
        let parent = shared.variant_locked(&mut core, &preferred)?;
        let variant = match &parent {
            BlockVariant::PreFork(parent_inner) => {
                shared.build_on_pre_fork(&mut core, parent_inner, token)?
            }
            BlockVariant::PostFork(parent_core) | BlockVariant::PostForkOption(parent_core) => {
                shared.build_on_post_fork(&mut core, parent_core, token)?
            }
        };
        Ok(self.wrap(variant))
    }

    /// Parse a block from transport bytes. Well-formed envelopes become
    /// post-fork wrappers (or option children, when the locally-known
    /// parent wraps an oracle); anything else is handed to the inner VM.
    pub fn parse_block(&self, token: &CancellationToken, bytes: &[u8]) -> Result<Block> {
        ensure_active(token)?;
        let shared = &self.shared;
        let mut core = shared.core.lock();
        let variant = match Envelope::parse(bytes) {
            Ok(envelope) => {
                if let Some(existing) = core.live.get(&envelope.id()) {
                    return Ok(self.wrap(existing.clone()));
                }
                if envelope.is_signed() {
                    envelope.verify_signature(true, &shared.config.chain_id)?;
                }
                ensure_active(token)?;
                let inner = shared.inner_vm.parse_block(envelope.inner_bytes())?;
                let is_option = if envelope.is_signed() {
                    false
                } else {
                    match shared.variant_locked(&mut core, &envelope.parent_id()) {
                        Ok(BlockVariant::PostFork(parent_core)) => {
                            is_oracle(&parent_core.inner).unwrap_or(false)
                        }
                        _ => false,
                    }
                };
                let block_core = Arc::new(PostForkCore::new(envelope, inner, Status::Processing));
                let variant = if is_option {
                    BlockVariant::PostForkOption(block_core)
                } else {
                    BlockVariant::PostFork(block_core)
                };
                core.live.insert(variant.id(), variant.clone());
                variant
            }
            Err(_) => {
                ensure_active(token)?;
                let inner = shared.inner_vm.parse_block(bytes)?;
                BlockVariant::PreFork(inner)
            }
        };
        Ok(self.wrap(variant))
    }

    /// Look up a block by id: live wrappers first, then accepted wrappers
    /// from the store, then the inner chain.
    pub fn get_block(&self, token: &CancellationToken, id: &Hash) -> Result<Block> {
        ensure_active(token)?;
        let mut core = self.shared.core.lock();
        let variant = self.shared.variant_locked(&mut core, id)?;
        Ok(self.wrap(variant))
    }

    /// Record the engine's preferred tip and forward it to the inner VM.
    pub fn set_preference(&self, token: &CancellationToken, id: &Hash) -> Result<()> {
        ensure_active(token)?;
        let mut core = self.shared.core.lock();
        core.preference = Some(*id);
        let variant = self.shared.variant_locked(&mut core, id)?;
        let inner_id = variant.inner().id();
        self.shared.inner_vm.set_preference(&inner_id)
    }

    /// The most recently accepted wrapper, falling back to the inner chain
    /// before the fork.
    pub fn last_accepted(&self, token: &CancellationToken) -> Result<Hash> {
        ensure_active(token)?;
        let core = self.shared.core.lock();
        match core.last_accepted {
            Some(id) => Ok(id),
            None => self.shared.inner_vm.last_accepted(),
        }
    }

    /// The pinned fork height, if the transition has happened.
    pub fn fork_height(&self) -> Option<u64> {
        self.shared.core.lock().fork_height
    }

    fn wrap(&self, variant: BlockVariant) -> Block {
        Block {
            shared: Arc::clone(&self.shared),
            variant,
        }
    }
}

impl Block {
    pub fn id(&self) -> Hash {
        self.variant.id()
    }

    pub fn parent(&self) -> Hash {
        self.variant.parent()
    }

    pub fn height(&self) -> u64 {
        self.variant.height()
    }

    pub fn timestamp(&self) -> i64 {
        self.variant.timestamp()
    }

    pub fn p_chain_height(&self) -> u64 {
        self.variant.p_chain_height()
    }

    pub fn bytes(&self) -> &[u8] {
        self.variant.bytes()
    }

    pub fn is_pre_fork(&self) -> bool {
        matches!(self.variant, BlockVariant::PreFork(_))
    }

    pub fn is_post_fork(&self) -> bool {
        matches!(self.variant, BlockVariant::PostFork(_))
    }

    pub fn is_option(&self) -> bool {
        matches!(self.variant, BlockVariant::PostForkOption(_))
    }

    /// Whether the wrapping envelope carries a proposer signature.
    pub fn is_signed(&self) -> bool {
        match &self.variant {
            BlockVariant::PreFork(_) => false,
            BlockVariant::PostFork(core) | BlockVariant::PostForkOption(core) => {
                core.envelope.is_signed()
            }
        }
    }

    /// Decision status. Once the fork height is pinned, pre-fork blocks at
    /// or above it are reported rejected regardless of their inner status.
    pub fn status(&self) -> Status {
        match &self.variant {
            BlockVariant::PreFork(inner) => {
                let fork_height = self.shared.core.lock().fork_height;
                match fork_height {
                    Some(fork) if inner.height() >= fork => Status::Rejected,
                    _ => inner.status(),
                }
            }
            BlockVariant::PostFork(core) | BlockVariant::PostForkOption(core) => core.status(),
        }
    }

    /// Verify this block against its parent, per the variant-pair
    /// admissibility rules. May be called repeatedly; the wrapped inner
    /// block verifies at most once per wrapper.
    pub fn verify(&self, token: &CancellationToken) -> Result<()> {
        ensure_active(token)?;
        let shared = &self.shared;
        let mut core = shared.core.lock();
        let parent = shared.variant_locked(&mut core, &self.variant.parent())?;
        match (&parent, &self.variant) {
            (BlockVariant::PreFork(parent_inner), BlockVariant::PreFork(child)) => {
                shared.verify_pre_fork_child(parent_inner, child, token)
            }
            (BlockVariant::PreFork(parent_inner), BlockVariant::PostFork(child)) => {
                shared.verify_transition_child(&mut core, parent_inner, child, token)
            }
            (BlockVariant::PostFork(parent_core), BlockVariant::PostFork(child))
            | (BlockVariant::PostForkOption(parent_core), BlockVariant::PostFork(child)) => shared
                .verify_post_fork_child(
                    &mut core,
                    parent_core.inner.id(),
                    parent_core.envelope.timestamp(),
                    parent_core.envelope.p_chain_height(),
                    child,
                    token,
                ),
            (BlockVariant::PostFork(parent_core), BlockVariant::PostForkOption(child)) => {
                shared.verify_option_child(&mut core, parent_core, child, token)
            }
            _ => Err(ProposerVmError::UnexpectedBlockType),
        }
    }

    /// Accept this block. Post-fork wrappers persist their envelope in one
    /// atomic batch before the inner block accepts; the first such accept
    /// pins the fork height.
    pub fn accept(&self, token: &CancellationToken) -> Result<()> {
        ensure_active(token)?;
        let shared = &self.shared;
        let mut core = shared.core.lock();
        match &self.variant {
            BlockVariant::PreFork(inner) => inner.accept(),
            BlockVariant::PostFork(block_core) | BlockVariant::PostForkOption(block_core) => {
                let id = block_core.envelope.id();
                let height = block_core.inner.height();
                let pin = match core.fork_height {
                    None => Some(height),
                    Some(_) => None,
                };
                shared.state.commit_accept(
                    &id,
                    block_core.envelope.bytes(),
                    &block_core.inner.id(),
                    height,
                    pin,
                )?;
                if let Some(fork) = pin {
                    core.fork_height = Some(fork);
                    info!("proposer fork pinned at height {fork}");
                }
                block_core.set_status(Status::Accepted);
                block_core.inner.accept()?;
                core.last_accepted = Some(id);
                info!("accepted block {id} at height {height}");
                Ok(())
            }
        }
    }

    /// Reject this block. A wrapper drops its envelope and its memo entry;
    /// the inner block is left alone, since a sibling wrapper may still
    /// reference it.
    pub fn reject(&self, token: &CancellationToken) -> Result<()> {
        ensure_active(token)?;
        let mut core = self.shared.core.lock();
        match &self.variant {
            BlockVariant::PreFork(inner) => inner.reject(),
            BlockVariant::PostFork(block_core) | BlockVariant::PostForkOption(block_core) => {
                let id = block_core.envelope.id();
                let inner_id = block_core.inner.id();
                block_core.set_status(Status::Rejected);
                if let Some(wrappers) = core.verified_inner.get_mut(&inner_id) {
                    wrappers.remove(&id);
                    if wrappers.is_empty() {
                        core.verified_inner.remove(&inner_id);
                    }
                }
                core.live.remove(&id);
                debug!("rejected wrapper {id}; inner {inner_id} untouched");
                Ok(())
            }
        }
    }

    /// The two option children of an oracle block, in declared order.
    pub fn options(&self, token: &CancellationToken) -> Result<[Block; 2]> {
        ensure_active(token)?;
        let shared = &self.shared;
        match &self.variant {
            // A pre-fork oracle's children stay pre-fork.
            BlockVariant::PreFork(inner) => {
                let [inner0, inner1] = inner.options()?;
                Ok([
                    self.sibling(BlockVariant::PreFork(inner0)),
                    self.sibling(BlockVariant::PreFork(inner1)),
                ])
            }
            BlockVariant::PostFork(block_core) => {
                let [inner0, inner1] = block_core.inner.options()?;
                let mut core = shared.core.lock();
                let option0 = register_option(&mut core, block_core, inner0);
                let option1 = register_option(&mut core, block_core, inner1);
                Ok([self.sibling(option0), self.sibling(option1)])
            }
            BlockVariant::PostForkOption(_) => Err(ProposerVmError::NotOracle),
        }
    }

    fn sibling(&self, variant: BlockVariant) -> Block {
        Block {
            shared: Arc::clone(&self.shared),
            variant,
        }
    }
}

/// Wrap one declared option of `parent` as an option child inheriting the
/// parent's timestamp and P-reference height. Reuses the live entry when
/// the option was already materialized.
fn register_option(
    core: &mut VmCore,
    parent: &Arc<PostForkCore>,
    inner: Arc<dyn InnerBlock>,
) -> BlockVariant {
    let envelope = Envelope::build_unsigned(
        parent.envelope.id(),
        parent.envelope.timestamp(),
        parent.envelope.p_chain_height(),
        inner.bytes().to_vec(),
    );
    if let Some(existing) = core.live.get(&envelope.id()) {
        return existing.clone();
    }
    let variant = BlockVariant::PostForkOption(Arc::new(PostForkCore::new(
        envelope,
        inner,
        Status::Processing,
    )));
    core.live.insert(variant.id(), variant.clone());
    variant
}

impl Shared {
    fn now(&self) -> i64 {
        self.clock.unix_now()
    }

    /// Resolve an id to a block variant: live wrappers, then accepted
    /// wrappers from the store, then the inner chain.
    fn variant_locked(&self, core: &mut VmCore, id: &Hash) -> Result<BlockVariant> {
        if let Some(variant) = core.live.get(id) {
            return Ok(variant.clone());
        }
        if let Some(bytes) = self.state.wrapper_bytes(id)? {
            let envelope = Envelope::parse(&bytes)?;
            let inner = self.inner_vm.parse_block(envelope.inner_bytes())?;
            let variant = BlockVariant::PostFork(Arc::new(PostForkCore::new(
                envelope,
                inner,
                Status::Accepted,
            )));
            core.live.insert(*id, variant.clone());
            return Ok(variant);
        }
        let inner = self.inner_vm.get_block(id)?;
        Ok(BlockVariant::PreFork(inner))
    }

    // ── Verification edges ──────────────────────────────────────────────

    /// preFork → preFork: always legal before activation; afterwards only
    /// under an oracle parent (the compatibility carve-out).
    fn verify_pre_fork_child(
        &self,
        parent_inner: &Arc<dyn InnerBlock>,
        child: &Arc<dyn InnerBlock>,
        token: &CancellationToken,
    ) -> Result<()> {
        if parent_inner.timestamp() >= self.config.activation_time {
            if !is_oracle(parent_inner)? {
                return Err(ProposerVmError::UnexpectedBlockType);
            }
            debug!(
                "allowing pre-fork child past activation: parent {} is an oracle",
                parent_inner.id()
            );
        }
        ensure_active(token)?;
        child.verify()
    }

    /// preFork → postFork: the activation transition. The envelope must be
    /// unsigned and the parent a non-oracle whose timestamp has reached
    /// activation.
    fn verify_transition_child(
        &self,
        core: &mut VmCore,
        parent_inner: &Arc<dyn InnerBlock>,
        child: &Arc<PostForkCore>,
        token: &CancellationToken,
    ) -> Result<()> {
        if is_oracle(parent_inner)? {
            return Err(ProposerVmError::UnexpectedBlockType);
        }
        ensure_active(token)?;
        let current = self.validator_state.current_height()?;
        let envelope = &child.envelope;
        check_p_chain_bounds(
            envelope.p_chain_height(),
            self.config.minimum_p_chain_height,
            current,
        )?;
        let expected = parent_inner.id();
        let got = child.inner.parent();
        if got != expected {
            return Err(ProposerVmError::InnerParentMismatch { expected, got });
        }
        let parent_timestamp = parent_inner.timestamp();
        if parent_timestamp < self.config.activation_time {
            return Err(ProposerVmError::ProposersNotActivated);
        }
        check_monotonic(parent_timestamp, envelope.timestamp())?;
        check_skew(envelope.timestamp(), self.now(), self.config.max_skew_secs)?;
        envelope.verify_signature(false, &self.config.chain_id)?;
        self.verify_and_record_inner(core, envelope.id(), &child.inner, token)
    }

    /// postFork → postFork (signed or unsigned). Signed envelopes pay the
    /// proposer-window delay for the validator set at the child's declared
    /// P-reference height; unsigned envelopes skip the delay but keep
    /// monotonicity and skew.
    fn verify_post_fork_child(
        &self,
        core: &mut VmCore,
        parent_inner_id: Hash,
        parent_timestamp: i64,
        parent_p_chain_height: u64,
        child: &Arc<PostForkCore>,
        token: &CancellationToken,
    ) -> Result<()> {
        ensure_active(token)?;
        let current = self.validator_state.current_height()?;
        let envelope = &child.envelope;
        check_p_chain_bounds(envelope.p_chain_height(), parent_p_chain_height, current)?;
        let got = child.inner.parent();
        if got != parent_inner_id {
            return Err(ProposerVmError::InnerParentMismatch {
                expected: parent_inner_id,
                got,
            });
        }
        check_monotonic(parent_timestamp, envelope.timestamp())?;
        check_skew(envelope.timestamp(), self.now(), self.config.max_skew_secs)?;
        if let Some(proposer) = envelope.proposer() {
            envelope.verify_signature(true, &self.config.chain_id)?;
            let min_delay = self.windower.delay(
                self.validator_state.as_ref(),
                child.inner.height(),
                envelope.p_chain_height(),
                &proposer,
                MAX_VERIFY_WINDOWS,
            )?;
            let window_start = parent_timestamp.saturating_add(min_delay.as_secs() as i64);
            if envelope.timestamp() < window_start {
                return Err(ProposerVmError::ProposerWindowNotStarted {
                    timestamp: envelope.timestamp(),
                    window_start,
                });
            }
        }
        self.verify_and_record_inner(core, envelope.id(), &child.inner, token)
    }

    /// postFork(oracle) → postForkOption: the child must be one of the
    /// parent's declared options and inherit its timestamp and
    /// P-reference height unchanged.
    fn verify_option_child(
        &self,
        core: &mut VmCore,
        parent_core: &Arc<PostForkCore>,
        child: &Arc<PostForkCore>,
        token: &CancellationToken,
    ) -> Result<()> {
        let options = match parent_core.inner.options() {
            Ok(options) => options,
            Err(ProposerVmError::NotOracle) => return Err(ProposerVmError::UnexpectedBlockType),
            Err(e) => return Err(e),
        };
        let envelope = &child.envelope;
        envelope.verify_signature(false, &self.config.chain_id)?;
        let inner_id = child.inner.id();
        if options.iter().all(|option| option.id() != inner_id) {
            return Err(ProposerVmError::InvalidOption(format!(
                "inner block {inner_id} is not a declared option"
            )));
        }
        if envelope.timestamp() != parent_core.envelope.timestamp() {
            return Err(ProposerVmError::InvalidOption(
                "timestamp not inherited from the parent".to_string(),
            ));
        }
        if envelope.p_chain_height() != parent_core.envelope.p_chain_height() {
            return Err(ProposerVmError::InvalidOption(
                "P-reference height not inherited from the parent".to_string(),
            ));
        }
        self.verify_and_record_inner(core, envelope.id(), &child.inner, token)
    }

    /// Verify the inner block at most once across all wrappers holding it,
    /// recording which wrappers reference the verified inner block.
    fn verify_and_record_inner(
        &self,
        core: &mut VmCore,
        wrapper_id: Hash,
        inner: &Arc<dyn InnerBlock>,
        token: &CancellationToken,
    ) -> Result<()> {
        let inner_id = inner.id();
        if let Some(wrappers) = core.verified_inner.get_mut(&inner_id) {
            wrappers.insert(wrapper_id);
            return Ok(());
        }
        ensure_active(token)?;
        inner.verify()?;
        core.verified_inner
            .insert(inner_id, HashSet::from([wrapper_id]));
        Ok(())
    }

    // ── Build edges ─────────────────────────────────────────────────────

    /// Build on a pre-fork parent: a bare inner block before activation, an
    /// unsigned transition wrapper once the parent has crossed it.
    fn build_on_pre_fork(
        &self,
        core: &mut VmCore,
        parent_inner: &Arc<dyn InnerBlock>,
        token: &CancellationToken,
    ) -> Result<BlockVariant> {
        let parent_timestamp = parent_inner.timestamp();
        if parent_timestamp < self.config.activation_time {
            ensure_active(token)?;
            let inner = self.inner_vm.build_block()?;
            info!(
                "built block {} at height {} (pre-activation)",
                inner.id(),
                inner.height()
            );
            return Ok(BlockVariant::PreFork(inner));
        }

        // The chain is forking under this build.
        let timestamp = self.now().max(parent_timestamp);
        ensure_active(token)?;
        let minimum_height = self.validator_state.minimum_height()?;
        let p_chain_height = minimum_height.max(self.config.minimum_p_chain_height);
        ensure_active(token)?;
        let inner = self.inner_vm.build_block()?;
        let envelope = Envelope::build_unsigned(
            parent_inner.id(),
            timestamp,
            p_chain_height,
            inner.bytes().to_vec(),
        );
        info!(
            "built transition block {} wrapping {} at height {}",
            envelope.id(),
            inner.id(),
            inner.height()
        );
        let variant = BlockVariant::PostFork(Arc::new(PostForkCore::new(
            envelope,
            inner,
            Status::Processing,
        )));
        core.live.insert(variant.id(), variant.clone());
        Ok(variant)
    }

    /// Build on a post-fork parent. Signed within this node's window;
    /// unsigned once the submission deadline has passed; otherwise refuse
    /// until the window opens.
    fn build_on_post_fork(
        &self,
        core: &mut VmCore,
        parent_core: &Arc<PostForkCore>,
        token: &CancellationToken,
    ) -> Result<BlockVariant> {
        let parent_id = parent_core.envelope.id();
        let parent_timestamp = parent_core.envelope.timestamp();
        let child_height = parent_core.inner.height().saturating_add(1);
        let timestamp = self.now().max(parent_timestamp);
        let delay = timestamp - parent_timestamp;

        ensure_active(token)?;
        let minimum_height = self.validator_state.minimum_height()?;
        let p_chain_height = minimum_height
            .max(self.config.minimum_p_chain_height)
            .max(parent_core.envelope.p_chain_height());

        if delay < MAX_BUILD_DELAY.as_secs() as i64 {
            let min_delay = self.windower.delay(
                self.validator_state.as_ref(),
                child_height,
                p_chain_height,
                &self.node_id,
                MAX_BUILD_WINDOWS,
            )?;
            let window_start = parent_timestamp.saturating_add(min_delay.as_secs() as i64);
            if timestamp < window_start {
                return Err(ProposerVmError::ProposerWindowNotStarted {
                    timestamp,
                    window_start,
                });
            }
        }

        ensure_active(token)?;
        let inner = self.inner_vm.build_block()?;
        let envelope = if delay >= MAX_VERIFY_DELAY.as_secs() as i64 {
            Envelope::build_unsigned(
                parent_id,
                timestamp,
                p_chain_height,
                inner.bytes().to_vec(),
            )
        } else {
            Envelope::build_signed(
                parent_id,
                timestamp,
                p_chain_height,
                inner.bytes().to_vec(),
                &self.signer,
                &self.config.chain_id,
            )
        };
        info!(
            "built block {} wrapping {} at height {} (signed: {}, parent timestamp: {}, block timestamp: {})",
            envelope.id(),
            inner.id(),
            child_height,
            envelope.is_signed(),
            parent_timestamp,
            timestamp,
        );
        let variant = BlockVariant::PostFork(Arc::new(PostForkCore::new(
            envelope,
            inner,
            Status::Processing,
        )));
        core.live.insert(variant.id(), variant.clone());
        Ok(variant)
    }
}

fn ensure_active(token: &CancellationToken) -> Result<()> {
    if token.is_cancelled() {
        return Err(ProposerVmError::Canceled);
    }
    Ok(())
}

fn is_oracle(inner: &Arc<dyn InnerBlock>) -> Result<bool> {
    match inner.options() {
        Ok(_) => Ok(true),
        Err(ProposerVmError::NotOracle) => Ok(false),
        Err(e) => Err(e),
    }
}
