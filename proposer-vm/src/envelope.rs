//! Block envelope codec.
//!
//! An envelope wraps an inner block's bytes with proposer metadata: the
//! outer parent id, a seconds-resolution timestamp, and the P-reference
//! height snapshotting the validator set. Signed envelopes additionally
//! carry the proposer's certificate and a signature binding the envelope to
//! the chain id. Unsigned envelopes denote blocks proposed outside any
//! proposer's window.
//!
//! ## Wire format
//!
//! Fixed field order, little-endian integers, no framing:
//!
//! ```text
//! [parent_id: 32B] [timestamp: i64] [p_chain_height: u64]
//! [inner_len: u32] [inner_bytes]
//! ( [cert_len: u32] [cert: 32B] [sig_len: u32] [sig: 64B] )?
//! ```
//!
//! Absence of the trailing triple denotes an unsigned envelope. Parsing is
//! strict: truncated fields, wrong certificate/signature lengths, or
//! trailing garbage all fail. The envelope id is the SHA-256 of the
//! serialized form; the bytes are the unit of transport and persistence.

use {
    crate::error::{ProposerVmError, Result},
    ed25519_dalek::{Signature, Signer, SigningKey, Verifier, VerifyingKey},
    solana_hash::Hash,
    solana_pubkey::Pubkey,
};

/// Certificate length on the wire: an Ed25519 verifying key.
pub const CERT_LEN: usize = 32;
/// Signature length on the wire.
pub const SIG_LEN: usize = 64;

/// Proposer credential carried by signed envelopes.
#[derive(Debug, Clone)]
struct ProposerCredential {
    cert: [u8; CERT_LEN],
    signature: [u8; SIG_LEN],
}

/// A parsed or freshly-built block envelope.
#[derive(Debug, Clone)]
pub struct Envelope {
    parent_id: Hash,
    timestamp: i64,
    p_chain_height: u64,
    inner_bytes: Vec<u8>,
    credential: Option<ProposerCredential>,
    /// Canonical serialized form, fixed at construction.
    bytes: Vec<u8>,
    /// SHA-256 of `bytes`, fixed at construction.
    id: Hash,
}

impl Envelope {
    /// Build an unsigned envelope.
    pub fn build_unsigned(
        parent_id: Hash,
        timestamp: i64,
        p_chain_height: u64,
        inner_bytes: Vec<u8>,
    ) -> Self {
        let bytes = serialize(parent_id, timestamp, p_chain_height, &inner_bytes, None);
        let id = solana_sha256_hasher::hash(&bytes);
        Self {
            parent_id,
            timestamp,
            p_chain_height,
            inner_bytes,
            credential: None,
            bytes,
            id,
        }
    }

    /// Build a signed envelope. The signature covers the serialized fields
    /// up to and including the certificate, concatenated with `chain_id`.
    pub fn build_signed(
        parent_id: Hash,
        timestamp: i64,
        p_chain_height: u64,
        inner_bytes: Vec<u8>,
        signer: &SigningKey,
        chain_id: &Hash,
    ) -> Self {
        let cert = signer.verifying_key().to_bytes();
        let message = signed_message(
            parent_id,
            timestamp,
            p_chain_height,
            &inner_bytes,
            &cert,
            chain_id,
        );
        let signature = signer.sign(&message).to_bytes();
        let credential = ProposerCredential { cert, signature };
        let bytes = serialize(
            parent_id,
            timestamp,
            p_chain_height,
            &inner_bytes,
            Some(&credential),
        );
        let id = solana_sha256_hasher::hash(&bytes);
        Self {
            parent_id,
            timestamp,
            p_chain_height,
            inner_bytes,
            credential: Some(credential),
            bytes,
            id,
        }
    }

    /// Strictly parse an envelope from its canonical encoding.
    pub fn parse(bytes: &[u8]) -> Result<Self> {
        let mut cursor = Cursor::new(bytes);
        let parent_id = cursor.read_hash()?;
        let timestamp = cursor.read_i64()?;
        let p_chain_height = cursor.read_u64()?;
        let inner_len = cursor.read_u32()? as usize;
        let inner_bytes = cursor.read_bytes(inner_len)?.to_vec();

        let credential = if cursor.is_empty() {
            None
        } else {
            let cert_len = cursor.read_u32()? as usize;
            if cert_len != CERT_LEN {
                return Err(ProposerVmError::Parse(format!(
                    "certificate length {cert_len} != {CERT_LEN}"
                )));
            }
            let cert: [u8; CERT_LEN] = cursor
                .read_bytes(CERT_LEN)?
                .try_into()
                .expect("length checked");
            let sig_len = cursor.read_u32()? as usize;
            if sig_len != SIG_LEN {
                return Err(ProposerVmError::Parse(format!(
                    "signature length {sig_len} != {SIG_LEN}"
                )));
            }
            let signature: [u8; SIG_LEN] = cursor
                .read_bytes(SIG_LEN)?
                .try_into()
                .expect("length checked");
            Some(ProposerCredential { cert, signature })
        };

        if !cursor.is_empty() {
            return Err(ProposerVmError::Parse(format!(
                "{} trailing bytes after envelope",
                cursor.remaining()
            )));
        }

        let id = solana_sha256_hasher::hash(bytes);
        Ok(Self {
            parent_id,
            timestamp,
            p_chain_height,
            inner_bytes,
            credential,
            bytes: bytes.to_vec(),
            id,
        })
    }

    /// Verify presence/absence of the proposer credential and, when
    /// present, the signature over the envelope fields and `chain_id`.
    pub fn verify_signature(&self, expect_signed: bool, chain_id: &Hash) -> Result<()> {
        let credential = match (&self.credential, expect_signed) {
            (None, false) => return Ok(()),
            (None, true) => {
                return Err(ProposerVmError::InvalidSignature(
                    "expected a signed envelope".to_string(),
                ))
            }
            (Some(_), false) => {
                return Err(ProposerVmError::InvalidSignature(
                    "expected an unsigned envelope".to_string(),
                ))
            }
            (Some(credential), true) => credential,
        };

        let key = VerifyingKey::from_bytes(&credential.cert)
            .map_err(|e| ProposerVmError::InvalidSignature(format!("bad certificate: {e}")))?;
        let message = signed_message(
            self.parent_id,
            self.timestamp,
            self.p_chain_height,
            &self.inner_bytes,
            &credential.cert,
            chain_id,
        );
        key.verify(&message, &Signature::from_bytes(&credential.signature))
            .map_err(|e| ProposerVmError::InvalidSignature(e.to_string()))
    }

    /// Envelope id: SHA-256 of the canonical encoding.
    pub fn id(&self) -> Hash {
        self.id
    }

    /// Id of the parent wrapper.
    pub fn parent_id(&self) -> Hash {
        self.parent_id
    }

    /// Envelope timestamp, unix seconds.
    pub fn timestamp(&self) -> i64 {
        self.timestamp
    }

    /// Declared P-reference height.
    pub fn p_chain_height(&self) -> u64 {
        self.p_chain_height
    }

    /// The wrapped inner block's bytes.
    pub fn inner_bytes(&self) -> &[u8] {
        &self.inner_bytes
    }

    /// Canonical serialized form.
    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    /// Whether the envelope carries a proposer credential.
    pub fn is_signed(&self) -> bool {
        self.credential.is_some()
    }

    /// Node id of the proposer, when signed. The node id shares its bytes
    /// with the certificate's verifying key.
    pub fn proposer(&self) -> Option<Pubkey> {
        self.credential
            .as_ref()
            .map(|c| Pubkey::new_from_array(c.cert))
    }
}

fn serialize(
    parent_id: Hash,
    timestamp: i64,
    p_chain_height: u64,
    inner_bytes: &[u8],
    credential: Option<&ProposerCredential>,
) -> Vec<u8> {
    let mut buf = unsigned_prefix(parent_id, timestamp, p_chain_height, inner_bytes);
    if let Some(credential) = credential {
        buf.extend_from_slice(&(CERT_LEN as u32).to_le_bytes());
        buf.extend_from_slice(&credential.cert);
        buf.extend_from_slice(&(SIG_LEN as u32).to_le_bytes());
        buf.extend_from_slice(&credential.signature);
    }
    buf
}

fn unsigned_prefix(
    parent_id: Hash,
    timestamp: i64,
    p_chain_height: u64,
    inner_bytes: &[u8],
) -> Vec<u8> {
    let mut buf = Vec::with_capacity(32 + 8 + 8 + 4 + inner_bytes.len());
    buf.extend_from_slice(parent_id.as_ref());
    buf.extend_from_slice(&timestamp.to_le_bytes());
    buf.extend_from_slice(&p_chain_height.to_le_bytes());
    buf.extend_from_slice(&(inner_bytes.len() as u32).to_le_bytes());
    buf.extend_from_slice(inner_bytes);
    buf
}

/// The byte string a signed envelope's signature covers.
fn signed_message(
    parent_id: Hash,
    timestamp: i64,
    p_chain_height: u64,
    inner_bytes: &[u8],
    cert: &[u8; CERT_LEN],
    chain_id: &Hash,
) -> Vec<u8> {
    let mut buf = unsigned_prefix(parent_id, timestamp, p_chain_height, inner_bytes);
    buf.extend_from_slice(&(CERT_LEN as u32).to_le_bytes());
    buf.extend_from_slice(cert);
    buf.extend_from_slice(chain_id.as_ref());
    buf
}

/// Strict byte cursor; every read is bounds-checked and the caller asserts
/// exhaustion at the end.
struct Cursor<'a> {
    bytes: &'a [u8],
    offset: usize,
}

impl<'a> Cursor<'a> {
    fn new(bytes: &'a [u8]) -> Self {
        Self { bytes, offset: 0 }
    }

    fn remaining(&self) -> usize {
        self.bytes.len() - self.offset
    }

    fn is_empty(&self) -> bool {
        self.remaining() == 0
    }

    fn read_bytes(&mut self, len: usize) -> Result<&'a [u8]> {
        if self.remaining() < len {
            return Err(ProposerVmError::Parse(format!(
                "need {len} bytes at offset {}, have {}",
                self.offset,
                self.remaining()
            )));
        }
        let out = &self.bytes[self.offset..self.offset + len];
        self.offset += len;
        Ok(out)
    }

    fn read_hash(&mut self) -> Result<Hash> {
        let raw: [u8; 32] = self.read_bytes(32)?.try_into().expect("length checked");
        Ok(Hash::new_from_array(raw))
    }

    fn read_i64(&mut self) -> Result<i64> {
        let raw: [u8; 8] = self.read_bytes(8)?.try_into().expect("length checked");
        Ok(i64::from_le_bytes(raw))
    }

    fn read_u64(&mut self) -> Result<u64> {
        let raw: [u8; 8] = self.read_bytes(8)?.try_into().expect("length checked");
        Ok(u64::from_le_bytes(raw))
    }

    fn read_u32(&mut self) -> Result<u32> {
        let raw: [u8; 4] = self.read_bytes(4)?.try_into().expect("length checked");
        Ok(u32::from_le_bytes(raw))
    }
}
