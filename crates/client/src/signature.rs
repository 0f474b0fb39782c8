//! Composite signature aggregation
//!
//! An operation is authorized by one composite signature: the 65-byte
//! r || s || v components of every signing identity, concatenated in the
//! exact order the identities were supplied. The verifying account contract
//! expects the same order.

use crate::error::{ClientError, ClientResult};
use calyx_primitives::{
    ExternalSigner, HardwareKind, SignerBridge, SignerIdentity, UserOperationHash,
};
use ethers::types::{Address, Bytes, U256};
use std::collections::HashMap;
use tracing::{debug, trace};

/// Number of signers the account's policy requires.
///
/// The special-valued policy modes are configuration inherited from the
/// wallet contract: `1` - any single owner, `3` - all owners, `4` - a fixed
/// pair, anything else - all but one owner.
pub fn required_signers(policy: U256, owners_count: U256) -> u64 {
    // both values come straight from the chain; clamp instead of panicking
    // on an out-of-range read
    let owners = saturating_u64(owners_count);
    match saturating_u64(policy) {
        1 => 1,
        3 => owners,
        4 => 2,
        _ => owners.saturating_sub(1),
    }
}

fn saturating_u64(value: U256) -> u64 {
    value.min(U256::from(u64::MAX)).low_u64()
}

/// Aggregates per-identity signature components into one composite
/// signature over the binding hash of an operation.
#[derive(Clone, Default)]
pub struct SignatureAggregator {
    identities: Vec<SignerIdentity>,
    bridges: HashMap<HardwareKind, SignerBridge>,
}

impl SignatureAggregator {
    /// Creates an aggregator over an ordered list of signing identities
    pub fn new(identities: Vec<SignerIdentity>) -> Self {
        Self { identities, bridges: HashMap::new() }
    }

    /// Registers the bridge serving one hardware class. A bridge represents
    /// a single physical device and is invoked sequentially, never from two
    /// signing requests at once.
    pub fn with_bridge(mut self, kind: HardwareKind, bridge: SignerBridge) -> Self {
        self.bridges.insert(kind, bridge);
        self
    }

    /// The ordered identities this aggregator signs with
    pub fn identities(&self) -> &[SignerIdentity] {
        &self.identities
    }

    /// Finds the local identity matching the given address, if present
    pub fn local_identity(&self, address: Address) -> Option<&SignerIdentity> {
        self.identities.iter().find(|id| id.local_address() == Some(address))
    }

    /// Fails with `SignerPolicyUnmet` when fewer identities are supplied
    /// than the account's signer policy requires. Run before any signing so
    /// a doomed operation never reaches a hardware device.
    pub fn check_policy(&self, policy: U256, owners_count: U256) -> ClientResult<()> {
        let required = required_signers(policy, owners_count);
        let provided = self.identities.len() as u64;
        if provided < required {
            return Err(ClientError::SignerPolicyUnmet { required, provided });
        }
        Ok(())
    }

    /// Produces the composite signature for a binding hash using all
    /// identities in order
    pub async fn sign(&self, hash: &UserOperationHash) -> ClientResult<Bytes> {
        self.sign_with(&self.identities, hash).await
    }

    /// Produces the composite signature using the given subset of
    /// identities (the app-key path signs with a single delegated key)
    pub async fn sign_with(
        &self,
        identities: &[SignerIdentity],
        hash: &UserOperationHash,
    ) -> ClientResult<Bytes> {
        let mut signature: Vec<u8> = Vec::with_capacity(identities.len() * 65);

        for identity in identities {
            let component = match identity {
                SignerIdentity::Key(signer) => {
                    trace!("signing {hash:?} with local key {:?}", signer.address());
                    signer.sign_message(hash.as_bytes()).await.map_err(|e| {
                        ClientError::Provider { inner: e.to_string() }
                    })?
                }
                SignerIdentity::Hardware(kind) => {
                    let bridge = self.bridges.get(kind).ok_or_else(|| {
                        ClientError::HardwareSignerUnavailable {
                            kind: *kind,
                            inner: "no bridge registered".into(),
                        }
                    })?;
                    debug!("delegating signature of {hash:?} to {kind} device");
                    bridge.sign_message(hash.as_bytes()).await.map_err(|e| {
                        ClientError::HardwareSignerUnavailable { kind: *kind, inner: e.to_string() }
                    })?
                }
            };
            signature.extend_from_slice(&component);
        }

        Ok(signature.into())
    }
}
