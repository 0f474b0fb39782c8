//! Signing identities and the external signer capability
//!
//! The core never talks to signing hardware directly. Vendor bridges
//! (Ledger, Trezor, ...) implement [`ExternalSigner`] outside this
//! workspace; [`LocalSigner`] is the in-tree reference implementation over a
//! raw private key.

use async_trait::async_trait;
use ethers::{
    prelude::k256::ecdsa::SigningKey,
    signers::{LocalWallet, Signer},
    types::{Address, Bytes, H256},
};
use std::{fmt, str::FromStr, sync::Arc};

/// Narrow signing capability satisfied by a local key or a hardware device
/// bridge.
///
/// A given implementation represents one physical device (or key) and must
/// not be invoked concurrently from two signing requests; the aggregation
/// flow calls it strictly sequentially.
#[async_trait]
pub trait ExternalSigner: Send + Sync {
    /// Address of the signing identity
    async fn address(&self) -> eyre::Result<Address>;

    /// Signs a raw 32-byte digest without any message prefix
    async fn sign_digest(&self, digest: H256) -> eyre::Result<Bytes>;

    /// Signs a message per the standard signed-message convention (the
    /// implementation applies the prefix), returning a 65-byte r || s || v
    /// component
    async fn sign_message(&self, message: &[u8]) -> eyre::Result<Bytes>;
}

/// Signer backed by a raw private key held in memory
#[derive(Clone, Debug)]
pub struct LocalSigner {
    signer: LocalWallet,
}

impl LocalSigner {
    /// Wraps an existing ethers wallet
    pub fn new(signer: ethers::signers::Wallet<SigningKey>) -> Self {
        Self { signer }
    }

    /// Parses a hex-encoded private key (with or without `0x` prefix)
    pub fn from_private_key(key: &str) -> eyre::Result<Self> {
        let key = key.strip_prefix("0x").unwrap_or(key);
        Ok(Self { signer: LocalWallet::from_str(key)? })
    }

    /// Address derived from the private key
    pub fn address(&self) -> Address {
        self.signer.address()
    }
}

#[async_trait]
impl ExternalSigner for LocalSigner {
    async fn address(&self) -> eyre::Result<Address> {
        Ok(self.signer.address())
    }

    async fn sign_digest(&self, digest: H256) -> eyre::Result<Bytes> {
        let sig = self.signer.sign_hash(digest)?;
        Ok(sig.to_vec().into())
    }

    async fn sign_message(&self, message: &[u8]) -> eyre::Result<Bytes> {
        let sig = self.signer.sign_message(message).await?;
        Ok(sig.to_vec().into())
    }
}

/// Hardware wallet class an identity can delegate to
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum HardwareKind {
    Ledger,
    Trezor,
}

impl fmt::Display for HardwareKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            HardwareKind::Ledger => write!(f, "ledger"),
            HardwareKind::Trezor => write!(f, "trezor"),
        }
    }
}

/// One signing identity in the ordered list authorizing an operation
#[derive(Clone)]
pub enum SignerIdentity {
    /// Raw private key signing locally
    Key(LocalSigner),
    /// Delegation to a hardware device bridge of the given class
    Hardware(HardwareKind),
}

impl SignerIdentity {
    /// Parses an identity: the hardware class markers `ledger` and `trezor`
    /// denote device delegation, anything else is treated as a raw private
    /// key
    pub fn parse(s: &str) -> eyre::Result<Self> {
        match s.to_lowercase().as_str() {
            "ledger" => Ok(Self::Hardware(HardwareKind::Ledger)),
            "trezor" => Ok(Self::Hardware(HardwareKind::Trezor)),
            key => Ok(Self::Key(LocalSigner::from_private_key(key)?)),
        }
    }

    /// Address of the identity when it is known locally
    pub fn local_address(&self) -> Option<Address> {
        match self {
            Self::Key(signer) => Some(signer.address()),
            Self::Hardware(_) => None,
        }
    }
}

impl fmt::Debug for SignerIdentity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Key(signer) => write!(f, "SignerIdentity::Key({:?})", signer.address()),
            Self::Hardware(kind) => write!(f, "SignerIdentity::Hardware({kind})"),
        }
    }
}

/// Shared handle to an external signer bridge
pub type SignerBridge = Arc<dyn ExternalSigner>;

#[cfg(test)]
mod tests {
    use super::*;
    use ethers::utils::hash_message;

    const KEY: &str = "0x4c0883a69102937d6231471b5dbb6204fe5129617082792ae468d01a3f362318";

    #[test]
    fn parse_identities() {
        assert!(matches!(
            SignerIdentity::parse("trezor").unwrap(),
            SignerIdentity::Hardware(HardwareKind::Trezor)
        ));
        assert!(matches!(
            SignerIdentity::parse("Ledger").unwrap(),
            SignerIdentity::Hardware(HardwareKind::Ledger)
        ));
        assert!(matches!(SignerIdentity::parse(KEY).unwrap(), SignerIdentity::Key(_)));
        assert!(SignerIdentity::parse("not-a-key").is_err());
    }

    #[tokio::test]
    async fn local_signer_component_is_recoverable() {
        let signer = LocalSigner::from_private_key(KEY).unwrap();
        let message = H256::random();

        let component = signer.sign_message(message.as_bytes()).await.unwrap();
        assert_eq!(component.len(), 65);

        let sig = ethers::types::Signature::try_from(component.as_ref()).unwrap();
        let recovered = sig.recover(hash_message(message.as_bytes())).unwrap();
        assert_eq!(recovered, signer.address());
    }
}
