//! Smart wallet (ERC-4337) primitive types
//!
//! This crate contains the user operation type with its binding hash, the
//! per-network configuration map, and the signer identities used to
//! authorize operations.

pub mod config;
pub mod constants;
pub mod signer;
mod user_operation;
mod utils;

pub use config::{ConfigError, ContractAddresses, NetworkConfig, Networks, UserOpGas};
pub use signer::{ExternalSigner, HardwareKind, LocalSigner, SignerBridge, SignerIdentity};
pub use user_operation::{UserOperation, UserOperationHash};
