use calyx_contracts::ContractsError;
use calyx_primitives::{ConfigError, HardwareKind};
use ethers::types::{Address, U256};
use thiserror::Error;

pub type ClientResult<T> = Result<T, ClientError>;

/// SDK errors.
///
/// Every variant aborts the current flow; the core never retries. Retry
/// policy, if any, belongs to the caller.
#[derive(Debug, Error)]
pub enum ClientError {
    /// No configuration entry for the requested network
    #[error("no configuration for chain id {chain_id}")]
    MissingConfiguration {
        /// The requested chain id
        chain_id: u64,
    },

    /// The paying account cannot cover the worst-case cost of the batch
    #[error("{payer:?} balance {balance} is less than the required max cost {required}")]
    InsufficientBalance {
        /// Account that pays for the batch (the account itself or a sponsor)
        payer: Address,
        /// Current balance of the payer
        balance: U256,
        /// Worst-case cost of the whole batch
        required: U256,
    },

    /// Too few signing identities for the account's signer policy
    #[error("signer policy requires {required} signers, got {provided}")]
    SignerPolicyUnmet {
        /// Signers required by the policy
        required: u64,
        /// Signers supplied by the caller
        provided: u64,
    },

    /// A hardware device bridge failed or refused to sign
    #[error("hardware signer {kind} unavailable: {inner}")]
    HardwareSignerUnavailable {
        /// Hardware class of the failing bridge
        kind: HardwareKind,
        /// The inner error message
        inner: String,
    },

    /// The ledger-level transaction succeeded but a batched operation
    /// reverted
    #[error("user operation with nonce {nonce} reverted: {reason}")]
    PartialExecutionFailure {
        /// Nonce of the reverted operation
        nonce: U256,
        /// Decoded revert reason, or the raw data in hex when it could not
        /// be decoded
        reason: String,
    },

    /// Transport or ledger-level rejection of the submission
    #[error("submission failed: {inner}")]
    SubmissionFailure {
        /// The inner error message
        inner: String,
    },

    /// Contract interaction error
    #[error(transparent)]
    Contract(#[from] ContractsError),

    /// Provider error
    #[error("provider error: {inner}")]
    Provider {
        /// The inner error message
        inner: String,
    },
}

impl From<ConfigError> for ClientError {
    fn from(err: ConfigError) -> Self {
        match err {
            ConfigError::MissingConfiguration { chain_id } => {
                Self::MissingConfiguration { chain_id }
            }
        }
    }
}
