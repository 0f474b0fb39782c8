//! Operation batch builder
//!
//! Turns a list of target calls into a fully signed, nonce-sequenced list
//! of user operations. The sender's nonce is read once per batch and
//! advanced locally; the chain-side nonce does not move until the whole
//! batch commits, so re-querying mid-batch would hand out duplicates.

use crate::{error::ClientResult, signature::SignatureAggregator};
use calyx_contracts::account_api::ExecuteCall;
use calyx_primitives::{
    constants::fee::{DEFAULT_MAX_FEE_PER_GAS, DEFAULT_MAX_PRIORITY_FEE_PER_GAS},
    UserOpGas, UserOperation,
};
use ethers::{
    abi::AbiEncode,
    types::{Address, Bytes, U256},
};
use tracing::debug;

/// One target call to be wrapped in the account's `execute` encoding
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Call {
    /// Call target
    pub to: Address,
    /// Native value forwarded with the call
    pub value: U256,
    /// Encoded function call payload
    pub data: Bytes,
}

impl Call {
    pub fn new(to: Address, data: Bytes) -> Self {
        Self { to, value: U256::zero(), data }
    }
}

/// Input of a batch: raw target calls still to be wrapped and signed, or
/// operations that were already built and signed elsewhere (passed through
/// untouched)
#[derive(Clone, Debug)]
pub enum BatchInput {
    Calls(Vec<Call>),
    Operations(Vec<UserOperation>),
}

/// Builds signed operation batches for one account on one network
#[derive(Clone, Debug)]
pub struct BatchBuilder {
    account: Address,
    entry_point: Address,
    chain_id: u64,
    gas: UserOpGas,
    paymaster: Option<Address>,
    max_fee_per_gas: U256,
    max_priority_fee_per_gas: U256,
}

impl BatchBuilder {
    pub fn new(account: Address, entry_point: Address, chain_id: u64, gas: UserOpGas) -> Self {
        Self {
            account,
            entry_point,
            chain_id,
            gas,
            paymaster: None,
            max_fee_per_gas: DEFAULT_MAX_FEE_PER_GAS.into(),
            max_priority_fee_per_gas: DEFAULT_MAX_PRIORITY_FEE_PER_GAS.into(),
        }
    }

    /// Routes fees through the given sponsoring paymaster
    pub fn paymaster(mut self, paymaster: Address) -> Self {
        self.paymaster = Some(paymaster);
        self
    }

    /// Overrides the default fee bids
    pub fn fees(mut self, max_fee_per_gas: U256, max_priority_fee_per_gas: U256) -> Self {
        self.max_fee_per_gas = max_fee_per_gas;
        self.max_priority_fee_per_gas = max_priority_fee_per_gas;
        self
    }

    pub fn sponsored(&self) -> bool {
        self.paymaster.is_some()
    }

    pub fn account(&self) -> Address {
        self.account
    }

    /// Builds one unsigned operation at the given nonce
    pub fn user_operation(&self, nonce: U256, call_data: Bytes) -> UserOperation {
        UserOperation::default()
            .sender(self.account)
            .nonce(nonce)
            .call_data(call_data)
            .call_gas_limit(self.gas.call_gas_limit)
            .verification_gas_limit(self.gas.verification_gas_limit)
            .pre_verification_gas(self.gas.pre_verification_gas)
            .max_fee_per_gas(self.max_fee_per_gas)
            .max_priority_fee_per_gas(self.max_priority_fee_per_gas)
            .paymaster_and_data(
                self.paymaster.map(|p| Bytes::from(p.as_bytes().to_vec())).unwrap_or_default(),
            )
    }

    /// Wraps the calls in the account's `execute` encoding, assigns nonces
    /// `base, base+1, ...` and signs each operation.
    ///
    /// `app_signer` is the account's delegated signing key for the batch
    /// target, when one is set: if that key is among the supplied local
    /// identities, only it signs - a shortcut, not a correctness
    /// requirement; the composite signature stays verifiable either way.
    pub async fn assemble(
        &self,
        base_nonce: U256,
        calls: &[Call],
        aggregator: &SignatureAggregator,
        app_signer: Option<Address>,
    ) -> ClientResult<Vec<UserOperation>> {
        let delegated = app_signer.and_then(|addr| aggregator.local_identity(addr)).cloned();
        if delegated.is_some() {
            debug!("app key {app_signer:?} is delegated, signing with it alone");
        }

        let mut ops = Vec::with_capacity(calls.len());
        for (i, call) in calls.iter().enumerate() {
            let call_data: Bytes = ExecuteCall {
                dest: call.to,
                value: call.value,
                func: call.data.clone(),
            }
            .encode()
            .into();

            let op = self.user_operation(base_nonce + i, call_data);
            let hash = op.hash(&self.entry_point, self.chain_id);
            let signature = match &delegated {
                Some(identity) => {
                    aggregator.sign_with(std::slice::from_ref(identity), &hash).await?
                }
                None => aggregator.sign(&hash).await?,
            };
            ops.push(op.signature(signature));
        }

        debug!(
            "assembled batch of {} operations for {:?}, nonces {}..={}",
            ops.len(),
            self.account,
            base_nonce,
            base_nonce + ops.len().saturating_sub(1)
        );
        Ok(ops)
    }
}
