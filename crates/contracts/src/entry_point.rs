pub use super::gen::{
    entry_point_api, EntryPointAPI, EntryPointAPIEvents, UserOperationEventFilter,
    UserOperationRevertReasonFilter,
};
use crate::error::ContractsError;
use ethers::{
    abi::RawLog,
    contract::{builders::ContractCall, EthEvent},
    providers::Middleware,
    types::{Address, TransactionReceipt, H256},
};
use std::sync::Arc;

/// Typed handle to the entry point contract
pub struct EntryPoint<M: Middleware + 'static> {
    eth_client: Arc<M>,
    address: Address,
    api: EntryPointAPI<M>,
}

impl<M: Middleware + 'static> Clone for EntryPoint<M> {
    fn clone(&self) -> Self {
        Self {
            eth_client: self.eth_client.clone(),
            address: self.address,
            api: self.api.clone(),
        }
    }
}

impl<M: Middleware + 'static> EntryPoint<M> {
    pub fn new(eth_client: Arc<M>, address: Address) -> Self {
        let api = EntryPointAPI::new(address, eth_client.clone());
        Self { eth_client, address, api }
    }

    pub fn api(&self) -> &EntryPointAPI<M> {
        &self.api
    }

    pub fn eth_client(&self) -> Arc<M> {
        self.eth_client.clone()
    }

    pub fn address(&self) -> Address {
        self.address
    }

    /// Builds the `handleOps` call for a finalized batch. The beneficiary
    /// collects the unused gas refund.
    pub fn handle_ops_call(
        &self,
        ops: Vec<calyx_primitives::UserOperation>,
        beneficiary: Address,
    ) -> ContractCall<M, ()> {
        self.api.handle_ops(ops.into_iter().map(Into::into).collect(), beneficiary)
    }
}

/// Topic identifying the per-operation revert reason event
pub fn revert_reason_topic() -> H256 {
    UserOperationRevertReasonFilter::signature()
}

/// Scans receipt logs for the operation revert reason event.
///
/// A receipt that succeeded at the ledger level can still carry this event
/// when a batched operation logically failed. `None` means no such event was
/// emitted; a decode failure still reports that the event was present.
pub fn find_operation_revert(
    receipt: &TransactionReceipt,
) -> Option<Result<UserOperationRevertReasonFilter, ContractsError>> {
    let topic = revert_reason_topic();
    let log = receipt.logs.iter().find(|log| log.topics.first() == Some(&topic))?;

    let raw = RawLog { topics: log.topics.clone(), data: log.data.to_vec() };
    Some(
        <UserOperationRevertReasonFilter as EthEvent>::decode_log(&raw)
            .map_err(|e| ContractsError::Decode { inner: e.to_string() }),
    )
}
