//! Batch submission and outcome decoding
//!
//! `handleOps` is atomic at the ledger level but not at the operation
//! level: the transaction can succeed while an individual operation's
//! payload reverted. The entry point reports those through a
//! `UserOperationRevertReason` event, so a mined receipt must be scanned
//! before the batch can be called done.

use crate::error::{ClientError, ClientResult};
use calyx_contracts::{decode_revert_string, find_operation_revert, EntryPoint};
use calyx_primitives::UserOperation;
use ethers::{
    providers::Middleware,
    types::{Address, TransactionReceipt, U256},
};
use std::time::Duration;
use tracing::{info, warn};

/// Submits finalized batches to the entry point and classifies the outcome
pub struct Submitter<M: Middleware + 'static> {
    entry_point: EntryPoint<M>,
    beneficiary: Address,
}

impl<M: Middleware + 'static> Submitter<M> {
    /// The beneficiary collects the entry point's gas refund, usually the
    /// relaying signer itself
    pub fn new(entry_point: EntryPoint<M>, beneficiary: Address) -> Self {
        Self { entry_point, beneficiary }
    }

    pub fn entry_point(&self) -> &EntryPoint<M> {
        &self.entry_point
    }

    /// Sends the batch through `handleOps` and waits for the receipt.
    ///
    /// A transaction that never mines or is dropped from the mempool is a
    /// `SubmissionFailure`; a mined transaction that carries an operation
    /// revert event is a `PartialExecutionFailure`.
    pub async fn submit(&self, ops: Vec<UserOperation>) -> ClientResult<TransactionReceipt> {
        let count = ops.len();
        let call = self.entry_point.handle_ops_call(ops, self.beneficiary);

        let pending = call
            .send()
            .await
            .map_err(|e| ClientError::SubmissionFailure { inner: e.to_string() })?
            .interval(Duration::from_millis(75));
        let tx_hash = pending.tx_hash();
        info!("submitted batch of {count} operation(s), transaction {tx_hash:?}");

        let receipt = pending
            .await
            .map_err(|e| ClientError::SubmissionFailure { inner: e.to_string() })?
            .ok_or_else(|| ClientError::SubmissionFailure {
                inner: format!("transaction {tx_hash:?} was dropped from the mempool"),
            })?;

        classify_receipt(&receipt)?;
        info!("batch mined in block {:?}", receipt.block_number);
        Ok(receipt)
    }
}

/// Decides whether a mined receipt represents a fully successful batch
pub fn classify_receipt(receipt: &TransactionReceipt) -> ClientResult<()> {
    if receipt.status != Some(1.into()) {
        return Err(ClientError::SubmissionFailure {
            inner: format!("transaction {:?} reverted", receipt.transaction_hash),
        });
    }

    match find_operation_revert(receipt) {
        None => Ok(()),
        Some(Ok(event)) => {
            let reason = decode_revert_string(&event.revert_reason)
                .unwrap_or_else(|| event.revert_reason.to_string());
            Err(ClientError::PartialExecutionFailure { nonce: event.nonce, reason })
        }
        Some(Err(e)) => {
            warn!("operation revert event present but undecodable: {e}");
            Err(ClientError::PartialExecutionFailure {
                nonce: U256::zero(),
                reason: format!("revert event payload could not be decoded: {e}"),
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use calyx_contracts::revert_reason_topic;
    use ethers::{
        abi::{AbiEncode, Address},
        types::{Bytes, Log, H256},
    };

    fn receipt(status: u64, logs: Vec<Log>) -> TransactionReceipt {
        TransactionReceipt { status: Some(status.into()), logs, ..Default::default() }
    }

    fn revert_log(nonce: U256, reason: Bytes) -> Log {
        Log {
            topics: vec![
                revert_reason_topic(),
                H256::random(),
                H256::from_slice(&Address::random().encode()),
            ],
            data: (nonce, reason).encode().into(),
            ..Default::default()
        }
    }

    #[test]
    fn clean_mined_receipt_is_success() {
        assert!(classify_receipt(&receipt(1, vec![])).is_ok());
        let unrelated = Log { topics: vec![H256::random()], ..Default::default() };
        assert!(classify_receipt(&receipt(1, vec![unrelated])).is_ok());
    }

    #[test]
    fn reverted_transaction_is_a_submission_failure() {
        let err = classify_receipt(&receipt(0, vec![])).unwrap_err();
        assert!(matches!(err, ClientError::SubmissionFailure { .. }));
    }

    #[test]
    fn operation_revert_overrides_ledger_success() {
        let reason = "app not whitelisted".to_string();
        let data: Bytes =
            [vec![0x08, 0xc3, 0x79, 0xa0], reason.clone().encode()].concat().into();
        let err =
            classify_receipt(&receipt(1, vec![revert_log(9.into(), data)])).unwrap_err();

        match err {
            ClientError::PartialExecutionFailure { nonce, reason: decoded } => {
                assert_eq!(nonce, U256::from(9));
                assert_eq!(decoded, reason);
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn opaque_revert_data_is_reported_as_hex() {
        let raw: Bytes = "0x0102aabb".parse().unwrap();
        let err =
            classify_receipt(&receipt(1, vec![revert_log(2.into(), raw.clone())])).unwrap_err();

        match err {
            ClientError::PartialExecutionFailure { reason, .. } => {
                assert_eq!(reason, raw.to_string());
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn undecodable_event_is_still_a_failure() {
        let log = Log {
            topics: vec![
                revert_reason_topic(),
                H256::random(),
                H256::from_slice(&Address::random().encode()),
            ],
            data: Bytes::from_static(b"\x00\x01"),
            ..Default::default()
        };
        let err = classify_receipt(&receipt(1, vec![log])).unwrap_err();
        assert!(matches!(err, ClientError::PartialExecutionFailure { .. }));
    }
}
