//! Wallet client
//!
//! Ties the pieces together: one `WalletClient` per (network, account)
//! pair, holding the typed contract handles, the signing identities and
//! the submission path. Flows read chain state once up front (nonce,
//! policy, fees), build and sign locally, run the prefund guard and only
//! then touch state. One batch in flight per account at a time; nonce
//! sequencing relies on it.

use crate::{
    batch::{BatchBuilder, BatchInput, Call},
    deploy::{plan_deployment, DeploymentPlan, DeploymentStrategy},
    error::{ClientError, ClientResult},
    gas::assert_can_prefund,
    signature::SignatureAggregator,
    submit::Submitter,
};
use calyx_contracts::{
    account_api, app_registry_api, ownable_api::OwnableAPI, Account, AppRegistry, EntryPoint,
};
use calyx_primitives::{NetworkConfig, Networks, UserOperation};
use ethers::{
    abi::{Abi, AbiEncode},
    providers::Middleware,
    types::{Address, Bytes, TransactionReceipt, H256, U256},
};
use std::sync::Arc;
use tracing::{info, warn};

/// Client for one smart account on one network
pub struct WalletClient<M: Middleware + 'static> {
    eth_client: Arc<M>,
    chain_id: u64,
    config: NetworkConfig,
    account: Account<M>,
    entry_point: EntryPoint<M>,
    aggregator: SignatureAggregator,
    submitter: Submitter<M>,
}

impl<M: Middleware + 'static> WalletClient<M> {
    /// Creates a client for `account` on the network identified by
    /// `chain_id`. The `beneficiary` collects entry point gas refunds,
    /// usually the relaying signer behind `eth_client`.
    pub fn new(
        eth_client: Arc<M>,
        networks: &Networks,
        chain_id: u64,
        account: Address,
        aggregator: SignatureAggregator,
        beneficiary: Address,
    ) -> ClientResult<Self> {
        let config = networks.get(chain_id)?.clone();
        let entry_point = EntryPoint::new(eth_client.clone(), config.contracts.entry_point);
        let submitter = Submitter::new(entry_point.clone(), beneficiary);
        Ok(Self {
            account: Account::new(eth_client.clone(), account),
            eth_client,
            chain_id,
            config,
            entry_point,
            aggregator,
            submitter,
        })
    }

    pub fn account(&self) -> &Account<M> {
        &self.account
    }

    pub fn entry_point(&self) -> &EntryPoint<M> {
        &self.entry_point
    }

    pub fn chain_id(&self) -> u64 {
        self.chain_id
    }

    pub fn config(&self) -> &NetworkConfig {
        &self.config
    }

    /// Builds, signs and submits a batch. Raw calls go through the full
    /// assembly flow; pre-built operations skip straight to the prefund
    /// guard and submission.
    pub async fn execute(&self, input: BatchInput) -> ClientResult<TransactionReceipt> {
        match input {
            BatchInput::Calls(calls) => self.run_calls(calls).await,
            BatchInput::Operations(ops) => {
                let max_fee =
                    ops.iter().map(|op| op.max_fee_per_gas).max().unwrap_or_default();
                self.prefund_and_submit(ops, max_fee).await
            }
        }
    }

    /// Deploys a contract through whichever path its interface calls for
    /// and returns its predicted address together with the mined receipt.
    ///
    /// `init_code` is the creation bytecode with constructor arguments
    /// already appended; without an interface descriptor the factory path
    /// is used. A fresh salt is drawn on every call, so a failed run
    /// leaves nothing to clean up.
    pub async fn deploy_contract(
        &self,
        abi: Option<&Abi>,
        init_code: Bytes,
    ) -> ClientResult<(Address, TransactionReceipt)> {
        let plan = plan_deployment(
            abi,
            init_code,
            H256::random(),
            self.account.address(),
            self.config.contracts.deployer,
            self.config.contracts.factory,
        );
        info!(
            "deploying to {:?} via the {:?} path, {} operation(s)",
            plan.address,
            plan.strategy,
            plan.calls.len()
        );

        let DeploymentPlan { strategy, address, calls, .. } = plan;
        let receipt = self.run_calls(calls).await?;

        if strategy == DeploymentStrategy::Deployer {
            self.log_owner(address).await;
        }
        Ok((address, receipt))
    }

    /// Whitelists an app on the account. Idempotent: a no-op returning
    /// `None` when the app is already whitelisted.
    pub async fn whitelist_app(
        &self,
        app: Address,
    ) -> ClientResult<Option<TransactionReceipt>> {
        if self.account.app_whitelist(app).await? {
            info!("app {app:?} already whitelisted, nothing to do");
            return Ok(None);
        }
        let call = Call::new(
            self.account.address(),
            account_api::WhitelistAppCall { apps: vec![app], flags: vec![true] }.encode().into(),
        );
        self.run_calls(vec![call]).await.map(Some)
    }

    /// Whitelists an app and delegates its signing to `signer` in one
    /// operation. A no-op when the delegation is already in place.
    pub async fn whitelist_app_and_set_key(
        &self,
        app: Address,
        signer: Address,
    ) -> ClientResult<Option<TransactionReceipt>> {
        if self.account.app_signer(app).await? == Some(signer) {
            info!("app {app:?} already delegated to {signer:?}, nothing to do");
            return Ok(None);
        }
        let call = Call::new(
            self.account.address(),
            account_api::WhitelistAppAndSetKeyCall { app, signer }.encode().into(),
        );
        self.run_calls(vec![call]).await.map(Some)
    }

    /// Registers contracts under an app in the network's app registry,
    /// skipping contracts that are already registered. A no-op returning
    /// `None` when every contract is already there.
    pub async fn add_app_contracts(
        &self,
        app: Address,
        contracts: Vec<Address>,
    ) -> ClientResult<Option<TransactionReceipt>> {
        let registry_address = self
            .config
            .contracts
            .app_registry
            .ok_or(ClientError::MissingConfiguration { chain_id: self.chain_id })?;
        let registry = AppRegistry::new(self.eth_client.clone(), registry_address);

        let registered = registry.app_contracts(app).await?;
        let new_contracts: Vec<Address> =
            contracts.into_iter().filter(|c| !registered.contains(c)).collect();
        if new_contracts.is_empty() {
            info!("all contracts already registered for app {app:?}, nothing to do");
            return Ok(None);
        }

        let call = Call::new(
            registry_address,
            app_registry_api::AddAppContractsCall { app, new_contracts }.encode().into(),
        );
        self.run_calls(vec![call]).await.map(Some)
    }

    /// Sets the funder whitelist flags, skipping funders whose status
    /// already matches. A no-op returning `None` when nothing changes.
    pub async fn set_funder_whitelist(
        &self,
        funders: Vec<(Address, bool)>,
    ) -> ClientResult<Option<TransactionReceipt>> {
        let mut new_whitelist = Vec::with_capacity(funders.len());
        let mut flags = Vec::with_capacity(funders.len());
        for (funder, flag) in funders {
            if self.account.is_funder_whitelisted(funder).await? == flag {
                continue;
            }
            new_whitelist.push(funder);
            flags.push(flag);
        }
        if new_whitelist.is_empty() {
            info!("funder whitelist already up to date, nothing to do");
            return Ok(None);
        }
        let call = Call::new(
            self.account.address(),
            account_api::SetFunderWhitelistCall { new_whitelist, flags }.encode().into(),
        );
        self.run_calls(vec![call]).await.map(Some)
    }

    async fn run_calls(&self, calls: Vec<Call>) -> ClientResult<TransactionReceipt> {
        let policy = self.account.signer_policy().await?;
        let owners = self.account.owners_count().await?;
        self.aggregator.check_policy(policy, owners)?;

        let base_nonce = self.account.get_nonce().await?;
        let (max_fee, max_priority_fee) = self.estimate_fees().await?;

        // the account may have delegated signing for the batch target to a
        // single app key
        let app_signer = match calls.last() {
            Some(last) if last.to != self.account.address() => {
                self.account.app_signer(last.to).await?
            }
            _ => None,
        };

        let mut builder = BatchBuilder::new(
            self.account.address(),
            self.config.contracts.entry_point,
            self.chain_id,
            self.config.user_op_gas,
        )
        .fees(max_fee, max_priority_fee);
        if let Some(paymaster) = self.config.contracts.paymaster {
            builder = builder.paymaster(paymaster);
        }

        let ops = builder.assemble(base_nonce, &calls, &self.aggregator, app_signer).await?;
        self.prefund_and_submit(ops, max_fee).await
    }

    async fn prefund_and_submit(
        &self,
        ops: Vec<UserOperation>,
        max_fee: U256,
    ) -> ClientResult<TransactionReceipt> {
        let sponsored = self.config.contracts.paymaster.is_some();
        let payer = self.config.contracts.paymaster.unwrap_or_else(|| self.account.address());
        assert_can_prefund(
            &*self.eth_client,
            payer,
            &self.config.user_op_gas,
            max_fee,
            sponsored,
            ops.len(),
        )
        .await?;

        self.submitter.submit(ops).await
    }

    async fn estimate_fees(&self) -> ClientResult<(U256, U256)> {
        self.eth_client
            .estimate_eip1559_fees(None)
            .await
            .map_err(|e| ClientError::Provider { inner: e.to_string() })
    }

    /// Best-effort readback of the deployed contract's owner, logged only
    async fn log_owner(&self, address: Address) {
        let ownable = OwnableAPI::new(address, self.eth_client.clone());
        match ownable.owner().call().await {
            Ok(owner) => info!("contract {address:?} owner is {owner:?}"),
            Err(e) => warn!("owner readback of {address:?} failed: {e}"),
        }
    }
}
