pub use super::gen::{account_api, AccountAPI};
use crate::error::{call_error, ContractsError};
use ethers::{providers::Middleware, types::{Address, U256}};
use std::sync::Arc;

/// Typed handle to a smart account ("wallet") contract
#[derive(Clone)]
pub struct Account<M: Middleware + 'static> {
    address: Address,
    api: AccountAPI<M>,
}

impl<M: Middleware + 'static> Account<M> {
    pub fn new(eth_client: Arc<M>, address: Address) -> Self {
        let api = AccountAPI::new(address, eth_client);
        Self { address, api }
    }

    pub fn api(&self) -> &AccountAPI<M> {
        &self.api
    }

    pub fn address(&self) -> Address {
        self.address
    }

    /// Current nonce of the account. Read once per batch; subsequent
    /// operations in the same batch derive their nonces locally.
    pub async fn get_nonce(&self) -> Result<U256, ContractsError> {
        self.api.get_nonce().call().await.map_err(call_error)
    }

    /// Signer policy mode configured on the account
    pub async fn signer_policy(&self) -> Result<U256, ContractsError> {
        self.api.signer_policy().call().await.map_err(call_error)
    }

    /// Number of owners of the account
    pub async fn owners_count(&self) -> Result<U256, ContractsError> {
        self.api.get_owners_count().call().await.map_err(call_error)
    }

    /// Delegated app signing key for the given app, `None` when not set
    pub async fn app_signer(&self, app: Address) -> Result<Option<Address>, ContractsError> {
        let signer = self.api.app_signer(app).call().await.map_err(call_error)?;
        Ok((!signer.is_zero()).then_some(signer))
    }

    /// Whether the app is whitelisted on the account
    pub async fn app_whitelist(&self, app: Address) -> Result<bool, ContractsError> {
        self.api.app_whitelist(app).call().await.map_err(call_error)
    }

    /// Whether the funder is whitelisted on the account
    pub async fn is_funder_whitelisted(&self, funder: Address) -> Result<bool, ContractsError> {
        self.api.is_funder_whitelisted(funder).call().await.map_err(call_error)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ethers::{
        abi::AbiEncode,
        providers::{MockProvider, Provider},
        types::Bytes,
    };

    fn mocked_account() -> (Account<Provider<MockProvider>>, MockProvider) {
        let (provider, mock) = Provider::mocked();
        (Account::new(Arc::new(provider), Address::random()), mock)
    }

    #[tokio::test]
    async fn get_nonce_decodes_call_result() {
        let (account, mock) = mocked_account();
        mock.push::<Bytes, Bytes>(U256::from(42).encode().into()).unwrap();
        assert_eq!(account.get_nonce().await.unwrap(), U256::from(42));
    }

    #[tokio::test]
    async fn app_signer_zero_address_means_unset() {
        let (account, mock) = mocked_account();
        mock.push::<Bytes, Bytes>(Address::zero().encode().into()).unwrap();
        assert_eq!(account.app_signer(Address::random()).await.unwrap(), None);

        let delegated = Address::random();
        mock.push::<Bytes, Bytes>(delegated.encode().into()).unwrap();
        assert_eq!(account.app_signer(Address::random()).await.unwrap(), Some(delegated));
    }
}
