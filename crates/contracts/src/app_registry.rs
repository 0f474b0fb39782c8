pub use super::gen::{app_registry_api, AppRegistryAPI};
use crate::error::{call_error, ContractsError};
use ethers::{providers::Middleware, types::Address};
use std::sync::Arc;

/// Typed handle to the app registry contract
#[derive(Clone)]
pub struct AppRegistry<M: Middleware + 'static> {
    address: Address,
    api: AppRegistryAPI<M>,
}

impl<M: Middleware + 'static> AppRegistry<M> {
    pub fn new(eth_client: Arc<M>, address: Address) -> Self {
        let api = AppRegistryAPI::new(address, eth_client);
        Self { address, api }
    }

    pub fn api(&self) -> &AppRegistryAPI<M> {
        &self.api
    }

    pub fn address(&self) -> Address {
        self.address
    }

    /// Contracts currently registered under the app
    pub async fn app_contracts(&self, app: Address) -> Result<Vec<Address>, ContractsError> {
        let metadata = self.api.get_app_metadata(app).call().await.map_err(call_error)?;
        Ok(metadata.8)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use app_registry_api::AppMetadata;
    use ethers::{
        abi::AbiEncode,
        providers::{MockProvider, Provider},
        types::Bytes,
    };

    #[tokio::test]
    async fn app_contracts_come_from_the_metadata() {
        let (provider, mock) = Provider::mocked();
        let registry = AppRegistry::new(Arc::new(provider), Address::random());

        let registered = vec![Address::random(), Address::random()];
        let metadata = AppMetadata {
            name: "counter".into(),
            app_contracts: registered.clone(),
            ..Default::default()
        };
        mock.push::<Bytes, Bytes>((metadata,).encode().into()).unwrap();

        assert_eq!(registry.app_contracts(Address::random()).await.unwrap(), registered);
    }
}
