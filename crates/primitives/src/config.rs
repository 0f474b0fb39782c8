//! Per-network configuration
//!
//! The configuration is an explicitly passed map keyed by chain id. Lookup
//! of an unknown network is a typed error, never a panic, and there is no
//! global table.

use ethers::types::{Address, U256};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use thiserror::Error;

/// Configuration error
#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    /// No entry for the requested network
    #[error("no configuration for chain id {chain_id}")]
    MissingConfiguration {
        /// The requested chain id
        chain_id: u64,
    },
}

/// Fixed gas parameters applied to every user operation on a network
#[derive(Clone, Copy, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserOpGas {
    /// Gas allocated for the main execution call
    pub call_gas_limit: U256,
    /// Gas allocated for the verification step
    pub verification_gas_limit: U256,
    /// Gas paid for pre-verification execution and calldata
    pub pre_verification_gas: U256,
}

impl Default for UserOpGas {
    fn default() -> Self {
        Self {
            call_gas_limit: crate::constants::gas::DEFAULT_CALL_GAS_LIMIT.into(),
            verification_gas_limit: crate::constants::gas::DEFAULT_VERIFICATION_GAS_LIMIT.into(),
            pre_verification_gas: crate::constants::gas::DEFAULT_PRE_VERIFICATION_GAS.into(),
        }
    }
}

/// Addresses of the system contracts deployed on a network
#[derive(Clone, Copy, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContractAddresses {
    /// Entry point contract receiving operation batches
    pub entry_point: Address,
    /// Factory contract for the factory deployment path
    pub factory: Address,
    /// Deployer contract for the ownership-handoff deployment path
    pub deployer: Address,
    /// Sponsoring paymaster, if the network runs one
    pub paymaster: Option<Address>,
    /// App registry contract, if the network runs one
    pub app_registry: Option<Address>,
}

/// Static configuration of one network
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NetworkConfig {
    /// RPC endpoint of the execution client
    pub rpc_url: String,
    /// System contract addresses
    pub contracts: ContractAddresses,
    /// Fixed user operation gas parameters
    pub user_op_gas: UserOpGas,
}

/// Map of supported networks keyed by chain id
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct Networks(HashMap<u64, NetworkConfig>);

impl Networks {
    /// Creates an empty network map
    pub fn new() -> Self {
        Self::default()
    }

    /// The publicly known networks with their deployed system contracts
    pub fn known() -> Self {
        let addr = |s: &str| s.parse().expect("well-formed address constant");
        Self::new()
            .with_network(
                crate::constants::networks::MAINNET_CHAIN_ID,
                NetworkConfig {
                    rpc_url: "https://kinto-mainnet.calderachain.xyz/http".into(),
                    contracts: ContractAddresses {
                        entry_point: addr("0x2843C269D2a64eCfA63548E8B3Fc0FD23B7F70cb"),
                        factory: addr("0x8a4720488CA32f1223ccFE5A087e250fE3BC5D75"),
                        deployer: addr("0xcab6dF19e2C77493547baB23ad85597f8303CE92"),
                        paymaster: Some(addr("0x1842a4EFf3eFd24c50B63c3CF89cECEe245Fc2bd")),
                        app_registry: Some(addr("0x5A2b641b84b0230C8e75F55d5afd27f4Dbd59d5b")),
                    },
                    user_op_gas: UserOpGas::default(),
                },
            )
            .with_network(
                crate::constants::networks::DEVNET_CHAIN_ID,
                NetworkConfig {
                    rpc_url: "https://kinto-upgrade-dev-2.rpc.caldera.xyz/http".into(),
                    contracts: ContractAddresses {
                        entry_point: addr("0x302b00A0b9C865F89099d27F7538CEe33E9A4f92"),
                        factory: addr("0xB8818F4c0CE119AC274f217e9C11506DCf1bBb70"),
                        deployer: addr("0x3a4ee5742b854688a35DE9F853Cb0D55e7D80c96"),
                        paymaster: Some(addr("0x8dc62b6FAF2929a58a1fca99aCF394ddf0CfAD16")),
                        app_registry: None,
                    },
                    user_op_gas: UserOpGas::default(),
                },
            )
    }

    /// Adds or replaces the configuration for a chain id
    pub fn with_network(mut self, chain_id: u64, config: NetworkConfig) -> Self {
        self.0.insert(chain_id, config);
        self
    }

    /// Looks up the configuration for a chain id
    pub fn get(&self, chain_id: u64) -> Result<&NetworkConfig, ConfigError> {
        self.0.get(&chain_id).ok_or(ConfigError::MissingConfiguration { chain_id })
    }

    /// Whether the chain id has a configuration entry
    pub fn supports(&self, chain_id: u64) -> bool {
        self.0.contains_key(&chain_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config() -> NetworkConfig {
        NetworkConfig {
            rpc_url: "http://localhost:8545".into(),
            contracts: ContractAddresses {
                entry_point: Address::random(),
                factory: Address::random(),
                deployer: Address::random(),
                paymaster: None,
                app_registry: None,
            },
            user_op_gas: UserOpGas::default(),
        }
    }

    #[test]
    fn known_networks_table() {
        let networks = Networks::known();
        assert!(networks.supports(crate::constants::networks::MAINNET_CHAIN_ID));
        assert!(networks.supports(crate::constants::networks::DEVNET_CHAIN_ID));

        let mainnet = networks.get(7887).unwrap();
        assert_eq!(
            mainnet.contracts.entry_point,
            "0x2843C269D2a64eCfA63548E8B3Fc0FD23B7F70cb".parse::<Address>().unwrap()
        );
        assert!(mainnet.contracts.paymaster.is_some());
        assert!(mainnet.contracts.app_registry.is_some());
        assert_eq!(mainnet.user_op_gas.call_gas_limit, U256::from(4_000_000));

        // the dev network has no registry deployed
        assert!(networks.get(412_346).unwrap().contracts.app_registry.is_none());
    }

    #[test]
    fn lookup_known_network() {
        let networks = Networks::new().with_network(7887, config());
        assert!(networks.supports(7887));
        assert!(networks.get(7887).is_ok());
    }

    #[test]
    fn lookup_unknown_network_fails() {
        let networks = Networks::new().with_network(7887, config());
        assert_eq!(
            networks.get(412_346).unwrap_err(),
            ConfigError::MissingConfiguration { chain_id: 412_346 }
        );
    }
}
