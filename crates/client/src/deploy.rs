//! Contract deployment planning
//!
//! Two on-chain paths exist for putting a contract up through the smart
//! account. Contracts that follow the two-step ownership handover interface
//! (`owner()` plus `nominateOwner`) go through the standalone deployer and
//! may need a whitelist/claim follow-up; everything else goes through the
//! account factory, which takes the owner as a constructor-level argument.
//! Either way the address is a CREATE2 function of (deploying contract,
//! salt, init code) and is known before submission.

use crate::batch::Call;
use calyx_contracts::{account_api, deployer_api, factory_api, ownable_api};
use calyx_primitives::constants::ownable::{NOMINATE_FN, OWNER_FN, OWNER_PARAM_NAMES};
use ethers::{
    abi::{Abi, AbiEncode},
    types::{Address, Bytes, H256, U256},
    utils::get_create2_address,
};
use tracing::debug;

/// Which contract performs the CREATE2
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DeploymentStrategy {
    /// Standalone deployer, ownership handed over after deployment
    Deployer,
    /// Account factory, owner set in the constructor
    Factory,
}

/// A planned deployment: the calls to batch, the salt that was drawn and
/// the address the contract will land at
#[derive(Clone, Debug)]
pub struct DeploymentPlan {
    pub strategy: DeploymentStrategy,
    pub salt: H256,
    pub address: Address,
    pub calls: Vec<Call>,
}

/// True when the interface exposes the two-step ownership handover,
/// `owner()` and `nominateOwner`
pub fn is_ownable(abi: &Abi) -> bool {
    abi.functions.contains_key(OWNER_FN) && abi.functions.contains_key(NOMINATE_FN)
}

/// True when the constructor takes no owner-named argument, so ownership
/// can only be transferred after deployment
pub fn needs_nomination(abi: &Abi) -> bool {
    let Some(constructor) = &abi.constructor else {
        return true;
    };
    !constructor
        .inputs
        .iter()
        .any(|input| OWNER_PARAM_NAMES.contains(&input.name.as_str()))
}

/// Constructor input types, in declaration order, for callers encoding
/// constructor arguments
pub fn extract_arg_types(abi: &Abi) -> Vec<String> {
    abi.constructor
        .as_ref()
        .map(|c| c.inputs.iter().map(|input| input.kind.to_string()).collect())
        .unwrap_or_default()
}

pub fn classify(abi: &Abi) -> DeploymentStrategy {
    if is_ownable(abi) {
        DeploymentStrategy::Deployer
    } else {
        DeploymentStrategy::Factory
    }
}

/// Lays out the calls for deploying `init_code` (bytecode with constructor
/// arguments already appended). `account` is the smart account that will
/// own the contract, `deployer` and `factory` the two deployment contracts
/// of the network. Without an interface descriptor the factory path is the
/// only option.
pub fn plan_deployment(
    abi: Option<&Abi>,
    init_code: Bytes,
    salt: H256,
    account: Address,
    deployer: Address,
    factory: Address,
) -> DeploymentPlan {
    let strategy = abi.map(classify).unwrap_or(DeploymentStrategy::Factory);
    match strategy {
        DeploymentStrategy::Deployer => {
            let address = get_create2_address(deployer, salt, &init_code);
            let mut calls = vec![Call::new(
                deployer,
                deployer_api::DeployCall {
                    owner: account,
                    bytecode: init_code,
                    salt: salt.into(),
                }
                .encode()
                .into(),
            )];
            if abi.is_some_and(needs_nomination) {
                // the fresh contract must be whitelisted before the account
                // can call into it to claim ownership
                calls.push(Call::new(
                    account,
                    account_api::WhitelistAppCall { apps: vec![address], flags: vec![true] }
                        .encode()
                        .into(),
                ));
                calls.push(Call::new(address, ownable_api::ClaimOwnerCall.encode().into()));
            }
            debug!(
                "deployer path for {address:?}: {} operation(s), salt {salt:?}",
                calls.len()
            );
            DeploymentPlan { strategy, salt, address, calls }
        }
        DeploymentStrategy::Factory => {
            let address = get_create2_address(factory, salt, &init_code);
            let calls = vec![Call::new(
                factory,
                factory_api::DeployContractCall {
                    contract_owner: account,
                    amount: U256::zero(),
                    bytecode: init_code,
                    salt: salt.into(),
                }
                .encode()
                .into(),
            )];
            debug!("factory path for {address:?}, salt {salt:?}");
            DeploymentPlan { strategy, salt, address, calls }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ethers::abi::AbiDecode;
    use std::str::FromStr;

    const OWNABLE_ABI: &str = r#"[
        {"type":"constructor","inputs":[{"name":"threshold","type":"uint256"}]},
        {"type":"function","name":"owner","inputs":[],"outputs":[{"name":"","type":"address"}],"stateMutability":"view"},
        {"type":"function","name":"nominateOwner","inputs":[{"name":"nominee","type":"address"}],"outputs":[],"stateMutability":"nonpayable"},
        {"type":"function","name":"claimOwner","inputs":[],"outputs":[],"stateMutability":"nonpayable"}
    ]"#;

    const OWNABLE_WITH_OWNER_ARG_ABI: &str = r#"[
        {"type":"constructor","inputs":[{"name":"_owner","type":"address"},{"name":"cap","type":"uint256"}]},
        {"type":"function","name":"owner","inputs":[],"outputs":[{"name":"","type":"address"}],"stateMutability":"view"},
        {"type":"function","name":"nominateOwner","inputs":[{"name":"nominee","type":"address"}],"outputs":[],"stateMutability":"nonpayable"}
    ]"#;

    const PLAIN_ABI: &str = r#"[
        {"type":"constructor","inputs":[{"name":"token","type":"address"}]},
        {"type":"function","name":"totalSupply","inputs":[],"outputs":[{"name":"","type":"uint256"}],"stateMutability":"view"}
    ]"#;

    fn abi(raw: &str) -> Abi {
        serde_json::from_str(raw).unwrap()
    }

    // runtime: push 42, return it; checked against an off-line CREATE2 recomputation
    const INIT_CODE: &str = "0x600a600c600039600a6000f3602a60505260206050f3";

    #[test]
    fn ownable_goes_through_the_deployer() {
        assert!(is_ownable(&abi(OWNABLE_ABI)));
        assert_eq!(classify(&abi(OWNABLE_ABI)), DeploymentStrategy::Deployer);
        assert!(!is_ownable(&abi(PLAIN_ABI)));
        assert_eq!(classify(&abi(PLAIN_ABI)), DeploymentStrategy::Factory);
    }

    #[test]
    fn nomination_depends_on_constructor_inputs() {
        assert!(needs_nomination(&abi(OWNABLE_ABI)));
        assert!(!needs_nomination(&abi(OWNABLE_WITH_OWNER_ARG_ABI)));
        // no constructor at all means no way to pass an owner
        let bare: Abi = serde_json::from_str("[]").unwrap();
        assert!(needs_nomination(&bare));
    }

    #[test]
    fn constructor_arg_types_are_extracted() {
        assert_eq!(extract_arg_types(&abi(OWNABLE_ABI)), vec!["uint256"]);
        assert_eq!(
            extract_arg_types(&abi(OWNABLE_WITH_OWNER_ARG_ABI)),
            vec!["address", "uint256"]
        );
        let bare: Abi = serde_json::from_str("[]").unwrap();
        assert!(extract_arg_types(&bare).is_empty());
    }

    #[test]
    fn deployer_path_chains_whitelist_and_claim() {
        let account = Address::random();
        let deployer = Address::from_str("0xcab6dF19e2C77493547baB23ad85597f8303CE92").unwrap();
        let init_code: Bytes = INIT_CODE.parse().unwrap();
        let salt = H256::from([0x11u8; 32]);

        let plan = plan_deployment(
            Some(&abi(OWNABLE_ABI)),
            init_code.clone(),
            salt,
            account,
            deployer,
            Address::random(),
        );

        assert_eq!(plan.strategy, DeploymentStrategy::Deployer);
        assert_eq!(plan.calls.len(), 3);
        assert_eq!(
            plan.address,
            Address::from_str("0xf04fa9c0ad1168cccf8cacc9165b22ac6321f4e7").unwrap()
        );
        assert_eq!(plan.address, get_create2_address(deployer, salt, &init_code));

        let deploy = deployer_api::DeployCall::decode(&plan.calls[0].data).unwrap();
        assert_eq!(plan.calls[0].to, deployer);
        assert_eq!(deploy.owner, account);
        assert_eq!(deploy.bytecode, init_code);
        assert_eq!(H256::from(deploy.salt), salt);

        let whitelist = account_api::WhitelistAppCall::decode(&plan.calls[1].data).unwrap();
        assert_eq!(plan.calls[1].to, account);
        assert_eq!(whitelist.apps, vec![plan.address]);
        assert_eq!(whitelist.flags, vec![true]);

        assert_eq!(plan.calls[2].to, plan.address);
        assert!(ownable_api::ClaimOwnerCall::decode(&plan.calls[2].data).is_ok());
    }

    #[test]
    fn deployer_path_skips_handover_when_constructor_takes_owner() {
        let plan = plan_deployment(
            Some(&abi(OWNABLE_WITH_OWNER_ARG_ABI)),
            INIT_CODE.parse().unwrap(),
            H256::random(),
            Address::random(),
            Address::random(),
            Address::random(),
        );
        assert_eq!(plan.strategy, DeploymentStrategy::Deployer);
        assert_eq!(plan.calls.len(), 1);
    }

    #[test]
    fn factory_path_is_a_single_call() {
        let account = Address::random();
        let factory = Address::from_str("0x8a4720488CA32f1223ccFE5A087e250fE3BC5D75").unwrap();
        let init_code: Bytes = INIT_CODE.parse().unwrap();
        let salt = H256::from([0x11u8; 32]);

        let plan = plan_deployment(
            Some(&abi(PLAIN_ABI)),
            init_code.clone(),
            salt,
            account,
            Address::random(),
            factory,
        );

        assert_eq!(plan.strategy, DeploymentStrategy::Factory);
        assert_eq!(plan.calls.len(), 1);
        assert_eq!(
            plan.address,
            Address::from_str("0x04249104d5a003f47d283349889f1efc1c983b78").unwrap()
        );

        let call = factory_api::DeployContractCall::decode(&plan.calls[0].data).unwrap();
        assert_eq!(plan.calls[0].to, factory);
        assert_eq!(call.contract_owner, account);
        assert_eq!(call.amount, U256::zero());
        assert_eq!(call.bytecode, init_code);
        assert_eq!(H256::from(call.salt), salt);
    }

    #[test]
    fn missing_interface_falls_back_to_the_factory() {
        let plan = plan_deployment(
            None,
            INIT_CODE.parse().unwrap(),
            H256::random(),
            Address::random(),
            Address::random(),
            Address::random(),
        );
        assert_eq!(plan.strategy, DeploymentStrategy::Factory);
        assert_eq!(plan.calls.len(), 1);
    }

    #[test]
    fn fresh_salts_give_fresh_addresses() {
        let init_code: Bytes = INIT_CODE.parse().unwrap();
        let a = plan_deployment(
            Some(&abi(PLAIN_ABI)),
            init_code.clone(),
            H256::random(),
            Address::random(),
            Address::random(),
            Address::zero(),
        );
        let b = plan_deployment(
            Some(&abi(PLAIN_ABI)),
            init_code,
            H256::random(),
            Address::random(),
            Address::random(),
            Address::zero(),
        );
        assert_ne!(a.salt, b.salt);
        assert_ne!(a.address, b.address);
    }
}
