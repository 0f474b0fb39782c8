//! Gas prefund guard
//!
//! Rejects a batch before submission when the paying account cannot cover
//! its worst-case cost. The check is advisory-but-mandatory: it is not
//! atomic with submission, so a balance change between check and submit can
//! still surface on-chain. That race is an accepted limitation.

use crate::error::{ClientError, ClientResult};
use calyx_primitives::{constants::gas::COST_OF_POST, UserOpGas};
use ethers::{providers::Middleware, types::{Address, U256}};
use tracing::debug;

/// Worst-case gas the entry point may charge for one operation. The
/// verification step runs twice when a paymaster sponsors the operation.
pub fn required_gas(gas: &UserOpGas, sponsored: bool) -> U256 {
    let multiplier = if sponsored { 2 } else { 1 };
    gas.call_gas_limit + gas.verification_gas_limit * multiplier + gas.pre_verification_gas
}

/// Worst-case prefund of one operation at the given fee
pub fn required_prefund(gas: &UserOpGas, max_fee_per_gas: U256, sponsored: bool) -> U256 {
    required_gas(gas, sponsored) * max_fee_per_gas
}

/// Worst-case cost of one operation, including the entry point's fixed
/// post-processing charge
pub fn max_cost(gas: &UserOpGas, max_fee_per_gas: U256, sponsored: bool) -> U256 {
    required_prefund(gas, max_fee_per_gas, sponsored)
        + U256::from(COST_OF_POST) * max_fee_per_gas
}

/// Fails with `InsufficientBalance` when `balance` does not cover the
/// worst-case cost of `ops_count` operations
pub fn ensure_funded(
    payer: Address,
    balance: U256,
    gas: &UserOpGas,
    max_fee_per_gas: U256,
    sponsored: bool,
    ops_count: usize,
) -> ClientResult<()> {
    let required = max_cost(gas, max_fee_per_gas, sponsored) * U256::from(ops_count);
    debug!("prefund check: payer {payer:?}, balance {balance}, required {required}");
    if balance < required {
        return Err(ClientError::InsufficientBalance { payer, balance, required });
    }
    Ok(())
}

/// Fetches the payer's current balance and runs the prefund check. Must run
/// before any state-changing call of the flow.
pub async fn assert_can_prefund<M: Middleware + 'static>(
    eth_client: &M,
    payer: Address,
    gas: &UserOpGas,
    max_fee_per_gas: U256,
    sponsored: bool,
    ops_count: usize,
) -> ClientResult<()> {
    let balance = eth_client
        .get_balance(payer, None)
        .await
        .map_err(|e| ClientError::Provider { inner: e.to_string() })?;
    ensure_funded(payer, balance, gas, max_fee_per_gas, sponsored, ops_count)
}

#[cfg(test)]
mod tests {
    use super::*;
    use ethers::providers::{MockProvider, Provider};

    fn gas_params() -> UserOpGas {
        UserOpGas {
            call_gas_limit: 4_000_000.into(),
            verification_gas_limit: 210_000.into(),
            pre_verification_gas: 21_000.into(),
        }
    }

    #[test]
    fn prefund_arithmetic() {
        let gas = gas_params();
        let fee = U256::from(2);

        // self-paying: one verification pass
        assert_eq!(required_gas(&gas, false), U256::from(4_231_000));
        assert_eq!(required_prefund(&gas, fee, false), U256::from(8_462_000));
        assert_eq!(max_cost(&gas, fee, false), U256::from(8_462_000 + 400_000));

        // sponsored: verification counted twice
        assert_eq!(required_gas(&gas, true), U256::from(4_441_000));
        assert_eq!(max_cost(&gas, fee, true), U256::from(8_882_000 + 400_000));
    }

    #[test]
    fn balance_shortfall_is_reported() {
        let gas = gas_params();
        let payer = Address::random();
        let required = max_cost(&gas, 1.into(), false) * U256::from(3);

        let err =
            ensure_funded(payer, required - 1, &gas, 1.into(), false, 3).unwrap_err();
        match err {
            ClientError::InsufficientBalance { payer: p, balance, required: r } => {
                assert_eq!(p, payer);
                assert_eq!(balance, required - 1);
                assert_eq!(r, required);
            }
            other => panic!("unexpected error: {other:?}"),
        }

        assert!(ensure_funded(payer, required, &gas, 1.into(), false, 3).is_ok());
    }

    #[tokio::test]
    async fn balance_is_fetched_from_the_payer() {
        let (provider, mock) = Provider::mocked();
        let gas = gas_params();
        let payer = Address::random();

        mock.push(U256::from(1)).unwrap();
        let err = assert_can_prefund(&provider, payer, &gas, 1.into(), false, 1)
            .await
            .unwrap_err();
        assert!(matches!(err, ClientError::InsufficientBalance { balance, .. } if balance == U256::from(1)));
    }
}
