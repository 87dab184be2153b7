use crate::{ChainQuery, QueryError};
use alloy_primitives::{Address, U256};
use alloy_provider::Provider;
use binding::token::IERC20;
use tracing::debug;

// Balance monitor bound to one chain provider.
pub struct BalanceMonitor<P> {
    provider: P,
}

impl<P> BalanceMonitor<P>
where
    P: Provider + Clone,
{
    pub const fn new(provider: P) -> Self {
        Self { provider }
    }
}

impl<P> ChainQuery for BalanceMonitor<P>
where
    P: Provider + Clone,
{
    async fn native_balance(&self, address: Address) -> Result<U256, QueryError> {
        debug!("Querying native balance: address={}", address);

        self.provider
            .get_balance(address)
            .await
            .map_err(|e| QueryError::Rpc(format!("{}", e)))
    }

    async fn token_balance(&self, token: Address, owner: Address) -> Result<U256, QueryError> {
        debug!("Querying erc20 {} balance: address={}", token, owner);

        let contract = IERC20::new(token, &self.provider);
        contract
            .balanceOf(owner)
            .call()
            .await
            .map_err(|e| QueryError::Contract(format!("balanceOf: {}", e)))
    }

    async fn token_decimals(&self, token: Address) -> Result<u8, QueryError> {
        debug!("Querying erc20 {} decimals", token);

        let contract = IERC20::new(token, &self.provider);
        contract
            .decimals()
            .call()
            .await
            .map_err(|e| QueryError::Contract(format!("decimals: {}", e)))
    }

    async fn token_symbol(&self, token: Address) -> Result<String, QueryError> {
        debug!("Querying erc20 {} symbol", token);

        let contract = IERC20::new(token, &self.provider);
        contract
            .symbol()
            .call()
            .await
            .map_err(|e| QueryError::Contract(format!("symbol: {}", e)))
    }
}
