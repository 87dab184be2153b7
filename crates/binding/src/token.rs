//! ERC20 token contract bindings.

use alloy_sol_types::sol;

sol! {
    /// Read-only subset of the ERC20 interface.
    #[sol(rpc)]
    interface IERC20 {
        /// Get token balance of an account
        function balanceOf(address account) external view returns (uint256);

        /// Get token decimals
        function decimals() external view returns (uint8);

        /// Get token symbol
        function symbol() external view returns (string memory);
    }
}

#[cfg(test)]
mod tests {
    use super::IERC20;
    use alloy_primitives::Address;
    use alloy_sol_types::SolCall;

    #[test]
    fn test_balance_of_selector() {
        // keccak256("balanceOf(address)")[..4]
        assert_eq!(IERC20::balanceOfCall::SELECTOR, [0x70, 0xa0, 0x82, 0x31]);
    }

    #[test]
    fn test_metadata_selectors() {
        assert_eq!(IERC20::decimalsCall::SELECTOR, [0x31, 0x3c, 0xe5, 0x67]);
        assert_eq!(IERC20::symbolCall::SELECTOR, [0x95, 0xd8, 0x9b, 0x41]);
    }

    #[test]
    fn test_only_read_calls_used_by_the_watcher() {
        let mut selectors = IERC20::IERC20Calls::SELECTORS.to_vec();
        selectors.sort_unstable();

        assert_eq!(
            selectors,
            vec![
                IERC20::decimalsCall::SELECTOR,
                IERC20::balanceOfCall::SELECTOR,
                IERC20::symbolCall::SELECTOR,
            ]
        );
    }

    #[test]
    fn test_balance_of_encoding() {
        let holder = Address::from([0xAAu8; 20]);
        let data = IERC20::balanceOfCall { account: holder }.abi_encode();

        assert_eq!(data.len(), 4 + 32);
        assert_eq!(&data[16..36], holder.as_slice());
    }
}
