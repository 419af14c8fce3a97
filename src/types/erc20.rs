//! ERC20 interface.

use alloy::sol;

sol! {
    /// The slice of ERC20 the engine reads.
    #[derive(Debug)]
    interface IERC20 {
        /// Returns the token balance held by `owner`.
        function balanceOf(address owner) external view returns (uint256 balance);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloy::{primitives::address, sol_types::SolCall};

    #[test]
    fn balance_of_selector_is_stable() {
        assert_eq!(IERC20::balanceOfCall::SELECTOR, [0x70, 0xa0, 0x82, 0x31]);
    }

    #[test]
    fn balance_of_round_trips() {
        let owner = address!("d8dA6BF26964aF9D7eEd9e03E53415D37aA96045");
        let encoded = IERC20::balanceOfCall { owner }.abi_encode();

        assert_eq!(encoded.len(), 4 + 32);
        let decoded = IERC20::balanceOfCall::abi_decode(&encoded).unwrap();
        assert_eq!(decoded.owner, owner);
    }
}
