//! Multicall3 interface.

use alloy::sol;

sol! {
    /// Multicall3 aggregation interface.
    ///
    /// Only the surface the engine drives is declared: block-stamped
    /// aggregation that tolerates member failures, plus the native balance
    /// helper exposed by the same deployment.
    #[derive(Debug)]
    interface IMulticall3 {
        /// A single call inside an aggregate.
        struct Call {
            /// Contract the call is sent to.
            address target;
            /// ABI calldata for the call.
            bytes callData;
        }

        /// Outcome of a single aggregated call.
        struct Result {
            /// Whether the call succeeded.
            bool success;
            /// Raw return data, or revert data when the call failed.
            bytes returnData;
        }

        /// Executes `calls` against the requested block and reports each
        /// member outcome. With `requireSuccess` unset a reverting member
        /// only fails its own slot.
        function tryBlockAndAggregate(bool requireSuccess, Call[] calldata calls)
            external
            payable
            returns (uint256 blockNumber, bytes32 blockHash, Result[] memory returnData);

        /// Returns the native asset balance of `addr`.
        function getEthBalance(address addr) external view returns (uint256 balance);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloy::{
        primitives::{B256, U256, address},
        sol_types::{SolCall, SolValue},
    };

    #[test]
    fn try_block_and_aggregate_round_trips() {
        let calls = vec![
            IMulticall3::Call {
                target: address!("0000000000000000000000000000000000000001"),
                callData: vec![0xde, 0xad].into(),
            },
            IMulticall3::Call {
                target: address!("0000000000000000000000000000000000000002"),
                callData: vec![].into(),
            },
        ];

        let encoded =
            IMulticall3::tryBlockAndAggregateCall { requireSuccess: false, calls }.abi_encode();
        let decoded = IMulticall3::tryBlockAndAggregateCall::abi_decode(&encoded).unwrap();

        assert!(!decoded.requireSuccess);
        assert_eq!(decoded.calls.len(), 2);
        assert_eq!(decoded.calls[0].target, address!("0000000000000000000000000000000000000001"));
        assert_eq!(decoded.calls[0].callData.as_ref(), &[0xde, 0xad]);
        assert!(decoded.calls[1].callData.is_empty());
    }

    #[test]
    fn aggregate_return_decodes() {
        let members = vec![
            IMulticall3::Result { success: true, returnData: U256::from(7u64).abi_encode().into() },
            IMulticall3::Result { success: false, returnData: vec![].into() },
        ];
        let encoded = (U256::from(17_200_000u64), B256::ZERO, members).abi_encode_params();

        let ret = IMulticall3::tryBlockAndAggregateCall::abi_decode_returns(&encoded).unwrap();
        assert_eq!(ret.blockNumber, U256::from(17_200_000u64));
        assert_eq!(ret.returnData.len(), 2);
        assert!(ret.returnData[0].success);
        assert!(!ret.returnData[1].success);
    }

    #[test]
    fn get_eth_balance_selector_is_stable() {
        assert_eq!(IMulticall3::getEthBalanceCall::SELECTOR, [0x4d, 0x23, 0x01, 0xcc]);
    }
}
