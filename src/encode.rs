//! Per-query call encoding.

use crate::types::{AssetKind, BalanceQuery, IERC20, IMulticall3};
use alloy::{
    primitives::{Address, Bytes, U256},
    sol_types::SolCall,
};

/// A query lowered to a concrete contract call.
///
/// The variant carries everything needed to build the call and later decode
/// its return, so nothing downstream re-inspects the originating query.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum CallKind {
    /// `balanceOf(wallet)` on the token contract.
    TokenBalance {
        /// Token contract queried.
        token: Address,
        /// Holder whose balance is read.
        wallet: Address,
    },
    /// `getEthBalance(wallet)` on the multicall deployment.
    NativeBalance {
        /// Holder whose balance is read.
        wallet: Address,
    },
}

impl CallKind {
    /// Lowers a query to its call form.
    pub fn from_query(query: &BalanceQuery) -> Self {
        match query.asset {
            AssetKind::Token(token) => Self::TokenBalance { token, wallet: query.wallet },
            AssetKind::Native => Self::NativeBalance { wallet: query.wallet },
        }
    }

    /// The contract the call is sent to.
    ///
    /// Native reads go through the multicall deployment itself, which is
    /// what makes them batchable alongside token reads.
    pub fn target(&self, multicall_address: Address) -> Address {
        match self {
            Self::TokenBalance { token, .. } => *token,
            Self::NativeBalance { .. } => multicall_address,
        }
    }

    /// ABI calldata for the call.
    pub fn calldata(&self) -> Bytes {
        match self {
            Self::TokenBalance { wallet, .. } => {
                IERC20::balanceOfCall { owner: *wallet }.abi_encode().into()
            }
            Self::NativeBalance { wallet } => {
                IMulticall3::getEthBalanceCall { addr: *wallet }.abi_encode().into()
            }
        }
    }

    /// Decodes the `uint256` a successful call returned.
    pub fn decode_balance(&self, data: &[u8]) -> Result<U256, alloy::sol_types::Error> {
        match self {
            Self::TokenBalance { .. } => IERC20::balanceOfCall::abi_decode_returns(data),
            Self::NativeBalance { .. } => IMulticall3::getEthBalanceCall::abi_decode_returns(data),
        }
    }
}
