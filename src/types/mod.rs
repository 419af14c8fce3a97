//! Shared primitive types.

mod erc20;
pub use erc20::*;

mod multicall;
pub use multicall::*;

mod query;
pub use query::*;

mod rpc;
pub use rpc::*;
