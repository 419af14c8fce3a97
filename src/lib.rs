//! # Tally
//!
//! Bulk historical balance reads for Ethereum-compatible chains.
//!
//! Queries are grouped by block, folded into one Multicall3
//! `tryBlockAndAggregate` per group and shipped to the node as a single
//! batched JSON-RPC exchange. The nested results are scattered back onto
//! the input order, so the caller always gets one answer per question.

pub mod cli;
pub mod config;
pub mod constants;
pub mod demux;
pub mod encode;
pub mod error;
pub mod group;
pub mod payload;
pub mod reader;
pub mod transport;
pub mod types;
