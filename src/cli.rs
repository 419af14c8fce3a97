//! # Tally CLI

use crate::{
    config::{self, ReaderConfig},
    constants::{DEFAULT_AGGREGATE_GAS, MULTICALL3_ADDRESS},
    reader::BalanceReader,
    transport::HttpTransport,
    types::BalanceQuery,
};
use alloy::primitives::Address;
use clap::Parser;
use eyre::WrapErr;
use serde::Deserialize;
use std::{path::PathBuf, time::Duration};
use tracing::info;
use url::Url;

/// Bulk historical balance reads over batched `eth_call`.
#[derive(Debug, Parser)]
#[command(author, version, about = "Tally", long_about = None)]
pub struct Args {
    /// The query file.
    ///
    /// A JSON array of objects with `wallet`, `block` and an optional
    /// `token` address; entries without a token read the native balance.
    #[arg(value_name = "QUERIES")]
    pub queries: PathBuf,
    /// The JSON-RPC endpoint to read from.
    ///
    /// Must be a valid HTTP or HTTPS URL pointing to an Ethereum JSON-RPC
    /// endpoint.
    #[arg(long = "rpc-url", value_name = "RPC_ENDPOINT", env = "TALLY_RPC_URL")]
    pub rpc_url: Url,
    /// The multicall deployment address.
    #[arg(long = "multicall-address", value_name = "ADDRESS", default_value_t = MULTICALL3_ADDRESS)]
    pub multicall_address: Address,
    /// Gas ceiling for each aggregated call.
    #[arg(long = "gas-limit", value_name = "GAS", default_value_t = DEFAULT_AGGREGATE_GAS)]
    pub gas_limit: u64,
    /// Metadata file with multicall runtime bytecode to inject through a
    /// state override, for chains without the canonical deployment.
    #[arg(long = "override-code", value_name = "METADATA")]
    pub override_code: Option<PathBuf>,
    /// Timeout for the batched exchange.
    #[arg(long, value_name = "SECONDS", value_parser = parse_duration_secs, default_value = "30")]
    pub timeout: Duration,
    /// Fail the whole run when any block group fails, instead of reporting
    /// per-query errors.
    #[arg(long = "strict-groups", default_value_t = false)]
    pub strict_groups: bool,
    /// Send one plain call per query instead of per-block aggregates.
    #[arg(long, default_value_t = false)]
    pub direct: bool,
}

/// One entry of the query file.
#[derive(Debug, Deserialize)]
struct QueryEntry {
    /// The wallet whose balance is read.
    wallet: Address,
    /// Token contract, or absent for the native asset.
    #[serde(default)]
    token: Option<Address>,
    /// The historical block to read at.
    block: u64,
}

impl Args {
    /// Runs the balance read and prints outcomes to stdout as JSON.
    pub async fn run(self) -> eyre::Result<()> {
        let queries = self.load_queries()?;

        let mut config = ReaderConfig::default()
            .with_multicall_address(self.multicall_address)
            .with_aggregate_gas(self.gas_limit)
            .with_timeout(self.timeout)
            .with_isolate_groups(!self.strict_groups);
        if let Some(path) = &self.override_code {
            config = config.with_override_code(Some(config::load_override_code(path)?));
        }

        let transport = HttpTransport::new(self.rpc_url.clone());
        let reader = BalanceReader::with_config(transport, config);

        info!(queries = queries.len(), direct = self.direct, "reading balances");
        let outcomes = if self.direct {
            reader.balances_direct(&queries).await?
        } else {
            reader.balances(&queries).await?
        };

        let report: Vec<serde_json::Value> = queries
            .iter()
            .zip(&outcomes)
            .map(|(query, outcome)| match outcome {
                Ok(balance) => serde_json::json!({
                    "query": query,
                    "balance": balance.to_string(),
                }),
                Err(error) => serde_json::json!({
                    "query": query,
                    "error": error.to_string(),
                }),
            })
            .collect();
        println!("{}", serde_json::to_string_pretty(&report)?);

        Ok(())
    }

    fn load_queries(&self) -> eyre::Result<Vec<BalanceQuery>> {
        let raw = std::fs::read_to_string(&self.queries)
            .wrap_err_with(|| format!("failed to read query file {}", self.queries.display()))?;
        let entries: Vec<QueryEntry> =
            serde_json::from_str(&raw).wrap_err("query file is not a JSON array of queries")?;

        Ok(entries
            .iter()
            .map(|entry| match entry.token {
                Some(token) => BalanceQuery::token(entry.wallet, token, entry.block),
                None => BalanceQuery::native(entry.wallet, entry.block),
            })
            .collect())
    }
}

/// Parses a string representing seconds to a [`Duration`].
fn parse_duration_secs(arg: &str) -> Result<Duration, std::num::ParseIntError> {
    let seconds = arg.parse()?;
    Ok(Duration::from_secs(seconds))
}
