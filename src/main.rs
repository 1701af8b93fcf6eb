// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: 2026 ® John Hauger Mitander <john@mitander.dev>

use alloy::primitives::Address;
use clap::Parser;
use oxidity_router::app::config::GlobalSettings;
use oxidity_router::app::logging::setup_logging;
use oxidity_router::common::parsing::{parse_amount, parse_token_address};
use oxidity_router::domain::constants::{DEFAULT_LOG_LEVEL, NATIVE_SENTINEL};
use oxidity_router::domain::error::AppError;
use oxidity_router::infrastructure::data::address_registry::{AddressRegistry, ChainConfig};
use oxidity_router::infrastructure::network::provider::ConnectionFactory;
use oxidity_router::services::routing::{Protocol, Route, RouteOptimizer};
use serde::Serialize;
use std::sync::Arc;

#[derive(Parser, Debug)]
#[command(author, version, about = "oxidity router: best-route quotes across AMM protocols")]
struct Cli {
    /// Path to config file (default: config.{toml,yaml,...})
    #[arg(long)]
    config: Option<String>,

    /// Chain id (overrides config/env)
    #[arg(long)]
    chain: Option<u64>,

    /// Protocol to quote (v2, v3, v4, aerodrome, ...). Omit to quote every configured protocol.
    #[arg(long)]
    protocol: Option<Protocol>,

    /// Input token: symbol, 0x address, or ETH for the native asset
    #[arg(long = "in")]
    token_in: String,

    /// Output token: symbol, 0x address, or ETH for the native asset
    #[arg(long = "out")]
    token_out: String,

    /// Amount in the input token's smallest unit
    #[arg(long)]
    amount: String,

    /// Emit logs as JSON
    #[arg(long, default_value_t = false)]
    log_json: bool,

    /// Skip the startup bytecode check of configured contracts
    #[arg(long, default_value_t = false)]
    skip_contract_check: bool,
}

#[derive(Serialize)]
struct QuoteReport {
    chain_id: u64,
    best: Option<Route>,
    routes: Vec<Route>,
}

fn resolve_cli_token(chain: &ChainConfig, field: &str, raw: &str) -> Result<Address, AppError> {
    let trimmed = raw.trim();
    if trimmed.eq_ignore_ascii_case("eth") || trimmed.eq_ignore_ascii_case("native") {
        return Ok(NATIVE_SENTINEL);
    }
    if trimmed.starts_with("0x") || trimmed.starts_with("0X") {
        return parse_token_address(field, trimmed);
    }
    chain
        .token(trimmed)
        .ok_or_else(|| AppError::invalid_input(field, format!("unknown token symbol {trimmed:?}")))
}

#[tokio::main]
async fn main() -> Result<(), AppError> {
    let cli = Cli::parse();

    let mut settings = GlobalSettings::load_with_path(cli.config.as_deref())?;
    if let Some(chain) = cli.chain {
        settings.chain_id = chain;
    }
    setup_logging(
        if settings.debug { "debug" } else { DEFAULT_LOG_LEVEL },
        cli.log_json || settings.log_json,
    )?;

    let registry_path = settings.address_registry_path()?;
    let registry = AddressRegistry::load(registry_path.as_deref())?;
    let mut chain = registry.chain(settings.chain_id)?;

    let rpc_url = settings.get_http_provider(settings.chain_id)?;
    let provider = ConnectionFactory::http(&rpc_url)?;
    if settings.validate_contracts && !cli.skip_contract_check {
        chain = chain.validate_with_provider(&provider).await?;
    }

    let token_in = resolve_cli_token(&chain, "token_in", &cli.token_in)?;
    let token_out = resolve_cli_token(&chain, "token_out", &cli.token_out)?;
    let amount_in = parse_amount(&cli.amount)?;

    let optimizer = RouteOptimizer::new(&chain, Arc::new(provider), settings.routing_options())?;
    let protocols = match cli.protocol {
        Some(protocol) => vec![protocol],
        None => optimizer.protocols(),
    };
    tracing::info!(
        target: "routing",
        chain_id = settings.chain_id,
        %token_in,
        %token_out,
        %amount_in,
        protocols = ?protocols,
        "Quoting"
    );

    let mut routes = Vec::with_capacity(protocols.len());
    for protocol in protocols {
        let route = optimizer
            .get_best_route(protocol, token_in, amount_in, token_out)
            .await?;
        if !route.is_empty() {
            routes.push(route);
        }
    }
    let best = routes
        .iter()
        .max_by(|a, b| {
            a.amount_out
                .cmp(&b.amount_out)
                .then_with(|| b.hops().cmp(&a.hops()))
        })
        .cloned();

    let report = QuoteReport {
        chain_id: settings.chain_id,
        best,
        routes,
    };
    let rendered = serde_json::to_string_pretty(&report)
        .map_err(|e| AppError::Encode(format!("route report: {e}")))?;
    println!("{rendered}");
    Ok(())
}
