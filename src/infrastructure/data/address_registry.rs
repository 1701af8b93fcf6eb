// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: 2026 ® John Hauger Mitander <john@oxidity.com>

use crate::common::constants::{
    self, CONCENTRATED_QUOTERS, CONSTANT_PRODUCT_ROUTERS, MULTICALL3, SINGLETON_QUOTERS,
    STABLE_VOLATILE_ROUTERS, SUPPORTED_CHAINS,
};
use crate::common::error::AppError;
use crate::common::parsing::parse_address_hex;
use crate::network::provider::HttpProvider;
use alloy::primitives::Address;
use alloy::providers::Provider;
use serde::Deserialize;
use std::collections::{HashMap, HashSet};
use std::fs;
use std::path::Path;

/// Static per-network addresses consumed by the routing strategies.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ChainConfig {
    pub chain_id: u64,
    pub multicall: Address,
    pub wrapped_native: Address,
    pub constant_product_router: Option<Address>,
    pub concentrated_quoter: Option<Address>,
    pub singleton_quoter: Option<Address>,
    pub stable_volatile_router: Option<Address>,
    pub stable_volatile_factory: Option<Address>,
    /// Upper-case symbol -> token address.
    pub tokens: HashMap<String, Address>,
    pub intermediaries: Vec<Address>,
    pub intermediary_pairs: Vec<(Address, Address)>,
}

impl ChainConfig {
    /// Minimal config with no protocol contracts; used as a base for overrides.
    pub fn empty(chain_id: u64, wrapped_native: Address) -> Self {
        Self {
            chain_id,
            multicall: MULTICALL3,
            wrapped_native,
            constant_product_router: None,
            concentrated_quoter: None,
            singleton_quoter: None,
            stable_volatile_router: None,
            stable_volatile_factory: None,
            tokens: HashMap::new(),
            intermediaries: Vec::new(),
            intermediary_pairs: Vec::new(),
        }
    }

    pub fn builtin(chain_id: u64) -> Result<Self, AppError> {
        let wrapped_native = constants::wrapped_native_for_chain(chain_id).ok_or_else(|| {
            AppError::Config(format!("no built-in configuration for chain {chain_id}"))
        })?;
        let mut cfg = Self::empty(chain_id, wrapped_native);
        cfg.constant_product_router = CONSTANT_PRODUCT_ROUTERS.get(&chain_id).copied();
        cfg.concentrated_quoter = CONCENTRATED_QUOTERS.get(&chain_id).copied();
        cfg.singleton_quoter = SINGLETON_QUOTERS.get(&chain_id).copied();
        if let Some((router, factory)) = STABLE_VOLATILE_ROUTERS.get(&chain_id) {
            cfg.stable_volatile_router = Some(*router);
            cfg.stable_volatile_factory = Some(*factory);
        }
        cfg.tokens = constants::default_tokens_for_chain(chain_id);

        cfg.intermediaries = constants::default_intermediary_symbols(chain_id)
            .iter()
            .map(|symbol| cfg.resolve_token(symbol))
            .collect::<Result<Vec<_>, _>>()?;
        cfg.intermediary_pairs = constants::default_intermediary_pair_symbols(chain_id)
            .iter()
            .map(|(a, b)| Ok((cfg.resolve_token(a)?, cfg.resolve_token(b)?)))
            .collect::<Result<Vec<_>, AppError>>()?;
        Ok(cfg)
    }

    pub fn token(&self, symbol: &str) -> Option<Address> {
        self.tokens.get(&symbol.to_ascii_uppercase()).copied()
    }

    /// Accepts either a known symbol or a hex address.
    pub fn resolve_token(&self, symbol_or_address: &str) -> Result<Address, AppError> {
        if let Some(addr) = parse_address_hex(symbol_or_address) {
            return Ok(addr);
        }
        self.token(symbol_or_address).ok_or_else(|| {
            AppError::Config(format!(
                "chain {}: unknown token {symbol_or_address}",
                self.chain_id
            ))
        })
    }

    fn require(&self, addr: Option<Address>, label: &str) -> Result<Address, AppError> {
        addr.ok_or_else(|| {
            AppError::Config(format!("chain {}: {label} address is not configured", self.chain_id))
        })
    }

    pub fn constant_product_router(&self) -> Result<Address, AppError> {
        self.require(self.constant_product_router, "constant_product_router")
    }

    pub fn concentrated_quoter(&self) -> Result<Address, AppError> {
        self.require(self.concentrated_quoter, "concentrated_quoter")
    }

    pub fn singleton_quoter(&self) -> Result<Address, AppError> {
        self.require(self.singleton_quoter, "singleton_quoter")
    }

    pub fn stable_volatile_router(&self) -> Result<(Address, Address), AppError> {
        Ok((
            self.require(self.stable_volatile_router, "stable_volatile_router")?,
            self.require(self.stable_volatile_factory, "stable_volatile_factory")?,
        ))
    }

    fn apply_overrides(&mut self, file: ChainRegistryFile) -> Result<(), AppError> {
        let chain_id = self.chain_id;
        let label = move |field: &str| format!("chain {chain_id} {field}");

        if let Some(raw) = file.multicall {
            self.multicall = parse_required(&raw, &label("multicall"))?;
        }
        if let Some(raw) = file.wrapped_native {
            self.wrapped_native = parse_required(&raw, &label("wrapped_native"))?;
        }
        if let Some(raw) = file.constant_product_router {
            self.constant_product_router =
                Some(parse_required(&raw, &label("constant_product_router"))?);
        }
        if let Some(raw) = file.concentrated_quoter {
            self.concentrated_quoter = Some(parse_required(&raw, &label("concentrated_quoter"))?);
        }
        if let Some(raw) = file.singleton_quoter {
            self.singleton_quoter = Some(parse_required(&raw, &label("singleton_quoter"))?);
        }
        if let Some(raw) = file.stable_volatile_router {
            self.stable_volatile_router =
                Some(parse_required(&raw, &label("stable_volatile_router"))?);
        }
        if let Some(raw) = file.stable_volatile_factory {
            self.stable_volatile_factory =
                Some(parse_required(&raw, &label("stable_volatile_factory"))?);
        }
        for (symbol, raw) in file.tokens {
            let addr = parse_required(&raw, &label(&format!("tokens.{symbol}")))?;
            self.tokens.insert(symbol.to_ascii_uppercase(), addr);
        }
        if let Some(list) = file.intermediaries {
            self.intermediaries = list
                .iter()
                .map(|s| self.resolve_token(s))
                .collect::<Result<Vec<_>, _>>()?;
        }
        if let Some(pairs) = file.intermediary_pairs {
            self.intermediary_pairs = pairs
                .iter()
                .map(|(a, b)| Ok((self.resolve_token(a)?, self.resolve_token(b)?)))
                .collect::<Result<Vec<_>, AppError>>()?;
        }
        Ok(())
    }

    /// Checks every configured contract for deployed code. A code-less
    /// multicall is fatal; code-less protocol contracts are dropped.
    pub async fn validate_with_provider(self, provider: &HttpProvider) -> Result<Self, AppError> {
        let mut undeployed = HashSet::new();
        for addr in self.contract_addresses() {
            if !undeployed.contains(&addr) && !has_code(provider, addr).await {
                undeployed.insert(addr);
            }
        }
        self.retain_deployed(&undeployed)
    }

    fn contract_addresses(&self) -> Vec<Address> {
        std::iter::once(self.multicall)
            .chain(self.constant_product_router)
            .chain(self.concentrated_quoter)
            .chain(self.singleton_quoter)
            .chain(self.stable_volatile_router)
            .chain(self.stable_volatile_factory)
            .collect()
    }

    /// The stable/volatile router and its factory are kept or dropped together.
    fn retain_deployed(mut self, undeployed: &HashSet<Address>) -> Result<Self, AppError> {
        if undeployed.contains(&self.multicall) {
            return Err(AppError::Config(format!(
                "multicall {:#x} has no code on chain {}",
                self.multicall, self.chain_id
            )));
        }
        let chain_id = self.chain_id;
        let keep = |slot: Option<Address>, label: &str| match slot {
            Some(a) if undeployed.contains(&a) => {
                tracing::warn!(
                    target: "registry",
                    chain_id,
                    address = %format!("{a:#x}"),
                    label,
                    "Address has no code; dropping"
                );
                None
            }
            other => other,
        };
        self.constant_product_router =
            keep(self.constant_product_router, "constant_product_router");
        self.concentrated_quoter = keep(self.concentrated_quoter, "concentrated_quoter");
        self.singleton_quoter = keep(self.singleton_quoter, "singleton_quoter");
        let router = keep(self.stable_volatile_router, "stable_volatile_router");
        let factory = keep(self.stable_volatile_factory, "stable_volatile_factory");
        (self.stable_volatile_router, self.stable_volatile_factory) = match (router, factory) {
            (Some(r), Some(f)) => (Some(r), Some(f)),
            _ => (None, None),
        };
        Ok(self)
    }
}

#[derive(Deserialize, Debug)]
struct AddressRegistryFile {
    chains: HashMap<String, ChainRegistryFile>,
}

#[derive(Deserialize, Debug, Default)]
struct ChainRegistryFile {
    #[serde(default)]
    multicall: Option<String>,
    #[serde(default)]
    wrapped_native: Option<String>,
    #[serde(default)]
    constant_product_router: Option<String>,
    #[serde(default)]
    concentrated_quoter: Option<String>,
    #[serde(default)]
    singleton_quoter: Option<String>,
    #[serde(default)]
    stable_volatile_router: Option<String>,
    #[serde(default)]
    stable_volatile_factory: Option<String>,
    #[serde(default)]
    tokens: HashMap<String, String>,
    #[serde(default)]
    intermediaries: Option<Vec<String>>,
    #[serde(default)]
    intermediary_pairs: Option<Vec<(String, String)>>,
}

#[derive(Clone, Debug)]
pub struct AddressRegistry {
    chains: HashMap<u64, ChainConfig>,
}

impl AddressRegistry {
    pub fn builtin() -> Result<Self, AppError> {
        let mut chains = HashMap::new();
        for chain_id in SUPPORTED_CHAINS {
            chains.insert(chain_id, ChainConfig::builtin(chain_id)?);
        }
        Ok(Self { chains })
    }

    /// Built-in tables, overlaid with a JSON registry file when one is given.
    pub fn load(path: Option<&str>) -> Result<Self, AppError> {
        let mut registry = Self::builtin()?;
        if let Some(path) = path {
            registry.merge_file(path)?;
        }
        Ok(registry)
    }

    pub fn merge_file(&mut self, path: &str) -> Result<(), AppError> {
        let p = Path::new(path);
        if !p.exists() {
            return Err(AppError::Config(format!(
                "Address registry not found: {}",
                path
            )));
        }
        let raw = fs::read_to_string(p)
            .map_err(|e| AppError::Config(format!("Failed to read registry {}: {e}", path)))?;
        self.merge_json(&raw)
            .map_err(|e| AppError::Config(format!("Registry {}: {e}", path)))
    }

    pub fn merge_json(&mut self, raw: &str) -> Result<(), AppError> {
        let file: AddressRegistryFile = serde_json::from_str(raw)
            .map_err(|e| AppError::Config(format!("Failed to parse registry: {e}")))?;

        let mut chain_ids: Vec<(u64, ChainRegistryFile)> = Vec::with_capacity(file.chains.len());
        for (chain_str, c) in file.chains {
            let chain_id = chain_str
                .parse::<u64>()
                .map_err(|_| AppError::Config(format!("Invalid chain id key {chain_str:?}")))?;
            chain_ids.push((chain_id, c));
        }
        chain_ids.sort_by_key(|(id, _)| *id);

        for (chain_id, c) in chain_ids {
            let mut cfg = match self.chains.remove(&chain_id) {
                Some(existing) => existing,
                None => {
                    let wrapped = c
                        .wrapped_native
                        .as_deref()
                        .ok_or_else(|| {
                            AppError::Config(format!(
                                "chain {chain_id}: wrapped_native is required for new chains"
                            ))
                        })
                        .and_then(|raw| parse_required(raw, "wrapped_native"))?;
                    ChainConfig::empty(chain_id, wrapped)
                }
            };
            cfg.apply_overrides(c)?;
            tracing::info!(
                target: "config",
                chain_id,
                intermediaries = cfg.intermediaries.len(),
                pairs = cfg.intermediary_pairs.len(),
                "Applied address registry overrides"
            );
            self.chains.insert(chain_id, cfg);
        }
        Ok(())
    }

    pub fn chain(&self, chain_id: u64) -> Result<ChainConfig, AppError> {
        self.chains
            .get(&chain_id)
            .cloned()
            .ok_or_else(|| AppError::Config(format!("chain {chain_id} is not configured")))
    }
}

fn parse_required(raw: &str, label: &str) -> Result<Address, AppError> {
    parse_address_hex(raw)
        .ok_or_else(|| AppError::Config(format!("{label}: invalid address {raw:?}")))
}

async fn has_code(provider: &HttpProvider, addr: Address) -> bool {
    match provider.get_code_at(addr).await {
        Ok(code) => !code.is_empty(),
        Err(e) => {
            tracing::warn!(
                target: "registry",
                address = %format!("{:#x}", addr),
                error = %e,
                "Failed to fetch code; treating as invalid"
            );
            false
        }
    }
}
