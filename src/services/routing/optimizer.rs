// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: 2026 ® John Hauger Mitander <john@oxidity.com>

use crate::common::constants::{
    DEFAULT_BATCH_TIMEOUT, DEFAULT_MULTICALL_BATCH_SIZE, DEFAULT_ROUTE_CACHE_TTL,
};
use crate::common::error::AppError;
use crate::common::ttl_cache::TtlCache;
use crate::data::address_registry::ChainConfig;
use crate::network::multicall::MulticallClient;
use crate::network::provider::StaticCaller;
use crate::services::routing::paths::PathGenerator;
use crate::services::routing::protocols::{
    ConcentratedCodec, ConstantProductCodec, SingletonCodec, StableVolatileCodec,
};
use crate::services::routing::route::{Protocol, Route};
use crate::services::routing::strategy::{RouteStrategy, RoutingStrategy};
use alloy::primitives::{Address, U256};
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

/// Tunables shared by every strategy an optimizer owns.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RoutingOptions {
    pub batch_size: usize,
    /// `None` waits on each batch indefinitely.
    pub batch_timeout: Option<Duration>,
    pub cache_ttl: Duration,
}

impl Default for RoutingOptions {
    fn default() -> Self {
        Self {
            batch_size: DEFAULT_MULTICALL_BATCH_SIZE,
            batch_timeout: Some(DEFAULT_BATCH_TIMEOUT),
            cache_ttl: DEFAULT_ROUTE_CACHE_TTL,
        }
    }
}

/// Per-chain entry point: dispatches to the protocol strategy and caches results.
///
/// Concurrent misses on one key each run the full quote; the last write wins.
pub struct RouteOptimizer {
    chain_id: u64,
    strategies: HashMap<Protocol, Arc<dyn RouteStrategy>>,
    cache: TtlCache<String, Route>,
}

impl RouteOptimizer {
    /// Builds one strategy per protocol the chain configures. Protocols with
    /// missing contracts are skipped; a chain with none at all is an error.
    pub fn new(
        chain: &ChainConfig,
        caller: Arc<dyn StaticCaller>,
        options: RoutingOptions,
    ) -> Result<Self, AppError> {
        let client = MulticallClient::new(caller, chain.multicall)
            .with_batch_size(options.batch_size)
            .with_batch_timeout(options.batch_timeout);
        let paths = PathGenerator::from_chain(chain);

        let mut strategies: Vec<Arc<dyn RouteStrategy>> = Vec::new();
        for protocol in Protocol::ALL {
            match build_strategy(protocol, chain, paths.clone(), client.clone()) {
                Ok(strategy) => strategies.push(strategy),
                Err(AppError::Config(reason)) => tracing::warn!(
                    target: "config",
                    chain_id = chain.chain_id,
                    %protocol,
                    %reason,
                    "Protocol not configured; skipping"
                ),
                Err(e) => return Err(e),
            }
        }
        if strategies.is_empty() {
            return Err(AppError::Config(format!(
                "chain {} has no routable protocol configured",
                chain.chain_id
            )));
        }
        Ok(Self::from_strategies(chain.chain_id, strategies, options.cache_ttl))
    }

    /// Wires caller-supplied strategies. A later strategy for the same protocol replaces an earlier one.
    pub fn from_strategies(
        chain_id: u64,
        strategies: impl IntoIterator<Item = Arc<dyn RouteStrategy>>,
        cache_ttl: Duration,
    ) -> Self {
        let strategies = strategies
            .into_iter()
            .map(|s| (s.protocol(), s))
            .collect();
        Self {
            chain_id,
            strategies,
            cache: TtlCache::new(cache_ttl),
        }
    }

    pub fn chain_id(&self) -> u64 {
        self.chain_id
    }

    /// Configured protocols in declaration order.
    pub fn protocols(&self) -> Vec<Protocol> {
        let mut protocols: Vec<Protocol> = self.strategies.keys().copied().collect();
        protocols.sort();
        protocols
    }

    pub fn cache_key(
        protocol: Protocol,
        token_in: Address,
        amount_in: U256,
        token_out: Address,
    ) -> String {
        format!("{protocol}:{token_in:#x}{amount_in}{token_out:#x}")
    }

    pub async fn get_best_route(
        &self,
        protocol: Protocol,
        token_in: Address,
        amount_in: U256,
        token_out: Address,
    ) -> Result<Route, AppError> {
        let strategy = self.strategies.get(&protocol).ok_or_else(|| {
            AppError::Config(format!(
                "protocol {protocol} is not configured on chain {}",
                self.chain_id
            ))
        })?;

        let key = Self::cache_key(protocol, token_in, amount_in, token_out);
        if let Some(route) = self.cache.get(&key) {
            tracing::trace!(target: "route_cache", %key, "Route cache hit");
            return Ok(route);
        }
        tracing::debug!(target: "route_cache", %key, "Route cache miss");

        let route = strategy.get_best_route(token_in, amount_in, token_out).await?;
        self.cache.insert(key, route.clone());
        Ok(route)
    }
}

fn build_strategy(
    protocol: Protocol,
    chain: &ChainConfig,
    paths: PathGenerator,
    client: MulticallClient,
) -> Result<Arc<dyn RouteStrategy>, AppError> {
    let strategy: Arc<dyn RouteStrategy> = match protocol {
        Protocol::ConstantProduct => Arc::new(RoutingStrategy::new(
            ConstantProductCodec::from_chain(chain)?,
            paths,
            client,
        )),
        Protocol::ConcentratedLiquidity => Arc::new(RoutingStrategy::new(
            ConcentratedCodec::from_chain(chain)?,
            paths,
            client,
        )),
        Protocol::SingletonHookPool => Arc::new(RoutingStrategy::new(
            SingletonCodec::from_chain(chain)?,
            paths,
            client,
        )),
        Protocol::StableVolatileFork => Arc::new(RoutingStrategy::new(
            StableVolatileCodec::from_chain(chain)?,
            paths,
            client,
        )),
    };
    Ok(strategy)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::network::provider::MockStaticCaller;
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct CountingStrategy {
        calls: AtomicUsize,
        amount_out: U256,
    }

    #[async_trait]
    impl RouteStrategy for CountingStrategy {
        fn protocol(&self) -> Protocol {
            Protocol::ConcentratedLiquidity
        }

        async fn get_best_route(
            &self,
            token_in: Address,
            amount_in: U256,
            token_out: Address,
        ) -> Result<Route, AppError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(Route {
                protocol: Some(self.protocol()),
                amount_in,
                amount_out: self.amount_out,
                path: vec![token_in, token_out],
                ..Route::default()
            })
        }
    }

    fn addr(byte: u8) -> Address {
        Address::from([byte; 20])
    }

    fn optimizer(ttl: Duration) -> (RouteOptimizer, Arc<CountingStrategy>) {
        let strategy = Arc::new(CountingStrategy {
            calls: AtomicUsize::new(0),
            amount_out: U256::from(99u64),
        });
        let optimizer = RouteOptimizer::from_strategies(
            1,
            [strategy.clone() as Arc<dyn RouteStrategy>],
            ttl,
        );
        (optimizer, strategy)
    }

    #[tokio::test(start_paused = true)]
    async fn repeated_lookup_within_ttl_is_served_from_cache() {
        let (optimizer, strategy) = optimizer(Duration::from_secs(600));
        let p = Protocol::ConcentratedLiquidity;
        let first = optimizer
            .get_best_route(p, addr(1), U256::from(5u64), addr(2))
            .await
            .expect("route");
        let second = optimizer
            .get_best_route(p, addr(1), U256::from(5u64), addr(2))
            .await
            .expect("route");
        assert_eq!(first, second);
        assert_eq!(strategy.calls.load(Ordering::SeqCst), 1);

        optimizer
            .get_best_route(p, addr(1), U256::from(6u64), addr(2))
            .await
            .expect("route");
        assert_eq!(strategy.calls.load(Ordering::SeqCst), 2);

        tokio::time::advance(Duration::from_secs(601)).await;
        optimizer
            .get_best_route(p, addr(1), U256::from(5u64), addr(2))
            .await
            .expect("route");
        assert_eq!(strategy.calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn unconfigured_protocol_is_config_error() {
        let (optimizer, strategy) = optimizer(Duration::from_secs(60));
        let err = optimizer
            .get_best_route(Protocol::StableVolatileFork, addr(1), U256::from(1u64), addr(2))
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Config(_)));
        assert_eq!(strategy.calls.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn cache_key_is_lowercase_and_protocol_scoped() {
        let token = Address::from([0xAB; 20]);
        let key = RouteOptimizer::cache_key(
            Protocol::ConstantProduct,
            token,
            U256::from(1_000u64),
            addr(2),
        );
        assert_eq!(
            key,
            format!(
                "constant_product:0x{}10000x{}",
                "ab".repeat(20),
                "02".repeat(20)
            )
        );
        assert_ne!(
            key,
            RouteOptimizer::cache_key(Protocol::ConcentratedLiquidity, token, U256::from(1_000u64), addr(2))
        );
    }

    #[test]
    fn new_skips_protocols_without_contracts() {
        let mut chain = ChainConfig::empty(10, addr(0x01));
        chain.constant_product_router = Some(addr(0x10));
        chain.stable_volatile_router = Some(addr(0x20));
        chain.stable_volatile_factory = Some(addr(0x21));
        let optimizer = RouteOptimizer::new(
            &chain,
            Arc::new(MockStaticCaller::new()),
            RoutingOptions::default(),
        )
        .expect("optimizer");
        assert_eq!(
            optimizer.protocols(),
            vec![Protocol::ConstantProduct, Protocol::StableVolatileFork]
        );

        let bare = ChainConfig::empty(10, addr(0x01));
        assert!(matches!(
            RouteOptimizer::new(&bare, Arc::new(MockStaticCaller::new()), RoutingOptions::default()),
            Err(AppError::Config(_))
        ));
    }
}
