// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: 2026 ® John Hauger Mitander <john@oxidity.com>

use crate::common::error::AppError;
use crate::data::address_registry::ChainConfig;
use crate::services::routing::contracts::SolidlyRouter;
use crate::services::routing::route::{Protocol, Route, RouteArtifacts, StableRoute};
use crate::services::routing::strategy::{Quote, QuoteCodec};
use alloy::primitives::{Address, Bytes, U256};
use alloy::sol_types::SolCall;

/// Volatile pools first so a stable pool only wins with a strictly better quote.
const POOL_TYPES: [bool; 2] = [false, true];

/// Velodrome/Aerodrome v2 router quoting through `(from, to, stable, factory)` routes.
#[derive(Debug, Clone)]
pub struct StableVolatileCodec {
    router: Address,
    factory: Address,
}

impl StableVolatileCodec {
    pub fn new(router: Address, factory: Address) -> Self {
        Self { router, factory }
    }

    pub fn from_chain(cfg: &ChainConfig) -> Result<Self, AppError> {
        let (router, factory) = cfg.stable_volatile_router()?;
        Ok(Self::new(router, factory))
    }

    pub fn stable_routes(&self, path: &[Address], stable: &[bool]) -> Vec<StableRoute> {
        path.windows(2)
            .zip(stable)
            .map(|(pair, stable)| StableRoute {
                from: pair[0],
                to: pair[1],
                stable: *stable,
                factory: self.factory,
            })
            .collect()
    }

    fn encode(&self, path: &[Address], amount_in: U256, stable: &[bool]) -> Result<Bytes, AppError> {
        if path.len() < 2 || stable.len() + 1 != path.len() {
            return Err(AppError::Encode(format!(
                "path of {} tokens needs {} pool types, got {}",
                path.len(),
                path.len().saturating_sub(1),
                stable.len()
            )));
        }
        let routes = self
            .stable_routes(path, stable)
            .into_iter()
            .map(|r| SolidlyRouter::Route {
                from: r.from,
                to: r.to,
                stable: r.stable,
                factory: r.factory,
            })
            .collect();
        Ok(SolidlyRouter::getAmountsOutCall {
            amountIn: amount_in,
            routes,
        }
        .abi_encode()
        .into())
    }

    fn decode(raw: &[u8]) -> Result<Quote, AppError> {
        let amounts = SolidlyRouter::getAmountsOutCall::abi_decode_returns(raw)
            .map_err(|e| AppError::decode(Protocol::StableVolatileFork, e))?;
        Quote::from_amounts(Protocol::StableVolatileFork, amounts)
    }
}

impl QuoteCodec for StableVolatileCodec {
    type Hop = bool;

    fn protocol(&self) -> Protocol {
        Protocol::StableVolatileFork
    }

    fn target(&self) -> Address {
        self.router
    }

    fn hop_choices(&self) -> &[bool] {
        &POOL_TYPES
    }

    fn encode_direct_quote(
        &self,
        token_in: Address,
        amount_in: U256,
        token_out: Address,
        stable: bool,
    ) -> Result<Bytes, AppError> {
        self.encode(&[token_in, token_out], amount_in, &[stable])
    }

    fn encode_multi_hop_quote(
        &self,
        path: &[Address],
        amount_in: U256,
        stable: &[bool],
    ) -> Result<Bytes, AppError> {
        self.encode(path, amount_in, stable)
    }

    fn decode_direct_quote(&self, raw: &[u8]) -> Result<Quote, AppError> {
        Self::decode(raw)
    }

    fn decode_multi_hop_quote(&self, raw: &[u8]) -> Result<Quote, AppError> {
        Self::decode(raw)
    }

    fn assemble_route(
        &self,
        path: Vec<Address>,
        stable: &[bool],
        amount_in: U256,
        quote: Quote,
    ) -> Result<Route, AppError> {
        let routes = self.stable_routes(&path, stable);
        Ok(Route {
            protocol: Some(Protocol::StableVolatileFork),
            amount_in,
            amount_out: quote.amount_out,
            path,
            stable: stable.to_vec(),
            hop_amounts: quote.hop_amounts,
            artifacts: RouteArtifacts::StableVolatileFork { routes },
            ..Route::default()
        })
    }
}
