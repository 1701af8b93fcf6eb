// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: 2026 ® John Hauger Mitander <john@oxidity.com>

use crate::common::error::AppError;
use crate::data::address_registry::ChainConfig;
use crate::services::routing::contracts::UniV2Router;
use crate::services::routing::route::{Protocol, Route, RouteArtifacts};
use crate::services::routing::strategy::{Quote, QuoteCodec};
use alloy::primitives::{Address, Bytes, U256};
use alloy::sol_types::SolCall;

const NO_HOP_PARAMS: [(); 1] = [()];

/// Uniswap V2 router `getAmountsOut`. Pools are fully identified by the token pair.
#[derive(Debug, Clone)]
pub struct ConstantProductCodec {
    router: Address,
}

impl ConstantProductCodec {
    pub fn new(router: Address) -> Self {
        Self { router }
    }

    pub fn from_chain(cfg: &ChainConfig) -> Result<Self, AppError> {
        Ok(Self::new(cfg.constant_product_router()?))
    }

    fn encode(path: &[Address], amount_in: U256) -> Bytes {
        UniV2Router::getAmountsOutCall {
            amountIn: amount_in,
            path: path.to_vec(),
        }
        .abi_encode()
        .into()
    }

    fn decode(raw: &[u8]) -> Result<Quote, AppError> {
        let amounts = UniV2Router::getAmountsOutCall::abi_decode_returns(raw)
            .map_err(|e| AppError::decode(Protocol::ConstantProduct, e))?;
        Quote::from_amounts(Protocol::ConstantProduct, amounts)
    }
}

impl QuoteCodec for ConstantProductCodec {
    type Hop = ();

    fn protocol(&self) -> Protocol {
        Protocol::ConstantProduct
    }

    fn target(&self) -> Address {
        self.router
    }

    fn hop_choices(&self) -> &[()] {
        &NO_HOP_PARAMS
    }

    fn encode_direct_quote(
        &self,
        token_in: Address,
        amount_in: U256,
        token_out: Address,
        _hop: (),
    ) -> Result<Bytes, AppError> {
        Ok(Self::encode(&[token_in, token_out], amount_in))
    }

    fn encode_multi_hop_quote(
        &self,
        path: &[Address],
        amount_in: U256,
        _hops: &[()],
    ) -> Result<Bytes, AppError> {
        Ok(Self::encode(path, amount_in))
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
        _hops: &[()],
        amount_in: U256,
        quote: Quote,
    ) -> Result<Route, AppError> {
        Ok(Route {
            protocol: Some(Protocol::ConstantProduct),
            amount_in,
            amount_out: quote.amount_out,
            path,
            hop_amounts: quote.hop_amounts,
            artifacts: RouteArtifacts::ConstantProduct,
            ..Route::default()
        })
    }
}
