// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: 2026 ® John Hauger Mitander <john@oxidity.com>

use crate::common::error::AppError;
use crate::data::address_registry::ChainConfig;
use crate::services::routing::contracts::V4Quoter;
use crate::services::routing::route::{FeeTier, PoolKey, Protocol, Route, RouteArtifacts};
use crate::services::routing::strategy::{Quote, QuoteCodec};
use alloy::primitives::{Address, Bytes, U256};
use alloy::sol_types::SolCall;

/// Uniswap V4 Quoter over hookless (or single-hook) pools of the standard tiers.
#[derive(Debug, Clone)]
pub struct SingletonCodec {
    quoter: Address,
    hooks: Address,
}

impl SingletonCodec {
    pub fn new(quoter: Address) -> Self {
        Self {
            quoter,
            hooks: Address::ZERO,
        }
    }

    pub fn with_hooks(mut self, hooks: Address) -> Self {
        self.hooks = hooks;
        self
    }

    pub fn from_chain(cfg: &ChainConfig) -> Result<Self, AppError> {
        Ok(Self::new(cfg.singleton_quoter()?))
    }

    fn exact_amount(amount_in: U256) -> Result<u128, AppError> {
        u128::try_from(amount_in)
            .map_err(|_| AppError::invalid_input("amount_in", "exceeds uint128 quoter limit"))
    }

    /// Canonical keys for each hop of `path`, in path order.
    pub fn pool_keys(&self, path: &[Address], fees: &[FeeTier]) -> Vec<PoolKey> {
        path.windows(2)
            .zip(fees)
            .map(|(pair, fee)| PoolKey::canonical(pair[0], pair[1], *fee, self.hooks))
            .collect()
    }
}

impl QuoteCodec for SingletonCodec {
    type Hop = FeeTier;

    fn protocol(&self) -> Protocol {
        Protocol::SingletonHookPool
    }

    fn target(&self) -> Address {
        self.quoter
    }

    fn hop_choices(&self) -> &[FeeTier] {
        &FeeTier::ALL
    }

    fn validate_amount(&self, amount_in: U256) -> Result<(), AppError> {
        Self::exact_amount(amount_in).map(|_| ())
    }

    fn encode_direct_quote(
        &self,
        token_in: Address,
        amount_in: U256,
        token_out: Address,
        fee: FeeTier,
    ) -> Result<Bytes, AppError> {
        let key = PoolKey::canonical(token_in, token_out, fee, self.hooks);
        let params = V4Quoter::QuoteExactSingleParams {
            poolKey: key.to_sol(),
            zeroForOne: token_in == key.currency0,
            exactAmount: Self::exact_amount(amount_in)?,
            hookData: Bytes::new(),
        };
        Ok(V4Quoter::quoteExactInputSingleCall { params }
            .abi_encode()
            .into())
    }

    fn encode_multi_hop_quote(
        &self,
        path: &[Address],
        amount_in: U256,
        fees: &[FeeTier],
    ) -> Result<Bytes, AppError> {
        if path.len() < 2 || fees.len() + 1 != path.len() {
            return Err(AppError::Encode(format!(
                "path of {} tokens needs {} fees, got {}",
                path.len(),
                path.len().saturating_sub(1),
                fees.len()
            )));
        }
        let hops = path[1..]
            .iter()
            .zip(fees)
            .map(|(currency, fee)| V4Quoter::PathKey {
                intermediateCurrency: *currency,
                fee: fee.fee_u24(),
                tickSpacing: fee.tick_spacing_i24(),
                hooks: self.hooks,
                hookData: Bytes::new(),
            })
            .collect();
        let params = V4Quoter::QuoteExactParams {
            exactCurrency: path[0],
            path: hops,
            exactAmount: Self::exact_amount(amount_in)?,
        };
        Ok(V4Quoter::quoteExactInputCall { params }.abi_encode().into())
    }

    fn decode_direct_quote(&self, raw: &[u8]) -> Result<Quote, AppError> {
        let ret = V4Quoter::quoteExactInputSingleCall::abi_decode_returns(raw)
            .map_err(|e| AppError::decode(self.protocol(), e))?;
        Ok(Quote::single(ret.amountOut))
    }

    fn decode_multi_hop_quote(&self, raw: &[u8]) -> Result<Quote, AppError> {
        let ret = V4Quoter::quoteExactInputCall::abi_decode_returns(raw)
            .map_err(|e| AppError::decode(self.protocol(), e))?;
        Ok(Quote::single(ret.amountOut))
    }

    fn assemble_route(
        &self,
        path: Vec<Address>,
        fees: &[FeeTier],
        amount_in: U256,
        quote: Quote,
    ) -> Result<Route, AppError> {
        let pool_keys = self.pool_keys(&path, fees);
        let pool_ids = pool_keys.iter().map(PoolKey::pool_id).collect();
        Ok(Route {
            protocol: Some(Protocol::SingletonHookPool),
            amount_in,
            amount_out: quote.amount_out,
            path,
            fees: fees.iter().map(|f| f.pips()).collect(),
            artifacts: RouteArtifacts::SingletonHookPool {
                pool_keys,
                pool_ids,
            },
            ..Route::default()
        })
    }
}
