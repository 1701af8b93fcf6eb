// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: 2026 ® John Hauger Mitander <john@oxidity.com>

use crate::common::error::AppError;
use crate::services::routing::contracts::V4Quoter;
use alloy::primitives::aliases::{I24, U24};
use alloy::primitives::{Address, B256, Bytes, U256, keccak256};
use alloy::sol_types::SolValue;
use serde::Serialize;
use std::fmt;
use std::str::FromStr;

/// AMM families the optimizer can route through.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Protocol {
    /// Uniswap V2 style `x*y=k` pools behind a router.
    ConstantProduct,
    /// Uniswap V3 style tiered-fee pools quoted through QuoterV2.
    ConcentratedLiquidity,
    /// Uniswap V4 singleton pool manager with hook-keyed pools.
    SingletonHookPool,
    /// Velodrome/Aerodrome v2 stable + volatile pools.
    StableVolatileFork,
}

impl Protocol {
    pub const ALL: [Protocol; 4] = [
        Protocol::ConstantProduct,
        Protocol::ConcentratedLiquidity,
        Protocol::SingletonHookPool,
        Protocol::StableVolatileFork,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Protocol::ConstantProduct => "constant_product",
            Protocol::ConcentratedLiquidity => "concentrated_liquidity",
            Protocol::SingletonHookPool => "singleton_hook_pool",
            Protocol::StableVolatileFork => "stable_volatile_fork",
        }
    }
}

impl fmt::Display for Protocol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Protocol {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().replace('-', "_").as_str() {
            "constant_product" | "uniswap_v2" | "univ2" | "v2" => Ok(Protocol::ConstantProduct),
            "concentrated_liquidity" | "uniswap_v3" | "univ3" | "v3" => {
                Ok(Protocol::ConcentratedLiquidity)
            }
            "singleton_hook_pool" | "uniswap_v4" | "univ4" | "v4" => Ok(Protocol::SingletonHookPool),
            "stable_volatile_fork" | "velodrome" | "aerodrome" | "solidly" => {
                Ok(Protocol::StableVolatileFork)
            }
            other => Err(AppError::invalid_input(
                "protocol",
                format!("unknown protocol {other:?}"),
            )),
        }
    }
}

/// Fee levels shared by the tiered-fee protocols, in hundredths of a bip.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(into = "u32")]
pub enum FeeTier {
    /// 0.01%
    Lowest,
    /// 0.05%
    Low,
    /// 0.30%
    Medium,
    /// 1.00%
    High,
}

impl FeeTier {
    pub const ALL: [FeeTier; 4] = [FeeTier::Lowest, FeeTier::Low, FeeTier::Medium, FeeTier::High];

    pub fn pips(self) -> u32 {
        match self {
            FeeTier::Lowest => 100,
            FeeTier::Low => 500,
            FeeTier::Medium => 3_000,
            FeeTier::High => 10_000,
        }
    }

    /// Tick spacing Uniswap pairs with each fee tier by default.
    pub fn tick_spacing(self) -> i32 {
        match self {
            FeeTier::Lowest => 1,
            FeeTier::Low => 10,
            FeeTier::Medium => 60,
            FeeTier::High => 200,
        }
    }

    pub fn fee_u24(self) -> U24 {
        U24::from(self.pips())
    }

    pub fn tick_spacing_i24(self) -> I24 {
        I24::from_raw(U24::from(self.tick_spacing() as u32))
    }
}

impl From<FeeTier> for u32 {
    fn from(tier: FeeTier) -> Self {
        tier.pips()
    }
}

/// Singleton pool identity. `currency0 < currency1` always holds; tick
/// spacing is the tier's default.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct PoolKey {
    pub currency0: Address,
    pub currency1: Address,
    pub fee: FeeTier,
    pub hooks: Address,
}

impl PoolKey {
    /// Orders the pair so the numerically lower address is `currency0`.
    pub fn canonical(token_a: Address, token_b: Address, fee: FeeTier, hooks: Address) -> Self {
        let (currency0, currency1) = if token_a < token_b {
            (token_a, token_b)
        } else {
            (token_b, token_a)
        };
        Self {
            currency0,
            currency1,
            fee,
            hooks,
        }
    }

    pub fn to_sol(&self) -> V4Quoter::PoolKey {
        V4Quoter::PoolKey {
            currency0: self.currency0,
            currency1: self.currency1,
            fee: self.fee.fee_u24(),
            tickSpacing: self.fee.tick_spacing_i24(),
            hooks: self.hooks,
        }
    }

    /// `keccak256(abi.encode(key))`, matching `PoolIdLibrary.toId`.
    pub fn pool_id(&self) -> B256 {
        keccak256(self.to_sol().abi_encode())
    }
}

/// One hop of a stable/volatile router path.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct StableRoute {
    pub from: Address,
    pub to: Address,
    pub stable: bool,
    pub factory: Address,
}

/// Protocol-specific data a transaction builder needs to replay the route.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum RouteArtifacts {
    #[default]
    None,
    ConstantProduct,
    ConcentratedLiquidity {
        /// `token | fee(3 bytes) | token ...` as consumed by the V3 router.
        encoded_path: Bytes,
    },
    SingletonHookPool {
        pool_keys: Vec<PoolKey>,
        pool_ids: Vec<B256>,
    },
    StableVolatileFork {
        routes: Vec<StableRoute>,
    },
}

/// Best quote found for a `(token_in, amount_in, token_out)` request.
///
/// `Route::default()` (zero output, empty path) means no viable route.
/// Per protocol, only the matching fields are populated:
/// - `fees`: concentrated liquidity and singleton pools, one per hop.
/// - `stable`: stable/volatile fork, one per hop.
/// - `hop_amounts`: protocols whose quoter reports every intermediate amount.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
pub struct Route {
    pub protocol: Option<Protocol>,
    pub amount_in: U256,
    pub amount_out: U256,
    pub path: Vec<Address>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub fees: Vec<u32>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub stable: Vec<bool>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub hop_amounts: Vec<U256>,
    pub artifacts: RouteArtifacts,
}

impl Route {
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.amount_out.is_zero() || self.path.is_empty()
    }

    pub fn hops(&self) -> usize {
        self.path.len().saturating_sub(1)
    }
}
