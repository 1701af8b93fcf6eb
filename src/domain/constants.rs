// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: 2026 ® John Hauger Mitander <john@oxidity.com>

use alloy::primitives::{Address, address};
use lazy_static::lazy_static;
use std::collections::HashMap;
use std::time::Duration;

// Common assets
pub const WETH_MAINNET: Address = address!("C02aaA39b223FE8D0A0e5C4F27eAD9083C756Cc2");
pub const WETH_OPTIMISM: Address = address!("4200000000000000000000000000000000000006");
pub const WETH_BASE: Address = address!("4200000000000000000000000000000000000006");
pub const WETH_ARBITRUM: Address = address!("82aF49447D8a07e3bd95BD0d56f35241523fBab1");

/// Placeholder used by wallets and aggregators for the chain's native asset.
pub const NATIVE_SENTINEL: Address = address!("EeeeeEeeeEeEeeEeEeEeeEEEeeeeEeeeeeeeEEeE");

/// Multicall3 is deployed at the same address on every supported chain.
pub const MULTICALL3: Address = address!("cA11bde05977b3631167028862bE2a173976CA11");

// =============================================================================
// NETWORK CONSTANTS
// =============================================================================

pub const CHAIN_ETHEREUM: u64 = 1;
pub const CHAIN_OPTIMISM: u64 = 10;
pub const CHAIN_BASE: u64 = 8453;
pub const CHAIN_ARBITRUM: u64 = 42161;

pub const SUPPORTED_CHAINS: [u64; 4] = [CHAIN_ETHEREUM, CHAIN_OPTIMISM, CHAIN_BASE, CHAIN_ARBITRUM];

// =============================================================================
// ROUTING DEFAULTS
// =============================================================================

/// Quote requests packed into a single `aggregate3` round trip.
pub const DEFAULT_MULTICALL_BATCH_SIZE: usize = 15;
pub const DEFAULT_ROUTE_CACHE_TTL: Duration = Duration::from_secs(600);
pub const DEFAULT_BATCH_TIMEOUT: Duration = Duration::from_secs(10);

// =============================================================================
// PROTOCOL CONTRACTS
// =============================================================================

lazy_static! {
    // -------------------------
    // Uniswap V2 style routers
    // -------------------------
    pub static ref CONSTANT_PRODUCT_ROUTERS: HashMap<u64, Address> = {
        let mut m = HashMap::new();
        m.insert(CHAIN_ETHEREUM, address!("7a250d5630B4cF539739dF2C5dAcb4c659F2488D"));
        m.insert(CHAIN_OPTIMISM, address!("4A7b5Da61326A6379179b40d00F57E5bbDC962c2"));
        m.insert(CHAIN_BASE, address!("4752ba5DBc23f44D87826276BF6Fd6b1C372aD24"));
        m.insert(CHAIN_ARBITRUM, address!("4752ba5DBc23f44D87826276BF6Fd6b1C372aD24"));
        m
    };

    // -------------------------
    // Uniswap V3 QuoterV2
    // -------------------------
    pub static ref CONCENTRATED_QUOTERS: HashMap<u64, Address> = {
        let mut m = HashMap::new();
        m.insert(CHAIN_ETHEREUM, address!("61fFE014bA17989E743c5F6cB21bF9697530B21e"));
        m.insert(CHAIN_OPTIMISM, address!("61fFE014bA17989E743c5F6cB21bF9697530B21e"));
        m.insert(CHAIN_BASE, address!("3d4e44Eb1374240CE5F1B871ab261CD16335B76a"));
        m.insert(CHAIN_ARBITRUM, address!("61fFE014bA17989E743c5F6cB21bF9697530B21e"));
        m
    };

    // -------------------------
    // Uniswap V4 Quoter
    // -------------------------
    pub static ref SINGLETON_QUOTERS: HashMap<u64, Address> = {
        let mut m = HashMap::new();
        m.insert(CHAIN_ETHEREUM, address!("52F0E24D1c21C8A0cB1e5a5dD6198556BD9E1203"));
        m.insert(CHAIN_OPTIMISM, address!("1f3131A13296FB91C90870043742C3CDBFF1A8d7"));
        m.insert(CHAIN_BASE, address!("0d5e0F971ED27FBfF6c2837bf31316121532048D"));
        m.insert(CHAIN_ARBITRUM, address!("3972c00f7ed4885e145823eb7c655375d275a1c5"));
        m
    };

    // -------------------------
    // Velodrome / Aerodrome v2 (router, pool factory)
    // -------------------------
    pub static ref STABLE_VOLATILE_ROUTERS: HashMap<u64, (Address, Address)> = {
        let mut m = HashMap::new();
        m.insert(
            CHAIN_OPTIMISM,
            (
                address!("a062aE8A9c5e11aaA026fc2670B0D65cCc8B2858"),
                address!("F1046053aa5682b4F9a81b5481394DA16BE5FF5a"),
            ),
        );
        m.insert(
            CHAIN_BASE,
            (
                address!("cF77a3Ba9A5CA399B7c97c74d54e5b1Beb874E43"),
                address!("420DD381b31aEf6683db6B902084cB0FFECe40Da"),
            ),
        );
        m
    };

    // -------------------------
    // Well-known tokens (symbol -> address)
    // -------------------------
    pub static ref TOKENS_MAINNET: HashMap<&'static str, Address> = {
        let mut m = HashMap::new();
        m.insert("WETH", WETH_MAINNET);
        m.insert("USDC", address!("A0b86991c6218b36c1d19D4a2e9Eb0cE3606eB48"));
        m.insert("USDT", address!("dAC17F958D2ee523a2206206994597C13D831ec7"));
        m.insert("DAI", address!("6B175474E89094C44Da98b954EedeAC495271d0F"));
        m.insert("WBTC", address!("2260FAC5E5542a773Aa44fBCfeDf7C193bc2C599"));
        m
    };

    pub static ref TOKENS_OPTIMISM: HashMap<&'static str, Address> = {
        let mut m = HashMap::new();
        m.insert("WETH", WETH_OPTIMISM);
        m.insert("USDC", address!("0b2C639c533813f4Aa9D7837CAf62653d097Ff85"));
        m.insert("USDT", address!("94b008aA00579c1307B0EF2c499aD98a8ce58e58"));
        m.insert("DAI", address!("DA10009cBd5D07dd0CeCc66161FC93D7c9000da1"));
        m.insert("WBTC", address!("68f180fcCe6836688e9084f035309E29Bf0A2095"));
        m
    };

    pub static ref TOKENS_BASE: HashMap<&'static str, Address> = {
        let mut m = HashMap::new();
        m.insert("WETH", WETH_BASE);
        m.insert("USDC", address!("833589fCD6eDb6E08f4c7C32D4f71b54bdA02913"));
        m.insert("USDBC", address!("d9aAEc86B65D86f6A7B5B1b0c42FFA531710b6CA"));
        m.insert("DAI", address!("50c5725949A6F0c72E6C4a641F24049A917DB0Cb"));
        m.insert("CBBTC", address!("cbB7C0000aB88B473b1f5aFd9ef808440eed33Bf"));
        m
    };

    pub static ref TOKENS_ARBITRUM: HashMap<&'static str, Address> = {
        let mut m = HashMap::new();
        m.insert("WETH", WETH_ARBITRUM);
        m.insert("USDC", address!("af88d065e77c8cC2239327C5EDb3A432268e5831"));
        m.insert("USDT", address!("Fd086bC7CD5C481DCC9C85ebE478A1C0b69FCbb9"));
        m.insert("DAI", address!("DA10009cBd5D07dd0CeCc66161FC93D7c9000da1"));
        m.insert("WBTC", address!("2f2a2543B76A4166549F7aaB2e75Bef0aefC5B0f"));
        m
    };

    pub static ref TOKENS_BY_CHAIN: HashMap<u64, &'static HashMap<&'static str, Address>> = {
        let mut m = HashMap::new();
        m.insert(CHAIN_ETHEREUM, &*TOKENS_MAINNET);
        m.insert(CHAIN_OPTIMISM, &*TOKENS_OPTIMISM);
        m.insert(CHAIN_BASE, &*TOKENS_BASE);
        m.insert(CHAIN_ARBITRUM, &*TOKENS_ARBITRUM);
        m
    };

    pub static ref WRAPPED_NATIVE_BY_CHAIN: HashMap<u64, Address> = {
        let mut m = HashMap::new();
        m.insert(CHAIN_ETHEREUM, WETH_MAINNET);
        m.insert(CHAIN_OPTIMISM, WETH_OPTIMISM);
        m.insert(CHAIN_BASE, WETH_BASE);
        m.insert(CHAIN_ARBITRUM, WETH_ARBITRUM);
        m
    };
}

// =============================================================================
// INTERMEDIARY ROUTING TOKENS
// =============================================================================

/// Symbols tried as the single hop between input and output, in order.
pub fn default_intermediary_symbols(chain_id: u64) -> &'static [&'static str] {
    match chain_id {
        CHAIN_BASE => &["WETH", "USDC", "USDBC", "DAI", "CBBTC"],
        _ => &["WETH", "USDC", "USDT", "DAI", "WBTC"],
    }
}

/// Ordered symbol pairs tried as the two middle hops.
pub fn default_intermediary_pair_symbols(chain_id: u64) -> &'static [(&'static str, &'static str)] {
    match chain_id {
        CHAIN_BASE => &[
            ("WETH", "USDC"),
            ("USDC", "WETH"),
            ("WETH", "CBBTC"),
            ("CBBTC", "WETH"),
            ("USDC", "USDBC"),
            ("USDBC", "USDC"),
            ("USDC", "DAI"),
            ("DAI", "USDC"),
        ],
        _ => &[
            ("WETH", "USDC"),
            ("USDC", "WETH"),
            ("WETH", "USDT"),
            ("USDT", "WETH"),
            ("WETH", "WBTC"),
            ("WBTC", "WETH"),
            ("USDC", "USDT"),
            ("USDT", "USDC"),
            ("USDC", "DAI"),
            ("DAI", "USDC"),
        ],
    }
}

pub fn wrapped_native_for_chain(chain_id: u64) -> Option<Address> {
    WRAPPED_NATIVE_BY_CHAIN.get(&chain_id).copied()
}

pub fn default_tokens_for_chain(chain_id: u64) -> HashMap<String, Address> {
    TOKENS_BY_CHAIN
        .get(&chain_id)
        .map(|m| {
            m.iter()
                .map(|(k, v)| (k.to_string(), *v))
                .collect::<HashMap<String, Address>>()
        })
        .unwrap_or_default()
}

/// True for either the `0xEeee…` placeholder or the zero address.
pub fn is_native_sentinel(token: Address) -> bool {
    token == NATIVE_SENTINEL || token == Address::ZERO
}

// =============================================================================
// LOGGING DEFAULTS
// =============================================================================

pub const DEFAULT_LOG_LEVEL: &str = "info";
