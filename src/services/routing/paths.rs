// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: 2026 ® John Hauger Mitander <john@oxidity.com>

use crate::common::constants::is_native_sentinel;
use crate::data::address_registry::ChainConfig;
use alloy::primitives::Address;
use std::collections::HashSet;

/// Candidate token paths for one `(token_in, token_out)` request.
///
/// Output order is stable: direct first, then one-intermediary paths in
/// registry order, then two-intermediary paths in pair order. Quote results
/// are matched back to candidates by position, so this order is load-bearing.
#[derive(Debug, Clone)]
pub struct PathGenerator {
    wrapped_native: Address,
    intermediaries: Vec<Address>,
    intermediary_pairs: Vec<(Address, Address)>,
}

impl PathGenerator {
    pub fn new(
        wrapped_native: Address,
        intermediaries: Vec<Address>,
        intermediary_pairs: Vec<(Address, Address)>,
    ) -> Self {
        Self {
            wrapped_native,
            intermediaries,
            intermediary_pairs,
        }
    }

    pub fn from_chain(cfg: &ChainConfig) -> Self {
        Self::new(
            cfg.wrapped_native,
            cfg.intermediaries.clone(),
            cfg.intermediary_pairs.clone(),
        )
    }

    pub fn wrapped_native(&self) -> Address {
        self.wrapped_native
    }

    /// Maps the native-asset sentinel to the wrapped token; other tokens pass through.
    pub fn normalize(&self, token: Address) -> Address {
        if is_native_sentinel(token) {
            self.wrapped_native
        } else {
            token
        }
    }

    /// Every path worth quoting: the direct hop followed by all multi-hop paths.
    pub fn candidate_paths(&self, token_in: Address, token_out: Address) -> Vec<Vec<Address>> {
        let token_in = self.normalize(token_in);
        let token_out = self.normalize(token_out);
        let mut paths = vec![vec![token_in, token_out]];
        paths.extend(self.multi_hop_paths(token_in, token_out));
        paths
    }

    /// One- and two-intermediary paths. Empty when both sides are the same token.
    pub fn multi_hop_paths(&self, token_in: Address, token_out: Address) -> Vec<Vec<Address>> {
        let token_in = self.normalize(token_in);
        let token_out = self.normalize(token_out);
        if token_in == token_out {
            return Vec::new();
        }

        let usable = |m: Address| m != token_in && m != token_out && !is_native_sentinel(m);
        let mut seen: HashSet<Vec<Address>> = HashSet::new();
        let mut out = Vec::new();

        for &mid in &self.intermediaries {
            if !usable(mid) {
                continue;
            }
            let path = vec![token_in, mid, token_out];
            if seen.insert(path.clone()) {
                out.push(path);
            }
        }

        for &(first, second) in &self.intermediary_pairs {
            if first == second || !usable(first) || !usable(second) {
                continue;
            }
            let path = vec![token_in, first, second, token_out];
            if seen.insert(path.clone()) {
                out.push(path);
            }
        }

        out
    }
}

/// Cartesian product of `choices` over `hops` positions, first hop slowest.
///
/// `hop_combinations(&[a, b], 2)` yields `[a,a], [a,b], [b,a], [b,b]`.
pub fn hop_combinations<H: Copy>(choices: &[H], hops: usize) -> Vec<Vec<H>> {
    if hops == 0 || choices.is_empty() {
        return Vec::new();
    }
    let mut combos: Vec<Vec<H>> = vec![Vec::with_capacity(hops)];
    for _ in 0..hops {
        let mut next = Vec::with_capacity(combos.len() * choices.len());
        for prefix in &combos {
            for &choice in choices {
                let mut combo = prefix.clone();
                combo.push(choice);
                next.push(combo);
            }
        }
        combos = next;
    }
    combos
}
