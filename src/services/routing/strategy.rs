// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: 2026 ® John Hauger Mitander <john@oxidity.com>

use crate::common::error::AppError;
use crate::network::multicall::{AggregatedCall, MulticallClient};
use crate::services::routing::paths::{PathGenerator, hop_combinations};
use crate::services::routing::route::{Protocol, Route};
use alloy::primitives::{Address, Bytes, U256};
use async_trait::async_trait;
use std::fmt;

/// Decoded quoter answer for one candidate.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Quote {
    pub amount_out: U256,
    /// Every amount along the path when the quoter reports them.
    pub hop_amounts: Vec<U256>,
}

impl Quote {
    pub fn single(amount_out: U256) -> Self {
        Self {
            amount_out,
            hop_amounts: Vec::new(),
        }
    }

    /// Output is the final entry of an `amounts[]` style response.
    pub fn from_amounts(protocol: Protocol, amounts: Vec<U256>) -> Result<Self, AppError> {
        let amount_out = *amounts
            .last()
            .ok_or_else(|| AppError::decode(protocol, "empty amounts array"))?;
        Ok(Self {
            amount_out,
            hop_amounts: amounts,
        })
    }
}

/// Stateless calldata codec for one protocol's quoter.
///
/// `Hop` is the per-hop parameter the protocol needs to pin down a pool
/// (fee tier, stable flag, or nothing). Every assignment of `hop_choices()`
/// over a path's hops is quoted.
pub trait QuoteCodec: Send + Sync {
    type Hop: Copy + Send + Sync + fmt::Debug;

    fn protocol(&self) -> Protocol;

    /// Contract every quote call is sent to.
    fn target(&self) -> Address;

    fn hop_choices(&self) -> &[Self::Hop];

    /// Rejects amounts the quoter cannot represent.
    fn validate_amount(&self, _amount_in: U256) -> Result<(), AppError> {
        Ok(())
    }

    fn encode_direct_quote(
        &self,
        token_in: Address,
        amount_in: U256,
        token_out: Address,
        hop: Self::Hop,
    ) -> Result<Bytes, AppError>;

    fn encode_multi_hop_quote(
        &self,
        path: &[Address],
        amount_in: U256,
        hops: &[Self::Hop],
    ) -> Result<Bytes, AppError>;

    fn decode_direct_quote(&self, raw: &[u8]) -> Result<Quote, AppError>;

    fn decode_multi_hop_quote(&self, raw: &[u8]) -> Result<Quote, AppError>;

    /// Builds the normalized route, including protocol artifacts, for a winner.
    fn assemble_route(
        &self,
        path: Vec<Address>,
        hops: &[Self::Hop],
        amount_in: U256,
        quote: Quote,
    ) -> Result<Route, AppError>;
}

/// The `get_best_route` capability the optimizer dispatches to.
#[async_trait]
pub trait RouteStrategy: Send + Sync {
    fn protocol(&self) -> Protocol;

    async fn get_best_route(
        &self,
        token_in: Address,
        amount_in: U256,
        token_out: Address,
    ) -> Result<Route, AppError>;
}

/// One quote request plus the metadata needed to rebuild a route from its result.
#[derive(Debug, Clone)]
pub struct Candidate<H> {
    pub path: Vec<Address>,
    pub hops: Vec<H>,
    pub description: String,
}

impl<H> Candidate<H> {
    pub fn is_direct(&self) -> bool {
        self.path.len() == 2
    }
}

/// Path enumeration, batched quoting and scoring for any [`QuoteCodec`].
pub struct RoutingStrategy<C: QuoteCodec> {
    codec: C,
    paths: PathGenerator,
    client: MulticallClient,
}

impl<C: QuoteCodec> RoutingStrategy<C> {
    pub fn new(codec: C, paths: PathGenerator, client: MulticallClient) -> Self {
        Self {
            codec,
            paths,
            client,
        }
    }

    pub fn codec(&self) -> &C {
        &self.codec
    }

    /// Direct candidates first, then multi-hop paths, each crossed with every
    /// hop parameter assignment. Inputs are expected already normalized.
    pub fn build_candidates(&self, token_in: Address, token_out: Address) -> Vec<Candidate<C::Hop>> {
        let choices = self.codec.hop_choices();
        let mut out = Vec::new();
        for path in self.paths.candidate_paths(token_in, token_out) {
            let hops = path.len() - 1;
            for assignment in hop_combinations(choices, hops) {
                let description = describe(self.codec.protocol(), &path, &assignment);
                out.push(Candidate {
                    path: path.clone(),
                    hops: assignment,
                    description,
                });
            }
        }
        out
    }

    fn encode(&self, candidate: &Candidate<C::Hop>, amount_in: U256) -> Result<Bytes, AppError> {
        if candidate.is_direct() {
            self.codec.encode_direct_quote(
                candidate.path[0],
                amount_in,
                candidate.path[1],
                candidate.hops[0],
            )
        } else {
            self.codec
                .encode_multi_hop_quote(&candidate.path, amount_in, &candidate.hops)
        }
    }

    fn decode(&self, candidate: &Candidate<C::Hop>, raw: &[u8]) -> Result<Quote, AppError> {
        if candidate.is_direct() {
            self.codec.decode_direct_quote(raw)
        } else {
            self.codec.decode_multi_hop_quote(raw)
        }
    }

    fn check_request(
        &self,
        token_in: Address,
        amount_in: U256,
        token_out: Address,
    ) -> Result<(Address, Address), AppError> {
        if amount_in.is_zero() {
            return Err(AppError::invalid_input("amount_in", "must be greater than zero"));
        }
        self.codec.validate_amount(amount_in)?;
        let token_in = self.paths.normalize(token_in);
        let token_out = self.paths.normalize(token_out);
        if token_in == token_out {
            return Err(AppError::invalid_input(
                "token_out",
                format!("same token as token_in ({token_in:#x})"),
            ));
        }
        Ok((token_in, token_out))
    }

    pub async fn find_best_route(
        &self,
        token_in: Address,
        amount_in: U256,
        token_out: Address,
    ) -> Result<Route, AppError> {
        let protocol = self.codec.protocol();
        let (token_in, token_out) = self.check_request(token_in, amount_in, token_out)?;

        let mut candidates = Vec::new();
        let mut calls = Vec::new();
        for candidate in self.build_candidates(token_in, token_out) {
            match self.encode(&candidate, amount_in) {
                Ok(data) => {
                    calls.push(AggregatedCall::tolerant(self.codec.target(), data));
                    candidates.push(candidate);
                }
                Err(e) => tracing::debug!(
                    target: "routing",
                    %protocol,
                    candidate = %candidate.description,
                    error = %e,
                    "Skipping candidate that failed to encode"
                ),
            }
        }

        let outcomes = self.client.aggregate_calls(&calls).await;

        let mut best: Option<(&Candidate<C::Hop>, Quote)> = None;
        let mut succeeded = 0usize;
        for (candidate, outcome) in candidates.iter().zip(outcomes) {
            if !outcome.success {
                continue;
            }
            let quote = match self.decode(candidate, &outcome.return_data) {
                Ok(quote) => quote,
                Err(e) => {
                    let head = &outcome.return_data[..outcome.return_data.len().min(36)];
                    tracing::debug!(
                        target: "routing",
                        %protocol,
                        candidate = %candidate.description,
                        payload = %format!("0x{}", hex::encode(head)),
                        error = %e,
                        "Skipping undecodable quote"
                    );
                    continue;
                }
            };
            succeeded += 1;
            let replace = match &best {
                None => true,
                Some((current, current_quote)) => {
                    quote.amount_out > current_quote.amount_out
                        || (quote.amount_out == current_quote.amount_out
                            && candidate.path.len() < current.path.len())
                }
            };
            if replace {
                best = Some((candidate, quote));
            }
        }

        match best {
            Some((candidate, quote)) if !quote.amount_out.is_zero() => {
                tracing::debug!(
                    target: "routing",
                    %protocol,
                    winner = %candidate.description,
                    amount_out = %quote.amount_out,
                    candidates = candidates.len(),
                    succeeded,
                    "Best route selected"
                );
                self.codec.assemble_route(
                    candidate.path.clone(),
                    &candidate.hops,
                    amount_in,
                    quote,
                )
            }
            _ => {
                tracing::info!(
                    target: "routing",
                    %protocol,
                    %token_in,
                    %token_out,
                    %amount_in,
                    candidates = candidates.len(),
                    succeeded,
                    "No viable route found"
                );
                Ok(Route::empty())
            }
        }
    }
}

#[async_trait]
impl<C: QuoteCodec + 'static> RouteStrategy for RoutingStrategy<C> {
    fn protocol(&self) -> Protocol {
        self.codec.protocol()
    }

    async fn get_best_route(
        &self,
        token_in: Address,
        amount_in: U256,
        token_out: Address,
    ) -> Result<Route, AppError> {
        self.find_best_route(token_in, amount_in, token_out).await
    }
}

fn describe<H: fmt::Debug>(protocol: Protocol, path: &[Address], hops: &[H]) -> String {
    let tokens: Vec<String> = path.iter().map(|a| format!("{a:#x}")).collect();
    format!("{protocol} {} {hops:?}", tokens.join(" -> "))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::network::multicall::Multicall3;
    use crate::network::provider::MockStaticCaller;
    use crate::services::routing::route::RouteArtifacts;
    use alloy::sol_types::SolCall;
    use std::sync::Arc;

    /// Test codec: calldata is `[path_len, hop flags...]`, return data is a
    /// 32-byte big-endian amount.
    struct ByteCodec;

    const BYTE_HOPS: [u8; 2] = [1, 2];

    impl QuoteCodec for ByteCodec {
        type Hop = u8;

        fn protocol(&self) -> Protocol {
            Protocol::ConstantProduct
        }

        fn target(&self) -> Address {
            Address::from([0x77; 20])
        }

        fn hop_choices(&self) -> &[u8] {
            &BYTE_HOPS
        }

        fn encode_direct_quote(
            &self,
            _token_in: Address,
            _amount_in: U256,
            _token_out: Address,
            hop: u8,
        ) -> Result<Bytes, AppError> {
            Ok(Bytes::from(vec![2, hop]))
        }

        fn encode_multi_hop_quote(
            &self,
            path: &[Address],
            _amount_in: U256,
            hops: &[u8],
        ) -> Result<Bytes, AppError> {
            let mut data = vec![path.len() as u8];
            data.extend_from_slice(hops);
            Ok(Bytes::from(data))
        }

        fn decode_direct_quote(&self, raw: &[u8]) -> Result<Quote, AppError> {
            decode_word(raw)
        }

        fn decode_multi_hop_quote(&self, raw: &[u8]) -> Result<Quote, AppError> {
            decode_word(raw)
        }

        fn assemble_route(
            &self,
            path: Vec<Address>,
            _hops: &[u8],
            amount_in: U256,
            quote: Quote,
        ) -> Result<Route, AppError> {
            Ok(Route {
                protocol: Some(self.protocol()),
                amount_in,
                amount_out: quote.amount_out,
                path,
                artifacts: RouteArtifacts::ConstantProduct,
                ..Route::default()
            })
        }
    }

    fn decode_word(raw: &[u8]) -> Result<Quote, AppError> {
        if raw.len() != 32 {
            return Err(AppError::decode("test", "expected one word"));
        }
        Ok(Quote::single(U256::from_be_slice(raw)))
    }

    fn addr(byte: u8) -> Address {
        Address::from([byte; 20])
    }

    fn strategy(caller: MockStaticCaller, batch_size: usize) -> RoutingStrategy<ByteCodec> {
        let paths = PathGenerator::new(addr(0x01), vec![addr(0x02), addr(0x03)], vec![(
            addr(0x02),
            addr(0x03),
        )]);
        let client =
            MulticallClient::new(Arc::new(caller), addr(0xca)).with_batch_size(batch_size);
        RoutingStrategy::new(ByteCodec, paths, client)
    }

    /// Answers each call through `quote(call_data)`; `None` marks the call failed.
    fn respond(data: &Bytes, quote: impl Fn(&[u8]) -> Option<Vec<u8>>) -> Bytes {
        let request = Multicall3::aggregate3Call::abi_decode(data).expect("aggregate3 input");
        let results: Vec<Multicall3::Result> = request
            .calls
            .iter()
            .map(|c| match quote(&c.callData) {
                Some(ret) => Multicall3::Result {
                    success: true,
                    returnData: ret.into(),
                },
                None => Multicall3::Result {
                    success: false,
                    returnData: Bytes::new(),
                },
            })
            .collect();
        Multicall3::aggregate3Call::abi_encode_returns(&results).into()
    }

    fn word(value: u64) -> Vec<u8> {
        U256::from(value).to_be_bytes::<32>().to_vec()
    }

    #[test]
    fn candidate_count_is_direct_plus_multi_hop_combinations() {
        let s = strategy(MockStaticCaller::new(), 15);
        let candidates = s.build_candidates(addr(0xaa), addr(0xbb));
        // direct: 2, two single-intermediary paths: 2 * 4, one pair: 8
        assert_eq!(candidates.len(), 2 + 2 * 4 + 8);
        assert!(candidates[..2].iter().all(Candidate::is_direct));
        assert_eq!(candidates[2].path, vec![addr(0xaa), addr(0x02), addr(0xbb)]);
        assert_eq!(candidates[2].hops, vec![1, 1]);
        assert_eq!(candidates.last().map(|c| c.hops.clone()), Some(vec![2, 2, 2]));
    }

    #[tokio::test]
    async fn single_successful_candidate_wins() {
        let mut caller = MockStaticCaller::new();
        caller.expect_static_call().returning(|_, data| {
            Ok(respond(&data, |call| (call == [3, 2, 1]).then(|| word(4_242))))
        });
        let s = strategy(caller, 4);

        let route = s
            .find_best_route(addr(0xaa), U256::from(10u64), addr(0xbb))
            .await
            .expect("route");
        assert_eq!(route.amount_out, U256::from(4_242u64));
        assert_eq!(route.amount_in, U256::from(10u64));
        assert_eq!(route.path.len(), 3);
        assert_eq!(route.path[0], addr(0xaa));
        assert_eq!(route.path[2], addr(0xbb));
    }

    #[tokio::test]
    async fn higher_output_beats_fewer_hops_and_ties_prefer_fewer_hops() {
        let mut caller = MockStaticCaller::new();
        caller.expect_static_call().returning(|_, data| {
            Ok(respond(&data, |call| match call {
                [2, 1] => Some(word(100)),
                [3, ..] => Some(word(100)),
                [4, 2, 2, 2] => Some(word(101)),
                _ => None,
            }))
        });
        let s = strategy(caller, 15);
        let route = s
            .find_best_route(addr(0xaa), U256::from(1u64), addr(0xbb))
            .await
            .expect("route");
        assert_eq!(route.amount_out, U256::from(101u64));
        assert_eq!(route.hops(), 3);

        let mut caller = MockStaticCaller::new();
        caller.expect_static_call().returning(|_, data| {
            Ok(respond(&data, |call| match call {
                [3, 2, 2] | [4, ..] | [2, 2] => Some(word(100)),
                _ => None,
            }))
        });
        let s = strategy(caller, 15);
        let route = s
            .find_best_route(addr(0xaa), U256::from(1u64), addr(0xbb))
            .await
            .expect("route");
        assert_eq!(route.path, vec![addr(0xaa), addr(0xbb)]);
    }

    #[tokio::test]
    async fn undecodable_results_are_skipped() {
        let mut caller = MockStaticCaller::new();
        caller.expect_static_call().returning(|_, data| {
            Ok(respond(&data, |call| match call {
                [2, 1] => Some(vec![0xde, 0xad]),
                [2, 2] => Some(word(7)),
                _ => None,
            }))
        });
        let s = strategy(caller, 15);
        let route = s
            .find_best_route(addr(0xaa), U256::from(1u64), addr(0xbb))
            .await
            .expect("route");
        assert_eq!(route.amount_out, U256::from(7u64));
    }

    #[tokio::test]
    async fn all_failures_yield_empty_route() {
        let mut caller = MockStaticCaller::new();
        caller
            .expect_static_call()
            .returning(|_, _| Err(AppError::Connection("rpc down".into())));
        let s = strategy(caller, 5);
        let route = s
            .find_best_route(addr(0xaa), U256::from(1u64), addr(0xbb))
            .await
            .expect("empty route is not an error");
        assert_eq!(route, Route::empty());
    }

    #[tokio::test]
    async fn invalid_requests_fail_before_any_network_call() {
        let mut caller = MockStaticCaller::new();
        caller.expect_static_call().never();
        let s = strategy(caller, 15);

        let same = s
            .find_best_route(addr(0xaa), U256::from(1u64), addr(0xaa))
            .await;
        assert!(matches!(same, Err(AppError::InvalidInput { .. })));

        // the sentinel normalizes onto the wrapped native token
        let wrapped = s
            .find_best_route(Address::ZERO, U256::from(1u64), addr(0x01))
            .await;
        assert!(matches!(wrapped, Err(AppError::InvalidInput { .. })));

        let zero = s.find_best_route(addr(0xaa), U256::ZERO, addr(0xbb)).await;
        assert!(matches!(zero, Err(AppError::InvalidInput { .. })));
    }
}
