// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: 2026 ® John Hauger Mitander <john@oxidity.com>

use crate::common::constants::{DEFAULT_BATCH_TIMEOUT, DEFAULT_MULTICALL_BATCH_SIZE};
use crate::network::provider::StaticCaller;
use alloy::primitives::{Address, Bytes};
use alloy::sol;
use alloy::sol_types::SolCall;
use std::sync::Arc;
use std::time::Duration;

sol! {
    #[derive(Debug, PartialEq, Eq)]
    contract Multicall3 {
        struct Call3 {
            address target;
            bool allowFailure;
            bytes callData;
        }

        struct Result {
            bool success;
            bytes returnData;
        }

        function aggregate3(Call3[] calldata calls) external payable returns (Result[] memory returnData);
    }
}

/// One read call bundled into an `aggregate3` round trip.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AggregatedCall {
    pub target: Address,
    pub allow_failure: bool,
    pub call_data: Bytes,
}

impl AggregatedCall {
    /// Quote calls always tolerate failure so one dead pool cannot sink a batch.
    pub fn tolerant(target: Address, call_data: impl Into<Bytes>) -> Self {
        Self {
            target,
            allow_failure: true,
            call_data: call_data.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CallOutcome {
    pub success: bool,
    pub return_data: Bytes,
}

impl CallOutcome {
    pub fn failed() -> Self {
        Self {
            success: false,
            return_data: Bytes::new(),
        }
    }
}

pub fn encode_aggregate3(calls: &[AggregatedCall]) -> Bytes {
    let calls = calls
        .iter()
        .map(|c| Multicall3::Call3 {
            target: c.target,
            allowFailure: c.allow_failure,
            callData: c.call_data.clone(),
        })
        .collect();
    Multicall3::aggregate3Call { calls }.abi_encode().into()
}

pub fn decode_aggregate3(raw: &[u8]) -> Result<Vec<CallOutcome>, alloy::sol_types::Error> {
    let results = Multicall3::aggregate3Call::abi_decode_returns(raw)?;
    Ok(results
        .into_iter()
        .map(|r| CallOutcome {
            success: r.success,
            return_data: r.returnData,
        })
        .collect())
}

/// Executes many read calls through Multicall3 in bounded batches.
///
/// Output is always the same length and order as the input. A batch whose
/// round trip fails, times out, or returns a malformed payload degrades to
/// `CallOutcome::failed()` for each of its calls; nothing is propagated.
#[derive(Clone)]
pub struct MulticallClient {
    caller: Arc<dyn StaticCaller>,
    multicall: Address,
    batch_size: usize,
    batch_timeout: Option<Duration>,
}

impl MulticallClient {
    pub fn new(caller: Arc<dyn StaticCaller>, multicall: Address) -> Self {
        Self {
            caller,
            multicall,
            batch_size: DEFAULT_MULTICALL_BATCH_SIZE,
            batch_timeout: Some(DEFAULT_BATCH_TIMEOUT),
        }
    }

    pub fn with_batch_size(mut self, batch_size: usize) -> Self {
        self.batch_size = batch_size.max(1);
        self
    }

    /// `None` waits on the remote indefinitely.
    pub fn with_batch_timeout(mut self, batch_timeout: Option<Duration>) -> Self {
        self.batch_timeout = batch_timeout;
        self
    }

    pub async fn aggregate_calls(&self, calls: &[AggregatedCall]) -> Vec<CallOutcome> {
        let mut out = Vec::with_capacity(calls.len());
        let batches = calls.len().div_ceil(self.batch_size);
        for (index, batch) in calls.chunks(self.batch_size).enumerate() {
            let outcomes = match self.run_batch(batch).await {
                Ok(outcomes) => outcomes,
                Err(reason) => {
                    tracing::warn!(
                        target: "multicall",
                        batch = index,
                        batches,
                        calls = batch.len(),
                        reason = %reason,
                        "Batch failed; marking all calls as failed"
                    );
                    vec![CallOutcome::failed(); batch.len()]
                }
            };
            out.extend(outcomes);
        }
        out
    }

    async fn run_batch(&self, batch: &[AggregatedCall]) -> Result<Vec<CallOutcome>, String> {
        let calldata = encode_aggregate3(batch);
        let call = self.caller.static_call(self.multicall, calldata);
        let raw = match self.batch_timeout {
            Some(limit) => tokio::time::timeout(limit, call)
                .await
                .map_err(|_| format!("timed out after {}ms", limit.as_millis()))?,
            None => call.await,
        }
        .map_err(|e| e.to_string())?;

        let outcomes = decode_aggregate3(&raw).map_err(|e| format!("undecodable response: {e}"))?;
        if outcomes.len() != batch.len() {
            return Err(format!(
                "response has {} results for {} calls",
                outcomes.len(),
                batch.len()
            ));
        }
        Ok(outcomes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::common::error::AppError;
    use crate::network::provider::MockStaticCaller;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn encode_results(outcomes: &[CallOutcome]) -> Bytes {
        let results: Vec<Multicall3::Result> = outcomes
            .iter()
            .map(|o| Multicall3::Result {
                success: o.success,
                returnData: o.return_data.clone(),
            })
            .collect();
        Multicall3::aggregate3Call::abi_encode_returns(&results).into()
    }

    fn echo_response(data: &Bytes) -> Bytes {
        let decoded = Multicall3::aggregate3Call::abi_decode(data).expect("aggregate3 input");
        let outcomes: Vec<CallOutcome> = decoded
            .calls
            .iter()
            .map(|c| CallOutcome {
                success: !c.callData.is_empty(),
                return_data: c.callData.clone(),
            })
            .collect();
        encode_results(&outcomes)
    }

    fn numbered_calls(n: usize) -> Vec<AggregatedCall> {
        (0..n)
            .map(|i| AggregatedCall::tolerant(Address::from([0x10; 20]), vec![i as u8 + 1]))
            .collect()
    }

    #[tokio::test]
    async fn splits_into_ceil_batches_and_preserves_order() {
        let rounds = Arc::new(AtomicUsize::new(0));
        let counter = rounds.clone();
        let mut caller = MockStaticCaller::new();
        caller.expect_static_call().returning(move |to, data| {
            assert_eq!(to, Address::from([0xca; 20]));
            counter.fetch_add(1, Ordering::Relaxed);
            Ok(echo_response(&data))
        });

        let client = MulticallClient::new(Arc::new(caller), Address::from([0xca; 20]))
            .with_batch_size(15);
        let calls = numbered_calls(31);
        let outcomes = client.aggregate_calls(&calls).await;

        assert_eq!(rounds.load(Ordering::Relaxed), 3);
        assert_eq!(outcomes.len(), 31);
        for (i, outcome) in outcomes.iter().enumerate() {
            assert!(outcome.success);
            assert_eq!(outcome.return_data.as_ref(), &[i as u8 + 1]);
        }
    }

    #[tokio::test]
    async fn failed_round_trip_degrades_only_its_batch() {
        let rounds = Arc::new(AtomicUsize::new(0));
        let counter = rounds.clone();
        let mut caller = MockStaticCaller::new();
        caller.expect_static_call().returning(move |_, data| {
            if counter.fetch_add(1, Ordering::Relaxed) == 1 {
                Err(AppError::Connection("boom".into()))
            } else {
                Ok(echo_response(&data))
            }
        });

        let client =
            MulticallClient::new(Arc::new(caller), Address::ZERO).with_batch_size(4);
        let outcomes = client.aggregate_calls(&numbered_calls(10)).await;

        assert_eq!(rounds.load(Ordering::Relaxed), 3);
        assert_eq!(outcomes.len(), 10);
        assert!(outcomes[..4].iter().all(|o| o.success));
        assert!(
            outcomes[4..8]
                .iter()
                .all(|o| !o.success && o.return_data.is_empty())
        );
        assert!(outcomes[8..].iter().all(|o| o.success));
        assert_eq!(outcomes[9].return_data.as_ref(), &[10u8]);
    }

    #[tokio::test]
    async fn per_call_failure_flag_is_preserved() {
        let mut caller = MockStaticCaller::new();
        caller.expect_static_call().returning(|_, _| {
            Ok(encode_results(&[
                CallOutcome {
                    success: false,
                    return_data: Bytes::from(vec![0x08, 0xc3, 0x79, 0xa0]),
                },
                CallOutcome {
                    success: true,
                    return_data: Bytes::from(vec![1]),
                },
            ]))
        });
        let client = MulticallClient::new(Arc::new(caller), Address::ZERO);
        let outcomes = client.aggregate_calls(&numbered_calls(2)).await;
        assert!(!outcomes[0].success);
        assert_eq!(outcomes[0].return_data.len(), 4);
        assert!(outcomes[1].success);
    }

    #[tokio::test]
    async fn short_or_garbage_response_marks_batch_failed() {
        let mut caller = MockStaticCaller::new();
        caller
            .expect_static_call()
            .times(2)
            .returning(|_, data| {
                let decoded = Multicall3::aggregate3Call::abi_decode(&data).expect("input");
                if decoded.calls.len() == 3 {
                    Ok(encode_results(&[CallOutcome::failed()]))
                } else {
                    Ok(Bytes::from(vec![0xde, 0xad]))
                }
            });
        let client = MulticallClient::new(Arc::new(caller), Address::ZERO).with_batch_size(3);
        let outcomes = client.aggregate_calls(&numbered_calls(5)).await;
        assert_eq!(outcomes.len(), 5);
        assert!(outcomes.iter().all(|o| !o.success));
    }

    #[tokio::test]
    async fn empty_input_makes_no_round_trips() {
        let mut caller = MockStaticCaller::new();
        caller.expect_static_call().never();
        let client = MulticallClient::new(Arc::new(caller), Address::ZERO);
        assert!(client.aggregate_calls(&[]).await.is_empty());
    }

    struct HangingCaller;

    #[async_trait::async_trait]
    impl StaticCaller for HangingCaller {
        async fn static_call(&self, _to: Address, _data: Bytes) -> Result<Bytes, AppError> {
            std::future::pending::<()>().await;
            unreachable!()
        }
    }

    #[tokio::test(start_paused = true)]
    async fn hung_batch_times_out_into_failures() {
        let client = MulticallClient::new(Arc::new(HangingCaller), Address::ZERO)
            .with_batch_timeout(Some(Duration::from_millis(50)));
        let outcomes = client.aggregate_calls(&numbered_calls(2)).await;
        assert_eq!(outcomes, vec![CallOutcome::failed(); 2]);
    }
}
