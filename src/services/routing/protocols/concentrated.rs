// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: 2026 ® John Hauger Mitander <john@oxidity.com>

use crate::common::error::AppError;
use crate::data::address_registry::ChainConfig;
use crate::services::routing::contracts::UniV3QuoterV2;
use crate::services::routing::route::{FeeTier, Protocol, Route, RouteArtifacts};
use crate::services::routing::strategy::{Quote, QuoteCodec};
use alloy::primitives::aliases::U160;
use alloy::primitives::{Address, Bytes, U256};
use alloy::sol_types::SolCall;

/// Packs `token | fee | token | fee | token` with 3-byte big-endian fees.
pub fn encode_path(tokens: &[Address], fees: &[FeeTier]) -> Result<Bytes, AppError> {
    if tokens.len() < 2 || fees.len() + 1 != tokens.len() {
        return Err(AppError::Encode(format!(
            "path of {} tokens needs {} fees, got {}",
            tokens.len(),
            tokens.len().saturating_sub(1),
            fees.len()
        )));
    }
    let mut out: Vec<u8> = Vec::with_capacity(tokens.len() * 20 + fees.len() * 3);
    out.extend_from_slice(tokens[0].as_slice());
    for (i, fee) in fees.iter().enumerate() {
        out.extend_from_slice(&fee.pips().to_be_bytes()[1..]);
        out.extend_from_slice(tokens[i + 1].as_slice());
    }
    Ok(out.into())
}

/// Uniswap V3 QuoterV2: exact-input quotes across the four standard fee tiers.
#[derive(Debug, Clone)]
pub struct ConcentratedCodec {
    quoter: Address,
}

impl ConcentratedCodec {
    pub fn new(quoter: Address) -> Self {
        Self { quoter }
    }

    pub fn from_chain(cfg: &ChainConfig) -> Result<Self, AppError> {
        Ok(Self::new(cfg.concentrated_quoter()?))
    }
}

impl QuoteCodec for ConcentratedCodec {
    type Hop = FeeTier;

    fn protocol(&self) -> Protocol {
        Protocol::ConcentratedLiquidity
    }

    fn target(&self) -> Address {
        self.quoter
    }

    fn hop_choices(&self) -> &[FeeTier] {
        &FeeTier::ALL
    }

    fn encode_direct_quote(
        &self,
        token_in: Address,
        amount_in: U256,
        token_out: Address,
        fee: FeeTier,
    ) -> Result<Bytes, AppError> {
        let params = UniV3QuoterV2::QuoteExactInputSingleParams {
            tokenIn: token_in,
            tokenOut: token_out,
            amountIn: amount_in,
            fee: fee.fee_u24(),
            sqrtPriceLimitX96: U160::ZERO,
        };
        Ok(UniV3QuoterV2::quoteExactInputSingleCall { params }
            .abi_encode()
            .into())
    }

    fn encode_multi_hop_quote(
        &self,
        path: &[Address],
        amount_in: U256,
        fees: &[FeeTier],
    ) -> Result<Bytes, AppError> {
        let path = encode_path(path, fees)?;
        Ok(UniV3QuoterV2::quoteExactInputCall {
            path,
            amountIn: amount_in,
        }
        .abi_encode()
        .into())
    }

    fn decode_direct_quote(&self, raw: &[u8]) -> Result<Quote, AppError> {
        let ret = UniV3QuoterV2::quoteExactInputSingleCall::abi_decode_returns(raw)
            .map_err(|e| AppError::decode(self.protocol(), e))?;
        Ok(Quote::single(ret.amountOut))
    }

    fn decode_multi_hop_quote(&self, raw: &[u8]) -> Result<Quote, AppError> {
        let ret = UniV3QuoterV2::quoteExactInputCall::abi_decode_returns(raw)
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
        let encoded_path = encode_path(&path, fees)?;
        Ok(Route {
            protocol: Some(Protocol::ConcentratedLiquidity),
            amount_in,
            amount_out: quote.amount_out,
            path,
            fees: fees.iter().map(|f| f.pips()).collect(),
            artifacts: RouteArtifacts::ConcentratedLiquidity { encoded_path },
            ..Route::default()
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloy::sol_types::SolValue;

    fn addr(byte: u8) -> Address {
        Address::from([byte; 20])
    }

    #[test]
    fn packed_path_layout() {
        let path = encode_path(
            &[addr(0x11), addr(0x22), addr(0x33)],
            &[FeeTier::Low, FeeTier::High],
        )
        .expect("path");
        assert_eq!(path.len(), 20 * 3 + 3 * 2);
        assert_eq!(&path[..20], addr(0x11).as_slice());
        assert_eq!(hex::encode(&path[20..23]), "0001f4");
        assert_eq!(&path[23..43], addr(0x22).as_slice());
        assert_eq!(hex::encode(&path[43..46]), "002710");
        assert_eq!(&path[46..], addr(0x33).as_slice());

        assert!(encode_path(&[addr(0x11), addr(0x22)], &[]).is_err());
    }

    #[test]
    fn direct_quote_uses_struct_params() {
        let codec = ConcentratedCodec::new(addr(0x50));
        let data = codec
            .encode_direct_quote(addr(0x11), U256::from(7u64), addr(0x22), FeeTier::Medium)
            .expect("encode");
        // quoteExactInputSingle((address,address,uint256,uint24,uint160))
        assert_eq!(hex::encode(&data[..4]), "c6a5026a");
        assert_eq!(data.len(), 4 + 32 * 5);
        assert_eq!(U256::from_be_slice(&data[4 + 64..4 + 96]), U256::from(7u64));
        assert_eq!(U256::from_be_slice(&data[4 + 96..4 + 128]), U256::from(3_000u64));
    }

    #[test]
    fn multi_hop_quote_carries_packed_path() {
        let codec = ConcentratedCodec::new(addr(0x50));
        let tokens = [addr(0x11), addr(0x22), addr(0x33)];
        let fees = [FeeTier::Lowest, FeeTier::Medium];
        let data = codec
            .encode_multi_hop_quote(&tokens, U256::from(9u64), &fees)
            .expect("encode");
        // quoteExactInput(bytes,uint256)
        assert_eq!(hex::encode(&data[..4]), "cdca1753");
        let call = UniV3QuoterV2::quoteExactInputCall::abi_decode(&data).expect("roundtrip");
        assert_eq!(call.path, encode_path(&tokens, &fees).expect("path"));
        assert_eq!(call.amountIn, U256::from(9u64));
    }

    #[test]
    fn decodes_first_return_word() {
        let codec = ConcentratedCodec::new(addr(0x50));
        let single = (U256::from(123u64), U160::from(1u64), 2u32, U256::from(80_000u64)).abi_encode_params();
        assert_eq!(
            codec.decode_direct_quote(&single).expect("single").amount_out,
            U256::from(123u64)
        );

        let multi = (
            U256::from(456u64),
            vec![U160::from(1u64), U160::from(2u64)],
            vec![1u32, 3u32],
            U256::from(150_000u64),
        )
            .abi_encode_params();
        assert_eq!(
            codec.decode_multi_hop_quote(&multi).expect("multi").amount_out,
            U256::from(456u64)
        );
        assert!(codec.decode_multi_hop_quote(&single[..64]).is_err());
    }

    #[test]
    fn winning_route_records_fees_and_path_bytes() {
        let codec = ConcentratedCodec::new(addr(0x50));
        let tokens = vec![addr(0x11), addr(0x22)];
        let route = codec
            .assemble_route(
                tokens.clone(),
                &[FeeTier::Low],
                U256::from(5u64),
                Quote::single(U256::from(4u64)),
            )
            .expect("route");
        assert_eq!(route.fees, vec![500]);
        assert_eq!(
            route.artifacts,
            RouteArtifacts::ConcentratedLiquidity {
                encoded_path: encode_path(&tokens, &[FeeTier::Low]).expect("path"),
            }
        );
    }

    #[test]
    fn route_with_mismatched_fees_is_an_encode_error() {
        let codec = ConcentratedCodec::new(addr(0x50));
        let err = codec
            .assemble_route(
                vec![addr(0x11), addr(0x22), addr(0x33)],
                &[FeeTier::Low],
                U256::from(5u64),
                Quote::single(U256::from(4u64)),
            )
            .unwrap_err();
        assert!(matches!(err, AppError::Encode(_)));
    }
}
