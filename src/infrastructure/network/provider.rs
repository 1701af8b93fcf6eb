// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: 2026 ® John Hauger Mitander <john@on1.no>

use crate::common::error::AppError;
use alloy::network::Ethereum;
use alloy::primitives::{Address, Bytes};
use alloy::providers::{Provider, RootProvider};
use alloy::rpc::types::eth::TransactionRequest;
use async_trait::async_trait;
use url::Url;

pub type HttpProvider = RootProvider<Ethereum>;

pub struct ConnectionFactory;

impl ConnectionFactory {
    pub fn http(rpc_url: &str) -> Result<HttpProvider, AppError> {
        let url =
            Url::parse(rpc_url).map_err(|e| AppError::Config(format!("Invalid RPC URL: {}", e)))?;

        let provider = RootProvider::new_http(url);
        Ok(provider)
    }
}

/// Read-only `eth_call` capability. The only network primitive the router needs.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait StaticCaller: Send + Sync {
    async fn static_call(&self, to: Address, data: Bytes) -> Result<Bytes, AppError>;
}

#[async_trait]
impl StaticCaller for HttpProvider {
    async fn static_call(&self, to: Address, data: Bytes) -> Result<Bytes, AppError> {
        let tx = TransactionRequest::default().to(to).input(data.into());
        self.call(tx)
            .await
            .map_err(|e| AppError::Connection(format!("eth_call to {to:#x} failed: {e}")))
    }
}
