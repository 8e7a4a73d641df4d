//! The `EngineClient` seam and typed call wrappers.

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde_json::Value;

use arbitui_core::{
    ArbitrageCheck, ArbitrageMatrix, ArbitrageMatrixParams, ArbitrageParams, VolSampling,
    VolSamplingParams,
};
use arbitui_protocol::Method;

use crate::errors::RpcError;

/// A client capable of one logical engine call.
///
/// Implemented by both transports; the dispatcher only ever sees
/// `Arc<dyn EngineClient>`.
#[async_trait]
pub trait EngineClient: Send + Sync {
    /// Issue one call and await its correlated result.
    async fn call(&self, method: Method, params: Value) -> Result<Value, RpcError>;
}

fn decode<T: DeserializeOwned>(value: Value) -> Result<T, RpcError> {
    serde_json::from_value(value).map_err(RpcError::decode)
}

fn encode<T: serde::Serialize>(params: &T) -> Result<Value, RpcError> {
    serde_json::to_value(params).map_err(RpcError::decode)
}

/// Typed wrappers over [`EngineClient::call`].
#[async_trait]
pub trait EngineClientExt: EngineClient {
    /// Check one (tenor, expiry) cell for arbitrage.
    async fn arbitrage_check(&self, params: &ArbitrageParams) -> Result<ArbitrageCheck, RpcError> {
        decode(self.call(Method::Arbitrage, encode(params)?).await?)
    }

    /// Check every cell of the cube in one bulk call.
    async fn arbitrage_matrix(
        &self,
        params: &ArbitrageMatrixParams,
    ) -> Result<ArbitrageMatrix, RpcError> {
        decode(self.call(Method::ArbitrageMatrix, encode(params)?).await?)
    }

    /// Sample implied vol and density for one cell.
    async fn vol_sampling(&self, params: &VolSamplingParams) -> Result<VolSampling, RpcError> {
        decode(self.call(Method::VolSampling, encode(params)?).await?)
    }
}

impl<T: EngineClient + ?Sized> EngineClientExt for T {}
