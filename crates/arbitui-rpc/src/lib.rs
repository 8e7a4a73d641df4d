//! # arbitui-rpc
//!
//! The multiplexed RPC client the gateway uses to talk to the pricing
//! engine. One physical connection carries any number of concurrent
//! logical calls, correlated by JSON-RPC `id`:
//!
//! - [`StreamClient`] — newline-delimited records over one persistent
//!   stream (a Unix domain socket in deployment).
//! - [`HttpClient`] — one POST per call against an RPC endpoint.
//!
//! Both sit behind the [`EngineClient`] trait, enforce the same in-flight
//! ceiling and per-call deadline, and fail with the same
//! [`RpcError`] taxonomy.

#![deny(unsafe_code)]

pub mod client;
pub mod errors;
pub mod http;
pub mod stream;

pub use client::{EngineClient, EngineClientExt};
pub use errors::RpcError;
pub use http::HttpClient;
pub use stream::{ClientConfig, StreamClient};
