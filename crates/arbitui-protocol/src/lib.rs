//! # arbitui-protocol
//!
//! The two wire protocols of the gateway:
//!
//! - [`messages`] — tagged envelopes exchanged with terminal UI clients
//!   over the WebSocket connection (`{"type": ..., ...}` records).
//! - [`rpc`] — the JSON-RPC 2.0 envelope spoken to the pricing engine.
//!
//! Both are closed unions: an unknown discriminant is a decode error,
//! never silently ignored.

#![deny(unsafe_code)]

pub mod messages;
pub mod rpc;

pub use messages::{ClientMsg, ServerMsg, Severity};
pub use rpc::{Method, RpcErrorBody, RpcRequest, RpcResponse};
