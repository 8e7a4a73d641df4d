//! WebSocket session management: per-connection state and supervision.

pub mod session;
pub mod supervisor;
