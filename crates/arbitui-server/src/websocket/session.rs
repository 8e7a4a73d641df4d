//! Per-connection session handle and state machine.

use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Instant;

use parking_lot::Mutex;
use tokio::sync::mpsc;

use arbitui_protocol::ServerMsg;

/// Lifecycle of a WebSocket session.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SessionState {
    /// Upgrade accepted, child tasks not yet running.
    Connecting,
    /// All child tasks running.
    Active,
    /// A fatal task exit was observed; siblings are being cancelled.
    Closing,
    /// All child tasks have completed.
    Closed,
}

/// Handle to one live session, shared by its child tasks.
///
/// Owns the outbound queue sender. Dispatch results go through [`Session::push`]
/// (backpressure-aware); liveness pushes go through [`Session::try_push`], which
/// drops on a full queue rather than block.
pub struct Session {
    /// Unique session ID.
    pub id: String,
    state: Mutex<SessionState>,
    out_tx: mpsc::Sender<ServerMsg>,
    /// When this session was established.
    pub connected_at: Instant,
    dropped_messages: AtomicU64,
}

impl Session {
    /// Create a session handle in the `Connecting` state.
    pub fn new(id: String, out_tx: mpsc::Sender<ServerMsg>) -> Self {
        Self {
            id,
            state: Mutex::new(SessionState::Connecting),
            out_tx,
            connected_at: Instant::now(),
            dropped_messages: AtomicU64::new(0),
        }
    }

    /// Current lifecycle state.
    pub fn state(&self) -> SessionState {
        *self.state.lock()
    }

    /// Advance the lifecycle state.
    pub fn set_state(&self, state: SessionState) {
        *self.state.lock() = state;
    }

    /// Enqueue an outbound message, waiting for queue capacity.
    ///
    /// Returns `false` if the send task is gone (session tearing down).
    pub async fn push(&self, msg: ServerMsg) -> bool {
        self.out_tx.send(msg).await.is_ok()
    }

    /// Enqueue an outbound message without blocking.
    ///
    /// A full or closed queue drops the message, increments the drop
    /// counter, and returns `false`.
    pub fn try_push(&self, msg: ServerMsg) -> bool {
        if self.out_tx.try_send(msg).is_ok() {
            true
        } else {
            let _ = self.dropped_messages.fetch_add(1, Ordering::Relaxed);
            false
        }
    }

    /// Total messages dropped by [`Session::try_push`].
    pub fn drop_count(&self) -> u64 {
        self.dropped_messages.load(Ordering::Relaxed)
    }

    /// Session age.
    pub fn age(&self) -> std::time::Duration {
        self.connected_at.elapsed()
    }
}
