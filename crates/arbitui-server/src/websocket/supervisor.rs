//! Session supervision: one WebSocket connection, four child tasks.
//!
//! recv, send, heartbeat, and dispatch run under one `JoinSet` scoped by a
//! `CancellationToken`. The first fatal exit (transport error, closed peer,
//! drained queue) cancels the siblings; no task outlives the session.

use std::sync::Arc;
use std::sync::atomic::Ordering;
use std::time::Duration;

use axum::extract::ws::{Message, WebSocket};
use futures::stream::{SplitSink, SplitStream};
use futures::{SinkExt, StreamExt};
use tokio::sync::mpsc;
use tokio::task::JoinSet;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};
use uuid::Uuid;

use arbitui_protocol::{ClientMsg, ServerMsg};

use crate::dispatch::Dispatcher;
use crate::server::AppState;
use crate::websocket::session::{Session, SessionState};

/// Drive one WebSocket connection to completion.
pub async fn run_ws_session(socket: WebSocket, state: AppState) {
    let session_id = Uuid::new_v4().to_string();
    let _ = state.sessions.fetch_add(1, Ordering::Relaxed);
    info!(session = %session_id, "session opened");

    let (in_tx, in_rx) = mpsc::channel::<ClientMsg>(state.config.inbound_queue_capacity);
    let (out_tx, out_rx) = mpsc::channel::<ServerMsg>(state.config.outbound_queue_capacity);
    let session = Arc::new(Session::new(session_id.clone(), out_tx));

    let dispatcher = Dispatcher::new(
        state.store.clone(),
        Arc::clone(&state.engine),
        state.dispatch.as_ref().clone(),
    );

    let cancel = state.shutdown.token().child_token();
    let (ws_tx, ws_rx) = socket.split();

    let mut tasks = JoinSet::new();
    let _ = tasks.spawn(recv_loop(ws_rx, in_tx, cancel.clone()));
    let _ = tasks.spawn(send_loop(ws_tx, out_rx, cancel.clone()));
    let _ = tasks.spawn(heartbeat_loop(
        Arc::clone(&session),
        Duration::from_secs(state.config.heartbeat_interval_secs),
        cancel.clone(),
    ));
    let _ = tasks.spawn(dispatch_loop(
        dispatcher,
        in_rx,
        Arc::clone(&session),
        cancel.clone(),
    ));

    session.set_state(SessionState::Active);

    // First exit wins; cancel the siblings and drain.
    let _ = tasks.join_next().await;
    session.set_state(SessionState::Closing);
    cancel.cancel();
    while tasks.join_next().await.is_some() {}
    session.set_state(SessionState::Closed);

    let _ = state.sessions.fetch_sub(1, Ordering::Relaxed);
    info!(
        session = %session_id,
        dropped = session.drop_count(),
        "session closed"
    );
}

/// Read frames, decode, feed the inbound queue.
///
/// A frame that fails to decode is logged and dropped; a full inbound
/// queue rejects the message instead of stalling frame reads. In both
/// cases the connection stays up. Transport errors and peer close end
/// the task.
async fn recv_loop(
    mut ws_rx: SplitStream<WebSocket>,
    in_tx: mpsc::Sender<ClientMsg>,
    cancel: CancellationToken,
) {
    loop {
        let frame = tokio::select! {
            frame = ws_rx.next() => frame,
            () = cancel.cancelled() => return,
        };

        let text = match frame {
            Some(Ok(Message::Text(text))) => text.to_string(),
            Some(Ok(Message::Binary(bytes))) => match String::from_utf8(bytes.to_vec()) {
                Ok(text) => text,
                Err(_) => {
                    warn!("non-utf8 binary frame dropped");
                    continue;
                }
            },
            // axum answers pings itself.
            Some(Ok(Message::Ping(_) | Message::Pong(_))) => continue,
            Some(Ok(Message::Close(_))) => {
                debug!("peer closed");
                return;
            }
            Some(Err(err)) => {
                warn!(error = %err, "websocket read failed");
                return;
            }
            None => return,
        };

        match serde_json::from_str::<ClientMsg>(&text) {
            Ok(msg) => {
                if !offer_inbound(&in_tx, msg) {
                    return;
                }
            }
            Err(err) => {
                warn!(error = %err, "failed to decode client message, dropping");
            }
        }
    }
}

/// Offer one decoded message to the inbound queue without blocking.
///
/// A full queue rejects the message with a log line so a slow dispatcher
/// never stalls frame reads. Returns `false` only when the dispatch side
/// is gone and the recv task should exit.
fn offer_inbound(in_tx: &mpsc::Sender<ClientMsg>, msg: ClientMsg) -> bool {
    match in_tx.try_send(msg) {
        Ok(()) => true,
        Err(mpsc::error::TrySendError::Full(msg)) => {
            warn!(?msg, "inbound queue full, rejecting message");
            true
        }
        Err(mpsc::error::TrySendError::Closed(_)) => false,
    }
}

/// Drain the outbound queue onto the wire, strictly FIFO.
async fn send_loop(
    mut ws_tx: SplitSink<WebSocket, Message>,
    mut out_rx: mpsc::Receiver<ServerMsg>,
    cancel: CancellationToken,
) {
    loop {
        let msg = tokio::select! {
            msg = out_rx.recv() => msg,
            () = cancel.cancelled() => return,
        };
        let Some(msg) = msg else { return };

        let json = match serde_json::to_string(&msg) {
            Ok(json) => json,
            Err(err) => {
                warn!(error = %err, "failed to serialize server message, dropping");
                continue;
            }
        };
        if let Err(err) = ws_tx.send(Message::Text(json.into())).await {
            warn!(error = %err, "websocket write failed");
            return;
        }
    }
}

/// Push a liveness pong at a fixed cadence.
///
/// Uses `try_push`; a full outbound queue drops the pong rather than
/// block or kill the session. Only cancellation ends this task.
async fn heartbeat_loop(session: Arc<Session>, interval: Duration, cancel: CancellationToken) {
    // Start one interval out; an immediate pong on connect is just noise.
    let mut ticks = tokio::time::interval_at(tokio::time::Instant::now() + interval, interval);
    loop {
        tokio::select! {
            _ = ticks.tick() => {
                if !session.try_push(ServerMsg::Pong) {
                    debug!(session = %session.id, "heartbeat dropped, outbound queue full");
                }
            }
            () = cancel.cancelled() => return,
        }
    }
}

/// Pop inbound messages and run the dispatcher.
///
/// Handler failures are absorbed inside [`Dispatcher::handle`] as error
/// notifications; this loop only ends on cancellation or a drained queue.
/// Cancellation also abandons the in-flight handler, so a sibling's fatal
/// exit never waits out a slow engine call.
async fn dispatch_loop(
    dispatcher: Dispatcher,
    mut in_rx: mpsc::Receiver<ClientMsg>,
    session: Arc<Session>,
    cancel: CancellationToken,
) {
    loop {
        let msg = tokio::select! {
            msg = in_rx.recv() => msg,
            () = cancel.cancelled() => return,
        };
        let Some(msg) = msg else { return };
        tokio::select! {
            () = dispatcher.handle(msg, &session) => {}
            () = cancel.cancelled() => return,
        }
    }
}
