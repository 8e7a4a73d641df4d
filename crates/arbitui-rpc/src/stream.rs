//! Multiplexer over one persistent newline-delimited stream.
//!
//! Any number of callers share the connection. Each call registers a
//! one-shot result slot in the pending table keyed by a fresh correlation
//! id, then writes its request as one line under the write lock. A single
//! background read task demultiplexes response lines back to their
//! callers. Neither the pending-table lock nor the write lock is ever held
//! across an await of anything but the single write it guards.

use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use parking_lot::Mutex;
use serde_json::Value;
use tokio::io::{AsyncBufReadExt, AsyncRead, AsyncWrite, AsyncWriteExt, BufReader};
use tokio::net::UnixStream;
use tokio::sync::{Semaphore, oneshot};
use tokio::task::JoinHandle;
use tracing::{debug, warn};
use uuid::Uuid;

use arbitui_protocol::{Method, RpcRequest, RpcResponse};

use crate::client::EngineClient;
use crate::errors::RpcError;

type CallResult = Result<Value, RpcError>;

/// Tunables for a [`StreamClient`].
#[derive(Clone, Debug)]
pub struct ClientConfig {
    /// Ceiling on concurrently outstanding calls; callers beyond it wait.
    pub max_in_flight: usize,
    /// Per-call deadline.
    pub call_timeout: Duration,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            max_in_flight: 512,
            call_timeout: Duration::from_secs(30),
        }
    }
}

struct Shared {
    /// Serialized writes; held only for the duration of one line.
    writer: tokio::sync::Mutex<Box<dyn AsyncWrite + Send + Unpin>>,
    /// Outstanding calls by correlation id.
    pending: Mutex<HashMap<String, oneshot::Sender<CallResult>>>,
    /// Admission ceiling.
    sem: Semaphore,
    call_timeout: Duration,
    /// Cleared once the connection dies; later calls fail fast.
    alive: AtomicBool,
}

impl Shared {
    /// Fail every outstanding call and mark the connection dead.
    fn fail_all(&self) {
        self.alive.store(false, Ordering::Relaxed);
        let drained: Vec<_> = {
            let mut pending = self.pending.lock();
            pending.drain().collect()
        };
        for (id, tx) in drained {
            debug!(id, "failing outstanding call: connection lost");
            let _ = tx.send(Err(RpcError::ConnectionLost));
        }
    }

    /// Route one response line to its caller.
    fn handle_line(&self, line: &str) {
        let rsp: RpcResponse = match serde_json::from_str(line) {
            Ok(rsp) => rsp,
            Err(e) => {
                warn!(error = %e, "dropping malformed response line");
                return;
            }
        };
        let Some(id) = rsp.id else {
            warn!("dropping response without correlation id");
            return;
        };
        let Some(tx) = self.pending.lock().remove(&id) else {
            // Duplicate or stale response; the call may have timed out.
            debug!(id, "dropping response with no pending call");
            return;
        };
        let result = match (rsp.result, rsp.error) {
            (_, Some(err)) => Err(RpcError::Remote {
                code: err.code,
                message: err.message,
            }),
            (Some(value), None) => Ok(value),
            (None, None) => Err(RpcError::Decode(
                "response carries neither result nor error".into(),
            )),
        };
        // The caller may have timed out and dropped its receiver.
        let _ = tx.send(result);
    }
}

/// Multiplexed client over one persistent stream connection.
pub struct StreamClient {
    shared: Arc<Shared>,
    reader: JoinHandle<()>,
}

impl StreamClient {
    /// Wrap an already-connected bidirectional stream.
    pub fn new<S>(stream: S, config: ClientConfig) -> Self
    where
        S: AsyncRead + AsyncWrite + Send + 'static,
    {
        let (read_half, write_half) = tokio::io::split(stream);
        let shared = Arc::new(Shared {
            writer: tokio::sync::Mutex::new(Box::new(write_half)),
            pending: Mutex::new(HashMap::new()),
            sem: Semaphore::new(config.max_in_flight),
            call_timeout: config.call_timeout,
            alive: AtomicBool::new(true),
        });
        let reader = tokio::spawn(read_loop(read_half, shared.clone()));
        Self { shared, reader }
    }

    /// Connect to the engine's Unix domain socket.
    pub async fn connect_unix(
        path: impl AsRef<Path>,
        config: ClientConfig,
    ) -> std::io::Result<Self> {
        let stream = UnixStream::connect(path).await?;
        Ok(Self::new(stream, config))
    }

    /// Whether the connection is still usable.
    pub fn is_alive(&self) -> bool {
        self.shared.alive.load(Ordering::Relaxed)
    }

    /// Number of calls currently outstanding.
    pub fn pending_calls(&self) -> usize {
        self.shared.pending.lock().len()
    }
}

impl Drop for StreamClient {
    fn drop(&mut self) {
        self.reader.abort();
    }
}

async fn read_loop<R>(read_half: R, shared: Arc<Shared>)
where
    R: AsyncRead + Send + Unpin,
{
    let mut lines = BufReader::new(read_half).lines();
    loop {
        match lines.next_line().await {
            Ok(Some(line)) => shared.handle_line(&line),
            Ok(None) => {
                debug!("engine connection closed");
                break;
            }
            Err(e) => {
                warn!(error = %e, "engine connection read error");
                break;
            }
        }
    }
    shared.fail_all();
}

#[async_trait]
impl EngineClient for StreamClient {
    async fn call(&self, method: Method, params: Value) -> Result<Value, RpcError> {
        let shared = &self.shared;
        if !shared.alive.load(Ordering::Relaxed) {
            return Err(RpcError::ConnectionLost);
        }

        // Admission: hold one permit for the whole call.
        let _permit = shared
            .sem
            .acquire()
            .await
            .map_err(|_| RpcError::ConnectionLost)?;

        let id = Uuid::new_v4().to_string();
        let (tx, rx) = oneshot::channel();
        // Register before writing so a fast response cannot miss the table.
        let _ = shared.pending.lock().insert(id.clone(), tx);

        let mut line = serde_json::to_vec(&RpcRequest::new(method, params, &id))
            .map_err(RpcError::decode)?;
        line.push(b'\n');

        let write_result = {
            let mut writer = shared.writer.lock().await;
            match writer.write_all(&line).await {
                Ok(()) => writer.flush().await,
                Err(e) => Err(e),
            }
        };
        if let Err(e) = write_result {
            warn!(error = %e, "engine write failed");
            let _ = shared.pending.lock().remove(&id);
            shared.fail_all();
            return Err(RpcError::ConnectionLost);
        }

        match tokio::time::timeout(shared.call_timeout, rx).await {
            // Deadline elapsed: the entry must leave the table with us.
            Err(_) => {
                let _ = shared.pending.lock().remove(&id);
                Err(RpcError::Timeout)
            }
            // Sender dropped without a result: the table was drained.
            Ok(Err(_)) => Err(RpcError::ConnectionLost),
            Ok(Ok(result)) => result,
        }
    }
}
