//! The stdio server loop.
//!
//! The reader task decodes one line at a time and starts each request on the
//! reader itself, in arrival order. A handler that finishes without
//! suspending (every kv call, `tools/list`, protocol errors) is done before
//! the next line is read; one that suspends on I/O or on a settle wait is
//! moved into a [`JoinSet`] and the reader moves on. Handlers send finished
//! responses to a single writer task over an `mpsc` channel, so lines on
//! stdout never interleave.
//!
//! On EOF the loop stops reading and waits for every in-flight handler; on
//! cancellation in-flight handlers are aborted.

use std::pin::Pin;
use std::sync::Arc;

use futures::FutureExt;
use serde_json::{Value, json};
use thiserror::Error;
use tokio::io::{AsyncBufReadExt, AsyncRead, AsyncWrite, AsyncWriteExt, BufReader, BufWriter};
use tokio::sync::mpsc;
use tokio::task::JoinSet;
use tokio_util::sync::CancellationToken;
use toolbridge_application::{FormattedResponse, ProtocolError};
use toolbridge_domain::ToolInvocation;
use tracing::{debug, info, trace, warn};

use super::protocol::{
    CallToolParams, INTERNAL_ERROR, INVALID_PARAMS, INVALID_REQUEST, JsonRpcRequest,
    JsonRpcResponse, METHOD_NOT_FOUND, PARSE_ERROR, PROTOCOL_VERSION,
};
use super::transport::{MessageKind, classify_message};
use crate::adapters::AdapterRuntime;

/// Responses waiting for the writer
const WRITE_QUEUE: usize = 64;

type Handler = Pin<Box<dyn Future<Output = ()> + Send>>;

#[derive(Debug, Error)]
pub enum ServerError {
    #[error("Transport I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Writer task failed: {0}")]
    Writer(String),
}

/// Serves one adapter over a line transport.
#[derive(Clone)]
pub struct McpServer {
    runtime: Arc<AdapterRuntime>,
}

impl McpServer {
    pub fn new(runtime: AdapterRuntime) -> Self {
        Self {
            runtime: Arc::new(runtime),
        }
    }

    /// Serve on the process's stdin/stdout until EOF or cancellation.
    pub async fn serve_stdio(&self, cancel: CancellationToken) -> Result<(), ServerError> {
        self.serve(tokio::io::stdin(), tokio::io::stdout(), cancel).await
    }

    pub async fn serve<R, W>(
        &self,
        reader: R,
        writer: W,
        cancel: CancellationToken,
    ) -> Result<(), ServerError>
    where
        R: AsyncRead + Unpin,
        W: AsyncWrite + Unpin + Send + 'static,
    {
        info!(adapter = self.runtime.kind.name(), "Serving on line transport");

        let (tx, rx) = mpsc::channel::<JsonRpcResponse>(WRITE_QUEUE);
        let writer_task = tokio::spawn(write_loop(writer, rx));

        let mut lines = BufReader::new(reader).lines();
        let mut in_flight = JoinSet::new();
        let mut cancelled = false;

        loop {
            tokio::select! {
                _ = cancel.cancelled() => {
                    info!("Shutdown requested");
                    cancelled = true;
                    break;
                }
                Some(joined) = in_flight.join_next(), if !in_flight.is_empty() => {
                    if let Err(e) = joined {
                        warn!("Request handler failed: {}", e);
                    }
                }
                line = lines.next_line() => match line? {
                    Some(line) => self.dispatch(&line, &tx, &mut in_flight).await,
                    None => {
                        debug!("Input closed");
                        break;
                    }
                },
            }
        }

        if cancelled {
            in_flight.shutdown().await;
        } else {
            while let Some(joined) = in_flight.join_next().await {
                if let Err(e) = joined {
                    warn!("Request handler failed: {}", e);
                }
            }
        }

        drop(tx);
        match writer_task.await {
            Ok(result) => result.map_err(ServerError::from),
            Err(e) => Err(ServerError::Writer(e.to_string())),
        }
    }

    async fn dispatch(
        &self,
        line: &str,
        tx: &mpsc::Sender<JsonRpcResponse>,
        in_flight: &mut JoinSet<()>,
    ) {
        let line = line.trim();
        if line.is_empty() {
            return;
        }
        trace!(%line, "Inbound");

        let message: Value = match serde_json::from_str(line) {
            Ok(message) => message,
            Err(e) => {
                debug!("Unparseable line: {}", e);
                let error = ProtocolError::new(PARSE_ERROR, format!("Parse error: {}", e));
                send(tx, JsonRpcResponse::failure(Value::Null, error)).await;
                return;
            }
        };

        match classify_message(&message) {
            MessageKind::Notification => {
                debug!(method = message["method"].as_str().unwrap_or_default(), "Notification");
            }
            MessageKind::Invalid => {
                let id = message.get("id").cloned().unwrap_or(Value::Null);
                let error = ProtocolError::new(INVALID_REQUEST, "Invalid Request");
                send(tx, JsonRpcResponse::failure(id, error)).await;
            }
            MessageKind::Request => {
                let request: JsonRpcRequest = match serde_json::from_value(message) {
                    Ok(request) => request,
                    Err(e) => {
                        let error = ProtocolError::new(INVALID_REQUEST, format!("Invalid Request: {}", e));
                        send(tx, JsonRpcResponse::failure(Value::Null, error)).await;
                        return;
                    }
                };
                let runtime = Arc::clone(&self.runtime);
                let tx = tx.clone();
                let mut handler: Handler = Box::pin(async move {
                    debug!(method = %request.method, id = %request.id, "Request");
                    let result = handle_request(&runtime, &request.method, request.params).await;
                    send(&tx, JsonRpcResponse::from_result(request.id, result)).await;
                });
                // Run up to the first suspension point before reading on, so
                // effects start in arrival order.
                if (&mut handler).now_or_never().is_none() {
                    in_flight.spawn(handler);
                }
            }
        }
    }
}

async fn send(tx: &mpsc::Sender<JsonRpcResponse>, response: JsonRpcResponse) {
    if tx.send(response).await.is_err() {
        warn!("Writer closed; dropping response");
    }
}

async fn write_loop<W>(writer: W, mut rx: mpsc::Receiver<JsonRpcResponse>) -> std::io::Result<()>
where
    W: AsyncWrite + Unpin,
{
    let mut writer = BufWriter::new(writer);
    while let Some(response) = rx.recv().await {
        let mut line = serde_json::to_string(&response)?;
        line.push('\n');
        writer.write_all(line.as_bytes()).await?;
        writer.flush().await?;
    }
    writer.shutdown().await
}

async fn handle_request(
    runtime: &AdapterRuntime,
    method: &str,
    params: Option<Value>,
) -> Result<Value, ProtocolError> {
    match method {
        "initialize" => Ok(json!({
            "protocolVersion": PROTOCOL_VERSION,
            "capabilities": { "tools": {} },
            "serverInfo": {
                "name": runtime.kind.server_name(),
                "version": env!("CARGO_PKG_VERSION"),
            },
        })),
        "ping" => Ok(json!({})),
        "tools/list" => Ok(json!({ "tools": runtime.router.list_tools() })),
        "tools/call" => call_tool(runtime, params).await,
        other => Err(ProtocolError::new(
            METHOD_NOT_FOUND,
            format!("Method not found: {}", other),
        )),
    }
}

async fn call_tool(runtime: &AdapterRuntime, params: Option<Value>) -> Result<Value, ProtocolError> {
    let params: CallToolParams = serde_json::from_value(params.unwrap_or(Value::Null))
        .map_err(|e| invalid_call(format!("Invalid tools/call params: {}", e), "name"))?;

    let arguments = match params.arguments {
        None | Some(Value::Null) => serde_json::Map::new(),
        Some(Value::Object(map)) => map,
        Some(_) => return Err(invalid_call("arguments must be an object", "arguments")),
    };

    let outcome = runtime
        .router
        .call_tool(ToolInvocation {
            name: params.name,
            arguments,
        })
        .await;

    match runtime.formatter.format(outcome) {
        FormattedResponse::Result(result) => serde_json::to_value(result)
            .map_err(|e| ProtocolError::new(INTERNAL_ERROR, e.to_string())),
        FormattedResponse::Error(error) => Err(error),
    }
}

fn invalid_call(message: impl Into<String>, field: &str) -> ProtocolError {
    ProtocolError::new(INVALID_PARAMS, message)
        .with_data(json!({ "kind": "InvalidParams", "fields": [field] }))
}
