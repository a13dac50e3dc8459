//! Minimal HTTP/1.1 front for the relay.
//!
//! Routes:
//! - `POST /api/generate` - theme in, palette JSON out
//! - `GET /health` - liveness probe
//!
//! One request per connection (`Connection: close`), no chunked bodies.

use crate::relay::{Relay, RelayResponse};
use anyhow::{Context, Result};
use serde_json::json;
use std::collections::HashMap;
use std::future::Future;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::{Duration, Instant};
use thiserror::Error;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncReadExt, AsyncWrite, AsyncWriteExt, BufReader};
use tokio::net::{TcpListener, TcpStream};
use tracing::{debug, error, info, warn};

pub const GENERATE_PATH: &str = "/api/generate";
pub const HEALTH_PATH: &str = "/health";

const READ_TIMEOUT: Duration = Duration::from_secs(10);
const MAX_HEADER_BYTES: usize = 16 * 1024;

#[derive(Debug)]
struct HttpRequest {
    method: String,
    path: String,
    headers: HashMap<String, String>,
    body: Vec<u8>,
}

#[derive(Error, Debug)]
enum HttpError {
    #[error("connection closed before a request was sent")]
    Closed,

    #[error("Malformed request: {0}")]
    Malformed(&'static str),

    #[error("Request body exceeds {0} bytes")]
    TooLarge(usize),

    #[error("Timed out reading request")]
    Timeout,

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

pub struct RelayServer {
    relay: Arc<Relay>,
    max_body_bytes: usize,
}

impl RelayServer {
    pub fn new(relay: Relay, max_body_bytes: usize) -> Self {
        Self {
            relay: Arc::new(relay),
            max_body_bytes,
        }
    }

    pub async fn bind(addr: &str) -> Result<TcpListener> {
        TcpListener::bind(addr)
            .await
            .with_context(|| format!("Failed to bind to {}", addr))
    }

    /// Serve until the process exits.
    pub async fn serve(self, listener: TcpListener) -> Result<()> {
        self.serve_with_shutdown(listener, std::future::pending()).await
    }

    /// Serve until `shutdown` resolves. In-flight connections finish on their own tasks.
    pub async fn serve_with_shutdown<F>(self, listener: TcpListener, shutdown: F) -> Result<()>
    where
        F: Future<Output = ()>,
    {
        let addr = listener
            .local_addr()
            .context("Failed to read listener address")?;
        info!("Palette relay listening on http://{}{}", addr, GENERATE_PATH);

        tokio::pin!(shutdown);

        loop {
            tokio::select! {
                _ = &mut shutdown => {
                    info!("Palette relay stopped");
                    return Ok(());
                }
                accepted = listener.accept() => match accepted {
                    Ok((stream, peer)) => {
                        debug!("Connection from {}", peer);
                        let relay = self.relay.clone();
                        let max_body_bytes = self.max_body_bytes;
                        tokio::spawn(async move {
                            if let Err(e) = handle_connection(stream, peer, relay, max_body_bytes).await {
                                warn!("Error handling connection from {}: {:#}", peer, e);
                            }
                        });
                    }
                    Err(e) => {
                        error!("Accept error: {}", e);
                    }
                }
            }
        }
    }
}

async fn handle_connection(
    stream: TcpStream,
    peer: SocketAddr,
    relay: Arc<Relay>,
    max_body_bytes: usize,
) -> Result<()> {
    let started = Instant::now();
    let (read_half, mut write_half) = stream.into_split();
    let mut reader = BufReader::new(read_half);

    let request = tokio::time::timeout(READ_TIMEOUT, read_request(&mut reader, max_body_bytes))
        .await
        .unwrap_or(Err(HttpError::Timeout));

    let request = match request {
        Ok(request) => request,
        Err(HttpError::Closed) => return Ok(()),
        Err(HttpError::Io(e)) => return Err(e).context("Failed to read request"),
        Err(e) => {
            let status = match e {
                HttpError::TooLarge(_) => 413,
                HttpError::Timeout => 408,
                _ => 400,
            };
            warn!("Rejecting request from {}: {}", peer, e);
            let response = RelayResponse::error(status, &e.to_string());
            return write_response(&mut write_half, &response)
                .await
                .context("Failed to write response");
        }
    };

    debug!(
        "{} {} from {} ({:?})",
        request.method,
        request.path,
        peer,
        request.headers.get("user-agent")
    );

    let response = route(&request, &relay).await;

    info!(
        "{} {} -> {} ({} ms)",
        request.method,
        request.path,
        response.status,
        started.elapsed().as_millis()
    );

    write_response(&mut write_half, &response)
        .await
        .context("Failed to write response")
}

async fn route(request: &HttpRequest, relay: &Relay) -> RelayResponse {
    match (request.method.as_str(), request.path.as_str()) {
        ("POST", GENERATE_PATH) => relay.handle(&request.body).await,
        ("GET", HEALTH_PATH) => RelayResponse::json(200, json!({ "status": "healthy" })),
        (_, GENERATE_PATH) | (_, HEALTH_PATH) => RelayResponse::error(405, "Method not allowed"),
        _ => RelayResponse::error(404, "Endpoint not found"),
    }
}

async fn read_request<R>(reader: &mut R, max_body_bytes: usize) -> Result<HttpRequest, HttpError>
where
    R: AsyncBufRead + Unpin,
{
    let mut request_line = String::new();
    if read_bounded_line(reader, &mut request_line).await? == 0 {
        return Err(HttpError::Closed);
    }

    let mut parts = request_line.split_whitespace();
    let (method, target) = match (parts.next(), parts.next()) {
        (Some(method), Some(target)) => (method.to_string(), target),
        _ => return Err(HttpError::Malformed("invalid request line")),
    };
    let path = target.split('?').next().unwrap_or(target).to_string();

    let mut headers = HashMap::new();
    let mut header_bytes = 0;
    loop {
        let mut line = String::new();
        let read = read_bounded_line(reader, &mut line).await?;
        if read == 0 {
            return Err(HttpError::Malformed("unexpected end of headers"));
        }
        header_bytes += read;
        if header_bytes > MAX_HEADER_BYTES {
            return Err(HttpError::Malformed("headers too large"));
        }

        let line = line.trim();
        if line.is_empty() {
            break;
        }
        if let Some((key, value)) = line.split_once(':') {
            headers.insert(key.trim().to_ascii_lowercase(), value.trim().to_string());
        }
    }

    if headers
        .get("transfer-encoding")
        .is_some_and(|v| v.to_ascii_lowercase().contains("chunked"))
    {
        return Err(HttpError::Malformed("chunked bodies are not supported"));
    }

    let content_length = match headers.get("content-length") {
        Some(value) => value
            .parse::<usize>()
            .map_err(|_| HttpError::Malformed("invalid Content-Length"))?,
        None => 0,
    };
    if content_length > max_body_bytes {
        return Err(HttpError::TooLarge(max_body_bytes));
    }

    let mut body = vec![0u8; content_length];
    reader.read_exact(&mut body).await?;

    Ok(HttpRequest {
        method,
        path,
        headers,
        body,
    })
}

/// `read_line` that gives up after `MAX_HEADER_BYTES` instead of buffering forever.
async fn read_bounded_line<R>(reader: &mut R, line: &mut String) -> Result<usize, HttpError>
where
    R: AsyncBufRead + Unpin,
{
    let read = (&mut *reader)
        .take(MAX_HEADER_BYTES as u64 + 1)
        .read_line(line)
        .await?;
    if read > MAX_HEADER_BYTES {
        return Err(HttpError::Malformed("line too long"));
    }
    Ok(read)
}

fn reason_phrase(status: u16) -> &'static str {
    match status {
        200 => "OK",
        400 => "Bad Request",
        404 => "Not Found",
        405 => "Method Not Allowed",
        408 => "Request Timeout",
        413 => "Payload Too Large",
        500 => "Internal Server Error",
        _ => "Unknown",
    }
}

async fn write_response<W>(writer: &mut W, response: &RelayResponse) -> std::io::Result<()>
where
    W: AsyncWrite + Unpin,
{
    let head = format!(
        "HTTP/1.1 {} {}\r\n\
         Content-Type: {}\r\n\
         Content-Length: {}\r\n\
         Connection: close\r\n\
         \r\n",
        response.status,
        reason_phrase(response.status),
        response.content_type,
        response.body.len()
    );

    writer.write_all(head.as_bytes()).await?;
    writer.write_all(response.body.as_bytes()).await?;
    writer.flush().await?;
    writer.shutdown().await
}
