//! ============================================================================
//! HTTP Server - tiny_http adapter for ShopApi
//! ============================================================================
//! The blocking accept loop runs on tokio's blocking pool; each request is
//! handled on its own blocking task so slow requests (password hashing,
//! waiting on the writer lock) do not hold up the rest.
//! ============================================================================

use std::io::Read;
use std::net::SocketAddr;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tiny_http::{Header, Request, Response, Server, StatusCode};
use tracing::{debug, error, info, info_span, warn};

use super::{ApiRequest, ApiResponse, Method, ShopApi};
use crate::error::{ShopError, ShopResult};

/// Stops a running `ApiServer` from another task
#[derive(Clone)]
pub struct ShutdownHandle {
    server: Arc<Server>,
    stopping: Arc<AtomicBool>,
}

impl ShutdownHandle {
    pub fn shutdown(&self) {
        self.stopping.store(true, Ordering::SeqCst);
        self.server.unblock();
    }
}

pub struct ApiServer {
    server: Arc<Server>,
    api: Arc<ShopApi>,
    stopping: Arc<AtomicBool>,
}

impl ApiServer {
    /// Bind to `addr` (use port 0 for an ephemeral port)
    pub fn bind(addr: &str, api: Arc<ShopApi>) -> ShopResult<Self> {
        let server = Server::http(addr).map_err(|e| {
            ShopError::Io(std::io::Error::other(format!(
                "Failed to start HTTP server on {}: {}",
                addr, e
            )))
        })?;

        Ok(Self {
            server: Arc::new(server),
            api,
            stopping: Arc::new(AtomicBool::new(false)),
        })
    }

    pub fn local_addr(&self) -> Option<SocketAddr> {
        self.server.server_addr().to_ip()
    }

    pub fn shutdown_handle(&self) -> ShutdownHandle {
        ShutdownHandle {
            server: Arc::clone(&self.server),
            stopping: Arc::clone(&self.stopping),
        }
    }

    /// Serve until the shutdown handle fires
    pub async fn run(self) -> ShopResult<()> {
        if let Some(addr) = self.local_addr() {
            info!("Guildhall API listening on http://{}", addr);
        }

        loop {
            let server = Arc::clone(&self.server);
            let received = tokio::task::spawn_blocking(move || server.recv())
                .await
                .map_err(|e| ShopError::Io(std::io::Error::other(e)))?;

            if self.stopping.load(Ordering::SeqCst) {
                break;
            }

            match received {
                Ok(request) => {
                    let api = Arc::clone(&self.api);
                    tokio::task::spawn_blocking(move || serve(&api, request));
                }
                Err(e) => warn!("Failed to receive request: {}", e),
            }
        }

        info!("Guildhall API stopped");
        Ok(())
    }
}

fn serve(api: &ShopApi, mut request: Request) {
    let request_id = uuid::Uuid::new_v4();
    let span = info_span!("request", id = %request_id);
    let _guard = span.enter();

    let response = match read_request(&mut request, api.max_body_bytes()) {
        Ok(req) => api.handle(&req),
        Err(e) => ApiResponse::from_error(&e),
    };

    debug!(
        "{} {} -> {}",
        request.method(),
        request.url(),
        response.status
    );
    if let Err(e) = request.respond(into_tiny(response)) {
        error!("Failed to send response: {}", e);
    }
}

/// Convert a tiny_http request, reading at most `max_body + 1` bytes so
/// oversized bodies are detectable without buffering them whole
fn read_request(request: &mut Request, max_body: usize) -> ShopResult<ApiRequest> {
    let method = Method::parse(&request.method().to_string());
    let authorization = request
        .headers()
        .iter()
        .find(|h| h.field.equiv("Authorization"))
        .map(|h| h.value.as_str().to_string());

    let mut body = Vec::new();
    request
        .as_reader()
        .take(max_body as u64 + 1)
        .read_to_end(&mut body)?;

    let mut req = ApiRequest::new(method, request.url())?.with_body(body);
    req.authorization = authorization;
    Ok(req)
}

fn into_tiny(response: ApiResponse) -> Response<std::io::Cursor<Vec<u8>>> {
    let mut out = Response::from_data(response.body.into_bytes())
        .with_status_code(StatusCode(response.status));
    for (name, value) in &response.headers {
        if let Ok(header) = Header::from_bytes(name.as_bytes(), value.as_bytes()) {
            out.add_header(header);
        }
    }
    out
}
