//! In-memory hierarchy store for dry runs and integration tests
//!
//! Implements the service contract the harness consumes:
//! `POST /{endpoint}` stores a hierarchy keyed by its `id`, and
//! `GET /{endpoint}/{id}` returns it. Can be told to reverse every array
//! on the way out, to exercise mismatch reporting.

use std::collections::HashMap;
use std::io::Read;
use std::net::SocketAddr;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::thread::JoinHandle;

use serde_json::Value;
use tiny_http::{Header, Method, Response, Server};

use crate::common::{Error, Result};

/// Shared state of a running mock store
#[derive(Debug)]
pub struct MockStore {
    endpoint: String,
    reverse_arrays: bool,
    stored: Mutex<HashMap<i64, Value>>,
    requests: AtomicUsize,
}

impl MockStore {
    pub fn new(endpoint: &str, reverse_arrays: bool) -> Self {
        Self {
            endpoint: endpoint.trim_matches('/').to_string(),
            reverse_arrays,
            stored: Mutex::new(HashMap::new()),
            requests: AtomicUsize::new(0),
        }
    }

    /// Number of requests handled so far
    pub fn request_count(&self) -> usize {
        self.requests.load(Ordering::SeqCst)
    }

    /// Number of hierarchies currently stored
    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, HashMap<i64, Value>> {
        self.stored.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Handle one request, returning status code and JSON body
    pub fn handle(&self, method: &Method, url: &str, body: &str) -> (u16, String) {
        self.requests.fetch_add(1, Ordering::SeqCst);

        let path = url.split('?').next().unwrap_or("").trim_matches('/');
        let rest = match path.strip_prefix(self.endpoint.as_str()) {
            Some(rest) if rest.is_empty() || rest.starts_with('/') => rest.trim_start_matches('/'),
            _ => return error_body(404, "unknown endpoint"),
        };

        match (method, rest) {
            (Method::Post, "") => self.store(body),
            (Method::Get, id) if !id.is_empty() && !id.contains('/') => match id.parse::<i64>() {
                Ok(id) => self.fetch(id),
                Err(_) => error_body(400, "id must be an integer"),
            },
            (Method::Post, _) | (Method::Get, _) => error_body(404, "unknown endpoint"),
            _ => error_body(405, "method not allowed"),
        }
    }

    fn store(&self, body: &str) -> (u16, String) {
        let hierarchy: Value = match serde_json::from_str(body) {
            Ok(value) => value,
            Err(e) => return error_body(400, &format!("invalid JSON: {}", e)),
        };
        let id = match hierarchy.get("id").and_then(Value::as_i64) {
            Some(id) => id,
            None => return error_body(400, "missing integer 'id'"),
        };

        tracing::info!(id, "stored hierarchy");
        self.lock().insert(id, hierarchy);
        (201, serde_json::json!({ "id": id }).to_string())
    }

    fn fetch(&self, id: i64) -> (u16, String) {
        let found = self.lock().get(&id).cloned();
        match found {
            Some(mut hierarchy) => {
                if self.reverse_arrays {
                    reverse_arrays(&mut hierarchy);
                }
                tracing::info!(id, "fetched hierarchy");
                (200, hierarchy.to_string())
            }
            None => error_body(404, &format!("no hierarchy with id {}", id)),
        }
    }

    /// Serve requests until the server is unblocked
    pub fn serve(&self, server: &Server) {
        for mut request in server.incoming_requests() {
            let mut body = String::new();
            let (status, payload) = match request.as_reader().read_to_string(&mut body) {
                Ok(_) => self.handle(request.method(), request.url(), &body),
                Err(e) => error_body(400, &format!("unreadable body: {}", e)),
            };

            tracing::debug!(method = %request.method(), url = request.url(), status, "request");
            let mut response = Response::from_string(payload).with_status_code(status);
            if let Ok(header) = Header::from_bytes(&b"Content-Type"[..], &b"application/json"[..]) {
                response = response.with_header(header);
            }
            if let Err(e) = request.respond(response) {
                tracing::warn!("failed to send response: {}", e);
            }
        }
    }
}

/// A mock store serving on a background thread
pub struct RunningMockStore {
    pub addr: SocketAddr,
    pub store: Arc<MockStore>,
    server: Arc<Server>,
    handle: Option<JoinHandle<()>>,
}

impl RunningMockStore {
    /// Bind `addr` (use port 0 for an ephemeral port) and start serving
    pub fn start(addr: &str, store: MockStore) -> Result<Self> {
        let server = Server::http(addr).map_err(|e| Error::bind(addr, e))?;
        let bound = server
            .server_addr()
            .to_ip()
            .ok_or_else(|| Error::bind(addr, "not an IP socket"))?;

        let server = Arc::new(server);
        let store = Arc::new(store);
        let handle = {
            let server = Arc::clone(&server);
            let store = Arc::clone(&store);
            std::thread::spawn(move || store.serve(&server))
        };

        Ok(Self {
            addr: bound,
            store,
            server,
            handle: Some(handle),
        })
    }

    /// Base URL clients should use, e.g. `http://127.0.0.1:41234`
    pub fn base_url(&self) -> String {
        format!("http://{}", self.addr)
    }

    /// Block until the serving thread exits
    pub fn wait(mut self) {
        if let Some(handle) = self.handle.take() {
            let _ = handle.join();
        }
    }
}

impl Drop for RunningMockStore {
    fn drop(&mut self) {
        self.server.unblock();
        if let Some(handle) = self.handle.take() {
            let _ = handle.join();
        }
    }
}

fn reverse_arrays(value: &mut Value) {
    match value {
        Value::Array(items) => {
            items.reverse();
            items.iter_mut().for_each(reverse_arrays);
        }
        Value::Object(map) => map.values_mut().for_each(reverse_arrays),
        _ => {}
    }
}

fn error_body(status: u16, message: &str) -> (u16, String) {
    (status, serde_json::json!({ "error": message }).to_string())
}
