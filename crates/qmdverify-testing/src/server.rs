//! Scripted HTTP server for exercising the client and the CLI end to end.
//!
//! Each route holds a queue of replies. Requests pop the queue until one
//! reply is left, which then answers every further request. Unscripted
//! routes get a 404 with a JSON error body. Every request is recorded,
//! with multipart bodies split into their form fields.
//!
//! The server is an axum router on a current-thread tokio runtime owned by a
//! background thread, so blocking callers can use it directly.
//!
//! # Example
//! ```no_run
//! use qmdverify_testing::{StubReply, StubServer};
//!
//! let server = StubServer::start();
//! server.on_get("/api/version", [StubReply::json(200, r#"{"version":"1.0"}"#)]);
//! assert!(server.url().starts_with("http://127.0.0.1:"));
//! ```

use axum::body::{Body, Bytes};
use axum::extract::{FromRequest, Multipart, Request, State};
use axum::http::{HeaderMap, StatusCode, header};
use axum::response::{IntoResponse, Response};
use axum::Router;
use std::collections::{HashMap, VecDeque};
use std::future::IntoFuture;
use std::net::SocketAddr;
use std::sync::{Arc, Mutex};
use std::thread::JoinHandle;
use tokio::sync::oneshot;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StubReply {
    pub status: u16,
    pub body: String,
}

impl StubReply {
    pub fn json(status: u16, body: impl Into<String>) -> Self {
        Self {
            status,
            body: body.into(),
        }
    }

    pub fn ok(body: impl Into<String>) -> Self {
        Self::json(200, body)
    }
}

/// A request as the server received it.
#[derive(Debug, Clone)]
pub struct RecordedRequest {
    pub method: String,
    pub path: String,
    pub headers: Vec<(String, String)>,
    pub body: Vec<u8>,
    fields: Vec<FormField>,
}

/// One part of a `multipart/form-data` body.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FormField {
    pub name: String,
    pub file_name: Option<String>,
    pub value: Vec<u8>,
}

impl FormField {
    pub fn text(&self) -> String {
        String::from_utf8_lossy(&self.value).to_string()
    }
}

impl RecordedRequest {
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(key, _)| key.eq_ignore_ascii_case(name))
            .map(|(_, value)| value.as_str())
    }

    /// Parts of a multipart body, in wire order. Empty for other bodies.
    pub fn form_fields(&self) -> Vec<FormField> {
        self.fields.clone()
    }
}

#[derive(Default)]
struct Script {
    routes: HashMap<(String, String), VecDeque<StubReply>>,
    requests: Vec<RecordedRequest>,
}

impl Script {
    fn reply_for(&mut self, method: &str, path: &str) -> StubReply {
        let queue = self.routes.get_mut(&(method.to_string(), path.to_string()));
        let scripted = match queue {
            Some(queue) if queue.len() > 1 => queue.pop_front(),
            Some(queue) => queue.front().cloned(),
            None => None,
        };
        scripted.unwrap_or_else(|| {
            StubReply::json(
                404,
                format!(r#"{{"error":"no stub for {} {}"}}"#, method, path),
            )
        })
    }
}

type SharedScript = Arc<Mutex<Script>>;

pub struct StubServer {
    addr: SocketAddr,
    script: SharedScript,
    shutdown: Option<oneshot::Sender<()>>,
    handle: Option<JoinHandle<()>>,
}

impl StubServer {
    /// Bind an ephemeral loopback port and start serving.
    pub fn start() -> Self {
        let listener =
            std::net::TcpListener::bind("127.0.0.1:0").expect("Failed to bind stub server");
        listener
            .set_nonblocking(true)
            .expect("Failed to make stub listener non-blocking");
        let addr = listener.local_addr().expect("Failed to read stub address");

        let script = SharedScript::default();
        let app = Router::new()
            .fallback(record_and_reply)
            .with_state(Arc::clone(&script));
        let (shutdown, stop) = oneshot::channel::<()>();

        let handle = std::thread::spawn(move || {
            let runtime = tokio::runtime::Builder::new_current_thread()
                .enable_all()
                .build()
                .expect("Failed to build stub runtime");

            runtime.block_on(async move {
                let listener = tokio::net::TcpListener::from_std(listener)
                    .expect("Failed to register stub listener");
                tokio::select! {
                    _ = axum::serve(listener, app).into_future() => {}
                    _ = stop => {}
                }
            });
        });

        Self {
            addr,
            script,
            shutdown: Some(shutdown),
            handle: Some(handle),
        }
    }

    /// Base address, without a trailing slash.
    pub fn url(&self) -> String {
        format!("http://{}", self.addr)
    }

    pub fn on(&self, method: &str, path: &str, replies: impl IntoIterator<Item = StubReply>) {
        let mut script = self.script.lock().expect("stub script poisoned");
        script
            .routes
            .entry((method.to_string(), path.to_string()))
            .or_default()
            .extend(replies);
    }

    pub fn on_get(&self, path: &str, replies: impl IntoIterator<Item = StubReply>) {
        self.on("GET", path, replies);
    }

    pub fn on_post(&self, path: &str, replies: impl IntoIterator<Item = StubReply>) {
        self.on("POST", path, replies);
    }

    /// Script a full comparison job: submit returns `job_id`, then each
    /// poll body is served in order.
    pub fn script_job(&self, job_id: &str, polls: impl IntoIterator<Item = String>) {
        self.on_post(
            "/api/compare",
            [StubReply::ok(crate::fixtures::job_submitted(job_id))],
        );
        self.on_get(
            &format!("/api/results/{}", job_id),
            polls.into_iter().map(StubReply::ok),
        );
    }

    pub fn requests(&self) -> Vec<RecordedRequest> {
        self.script
            .lock()
            .expect("stub script poisoned")
            .requests
            .clone()
    }

    pub fn requests_to(&self, path: &str) -> Vec<RecordedRequest> {
        self.requests()
            .into_iter()
            .filter(|r| r.path == path)
            .collect()
    }
}

impl Drop for StubServer {
    fn drop(&mut self) {
        if let Some(shutdown) = self.shutdown.take() {
            let _ = shutdown.send(());
        }
        if let Some(handle) = self.handle.take() {
            let _ = handle.join();
        }
    }
}

async fn record_and_reply(State(script): State<SharedScript>, request: Request) -> Response {
    let (parts, body) = request.into_parts();
    let body = axum::body::to_bytes(body, usize::MAX)
        .await
        .unwrap_or_default();
    let fields = form_fields(&parts.headers, &body).await;

    let recorded = RecordedRequest {
        method: parts.method.to_string(),
        path: parts.uri.path().to_string(),
        headers: parts
            .headers
            .iter()
            .map(|(key, value)| {
                (
                    key.to_string(),
                    String::from_utf8_lossy(value.as_bytes()).to_string(),
                )
            })
            .collect(),
        body: body.to_vec(),
        fields,
    };

    let reply = {
        let mut script = script.lock().expect("stub script poisoned");
        let reply = script.reply_for(&recorded.method, &recorded.path);
        script.requests.push(recorded);
        reply
    };

    let status = StatusCode::from_u16(reply.status).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
    (status, [(header::CONTENT_TYPE, "application/json")], reply.body).into_response()
}

async fn form_fields(headers: &HeaderMap, body: &Bytes) -> Vec<FormField> {
    let Some(content_type) = headers
        .get(header::CONTENT_TYPE)
        .and_then(|value| value.to_str().ok())
        .filter(|value| value.starts_with("multipart/form-data"))
    else {
        return Vec::new();
    };

    let Ok(request) = axum::http::Request::builder()
        .header(header::CONTENT_TYPE, content_type)
        .body(Body::from(body.clone()))
    else {
        return Vec::new();
    };
    let Ok(mut multipart) = Multipart::from_request(request, &()).await else {
        return Vec::new();
    };

    let mut fields = Vec::new();
    while let Ok(Some(field)) = multipart.next_field().await {
        let name = field.name().unwrap_or_default().to_string();
        let file_name = field.file_name().map(str::to_string);
        let Ok(value) = field.bytes().await else {
            break;
        };
        fields.push(FormField {
            name,
            file_name,
            value: value.to_vec(),
        });
    }
    fields
}

#[cfg(test)]
mod tests {
    use super::*;
    use reqwest::blocking::{Client, multipart};

    #[test]
    fn test_scripted_replies_repeat_last() {
        let server = StubServer::start();
        server.on_get(
            "/api/results/j",
            [StubReply::ok("first"), StubReply::ok("second")],
        );

        let client = Client::new();
        let url = format!("{}/api/results/j", server.url());
        let bodies: Vec<String> = (0..3)
            .map(|_| client.get(&url).send().unwrap().text().unwrap())
            .collect();

        assert_eq!(bodies, vec!["first", "second", "second"]);
        assert_eq!(server.requests_to("/api/results/j").len(), 3);
    }

    #[test]
    fn test_unscripted_route_is_404() {
        let server = StubServer::start();
        let response = Client::new()
            .get(format!("{}/nope", server.url()))
            .send()
            .unwrap();

        assert_eq!(response.status().as_u16(), 404);
        assert!(response.text().unwrap().contains("no stub for GET /nope"));
    }

    #[test]
    fn test_records_form_fields_in_order() {
        let server = StubServer::start();
        let form = multipart::Form::new()
            .part(
                "files",
                multipart::Part::bytes(b"AAA".to_vec()).file_name("a.qmd"),
            )
            .text("paths", "ui/a.qmd");
        Client::new()
            .post(format!("{}/api/compare", server.url()))
            .multipart(form)
            .send()
            .unwrap();

        let recorded = &server.requests()[0];
        assert_eq!(recorded.method, "POST");
        assert!(recorded
            .header("content-type")
            .unwrap()
            .starts_with("multipart/form-data"));

        let fields = recorded.form_fields();
        assert_eq!(fields.len(), 2);
        assert_eq!(fields[0].name, "files");
        assert_eq!(fields[0].file_name.as_deref(), Some("a.qmd"));
        assert_eq!(fields[0].text(), "AAA");
        assert_eq!(fields[1].name, "paths");
        assert_eq!(fields[1].file_name, None);
        assert_eq!(fields[1].text(), "ui/a.qmd");
    }

    #[test]
    fn test_plain_body_has_no_form_fields() {
        let server = StubServer::start();
        Client::new()
            .post(format!("{}/x", server.url()))
            .body("abcde")
            .send()
            .unwrap();

        let recorded = &server.requests()[0];
        assert_eq!(recorded.body, b"abcde");
        assert!(recorded.form_fields().is_empty());
    }
}
