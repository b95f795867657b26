//! Shared test fixtures: a canned-response HTTP server and fake
//! providers with call counters.

#![allow(dead_code)]

use std::net::{Ipv4Addr, SocketAddr};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use axum::extract::State;
use axum::http::{header, HeaderMap, Method, StatusCode, Uri};
use axum::response::IntoResponse;
use axum::Router;
use tokio::net::TcpListener;
use tokio::time::Instant;

use wrapper_ai::error::Error;
use wrapper_ai::providers::Provider;
use wrapper_ai::request::{Completion, Outcome};
use wrapper_ai::QueryRequest;

// ===== Mock HTTP server =====

#[derive(Debug, Clone)]
pub struct RecordedRequest
{   pub method: String
  , pub path: String
  , pub headers: Vec<(String, String)>
  , pub body: String
}

impl RecordedRequest
{   /// Header lookup, name is case-insensitive
    pub fn header(&self, name: &str) -> Option<&str>
    {   let name = name.to_ascii_lowercase();
        self.headers
          .iter()
          .find(|(k, _)| *k == name)
          .map(|(_, v)| v.as_str())
    }

    pub fn json(&self) -> serde_json::Value
    {   serde_json::from_str(&self.body).expect("request body is JSON")
    }
}

struct Canned
{   status: StatusCode
  , body: String
  , delay: Duration
  , requests: Arc<Mutex<Vec<RecordedRequest>>>
}

/// Answers every request with the same status and body after
/// an optional delay, recording what it received.
pub struct MockServer
{   pub addr: SocketAddr
  , requests: Arc<Mutex<Vec<RecordedRequest>>>
  , _task: tokio::task::JoinHandle<()>
}

impl MockServer
{   pub async fn start(status: u16, body: &str) -> MockServer
    {   MockServer::start_with_delay(status, body, Duration::ZERO).await
    }

    pub async fn start_with_delay(
      status: u16
    , body: &str
    , delay: Duration
    ) -> MockServer
    {   let listener = TcpListener::bind((Ipv4Addr::LOCALHOST, 0))
          .await
          .expect("bind mock server");
        let addr = listener.local_addr().expect("mock server address");
        let requests = Arc::new(Mutex::new(Vec::new()));

        let canned = Arc::new(Canned
        {   status: StatusCode::from_u16(status).expect("valid status code")
          , body: body.to_string()
          , delay
          , requests: Arc::clone(&requests)
        });
        let app = Router::new()
          .fallback(respond)
          .with_state(canned);

        let _task = tokio::spawn(async move {
          let _ = axum::serve(listener, app).await;
        });

        MockServer
        {   addr
          , requests
          , _task
        }
    }

    pub fn base_url(&self) -> String
    {   format!("http://{}", self.addr)
    }

    pub fn requests(&self) -> Vec<RecordedRequest>
    {   self.requests.lock().expect("requests lock").clone()
    }

    pub fn request_count(&self) -> usize
    {   self.requests.lock().expect("requests lock").len()
    }
}

async fn respond(
  State(canned): State<Arc<Canned>>
, method: Method
, uri: Uri
, headers: HeaderMap
, body: String
) -> impl IntoResponse
{   let headers = headers
      .iter()
      .map(|(k, v)| {
        (k.as_str().to_string(), v.to_str().unwrap_or_default().to_string())
      })
      .collect();
    canned.requests.lock().expect("requests lock").push(RecordedRequest
    {   method: method.to_string()
      , path: uri.path().to_string()
      , headers
      , body
    });

    tokio::time::sleep(canned.delay).await;
    (
      canned.status
    , [(header::CONTENT_TYPE, "application/json")]
    , canned.body.clone()
    )
}

// ===== Fake providers =====

/// Sleeps, then returns a canned outcome. Counts its calls.
pub struct FakeProvider
{   pub name: String
  , pub delay: Duration
  , pub outcome: Outcome
  , pub calls: Arc<AtomicUsize>
}

impl FakeProvider
{   pub fn answering(name: &str, text: &str, delay: Duration) -> FakeProvider
    {   FakeProvider
        {   name: name.to_string()
          , delay
          , outcome: Ok(Completion
            {   text: text.to_string()
              , tokens: 0
              , elapsed_ms: 10
            })
          , calls: Arc::new(AtomicUsize::new(0))
        }
    }

    pub fn failing(name: &str, error: Error) -> FakeProvider
    {   FakeProvider
        {   name: name.to_string()
          , delay: Duration::ZERO
          , outcome: Err(error)
          , calls: Arc::new(AtomicUsize::new(0))
        }
    }

    pub fn call_counter(&self) -> Arc<AtomicUsize>
    {   Arc::clone(&self.calls)
    }
}

#[async_trait]
impl Provider for FakeProvider
{   fn name(&self) -> &str
    {   &self.name
    }

    async fn invoke(
      &self
    , _request: &QueryRequest
    , deadline: Instant
    ) -> Outcome
    {   self.calls.fetch_add(1, Ordering::SeqCst);
        match tokio::time::timeout_at(deadline, tokio::time::sleep(self.delay)).await
        {   Ok(()) => self.outcome.clone()
          , Err(_) => Err(Error::Timeout)
        }
    }
}

/// Panics inside its task
pub struct PanickingProvider;

#[async_trait]
impl Provider for PanickingProvider
{   fn name(&self) -> &str
    {   "Panicky"
    }

    async fn invoke(
      &self
    , _request: &QueryRequest
    , _deadline: Instant
    ) -> Outcome
    {   panic!("adapter bug")
    }
}

pub fn request(prompt: &str) -> QueryRequest
{   QueryRequest::new(prompt, 0.7, 500).expect("valid request")
}
