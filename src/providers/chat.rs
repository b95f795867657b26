//! Chat-completions wire codec shared by every provider

use std::time::Duration;
use async_trait::async_trait;
use serde::Serialize;
use serde_json::Value;
use tokio::time::Instant;
use log::{debug, trace, error};

// ===== Message Types =====

#[derive(Debug, Clone, Serialize)]
pub(crate) struct ChatMessage
{   pub role: String
  , pub content: String
}

#[derive(Debug, Clone, Serialize)]
pub(crate) struct ChatRequest
{   pub model: String
  , pub messages: Vec<ChatMessage>
  , pub temperature: f32
  , pub max_tokens: usize
}

impl ChatRequest
{   /// The prompt goes out as a single user message
    pub fn new(model: &str, request: &crate::QueryRequest) -> Self
    {   ChatRequest
        {   model: model.to_string()
          , messages: vec![
              ChatMessage
              {   role: "user".to_string()
                , content: request.prompt().to_string()
              }
            ]
          , temperature: request.temperature()
          , max_tokens: request.max_tokens()
        }
    }
}

// ===== Parse chain =====

/// Pull display text out of a decoded body.
///
/// Tried in order: first choice's message content, then the
/// `error` / `detail` field, then the whole body serialized.
/// Never fails.
pub fn extract_text(body: &Value) -> String
{   if let Some(content) = first_choice_content(body)
    {   return content;
    }
    if let Some(message) = error_text(body)
    {   return message;
    }
    body.to_string()
}

// only the first choice matters, whatever shape the rest take
fn first_choice_content(body: &Value) -> Option<String>
{   body.get("choices")
      .and_then(Value::as_array)
      .and_then(|choices| choices.first())
      .and_then(|choice| choice.pointer("/message/content"))
      .and_then(Value::as_str)
      .map(str::to_string)
}

fn error_text(body: &Value) -> Option<String>
{   for field in ["error", "detail"]
    {   match body.get(field)
        {   None | Some(Value::Null) => continue
          , Some(Value::String(message)) => {
              return Some(message.clone());
            }
          , Some(other) => {
              let message = other
                .get("message")
                .and_then(Value::as_str)
                .map(str::to_string)
                .unwrap_or_else(|| other.to_string());
              return Some(message);
            }
        }
    }
    None
}

/// Decode a raw body into display text.
///
/// HTTP status is not consulted for JSON bodies: providers put
/// their complaint in the body and the parse chain surfaces it.
/// A body that is not JSON becomes an error.
pub fn parse_body(
  status: reqwest::StatusCode
, bytes: &[u8]
) -> Result<String, crate::error::Error>
{   match serde_json::from_slice::<Value>(bytes)
    {   Ok(body) => Ok(extract_text(&body).trim().to_string())
      , Err(e) => {
          let raw = String::from_utf8_lossy(bytes);
          if status.is_success()
          {   Err(crate::error::Error::ParseError(e.to_string()))
          } else
          {   Err(crate::error::Error::ApiError(
                format!("{}: {}", status, raw.trim())
              ))
          }
        }
    }
}

// ===== Adapter =====

/// A chat-completions endpoint with its own credential, headers
/// and HTTP session.
pub struct ChatAdapter
{   identity: super::ProviderIdentity
  , api_key: Option<String>
  , extra_headers: Vec<(&'static str, String)>
  , timeout: Duration
  , http_client: reqwest::Client
}

impl ChatAdapter
{   pub fn new(
      identity: super::ProviderIdentity
    , api_key: Option<String>
    , timeout: Duration
    ) -> Result<Self, crate::error::Error>
    {   debug!("Creating ChatAdapter for {}", identity.display_name);
        let http_client = reqwest::Client::builder()
          .build()
          .map_err(|e| {
            crate::error::Error::InvalidConfiguration(e.to_string())
          })?;
        Ok(ChatAdapter
        {   identity
          , api_key
          , extra_headers: vec![]
          , timeout
          , http_client
        })
    }

    /// Attach a header sent on every call
    pub fn with_header(
      mut self
    , name: &'static str
    , value: impl Into<String>
    ) -> Self
    {   self.extra_headers.push((name, value.into()));
        self
    }

    async fn send(
      &self
    , api_key: &str
    , body: &ChatRequest
    ) -> Result<(reqwest::StatusCode, Vec<u8>), crate::error::Error>
    {   let mut builder = self.http_client
          .post(&self.identity.endpoint)
          .bearer_auth(api_key);
        for (name, value) in &self.extra_headers
        {   builder = builder.header(*name, value.as_str());
        }

        let response = builder
          .json(body)
          .send()
          .await?;

        let status = response.status();
        trace!("{} response status: {}", self.identity.display_name, status);

        let bytes = response.bytes().await?;
        Ok((status, bytes.to_vec()))
    }
}

#[async_trait]
impl super::Provider for ChatAdapter
{   fn name(&self) -> &str
    {   &self.identity.display_name
    }

    fn timeout(&self) -> Duration
    {   self.timeout
    }

    async fn invoke(
      &self
    , request: &crate::QueryRequest
    , deadline: Instant
    ) -> crate::request::Outcome
    {   let api_key = match &self.api_key
        {   Some(key) => key
          , None => {
              debug!("{}: no API key, skipping call", self.name());
              return Err(crate::error::Error::MissingApiKey(
                self.name().to_string()
              ));
            }
        };

        let body = ChatRequest::new(&self.identity.model, request);
        trace!("{} request: {:?}", self.name(), body);

        let started = Instant::now();
        let (status, bytes) = tokio::time::timeout_at(
            deadline
          , self.send(api_key, &body)
          )
          .await
          .map_err(|_| {
            error!("{}: deadline expired", self.name());
            crate::error::Error::Timeout
          })??;
        // a completed call never reports 0, that value means "no answer"
        let elapsed_ms = (started.elapsed().as_millis() as u64).max(1);

        let text = parse_body(status, &bytes)?;
        Ok(crate::request::Completion
        {   text
          , tokens: 0
          , elapsed_ms
        })
    }
}
