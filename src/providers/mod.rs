//! LLM provider implementations
//!
//! All three providers speak a chat-completions dialect, so the
//! wire codec and parse chain live in [`chat`] and each provider
//! module only pins down its identity and headers.

pub mod chat;
pub mod deepseek;
pub mod falcon;
pub mod qwen;

use std::sync::Arc;
use async_trait::async_trait;
use tokio::time::Instant;
use log::debug;

pub use chat::ChatAdapter;

/// Static per-adapter identity
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProviderIdentity
{   /// Name shown to the user, e.g. "Falcon-7B (AI71)"
    pub display_name: String
  , /// Full chat-completions URL
    pub endpoint: String
  , /// Model identifier sent in the request body
    pub model: String
}

/// One provider behind the common query interface.
///
/// `invoke` returns a typed outcome; the coordinator turns it into
/// a display-ready [`crate::ProviderResult`]. Implementations must
/// give up once `deadline` passes.
#[async_trait]
pub trait Provider: Send + Sync
{   /// Display name used in results and logs
    fn name(&self) -> &str;

    async fn invoke(
      &self
    , request: &crate::QueryRequest
    , deadline: Instant
    ) -> crate::request::Outcome;

    /// Upper bound for a single call
    fn timeout(&self) -> std::time::Duration
    {   std::time::Duration::from_secs(
          crate::config::DEFAULT_TIMEOUT_SECS
        )
    }
}

/// Build the adapter for one provider configuration
pub fn build_provider(
  config: &crate::config::ProviderConfig
) -> Result<Arc<dyn Provider>, crate::error::Error>
{   debug!("Building adapter for {:?}", config.kind);
    let adapter = match config.kind
    {   crate::ProviderKind::Falcon => falcon::adapter(config)?
      , crate::ProviderKind::Qwen => qwen::adapter(config)?
      , crate::ProviderKind::DeepSeek => deepseek::adapter(config)?
    };
    Ok(Arc::new(adapter))
}

/// Build every configured adapter, keeping configuration order
pub fn build_providers(
  config: &crate::config::AppConfig
) -> Result<Vec<Arc<dyn Provider>>, crate::error::Error>
{   config.providers
      .iter()
      .map(build_provider)
      .collect()
}
