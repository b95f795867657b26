pub mod error;
pub mod config;
pub mod providers;
pub mod request;
pub mod coordinator;
pub mod client;
pub mod history;
use serde::{Deserialize, Serialize};

pub use client::WrapperBackend;
pub use coordinator::Coordinator;
pub use request::{ProviderResult, QueryRequest, ResultSet};

/*

wrapper-ai sends one prompt to every configured LLM provider at
once and hands back one result per provider, in a fixed order, so
the answers can be compared side by side. A provider that has no
key, times out, or answers with garbage still gets its row.

src/
├── lib.rs          # Backend API types and provider kinds
├── error.rs        # Error enum shared by every layer
├── config.rs       # Immutable process configuration
├── request.rs      # QueryRequest, ProviderResult, ResultSet
├── providers/      # One adapter per provider over a shared
│   ├── mod.rs      #   chat-completions wire codec
│   ├── chat.rs
│   ├── falcon.rs
│   ├── qwen.rs
│   └── deepseek.rs
├── coordinator.rs  # Concurrent fan-out and join
├── client.rs       # Channel-driven backend task
├── history.rs      # Prompt history file
└── main.rs         # Terminal front end

*/

/// WRAPPER API INTERFACE:

// ===== QueryAll =====

pub type QueryAllReply = crate::ResultSet;
pub type QueryAllReplySender
  = tokio::sync::mpsc::UnboundedSender<QueryAllReply>;

pub struct QueryAllArgs
{   pub request: crate::QueryRequest
  , pub reply: QueryAllReplySender
}

// ===== Regenerate =====

pub type RegenerateReply
  = Result<(usize, crate::ProviderResult), crate::error::Error>;
pub type RegenerateReplySender
  = tokio::sync::mpsc::UnboundedSender<RegenerateReply>;

pub struct RegenerateArgs
{   pub index: usize
  , pub request: crate::QueryRequest
  , pub reply: RegenerateReplySender
}

// ===== KillProcess =====

pub type KillProcessReply = Result<(), crate::error::Error>;
pub type KillProcessReplySender
  = tokio::sync::mpsc::UnboundedSender<KillProcessReply>;

pub struct KillProcessArgs
{   pub reply: KillProcessReplySender
}

// ===== WrapperHand (sender side) =====

pub struct WrapperHand
{   pub query_all_tx
      : tokio::sync::mpsc::UnboundedSender<QueryAllArgs>
  , pub regenerate_tx
      : tokio::sync::mpsc::UnboundedSender<RegenerateArgs>
  , pub kill_process_tx
      : tokio::sync::mpsc::UnboundedSender<KillProcessArgs>
}

// ===== WrapperFoot (receiver side) =====

pub struct WrapperFoot
{   pub query_all_rx
      : tokio::sync::mpsc::UnboundedReceiver<QueryAllArgs>
  , pub regenerate_rx
      : tokio::sync::mpsc::UnboundedReceiver<RegenerateArgs>
  , pub kill_process_rx
      : tokio::sync::mpsc::UnboundedReceiver<KillProcessArgs>
}

/// WRAPPER STRUCTURES:

/// The providers wired into the default configuration.
/// Registration order follows declaration order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize, Hash)]
pub enum ProviderKind
{   /// Falcon on the AI71 platform
    Falcon
  , /// Qwen routed through OpenRouter
    Qwen
  , /// DeepSeek official API
    DeepSeek
}

impl ProviderKind
{   /// Every kind, in registration order
    pub const ALL: [ProviderKind; 3] = [
      ProviderKind::Falcon
    , ProviderKind::Qwen
    , ProviderKind::DeepSeek
    ];

    /// Environment variable holding this provider's credential
    pub fn api_key_var(&self) -> &'static str
    {   match self
        {   ProviderKind::Falcon => "FALCONAI_API_KEY"
          , ProviderKind::Qwen => "QWENAI_API_KEY"
          , ProviderKind::DeepSeek => "DEEPSEEKAI_API_KEY"
        }
    }

    /// Environment variable overriding this provider's base URL
    pub fn api_base_var(&self) -> &'static str
    {   match self
        {   ProviderKind::Falcon => "FALCONAI_API_BASE"
          , ProviderKind::Qwen => "QWENAI_API_BASE"
          , ProviderKind::DeepSeek => "DEEPSEEKAI_API_BASE"
        }
    }
}
