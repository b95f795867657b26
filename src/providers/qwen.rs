//! Qwen routed through the OpenRouter gateway

use log::debug;

pub const DISPLAY_NAME: &str = "Qwen-7B (OpenRouter)";
pub const API_BASE: &str = "https://openrouter.ai/api";
pub const CHAT_PATH: &str = "/v1/chat/completions";
pub const MODEL: &str = "qwen/qwen-2.5-72b-instruct";

/// OpenRouter attributes traffic to the calling app with these
pub const REFERER: &str = "http://localhost";
pub const TITLE: &str = "Wrapper.ai";

pub fn identity(
  config: &crate::config::ProviderConfig
) -> super::ProviderIdentity
{   let base = config.api_base.as_deref().unwrap_or(API_BASE);
    super::ProviderIdentity
    {   display_name: DISPLAY_NAME.to_string()
      , endpoint: format!("{}{}", base.trim_end_matches('/'), CHAT_PATH)
      , model: config.model.clone().unwrap_or_else(|| MODEL.to_string())
    }
}

pub fn adapter(
  config: &crate::config::ProviderConfig
) -> Result<super::ChatAdapter, crate::error::Error>
{   let identity = identity(config);
    debug!("Qwen endpoint: {}", identity.endpoint);
    Ok(super::ChatAdapter::new(
        identity
      , config.api_key.clone()
      , config.timeout()
      )?
      .with_header("HTTP-Referer", REFERER)
      .with_header("X-Title", TITLE))
}
