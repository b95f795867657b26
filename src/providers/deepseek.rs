//! DeepSeek official API

use log::debug;

pub const DISPLAY_NAME: &str = "DeepSeek (API)";
pub const API_BASE: &str = "https://api.deepseek.com";
// no /v1 prefix on this API
pub const CHAT_PATH: &str = "/chat/completions";
pub const MODEL: &str = "deepseek-chat";

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
    debug!("DeepSeek endpoint: {}", identity.endpoint);
    super::ChatAdapter::new(
      identity
    , config.api_key.clone()
    , config.timeout()
    )
}
