//! Configuration for providers and the front end
//!
//! Built once at process start and handed to the adapters by
//! reference; nothing mutates it afterwards.

use std::path::PathBuf;
use std::time::Duration;
use serde::{Deserialize, Serialize};
use log::debug;

pub const DEFAULT_TIMEOUT_SECS: u64 = 60;
pub const DEFAULT_HISTORY_FILE: &str = "prompt_history.json";

pub const TIMEOUT_VAR: &str = "WRAPPER_TIMEOUT_SECS";
pub const HISTORY_FILE_VAR: &str = "WRAPPER_HISTORY_FILE";
pub const LOG_FILE_VAR: &str = "WRAPPER_LOG_FILE";

/// Provider configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProviderConfig
{   /// Which adapter to build
    pub kind: crate::ProviderKind
  , /// Credential, `None` when not configured
    pub api_key: Option<String>
  , /// API base URL (if custom)
    pub api_base: Option<String>
  , /// Model identifier (if custom)
    pub model: Option<String>
  , /// Per-call timeout in seconds
    pub timeout_secs: u64
}

impl ProviderConfig
{   /// Default configuration for one provider, without a key
    pub fn new(kind: crate::ProviderKind) -> Self
    {   ProviderConfig
        {   kind
          , api_key: None
          , api_base: None
          , model: None
          , timeout_secs: DEFAULT_TIMEOUT_SECS
        }
    }

    pub fn with_api_key(mut self, key: impl Into<String>) -> Self
    {   self.api_key = normalize(Some(key.into()));
        self
    }

    pub fn with_api_base(mut self, base: impl Into<String>) -> Self
    {   self.api_base = Some(base.into());
        self
    }

    pub fn with_timeout_secs(mut self, secs: u64) -> Self
    {   self.timeout_secs = secs;
        self
    }

    pub fn timeout(&self) -> Duration
    {   Duration::from_secs(self.timeout_secs)
    }
}

/// Process configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig
{   /// Provider configurations, in registration order
    pub providers: Vec<ProviderConfig>
  , /// Where prompt history is kept
    pub history_file: PathBuf
  , /// Log destination, stderr when `None`
    pub log_file: Option<PathBuf>
}

impl Default for AppConfig
{   fn default() -> Self
    {   AppConfig
        {   providers: crate::ProviderKind::ALL
              .iter()
              .map(|kind| ProviderConfig::new(*kind))
              .collect()
          , history_file: PathBuf::from(DEFAULT_HISTORY_FILE)
          , log_file: None
        }
    }
}

impl AppConfig
{   /// Load from the process environment, reading `.env` first
    /// if one exists.
    pub fn from_env() -> Result<Self, crate::error::Error>
    {   match dotenvy::dotenv()
        {   Ok(path) => debug!("Loaded environment from {:?}", path)
          , Err(e) => debug!("No .env loaded: {}", e)
        }
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Load from an arbitrary variable lookup
    pub fn from_lookup<F>(lookup: F)
      -> Result<Self, crate::error::Error>
    where
      F: Fn(&str) -> Option<String>
    {   let timeout_secs = match normalize(lookup(TIMEOUT_VAR))
        {   Some(raw) => {
              let secs: u64 = raw.trim().parse().map_err(|_| {
                crate::error::Error::InvalidConfiguration(
                  format!("{} is not a number: {}", TIMEOUT_VAR, raw)
                )
              })?;
              if secs == 0
              {   return Err(crate::error::Error::InvalidConfiguration(
                    format!("{} must be positive", TIMEOUT_VAR)
                  ));
              }
              secs
            }
          , None => DEFAULT_TIMEOUT_SECS
        };

        let providers = crate::ProviderKind::ALL
          .iter()
          .map(|kind| {
            let api_key = normalize(lookup(kind.api_key_var()));
            debug!(
              "{:?}: credential {}",
              kind,
              if api_key.is_some() { "present" } else { "absent" }
            );
            ProviderConfig
            {   kind: *kind
              , api_key
              , api_base: normalize(lookup(kind.api_base_var()))
              , model: None
              , timeout_secs
            }
          })
          .collect();

        Ok(AppConfig
        {   providers
          , history_file: normalize(lookup(HISTORY_FILE_VAR))
              .map(PathBuf::from)
              .unwrap_or_else(|| PathBuf::from(DEFAULT_HISTORY_FILE))
          , log_file: normalize(lookup(LOG_FILE_VAR))
              .map(PathBuf::from)
        })
    }
}

/// Empty values count as unset
fn normalize(value: Option<String>) -> Option<String>
{   value.filter(|v| !v.trim().is_empty())
}

#[cfg(test)]
mod tests
{   use super::*;
    use std::collections::HashMap;

    fn lookup(pairs: &[(&str, &str)])
      -> impl Fn(&str) -> Option<String>
    {   let map: HashMap<String, String> = pairs
          .iter()
          .map(|(k, v)| (k.to_string(), v.to_string()))
          .collect();
        move |name| map.get(name).cloned()
    }

    #[test]
    fn empty_environment_yields_all_providers_without_keys()
    {   let config = AppConfig::from_lookup(lookup(&[])).unwrap();
        assert_eq!(config.providers.len(), 3);
        assert_eq!(config.providers[0].kind, crate::ProviderKind::Falcon);
        assert_eq!(config.providers[1].kind, crate::ProviderKind::Qwen);
        assert_eq!(config.providers[2].kind, crate::ProviderKind::DeepSeek);
        assert!(config.providers.iter().all(|p| p.api_key.is_none()));
        assert!(config.providers.iter().all(|p| p.timeout_secs == 60));
        assert_eq!(config.history_file, PathBuf::from(DEFAULT_HISTORY_FILE));
        assert!(config.log_file.is_none());
    }

    #[test]
    fn reads_keys_bases_and_timeout()
    {   let config = AppConfig::from_lookup(lookup(&[
          ("QWENAI_API_KEY", "sk-qwen")
        , ("DEEPSEEKAI_API_KEY", "")
        , ("FALCONAI_API_BASE", "http://127.0.0.1:9")
        , ("WRAPPER_TIMEOUT_SECS", "5")
        , ("WRAPPER_LOG_FILE", "wrapper.log")
        ])).unwrap();
        assert_eq!(config.providers[1].api_key.as_deref(), Some("sk-qwen"));
        assert!(config.providers[2].api_key.is_none());
        assert_eq!(
          config.providers[0].api_base.as_deref()
        , Some("http://127.0.0.1:9")
        );
        assert!(config.providers.iter().all(|p| p.timeout_secs == 5));
        assert_eq!(config.log_file, Some(PathBuf::from("wrapper.log")));
    }

    #[test]
    fn rejects_bad_timeout()
    {   let err = AppConfig::from_lookup(
          lookup(&[("WRAPPER_TIMEOUT_SECS", "soon")])
        ).unwrap_err();
        assert!(matches!(err, crate::error::Error::InvalidConfiguration(_)));
        assert!(AppConfig::from_lookup(
          lookup(&[("WRAPPER_TIMEOUT_SECS", "0")])
        ).is_err());
    }

    #[test]
    fn blank_key_is_absent()
    {   let config = ProviderConfig::new(crate::ProviderKind::Falcon)
          .with_api_key("  ");
        assert!(config.api_key.is_none());
    }
}
