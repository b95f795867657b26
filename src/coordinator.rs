//! Concurrent fan-out of one request to every provider

use std::sync::Arc;
use futures::future::join_all;
use tokio::time::Instant;
use log::{debug, info, warn, error};

use crate::providers::Provider;
use crate::request::{Outcome, ProviderResult, QueryRequest, ResultSet};

/// Holds the adapters in registration order.
///
/// Stateless across calls: it never remembers earlier results, so
/// a caller that regenerates one provider merges the replacement
/// into its own [`ResultSet`].
#[derive(Clone)]
pub struct Coordinator
{   providers: Vec<Arc<dyn Provider>>
}

impl Coordinator
{   pub fn new(providers: Vec<Arc<dyn Provider>>) -> Self
    {   debug!("Creating Coordinator with {} providers", providers.len());
        Coordinator { providers }
    }

    /// Build adapters for every configured provider
    pub fn from_config(
      config: &crate::config::AppConfig
    ) -> Result<Self, crate::error::Error>
    {   Ok(Coordinator::new(
          crate::providers::build_providers(config)?
        ))
    }

    pub fn len(&self) -> usize
    {   self.providers.len()
    }

    pub fn is_empty(&self) -> bool
    {   self.providers.is_empty()
    }

    /// Display names in registration order
    pub fn names(&self) -> Vec<String>
    {   self.providers
          .iter()
          .map(|p| p.name().to_string())
          .collect()
    }

    /// Position of the provider with this display name
    pub fn position(&self, name: &str) -> Option<usize>
    {   self.providers.iter().position(|p| p.name() == name)
    }

    /// Query every provider at once and wait for all of them.
    ///
    /// Always returns exactly one result per provider, in
    /// registration order.
    pub async fn query_all(&self, request: &QueryRequest) -> ResultSet
    {   debug!(
          "query_all fanning out to {} providers",
          self.providers.len()
        );
        let request = Arc::new(request.clone());

        let handles: Vec<_> = self.providers
          .iter()
          .map(|provider| {
            let provider = Arc::clone(provider);
            let request = Arc::clone(&request);
            tokio::spawn(async move {
              invoke(provider.as_ref(), &request).await
            })
          })
          .collect();

        // barrier: every task reaches a terminal state before we return
        let joined = join_all(handles).await;

        let results = joined
          .into_iter()
          .zip(&self.providers)
          .map(|(joined, provider)| match joined
          {   Ok(result) => result
            , Err(e) => {
                error!("[{}] task failed: {}", provider.name(), e);
                flatten(
                  provider.name()
                , &request
                , Err(crate::error::Error::Other(e.to_string()))
                )
              }
          })
          .collect();

        ResultSet::new(results)
    }

    /// Re-run only the provider at `index`
    pub async fn regenerate(
      &self
    , index: usize
    , request: &QueryRequest
    ) -> Result<ProviderResult, crate::error::Error>
    {   let provider = self.providers
          .get(index)
          .ok_or(crate::error::Error::ProviderIndexOutOfRange(index))?;
        debug!("Regenerating {} at position {}", provider.name(), index);
        Ok(invoke(provider.as_ref(), request).await)
    }

    /// Re-run only the provider with this display name
    pub async fn regenerate_named(
      &self
    , name: &str
    , request: &QueryRequest
    ) -> Result<(usize, ProviderResult), crate::error::Error>
    {   let index = self.position(name)
          .ok_or_else(|| {
            crate::error::Error::ProviderNotFound(name.to_string())
          })?;
        let result = self.regenerate(index, request).await?;
        Ok((index, result))
    }
}

/// Run one adapter under its own deadline and flatten the outcome.
/// Never fails.
pub async fn invoke(
  provider: &dyn Provider
, request: &QueryRequest
) -> ProviderResult
{   let deadline = Instant::now() + provider.timeout();
    let outcome = provider.invoke(request, deadline).await;
    flatten(provider.name(), request, outcome)
}

/// Turn a typed outcome into the display shape.
///
/// Failures get elapsed 0 so they stand apart from slow successes.
pub fn flatten(
  name: &str
, request: &QueryRequest
, outcome: Outcome
) -> ProviderResult
{   match outcome
    {   Ok(completion) => {
          info!(
            "[{}] Prompt: {}... | Time: {}ms",
            name,
            request.prompt_prefix(),
            completion.elapsed_ms
          );
          ProviderResult
          {   model: name.to_string()
            , response: completion.text
            , tokens: completion.tokens
            , time_ms: completion.elapsed_ms
          }
        }
      , Err(e) if e.is_missing_api_key() => {
          warn!("[{}] skipped: {}", name, e);
          ProviderResult
          {   model: name.to_string()
            , response: format!("⚠️ {}", e)
            , tokens: 0
            , time_ms: 0
          }
        }
      , Err(e) => {
          error!(
            "[{}] Prompt: {}... | Error: {}",
            name,
            request.prompt_prefix(),
            e
          );
          ProviderResult
          {   model: name.to_string()
            , response: format!("Error: {}", e)
            , tokens: 0
            , time_ms: 0
          }
        }
    }
}
