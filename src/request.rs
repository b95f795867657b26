//! Unified request and result types

use serde::{Deserialize, Serialize};

pub const DEFAULT_TEMPERATURE: f32 = 0.7;
pub const DEFAULT_MAX_TOKENS: usize = 500;
pub const MIN_TEMPERATURE: f32 = 0.0;
pub const MAX_TEMPERATURE: f32 = 1.0;
pub const MIN_MAX_TOKENS: usize = 100;
pub const MAX_MAX_TOKENS: usize = 2000;

/// One user action: the same prompt and sampling knobs go to
/// every provider.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct QueryRequest
{   prompt: String
  , temperature: f32
  , max_tokens: usize
}

impl QueryRequest
{   /// Validate and build a request.
    ///
    /// The prompt must contain something besides whitespace, the
    /// temperature must be finite and max_tokens positive. Range
    /// clamping is left to the front end, see [`clamp_temperature`]
    /// and [`clamp_max_tokens`].
    pub fn new(
      prompt: impl Into<String>
    , temperature: f32
    , max_tokens: usize
    ) -> Result<Self, crate::error::Error>
    {   let prompt = prompt.into();
        if prompt.trim().is_empty()
        {   return Err(crate::error::Error::InvalidRequest(
              "prompt is empty".to_string()
            ));
        }
        if !temperature.is_finite()
        {   return Err(crate::error::Error::InvalidRequest(
              format!("temperature {} is not finite", temperature)
            ));
        }
        if max_tokens == 0
        {   return Err(crate::error::Error::InvalidRequest(
              "max_tokens must be positive".to_string()
            ));
        }
        Ok(QueryRequest
        {   prompt
          , temperature
          , max_tokens
        })
    }

    pub fn prompt(&self) -> &str
    {   &self.prompt
    }

    pub fn temperature(&self) -> f32
    {   self.temperature
    }

    pub fn max_tokens(&self) -> usize
    {   self.max_tokens
    }

    /// First 40 characters of the prompt, for log lines
    pub fn prompt_prefix(&self) -> &str
    {   match self.prompt.char_indices().nth(40)
        {   Some((at, _)) => &self.prompt[..at]
          , None => &self.prompt
        }
    }
}

/// Clamp to the 0.0..=1.0 range a front end should offer.
/// NaN falls back to the default.
pub fn clamp_temperature(temperature: f32) -> f32
{   if temperature.is_nan()
    {   return DEFAULT_TEMPERATURE;
    }
    temperature.clamp(MIN_TEMPERATURE, MAX_TEMPERATURE)
}

/// Clamp to the 100..=2000 range a front end should offer
pub fn clamp_max_tokens(max_tokens: usize) -> usize
{   max_tokens.clamp(MIN_MAX_TOKENS, MAX_MAX_TOKENS)
}

/// What an adapter produced when the provider answered
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Completion
{   /// Extracted and trimmed response text
    pub text: String
  , /// Tokens used, 0 when the provider does not report usage
    pub tokens: usize
  , /// Send-to-body-read wall time
    pub elapsed_ms: u64
}

/// Typed adapter outcome, flattened by the coordinator
pub type Outcome = Result<Completion, crate::error::Error>;

/// Display-ready result for one provider
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProviderResult
{   /// Provider display name
    pub model: String
  , /// Response text, or a notice when no response was obtained
    pub response: String
  , /// Tokens used
    pub tokens: usize
  , /// Elapsed milliseconds, 0 when the call never completed
    pub time_ms: u64
}

/// One result per configured provider, in registration order
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResultSet
{   results: Vec<ProviderResult>
}

impl ResultSet
{   pub fn new(results: Vec<ProviderResult>) -> Self
    {   ResultSet { results }
    }

    pub fn len(&self) -> usize
    {   self.results.len()
    }

    pub fn is_empty(&self) -> bool
    {   self.results.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&ProviderResult>
    {   self.results.get(index)
    }

    pub fn iter(&self) -> std::slice::Iter<'_, ProviderResult>
    {   self.results.iter()
    }

    /// Merge a regenerated result into position `index`
    pub fn replace(
      &mut self
    , index: usize
    , result: ProviderResult
    ) -> Result<ProviderResult, crate::error::Error>
    {   match self.results.get_mut(index)
        {   Some(slot) => Ok(std::mem::replace(slot, result))
          , None => Err(
              crate::error::Error::ProviderIndexOutOfRange(index)
            )
        }
    }

    /// Mean elapsed time over results that actually completed.
    /// `None` when nothing did.
    pub fn average_elapsed_ms(&self) -> Option<f64>
    {   let timed: Vec<u64> = self.results
          .iter()
          .filter(|r| r.time_ms > 0)
          .map(|r| r.time_ms)
          .collect();
        if timed.is_empty()
        {   return None;
        }
        let total: u64 = timed.iter().sum();
        Some(total as f64 / timed.len() as f64)
    }
}

impl<'a> IntoIterator for &'a ResultSet
{   type Item = &'a ProviderResult;
    type IntoIter = std::slice::Iter<'a, ProviderResult>;

    fn into_iter(self) -> Self::IntoIter
    {   self.results.iter()
    }
}

#[cfg(test)]
mod tests
{   use super::*;

    fn result(model: &str, time_ms: u64) -> ProviderResult
    {   ProviderResult
        {   model: model.to_string()
          , response: "ok".to_string()
          , tokens: 0
          , time_ms
        }
    }

    #[test]
    fn rejects_blank_prompt()
    {   let err = QueryRequest::new("   \n", 0.7, 500).unwrap_err();
        assert!(matches!(err, crate::error::Error::InvalidRequest(_)));
    }

    #[test]
    fn rejects_zero_max_tokens_and_nan_temperature()
    {   assert!(QueryRequest::new("hi", 0.7, 0).is_err());
        assert!(QueryRequest::new("hi", f32::NAN, 500).is_err());
    }

    #[test]
    fn prompt_prefix_respects_char_boundaries()
    {   let prompt = "é".repeat(50);
        let request = QueryRequest::new(prompt, 0.5, 100).unwrap();
        assert_eq!(request.prompt_prefix().chars().count(), 40);

        let short = QueryRequest::new("short", 0.5, 100).unwrap();
        assert_eq!(short.prompt_prefix(), "short");
    }

    #[test]
    fn clamps_to_front_end_ranges()
    {   assert_eq!(clamp_temperature(1.7), 1.0);
        assert_eq!(clamp_temperature(-0.2), 0.0);
        assert_eq!(clamp_temperature(f32::NAN), DEFAULT_TEMPERATURE);
        assert_eq!(clamp_max_tokens(5), 100);
        assert_eq!(clamp_max_tokens(9000), 2000);
        assert_eq!(clamp_max_tokens(750), 750);
    }

    #[test]
    fn average_ignores_zero_elapsed()
    {   let set = ResultSet::new(vec![
          result("a", 100)
        , result("b", 0)
        , result("c", 300)
        ]);
        assert_eq!(set.average_elapsed_ms(), Some(200.0));
    }

    #[test]
    fn average_is_none_without_completed_calls()
    {   let set = ResultSet::new(vec![result("a", 0), result("b", 0)]);
        assert_eq!(set.average_elapsed_ms(), None);
        assert_eq!(ResultSet::default().average_elapsed_ms(), None);
    }

    #[test]
    fn replace_only_touches_one_slot()
    {   let mut set = ResultSet::new(vec![
          result("a", 1)
        , result("b", 2)
        , result("c", 3)
        ]);
        let old = set.replace(1, result("b", 42)).unwrap();
        assert_eq!(old.time_ms, 2);
        assert_eq!(set.get(0), Some(&result("a", 1)));
        assert_eq!(set.get(1), Some(&result("b", 42)));
        assert_eq!(set.get(2), Some(&result("c", 3)));
        assert_eq!(
          set.replace(3, result("d", 4))
        , Err(crate::error::Error::ProviderIndexOutOfRange(3))
        );
    }
}
