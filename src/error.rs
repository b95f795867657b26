use std::fmt;

/// Custom error type for wrapper operations
/// Implements Clone for sending through channels
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Error
{   /// API key is missing for a provider
    MissingApiKey(String)
  , /// HTTP request error
    HttpError(String)
  , /// API returned an error response
    ApiError(String)
  , /// Failed to parse API response
    ParseError(String)
  , /// Per-call deadline expired
    Timeout
  , /// Query request failed validation
    InvalidRequest(String)
  , /// Invalid configuration
    InvalidConfiguration(String)
  , /// No provider registered at this position
    ProviderIndexOutOfRange(usize)
  , /// No provider registered under this display name
    ProviderNotFound(String)
  , /// Prompt history could not be read or written
    History(String)
  , /// Generic error
    Other(String)
}

impl Error
{   /// Missing credentials are an expected state, not a failure
    pub fn is_missing_api_key(&self) -> bool
    {   matches!(self, Error::MissingApiKey(_))
    }
}

impl fmt::Display for Error
{   fn fmt(&self, f: &mut fmt::Formatter<'_>)
      -> fmt::Result
    {   match self
        {   Error::MissingApiKey(provider) => {
              write!(f, "Missing API key for {}", provider)
            }
          , Error::HttpError(msg) => {
              write!(f, "HTTP error: {}", msg)
            }
          , Error::ApiError(msg) => {
              write!(f, "API error: {}", msg)
            }
          , Error::ParseError(msg) => {
              write!(f, "Parse error: {}", msg)
            }
          , Error::Timeout => {
              write!(f, "Request timed out")
            }
          , Error::InvalidRequest(msg) => {
              write!(f, "Invalid request: {}", msg)
            }
          , Error::InvalidConfiguration(msg) => {
              write!(f, "Invalid configuration: {}", msg)
            }
          , Error::ProviderIndexOutOfRange(index) => {
              write!(f, "No provider at position {}", index)
            }
          , Error::ProviderNotFound(name) => {
              write!(f, "No provider named: {}", name)
            }
          , Error::History(msg) => {
              write!(f, "Prompt history error: {}", msg)
            }
          , Error::Other(msg) => {
              write!(f, "{}", msg)
            }
        }
    }
}

impl std::error::Error for Error {}

impl From<String> for Error
{   fn from(s: String) -> Self
    {   Error::Other(s)
    }
}

impl From<&str> for Error
{   fn from(s: &str) -> Self
    {   Error::Other(s.to_string())
    }
}

impl From<reqwest::Error> for Error
{   fn from(e: reqwest::Error) -> Self
    {   if e.is_timeout()
        {   Error::Timeout
        } else if e.is_decode()
        {   Error::ParseError(e.to_string())
        } else
        {   Error::HttpError(e.to_string())
        }
    }
}
