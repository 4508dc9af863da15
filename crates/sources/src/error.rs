use thiserror::Error;

/// A single provider call that did not produce episodes
#[derive(Error, Debug)]
pub enum ProviderError {
    #[error("{provider} request failed: {source}")]
    Http {
        provider: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("{provider} returned status {status}: {body}")]
    Status {
        provider: String,
        status: u16,
        body: String,
    },

    /// Missing or rejected credentials
    #[error("{provider} is not authenticated")]
    Unauthenticated { provider: String },

    #[error("{provider} timed out after {timeout_ms} ms")]
    Timeout { provider: String, timeout_ms: u64 },

    #[error("Malformed response from {provider}: {reason}")]
    Malformed { provider: String, reason: String },
}

impl ProviderError {
    pub fn http(provider: &str, source: reqwest::Error) -> Self {
        ProviderError::Http {
            provider: provider.to_string(),
            source,
        }
    }

    pub fn unauthenticated(provider: &str) -> Self {
        ProviderError::Unauthenticated {
            provider: provider.to_string(),
        }
    }
}

/// Every configured provider failed or came back empty
#[derive(Error, Debug, Clone, PartialEq)]
pub enum AggregateError {
    #[error("All catalog providers failed: {}", .messages.join("; "))]
    AllProvidersFailed { messages: Vec<String> },
}

pub type Result<T> = std::result::Result<T, ProviderError>;
