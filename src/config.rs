//! Runtime configuration for a tagging run.
//!
//! There is no config file: every setting comes from CLI flags or their
//! environment variables, falling back to the defaults defined here.
//! [`Config::validate`] is called once before the pool starts.

use std::time::Duration;

/// Default number of concurrent tagging workers
pub const DEFAULT_WORKERS: usize = 5;

/// Default cap on recognition attempts per track
pub const DEFAULT_MAX_ATTEMPTS: u32 = 5;

/// Default per-attempt recognition timeout
pub const DEFAULT_ATTEMPT_TIMEOUT: Duration = Duration::from_secs(120);

/// Default pause between recognition attempts after a transient failure
pub const DEFAULT_BACKOFF: Duration = Duration::from_secs(10);

/// Application configuration
#[derive(Debug, Clone)]
pub struct Config {
    /// Number of concurrent workers draining the queue
    pub workers: usize,

    /// Recognition retry behaviour
    pub retry: RetryPolicy,

    /// Recognition service connection settings
    pub recognition: RecognitionConfig,

    /// File extensions picked up by discovery (lowercase, no dot)
    pub extensions: Vec<String>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            workers: DEFAULT_WORKERS,
            retry: RetryPolicy::default(),
            recognition: RecognitionConfig::default(),
            extensions: vec!["mp3".to_string()],
        }
    }
}

/// Retry policy for the recognition call
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Maximum number of attempts, including the first
    pub max_attempts: u32,
    /// Upper bound on a single attempt
    pub attempt_timeout: Duration,
    /// Fixed delay before the next attempt after a transient failure
    pub backoff: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: DEFAULT_MAX_ATTEMPTS,
            attempt_timeout: DEFAULT_ATTEMPT_TIMEOUT,
            backoff: DEFAULT_BACKOFF,
        }
    }
}

/// Recognition service settings
#[derive(Debug, Clone)]
pub struct RecognitionConfig {
    /// Endpoint that accepts an audio upload and answers with recognition JSON
    pub endpoint: Option<String>,
    /// Optional API key sent with each request
    pub api_key: Option<String>,
    /// User-Agent header value
    pub user_agent: String,
}

impl Default for RecognitionConfig {
    fn default() -> Self {
        Self {
            endpoint: None,
            api_key: None,
            user_agent: concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION"))
                .to_string(),
        }
    }
}

impl Config {
    /// Check settings that would make a run meaningless.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.workers == 0 {
            return Err(ConfigError::ZeroWorkers);
        }
        if self.retry.max_attempts == 0 {
            return Err(ConfigError::ZeroAttempts);
        }
        if self.retry.attempt_timeout.is_zero() {
            return Err(ConfigError::ZeroTimeout);
        }
        if self.extensions.is_empty() {
            return Err(ConfigError::NoExtensions);
        }
        self.recognition.validate()
    }
}

impl RecognitionConfig {
    /// The endpoint must be present and use http or https.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let endpoint = self
            .endpoint
            .as_deref()
            .filter(|e| !e.trim().is_empty())
            .ok_or(ConfigError::MissingEndpoint)?;

        if !(endpoint.starts_with("http://") || endpoint.starts_with("https://")) {
            return Err(ConfigError::InvalidEndpoint(endpoint.to_string()));
        }
        Ok(())
    }
}

// ============================================================================
// Error Types
// ============================================================================

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Worker count must be at least 1")]
    ZeroWorkers,

    #[error("Recognition attempts must be at least 1")]
    ZeroAttempts,

    #[error("Recognition timeout must be greater than zero")]
    ZeroTimeout,

    #[error("At least one file extension is required")]
    NoExtensions,

    #[error("Recognition endpoint not set (use --recognition-url or AUTOTAG_RECOGNITION_URL)")]
    MissingEndpoint,

    #[error("Recognition endpoint must be an http(s) URL: {0}")]
    InvalidEndpoint(String),
}

// ============================================================================
// Tests
// ============================================================================
