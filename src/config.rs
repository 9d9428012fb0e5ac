//! Configuration types for the analysis service.
//!
//! All service behaviour is controlled through [`ServiceConfig`], built via
//! its [`ServiceConfigBuilder`]. Keeping the knobs in one struct makes it
//! trivial to share the config across handlers and to construct a fully
//! in-process service in tests.

use crate::error::ClarityError;
use crate::llm::LlmProvider;
use std::fmt;
use std::sync::Arc;

/// Model used when neither the builder nor the environment names one.
pub const DEFAULT_MODEL: &str = "gemini-1.5-flash";

/// Configuration for the analysis service.
///
/// Built via [`ServiceConfig::builder()`] or using
/// [`ServiceConfig::default()`].
///
/// # Example
/// ```rust
/// use clarity_ai::ServiceConfig;
///
/// let config = ServiceConfig::builder()
///     .model("gemini-1.5-flash")
///     .llm_timeout_secs(30)
///     .build()
///     .unwrap();
/// ```
#[derive(Clone)]
pub struct ServiceConfig {
    /// Gemini model identifier. Default: [`DEFAULT_MODEL`].
    ///
    /// A flash-tier model answers a single analysis prompt in a couple of
    /// seconds, which is what an interactive page can tolerate. Heavier
    /// models work unchanged but push every request towards the timeout.
    pub model: String,

    /// Pre-constructed LLM provider. Takes precedence over the
    /// `GEMINI_API_KEY` environment credential.
    ///
    /// This is the injection point for tests: hand in a canned provider and
    /// the service never touches the network.
    pub provider: Option<Arc<dyn LlmProvider>>,

    /// Per-generation-call timeout in seconds. Default: 60.
    ///
    /// An analysis prompt carries up to 8,000 characters of extracted text,
    /// so very short timeouts produce spurious failures; without any bound a
    /// stalled upstream would hang the request forever. Clamped to 1-300.
    pub llm_timeout_secs: u64,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            model: DEFAULT_MODEL.to_string(),
            provider: None,
            llm_timeout_secs: 60,
        }
    }
}

impl fmt::Debug for ServiceConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ServiceConfig")
            .field("model", &self.model)
            .field("provider", &self.provider.as_ref().map(|_| "<dyn LlmProvider>"))
            .field("llm_timeout_secs", &self.llm_timeout_secs)
            .finish()
    }
}

impl ServiceConfig {
    /// Create a new builder for `ServiceConfig`.
    pub fn builder() -> ServiceConfigBuilder {
        ServiceConfigBuilder {
            config: Self::default(),
        }
    }
}

/// Builder for [`ServiceConfig`].
#[derive(Debug)]
pub struct ServiceConfigBuilder {
    config: ServiceConfig,
}

impl ServiceConfigBuilder {
    pub fn model(mut self, model: impl Into<String>) -> Self {
        self.config.model = model.into();
        self
    }

    pub fn provider(mut self, provider: Arc<dyn LlmProvider>) -> Self {
        self.config.provider = Some(provider);
        self
    }

    pub fn llm_timeout_secs(mut self, secs: u64) -> Self {
        self.config.llm_timeout_secs = secs.clamp(1, 300);
        self
    }

    /// Build the configuration, validating constraints.
    pub fn build(self) -> Result<ServiceConfig, ClarityError> {
        let c = &self.config;
        if c.model.trim().is_empty() {
            return Err(ClarityError::InvalidConfig(
                "Model name must not be empty".into(),
            ));
        }
        if c.llm_timeout_secs == 0 || c.llm_timeout_secs > 300 {
            return Err(ClarityError::InvalidConfig(format!(
                "LLM timeout must be 1-300 seconds, got {}",
                c.llm_timeout_secs
            )));
        }
        Ok(self.config)
    }
}
