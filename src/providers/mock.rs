/*!
 * Mock translation backend for testing.
 *
 * This module provides a backend that simulates different behaviors without
 * any network access:
 * - `MockProvider::working()` - Always succeeds with a tagged translation
 * - `MockProvider::uppercase()` - Always succeeds, uppercasing the text
 * - `MockProvider::failing()` - Always fails with an error
 * - `MockProvider::flaky(n)` - Fails the first `n` attempts for each text
 * - `MockProvider::failing_on(text)` - Fails only for one specific text
 * - `MockProvider::replying(text)` - Always answers with the same text
 */

use async_trait::async_trait;
use parking_lot::Mutex;
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use crate::errors::ProviderError;
use crate::providers::TranslationBackend;

/// A request seen by the mock
#[derive(Debug, Clone, PartialEq)]
pub struct MockRequest {
    /// The text to translate
    pub text: String,
    /// Source language as passed in (may be `auto`)
    pub source_language: String,
    /// Target language
    pub target_language: String,
}

/// Behavior mode for the mock provider
#[derive(Debug, Clone, PartialEq)]
pub enum MockBehavior {
    /// Always succeeds with "[TRANSLATED to xx] text"
    Working,
    /// Always succeeds with the text uppercased
    Uppercase,
    /// Always fails with an error
    Failing,
    /// Fails the first `attempts` calls for each distinct text, then works
    Flaky { attempts: usize },
    /// Fails whenever the text equals the given string
    FailOn(String),
    /// Fails with a timeout error
    TimingOut,
    /// Always succeeds with the given text
    Reply(String),
}

/// Mock provider for testing translation behavior
#[derive(Debug, Clone)]
pub struct MockProvider {
    /// Behavior mode
    behavior: MockBehavior,
    /// Total number of calls, shared between clones
    request_count: Arc<AtomicUsize>,
    /// Calls per text, used by the flaky mode
    attempts_by_text: Arc<Mutex<HashMap<String, usize>>>,
    /// Every request received, in arrival order
    requests: Arc<Mutex<Vec<MockRequest>>>,
    /// Artificial latency per text
    delays: HashMap<String, Duration>,
}

impl MockProvider {
    /// Create a new mock provider with the specified behavior
    pub fn new(behavior: MockBehavior) -> Self {
        Self {
            behavior,
            request_count: Arc::new(AtomicUsize::new(0)),
            attempts_by_text: Arc::new(Mutex::new(HashMap::new())),
            requests: Arc::new(Mutex::new(Vec::new())),
            delays: HashMap::new(),
        }
    }

    /// Create a working mock provider that always succeeds
    pub fn working() -> Self {
        Self::new(MockBehavior::Working)
    }

    /// Create a mock that uppercases every text
    pub fn uppercase() -> Self {
        Self::new(MockBehavior::Uppercase)
    }

    /// Create a failing mock provider that always errors
    pub fn failing() -> Self {
        Self::new(MockBehavior::Failing)
    }

    /// Create a mock that fails `attempts` times per text before succeeding
    pub fn flaky(attempts: usize) -> Self {
        Self::new(MockBehavior::Flaky { attempts })
    }

    /// Create a mock that fails only for one text
    pub fn failing_on(text: impl Into<String>) -> Self {
        Self::new(MockBehavior::FailOn(text.into()))
    }

    /// Create a mock that always reports a timeout
    pub fn timing_out() -> Self {
        Self::new(MockBehavior::TimingOut)
    }

    /// Create a mock that answers every call with `reply`
    pub fn replying(reply: impl Into<String>) -> Self {
        Self::new(MockBehavior::Reply(reply.into()))
    }

    /// Delay every call for `text` by `delay`
    pub fn with_delay_for(mut self, text: impl Into<String>, delay: Duration) -> Self {
        self.delays.insert(text.into(), delay);
        self
    }

    /// Number of calls made so far
    pub fn call_count(&self) -> usize {
        self.request_count.load(Ordering::SeqCst)
    }

    /// Number of calls made for one text
    pub fn calls_for(&self, text: &str) -> usize {
        self.attempts_by_text.lock().get(text).copied().unwrap_or(0)
    }

    /// Requests received so far
    pub fn requests(&self) -> Vec<MockRequest> {
        self.requests.lock().clone()
    }

    fn simulated_failure(text: &str) -> ProviderError {
        ProviderError::ApiError {
            status_code: 503,
            message: format!("Simulated provider failure for \"{}\"", text),
        }
    }
}

#[async_trait]
impl TranslationBackend for MockProvider {
    fn name(&self) -> &str {
        "Mock"
    }

    async fn translate(
        &self,
        text: &str,
        source_language: &str,
        target_language: &str,
    ) -> Result<String, ProviderError> {
        self.request_count.fetch_add(1, Ordering::SeqCst);
        let attempt = {
            let mut attempts = self.attempts_by_text.lock();
            let counter = attempts.entry(text.to_string()).or_insert(0);
            *counter += 1;
            *counter
        };
        self.requests.lock().push(MockRequest {
            text: text.to_string(),
            source_language: source_language.to_string(),
            target_language: target_language.to_string(),
        });

        if let Some(delay) = self.delays.get(text) {
            tokio::time::sleep(*delay).await;
        }

        match &self.behavior {
            MockBehavior::Working => Ok(format!("[TRANSLATED to {}] {}", target_language, text)),
            MockBehavior::Uppercase => Ok(text.to_uppercase()),
            MockBehavior::Failing => Err(Self::simulated_failure(text)),
            MockBehavior::Flaky { attempts } => {
                if attempt <= *attempts {
                    Err(Self::simulated_failure(text))
                } else {
                    Ok(text.to_uppercase())
                }
            }
            MockBehavior::FailOn(bad) => {
                if bad == text {
                    Err(Self::simulated_failure(text))
                } else {
                    Ok(text.to_uppercase())
                }
            }
            MockBehavior::TimingOut => Err(ProviderError::Timeout {
                provider: "Mock".to_string(),
                timeout_secs: 20,
            }),
            MockBehavior::Reply(reply) => Ok(reply.clone()),
        }
    }
}
