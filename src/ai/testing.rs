//! Deterministic providers for gateway and task tests

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;

use super::provider::{GroundingSource, LlmProvider, ProviderReply, ProviderRequest};
use crate::types::{ErrorCategory, LlmError, Result};

#[derive(Debug, Clone)]
pub enum MockBehavior {
    Reply(String),
    Grounded(String, Vec<GroundingSource>),
    Fail(ErrorCategory),
    Hang,
}

pub struct MockProvider {
    name: String,
    configured: bool,
    behavior: MockBehavior,
    calls: AtomicUsize,
    last_request: Mutex<Option<ProviderRequest>>,
    call_log: Option<Arc<Mutex<Vec<String>>>>,
}

impl MockProvider {
    pub fn new(name: &str, behavior: MockBehavior) -> Self {
        Self {
            name: name.to_string(),
            configured: true,
            behavior,
            calls: AtomicUsize::new(0),
            last_request: Mutex::new(None),
            call_log: None,
        }
    }

    pub fn replying(name: &str, text: &str) -> Self {
        Self::new(name, MockBehavior::Reply(text.to_string()))
    }

    pub fn failing(name: &str, category: ErrorCategory) -> Self {
        Self::new(name, MockBehavior::Fail(category))
    }

    pub fn unconfigured(name: &str) -> Self {
        Self {
            configured: false,
            ..Self::replying(name, "should never be returned")
        }
    }

    /// Append this provider's name to `log` on every call
    pub fn logging_to(mut self, log: Arc<Mutex<Vec<String>>>) -> Self {
        self.call_log = Some(log);
        self
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn last_request(&self) -> Option<ProviderRequest> {
        self.last_request.lock().unwrap().clone()
    }
}

#[async_trait]
impl LlmProvider for MockProvider {
    async fn generate(&self, request: &ProviderRequest) -> Result<ProviderReply> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        *self.last_request.lock().unwrap() = Some(request.clone());
        if let Some(log) = &self.call_log {
            log.lock().unwrap().push(self.name.clone());
        }

        match &self.behavior {
            MockBehavior::Reply(text) => Ok(ProviderReply::text(text.clone())),
            MockBehavior::Grounded(text, sources) => Ok(ProviderReply {
                text: text.clone(),
                grounding: sources.clone(),
            }),
            MockBehavior::Fail(category) => Err(LlmError::with_provider(
                *category,
                format!("{} failed", self.name),
                &self.name,
            )
            .into()),
            MockBehavior::Hang => {
                tokio::time::sleep(Duration::from_secs(3600)).await;
                Ok(ProviderReply::text("too late"))
            }
        }
    }

    fn name(&self) -> &str {
        &self.name
    }

    fn model(&self) -> &str {
        "mock-model"
    }

    fn is_configured(&self) -> bool {
        self.configured
    }
}
