//! Mock providers for unit tests.

use async_trait::async_trait;
use parking_lot::Mutex;
use std::time::Duration;

use crate::providers::{
    ChatMessage, CompletionConfig, CompletionResponse, LlmProvider, ProviderError, TokenUsage,
};

/// One request as seen by a [`ScriptedProvider`].
#[derive(Debug, Clone)]
pub(crate) struct RecordedCall {
    pub system: String,
    pub prompt: String,
    pub max_tokens: u32,
}

type Responder = dyn Fn(&RecordedCall) -> Result<String, ProviderError> + Send + Sync;
type Delay = dyn Fn(&RecordedCall) -> Duration + Send + Sync;

/// Provider whose answers come from a closure over the incoming request.
pub(crate) struct ScriptedProvider {
    responder: Box<Responder>,
    delay: Option<Box<Delay>>,
    usage: Option<TokenUsage>,
    healthy: bool,
    calls: Mutex<Vec<RecordedCall>>,
}

impl ScriptedProvider {
    pub fn from_fn(
        responder: impl Fn(&RecordedCall) -> Result<String, ProviderError> + Send + Sync + 'static,
    ) -> Self {
        Self {
            responder: Box::new(responder),
            delay: None,
            usage: None,
            healthy: true,
            calls: Mutex::new(Vec::new()),
        }
    }

    /// Answer every call with the same text.
    pub fn always(text: &str) -> Self {
        let text = text.to_string();
        Self::from_fn(move |_| Ok(text.clone()))
    }

    /// Answer every call with its own user prompt.
    pub fn echo() -> Self {
        Self::from_fn(|call| Ok(call.prompt.clone()))
    }

    /// Fail every call with the same error.
    pub fn failing(error: ProviderError) -> Self {
        Self::from_fn(move |_| Err(error.clone()))
    }

    pub fn with_delay(self, delay: Duration) -> Self {
        self.with_delay_fn(move |_| delay)
    }

    /// Delay each call by an amount chosen from the request.
    pub fn with_delay_fn(
        mut self,
        delay: impl Fn(&RecordedCall) -> Duration + Send + Sync + 'static,
    ) -> Self {
        self.delay = Some(Box::new(delay));
        self
    }

    /// Report this usage for every call instead of an estimate.
    pub fn with_usage(mut self, usage: TokenUsage) -> Self {
        self.usage = Some(usage);
        self
    }

    pub fn unhealthy(mut self) -> Self {
        self.healthy = false;
        self
    }

    pub fn calls(&self) -> Vec<RecordedCall> {
        self.calls.lock().clone()
    }
}

#[async_trait]
impl LlmProvider for ScriptedProvider {
    async fn complete(
        &self,
        messages: Vec<ChatMessage>,
        config: &CompletionConfig,
    ) -> Result<CompletionResponse, ProviderError> {
        let mut call = RecordedCall {
            system: String::new(),
            prompt: String::new(),
            max_tokens: config.max_tokens,
        };
        for message in messages {
            match message.role.as_str() {
                "system" => call.system = message.content,
                _ => call.prompt = message.content,
            }
        }
        self.calls.lock().push(call.clone());

        if let Some(delay) = &self.delay {
            tokio::time::sleep(delay(&call)).await;
        }

        let content = (self.responder)(&call)?;
        let usage = self.usage.unwrap_or_else(|| TokenUsage {
            prompt_tokens: self.estimate_tokens(&call.prompt).max(1),
            completion_tokens: self.estimate_tokens(&content).max(1),
        });
        Ok(CompletionResponse {
            usage,
            content,
            model: config.model.clone(),
            stop_reason: Some("stop".to_string()),
        })
    }

    async fn health_check(&self) -> bool {
        self.healthy
    }

    fn name(&self) -> &str {
        "scripted"
    }
}
