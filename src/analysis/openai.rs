//! OpenAI-backed analysis client.

use super::Analyst;
use crate::config::{AnalysisSettings, ThinkingLevel};
use crate::error::{RecapError, Result};
use crate::openai::create_client;
use async_openai::types::{
    ChatCompletionRequestMessage, ChatCompletionRequestSystemMessageArgs,
    ChatCompletionRequestUserMessageArgs, CreateChatCompletionRequestArgs, ReasoningEffort,
};
use async_trait::async_trait;
use tracing::debug;

/// Sends analysis prompts to an OpenAI reasoning model.
pub struct OpenAIAnalyst {
    client: async_openai::Client<async_openai::config::OpenAIConfig>,
    model: String,
    thinking_level: ThinkingLevel,
    system_prompt: String,
}

impl OpenAIAnalyst {
    pub fn new(settings: &AnalysisSettings, system_prompt: &str) -> Self {
        Self {
            client: create_client(),
            model: settings.model.clone(),
            thinking_level: settings.thinking_level,
            system_prompt: system_prompt.to_string(),
        }
    }

    fn reasoning_effort(&self) -> ReasoningEffort {
        match self.thinking_level {
            ThinkingLevel::Low => ReasoningEffort::Low,
            ThinkingLevel::Medium => ReasoningEffort::Medium,
            ThinkingLevel::High => ReasoningEffort::High,
        }
    }
}

#[async_trait]
impl Analyst for OpenAIAnalyst {
    async fn summarize(&self, prompt: &str) -> Result<String> {
        debug!(
            model = %self.model,
            thinking_level = %self.thinking_level,
            prompt_chars = prompt.chars().count(),
            "sending analysis request"
        );

        let messages: Vec<ChatCompletionRequestMessage> = vec![
            ChatCompletionRequestSystemMessageArgs::default()
                .content(self.system_prompt.clone())
                .build()
                .map_err(|e| RecapError::Analysis(e.to_string()))?
                .into(),
            ChatCompletionRequestUserMessageArgs::default()
                .content(prompt.to_string())
                .build()
                .map_err(|e| RecapError::Analysis(e.to_string()))?
                .into(),
        ];

        let request = CreateChatCompletionRequestArgs::default()
            .model(&self.model)
            .messages(messages)
            .reasoning_effort(self.reasoning_effort())
            .build()
            .map_err(|e| RecapError::Analysis(e.to_string()))?;

        let response = self
            .client
            .chat()
            .create(request)
            .await
            .map_err(|e| RecapError::OpenAI(format!("Analysis request failed: {}", e)))?;

        let content = response
            .choices
            .first()
            .and_then(|c| c.message.content.as_ref())
            .ok_or_else(|| RecapError::Analysis("Empty response from model".to_string()))?;

        Ok(content.trim().to_string())
    }
}
