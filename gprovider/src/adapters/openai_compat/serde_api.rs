//! OpenAI-compatible HTTP payload serde models and conversion helpers.

use serde::{Deserialize, Serialize};

use crate::ProviderError;

use super::types::{
    OpenAiCompatMessage, OpenAiCompatRequest, OpenAiCompatResponse, OpenAiCompatRole,
    OpenAiCompatUsage,
};

pub(crate) fn build_api_request(
    request: OpenAiCompatRequest,
) -> Result<OpenAiCompatApiRequest, ProviderError> {
    let messages = request
        .messages
        .into_iter()
        .map(OpenAiCompatApiMessage::try_from)
        .collect::<Result<Vec<_>, _>>()?;

    if messages.is_empty() {
        return Err(ProviderError::invalid_request(
            "chat completion request requires at least one message",
        ));
    }

    Ok(OpenAiCompatApiRequest {
        model: request.model,
        messages,
        temperature: request.temperature,
        max_tokens: request.max_tokens,
        stream: request.stream,
    })
}

/// Pulls the upstream error message and machine code out of an error body.
/// The code distinguishes billing exhaustion from ordinary throttling on 429s.
pub(crate) fn extract_error_detail(body: &str) -> Option<(String, Option<String>)> {
    let parsed = serde_json::from_str::<OpenAiCompatApiErrorEnvelope>(body).ok()?;
    Some((parsed.error.message, parsed.error.code))
}

#[derive(Debug, Deserialize)]
pub(crate) struct OpenAiCompatApiErrorEnvelope {
    pub error: OpenAiCompatApiError,
}

#[derive(Debug, Deserialize)]
pub(crate) struct OpenAiCompatApiError {
    pub message: String,
    #[serde(default)]
    pub code: Option<String>,
}

#[derive(Debug, Serialize)]
pub(crate) struct OpenAiCompatApiRequest {
    pub model: String,
    pub messages: Vec<OpenAiCompatApiMessage>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_tokens: Option<u32>,
    pub stream: bool,
}

#[derive(Debug, Serialize)]
pub(crate) struct OpenAiCompatApiMessage {
    pub role: String,
    pub content: String,
}

impl TryFrom<OpenAiCompatMessage> for OpenAiCompatApiMessage {
    type Error = ProviderError;

    fn try_from(value: OpenAiCompatMessage) -> Result<Self, Self::Error> {
        if value.content.trim().is_empty() && value.role != OpenAiCompatRole::Assistant {
            return Err(ProviderError::invalid_request(
                "message content must not be empty",
            ));
        }

        Ok(Self {
            role: value.role.as_str().to_string(),
            content: value.content,
        })
    }
}

#[derive(Debug, Deserialize)]
pub(crate) struct OpenAiCompatApiResponse {
    pub model: String,
    pub choices: Vec<OpenAiCompatApiChoice>,
    pub usage: Option<OpenAiCompatApiUsage>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct OpenAiCompatApiChoice {
    pub message: OpenAiCompatApiAssistantMessage,
}

#[derive(Debug, Deserialize)]
pub(crate) struct OpenAiCompatApiAssistantMessage {
    pub content: Option<String>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct OpenAiCompatApiUsage {
    pub prompt_tokens: u32,
    pub completion_tokens: u32,
    pub total_tokens: u32,
}

impl TryFrom<OpenAiCompatApiResponse> for OpenAiCompatResponse {
    type Error = ProviderError;

    fn try_from(value: OpenAiCompatApiResponse) -> Result<Self, Self::Error> {
        let choice = value.choices.into_iter().next().ok_or_else(|| {
            ProviderError::transport("chat completion response did not include choices")
        })?;

        Ok(Self {
            model: value.model,
            content: choice.message.content.unwrap_or_default(),
            usage: value.usage.map(|usage| OpenAiCompatUsage {
                prompt_tokens: usage.prompt_tokens,
                completion_tokens: usage.completion_tokens,
                total_tokens: usage.total_tokens,
            }),
        })
    }
}

#[derive(Debug, Deserialize)]
pub(crate) struct OpenAiCompatApiStreamResponse {
    pub model: String,
    pub choices: Vec<OpenAiCompatApiStreamChoice>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct OpenAiCompatApiStreamChoice {
    pub delta: OpenAiCompatApiStreamDelta,
}

#[derive(Debug, Deserialize)]
pub(crate) struct OpenAiCompatApiStreamDelta {
    pub content: Option<String>,
}
