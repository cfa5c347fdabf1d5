//! Wenxin (Baidu ERNIE) provider with its own wire envelope.
//!
//! The ERNIE endpoint authenticates through an `access_token` query parameter
//! rather than a bearer header, replies with a flat `{"result": ...}`
//! envelope, and reports errors in-band with a 200 status.

use std::sync::Arc;

use reqwest::Client;
use serde::{Deserialize, Serialize};

use crate::{
    BoxedEventStream, CallAuth, Message, ModelProvider, ModelRequest, ModelResponse, ProviderError,
    ProviderFamily, ProviderFuture, Role, StreamEvent, VecEventStream,
};

pub const WENXIN_DEFAULT_URL: &str =
    "https://aip.baidubce.com/rpc/2.0/ai_custom/v1/wenxinworkshop/chat/completions";

#[derive(Debug, Clone, PartialEq)]
pub struct WenxinRequest {
    pub messages: Vec<WenxinMessage>,
    pub temperature: Option<f32>,
    pub max_output_tokens: Option<u32>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct WenxinMessage {
    pub role: String,
    pub content: String,
}

impl From<Message> for WenxinMessage {
    fn from(value: Message) -> Self {
        // ERNIE rejects a "system" role inside the message list.
        let role = match value.role {
            Role::Assistant => "assistant",
            Role::System | Role::User => "user",
        };

        Self {
            role: role.to_string(),
            content: value.content,
        }
    }
}

pub trait WenxinTransport: Send + Sync {
    fn complete<'a>(
        &'a self,
        request: WenxinRequest,
        auth: CallAuth,
    ) -> ProviderFuture<'a, Result<String, ProviderError>>;
}

#[derive(Debug, Clone)]
pub struct WenxinHttpTransport {
    client: Client,
}

impl WenxinHttpTransport {
    pub fn new(client: Client) -> Self {
        Self { client }
    }
}

impl WenxinTransport for WenxinHttpTransport {
    fn complete<'a>(
        &'a self,
        request: WenxinRequest,
        auth: CallAuth,
    ) -> ProviderFuture<'a, Result<String, ProviderError>> {
        Box::pin(async move {
            let url = auth
                .endpoint
                .clone()
                .unwrap_or_else(|| WENXIN_DEFAULT_URL.to_string());
            let body = WenxinApiRequest {
                messages: request.messages,
                temperature: request.temperature,
                max_output_tokens: request.max_output_tokens,
            };

            let response = self
                .client
                .post(url)
                .query(&[("access_token", auth.api_key.expose())])
                .json(&body)
                .send()
                .await
                .map_err(|err| {
                    if err.is_timeout() {
                        ProviderError::timeout(err.to_string())
                    } else {
                        ProviderError::transport(err.to_string())
                    }
                })?;

            let status = response.status();
            let text = response
                .text()
                .await
                .map_err(|err| ProviderError::transport(err.to_string()))?;

            if !status.is_success() {
                return Err(if status.is_server_error() {
                    ProviderError::unavailable(format!("wenxin request failed with status {status}"))
                } else {
                    ProviderError::transport(format!("wenxin request failed with status {status}"))
                });
            }

            let parsed: WenxinApiResponse = serde_json::from_str(&text)
                .map_err(|err| ProviderError::transport(err.to_string()))?;
            parsed.into_result()
        })
    }
}

#[derive(Debug, Serialize)]
struct WenxinApiRequest {
    messages: Vec<WenxinMessage>,
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    max_output_tokens: Option<u32>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct WenxinApiResponse {
    result: Option<String>,
    error_code: Option<i64>,
    error_msg: Option<String>,
}

impl WenxinApiResponse {
    pub(crate) fn into_result(self) -> Result<String, ProviderError> {
        if let Some(code) = self.error_code {
            let message = self
                .error_msg
                .unwrap_or_else(|| format!("wenxin error {code}"));
            return Err(classify_wenxin_error(code, message));
        }

        self.result
            .ok_or_else(|| ProviderError::transport("wenxin response did not include a result"))
    }
}

// Error codes per the ERNIE API reference: 17 daily quota, 18 QPS throttle,
// 110/111 token invalid or expired.
pub(crate) fn classify_wenxin_error(code: i64, message: String) -> ProviderError {
    match code {
        17 => ProviderError::quota_exhausted(message),
        18 => ProviderError::rate_limited(message),
        110 | 111 => ProviderError::authentication(message),
        _ => ProviderError::other(message),
    }
}

#[derive(Clone)]
pub struct WenxinProvider {
    transport: Arc<dyn WenxinTransport>,
    fallback_model: String,
}

impl WenxinProvider {
    pub fn new(transport: Arc<dyn WenxinTransport>) -> Self {
        Self {
            transport,
            fallback_model: "ernie-bot".to_string(),
        }
    }

    pub fn with_fallback_model(mut self, model: impl Into<String>) -> Self {
        self.fallback_model = model.into();
        self
    }

    pub fn default_http_transport(client: Client) -> WenxinHttpTransport {
        WenxinHttpTransport::new(client)
    }

    fn build_request(&self, request: &ModelRequest) -> WenxinRequest {
        WenxinRequest {
            messages: request
                .messages
                .iter()
                .cloned()
                .map(WenxinMessage::from)
                .collect(),
            temperature: request.options.temperature,
            max_output_tokens: request.options.max_tokens,
        }
    }

    fn model_for(&self, request: &ModelRequest) -> String {
        if request.model.trim().is_empty() {
            self.fallback_model.clone()
        } else {
            request.model.clone()
        }
    }
}

impl ModelProvider for WenxinProvider {
    fn family(&self) -> ProviderFamily {
        ProviderFamily::Wenxin
    }

    fn complete<'a>(
        &'a self,
        request: ModelRequest,
        auth: CallAuth,
    ) -> ProviderFuture<'a, Result<ModelResponse, ProviderError>> {
        Box::pin(async move {
            request.validate()?;
            let wire_request = self.build_request(&request);
            let result = self.transport.complete(wire_request, auth).await?;

            Ok(ModelResponse {
                family: ProviderFamily::Wenxin,
                model: self.model_for(&request),
                text: result,
                // The flat envelope carries no usage block.
                usage: None,
            })
        })
    }

    /// ERNIE offers no SSE surface for this envelope, so streaming is a
    /// single-shot completion replayed as one delta plus the terminal event.
    fn stream<'a>(
        &'a self,
        request: ModelRequest,
        auth: CallAuth,
    ) -> ProviderFuture<'a, Result<BoxedEventStream<'a>, ProviderError>> {
        Box::pin(async move {
            let response = self.complete(request, auth).await?;
            let stream = VecEventStream::new(vec![
                Ok(StreamEvent::TextDelta(response.text.clone())),
                Ok(StreamEvent::ResponseComplete(response)),
            ]);
            Ok(Box::pin(stream) as BoxedEventStream<'a>)
        })
    }
}
