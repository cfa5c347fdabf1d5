//! OpenAI-compatible transport trait and reqwest-based HTTP implementation.

use std::pin::Pin;

use async_stream::try_stream;
use futures_core::Stream;
use futures_util::StreamExt;
use reqwest::{Client, Response, StatusCode};

use crate::{CallAuth, ProviderError, ProviderFuture};

use super::serde_api::{OpenAiCompatApiStreamResponse, build_api_request, extract_error_detail};
use super::types::{OpenAiCompatRequest, OpenAiCompatResponse, OpenAiCompatStreamChunk};

pub const DEFAULT_COMPLETIONS_URL: &str = "https://api.openai.com/v1/chat/completions";

pub type OpenAiCompatChunkStream<'a> =
    Pin<Box<dyn Stream<Item = Result<OpenAiCompatStreamChunk, ProviderError>> + Send + 'a>>;

pub trait OpenAiCompatTransport: Send + Sync {
    fn complete<'a>(
        &'a self,
        request: OpenAiCompatRequest,
        auth: CallAuth,
    ) -> ProviderFuture<'a, Result<OpenAiCompatResponse, ProviderError>>;

    fn stream<'a>(
        &'a self,
        request: OpenAiCompatRequest,
        auth: CallAuth,
    ) -> ProviderFuture<'a, Result<OpenAiCompatChunkStream<'a>, ProviderError>>;
}

/// Normalizes a credential endpoint override into a full completions URL.
/// Accepts a bare host, a base URL, or a URL that already ends in
/// `/chat/completions`; missing schemes default to https.
pub fn resolve_endpoint(endpoint: Option<&str>) -> String {
    let configured = match endpoint {
        Some(value) if !value.trim().is_empty() => value.trim(),
        _ => return DEFAULT_COMPLETIONS_URL.to_string(),
    };

    let mut base = configured.trim_end_matches('/').to_string();
    if let Some(stripped) = base.strip_suffix("/chat/completions") {
        base = stripped.to_string();
    }

    if !base.starts_with("http://") && !base.starts_with("https://") {
        base = format!("https://{base}");
    }

    format!("{}/chat/completions", base.trim_end_matches('/'))
}

#[derive(Debug, Clone)]
pub struct OpenAiCompatHttpTransport {
    client: Client,
}

impl OpenAiCompatHttpTransport {
    pub fn new(client: Client) -> Self {
        Self { client }
    }

    async fn parse_error(response: Response) -> ProviderError {
        let status = response.status();
        let body = response.text().await.unwrap_or_default();
        let (message, code) = extract_error_detail(&body)
            .unwrap_or_else(|| (format!("chat completion failed with status {status}"), None));

        match status {
            StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => {
                ProviderError::authentication(message)
            }
            StatusCode::TOO_MANY_REQUESTS => {
                if code.as_deref() == Some("insufficient_quota") {
                    ProviderError::quota_exhausted(message)
                } else {
                    ProviderError::rate_limited(message)
                }
            }
            StatusCode::REQUEST_TIMEOUT | StatusCode::GATEWAY_TIMEOUT => {
                ProviderError::timeout(message)
            }
            StatusCode::BAD_REQUEST | StatusCode::UNPROCESSABLE_ENTITY => {
                ProviderError::invalid_request(message)
            }
            status if status.is_server_error() => ProviderError::unavailable(message),
            _ => ProviderError::transport(message),
        }
    }

    fn map_send_error(err: reqwest::Error) -> ProviderError {
        if err.is_timeout() {
            ProviderError::timeout(err.to_string())
        } else {
            ProviderError::transport(err.to_string())
        }
    }
}

impl OpenAiCompatTransport for OpenAiCompatHttpTransport {
    fn complete<'a>(
        &'a self,
        request: OpenAiCompatRequest,
        auth: CallAuth,
    ) -> ProviderFuture<'a, Result<OpenAiCompatResponse, ProviderError>> {
        Box::pin(async move {
            let api_request = build_api_request(request)?;
            let url = resolve_endpoint(auth.endpoint.as_deref());
            let response = self
                .client
                .post(url)
                .bearer_auth(auth.api_key.expose())
                .json(&api_request)
                .send()
                .await
                .map_err(Self::map_send_error)?;

            if !response.status().is_success() {
                return Err(Self::parse_error(response).await);
            }

            let parsed: super::serde_api::OpenAiCompatApiResponse = response
                .json()
                .await
                .map_err(|err| ProviderError::transport(err.to_string()))?;

            OpenAiCompatResponse::try_from(parsed)
        })
    }

    fn stream<'a>(
        &'a self,
        mut request: OpenAiCompatRequest,
        auth: CallAuth,
    ) -> ProviderFuture<'a, Result<OpenAiCompatChunkStream<'a>, ProviderError>> {
        Box::pin(async move {
            request.stream = true;
            let model_for_fallback = request.model.clone();
            let api_request = build_api_request(request)?;
            let url = resolve_endpoint(auth.endpoint.as_deref());
            let response = self
                .client
                .post(url)
                .bearer_auth(auth.api_key.expose())
                .json(&api_request)
                .send()
                .await
                .map_err(Self::map_send_error)?;

            if !response.status().is_success() {
                return Err(Self::parse_error(response).await);
            }

            let stream = try_stream! {
                let mut chunks = response.bytes_stream();
                let mut sse_buffer = String::new();
                let mut finished = false;
                let mut content = String::new();
                let mut model = None::<String>;

                while let Some(item) = chunks.next().await {
                    let bytes = item.map_err(|err| ProviderError::transport(err.to_string()))?;
                    let text = std::str::from_utf8(&bytes)
                        .map_err(|err| ProviderError::transport(err.to_string()))?;
                    sse_buffer.push_str(text);

                    while let Some(newline_index) = sse_buffer.find('\n') {
                        let line = sse_buffer.drain(..=newline_index).collect::<String>();
                        let line = line.trim();

                        if !line.starts_with("data:") {
                            continue;
                        }

                        let payload = line.trim_start_matches("data:").trim();
                        if payload == "[DONE]" {
                            finished = true;
                            break;
                        }

                        let parsed: OpenAiCompatApiStreamResponse = serde_json::from_str(payload)
                            .map_err(|err| ProviderError::transport(err.to_string()))?;

                        if model.is_none() {
                            model = Some(parsed.model.clone());
                        }

                        if let Some(choice) = parsed.choices.first()
                            && let Some(delta_content) = &choice.delta.content
                            && !delta_content.is_empty()
                        {
                            content.push_str(delta_content);
                            yield OpenAiCompatStreamChunk::TextDelta(delta_content.clone());
                        }
                    }

                    if finished {
                        break;
                    }
                }

                // Streaming replies carry no usage block; accounting falls
                // back to estimation downstream.
                yield OpenAiCompatStreamChunk::ResponseComplete(OpenAiCompatResponse {
                    model: model.unwrap_or(model_for_fallback),
                    content,
                    usage: None,
                });
            };

            Ok(Box::pin(stream) as OpenAiCompatChunkStream<'a>)
        })
    }
}
