//! OpenAI-compatible provider implementation over transport and shared models.

use std::sync::Arc;

use async_stream::try_stream;
use futures_util::StreamExt;

use crate::{
    BoxedEventStream, CallAuth, ModelProvider, ModelRequest, ModelResponse, ProviderError,
    ProviderFamily, ProviderFuture, StreamEvent,
};

use super::transport::OpenAiCompatTransport;
use super::types::{OpenAiCompatMessage, OpenAiCompatRequest};

#[derive(Clone)]
pub struct OpenAiCompatProvider {
    transport: Arc<dyn OpenAiCompatTransport>,
    fallback_model: String,
}

impl OpenAiCompatProvider {
    pub fn new(transport: Arc<dyn OpenAiCompatTransport>) -> Self {
        Self {
            transport,
            fallback_model: "gpt-3.5-turbo".to_string(),
        }
    }

    pub fn with_fallback_model(mut self, model: impl Into<String>) -> Self {
        self.fallback_model = model.into();
        self
    }

    pub(crate) fn build_request(&self, request: ModelRequest, stream: bool) -> OpenAiCompatRequest {
        let model = if request.model.trim().is_empty() {
            self.fallback_model.clone()
        } else {
            request.model
        };

        let messages = request
            .messages
            .into_iter()
            .map(OpenAiCompatMessage::from)
            .collect::<Vec<_>>();

        OpenAiCompatRequest {
            model,
            messages,
            temperature: request.options.temperature,
            max_tokens: request.options.max_tokens,
            stream,
        }
    }
}

impl ModelProvider for OpenAiCompatProvider {
    fn family(&self) -> ProviderFamily {
        ProviderFamily::OpenAiCompat
    }

    fn complete<'a>(
        &'a self,
        request: ModelRequest,
        auth: CallAuth,
    ) -> ProviderFuture<'a, Result<ModelResponse, ProviderError>> {
        Box::pin(async move {
            request.validate()?;
            let wire_request = self.build_request(request, false);
            let response = self.transport.complete(wire_request, auth).await?;
            Ok(response.into_model_response())
        })
    }

    fn stream<'a>(
        &'a self,
        request: ModelRequest,
        auth: CallAuth,
    ) -> ProviderFuture<'a, Result<BoxedEventStream<'a>, ProviderError>> {
        Box::pin(async move {
            request.validate()?;
            let wire_request = self.build_request(request, true);
            let mut chunks = self.transport.stream(wire_request, auth).await?;

            let stream = try_stream! {
                while let Some(chunk) = chunks.next().await {
                    yield StreamEvent::from(chunk?);
                }
            };

            Ok(Box::pin(stream) as BoxedEventStream<'a>)
        })
    }
}
