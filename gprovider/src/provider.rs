use std::future::Future;
use std::pin::Pin;

use crate::{BoxedEventStream, CallAuth, ModelRequest, ModelResponse, ProviderError, ProviderFamily};

pub type ProviderFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

pub trait ModelProvider: Send + Sync {
    fn family(&self) -> ProviderFamily;

    fn complete<'a>(
        &'a self,
        request: ModelRequest,
        auth: CallAuth,
    ) -> ProviderFuture<'a, Result<ModelResponse, ProviderError>>;

    fn stream<'a>(
        &'a self,
        request: ModelRequest,
        auth: CallAuth,
    ) -> ProviderFuture<'a, Result<BoxedEventStream<'a>, ProviderError>>;
}
