//! Common `gprovider` imports for downstream crates.

pub use crate::{
    BoxedEventStream, CallAuth, CancelToken, Message, ModelEventStream, ModelIdentifierMap,
    ModelProvider, ModelRequest, ModelResponse, NoopOperationHooks, PricingTable, ProviderError,
    ProviderErrorKind, ProviderFamily, ProviderOperationHooks, ProviderRegistry, RetryPolicy, Role,
    SecretString, StreamEvent, TokenUsage, dispatch_with_retry, execute_with_retry,
};
pub use gcommon::{BoxFuture, GenerationOptions};
