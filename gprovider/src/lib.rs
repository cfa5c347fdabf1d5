//! Provider adapters, routing, and resilient dispatch for the gatehouse
//! model routing platform.
//!
//! ```rust
//! use gprovider::{Message, ModelRequest, ProviderFamily, Role};
//!
//! let request = ModelRequest::new("deepseek-chat", vec![Message::new(Role::User, "hi")])
//!     .with_temperature(0.7);
//! assert!(request.validate().is_ok());
//! assert_eq!(ProviderFamily::from_name("deepseek"), Some(ProviderFamily::OpenAiCompat));
//! ```

pub mod adapters;
mod credentials;
mod error;
mod identifiers;
mod model;
pub mod prelude;
mod pricing;
mod provider;
mod registry;
mod resilience;
mod stream;

pub use credentials::{CallAuth, SecretString};
pub use error::{ProviderError, ProviderErrorKind};
pub use identifiers::{IdentifierRule, ModelIdentifierMap};
pub use model::{Message, ModelRequest, ModelResponse, ProviderFamily, Role, TokenUsage};
pub use pricing::PricingTable;
pub use provider::{ModelProvider, ProviderFuture};
pub use registry::ProviderRegistry;
pub use resilience::{
    CancelToken, NoopOperationHooks, ProviderOperationHooks, RetryPolicy, dispatch_with_retry,
    execute_with_retry,
};
pub use stream::{BoxedEventStream, ModelEventStream, StreamEvent, VecEventStream};
