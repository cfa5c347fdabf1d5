mod provider;
mod serde_api;
mod transport;
mod types;

pub use provider::OpenAiCompatProvider;
pub use transport::{OpenAiCompatHttpTransport, OpenAiCompatTransport, resolve_endpoint};
pub use types::{
    OpenAiCompatMessage, OpenAiCompatRequest, OpenAiCompatResponse, OpenAiCompatRole,
    OpenAiCompatStreamChunk, OpenAiCompatUsage,
};
