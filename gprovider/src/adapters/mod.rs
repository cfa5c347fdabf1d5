#[cfg(feature = "provider-openai-compat")]
pub mod openai_compat;

#[cfg(feature = "provider-wenxin")]
pub mod wenxin;
