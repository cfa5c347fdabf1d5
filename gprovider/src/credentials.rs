//! Secret handling and per-call credential material.

use crate::ProviderError;

#[derive(Clone, PartialEq, Eq)]
pub struct SecretString {
    value: String,
}

impl SecretString {
    pub fn new(value: impl Into<String>) -> Self {
        Self {
            value: value.into(),
        }
    }

    pub fn expose(&self) -> &str {
        self.value.as_str()
    }

    pub fn is_empty(&self) -> bool {
        self.value.is_empty()
    }
}

impl std::fmt::Debug for SecretString {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("[REDACTED]")
    }
}

impl Drop for SecretString {
    fn drop(&mut self) {
        unsafe {
            self.value.as_mut_vec().fill(0);
        }
    }
}

/// Credential material resolved for a single upstream call. Unlike a shared
/// credential manager, auth here is per-call because different users of the
/// same adapter carry different keys and endpoint overrides.
#[derive(Clone, PartialEq, Eq)]
pub struct CallAuth {
    pub api_key: SecretString,
    pub endpoint: Option<String>,
}

impl CallAuth {
    pub fn new(api_key: impl Into<String>) -> Result<Self, ProviderError> {
        let api_key = SecretString::new(api_key);
        if api_key.is_empty() {
            return Err(ProviderError::authentication("api key must not be empty"));
        }

        Ok(Self {
            api_key,
            endpoint: None,
        })
    }

    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        let endpoint = endpoint.into();
        self.endpoint = if endpoint.trim().is_empty() {
            None
        } else {
            Some(endpoint)
        };
        self
    }
}

impl std::fmt::Debug for CallAuth {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CallAuth")
            .field("api_key", &"[REDACTED]")
            .field("endpoint", &self.endpoint)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn secret_string_debug_redacts_value() {
        let secret = SecretString::new("sk-very-secret");
        assert_eq!(format!("{secret:?}"), "[REDACTED]");
        assert_eq!(secret.expose(), "sk-very-secret");
    }

    #[test]
    fn call_auth_rejects_empty_key_and_redacts_debug() {
        let err = CallAuth::new("").expect_err("empty key must fail");
        assert!(!err.retryable);

        let auth = CallAuth::new("sk-123")
            .expect("key should build")
            .with_endpoint("https://api.example.com/v1");
        let rendered = format!("{auth:?}");
        assert!(rendered.contains("[REDACTED]"));
        assert!(!rendered.contains("sk-123"));
    }

    #[test]
    fn call_auth_drops_blank_endpoint() {
        let auth = CallAuth::new("sk-123")
            .expect("key should build")
            .with_endpoint("   ");
        assert_eq!(auth.endpoint, None);
    }
}
