//! Credential resolution: per-user keys first, system defaults second.

use std::collections::HashMap;
use std::sync::Arc;

use gcommon::UserId;
use gprovider::CallAuth;

use crate::{ChatError, CredentialStore, ModelDescriptor};

/// Reversible secret transform applied to stored API keys. Real deployments
/// plug in their KMS-backed cipher; tests use the passthrough.
pub trait SecretCipher: Send + Sync {
    fn encrypt(&self, plaintext: &str) -> Result<String, ChatError>;

    fn decrypt(&self, ciphertext: &str) -> Result<String, ChatError>;
}

#[derive(Debug, Default, Clone, Copy)]
pub struct NoopCipher;

impl SecretCipher for NoopCipher {
    fn encrypt(&self, plaintext: &str) -> Result<String, ChatError> {
        Ok(plaintext.to_string())
    }

    fn decrypt(&self, ciphertext: &str) -> Result<String, ChatError> {
        Ok(ciphertext.to_string())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CredentialSource {
    User,
    System,
}

#[derive(Debug)]
pub struct ResolvedCredential {
    pub auth: CallAuth,
    pub source: CredentialSource,
}

pub struct CredentialResolver {
    credentials: Arc<dyn CredentialStore>,
    cipher: Arc<dyn SecretCipher>,
    /// System default keys, keyed by lowercase provider name.
    system_keys: HashMap<String, String>,
}

impl CredentialResolver {
    pub fn new(
        credentials: Arc<dyn CredentialStore>,
        cipher: Arc<dyn SecretCipher>,
        system_keys: HashMap<String, String>,
    ) -> Self {
        let system_keys = system_keys
            .into_iter()
            .map(|(provider, key)| (provider.to_lowercase(), key))
            .collect();

        Self {
            credentials,
            cipher,
            system_keys,
        }
    }

    /// An enabled per-user credential wins; otherwise the system default for
    /// the model's provider. When neither exists the failure is a
    /// configuration error, not an authorization one. The endpoint follows
    /// the same precedence: a credential override beats the catalog's wire
    /// endpoint.
    pub async fn resolve(
        &self,
        user_id: UserId,
        model: &ModelDescriptor,
    ) -> Result<ResolvedCredential, ChatError> {
        let stored = self.credentials.credential_for(user_id, model.id).await?;

        if let Some(credential) = stored
            && credential.is_enabled
        {
            let api_key = match (&credential.api_key, &credential.api_key_encrypted) {
                (Some(plaintext), _) => plaintext.clone(),
                (None, Some(ciphertext)) => self.cipher.decrypt(ciphertext)?,
                (None, None) => {
                    return Err(ChatError::model_config(format!(
                        "credential for model '{}' holds no secret",
                        model.name
                    )));
                }
            };
            let mut auth = CallAuth::new(api_key)
                .map_err(|err| ChatError::model_config(err.message))?;
            if let Some(endpoint) = credential.endpoint.or_else(|| model.endpoint.clone()) {
                auth = auth.with_endpoint(endpoint);
            }

            return Ok(ResolvedCredential {
                auth,
                source: CredentialSource::User,
            });
        }

        let provider_key = model.provider.to_lowercase();
        if let Some(key) = self.system_keys.get(&provider_key) {
            let mut auth = CallAuth::new(key.clone())
                .map_err(|err| ChatError::model_config(err.message))?;
            if let Some(endpoint) = model.endpoint.clone() {
                auth = auth.with_endpoint(endpoint);
            }
            return Ok(ResolvedCredential {
                auth,
                source: CredentialSource::System,
            });
        }

        Err(ChatError::model_config(format!(
            "no credential configured for provider '{}'",
            model.provider
        )))
    }
}

#[cfg(test)]
mod tests {
    use gcommon::ModelId;

    use super::*;
    use crate::{InMemoryChatStore, UserCredential};

    fn model() -> ModelDescriptor {
        ModelDescriptor::new(ModelId::new(5), "DeepSeek V3", "DeepSeek")
            .with_endpoint("https://api.deepseek.com/v1")
    }

    fn resolver_with(
        store: Arc<InMemoryChatStore>,
        system_keys: HashMap<String, String>,
    ) -> CredentialResolver {
        CredentialResolver::new(store, Arc::new(NoopCipher), system_keys)
    }

    #[tokio::test]
    async fn enabled_user_credential_wins_over_system_default() {
        let store = Arc::new(InMemoryChatStore::new());
        store
            .upsert_credential(
                UserCredential::encrypted(UserId::new(1), ModelId::new(5), "user-key")
                    .with_endpoint("https://proxy.example.com/v1"),
            )
            .expect("seed credential");

        let mut system = HashMap::new();
        system.insert("deepseek".to_string(), "system-key".to_string());

        let resolved = resolver_with(store, system)
            .resolve(UserId::new(1), &model())
            .await
            .expect("resolution should work");

        assert_eq!(resolved.source, CredentialSource::User);
        assert_eq!(resolved.auth.api_key.expose(), "user-key");
        assert_eq!(
            resolved.auth.endpoint.as_deref(),
            Some("https://proxy.example.com/v1")
        );
    }

    #[tokio::test]
    async fn plaintext_secret_bypasses_the_cipher() {
        struct RejectingCipher;

        impl SecretCipher for RejectingCipher {
            fn encrypt(&self, _plaintext: &str) -> Result<String, ChatError> {
                Err(ChatError::model_config("cipher should not run"))
            }

            fn decrypt(&self, _ciphertext: &str) -> Result<String, ChatError> {
                Err(ChatError::model_config("cipher should not run"))
            }
        }

        let store = Arc::new(InMemoryChatStore::new());
        store
            .upsert_credential(UserCredential::plaintext(
                UserId::new(1),
                ModelId::new(5),
                "sk-plain",
            ))
            .expect("seed credential");

        let resolver =
            CredentialResolver::new(store, Arc::new(RejectingCipher), HashMap::new());
        let resolved = resolver
            .resolve(UserId::new(1), &model())
            .await
            .expect("resolution should work");

        assert_eq!(resolved.source, CredentialSource::User);
        assert_eq!(resolved.auth.api_key.expose(), "sk-plain");
    }

    #[tokio::test]
    async fn credential_without_override_falls_back_to_the_model_endpoint() {
        let store = Arc::new(InMemoryChatStore::new());
        store
            .upsert_credential(UserCredential::plaintext(
                UserId::new(1),
                ModelId::new(5),
                "user-key",
            ))
            .expect("seed credential");

        let resolved = resolver_with(store, HashMap::new())
            .resolve(UserId::new(1), &model())
            .await
            .expect("resolution should work");

        assert_eq!(
            resolved.auth.endpoint.as_deref(),
            Some("https://api.deepseek.com/v1")
        );
    }

    #[tokio::test]
    async fn system_default_carries_the_model_endpoint() {
        let store = Arc::new(InMemoryChatStore::new());
        let mut system = HashMap::new();
        system.insert("deepseek".to_string(), "system-key".to_string());

        let resolved = resolver_with(store, system)
            .resolve(UserId::new(1), &model())
            .await
            .expect("resolution should work");

        assert_eq!(resolved.source, CredentialSource::System);
        assert_eq!(
            resolved.auth.endpoint.as_deref(),
            Some("https://api.deepseek.com/v1")
        );
    }

    #[tokio::test]
    async fn disabled_user_credential_falls_back_to_system_default() {
        let store = Arc::new(InMemoryChatStore::new());
        store
            .upsert_credential(
                UserCredential::encrypted(UserId::new(1), ModelId::new(5), "user-key").disabled(),
            )
            .expect("seed credential");

        let mut system = HashMap::new();
        system.insert("deepseek".to_string(), "system-key".to_string());

        let resolved = resolver_with(store, system)
            .resolve(UserId::new(1), &model())
            .await
            .expect("resolution should work");

        assert_eq!(resolved.source, CredentialSource::System);
        assert_eq!(resolved.auth.api_key.expose(), "system-key");
    }

    #[tokio::test]
    async fn enabled_credential_without_any_secret_is_a_config_error() {
        let store = Arc::new(InMemoryChatStore::new());
        store
            .upsert_credential(UserCredential {
                user_id: UserId::new(1),
                model_id: ModelId::new(5),
                api_key: None,
                api_key_encrypted: None,
                endpoint: None,
                is_enabled: true,
                last_used_at: None,
            })
            .expect("seed credential");

        let error = resolver_with(store, HashMap::new())
            .resolve(UserId::new(1), &model())
            .await
            .expect_err("resolution must fail");
        assert_eq!(error.kind, crate::ChatErrorKind::ModelConfig);
    }

    #[tokio::test]
    async fn missing_credentials_surface_model_config_error() {
        let store = Arc::new(InMemoryChatStore::new());
        let error = resolver_with(store, HashMap::new())
            .resolve(UserId::new(1), &model())
            .await
            .expect_err("resolution must fail");

        assert_eq!(error.kind, crate::ChatErrorKind::ModelConfig);
    }
}
