//! Versioned model identifier normalization table.
//!
//! ```rust
//! use gprovider::ModelIdentifierMap;
//!
//! let map = ModelIdentifierMap::builtin();
//! assert_eq!(map.normalize("DeepSeek V3"), "deepseek-chat");
//! assert_eq!(map.normalize("my-fine-tune"), "my-fine-tune");
//! ```

/// One substring rule: the display name must contain every listed fragment
/// (case-insensitive) to map onto the wire identifier.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IdentifierRule {
    pub fragments: Vec<String>,
    pub wire_id: String,
}

impl IdentifierRule {
    pub fn new(fragments: &[&str], wire_id: impl Into<String>) -> Self {
        Self {
            fragments: fragments.iter().map(|f| f.to_string()).collect(),
            wire_id: wire_id.into(),
        }
    }

    fn matches(&self, lowered: &str) -> bool {
        self.fragments.iter().all(|f| lowered.contains(f.as_str()))
    }
}

/// Ordered lookup from catalog display names to provider wire identifiers.
/// Injected rather than hardcoded so deployments can swap tables without a
/// code change; `version` lets operators tell which table served a call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModelIdentifierMap {
    pub version: String,
    rules: Vec<IdentifierRule>,
    fallback: String,
}

impl ModelIdentifierMap {
    pub fn new(
        version: impl Into<String>,
        rules: Vec<IdentifierRule>,
        fallback: impl Into<String>,
    ) -> Self {
        Self {
            version: version.into(),
            rules,
            fallback: fallback.into(),
        }
    }

    /// The table shipped with the platform catalog. Rule order matters:
    /// "deepseek coder" must win over the plain "deepseek" rule.
    pub fn builtin() -> Self {
        Self::new(
            "builtin-1",
            vec![
                IdentifierRule::new(&["deepseek", "coder"], "deepseek-coder"),
                IdentifierRule::new(&["deepseek"], "deepseek-chat"),
                IdentifierRule::new(&["gpt-4"], "gpt-4"),
                IdentifierRule::new(&["ernie"], "ernie-bot"),
                IdentifierRule::new(&["claude"], "claude-3-sonnet"),
                IdentifierRule::new(&["llama"], "llama-3-8b"),
            ],
            "gpt-3.5-turbo",
        )
    }

    /// First matching rule wins; unmatched non-empty names pass through
    /// unchanged, empty names fall back. Idempotent: normalizing an already
    /// normalized identifier returns it verbatim.
    pub fn normalize(&self, display_name: &str) -> String {
        let trimmed = display_name.trim();
        if trimmed.is_empty() {
            return self.fallback.clone();
        }

        let lowered = trimmed.to_ascii_lowercase();
        for rule in &self.rules {
            if rule.matches(&lowered) {
                return rule.wire_id.clone();
            }
        }

        trimmed.to_string()
    }
}

impl Default for ModelIdentifierMap {
    fn default() -> Self {
        Self::builtin()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builtin_rules_map_known_families() {
        let map = ModelIdentifierMap::builtin();
        assert_eq!(map.normalize("DeepSeek Coder V2"), "deepseek-coder");
        assert_eq!(map.normalize("deepseek chat"), "deepseek-chat");
        assert_eq!(map.normalize("GPT-4 Turbo"), "gpt-4");
        assert_eq!(map.normalize("ERNIE 4.0"), "ernie-bot");
        assert_eq!(map.normalize("Claude Opus"), "claude-3-sonnet");
        assert_eq!(map.normalize("Llama 3 Instruct"), "llama-3-8b");
    }

    #[test]
    fn unmatched_names_pass_through_and_empty_falls_back() {
        let map = ModelIdentifierMap::builtin();
        assert_eq!(map.normalize("qwen-max"), "qwen-max");
        assert_eq!(map.normalize(""), "gpt-3.5-turbo");
        assert_eq!(map.normalize("   "), "gpt-3.5-turbo");
    }

    #[test]
    fn normalization_is_idempotent() {
        let map = ModelIdentifierMap::builtin();
        for name in ["DeepSeek Coder", "GPT-4", "mystery-model", ""] {
            let once = map.normalize(name);
            assert_eq!(map.normalize(&once), once);
        }
    }
}
