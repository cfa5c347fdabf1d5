//! Versioned per-provider token pricing table.
//!
//! ```rust
//! use gprovider::PricingTable;
//!
//! let table = PricingTable::builtin();
//! assert_eq!(table.cost_for("openai", 1000), 0.002);
//! assert_eq!(table.cost_for("unknown", 2000), 0.002);
//! ```

use std::collections::HashMap;

/// Rates are per 1000 tokens, keyed by lowercase provider name. Injected and
/// versioned so finance can update prices without redeploying the router.
#[derive(Debug, Clone, PartialEq)]
pub struct PricingTable {
    pub version: String,
    rates_per_1k: HashMap<String, f64>,
    default_rate_per_1k: f64,
}

impl PricingTable {
    pub fn new(
        version: impl Into<String>,
        rates_per_1k: HashMap<String, f64>,
        default_rate_per_1k: f64,
    ) -> Self {
        Self {
            version: version.into(),
            rates_per_1k,
            default_rate_per_1k,
        }
    }

    pub fn builtin() -> Self {
        let mut rates = HashMap::new();
        rates.insert("openai".to_string(), 0.002);
        rates.insert("deepseek".to_string(), 0.00014);
        rates.insert("wenxin".to_string(), 0.012);
        Self::new("builtin-1", rates, 0.001)
    }

    pub fn rate_per_1k(&self, provider_name: &str) -> f64 {
        self.rates_per_1k
            .get(provider_name.trim().to_ascii_lowercase().as_str())
            .copied()
            .unwrap_or(self.default_rate_per_1k)
    }

    pub fn cost_for(&self, provider_name: &str, total_tokens: u32) -> f64 {
        f64::from(total_tokens) / 1000.0 * self.rate_per_1k(provider_name)
    }
}

impl Default for PricingTable {
    fn default() -> Self {
        Self::builtin()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builtin_rates_match_catalog() {
        let table = PricingTable::builtin();
        assert_eq!(table.rate_per_1k("openai"), 0.002);
        assert_eq!(table.rate_per_1k("DeepSeek"), 0.00014);
        assert_eq!(table.rate_per_1k("wenxin"), 0.012);
        assert_eq!(table.rate_per_1k("somebody-else"), 0.001);
    }

    #[test]
    fn cost_scales_with_token_count() {
        let table = PricingTable::builtin();
        assert_eq!(table.cost_for("openai", 0), 0.0);
        assert_eq!(table.cost_for("openai", 500), 0.001);
        assert!((table.cost_for("wenxin", 1500) - 0.018).abs() < 1e-12);
    }
}
