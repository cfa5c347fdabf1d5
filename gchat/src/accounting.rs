//! Token usage estimation and reconciliation.
//!
//! ```rust
//! use gchat::estimate_tokens;
//!
//! assert_eq!(estimate_tokens("hello world"), 2);
//! assert_eq!(estimate_tokens("你好"), 1);
//! ```

use gprovider::TokenUsage;

/// Heuristic estimate: CJK ideographs run about 1.5 characters per token,
/// everything else about 4. Mirrors the billing estimate used when a
/// provider reports no usage.
pub fn estimate_tokens(text: &str) -> u32 {
    let mut cjk = 0_u32;
    let mut other = 0_u32;

    for ch in text.chars() {
        if ('\u{4e00}'..='\u{9fff}').contains(&ch) {
            cjk += 1;
        } else {
            other += 1;
        }
    }

    (f64::from(cjk) / 1.5 + f64::from(other) / 4.0) as u32
}

/// Prefers provider-reported usage; falls back to estimating both sides.
/// When the provider reports only a total, the split is derived from the
/// pre-call prompt estimate.
pub fn resolve_usage(
    reported: Option<TokenUsage>,
    prompt_estimate: u32,
    response_text: &str,
) -> TokenUsage {
    if let Some(usage) = reported
        && usage.total_tokens > 0
    {
        if usage.prompt_tokens == 0 && usage.completion_tokens == 0 {
            let prompt_tokens = prompt_estimate.min(usage.total_tokens);
            return TokenUsage {
                prompt_tokens,
                completion_tokens: usage.total_tokens - prompt_tokens,
                total_tokens: usage.total_tokens,
            };
        }

        return usage;
    }

    let completion_tokens = estimate_tokens(response_text);
    TokenUsage {
        prompt_tokens: prompt_estimate,
        completion_tokens,
        total_tokens: prompt_estimate + completion_tokens,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn estimate_splits_cjk_and_ascii() {
        assert_eq!(estimate_tokens(""), 0);
        // 12 ascii chars / 4 = 3
        assert_eq!(estimate_tokens("hello, world"), 3);
        // 3 cjk / 1.5 = 2
        assert_eq!(estimate_tokens("你好吗"), 2);
        // mixed: 3 cjk / 1.5 + 5 ascii / 4 = 2 + 1.25 -> 3
        assert_eq!(estimate_tokens("你好吗hello"), 3);
    }

    #[test]
    fn reported_usage_wins_over_estimates() {
        let reported = TokenUsage {
            prompt_tokens: 100,
            completion_tokens: 50,
            total_tokens: 150,
        };
        let usage = resolve_usage(Some(reported), 5, "whatever");
        assert_eq!(usage, reported);
    }

    #[test]
    fn total_only_usage_derives_split_from_prompt_estimate() {
        let reported = TokenUsage {
            prompt_tokens: 0,
            completion_tokens: 0,
            total_tokens: 40,
        };
        let usage = resolve_usage(Some(reported), 15, "ignored");
        assert_eq!(usage.prompt_tokens, 15);
        assert_eq!(usage.completion_tokens, 25);
        assert_eq!(usage.total_tokens, 40);
    }

    #[test]
    fn missing_usage_estimates_both_sides() {
        let usage = resolve_usage(None, 10, "12345678");
        assert_eq!(usage.prompt_tokens, 10);
        assert_eq!(usage.completion_tokens, 2);
        assert_eq!(usage.total_tokens, 12);
    }

    #[test]
    fn zero_total_usage_is_treated_as_missing() {
        let usage = resolve_usage(Some(TokenUsage::default()), 4, "abcd");
        assert_eq!(usage.total_tokens, 5);
    }
}
