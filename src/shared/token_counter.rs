//! Character-based token estimation for prompt sizing.
//!
//! Approximation: ~4 characters per token, close enough for Gemini models
//! without shipping a tokenizer.

pub struct TokenCounter;

impl TokenCounter {
    /// Estimate token count for text
    pub fn estimate_tokens(text: &str) -> usize {
        if text.is_empty() {
            return 0;
        }
        (text.chars().count() + 3) / 4
    }

    /// Whether a prompt likely fits in the given input limit
    pub fn fits(text: &str, limit: Option<u64>) -> bool {
        match limit {
            Some(limit) => Self::estimate_tokens(text) as u64 <= limit,
            None => true,
        }
    }
}
