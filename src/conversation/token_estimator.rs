//! Token estimation using tiktoken

use crate::conversation::models::ChatMessage;
use once_cell::sync::Lazy;
use tiktoken_rs::{cl100k_base, CoreBPE};

// Built once; cl100k_base construction is expensive.
static BPE: Lazy<CoreBPE> = Lazy::new(|| {
    cl100k_base().expect("cl100k_base vocabulary is bundled with tiktoken-rs")
});

/// Token estimator trait for different tokenization strategies
pub trait TokenEstimator: Send + Sync {
    /// Estimate the number of tokens in the given text
    fn estimate(&self, text: &str) -> usize;

    /// Estimate the billable cost of a full chat message sequence.
    ///
    /// Uses the chat-format accounting for cl100k-family models: every
    /// message costs 4 wrapper tokens plus its encoded role and content,
    /// and the reply is primed with 3 more.
    fn estimate_messages(&self, messages: &[ChatMessage]) -> usize {
        let per_message: usize = messages
            .iter()
            .map(|m| 4 + self.estimate(m.role.as_str()) + self.estimate(&m.content))
            .sum();
        per_message + 3
    }
}

/// Tiktoken-based estimator using cl100k_base (GPT-4, GPT-3.5-turbo)
#[derive(Debug, Clone, Copy, Default)]
pub struct TiktokenEstimator;

impl TokenEstimator for TiktokenEstimator {
    fn estimate(&self, text: &str) -> usize {
        BPE.encode_with_special_tokens(text).len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_estimate_plain_text() {
        let estimator = TiktokenEstimator;
        let tokens = estimator.estimate("Hello, world! This is a test.");
        assert!(tokens > 0);
        assert!(tokens < 20);
    }

    #[test]
    fn test_estimate_is_deterministic() {
        let estimator = TiktokenEstimator;
        let text = "트리밍 루프는 반드시 종료되어야 합니다";
        assert_eq!(estimator.estimate(text), estimator.estimate(text));
    }

    #[test]
    fn test_estimate_messages_overhead() {
        let estimator = TiktokenEstimator;
        let messages = vec![ChatMessage::system("assistant persona"), ChatMessage::user("hi")];
        let cost = estimator.estimate_messages(&messages);
        let raw: usize = messages
            .iter()
            .map(|m| estimator.estimate(&m.content) + estimator.estimate(m.role.as_str()))
            .sum();
        // 4 per message plus 3 priming tokens
        assert_eq!(cost, raw + 4 * messages.len() + 3);
    }

    #[test]
    fn test_estimate_messages_monotonic() {
        let estimator = TiktokenEstimator;
        let short = vec![ChatMessage::user("hi")];
        let longer = vec![ChatMessage::user("hi"), ChatMessage::assistant("hello there")];
        assert!(estimator.estimate_messages(&longer) > estimator.estimate_messages(&short));
    }
}
