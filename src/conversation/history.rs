//! History trimming against the token ceiling

use crate::conversation::models::ChatMessage;
use crate::conversation::token_estimator::TokenEstimator;

/// Result of appending a user turn and trimming to the ceiling
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TrimOutcome {
    /// The trimmed history and its estimated cost
    Fits(Vec<ChatMessage>, usize),
    /// Even system prompt + the new message alone exceed the ceiling
    TooLong,
}

/// Append `utterance` as a user turn, then evict the oldest non-system
/// message (index 1) until the estimated cost is within `ceiling`.
/// Index 0 (the system message) is never removed; neither is the turn
/// just appended. If only those two remain and the cost still exceeds
/// the ceiling, the input itself is too long.
pub fn append_and_trim(
    mut messages: Vec<ChatMessage>,
    utterance: &str,
    estimator: &dyn TokenEstimator,
    ceiling: usize,
) -> TrimOutcome {
    messages.push(ChatMessage::user(utterance));

    let mut num_tokens = estimator.estimate_messages(&messages);
    while num_tokens > ceiling && messages.len() > 2 {
        messages.remove(1);
        num_tokens = estimator.estimate_messages(&messages);
    }

    if num_tokens > ceiling {
        TrimOutcome::TooLong
    } else {
        TrimOutcome::Fits(messages, num_tokens)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::conversation::models::Role;

    /// One token per character - makes ceilings easy to reason about
    struct CharEstimator;

    impl TokenEstimator for CharEstimator {
        fn estimate(&self, text: &str) -> usize {
            text.chars().count()
        }

        fn estimate_messages(&self, messages: &[ChatMessage]) -> usize {
            messages.iter().map(|m| self.estimate(&m.content)).sum()
        }
    }

    fn history_with(turns: &[(&str, &str)]) -> Vec<ChatMessage> {
        let mut messages = vec![ChatMessage::system("sys")];
        for (role, content) in turns {
            let msg = match *role {
                "user" => ChatMessage::user(*content),
                _ => ChatMessage::assistant(*content),
            };
            messages.push(msg);
        }
        messages
    }

    #[test]
    fn test_fits_without_trimming() {
        let messages = history_with(&[("user", "aaaa"), ("assistant", "bbbb")]);
        let outcome = append_and_trim(messages, "cc", &CharEstimator, 100);
        match outcome {
            TrimOutcome::Fits(trimmed, tokens) => {
                assert_eq!(trimmed.len(), 4);
                assert_eq!(tokens, 3 + 4 + 4 + 2);
            }
            TrimOutcome::TooLong => panic!("should fit"),
        }
    }

    #[test]
    fn test_trims_oldest_non_system_first() {
        // sys(3) + old(10) + mid(4) + new(4) = 21, ceiling 15
        let messages = history_with(&[("user", "aaaaaaaaaa"), ("assistant", "bbbb")]);
        let outcome = append_and_trim(messages, "cccc", &CharEstimator, 15);
        match outcome {
            TrimOutcome::Fits(trimmed, tokens) => {
                assert_eq!(trimmed[0].role, Role::System);
                assert_eq!(trimmed.len(), 3);
                assert_eq!(trimmed[1].content, "bbbb");
                assert_eq!(trimmed[2].content, "cccc");
                assert_eq!(tokens, 11);
            }
            TrimOutcome::TooLong => panic!("should fit after trimming"),
        }
    }

    #[test]
    fn test_system_message_survives_repeated_eviction() {
        let messages = history_with(&[
            ("user", "aaaaaaaa"),
            ("assistant", "bbbbbbbb"),
            ("user", "cccccccc"),
            ("assistant", "dddddddd"),
        ]);
        let outcome = append_and_trim(messages, "ee", &CharEstimator, 6);
        match outcome {
            TrimOutcome::Fits(trimmed, _) => {
                assert_eq!(trimmed.len(), 2);
                assert_eq!(trimmed[0].role, Role::System);
                assert_eq!(trimmed[1].content, "ee");
            }
            TrimOutcome::TooLong => panic!("sys + new message fit under the ceiling"),
        }
    }

    #[test]
    fn test_single_input_over_ceiling_is_too_long() {
        let messages = history_with(&[]);
        let outcome = append_and_trim(messages, "aaaaaaaaaaaaaaaaaaaa", &CharEstimator, 10);
        assert_eq!(outcome, TrimOutcome::TooLong);
    }
}
