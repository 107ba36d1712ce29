// Recent prompt history for one session
// Author: kelexine (https://github.com/kelexine)

use std::collections::VecDeque;

/// Number of prompts kept per session.
pub const HISTORY_CAPACITY: usize = 5;

/// Up to five distinct prompts, oldest first.
///
/// New prompts go to the back. A prompt already present keeps its position,
/// and the oldest entry is dropped once the capacity is exceeded.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PromptHistory {
    entries: VecDeque<String>,
}

impl PromptHistory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a prompt that produced an image. Returns `false` when the
    /// exact same string is already present.
    pub fn record(&mut self, prompt: &str) -> bool {
        if self.contains(prompt) {
            return false;
        }
        self.entries.push_back(prompt.to_string());
        while self.entries.len() > HISTORY_CAPACITY {
            self.entries.pop_front();
        }
        true
    }

    pub fn contains(&self, prompt: &str) -> bool {
        self.entries.iter().any(|entry| entry == prompt)
    }

    /// Prompt at `index`, oldest first.
    pub fn get(&self, index: usize) -> Option<&str> {
        self.entries.get(index).map(String::as_str)
    }

    pub fn entries(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_six_prompts_keep_five_most_recent() {
        let mut history = PromptHistory::new();
        for i in 1..=6 {
            assert!(history.record(&format!("prompt {}", i)));
        }

        let kept: Vec<&str> = history.entries().collect();
        assert_eq!(kept, vec!["prompt 2", "prompt 3", "prompt 4", "prompt 5", "prompt 6"]);
    }

    #[test]
    fn test_reselection_does_not_reorder() {
        let mut history = PromptHistory::new();
        history.record("a");
        history.record("b");
        history.record("c");

        assert!(!history.record("a"));
        assert_eq!(history.entries().collect::<Vec<_>>(), vec!["a", "b", "c"]);
        assert_eq!(history.get(0), Some("a"));
        assert_eq!(history.get(3), None);
    }

    #[test]
    fn test_blank_prompts_recorded_by_exact_match() {
        let mut history = PromptHistory::new();
        assert!(history.record(""));
        assert!(!history.record(""));
        assert!(history.record("  "));
        assert_eq!(history.entries().collect::<Vec<_>>(), vec!["", "  "]);
    }

    proptest! {
        #[test]
        fn prop_history_bounded_and_distinct(prompts in prop::collection::vec("[a-e]{1,2}", 0..40)) {
            let mut history = PromptHistory::new();
            for prompt in &prompts {
                history.record(prompt);
            }

            let entries: Vec<&str> = history.entries().collect();
            prop_assert!(entries.len() <= HISTORY_CAPACITY);

            let mut unique = entries.clone();
            unique.sort();
            unique.dedup();
            prop_assert_eq!(unique.len(), entries.len());

            if let Some(last) = prompts.last() {
                prop_assert!(history.contains(last));
            }
        }

        #[test]
        fn prop_recording_twice_is_idempotent(prompts in prop::collection::vec("[a-z]{1,8}", 1..10)) {
            let mut once = PromptHistory::new();
            let mut twice = PromptHistory::new();
            for prompt in &prompts {
                once.record(prompt);
                twice.record(prompt);
                twice.record(prompt);
            }
            prop_assert_eq!(once, twice);
        }
    }
}
