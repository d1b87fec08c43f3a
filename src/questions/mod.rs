//! Question extraction and the answer form built from it.

mod parser;

#[cfg(test)]
#[path = "parser_tests.rs"]
mod parser_tests;

pub use parser::{parse_questions, QUESTION_MARKER};

use serde::Serialize;
use std::collections::{BTreeMap, HashSet};

use crate::error::ValidationError;

/// One entry of the answer form.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct QuestionItem {
    /// 1-based display index.
    pub index: usize,
    /// Question text, also the key of its answer.
    pub text: String,
    /// Saved answer, if any.
    pub answer: Option<String>,
}

/// Parsed questions paired with their saved answers.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct QuestionForm {
    pub items: Vec<QuestionItem>,
}

impl QuestionForm {
    /// Parse `questions_text` and attach answers from `answers`.
    pub fn build(questions_text: &str, answers: &BTreeMap<String, String>) -> Self {
        let items = parse_questions(questions_text)
            .into_iter()
            .enumerate()
            .map(|(i, text)| QuestionItem {
                index: i + 1,
                answer: answers.get(&text).cloned(),
                text,
            })
            .collect();
        Self { items }
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Look up a question by its display index.
    pub fn get(&self, index: usize) -> Result<&QuestionItem, ValidationError> {
        index
            .checked_sub(1)
            .and_then(|i| self.items.get(i))
            .ok_or(ValidationError::QuestionIndexOutOfRange {
                index,
                count: self.items.len(),
            })
    }

    /// Question texts that occur more than once, in first-seen order.
    ///
    /// Duplicates share a single answer slot.
    pub fn duplicate_texts(&self) -> Vec<&str> {
        let mut seen = HashSet::new();
        let mut reported = HashSet::new();
        let mut duplicates = Vec::new();
        for item in &self.items {
            let text = item.text.as_str();
            if !seen.insert(text) && reported.insert(text) {
                duplicates.push(text);
            }
        }
        duplicates
    }

    /// Number of questions with a non-blank answer.
    pub fn answered_count(&self) -> usize {
        self.items
            .iter()
            .filter(|item| item.answer.as_deref().is_some_and(|a| !a.trim().is_empty()))
            .count()
    }

    pub fn questions(&self) -> impl Iterator<Item = &str> {
        self.items.iter().map(|item| item.text.as_str())
    }
}
