//! Style rules collected while rendering.
//!
//! A fresh sheet is created for every render pass; only the sheet of the
//! final pass is extracted into the document.

use std::sync::{Mutex, PoisonError};

/// Collects CSS rules emitted by components during one render pass.
#[derive(Debug, Default)]
pub struct StyleSheet {
    rules: Mutex<Vec<String>>,
}

impl StyleSheet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a rule. Identical rules are kept once, in first-seen order.
    pub fn insert(&self, rule: impl Into<String>) {
        let rule = rule.into();
        let mut rules = self.rules.lock().unwrap_or_else(PoisonError::into_inner);
        if !rules.contains(&rule) {
            rules.push(rule);
        }
    }

    pub fn is_empty(&self) -> bool {
        self.rules
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .is_empty()
    }

    /// Consume the sheet into the `<style>` element placed in the document head.
    pub fn into_style_markup(self) -> String {
        let rules = self.rules.into_inner().unwrap_or_else(PoisonError::into_inner);
        if rules.is_empty() {
            return String::new();
        }
        // `</` inside a rule would close the element early.
        let css = rules.join("").replace("</", "<\\/");
        format!(r#"<style data-ssr-styles="">{css}</style>"#)
    }
}
