//! Site messages and translation dictionaries reduced to lookup maps.
//!
//! The backend returns entries for the requested language alongside
//! language-neutral entries (no language code). The language's entry wins.

use crate::backend::{SiteMessage, TranslationEntry};
use crate::render::Dictionary;

fn reduce<'a>(
    entries: impl Iterator<Item = (&'a str, &'a str, Option<&'a str>)> + Clone,
    language_code: Option<&str>,
) -> Dictionary {
    let mut dictionary = Dictionary::new();
    for (key, text, _) in entries.clone().filter(|(_, _, lang)| lang.is_none()) {
        dictionary.insert(key.to_string(), text.to_string());
    }
    if let Some(language_code) = language_code {
        let localized = entries.filter(|(_, _, lang)| {
            lang.is_some_and(|lang| lang.eq_ignore_ascii_case(language_code))
        });
        for (key, text, _) in localized {
            dictionary.insert(key.to_string(), text.to_string());
        }
    }
    dictionary
}

/// Message name to text.
pub fn process_site_messages(messages: &[SiteMessage], language_code: Option<&str>) -> Dictionary {
    reduce(
        messages
            .iter()
            .map(|m| (m.name.as_str(), m.message.as_str(), m.language_code.as_deref())),
        language_code,
    )
}

/// Keyword to translation.
pub fn process_translations(
    entries: &[TranslationEntry],
    language_code: Option<&str>,
) -> Dictionary {
    reduce(
        entries.iter().map(|e| {
            (
                e.keyword.as_str(),
                e.translation.as_str(),
                e.language_code.as_deref(),
            )
        }),
        language_code,
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn message(name: &str, text: &str, lang: Option<&str>) -> SiteMessage {
        SiteMessage {
            name: name.to_string(),
            message: text.to_string(),
            language_code: lang.map(str::to_string),
        }
    }

    #[test]
    fn language_entry_beats_neutral_entry() {
        let messages = vec![
            message("Cart_Empty", "Localized", Some("fr-CA")),
            message("Cart_Empty", "Neutral", None),
            message("Only_Neutral", "Kept", None),
            message("Other_Language", "Dropped", Some("de-DE")),
        ];

        let dictionary = process_site_messages(&messages, Some("FR-ca"));

        assert_eq!(dictionary.get("Cart_Empty").map(String::as_str), Some("Localized"));
        assert_eq!(dictionary.get("Only_Neutral").map(String::as_str), Some("Kept"));
        assert!(!dictionary.contains_key("Other_Language"));
    }

    #[test]
    fn unknown_language_uses_neutral_entries() {
        let entries = vec![TranslationEntry {
            keyword: "Add to Cart".to_string(),
            translation: "Add to Cart".to_string(),
            language_code: None,
        }];
        let dictionary = process_translations(&entries, None);
        assert_eq!(dictionary.len(), 1);
    }
}
