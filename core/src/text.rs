//! Lexical preprocessing of free-text ticket fields.
//!
//! Pipeline: lowercase → non-word characters become spaces → split on
//! whitespace → drop tokens of two characters or fewer → drop stop words.
//! "Word" characters are ASCII letters, digits and underscore.

const STOP_WORDS: &[&str] = &[
    "the", "and", "or", "but", "in", "on", "at", "to", "for", "of", "with",
    "by", "from", "up", "about", "into", "through", "during", "before",
    "after", "above", "below", "between", "among", "is", "are", "was",
    "were", "be", "been", "being", "have", "has", "had", "do", "does",
    "did", "will", "would", "could", "should", "may", "might", "must",
    "can", "this", "that", "these", "those", "a", "an", "as", "if",
    "then", "than", "so", "no", "not", "only", "own", "same", "such",
    "too", "very", "just", "now", "here", "there", "when", "where",
    "why", "how", "all", "any", "both", "each", "few", "more", "most",
    "other", "some", "what", "which", "who", "whom", "whose",
];

const MIN_TOKEN_CHARS: usize = 3;

pub fn is_stop_word(word: &str) -> bool {
    STOP_WORDS.contains(&word)
}

/// Tokenize `text` into lowercase feature words.
pub fn preprocess_text(text: &str) -> Vec<String> {
    let cleaned: String = text
        .to_lowercase()
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || c == '_' || c.is_whitespace() {
                c
            } else {
                ' '
            }
        })
        .collect();

    cleaned
        .split_whitespace()
        .filter(|w| w.chars().count() >= MIN_TOKEN_CHARS)
        .filter(|w| !is_stop_word(w))
        .map(String::from)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strips_punctuation_short_tokens_and_stop_words() {
        let tokens = preprocess_text("The login-page CRASHES on iOS, with error #42!");
        assert_eq!(tokens, vec!["login", "page", "crashes", "ios", "error"]);
    }

    #[test]
    fn underscores_survive_as_word_characters() {
        assert_eq!(preprocess_text("null_pointer in db_layer"), vec!["null_pointer", "db_layer"]);
    }

    #[test]
    fn empty_and_noise_only_inputs_yield_nothing() {
        assert!(preprocess_text("").is_empty());
        assert!(preprocess_text("?? -- ..").is_empty());
        assert!(preprocess_text("it is at an ok").is_empty());
    }

    #[test]
    fn stop_word_lookup_is_exact() {
        assert!(is_stop_word("whose"));
        assert!(!is_stop_word("Whose"));
        assert!(!is_stop_word("server"));
    }
}
