//! Tokenizer (§4.2): produces character / word / n-gram token sequences.

use crate::config::{Config, Preprocessing};
use crate::text::UnicodeText;
use once_cell::sync::Lazy;
use regex::Regex;

/// Maximal `[A-Za-z0-9_]+` runs, scanned over the original UTF-8 bytes —
/// the same precompiled-regex idiom the teacher crate uses for its word
/// boundary detection, generalized from Unicode word characters (`\p{L}\p{N}`)
/// to the ASCII word-character class §4.2 specifies.
static WORD_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"[A-Za-z0-9_]+").unwrap());

/// Tokenize `text` per `config`. Returns an ordered sequence of tokens.
pub fn tokenize(text: &UnicodeText, config: &Config) -> Vec<UnicodeText> {
    match config.preprocessing {
        Preprocessing::None => vec![text.clone()],
        Preprocessing::Character => tokenize_character(text),
        Preprocessing::Word => tokenize_word(text),
        Preprocessing::NGram => tokenize_ngram(text, config.ngram_size as usize),
    }
}

fn tokenize_character(text: &UnicodeText) -> Vec<UnicodeText> {
    text.code_points()
        .iter()
        .map(|&cp| UnicodeText::from_code_points(vec![cp]))
        .collect()
}

fn tokenize_word(text: &UnicodeText) -> Vec<UnicodeText> {
    // The regex runs over the original bytes; §4.2 defines word runs as a
    // byte-level scan, not a code-point-level one.
    let as_str = String::from_utf8_lossy(text.as_bytes());
    WORD_RE
        .find_iter(&as_str)
        .map(|m| UnicodeText::from_str(m.as_str()))
        .collect()
}

fn tokenize_ngram(text: &UnicodeText, n: usize) -> Vec<UnicodeText> {
    let cps = text.code_points();
    if n == 0 {
        return vec![text.clone()];
    }
    if cps.len() < n {
        return vec![text.clone()];
    }
    (0..=cps.len() - n)
        .map(|i| UnicodeText::from_code_points(cps[i..i + n].to_vec()))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Algorithm;

    fn cfg(preprocessing: Preprocessing, ngram_size: u32) -> Config {
        Config {
            preprocessing,
            ngram_size,
            ..Config::new(Algorithm::Jaccard)
        }
    }

    #[test]
    fn none_preprocessing_yields_one_token() {
        let text = UnicodeText::from_str("hello world");
        let tokens = tokenize(&text, &cfg(Preprocessing::None, 2));
        assert_eq!(tokens.len(), 1);
        assert_eq!(tokens[0], text);
    }

    #[test]
    fn character_preprocessing_yields_one_token_per_code_point() {
        let text = UnicodeText::from_str("héllo");
        let tokens = tokenize(&text, &cfg(Preprocessing::Character, 2));
        assert_eq!(tokens.len(), 5);
    }

    #[test]
    fn word_preprocessing_splits_on_non_word_bytes() {
        let text = UnicodeText::from_str("foo_bar baz-42");
        let tokens = tokenize(&text, &cfg(Preprocessing::Word, 2));
        let words: Vec<String> = tokens.iter().map(|t| String::from_utf8_lossy(t.as_bytes()).to_string()).collect();
        assert_eq!(words, vec!["foo_bar", "baz", "42"]);
    }

    #[test]
    fn word_preprocessing_on_empty_string_yields_zero_tokens() {
        let text = UnicodeText::from_str("");
        let tokens = tokenize(&text, &cfg(Preprocessing::Word, 2));
        assert!(tokens.is_empty());
    }

    #[test]
    fn ngram_short_string_yields_one_whole_token() {
        let text = UnicodeText::from_str("ab");
        let tokens = tokenize(&text, &cfg(Preprocessing::NGram, 3));
        assert_eq!(tokens.len(), 1);
        assert_eq!(tokens[0], text);
    }

    #[test]
    fn ngram_sliding_window_produces_length_minus_n_plus_one_tokens() {
        let text = UnicodeText::from_str("hello");
        let tokens = tokenize(&text, &cfg(Preprocessing::NGram, 2));
        assert_eq!(tokens.len(), 4); // he, el, ll, lo
    }
}
