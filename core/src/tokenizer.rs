use crate::config::Config;
use lazy_static::lazy_static;
use regex::Regex;
use unicode_normalization::UnicodeNormalization;

lazy_static! {
    static ref PUNCT: Regex = Regex::new(r"[[:punct:]]").expect("valid regex");
}

/// Prefix n-grams generated for one word, with the word's position in the
/// stop-word-filtered token stream.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedString {
    pub ngrams: Vec<String>,
    pub position: usize,
}

/// Tokenize text into prefix n-grams using NFKC normalization, punctuation
/// stripping, lowercasing and stop-word removal.
pub fn parse(text: &str, config: &Config) -> Vec<ParsedString> {
    let normalized = text.nfkc().collect::<String>();
    let stripped = PUNCT.replace_all(&normalized, "").to_lowercase();
    let words = stripped.split_whitespace().filter(|w| !config.is_stop_word(w));

    let mut parsed = Vec::new();
    for (position, word) in words.enumerate() {
        let ngrams = prefix_ngrams(word, config.ngram_min_length, config.ngram_max_length);
        if !ngrams.is_empty() {
            parsed.push(ParsedString { ngrams, position });
        }
    }
    parsed
}

fn prefix_ngrams(word: &str, min: usize, max: usize) -> Vec<String> {
    // byte offsets of every char boundary after the first char
    let ends: Vec<usize> = word
        .char_indices()
        .skip(1)
        .map(|(i, _)| i)
        .chain(std::iter::once(word.len()))
        .collect();
    (min..=max)
        .take_while(|len| *len <= ends.len())
        .map(|len| word[..ends[len - 1]].to_string())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config() -> Config {
        Config::new(vec!["the".into()], 3, 6).unwrap()
    }

    #[test]
    fn basic_parse() {
        let t = parse("The Matrix: 1", &config());
        assert_eq!(t.len(), 1);
        assert_eq!(t[0].ngrams, vec!["mat", "matr", "matri", "matrix"]);
        assert_eq!(t[0].position, 0);
    }

    #[test]
    fn prefixes_respect_char_boundaries() {
        assert_eq!(prefix_ngrams("café", 3, 6), vec!["caf", "café"]);
        assert!(prefix_ngrams("ab", 3, 6).is_empty());
    }
}
