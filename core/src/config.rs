use crate::error::{FtsError, Result};
use serde::Deserialize;
use std::fs;
use std::path::Path;

pub const DEFAULT_CONFIG_FILE: &str = "config.json";

/// Tokenizer settings shared by indexing and querying.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Config {
    pub stop_words: Vec<String>,
    pub ngram_min_length: usize,
    pub ngram_max_length: usize,
}

impl Config {
    pub fn new(stop_words: Vec<String>, ngram_min_length: usize, ngram_max_length: usize) -> Result<Self> {
        let config = Self {
            stop_words: stop_words.into_iter().map(|w| w.to_lowercase()).collect(),
            ngram_min_length,
            ngram_max_length,
        };
        config.validate()?;
        Ok(config)
    }

    pub fn from_json_str(json: &str) -> Result<Self> {
        let raw: Config = serde_json::from_str(json).map_err(|e| {
            FtsError::Configuration(format!("Incorrect configuration format: {e}"))
        })?;
        Self::new(raw.stop_words, raw.ngram_min_length, raw.ngram_max_length)
    }

    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let json = fs::read_to_string(path).map_err(|e| {
            FtsError::Configuration(format!("cannot read {}: {e}", path.display()))
        })?;
        Self::from_json_str(&json)
    }

    pub fn is_stop_word(&self, word: &str) -> bool {
        self.stop_words.iter().any(|w| w == word)
    }

    fn validate(&self) -> Result<()> {
        if self.ngram_min_length == 0 {
            return Err(FtsError::Configuration("ngram_min_length must be at least 1".into()));
        }
        if self.ngram_max_length < self.ngram_min_length {
            return Err(FtsError::Configuration(
                "Incorrect ngram size. Max length can't be less than min length".into(),
            ));
        }
        Ok(())
    }
}
