use crate::crawler::crawl_error::CrawlError;
use regex::Regex;
use scraper::{Html, Node};
use std::collections::HashSet;

const WORD_PATTERN: &str = r"\b[a-z]{2,}\b";

/// Elements whose text never counts as page content.
const HIDDEN_ELEMENTS: &[&str] = &["script", "style", "noscript", "template"];

/// Lower-cases text, keeps runs of two or more ASCII letters and drops stop-words.
#[derive(Debug, Clone)]
pub struct Tokenizer {
    word: Regex,
    stop_words: HashSet<String>,
}

impl Tokenizer {
    pub fn new(stop_words: &[String]) -> Result<Self, CrawlError> {
        let word = Regex::new(WORD_PATTERN).map_err(|source| CrawlError::InvalidPattern {
            pattern: WORD_PATTERN.to_string(),
            source,
        })?;
        Ok(Self {
            word,
            stop_words: stop_words.iter().map(|word| word.to_lowercase()).collect(),
        })
    }

    /// Every word of `text`, stop-words included.
    pub fn tokenize(&self, text: &str) -> Vec<String> {
        let lowered = text.to_lowercase();
        self.word
            .find_iter(&lowered)
            .map(|found| found.as_str().to_string())
            .collect()
    }

    /// The words of `text` that are not stop-words, in document order.
    pub fn filtered_tokens(&self, text: &str) -> Vec<String> {
        let mut tokens = self.tokenize(text);
        tokens.retain(|token| !self.stop_words.contains(token));
        tokens
    }
}

/// Visible text of a parsed document, one space between text nodes.
pub fn document_text(document: &Html) -> String {
    let mut text = String::new();
    for node in document.tree.root().descendants() {
        let Node::Text(fragment) = node.value() else {
            continue;
        };
        let hidden = node.ancestors().any(|ancestor| {
            ancestor
                .value()
                .as_element()
                .is_some_and(|element| HIDDEN_ELEMENTS.contains(&element.name()))
        });
        if !hidden {
            text.push_str(fragment);
            text.push(' ');
        }
    }
    text
}
