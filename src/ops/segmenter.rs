//! Segmenting operations: tokenization and n-gram extraction
//!
//! Segmenting transforms produce lists; as pipeline operations they emit one
//! item per line so their output still composes with later steps.

use crate::ops::{parse_args, ArgMap, OpError};
use crate::registry::Operation;
use once_cell::sync::Lazy;
use regex::Regex;
use serde::Deserialize;

/// Split text into word tokens: contiguous word characters (apostrophes
/// kept inside words) or single punctuation marks
pub(crate) fn word_tokens(text: &str) -> Vec<String> {
    static TOKEN: Lazy<Regex> = Lazy::new(|| Regex::new(r"\w+(?:'\w+)*|[^\w\s]").unwrap());
    TOKEN
        .find_iter(text)
        .map(|m| m.as_str().to_string())
        .collect()
}

/// Split text into sentences at runs of terminal punctuation followed by
/// whitespace. Deliberately simple: it does not special-case abbreviations.
pub(crate) fn sentence_tokens(text: &str) -> Vec<String> {
    let chars: Vec<(usize, char)> = text.char_indices().collect();
    let mut sentences = Vec::new();
    let mut start = 0;
    let mut i = 0;

    while i < chars.len() {
        if matches!(chars[i].1, '.' | '!' | '?') {
            // Absorb the terminator run plus any closing quotes or parens
            let mut j = i + 1;
            while j < chars.len() && matches!(chars[j].1, '.' | '!' | '?' | '"' | '\'' | ')') {
                j += 1;
            }
            if j >= chars.len() || chars[j].1.is_whitespace() {
                let end = if j < chars.len() { chars[j].0 } else { text.len() };
                let sentence = text[start..end].trim();
                if !sentence.is_empty() {
                    sentences.push(sentence.to_string());
                }
                while j < chars.len() && chars[j].1.is_whitespace() {
                    j += 1;
                }
                start = if j < chars.len() { chars[j].0 } else { text.len() };
                i = j;
                continue;
            }
        }
        i += 1;
    }

    let tail = text[start..].trim();
    if !tail.is_empty() {
        sentences.push(tail.to_string());
    }
    sentences
}

#[derive(Debug, Deserialize)]
#[serde(default, deny_unknown_fields)]
struct NgramArgs {
    n: i64,
    padding: bool,
    tokens: Option<Vec<String>>,
}

impl Default for NgramArgs {
    fn default() -> Self {
        NgramArgs {
            n: 2,
            padding: false,
            tokens: None,
        }
    }
}

/// Extract n-grams from the text, one per line.
///
/// Tokens default to whitespace-split words; `padding` adds `<s>`/`</s>`
/// sentinels at the edges, so with padding `n` may exceed the token count
/// by at most one.
pub fn extract_ngrams(text: &str, args: &ArgMap) -> Result<String, OpError> {
    let args: NgramArgs = parse_args(args)?;

    let n = match usize::try_from(args.n) {
        Ok(n) if n >= 1 => n,
        _ => {
            return Err(OpError::InvalidArguments(format!(
                "Invalid n: '{}'. It should be an integer greater than 0.",
                args.n
            )))
        }
    };

    let mut tokens = match args.tokens {
        Some(tokens) => tokens,
        None => text.split_whitespace().map(String::from).collect(),
    };

    // The sentinel count and the output size scale with n, so n has to be
    // bounded by the input before anything is allocated
    if args.padding {
        if n > tokens.len() + 1 {
            return Err(OpError::InvalidArguments(format!(
                "Invalid n: '{}'. With padding it may exceed the token count ({}) by at most one.",
                args.n,
                tokens.len()
            )));
        }
        let mut padded = vec!["<s>".to_string(); n - 1];
        padded.append(&mut tokens);
        padded.extend(std::iter::repeat("</s>".to_string()).take(n - 1));
        tokens = padded;
    }

    if tokens.len() < n {
        return Ok(String::new());
    }

    let grams: Vec<String> = tokens.windows(n).map(|w| w.join(" ")).collect();
    Ok(grams.join("\n"))
}

/// Tokenize the text into sentences, one per line
pub fn tokenize_sentences(text: &str, args: &ArgMap) -> Result<String, OpError> {
    #[derive(Debug, Default, Deserialize)]
    #[serde(deny_unknown_fields)]
    struct NoArgs {}
    let _: NoArgs = parse_args(args)?;

    Ok(sentence_tokens(text).join("\n"))
}

/// Tokenize the text into words, one per line
pub fn tokenize_words(text: &str, args: &ArgMap) -> Result<String, OpError> {
    #[derive(Debug, Default, Deserialize)]
    #[serde(deny_unknown_fields)]
    struct NoArgs {}
    let _: NoArgs = parse_args(args)?;

    Ok(word_tokens(text).join("\n"))
}

pub fn operations() -> Vec<Operation> {
    vec![
        Operation::new(
            "extract_ngrams",
            "Extract n-grams from the text.",
            extract_ngrams,
        ),
        Operation::new(
            "tokenize_sentences",
            "Tokenize the text into sentences.",
            tokenize_sentences,
        ),
        Operation::new(
            "tokenize_words",
            "Tokenize the text into words.",
            tokenize_words,
        ),
    ]
}
