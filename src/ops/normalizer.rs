//! Normalizing operations: contractions, lemmatization, unicode, stemming

use crate::ops::{contractions, parse_args, segmenter, ArgMap, OpError};
use crate::registry::Operation;
use once_cell::sync::Lazy;
use regex::Regex;
use rust_stemmers::{Algorithm, Stemmer};
use serde::Deserialize;
use std::collections::{HashMap, HashSet};
use unicode_normalization::UnicodeNormalization;

/// ASCII punctuation, matching the conventional `!"#$%&'()*+,-./:;<=>?@[\]^_`{|}~` set
const ASCII_PUNCTUATION: &str = "!\"#$%&'()*+,-./:;<=>?@[\\]^_`{|}~";

const STEMMERS: &[&str] = &["porter", "snowball"];

/// Expand contractions in the text ("it's" becomes "it is").
///
/// Matching is case-insensitive and a leading capital is preserved.
pub fn expand_contractions(text: &str, args: &ArgMap) -> Result<String, OpError> {
    #[derive(Debug, Default, Deserialize)]
    #[serde(deny_unknown_fields)]
    struct NoArgs {}
    let _: NoArgs = parse_args(args)?;

    let expanded = contractions::PATTERN.replace_all(text, |caps: &regex::Captures| {
        let matched = caps.get(0).unwrap().as_str();
        let expansion = contractions::LOOKUP
            .get(matched.to_lowercase().as_str())
            .copied()
            .unwrap_or(matched);
        if matched.chars().next().is_some_and(char::is_uppercase) {
            let mut chars = expansion.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars).collect(),
                None => String::new(),
            }
        } else {
            expansion.to_string()
        }
    });

    Ok(expanded.into_owned())
}

/// Lemmatize the words in the text.
///
/// A lightweight rule-based lemmatizer: a table of irregular plurals plus
/// standard suffix rules. It handles common plural nouns, not verb
/// conjugation.
pub fn lemmatize_text(text: &str, args: &ArgMap) -> Result<String, OpError> {
    #[derive(Debug, Default, Deserialize)]
    #[serde(deny_unknown_fields)]
    struct NoArgs {}
    let _: NoArgs = parse_args(args)?;

    let lemmas: Vec<String> = segmenter::word_tokens(text)
        .into_iter()
        .map(|token| lemmatize_word(&token))
        .collect();
    Ok(lemmas.join(" "))
}

static IRREGULAR_PLURALS: Lazy<HashMap<&'static str, &'static str>> = Lazy::new(|| {
    [
        ("children", "child"),
        ("feet", "foot"),
        ("geese", "goose"),
        ("knives", "knife"),
        ("lives", "life"),
        ("men", "man"),
        ("mice", "mouse"),
        ("people", "person"),
        ("teeth", "tooth"),
        ("wives", "wife"),
        ("women", "woman"),
    ]
    .into_iter()
    .collect()
});

fn lemmatize_word(word: &str) -> String {
    let lower = word.to_lowercase();
    if let Some(lemma) = IRREGULAR_PLURALS.get(lower.as_str()) {
        return (*lemma).to_string();
    }
    if !lower.chars().all(|c| c.is_ascii_alphabetic()) {
        return word.to_string();
    }

    if let Some(stem) = lower.strip_suffix("ies") {
        if stem.len() > 1 {
            return format!("{}y", stem);
        }
    }
    if let Some(stem) = lower.strip_suffix("ves") {
        if stem.len() > 1 {
            return format!("{}f", stem);
        }
    }
    for suffix in ["ches", "shes", "sses", "xes", "zes"] {
        if let Some(stem) = lower.strip_suffix(suffix) {
            return format!("{}{}", stem, &suffix[..suffix.len() - 2]);
        }
    }
    if lower.ends_with('s')
        && !lower.ends_with("ss")
        && !lower.ends_with("us")
        && !lower.ends_with("is")
        && lower.len() > 3
    {
        return lower[..lower.len() - 1].to_string();
    }
    word.to_string()
}

/// Normalize unicode to ASCII, dropping umlauts, accents, and other marks
pub fn normalize_unicode(text: &str, args: &ArgMap) -> Result<String, OpError> {
    #[derive(Debug, Default, Deserialize)]
    #[serde(deny_unknown_fields)]
    struct NoArgs {}
    let _: NoArgs = parse_args(args)?;

    Ok(text.nfkd().filter(char::is_ascii).collect())
}

/// Remove all numbers from the text
pub fn remove_numbers(text: &str, args: &ArgMap) -> Result<String, OpError> {
    #[derive(Debug, Default, Deserialize)]
    #[serde(deny_unknown_fields)]
    struct NoArgs {}
    let _: NoArgs = parse_args(args)?;

    static NUMBERS: Lazy<Regex> = Lazy::new(|| Regex::new(r"\d+").unwrap());
    Ok(NUMBERS.replace_all(text, "").into_owned())
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
struct PunctuationArgs {
    punctuations: Option<String>,
    remove_duplicates: bool,
}

/// Remove punctuation from the text.
///
/// With `punctuations` only the given characters are removed; with
/// `remove_duplicates` any remaining run of repeated terminal punctuation is
/// collapsed to one.
pub fn remove_punctuation(text: &str, args: &ArgMap) -> Result<String, OpError> {
    let args: PunctuationArgs = parse_args(args)?;

    let targets: HashSet<char> = args
        .punctuations
        .as_deref()
        .unwrap_or(ASCII_PUNCTUATION)
        .chars()
        .collect();
    let stripped: String = text.chars().filter(|c| !targets.contains(c)).collect();

    if args.remove_duplicates {
        static DUPLICATES: Lazy<Regex> = Lazy::new(|| Regex::new(r"([!?.,:;]){2,}").unwrap());
        Ok(DUPLICATES.replace_all(&stripped, "$1").into_owned())
    } else {
        Ok(stripped)
    }
}

#[derive(Debug, Deserialize)]
#[serde(default, deny_unknown_fields)]
struct StemArgs {
    stemmer: String,
}

impl Default for StemArgs {
    fn default() -> Self {
        StemArgs {
            stemmer: "porter".to_string(),
        }
    }
}

/// Stem the words in the text.
///
/// Both supported choices ("porter", "snowball") select the Snowball English
/// stemmer; tokens are lowercased before stemming, as stemmers expect.
pub fn stem_text(text: &str, args: &ArgMap) -> Result<String, OpError> {
    let args: StemArgs = parse_args(args)?;

    let choice = args.stemmer.to_lowercase();
    if !STEMMERS.contains(&choice.as_str()) {
        return Err(OpError::InvalidChoice {
            param: "stemmer",
            value: args.stemmer,
            valid: STEMMERS,
        });
    }

    static ENGLISH: Lazy<Stemmer> = Lazy::new(|| Stemmer::create(Algorithm::English));

    let stems: Vec<String> = segmenter::word_tokens(text)
        .into_iter()
        .map(|token| ENGLISH.stem(&token.to_lowercase()).into_owned())
        .collect();
    Ok(stems.join(" "))
}

pub fn operations() -> Vec<Operation> {
    vec![
        Operation::new(
            "expand_contractions",
            "Expand contractions in the text.",
            expand_contractions,
        ),
        Operation::new(
            "lemmatize_text",
            "Lemmatize the words in the text.",
            lemmatize_text,
        ),
        Operation::new(
            "normalize_unicode",
            "Normalize unicode characters to ASCII.",
            normalize_unicode,
        ),
        Operation::new(
            "remove_numbers",
            "Remove all numbers from the text.",
            remove_numbers,
        ),
        Operation::new(
            "remove_punctuation",
            "Remove punctuation from the text.",
            remove_punctuation,
        ),
        Operation::new("stem_text", "Stem the words in the text.", stem_text),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ops::test_support::args;
    use rstest::rstest;
    use serde_json::json;

    #[test]
    fn test_expand_contractions() {
        let result = expand_contractions("It's fine, isn't it?", &ArgMap::new()).unwrap();
        assert_eq!(result, "It is fine, is not it?");
    }

    #[test]
    fn test_expand_contractions_preserves_capital() {
        let result = expand_contractions("Won't you stay?", &ArgMap::new()).unwrap();
        assert_eq!(result, "Will not you stay?");
    }

    #[test]
    fn test_expand_contractions_leaves_possessives_alone() {
        let result = expand_contractions("the dog's bone", &ArgMap::new()).unwrap();
        assert_eq!(result, "the dog's bone");
    }

    #[rstest]
    #[case("dogs", "dog")]
    #[case("churches", "church")]
    #[case("ponies", "pony")]
    #[case("wolves", "wolf")]
    #[case("children", "child")]
    #[case("classes", "class")]
    #[case("bus", "bus")]
    #[case("analysis", "analysis")]
    fn test_lemmatize_word(#[case] word: &str, #[case] expected: &str) {
        assert_eq!(lemmatize_word(word), expected);
    }

    #[test]
    fn test_lemmatize_text() {
        let result = lemmatize_text("the children saw two mice", &ArgMap::new()).unwrap();
        assert_eq!(result, "the child saw two mouse");
    }

    #[test]
    fn test_normalize_unicode() {
        let result = normalize_unicode("Café Münster", &ArgMap::new()).unwrap();
        assert_eq!(result, "Cafe Munster");
    }

    #[test]
    fn test_remove_numbers() {
        let result = remove_numbers("route 66 and 42nd street", &ArgMap::new()).unwrap();
        assert_eq!(result, "route  and nd street");
    }

    #[test]
    fn test_remove_punctuation_default() {
        let result = remove_punctuation("hello, world!", &ArgMap::new()).unwrap();
        assert_eq!(result, "hello world");
    }

    #[test]
    fn test_remove_punctuation_custom_set() {
        let result = remove_punctuation(
            "hello, world!!",
            &args(json!({"punctuations": ","})),
        )
        .unwrap();
        assert_eq!(result, "hello world!!");
    }

    #[test]
    fn test_remove_punctuation_collapse_duplicates() {
        let result = remove_punctuation(
            "wait... what?!!",
            &args(json!({"punctuations": "#", "remove_duplicates": true})),
        )
        .unwrap();
        // The run "?!!" collapses to its final character
        assert_eq!(result, "wait. what!");
    }

    #[test]
    fn test_stem_text_porter() {
        let result = stem_text("running flies easily", &ArgMap::new()).unwrap();
        assert_eq!(result, "run fli easili");
    }

    #[test]
    fn test_stem_text_snowball_alias() {
        let default = stem_text("running", &ArgMap::new()).unwrap();
        let snowball = stem_text("running", &args(json!({"stemmer": "snowball"}))).unwrap();
        assert_eq!(default, snowball);
    }

    #[test]
    fn test_stem_text_unsupported_stemmer() {
        let result = stem_text("running", &args(json!({"stemmer": "lancaster"})));
        assert!(matches!(
            result,
            Err(OpError::InvalidChoice { param: "stemmer", .. })
        ));
    }
}
