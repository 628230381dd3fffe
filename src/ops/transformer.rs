//! Transforming operations: case changes, number/word conversion, word
//! replacement

use crate::ops::{parse_args, ArgMap, OpError};
use crate::registry::Operation;
use once_cell::sync::Lazy;
use regex::Regex;
use serde::Deserialize;
use std::collections::HashMap;

const CASES: &[&str] = &["lower", "upper", "title", "capitalize"];

#[derive(Debug, Deserialize)]
#[serde(default, deny_unknown_fields)]
struct ChangeCaseArgs {
    case: String,
}

impl Default for ChangeCaseArgs {
    fn default() -> Self {
        ChangeCaseArgs {
            case: "lower".to_string(),
        }
    }
}

/// Change the case of the text to the selected case type
pub fn change_case(text: &str, args: &ArgMap) -> Result<String, OpError> {
    let args: ChangeCaseArgs = parse_args(args)?;

    match args.case.as_str() {
        "lower" => Ok(text.to_lowercase()),
        "upper" => Ok(text.to_uppercase()),
        "title" => Ok(title_case(text)),
        "capitalize" => Ok(capitalize(text)),
        _ => Err(OpError::InvalidChoice {
            param: "case",
            value: args.case,
            valid: CASES,
        }),
    }
}

/// Uppercase every letter that follows a non-letter, lowercase the rest
fn title_case(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut prev_alphabetic = false;
    for ch in text.chars() {
        if ch.is_alphabetic() {
            if prev_alphabetic {
                out.extend(ch.to_lowercase());
            } else {
                out.extend(ch.to_uppercase());
            }
            prev_alphabetic = true;
        } else {
            out.push(ch);
            prev_alphabetic = false;
        }
    }
    out
}

fn capitalize(text: &str) -> String {
    let mut chars = text.chars();
    match chars.next() {
        Some(first) => first
            .to_uppercase()
            .chain(chars.flat_map(char::to_lowercase))
            .collect(),
        None => String::new(),
    }
}

/// Convert integer literals in the text to their English words
pub fn convert_numbers_to_words(text: &str, args: &ArgMap) -> Result<String, OpError> {
    #[derive(Debug, Default, Deserialize)]
    #[serde(deny_unknown_fields)]
    struct NoArgs {}
    let _: NoArgs = parse_args(args)?;

    static INTEGER: Lazy<Regex> = Lazy::new(|| Regex::new(r"\b\d+\b").unwrap());

    let converted = INTEGER.replace_all(text, |caps: &regex::Captures| {
        let literal = caps.get(0).unwrap().as_str();
        match literal.parse::<u64>() {
            Ok(n) => number_to_words(n),
            // Longer than u64: leave the literal alone
            Err(_) => literal.to_string(),
        }
    });
    Ok(converted.into_owned())
}

const ONES: [&str; 20] = [
    "zero", "one", "two", "three", "four", "five", "six", "seven", "eight", "nine", "ten",
    "eleven", "twelve", "thirteen", "fourteen", "fifteen", "sixteen", "seventeen", "eighteen",
    "nineteen",
];

const TENS: [&str; 10] = [
    "", "", "twenty", "thirty", "forty", "fifty", "sixty", "seventy", "eighty", "ninety",
];

const SCALES: [(u64, &str); 6] = [
    (1_000_000_000_000_000_000, "quintillion"),
    (1_000_000_000_000_000, "quadrillion"),
    (1_000_000_000_000, "trillion"),
    (1_000_000_000, "billion"),
    (1_000_000, "million"),
    (1_000, "thousand"),
];

fn number_to_words(n: u64) -> String {
    if n < 1_000 {
        return under_thousand_to_words(n);
    }
    let mut parts = Vec::new();
    let mut rest = n;
    for (scale, name) in SCALES {
        if rest >= scale {
            parts.push(format!("{} {}", under_thousand_to_words(rest / scale), name));
            rest %= scale;
        }
    }
    if rest > 0 {
        parts.push(under_thousand_to_words(rest));
    }
    parts.join(" ")
}

fn under_thousand_to_words(n: u64) -> String {
    debug_assert!(n < 1_000);
    if n < 20 {
        return ONES[n as usize].to_string();
    }
    if n < 100 {
        let tens = TENS[(n / 10) as usize];
        return if n % 10 == 0 {
            tens.to_string()
        } else {
            format!("{}-{}", tens, ONES[(n % 10) as usize])
        };
    }
    let hundreds = format!("{} hundred", ONES[(n / 100) as usize]);
    if n % 100 == 0 {
        hundreds
    } else {
        format!("{} {}", hundreds, under_thousand_to_words(n % 100))
    }
}

static NUMBER_WORDS: Lazy<HashMap<&'static str, u64>> = Lazy::new(|| {
    let mut map = HashMap::new();
    for (i, word) in ONES.iter().enumerate() {
        map.insert(*word, i as u64);
    }
    for (i, word) in TENS.iter().enumerate().skip(2) {
        map.insert(*word, (i as u64) * 10);
    }
    map.insert("hundred", 100);
    map.insert("thousand", 1_000);
    map.insert("million", 1_000_000);
    map.insert("billion", 1_000_000_000);
    map
});

/// Convert standalone English number words in the text to digits.
///
/// Each word converts independently ("twenty one" becomes "20 1"); compound
/// phrases are not summed.
pub fn convert_words_to_numbers(text: &str, args: &ArgMap) -> Result<String, OpError> {
    #[derive(Debug, Default, Deserialize)]
    #[serde(deny_unknown_fields)]
    struct NoArgs {}
    let _: NoArgs = parse_args(args)?;

    let converted: Vec<String> = text
        .split_whitespace()
        .map(|word| {
            if word.chars().all(char::is_alphabetic) {
                if let Some(value) = NUMBER_WORDS.get(word.to_lowercase().as_str()) {
                    return value.to_string();
                }
            }
            word.to_string()
        })
        .collect();
    Ok(converted.join(" "))
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct ReplaceWordsArgs {
    replacement_dict: HashMap<String, String>,
    #[serde(default)]
    case_sensitive: bool,
}

/// Replace whole words in the text according to a replacement dictionary.
///
/// Case-insensitive matching looks replacements up by the lowercased match,
/// so the dictionary keys should be lowercase in that mode.
pub fn replace_words(text: &str, args: &ArgMap) -> Result<String, OpError> {
    let args: ReplaceWordsArgs = parse_args(args)?;

    if args.replacement_dict.is_empty() {
        return Ok(text.to_string());
    }

    let alternation = args
        .replacement_dict
        .keys()
        .map(|key| regex::escape(key))
        .collect::<Vec<_>>()
        .join("|");
    let pattern = if args.case_sensitive {
        format!(r"\b({})\b", alternation)
    } else {
        format!(r"(?i)\b({})\b", alternation)
    };
    let re = Regex::new(&pattern).map_err(|e| OpError::InvalidArguments(e.to_string()))?;

    let replaced = re.replace_all(text, |caps: &regex::Captures| {
        let matched = caps.get(0).unwrap().as_str();
        let replacement = if args.case_sensitive {
            args.replacement_dict.get(matched)
        } else {
            args.replacement_dict.get(matched.to_lowercase().as_str())
        };
        replacement.cloned().unwrap_or_else(|| matched.to_string())
    });
    Ok(replaced.into_owned())
}

pub fn operations() -> Vec<Operation> {
    vec![
        Operation::new(
            "change_case",
            "Change the case of the text based on the selected case type.",
            change_case,
        ),
        Operation::new(
            "convert_numbers_to_words",
            "Convert numbers in the text to their corresponding words.",
            convert_numbers_to_words,
        ),
        Operation::new(
            "convert_words_to_numbers",
            "Convert number words in the text to digits.",
            convert_words_to_numbers,
        ),
        Operation::new(
            "replace_words",
            "Replace words in the text according to a replacement dictionary.",
            replace_words,
        ),
    ]
}
