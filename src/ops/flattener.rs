//! Flattening operations: structural cleanup and PII masking
//!
//! These operations strip structure out of text (markup, brackets, list
//! markers, whitespace) or mask personally identifiable information
//! (card numbers, email addresses, phone numbers, SSNs, URLs).

use crate::ops::{parse_args, segmenter, stopwords, ArgMap, OpError};
use crate::registry::Operation;
use once_cell::sync::Lazy;
use regex::{Match, NoExpand, Regex};
use serde::Deserialize;
use std::collections::HashSet;

const LINE_FEED_MODES: &[&str] = &["remove", "crlf", "lf"];
const WHITESPACE_MODES: &[&str] = &["leading", "trailing", "all", "strip"];

#[derive(Debug, Deserialize)]
#[serde(default, deny_unknown_fields)]
struct LineFeedArgs {
    mode: String,
}

impl Default for LineFeedArgs {
    fn default() -> Self {
        LineFeedArgs {
            mode: "remove".to_string(),
        }
    }
}

/// Handle line feeds according to the selected mode.
///
/// "remove" flattens newlines to spaces, "crlf" and "lf" normalize line
/// endings to the named convention.
pub fn handle_line_feeds(text: &str, args: &ArgMap) -> Result<String, OpError> {
    let args: LineFeedArgs = parse_args(args)?;

    match args.mode.as_str() {
        "remove" => Ok(text.replace('\n', " ").replace('\r', "")),
        "crlf" => Ok(text.replace('\n', "\r\n").replace("\r\r\n", "\r\n")),
        "lf" => Ok(text.replace("\r\n", "\n").replace('\r', "\n")),
        _ => Err(OpError::InvalidChoice {
            param: "mode",
            value: args.mode,
            valid: LINE_FEED_MODES,
        }),
    }
}

/// Remove text inside brackets, braces, and parentheses
pub fn remove_brackets(text: &str, args: &ArgMap) -> Result<String, OpError> {
    #[derive(Debug, Default, Deserialize)]
    #[serde(deny_unknown_fields)]
    struct NoArgs {}
    let _: NoArgs = parse_args(args)?;

    static BRACKETS: Lazy<Regex> =
        Lazy::new(|| Regex::new(r"\[.*?\]|\(.*?\)|\{.*?\}").unwrap());
    Ok(BRACKETS.replace_all(text, "").into_owned())
}

/// Strip HTML tags and decode the common entities
pub fn remove_html_tags(text: &str, args: &ArgMap) -> Result<String, OpError> {
    #[derive(Debug, Default, Deserialize)]
    #[serde(deny_unknown_fields)]
    struct NoArgs {}
    let _: NoArgs = parse_args(args)?;

    static CLOSING_TAG: Lazy<Regex> = Lazy::new(|| Regex::new(r"</[^>]+>").unwrap());
    static ANY_TAG: Lazy<Regex> = Lazy::new(|| Regex::new(r"<[^>]+>").unwrap());

    // Closing tags become spaces so adjacent block contents do not merge
    let spaced = CLOSING_TAG.replace_all(text, " ");
    let stripped = ANY_TAG.replace_all(&spaced, "");

    Ok(stripped
        .replace("&nbsp;", " ")
        .replace("&amp;", "&")
        .replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&quot;", "\"")
        .replace("&#39;", "'"))
}

/// Remove list markers (numbering and bullets) from the text
pub fn remove_list_markers(text: &str, args: &ArgMap) -> Result<String, OpError> {
    #[derive(Debug, Default, Deserialize)]
    #[serde(deny_unknown_fields)]
    struct NoArgs {}
    let _: NoArgs = parse_args(args)?;

    static MARKERS: Lazy<Regex> =
        Lazy::new(|| Regex::new(r"(^|\s)[0-9a-zA-Z][.)]\s+|(^|\s)[ivxIVX]+[.)]\s+").unwrap());
    Ok(MARKERS.replace_all(text, " ").into_owned())
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
struct SpecialCharsArgs {
    remove_unicode: bool,
    custom_characters: Option<String>,
}

/// Remove special characters from the text.
///
/// By default everything outside word characters and whitespace goes. With
/// `remove_unicode` the remainder is additionally restricted to ASCII; with
/// `custom_characters` only the given characters are removed.
pub fn remove_special_characters(text: &str, args: &ArgMap) -> Result<String, OpError> {
    let args: SpecialCharsArgs = parse_args(args)?;

    static SPECIAL: Lazy<Regex> = Lazy::new(|| Regex::new(r"[^\w\s]").unwrap());

    let processed = if args.remove_unicode {
        SPECIAL
            .replace_all(text, "")
            .chars()
            .filter(|c| c.is_ascii())
            .collect()
    } else if let Some(custom) = args.custom_characters {
        let targets: HashSet<char> = custom.chars().collect();
        text.chars().filter(|c| !targets.contains(c)).collect()
    } else {
        SPECIAL.replace_all(text, "").into_owned()
    };

    Ok(processed)
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
struct StopwordsArgs {
    stop_words: Option<Vec<String>>,
}

/// Remove stopwords from the text, using the built-in English list unless a
/// custom list is given
pub fn remove_stopwords(text: &str, args: &ArgMap) -> Result<String, OpError> {
    let args: StopwordsArgs = parse_args(args)?;

    let tokens = segmenter::word_tokens(text);
    let kept: Vec<String> = match args.stop_words {
        Some(custom) => {
            let set: HashSet<&str> = custom.iter().map(String::as_str).collect();
            tokens.into_iter().filter(|t| !set.contains(t.as_str())).collect()
        }
        None => tokens
            .into_iter()
            .filter(|t| !stopwords::ENGLISH_SET.contains(t.as_str()))
            .collect(),
    };

    Ok(kept.join(" "))
}

#[derive(Debug, Deserialize)]
#[serde(default, deny_unknown_fields)]
struct WhitespaceArgs {
    mode: String,
    keep_duplicates: bool,
}

impl Default for WhitespaceArgs {
    fn default() -> Self {
        WhitespaceArgs {
            mode: "strip".to_string(),
            keep_duplicates: false,
        }
    }
}

/// Remove whitespace according to the selected mode, collapsing duplicate
/// runs to single spaces unless `keep_duplicates` is set
pub fn remove_whitespace(text: &str, args: &ArgMap) -> Result<String, OpError> {
    let args: WhitespaceArgs = parse_args(args)?;

    static LEADING: Lazy<Regex> = Lazy::new(|| Regex::new(r"^\s+").unwrap());
    static TRAILING: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s+$").unwrap());
    static ALL: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s+").unwrap());
    static EDGES: Lazy<Regex> = Lazy::new(|| Regex::new(r"^\s+|\s+$").unwrap());

    let processed = match args.mode.as_str() {
        "leading" => LEADING.replace_all(text, "").into_owned(),
        "trailing" => TRAILING.replace_all(text, "").into_owned(),
        "all" => ALL.replace_all(text, "").into_owned(),
        "strip" => EDGES.replace_all(text, "").into_owned(),
        _ => {
            return Err(OpError::InvalidChoice {
                param: "mode",
                value: args.mode,
                valid: WHITESPACE_MODES,
            })
        }
    };

    if args.keep_duplicates {
        Ok(processed)
    } else {
        Ok(ALL.split(&processed).collect::<Vec<_>>().join(" "))
    }
}

#[derive(Debug, Deserialize)]
#[serde(default, deny_unknown_fields)]
struct MaskArgs {
    use_mask: bool,
    mask: Option<String>,
}

impl Default for MaskArgs {
    fn default() -> Self {
        MaskArgs {
            use_mask: true,
            mask: None,
        }
    }
}

impl MaskArgs {
    fn replacement(&self, default_mask: &str) -> String {
        if self.use_mask {
            self.mask.clone().unwrap_or_else(|| default_mask.to_string())
        } else {
            String::new()
        }
    }
}

/// Replace every accepted match of `re` with `replacement`, leaving rejected
/// candidates untouched
fn mask_candidates<F>(text: &str, re: &Regex, replacement: &str, mut accept: F) -> String
where
    F: FnMut(&str, &Match) -> bool,
{
    let mut out = String::with_capacity(text.len());
    let mut last = 0;
    for m in re.find_iter(text) {
        if accept(text, &m) {
            out.push_str(&text[last..m.start()]);
            out.push_str(replacement);
            last = m.end();
        }
    }
    out.push_str(&text[last..]);
    out
}

/// Remove or mask credit card numbers (major issuer prefixes)
pub fn remove_credit_card_numbers(text: &str, args: &ArgMap) -> Result<String, OpError> {
    let args: MaskArgs = parse_args(args)?;

    static CARD: Lazy<Regex> = Lazy::new(|| {
        Regex::new(
            r"(?x)
            4[0-9]{12}(?:[0-9]{3})?
            | (?:5[1-5][0-9]{2}|222[1-9]|22[3-9][0-9]|2[3-6][0-9]{2}|27[01][0-9]|2720)[0-9]{12}
            | 3[47][0-9]{13}
            | 3(?:0[0-5]|[68][0-9])[0-9]{11}
            | 6(?:011|5[0-9]{2})[0-9]{12}
            | (?:2131|1800|35\d{3})\d{11}",
        )
        .unwrap()
    });

    Ok(CARD
        .replace_all(text, NoExpand(&args.replacement("<CREDIT_CARD_NUMBER>")))
        .into_owned())
}

/// Remove or mask email addresses
pub fn remove_email_addresses(text: &str, args: &ArgMap) -> Result<String, OpError> {
    let args: MaskArgs = parse_args(args)?;

    static EMAIL: Lazy<Regex> =
        Lazy::new(|| Regex::new(r"[a-z0-9._%+-]+@[a-z0-9.-]+\.[a-z]{2,}").unwrap());

    Ok(EMAIL
        .replace_all(text, NoExpand(&args.replacement("<EMAIL_ADDRESS>")))
        .into_owned())
}

/// Remove or mask phone numbers
pub fn remove_phone_numbers(text: &str, args: &ArgMap) -> Result<String, OpError> {
    let args: MaskArgs = parse_args(args)?;

    static PHONE: Lazy<Regex> = Lazy::new(|| {
        Regex::new(r"(?:\+?\d{1,3})?[-. (]*\d{3}[-. )]*\d{3}[-. ]*\d{4}(?: *x\d+)?").unwrap()
    });

    // A candidate immediately followed by another digit is part of a longer
    // number, not a phone number
    let replacement = args.replacement("<PHONE_NUMBER>");
    Ok(mask_candidates(text, &PHONE, &replacement, |t, m| {
        !t[m.end()..]
            .chars()
            .next()
            .is_some_and(|c| c.is_ascii_digit())
    }))
}

/// Remove or mask US Social Security numbers.
///
/// Candidates with invalid area (000, 666, 9xx), group (00), or serial
/// (0000) fields are left alone, as are the well-known advertising numbers.
pub fn remove_social_security(text: &str, args: &ArgMap) -> Result<String, OpError> {
    let args: MaskArgs = parse_args(args)?;

    static SSN: Lazy<Regex> =
        Lazy::new(|| Regex::new(r"\b\d{3}-\d{2}-\d{4}\b|\b\d{9}\b").unwrap());

    let replacement = args.replacement("<SOCIAL_SECURITY_NUMBER>");
    Ok(mask_candidates(text, &SSN, &replacement, |_, m| {
        is_valid_ssn(m.as_str())
    }))
}

fn is_valid_ssn(candidate: &str) -> bool {
    let digits: String = candidate.chars().filter(char::is_ascii_digit).collect();
    if digits.len() != 9 {
        return false;
    }
    // Published advertising numbers, never issued to a person
    if digits == "219099999" || digits == "078051120" {
        return false;
    }
    let area = &digits[0..3];
    let group = &digits[3..5];
    let serial = &digits[5..9];
    area != "000" && area != "666" && !area.starts_with('9') && group != "00" && serial != "0000"
}

/// Remove or mask URLs
pub fn remove_url(text: &str, args: &ArgMap) -> Result<String, OpError> {
    let args: MaskArgs = parse_args(args)?;

    static URL: Lazy<Regex> = Lazy::new(|| Regex::new(r"(www|http)\S+").unwrap());

    Ok(URL
        .replace_all(text, NoExpand(&args.replacement("<URL>")))
        .into_owned())
}

pub fn operations() -> Vec<Operation> {
    vec![
        Operation::new(
            "handle_line_feeds",
            "Handle line feeds in the text based on the selected mode.",
            handle_line_feeds,
        ),
        Operation::new(
            "remove_brackets",
            "Remove text inside brackets, braces, and parentheses.",
            remove_brackets,
        ),
        Operation::new(
            "remove_credit_card_numbers",
            "Remove or mask credit card numbers in the text.",
            remove_credit_card_numbers,
        ),
        Operation::new(
            "remove_email_addresses",
            "Remove or mask email addresses in the text.",
            remove_email_addresses,
        ),
        Operation::new(
            "remove_html_tags",
            "Remove HTML tags from the text.",
            remove_html_tags,
        ),
        Operation::new(
            "remove_list_markers",
            "Remove list markers (numbering and bullets) from the text.",
            remove_list_markers,
        ),
        Operation::new(
            "remove_phone_numbers",
            "Remove or mask phone numbers in the text.",
            remove_phone_numbers,
        ),
        Operation::new(
            "remove_social_security",
            "Remove or mask Social Security numbers in the text.",
            remove_social_security,
        ),
        Operation::new(
            "remove_special_characters",
            "Remove special characters from the text.",
            remove_special_characters,
        ),
        Operation::new(
            "remove_stopwords",
            "Remove stopwords from the text.",
            remove_stopwords,
        ),
        Operation::new("remove_url", "Remove or mask URLs in the text.", remove_url),
        Operation::new(
            "remove_whitespace",
            "Remove whitespace from the text based on the selected mode.",
            remove_whitespace,
        ),
    ]
}
