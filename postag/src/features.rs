use std::collections::HashSet;

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::error::{PosError, Result};

// Unicode decimal digits (general category Nd), not just ASCII.
static NUMERIC_PATTERN: Lazy<Regex> = Lazy::new(|| Regex::new(r"^\p{Nd}+$").unwrap());

/// Orthographic and contextual features of one token within its sentence.
///
/// A record is derived purely from the sentence and the token position, so
/// extracting the same position twice always yields an identical record.
/// Serialized field names for the affixes follow the conventional
/// feature-dictionary keys (`prefix-1` ... `suffix-3`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WordFeatures {
    pub word: String,
    pub is_first: bool,
    pub is_last: bool,
    pub is_capitalized: bool,
    pub is_all_caps: bool,
    pub is_all_lower: bool,
    #[serde(rename = "prefix-1")]
    pub prefix_1: String,
    #[serde(rename = "prefix-2")]
    pub prefix_2: String,
    #[serde(rename = "prefix-3")]
    pub prefix_3: String,
    #[serde(rename = "suffix-1")]
    pub suffix_1: String,
    #[serde(rename = "suffix-2")]
    pub suffix_2: String,
    #[serde(rename = "suffix-3")]
    pub suffix_3: String,
    pub prev_word: String,
    pub next_word: String,
    pub has_hyphen: bool,
    pub is_numeric: bool,
    pub capitals_inside: bool,
}

impl WordFeatures {
    /// Converts the record into a sparse attribute set.
    ///
    /// String features become `name:value` attributes and boolean features
    /// are present by name only when they are true.
    ///
    /// # Example
    /// ```
    /// use postag::features::extract;
    ///
    /// let features = extract(&["Run", "the", "Test"], 0).unwrap();
    /// let attrs = features.attributes();
    /// assert!(attrs.contains("w:Run"));
    /// assert!(attrs.contains("is_first"));
    /// assert!(!attrs.contains("is_last"));
    /// ```
    pub fn attributes(&self) -> HashSet<String> {
        let mut attrs: HashSet<String> = [
            format!("w:{}", self.word),
            format!("p1:{}", self.prefix_1),
            format!("p2:{}", self.prefix_2),
            format!("p3:{}", self.prefix_3),
            format!("s1:{}", self.suffix_1),
            format!("s2:{}", self.suffix_2),
            format!("s3:{}", self.suffix_3),
            format!("pw:{}", self.prev_word),
            format!("nw:{}", self.next_word),
        ]
        .into_iter()
        .collect();

        let flags = [
            ("is_first", self.is_first),
            ("is_last", self.is_last),
            ("is_capitalized", self.is_capitalized),
            ("is_all_caps", self.is_all_caps),
            ("is_all_lower", self.is_all_lower),
            ("has_hyphen", self.has_hyphen),
            ("is_numeric", self.is_numeric),
            ("capitals_inside", self.capitals_inside),
        ];
        attrs.extend(
            flags
                .iter()
                .filter(|(_, on)| *on)
                .map(|(name, _)| name.to_string()),
        );
        attrs
    }
}

/// Extracts the feature record of the token at `index`.
///
/// # Arguments
/// * `sentence` - The tokens of one sentence, in order.
/// * `index` - The position of the token to describe.
///
/// # Returns
/// The [`WordFeatures`] of the token.
///
/// # Errors
/// Returns [`PosError::IndexOutOfRange`] if `index` is not a valid position.
///
/// # Example
/// ```
/// use postag::features::extract;
///
/// let features = extract(&["a"], 0).unwrap();
/// assert!(features.is_first && features.is_last);
/// assert_eq!(features.prev_word, "");
/// ```
pub fn extract<S: AsRef<str>>(sentence: &[S], index: usize) -> Result<WordFeatures> {
    if index >= sentence.len() {
        return Err(PosError::IndexOutOfRange {
            index,
            len: sentence.len(),
        });
    }
    Ok(build(sentence, index))
}

/// Extracts one feature record per token of `sentence`.
pub fn extract_sentence<S: AsRef<str>>(sentence: &[S]) -> Vec<WordFeatures> {
    (0..sentence.len()).map(|i| build(sentence, i)).collect()
}

fn build<S: AsRef<str>>(sentence: &[S], i: usize) -> WordFeatures {
    let word = sentence[i].as_ref();
    let last = sentence.len() - 1;

    WordFeatures {
        word: word.to_string(),
        is_first: i == 0,
        is_last: i == last,
        is_capitalized: is_capitalized(word),
        is_all_caps: !word.is_empty() && word.to_uppercase() == word,
        is_all_lower: !word.is_empty() && word.to_lowercase() == word,
        prefix_1: prefix(word, 1),
        prefix_2: prefix(word, 2),
        prefix_3: prefix(word, 3),
        suffix_1: suffix(word, 1),
        suffix_2: suffix(word, 2),
        suffix_3: suffix(word, 3),
        prev_word: if i == 0 {
            String::new()
        } else {
            sentence[i - 1].as_ref().to_string()
        },
        next_word: if i == last {
            String::new()
        } else {
            sentence[i + 1].as_ref().to_string()
        },
        has_hyphen: word.contains('-'),
        is_numeric: NUMERIC_PATTERN.is_match(word),
        capitals_inside: capitals_inside(word),
    }
}

// An empty token has no first character and is never capitalized.
fn is_capitalized(word: &str) -> bool {
    match word.chars().next() {
        Some(first) => first.to_uppercase().eq(std::iter::once(first)),
        None => false,
    }
}

fn capitals_inside(word: &str) -> bool {
    let mut chars = word.chars();
    chars.next();
    let rest = chars.as_str();
    rest.to_lowercase() != rest
}

fn prefix(word: &str, n: usize) -> String {
    word.chars().take(n).collect()
}

fn suffix(word: &str, n: usize) -> String {
    let len = word.chars().count();
    word.chars().skip(len.saturating_sub(n)).collect()
}
