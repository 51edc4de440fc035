use once_cell::sync::Lazy;
use regex::Regex;

/// Splits free text into an ordered sequence of token strings.
///
/// The pipeline only relies on this contract, so any tokenizer can be plugged
/// in. Closures of type `Fn(&str) -> Vec<String>` implement it as well.
pub trait Tokenizer {
    fn tokenize(&self, text: &str) -> Vec<String>;
}

impl<F> Tokenizer for F
where
    F: Fn(&str) -> Vec<String>,
{
    fn tokenize(&self, text: &str) -> Vec<String> {
        self(text)
    }
}

// Words (with inner hyphens or apostrophes), an ellipsis, or any single
// non-space, non-word character.
static TOKEN_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\w+(?:['’-]\w+)*|\.\.\.|[^\w\s]").unwrap());

// Checked in order, "n't" first.
const CLITICS: [&str; 14] = [
    "n't", "n’t", "'s", "’s", "'re", "’re", "'ve", "’ve", "'ll", "’ll", "'d", "’d", "'m", "’m",
];

/// Word tokenizer in the style of the Penn Treebank conventions.
///
/// Punctuation is split from words and English clitics are separated from
/// their host (`don't` becomes `do` + `n't`, `it's` becomes `it` + `'s`).
#[derive(Debug, Clone, Default)]
pub struct RegexTokenizer;

impl RegexTokenizer {
    /// Creates a new instance of [`RegexTokenizer`].
    ///
    /// # Example
    /// ```
    /// use postag::tokenizer::{RegexTokenizer, Tokenizer};
    ///
    /// let tokenizer = RegexTokenizer::new();
    /// assert_eq!(tokenizer.tokenize("Great video!"), vec!["Great", "video", "!"]);
    /// ```
    pub fn new() -> Self {
        RegexTokenizer
    }

    fn push_word(tokens: &mut Vec<String>, word: &str) {
        for clitic in CLITICS {
            if let Some(split) = split_suffix(word, clitic) {
                tokens.push(word[..split].to_string());
                tokens.push(word[split..].to_string());
                return;
            }
        }
        tokens.push(word.to_string());
    }
}

impl Tokenizer for RegexTokenizer {
    fn tokenize(&self, text: &str) -> Vec<String> {
        let mut tokens = Vec::new();
        for m in TOKEN_PATTERN.find_iter(text) {
            Self::push_word(&mut tokens, m.as_str());
        }
        tokens
    }
}

// Returns the byte offset where `suffix` starts if `word` ends with it
// (ASCII case-insensitively) and something is left in front of it.
fn split_suffix(word: &str, suffix: &str) -> Option<usize> {
    let start = word.len().checked_sub(suffix.len())?;
    if start == 0 {
        return None;
    }
    let tail = word.get(start..)?;
    if tail.eq_ignore_ascii_case(suffix) {
        Some(start)
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tokenize_punctuation() {
        let tokenizer = RegexTokenizer::new();
        assert_eq!(
            tokenizer.tokenize("Best game ever, honestly."),
            vec!["Best", "game", "ever", ",", "honestly", "."]
        );
    }

    #[test]
    fn test_tokenize_contractions() {
        let tokenizer = RegexTokenizer::new();
        assert_eq!(
            tokenizer.tokenize("I don't think it's OK"),
            vec!["I", "do", "n't", "think", "it", "'s", "OK"]
        );
        assert_eq!(tokenizer.tokenize("I'm here"), vec!["I", "'m", "here"]);
        assert_eq!(tokenizer.tokenize("DON'T"), vec!["DO", "N'T"]);
    }

    #[test]
    fn test_tokenize_keeps_hyphenated_words() {
        let tokenizer = RegexTokenizer::new();
        assert_eq!(
            tokenizer.tokenize("a well-made open-world game..."),
            vec!["a", "well-made", "open-world", "game", "..."]
        );
    }

    #[test]
    fn test_tokenize_empty() {
        let tokenizer = RegexTokenizer::new();
        assert!(tokenizer.tokenize("").is_empty());
        assert!(tokenizer.tokenize("   \n\t").is_empty());
    }

    #[test]
    fn test_closure_tokenizer() {
        let tokenizer = |text: &str| -> Vec<String> {
            text.split_whitespace().map(|s| s.to_string()).collect()
        };
        assert_eq!(tokenizer.tokenize("cats run"), vec!["cats", "run"]);
    }

    #[test]
    fn test_split_suffix() {
        assert_eq!(split_suffix("don't", "n't"), Some(2));
        assert_eq!(split_suffix("n't", "n't"), None);
        assert_eq!(split_suffix("cat", "n't"), None);
    }
}
