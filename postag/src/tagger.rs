use serde::{Deserialize, Serialize};

use crate::error::{PosError, Result};
use crate::features::{extract_sentence, WordFeatures};

/// A pretrained part-of-speech model.
///
/// Implementations receive the feature records of exactly one sentence and
/// must return one label per record, in the same order. Labels use the Penn
/// Treebank alphabet (`NN`, `NNS`, `JJ`, ...).
pub trait Tagger {
    fn predict(&self, features: &[WordFeatures]) -> Result<Vec<String>>;
}

impl<T: Tagger + ?Sized> Tagger for &T {
    fn predict(&self, features: &[WordFeatures]) -> Result<Vec<String>> {
        (**self).predict(features)
    }
}

impl<T: Tagger + ?Sized> Tagger for Box<T> {
    fn predict(&self, features: &[WordFeatures]) -> Result<Vec<String>> {
        (**self).predict(features)
    }
}

/// A token paired with the label the tagger assigned to it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaggedToken {
    pub word: String,
    pub label: String,
}

impl TaggedToken {
    pub fn new(word: impl Into<String>, label: impl Into<String>) -> Self {
        TaggedToken {
            word: word.into(),
            label: label.into(),
        }
    }
}

/// Checks the tagger contract and aligns labels with tokens.
pub struct TaggerAdapter<T> {
    tagger: T,
}

impl<T: Tagger> TaggerAdapter<T> {
    pub fn new(tagger: T) -> Self {
        TaggerAdapter { tagger }
    }

    /// Returns the wrapped tagger.
    pub fn inner(&self) -> &T {
        &self.tagger
    }

    /// Predicts one label per feature record.
    ///
    /// # Errors
    /// Returns [`PosError::LengthMismatch`] if the tagger returns a different
    /// number of labels than it was given records. The output is never
    /// truncated or padded.
    pub fn tag(&self, features: &[WordFeatures]) -> Result<Vec<String>> {
        let labels = self.tagger.predict(features)?;
        if labels.len() != features.len() {
            return Err(PosError::LengthMismatch {
                expected: features.len(),
                actual: labels.len(),
            });
        }
        Ok(labels)
    }

    /// Extracts features for `sentence`, tags them and zips the result.
    ///
    /// # Arguments
    /// * `sentence` - The tokens of one sentence.
    ///
    /// # Returns
    /// One [`TaggedToken`] per token, in sentence order.
    ///
    /// # Errors
    /// Propagates tagger failures and length mismatches.
    pub fn tag_sentence<S: AsRef<str>>(&self, sentence: &[S]) -> Result<Vec<TaggedToken>> {
        let features = extract_sentence(sentence);
        let labels = self.tag(&features)?;
        Ok(sentence
            .iter()
            .zip(labels)
            .map(|(word, label)| TaggedToken::new(word.as_ref(), label))
            .collect())
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;

    use std::collections::HashMap;

    /// Tags words from a fixed lexicon and everything else as `NN`.
    pub(crate) struct LexiconTagger {
        pub(crate) lexicon: HashMap<String, String>,
    }

    impl LexiconTagger {
        pub(crate) fn new(entries: &[(&str, &str)]) -> Self {
            LexiconTagger {
                lexicon: entries
                    .iter()
                    .map(|(w, l)| (w.to_string(), l.to_string()))
                    .collect(),
            }
        }
    }

    impl Tagger for LexiconTagger {
        fn predict(&self, features: &[WordFeatures]) -> Result<Vec<String>> {
            Ok(features
                .iter()
                .map(|f| {
                    self.lexicon
                        .get(&f.word)
                        .cloned()
                        .unwrap_or_else(|| "NN".to_string())
                })
                .collect())
        }
    }

    /// Always drops the last label.
    pub(crate) struct ShortTagger;

    impl Tagger for ShortTagger {
        fn predict(&self, features: &[WordFeatures]) -> Result<Vec<String>> {
            Ok(features
                .iter()
                .skip(1)
                .map(|_| "NN".to_string())
                .collect())
        }
    }

    #[test]
    fn test_tag_sentence() {
        let adapter = TaggerAdapter::new(LexiconTagger::new(&[("the", "DT"), ("Run", "VB")]));
        let tagged = adapter.tag_sentence(&["Run", "the", "Test"]).unwrap();

        assert_eq!(
            tagged,
            vec![
                TaggedToken::new("Run", "VB"),
                TaggedToken::new("the", "DT"),
                TaggedToken::new("Test", "NN"),
            ]
        );
    }

    #[test]
    fn test_tag_length_mismatch() {
        let adapter = TaggerAdapter::new(ShortTagger);
        let result = adapter.tag_sentence(&["two", "tokens"]);

        assert!(matches!(
            result,
            Err(PosError::LengthMismatch {
                expected: 2,
                actual: 1
            })
        ));
    }

    #[test]
    fn test_tag_empty_sentence() {
        let adapter = TaggerAdapter::new(ShortTagger);
        let tagged = adapter.tag_sentence::<&str>(&[]).unwrap();
        assert!(tagged.is_empty());
    }

    #[test]
    fn test_boxed_tagger() {
        let tagger: Box<dyn Tagger> = Box::new(LexiconTagger::new(&[]));
        let adapter = TaggerAdapter::new(tagger);
        assert_eq!(adapter.tag_sentence(&["x"]).unwrap()[0].label, "NN");
    }
}
