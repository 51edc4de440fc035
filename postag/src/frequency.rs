use std::collections::{HashMap, HashSet};

use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};

use crate::tagger::TaggedToken;

/// Words never counted as nouns, compared in lowercase.
pub static NOUN_EXCLUSIONS: Lazy<HashSet<&'static str>> = Lazy::new(|| {
    [
        "am", "btw", "get", "youre", "its", "theres", "whos", "thats", "i",
    ]
    .into_iter()
    .collect()
});

/// Words never counted as adjectives, compared in lowercase.
pub static ADJECTIVE_EXCLUSIONS: Lazy<HashSet<&'static str>> = Lazy::new(|| {
    [
        "more", "many", "other", "such", "much", "own", "im", "cant", "didnt", "ive", "u",
    ]
    .into_iter()
    .collect()
});

/// The word classes the aggregator keeps a table for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WordClass {
    Noun,
    Adjective,
}

impl WordClass {
    pub const ALL: [WordClass; 2] = [WordClass::Noun, WordClass::Adjective];

    /// Penn Treebank labels belonging to the class.
    pub fn labels(self) -> &'static [&'static str] {
        match self {
            WordClass::Noun => &["NN", "NNS"],
            WordClass::Adjective => &["JJ", "JJR", "JJS"],
        }
    }

    pub fn exclusions(self) -> &'static HashSet<&'static str> {
        match self {
            WordClass::Noun => &*NOUN_EXCLUSIONS,
            WordClass::Adjective => &*ADJECTIVE_EXCLUSIONS,
        }
    }

    /// Whether a tagged token is counted for this class.
    ///
    /// The label must belong to the class and the lowercased word must not be
    /// in the class exclusion set.
    pub fn qualifies(self, token: &TaggedToken) -> bool {
        self.labels().contains(&token.label.as_str())
            && !self.exclusions().contains(token.word.to_lowercase().as_str())
    }
}

/// Global position of a token occurrence: the corpus row and the token index.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Position {
    pub row: usize,
    pub token: usize,
}

impl Position {
    pub fn new(row: usize, token: usize) -> Self {
        Position { row, token }
    }
}

/// One row of a ranked word list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RankedEntry {
    pub word: String,
    pub count: usize,
}

impl RankedEntry {
    pub fn new(word: impl Into<String>, count: usize) -> Self {
        RankedEntry {
            word: word.into(),
            count,
        }
    }
}

/// Words ordered by count descending, ties broken by first occurrence.
pub type RankedList = Vec<RankedEntry>;

#[derive(Debug, Clone)]
struct Entry {
    word: String,
    count: usize,
    first_seen: Position,
}

/// Case-sensitive word counts that remember the order keys were first seen.
#[derive(Debug, Clone, Default)]
pub struct FrequencyTable {
    entries: Vec<Entry>,
    index: HashMap<String, usize>,
    latest: Option<Position>,
}

impl FrequencyTable {
    pub fn new() -> Self {
        FrequencyTable::default()
    }

    /// Counts one occurrence of `word`, placed after every position seen so far.
    pub fn increment(&mut self, word: &str) {
        let position = match self.latest {
            Some(p) => Position::new(p.row, p.token + 1),
            None => Position::default(),
        };
        self.add(word, 1, position);
    }

    /// Counts one occurrence of `word` seen at `position`.
    pub fn record(&mut self, word: &str, position: Position) {
        self.add(word, 1, position);
    }

    fn add(&mut self, word: &str, count: usize, position: Position) {
        self.latest = Some(self.latest.map_or(position, |p| p.max(position)));
        match self.index.get(word) {
            Some(&idx) => {
                let entry = &mut self.entries[idx];
                entry.count += count;
                entry.first_seen = entry.first_seen.min(position);
            }
            None => {
                self.index.insert(word.to_string(), self.entries.len());
                self.entries.push(Entry {
                    word: word.to_string(),
                    count,
                    first_seen: position,
                });
            }
        }
    }

    /// Adds every count of `other` into this table, keeping the earliest
    /// first-seen position of each word.
    pub fn merge(&mut self, other: FrequencyTable) {
        for entry in other.entries {
            self.add(&entry.word, entry.count, entry.first_seen);
        }
    }

    pub fn get(&self, word: &str) -> Option<usize> {
        self.index.get(word).map(|&idx| self.entries[idx].count)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Iterates `(word, count)` pairs in first-insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, usize)> {
        self.entries.iter().map(|e| (e.word.as_str(), e.count))
    }

    /// Returns the counts as a map, discarding order.
    pub fn counts(&self) -> HashMap<String, usize> {
        self.iter().map(|(w, c)| (w.to_string(), c)).collect()
    }

    /// Returns the `k` most frequent words.
    ///
    /// Words with equal counts keep the order of their first-seen position,
    /// then their insertion order.
    ///
    /// # Example
    /// ```
    /// use postag::frequency::{FrequencyTable, RankedEntry};
    ///
    /// let mut table = FrequencyTable::new();
    /// for word in ["game", "story", "game", "story"] {
    ///     table.increment(word);
    /// }
    /// table.increment("plot");
    ///
    /// assert_eq!(
    ///     table.rank(2),
    ///     vec![RankedEntry::new("game", 2), RankedEntry::new("story", 2)]
    /// );
    /// ```
    pub fn rank(&self, k: usize) -> RankedList {
        let mut entries: Vec<&Entry> = self.entries.iter().collect();
        entries.sort_by(|a, b| {
            b.count
                .cmp(&a.count)
                .then_with(|| a.first_seen.cmp(&b.first_seen))
        });
        entries
            .into_iter()
            .take(k)
            .map(|e| RankedEntry::new(e.word.clone(), e.count))
            .collect()
    }
}

/// Noun and adjective frequency tables of a corpus.
#[derive(Debug, Clone, Default)]
pub struct FrequencyAggregator {
    nouns: FrequencyTable,
    adjectives: FrequencyTable,
}

impl FrequencyAggregator {
    pub fn new() -> Self {
        FrequencyAggregator::default()
    }

    /// Counts the tokens of one tagged comment that qualify for `class`,
    /// after everything counted so far.
    pub fn update(&mut self, tagged: &[TaggedToken], class: WordClass) {
        let table = self.table_mut(class);
        for token in tagged.iter().filter(|t| class.qualifies(t)) {
            table.increment(&token.word);
        }
    }

    /// Counts the tokens of one tagged comment that qualify for `class`.
    ///
    /// # Arguments
    /// * `row` - The corpus row the comment came from, used for tie-breaks.
    /// * `tagged` - The tagged tokens of the comment.
    /// * `class` - The table to update.
    pub fn update_at(&mut self, row: usize, tagged: &[TaggedToken], class: WordClass) {
        let table = self.table_mut(class);
        for (i, token) in tagged.iter().enumerate() {
            if class.qualifies(token) {
                table.record(&token.word, Position::new(row, i));
            }
        }
    }

    /// Updates both tables with one tagged comment.
    pub fn add_comment(&mut self, row: usize, tagged: &[TaggedToken]) {
        for class in WordClass::ALL {
            self.update_at(row, tagged, class);
        }
    }

    pub fn merge(&mut self, other: FrequencyAggregator) {
        self.nouns.merge(other.nouns);
        self.adjectives.merge(other.adjectives);
    }

    pub fn table(&self, class: WordClass) -> &FrequencyTable {
        match class {
            WordClass::Noun => &self.nouns,
            WordClass::Adjective => &self.adjectives,
        }
    }

    fn table_mut(&mut self, class: WordClass) -> &mut FrequencyTable {
        match class {
            WordClass::Noun => &mut self.nouns,
            WordClass::Adjective => &mut self.adjectives,
        }
    }

    pub fn rank(&self, class: WordClass, k: usize) -> RankedList {
        self.table(class).rank(k)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tagged(pairs: &[(&str, &str)]) -> Vec<TaggedToken> {
        pairs.iter().map(|(w, l)| TaggedToken::new(*w, *l)).collect()
    }

    #[test]
    fn test_rank_stable_tie_break() {
        let mut table = FrequencyTable::new();
        for (word, n) in [("game", 5), ("story", 5), ("plot", 3)] {
            for _ in 0..n {
                table.increment(word);
            }
        }
        assert_eq!(
            table.rank(2),
            vec![RankedEntry::new("game", 5), RankedEntry::new("story", 5)]
        );
    }

    #[test]
    fn test_increment_after_record_keeps_insertion_order() {
        let mut table = FrequencyTable::new();
        table.record("early", Position::new(0, 1));
        table.increment("late");

        assert_eq!(
            table.rank(2),
            vec![RankedEntry::new("early", 1), RankedEntry::new("late", 1)]
        );

        table.record("later", Position::new(3, 0));
        table.increment("last");
        table.increment("early");
        assert_eq!(
            table.rank(4),
            vec![
                RankedEntry::new("early", 2),
                RankedEntry::new("late", 1),
                RankedEntry::new("later", 1),
                RankedEntry::new("last", 1),
            ]
        );
    }

    #[test]
    fn test_update_follows_insertion_order() {
        let mut agg = FrequencyAggregator::new();
        agg.update_at(5, &tagged(&[("plot", "NN")]), WordClass::Noun);
        agg.update(&tagged(&[("story", "NN"), ("fun", "JJ")]), WordClass::Noun);
        agg.update(&tagged(&[("fun", "JJ")]), WordClass::Adjective);

        assert_eq!(
            agg.rank(WordClass::Noun, 10),
            vec![RankedEntry::new("plot", 1), RankedEntry::new("story", 1)]
        );
        assert_eq!(
            agg.rank(WordClass::Adjective, 10),
            vec![RankedEntry::new("fun", 1)]
        );
    }

    #[test]
    fn test_rank_more_than_len() {
        let mut table = FrequencyTable::new();
        table.increment("a");
        assert_eq!(table.rank(100).len(), 1);
        assert!(FrequencyTable::new().rank(10).is_empty());
        assert!(table.rank(0).is_empty());
    }

    #[test]
    fn test_case_sensitive_keys() {
        let mut agg = FrequencyAggregator::new();
        agg.update(&tagged(&[("Game", "NN"), ("game", "NN")]), WordClass::Noun);

        let nouns = agg.table(WordClass::Noun);
        assert_eq!(nouns.get("Game"), Some(1));
        assert_eq!(nouns.get("game"), Some(1));
        assert_eq!(nouns.len(), 2);
    }

    #[test]
    fn test_exclusions_are_case_insensitive() {
        let mut agg = FrequencyAggregator::new();
        let tokens = tagged(&[
            ("its", "NN"),
            ("Its", "NN"),
            ("I", "NN"),
            ("MORE", "JJR"),
            ("u", "JJ"),
            ("great", "JJ"),
        ]);
        for _ in 0..10 {
            agg.add_comment(0, &tokens);
        }

        let nouns = agg.table(WordClass::Noun);
        assert!(nouns.is_empty());
        let adjectives = agg.table(WordClass::Adjective);
        assert_eq!(adjectives.counts(), HashMap::from([("great".to_string(), 10)]));
    }

    #[test]
    fn test_class_membership() {
        assert!(WordClass::Noun.qualifies(&TaggedToken::new("cats", "NNS")));
        assert!(!WordClass::Noun.qualifies(&TaggedToken::new("Paris", "NNP")));
        assert!(WordClass::Adjective.qualifies(&TaggedToken::new("best", "JJS")));
        assert!(!WordClass::Adjective.qualifies(&TaggedToken::new("quickly", "RB")));
        // exclusions only apply to their own class
        assert!(WordClass::Adjective.qualifies(&TaggedToken::new("its", "JJ")));
    }

    #[test]
    fn test_update_is_commutative() {
        let first = tagged(&[("cats", "NNS"), ("run", "VBP")]);
        let second = tagged(&[("dogs", "NNS"), ("run", "VBP")]);

        let mut forward = FrequencyAggregator::new();
        forward.add_comment(0, &first);
        forward.add_comment(1, &second);

        let mut backward = FrequencyAggregator::new();
        backward.add_comment(0, &second);
        backward.add_comment(1, &first);

        for class in WordClass::ALL {
            assert_eq!(forward.table(class).counts(), backward.table(class).counts());
        }
    }

    #[test]
    fn test_merge_keeps_first_seen_order() {
        // a later partial table merged first must not win the tie-break
        let mut late = FrequencyAggregator::new();
        late.add_comment(7, &tagged(&[("story", "NN")]));

        let mut early = FrequencyAggregator::new();
        early.add_comment(2, &tagged(&[("game", "NN")]));

        let mut merged = FrequencyAggregator::new();
        merged.merge(late);
        merged.merge(early);

        assert_eq!(
            merged.rank(WordClass::Noun, 10),
            vec![RankedEntry::new("game", 1), RankedEntry::new("story", 1)]
        );
    }

    #[test]
    fn test_ranked_entry_serialization() {
        let json = serde_json::to_string(&vec![RankedEntry::new("game", 3)]).unwrap();
        assert_eq!(json, r#"[{"word":"game","count":3}]"#);
    }
}
