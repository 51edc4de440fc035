use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};

use rayon::prelude::*;
use rayon::ThreadPoolBuilder;
use serde::Serialize;
use serde_json::Value;

use crate::corpus::value_type;
use crate::error::{PosError, Result};
use crate::frequency::{FrequencyAggregator, RankedList, WordClass};
use crate::tagger::{TaggedToken, Tagger, TaggerAdapter};
use crate::tokenizer::Tokenizer;

/// Number of words kept in each ranked list by default.
pub const DEFAULT_TOP_K: usize = 100;

/// Runtime configuration of a [`Pipeline`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PipelineConfig {
    /// Length of each ranked list. Default: 100.
    pub top_k: usize,
    /// Worker threads used by [`Pipeline::run_parallel`]. Default: 1.
    pub num_threads: usize,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        PipelineConfig {
            top_k: DEFAULT_TOP_K,
            num_threads: 1,
        }
    }
}

/// A corpus row that was skipped because its cell is not text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Diagnostic {
    pub row: usize,
    pub value: String,
    pub value_type: &'static str,
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "non-string comment at row {}: {} (type: {})",
            self.row, self.value, self.value_type
        )
    }
}

/// Result of a pipeline run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct PipelineReport {
    pub nouns: RankedList,
    pub adjectives: RankedList,
    pub diagnostics: Vec<Diagnostic>,
    /// Rows that were tokenized, tagged and counted.
    pub processed: usize,
    /// Rows skipped with a diagnostic.
    pub skipped: usize,
    /// Whether the run stopped before the end of the corpus.
    pub cancelled: bool,
}

// Counts gathered by one worker (or by the whole sequential run).
#[derive(Default)]
struct Partial {
    aggregator: FrequencyAggregator,
    diagnostics: Vec<Diagnostic>,
    processed: usize,
    cancelled: bool,
}

impl Partial {
    fn merge(&mut self, other: Partial) {
        self.aggregator.merge(other.aggregator);
        self.diagnostics.extend(other.diagnostics);
        self.processed += other.processed;
        self.cancelled |= other.cancelled;
    }
}

enum RowOutcome {
    Tagged(Vec<TaggedToken>),
    Skipped(Diagnostic),
}

/// Turns a comment corpus into ranked noun and adjective lists.
///
/// For every row the pipeline tokenizes the comment, extracts one feature
/// record per token, tags the records and counts the qualifying nouns and
/// adjectives. Rows that are not text are skipped with a [`Diagnostic`]; a
/// tagger that breaks its length contract aborts the run.
pub struct Pipeline<K, T> {
    tokenizer: K,
    adapter: TaggerAdapter<T>,
    config: PipelineConfig,
}

impl<K: Tokenizer, T: Tagger> Pipeline<K, T> {
    pub fn new(tokenizer: K, tagger: T, config: PipelineConfig) -> Self {
        Pipeline {
            tokenizer,
            adapter: TaggerAdapter::new(tagger),
            config,
        }
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    fn tag_row(&self, row: usize, value: &Value) -> Result<RowOutcome> {
        let comment = match value {
            Value::String(text) => text,
            other => {
                let diagnostic = Diagnostic {
                    row,
                    value: other.to_string(),
                    value_type: value_type(other),
                };
                tracing::warn!("{}", diagnostic);
                return Ok(RowOutcome::Skipped(diagnostic));
            }
        };

        let sentence = self.tokenizer.tokenize(comment);
        tracing::debug!(row, tokens = sentence.len(), "tagging comment");
        let tagged = self
            .adapter
            .tag_sentence(&sentence)
            .map_err(|e| PosError::Tagging {
                row,
                source: Box::new(e),
            })?;
        Ok(RowOutcome::Tagged(tagged))
    }

    /// Processes one row into `aggregator`.
    ///
    /// The comment is fully tagged before any table is touched, so on error
    /// the aggregator is left unchanged.
    ///
    /// # Returns
    /// `Some(diagnostic)` if the row was skipped, `None` if it was counted.
    ///
    /// # Errors
    /// Returns [`PosError::Tagging`] if the tagger fails on this row.
    pub fn process_row(
        &self,
        row: usize,
        value: &Value,
        aggregator: &mut FrequencyAggregator,
    ) -> Result<Option<Diagnostic>> {
        match self.tag_row(row, value)? {
            RowOutcome::Tagged(tagged) => {
                aggregator.add_comment(row, &tagged);
                Ok(None)
            }
            RowOutcome::Skipped(diagnostic) => Ok(Some(diagnostic)),
        }
    }

    /// Processes `corpus` in order on the current thread.
    pub fn run(&self, corpus: &[Value]) -> Result<PipelineReport> {
        self.run_until(corpus, &AtomicBool::new(true))
    }

    /// Like [`Pipeline::run`], but stops between rows once `running` is
    /// cleared and ranks what was counted so far.
    pub fn run_until(&self, corpus: &[Value], running: &AtomicBool) -> Result<PipelineReport> {
        let mut partial = Partial::default();

        for (row, value) in corpus.iter().enumerate() {
            if !running.load(Ordering::SeqCst) {
                partial.cancelled = true;
                break;
            }
            self.fold_row(&mut partial, row, value)?;
        }

        Ok(self.report(partial))
    }

    fn fold_row(&self, partial: &mut Partial, row: usize, value: &Value) -> Result<()> {
        match self.process_row(row, value, &mut partial.aggregator)? {
            Some(diagnostic) => partial.diagnostics.push(diagnostic),
            None => partial.processed += 1,
        }
        Ok(())
    }

    fn report(&self, mut partial: Partial) -> PipelineReport {
        partial.diagnostics.sort_by_key(|d| d.row);

        let report = PipelineReport {
            nouns: partial.aggregator.rank(WordClass::Noun, self.config.top_k),
            adjectives: partial
                .aggregator
                .rank(WordClass::Adjective, self.config.top_k),
            skipped: partial.diagnostics.len(),
            diagnostics: partial.diagnostics,
            processed: partial.processed,
            cancelled: partial.cancelled,
        };

        tracing::info!(
            processed = report.processed,
            skipped = report.skipped,
            nouns = report.nouns.len(),
            adjectives = report.adjectives.len(),
            cancelled = report.cancelled,
            "pipeline finished"
        );
        report
    }
}

impl<K, T> Pipeline<K, T>
where
    K: Tokenizer + Sync,
    T: Tagger + Sync,
{
    /// Processes `corpus` on a pool of `num_threads` workers.
    ///
    /// Each worker counts into its own tables, which are merged by summing
    /// counts. Ties are still broken by the global row and token position of
    /// the first occurrence, so the ranking matches [`Pipeline::run`].
    pub fn run_parallel(&self, corpus: &[Value], running: &AtomicBool) -> Result<PipelineReport> {
        let pool = ThreadPoolBuilder::new()
            .num_threads(self.config.num_threads)
            .build()?;

        let partial = pool.install(|| {
            corpus
                .par_iter()
                .enumerate()
                .try_fold(Partial::default, |mut partial, (row, value)| {
                    if !running.load(Ordering::SeqCst) {
                        partial.cancelled = true;
                        return Ok(partial);
                    }
                    self.fold_row(&mut partial, row, value)?;
                    Ok::<_, PosError>(partial)
                })
                .try_reduce(Partial::default, |mut left, right| {
                    left.merge(right);
                    Ok(left)
                })
        })?;

        Ok(self.report(partial))
    }
}

/// Runs the whole pipeline over `corpus` and returns the `k` most frequent
/// nouns and adjectives.
///
/// # Example
/// ```
/// use postag::features::WordFeatures;
/// use postag::pipeline::run;
/// use postag::tagger::Tagger;
/// use postag::tokenizer::RegexTokenizer;
/// use serde_json::json;
///
/// struct AllNouns;
///
/// impl Tagger for AllNouns {
///     fn predict(&self, features: &[WordFeatures]) -> postag::error::Result<Vec<String>> {
///         Ok(vec!["NN".to_string(); features.len()])
///     }
/// }
///
/// let corpus = vec![json!("great game"), json!(null), json!("game over")];
/// let (nouns, adjectives) = run(&corpus, RegexTokenizer::new(), AllNouns, 1).unwrap();
/// assert_eq!(nouns[0].word, "game");
/// assert_eq!(nouns[0].count, 2);
/// assert!(adjectives.is_empty());
/// ```
pub fn run<K: Tokenizer, T: Tagger>(
    corpus: &[Value],
    tokenizer: K,
    tagger: T,
    k: usize,
) -> Result<(RankedList, RankedList)> {
    let config = PipelineConfig {
        top_k: k,
        ..PipelineConfig::default()
    };
    let report = Pipeline::new(tokenizer, tagger, config).run(corpus)?;
    Ok((report.nouns, report.adjectives))
}
