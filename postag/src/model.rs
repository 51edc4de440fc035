use std::collections::HashMap;
use std::fs::File;
use std::io::{BufRead, BufReader, BufWriter, Read, Write};
use std::path::Path;

use crate::error::{PosError, Result};
use crate::features::WordFeatures;
use crate::tagger::Tagger;

/// Multi-class linear part-of-speech model.
///
/// Every label owns a bias and a sparse weight per attribute (see
/// [`WordFeatures::attributes`]). A token receives the label with the highest
/// score; ties go to the label that was declared first.
///
/// The model is loaded from a tab-separated text file:
///
/// ```text
/// # label  attribute  weight
/// NN	s1:s	0.25
/// JJ	is_first	-0.5
/// # label  bias
/// NN	0.1
/// ```
#[derive(Debug, Default, Clone)]
pub struct LinearTagger {
    labels: Vec<String>,
    bias: Vec<f64>,
    weights: HashMap<String, Vec<f64>>,
}

impl LinearTagger {
    /// Creates an empty model with no labels.
    pub fn new() -> Self {
        LinearTagger::default()
    }

    /// Loads a model from a file, replacing the current labels and weights.
    ///
    /// # Arguments
    /// * `filename`: The path to the model file.
    ///
    /// # Errors
    /// Returns an error if the file cannot be read, a line is malformed, or
    /// the file declares no labels.
    pub fn load_model(&mut self, filename: &Path) -> Result<()> {
        let file = File::open(filename)?;
        *self = Self::from_reader(file)?;
        Ok(())
    }

    /// Reads a model from any reader in the text model format.
    pub fn from_reader<R: Read>(reader: R) -> Result<Self> {
        let reader = BufReader::new(reader);
        let mut model = LinearTagger::new();

        for (i, line) in reader.lines().enumerate() {
            let line = line?;
            let line = line.trim_end_matches('\r');
            let line_no = i + 1;
            if line.trim().is_empty() || line.starts_with('#') {
                continue;
            }

            let parts: Vec<&str> = line.split('\t').collect();
            match parts.as_slice() {
                [label, bias] => {
                    let value = parse_weight(bias, line_no)?;
                    model.set_bias(label, value);
                }
                [label, attribute, weight] => {
                    let value = parse_weight(weight, line_no)?;
                    model.set_weight(label, attribute, value);
                }
                _ => {
                    return Err(PosError::ModelFormat {
                        line: line_no,
                        message: format!(
                            "expected 2 or 3 tab-separated fields, found {}",
                            parts.len()
                        ),
                    })
                }
            }
        }

        if model.labels.is_empty() {
            return Err(PosError::EmptyModel);
        }
        Ok(model)
    }

    /// Saves the model in the text format read by [`LinearTagger::load_model`].
    /// Zero weights are omitted.
    pub fn save_model(&self, filename: &Path) -> Result<()> {
        let mut file = BufWriter::new(File::create(filename)?);

        let mut attributes: Vec<&String> = self.weights.keys().collect();
        attributes.sort();

        for (idx, label) in self.labels.iter().enumerate() {
            writeln!(file, "{}\t{}", label, self.bias[idx])?;
            for attribute in &attributes {
                let w = self.weights[*attribute][idx];
                if w != 0.0 {
                    writeln!(file, "{}\t{}\t{}", label, attribute, w)?;
                }
            }
        }
        file.flush()?;
        Ok(())
    }

    /// Sets the bias of `label`, declaring the label if needed.
    pub fn set_bias(&mut self, label: &str, value: f64) {
        let idx = self.label_index(label);
        self.bias[idx] = value;
    }

    /// Sets the weight of `attribute` for `label`, declaring the label if needed.
    pub fn set_weight(&mut self, label: &str, attribute: &str, value: f64) {
        let idx = self.label_index(label);
        let num_labels = self.labels.len();
        let row = self
            .weights
            .entry(attribute.to_string())
            .or_insert_with(|| vec![0.0; num_labels]);
        row[idx] = value;
    }

    /// Labels in declaration order.
    pub fn labels(&self) -> &[String] {
        &self.labels
    }

    /// Scores every label for one feature record.
    pub fn scores(&self, features: &WordFeatures) -> Vec<f64> {
        let mut attrs: Vec<String> = features.attributes().into_iter().collect();
        attrs.sort();

        let mut scores = self.bias.clone();
        for attr in &attrs {
            if let Some(row) = self.weights.get(attr) {
                for (score, w) in scores.iter_mut().zip(row) {
                    *score += w;
                }
            }
        }
        scores
    }

    fn label_index(&mut self, label: &str) -> usize {
        if let Some(pos) = self.labels.iter().position(|l| l == label) {
            return pos;
        }
        self.labels.push(label.to_string());
        self.bias.push(0.0);
        for row in self.weights.values_mut() {
            row.push(0.0);
        }
        self.labels.len() - 1
    }
}

impl Tagger for LinearTagger {
    fn predict(&self, features: &[WordFeatures]) -> Result<Vec<String>> {
        if features.is_empty() {
            return Ok(Vec::new());
        }
        if self.labels.is_empty() {
            return Err(PosError::EmptyModel);
        }

        Ok(features
            .iter()
            .map(|f| {
                let scores = self.scores(f);
                let mut best = 0;
                for (idx, &score) in scores.iter().enumerate().skip(1) {
                    if score > scores[best] {
                        best = idx;
                    }
                }
                self.labels[best].clone()
            })
            .collect())
    }
}

fn parse_weight(value: &str, line: usize) -> Result<f64> {
    value.trim().parse().map_err(|_| PosError::ModelFormat {
        line,
        message: format!("invalid weight '{}'", value),
    })
}
