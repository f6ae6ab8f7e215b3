// Averaged GloVe word vectors.
//
// A sentence vector is the mean of the vectors of the words we recognise.
// Unknown words are skipped entirely: they neither add to the sum nor count
// toward the denominator, so "cat dog" with only "cat" known embeds exactly
// as "cat". A sentence with no known words is the zero vector.
//
// Vectors come from the GloVe Twitter release in its plain text format,
// one `token v1 v2 ... vN` entry per line.

use std::collections::HashMap;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

use anyhow::{Context, Result};
use tracing::debug;

use super::backend::{Backend, Embedding, GloveDim};
use super::traits::TextEmbedder;

/// Vocabulary (lowercase token -> row) plus the vector table.
///
/// The table is stored flat and row-major as f32, the precision GloVe is
/// published in. Values widen to f64 only while averaging.
pub struct StaticVectors {
    glove: GloveDim,
    dim: usize,
    word_index: HashMap<String, usize>,
    table: Vec<f32>,
}

impl StaticVectors {
    /// Build from an already loaded vocabulary and per-row table.
    ///
    /// This is the adapter constructor for vectors that don't come from a
    /// GloVe text file (other formats, hand-built fixtures). `dim` is the
    /// length of every row and may differ from `glove.dimension()`; the
    /// embeddings produced carry `dim` values. Rows of any other length
    /// and indices past the end of the table are rejected. Keys are folded
    /// to lowercase; when two keys fold together the smaller index wins.
    pub fn new(
        glove: GloveDim,
        dim: usize,
        word_index: HashMap<String, usize>,
        table: Vec<Vec<f32>>,
    ) -> Result<Self> {
        if let Some((row, v)) = table.iter().enumerate().find(|(_, v)| v.len() != dim) {
            anyhow::bail!(
                "Vector table row {row} has {} values, expected {dim}",
                v.len()
            );
        }
        let flat: Vec<f32> = table.into_iter().flatten().collect();
        Self::from_flat(glove, dim, word_index, flat)
    }

    fn from_flat(
        glove: GloveDim,
        dim: usize,
        word_index: HashMap<String, usize>,
        table: Vec<f32>,
    ) -> Result<Self> {
        let rows = if dim == 0 { 0 } else { table.len() / dim };

        let mut folded: HashMap<String, usize> = HashMap::with_capacity(word_index.len());
        for (word, index) in word_index {
            if index >= rows {
                anyhow::bail!("Word '{word}' points at row {index}, but the table has {rows} rows");
            }
            folded
                .entry(word.to_lowercase())
                .and_modify(|existing| *existing = (*existing).min(index))
                .or_insert(index);
        }

        Ok(Self {
            glove,
            dim,
            word_index: folded,
            table,
        })
    }

    /// Parse the GloVe text format. Blank lines are ignored; the first
    /// occurrence of a token wins.
    pub fn from_reader<R: BufRead>(reader: R, glove: GloveDim) -> Result<Self> {
        let dim = glove.dimension();
        let mut word_index = HashMap::new();
        let mut table: Vec<f32> = Vec::new();

        for (line_no, line) in reader.lines().enumerate() {
            let line = line.with_context(|| format!("Failed to read line {}", line_no + 1))?;
            let mut parts = line.split_whitespace();
            let Some(word) = parts.next() else {
                continue;
            };

            let word = word.to_lowercase();
            let row_start = table.len();
            for p in parts {
                let value = p
                    .parse::<f32>()
                    .with_context(|| format!("Invalid number on line {}", line_no + 1))?;
                table.push(value);
            }

            let count = table.len() - row_start;
            if count != dim {
                anyhow::bail!(
                    "Line {} has {count} values for '{word}', expected {dim}",
                    line_no + 1
                );
            }

            if word_index.contains_key(&word) {
                table.truncate(row_start);
                continue;
            }
            word_index.insert(word, row_start / dim);
        }

        Self::from_flat(glove, dim, word_index, table)
    }

    /// Load a GloVe text file from disk.
    pub fn load(path: &Path, glove: GloveDim) -> Result<Self> {
        if !path.exists() {
            anyhow::bail!(
                "GloVe vectors not found: {}\nRun `semrank status` to see where they belong.",
                path.display()
            );
        }
        let file = File::open(path)
            .with_context(|| format!("Failed to open GloVe vectors {}", path.display()))?;
        let vectors = Self::from_reader(BufReader::new(file), glove)
            .with_context(|| format!("Failed to parse GloVe vectors {}", path.display()))?;

        debug!(
            words = vectors.vocab_size(),
            dim = vectors.dim,
            "Loaded GloVe vectors from {}",
            path.display()
        );
        Ok(vectors)
    }

    pub fn vocab_size(&self) -> usize {
        self.word_index.len()
    }

    /// Vector for a single word, looked up case-insensitively.
    pub fn word_vector(&self, word: &str) -> Option<&[f32]> {
        self.word_index
            .get(&word.to_lowercase())
            .map(|&i| &self.table[i * self.dim..(i + 1) * self.dim])
    }
}

impl TextEmbedder for StaticVectors {
    fn backend(&self) -> Backend {
        Backend::Glove(self.glove)
    }

    fn dimension(&self) -> usize {
        self.dim
    }

    fn embed(&self, text: &str) -> Embedding {
        let mut sum = vec![0.0_f64; self.dim];
        let mut valid_words = 0usize;

        for word in text.split_whitespace() {
            if let Some(vector) = self.word_vector(word) {
                for (acc, &v) in sum.iter_mut().zip(vector) {
                    *acc += f64::from(v);
                }
                valid_words += 1;
            }
        }

        if valid_words > 0 {
            let n = valid_words as f64;
            for v in &mut sum {
                *v /= n;
            }
        }

        Embedding::new(self.backend(), sum)
    }
}
