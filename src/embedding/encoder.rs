// Sentence encoder backend: all-MiniLM-L6-v2 run locally via ONNX.
//
// The whole text goes through the BERT model and token embeddings are
// mean-pooled over the attention mask into one 384-dimensional vector.
//
// Encoding is fail-soft. A tokenizer or inference failure is logged and
// the caller gets a zero vector, which the ranker scores as 0 against
// everything.

use std::path::Path;
use std::sync::Mutex;

use anyhow::{Context, Result};
use ort::session::Session;
use ort::value::Tensor;
use tokenizers::Tokenizer;
use tracing::{debug, warn};

use super::backend::{Backend, Embedding, MINILM_DIM};
use super::traits::TextEmbedder;

/// File names expected inside the encoder's model directory.
pub const MODEL_FILE: &str = "model.onnx";
pub const TOKENIZER_FILE: &str = "tokenizer.json";

/// Local ONNX sentence encoder.
///
/// `Session::run` takes `&mut self`, hence the Mutex. Callers that share
/// one encoder across tasks serialize inference through it.
pub struct SentenceEncoder {
    session: Mutex<Session>,
    tokenizer: Tokenizer,
}

impl SentenceEncoder {
    /// Load the model and tokenizer from `model_dir`.
    ///
    /// Expects `model.onnx` and `tokenizer.json` in the directory.
    /// Run `semrank download-model` first if they don't exist.
    pub fn load(model_dir: &Path) -> Result<Self> {
        let model_path = model_dir.join(MODEL_FILE);
        let tokenizer_path = model_dir.join(TOKENIZER_FILE);

        if !model_path.exists() {
            anyhow::bail!(
                "Encoder model not found: {}\nRun `semrank download-model` to download it.",
                model_path.display()
            );
        }
        if !tokenizer_path.exists() {
            anyhow::bail!(
                "Encoder tokenizer not found: {}\nRun `semrank download-model` to download it.",
                tokenizer_path.display()
            );
        }

        let session = Session::builder()
            .context("Failed to create ONNX session builder")?
            .commit_from_file(&model_path)
            .with_context(|| format!("Failed to load encoder model from {}", model_path.display()))?;

        let tokenizer = Tokenizer::from_file(&tokenizer_path)
            .map_err(|e| anyhow::anyhow!("Failed to load encoder tokenizer: {}", e))?;

        debug!("Loaded sentence encoder from {}", model_dir.display());

        Ok(Self {
            session: Mutex::new(session),
            tokenizer,
        })
    }

    /// Strict batch encoding. Errors propagate; the trait methods wrap
    /// this with the zero-vector fallback.
    pub fn try_embed_batch(&self, texts: &[&str]) -> Result<Vec<Vec<f64>>> {
        if texts.is_empty() {
            return Ok(Vec::new());
        }

        let encodings = texts
            .iter()
            .map(|t| {
                self.tokenizer
                    .encode(*t, true)
                    .map_err(|e| anyhow::anyhow!("Tokenization failed: {}", e))
            })
            .collect::<Result<Vec<_>>>()?;

        let batch_size = encodings.len();
        let max_len = encodings
            .iter()
            .map(|e| e.get_ids().len())
            .max()
            .unwrap_or(0);

        if max_len == 0 {
            return Ok(vec![vec![0.0; MINILM_DIM]; batch_size]);
        }

        // input_ids and attention_mask are right-padded with 0;
        // token_type_ids is all zeros for single-sentence input.
        let mut input_ids: Vec<i64> = Vec::with_capacity(batch_size * max_len);
        let mut attention_mask: Vec<i64> = Vec::with_capacity(batch_size * max_len);
        let token_type_ids: Vec<i64> = vec![0; batch_size * max_len];

        for enc in &encodings {
            let ids = enc.get_ids();
            let pad_len = max_len - ids.len();

            input_ids.extend(ids.iter().map(|&id| id as i64));
            input_ids.extend(std::iter::repeat_n(0i64, pad_len));
            attention_mask.extend(enc.get_attention_mask().iter().map(|&m| m as i64));
            attention_mask.extend(std::iter::repeat_n(0i64, pad_len));
        }

        let shape = [batch_size as i64, max_len as i64];
        let input_ids_tensor =
            Tensor::from_array((shape, input_ids)).context("Failed to create input_ids tensor")?;
        let attention_mask_tensor = Tensor::from_array((shape, attention_mask.clone()))
            .context("Failed to create attention_mask tensor")?;
        let token_type_ids_tensor = Tensor::from_array((shape, token_type_ids))
            .context("Failed to create token_type_ids tensor")?;

        // last_hidden_state: [batch, seq_len, 384]
        let hidden_states = {
            let mut session = self
                .session
                .lock()
                .map_err(|e| anyhow::anyhow!("Session lock poisoned: {}", e))?;

            let outputs = session
                .run(ort::inputs! {
                    "input_ids" => input_ids_tensor,
                    "attention_mask" => attention_mask_tensor,
                    "token_type_ids" => token_type_ids_tensor
                })
                .context("Encoder ONNX inference failed")?;

            let (_shape, data) = outputs[0]
                .try_extract_tensor::<f32>()
                .context("Failed to extract encoder output tensor")?;

            data.to_vec()
        };

        let expected = batch_size * max_len * MINILM_DIM;
        if hidden_states.len() != expected {
            anyhow::bail!(
                "Encoder returned {} values, expected {expected}",
                hidden_states.len()
            );
        }

        Ok(mean_pool(&hidden_states, &attention_mask, batch_size, max_len))
    }
}

/// Average token embeddings weighted by the attention mask.
fn mean_pool(
    hidden_states: &[f32],
    attention_mask: &[i64],
    batch_size: usize,
    max_len: usize,
) -> Vec<Vec<f64>> {
    let mut pooled = Vec::with_capacity(batch_size);

    for i in 0..batch_size {
        let mut sum = vec![0.0_f64; MINILM_DIM];
        let mut mask_sum = 0.0_f64;

        for j in 0..max_len {
            let mask_val = attention_mask[i * max_len + j] as f64;
            if mask_val > 0.0 {
                mask_sum += mask_val;
                let offset = (i * max_len + j) * MINILM_DIM;
                for (k, acc) in sum.iter_mut().enumerate() {
                    *acc += hidden_states[offset + k] as f64 * mask_val;
                }
            }
        }

        if mask_sum > 0.0 {
            for val in &mut sum {
                *val /= mask_sum;
            }
        }

        pooled.push(sum);
    }

    pooled
}

/// Turn a strict encoding result into one embedding per input text.
/// Any failure becomes `count` zero vectors at the encoder's dimension.
fn fail_soft(result: Result<Vec<Vec<f64>>>, count: usize) -> Vec<Embedding> {
    match result {
        Ok(vectors) if vectors.len() == count => vectors
            .into_iter()
            .map(|v| Embedding::new(Backend::MiniLm, v))
            .collect(),
        Ok(vectors) => {
            warn!(
                expected = count,
                got = vectors.len(),
                "Encoder returned the wrong number of vectors, using zero vectors"
            );
            zeros(count)
        }
        Err(e) => {
            warn!(error = %e, count, "Sentence encoding failed, using zero vectors");
            zeros(count)
        }
    }
}

fn zeros(count: usize) -> Vec<Embedding> {
    (0..count).map(|_| Embedding::zeros(Backend::MiniLm)).collect()
}

/// Single-text variant of `fail_soft`.
fn fail_soft_one(result: Result<Vec<Vec<f64>>>) -> Embedding {
    fail_soft(result, 1)
        .pop()
        .unwrap_or_else(|| Embedding::zeros(Backend::MiniLm))
}

impl TextEmbedder for SentenceEncoder {
    fn backend(&self) -> Backend {
        Backend::MiniLm
    }

    fn embed(&self, text: &str) -> Embedding {
        fail_soft_one(self.try_embed_batch(&[text]))
    }

    fn embed_batch(&self, texts: &[&str]) -> Vec<Embedding> {
        fail_soft(self.try_embed_batch(texts), texts.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mean_pool_ignores_padding() {
        // One text, two positions: a real token then padding.
        let mut hidden = vec![0.0_f32; 2 * MINILM_DIM];
        hidden[0] = 2.0;
        hidden[MINILM_DIM] = 100.0;
        let pooled = mean_pool(&hidden, &[1, 0], 1, 2);
        assert_eq!(pooled.len(), 1);
        assert!((pooled[0][0] - 2.0).abs() < 1e-9);
    }

    #[test]
    fn test_mean_pool_averages_real_tokens() {
        let mut hidden = vec![0.0_f32; 2 * MINILM_DIM];
        hidden[1] = 1.0;
        hidden[MINILM_DIM + 1] = 3.0;
        let pooled = mean_pool(&hidden, &[1, 1], 1, 2);
        assert!((pooled[0][1] - 2.0).abs() < 1e-9);
    }

    #[test]
    fn test_mean_pool_all_masked_is_zero() {
        let hidden = vec![1.0_f32; MINILM_DIM];
        let pooled = mean_pool(&hidden, &[0], 1, 1);
        assert!(pooled[0].iter().all(|&v| v == 0.0));
    }

    #[test]
    fn test_failed_batch_becomes_zero_vectors() {
        let out = fail_soft(Err(anyhow::anyhow!("inference exploded")), 3);
        assert_eq!(out.len(), 3);
        for e in &out {
            assert_eq!(e.backend(), Backend::MiniLm);
            assert_eq!(e.dimension(), MINILM_DIM);
            assert!(e.is_zero());
        }
    }

    #[test]
    fn test_failed_single_embed_is_zero_vector() {
        let e = fail_soft_one(Err(anyhow::anyhow!("Tokenization failed")));
        assert_eq!(e.dimension(), MINILM_DIM);
        assert!(e.is_zero());
    }

    #[test]
    fn test_wrong_vector_count_becomes_zero_vectors() {
        let out = fail_soft(Ok(vec![vec![1.0; MINILM_DIM]]), 2);
        assert_eq!(out.len(), 2);
        assert!(out.iter().all(|e| e.is_zero()));
    }

    #[test]
    fn test_successful_batch_passes_through() {
        let out = fail_soft(Ok(vec![vec![0.5; MINILM_DIM], vec![0.0; MINILM_DIM]]), 2);
        assert_eq!(out[0].values()[0], 0.5);
        assert!(out[1].is_zero());
    }

    #[test]
    fn test_load_missing_model_is_setup_error() {
        let dir = std::env::temp_dir().join("semrank-test-no-encoder");
        let err = SentenceEncoder::load(&dir).err().unwrap();
        assert!(err.to_string().contains("download-model"));
    }
}
