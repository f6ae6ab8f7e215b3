// Model artifact locations and the encoder download helper.
//
// Layout under the model directory:
//   all-MiniLM-L6-v2/model.onnx, all-MiniLM-L6-v2/tokenizer.json
//   glove/glove.twitter.27B.{25,50,100}d.txt
//
// The encoder comes from HuggingFace. The GloVe Twitter vectors are taken
// from the Stanford NLP release (glove.twitter.27B.zip) and unpacked into
// the glove/ subdirectory by hand.
//
// Files live in a platform-appropriate directory
// (~/.local/share/semrank/models/ on Linux) so they persist across runs.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use indicatif::{ProgressBar, ProgressStyle};
use tokio::io::AsyncWriteExt;
use tracing::info;

use crate::embedding::encoder::{MODEL_FILE, TOKENIZER_FILE};
use crate::embedding::{Backend, GloveDim};

/// HuggingFace repo for the sentence encoder.
const ENCODER_HF_URL: &str =
    "https://huggingface.co/sentence-transformers/all-MiniLM-L6-v2/resolve/main";

/// Remote path of the ONNX export inside the HuggingFace repo.
const ENCODER_REMOTE_MODEL: &str = "onnx/model.onnx";

/// Where the GloVe Twitter vectors are published.
pub const GLOVE_SOURCE_URL: &str = "http://nlp.stanford.edu/data/glove.twitter.27B.zip";

/// Returns the default directory for storing model files.
pub fn default_model_dir() -> PathBuf {
    dirs::data_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("semrank")
        .join("models")
}

/// Subdirectory within model_dir for the sentence encoder.
pub fn encoder_model_dir(base: &Path) -> PathBuf {
    base.join("all-MiniLM-L6-v2")
}

/// Subdirectory within model_dir for GloVe text files.
pub fn glove_dir(base: &Path) -> PathBuf {
    base.join("glove")
}

/// Full path of the GloVe text file for one dimension.
pub fn glove_path(base: &Path, dim: GloveDim) -> PathBuf {
    glove_dir(base).join(format!("glove.twitter.27B.{}.txt", dim.label()))
}

/// Check whether both encoder files exist.
pub fn encoder_files_present(base: &Path) -> bool {
    let dir = encoder_model_dir(base);
    dir.join(MODEL_FILE).exists() && dir.join(TOKENIZER_FILE).exists()
}

pub fn glove_file_present(base: &Path, dim: GloveDim) -> bool {
    glove_path(base, dim).exists()
}

/// Whether everything a backend needs is on disk.
pub fn backend_files_present(base: &Path, backend: Backend) -> bool {
    match backend {
        Backend::Glove(dim) => glove_file_present(base, dim),
        Backend::MiniLm => encoder_files_present(base),
    }
}

/// Download the sentence encoder (model + tokenizer).
///
/// Shows a progress bar for the model file. Skips files that already exist.
pub async fn download_model(dir: &Path) -> Result<()> {
    let encoder_dir = encoder_model_dir(dir);
    std::fs::create_dir_all(&encoder_dir).with_context(|| {
        format!(
            "Failed to create encoder model directory: {}",
            encoder_dir.display()
        )
    })?;

    println!("\nSentence encoder (all-MiniLM-L6-v2):");

    let tokenizer_path = encoder_dir.join(TOKENIZER_FILE);
    if tokenizer_path.exists() {
        info!("Encoder tokenizer already exists, skipping");
        println!("  {TOKENIZER_FILE} (already exists)");
    } else {
        println!("  Downloading {TOKENIZER_FILE}...");
        download_file(
            &format!("{ENCODER_HF_URL}/{TOKENIZER_FILE}"),
            &tokenizer_path,
            false,
        )
        .await?;
    }

    let model_path = encoder_dir.join(MODEL_FILE);
    if model_path.exists() {
        info!("Encoder model already exists, skipping");
        println!("  {MODEL_FILE} (already exists)");
    } else {
        println!("  Downloading {MODEL_FILE} (~90 MB)...");
        download_file(
            &format!("{ENCODER_HF_URL}/{ENCODER_REMOTE_MODEL}"),
            &model_path,
            true,
        )
        .await?;
    }

    Ok(())
}

/// Download a single file from a URL to a local path.
/// If `show_progress` is true, display a progress bar.
async fn download_file(url: &str, dest: &Path, show_progress: bool) -> Result<()> {
    let client = reqwest::Client::new();
    let mut response = client
        .get(url)
        .send()
        .await
        .with_context(|| format!("Failed to download {url}"))?;

    if !response.status().is_success() {
        anyhow::bail!("Download failed with status {}: {}", response.status(), url);
    }

    let pb = if show_progress {
        Some(progress_bar(response.content_length()))
    } else {
        None
    };

    let mut file = PartialFile::create(dest).await?;
    let mut written = 0u64;
    while let Some(chunk) = response
        .chunk()
        .await
        .context("Failed to read response body")?
    {
        file.write(&chunk).await?;
        written += chunk.len() as u64;
        if let Some(ref pb) = pb {
            pb.set_position(written);
        }
    }
    file.commit().await?;

    if let Some(pb) = pb {
        pb.finish_and_clear();
    }

    info!("Downloaded {} to {}", url, dest.display());
    Ok(())
}

/// A download target written under a sibling `.partial` name and renamed
/// into place on commit, so `*_files_present` never sees a half-written
/// artifact.
struct PartialFile {
    file: tokio::fs::File,
    partial: PathBuf,
    dest: PathBuf,
}

impl PartialFile {
    async fn create(dest: &Path) -> Result<Self> {
        let partial = dest.with_extension("partial");
        let file = tokio::fs::File::create(&partial)
            .await
            .with_context(|| format!("Failed to create {}", partial.display()))?;
        Ok(Self {
            file,
            partial,
            dest: dest.to_path_buf(),
        })
    }

    async fn write(&mut self, chunk: &[u8]) -> Result<()> {
        self.file
            .write_all(chunk)
            .await
            .with_context(|| format!("Failed to write {}", self.partial.display()))
    }

    async fn commit(mut self) -> Result<()> {
        self.file
            .flush()
            .await
            .with_context(|| format!("Failed to flush {}", self.partial.display()))?;
        drop(self.file);
        tokio::fs::rename(&self.partial, &self.dest)
            .await
            .with_context(|| format!("Failed to move download into {}", self.dest.display()))
    }
}

fn progress_bar(total_size: Option<u64>) -> ProgressBar {
    match total_size {
        Some(size) => {
            let pb = ProgressBar::new(size);
            if let Ok(style) =
                ProgressStyle::default_bar().template("    [{bar:40.cyan/blue}] {bytes}/{total_bytes} ({eta})")
            {
                pb.set_style(style.progress_chars("=> "));
            }
            pb
        }
        None => {
            let pb = ProgressBar::new_spinner();
            if let Ok(style) = ProgressStyle::default_spinner().template("    {spinner} {bytes}") {
                pb.set_style(style);
            }
            pb
        }
    }
}
