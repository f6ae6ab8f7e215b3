// System status display — model directory and per-backend artifacts.

use std::path::{Path, PathBuf};

use colored::Colorize;

use crate::config::Config;
use crate::download;
use crate::embedding::Backend;

/// Files a backend loads, in the order they're checked.
pub fn artifact_paths(model_dir: &Path, backend: Backend) -> Vec<PathBuf> {
    match backend {
        Backend::Glove(dim) => vec![download::glove_path(model_dir, dim)],
        Backend::MiniLm => {
            let dir = download::encoder_model_dir(model_dir);
            vec![
                dir.join(crate::embedding::encoder::MODEL_FILE),
                dir.join(crate::embedding::encoder::TOKENIZER_FILE),
            ]
        }
    }
}

/// Display system status to the terminal.
pub fn show(config: &Config) {
    println!("Model directory: {}", config.model_dir.display());
    println!("Default GloVe size: {}", config.glove_dim.label());
    println!();

    let mut missing_glove = false;
    let mut missing_encoder = false;

    for backend in Backend::ALL {
        let present = download::backend_files_present(&config.model_dir, backend);
        let marker = if present { "✓".green() } else { "✗".red() };
        println!("  {} {:<26} {:>4} dims", marker, backend.id(), backend.dimension());

        for path in artifact_paths(&config.model_dir, backend) {
            let size = std::fs::metadata(&path)
                .map(|m| format_bytes(m.len()))
                .unwrap_or_else(|_| "missing".to_string());
            println!("      {} ({})", path.display().to_string().dimmed(), size);
        }

        if !present {
            match backend {
                Backend::Glove(_) => missing_glove = true,
                Backend::MiniLm => missing_encoder = true,
            }
        }
    }

    if missing_encoder {
        println!("\nRun `semrank download-model` to fetch the sentence encoder.");
    }
    if missing_glove {
        println!(
            "\nGloVe vectors come from {}\nUnpack the .txt files you want into {}",
            download::GLOVE_SOURCE_URL,
            download::glove_dir(&config.model_dir).display()
        );
    }
}

fn format_bytes(bytes: u64) -> String {
    if bytes < 1024 {
        format!("{} B", bytes)
    } else if bytes < 1024 * 1024 {
        format!("{:.1} KB", bytes as f64 / 1024.0)
    } else {
        format!("{:.1} MB", bytes as f64 / (1024.0 * 1024.0))
    }
}
