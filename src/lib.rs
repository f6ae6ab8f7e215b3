// semrank: rank categories by semantic similarity to a sentence.
//
// This is the library root. Embeddings come from `embedding`, scoring and
// sorting from `ranking`; everything else is plumbing around those two.

pub mod categories;
pub mod config;
pub mod download;
pub mod embedding;
pub mod output;
pub mod pipeline;
pub mod ranking;
pub mod status;

#[cfg(feature = "web")]
pub mod web;
