// Similarity ranking — the core of the demo.
//
// Embed the query and every category with one backend, score each
// category by cosine similarity, and sort descending. Sorting is stable,
// so exact ties keep the order the user typed the categories in.

pub mod ranker;
pub mod similarity;

pub use ranker::{rank, rank_categories, RankError, Ranked, RankingResult};
pub use similarity::cosine_similarity;
