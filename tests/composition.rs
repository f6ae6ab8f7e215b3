// Composition tests — GloVe file on disk through to pie slices.
//
//   glove text -> ModelRegistry -> pipeline::compare -> chart::pie_slices
//
// Uses a throwaway model directory; no network, no ONNX model.

use std::io::Write;
use std::path::Path;

use semrank::categories::CategorySet;
use semrank::download;
use semrank::embedding::{Backend, GloveDim, ModelRegistry};
use semrank::output::chart::{pie_slices, DisplayMode};
use semrank::pipeline::compare;

/// Writes 25-d vectors where each word lights up a few axes.
fn write_vocab(base: &Path) {
    let words: &[(&str, &[usize])] = &[
        ("roses", &[0, 1]),
        ("flowers", &[0]),
        ("red", &[1, 2]),
        ("colors", &[2]),
        ("trucks", &[3]),
        ("cars", &[3, 4]),
        ("grey", &[5, 2]),
        ("weather", &[5]),
        ("food", &[6]),
    ];

    std::fs::create_dir_all(download::glove_dir(base)).unwrap();
    let mut f = std::fs::File::create(download::glove_path(base, GloveDim::D25)).unwrap();
    for (word, axes) in words {
        let row: Vec<String> = (0..25)
            .map(|i| if axes.contains(&i) { "1.0" } else { "0.0" }.to_string())
            .collect();
        writeln!(f, "{word} {}", row.join(" ")).unwrap();
    }
}

#[tokio::test]
async fn sentence_ranks_closest_category_first() {
    let dir = tempfile::tempdir().unwrap();
    write_vocab(dir.path());
    let registry = ModelRegistry::new(dir.path());

    let categories = CategorySet::parse("Food Cars Flowers");
    let rankings = compare(
        &registry,
        "Roses Roses flowers",
        &categories,
        &[Backend::Glove(GloveDim::D25)],
    )
    .await
    .unwrap();

    assert_eq!(rankings.len(), 1);
    let ranking = &rankings[0];
    assert_eq!(ranking.backend, Backend::Glove(GloveDim::D25));
    assert_eq!(ranking.top().unwrap().label, "Flowers");
    // Food and Cars are orthogonal to the query: tie at 0, input order kept.
    assert_eq!(ranking.labels().collect::<Vec<_>>(), ["Flowers", "Food", "Cars"]);
    assert_eq!(DisplayMode::for_rankings(rankings.len()), DisplayMode::Single);
}

#[tokio::test]
async fn slices_follow_the_ranking() {
    let dir = tempfile::tempdir().unwrap();
    write_vocab(dir.path());
    let registry = ModelRegistry::new(dir.path());

    let rankings = compare(
        &registry,
        "roses are red trucks are blue",
        &CategorySet::parse("Flowers Colors Cars Weather Food"),
        &[Backend::Glove(GloveDim::D25)],
    )
    .await
    .unwrap();

    let slices = pie_slices(&rankings[0]);
    assert_eq!(slices.len(), 5);
    assert_eq!(slices[0].explode, 0.2);
    assert_eq!(slices[2].explode, 0.05);
    let sum: f64 = slices.iter().map(|s| s.fraction).sum();
    assert!((sum - 1.0).abs() < 1e-9);
    // Weather and Food share no axis with the sentence.
    assert!(slices[3].fraction == 0.0 && slices[4].fraction == 0.0);
}

#[tokio::test]
async fn unknown_words_only_yields_all_zero_scores() {
    let dir = tempfile::tempdir().unwrap();
    write_vocab(dir.path());
    let registry = ModelRegistry::new(dir.path());

    let rankings = compare(
        &registry,
        "Seattle right now",
        &CategorySet::parse("Weather Food"),
        &[Backend::Glove(GloveDim::D25)],
    )
    .await
    .unwrap();

    assert!(rankings[0].entries.iter().all(|r| r.score == 0.0));
    assert_eq!(rankings[0].labels().collect::<Vec<_>>(), ["Weather", "Food"]);
}

#[tokio::test]
async fn repeated_backend_is_ranked_once() {
    let dir = tempfile::tempdir().unwrap();
    write_vocab(dir.path());
    let registry = ModelRegistry::new(dir.path());
    let glove = Backend::Glove(GloveDim::D25);

    let rankings = compare(
        &registry,
        "roses",
        &CategorySet::parse("Flowers Food"),
        &[glove, glove],
    )
    .await
    .unwrap();

    assert_eq!(rankings.len(), 1);
    assert_eq!(rankings[0].dimension, 25);
    assert_eq!(DisplayMode::for_rankings(rankings.len()), DisplayMode::Single);
}

#[tokio::test]
async fn missing_backend_artifacts_fail_the_comparison() {
    let dir = tempfile::tempdir().unwrap();
    write_vocab(dir.path());
    let registry = ModelRegistry::new(dir.path());

    let result = compare(
        &registry,
        "roses",
        &CategorySet::parse("Flowers"),
        &[Backend::Glove(GloveDim::D25), Backend::MiniLm],
    )
    .await;
    assert!(result.is_err());
}
