// Pie chart geometry for a ranking.
//
// Slices are proportional to similarity. Cosine scores can be negative
// and a pie can't draw a negative wedge, so those clamp to zero. If
// nothing is positive every category gets an equal slice.
//
// The leading slices are pulled out of the pie: the winner by 0.2, and
// the runner-up by 0.1 when there are exactly three categories, or the
// third place by 0.05 when there are more.

use serde::Serialize;

use crate::ranking::RankingResult;

/// Whether the UI shows one chart or one tab per backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum DisplayMode {
    Single,
    Tabbed,
}

impl DisplayMode {
    pub fn for_rankings(count: usize) -> Self {
        if count > 1 {
            DisplayMode::Tabbed
        } else {
            DisplayMode::Single
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PieSlice {
    pub label: String,
    pub score: f64,
    /// Share of the pie, 0.0 to 1.0. Slices sum to 1.0.
    pub fraction: f64,
    /// Radial offset as a fraction of the radius.
    pub explode: f64,
}

/// Build slices in ranking order.
pub fn pie_slices(ranking: &RankingResult) -> Vec<PieSlice> {
    let n = ranking.len();
    if n == 0 {
        return Vec::new();
    }

    let weights: Vec<f64> = ranking.entries.iter().map(|r| r.score.max(0.0)).collect();
    let total: f64 = weights.iter().sum();

    ranking
        .entries
        .iter()
        .zip(&weights)
        .enumerate()
        .map(|(i, (entry, &w))| PieSlice {
            label: entry.label.clone(),
            score: entry.score,
            fraction: if total > 0.0 { w / total } else { 1.0 / n as f64 },
            explode: explode_for(i, n),
        })
        .collect()
}

fn explode_for(index: usize, count: usize) -> f64 {
    match index {
        0 => 0.2,
        1 if count == 3 => 0.1,
        2 if count > 3 => 0.05,
        _ => 0.0,
    }
}
