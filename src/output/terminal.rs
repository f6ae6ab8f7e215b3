// Colored terminal output for rankings.

use colored::Colorize;

use super::chart::{pie_slices, PieSlice};
use super::truncate_chars;
use crate::ranking::RankingResult;

const BAR_WIDTH: usize = 30;

/// Display one backend's ranking as a table with share bars.
pub fn display_ranking(ranking: &RankingResult) {
    println!(
        "\n{}",
        format!("=== {} ({} categories) ===", ranking.backend, ranking.len()).bold()
    );

    if ranking.is_empty() {
        println!("  No categories to rank.");
        return;
    }

    println!(
        "  {:>4}  {:<20} {:>7}  {:>6}",
        "Rank".dimmed(),
        "Category".dimmed(),
        "Cosine".dimmed(),
        "Share".dimmed(),
    );
    println!("  {}", "-".repeat(44 + BAR_WIDTH).dimmed());

    for (i, slice) in pie_slices(ranking).iter().enumerate() {
        println!(
            "  {:>4}. {:<20} {:>7.3}  {:>5.1}%  {}",
            i + 1,
            truncate_chars(&slice.label, 17),
            slice.score,
            slice.fraction * 100.0,
            share_bar(slice, i == 0),
        );
    }
}

/// Display several rankings, then name the best match of each.
pub fn display_comparison(rankings: &[RankingResult]) {
    for ranking in rankings {
        display_ranking(ranking);
    }

    if rankings.len() > 1 {
        println!();
        for ranking in rankings {
            if let Some(top) = ranking.top() {
                println!("  {:<26} {}", ranking.backend.to_string().dimmed(), top.label.bold());
            }
        }
    }
}

fn share_bar(slice: &PieSlice, is_top: bool) -> String {
    let filled = (slice.fraction * BAR_WIDTH as f64).round() as usize;
    let bar = "█".repeat(filled.min(BAR_WIDTH));
    if is_top {
        bar.green().to_string()
    } else if slice.score < 0.0 {
        bar.red().to_string()
    } else {
        bar.cyan().to_string()
    }
}
