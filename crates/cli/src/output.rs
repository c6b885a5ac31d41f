//! Terminal output utilities
//!
//! Provides consistent formatting for CLI output.

use owo_colors::OwoColorize;
use territory_geo::MembershipResult;

/// Status message helpers
pub struct Status;

impl Status {
    /// Print a success message
    pub fn success(message: &str) {
        println!("{} {}", "✓".green(), message);
    }

    /// Print an error message
    pub fn error(message: &str) {
        eprintln!("{} {}", "✗".red(), message);
    }

    /// Print a warning message
    pub fn warning(message: &str) {
        eprintln!("{} {}", "⚠".yellow(), message);
    }

    /// Print an info message
    pub fn info(message: &str) {
        println!("{} {}", "ℹ".blue(), message);
    }

    /// Print a header
    pub fn header(message: &str) {
        println!();
        println!("{}", message.bold());
        println!("{}", "─".repeat(message.chars().count()));
    }
}

/// Format a duration for display
pub fn format_duration(duration: std::time::Duration) -> String {
    let secs = duration.as_secs_f32();
    if secs < 1.0 {
        format!("{:.0}ms", secs * 1000.0)
    } else if secs < 60.0 {
        format!("{:.1}s", secs)
    } else {
        let mins = (secs / 60.0).floor();
        let remaining_secs = secs % 60.0;
        format!("{}m {:.0}s", mins, remaining_secs)
    }
}

/// Format a distance given in meters
pub fn format_distance(meters: f64) -> String {
    if meters < 1000.0 {
        format!("{:.1} m", meters)
    } else {
        format!("{:.3} km", meters / 1000.0)
    }
}

/// Format a count with singular/plural
pub fn format_count(count: usize, singular: &str, plural: &str) -> String {
    if count == 1 {
        format!("{} {}", count, singular)
    } else {
        format!("{} {}", count, plural)
    }
}

/// Plain-text block for one territory's membership.
///
/// ```text
/// t-satellite: 3 points, score 3.00
///   job          2
///   shop         1
/// ```
pub fn format_membership(result: &MembershipResult) -> String {
    let mut out = format!(
        "{}: {}, score {:.2}",
        result.territory_id,
        format_count(result.total_points(), "point", "points"),
        result.total_score
    );
    for (category, count) in &result.counts_by_category {
        out.push_str(&format!("\n  {:<18} {}", category.as_str(), count));
    }
    out
}
