use std::io::IsTerminal;

use owo_colors::OwoColorize;
use terminal_size::{terminal_size, Width};

use crate::ranking::{RankedRecord, Stats};
use crate::record::Record;

/// Check if stdout is a TTY (for auto-detecting color support)
pub fn should_use_colors() -> bool {
    std::io::stdout().is_terminal()
}

/// Get terminal width, defaulting to None for pipes (unlimited)
fn get_terminal_width() -> Option<usize> {
    terminal_size().map(|(Width(w), _)| w as usize)
}

/// Truncate a name to fit available width, accounting for Unicode
fn truncate_name(name: &str, max_width: usize) -> String {
    let chars: Vec<char> = name.chars().collect();
    if chars.len() <= max_width {
        name.to_string()
    } else if max_width > 3 {
        format!("{}...", chars[..max_width - 3].iter().collect::<String>())
    } else {
        chars[..max_width].iter().collect()
    }
}

/// Format the ranked leaderboard, one line per athlete.
/// Columns: rank, name, distance, pace, score. The top three ranks get
/// medal colors when colors are on.
pub fn format_leaderboard(ranked: &[RankedRecord], use_colors: bool) -> String {
    if ranked.is_empty() {
        return "No records yet. Add one to start the leaderboard.".to_string();
    }

    let term_width = get_terminal_width();

    // rank "99." = 3 chars, distance "9999.9 km" = 9, pace "99:59/km" = 8,
    // score "9999.99" = 7, two-space separators between the five columns.
    let fixed_width = 3 + 1 + 9 + 8 + 7 + 2 * 4;
    let name_width = match term_width {
        Some(width) if width > fixed_width + 10 => width - fixed_width,
        Some(_) => 16,
        None => usize::MAX,
    };

    ranked
        .iter()
        .enumerate()
        .map(|(idx, entry)| {
            let rank_str = format!("{:>2}.", idx + 1);
            let name = truncate_name(&entry.record.name, name_width);
            let distance = format!("{:>6.1} km", entry.record.distance);
            let pace = format!("{:>5}/km", entry.record.pace);
            let score = format!("{:>7.2}", entry.score);

            if use_colors {
                let rank_colored = match idx {
                    0 => rank_str.yellow().bold().to_string(),
                    1 => rank_str.white().bold().to_string(),
                    2 => rank_str.red().bold().to_string(),
                    _ => rank_str.dimmed().to_string(),
                };
                format!(
                    "{} {}  {}  {}  {}",
                    rank_colored,
                    score.bold(),
                    name,
                    distance.cyan(),
                    pace.green()
                )
            } else {
                format!("{} {}  {}  {}  {}", rank_str, score, name, distance, pace)
            }
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// Format the full collection for the admin view, one line per record.
/// Columns: id, name, date, distance, pace, status, photo marker.
pub fn format_admin_table(records: &[Record], use_colors: bool) -> String {
    if records.is_empty() {
        return "No records stored.".to_string();
    }

    records
        .iter()
        .map(|record| {
            let status = format!("{:?}", record.status).to_lowercase();
            let photo = if record.photo.is_some() { "photo" } else { "-" };
            let line = format!(
                "{}  {}  {}  {:.1} km  {}/km  {}  {}",
                record.id, record.name, record.date, record.distance, record.pace, status, photo
            );

            if use_colors {
                match status.as_str() {
                    "approved" => line.green().to_string(),
                    "rejected" => line.red().to_string(),
                    _ => line,
                }
            } else {
                line
            }
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// Format aggregate stats as a short summary block.
pub fn format_stats(stats: &Stats, use_colors: bool) -> String {
    if use_colors {
        format!(
            "Total distance: {}\nAthletes: {}\nAverage pace: {}",
            format!("{:.1} km", stats.total_distance).cyan().bold(),
            stats.athlete_count.to_string().bold(),
            format!("{}/km", stats.average_pace).green().bold()
        )
    } else {
        format!(
            "Total distance: {:.1} km\nAthletes: {}\nAverage pace: {}/km",
            stats.total_distance, stats.athlete_count, stats.average_pace
        )
    }
}
