pub mod formatter;

pub use formatter::{
    format_admin_table, format_leaderboard, format_stats, should_use_colors,
};
