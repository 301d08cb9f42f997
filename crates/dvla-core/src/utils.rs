//! Utility helpers: path resolution and string manipulation.

use std::path::PathBuf;

/// Get the DVLA data directory (e.g. `~/.dvla/`).
pub fn get_data_path() -> PathBuf {
    home_or_cwd().join(".dvla")
}

/// Truncate a string to `max_len` characters, adding "..." if truncated.
/// Unicode-safe.
pub fn truncate_string(s: &str, max_len: usize) -> String {
    if s.chars().count() <= max_len {
        s.to_string()
    } else {
        let truncated: String = s.chars().take(max_len.saturating_sub(3)).collect();
        format!("{}...", truncated)
    }
}

/// Expand `~` to the home directory in a path string.
pub fn expand_home(path: &str) -> PathBuf {
    if let Some(rest) = path.strip_prefix("~/") {
        home_or_cwd().join(rest)
    } else if path == "~" {
        home_or_cwd()
    } else {
        PathBuf::from(path)
    }
}

/// The user's home directory, or `.` when it cannot be determined.
fn home_or_cwd() -> PathBuf {
    dirs_next::home_dir().unwrap_or_else(|| PathBuf::from("."))
}
