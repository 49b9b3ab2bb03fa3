/// Case-insensitive substring match.
/// Lowercases both sides, so it works for the Latin titles and is a
/// plain byte-substring match for Devanagari ones.
pub fn contains_ignore_case(haystack: &str, needle: &str) -> bool {
    haystack.to_lowercase().contains(&needle.to_lowercase())
}

/// Format a cache age in minutes for status lines, e.g. "5m ago", "2h ago".
pub fn format_age(minutes: i64) -> String {
    if minutes < 1 {
        // Covers clock skew (negative ages) as well
        "just now".to_string()
    } else if minutes < 60 {
        format!("{}m ago", minutes)
    } else if minutes < 1440 {
        let hours = minutes / 60;
        let remaining_mins = minutes % 60;
        if remaining_mins >= 30 {
            // Round up: 1h 30m+ becomes 2h
            format!("{}h ago", hours + 1)
        } else {
            format!("{}h ago", hours)
        }
    } else {
        let days = minutes / 1440;
        let remaining_hours = (minutes % 1440) / 60;
        if remaining_hours >= 12 {
            // Round up: 1d 12h+ becomes 2d
            format!("{}d ago", days + 1)
        } else {
            format!("{}d ago", days)
        }
    }
}

/// Format a duration in seconds for reading-time displays, e.g. "45s", "3m 20s".
pub fn format_duration(seconds: i64) -> String {
    if seconds < 60 {
        format!("{}s", seconds.max(0))
    } else if seconds < 3600 {
        let minutes = seconds / 60;
        let remaining = seconds % 60;
        if remaining == 0 {
            format!("{}m", minutes)
        } else {
            format!("{}m {}s", minutes, remaining)
        }
    } else {
        let hours = seconds / 3600;
        let minutes = (seconds % 3600) / 60;
        if minutes == 0 {
            format!("{}h", hours)
        } else {
            format!("{}h {}m", hours, minutes)
        }
    }
}
