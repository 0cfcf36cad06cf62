use chrono::NaiveDate;

pub fn seconds_to_minutes(seconds: u64) -> f64 {
    seconds as f64 / 60.0
}

pub fn seconds_to_hours(seconds: u64) -> f64 {
    seconds as f64 / 3600.0
}

/// `[H:]MM:SS`, dropping leading units that are zero (`45`, `02:05`, `1:00:09`).
pub fn format_duration(seconds: u64) -> String {
    let hours = seconds / 3600;
    let minutes = (seconds % 3600) / 60;
    let secs = seconds % 60;

    let mut formatted = String::new();
    if hours > 0 {
        formatted.push_str(&format!("{hours}:"));
    }
    if minutes > 0 || hours > 0 {
        formatted.push_str(&format!("{minutes:02}:"));
    }
    formatted.push_str(&format!("{secs:02}"));
    formatted
}

/// Short axis label for a `YYYY-MM-DD` key, e.g. `Fri 03/01`. Unparseable keys pass through.
pub fn format_date_label(day: &str) -> String {
    NaiveDate::parse_from_str(day, "%Y-%m-%d")
        .map(|date| date.format("%a %m/%d").to_string())
        .unwrap_or_else(|_| day.to_string())
}
