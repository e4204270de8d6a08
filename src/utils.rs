use chrono::{Datelike, NaiveDate};

/// Parses an XBRL date value: "YYYY-MM-DD", optionally followed by a time part
/// ("2024-12-31T00:00:00", "2024-12-31Z").
pub fn parse_xbrl_date(value: &str) -> Option<NaiveDate> {
    let trimmed = value.trim();
    let date_part = trimmed.get(..10).unwrap_or(trimmed);
    NaiveDate::parse_from_str(date_part, "%Y-%m-%d").ok()
}

/// Strips a namespace prefix: "fsa:Equity" -> "Equity".
pub fn local_name(qualified: &str) -> &str {
    qualified.rsplit(':').next().unwrap_or(qualified)
}

/// True when the span is exactly 1 January to 31 December of one year.
pub fn is_calendar_year(start: NaiveDate, end: NaiveDate) -> bool {
    start.year() == end.year()
        && start.month() == 1
        && start.day() == 1
        && end.month() == 12
        && end.day() == 31
}

/// Collapses every run of whitespace into one space and trims the ends.
pub fn collapse_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}
