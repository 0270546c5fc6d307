//! Bill date extraction.

use chrono::{Local, NaiveDate, NaiveDateTime, NaiveTime};
use tracing::debug;

use super::patterns::{DatePattern, DATE_FORMATS, DATE_PATTERNS, FULL_MONTH_NAMES};
use super::{ExtractionMatch, FieldExtractor};

/// Date field extractor driven by an ordered pattern table and format list.
pub struct DateExtractor<'a> {
    patterns: &'a [DatePattern],
    formats: &'a [&'a str],
}

/// A bill date, or the fallback used when none could be read.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExtractedDate {
    pub value: NaiveDateTime,
    /// True when `value` is the fallback, not a date read from the text.
    pub is_default: bool,
}

impl DateExtractor<'static> {
    /// Extractor over the built-in [`DATE_PATTERNS`] and [`DATE_FORMATS`].
    pub fn new() -> Self {
        Self {
            patterns: &DATE_PATTERNS,
            formats: &DATE_FORMATS,
        }
    }
}

impl Default for DateExtractor<'static> {
    fn default() -> Self {
        Self::new()
    }
}

impl<'a> DateExtractor<'a> {
    /// Extractor over custom tables.
    pub fn with_tables(patterns: &'a [DatePattern], formats: &'a [&'a str]) -> Self {
        Self { patterns, formats }
    }

    /// Extract the bill date at midnight, or `fallback` if none parses.
    pub fn extract_or(&self, text: &str, fallback: NaiveDateTime) -> ExtractedDate {
        match self.extract(text) {
            Some(m) => ExtractedDate {
                value: m.value.and_time(NaiveTime::MIN),
                is_default: false,
            },
            None => {
                debug!("No date found, defaulting to {}", fallback);
                ExtractedDate {
                    value: fallback,
                    is_default: true,
                }
            }
        }
    }

    /// Extract the bill date, defaulting to the current local time.
    ///
    /// This is the only time-dependent step of extraction: two runs over the
    /// same dateless text differ by the time elapsed between them.
    pub fn extract_or_now(&self, text: &str) -> ExtractedDate {
        self.extract_or(text, Local::now().naive_local())
    }

    fn try_pattern(
        &self,
        rank: usize,
        pattern: &DatePattern,
        lowered: &str,
    ) -> Option<ExtractionMatch<NaiveDate>> {
        let caps = pattern.regex.captures(lowered)?;
        let candidate = caps.get(1)?.as_str();

        match parse_date(candidate, self.formats) {
            Some(date) => Some(ExtractionMatch::new(date, rank, candidate)),
            None => {
                debug!("{:?} pattern matched unparseable date {:?}", pattern.role, candidate);
                None
            }
        }
    }
}

impl FieldExtractor for DateExtractor<'_> {
    type Output = ExtractionMatch<NaiveDate>;

    fn extract(&self, text: &str) -> Option<Self::Output> {
        let lowered = text.to_lowercase();
        self.patterns
            .iter()
            .enumerate()
            .find_map(|(rank, pattern)| self.try_pattern(rank, pattern, &lowered))
    }

    fn extract_all(&self, text: &str) -> Vec<Self::Output> {
        let lowered = text.to_lowercase();
        self.patterns
            .iter()
            .enumerate()
            .filter_map(|(rank, pattern)| self.try_pattern(rank, pattern, &lowered))
            .collect()
    }
}

/// Extract the bill date, if any pattern yields a parseable date.
pub fn extract_date(text: &str) -> Option<NaiveDate> {
    DateExtractor::new().extract(text).map(|m| m.value)
}

/// Parse a captured date phrase against `formats`, first success wins.
///
/// The year must be written with four digits; `03/04/24` never parses.
/// A leading month word must be spelled out in full; `Mar 4, 2024` never
/// parses.
pub fn parse_date(candidate: &str, formats: &[&str]) -> Option<NaiveDate> {
    let candidate = candidate.trim();
    if !has_four_digit_year(candidate) || !has_full_month_name(candidate) {
        return None;
    }

    formats
        .iter()
        .find_map(|fmt| NaiveDate::parse_from_str(candidate, fmt).ok())
}

/// True for numeric dates, and for dates led by a full month name.
fn has_full_month_name(s: &str) -> bool {
    match s.split_whitespace().next() {
        Some(word) if word.starts_with(|c: char| c.is_alphabetic()) => {
            let word = word.trim_end_matches(',').to_lowercase();
            FULL_MONTH_NAMES.contains(&word.as_str())
        }
        _ => true,
    }
}

fn has_four_digit_year(s: &str) -> bool {
    s.rsplit(|c: char| !c.is_ascii_digit())
        .next()
        .is_some_and(|year| year.len() == 4)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::extract::rules::patterns::DateRole;
    use chrono::Duration;
    use pretty_assertions::assert_eq;

    fn ymd(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn fallback() -> NaiveDateTime {
        ymd(1999, 12, 31).and_hms_opt(12, 0, 0).unwrap()
    }

    #[test]
    fn test_month_first_priority() {
        assert_eq!(extract_date("Date: 03/04/2024"), Some(ymd(2024, 3, 4)));
        assert_eq!(extract_date("DATE: 03-04-2024"), Some(ymd(2024, 3, 4)));
    }

    #[test]
    fn test_day_first_when_month_first_impossible() {
        assert_eq!(extract_date("Date: 25/12/2024"), Some(ymd(2024, 12, 25)));
        assert_eq!(extract_date("25-12-2024"), Some(ymd(2024, 12, 25)));
    }

    #[test]
    fn test_month_name_formats() {
        assert_eq!(extract_date("Date: March 4, 2024"), Some(ymd(2024, 3, 4)));
        assert_eq!(extract_date("date: JANUARY 15 2023"), Some(ymd(2023, 1, 15)));
    }

    #[test]
    fn test_abbreviated_month_is_not_a_date() {
        assert_eq!(extract_date("Date: Mar 4, 2024"), None);
        assert_eq!(extract_date("date: sept 4 2024"), None);
        assert_eq!(parse_date("mar 4, 2024", &DATE_FORMATS), None);

        let date = DateExtractor::new().extract_or("Date: Mar 4, 2024", fallback());
        assert!(date.is_default);
        assert_eq!(date.value, fallback());
    }

    #[test]
    fn test_abbreviated_month_falls_through_to_numeric() {
        let text = "Date: Mar 4, 2024\n03/05/2024";
        assert_eq!(extract_date(text), Some(ymd(2024, 3, 5)));
    }

    #[test]
    fn test_bare_numeric_anywhere() {
        let m = DateExtractor::new()
            .extract("ACME STORE\n7/8/2022 14:02\nRed Widget")
            .unwrap();
        assert_eq!(m.value, ymd(2022, 7, 8));
        assert_eq!(DATE_PATTERNS[m.rank].role, DateRole::BareNumeric);
    }

    #[test]
    fn test_labeled_beats_bare() {
        let text = "Printed 01/02/2020\nDate: 05/06/2021";
        let m = DateExtractor::new().extract(text).unwrap();
        assert_eq!(m.value, ymd(2021, 5, 6));
        assert_eq!(m.rank, 1);
    }

    #[test]
    fn test_two_digit_year_never_parses() {
        assert_eq!(extract_date("Date: 03/04/24"), None);
    }

    #[test]
    fn test_unparseable_match_continues_to_next_pattern() {
        // The month-name pattern matches "date: total 12 2024" but "total" is
        // not a month; the bare numeric date further down still wins.
        let text = "Date: Total 12 2024\n1/2/2023";
        assert_eq!(extract_date(text), Some(ymd(2023, 1, 2)));

        // Impossible in every format.
        assert_eq!(extract_date("Date: 13/13/2024"), None);
    }

    #[test]
    fn test_parse_date_format_order() {
        assert_eq!(parse_date("03/04/2024", &DATE_FORMATS), Some(ymd(2024, 3, 4)));
        assert_eq!(
            parse_date("03/04/2024", &["%d/%m/%Y", "%m/%d/%Y"]),
            Some(ymd(2024, 4, 3))
        );
        assert_eq!(parse_date("not a date", &DATE_FORMATS), None);
    }

    #[test]
    fn test_fallback_when_no_date() {
        let extractor = DateExtractor::new();

        let date = extractor.extract_or("Red Widget\nTotal: 4.00", fallback());
        assert_eq!(
            date,
            ExtractedDate {
                value: fallback(),
                is_default: true,
            }
        );

        let date = extractor.extract_or("Date: 03/04/2024", fallback());
        assert_eq!(date.value, ymd(2024, 3, 4).and_hms_opt(0, 0, 0).unwrap());
        assert!(!date.is_default);
    }

    #[test]
    fn test_fallback_is_now() {
        let before = Local::now().naive_local();
        let date = DateExtractor::new().extract_or_now("no dates here");
        let after = Local::now().naive_local();

        assert!(date.is_default);
        assert!(date.value >= before - Duration::seconds(1));
        assert!(date.value <= after + Duration::seconds(1));
    }
}
