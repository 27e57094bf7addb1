use crate::models::DateKey;
use chrono::{Datelike, Local, NaiveDate};
use once_cell::sync::Lazy;

static DATE_PAGE_RE: Lazy<regex::Regex> = Lazy::new(|| {
    regex::Regex::new(
        r"^(January|February|March|April|May|June|July|August|September|October|November|December) (\d{1,2})(st|nd|rd|th), (\d{4})$",
    )
    .expect("valid date page regex")
});

const MONTH_NAMES: [&str; 12] = [
    "January",
    "February",
    "March",
    "April",
    "May",
    "June",
    "July",
    "August",
    "September",
    "October",
    "November",
    "December",
];

/// Parses a daily page title. The ordinal suffix is not checked against the
/// day number, so `January 2th, 2025` is accepted.
pub fn parse_date_key(title: &str) -> Option<DateKey> {
    let captures = DATE_PAGE_RE.captures(title)?;
    let month_name = captures.get(1)?.as_str();
    let day = captures.get(2)?.as_str().parse::<u32>().ok()?;
    let year = captures.get(4)?.as_str().parse::<i32>().ok()?;
    let month = month_number(month_name)?;
    let date = NaiveDate::from_ymd_opt(year, month, day)?;

    Some(DateKey {
        year,
        month_name: month_name.to_string(),
        day,
        day_name: date.format("%A").to_string(),
        full_date_text: title.to_string(),
        full_month_text: format!("{} {}", month_name, year),
    })
}

pub fn is_date_page(title: &str) -> bool {
    parse_date_key(title).is_some()
}

impl DateKey {
    /// Builds the key for a calendar date using the daily page title format.
    pub fn from_date(date: NaiveDate) -> Self {
        let month_name = MONTH_NAMES[date.month0() as usize];
        let day = date.day();
        let year = date.year();
        Self {
            year,
            month_name: month_name.to_string(),
            day,
            day_name: date.format("%A").to_string(),
            full_date_text: format!("{} {}{}, {}", month_name, day, ordinal_suffix(day), year),
            full_month_text: format!("{} {}", month_name, year),
        }
    }

    pub fn today() -> Self {
        Self::from_date(Local::now().date_naive())
    }

    pub fn date(&self) -> Option<NaiveDate> {
        NaiveDate::from_ymd_opt(self.year, month_number(&self.month_name)?, self.day)
    }
}

pub fn ordinal_suffix(day: u32) -> &'static str {
    match (day % 10, day % 100) {
        (_, 11..=13) => "th",
        (1, _) => "st",
        (2, _) => "nd",
        (3, _) => "rd",
        _ => "th",
    }
}

fn month_number(name: &str) -> Option<u32> {
    MONTH_NAMES
        .iter()
        .position(|candidate| *candidate == name)
        .map(|index| index as u32 + 1)
}

#[cfg(test)]
mod tests {
    use super::{is_date_page, ordinal_suffix, parse_date_key};
    use crate::models::DateKey;
    use chrono::{Duration, NaiveDate};

    #[test]
    fn parses_documented_example() {
        let key = parse_date_key("January 15th, 2025").expect("date key");
        assert_eq!(key.year, 2025);
        assert_eq!(key.month_name, "January");
        assert_eq!(key.day, 15);
        assert_eq!(key.day_name, "Wednesday");
        assert_eq!(key.full_date_text, "January 15th, 2025");
        assert_eq!(key.full_month_text, "January 2025");
    }

    #[test]
    fn rejects_titles_outside_the_grammar() {
        for title in [
            "",
            "January 2025",
            "january 15th, 2025",
            "January 15, 2025",
            "January 15th 2025",
            "Jan 15th, 2025",
            "January 15th, 2025 ",
            "January 115th, 2025",
            "Therapy Journal",
        ] {
            assert!(parse_date_key(title).is_none(), "{title:?} should not parse");
        }
    }

    #[test]
    fn rejects_impossible_calendar_dates() {
        assert!(parse_date_key("February 30th, 2025").is_none());
        assert!(parse_date_key("April 0th, 2025").is_none());
        assert!(is_date_page("February 29th, 2024"));
        assert!(!is_date_page("February 29th, 2025"));
    }

    #[test]
    fn accepts_any_suffix_on_any_day() {
        let key = parse_date_key("January 2th, 2025").expect("loose suffix");
        assert_eq!(key.day, 2);
        assert_eq!(key.day_name, "Thursday");
        assert_eq!(key.full_date_text, "January 2th, 2025");
    }

    #[test]
    fn suffixes_follow_english_ordinals() {
        let cases = [
            (1, "st"),
            (2, "nd"),
            (3, "rd"),
            (4, "th"),
            (11, "th"),
            (12, "th"),
            (13, "th"),
            (21, "st"),
            (22, "nd"),
            (23, "rd"),
            (30, "th"),
            (31, "st"),
        ];
        for (day, suffix) in cases {
            assert_eq!(ordinal_suffix(day), suffix, "day {day}");
        }
    }

    #[test]
    fn formatted_titles_parse_back_to_the_same_key() {
        let start = NaiveDate::from_ymd_opt(2023, 12, 25).expect("start date");
        for offset in 0..800 {
            let date = start + Duration::days(offset);
            let key = DateKey::from_date(date);
            let parsed = parse_date_key(&key.full_date_text).expect("formatted title parses");
            assert_eq!(parsed, key);
            assert_eq!(parsed.date(), Some(date));
        }
    }
}
