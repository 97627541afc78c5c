use crate::config::toml_config::DateConfig;
use crate::domain::model::{DateSource, ResolvedDate};
use crate::utils::error::{Result, SieveError};
use chrono::{Datelike, NaiveDate};
use regex::{Captures, Regex};
use url::Url;

const MONTH_PATTERN: &str = r"(jan(?:uary)?|feb(?:ruary)?|mar(?:ch)?|apr(?:il)?|may|june?|july?|aug(?:ust)?|sep(?:t(?:ember)?)?|oct(?:ober)?|nov(?:ember)?|dec(?:ember)?)";

const YEARLESS_LOOKAHEAD: i32 = 8;

/// 從 URL、摘要、標題依序找出活動日期
#[derive(Debug, Clone)]
pub struct DateResolver {
    window: DateConfig,
    iso: Regex,
    url_segments: Regex,
    day_month: Regex,
    month_day: Regex,
}

impl DateResolver {
    pub fn new(config: &DateConfig) -> Result<Self> {
        Ok(Self {
            window: *config,
            iso: compile(r"\b(\d{4})-(\d{2})-(\d{2})\b")?,
            url_segments: compile(r"/(\d{4})/(\d{2})/(\d{2})(?:/|$)")?,
            day_month: compile(&format!(
                r"(?i)\b(\d{{1,2}})(?:st|nd|rd|th)?\s+(?:of\s+)?{}\b\.?(?:,?\s+(\d{{4}})\b)?",
                MONTH_PATTERN
            ))?,
            month_day: compile(&format!(
                r"(?i)\b{}\b\.?\s+(\d{{1,2}})(?:st|nd|rd|th)?\b(?:,?\s+(\d{{4}})\b)?",
                MONTH_PATTERN
            ))?,
        })
    }

    /// 優先順序：URL 路徑 > 摘要 > 標題。某欄位只有過去日期時改查下一個欄位。
    pub fn resolve(
        &self,
        url: &str,
        snippet: &str,
        title: &str,
        today: NaiveDate,
    ) -> Option<ResolvedDate> {
        let fields = [
            (DateSource::Url, self.url_candidates(url)),
            (DateSource::Snippet, self.iso_candidates(snippet)),
            (DateSource::Title, self.title_candidates(title, today)),
        ];

        fields.into_iter().find_map(|(source, candidates)| {
            earliest_upcoming(&candidates, today).map(|date| ResolvedDate { date, source })
        })
    }

    /// 月份、日期、年份是否構成合法且在年份範圍內的日期
    pub fn valid_date(&self, year: i32, month: u32, day: u32) -> Option<NaiveDate> {
        if year < self.window.min_year || year > self.window.max_year {
            return None;
        }
        NaiveDate::from_ymd_opt(year, month, day)
    }

    fn url_candidates(&self, url: &str) -> Vec<NaiveDate> {
        let path = match Url::parse(url.trim()) {
            Ok(parsed) => parsed.path().to_string(),
            Err(_) => url
                .split(['?', '#'])
                .next()
                .unwrap_or_default()
                .to_string(),
        };

        let mut dates = self.iso_candidates(&path);
        dates.extend(
            self.url_segments
                .captures_iter(&path)
                .filter_map(|caps| self.numeric_date(&caps)),
        );
        dates
    }

    fn iso_candidates(&self, text: &str) -> Vec<NaiveDate> {
        self.iso
            .captures_iter(text)
            .filter_map(|caps| self.numeric_date(&caps))
            .collect()
    }

    fn title_candidates(&self, title: &str, today: NaiveDate) -> Vec<NaiveDate> {
        let mut dates = self.iso_candidates(title);

        for caps in self.day_month.captures_iter(title) {
            let day = caps.get(1).and_then(|m| m.as_str().parse().ok());
            let month = caps.get(2).and_then(|m| month_number(m.as_str()));
            let year = caps.get(3).and_then(|m| m.as_str().parse().ok());
            if let (Some(day), Some(month)) = (day, month) {
                dates.extend(self.natural_date(year, month, day, today));
            }
        }

        for caps in self.month_day.captures_iter(title) {
            let month = caps.get(1).and_then(|m| month_number(m.as_str()));
            let day = caps.get(2).and_then(|m| m.as_str().parse().ok());
            let year = caps.get(3).and_then(|m| m.as_str().parse().ok());
            if let (Some(day), Some(month)) = (day, month) {
                dates.extend(self.natural_date(year, month, day, today));
            }
        }

        dates
    }

    fn numeric_date(&self, caps: &Captures<'_>) -> Option<NaiveDate> {
        let year = caps.get(1)?.as_str().parse().ok()?;
        let month = caps.get(2)?.as_str().parse().ok()?;
        let day = caps.get(3)?.as_str().parse().ok()?;
        self.valid_date(year, month, day)
    }

    /// 沒有年份時取今天或之後最近的一次；2 月 29 日最多要往後找 8 年
    fn natural_date(
        &self,
        year: Option<i32>,
        month: u32,
        day: u32,
        today: NaiveDate,
    ) -> Option<NaiveDate> {
        match year {
            Some(year) => self.valid_date(year, month, day),
            None => (today.year()..=today.year() + YEARLESS_LOOKAHEAD)
                .filter_map(|y| self.valid_date(y, month, day))
                .find(|date| *date >= today),
        }
    }
}

fn compile(pattern: &str) -> Result<Regex> {
    Regex::new(pattern).map_err(|e| SieveError::ConfigError {
        message: format!("invalid date pattern: {}", e),
    })
}

fn month_number(name: &str) -> Option<u32> {
    let prefix: String = name.to_lowercase().chars().take(3).collect();
    let month = match prefix.as_str() {
        "jan" => 1,
        "feb" => 2,
        "mar" => 3,
        "apr" => 4,
        "may" => 5,
        "jun" => 6,
        "jul" => 7,
        "aug" => 8,
        "sep" => 9,
        "oct" => 10,
        "nov" => 11,
        "dec" => 12,
        _ => return None,
    };
    Some(month)
}

fn earliest_upcoming(candidates: &[NaiveDate], today: NaiveDate) -> Option<NaiveDate> {
    candidates.iter().copied().filter(|d| *d >= today).min()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn resolver() -> DateResolver {
        DateResolver::new(&DateConfig::default()).unwrap()
    }

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn today() -> NaiveDate {
        date(2026, 1, 1)
    }

    #[test]
    fn test_url_date_wins_over_snippet() {
        let resolved = resolver()
            .resolve(
                "https://example.com/events/2026-03-15-party",
                "Event on 2026-02-21 at venue",
                "Party in January",
                today(),
            )
            .unwrap();
        assert_eq!(resolved.date, date(2026, 3, 15));
        assert_eq!(resolved.source, DateSource::Url);
    }

    #[test]
    fn test_url_slash_segments() {
        let resolved = resolver()
            .resolve(
                "https://eventbrite.co.uk/events/2026/01/07/black-pride",
                "",
                "",
                today(),
            )
            .unwrap();
        assert_eq!(resolved.date, date(2026, 1, 7));
    }

    #[test]
    fn test_url_query_is_ignored() {
        let resolved = resolver().resolve(
            "https://example.com/event?date=2026-01-07&utm=1",
            "",
            "",
            today(),
        );
        assert!(resolved.is_none());
    }

    #[test]
    fn test_past_url_date_falls_through_to_snippet() {
        let resolved = resolver()
            .resolve(
                "https://example.com/2020-01-07-old-event",
                "Next edition on 2026-05-02",
                "",
                today(),
            )
            .unwrap();
        assert_eq!(resolved.date, date(2026, 5, 2));
        assert_eq!(resolved.source, DateSource::Snippet);
    }

    #[test]
    fn test_snippet_prefers_future_candidate() {
        let resolved = resolver()
            .resolve(
                "https://example.com/e",
                "Past event was 2020-01-07, next event 2026-01-07",
                "",
                today(),
            )
            .unwrap();
        assert_eq!(resolved.date, date(2026, 1, 7));
    }

    #[test]
    fn test_snippet_earliest_upcoming_wins() {
        let resolved = resolver()
            .resolve(
                "",
                "Registration opens 2026-01-05, event on 2026-01-07",
                "",
                today(),
            )
            .unwrap();
        assert_eq!(resolved.date, date(2026, 1, 5));
    }

    #[test]
    fn test_title_ordinal_date() {
        let resolved = resolver()
            .resolve(
                "https://example.com/hungama",
                "Join us for a celebration",
                "Hungama Queer Celebration - 21st February 2026",
                today(),
            )
            .unwrap();
        assert_eq!(resolved.date, date(2026, 2, 21));
        assert_eq!(resolved.source, DateSource::Title);
    }

    #[test]
    fn test_title_month_first_date() {
        let r = resolver();
        assert_eq!(
            r.resolve("", "", "BBZ Party Jan 7 2026", today()).unwrap().date,
            date(2026, 1, 7)
        );
        assert_eq!(
            r.resolve("", "", "Pride Picnic: January 7th, 2027", today())
                .unwrap()
                .date,
            date(2027, 1, 7)
        );
    }

    #[test]
    fn test_title_without_year_rolls_forward() {
        let run_date = date(2026, 10, 19);
        let resolved = resolver()
            .resolve("", "", "Join us Tuesday January 7th", run_date)
            .unwrap();
        assert_eq!(resolved.date, date(2027, 1, 7));

        let resolved = resolver()
            .resolve("", "", "Club night 14 November", run_date)
            .unwrap();
        assert_eq!(resolved.date, date(2026, 11, 14));
    }

    #[test]
    fn test_yearless_leap_day_waits_for_next_leap_year() {
        let r = resolver();
        let resolved = r
            .resolve("", "", "Leap party February 29th", date(2026, 3, 1))
            .unwrap();
        assert_eq!(resolved.date, date(2028, 2, 29));
        assert_eq!(resolved.source, DateSource::Title);

        assert_eq!(
            r.resolve("", "", "Leap party 29 Feb", date(2028, 2, 29))
                .unwrap()
                .date,
            date(2028, 2, 29)
        );
        // 2100 不是閏年
        assert_eq!(
            r.resolve("", "", "Leap party February 29th", date(2096, 3, 1)),
            None
        );
    }

    #[test]
    fn test_today_counts_as_upcoming() {
        let resolved = resolver()
            .resolve("", "Tonight! 2026-01-01", "", today())
            .unwrap();
        assert_eq!(resolved.date, today());
    }

    #[test]
    fn test_invalid_calendar_dates_rejected() {
        let r = resolver();
        assert!(r.resolve("", "Event on 2026-02-30", "", today()).is_none());
        assert!(r.resolve("", "Event on 2026-13-01", "", today()).is_none());
        assert!(r.resolve("", "Event on 2026-01-32", "", today()).is_none());
        assert!(r.resolve("", "Event on 2026-00-10", "", today()).is_none());
        assert!(r.resolve("", "", "30th February 2026", today()).is_none());
    }

    #[test]
    fn test_leap_day_only_in_leap_years() {
        let r = resolver();
        assert_eq!(
            r.resolve("", "Leap party 2028-02-29", "", today()).unwrap().date,
            date(2028, 2, 29)
        );
        assert!(r.resolve("", "Leap party 2026-02-29", "", today()).is_none());
        assert!(r.valid_date(2028, 2, 29).is_some());
        assert!(r.valid_date(2026, 2, 29).is_none());
    }

    #[test]
    fn test_year_window() {
        let r = DateResolver::new(&DateConfig {
            min_year: 2025,
            max_year: 2027,
        })
        .unwrap();
        assert!(r.resolve("", "See you 2030-06-01", "", today()).is_none());
        assert!(r.valid_date(2027, 12, 31).is_some());
        assert!(r.valid_date(9999, 1, 1).is_none());
    }

    #[test]
    fn test_no_date_anywhere() {
        assert!(resolver()
            .resolve(
                "https://example.com/event/celebration",
                "Join us for a fun celebration",
                "Queer celebration",
                today(),
            )
            .is_none());
    }

    #[test]
    fn test_word_containing_month_name_is_ignored() {
        assert!(resolver()
            .resolve("", "", "Marvel fans meet 12 Marvellous", today())
            .is_none());
    }
}
