//! Natural-language date phrase parsing
//!
//! Recognizes explicit dates, month/year pairs and a handful of relative
//! phrases. Ambiguous phrases resolve into the past ("friday" is the most
//! recent Friday, never the next one).

use chrono::{Datelike, Duration, NaiveDate, Weekday};
use regex::{Captures, Regex};
use std::sync::LazyLock;

const MONTH_ALTERNATION: &str = "january|february|march|april|may|june|july|august|september|october|november|december|jan|feb|mar|apr|jun|jul|aug|sept|sep|oct|nov|dec";

/// Years accepted when a month name and a year are not adjacent
const PLAUSIBLE_YEARS: std::ops::RangeInclusive<i32> = 1970..=2100;

/// What the parser could establish about a phrase
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParsedDate {
    /// Year and month known, day not confirmed
    Month { year: i32, month: u32 },
    /// A specific calendar day
    Day(NaiveDate),
}

/// Map a month name or abbreviation to its number
pub fn month_number(name: &str) -> Option<u32> {
    let lower = name.to_ascii_lowercase();
    let month = match lower.as_str() {
        "january" | "jan" => 1,
        "february" | "feb" => 2,
        "march" | "mar" => 3,
        "april" | "apr" => 4,
        "may" => 5,
        "june" | "jun" => 6,
        "july" | "jul" => 7,
        "august" | "aug" => 8,
        "september" | "sept" | "sep" => 9,
        "october" | "oct" => 10,
        "november" | "nov" => 11,
        "december" | "dec" => 12,
        _ => return None,
    };
    Some(month)
}

/// First month name in `text`, as a month number
pub fn find_month_name(text: &str) -> Option<u32> {
    MONTH_NAME
        .captures(text)
        .and_then(|caps| month_number(&caps[1]))
}

/// True if `text` contains a standalone 4-digit token
pub fn has_year_token(text: &str) -> bool {
    YEAR_TOKEN.is_match(text)
}

static MONTH_NAME: LazyLock<Regex> =
    LazyLock::new(|| compile(&format!(r"(?i)\b({MONTH_ALTERNATION})\b")));

static YEAR_TOKEN: LazyLock<Regex> = LazyLock::new(|| compile(r"\b\d{4}\b"));

static WEEKDAY: LazyLock<Regex> = LazyLock::new(|| {
    compile(
        r"(?i)\b(?:(last|past|this)\s+)?(monday|tuesday|wednesday|thursday|friday|saturday|sunday)\b",
    )
});

type Extractor = fn(&Captures<'_>, NaiveDate) -> Option<ParsedDate>;

/// Explicit dates and month/year pairs; earlier entries win
static EXPLICIT: LazyLock<Vec<(Regex, Extractor)>> = LazyLock::new(|| {
    let m = MONTH_ALTERNATION;
    vec![
        // 2025-05-14
        rule(r"\b(\d{4})-(\d{1,2})-(\d{1,2})\b", |c, _| {
            ymd(num(c, 1)?, num(c, 2)?, num(c, 3)?)
        }),
        // 2025/05/14
        rule(r"\b(\d{4})/(\d{1,2})/(\d{1,2})\b", |c, _| {
            ymd(num(c, 1)?, num(c, 2)?, num(c, 3)?)
        }),
        // 05/14/2025
        rule(r"\b(\d{1,2})/(\d{1,2})/(\d{4})\b", |c, _| {
            ymd(num(c, 3)?, num(c, 1)?, num(c, 2)?)
        }),
        // May 14, 2025
        rule(
            &format!(r"(?i)\b({m})\.?\s+(\d{{1,2}})(?:st|nd|rd|th)?,?\s+(\d{{4}})\b"),
            |c, _| ymd(num(c, 3)?, month_number(&c[1])?.into(), num(c, 2)?),
        ),
        // 14 May 2025, 14th of May 2025
        rule(
            &format!(r"(?i)\b(\d{{1,2}})(?:st|nd|rd|th)?\s+(?:of\s+)?({m})\.?,?\s+(\d{{4}})\b"),
            |c, _| ymd(num(c, 3)?, month_number(&c[2])?.into(), num(c, 1)?),
        ),
        // May 2025, May of 2025
        rule(&format!(r"(?i)\b({m})\.?,?\s+(?:of\s+)?(\d{{4}})\b"), |c, _| {
            ym(num(c, 2)?, month_number(&c[1])?.into())
        }),
        // 2025 May
        rule(&format!(r"(?i)\b(\d{{4}})\s+({m})\b"), |c, _| {
            ym(num(c, 1)?, month_number(&c[2])?.into())
        }),
        // 2025-05, but not the front of a rejected 2025-02-30
        rule(r"\b(\d{4})-(\d{1,2})(?:[^\d-]|$)", |c, _| {
            ym(num(c, 1)?, num(c, 2)?)
        }),
    ]
});

/// Phrases relative to today
static RELATIVE: LazyLock<Vec<(Regex, Extractor)>> = LazyLock::new(|| {
    vec![
        rule(r"(?i)\btoday\b", |_, today| Some(ParsedDate::Day(today))),
        rule(r"(?i)\byesterday\b", |_, today| {
            today.pred_opt().map(ParsedDate::Day)
        }),
        rule(r"(?i)\b(\d{1,3})\s+days?\s+ago\b", |c, today| {
            days_back(today, num(c, 1)?)
        }),
        rule(r"(?i)\b(\d{1,2})\s+weeks?\s+ago\b", |c, today| {
            days_back(today, num(c, 1)? * 7)
        }),
        rule(r"(?i)\b(\d{1,2})\s+months?\s+ago\b", |c, today| {
            months_back(today, num(c, 1)?)
        }),
    ]
});

fn rule(pattern: &str, extract: Extractor) -> (Regex, Extractor) {
    (compile(pattern), extract)
}

fn compile(pattern: &str) -> Regex {
    Regex::new(pattern).expect("static phrase pattern must compile")
}

fn num(caps: &Captures<'_>, index: usize) -> Option<i64> {
    caps.get(index)?.as_str().parse().ok()
}

fn ymd(year: i64, month: i64, day: i64) -> Option<ParsedDate> {
    NaiveDate::from_ymd_opt(
        i32::try_from(year).ok()?,
        u32::try_from(month).ok()?,
        u32::try_from(day).ok()?,
    )
    .map(ParsedDate::Day)
}

fn ym(year: i64, month: i64) -> Option<ParsedDate> {
    let year = i32::try_from(year).ok()?;
    let month = u32::try_from(month).ok()?;
    // Reject month 13 and friends
    NaiveDate::from_ymd_opt(year, month, 1)?;
    Some(ParsedDate::Month { year, month })
}

fn days_back(today: NaiveDate, days: i64) -> Option<ParsedDate> {
    today
        .checked_sub_signed(Duration::days(days))
        .map(ParsedDate::Day)
}

fn months_back(today: NaiveDate, months: i64) -> Option<ParsedDate> {
    let index = today.year() as i64 * 12 + today.month0() as i64 - months;
    ym(index.div_euclid(12), index.rem_euclid(12) + 1)
}

fn weekday_from(name: &str) -> Option<Weekday> {
    name.to_ascii_lowercase().parse().ok()
}

/// Most recent `weekday` on or before `today`; strictly before when `exclude_today`
fn most_recent(today: NaiveDate, weekday: Weekday, exclude_today: bool) -> NaiveDate {
    let mut back = (7 + today.weekday().num_days_from_monday() as i64
        - weekday.num_days_from_monday() as i64)
        % 7;
    if back == 0 && exclude_today {
        back = 7;
    }
    today - Duration::days(back)
}

fn first_match(
    patterns: &[(Regex, Extractor)],
    text: &str,
    today: NaiveDate,
) -> Option<ParsedDate> {
    patterns.iter().find_map(|(pattern, extract)| {
        pattern
            .captures(text)
            .and_then(|caps| extract(&caps, today))
    })
}

/// "costs in May for 2025": a month name and the first plausible year anywhere
fn month_with_year(text: &str) -> Option<ParsedDate> {
    let month = find_month_name(text)?;
    let year = YEAR_TOKEN
        .find_iter(text)
        .filter_map(|token| token.as_str().parse::<i32>().ok())
        .find(|year| PLAUSIBLE_YEARS.contains(year))?;
    ym(year.into(), month.into())
}

fn weekday(text: &str, today: NaiveDate) -> Option<ParsedDate> {
    let caps = WEEKDAY.captures(text)?;
    let weekday = weekday_from(&caps[2])?;
    let exclude_today = caps
        .get(1)
        .is_some_and(|m| !m.as_str().eq_ignore_ascii_case("this"));
    Some(ParsedDate::Day(most_recent(today, weekday, exclude_today)))
}

/// Lone month name: its most recent start on or before `today`
fn latest_month(text: &str, today: NaiveDate) -> Option<ParsedDate> {
    let month = find_month_name(text)?;
    let year = if month <= today.month() {
        today.year()
    } else {
        today.year() - 1
    };
    ym(year.into(), month.into())
}

/// Parse a phrase relative to `today`, preferring past interpretations.
pub fn parse(text: &str, today: NaiveDate) -> Option<ParsedDate> {
    first_match(&EXPLICIT, text, today)
        .or_else(|| month_with_year(text))
        .or_else(|| first_match(&RELATIVE, text, today))
        .or_else(|| weekday(text, today))
        .or_else(|| latest_month(text, today))
}
