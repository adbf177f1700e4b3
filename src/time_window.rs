//! Calendar windows in the operator's fixed timezone
//!
//! Streak days, the weekly leaderboard window and the reset schedule are
//! all evaluated in one fixed UTC offset configured by the operator.
//! - Day buckets: "YYYY-MM-DD" local dates
//! - Week windows: Monday 00:00 local to the next Monday 00:00
//! - Month windows: the 1st 00:00 local to the next 1st 00:00

use chrono::{
    DateTime, Datelike, Duration, FixedOffset, Months, NaiveDate, NaiveTime, Utc,
};

/// Local calendar date of `now`
pub fn local_date(now: DateTime<Utc>, offset: FixedOffset) -> NaiveDate {
    now.with_timezone(&offset).date_naive()
}

/// Format a local date as "YYYY-MM-DD"
pub fn day_bucket(date: NaiveDate) -> String {
    format!("{:04}-{:02}-{:02}", date.year(), date.month(), date.day())
}

/// Parse a "YYYY-MM-DD" bucket
pub fn parse_day_bucket(bucket: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(bucket, "%Y-%m-%d").ok()
}

/// UTC instant of local midnight at the start of `date`
pub fn local_midnight(date: NaiveDate, offset: FixedOffset) -> DateTime<Utc> {
    let local = date.and_time(NaiveTime::MIN);
    (local - Duration::seconds(offset.local_minus_utc().into())).and_utc()
}

/// Start of the local day containing `now`
pub fn day_start(now: DateTime<Utc>, offset: FixedOffset) -> DateTime<Utc> {
    local_midnight(local_date(now, offset), offset)
}

/// Monday 00:00 local of the week containing `now`
pub fn week_start(now: DateTime<Utc>, offset: FixedOffset) -> DateTime<Utc> {
    let date = local_date(now, offset);
    let monday = date - Duration::days(date.weekday().num_days_from_monday().into());
    local_midnight(monday, offset)
}

/// The 1st 00:00 local of the month containing `now`
pub fn month_start(now: DateTime<Utc>, offset: FixedOffset) -> DateTime<Utc> {
    local_midnight(first_of_month(local_date(now, offset)), offset)
}

/// Next local midnight strictly after `now`
pub fn next_day_start(now: DateTime<Utc>, offset: FixedOffset) -> DateTime<Utc> {
    day_start(now, offset) + Duration::days(1)
}

/// Next local Monday midnight strictly after `now`
pub fn next_week_start(now: DateTime<Utc>, offset: FixedOffset) -> DateTime<Utc> {
    week_start(now, offset) + Duration::days(7)
}

/// Next local 1st-of-month midnight strictly after `now`
pub fn next_month_start(now: DateTime<Utc>, offset: FixedOffset) -> DateTime<Utc> {
    let first = first_of_month(local_date(now, offset));
    let next = first
        .checked_add_months(Months::new(1))
        .unwrap_or(NaiveDate::MAX);
    local_midnight(next, offset)
}

fn first_of_month(date: NaiveDate) -> NaiveDate {
    date.with_day(1).unwrap_or(date)
}

/// Parse an offset such as "+02:00", "-0330", "Z" or "UTC"
pub fn parse_offset(s: &str) -> Option<FixedOffset> {
    let s = s.trim();
    if s.eq_ignore_ascii_case("z") || s.eq_ignore_ascii_case("utc") {
        return FixedOffset::east_opt(0);
    }

    let (sign, rest) = match s.as_bytes().first()? {
        b'+' => (1, &s[1..]),
        b'-' => (-1, &s[1..]),
        _ => return None,
    };
    let digits: String = rest.chars().filter(|c| *c != ':').collect();
    if digits.len() != 4 || !digits.chars().all(|c| c.is_ascii_digit()) {
        return None;
    }
    let hours: i32 = digits[..2].parse().ok()?;
    let minutes: i32 = digits[2..].parse().ok()?;
    if hours > 14 || minutes > 59 {
        return None;
    }
    FixedOffset::east_opt(sign * (hours * 3600 + minutes * 60))
}
