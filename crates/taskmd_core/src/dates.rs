use crate::config::Config;
use once_cell::sync::Lazy;
use regex::{Captures, Regex};
use time::format_description::well_known::Rfc3339;
use time::{Date, Duration, Month, OffsetDateTime, Time, UtcOffset, Weekday};

static ISO_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^(\d{4})[-/](\d{1,2})[-/](\d{1,2})(?:[ t](\d{1,2}):(\d{2})(?::(\d{2}))?)?$")
        .expect("valid iso date regex")
});
static US_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(\d{1,2})/(\d{1,2})/(\d{4})$").expect("valid us date regex"));
static MONTH_FIRST_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^([a-z]+)\.? (\d{1,2})(?:st|nd|rd|th)?(?:,? (\d{4}))?$")
        .expect("valid month-first regex")
});
static DAY_FIRST_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^(\d{1,2})(?:st|nd|rd|th)? ([a-z]+)\.?,?(?: (\d{4}))?$")
        .expect("valid day-first regex")
});
static IN_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^in ([a-z0-9]+) (day|week|month|year)s?$").expect("valid relative regex")
});
static AGO_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^([a-z0-9]+) (day|week|month|year)s? ago$").expect("valid relative regex")
});
static STEP_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^(next|last) (week|month|year)$").expect("valid relative regex")
});
static WEEKDAY_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^(?:(next|last|this) )?(monday|tuesday|wednesday|thursday|friday|saturday|sunday)$")
        .expect("valid weekday regex")
});

const SECONDS_PER_DAY: i64 = 86_400;
const SECONDS_PER_WEEK: i64 = 7 * SECONDS_PER_DAY;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Unit {
    Day,
    Week,
    Month,
    Year,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DateResolver {
    reference: OffsetDateTime,
}

impl DateResolver {
    pub fn new(reference: OffsetDateTime) -> Self {
        Self { reference }
    }

    pub fn now(offset: UtcOffset) -> Self {
        Self::new(OffsetDateTime::now_utc().to_offset(offset))
    }

    pub fn from_config(config: &Config) -> Self {
        Self::now(config.offset())
    }

    pub fn reference(&self) -> OffsetDateTime {
        self.reference
    }

    pub fn resolve(&self, text: &str) -> Option<OffsetDateTime> {
        let trimmed = text.trim();
        if trimmed.is_empty() {
            return None;
        }
        if let Ok(parsed) = OffsetDateTime::parse(trimmed, &Rfc3339) {
            return Some(parsed);
        }

        let normalized = trimmed
            .to_ascii_lowercase()
            .split_whitespace()
            .collect::<Vec<_>>()
            .join(" ");
        let resolved = self
            .keyword(&normalized)
            .or_else(|| self.absolute(&normalized))
            .or_else(|| self.relative(&normalized));

        match resolved {
            Some(value) => log::trace!("resolved date '{trimmed}' to {value}"),
            None => log::trace!("could not resolve date '{trimmed}'"),
        }
        resolved
    }

    fn offset(&self) -> UtcOffset {
        self.reference.offset()
    }

    fn today(&self) -> Date {
        self.reference.date()
    }

    // Day-level expressions land on midnight; amounts of time keep the time of day.
    fn at_midnight(&self, date: Date) -> OffsetDateTime {
        date.midnight().assume_offset(self.offset())
    }

    fn keyword(&self, text: &str) -> Option<OffsetDateTime> {
        match text {
            "now" => Some(self.reference),
            "today" => Some(self.at_midnight(self.today())),
            "tomorrow" => self.today().next_day().map(|day| self.at_midnight(day)),
            "yesterday" => self.today().previous_day().map(|day| self.at_midnight(day)),
            _ => None,
        }
    }

    fn absolute(&self, text: &str) -> Option<OffsetDateTime> {
        if let Some(captures) = ISO_RE.captures(text) {
            let date = calendar_date(
                number(&captures, 1)?,
                number(&captures, 2)?,
                number(&captures, 3)?,
            )?;
            let time = match captures.get(4) {
                Some(_) => Time::from_hms(
                    u8::try_from(number(&captures, 4)?).ok()?,
                    u8::try_from(number(&captures, 5)?).ok()?,
                    u8::try_from(number(&captures, 6).unwrap_or(0)).ok()?,
                )
                .ok()?,
                None => Time::MIDNIGHT,
            };
            return Some(date.with_time(time).assume_offset(self.offset()));
        }

        if let Some(captures) = US_RE.captures(text) {
            let date = calendar_date(
                number(&captures, 3)?,
                number(&captures, 1)?,
                number(&captures, 2)?,
            )?;
            return Some(self.at_midnight(date));
        }

        if let Some(captures) = MONTH_FIRST_RE.captures(text)
            && let Some(month) = month_from_name(&captures[1])
        {
            let year = number(&captures, 3).unwrap_or(self.today().year());
            let date = calendar_date(year, u8::from(month).into(), number(&captures, 2)?)?;
            return Some(self.at_midnight(date));
        }

        if let Some(captures) = DAY_FIRST_RE.captures(text)
            && let Some(month) = month_from_name(&captures[2])
        {
            let year = number(&captures, 3).unwrap_or(self.today().year());
            let date = calendar_date(year, u8::from(month).into(), number(&captures, 1)?)?;
            return Some(self.at_midnight(date));
        }

        None
    }

    fn relative(&self, text: &str) -> Option<OffsetDateTime> {
        if let Some(captures) = IN_RE.captures(text) {
            let amount = amount(&captures[1])?;
            return self.shift(amount, unit(&captures[2])?);
        }

        if let Some(captures) = AGO_RE.captures(text) {
            let amount = amount(&captures[1])?;
            return self.shift(-amount, unit(&captures[2])?);
        }

        if let Some(captures) = STEP_RE.captures(text) {
            let amount = if &captures[1] == "next" { 1 } else { -1 };
            return self.shift(amount, unit(&captures[2])?);
        }

        if let Some(captures) = WEEKDAY_RE.captures(text) {
            let target = weekday_from_name(&captures[2])?;
            let date = self.weekday(target, captures.get(1).map(|word| word.as_str()))?;
            return Some(self.at_midnight(date));
        }

        None
    }

    fn shift(&self, amount: i64, unit: Unit) -> Option<OffsetDateTime> {
        match unit {
            Unit::Day => self
                .reference
                .checked_add(Duration::seconds(amount.checked_mul(SECONDS_PER_DAY)?)),
            Unit::Week => self
                .reference
                .checked_add(Duration::seconds(amount.checked_mul(SECONDS_PER_WEEK)?)),
            Unit::Month => {
                let date = add_months(self.today(), i32::try_from(amount).ok()?)?;
                Some(self.reference.replace_date(date))
            }
            Unit::Year => {
                let date = add_months(self.today(), i32::try_from(amount.checked_mul(12)?).ok()?)?;
                Some(self.reference.replace_date(date))
            }
        }
    }

    fn weekday(&self, target: Weekday, qualifier: Option<&str>) -> Option<Date> {
        let today = self.today();
        let current = i64::from(today.weekday().number_days_from_monday());
        let wanted = i64::from(target.number_days_from_monday());
        let ahead = (wanted - current).rem_euclid(7);

        let delta = match qualifier {
            Some("next") if ahead == 0 => 7,
            Some("last") => {
                let behind = (current - wanted).rem_euclid(7);
                if behind == 0 { -7 } else { -behind }
            }
            _ => ahead,
        };
        today.checked_add(Duration::days(delta))
    }
}

fn number(captures: &Captures<'_>, index: usize) -> Option<i32> {
    captures.get(index)?.as_str().parse().ok()
}

fn calendar_date(year: i32, month: i32, day: i32) -> Option<Date> {
    let month = Month::try_from(u8::try_from(month).ok()?).ok()?;
    Date::from_calendar_date(year, month, u8::try_from(day).ok()?).ok()
}

fn add_months(date: Date, months: i32) -> Option<Date> {
    let index = date
        .year()
        .checked_mul(12)?
        .checked_add(i32::from(u8::from(date.month())) - 1)?
        .checked_add(months)?;
    let year = index.div_euclid(12);
    let month = Month::try_from(u8::try_from(index.rem_euclid(12) + 1).ok()?).ok()?;
    let day = date.day().min(time::util::days_in_year_month(year, month));
    Date::from_calendar_date(year, month, day).ok()
}

fn amount(word: &str) -> Option<i64> {
    if let Ok(value) = word.parse::<i64>() {
        return Some(value);
    }
    let value = match word {
        "a" | "an" | "one" => 1,
        "two" => 2,
        "three" => 3,
        "four" => 4,
        "five" => 5,
        "six" => 6,
        "seven" => 7,
        "eight" => 8,
        "nine" => 9,
        "ten" => 10,
        "eleven" => 11,
        "twelve" => 12,
        _ => return None,
    };
    Some(value)
}

fn unit(word: &str) -> Option<Unit> {
    match word {
        "day" => Some(Unit::Day),
        "week" => Some(Unit::Week),
        "month" => Some(Unit::Month),
        "year" => Some(Unit::Year),
        _ => None,
    }
}

fn month_from_name(name: &str) -> Option<Month> {
    let month = match name {
        "jan" | "january" => Month::January,
        "feb" | "february" => Month::February,
        "mar" | "march" => Month::March,
        "apr" | "april" => Month::April,
        "may" => Month::May,
        "jun" | "june" => Month::June,
        "jul" | "july" => Month::July,
        "aug" | "august" => Month::August,
        "sep" | "sept" | "september" => Month::September,
        "oct" | "october" => Month::October,
        "nov" | "november" => Month::November,
        "dec" | "december" => Month::December,
        _ => return None,
    };
    Some(month)
}

fn weekday_from_name(name: &str) -> Option<Weekday> {
    let weekday = match name {
        "monday" => Weekday::Monday,
        "tuesday" => Weekday::Tuesday,
        "wednesday" => Weekday::Wednesday,
        "thursday" => Weekday::Thursday,
        "friday" => Weekday::Friday,
        "saturday" => Weekday::Saturday,
        "sunday" => Weekday::Sunday,
        _ => return None,
    };
    Some(weekday)
}
