use std::fmt;
use std::str::FromStr;

use chrono::{Datelike, Months, NaiveDate};
use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// Participant age as years, months and days, written `YY;MM.DD`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct Age {
    pub years: u32,
    pub months: u32,
    pub days: u32,
}

impl Age {
    pub fn new(years: u32, months: u32, days: u32) -> Self {
        Self {
            years,
            months,
            days,
        }
    }

    /// Calendar difference from `birth` to `date`; `None` if `date` precedes `birth`.
    ///
    /// Months count whole-month anniversaries of `birth`, clamped to the end
    /// of short months. Days are counted from the last anniversary.
    pub fn between(birth: NaiveDate, date: NaiveDate) -> Option<Self> {
        if date < birth {
            return None;
        }
        let span = (date.year() - birth.year()) * 12 + date.month() as i32 - birth.month() as i32;
        let mut total_months = u32::try_from(span).ok()?;
        let mut anniversary = birth.checked_add_months(Months::new(total_months))?;
        while anniversary > date {
            total_months = total_months.checked_sub(1)?;
            anniversary = birth.checked_add_months(Months::new(total_months))?;
        }
        let days = u32::try_from((date - anniversary).num_days()).ok()?;
        Some(Self::new(total_months / 12, total_months % 12, days))
    }
}

impl fmt::Display for Age {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:02};{:02}.{:02}", self.years, self.months, self.days)
    }
}

impl FromStr for Age {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || format!("invalid age '{s}', expected YY;MM.DD");
        let number = |part: &str| part.trim().parse::<u32>().map_err(|_| invalid());
        let (years, rest) = match s.split_once(';') {
            Some((y, rest)) => (number(y)?, Some(rest)),
            None => (number(s)?, None),
        };
        let (months, days) = match rest {
            None => (0, 0),
            Some(rest) => match rest.split_once('.') {
                Some((m, d)) => (number(m)?, number(d)?),
                None => (number(rest)?, 0),
            },
        };
        if months >= 12 || days >= 31 {
            return Err(invalid());
        }
        Ok(Self::new(years, months, days))
    }
}

impl Serialize for Age {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for Age {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn parses_and_formats() {
        let age: Age = "03;00.00".parse().unwrap();
        assert_eq!(age, Age::new(3, 0, 0));
        assert_eq!("2;6".parse::<Age>().unwrap(), Age::new(2, 6, 0));
        assert_eq!(Age::new(2, 6, 3).to_string(), "02;06.03");
        assert!("3;14.00".parse::<Age>().is_err());
        assert!("abc".parse::<Age>().is_err());
    }

    #[test]
    fn between_borrows_days_from_previous_month() {
        let age = Age::between(date(2017, 1, 15), date(2020, 3, 10)).unwrap();
        assert_eq!(age, Age::new(3, 1, 24));
        assert_eq!(Age::between(date(2020, 1, 1), date(2019, 1, 1)), None);
    }

    #[test]
    fn between_handles_birth_days_past_the_previous_month_end() {
        // Anniversary in February clamps to the 28th.
        let age = Age::between(date(2020, 1, 31), date(2022, 3, 1)).unwrap();
        assert_eq!(age, Age::new(2, 1, 1));
        let age = Age::between(date(2019, 3, 30), date(2021, 3, 1)).unwrap();
        assert_eq!(age, Age::new(1, 11, 1));
        assert_eq!(Age::between(date(2020, 1, 31), date(2020, 1, 31)), Some(Age::default()));
    }

    #[test]
    fn ordering_is_lexicographic() {
        assert!(Age::new(2, 11, 30) < Age::new(3, 0, 0));
        assert!(Age::new(3, 0, 1) > Age::new(3, 0, 0));
    }
}
