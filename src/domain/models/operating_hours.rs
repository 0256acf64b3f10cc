use serde::{Deserialize, Serialize};
use chrono::{NaiveDate, Weekday};

/// One contiguous open interval of a day, as "HH:MM" strings in venue-local time.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct OpenPeriod {
    pub open: String,
    pub close: String,
}

impl OpenPeriod {
    pub fn new(open: &str, close: &str) -> Self {
        Self { open: open.to_string(), close: close.to_string() }
    }
}

#[derive(Debug, Serialize, Deserialize, Clone, Default, PartialEq)]
#[serde(default)]
pub struct DayHours {
    pub closed: bool,
    pub periods: Vec<OpenPeriod>,
}

#[derive(Debug, Serialize, Deserialize, Clone, Default, PartialEq)]
#[serde(default)]
pub struct WeeklySchedule {
    pub monday: Option<DayHours>,
    pub tuesday: Option<DayHours>,
    pub wednesday: Option<DayHours>,
    pub thursday: Option<DayHours>,
    pub friday: Option<DayHours>,
    pub saturday: Option<DayHours>,
    pub sunday: Option<DayHours>,
}

impl WeeklySchedule {
    pub fn for_weekday(&self, weekday: Weekday) -> Option<&DayHours> {
        match weekday {
            Weekday::Mon => self.monday.as_ref(),
            Weekday::Tue => self.tuesday.as_ref(),
            Weekday::Wed => self.wednesday.as_ref(),
            Weekday::Thu => self.thursday.as_ref(),
            Weekday::Fri => self.friday.as_ref(),
            Weekday::Sat => self.saturday.as_ref(),
            Weekday::Sun => self.sunday.as_ref(),
        }
    }

    pub fn is_empty(&self) -> bool {
        [&self.monday, &self.tuesday, &self.wednesday, &self.thursday, &self.friday, &self.saturday, &self.sunday]
            .iter()
            .all(|d| d.is_none())
    }
}

/// Alternate weekly schedule for an inclusive date range (e.g. summer hours).
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct SeasonalOverride {
    #[serde(default)]
    pub name: String,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub schedule: WeeklySchedule,
}

impl SeasonalOverride {
    pub fn covers(&self, date: NaiveDate) -> bool {
        self.start_date <= date && date <= self.end_date
    }
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct SpecialDateOverride {
    pub date: NaiveDate,
    #[serde(default)]
    pub closed: bool,
    pub reason: Option<String>,
    #[serde(default)]
    pub periods: Vec<OpenPeriod>,
}

#[derive(Debug, Serialize, Deserialize, Clone, Default, PartialEq)]
#[serde(default)]
pub struct BookingRules {
    pub min_duration_hours: Option<i32>,
    pub max_duration_hours: Option<i32>,
}

/// Operating-hours document stored as JSON on the venue row.
#[derive(Debug, Serialize, Deserialize, Clone, Default, PartialEq)]
#[serde(default)]
pub struct OperatingHours {
    pub regular: WeeklySchedule,
    pub seasonal: Vec<SeasonalOverride>,
    pub special_dates: Vec<SpecialDateOverride>,
    pub booking_rules: Option<BookingRules>,
}

impl OperatingHours {
    pub fn special_for(&self, date: NaiveDate) -> Option<&SpecialDateOverride> {
        self.special_dates.iter().find(|s| s.date == date)
    }

    pub fn season_for(&self, date: NaiveDate) -> Option<&SeasonalOverride> {
        self.seasonal.iter().find(|s| s.covers(date))
    }
}
