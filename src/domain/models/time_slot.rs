use chrono::{Duration, NaiveDate, NaiveDateTime, NaiveTime};
use serde::Serialize;

pub const LAST_HOUR: u8 = 23;

/// A bookable one-hour unit. Only constructible for hours 0..=23, so `end`
/// is always exactly one hour after `start`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct TimeSlot {
    hour: u8,
    start: String,
    end: String,
    display_label: String,
}

impl TimeSlot {
    pub fn new(hour: u8) -> Option<Self> {
        if hour > LAST_HOUR {
            return None;
        }
        Some(Self {
            hour,
            start: clock(hour),
            end: clock(hour + 1),
            display_label: format!("{:02}:00 - {:02}:00", hour, hour + 1),
        })
    }

    pub fn hour(&self) -> u8 {
        self.hour
    }

    pub fn end_hour(&self) -> u8 {
        self.hour + 1
    }

    /// `HH:00:00`
    pub fn start(&self) -> &str {
        &self.start
    }

    /// `HH+1:00:00`; the slot starting at 23 ends at `24:00:00`.
    pub fn end(&self) -> &str {
        &self.end
    }

    pub fn display_label(&self) -> &str {
        &self.display_label
    }
}

/// Start and end of a contiguous run of slots.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimeRange {
    pub start_hour: u8,
    pub end_hour: u8,
}

impl TimeRange {
    pub fn start(&self) -> String {
        clock(self.start_hour)
    }

    pub fn end(&self) -> String {
        clock(self.end_hour)
    }

    pub fn duration_hours(&self) -> u32 {
        u32::from(self.end_hour.saturating_sub(self.start_hour))
    }

    /// Local start and end on `date`. An end of 24:00 rolls over to midnight of the next day.
    pub fn on_date(&self, date: NaiveDate) -> (NaiveDateTime, NaiveDateTime) {
        let midnight = date.and_time(NaiveTime::MIN);
        (
            midnight + Duration::hours(i64::from(self.start_hour)),
            midnight + Duration::hours(i64::from(self.end_hour)),
        )
    }
}

fn clock(hour: u8) -> String {
    format!("{:02}:00:00", hour)
}
