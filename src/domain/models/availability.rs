use chrono::Weekday;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// One configured opening, normally a single hour (`end_hour == hour + 1`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct OpenHour {
    pub hour: u8,
    pub end_hour: u8,
}

impl OpenHour {
    pub fn single(hour: u8) -> Self {
        Self { hour, end_hour: hour + 1 }
    }

    pub fn span_hours(&self) -> i16 {
        self.end_hour as i16 - self.hour as i16
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DaySource {
    Weekly,
    DateSpecific,
}

/// The hours a weekday is open. An empty `hours` list means explicitly closed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DayAvailability {
    pub source: DaySource,
    pub hours: Vec<OpenHour>,
}

impl DayAvailability {
    pub fn is_closed(&self) -> bool {
        self.hours.is_empty()
    }
}

/// Weekday-indexed open hours (index 0 = Sunday).
///
/// `None` for a weekday means the venue never configured it; `Some` with no
/// hours means it was configured as closed. Both produce no slots.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AvailabilityTemplate {
    days: [Option<DayAvailability>; 7],
}

impl AvailabilityTemplate {
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn set_day(&mut self, weekday: Weekday, day: DayAvailability) {
        self.days[weekday_index(weekday)] = Some(day);
    }

    pub fn day(&self, weekday: Weekday) -> Option<&DayAvailability> {
        self.days[weekday_index(weekday)].as_ref()
    }

    pub fn open_hours(&self, weekday: Weekday) -> &[OpenHour] {
        self.day(weekday).map(|d| d.hours.as_slice()).unwrap_or(&[])
    }

    pub fn is_configured(&self, weekday: Weekday) -> bool {
        self.day(weekday).is_some()
    }

    pub fn is_empty(&self) -> bool {
        self.days.iter().all(Option::is_none)
    }

    pub fn configured_days(&self) -> impl Iterator<Item = (Weekday, &DayAvailability)> {
        self.days
            .iter()
            .enumerate()
            .filter_map(|(idx, day)| Some((weekday_from_index(idx as u32)?, day.as_ref()?)))
    }
}

pub fn weekday_index(weekday: Weekday) -> usize {
    weekday.num_days_from_sunday() as usize
}

pub fn weekday_from_index(idx: u32) -> Option<Weekday> {
    match idx {
        0 => Some(Weekday::Sun),
        1 => Some(Weekday::Mon),
        2 => Some(Weekday::Tue),
        3 => Some(Weekday::Wed),
        4 => Some(Weekday::Thu),
        5 => Some(Weekday::Fri),
        6 => Some(Weekday::Sat),
        _ => None,
    }
}

/// Availability payload as returned by the Venue Directory.
///
/// `weekly` is weekday-indexed, either as an object keyed by weekday or as an
/// array of hour lists by position (0 = Sunday). Hour entries may be numbers,
/// strings or `{start, end}` objects; see `domain::services::availability`.
/// `date_specific` is weekday-indexed like `weekly` or a bare hour list for the
/// requested date.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RawAvailability {
    #[serde(default, rename = "semanal", alias = "weekly")]
    pub weekly: Option<Value>,
    #[serde(default, rename = "fechaEspecifica", alias = "specific")]
    pub date_specific: Option<Value>,
}
