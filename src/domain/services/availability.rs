use chrono::{Datelike, NaiveDate, Weekday};
use serde_json::{Map, Value};
use tracing::{debug, warn};

use crate::domain::models::availability::{
    weekday_from_index, AvailabilityTemplate, DayAvailability, DaySource, OpenHour, RawAvailability,
};
use crate::domain::ports::VenueDirectory;
use crate::error::AppError;

/// Fetches the hours configured for `date` and normalizes them into a typed template.
///
/// A venue without configuration yields an empty template, which callers treat
/// as closed all day. Transport failures are returned so the session can degrade
/// to an empty slot list with a notice.
pub async fn resolve(
    directory: &dyn VenueDirectory,
    manager_id: &str,
    date: NaiveDate,
) -> Result<AvailabilityTemplate, AppError> {
    let raw = directory.get_availability(manager_id, date).await?;
    let template = normalize_availability(&raw, date);
    debug!(
        "Resolved availability for manager {} on {}: {} configured weekdays",
        manager_id,
        date,
        template.configured_days().count()
    );
    Ok(template)
}

/// Builds the template for `date`. A date-specific entry for the date's
/// weekday replaces the weekly entry entirely, even when it lists no hours.
pub fn normalize_availability(raw: &RawAvailability, date: NaiveDate) -> AvailabilityTemplate {
    let mut template = AvailabilityTemplate::empty();

    match &raw.weekly {
        None | Some(Value::Null) => {}
        Some(weekly) => match weekday_entries(weekly) {
            Some(entries) => {
                for (weekday, hours) in entries {
                    template.set_day(weekday, DayAvailability { source: DaySource::Weekly, hours });
                }
            }
            None => warn!("Unexpected weekly availability shape: {}", weekly),
        },
    }

    let target = date.weekday();
    let override_hours = match &raw.date_specific {
        None | Some(Value::Null) => None,
        Some(value) => match weekday_entries(value) {
            Some(entries) => {
                let mut found = None;
                for (weekday, hours) in entries {
                    if weekday == target {
                        found = Some(hours);
                    } else {
                        debug!("Ignoring date-specific hours for {:?}; requested date {} is a {:?}", weekday, date, target);
                    }
                }
                found
            }
            None if value.is_array() => Some(parse_hour_list(value)),
            None => {
                warn!("Unexpected date-specific availability shape for {}: {}", date, value);
                None
            }
        },
    };

    if let Some(hours) = override_hours {
        template.set_day(target, DayAvailability { source: DaySource::DateSpecific, hours });
    }

    template
}

/// Weekday entries of an object keyed by weekday, or of an array of hour lists
/// indexed by position. `None` when `value` is neither, e.g. a bare hour list.
fn weekday_entries(value: &Value) -> Option<Vec<(Weekday, Vec<OpenHour>)>> {
    match value {
        Value::Object(map) => Some(keyed_entries(map)),
        Value::Array(items) if is_weekday_indexed(items) => Some(positional_entries(items)),
        _ => None,
    }
}

fn keyed_entries(map: &Map<String, Value>) -> Vec<(Weekday, Vec<OpenHour>)> {
    let mut entries = Vec::new();
    for (key, hours) in map {
        match parse_weekday_key(key) {
            Some(weekday) => entries.push((weekday, parse_hour_list(hours))),
            None => warn!("Dropping availability entry with unknown weekday key '{}'", key),
        }
    }
    entries
}

/// Null positions are left unconfigured; positions past Saturday are dropped.
fn positional_entries(items: &[Value]) -> Vec<(Weekday, Vec<OpenHour>)> {
    if items.len() > 7 {
        warn!("Dropping {} availability entries past Saturday", items.len() - 7);
    }
    items
        .iter()
        .take(7)
        .enumerate()
        .filter(|&(_, hours)| !hours.is_null())
        .filter_map(|(idx, hours)| Some((weekday_from_index(idx as u32)?, parse_hour_list(hours))))
        .collect()
}

/// An array is weekday-indexed when it holds hour lists rather than hours.
fn is_weekday_indexed(items: &[Value]) -> bool {
    items.iter().any(Value::is_array) && items.iter().all(|item| item.is_array() || item.is_null())
}

fn parse_hour_list(value: &Value) -> Vec<OpenHour> {
    match value {
        Value::Array(items) => items
            .iter()
            .filter_map(|item| {
                let parsed = parse_open_hour(item);
                if parsed.is_none() {
                    debug!("Dropping non-numeric hour entry {}", item);
                }
                parsed
            })
            .collect(),
        Value::Null => Vec::new(),
        single => parse_open_hour(single).into_iter().collect(),
    }
}

fn parse_open_hour(value: &Value) -> Option<OpenHour> {
    match value {
        Value::Object(obj) => {
            let start = ["start", "inicio", "horaInicio", "hora_inicio", "hour", "hora"]
                .iter()
                .find_map(|k| obj.get(*k))
                .and_then(parse_hour)?;
            let end = ["end", "fin", "horaFin", "hora_fin"]
                .iter()
                .find_map(|k| obj.get(*k))
                .map(parse_end_hour)
                .unwrap_or(Some(start + 1))?;
            open_hour(start, end)
        }
        Value::String(s) if s.contains('-') => {
            let (start, end) = s.split_once('-')?;
            open_hour(parse_clock(start.trim(), false)?, parse_clock(end.trim(), true)?)
        }
        other => parse_hour(other).map(OpenHour::single),
    }
}

fn open_hour(hour: u8, end_hour: u8) -> Option<OpenHour> {
    (end_hour > hour).then_some(OpenHour { hour, end_hour })
}

/// Coerces `9`, `"9"`, `"09"`, `"09:00"` or `"09:00:00"` to an hour in 0..=23.
pub(crate) fn parse_hour(value: &Value) -> Option<u8> {
    match value {
        Value::Number(n) => n.as_u64().filter(|h| *h <= 23).map(|h| h as u8),
        Value::String(s) => parse_clock(s.trim(), false),
        _ => None,
    }
}

fn parse_end_hour(value: &Value) -> Option<u8> {
    match value {
        Value::Number(n) => n.as_u64().filter(|h| *h <= 24).map(|h| h as u8),
        Value::String(s) => parse_clock(s.trim(), true),
        _ => None,
    }
}

fn parse_clock(s: &str, allow_midnight_end: bool) -> Option<u8> {
    let mut parts = s.split(':');
    let hour: u8 = parts.next()?.trim().parse().ok()?;
    for rest in parts {
        if rest.trim().parse::<u8>().ok()? != 0 {
            return None;
        }
    }
    let max = if allow_midnight_end { 24 } else { 23 };
    (hour <= max).then_some(hour)
}

/// Weekday from `0..=6` (0 = Sunday) or an English/Spanish day name.
pub(crate) fn parse_weekday_key(key: &str) -> Option<Weekday> {
    let key = key.trim();
    if let Ok(idx) = key.parse::<u32>() {
        return weekday_from_index(idx);
    }
    match key.to_lowercase().as_str() {
        "sunday" | "sun" | "domingo" => Some(Weekday::Sun),
        "monday" | "mon" | "lunes" => Some(Weekday::Mon),
        "tuesday" | "tue" | "martes" => Some(Weekday::Tue),
        "wednesday" | "wed" | "miercoles" | "miércoles" => Some(Weekday::Wed),
        "thursday" | "thu" | "jueves" => Some(Weekday::Thu),
        "friday" | "fri" | "viernes" => Some(Weekday::Fri),
        "saturday" | "sat" | "sabado" | "sábado" => Some(Weekday::Sat),
        _ => None,
    }
}

pub(crate) fn parse_weekday_value(value: &Value) -> Option<Weekday> {
    match value {
        Value::Number(n) => n.as_u64().and_then(|idx| weekday_from_index(idx as u32)),
        Value::String(s) => parse_weekday_key(s),
        _ => None,
    }
}
