use std::collections::BTreeSet;

use chrono::{Datelike, NaiveDate};
use serde_json::Value;
use tracing::{debug, warn};

use crate::domain::models::availability::AvailabilityTemplate;
use crate::domain::models::blocked_slot::{BlockScope, BlockedSlot, RawBlockedSlot};
use crate::domain::models::time_slot::TimeSlot;
use crate::domain::services::availability::{parse_hour, parse_weekday_value};

/// Produces the bookable one-hour slots for `date`, ascending by hour.
pub fn filter_blocked(template: &AvailabilityTemplate, blocked: &[BlockedSlot], date: NaiveDate) -> Vec<TimeSlot> {
    let excluded = excluded_hours(blocked, date);

    let open: BTreeSet<u8> = template
        .open_hours(date.weekday())
        .iter()
        .filter(|entry| {
            let single = entry.span_hours() == 1;
            if !single {
                debug!("Dropping {}:00-{}:00 on {}: slots are one hour long", entry.hour, entry.end_hour, date);
            }
            single
        })
        .map(|entry| entry.hour)
        .collect();

    open.difference(&excluded).filter_map(|hour| TimeSlot::new(*hour)).collect()
}

/// Hours blocked on `date`, recurring and one-off blocks merged as a set.
pub fn excluded_hours(blocked: &[BlockedSlot], date: NaiveDate) -> BTreeSet<u8> {
    blocked
        .iter()
        .filter(|block| block.blocks(date, block.hour))
        .map(|block| block.hour)
        .collect()
}

/// Converts wire records into typed blocks. Records whose hour is unusable, or
/// whose recurring/one-off flag points at a missing `day`/`date`, are dropped.
pub fn normalize_blocked(raw: &[RawBlockedSlot]) -> Vec<BlockedSlot> {
    raw.iter()
        .filter_map(|record| {
            let normalized = normalize_record(record);
            if normalized.is_none() {
                warn!("Dropping invalid blocked slot record: {:?}", record);
            }
            normalized
        })
        .collect()
}

fn normalize_record(record: &RawBlockedSlot) -> Option<BlockedSlot> {
    let hour = parse_hour(&record.hour)?;
    let scope = if coerce_bool(&record.is_recurring)? {
        BlockScope::Weekly(parse_weekday_value(&record.day)?)
    } else {
        BlockScope::Date(parse_block_date(&record.date)?)
    };
    Some(BlockedSlot { hour, scope })
}

/// `YYYY-MM-DD`, or a timestamp starting with one. Other shapes are rejected.
fn parse_block_date(value: &Value) -> Option<NaiveDate> {
    let raw = value.as_str()?.trim();
    let date = raw.get(..10).unwrap_or(raw);
    NaiveDate::parse_from_str(date, "%Y-%m-%d").ok()
}

fn coerce_bool(value: &Value) -> Option<bool> {
    match value {
        Value::Bool(b) => Some(*b),
        Value::Null => Some(false),
        Value::Number(n) => n.as_u64().map(|v| v != 0),
        Value::String(s) => match s.trim().to_lowercase().as_str() {
            "true" | "1" | "si" | "sí" => Some(true),
            "false" | "0" | "no" | "" => Some(false),
            _ => None,
        },
        _ => None,
    }
}
