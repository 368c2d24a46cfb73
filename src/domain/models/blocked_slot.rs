use chrono::{Datelike, NaiveDate, Weekday};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BlockScope {
    Weekly(Weekday),
    Date(NaiveDate),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct BlockedSlot {
    pub hour: u8,
    pub scope: BlockScope,
}

impl BlockedSlot {
    pub fn weekly(weekday: Weekday, hour: u8) -> Self {
        Self { hour, scope: BlockScope::Weekly(weekday) }
    }

    pub fn on_date(date: NaiveDate, hour: u8) -> Self {
        Self { hour, scope: BlockScope::Date(date) }
    }

    pub fn is_recurring(&self) -> bool {
        matches!(self.scope, BlockScope::Weekly(_))
    }

    /// Whether this block removes `hour` on `date`.
    pub fn blocks(&self, date: NaiveDate, hour: u8) -> bool {
        if self.hour != hour {
            return false;
        }
        match self.scope {
            BlockScope::Weekly(weekday) => date.weekday() == weekday,
            BlockScope::Date(blocked_date) => blocked_date == date,
        }
    }
}

/// Blocked-slot record as sent by the Venue Directory.
///
/// Every field is kept as raw JSON and coerced later, so a single malformed
/// record never fails the whole list.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct RawBlockedSlot {
    pub hour: Value,
    #[serde(rename = "isRecurring")]
    pub is_recurring: Value,
    pub day: Value,
    pub date: Value,
}

impl RawBlockedSlot {
    /// Reads a record from any JSON value. The first non-null key among the
    /// accepted spellings wins; anything that is not an object yields an
    /// all-null record.
    pub fn from_json(value: &Value) -> Self {
        let field = |keys: &[&str]| {
            keys.iter()
                .filter_map(|k| value.get(*k))
                .find(|v| !v.is_null())
                .cloned()
                .unwrap_or(Value::Null)
        };
        Self {
            hour: field(&["hour", "hora"]),
            is_recurring: field(&["isRecurring", "is_recurring", "esRecurrente"]),
            day: field(&["day", "dia", "diaSemana"]),
            date: field(&["date", "fecha"]),
        }
    }
}

impl<'de> Deserialize<'de> for RawBlockedSlot {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        Value::deserialize(deserializer).map(|value| Self::from_json(&value))
    }
}
