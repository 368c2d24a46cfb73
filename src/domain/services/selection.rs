use std::collections::VecDeque;

use crate::domain::models::time_slot::{TimeRange, TimeSlot};
use crate::error::SelectionViolation;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToggleOutcome {
    Started,
    Prepended,
    Appended,
    RemovedFirst,
    RemovedLast,
    Cleared,
}

/// A single contiguous run of hourly slots, ascending by hour.
///
/// The run only grows or shrinks at its ends, so any two neighbours always
/// differ by exactly one hour.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SlotSelection {
    slots: VecDeque<TimeSlot>,
}

impl SlotSelection {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn toggle(&mut self, slot: TimeSlot) -> Result<ToggleOutcome, SelectionViolation> {
        let (min, max) = match (self.slots.front(), self.slots.back()) {
            (Some(first), Some(last)) => (first.hour(), last.hour()),
            _ => {
                self.slots.push_back(slot);
                return Ok(ToggleOutcome::Started);
            }
        };
        let hour = slot.hour();

        if min > 0 && hour == min - 1 {
            self.slots.push_front(slot);
            return Ok(ToggleOutcome::Prepended);
        }
        if hour == max + 1 {
            self.slots.push_back(slot);
            return Ok(ToggleOutcome::Appended);
        }
        if min == max && hour == min {
            self.slots.clear();
            return Ok(ToggleOutcome::Cleared);
        }
        if hour == min {
            self.slots.pop_front();
            return Ok(ToggleOutcome::RemovedFirst);
        }
        if hour == max {
            self.slots.pop_back();
            return Ok(ToggleOutcome::RemovedLast);
        }
        if hour > min && hour < max {
            return Err(SelectionViolation::InteriorRemoval { hour });
        }
        Err(SelectionViolation::NotContiguous { hour })
    }

    pub fn clear(&mut self) {
        self.slots.clear();
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn slots(&self) -> impl Iterator<Item = &TimeSlot> {
        self.slots.iter()
    }

    pub fn hours(&self) -> Vec<u8> {
        self.slots.iter().map(TimeSlot::hour).collect()
    }

    /// 0 when nothing is selected.
    pub fn total_duration_hours(&self) -> u32 {
        self.time_range().map(|r| r.duration_hours()).unwrap_or(0)
    }

    pub fn time_range(&self) -> Option<TimeRange> {
        let first = self.slots.front()?;
        let last = self.slots.back()?;
        Some(TimeRange { start_hour: first.hour(), end_hour: last.end_hour() })
    }
}
