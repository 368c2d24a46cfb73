//! The booking form session: the single owner of the slot list, the
//! selection and the form fields while a booking surface is open.
//!
//! Loads and submissions are tagged with the session generation at the time
//! they were issued. Changing the date bumps the generation, so results that
//! arrive for an earlier date are discarded instead of overwriting newer state.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use chrono::{Local, NaiveDate};
use tokio::time::timeout;
use tracing::{debug, info, info_span, warn, Instrument};

use crate::domain::models::availability::AvailabilityTemplate;
use crate::domain::models::blocked_slot::BlockedSlot;
use crate::domain::models::booking::{
    BookingForm, CapacityWarning, ConfirmationSummary, SubmitReceipt, VenueRef,
};
use crate::domain::models::time_slot::TimeSlot;
use crate::domain::services::availability::resolve;
use crate::domain::services::block_filter::{filter_blocked, normalize_blocked};
use crate::domain::services::composer::{self, BookingComposer, BookingContext, PreparedSubmission};
use crate::domain::services::selection::{SlotSelection, ToggleOutcome};
use crate::error::{AppError, BookingError, SelectionViolation, SubmissionFailure, ValidationFailure};
use crate::state::AppState;

/// Identifies one availability load.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LoadTicket {
    pub generation: u64,
    pub date: NaiveDate,
}

#[derive(Debug, Clone)]
pub struct LoadedDay {
    pub template: AvailabilityTemplate,
    pub blocked: Vec<BlockedSlot>,
    pub slots: Vec<TimeSlot>,
    pub capacity: Option<u32>,
}

/// Result of `fetch_day`, still tagged with the ticket it was issued for.
#[derive(Debug, Clone)]
pub struct DayLoad {
    pub ticket: LoadTicket,
    pub result: Result<LoadedDay, AppError>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadOutcome {
    Applied { slot_count: usize },
    Degraded,
    Stale,
    Closed,
}

/// Non-fatal messages for the booking surface.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Notice {
    AvailabilityUnavailable { date: NaiveDate, reason: String },
    NoAvailability { date: NaiveDate },
    SelectionRejected(SelectionViolation),
    CapacityExceeded(CapacityWarning),
}

impl Notice {
    pub fn message(&self) -> String {
        match self {
            Notice::AvailabilityUnavailable { date, .. } => {
                format!("Could not load availability for {}. Select the date again to retry.", date)
            }
            Notice::NoAvailability { date } => format!("No availability on {}.", date),
            Notice::SelectionRejected(violation) => violation.user_message().to_string(),
            Notice::CapacityExceeded(warning) => warning.message(),
        }
    }

    pub fn is_retryable(&self) -> bool {
        matches!(self, Notice::AvailabilityUnavailable { .. })
    }
}

/// A validated request waiting to be sent, tagged like a load.
#[derive(Debug, Clone)]
pub struct PendingSubmission {
    pub generation: u64,
    pub prepared: PreparedSubmission,
}

#[derive(Debug, Clone)]
pub struct SubmissionResult {
    pub generation: u64,
    pub result: Result<SubmitReceipt, SubmissionFailure>,
}

pub fn local_today() -> NaiveDate {
    Local::now().date_naive()
}

async fn bounded<T>(limit: Duration, fut: impl Future<Output = Result<T, AppError>>) -> Result<T, AppError> {
    timeout(limit, fut).await.map_err(|_| AppError::Timeout(limit.as_secs()))?
}

/// Fetches availability, blocked hours and capacity for the ticket's date.
///
/// Does not touch the session, so callers may run it concurrently with user
/// input and hand the result to `BookingFormSession::apply_load` later.
pub async fn fetch_day(state: &AppState, venue: &VenueRef, ticket: LoadTicket) -> DayLoad {
    let span = info_span!("fetch_day", manager_id = %venue.manager_id, date = %ticket.date, generation = ticket.generation);
    let limit = state.config.request_timeout();
    let directory = state.venue_directory.as_ref();

    async move {
        let (availability, blocked, capacity) = tokio::join!(
            bounded(limit, resolve(directory, &venue.manager_id, ticket.date)),
            bounded(limit, directory.get_blocked_slots(&venue.manager_id, ticket.date)),
            bounded(limit, directory.get_venue_capacity(capacity_key(venue))),
        );

        let capacity = capacity.unwrap_or_else(|e| {
            warn!("Venue capacity unavailable, using default: {}", e);
            None
        });

        let result = match (availability, blocked) {
            (Ok(template), Ok(raw_blocked)) => {
                let blocked = normalize_blocked(&raw_blocked);
                let slots = filter_blocked(&template, &blocked, ticket.date);
                debug!("{} bookable slots after {} blocks", slots.len(), blocked.len());
                Ok(LoadedDay { template, blocked, slots, capacity })
            }
            (Err(e), _) | (_, Err(e)) => {
                warn!("Availability load failed: {}", e);
                Err(e)
            }
        };

        DayLoad { ticket, result }
    }
    .instrument(span)
    .await
}

fn capacity_key(venue: &VenueRef) -> &str {
    if venue.venue_id.trim().is_empty() { &venue.manager_id } else { &venue.venue_id }
}

pub async fn send_submission(composer: &BookingComposer, pending: PendingSubmission) -> SubmissionResult {
    SubmissionResult {
        generation: pending.generation,
        result: composer.send(pending.prepared).await,
    }
}

pub struct BookingFormSession {
    state: Arc<AppState>,
    composer: BookingComposer,
    venue: VenueRef,
    requester_id: String,
    date: NaiveDate,
    generation: u64,
    loading: bool,
    slots: Vec<TimeSlot>,
    slots_date: Option<NaiveDate>,
    capacity: Option<u32>,
    selection: SlotSelection,
    form: BookingForm,
    notices: Vec<Notice>,
    open: bool,
}

impl BookingFormSession {
    /// Creates an open session with an empty selection and no slots loaded yet.
    pub fn new(state: Arc<AppState>, venue: VenueRef, requester_id: impl Into<String>, date: NaiveDate) -> Self {
        let composer = BookingComposer::new(
            state.booking_service.clone(),
            state.config.default_venue_capacity,
            state.config.request_timeout(),
        );
        Self {
            state,
            composer,
            venue,
            requester_id: requester_id.into(),
            date,
            generation: 0,
            loading: false,
            slots: Vec::new(),
            slots_date: None,
            capacity: None,
            selection: SlotSelection::new(),
            form: BookingForm::default(),
            notices: Vec::new(),
            open: true,
        }
    }

    /// Opens the form for `venue` and loads availability for `today`.
    pub async fn open_booking_form(
        state: Arc<AppState>,
        venue: VenueRef,
        requester_id: impl Into<String>,
        today: NaiveDate,
    ) -> Self {
        let mut session = Self::new(state, venue, requester_id, today);
        info!("Booking form opened for venue {} ({})", session.venue.venue_name, session.venue.venue_id);
        session.on_date_changed(today).await;
        session
    }

    pub async fn on_date_changed(&mut self, date: NaiveDate) -> LoadOutcome {
        if !self.open {
            debug!("Ignoring date change to {}: form closed", date);
            return LoadOutcome::Closed;
        }
        let ticket = self.begin_load(date);
        let load = fetch_day(&self.state, &self.venue, ticket).await;
        self.apply_load(load)
    }

    /// Switches to `date`, clears the selection and invalidates every
    /// outstanding load and submission.
    pub fn begin_load(&mut self, date: NaiveDate) -> LoadTicket {
        self.generation += 1;
        self.date = date;
        self.loading = true;
        self.selection.clear();
        if self.slots_date != Some(date) {
            self.slots.clear();
            self.slots_date = None;
        }
        debug!("Loading availability for {} (generation {})", date, self.generation);
        LoadTicket { generation: self.generation, date }
    }

    pub fn apply_load(&mut self, load: DayLoad) -> LoadOutcome {
        if !self.open {
            debug!("Ignoring availability for {}: form closed", load.ticket.date);
            return LoadOutcome::Closed;
        }
        if load.ticket.generation != self.generation || load.ticket.date != self.date {
            debug!(
                "Discarding stale availability for {} (generation {}, current {})",
                load.ticket.date, load.ticket.generation, self.generation
            );
            return LoadOutcome::Stale;
        }

        self.loading = false;
        match load.result {
            Ok(day) => {
                self.slots = day.slots;
                self.slots_date = Some(load.ticket.date);
                self.capacity = day.capacity;
                if self.slots.is_empty() {
                    self.notices.push(Notice::NoAvailability { date: load.ticket.date });
                }
                info!("Availability for {}: {} slots", load.ticket.date, self.slots.len());
                LoadOutcome::Applied { slot_count: self.slots.len() }
            }
            Err(e) => {
                if self.slots_date != Some(load.ticket.date) {
                    self.slots.clear();
                }
                warn!("Availability for {} degraded, keeping {} slots: {}", load.ticket.date, self.slots.len(), e);
                self.notices.push(Notice::AvailabilityUnavailable {
                    date: load.ticket.date,
                    reason: e.to_string(),
                });
                LoadOutcome::Degraded
            }
        }
    }

    /// Adds or removes `slot` while keeping the selection contiguous.
    pub fn on_slot_tapped(&mut self, slot: &TimeSlot) -> Result<ToggleOutcome, SelectionViolation> {
        let result = if self.slots.iter().any(|s| s == slot) {
            self.selection.toggle(slot.clone())
        } else {
            Err(SelectionViolation::Unavailable { hour: slot.hour() })
        };
        if let Err(violation) = result {
            debug!("Slot tap rejected: {}", violation);
            self.notices.push(Notice::SelectionRejected(violation));
        }
        result
    }

    pub fn confirmation_summary(&self) -> Result<ConfirmationSummary, ValidationFailure> {
        composer::confirmation_summary(
            self.context(),
            &self.form,
            &self.selection,
            self.capacity,
            self.composer.default_capacity(),
        )
    }

    pub async fn on_submit(&mut self) -> Result<SubmitReceipt, BookingError> {
        let pending = self.prepare_submission()?;
        let result = send_submission(&self.composer, pending).await;
        self.apply_submission(result)
    }

    /// Validates the form and builds a fresh request. Nothing is sent yet.
    pub fn prepare_submission(&mut self) -> Result<PendingSubmission, BookingError> {
        if !self.open {
            return Err(BookingError::SessionClosed);
        }
        let prepared = self.composer.prepare(self.context(), &self.form, &self.selection, self.capacity)?;
        if let Some(warning) = prepared.capacity_warning {
            self.notices.push(Notice::CapacityExceeded(warning));
        }
        Ok(PendingSubmission { generation: self.generation, prepared })
    }

    /// On success the form is reset and the session closes. On failure
    /// nothing changes, so the user can correct and resend.
    pub fn apply_submission(&mut self, submission: SubmissionResult) -> Result<SubmitReceipt, BookingError> {
        if !self.open {
            return Err(BookingError::SessionClosed);
        }
        if submission.generation != self.generation {
            warn!(
                "Submission result for generation {} arrived after a date change (now {})",
                submission.generation, self.generation
            );
            return Err(BookingError::Superseded);
        }

        let receipt = submission.result?;
        info!("Booking request {} sent; closing form", receipt.request.request_id());
        self.form.clear();
        self.selection.clear();
        self.open = false;
        Ok(receipt)
    }

    pub fn close(&mut self) {
        if self.open {
            info!("Booking form closed for venue {}", self.venue.venue_id);
        }
        self.open = false;
        self.loading = false;
    }

    fn context(&self) -> BookingContext<'_> {
        BookingContext { venue: &self.venue, requester_id: &self.requester_id, date: self.date }
    }

    pub fn composer(&self) -> &BookingComposer {
        &self.composer
    }

    pub fn state(&self) -> &Arc<AppState> {
        &self.state
    }

    pub fn venue(&self) -> &VenueRef {
        &self.venue
    }

    pub fn date(&self) -> NaiveDate {
        self.date
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn is_open(&self) -> bool {
        self.open
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }

    pub fn slots(&self) -> &[TimeSlot] {
        &self.slots
    }

    pub fn selection(&self) -> &SlotSelection {
        &self.selection
    }

    pub fn capacity(&self) -> Option<u32> {
        self.capacity
    }

    pub fn effective_capacity(&self) -> u32 {
        self.capacity.unwrap_or(self.composer.default_capacity())
    }

    pub fn form(&self) -> &BookingForm {
        &self.form
    }

    pub fn form_mut(&mut self) -> &mut BookingForm {
        &mut self.form
    }

    pub fn notices(&self) -> &[Notice] {
        &self.notices
    }

    pub fn take_notices(&mut self) -> Vec<Notice> {
        std::mem::take(&mut self.notices)
    }
}
