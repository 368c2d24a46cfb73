use std::sync::Arc;
use std::time::Duration;

use chrono::NaiveDate;
use tokio::time::timeout;
use tracing::{error, info, warn};

use crate::domain::models::booking::{
    BookingForm, BookingRequest, CapacityWarning, ConfirmationSummary, NewBookingRequestParams,
    SubmissionRejection, SubmitReceipt, VenueRef,
};
use crate::domain::ports::BookingSubmission;
use crate::domain::services::selection::SlotSelection;
use crate::error::{BookingError, FormField, SubmissionFailure, ValidationFailure};

/// Who is booking what, and for which day.
#[derive(Debug, Clone, Copy)]
pub struct BookingContext<'a> {
    pub venue: &'a VenueRef,
    pub requester_id: &'a str,
    pub date: NaiveDate,
}

/// A request that passed local validation and is ready to be sent.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PreparedSubmission {
    pub request: BookingRequest,
    pub capacity_warning: Option<CapacityWarning>,
}

pub fn validate(form: &BookingForm, selection: &SlotSelection) -> Result<(), ValidationFailure> {
    let mut missing = Vec::new();
    if form.title.trim().is_empty() {
        missing.push(FormField::Title);
    }
    if form.description.trim().is_empty() {
        missing.push(FormField::Description);
    }
    if form.event_type.trim().is_empty() {
        missing.push(FormField::EventType);
    }
    if !matches!(form.expected_attendees, Some(n) if n > 0) {
        missing.push(FormField::ExpectedAttendees);
    }
    if selection.is_empty() {
        missing.push(FormField::TimeSlots);
    }

    if missing.is_empty() { Ok(()) } else { Err(ValidationFailure { missing }) }
}

/// Advisory only: a warning never blocks the request.
pub fn capacity_warning(expected_attendees: u32, capacity: Option<u32>, default_capacity: u32) -> Option<CapacityWarning> {
    let capacity = capacity.unwrap_or(default_capacity);
    (expected_attendees > capacity).then_some(CapacityWarning { expected_attendees, capacity })
}

pub fn confirmation_summary(
    ctx: BookingContext<'_>,
    form: &BookingForm,
    selection: &SlotSelection,
    capacity: Option<u32>,
    default_capacity: u32,
) -> Result<ConfirmationSummary, ValidationFailure> {
    validate(form, selection)?;
    let range = selection
        .time_range()
        .ok_or(ValidationFailure { missing: vec![FormField::TimeSlots] })?;
    let expected_attendees = form.expected_attendees.unwrap_or_default();

    Ok(ConfirmationSummary {
        venue_name: ctx.venue.venue_name.clone(),
        date: ctx.date,
        range,
        duration_hours: selection.total_duration_hours(),
        expected_attendees,
        capacity: capacity.unwrap_or(default_capacity),
        capacity_warning: capacity_warning(expected_attendees, capacity, default_capacity),
    })
}

/// Builds a fresh request from the current form values. Every call yields a new
/// request id, so a retry never reuses a previously built request.
pub fn compose(
    ctx: BookingContext<'_>,
    form: &BookingForm,
    selection: &SlotSelection,
) -> Result<BookingRequest, ValidationFailure> {
    validate(form, selection)?;
    let range = selection
        .time_range()
        .ok_or(ValidationFailure { missing: vec![FormField::TimeSlots] })?;

    Ok(BookingRequest::new(NewBookingRequestParams {
        venue_id: ctx.venue.venue_id.clone(),
        manager_id: ctx.venue.manager_id.clone(),
        requester_id: ctx.requester_id.to_string(),
        title: form.title.trim().to_string(),
        description: form.description.trim().to_string(),
        date: ctx.date,
        range,
        expected_attendees: form.expected_attendees.unwrap_or_default(),
        event_type: form.event_type.trim().to_string(),
        category: non_blank(form.category.as_deref()),
        requirements: non_blank(form.requirements.as_deref()),
    }))
}

fn non_blank(value: Option<&str>) -> Option<String> {
    value.map(str::trim).filter(|v| !v.is_empty()).map(str::to_string)
}

/// Maps a raw rejection onto the user-facing failure classes.
pub fn classify(rejection: &SubmissionRejection) -> SubmissionFailure {
    let message = rejection.server_message.clone().unwrap_or_default();
    match rejection.http_status {
        Some(status @ (401 | 403)) => SubmissionFailure::Unauthorized { status },
        Some(500) => {
            let lowered = message.to_lowercase();
            if is_foreign_key_problem(&lowered) {
                SubmissionFailure::ForeignKey { message }
            } else if is_missing_field_problem(&lowered) {
                SubmissionFailure::MissingRequiredField { message }
            } else {
                SubmissionFailure::Server { message }
            }
        }
        status => SubmissionFailure::Connectivity { status },
    }
}

fn is_foreign_key_problem(message: &str) -> bool {
    ["foreign key", "foreign_key", "llave foránea", "clave foránea", "23503", "violates foreign"]
        .iter()
        .any(|pattern| message.contains(pattern))
}

fn is_missing_field_problem(message: &str) -> bool {
    ["null value", "not-null", "not null", "23502", "is required", "obligatorio"]
        .iter()
        .any(|pattern| message.contains(pattern))
}

/// Validates, composes and sends booking requests through the submission port.
#[derive(Clone)]
pub struct BookingComposer {
    submitter: Arc<dyn BookingSubmission>,
    default_capacity: u32,
    request_timeout: Duration,
}

impl BookingComposer {
    pub fn new(submitter: Arc<dyn BookingSubmission>, default_capacity: u32, request_timeout: Duration) -> Self {
        Self { submitter, default_capacity, request_timeout }
    }

    pub fn default_capacity(&self) -> u32 {
        self.default_capacity
    }

    pub fn prepare(
        &self,
        ctx: BookingContext<'_>,
        form: &BookingForm,
        selection: &SlotSelection,
        capacity: Option<u32>,
    ) -> Result<PreparedSubmission, ValidationFailure> {
        let request = compose(ctx, form, selection)?;
        let capacity_warning = capacity_warning(request.expected_attendees(), capacity, self.default_capacity);
        if let Some(w) = &capacity_warning {
            warn!(
                "Request {} expects {} attendees over capacity {}",
                request.request_id(),
                w.expected_attendees,
                w.capacity
            );
        }
        Ok(PreparedSubmission { request, capacity_warning })
    }

    pub async fn send(&self, prepared: PreparedSubmission) -> Result<SubmitReceipt, SubmissionFailure> {
        let request_id = prepared.request.request_id();
        info!(
            "Submitting booking request {} for venue {} on {} ({}-{})",
            request_id,
            prepared.request.venue_id(),
            prepared.request.date(),
            prepared.request.start_time(),
            prepared.request.end_time()
        );

        let outcome = match timeout(self.request_timeout, self.submitter.submit_booking_request(&prepared.request)).await {
            Ok(result) => result,
            Err(_) => Err(SubmissionRejection::unreachable(format!(
                "no response within {} seconds",
                self.request_timeout.as_secs()
            ))),
        };

        match outcome {
            Ok(()) => {
                info!("Booking request {} accepted", request_id);
                Ok(SubmitReceipt { request: prepared.request, capacity_warning: prepared.capacity_warning })
            }
            Err(rejection) => {
                let failure = classify(&rejection);
                error!("Booking request {} rejected: {:?} -> {}", request_id, rejection, failure);
                Err(failure)
            }
        }
    }

    pub async fn submit(
        &self,
        ctx: BookingContext<'_>,
        form: &BookingForm,
        selection: &SlotSelection,
        capacity: Option<u32>,
    ) -> Result<SubmitReceipt, BookingError> {
        let prepared = self.prepare(ctx, form, selection, capacity)?;
        Ok(self.send(prepared).await?)
    }
}
