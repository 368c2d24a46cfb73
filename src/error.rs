use std::fmt;
use thiserror::Error;

/// Failures raised by the collaborator adapters (transport and decoding).
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AppError {
    #[error("Network error: {0}")]
    Network(String),
    #[error("Request timed out after {0} seconds")]
    Timeout(u64),
    #[error("Malformed response: {0}")]
    Parse(String),
    #[error("Upstream returned status {status}: {body}")]
    UpstreamStatus { status: u16, body: String },
    #[error("Configuration error: {0}")]
    Config(String),
}

/// A tap that would break the single contiguous run of selected slots.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum SelectionViolation {
    #[error("Hour {hour} is inside the selected range; only the first or last slot can be removed")]
    InteriorRemoval { hour: u8 },
    #[error("Hour {hour} is not adjacent to the selected range; only contiguous slots can be added")]
    NotContiguous { hour: u8 },
    #[error("Hour {hour} is not bookable on the selected date")]
    Unavailable { hour: u8 },
}

impl SelectionViolation {
    pub fn user_message(&self) -> &'static str {
        match self {
            SelectionViolation::InteriorRemoval { .. } => {
                "You can only remove the first or last hour of your selection."
            }
            SelectionViolation::NotContiguous { .. } => {
                "Please pick hours next to your current selection so the booking stays continuous."
            }
            SelectionViolation::Unavailable { .. } => "That hour is not available for the selected date.",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FormField {
    Title,
    Description,
    EventType,
    ExpectedAttendees,
    TimeSlots,
}

impl FormField {
    pub fn label(&self) -> &'static str {
        match self {
            FormField::Title => "event title",
            FormField::Description => "description",
            FormField::EventType => "event type",
            FormField::ExpectedAttendees => "expected attendees",
            FormField::TimeSlots => "time slots",
        }
    }
}

impl fmt::Display for FormField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Required booking fields missing at submit time. Raised before any network call.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("Missing required fields: {}", .missing.iter().map(FormField::label).collect::<Vec<_>>().join(", "))]
pub struct ValidationFailure {
    pub missing: Vec<FormField>,
}

impl ValidationFailure {
    pub fn is_missing(&self, field: FormField) -> bool {
        self.missing.contains(&field)
    }

    pub fn user_message(&self) -> String {
        if self.missing == [FormField::TimeSlots] {
            return "Select at least one time slot before sending the request.".to_string();
        }
        let labels: Vec<&str> = self.missing.iter().map(FormField::label).collect();
        format!("Please complete: {}.", labels.join(", "))
    }
}

/// Classified rejection from the Booking Submission service.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SubmissionFailure {
    #[error("Not authorized to submit booking requests (status {status})")]
    Unauthorized { status: u16 },
    #[error("Server rejected a reference to a missing record: {message}")]
    ForeignKey { message: String },
    #[error("Server reported a missing required field: {message}")]
    MissingRequiredField { message: String },
    #[error("Server error: {message}")]
    Server { message: String },
    #[error("Could not reach the booking service{}", .status.map(|s| format!(" (status {})", s)).unwrap_or_default())]
    Connectivity { status: Option<u16> },
}

impl SubmissionFailure {
    pub fn user_message(&self) -> &'static str {
        match self {
            SubmissionFailure::Unauthorized { .. } => {
                "Your session is not allowed to send booking requests. Please sign in again."
            }
            SubmissionFailure::ForeignKey { .. } => {
                "The venue or your artist profile could not be found on the server. Refresh and try again."
            }
            SubmissionFailure::MissingRequiredField { .. } => {
                "The server reported a missing required field. Review the form and try again."
            }
            SubmissionFailure::Server { .. } => "The server could not process the request. Try again later.",
            SubmissionFailure::Connectivity { .. } => {
                "Could not connect to the booking service. Check your connection and try again."
            }
        }
    }
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum BookingError {
    #[error(transparent)]
    Validation(#[from] ValidationFailure),
    #[error(transparent)]
    Submission(#[from] SubmissionFailure),
    #[error("The booking form is closed")]
    SessionClosed,
    #[error("The booking form changed while the request was in flight")]
    Superseded,
}

impl BookingError {
    pub fn user_message(&self) -> String {
        match self {
            BookingError::Validation(v) => v.user_message(),
            BookingError::Submission(s) => s.user_message().to_string(),
            BookingError::SessionClosed => "The booking form was closed.".to_string(),
            BookingError::Superseded => {
                "The date changed while your request was being sent. Check your requests before sending again."
                    .to_string()
            }
        }
    }
}
