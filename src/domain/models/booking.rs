use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::models::time_slot::TimeRange;

/// The venue a booking form was opened for.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VenueRef {
    pub venue_id: String,
    pub venue_name: String,
    pub manager_id: String,
}

/// Editable fields of the booking form.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BookingForm {
    pub title: String,
    pub description: String,
    pub event_type: String,
    pub category: Option<String>,
    pub expected_attendees: Option<u32>,
    pub requirements: Option<String>,
}

impl BookingForm {
    pub fn clear(&mut self) {
        *self = Self::default();
    }
}

/// Request sent to the Booking Submission service.
///
/// Field names on the wire are kept as the service expects them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BookingRequest {
    #[serde(skip)]
    request_id: Uuid,
    #[serde(rename = "espacioId")]
    venue_id: String,
    #[serde(rename = "gestorId")]
    manager_id: String,
    #[serde(rename = "artistaId")]
    requester_id: String,
    #[serde(rename = "titulo")]
    title: String,
    #[serde(rename = "descripcion")]
    description: String,
    #[serde(rename = "fecha")]
    date: NaiveDate,
    #[serde(skip)]
    range: TimeRange,
    #[serde(rename = "horaInicio")]
    start_time: String,
    #[serde(rename = "horaFin")]
    end_time: String,
    #[serde(rename = "duracionHoras")]
    duration_hours: u32,
    #[serde(rename = "asistentesEsperados")]
    expected_attendees: u32,
    #[serde(rename = "tipoEvento")]
    event_type: String,
    #[serde(rename = "categoria")]
    category: Option<String>,
    #[serde(rename = "requerimientos")]
    requirements: Option<String>,
}

pub struct NewBookingRequestParams {
    pub venue_id: String,
    pub manager_id: String,
    pub requester_id: String,
    pub title: String,
    pub description: String,
    pub date: NaiveDate,
    pub range: TimeRange,
    pub expected_attendees: u32,
    pub event_type: String,
    pub category: Option<String>,
    pub requirements: Option<String>,
}

impl BookingRequest {
    pub fn new(params: NewBookingRequestParams) -> Self {
        Self {
            request_id: Uuid::new_v4(),
            venue_id: params.venue_id,
            manager_id: params.manager_id,
            requester_id: params.requester_id,
            title: params.title,
            description: params.description,
            date: params.date,
            range: params.range,
            start_time: params.range.start(),
            end_time: params.range.end(),
            duration_hours: params.range.duration_hours(),
            expected_attendees: params.expected_attendees,
            event_type: params.event_type,
            category: params.category,
            requirements: params.requirements,
        }
    }

    pub fn request_id(&self) -> Uuid {
        self.request_id
    }

    pub fn venue_id(&self) -> &str {
        &self.venue_id
    }

    pub fn manager_id(&self) -> &str {
        &self.manager_id
    }

    pub fn requester_id(&self) -> &str {
        &self.requester_id
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn date(&self) -> NaiveDate {
        self.date
    }

    pub fn range(&self) -> TimeRange {
        self.range
    }

    pub fn start_time(&self) -> &str {
        &self.start_time
    }

    pub fn end_time(&self) -> &str {
        &self.end_time
    }

    pub fn duration_hours(&self) -> u32 {
        self.duration_hours
    }

    pub fn expected_attendees(&self) -> u32 {
        self.expected_attendees
    }

    pub fn event_type(&self) -> &str {
        &self.event_type
    }
}

/// Raw failure reported by the Booking Submission service.
/// `http_status` is `None` when no response arrived at all.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubmissionRejection {
    pub http_status: Option<u16>,
    pub server_message: Option<String>,
}

impl SubmissionRejection {
    pub fn status(status: u16, server_message: Option<String>) -> Self {
        Self { http_status: Some(status), server_message }
    }

    pub fn unreachable(reason: impl Into<String>) -> Self {
        Self { http_status: None, server_message: Some(reason.into()) }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CapacityWarning {
    pub expected_attendees: u32,
    pub capacity: u32,
}

impl CapacityWarning {
    pub fn message(&self) -> String {
        format!(
            "You expect {} attendees but the venue holds {}. You can still send the request.",
            self.expected_attendees, self.capacity
        )
    }
}

/// Preview shown in the confirmation step before sending.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfirmationSummary {
    pub venue_name: String,
    pub date: NaiveDate,
    pub range: TimeRange,
    pub duration_hours: u32,
    pub expected_attendees: u32,
    pub capacity: u32,
    pub capacity_warning: Option<CapacityWarning>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubmitReceipt {
    pub request: BookingRequest,
    pub capacity_warning: Option<CapacityWarning>,
}
