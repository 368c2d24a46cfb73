use crate::domain::models::booking::BookingRequest;
use icalendar::{Calendar, Component, Event as IcalEvent, EventLike};

/// Generates an iCalendar (.ics) string for a submitted booking request.
/// Times are floating local times on the requested date.
pub fn generate_ics(request: &BookingRequest, venue_name: &str) -> String {
    let mut calendar = Calendar::new();

    let (starts, ends) = request.range().on_date(request.date());

    let ical_event = IcalEvent::new()
        .summary(request.title())
        .description(request.description())
        .location(venue_name)
        .starts(starts)
        .ends(ends)
        .uid(&request.request_id().to_string())
        .done();

    calendar.push(ical_event);
    calendar.to_string()
}
