pub mod http_booking_service;
