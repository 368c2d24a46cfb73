pub mod booking;
pub mod factory;
pub mod venue_directory;
