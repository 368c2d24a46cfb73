pub mod http_venue_directory;
