pub mod availability;
pub mod block_filter;
pub mod calendar;
pub mod composer;
pub mod selection;
