//! API endpoint groups of the Meeting BaaS client.

pub mod bots;
pub mod calendars;
pub mod events;

pub use bots::*;
pub use calendars::*;
pub use events::*;
