//! Calendar feed handling: ICS unfolding, VEVENT parsing and agenda selection.
//!
//! Feeds arrive as raw text (one blob per configured calendar URL). Nothing in
//! here fails: unknown lines and malformed dates are skipped so that one bad
//! event never hides the rest of a feed.

pub mod agenda;
pub mod parse;
pub mod unfold;

use chrono::{DateTime, FixedOffset};

pub use agenda::{AgendaItem, select_agenda, with_placeholder};
pub use parse::parse_feed;

/// One event extracted from a `BEGIN:VEVENT ... END:VEVENT` block.
///
/// `start` is always present; blocks without a usable `DTSTART` are dropped
/// by the parser.
#[derive(Debug, Clone, PartialEq)]
pub struct CalendarEvent {
    pub summary: String,
    pub start: DateTime<FixedOffset>,
    pub end: Option<DateTime<FixedOffset>>,
    pub all_day: bool,
}
