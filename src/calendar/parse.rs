//! VEVENT extraction from unfolded ICS lines.
//!
//! Only `SUMMARY`, `DTSTART` and `DTEND` are read. Property parameters
//! (`DTSTART;VALUE=DATE:...`, `DTSTART;TZID=...:...`) are stripped and the
//! value is taken verbatim after the first colon.

use chrono::{DateTime, Duration, FixedOffset, NaiveDate, NaiveDateTime, TimeZone, Utc};
use chrono_tz::Tz;

use super::CalendarEvent;
use super::unfold::unfold;

const DEFAULT_SUMMARY: &str = "Event";

/// Properties the parser understands. Everything else lands in `Other`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Property {
    Summary,
    DtStart,
    DtEnd,
    Other,
}

impl Property {
    fn from_name(name: &str) -> Self {
        let bare = name.split(';').next().unwrap_or_default();
        if bare.eq_ignore_ascii_case("SUMMARY") {
            Property::Summary
        } else if bare.eq_ignore_ascii_case("DTSTART") {
            Property::DtStart
        } else if bare.eq_ignore_ascii_case("DTEND") {
            Property::DtEnd
        } else {
            Property::Other
        }
    }
}

/// A parsed `DTSTART`/`DTEND` value.
#[derive(Debug, Clone, Copy, PartialEq)]
struct DateValue {
    at: DateTime<FixedOffset>,
    date_only: bool,
}

#[derive(Debug, Default)]
struct EventBuilder {
    summary: Option<String>,
    start: Option<DateValue>,
    end: Option<DateValue>,
    /// Open sub-components (`VALARM`, ...); their properties are not ours.
    depth: usize,
}

impl EventBuilder {
    fn finish(self) -> Option<CalendarEvent> {
        let start = self.start?;
        Some(CalendarEvent {
            summary: self.summary.unwrap_or_else(|| DEFAULT_SUMMARY.to_string()),
            start: start.at,
            end: self.end.map(|e| e.at),
            all_day: start.date_only,
        })
    }
}

/// Unfold and parse a whole feed.
pub fn parse_feed(text: &str, tz: Tz) -> Vec<CalendarEvent> {
    parse_events(&unfold(text), tz)
}

/// Extract events from logical lines.
///
/// Lines outside a `VEVENT` block are ignored. A block without a usable
/// `DTSTART` produces nothing. A second `BEGIN:VEVENT` before `END:VEVENT`
/// discards the unterminated block.
/// Properties of nested components such as `VALARM` are skipped.
pub fn parse_events(lines: &[String], tz: Tz) -> Vec<CalendarEvent> {
    let mut events = Vec::new();
    let mut current: Option<EventBuilder> = None;

    for line in lines {
        let line = line.as_str();
        if line.eq_ignore_ascii_case("BEGIN:VEVENT") {
            current = Some(EventBuilder::default());
            continue;
        }
        if line.eq_ignore_ascii_case("END:VEVENT") {
            if let Some(event) = current.take().and_then(EventBuilder::finish) {
                events.push(event);
            }
            continue;
        }

        let Some(builder) = current.as_mut() else {
            continue;
        };
        let Some((name, value)) = line.split_once(':') else {
            continue;
        };
        if name.eq_ignore_ascii_case("BEGIN") {
            builder.depth += 1;
            continue;
        }
        if name.eq_ignore_ascii_case("END") {
            builder.depth = builder.depth.saturating_sub(1);
            continue;
        }
        if builder.depth > 0 {
            continue;
        }

        match Property::from_name(name) {
            Property::Summary => builder.summary = Some(value.to_string()),
            Property::DtStart => {
                if let Some(date) = parse_date_value(value, tz) {
                    builder.start = Some(date);
                }
            }
            Property::DtEnd => {
                if let Some(date) = parse_date_value(value, tz) {
                    builder.end = Some(date);
                }
            }
            Property::Other => {}
        }
    }

    events
}

/// Parse `YYYYMMDD` or `YYYYMMDDTHHMMSS[Z]`.
fn parse_date_value(value: &str, tz: Tz) -> Option<DateValue> {
    let value = value.trim();
    let bytes = value.as_bytes();

    if bytes.len() == 8 && bytes.iter().all(u8::is_ascii_digit) {
        let date = NaiveDate::parse_from_str(value, "%Y%m%d").ok()?;
        let at = localize(date.and_hms_opt(0, 0, 0)?, tz);
        return Some(DateValue { at, date_only: true });
    }

    let (body, utc) = match value.strip_suffix('Z') {
        Some(body) => (body, true),
        None => (value, false),
    };
    let well_formed = body.len() == 15
        && body.as_bytes()[8] == b'T'
        && body
            .bytes()
            .enumerate()
            .all(|(i, b)| i == 8 || b.is_ascii_digit());
    if !well_formed {
        return None;
    }

    let naive = NaiveDateTime::parse_from_str(body, "%Y%m%dT%H%M%S").ok()?;
    let at = if utc {
        Utc.from_utc_datetime(&naive).fixed_offset()
    } else {
        localize(naive, tz)
    };
    Some(DateValue { at, date_only: false })
}

/// Attach the display zone's offset to a wall-clock time.
///
/// Ambiguous times (DST fall-back) take the earlier instant; times inside a
/// spring-forward gap move one hour later.
fn localize(naive: NaiveDateTime, tz: Tz) -> DateTime<FixedOffset> {
    tz.from_local_datetime(&naive)
        .earliest()
        .or_else(|| tz.from_local_datetime(&(naive + Duration::hours(1))).earliest())
        .map(|dt| dt.fixed_offset())
        .unwrap_or_else(|| Utc.from_utc_datetime(&naive).fixed_offset())
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
