//! Agenda selection: merge feeds, keep what is still relevant, format labels.

use std::sync::LazyLock;

use chrono::{DateTime, Datelike, Duration, Weekday};
use chrono_tz::Tz;
use regex::Regex;

use super::CalendarEvent;
use super::parse_feed;

/// Number of agenda rows the panel shows.
pub const MAX_ITEMS: usize = 3;
pub const MAX_TITLE_CHARS: usize = 25;

pub const PLACEHOLDER_TITLE: &str = "NO UPCOMING EVENTS";
pub const PLACEHOLDER_TIME: &str = "—";

static COURSE_ABBREVIATION: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)conf\.\s*de\.\s*m[ée]th\.").expect("static regex is valid")
});
const COURSE_TOKEN: &str = "TD";

/// One row of the agenda panel.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AgendaItem {
    pub title: String,
    pub time_label: String,
}

impl AgendaItem {
    pub fn placeholder() -> Self {
        Self {
            title: PLACEHOLDER_TITLE.to_string(),
            time_label: PLACEHOLDER_TIME.to_string(),
        }
    }

    fn from_event(event: &CalendarEvent, tz: Tz) -> Self {
        Self {
            title: normalize_title(&event.summary),
            time_label: time_label(event, tz),
        }
    }
}

/// Pick the next agenda rows from every successfully fetched feed.
///
/// Feeds are parsed independently and merged. Events that already ended
/// before `now` are dropped; the rest are ordered by start and the first
/// [`MAX_ITEMS`] are kept. Returns an empty list when nothing qualifies.
pub fn select_agenda(feeds: &[&str], now: DateTime<Tz>) -> Vec<AgendaItem> {
    let tz = now.timezone();
    let now = now.fixed_offset();

    let mut events: Vec<CalendarEvent> = feeds
        .iter()
        .flat_map(|feed| parse_feed(feed, tz))
        .filter(|event| effective_end(event) >= now)
        .collect();
    events.sort_by_key(|event| event.start);

    events
        .iter()
        .take(MAX_ITEMS)
        .map(|event| AgendaItem::from_event(event, tz))
        .collect()
}

/// Substitute the single placeholder row for an empty selection.
pub fn with_placeholder(items: Vec<AgendaItem>) -> Vec<AgendaItem> {
    if items.is_empty() {
        vec![AgendaItem::placeholder()]
    } else {
        items
    }
}

/// All-day `DTEND` is exclusive, so the event really ends a millisecond
/// earlier. Events without an end finish at their start.
fn effective_end(event: &CalendarEvent) -> DateTime<chrono::FixedOffset> {
    match event.end {
        Some(end) if event.all_day => end - Duration::milliseconds(1),
        Some(end) => end,
        None => event.start,
    }
}

/// Shorten known abbreviations and hard-truncate to [`MAX_TITLE_CHARS`].
pub fn normalize_title(summary: &str) -> String {
    let replaced = COURSE_ABBREVIATION.replace_all(summary, COURSE_TOKEN);
    replaced.trim().chars().take(MAX_TITLE_CHARS).collect()
}

fn time_label(event: &CalendarEvent, tz: Tz) -> String {
    let local = event.start.with_timezone(&tz);
    let day = weekday_name(local.weekday());
    if event.all_day {
        format!("{day} (All day)")
    } else {
        format!("{day} {}", local.format("%Hh%M"))
    }
}

pub fn weekday_name(day: Weekday) -> &'static str {
    match day {
        Weekday::Mon => "Lundi",
        Weekday::Tue => "Mardi",
        Weekday::Wed => "Mercredi",
        Weekday::Thu => "Jeudi",
        Weekday::Fri => "Vendredi",
        Weekday::Sat => "Samedi",
        Weekday::Sun => "Dimanche",
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use chrono_tz::Europe::Paris;

    fn at(y: i32, m: u32, d: u32, h: u32, min: u32) -> DateTime<Tz> {
        Paris.with_ymd_and_hms(y, m, d, h, min, 0).unwrap()
    }

    fn vevent(summary: &str, start: &str, end: Option<&str>) -> String {
        let mut s = format!("BEGIN:VEVENT\nSUMMARY:{summary}\nDTSTART:{start}\n");
        if let Some(end) = end {
            s.push_str(&format!("DTEND:{end}\n"));
        }
        s.push_str("END:VEVENT\n");
        s
    }

    #[test]
    fn course_scenario_produces_td_title() {
        let feed = "BEGIN:VEVENT\nSUMMARY:Conf. De. Méth. Algèbre\nDTSTART:20250101T090000\nEND:VEVENT";
        let items = select_agenda(&[feed], at(2024, 12, 31, 12, 0));
        assert_eq!(items.len(), 1);
        assert!(items[0].title.starts_with("TD"), "{}", items[0].title);
        assert_eq!(items[0].title, "TD Algèbre");
        assert_eq!(items[0].time_label, "Mercredi 09h00");
    }

    #[test]
    fn empty_feed_list_yields_empty_selection() {
        let items = select_agenda(&[], at(2025, 1, 1, 0, 0));
        assert!(items.is_empty());
        assert_eq!(with_placeholder(items), vec![AgendaItem::placeholder()]);
    }

    #[test]
    fn placeholder_only_when_nothing_qualifies() {
        let past = vevent("Old", "20200101T090000", None);
        let items = select_agenda(&[&past], at(2025, 1, 1, 0, 0));
        assert_eq!(with_placeholder(items.clone()), vec![AgendaItem::placeholder()]);

        let future = vevent("New", "20300101T090000", None);
        let items = with_placeholder(select_agenda(&[&past, &future], at(2025, 1, 1, 0, 0)));
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].title, "New");
    }

    #[test]
    fn merges_feeds_sorts_and_truncates_to_three() {
        let a = format!(
            "{}{}",
            vevent("Fourth", "20250105T090000", None),
            vevent("Second", "20250103T090000", None)
        );
        let b = format!(
            "{}{}{}",
            vevent("First", "20250102T090000", None),
            vevent("Third", "20250104T090000", None),
            vevent("Fifth", "20250106T090000", None)
        );
        let items = select_agenda(&[&a, &b], at(2025, 1, 1, 0, 0));
        let titles: Vec<&str> = items.iter().map(|i| i.title.as_str()).collect();
        assert_eq!(titles, vec!["First", "Second", "Third"]);
    }

    #[test]
    fn never_more_than_three_items() {
        let feed: String = (1..=9)
            .map(|d| vevent("E", &format!("2025010{d}T080000"), None))
            .collect();
        for count in 0..=9 {
            let feeds: Vec<&str> = std::iter::repeat_n(feed.as_str(), count).collect();
            let items = select_agenda(&feeds, at(2025, 1, 1, 0, 0));
            assert!(items.len() <= MAX_ITEMS);
        }
    }

    #[test]
    fn ongoing_event_is_kept_until_its_end() {
        let feed = vevent("Meeting", "20250101T090000", Some("20250101T110000"));
        assert_eq!(select_agenda(&[&feed], at(2025, 1, 1, 10, 0)).len(), 1);
        assert_eq!(select_agenda(&[&feed], at(2025, 1, 1, 11, 0)).len(), 1);
        assert!(select_agenda(&[&feed], at(2025, 1, 1, 11, 1)).is_empty());
    }

    #[test]
    fn all_day_end_is_exclusive() {
        let feed = vevent("Holiday", "20250101", Some("20250102"));
        let items = select_agenda(&[&feed], at(2025, 1, 1, 23, 59));
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].time_label, "Mercredi (All day)");
        assert!(select_agenda(&[&feed], at(2025, 1, 2, 0, 0)).is_empty());
    }

    #[test]
    fn all_day_without_end_expires_after_its_start() {
        let feed = vevent("Birthday", "20250101", None);
        assert_eq!(select_agenda(&[&feed], at(2025, 1, 1, 0, 0)).len(), 1);
        assert!(select_agenda(&[&feed], at(2025, 1, 1, 0, 1)).is_empty());
    }

    #[test]
    fn utc_events_are_labelled_in_display_zone() {
        let feed = vevent("Call", "20250101T080000Z", None);
        let items = select_agenda(&[&feed], at(2025, 1, 1, 0, 0));
        assert_eq!(items[0].time_label, "Mercredi 09h00");
    }

    #[test]
    fn titles_never_exceed_limit() {
        let long = "A very long meeting title that keeps going and going";
        assert_eq!(normalize_title(long).chars().count(), MAX_TITLE_CHARS);
        assert_eq!(normalize_title("Réunion équipe été élevée à Besançon").chars().count(), 25);
        assert_eq!(normalize_title("  short  "), "short");
        assert_eq!(normalize_title("CONF. DE. MÉTH. Analyse"), "TD Analyse");
        assert_eq!(normalize_title("conf.de.meth. Proba"), "TD Proba");
    }
}
