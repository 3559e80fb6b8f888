//! Layout engine: turns a resolved `DashboardData` into absolutely positioned
//! panels.
//!
//! The canvas is 640×460 before rotation. It holds two columns; each column
//! stacks fixed-height panels with one elastic panel taking the remaining
//! height. Panel geometry depends only on the constants below. The agenda and
//! transit lists are centered as a block inside their panels.
//!
//! The display is mounted portrait, so the finished layout is emitted inside a
//! single 90° rotated group. The rotation is applied by the renderer and does
//! not touch anything computed here.

use chrono::{Datelike, NaiveTime, Timelike};
use kurbo::{Point, Rect, Size, Vec2};

use crate::calendar::AgendaItem;
use crate::calendar::agenda::weekday_name;
use crate::circadian::{TrackGeometry, TwilightLandmarks, day_progress};
use crate::model::{ArtSlot, DashboardData, ImageData, TransitSummary};
use crate::weather::WeatherReading;

// --- Canvas ---
pub const CANVAS_WIDTH: f64 = 640.0;
pub const CANVAS_HEIGHT: f64 = 460.0;
const MARGIN: f64 = 12.0;
const COLUMN_GUTTER: f64 = 12.0;
const PANEL_GUTTER: f64 = 12.0;
pub const COLUMN_WIDTH: f64 = (CANVAS_WIDTH - 2.0 * MARGIN - COLUMN_GUTTER) / 2.0; // 302
pub const COLUMN_HEIGHT: f64 = CANVAS_HEIGHT - 2.0 * MARGIN; // 436

// --- Fixed panel heights ---
const TIME_HEIGHT: f64 = 96.0;
const WEATHER_HEIGHT: f64 = 104.0;
const AGENDA_HEIGHT: f64 = 156.0;
const TRANSIT_HEIGHT: f64 = 112.0;

pub const PANEL_PADDING: f64 = 10.0;
pub const PANEL_CORNER_RADIUS: f64 = 8.0;

// --- Lists ---
const AGENDA_LINE_HEIGHT: f64 = 34.0; // title + time label
const AGENDA_SPACING: f64 = 42.0;
const TRANSIT_LINE_HEIGHT: f64 = 20.0;
const TRANSIT_SPACING: f64 = 22.0;
const BLOCK_TOP_OFFSET: f64 = 4.0;
const BIKE_STRIP_HEIGHT: f64 = 26.0;

// --- Circadian ---
const TRACK_PADDING: f64 = 8.0;
const TRACK_INSET: f64 = 10.0;
const TRACK_CORNER_RADIUS: f64 = 28.0;
const TRACK_STROKE: f64 = 2.0;
const MARKER_RADIUS: f64 = 7.0;
const TICK_RADIUS: f64 = 3.5;
const CORNER_LABEL_PULL: f64 = 0.22; // fraction of the way from corner to center

// --- Weather ---
const ICON_SIZE: f64 = 72.0;

const NO_IMAGERY: &str = "NO IMAGERY";

// ---------------------------------------------------------------------------
// Types
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PanelRole {
    Time,
    Weather,
    Circadian,
    Agenda,
    Transit,
    Imagery,
}

enum Sizing {
    Fixed(f64),
    Elastic,
}

impl PanelRole {
    fn sizing(self) -> Sizing {
        match self {
            PanelRole::Time => Sizing::Fixed(TIME_HEIGHT),
            PanelRole::Weather => Sizing::Fixed(WEATHER_HEIGHT),
            PanelRole::Agenda => Sizing::Fixed(AGENDA_HEIGHT),
            PanelRole::Transit => Sizing::Fixed(TRANSIT_HEIGHT),
            PanelRole::Circadian | PanelRole::Imagery => Sizing::Elastic,
        }
    }
}

const LEFT_COLUMN: [PanelRole; 3] = [PanelRole::Time, PanelRole::Weather, PanelRole::Circadian];
const RIGHT_COLUMN: [PanelRole; 3] = [PanelRole::Agenda, PanelRole::Transit, PanelRole::Imagery];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Anchor {
    Start,
    Middle,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Weight {
    Regular,
    Bold,
}

/// A drawable item in canvas coordinates.
#[derive(Debug, Clone, PartialEq)]
pub enum Element {
    /// `at` is the baseline point, interpreted according to `anchor`.
    Text {
        at: Point,
        text: String,
        size: f64,
        weight: Weight,
        anchor: Anchor,
    },
    /// SVG path data in local coordinates, translated by `origin`.
    Path {
        origin: Point,
        d: String,
        stroke_width: f64,
    },
    Circle {
        center: Point,
        radius: f64,
        filled: bool,
    },
    Image {
        rect: Rect,
        image: ImageData,
    },
}

#[derive(Debug, Clone, PartialEq)]
pub struct Panel {
    pub role: PanelRole,
    pub rect: Rect,
    pub elements: Vec<Element>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Column {
    pub panels: Vec<Panel>,
}

/// A finished layout, ready for the render adapter.
#[derive(Debug, Clone, PartialEq)]
pub struct PanelLayout {
    /// Canvas size before rotation.
    pub size: Size,
    pub columns: Vec<Column>,
}

impl PanelLayout {
    /// Size of the emitted image: the canvas with its sides swapped.
    pub fn output_size(&self) -> Size {
        Size::new(self.size.height, self.size.width)
    }

    pub fn panels(&self) -> impl Iterator<Item = &Panel> {
        self.columns.iter().flat_map(|c| c.panels.iter())
    }
}

// ---------------------------------------------------------------------------
// Composition
// ---------------------------------------------------------------------------

/// Lay out every panel for one render.
pub fn compose(data: &DashboardData) -> PanelLayout {
    let left_x = MARGIN;
    let right_x = MARGIN + COLUMN_WIDTH + COLUMN_GUTTER;

    let columns = [(left_x, &LEFT_COLUMN[..]), (right_x, &RIGHT_COLUMN[..])]
        .into_iter()
        .map(|(x, roles)| Column {
            panels: stack_column(x, roles)
                .into_iter()
                .map(|(role, rect)| Panel {
                    role,
                    rect,
                    elements: panel_elements(role, rect, data),
                })
                .collect(),
        })
        .collect();

    PanelLayout {
        size: Size::new(CANVAS_WIDTH, CANVAS_HEIGHT),
        columns,
    }
}

/// Stack panels top to bottom. The elastic panel gets what the fixed panels
/// and gutters leave, never less than zero.
fn stack_column(x: f64, roles: &[PanelRole]) -> Vec<(PanelRole, Rect)> {
    let fixed: f64 = roles
        .iter()
        .filter_map(|role| match role.sizing() {
            Sizing::Fixed(h) => Some(h),
            Sizing::Elastic => None,
        })
        .sum();
    let gutters = PANEL_GUTTER * roles.len().saturating_sub(1) as f64;
    let elastic = (COLUMN_HEIGHT - fixed - gutters).max(0.0);

    let mut y = MARGIN;
    roles
        .iter()
        .map(|&role| {
            let h = match role.sizing() {
                Sizing::Fixed(h) => h,
                Sizing::Elastic => elastic,
            };
            let rect = Rect::new(x, y, x + COLUMN_WIDTH, y + h);
            y += h + PANEL_GUTTER;
            (role, rect)
        })
        .collect()
}

fn panel_elements(role: PanelRole, rect: Rect, data: &DashboardData) -> Vec<Element> {
    match role {
        PanelRole::Time => time_elements(rect, data),
        PanelRole::Weather => weather_elements(rect, &data.weather, data.weather_icon.as_ref()),
        PanelRole::Circadian => circadian_elements(rect, &data.landmarks, data.now.time()),
        PanelRole::Agenda => agenda_elements(rect, &data.agenda),
        PanelRole::Transit => transit_elements(rect, &data.transit),
        PanelRole::Imagery => imagery_elements(rect, &data.art),
    }
}

/// Top of a vertically centered list block of `count` entries (at least one).
pub fn block_start(top: f64, height: f64, line_height: f64, spacing: f64, count: usize) -> f64 {
    let count = count.max(1);
    let block = line_height + spacing * (count - 1) as f64;
    top + (height - block) / 2.0 + BLOCK_TOP_OFFSET
}

fn text(at: Point, text: impl Into<String>, size: f64, weight: Weight, anchor: Anchor) -> Element {
    Element::Text {
        at,
        text: text.into(),
        size,
        weight,
        anchor,
    }
}

// ---------------------------------------------------------------------------
// Panels
// ---------------------------------------------------------------------------

fn time_elements(rect: Rect, data: &DashboardData) -> Vec<Element> {
    let now = data.now;
    let cx = rect.center().x;
    let date = format!(
        "{} {:02}/{:02}",
        weekday_name(now.weekday()),
        now.day(),
        now.month()
    );
    vec![
        text(
            Point::new(cx, rect.y0 + 58.0),
            format!("{:02}:{:02}", now.hour(), now.minute()),
            52.0,
            Weight::Bold,
            Anchor::Middle,
        ),
        text(
            Point::new(cx, rect.y1 - 12.0),
            date,
            16.0,
            Weight::Regular,
            Anchor::Middle,
        ),
    ]
}

fn weather_elements(
    rect: Rect,
    weather: &WeatherReading,
    icon: Option<&ImageData>,
) -> Vec<Element> {
    let mut elements = Vec::new();
    let mut text_x = rect.x0 + PANEL_PADDING;

    if let Some(icon) = icon {
        let top = rect.y0 + (rect.height() - ICON_SIZE) / 2.0;
        let icon_rect = Rect::new(text_x, top, text_x + ICON_SIZE, top + ICON_SIZE);
        elements.push(Element::Image {
            rect: icon_rect,
            image: icon.clone(),
        });
        text_x = icon_rect.x1 + PANEL_PADDING;
    }

    elements.push(text(
        Point::new(text_x, rect.y0 + 48.0),
        weather.temperature_label(),
        40.0,
        Weight::Bold,
        Anchor::Start,
    ));
    elements.push(text(
        Point::new(text_x, rect.y0 + 72.0),
        weather.kind().label(),
        16.0,
        Weight::Regular,
        Anchor::Start,
    ));
    elements.push(text(
        Point::new(text_x, rect.y0 + 92.0),
        weather.precipitation_label(),
        14.0,
        Weight::Regular,
        Anchor::Start,
    ));
    elements
}

/// The square track the marker walks. Corners only line up with landmark
/// times when all four sides have the same length.
pub fn circadian_track(rect: Rect) -> (Point, TrackGeometry) {
    let side = (rect.width().min(rect.height()) - 2.0 * TRACK_PADDING).max(0.0);
    let origin = Point::new(
        rect.x0 + (rect.width() - side) / 2.0,
        rect.y0 + (rect.height() - side) / 2.0,
    );
    let track = TrackGeometry {
        width: side,
        height: side,
        inset: TRACK_INSET.min(side / 2.0),
        corner_radius: TRACK_CORNER_RADIUS,
    };
    (origin, track)
}

fn circadian_elements(rect: Rect, landmarks: &TwilightLandmarks, now: NaiveTime) -> Vec<Element> {
    let (origin, track) = circadian_track(rect);
    let offset = origin.to_vec2();
    let center = track.bounds().center() + offset;
    let corners = track.corners();

    let mut elements = vec![Element::Path {
        origin,
        d: track.to_svg_path(),
        stroke_width: TRACK_STROKE,
    }];

    for tick in [landmarks.nautical_twilight_begin, landmarks.nautical_twilight_end] {
        elements.push(Element::Circle {
            center: track.point_at(day_progress(landmarks, tick)) + offset,
            radius: TICK_RADIUS,
            filled: false,
        });
    }

    let noon = NaiveTime::from_hms_opt(12, 0, 0).unwrap_or(NaiveTime::MIN);
    let labels = [
        (corners.sunrise, landmarks.sunrise),
        (corners.noon, noon),
        (corners.sunset, landmarks.sunset),
        (corners.midnight, NaiveTime::MIN),
    ];
    for (corner, time) in labels {
        let corner = corner + offset;
        let at = corner.lerp(center, CORNER_LABEL_PULL) + Vec2::new(0.0, 4.0);
        elements.push(text(
            at,
            time.format("%H:%M").to_string(),
            13.0,
            Weight::Regular,
            Anchor::Middle,
        ));
    }

    elements.push(text(
        center + Vec2::new(0.0, 5.0),
        daylight_label(landmarks),
        14.0,
        Weight::Regular,
        Anchor::Middle,
    ));

    elements.push(Element::Circle {
        center: track.point_at(day_progress(landmarks, now)) + offset,
        radius: MARKER_RADIUS,
        filled: true,
    });
    elements
}

fn daylight_label(landmarks: &TwilightLandmarks) -> String {
    let minutes = (landmarks.sunset - landmarks.sunrise).num_minutes().max(0);
    format!("{}h{:02} de jour", minutes / 60, minutes % 60)
}

fn agenda_elements(rect: Rect, items: &[AgendaItem]) -> Vec<Element> {
    let start = block_start(
        rect.y0,
        rect.height(),
        AGENDA_LINE_HEIGHT,
        AGENDA_SPACING,
        items.len(),
    );
    let x = rect.x0 + PANEL_PADDING;

    items
        .iter()
        .enumerate()
        .flat_map(|(i, item)| {
            let row = start + AGENDA_SPACING * i as f64;
            [
                text(
                    Point::new(x, row + 16.0),
                    item.title.clone(),
                    17.0,
                    Weight::Bold,
                    Anchor::Start,
                ),
                text(
                    Point::new(x, row + 32.0),
                    item.time_label.clone(),
                    13.0,
                    Weight::Regular,
                    Anchor::Start,
                ),
            ]
        })
        .collect()
}

fn transit_elements(rect: Rect, transit: &TransitSummary) -> Vec<Element> {
    let lines = transit.departure_lines();
    let list_height = rect.height() - BIKE_STRIP_HEIGHT;
    let start = block_start(
        rect.y0,
        list_height,
        TRANSIT_LINE_HEIGHT,
        TRANSIT_SPACING,
        lines.len(),
    );
    let cx = rect.center().x;

    let mut elements: Vec<Element> = lines
        .into_iter()
        .enumerate()
        .map(|(i, line)| {
            let row = start + TRANSIT_SPACING * i as f64;
            text(Point::new(cx, row + 16.0), line, 18.0, Weight::Bold, Anchor::Middle)
        })
        .collect();

    if !transit.stations.is_empty() {
        elements.push(text(
            Point::new(cx, rect.y1 - 9.0),
            transit.bike_line(),
            14.0,
            Weight::Regular,
            Anchor::Middle,
        ));
    }
    elements
}

fn imagery_elements(rect: Rect, art: &[ArtSlot]) -> Vec<Element> {
    let images: Vec<&ImageData> = art.iter().filter_map(|slot| slot.image.as_ref()).collect();
    if images.is_empty() {
        return vec![text(
            rect.center() + Vec2::new(0.0, 6.0),
            NO_IMAGERY,
            16.0,
            Weight::Regular,
            Anchor::Middle,
        )];
    }

    let inner = rect.inset(-PANEL_PADDING);
    let n = images.len() as f64;
    let tile_width = ((inner.width() - PANEL_GUTTER * (n - 1.0)) / n).max(0.0);

    images
        .into_iter()
        .enumerate()
        .map(|(i, image)| {
            let x = inner.x0 + (tile_width + PANEL_GUTTER) * i as f64;
            Element::Image {
                rect: Rect::new(x, inner.y0, x + tile_width, inner.y1),
                image: image.clone(),
            }
        })
        .collect()
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
