//! Circadian track: where "now" sits on a rounded rectangle that is walked
//! once per day.
//!
//! The day is cut into four arcs bounded by sunrise, solar noon, sunset and
//! midnight. Each arc owns exactly one quarter of the track, so the marker
//! passes a corner at every landmark:
//!
//! - sunrise  -> bottom-left
//! - noon     -> top-left
//! - sunset   -> top-right
//! - midnight -> bottom-right

use std::f64::consts::{FRAC_PI_2, PI};

use chrono::{NaiveTime, Timelike};
use kurbo::{BezPath, Point, Rect, RoundedRect, Shape};

const NOON_MINUTES: f64 = 720.0;
const DAY_MINUTES: f64 = 1440.0;

// ---------------------------------------------------------------------------
// Landmarks
// ---------------------------------------------------------------------------

/// Sunrise, sunset and nautical twilight in the display timezone.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TwilightLandmarks {
    pub sunrise: NaiveTime,
    pub sunset: NaiveTime,
    pub nautical_twilight_begin: NaiveTime,
    pub nautical_twilight_end: NaiveTime,
}

impl Default for TwilightLandmarks {
    /// Used when the twilight source is unavailable.
    fn default() -> Self {
        Self {
            sunrise: hm(7, 30),
            sunset: hm(17, 30),
            nautical_twilight_begin: hm(6, 30),
            nautical_twilight_end: hm(18, 30),
        }
    }
}

impl TwilightLandmarks {
    /// Build landmarks from four `HH:MM` strings.
    pub fn from_hhmm(
        sunrise: &str,
        sunset: &str,
        nautical_begin: &str,
        nautical_end: &str,
    ) -> Option<Self> {
        let parse = |s: &str| NaiveTime::parse_from_str(s.trim(), "%H:%M").ok();
        Some(Self {
            sunrise: parse(sunrise)?,
            sunset: parse(sunset)?,
            nautical_twilight_begin: parse(nautical_begin)?,
            nautical_twilight_end: parse(nautical_end)?,
        })
    }
}

fn hm(h: u32, m: u32) -> NaiveTime {
    NaiveTime::from_hms_opt(h, m, 0).unwrap_or(NaiveTime::MIN)
}

fn minutes_since_midnight(t: NaiveTime) -> f64 {
    f64::from(t.num_seconds_from_midnight()) / 60.0 + f64::from(t.nanosecond()) / 60e9
}

/// Fraction of the lap in `[0, 1)` reached at `now`.
///
/// Progress is linear inside each arc. An arc with zero or negative duration
/// pins progress to the arc's starting quarter.
pub fn day_progress(landmarks: &TwilightLandmarks, now: NaiveTime) -> f64 {
    let t = minutes_since_midnight(now);
    let sunrise = minutes_since_midnight(landmarks.sunrise);
    let sunset = minutes_since_midnight(landmarks.sunset);

    let (quarter, from, to) = if t < sunrise {
        (3.0, 0.0, sunrise)
    } else if t < NOON_MINUTES {
        (0.0, sunrise, NOON_MINUTES)
    } else if t < sunset {
        (1.0, NOON_MINUTES, sunset)
    } else {
        (2.0, sunset, DAY_MINUTES)
    };

    let duration = to - from;
    let within = if duration > 0.0 {
        ((t - from) / duration).clamp(0.0, 1.0)
    } else {
        0.0
    };
    ((quarter + within) * 0.25).rem_euclid(1.0)
}

// ---------------------------------------------------------------------------
// Track geometry
// ---------------------------------------------------------------------------

/// The rounded rectangle the marker travels on, in panel-local coordinates.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TrackGeometry {
    pub width: f64,
    pub height: f64,
    pub inset: f64,
    pub corner_radius: f64,
}

/// One piece of the track, in walking order.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Segment {
    Line { from: Point, to: Point },
    /// Quarter turn around `center`, starting at `start_angle` (radians,
    /// y axis pointing down) and sweeping +π/2.
    Corner { center: Point, radius: f64, start_angle: f64 },
}

impl Segment {
    pub fn length(&self) -> f64 {
        match *self {
            Segment::Line { from, to } => from.distance(to),
            Segment::Corner { radius, .. } => FRAC_PI_2 * radius,
        }
    }

    pub fn start(&self) -> Point {
        self.point_at(0.0)
    }

    /// Point at fraction `t` in `[0, 1]` of this segment.
    pub fn point_at(&self, t: f64) -> Point {
        match *self {
            Segment::Line { from, to } => from.lerp(to, t),
            Segment::Corner {
                center,
                radius,
                start_angle,
            } => {
                let angle = start_angle + FRAC_PI_2 * t;
                Point::new(
                    center.x + radius * angle.cos(),
                    center.y + radius * angle.sin(),
                )
            }
        }
    }
}

/// Fixed label anchors, one per landmark corner.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CornerAnchors {
    pub sunrise: Point,
    pub noon: Point,
    pub sunset: Point,
    pub midnight: Point,
}

impl TrackGeometry {
    /// The track's bounding rectangle after the inset.
    pub fn bounds(&self) -> Rect {
        Rect::new(
            self.inset,
            self.inset,
            (self.width - self.inset).max(self.inset),
            (self.height - self.inset).max(self.inset),
        )
    }

    /// Radius clamped so the corners fit the inset box.
    pub fn radius(&self) -> f64 {
        let b = self.bounds();
        self.corner_radius.clamp(0.0, b.width().min(b.height()) / 2.0)
    }

    /// The eight segments, starting at the bottom-left corner.
    pub fn segments(&self) -> Vec<Segment> {
        let b = self.bounds();
        let r = self.radius();
        let (x0, y0, x1, y1) = (b.x0, b.y0, b.x1, b.y1);

        vec![
            Segment::Corner {
                center: Point::new(x0 + r, y1 - r),
                radius: r,
                start_angle: FRAC_PI_2,
            },
            Segment::Line {
                from: Point::new(x0, y1 - r),
                to: Point::new(x0, y0 + r),
            },
            Segment::Corner {
                center: Point::new(x0 + r, y0 + r),
                radius: r,
                start_angle: PI,
            },
            Segment::Line {
                from: Point::new(x0 + r, y0),
                to: Point::new(x1 - r, y0),
            },
            Segment::Corner {
                center: Point::new(x1 - r, y0 + r),
                radius: r,
                start_angle: 3.0 * FRAC_PI_2,
            },
            Segment::Line {
                from: Point::new(x1, y0 + r),
                to: Point::new(x1, y1 - r),
            },
            Segment::Corner {
                center: Point::new(x1 - r, y1 - r),
                radius: r,
                start_angle: 0.0,
            },
            Segment::Line {
                from: Point::new(x1 - r, y1),
                to: Point::new(x0 + r, y1),
            },
        ]
    }

    pub fn perimeter(&self) -> f64 {
        self.segments().iter().map(Segment::length).sum()
    }

    /// Walk the track until `progress × perimeter` is covered.
    ///
    /// Falls back to the bottom-left corner if accumulation never reaches the
    /// target.
    pub fn point_at(&self, progress: f64) -> Point {
        let segments = self.segments();
        let total = self.perimeter();
        let origin = segments[0].start();
        let target = progress.rem_euclid(1.0) * total;

        let mut walked = 0.0;
        for segment in &segments {
            let len = segment.length();
            if target <= walked + len {
                let t = if len > 0.0 { (target - walked) / len } else { 0.0 };
                return segment.point_at(t);
            }
            walked += len;
        }
        origin
    }

    /// Label anchors at the four corners. They do not depend on the time.
    pub fn corners(&self) -> CornerAnchors {
        let segments = self.segments();
        CornerAnchors {
            sunrise: segments[0].start(),
            noon: segments[2].start(),
            sunset: segments[4].start(),
            midnight: segments[6].start(),
        }
    }

    /// SVG path data for the track outline.
    pub fn to_svg_path(&self) -> String {
        let b = self.bounds();
        let path: BezPath = RoundedRect::from_rect(b, self.radius()).to_path(0.1);
        path.to_svg()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    const EPS: f64 = 1e-6;

    fn square() -> TrackGeometry {
        TrackGeometry {
            width: 200.0,
            height: 200.0,
            inset: 10.0,
            corner_radius: 24.0,
        }
    }

    fn assert_near(a: Point, b: Point) {
        assert!(a.distance(b) < EPS, "{a:?} != {b:?}");
    }

    #[test]
    fn default_landmarks_match_fallback_quadruple() {
        let parsed = TwilightLandmarks::from_hhmm("07:30", "17:30", "06:30", "18:30").unwrap();
        assert_eq!(parsed, TwilightLandmarks::default());
        assert!(TwilightLandmarks::from_hhmm("7h30", "17:30", "06:30", "18:30").is_none());
    }

    #[test]
    fn landmark_times_hit_quarter_boundaries() {
        let l = TwilightLandmarks::default();
        assert!((day_progress(&l, hm(7, 30)) - 0.0).abs() < EPS);
        assert!((day_progress(&l, hm(12, 0)) - 0.25).abs() < EPS);
        assert!((day_progress(&l, hm(17, 30)) - 0.5).abs() < EPS);
        assert!((day_progress(&l, hm(0, 0)) - 0.75).abs() < EPS);
    }

    #[test]
    fn just_past_noon_is_slightly_over_a_quarter() {
        let l = TwilightLandmarks::from_hhmm("07:30", "17:30", "06:30", "18:30").unwrap();
        let p = day_progress(&l, hm(12, 30));
        assert!(p > 0.25 && p < 0.3, "progress {p}");
        assert!((p - (0.25 + 0.25 * 30.0 / 330.0)).abs() < EPS);
    }

    #[test]
    fn progress_is_monotonic_mod_one() {
        let l = TwilightLandmarks::default();
        let mut prev = day_progress(&l, NaiveTime::MIN);
        let mut wraps = 0;
        for minute in 1..1440 {
            let now = NaiveTime::from_num_seconds_from_midnight_opt(minute * 60, 0).unwrap();
            let p = day_progress(&l, now);
            assert!((0.0..1.0).contains(&p));
            if p < prev {
                wraps += 1;
            }
            prev = p;
        }
        assert_eq!(wraps, 1, "progress should wrap exactly once, at sunrise");
    }

    #[test]
    fn landmarks_on_noon_and_midnight_stay_finite() {
        let l = TwilightLandmarks {
            sunrise: hm(0, 0),
            sunset: hm(12, 0),
            ..TwilightLandmarks::default()
        };
        let p = day_progress(&l, hm(12, 0));
        assert!(p.is_finite());
        assert!((p - 0.5).abs() < EPS);
        assert!((day_progress(&l, hm(0, 0)) - 0.0).abs() < EPS);
    }

    #[test]
    fn landmark_times_land_on_corners() {
        let track = square();
        let l = TwilightLandmarks::default();
        let corners = track.corners();
        let at = |t: NaiveTime| track.point_at(day_progress(&l, t));

        assert_near(at(l.sunrise), corners.sunrise);
        assert_near(at(hm(12, 0)), corners.noon);
        assert_near(at(l.sunset), corners.sunset);
        assert_near(at(hm(0, 0)), corners.midnight);
    }

    #[test]
    fn corners_sit_where_expected() {
        let c = square().corners();
        assert_near(c.sunrise, Point::new(34.0, 190.0));
        assert_near(c.noon, Point::new(10.0, 34.0));
        assert_near(c.sunset, Point::new(166.0, 10.0));
        assert_near(c.midnight, Point::new(190.0, 166.0));
    }

    #[test]
    fn perimeter_matches_closed_form() {
        let t = TrackGeometry {
            width: 300.0,
            height: 180.0,
            inset: 12.0,
            corner_radius: 20.0,
        };
        let w = 276.0 - 40.0;
        let h = 156.0 - 40.0;
        let expected = 2.0 * (w + h) + 2.0 * PI * 20.0;
        assert!((t.perimeter() - expected).abs() < 1e-9);
    }

    #[test]
    fn corner_interpolation_is_exact_quarter_turn() {
        let track = square();
        let segments = track.segments();
        for (i, seg) in segments.iter().enumerate() {
            let next = segments[(i + 1) % segments.len()];
            assert_near(seg.point_at(1.0), next.start());
        }
        if let Segment::Corner { center, radius, .. } = segments[0] {
            let mid = segments[0].point_at(0.5);
            assert!((mid.distance(center) - radius).abs() < EPS);
        }
    }

    #[test]
    fn full_lap_returns_to_origin() {
        let track = square();
        assert_near(track.point_at(0.0), track.corners().sunrise);
        assert_near(track.point_at(1.0), track.corners().sunrise);
        let p = track.point_at(0.999_999);
        assert!(p.distance(track.corners().sunrise) < 0.01);
    }

    #[test]
    fn zero_radius_track_still_resolves() {
        let track = TrackGeometry {
            width: 100.0,
            height: 100.0,
            inset: 0.0,
            corner_radius: 0.0,
        };
        assert_near(track.point_at(0.25), Point::new(0.0, 0.0));
        assert_near(track.point_at(0.5), Point::new(100.0, 0.0));
        assert!(track.to_svg_path().starts_with('M'));
    }
}
