//! SVG emission.
//!
//! All panel content is written in canvas coordinates inside one group that
//! rotates the landscape canvas onto the portrait output.

use base64::{Engine, engine::general_purpose::STANDARD};

use crate::layout::{Anchor, Element, PANEL_CORNER_RADIUS, Panel, PanelLayout, Weight};

const FONT_FAMILY: &str = "sans-serif";
const PANEL_STROKE: f64 = 1.5;

/// Serialize a finished layout to a standalone SVG document.
pub fn to_svg(layout: &PanelLayout) -> String {
    let out = layout.output_size();
    let mut svg = String::with_capacity(16 * 1024);

    svg.push_str(&format!(
        r#"<svg xmlns="http://www.w3.org/2000/svg" xmlns:xlink="http://www.w3.org/1999/xlink" width="{w}" height="{h}" viewBox="0 0 {w} {h}">"#,
        w = num(out.width),
        h = num(out.height),
    ));
    svg.push('\n');
    svg.push_str(r#"<rect width="100%" height="100%" fill="white"/>"#);
    svg.push('\n');
    svg.push_str(&format!(
        r#"<g transform="translate({} 0) rotate(90)" font-family="{FONT_FAMILY}" fill="black">"#,
        num(out.width),
    ));
    svg.push('\n');

    for panel in layout.panels() {
        write_panel(&mut svg, panel);
    }

    svg.push_str("</g>\n</svg>\n");
    svg
}

fn write_panel(svg: &mut String, panel: &Panel) {
    let r = panel.rect;
    svg.push_str(&format!(
        r#"<rect x="{}" y="{}" width="{}" height="{}" rx="{}" fill="none" stroke="black" stroke-width="{}"/>"#,
        num(r.x0),
        num(r.y0),
        num(r.width()),
        num(r.height()),
        num(PANEL_CORNER_RADIUS),
        num(PANEL_STROKE),
    ));
    svg.push('\n');
    for element in &panel.elements {
        write_element(svg, element);
        svg.push('\n');
    }
}

fn write_element(svg: &mut String, element: &Element) {
    match element {
        Element::Text {
            at,
            text,
            size,
            weight,
            anchor,
        } => {
            let anchor = match anchor {
                Anchor::Start => "start",
                Anchor::Middle => "middle",
            };
            let weight = match weight {
                Weight::Regular => "normal",
                Weight::Bold => "bold",
            };
            svg.push_str(&format!(
                r#"<text x="{}" y="{}" font-size="{}" font-weight="{weight}" text-anchor="{anchor}">{}</text>"#,
                num(at.x),
                num(at.y),
                num(*size),
                escape(text),
            ));
        }
        Element::Path {
            origin,
            d,
            stroke_width,
        } => {
            svg.push_str(&format!(
                r#"<path transform="translate({} {})" d="{}" fill="none" stroke="black" stroke-width="{}"/>"#,
                num(origin.x),
                num(origin.y),
                escape(d),
                num(*stroke_width),
            ));
        }
        Element::Circle {
            center,
            radius,
            filled,
        } => {
            let paint = if *filled {
                r#"fill="black""#
            } else {
                r#"fill="white" stroke="black" stroke-width="1.5""#
            };
            svg.push_str(&format!(
                r#"<circle cx="{}" cy="{}" r="{}" {paint}/>"#,
                num(center.x),
                num(center.y),
                num(*radius),
            ));
        }
        Element::Image { rect, image } => {
            svg.push_str(&format!(
                r#"<image x="{}" y="{}" width="{}" height="{}" preserveAspectRatio="xMidYMid meet" xlink:href="data:{};base64,{}"/>"#,
                num(rect.x0),
                num(rect.y0),
                num(rect.width()),
                num(rect.height()),
                image.mime,
                STANDARD.encode(&image.bytes),
            ));
        }
    }
}

/// Two decimals at most, no trailing zeros.
fn num(v: f64) -> String {
    let rounded = (v * 100.0).round() / 100.0;
    if rounded == 0.0 {
        "0".to_string()
    } else {
        format!("{rounded}")
    }
}

/// Escape text for element content and attribute values.
fn escape(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&apos;"),
            c => out.push(c),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use kurbo::{Point, Rect, Size};

    use crate::layout::{Column, PanelRole};
    use crate::model::ImageData;

    fn single(elements: Vec<Element>) -> PanelLayout {
        PanelLayout {
            size: Size::new(640.0, 460.0),
            columns: vec![Column {
                panels: vec![Panel {
                    role: PanelRole::Agenda,
                    rect: Rect::new(12.0, 12.0, 314.0, 168.0),
                    elements,
                }],
            }],
        }
    }

    #[test]
    fn document_is_rotated_portrait() {
        let svg = to_svg(&single(vec![]));
        assert!(svg.starts_with("<svg "));
        assert!(svg.contains(r#"width="460" height="640" viewBox="0 0 460 640""#));
        assert!(svg.contains(r#"transform="translate(460 0) rotate(90)""#));
        assert_eq!(svg.matches("<g ").count(), 1);
        assert!(svg.trim_end().ends_with("</svg>"));
    }

    #[test]
    fn text_is_escaped() {
        let svg = to_svg(&single(vec![Element::Text {
            at: Point::new(22.0, 40.5),
            text: "R&D <review> \"Q4\"".into(),
            size: 17.0,
            weight: Weight::Bold,
            anchor: Anchor::Start,
        }]));
        assert!(svg.contains("R&amp;D &lt;review&gt; &quot;Q4&quot;"));
        assert!(svg.contains(r#"x="22" y="40.5" font-size="17" font-weight="bold" text-anchor="start""#));
        assert!(!svg.contains("<review>"));
    }

    #[test]
    fn images_become_data_uris() {
        let svg = to_svg(&single(vec![Element::Image {
            rect: Rect::new(0.0, 0.0, 10.0, 10.0),
            image: ImageData {
                mime: "image/png",
                bytes: b"abc".to_vec(),
            },
        }]));
        assert!(svg.contains("data:image/png;base64,YWJj"));
    }

    #[test]
    fn circles_and_paths() {
        let svg = to_svg(&single(vec![
            Element::Circle {
                center: Point::new(1.0, 2.0),
                radius: 3.5,
                filled: false,
            },
            Element::Path {
                origin: Point::new(5.0, 6.0),
                d: "M0 0L1 1Z".into(),
                stroke_width: 2.0,
            },
        ]));
        assert!(svg.contains(r#"<circle cx="1" cy="2" r="3.5" fill="white""#));
        assert!(svg.contains(r#"<path transform="translate(5 6)" d="M0 0L1 1Z""#));
    }

    #[test]
    fn numbers_are_compact() {
        assert_eq!(num(12.0), "12");
        assert_eq!(num(1.0 / 3.0), "0.33");
        assert_eq!(num(-0.001), "0");
        assert_eq!(escape("l'été"), "l&apos;été");
    }
}
