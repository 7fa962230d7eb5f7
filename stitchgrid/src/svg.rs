use crate::draw::{Canvas, Paint, Stroke};
use crate::model::{Color, Vec2};
use std::fmt::Write;

/// Canvas that builds a standalone SVG document.
#[derive(Clone, Debug)]
pub struct SvgCanvas {
    width: f32,
    height: f32,
    body: String,
}

fn rgba(c: Color) -> String {
    if c.a == 255 {
        format!("rgb({},{},{})", c.r, c.g, c.b)
    } else {
        format!("rgba({},{},{},{:.3})", c.r, c.g, c.b, c.a as f32 / 255.0)
    }
}

fn stroke_attrs(s: Stroke) -> String {
    format!(r#"fill="none" stroke="{}" stroke-width="{}""#, rgba(s.color), s.width)
}

fn escape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for ch in text.chars() {
        match ch {
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

impl SvgCanvas {
    pub fn new(width: f32, height: f32) -> SvgCanvas {
        SvgCanvas { width, height, body: String::new() }
    }

    fn path(&mut self, d: String, stroke: Stroke) {
        let _ = writeln!(self.body, r#"<path d="{}" {}/>"#, d, stroke_attrs(stroke));
    }

    pub fn finish(self) -> String {
        format!(
            "<svg xmlns=\"http://www.w3.org/2000/svg\" width=\"{w}\" height=\"{h}\" viewBox=\"0 0 {w} {h}\">\n<rect width=\"{w}\" height=\"{h}\" fill=\"rgb(255,255,255)\"/>\n{body}</svg>\n",
            w = self.width,
            h = self.height,
            body = self.body
        )
    }
}

impl Canvas for SvgCanvas {
    fn line(&mut self, a: Vec2, b: Vec2, stroke: Stroke) {
        self.path(format!("M {} {} L {} {}", a.x, a.y, b.x, b.y), stroke);
    }

    fn bezier(&mut self, p0: Vec2, p1: Vec2, p2: Vec2, p3: Vec2, stroke: Stroke) {
        self.path(format!("M {} {} C {} {}, {} {}, {} {}", p0.x, p0.y, p1.x, p1.y, p2.x, p2.y, p3.x, p3.y), stroke);
    }

    fn quadratic(&mut self, p0: Vec2, ctrl: Vec2, p1: Vec2, stroke: Stroke) {
        self.path(format!("M {} {} Q {} {}, {} {}", p0.x, p0.y, ctrl.x, ctrl.y, p1.x, p1.y), stroke);
    }

    fn ellipse(&mut self, center: Vec2, w: f32, h: f32, rotation: f32, paint: Paint) {
        let fill = paint.fill.map_or_else(|| "none".to_string(), rgba);
        let mut attrs = format!(r#"fill="{}""#, fill);
        if let Some(s) = paint.stroke {
            let _ = write!(attrs, r#" stroke="{}" stroke-width="{}""#, rgba(s.color), s.width);
        }
        let turn = if rotation != 0.0 {
            format!(r#" transform="rotate({} {} {})""#, rotation, center.x, center.y)
        } else {
            String::new()
        };
        let _ = writeln!(
            self.body,
            r#"<ellipse cx="{}" cy="{}" rx="{}" ry="{}" {}{}/>"#,
            center.x,
            center.y,
            w / 2.0,
            h / 2.0,
            attrs,
            turn
        );
    }

    fn text(&mut self, at: Vec2, text: &str, size: f32, color: Color) {
        let _ = writeln!(
            self.body,
            r#"<text x="{}" y="{}" font-size="{}" fill="{}" text-anchor="middle" dominant-baseline="central">{}</text>"#,
            at.x,
            at.y,
            size,
            rgba(color),
            escape(text)
        );
    }
}
