//! Static markup layered above the canvas.
//!
//! Two spans mirror the rendered lines with zero-alpha color so the text stays selectable
//! without doubling it visually. A third, visible caption carries the attribution links.

use std::fmt::Write as _;

use serde::{Deserialize, Serialize};

use crate::foundation::color::Color;
use crate::foundation::core::Canvas;
use crate::scene::typography::TypographyConfig;

pub const AUTHOR_NAME: &str = "wojciech dobry";
pub const AUTHOR_URL: &str = "https://twitter.com/wojciech_dobry";
pub const COLLECTIVE_NAME: &str = "pmndrs";
pub const COLLECTIVE_URL: &str = "https://twitter.com/pmndrs";

const FONT_FAMILY: &str = "IBM Plex Sans";

/// The hidden first-line span keeps a fixed size; only the second line follows `size`.
const LINE_1_SPAN_VW: f32 = 2.0;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct OverlayConfig {
    /// Composite the rasterized caption over rendered frames.
    #[serde(default = "default_enabled")]
    pub enabled: bool,
}

fn default_enabled() -> bool {
    true
}

impl Default for OverlayConfig {
    fn default() -> Self {
        Self {
            enabled: default_enabled(),
        }
    }
}

/// Outbound link; always opens a new browsing context without a referrer.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Link {
    pub text: String,
    pub href: String,
}

impl Link {
    pub const TARGET: &'static str = "_blank";
    pub const REL: &'static str = "noreferrer";

    fn new(text: &str, href: &str) -> Self {
        Self {
            text: text.to_owned(),
            href: href.to_owned(),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Inline {
    Text(String),
    Link(Link),
}

/// Vertical anchoring of a span; all spans are horizontally centered.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Placement {
    /// Span middle sits `shift_up_vh` above the viewport's vertical center.
    Middle { shift_up_vh: f32 },
    /// Span middle sits `pct` percent of the height above the bottom edge.
    Bottom { pct: f32 },
}

#[derive(Clone, Debug, PartialEq)]
pub struct Span {
    pub content: Vec<Inline>,
    pub font_size_vw: f32,
    pub weight: u16,
    /// `None` leaves the line height to the user agent.
    pub line_height: Option<f32>,
    pub color: Color,
    pub placement: Placement,
}

impl Span {
    /// Concatenated text content, links included.
    pub fn text(&self) -> String {
        self.content
            .iter()
            .map(|i| match i {
                Inline::Text(t) => t.as_str(),
                Inline::Link(l) => l.text.as_str(),
            })
            .collect()
    }

    pub fn is_visible(&self) -> bool {
        !self.color.is_transparent()
    }

    pub fn links(&self) -> impl Iterator<Item = &Link> {
        self.content.iter().filter_map(|i| match i {
            Inline::Link(l) => Some(l),
            Inline::Text(_) => None,
        })
    }

    fn center_y(&self, canvas: Canvas) -> f32 {
        let h = canvas.height as f32;
        match self.placement {
            Placement::Middle { shift_up_vh } => h * 0.5 - h * shift_up_vh / 100.0,
            Placement::Bottom { pct } => h - h * pct / 100.0,
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct Overlay {
    spans: Vec<Span>,
}

impl Overlay {
    pub fn new(typography: &TypographyConfig) -> Self {
        let hidden = Color::hsla(0.0, 1.0, 0.5, 0.0);
        let spans = vec![
            Span {
                content: vec![Inline::Text(typography.line_2.clone())],
                font_size_vw: typography.size,
                weight: 500,
                line_height: Some(1.0),
                color: hidden,
                placement: Placement::Middle { shift_up_vh: 0.0 },
            },
            Span {
                content: vec![Inline::Text(typography.line_1.clone())],
                font_size_vw: LINE_1_SPAN_VW,
                weight: 200,
                line_height: Some(1.0),
                color: hidden,
                placement: Placement::Middle { shift_up_vh: 10.0 },
            },
            Span {
                content: vec![
                    Inline::Text("made by ".to_owned()),
                    Inline::Link(Link::new(AUTHOR_NAME, AUTHOR_URL)),
                    Inline::Text(" \u{2013} inspired by ".to_owned()),
                    Inline::Link(Link::new(COLLECTIVE_NAME, COLLECTIVE_URL)),
                    Inline::Text(" collective".to_owned()),
                ],
                font_size_vw: 1.75,
                weight: 200,
                line_height: None,
                color: Color::hsla(0.0, 0.0, 0.95, 1.0),
                placement: Placement::Bottom { pct: 10.0 },
            },
        ];
        Self { spans }
    }

    pub fn spans(&self) -> &[Span] {
        &self.spans
    }

    pub fn links(&self) -> impl Iterator<Item = &Link> {
        self.spans.iter().flat_map(Span::links)
    }

    /// Standalone positioned markup, sized in viewport units.
    pub fn to_html(&self) -> String {
        let mut out = String::new();
        out.push_str("<div class=\"overlay\">\n");
        for span in &self.spans {
            let (bottom, translate_y) = match span.placement {
                Placement::Middle { shift_up_vh } if shift_up_vh == 0.0 => {
                    ("50%".to_owned(), "translateY(50%)".to_owned())
                }
                Placement::Middle { shift_up_vh } => (
                    "50%".to_owned(),
                    format!("translateY(calc(50% - {shift_up_vh}vh))"),
                ),
                Placement::Bottom { pct } => (format!("{pct}%"), "translateY(50%)".to_owned()),
            };
            let _ = write!(
                out,
                "  <span style=\"position: absolute; bottom: {bottom}; left: 50%; \
                 font-size: {}vw; font-family: '{FONT_FAMILY}'; font-weight: {};",
                span.font_size_vw, span.weight
            );
            if let Some(lh) = span.line_height {
                let _ = write!(out, " line-height: {lh};");
            }
            let _ = write!(
                out,
                " color: {}; transform: translateX(-50%) {translate_y}; \
                 white-space: nowrap; text-align: center\">",
                span.color.to_css()
            );
            for inline in &span.content {
                match inline {
                    Inline::Text(t) => out.push_str(&escape(t)),
                    Inline::Link(l) => {
                        let _ = write!(
                            out,
                            "<a href=\"{}\" target=\"{}\" rel=\"{}\">{}</a>",
                            escape(&l.href),
                            Link::TARGET,
                            Link::REL,
                            escape(&l.text)
                        );
                    }
                }
            }
            out.push_str("</span>\n");
        }
        out.push_str("</div>\n");
        out
    }

    /// Pixel-resolved SVG of the overlay for `canvas`. Fully transparent spans are omitted.
    pub fn to_svg(&self, canvas: Canvas) -> String {
        let (w, h) = (canvas.width, canvas.height);
        let mut out = format!(
            "<svg xmlns=\"http://www.w3.org/2000/svg\" width=\"{w}\" height=\"{h}\" \
             viewBox=\"0 0 {w} {h}\">\n"
        );
        for span in self.spans.iter().filter(|s| s.is_visible()) {
            let size_px = w as f32 * span.font_size_vw / 100.0;
            let [r, g, b, _] = span.color.to_rgba8();
            let _ = writeln!(
                out,
                "  <text x=\"{:.2}\" y=\"{:.2}\" font-family=\"'{FONT_FAMILY}', sans-serif\" \
                 font-size=\"{size_px:.3}\" font-weight=\"{}\" text-anchor=\"middle\" \
                 dominant-baseline=\"central\" fill=\"rgb({r},{g},{b})\" \
                 fill-opacity=\"{}\">{}</text>",
                w as f32 * 0.5,
                span.center_y(canvas),
                span.weight,
                span.color.a.clamp(0.0, 1.0),
                escape(&span.text())
            );
        }
        out.push_str("</svg>\n");
        out
    }
}

fn escape(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

#[cfg(test)]
#[path = "../../tests/unit/scene/overlay.rs"]
mod tests;
