//! SVG generation from an arranged scene

use std::fmt::Write as _;

use crate::layout::{BoundingBox, LineSegment};
use crate::parser::ast::CONNECTOR_CLASS;
use crate::scene::{HeadlessScene, SceneItem};

use super::SvgConfig;

/// Collects the lines and widget groups of one map before writing the document
pub struct MapSvg<'a> {
    config: &'a SvgConfig,
    lines: Vec<String>,
    widgets: Vec<String>,
}

impl<'a> MapSvg<'a> {
    pub fn new(config: &'a SvgConfig) -> Self {
        Self {
            config,
            lines: Vec::new(),
            widgets: Vec::new(),
        }
    }

    pub fn line(&mut self, segment: &LineSegment) {
        self.lines.push(format!(
            r#"<line class="{}" x1="{}" y1="{}" x2="{}" y2="{}"/>"#,
            self.config.class("connection"),
            segment.start.x,
            segment.start.y,
            segment.end.x,
            segment.end.y
        ));
    }

    /// A widget is a `<g>` holding its box and an optional centered caption
    pub fn widget(&mut self, id: &str, class: &str, bounds: &BoundingBox, caption: Option<&str>) {
        let mut group = vec![
            format!(
                r#"<g id="{}" class="{} {}">"#,
                escape_xml(id),
                self.config.class("widget"),
                self.config.class(&format!("class-{}", css_ident(class)))
            ),
            format!(
                r#"  <rect x="{}" y="{}" width="{}" height="{}"/>"#,
                bounds.x, bounds.y, bounds.width, bounds.height
            ),
        ];
        if let Some(text) = caption {
            let center = bounds.center();
            group.push(format!(
                r#"  <text class="{}" x="{}" y="{}" text-anchor="middle" dominant-baseline="middle">{}</text>"#,
                self.config.class("label"),
                center.x,
                center.y,
                escape_xml(text)
            ));
        }
        group.push("</g>".to_string());
        self.widgets.extend(group);
    }

    fn style(&self) -> String {
        format!(
            "rect {{ fill: #ffffff; stroke: #333333; stroke-width: 1; }} \
             line {{ stroke: #666666; stroke-width: 1; }} \
             text {{ font-family: sans-serif; font-size: {}px; fill: #333333; }}",
            self.config.font_size
        )
    }

    /// Write the document; `bounds` is grown by the configured margin
    pub fn finish(self, bounds: BoundingBox) -> String {
        let margin = self.config.margin;
        let (nl, pad) = if self.config.compact { ("", "") } else { ("\n", "  ") };

        let mut out = String::new();
        if self.config.xml_declaration {
            let _ = write!(out, r#"<?xml version="1.0" encoding="UTF-8"?>{}"#, nl);
        }
        let _ = write!(
            out,
            r#"<svg xmlns="http://www.w3.org/2000/svg" viewBox="{} {} {} {}">{}"#,
            bounds.x - margin,
            bounds.y - margin,
            bounds.width + 2.0 * margin,
            bounds.height + 2.0 * margin,
            nl
        );
        let _ = write!(out, "{}<style>{}</style>{}", pad, self.style(), nl);

        // connectors go underneath the widgets
        for element in self.lines.iter().chain(&self.widgets) {
            let _ = write!(out, "{}{}{}", pad, element, nl);
        }
        out.push_str("</svg>");
        out
    }
}

/// Render every widget and connector line of `scene`
///
/// Connector placeholders are only drawn in debug mode.
pub fn render_svg(scene: &HeadlessScene, config: &SvgConfig) -> String {
    let mut svg = MapSvg::new(config);

    for segment in scene.lines() {
        svg.line(segment);
    }
    for (_, item) in scene.items() {
        if item.widget.class == CONNECTOR_CLASS && !config.debug {
            continue;
        }
        svg.widget(&item.name, &item.widget.class, &item.bounds(), caption(item, config.debug));
    }

    svg.finish(scene.bounds().unwrap_or_default())
}

fn caption(item: &SceneItem, debug: bool) -> Option<&str> {
    if debug {
        Some(item.name.as_str())
    } else {
        item.widget.label.as_deref()
    }
}

/// Class names may be dotted paths; keep them usable as CSS identifiers
fn css_ident(name: &str) -> String {
    name.chars()
        .map(|c| if c.is_ascii_alphanumeric() || c == '-' || c == '_' { c } else { '-' })
        .collect()
}

fn escape_xml(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&apos;"),
            _ => out.push(c),
        }
    }
    out
}
