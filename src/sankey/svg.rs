//! Standalone SVG rendering of a laid-out diagram, used for PNG export.

use std::fmt::Write;

use egui::Color32;

use super::layout::SankeyLayout;
use super::options::ChartOptions;
use super::palette::{darker, to_hex};

const LABEL_FONT_SIZE: f32 = 12.0;
const LABEL_COLOR: &str = "#333333";

/// Render `layout` to an SVG document with an opaque `background`.
pub fn render(layout: &SankeyLayout, options: &ChartOptions, background: Color32) -> String {
    let width = layout.bounds.width();
    let height = layout.bounds.height();
    let origin = layout.bounds.min;

    let mut svg = String::new();
    let _ = writeln!(
        svg,
        "<svg xmlns=\"http://www.w3.org/2000/svg\" width=\"{w:.0}\" height=\"{h:.0}\" viewBox=\"{x:.1} {y:.1} {w:.1} {h:.1}\">",
        w = width,
        h = height,
        x = origin.x,
        y = origin.y,
    );
    let _ = writeln!(
        svg,
        "  <rect x=\"{:.1}\" y=\"{:.1}\" width=\"{:.1}\" height=\"{:.1}\" fill=\"{}\" />",
        origin.x,
        origin.y,
        width,
        height,
        to_hex(background)
    );

    if options.enable_link_gradient && !layout.links.is_empty() {
        svg.push_str("  <defs>\n");
        for link in &layout.links {
            let _ = writeln!(
                svg,
                "    <linearGradient id=\"link-{}\" gradientUnits=\"userSpaceOnUse\" x1=\"{:.1}\" y1=\"0\" x2=\"{:.1}\" y2=\"0\">",
                link.index, link.start.x, link.end.x
            );
            let _ = writeln!(
                svg,
                "      <stop offset=\"0%\" stop-color=\"{}\" />",
                to_hex(layout.nodes[link.source].color)
            );
            let _ = writeln!(
                svg,
                "      <stop offset=\"100%\" stop-color=\"{}\" />",
                to_hex(layout.nodes[link.target].color)
            );
            svg.push_str("    </linearGradient>\n");
        }
        svg.push_str("  </defs>\n");
    }

    // Links
    let _ = writeln!(
        svg,
        "  <g fill=\"none\" style=\"mix-blend-mode: {}\">",
        options.link_blend_mode.css()
    );
    for link in &layout.links {
        let [p0, p1, p2, p3] = link.control_points();
        let stroke = if options.enable_link_gradient {
            format!("url(#link-{})", link.index)
        } else {
            to_hex(layout.nodes[link.source].color)
        };
        let _ = writeln!(
            svg,
            "    <path d=\"M{:.2},{:.2} C{:.2},{:.2} {:.2},{:.2} {:.2},{:.2}\" stroke=\"{}\" stroke-width=\"{:.2}\" stroke-opacity=\"{:.2}\" />",
            p0.x,
            p0.y,
            p1.x,
            p1.y,
            p2.x,
            p2.y,
            p3.x,
            p3.y,
            stroke,
            link.width.max(1.0),
            options.link_opacity
        );
    }
    svg.push_str("  </g>\n");

    // Nodes
    for node in &layout.nodes {
        let rect = node.visible_rect(options.node_inner_padding);
        let _ = write!(
            svg,
            "  <rect x=\"{:.2}\" y=\"{:.2}\" width=\"{:.2}\" height=\"{:.2}\" fill=\"{}\" fill-opacity=\"{:.2}\"",
            rect.left(),
            rect.top(),
            rect.width(),
            rect.height(),
            to_hex(node.color),
            options.node_opacity
        );
        if options.node_border_width > 0.0 {
            let _ = write!(
                svg,
                " stroke=\"{}\" stroke-width=\"{:.2}\"",
                to_hex(darker(node.color, options.node_border_darker)),
                options.node_border_width
            );
        }
        svg.push_str(" />\n");
    }

    // Labels
    if options.enable_labels {
        for node in &layout.nodes {
            let y = node.rect.center().y;
            let (x, anchor) = if node.label_on_right(layout.columns) {
                (node.rect.right() + options.label_padding, "start")
            } else {
                (node.rect.left() - options.label_padding, "end")
            };
            let _ = writeln!(
                svg,
                "  <text x=\"{:.2}\" y=\"{:.2}\" text-anchor=\"{}\" dominant-baseline=\"central\" font-family=\"sans-serif\" font-size=\"{:.0}\" fill=\"{}\">{}</text>",
                x,
                y,
                anchor,
                LABEL_FONT_SIZE,
                LABEL_COLOR,
                escape_xml(&node.id)
            );
        }
    }

    svg.push_str("</svg>\n");
    svg
}

fn escape_xml(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
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

#[cfg(test)]
mod tests {
    use super::*;
    use crate::flows::{FlowCollection, FlowRecord, seed_flows};
    use crate::sankey::layout;
    use egui::Vec2;

    fn seed_svg(options: &ChartOptions) -> String {
        let data = FlowCollection::from_records(seed_flows()).chart_data();
        let layout = layout::compute(&data, options, Vec2::new(1000.0, 500.0)).unwrap();
        render(&layout, options, Color32::WHITE)
    }

    #[test]
    fn svg_has_white_background_and_all_parts() {
        let svg = seed_svg(&ChartOptions::default());
        assert!(svg.starts_with("<svg"));
        assert!(svg.contains("fill=\"#ffffff\""));
        assert_eq!(svg.matches("<path").count(), 3);
        assert_eq!(svg.matches("<text").count(), 4);
        assert_eq!(svg.matches("<linearGradient").count(), 3);
        assert!(svg.contains("mix-blend-mode: multiply"));
    }

    #[test]
    fn gradients_can_be_disabled() {
        let options = ChartOptions {
            enable_link_gradient: false,
            ..ChartOptions::default()
        };
        let svg = seed_svg(&options);
        assert!(!svg.contains("linearGradient"));
        assert!(svg.contains("stroke=\"#1f77b4\""));
    }

    #[test]
    fn labels_are_escaped() {
        let data = FlowCollection::from_records(vec![FlowRecord::new("R&D", "<Offers>", 1.0)])
            .chart_data();
        let options = ChartOptions::default();
        let layout = layout::compute(&data, &options, Vec2::new(800.0, 400.0)).unwrap();
        let svg = render(&layout, &options, Color32::WHITE);
        assert!(svg.contains("R&amp;D"));
        assert!(svg.contains("&lt;Offers&gt;"));
    }
}
