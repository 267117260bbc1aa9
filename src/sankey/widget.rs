//! Interactive egui rendering of the diagram.

use egui::{Align2, Color32, FontId, Painter, Pos2, Rect, Response, Sense, Stroke, Ui, Vec2};

use super::layout::{self, LINK_SEGMENTS, LayoutError, SankeyLayout};
use super::options::ChartOptions;
use super::palette::{darker, lerp_color};
use crate::flows::SankeyData;
use crate::flows::types::format_value;
use crate::theme;

/// Placeholder shown when there is nothing to draw.
pub const EMPTY_PLACEHOLDER: &str = "Add some flows to see the diagram";

/// What the chart drew this frame.
pub struct ChartOutput {
    pub response: Response,
    /// Layout in chart-local coordinates (origin at the chart's top-left).
    pub layout: Result<SankeyLayout, LayoutError>,
}

/// Something under the pointer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Hovered {
    Node(usize),
    Link(usize),
}

/// Lay out `data` to fill `size` and draw it.
pub fn render_sankey(ui: &mut Ui, data: &SankeyData, options: &ChartOptions, size: Vec2) -> ChartOutput {
    let (response, painter) = ui.allocate_painter(size, Sense::click());
    let rect = response.rect;

    painter.rect_filled(rect, 4.0, theme::chart::BACKGROUND);

    let layout = layout::compute(data, options, rect.size());
    match &layout {
        Ok(_) if data.is_empty() => {
            painter.text(
                rect.center(),
                Align2::CENTER_CENTER,
                EMPTY_PLACEHOLDER,
                FontId::proportional(18.0),
                theme::chart::PLACEHOLDER,
            );
        }
        Ok(local) => {
            let screen = local.translated(rect.min.to_vec2());
            let hovered = response.hover_pos().and_then(|pos| {
                screen
                    .node_at(pos)
                    .map(Hovered::Node)
                    .or_else(|| screen.link_at(pos).map(Hovered::Link))
            });
            paint_links(&painter, &screen, options, hovered);
            paint_nodes(&painter, &screen, options, hovered);
            if options.enable_labels {
                paint_labels(&painter, &screen, options);
            }
            if let (Some(hovered), Some(pos)) = (hovered, response.hover_pos()) {
                paint_tooltip(&painter, &screen, hovered, pos, rect);
            }
        }
        Err(e) => {
            painter.text(
                rect.center(),
                Align2::CENTER_CENTER,
                e.to_string(),
                FontId::proportional(16.0),
                theme::state::ERROR,
            );
        }
    }

    ChartOutput { response, layout }
}

fn link_alpha(options: &ChartOptions, link: usize, screen: &SankeyLayout, hovered: Option<Hovered>) -> f32 {
    let l = &screen.links[link];
    match hovered {
        Some(Hovered::Link(h)) if h == link => (options.link_opacity + 0.3).min(1.0),
        Some(Hovered::Node(n)) if l.source == n || l.target == n => (options.link_opacity + 0.3).min(1.0),
        Some(_) => options.link_opacity * 0.5,
        None => options.link_opacity,
    }
}

fn paint_links(painter: &Painter, screen: &SankeyLayout, options: &ChartOptions, hovered: Option<Hovered>) {
    for (i, link) in screen.links.iter().enumerate() {
        let alpha = link_alpha(options, i, screen, hovered);
        let width = link.width.max(1.0);
        let source = screen.nodes[link.source].color;
        let target = screen.nodes[link.target].color;
        let points = link.sample(LINK_SEGMENTS);

        if options.enable_link_gradient {
            let last = (points.len() - 1).max(1) as f32;
            for (k, pair) in points.windows(2).enumerate() {
                let t = (k as f32 + 0.5) / last;
                let color = lerp_color(source, target, t).gamma_multiply(alpha);
                painter.line_segment([pair[0], pair[1]], Stroke::new(width, color));
            }
        } else {
            painter.add(egui::Shape::line(points, Stroke::new(width, source.gamma_multiply(alpha))));
        }
    }
}

fn paint_nodes(painter: &Painter, screen: &SankeyLayout, options: &ChartOptions, hovered: Option<Hovered>) {
    for (i, node) in screen.nodes.iter().enumerate() {
        let rect = node.visible_rect(options.node_inner_padding);
        painter.rect_filled(rect, 0.0, node.color.gamma_multiply(options.node_opacity));
        let border = if hovered == Some(Hovered::Node(i)) {
            Stroke::new(options.node_border_width.max(1.0), darker(node.color, options.node_border_darker))
        } else if options.node_border_width > 0.0 {
            Stroke::new(options.node_border_width, darker(node.color, options.node_border_darker))
        } else {
            continue;
        };
        painter.rect_stroke(rect, 0.0, border);
    }
}

fn paint_labels(painter: &Painter, screen: &SankeyLayout, options: &ChartOptions) {
    for node in &screen.nodes {
        let y = node.rect.center().y;
        let (pos, align) = if node.label_on_right(screen.columns) {
            (Pos2::new(node.rect.right() + options.label_padding, y), Align2::LEFT_CENTER)
        } else {
            (Pos2::new(node.rect.left() - options.label_padding, y), Align2::RIGHT_CENTER)
        };
        painter.text(pos, align, &node.id, FontId::proportional(12.0), theme::chart::LABEL);
    }
}

fn tooltip_text(screen: &SankeyLayout, hovered: Hovered) -> String {
    match hovered {
        Hovered::Node(i) => {
            let node = &screen.nodes[i];
            format!("{}: {}", node.id, format_value(node.value))
        }
        Hovered::Link(i) => {
            let link = &screen.links[i];
            format!(
                "{} → {}: {}",
                screen.nodes[link.source].id,
                screen.nodes[link.target].id,
                format_value(link.value)
            )
        }
    }
}

fn paint_tooltip(painter: &Painter, screen: &SankeyLayout, hovered: Hovered, pointer: Pos2, clip: Rect) {
    let galley = painter.layout_no_wrap(tooltip_text(screen, hovered), FontId::default(), Color32::WHITE);
    let size = galley.size() + Vec2::splat(16.0);

    let mut origin = pointer + Vec2::new(14.0, 14.0);
    if origin.x + size.x > clip.right() {
        origin.x = pointer.x - size.x - 14.0;
    }
    if origin.y + size.y > clip.bottom() {
        origin.y = pointer.y - size.y - 14.0;
    }

    let tooltip_rect = Rect::from_min_size(origin, size);
    painter.rect_filled(tooltip_rect, 4.0, Color32::from_rgba_unmultiplied(20, 20, 30, 230));
    painter.galley(origin + Vec2::splat(8.0), galley, Color32::WHITE);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::flows::{FlowCollection, seed_flows};

    fn seed_layout() -> SankeyLayout {
        let data = FlowCollection::from_records(seed_flows()).chart_data();
        layout::compute(&data, &ChartOptions::default(), Vec2::new(1000.0, 500.0)).unwrap()
    }

    #[test]
    fn tooltip_describes_links_and_nodes() {
        let layout = seed_layout();
        assert_eq!(tooltip_text(&layout, Hovered::Link(1)), "Applications → Rejected: 20");
        assert_eq!(tooltip_text(&layout, Hovered::Node(0)), "Applications: 25");
    }

    #[test]
    fn hovering_highlights_connected_links() {
        let layout = seed_layout();
        let options = ChartOptions::default();
        let base = options.link_opacity;
        assert_eq!(link_alpha(&options, 0, &layout, None), base);
        // Node 1 is Interviews: touches links 0 and 2 but not 1.
        assert!(link_alpha(&options, 0, &layout, Some(Hovered::Node(1))) > base);
        assert!(link_alpha(&options, 1, &layout, Some(Hovered::Node(1))) < base);
        assert!(link_alpha(&options, 2, &layout, Some(Hovered::Link(2))) > base);
    }
}
