//! Column layout for Sankey diagrams.
//!
//! Follows the d3-sankey placement rules without the iterative relaxation
//! pass: nodes are assigned to columns by longest path, stacked in input
//! order and spread over the leftover vertical space, and link bands are
//! stacked on each node ordered by the vertical position of the other end.

use std::collections::HashMap;

use egui::{Color32, Pos2, Rect, Vec2};
use petgraph::Direction;
use petgraph::algo::toposort;
use petgraph::graph::{DiGraph, NodeIndex};
use thiserror::Error;

use super::options::{ChartOptions, NodeAlign};
use crate::flows::SankeyData;

/// Curve samples per link band when drawing or hit-testing.
pub const LINK_SEGMENTS: usize = 24;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum LayoutError {
    #[error("Flows form a cycle through '{node}'")]
    Cycle { node: String },

    #[error("Flow refers to unknown node '{0}'")]
    UnknownNode(String),

    #[error("Flow values through '{node}' are too large to draw")]
    ValueOverflow { node: String },

    #[error("Chart area is too small ({width:.0}×{height:.0})")]
    AreaTooSmall { width: f32, height: f32 },
}

/// A node after layout.
#[derive(Debug, Clone, PartialEq)]
pub struct LaidOutNode {
    pub id: String,
    pub value: f64,
    pub column: usize,
    /// Full extent; link bands attach to this.
    pub rect: Rect,
    pub color: Color32,
}

impl LaidOutNode {
    /// Labels go right of the node except in the last column.
    pub fn label_on_right(&self, columns: usize) -> bool {
        columns <= 1 || self.column + 1 < columns
    }

    /// Rect drawn on screen, shrunk vertically by the inner padding.
    pub fn visible_rect(&self, inner_padding: f32) -> Rect {
        let pad = inner_padding.min(self.rect.height() / 2.0).max(0.0);
        Rect::from_min_max(
            Pos2::new(self.rect.left(), self.rect.top() + pad),
            Pos2::new(self.rect.right(), self.rect.bottom() - pad),
        )
    }
}

/// A link band after layout.
#[derive(Debug, Clone, PartialEq)]
pub struct LaidOutLink {
    /// Position of the flow in the input data.
    pub index: usize,
    pub source: usize,
    pub target: usize,
    pub value: f64,
    /// Band thickness.
    pub width: f32,
    /// Centerline at the source side.
    pub start: Pos2,
    /// Centerline at the target side.
    pub end: Pos2,
}

impl LaidOutLink {
    /// Control points of the horizontal cubic centerline.
    pub fn control_points(&self) -> [Pos2; 4] {
        let mid_x = (self.start.x + self.end.x) / 2.0;
        [
            self.start,
            Pos2::new(mid_x, self.start.y),
            Pos2::new(mid_x, self.end.y),
            self.end,
        ]
    }

    /// Centerline sampled into `segments + 1` points.
    pub fn sample(&self, segments: usize) -> Vec<Pos2> {
        let [p0, p1, p2, p3] = self.control_points();
        let segments = segments.max(1);
        (0..=segments)
            .map(|i| {
                let t = i as f32 / segments as f32;
                let u = 1.0 - t;
                let v = p0.to_vec2() * (u * u * u)
                    + p1.to_vec2() * (3.0 * u * u * t)
                    + p2.to_vec2() * (3.0 * u * t * t)
                    + p3.to_vec2() * (t * t * t);
                v.to_pos2()
            })
            .collect()
    }

    /// Whether `pos` lies inside the band.
    pub fn contains(&self, pos: Pos2) -> bool {
        let half = (self.width / 2.0).max(2.0);
        self.sample(LINK_SEGMENTS)
            .windows(2)
            .any(|w| distance_to_segment(pos, w[0], w[1]) <= half)
    }
}

fn distance_to_segment(p: Pos2, a: Pos2, b: Pos2) -> f32 {
    let ab = b - a;
    let len_sq = ab.length_sq();
    if len_sq == 0.0 {
        return p.distance(a);
    }
    let t = ((p - a).dot(ab) / len_sq).clamp(0.0, 1.0);
    p.distance(a + ab * t)
}

/// Positioned nodes and links, ready to draw.
#[derive(Debug, Clone, PartialEq)]
pub struct SankeyLayout {
    /// Whole chart area including margins.
    pub bounds: Rect,
    pub nodes: Vec<LaidOutNode>,
    pub links: Vec<LaidOutLink>,
    pub columns: usize,
}

impl SankeyLayout {
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Move everything by `offset`, e.g. from layout space to screen space.
    pub fn translated(&self, offset: Vec2) -> Self {
        let mut out = self.clone();
        out.bounds = out.bounds.translate(offset);
        for node in &mut out.nodes {
            node.rect = node.rect.translate(offset);
        }
        for link in &mut out.links {
            link.start += offset;
            link.end += offset;
        }
        out
    }

    pub fn node_at(&self, pos: Pos2) -> Option<usize> {
        self.nodes.iter().position(|n| n.rect.contains(pos))
    }

    /// Topmost link band under `pos` (later links draw on top).
    pub fn link_at(&self, pos: Pos2) -> Option<usize> {
        self.links.iter().rposition(|l| l.contains(pos))
    }
}

/// Lay out `data` inside a `size` area with the given options.
pub fn compute(
    data: &SankeyData,
    options: &ChartOptions,
    size: Vec2,
) -> Result<SankeyLayout, LayoutError> {
    let bounds = Rect::from_min_size(Pos2::ZERO, size);
    if data.nodes.is_empty() {
        return Ok(SankeyLayout {
            bounds,
            nodes: Vec::new(),
            links: Vec::new(),
            columns: 0,
        });
    }

    let margin = options.margin;
    let inner = Rect::from_min_max(
        Pos2::new(margin.left, margin.top),
        Pos2::new(size.x - margin.right, size.y - margin.bottom),
    );
    if inner.width() < options.node_thickness || inner.height() <= 0.0 {
        return Err(LayoutError::AreaTooSmall {
            width: size.x,
            height: size.y,
        });
    }

    // Graph
    let mut graph: DiGraph<usize, usize> = DiGraph::new();
    let mut index_of: HashMap<&str, NodeIndex> = HashMap::new();
    for (i, node) in data.nodes.iter().enumerate() {
        index_of.insert(node.id.as_str(), graph.add_node(i));
    }
    for (i, link) in data.links.iter().enumerate() {
        let source = *index_of
            .get(link.source.as_str())
            .ok_or_else(|| LayoutError::UnknownNode(link.source.clone()))?;
        let target = *index_of
            .get(link.target.as_str())
            .ok_or_else(|| LayoutError::UnknownNode(link.target.clone()))?;
        if source == target {
            return Err(LayoutError::Cycle {
                node: link.source.clone(),
            });
        }
        graph.add_edge(source, target, i);
    }

    let order = toposort(&graph, None).map_err(|cycle| LayoutError::Cycle {
        node: data.nodes[graph[cycle.node_id()]].id.clone(),
    })?;

    // Depth from sources and height from sinks
    let n = data.nodes.len();
    let mut depth = vec![0usize; n];
    for &ix in &order {
        let d = graph
            .neighbors_directed(ix, Direction::Incoming)
            .map(|p| depth[graph[p]] + 1)
            .max()
            .unwrap_or(0);
        depth[graph[ix]] = d;
    }
    let mut height = vec![0usize; n];
    for &ix in order.iter().rev() {
        let h = graph
            .neighbors_directed(ix, Direction::Outgoing)
            .map(|c| height[graph[c]] + 1)
            .max()
            .unwrap_or(0);
        height[graph[ix]] = h;
    }
    let last_column = depth.iter().copied().max().unwrap_or(0);
    let columns = last_column + 1;

    let column: Vec<usize> = (0..n)
        .map(|i| {
            let has_outgoing = graph
                .neighbors_directed(NodeIndex::new(i), Direction::Outgoing)
                .next()
                .is_some();
            match options.align {
                NodeAlign::Left => depth[i],
                NodeAlign::Right => last_column.saturating_sub(height[i]),
                NodeAlign::Justify if has_outgoing => depth[i],
                NodeAlign::Justify => last_column,
            }
        })
        .collect();

    // Node values
    let mut incoming = vec![0.0f64; n];
    let mut outgoing = vec![0.0f64; n];
    for link in &data.links {
        outgoing[graph[index_of[link.source.as_str()]]] += link.value;
        incoming[graph[index_of[link.target.as_str()]]] += link.value;
    }
    let values: Vec<f64> = (0..n).map(|i| incoming[i].max(outgoing[i])).collect();
    if let Some(i) = values.iter().position(|v| !v.is_finite()) {
        return Err(LayoutError::ValueOverflow {
            node: data.nodes[i].id.clone(),
        });
    }

    // Vertical scale shared by every column
    let mut by_column: Vec<Vec<usize>> = vec![Vec::new(); columns];
    for i in 0..n {
        by_column[column[i]].push(i);
    }
    let tallest = by_column.iter().map(Vec::len).max().unwrap_or(1);
    let padding = if tallest > 1 {
        options.node_spacing.min(inner.height() / (tallest - 1) as f32)
    } else {
        options.node_spacing
    };
    for nodes in &by_column {
        let total: f64 = nodes.iter().map(|&i| values[i]).sum();
        if !total.is_finite() {
            return Err(LayoutError::ValueOverflow {
                node: data.nodes[nodes[0]].id.clone(),
            });
        }
    }
    let ky = by_column
        .iter()
        .filter_map(|nodes| {
            let total: f64 = nodes.iter().map(|&i| values[i]).sum();
            if total > 0.0 {
                let room = inner.height() - (nodes.len().saturating_sub(1)) as f32 * padding;
                Some(room as f64 / total)
            } else {
                None
            }
        })
        .fold(f64::INFINITY, f64::min);
    let ky = if ky.is_finite() { ky.max(0.0) } else { 0.0 };

    // Node rects
    let column_step = if columns > 1 {
        (inner.width() - options.node_thickness) / (columns - 1) as f32
    } else {
        0.0
    };
    let mut top = vec![0.0f32; n];
    let mut bottom = vec![0.0f32; n];
    for nodes in &by_column {
        let mut y = inner.top();
        for &i in nodes {
            top[i] = y;
            bottom[i] = y + (values[i] * ky) as f32;
            y = bottom[i] + padding;
        }
        let spare = (inner.bottom() - y + padding) / (nodes.len() + 1) as f32;
        for (k, &i) in nodes.iter().enumerate() {
            let shift = spare * (k + 1) as f32;
            top[i] += shift;
            bottom[i] += shift;
        }
    }

    let nodes: Vec<LaidOutNode> = data
        .nodes
        .iter()
        .enumerate()
        .map(|(i, node)| {
            let x = inner.left() + column[i] as f32 * column_step;
            LaidOutNode {
                id: node.id.clone(),
                value: values[i],
                column: column[i],
                rect: Rect::from_min_max(
                    Pos2::new(x, top[i]),
                    Pos2::new(x + options.node_thickness, bottom[i]),
                ),
                color: options.colors.color(i),
            }
        })
        .collect();

    // Link bands, stacked per node by the position of the other end
    let endpoints: Vec<(usize, usize)> = data
        .links
        .iter()
        .map(|l| {
            (
                graph[index_of[l.source.as_str()]],
                graph[index_of[l.target.as_str()]],
            )
        })
        .collect();
    let widths: Vec<f32> = data.links.iter().map(|l| (l.value * ky) as f32).collect();
    let mut start_y = vec![0.0f32; data.links.len()];
    let mut end_y = vec![0.0f32; data.links.len()];

    for i in 0..n {
        let mut out_links: Vec<usize> = (0..endpoints.len()).filter(|&l| endpoints[l].0 == i).collect();
        out_links.sort_by(|&a, &b| {
            top[endpoints[a].1]
                .total_cmp(&top[endpoints[b].1])
                .then(a.cmp(&b))
        });
        let mut y = top[i];
        for l in out_links {
            start_y[l] = y + widths[l] / 2.0;
            y += widths[l];
        }

        let mut in_links: Vec<usize> = (0..endpoints.len()).filter(|&l| endpoints[l].1 == i).collect();
        in_links.sort_by(|&a, &b| {
            top[endpoints[a].0]
                .total_cmp(&top[endpoints[b].0])
                .then(a.cmp(&b))
        });
        let mut y = top[i];
        for l in in_links {
            end_y[l] = y + widths[l] / 2.0;
            y += widths[l];
        }
    }

    let links = data
        .links
        .iter()
        .enumerate()
        .map(|(l, link)| {
            let (source, target) = endpoints[l];
            LaidOutLink {
                index: l,
                source,
                target,
                value: link.value,
                width: widths[l],
                start: Pos2::new(nodes[source].rect.right(), start_y[l]),
                end: Pos2::new(nodes[target].rect.left(), end_y[l]),
            }
        })
        .collect();

    Ok(SankeyLayout {
        bounds,
        nodes,
        links,
        columns,
    })
}
