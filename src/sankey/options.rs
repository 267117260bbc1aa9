//! Presentation options for the diagram.

use serde::{Deserialize, Serialize};

use super::palette::ColorScheme;

/// Space reserved around the diagram, in points.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Margin {
    pub top: f32,
    pub right: f32,
    pub bottom: f32,
    pub left: f32,
}

impl Default for Margin {
    fn default() -> Self {
        Self {
            top: 40.0,
            right: 160.0,
            bottom: 40.0,
            left: 50.0,
        }
    }
}

/// Which column a node lands in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum NodeAlign {
    /// Longest path from a source; sinks pushed to the last column.
    #[default]
    Justify,
    /// Longest path from a source.
    Left,
    /// Longest path to a sink, counted from the last column.
    Right,
}

impl NodeAlign {
    pub fn label(&self) -> &'static str {
        match self {
            NodeAlign::Justify => "Justify",
            NodeAlign::Left => "Left",
            NodeAlign::Right => "Right",
        }
    }

    pub fn all() -> &'static [NodeAlign] {
        &[NodeAlign::Justify, NodeAlign::Left, NodeAlign::Right]
    }
}

/// How overlapping link bands are composited.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum BlendMode {
    Normal,
    #[default]
    Multiply,
}

impl BlendMode {
    /// Value for the CSS `mix-blend-mode` property.
    pub fn css(&self) -> &'static str {
        match self {
            BlendMode::Normal => "normal",
            BlendMode::Multiply => "multiply",
        }
    }
}

/// All knobs the diagram renderer reads.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ChartOptions {
    pub margin: Margin,
    pub align: NodeAlign,
    pub colors: ColorScheme,
    pub node_opacity: f32,
    pub node_thickness: f32,
    pub node_inner_padding: f32,
    pub node_spacing: f32,
    pub node_border_width: f32,
    /// Darkening applied to the node color for its border.
    pub node_border_darker: f32,
    pub link_opacity: f32,
    pub link_blend_mode: BlendMode,
    pub enable_link_gradient: bool,
    pub enable_labels: bool,
    pub label_padding: f32,
}

impl Default for ChartOptions {
    fn default() -> Self {
        Self {
            margin: Margin::default(),
            align: NodeAlign::Justify,
            colors: ColorScheme::Category10,
            node_opacity: 1.0,
            node_thickness: 18.0,
            node_inner_padding: 3.0,
            node_spacing: 24.0,
            node_border_width: 0.0,
            node_border_darker: 0.8,
            link_opacity: 0.5,
            link_blend_mode: BlendMode::Multiply,
            enable_link_gradient: true,
            enable_labels: true,
            label_padding: 9.0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_options_fill_in_defaults() {
        let options: ChartOptions =
            serde_json::from_str(r#"{"node_thickness": 12.0, "enable_link_gradient": false}"#)
                .unwrap();
        assert_eq!(options.node_thickness, 12.0);
        assert!(!options.enable_link_gradient);
        assert_eq!(options.margin, Margin::default());
        assert_eq!(options.link_blend_mode, BlendMode::Multiply);
    }
}
