//! Unified theme and color constants for the editor.
//!
//! Panels use the dark palette; the chart itself sits on white so what is on
//! screen matches the exported PNG.

use egui::Color32;

/// Background colors for different layers
pub mod bg {
    use super::*;

    /// Panel backgrounds
    pub const PANEL: Color32 = Color32::from_rgb(20, 22, 28);

    /// Card/elevated surface backgrounds (flow list rows)
    pub const SURFACE: Color32 = Color32::from_rgb(28, 30, 38);
}

/// Chart area colors
pub mod chart {
    use super::*;

    pub const BACKGROUND: Color32 = Color32::WHITE;

    pub const LABEL: Color32 = Color32::from_rgb(51, 51, 51);

    pub const PLACEHOLDER: Color32 = Color32::from_rgb(150, 150, 160);
}

/// Text colors at different emphasis levels
pub mod text {
    use super::*;

    pub const PRIMARY: Color32 = Color32::from_rgb(240, 240, 245);

    pub const MUTED: Color32 = Color32::from_rgb(120, 125, 135);
}

/// Status line colors
pub mod state {
    use super::*;

    pub const SUCCESS: Color32 = Color32::from_rgb(34, 197, 94);

    pub const ERROR: Color32 = Color32::from_rgb(239, 68, 68);

    pub const INFO: Color32 = Color32::from_rgb(59, 130, 246);
}

/// Apply the panel palette to egui's visuals.
pub fn apply(ctx: &egui::Context) {
    let mut visuals = egui::Visuals::dark();
    visuals.panel_fill = bg::PANEL;
    visuals.extreme_bg_color = bg::SURFACE;
    visuals.override_text_color = Some(text::PRIMARY);
    ctx.set_visuals(visuals);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn chart_background_is_opaque_white() {
        // The export paints the same color, so the two must agree.
        assert_eq!(chart::BACKGROUND, crate::sankey::export::EXPORT_BACKGROUND);
        assert_eq!(chart::BACKGROUND.a(), 255);
    }
}
