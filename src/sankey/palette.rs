//! Categorical color schemes for diagram nodes.

use egui::Color32;
use serde::{Deserialize, Serialize};

const CATEGORY10: [Color32; 10] = [
    Color32::from_rgb(0x1f, 0x77, 0xb4),
    Color32::from_rgb(0xff, 0x7f, 0x0e),
    Color32::from_rgb(0x2c, 0xa0, 0x2c),
    Color32::from_rgb(0xd6, 0x27, 0x28),
    Color32::from_rgb(0x94, 0x67, 0xbd),
    Color32::from_rgb(0x8c, 0x56, 0x4b),
    Color32::from_rgb(0xe3, 0x77, 0xc2),
    Color32::from_rgb(0x7f, 0x7f, 0x7f),
    Color32::from_rgb(0xbc, 0xbd, 0x22),
    Color32::from_rgb(0x17, 0xbe, 0xcf),
];

const TABLEAU10: [Color32; 10] = [
    Color32::from_rgb(0x4e, 0x79, 0xa7),
    Color32::from_rgb(0xf2, 0x8e, 0x2c),
    Color32::from_rgb(0xe1, 0x57, 0x59),
    Color32::from_rgb(0x76, 0xb7, 0xb2),
    Color32::from_rgb(0x59, 0xa1, 0x4f),
    Color32::from_rgb(0xed, 0xc9, 0x49),
    Color32::from_rgb(0xaf, 0x7a, 0xa1),
    Color32::from_rgb(0xff, 0x9d, 0xa7),
    Color32::from_rgb(0x9c, 0x75, 0x5f),
    Color32::from_rgb(0xba, 0xb0, 0xab),
];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum ColorScheme {
    #[default]
    Category10,
    Tableau10,
}

impl ColorScheme {
    pub fn label(&self) -> &'static str {
        match self {
            ColorScheme::Category10 => "Category 10",
            ColorScheme::Tableau10 => "Tableau 10",
        }
    }

    pub fn all() -> &'static [ColorScheme] {
        &[ColorScheme::Category10, ColorScheme::Tableau10]
    }

    /// Color for the node at `index`, cycling through the scheme.
    pub fn color(&self, index: usize) -> Color32 {
        let colors = match self {
            ColorScheme::Category10 => &CATEGORY10,
            ColorScheme::Tableau10 => &TABLEAU10,
        };
        colors[index % colors.len()]
    }
}

/// Darken a color the way d3's `color.darker(k)` does.
pub fn darker(color: Color32, k: f32) -> Color32 {
    let factor = 0.7f32.powf(k);
    Color32::from_rgba_unmultiplied(
        (color.r() as f32 * factor).round() as u8,
        (color.g() as f32 * factor).round() as u8,
        (color.b() as f32 * factor).round() as u8,
        color.a(),
    )
}

/// Linear blend between two colors, `t` in 0..=1.
pub fn lerp_color(a: Color32, b: Color32, t: f32) -> Color32 {
    let t = t.clamp(0.0, 1.0);
    let mix = |x: u8, y: u8| (x as f32 + (y as f32 - x as f32) * t).round() as u8;
    Color32::from_rgba_unmultiplied(
        mix(a.r(), b.r()),
        mix(a.g(), b.g()),
        mix(a.b(), b.b()),
        mix(a.a(), b.a()),
    )
}

/// `#rrggbb` for SVG output.
pub fn to_hex(color: Color32) -> String {
    format!("#{:02x}{:02x}{:02x}", color.r(), color.g(), color.b())
}
