//! Sankey diagram layout, drawing and export.

pub mod export;
pub mod layout;
pub mod options;
pub mod palette;
pub mod svg;
pub mod widget;

pub use layout::{LayoutError, SankeyLayout};
pub use options::ChartOptions;
pub use widget::render_sankey;
