//! PNG export of the rendered diagram.
//!
//! The diagram is rendered to SVG, rasterized with resvg onto an opaque white
//! surface and written to `sankey-diagram.png`. Rasterizing and writing run on
//! a background thread; the UI polls an [`ExportJob`] for the outcome.

use std::path::{Path, PathBuf};
use std::sync::mpsc::{self, Receiver, TryRecvError};

use egui::Color32;
use resvg::tiny_skia::{self, Pixmap, Transform};
use thiserror::Error;

use super::layout::SankeyLayout;
use super::options::ChartOptions;
use super::svg;

/// Name of the exported file.
pub const EXPORT_FILE_NAME: &str = "sankey-diagram.png";

/// Background painted under the diagram so the PNG has no transparency.
pub const EXPORT_BACKGROUND: Color32 = Color32::WHITE;

#[derive(Debug, Error)]
pub enum ExportError {
    #[error("Nothing to export")]
    Empty,

    #[error("Export scale must be greater than zero (got {0})")]
    InvalidScale(f32),

    #[error("Could not parse generated SVG: {0}")]
    Svg(String),

    #[error("Could not allocate a {width}x{height} image")]
    Surface { width: u32, height: u32 },

    #[error("Could not encode PNG: {0}")]
    Encode(String),

    #[error("Could not write {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Export worker stopped unexpectedly")]
    Disconnected,
}

/// Everything the export worker needs; owned so it can cross threads.
#[derive(Debug, Clone)]
pub struct ExportRequest {
    pub layout: SankeyLayout,
    pub options: ChartOptions,
    /// Pixels per layout point.
    pub scale: f32,
    pub directory: PathBuf,
}

impl ExportRequest {
    pub fn output_path(&self) -> PathBuf {
        self.directory.join(EXPORT_FILE_NAME)
    }
}

/// Where exports go: the configured directory, else Downloads, else `.`.
pub fn export_directory(configured: Option<&Path>) -> PathBuf {
    configured
        .map(Path::to_path_buf)
        .or_else(dirs::download_dir)
        .unwrap_or_else(|| PathBuf::from("."))
}

fn render_pixmap(
    layout: &SankeyLayout,
    options: &ChartOptions,
    scale: f32,
) -> Result<Pixmap, ExportError> {
    if layout.is_empty() {
        return Err(ExportError::Empty);
    }
    if !(scale.is_finite() && scale > 0.0) {
        return Err(ExportError::InvalidScale(scale));
    }

    let document = svg::render(layout, options, EXPORT_BACKGROUND);

    let mut usvg_options = resvg::usvg::Options::default();
    usvg_options.fontdb_mut().load_system_fonts();
    let tree = resvg::usvg::Tree::from_str(&document, &usvg_options)
        .map_err(|e| ExportError::Svg(e.to_string()))?;

    let size = tree.size().to_int_size();
    let width = ((size.width() as f32) * scale).ceil().max(1.0) as u32;
    let height = ((size.height() as f32) * scale).ceil().max(1.0) as u32;

    let mut pixmap = Pixmap::new(width, height).ok_or(ExportError::Surface { width, height })?;
    pixmap.fill(tiny_skia::Color::from_rgba8(
        EXPORT_BACKGROUND.r(),
        EXPORT_BACKGROUND.g(),
        EXPORT_BACKGROUND.b(),
        255,
    ));
    resvg::render(&tree, Transform::from_scale(scale, scale), &mut pixmap.as_mut());
    Ok(pixmap)
}

/// Rasterize `layout` and return the PNG bytes.
pub fn render_png(
    layout: &SankeyLayout,
    options: &ChartOptions,
    scale: f32,
) -> Result<Vec<u8>, ExportError> {
    render_pixmap(layout, options, scale)?
        .encode_png()
        .map_err(|e| ExportError::Encode(e.to_string()))
}

/// Render and write the PNG described by `request`.
pub fn write_png(request: &ExportRequest) -> Result<PathBuf, ExportError> {
    let png = render_png(&request.layout, &request.options, request.scale)?;
    let path = request.output_path();
    std::fs::create_dir_all(&request.directory).map_err(|source| ExportError::Io {
        path: request.directory.clone(),
        source,
    })?;
    std::fs::write(&path, png).map_err(|source| ExportError::Io {
        path: path.clone(),
        source,
    })?;
    Ok(path)
}

/// A running export on a background thread.
pub struct ExportJob {
    receiver: Receiver<Result<PathBuf, ExportError>>,
}

impl ExportJob {
    pub fn spawn(request: ExportRequest) -> Self {
        let (tx, rx) = mpsc::channel();
        std::thread::spawn(move || {
            let result = write_png(&request);
            let _ = tx.send(result);
        });
        Self { receiver: rx }
    }

    /// Outcome of the export, once it has finished.
    pub fn poll(&self) -> Option<Result<PathBuf, ExportError>> {
        match self.receiver.try_recv() {
            Ok(result) => Some(result),
            Err(TryRecvError::Empty) => None,
            Err(TryRecvError::Disconnected) => Some(Err(ExportError::Disconnected)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::flows::{FlowCollection, seed_flows};
    use crate::sankey::layout;
    use egui::Vec2;
    use std::time::{Duration, Instant};

    const PNG_SIGNATURE: [u8; 8] = [0x89, b'P', b'N', b'G', 0x0d, 0x0a, 0x1a, 0x0a];

    fn seed_layout() -> SankeyLayout {
        let data = FlowCollection::from_records(seed_flows()).chart_data();
        layout::compute(&data, &ChartOptions::default(), Vec2::new(600.0, 300.0)).unwrap()
    }

    #[test]
    fn png_has_signature() {
        let png = render_png(&seed_layout(), &ChartOptions::default(), 1.0).unwrap();
        assert_eq!(png[..8], PNG_SIGNATURE);
    }

    #[test]
    fn background_is_opaque_white() {
        let pixmap = render_pixmap(&seed_layout(), &ChartOptions::default(), 2.0).unwrap();
        assert_eq!(pixmap.width(), 1200);
        assert_eq!(pixmap.height(), 600);
        let corner = pixmap.pixel(0, 0).unwrap();
        assert_eq!(
            (corner.red(), corner.green(), corner.blue(), corner.alpha()),
            (255, 255, 255, 255)
        );
    }

    #[test]
    fn empty_layout_is_not_rasterized() {
        let data = FlowCollection::new().chart_data();
        let empty = layout::compute(&data, &ChartOptions::default(), Vec2::new(600.0, 300.0)).unwrap();
        assert!(matches!(
            render_png(&empty, &ChartOptions::default(), 1.0),
            Err(ExportError::Empty)
        ));
    }

    #[test]
    fn invalid_scale_is_rejected() {
        assert!(matches!(
            render_png(&seed_layout(), &ChartOptions::default(), 0.0),
            Err(ExportError::InvalidScale(_))
        ));
    }

    #[test]
    fn configured_directory_wins() {
        let dir = Path::new("/tmp/sankey-exports");
        assert_eq!(export_directory(Some(dir)), dir.to_path_buf());
    }

    #[test]
    fn job_writes_fixed_file_name() {
        let dir = tempfile::tempdir().unwrap();
        let job = ExportJob::spawn(ExportRequest {
            layout: seed_layout(),
            options: ChartOptions::default(),
            scale: 1.0,
            directory: dir.path().to_path_buf(),
        });

        let deadline = Instant::now() + Duration::from_secs(30);
        let result = loop {
            if let Some(result) = job.poll() {
                break result;
            }
            assert!(Instant::now() < deadline, "export did not finish");
            std::thread::sleep(Duration::from_millis(10));
        };

        let path = result.unwrap();
        assert_eq!(path, dir.path().join(EXPORT_FILE_NAME));
        let bytes = std::fs::read(&path).unwrap();
        assert_eq!(bytes[..8], PNG_SIGNATURE);
    }
}
