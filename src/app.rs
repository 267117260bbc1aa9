//! Main application state and UI.

use crate::flows::{FlowCollection, FlowDraft, FlowId};
use crate::sankey::export::{self, ExportJob, ExportRequest};
use crate::sankey::options::{BlendMode, NodeAlign};
use crate::sankey::palette::ColorScheme;
use crate::sankey::{LayoutError, SankeyLayout, render_sankey};
use crate::settings::Settings;
use crate::storage::{self, FlowStore, JsonFileStore, MemoryStore};
use crate::theme;
use chrono::{DateTime, Local};
use eframe::egui::{self, Color32};
use std::time::{Duration, Instant};

/// Severity of the status line
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusKind {
    Info,
    Success,
    Error,
}

impl StatusKind {
    fn color(&self) -> Color32 {
        match self {
            StatusKind::Info => theme::state::INFO,
            StatusKind::Success => theme::state::SUCCESS,
            StatusKind::Error => theme::state::ERROR,
        }
    }
}

/// Message shown under the toolbar
#[derive(Debug, Clone)]
pub struct Status {
    pub kind: StatusKind,
    pub message: String,
    pub at: DateTime<Local>,
}

/// Main editor application
pub struct SankeyApp {
    // Data
    store: Box<dyn FlowStore>,
    flows: FlowCollection,
    draft: FlowDraft,

    // Chart of the last frame, in chart-local coordinates
    last_layout: Option<Result<SankeyLayout, LayoutError>>,

    // Export
    export_job: Option<ExportJob>,
    pixels_per_point: f32,

    // Status line
    status: Option<Status>,

    // Settings persistence
    settings: Settings,
    settings_dirty: bool,
    last_settings_save: Instant,
}

impl SankeyApp {
    pub fn new(cc: &eframe::CreationContext<'_>) -> Self {
        theme::apply(&cc.egui_ctx);

        let store: Box<dyn FlowStore> = match JsonFileStore::default_location() {
            Some(store) => {
                tracing::info!("Using flow storage at {:?}", store.path());
                Box::new(store)
            }
            None => {
                tracing::warn!("Could not determine config directory, flows will not be kept");
                Box::new(MemoryStore::new())
            }
        };

        Self::with_store(store, Settings::load())
    }

    /// Build the app around an explicit storage port.
    pub fn with_store(store: Box<dyn FlowStore>, settings: Settings) -> Self {
        let records = storage::load_or_seed(store.as_ref());
        let mut app = Self {
            store,
            flows: FlowCollection::from_records(records),
            draft: FlowDraft::default(),
            last_layout: None,
            export_job: None,
            pixels_per_point: 1.0,
            status: None,
            settings,
            settings_dirty: false,
            last_settings_save: Instant::now(),
        };
        // The seed is only in memory on first launch
        app.persist();
        app
    }

    pub fn flows(&self) -> &FlowCollection {
        &self.flows
    }

    #[cfg(test)]
    pub fn draft_mut(&mut self) -> &mut FlowDraft {
        &mut self.draft
    }

    pub fn status(&self) -> Option<&Status> {
        self.status.as_ref()
    }

    pub fn is_exporting(&self) -> bool {
        self.export_job.is_some()
    }

    fn set_status(&mut self, kind: StatusKind, message: impl Into<String>) {
        self.status = Some(Status {
            kind,
            message: message.into(),
            at: Local::now(),
        });
    }

    /// Write the collection to the storage slot.
    fn persist(&mut self) {
        let records = self.flows.to_records();
        if let Err(e) = self.store.save(&records) {
            tracing::error!("Failed to save flows: {}", e);
            self.set_status(StatusKind::Error, format!("Could not save flows: {}", e));
        }
    }

    /// Turn the input panel into a new flow.
    pub fn add_flow(&mut self) -> Option<FlowId> {
        match self.draft.submit(&mut self.flows) {
            Ok(id) => {
                self.persist();
                Some(id)
            }
            Err(e) => {
                self.set_status(StatusKind::Error, e.to_string());
                None
            }
        }
    }

    /// Delete the flow with `id`, the row the user clicked.
    pub fn delete_flow(&mut self, id: FlowId) {
        if self.flows.remove(id).is_some() {
            self.persist();
        }
    }

    /// Delete the flow at list position `index`.
    #[cfg(test)]
    pub fn delete_flow_at(&mut self, index: usize) {
        if self.flows.remove_at(index).is_some() {
            self.persist();
        }
    }

    /// Start exporting the chart drawn on the last frame.
    pub fn request_export(&mut self) {
        if self.export_job.is_some() {
            return;
        }
        if self.flows.is_empty() {
            self.set_status(StatusKind::Info, "Nothing to export, add some flows first");
            return;
        }

        let layout = match &self.last_layout {
            Some(Ok(layout)) if !layout.is_empty() => layout.clone(),
            Some(Err(e)) => {
                let message = format!("Cannot export: {}", e);
                self.set_status(StatusKind::Error, message);
                return;
            }
            _ => {
                self.set_status(StatusKind::Info, "Chart not rendered yet, try again");
                return;
            }
        };

        let request = ExportRequest {
            layout,
            options: self.settings.chart.clone(),
            scale: self.settings.export_scale * self.pixels_per_point,
            directory: export::export_directory(self.settings.export_dir.as_deref()),
        };
        tracing::info!("Exporting diagram to {:?}", request.output_path());
        self.export_job = Some(ExportJob::spawn(request));
        self.set_status(StatusKind::Info, "Exporting…");
    }

    /// Pick up the result of a finished export.
    pub fn poll_export(&mut self) {
        let Some(result) = self.export_job.as_ref().and_then(ExportJob::poll) else {
            return;
        };
        self.export_job = None;
        match result {
            Ok(path) => {
                tracing::info!("Exported diagram to {:?}", path);
                self.set_status(StatusKind::Success, format!("Saved {}", path.display()));
            }
            Err(e) => {
                tracing::error!("Export failed: {}", e);
                self.set_status(StatusKind::Error, format!("Export failed: {}", e));
            }
        }
    }

    /// Mark settings as needing to be saved
    fn mark_settings_dirty(&mut self) {
        self.settings_dirty = true;
    }

    /// Save settings if dirty and enough time has passed (debounce)
    fn maybe_save_settings(&mut self) {
        if self.settings_dirty && self.last_settings_save.elapsed().as_secs() >= 2 {
            self.settings.save();
            self.settings_dirty = false;
            self.last_settings_save = Instant::now();
        }
    }

    fn render_toolbar(&mut self, ui: &mut egui::Ui) {
        ui.horizontal(|ui| {
            ui.heading("Sankey Flows");
            ui.separator();

            let export_button = ui.add_enabled(
                !self.is_exporting(),
                egui::Button::new(if self.is_exporting() { "Exporting…" } else { "Export PNG" }),
            );
            if export_button.clicked() {
                self.request_export();
            }

            if let Some(Ok(layout)) = &self.last_layout {
                if !layout.is_empty() {
                    ui.separator();
                    ui.colored_label(
                        theme::text::MUTED,
                        format!("{} nodes · {} columns", layout.nodes.len(), layout.columns),
                    );
                }
            }

            if let Some(status) = self.status() {
                ui.separator();
                ui.colored_label(
                    status.kind.color(),
                    format!("[{}] {}", status.at.format("%H:%M:%S"), status.message),
                );
            }
        });
    }

    fn render_input_panel(&mut self, ui: &mut egui::Ui) {
        ui.heading("Add flow");
        ui.add_space(6.0);

        let mut submitted = false;
        egui::Grid::new("flow_input").num_columns(2).spacing([8.0, 6.0]).show(ui, |ui| {
            for (label, hint, field) in [
                ("Source", "e.g. Applications", &mut self.draft.source),
                ("Target", "e.g. Interviews", &mut self.draft.target),
                ("Value", "e.g. 5", &mut self.draft.value),
            ] {
                ui.label(label);
                let response = ui.add(egui::TextEdit::singleline(field).hint_text(hint));
                if response.lost_focus() && ui.input(|i| i.key_pressed(egui::Key::Enter)) {
                    submitted = true;
                }
                ui.end_row();
            }
        });

        ui.add_space(4.0);
        if ui
            .add_enabled(!self.draft.is_blank(), egui::Button::new("➕ Add"))
            .clicked()
        {
            submitted = true;
        }
        if submitted {
            self.add_flow();
        }
    }

    fn render_flow_list(&mut self, ui: &mut egui::Ui) {
        ui.heading(format!("Flows ({})", self.flows.len()));
        ui.add_space(6.0);

        if self.flows.is_empty() {
            ui.colored_label(theme::text::MUTED, "No flows yet");
            return;
        }

        let mut to_delete = None;
        egui::ScrollArea::vertical()
            .id_salt("flow_list")
            .max_height(320.0)
            .show(ui, |ui| {
                for (id, record) in self.flows.iter() {
                    ui.push_id(id.0, |ui| {
                        egui::Frame::none()
                            .fill(theme::bg::SURFACE)
                            .rounding(4.0)
                            .inner_margin(egui::Margin::symmetric(8.0, 4.0))
                            .show(ui, |ui| {
                                ui.horizontal(|ui| {
                                    ui.label(record.describe());
                                    ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                                        if ui.small_button("✕").on_hover_text("Delete flow").clicked() {
                                            to_delete = Some(id);
                                        }
                                    });
                                });
                            });
                    });
                    ui.add_space(2.0);
                }
            });

        if let Some(id) = to_delete {
            self.delete_flow(id);
        }
    }

    fn render_chart_options(&mut self, ui: &mut egui::Ui) {
        let before = self.settings.clone();
        let chart = &mut self.settings.chart;

        egui::CollapsingHeader::new("Chart options")
            .default_open(self.settings.show_chart_options)
            .show(ui, |ui| {
                ui.add(egui::Slider::new(&mut chart.node_thickness, 4.0..=48.0).text("Node thickness"));
                ui.add(egui::Slider::new(&mut chart.node_spacing, 0.0..=64.0).text("Node spacing"));
                ui.add(egui::Slider::new(&mut chart.node_inner_padding, 0.0..=10.0).text("Node padding"));
                ui.add(egui::Slider::new(&mut chart.link_opacity, 0.05..=1.0).text("Link opacity"));
                ui.checkbox(&mut chart.enable_link_gradient, "Link gradient");
                ui.checkbox(&mut chart.enable_labels, "Labels");

                egui::ComboBox::from_label("Alignment")
                    .selected_text(chart.align.label())
                    .show_ui(ui, |ui| {
                        for align in NodeAlign::all() {
                            ui.selectable_value(&mut chart.align, *align, align.label());
                        }
                    });

                egui::ComboBox::from_label("Colors")
                    .selected_text(chart.colors.label())
                    .show_ui(ui, |ui| {
                        for scheme in ColorScheme::all() {
                            ui.selectable_value(&mut chart.colors, *scheme, scheme.label());
                        }
                    });

                let mut multiply = chart.link_blend_mode == BlendMode::Multiply;
                if ui.checkbox(&mut multiply, "Multiply blend (export)").changed() {
                    chart.link_blend_mode = if multiply { BlendMode::Multiply } else { BlendMode::Normal };
                }

                ui.add(egui::Slider::new(&mut self.settings.export_scale, 1.0..=4.0).text("Export scale"));

                if ui.button("Reset chart options").clicked() {
                    *chart = Default::default();
                }
            });

        if self.settings != before {
            self.mark_settings_dirty();
        }
    }
}

impl eframe::App for SankeyApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        self.pixels_per_point = ctx.pixels_per_point();
        self.poll_export();
        if self.is_exporting() {
            ctx.request_repaint_after(Duration::from_millis(100));
        }

        egui::TopBottomPanel::top("toolbar").show(ctx, |ui| {
            ui.add_space(4.0);
            self.render_toolbar(ui);
            ui.add_space(4.0);
        });

        egui::SidePanel::left("editor")
            .default_width(320.0)
            .resizable(true)
            .show(ctx, |ui| {
                ui.add_space(8.0);
                self.render_input_panel(ui);
                ui.separator();
                self.render_flow_list(ui);
                ui.separator();
                self.render_chart_options(ui);
            });

        egui::CentralPanel::default().show(ctx, |ui| {
            let data = self.flows().chart_data();
            let size = ui.available_size();
            let output = render_sankey(ui, &data, &self.settings.chart, size);
            let mut export_clicked = false;
            output.response.context_menu(|ui| {
                if ui.button("Export PNG").clicked() {
                    export_clicked = true;
                    ui.close_menu();
                }
            });
            self.last_layout = Some(output.layout);
            if export_clicked {
                self.request_export();
            }
        });

        self.maybe_save_settings();
    }

    fn on_exit(&mut self, _gl: Option<&eframe::glow::Context>) {
        if self.settings_dirty {
            self.settings.save();
        }
    }
}

#[cfg(test)]
#[path = "app_tests.rs"]
mod tests;
