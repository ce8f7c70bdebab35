use crate::input::PointerHandle;
use crate::simulator::{Simulator, TickReport};
use crate::visualize::{RenderMode, Visualizer};
use eframe::egui;
use serde::{Deserialize, Serialize};

/// Viewer preferences that survive restarts through eframe storage.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ViewSettings {
    pub render_mode: RenderMode,
    pub cell_size: f32,
}

impl Default for ViewSettings {
    fn default() -> Self {
        Self {
            render_mode: RenderMode::Dye,
            cell_size: 3.0,
        }
    }
}

pub struct InteractiveApp {
    simulation: Simulator,
    pointer: PointerHandle,
    visualizer: Visualizer,
    texture: Option<egui::TextureHandle>,
    settings: ViewSettings,
    paused: bool,
    held_button: Option<u32>,
    relaxation_iterations: usize,
    resolution_scale: usize,
    base_width: usize,
    base_height: usize,
    last_report: Option<TickReport>,
}

impl InteractiveApp {
    pub fn new(simulation: Simulator, settings: ViewSettings) -> Self {
        let pointer = simulation.pointer();
        let relaxation_iterations = simulation.config().relaxation_iterations;
        let base_width = simulation.width();
        let base_height = simulation.height();
        Self {
            simulation,
            pointer,
            visualizer: Visualizer::new(settings.render_mode),
            texture: None,
            settings,
            paused: false,
            held_button: None,
            relaxation_iterations,
            resolution_scale: 1,
            base_width,
            base_height,
            last_report: None,
        }
    }

    fn change_resolution(&mut self, scale: usize) {
        if scale == self.resolution_scale {
            return;
        }
        let (width, height) = (self.base_width * scale, self.base_height * scale);
        match self.simulation.resize(width, height) {
            Ok(()) => {
                self.resolution_scale = scale;
                self.release_pointer();
            }
            Err(err) => log::error!("could not resize to {width}x{height}: {err}"),
        }
    }

    fn release_pointer(&mut self) {
        if self.held_button.take().is_some() {
            self.pointer.release();
        }
    }

    /// Screen position to grid space: bottom-left origin, y up. Positions
    /// outside the canvas pass through unclamped.
    fn to_grid(&self, rect: egui::Rect, pos: egui::Pos2) -> glam::Vec2 {
        let cell = self.settings.cell_size;
        glam::Vec2::new(
            (pos.x - rect.left()) / cell - 0.5,
            (rect.bottom() - pos.y) / cell - 0.5,
        )
    }

    fn track_pointer(&mut self, ui: &egui::Ui, rect: egui::Rect, response: &egui::Response) {
        let held = if response.is_pointer_button_down_on() {
            ui.input(|i| {
                if i.pointer.primary_down() {
                    Some(0)
                } else if i.pointer.secondary_down() {
                    Some(1)
                } else {
                    None
                }
            })
        } else {
            None
        };
        let pos = response.interact_pointer_pos();

        match (self.held_button, held, pos) {
            (None, Some(button), Some(pos)) => {
                self.pointer.press(button, self.to_grid(rect, pos));
                self.held_button = Some(button);
            }
            (Some(_), Some(_), Some(pos)) => self.pointer.move_to(self.to_grid(rect, pos)),
            (Some(_), None, _) => self.release_pointer(),
            _ => {}
        }
    }

    fn upload_frame(&mut self, ctx: &egui::Context) -> egui::TextureId {
        let grid = self.simulation.state();
        let image = egui::ColorImage::from_rgba_unmultiplied(
            [grid.width(), grid.height()],
            &self.visualizer.to_rgba8(grid),
        );
        if let Some(texture) = self.texture.as_mut() {
            texture.set(image, egui::TextureOptions::NEAREST);
            return texture.id();
        }
        let texture = ctx.load_texture("fluid", image, egui::TextureOptions::NEAREST);
        let id = texture.id();
        self.texture = Some(texture);
        id
    }
}

impl eframe::App for InteractiveApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        if ctx.input(|i| i.key_pressed(egui::Key::Space)) {
            self.settings.render_mode = self.settings.render_mode.toggled();
        }

        egui::CentralPanel::default().show(ctx, |ui| {
            ui.heading("dyeflow");

            ui.horizontal(|ui| {
                if ui.button("Pause/Resume").clicked() {
                    self.paused = !self.paused;
                }
                if ui.button("Reset").clicked() {
                    self.simulation.reset();
                }

                ui.radio_value(&mut self.settings.render_mode, RenderMode::Dye, "Dye");
                ui.radio_value(&mut self.settings.render_mode, RenderMode::Velocity, "Velocity");

                ui.add(egui::Slider::new(&mut self.settings.cell_size, 1.0..=8.0).text("Cell Size"));
                if ui
                    .add(egui::Slider::new(&mut self.relaxation_iterations, 1..=60).text("Jacobi sweeps"))
                    .changed()
                {
                    if let Err(err) = self
                        .simulation
                        .set_relaxation_iterations(self.relaxation_iterations)
                    {
                        log::warn!("ignoring sweep count: {err}");
                    }
                }
            });

            ui.horizontal(|ui| {
                ui.label("Resolution Scale:");
                for &scale in &[1, 2, 4] {
                    let is_current = self.resolution_scale == scale;
                    if ui.selectable_label(is_current, format!("{}x", scale)).clicked() {
                        self.change_resolution(scale);
                    }
                }
                ui.label(format!(
                    " ({}x{} cells)",
                    self.simulation.width(),
                    self.simulation.height()
                ));
            });

            ui.separator();

            let canvas = egui::Vec2::new(
                self.simulation.width() as f32 * self.settings.cell_size,
                self.simulation.height() as f32 * self.settings.cell_size,
            );
            let (rect, response) = ui.allocate_exact_size(canvas, egui::Sense::click_and_drag());

            self.track_pointer(ui, rect, &response);

            if !self.paused {
                self.last_report = Some(self.simulation.tick());
            }

            self.visualizer.mode = self.settings.render_mode;
            let texture_id = self.upload_frame(ctx);
            ui.painter().image(
                texture_id,
                rect,
                egui::Rect::from_min_max(egui::pos2(0.0, 0.0), egui::pos2(1.0, 1.0)),
                egui::Color32::WHITE,
            );

            let dt = self.last_report.map(|r| r.dt_ms).unwrap_or(0.0);
            ui.label(format!(
                "Tick: {} | dt: {:.1} ms | Left-drag: push fluid | Right-drag: feed dye | Space: toggle view",
                self.simulation.ticks(),
                dt
            ));
        });

        // Repaint-driven ticking keeps the solver in step with the display.
        ctx.request_repaint();
    }

    fn save(&mut self, storage: &mut dyn eframe::Storage) {
        eframe::set_value(storage, eframe::APP_KEY, &self.settings);
    }
}
