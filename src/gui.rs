use egui::{CollapsingHeader, Color32, RichText};
use glam::Vec3;
use std::f32::consts::PI;

use crate::camera::Camera;
use crate::controllers::ControllerKind;
use crate::render::LightSettings;

/// Settings edited through the viewer panel and read back by the app each
/// frame
#[derive(Debug, Clone, PartialEq)]
pub struct ViewerState {
    pub controller: ControllerKind,
    pub speed: f32,
    pub light: LightSettings,
    /// Polar angle of the light direction, from +Y
    pub light_theta: f32,
    pub light_phi: f32,
    pub light_color: [f32; 3],
    pub light_strength: f32,
}

impl ViewerState {
    pub fn new(controller: ControllerKind, speed: f32, light: LightSettings) -> Self {
        let (light_theta, light_phi) = light.angles();
        let light_strength = light.intensity.max_element();
        let light_color = if light_strength > 0.0 {
            (light.intensity / light_strength).to_array()
        } else {
            [1.0; 3]
        };
        Self {
            controller,
            speed,
            light,
            light_theta,
            light_phi,
            light_color,
            light_strength,
        }
    }

    /// Recompute the light from the angle, color and strength controls
    pub fn apply_light_controls(&mut self) {
        self.light.direction = LightSettings::direction_from_angles(self.light_theta, self.light_phi);
        self.light.intensity = Vec3::from(self.light_color) * self.light_strength;
    }
}

/// Per-frame numbers shown in the panel
#[derive(Debug, Clone, Copy, Default)]
pub struct FrameStats {
    pub fps: f32,
    pub draws: usize,
}

fn vec3_row(ui: &mut egui::Ui, name: &str, v: Vec3) {
    ui.monospace(format!("{:<7}{:>9.3} {:>9.3} {:>9.3}", name, v.x, v.y, v.z));
}

/// Viewer panel: frame rate, camera readout, controller choice and light
/// controls
pub fn show(ctx: &egui::Context, state: &mut ViewerState, camera: &Camera, stats: FrameStats) {
    egui::Window::new("glTF Viewer")
        .default_pos(egui::pos2(10.0, 10.0))
        .resizable(false)
        .show(ctx, |ui| {
            ui.label(
                RichText::new(format!("{:.0} FPS", stats.fps))
                    .size(20.0)
                    .color(Color32::from_rgb(74, 158, 255)),
            );
            ui.label(RichText::new(format!("{} draws", stats.draws)).color(Color32::GRAY));

            CollapsingHeader::new("Camera").default_open(true).show(ui, |ui| {
                vec3_row(ui, "eye", camera.eye());
                vec3_row(ui, "center", camera.center());
                vec3_row(ui, "up", camera.up());
                vec3_row(ui, "front", camera.front());
                vec3_row(ui, "left", camera.left());
                if ui.button("Copy CLI camera args").clicked() {
                    let args = camera.look_at_args();
                    log::info!("--lookat {}", args);
                    ctx.copy_text(args);
                }

                ui.separator();
                ui.horizontal(|ui| {
                    for kind in ControllerKind::ALL {
                        ui.radio_value(&mut state.controller, kind, kind.label());
                    }
                });
                ui.add(
                    egui::DragValue::new(&mut state.speed)
                        .speed(0.1)
                        .range(0.0..=f32::MAX)
                        .prefix("speed "),
                );
            });

            CollapsingHeader::new("Lighting").default_open(true).show(ui, |ui| {
                ui.checkbox(&mut state.light.enabled, "Enabled");
                ui.add_enabled_ui(state.light.enabled, |ui| {
                    ui.checkbox(&mut state.light.from_camera, "Light from camera");

                    let mut changed = false;
                    ui.add_enabled_ui(!state.light.from_camera, |ui| {
                        changed |= ui
                            .add(egui::Slider::new(&mut state.light_theta, 0.0..=PI).text("theta"))
                            .changed();
                        changed |= ui
                            .add(egui::Slider::new(&mut state.light_phi, -PI..=PI).text("phi"))
                            .changed();
                    });
                    ui.horizontal(|ui| {
                        changed |= egui::color_picker::color_edit_button_rgb(ui, &mut state.light_color).changed();
                        changed |= ui
                            .add(egui::Slider::new(&mut state.light_strength, 0.0..=10.0).text("intensity"))
                            .changed();
                    });
                    if changed {
                        state.apply_light_controls();
                    }
                });
            });
        });
}
