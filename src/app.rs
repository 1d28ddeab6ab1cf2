use std::io::Read;

use egui::{Color32, Painter, Pos2, Rect, Shape, Stroke};
use nalgebra::{Matrix4, Point3};
use tracing::info;

use crate::airframe::{self, PosedAirframe};
use crate::telemetry::{Attitude, TelemetryLink};
use crate::view::{self, SceneCamera};

/// Half-width of the ground grid, world units.
const GRID_EXTENT: i32 = 3;

/// The viewer: polls the telemetry link and repaints the posed airframe on
/// every frame. The egui update callback is the only loop in the program.
pub struct ScopeApp<R> {
    link: Option<TelemetryLink<R>>,
    /// `None` until the first well-formed record lands; rendering falls back
    /// to the level zero attitude.
    attitude: Option<Attitude>,
    height_scale: f32,
    camera: SceneCamera,
}

impl<R> ScopeApp<R> {
    pub fn new(link: TelemetryLink<R>, height_scale: f32) -> Self {
        Self {
            link: Some(link),
            attitude: None,
            height_scale,
            camera: SceneCamera::orbit(Point3::new(0.0, 0.0, 2.0), 9.0, 20.0, -60.0),
        }
    }

    fn status_line(&self) -> String {
        match &self.attitude {
            Some(a) => format!(
                "roll {:+6.1}°   pitch {:+6.1}°   height {:5.2} m   (display x{})",
                a.roll_deg, a.pitch_deg, a.height_m, self.height_scale
            ),
            None => "waiting for telemetry".to_owned(),
        }
    }

    fn paint_scene(&self, painter: &Painter, rect: Rect, posed: &PosedAirframe) {
        let screen_from_world = self.camera.screen_from_world(&rect);

        self.paint_grid(painter, &screen_from_world);

        let silver = Color32::from_rgba_unmultiplied(192, 192, 192, 230);
        let red = Color32::from_rgba_unmultiplied(205, 60, 50, 205);
        let green = Color32::from_rgba_unmultiplied(60, 160, 70, 205);

        let mut faces: Vec<(f32, Vec<Pos2>, Color32)> = Vec::with_capacity(6);
        for quad in airframe::FUSELAGE_QUADS {
            self.push_face(
                &mut faces,
                &screen_from_world,
                &quad.map(|i| posed.fuselage[i]),
                silver,
            );
        }
        self.push_face(&mut faces, &screen_from_world, &posed.wing, red);
        self.push_face(&mut faces, &screen_from_world, &posed.tail, green);

        // painter's algorithm: farthest faces go down first
        faces.sort_by(|a, b| b.0.total_cmp(&a.0));
        let outline = Stroke::new(1.0, Color32::from_gray(40));
        for (_, points, color) in faces {
            painter.add(Shape::convex_polygon(points, color, outline));
        }
    }

    fn push_face(
        &self,
        faces: &mut Vec<(f32, Vec<Pos2>, Color32)>,
        screen_from_world: &Matrix4<f32>,
        corners: &[Point3<f32>; 4],
        color: Color32,
    ) {
        let mut points = Vec::with_capacity(corners.len());
        let mut depth = 0.0;
        for corner in corners {
            match view::project(screen_from_world, corner) {
                Some(p) => {
                    points.push(p);
                    depth += self.camera.depth(corner);
                }
                None => return,
            }
        }
        faces.push((depth / corners.len() as f32, points, color));
    }

    fn paint_grid(&self, painter: &Painter, screen_from_world: &Matrix4<f32>) {
        let extent = GRID_EXTENT as f32;
        let stroke = Stroke::new(1.0, Color32::from_gray(60));
        for i in -GRID_EXTENT..=GRID_EXTENT {
            let i = i as f32;
            let runs = [
                (Point3::new(i, -extent, 0.0), Point3::new(i, extent, 0.0)),
                (Point3::new(-extent, i, 0.0), Point3::new(extent, i, 0.0)),
            ];
            for (a, b) in runs {
                let a = view::project(screen_from_world, &a);
                let b = view::project(screen_from_world, &b);
                if let (Some(a), Some(b)) = (a, b) {
                    painter.line_segment([a, b], stroke);
                }
            }
        }
    }
}

impl<R: Read> eframe::App for ScopeApp<R> {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        if let Some(link) = self.link.as_mut() {
            if let Some(sample) = link.poll() {
                self.attitude = Some(sample);
            }
        }

        let current = self.attitude.unwrap_or_default();
        let posed = airframe::pose(&current, self.height_scale);

        egui::TopBottomPanel::top("status").show(ctx, |ui| {
            ui.monospace(self.status_line());
        });

        egui::CentralPanel::default()
            .frame(egui::Frame::dark_canvas(&ctx.style()))
            .show(ctx, |ui| {
                let (response, painter) =
                    ui.allocate_painter(ui.available_size(), egui::Sense::hover());
                self.paint_scene(&painter, response.rect, &posed);
            });

        // next tick follows immediately; the redraw cadence rides the
        // compositor, with no drift correction
        ctx.request_repaint();
    }

    fn on_exit_event(&mut self) -> bool {
        self.link.take();
        info!("telemetry link closed");
        true
    }
}
