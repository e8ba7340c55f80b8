//! Drawing surface abstraction and the in-memory backend.

use std::{cell::RefCell, collections::HashMap, fmt, rc::Rc};

use serde::{Deserialize, Serialize};

/// 2D path-drawing context, modelled on an HTML canvas.
pub trait Surface {
    fn size(&self) -> (f64, f64);
    fn set_size(&mut self, width: f64, height: f64);

    fn clear_rect(&mut self, x: f64, y: f64, width: f64, height: f64);
    fn set_fill_style(&mut self, color: &str);
    fn set_stroke_style(&mut self, color: &str);
    fn set_line_width(&mut self, width: f64);

    fn begin_path(&mut self);
    fn move_to(&mut self, x: f64, y: f64);
    fn line_to(&mut self, x: f64, y: f64);
    fn bezier_curve_to(&mut self, cp1x: f64, cp1y: f64, cp2x: f64, cp2y: f64, x: f64, y: f64);
    fn rect(&mut self, x: f64, y: f64, width: f64, height: f64);
    fn close_path(&mut self);
    fn fill(&mut self);
    fn stroke(&mut self);
}

pub type SharedSurface = Rc<RefCell<dyn Surface>>;

/// Resolves surface ids to drawable surfaces.
pub trait SurfaceHost {
    fn surface(&self, id: &str) -> Option<SharedSurface>;
}

/// Registry of the surfaces a host exposes, keyed by id.
#[derive(Default)]
pub struct SurfaceRegistry {
    surfaces: HashMap<String, SharedSurface>,
}

impl SurfaceRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&mut self, id: impl Into<String>, surface: SharedSurface) {
        self.surfaces.insert(id.into(), surface);
    }

    pub fn contains(&self, id: &str) -> bool {
        self.surfaces.contains_key(id)
    }
}

impl SurfaceHost for SurfaceRegistry {
    fn surface(&self, id: &str) -> Option<SharedSurface> {
        self.surfaces.get(id).cloned()
    }
}

impl fmt::Debug for SurfaceRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SurfaceRegistry")
            .field("ids", &self.surfaces.keys().collect::<Vec<_>>())
            .finish()
    }
}

/// One recorded call against a [`Surface`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum DrawCommand {
    ClearRect { x: f64, y: f64, width: f64, height: f64 },
    FillStyle { color: String },
    StrokeStyle { color: String },
    LineWidth { width: f64 },
    BeginPath,
    MoveTo { x: f64, y: f64 },
    LineTo { x: f64, y: f64 },
    BezierCurveTo { cp1x: f64, cp1y: f64, cp2x: f64, cp2y: f64, x: f64, y: f64 },
    Rect { x: f64, y: f64, width: f64, height: f64 },
    ClosePath,
    Fill,
    Stroke,
}

/// Surface that records draw calls instead of rasterising them.
///
/// A clear covering the whole surface starts a new frame, so the log only
/// ever holds the commands since the last full clear.
#[derive(Debug, Clone, Default)]
pub struct RecordingSurface {
    width: f64,
    height: f64,
    commands: Vec<DrawCommand>,
    frames: usize,
}

impl RecordingSurface {
    pub fn new(width: f64, height: f64) -> Self {
        Self {
            width,
            height,
            ..Default::default()
        }
    }

    pub fn commands(&self) -> &[DrawCommand] {
        &self.commands
    }

    /// Number of full clears seen, i.e. frames started.
    pub fn frames(&self) -> usize {
        self.frames
    }

    fn push(&mut self, command: DrawCommand) {
        self.commands.push(command);
    }
}

impl Surface for RecordingSurface {
    fn size(&self) -> (f64, f64) {
        (self.width, self.height)
    }

    fn set_size(&mut self, width: f64, height: f64) {
        self.width = width;
        self.height = height;
        self.commands.clear();
    }

    fn clear_rect(&mut self, x: f64, y: f64, width: f64, height: f64) {
        if x <= 0.0 && y <= 0.0 && x + width >= self.width && y + height >= self.height {
            self.commands.clear();
            self.frames += 1;
        }
        self.push(DrawCommand::ClearRect {
            x,
            y,
            width,
            height,
        });
    }

    fn set_fill_style(&mut self, color: &str) {
        self.push(DrawCommand::FillStyle {
            color: color.to_string(),
        });
    }

    fn set_stroke_style(&mut self, color: &str) {
        self.push(DrawCommand::StrokeStyle {
            color: color.to_string(),
        });
    }

    fn set_line_width(&mut self, width: f64) {
        self.push(DrawCommand::LineWidth { width });
    }

    fn begin_path(&mut self) {
        self.push(DrawCommand::BeginPath);
    }

    fn move_to(&mut self, x: f64, y: f64) {
        self.push(DrawCommand::MoveTo { x, y });
    }

    fn line_to(&mut self, x: f64, y: f64) {
        self.push(DrawCommand::LineTo { x, y });
    }

    fn bezier_curve_to(&mut self, cp1x: f64, cp1y: f64, cp2x: f64, cp2y: f64, x: f64, y: f64) {
        self.push(DrawCommand::BezierCurveTo {
            cp1x,
            cp1y,
            cp2x,
            cp2y,
            x,
            y,
        });
    }

    fn rect(&mut self, x: f64, y: f64, width: f64, height: f64) {
        self.push(DrawCommand::Rect {
            x,
            y,
            width,
            height,
        });
    }

    fn close_path(&mut self) {
        self.push(DrawCommand::ClosePath);
    }

    fn fill(&mut self) {
        self.push(DrawCommand::Fill);
    }

    fn stroke(&mut self) {
        self.push(DrawCommand::Stroke);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn full_clear_starts_a_new_frame() {
        let mut surface = RecordingSurface::new(100.0, 50.0);
        surface.begin_path();
        surface.line_to(1.0, 2.0);
        surface.clear_rect(0.0, 0.0, 100.0, 50.0);
        surface.fill();

        assert_eq!(surface.frames(), 1);
        assert_eq!(
            surface.commands(),
            &[
                DrawCommand::ClearRect {
                    x: 0.0,
                    y: 0.0,
                    width: 100.0,
                    height: 50.0
                },
                DrawCommand::Fill,
            ]
        );
    }

    #[test]
    fn partial_clear_is_just_recorded() {
        let mut surface = RecordingSurface::new(100.0, 50.0);
        surface.begin_path();
        surface.clear_rect(10.0, 10.0, 5.0, 5.0);

        assert_eq!(surface.frames(), 0);
        assert_eq!(surface.commands().len(), 2);
    }

    #[test]
    fn registry_resolves_registered_ids() {
        let mut registry = SurfaceRegistry::new();
        let surface: SharedSurface = Rc::new(RefCell::new(RecordingSurface::new(10.0, 10.0)));
        registry.register("canvas", surface);

        assert!(registry.contains("canvas"));
        assert!(registry.surface("canvas").is_some());
        assert!(registry.surface("missing").is_none());
    }

    #[test]
    fn resizing_updates_reported_size() {
        let mut surface = RecordingSurface::new(10.0, 10.0);
        surface.set_size(300.0, 200.0);
        assert_eq!(surface.size(), (300.0, 200.0));
    }
}
