use std::{
    fmt::Write as _,
    path::{Path, PathBuf},
};

use serde::{Deserialize, Serialize};

use crate::{render::DrawCommand, Result};

/// Configuration options for the recording subsystem.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct RecordingSettings {
    pub output_dir: PathBuf,
    /// Only every nth captured frame is written.
    pub every_nth: usize,
}

impl Default for RecordingSettings {
    fn default() -> Self {
        Self {
            output_dir: PathBuf::from("frames"),
            every_nth: 1,
        }
    }
}

/// Writes recorded frames to disk as numbered SVG files.
#[derive(Debug, Default)]
pub struct Recorder {
    settings: RecordingSettings,
    captured: usize,
    written: Vec<PathBuf>,
}

impl Recorder {
    pub fn new(settings: RecordingSettings) -> Self {
        Self {
            settings,
            captured: 0,
            written: Vec::new(),
        }
    }

    /// Creates the output directory.
    pub fn start(&mut self) -> Result<()> {
        std::fs::create_dir_all(&self.settings.output_dir)?;
        tracing::info!(dir = ?self.settings.output_dir, "recording frames");
        Ok(())
    }

    /// Offers one frame. Returns the file written, if this frame was kept.
    pub fn capture(
        &mut self,
        commands: &[DrawCommand],
        width: f64,
        height: f64,
    ) -> Result<Option<PathBuf>> {
        let index = self.captured;
        self.captured += 1;
        if index % self.settings.every_nth.max(1) != 0 {
            return Ok(None);
        }

        let path = frame_path(&self.settings.output_dir, self.written.len());
        std::fs::write(&path, render_svg(commands, width, height))?;
        tracing::debug!(?path, frame = index, "wrote frame");
        self.written.push(path.clone());
        Ok(Some(path))
    }

    pub fn captured(&self) -> usize {
        self.captured
    }

    pub fn written(&self) -> &[PathBuf] {
        &self.written
    }
}

fn frame_path(dir: &Path, index: usize) -> PathBuf {
    dir.join(format!("frame_{index:05}.svg"))
}

/// Converts a recorded command list into a standalone SVG document.
///
/// Every `fill` or `stroke` emits the current path as a `<path>` element
/// with the style active at that moment.
pub fn render_svg(commands: &[DrawCommand], width: f64, height: f64) -> String {
    let mut svg = format!(
        "<svg xmlns=\"http://www.w3.org/2000/svg\" width=\"{width}\" height=\"{height}\" viewBox=\"0 0 {width} {height}\">\n"
    );
    let mut path = String::new();
    let mut fill = String::from("#000");
    let mut stroke = String::from("#000");
    let mut line_width = 1.0;

    for command in commands {
        match command {
            DrawCommand::ClearRect { .. } => {}
            DrawCommand::FillStyle { color } => fill.clone_from(color),
            DrawCommand::StrokeStyle { color } => stroke.clone_from(color),
            DrawCommand::LineWidth { width } => line_width = *width,
            DrawCommand::BeginPath => path.clear(),
            DrawCommand::MoveTo { x, y } => {
                let _ = write!(path, "M{x} {y} ");
            }
            DrawCommand::LineTo { x, y } => {
                // A path without a current point starts where it is drawn to.
                let op = if path.is_empty() { 'M' } else { 'L' };
                let _ = write!(path, "{op}{x} {y} ");
            }
            DrawCommand::BezierCurveTo {
                cp1x,
                cp1y,
                cp2x,
                cp2y,
                x,
                y,
            } => {
                if path.is_empty() {
                    let _ = write!(path, "M{cp1x} {cp1y} ");
                }
                let _ = write!(path, "C{cp1x} {cp1y} {cp2x} {cp2y} {x} {y} ");
            }
            DrawCommand::Rect {
                x,
                y,
                width,
                height,
            } => {
                let _ = write!(path, "M{x} {y} h{width} v{height} h{} Z ", -width);
            }
            DrawCommand::ClosePath => path.push_str("Z "),
            DrawCommand::Fill => {
                let _ = writeln!(svg, "  <path d=\"{}\" fill=\"{fill}\"/>", path.trim_end());
            }
            DrawCommand::Stroke => {
                let _ = writeln!(
                    svg,
                    "  <path d=\"{}\" fill=\"none\" stroke=\"{stroke}\" stroke-width=\"{line_width}\"/>",
                    path.trim_end()
                );
            }
        }
    }

    svg.push_str("</svg>\n");
    svg
}

#[cfg(test)]
mod tests {
    use super::*;

    fn triangle() -> Vec<DrawCommand> {
        vec![
            DrawCommand::ClearRect {
                x: 0.0,
                y: 0.0,
                width: 10.0,
                height: 10.0,
            },
            DrawCommand::FillStyle {
                color: "#ff3737".to_string(),
            },
            DrawCommand::BeginPath,
            DrawCommand::MoveTo { x: 0.0, y: 5.0 },
            DrawCommand::BezierCurveTo {
                cp1x: 2.0,
                cp1y: 4.0,
                cp2x: 3.0,
                cp2y: 4.0,
                x: 3.0,
                y: 4.0,
            },
            DrawCommand::LineTo { x: 10.0, y: 0.0 },
            DrawCommand::ClosePath,
            DrawCommand::Fill,
        ]
    }

    #[test]
    fn fills_become_paths_with_current_color() {
        let svg = render_svg(&triangle(), 10.0, 10.0);

        assert!(svg.starts_with("<svg"));
        assert!(svg.contains("width=\"10\""));
        assert!(svg.contains("<path d=\"M0 5 C2 4 3 4 3 4 L10 0 Z\" fill=\"#ff3737\"/>"));
        assert!(svg.trim_end().ends_with("</svg>"));
    }

    #[test]
    fn strokes_are_unfilled() {
        let commands = vec![
            DrawCommand::StrokeStyle {
                color: "blue".to_string(),
            },
            DrawCommand::BeginPath,
            DrawCommand::MoveTo { x: 0.0, y: 1.0 },
            DrawCommand::LineTo { x: 5.0, y: 1.0 },
            DrawCommand::Stroke,
        ];

        let svg = render_svg(&commands, 5.0, 5.0);
        assert!(svg.contains("fill=\"none\" stroke=\"blue\" stroke-width=\"1\""));
    }

    #[test]
    fn writes_every_nth_frame() {
        let dir = tempfile::tempdir().unwrap();
        let mut recorder = Recorder::new(RecordingSettings {
            output_dir: dir.path().join("out"),
            every_nth: 2,
        });
        recorder.start().unwrap();

        let frame = triangle();
        let written: Vec<_> = (0..5)
            .map(|_| recorder.capture(&frame, 10.0, 10.0).unwrap())
            .collect();

        assert_eq!(recorder.captured(), 5);
        assert_eq!(written.iter().filter(|path| path.is_some()).count(), 3);
        assert_eq!(recorder.written().len(), 3);
        let last = recorder.written().last().unwrap();
        assert!(last.ends_with("frame_00002.svg"));
        let contents = std::fs::read_to_string(last).unwrap();
        assert!(contents.contains("#ff3737"));
    }
}
