//! Noise-driven wavy line renderer.

use std::{cell::RefCell, fmt, rc::Rc};

use rand::{rngs::StdRng, Rng, SeedableRng};
use serde::Serialize;

use crate::{
    config::{FillAnchor, RenderConfig, SharedConfig},
    mapping::map_range,
    noise::Noise1D,
    render::{SharedSurface, Surface, SurfaceHost},
    timeline::{FrameHost, FrameId},
    Result, WavyLineError,
};

/// Spreads neighbouring points apart in noise space.
const PHASE_SPREAD: f64 = 0.75;
const MAX_INITIAL_PHASE: f64 = 100.0;

const POINT_MARKER: f64 = 4.0;
const CONTROL_MARKER: f64 = 2.0;
const POINT_COLOR: &str = "#000";
const CONTROL_COLOR: &str = "#fff";
const GUIDE_COLOR: &str = "blue";

/// A vertex of the wave plus the bezier control coordinate towards its
/// right-hand neighbour.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ControlPoint {
    pub x: f64,
    pub y: f64,
    /// Position in noise space; only ever increases.
    pub phase: f64,
    pub control_x: f64,
    pub control_y: f64,
}

impl ControlPoint {
    pub fn new(x: f64, y: f64, phase: f64) -> Self {
        Self {
            x,
            y,
            phase,
            control_x: x,
            control_y: y,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum LoopPhase {
    Idle,
    Running,
    Stopped,
}

struct LineState {
    points: Vec<ControlPoint>,
    surface: Option<SharedSurface>,
    noise: Noise1D,
    rng: StdRng,
    frame: Option<FrameId>,
    generation: u64,
    phase: LoopPhase,
}

/// Animated filled wave drawn on a host surface.
///
/// The renderer runs its own frame loop once initialised and reads the
/// shared configuration at the top of every frame.
#[derive(Clone)]
pub struct WavyLine {
    state: Rc<RefCell<LineState>>,
    config: SharedConfig,
    frames: Rc<dyn FrameHost>,
    surfaces: Rc<dyn SurfaceHost>,
}

impl WavyLine {
    /// Creates a renderer. Nothing is drawn until [`WavyLine::init`].
    ///
    /// When the configuration carries a `seed`, the noise table and the
    /// initial jitter are reproducible.
    pub fn new(
        config: SharedConfig,
        frames: Rc<dyn FrameHost>,
        surfaces: Rc<dyn SurfaceHost>,
    ) -> Self {
        let seed = config.snapshot().ok().and_then(|config| config.seed);
        let mut rng = match seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        let noise = Noise1D::with_rng(&mut rng);

        Self {
            state: Rc::new(RefCell::new(LineState {
                points: Vec::new(),
                surface: None,
                noise,
                rng,
                frame: None,
                generation: 0,
                phase: LoopPhase::Idle,
            })),
            config,
            frames,
            surfaces,
        }
    }

    pub fn config(&self) -> &SharedConfig {
        &self.config
    }

    /// Binds the surface, lays out fresh points and starts the frame loop.
    ///
    /// Errors are logged and the call returns without effect.
    pub fn init(&self) {
        if let Err(err) = self.try_init() {
            tracing::error!(error = %err, "wavy line init failed");
        }
    }

    /// Same as [`WavyLine::init`] but hands the error back.
    pub fn try_init(&self) -> Result<()> {
        let config = self.config.snapshot()?;
        let id = config.el.as_deref().ok_or(WavyLineError::MissingSurface)?;
        let surface = self
            .surfaces
            .surface(id)
            .ok_or_else(|| WavyLineError::UnknownSurface(id.to_string()))?;

        surface.borrow_mut().set_size(config.width, config.height);

        let generation = {
            let mut state = self.state.borrow_mut();
            let points = seed_points(&config, &mut state.rng);
            state.points = points;
            state.surface = Some(surface);
            state.generation += 1;
            state.phase = LoopPhase::Running;
            state.generation
        };
        self.cancel_pending();

        if config.show_console_logs {
            tracing::info!(
                el = id,
                width = config.width,
                height = config.height,
                points = ?self.points(),
                "init()"
            );
        }

        self.step(generation);
        Ok(())
    }

    /// Cancels the in-flight frame, adopts the new size and lays the line
    /// out again from scratch.
    ///
    /// The running loop is halted first, so a failed re-init leaves the
    /// renderer idle rather than drawing with stale state.
    pub fn resize(&self, width: f64, height: f64) {
        self.halt(LoopPhase::Idle);
        if let Err(err) = self.config.update(|config| {
            config.width = width;
            config.height = height;
        }) {
            tracing::error!(error = %err, "wavy line resize failed");
            return;
        }
        self.init();
    }

    /// Stops the frame loop. A later `init` starts it again.
    pub fn stop(&self) {
        self.halt(LoopPhase::Stopped);
    }

    pub fn is_running(&self) -> bool {
        self.state.borrow().phase == LoopPhase::Running
    }

    pub fn points(&self) -> Vec<ControlPoint> {
        self.state.borrow().points.clone()
    }

    pub fn point_count(&self) -> usize {
        self.state.borrow().points.len()
    }

    fn halt(&self, phase: LoopPhase) {
        {
            let mut state = self.state.borrow_mut();
            state.generation += 1;
            state.phase = phase;
        }
        self.cancel_pending();
    }

    fn cancel_pending(&self) {
        let frame = self.state.borrow_mut().frame.take();
        if let Some(frame) = frame {
            self.frames.cancel_frame(frame);
        }
    }

    fn schedule(&self, generation: u64) {
        let handle = self.clone();
        let frame = self
            .frames
            .request_frame(Box::new(move |_| handle.step(generation)));
        self.state.borrow_mut().frame = Some(frame);
    }

    fn step(&self, generation: u64) {
        let config = match self.config.snapshot() {
            Ok(config) => config,
            Err(err) => {
                tracing::warn!(error = %err, "skipping frame");
                return;
            }
        };

        {
            let mut state = self.state.borrow_mut();
            if state.generation != generation || state.phase != LoopPhase::Running {
                return;
            }
            state.frame = None;

            let LineState {
                points,
                noise,
                surface,
                ..
            } = &mut *state;
            advance_points(points, noise, &config);
            update_controls(points);
            if let Some(surface) = surface {
                draw(&mut *surface.borrow_mut(), points, &config);
            }
        }

        self.schedule(generation);
    }
}

impl fmt::Debug for WavyLine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = self.state.borrow();
        f.debug_struct("WavyLine")
            .field("points", &state.points.len())
            .field("phase", &state.phase)
            .field("generation", &state.generation)
            .finish()
    }
}

/// Lays `total_points` points evenly across the width at half height, each
/// jittered vertically within `max_range` and given a random phase.
fn seed_points<R: Rng + ?Sized>(config: &RenderConfig, rng: &mut R) -> Vec<ControlPoint> {
    let count = config.total_points;
    let baseline = config.height / 2.0;
    let range = config.max_range.abs();

    (0..count)
        .map(|index| {
            let x = if count > 1 {
                config.width * (index as f64 / (count - 1) as f64)
            } else {
                0.0
            };
            let y = baseline + random_int(rng, -range, range);
            let phase = random_int(rng, 0.0, MAX_INITIAL_PHASE);
            ControlPoint::new(x, y, phase)
        })
        .collect()
}

/// Integer in `[min, max]`, returned as a float.
fn random_int<R: Rng + ?Sized>(rng: &mut R, min: f64, max: f64) -> f64 {
    let min = min.ceil();
    let max = max.floor();
    (rng.gen::<f64>() * (max - min + 1.0)).floor() + min
}

fn advance_points(points: &mut [ControlPoint], noise: &Noise1D, config: &RenderConfig) {
    for (index, point) in points.iter_mut().enumerate() {
        let sample = noise.value_at(point.phase);
        let movement = map_range(sample, 0.0, 1.0, -config.max_range, config.max_range);
        point.y = config.y_offset + movement;

        let drift = noise.value_at(point.phase + index as f64 * PHASE_SPREAD);
        point.phase += map_range(drift, 0.0, 1.0, 0.0, config.timing);
    }
}

/// Sets each point's control coordinate to the midpoint towards its
/// neighbour; the last point controls itself.
fn update_controls(points: &mut [ControlPoint]) {
    for index in 0..points.len() {
        let next = points.get(index + 1).copied();
        let point = &mut points[index];
        match next {
            Some(next) => {
                point.control_x = (point.x + next.x) / 2.0;
                point.control_y = (point.y + next.y) / 2.0;
            }
            None => {
                point.control_x = point.x;
                point.control_y = point.y;
            }
        }
    }
}

fn draw(surface: &mut dyn Surface, points: &[ControlPoint], config: &RenderConfig) {
    let (width, height) = surface.size();
    surface.clear_rect(0.0, 0.0, width, height);

    surface.set_fill_style(&config.color);
    surface.set_stroke_style(&config.color);
    surface.set_line_width(1.0);
    surface.begin_path();

    if let Some(first) = points.first() {
        surface.move_to(first.x, first.y);
    }
    for point in points {
        surface.bezier_curve_to(
            point.x,
            point.y,
            point.control_x,
            point.control_y,
            point.control_x,
            point.control_y,
        );
    }

    let edge = match config.fill_anchor {
        FillAnchor::Top => 0.0,
        FillAnchor::Bottom => height,
    };
    surface.line_to(width, config.y_offset);
    surface.line_to(width, edge);
    surface.line_to(0.0, edge);
    surface.close_path();
    surface.fill();

    if config.show_indicators {
        draw_indicators(surface, points, config, width);
    }
}

fn draw_indicators(
    surface: &mut dyn Surface,
    points: &[ControlPoint],
    config: &RenderConfig,
    width: f64,
) {
    surface.set_fill_style(POINT_COLOR);
    surface.begin_path();
    let half = POINT_MARKER / 2.0;
    for point in points {
        surface.rect(point.x - half, point.y - half, POINT_MARKER, POINT_MARKER);
    }
    surface.fill();

    surface.set_fill_style(CONTROL_COLOR);
    surface.begin_path();
    let half = CONTROL_MARKER / 2.0;
    for point in points {
        surface.rect(
            point.control_x - half,
            point.control_y - half,
            CONTROL_MARKER,
            CONTROL_MARKER,
        );
    }
    surface.fill();

    surface.set_stroke_style(GUIDE_COLOR);
    surface.begin_path();
    for y in [
        config.y_offset - config.max_range,
        config.y_offset,
        config.y_offset + config.max_range,
    ] {
        surface.move_to(0.0, y);
        surface.line_to(width, y);
    }
    surface.stroke();
    surface.close_path();
}
