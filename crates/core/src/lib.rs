//! Core library for the Wavy Line renderer.
//!
//! Two cooperating subsystems live here: an [`Animation`] tween clock that
//! turns elapsed time into eased progress and dispatches `tick`/`finish`
//! listeners, and a [`WavyLine`] renderer that moves a row of control points
//! through smooth [`Noise1D`] and paints them as a filled bezier wave. Both
//! run their own frame loops on a [`FrameHost`] and meet only through a
//! [`SharedConfig`]: the animation writes, the renderer reads on its next
//! frame.

pub mod animation;
pub mod config;
pub mod curve;
pub mod easing;
pub mod error;
pub mod mapping;
pub mod noise;
pub mod record;
pub mod render;
pub mod timeline;

pub use animation::{Animation, Direction, Listener};
pub use config::{AppConfig, FillAnchor, RenderConfig, RenderOptions, SharedConfig, Viewport};
pub use curve::{ControlPoint, WavyLine};
pub use easing::Easing;
pub use error::{Result, WavyLineError};
pub use mapping::{map_range, SwipeChoreography};
pub use noise::Noise1D;
pub use record::{render_svg, Recorder, RecordingSettings};
pub use render::{DrawCommand, RecordingSurface, SharedSurface, Surface, SurfaceHost, SurfaceRegistry};
pub use timeline::{FrameClock, FrameHost, FrameId, FrameReport, TimerId};
