use std::{
    cell::{Ref, RefCell, RefMut},
    path::Path,
    rc::Rc,
};

use serde::{Deserialize, Serialize};

use crate::{mapping::SwipeChoreography, Result, WavyLineError};

/// Top-level configuration structure for the application.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct AppConfig {
    pub viewport: Viewport,
    pub render: RenderOptions,
    pub swipe: SwipeChoreography,
}

impl AppConfig {
    /// Loads a configuration file; missing keys fall back to defaults.
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self> {
        let raw = std::fs::read_to_string(path)?;
        Self::from_json(&raw)
    }

    pub fn from_json(raw: &str) -> Result<Self> {
        Ok(serde_json::from_str(raw)?)
    }

    pub fn to_json_pretty(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Resolves the renderer options against the configured viewport.
    pub fn render_config(&self) -> RenderConfig {
        self.render.resolve(self.viewport)
    }
}

/// Size of the host window the surfaces live in.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Viewport {
    pub width: f64,
    pub height: f64,
}

impl Default for Viewport {
    fn default() -> Self {
        Self {
            width: 1280.0,
            height: 720.0,
        }
    }
}

/// Which surface edge closes the filled silhouette.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FillAnchor {
    #[default]
    Top,
    Bottom,
}

/// Options as a caller writes them. Anything left unset takes its default,
/// some of which depend on the viewport.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct RenderOptions {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub el: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub width: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub height: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub total_points: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_range: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timing: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub y_offset: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub background: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub show_indicators: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub show_console_logs: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fill_anchor: Option<FillAnchor>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub seed: Option<u64>,
}

impl RenderOptions {
    pub fn resolve(&self, viewport: Viewport) -> RenderConfig {
        let defaults = RenderConfig::for_viewport(viewport);
        RenderConfig {
            el: self.el.clone().or(defaults.el),
            width: self.width.unwrap_or(defaults.width),
            height: self.height.unwrap_or(defaults.height),
            total_points: self.total_points.unwrap_or(defaults.total_points),
            max_range: self.max_range.unwrap_or(defaults.max_range),
            timing: self.timing.unwrap_or(defaults.timing),
            y_offset: self.y_offset.unwrap_or(defaults.y_offset),
            color: self.color.clone().unwrap_or(defaults.color),
            background: self.background.clone().unwrap_or(defaults.background),
            show_indicators: self.show_indicators.unwrap_or(defaults.show_indicators),
            show_console_logs: self.show_console_logs.unwrap_or(defaults.show_console_logs),
            fill_anchor: self.fill_anchor.unwrap_or(defaults.fill_anchor),
            seed: self.seed.or(defaults.seed),
        }
    }
}

impl From<RenderConfig> for RenderOptions {
    fn from(config: RenderConfig) -> Self {
        Self {
            el: config.el,
            width: Some(config.width),
            height: Some(config.height),
            total_points: Some(config.total_points),
            max_range: Some(config.max_range),
            timing: Some(config.timing),
            y_offset: Some(config.y_offset),
            color: Some(config.color),
            background: Some(config.background),
            show_indicators: Some(config.show_indicators),
            show_console_logs: Some(config.show_console_logs),
            fill_anchor: Some(config.fill_anchor),
            seed: config.seed,
        }
    }
}

/// Fully resolved renderer configuration, read at the top of every frame.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RenderConfig {
    /// Id of the surface to draw on. Required by `init`.
    pub el: Option<String>,
    pub width: f64,
    pub height: f64,
    pub total_points: usize,
    /// Maximum vertical displacement of a point from `y_offset`.
    pub max_range: f64,
    /// Upper bound of the per-frame phase advance.
    pub timing: f64,
    pub y_offset: f64,
    pub color: String,
    /// Kept for completeness; drawing does not paint a background.
    pub background: String,
    pub show_indicators: bool,
    pub show_console_logs: bool,
    pub fill_anchor: FillAnchor,
    pub seed: Option<u64>,
}

impl RenderConfig {
    pub fn for_viewport(viewport: Viewport) -> Self {
        Self {
            el: None,
            width: viewport.width,
            height: viewport.height,
            total_points: 20,
            max_range: 200.0,
            timing: 0.01,
            y_offset: viewport.height / 2.0,
            color: "#ff3737".to_string(),
            background: "#27313e".to_string(),
            show_indicators: false,
            show_console_logs: false,
            fill_anchor: FillAnchor::Top,
            seed: None,
        }
    }
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self::for_viewport(Viewport::default())
    }
}

/// Configuration record shared between the animation engine (writer) and
/// the curve renderer (reader). The renderer picks up writes at the top of
/// its next frame.
///
/// Both sides run on the frame loop's thread. Reading from inside an
/// `update` closure is a conflict and is reported as an error.
#[derive(Debug, Clone, Default)]
pub struct SharedConfig {
    inner: Rc<RefCell<RenderConfig>>,
}

impl SharedConfig {
    pub fn new(config: RenderConfig) -> Self {
        Self {
            inner: Rc::new(RefCell::new(config)),
        }
    }

    /// Returns a copy of the current configuration.
    pub fn snapshot(&self) -> Result<RenderConfig> {
        Ok(self.read()?.clone())
    }

    pub fn update<F>(&self, apply: F) -> Result<()>
    where
        F: FnOnce(&mut RenderConfig),
    {
        let mut config = self.write()?;
        apply(&mut *config);
        Ok(())
    }

    fn read(&self) -> Result<Ref<'_, RenderConfig>> {
        self.inner
            .try_borrow()
            .map_err(|_| WavyLineError::ConfigBorrowed)
    }

    fn write(&self) -> Result<RefMut<'_, RenderConfig>> {
        self.inner
            .try_borrow_mut()
            .map_err(|_| WavyLineError::ConfigBorrowed)
    }
}
