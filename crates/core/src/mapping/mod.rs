use serde::{Deserialize, Serialize};

use crate::{
    animation::Animation,
    config::{RenderConfig, SharedConfig},
    easing::Easing,
};

/// Linearly remaps `value` from `[low_in, high_in]` to `[low_out, high_out]`.
///
/// Equal input bounds divide by zero; callers must avoid them.
pub fn map_range(value: f64, low_in: f64, high_in: f64, low_out: f64, high_out: f64) -> f64 {
    low_out + (high_out - low_out) * (value - low_in) / (high_in - low_in)
}

/// Describes how animation progress is routed into the renderer
/// configuration for the swipe-down overlay: the baseline follows progress
/// down the viewport while the amplitude swells and then settles.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct SwipeChoreography {
    pub duration_ms: f64,
    pub easing: Easing,
    pub bounce_delay_ms: f64,
    /// Amplitude reached between `rise_until` and `fall_from`.
    pub peak_range: f64,
    pub rise_until: f64,
    pub fall_from: f64,
}

impl Default for SwipeChoreography {
    fn default() -> Self {
        Self {
            duration_ms: 1200.0,
            easing: Easing::ExpoInOut,
            bounce_delay_ms: 200.0,
            peak_range: 200.0,
            rise_until: 0.5,
            fall_from: 0.65,
        }
    }
}

impl SwipeChoreography {
    /// Applies `progress` to `config` for a viewport `height` pixels tall.
    pub fn apply(&self, progress: f64, height: f64, config: &mut RenderConfig) {
        config.y_offset = map_range(progress, 0.0, 1.0, 0.0, height);

        if progress < self.rise_until {
            config.max_range = map_range(progress, 0.0, self.rise_until, 0.0, self.peak_range);
        }

        if progress > self.fall_from {
            config.max_range = map_range(progress, self.fall_from, 1.0, self.peak_range, 0.0);
        }
    }

    /// Configures `animation` with this duration and easing and routes its
    /// ticks into `config`.
    pub fn attach(&self, animation: &Animation, config: SharedConfig, height: f64) {
        let swipe = *self;
        animation
            .duration(self.duration_ms)
            .easing(self.easing.into_fn())
            .on_tick(move |progress| {
                if let Err(err) = config.update(|config| swipe.apply(progress, height, config)) {
                    tracing::warn!(error = %err, "dropping swipe tick");
                }
            });
    }
}

#[cfg(test)]
mod tests {
    use std::rc::Rc;

    use super::*;
    use crate::timeline::FrameClock;

    #[test]
    fn identity_at_bounds() {
        assert_eq!(map_range(0.0, 0.0, 1.0, 0.0, 720.0), 0.0);
        assert_eq!(map_range(1.0, 0.0, 1.0, 0.0, 720.0), 720.0);
        assert_eq!(map_range(0.5, 0.0, 1.0, -200.0, 200.0), 0.0);
    }

    #[test]
    fn monotonic_when_output_increases() {
        let mut previous = f64::NEG_INFINITY;
        for step in 0..=50 {
            let value = map_range(step as f64 / 50.0, 0.0, 1.0, 10.0, 30.0);
            assert!(value > previous);
            previous = value;
        }
    }

    #[test]
    fn swipe_moves_baseline_and_shapes_amplitude() {
        let swipe = SwipeChoreography::default();
        let mut config = RenderConfig::default();

        swipe.apply(0.25, 800.0, &mut config);
        assert_eq!(config.y_offset, 200.0);
        assert_eq!(config.max_range, 100.0);

        swipe.apply(0.6, 800.0, &mut config);
        assert_eq!(config.y_offset, 480.0);
        assert_eq!(config.max_range, 100.0);

        swipe.apply(1.0, 800.0, &mut config);
        assert_eq!(config.y_offset, 800.0);
        assert!(config.max_range.abs() < 1e-9);
    }

    #[test]
    fn attached_animation_drives_shared_config() {
        let clock = Rc::new(FrameClock::new());
        let animation = Animation::new(clock.clone());
        let shared = SharedConfig::new(RenderConfig::default());
        let swipe = SwipeChoreography {
            easing: Easing::Linear,
            duration_ms: 100.0,
            ..Default::default()
        };

        swipe.attach(&animation, shared.clone(), 500.0);
        animation.play();
        clock.advance_to(0.0);
        clock.advance_to(40.0);

        let config = shared.snapshot().unwrap();
        assert_eq!(config.y_offset, 200.0);
        assert_eq!(config.max_range, 160.0);
    }
}
