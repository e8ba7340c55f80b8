//! Named easing curves for the animation engine.
//!
//! The engine accepts any `Fn(f64) -> f64`; these are the curves the
//! configuration layer can refer to by name. None of them clamp their input,
//! so a custom overshooting curve and these behave the same way downstream.

use std::f64::consts::PI;

use serde::{Deserialize, Serialize};

/// Easing curve variants.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Easing {
    /// No remapping.
    #[default]
    Linear,
    /// Slow start.
    QuadIn,
    /// Slow end.
    QuadOut,
    QuadInOut,
    CubicInOut,
    SineInOut,
    /// Exponential ease in and out; hits 0 and 1 exactly at the ends.
    ExpoInOut,
}

impl Easing {
    /// Evaluates the curve at `t`.
    pub fn evaluate(self, t: f64) -> f64 {
        match self {
            Easing::Linear => t,
            Easing::QuadIn => t * t,
            Easing::QuadOut => t * (2.0 - t),
            Easing::QuadInOut => {
                if t < 0.5 {
                    2.0 * t * t
                } else {
                    -1.0 + (4.0 - 2.0 * t) * t
                }
            }
            Easing::CubicInOut => {
                if t < 0.5 {
                    4.0 * t * t * t
                } else {
                    let u = 2.0 * t - 2.0;
                    0.5 * u * u * u + 1.0
                }
            }
            Easing::SineInOut => -0.5 * ((PI * t).cos() - 1.0),
            Easing::ExpoInOut => expo_in_out(t),
        }
    }

    /// Boxes the curve so it can be handed to [`crate::Animation::easing`].
    pub fn into_fn(self) -> impl Fn(f64) -> f64 + 'static {
        move |t| self.evaluate(t)
    }
}

fn expo_in_out(t: f64) -> f64 {
    if t == 0.0 {
        return 0.0;
    }
    if t == 1.0 {
        return 1.0;
    }

    let scaled = t * 2.0;
    if scaled < 1.0 {
        0.5 * 2f64.powf(10.0 * (scaled - 1.0))
    } else {
        0.5 * (2.0 - 2f64.powf(-10.0 * (scaled - 1.0)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const ALL: [Easing; 7] = [
        Easing::Linear,
        Easing::QuadIn,
        Easing::QuadOut,
        Easing::QuadInOut,
        Easing::CubicInOut,
        Easing::SineInOut,
        Easing::ExpoInOut,
    ];

    #[test]
    fn endpoints_are_fixed() {
        for easing in ALL {
            assert!(easing.evaluate(0.0).abs() < 1e-12, "{easing:?} at 0");
            assert!((easing.evaluate(1.0) - 1.0).abs() < 1e-12, "{easing:?} at 1");
        }
    }

    #[test]
    fn symmetric_curves_pass_through_midpoint() {
        for easing in [
            Easing::Linear,
            Easing::QuadInOut,
            Easing::CubicInOut,
            Easing::SineInOut,
            Easing::ExpoInOut,
        ] {
            assert!((easing.evaluate(0.5) - 0.5).abs() < 1e-12, "{easing:?}");
        }
    }

    #[test]
    fn curves_are_non_decreasing() {
        for easing in ALL {
            let mut previous = easing.evaluate(0.0);
            for step in 1..=100 {
                let value = easing.evaluate(step as f64 / 100.0);
                assert!(value + 1e-12 >= previous, "{easing:?} at step {step}");
                previous = value;
            }
        }
    }

    #[test]
    fn expo_starts_slowly() {
        assert!(Easing::ExpoInOut.evaluate(0.1) < 0.01);
        assert!(Easing::ExpoInOut.evaluate(0.9) > 0.99);
    }

    #[test]
    fn parses_snake_case_names() {
        let easing: Easing = serde_json::from_str("\"expo_in_out\"").unwrap();
        assert_eq!(easing, Easing::ExpoInOut);
    }
}
