//! Smooth one-dimensional value noise.

use rand::Rng;

const TABLE_SIZE: usize = 256;

/// Deterministic, smoothly varying pseudo-random signal over the real line.
///
/// A table of random magnitudes is drawn once at construction. Sampling at
/// `x` blends the entries either side of `floor(x)` with a quintic fade, so
/// the output is continuous with a continuous first derivative and wraps
/// around the table for arbitrarily large inputs.
#[derive(Debug, Clone)]
pub struct Noise1D {
    values: Vec<f64>,
    amplitude: f64,
    scale: f64,
}

impl Noise1D {
    /// Creates a noise source seeded from the thread-local RNG.
    pub fn new() -> Self {
        Self::with_rng(&mut rand::thread_rng())
    }

    /// Creates a noise source whose table is drawn from `rng`.
    ///
    /// ```
    /// use rand::SeedableRng;
    /// use wavy_line_core::Noise1D;
    ///
    /// let mut rng = rand::rngs::StdRng::seed_from_u64(7);
    /// let noise = Noise1D::with_rng(&mut rng);
    /// assert!((0.0..=1.0).contains(&noise.value_at(12.5)));
    /// ```
    pub fn with_rng<R: Rng + ?Sized>(rng: &mut R) -> Self {
        let values = (0..TABLE_SIZE).map(|_| rng.gen::<f64>()).collect();
        Self {
            values,
            amplitude: 1.0,
            scale: 1.0,
        }
    }

    /// Multiplies every sample. The default of `1.0` keeps output in `[0, 1]`.
    pub fn with_amplitude(mut self, amplitude: f64) -> Self {
        self.amplitude = amplitude;
        self
    }

    /// Stretches the input axis; larger values vary faster.
    pub fn with_scale(mut self, scale: f64) -> Self {
        self.scale = scale;
        self
    }

    pub fn amplitude(&self) -> f64 {
        self.amplitude
    }

    pub fn scale(&self) -> f64 {
        self.scale
    }

    /// Samples the signal at `x`.
    pub fn value_at(&self, x: f64) -> f64 {
        let scaled = x * self.scale;
        let floor = scaled.floor();
        let t = scaled - floor;

        let min = (floor as i64).rem_euclid(TABLE_SIZE as i64) as usize;
        let max = (min + 1) % TABLE_SIZE;

        lerp(self.values[min], self.values[max], fade(t)) * self.amplitude
    }
}

impl Default for Noise1D {
    fn default() -> Self {
        Self::new()
    }
}

#[inline]
fn fade(t: f64) -> f64 {
    t * t * t * (t * (t * 6.0 - 15.0) + 10.0)
}

#[inline]
fn lerp(a: f64, b: f64, t: f64) -> f64 {
    a + (b - a) * t
}

#[cfg(test)]
mod tests {
    use rand::{rngs::StdRng, SeedableRng};

    use super::*;

    fn seeded(seed: u64) -> Noise1D {
        Noise1D::with_rng(&mut StdRng::seed_from_u64(seed))
    }

    #[test]
    fn stays_within_unit_range() {
        let noise = seeded(1);
        for step in -5_000..5_000 {
            let x = step as f64 * 0.137;
            let value = noise.value_at(x);
            assert!((0.0..=1.0).contains(&value), "value {value} at {x}");
        }
    }

    #[test]
    fn is_deterministic_per_instance() {
        let noise = seeded(2);
        for x in [0.0, 0.25, 17.9, 1e6 + 0.5, -3.3] {
            assert_eq!(noise.value_at(x), noise.value_at(x));
        }
    }

    #[test]
    fn is_continuous_across_integer_boundaries() {
        let noise = seeded(3);
        let epsilon = 1e-9;
        for i in 0..600 {
            let boundary = i as f64;
            let before = noise.value_at(boundary - epsilon);
            let after = noise.value_at(boundary + epsilon);
            assert!((before - after).abs() < 1e-6, "jump at {boundary}");
        }
    }

    #[test]
    fn small_steps_give_small_changes() {
        let noise = seeded(4);
        let mut previous = noise.value_at(0.0);
        for step in 1..10_000 {
            let value = noise.value_at(step as f64 * 0.001);
            assert!((value - previous).abs() < 0.01);
            previous = value;
        }
    }

    #[test]
    fn hits_table_values_at_integers() {
        let noise = seeded(5);
        assert_eq!(noise.value_at(3.0), noise.values[3]);
        assert_eq!(noise.value_at(TABLE_SIZE as f64 + 3.0), noise.values[3]);
        assert_eq!(noise.value_at(-1.0), noise.values[TABLE_SIZE - 1]);
    }

    #[test]
    fn amplitude_and_scale_reshape_output() {
        let base = seeded(6);
        let shaped = base.clone().with_amplitude(2.0).with_scale(0.5);

        assert_eq!(shaped.value_at(8.0), base.value_at(4.0) * 2.0);
        assert_eq!(shaped.amplitude(), 2.0);
        assert_eq!(shaped.scale(), 0.5);
    }
}
