use std::f64::consts::PI;

use rand::Rng;

const PULSE_PERIOD_MS: i64 = 1500;

/// Halo drawn around the live points, one sample of a 1.5s cosine cycle.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Pulse {
    pub radius: f64,
    pub alpha: f64,
    pub glow: f64,
}

impl Pulse {
    pub fn at(now_ms: i64) -> Self {
        let t = now_ms.rem_euclid(PULSE_PERIOD_MS) as f64 / PULSE_PERIOD_MS as f64;
        let pulse = 0.5 + 0.5 * (2.0 * PI * t).cos();
        let rise = 1.0 - pulse;

        Pulse {
            radius: 7.0 + 3.0 * rise,
            alpha: 0.1 + 0.9 * rise,
            glow: 2.0 + 8.0 * rise,
        }
    }
}

/// Small wobble added to the drawn copy of the live price so the point looks
/// alive between refreshes. Bounded by ±0.175.
pub fn jitter<R: Rng + ?Sized>(now_ms: i64, rng: &mut R) -> f64 {
    (now_ms as f64 / 200.0).sin() * 0.15 + (rng.random::<f64>() - 0.5) * 0.05
}
