//! Orbit parameter synthesis
//!
//! Maps a transaction magnitude onto an `OrbitDescriptor`. Larger amounts
//! give wider, more eccentric and slower orbits. The only randomness is one
//! tilt jitter per call (plus the capture radius draw for captured orbits),
//! taken from the caller's random source so runs are reproducible under a
//! fixed seed.
//!
//! Callers must reject `magnitude <= 0` before calling; the formulas take
//! `log10(magnitude)`.

use rand::Rng;

use crate::simulation::params::Parameters;
use crate::simulation::states::OrbitDescriptor;

/// Upper bound on synthesized eccentricity
pub const MAX_ECCENTRICITY: f64 = 0.95;

/// Free orbit about the galactic centre
///
/// - `eccentricity = min(0.95, log10(m) * 0.05)`, floored at 0
/// - `radius = min_radius + log10(m)/5 * (max_radius - min_radius)`
/// - `period = base_orbital_period * sqrt((radius/min_radius)^3)`
/// - `tilt = U(-0.5, 0.5) * max_tilt * (1 + log10(m) * 0.1)`, clamped to `[-max_tilt, max_tilt]`
pub fn synthesize<R: Rng + ?Sized>(magnitude: f64, params: &Parameters, rng: &mut R) -> OrbitDescriptor {
    let log_m = magnitude.log10();

    let eccentricity = (log_m * 0.05).clamp(0.0, MAX_ECCENTRICITY);

    let jitter: f64 = rng.gen_range(-0.5..0.5);
    let tilt = (jitter * params.max_tilt * (1.0 + log_m * 0.1)).clamp(-params.max_tilt, params.max_tilt);

    let radius = params.min_radius + (log_m / 5.0) * (params.max_radius - params.min_radius);

    // Kepler's third law, normalised to the innermost orbit
    let period = params.base_orbital_period * (radius / params.min_radius).powi(3).sqrt();

    OrbitDescriptor::new(radius, eccentricity, period, tilt)
}

/// Orbit about a capturing parent of visual scale `parent_scale`
///
/// Starts from `synthesize` and then: radius becomes `parent_scale * U(2, 5)`,
/// eccentricity is halved, period is fixed at half the base period, and
/// angular velocity is recomputed.
pub fn synthesize_captured<R: Rng + ?Sized>(
    magnitude: f64,
    parent_scale: f64,
    params: &Parameters,
    rng: &mut R,
) -> OrbitDescriptor {
    let base = synthesize(magnitude, params, rng);

    let radius = parent_scale * rng.gen_range(2.0..=5.0);
    let period = params.base_orbital_period * 0.5;

    OrbitDescriptor::new(radius, base.eccentricity * 0.5, period, base.tilt)
}
