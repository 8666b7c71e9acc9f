//! Orbit integration for the galaxy
//!
//! Advances each entity's phase angle by `delta_time` and recomputes its
//! Cartesian position on a log-spiral galaxy arm. Positions are closed-form
//! functions of the phase, so there is no velocity state and no error
//! accumulation: a zero step reproduces the same position exactly.

use std::f64::consts::TAU;

use crate::simulation::error::SimError;
use crate::simulation::params::Parameters;
use crate::simulation::states::{Entity, EntityKind, NVec3, OrbitDescriptor};

/// Frame an orbit is integrated in
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum OrbitFrame {
    /// About the system origin, on the entity's galaxy arm
    Galactic,
    /// About a parent body at this absolute position; arm offset is ignored
    Parent(NVec3),
}

/// Position on a spiral arm for a given phase.
///
/// - `orbit_angle = phase + 2*pi*arm_index/galaxy_arms`
/// - planar `(r cos, _, r sin)` scaled by `exp(spiral_tightness * orbit_angle)`
/// - `y = sin(2 * orbit_angle) * vertical_scale * r` (not spiral-scaled)
/// - rotated by the orbit tilt about the world x axis
pub fn spiral_position(orbit: &OrbitDescriptor, phase_angle: f64, arm_index: usize, params: &Parameters) -> NVec3 {
    let orbit_angle = phase_angle + params.arm_offset(arm_index);
    let r = orbit.radius;

    let spiral_factor = (params.spiral_tightness * orbit_angle).exp();
    let mut position = NVec3::new(r * orbit_angle.cos(), 0.0, r * orbit_angle.sin()) * spiral_factor;
    position.y = (2.0 * orbit_angle).sin() * params.vertical_scale * r;

    orbit.rotation() * position
}

/// Period used to advance the phase: the stored period times the kind multiplier
pub fn effective_period(orbit: &OrbitDescriptor, kind: EntityKind) -> f64 {
    orbit.period * kind.period_multiplier()
}

/// `(phase + delta_time/period * 2*pi) mod 2*pi`, always in `[0, 2*pi)`
pub fn advance_phase(phase_angle: f64, delta_time: f64, period: f64) -> f64 {
    let next = (phase_angle + (delta_time / period) * TAU).rem_euclid(TAU);
    // rem_euclid can round up to exactly TAU for tiny negative inputs
    if next >= TAU {
        0.0
    } else {
        next
    }
}

/// Advance one entity by `delta_time` and store its new absolute position.
///
/// A degenerate orbit leaves phase and position untouched and returns
/// `SimError::DegenerateOrbit`; the caller decides how loudly to complain.
pub fn advance(entity: &mut Entity, delta_time: f64, frame: OrbitFrame, params: &Parameters) -> Result<NVec3, SimError> {
    let period = effective_period(&entity.orbit, entity.kind);
    if entity.orbit.is_degenerate() || !(period.is_finite() && period > 0.0) {
        return Err(SimError::DegenerateOrbit {
            entity: entity.id,
            radius: entity.orbit.radius,
        });
    }

    entity.phase_angle = advance_phase(entity.phase_angle, delta_time, period);

    let position = match frame {
        OrbitFrame::Galactic => spiral_position(&entity.orbit, entity.phase_angle, entity.arm_index, params),
        OrbitFrame::Parent(origin) => origin + spiral_position(&entity.orbit, entity.phase_angle, 0, params),
    };

    entity.position = position;
    Ok(position)
}
