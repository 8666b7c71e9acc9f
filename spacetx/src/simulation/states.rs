//! Core state types for the transaction galaxy.
//!
//! Defines the value and record types shared by every component:
//! - `OrbitDescriptor` the numeric parameters of one periodic orbit
//! - `Entity` one simulated body derived from one transaction
//! - `EntityKind` the size class of a body, picked from the transaction amount
//! - `Transaction` the input event (the core only reads `amount`)

use std::f64::consts::TAU;
use std::fmt;

use nalgebra::{Rotation3, Vector3};
use serde::{Deserialize, Serialize};

pub type NVec3 = Vector3<f64>;

/// Opaque entity handle, unique for the lifetime of the process
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct EntityId(pub u64);

impl fmt::Display for EntityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "entity-{}", self.0)
    }
}

/// Amount thresholds separating the size classes (lower bound is exclusive)
pub const MAJOR_THRESHOLD: f64 = 5000.0;
pub const RINGED_THRESHOLD: f64 = 1000.0;
pub const BODY_THRESHOLD: f64 = 500.0;
pub const RADIANT_THRESHOLD: f64 = 300.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EntityKind {
    SmallBody,
    Body,
    RingedBody,
    Radiant, // star
    Major,
}

impl EntityKind {
    /// Size class for a transaction amount.
    ///
    /// The tiers partition `(0, inf)` without overlap:
    /// `(5000, inf)` Major, `(1000, 5000]` RingedBody, `(500, 1000]` Body,
    /// `(300, 500]` Radiant, everything else SmallBody.
    pub fn classify(amount: f64) -> Self {
        if amount > MAJOR_THRESHOLD {
            EntityKind::Major
        } else if amount > RINGED_THRESHOLD {
            EntityKind::RingedBody
        } else if amount > BODY_THRESHOLD {
            EntityKind::Body
        } else if amount > RADIANT_THRESHOLD {
            EntityKind::Radiant
        } else {
            EntityKind::SmallBody
        }
    }

    /// Visual scale of a body of this class with the given amount.
    ///
    /// Each tier's formula meets its neighbour's at the shared threshold,
    /// so scale is continuous and non-decreasing in `amount`:
    /// `1.0` at 300, `1.5` at 500, `2.0` at 1000, `3.0` at 5000, capped at `5.0`.
    pub fn scale(self, amount: f64) -> f64 {
        match self {
            EntityKind::Major => 3.0 + (amount / MAJOR_THRESHOLD).log10().min(2.0),
            EntityKind::RingedBody => 2.0 + (amount - RINGED_THRESHOLD) / 4000.0,
            EntityKind::Body => 1.5 + (amount - BODY_THRESHOLD) / 1000.0,
            EntityKind::Radiant => 1.0 + (amount - RADIANT_THRESHOLD) / 400.0,
            EntityKind::SmallBody => 0.5 + amount / 600.0,
        }
    }

    /// Multiplier applied to the stored orbital period when advancing phase.
    /// Heavy and ringed bodies drift slower than their raw period implies.
    pub fn period_multiplier(self) -> f64 {
        match self {
            EntityKind::Major => 5.0,
            EntityKind::RingedBody => 1.67,
            _ => 1.0,
        }
    }

    pub fn is_major(self) -> bool {
        self == EntityKind::Major
    }
}

/// Parameters of one periodic orbit. Produced whole by the synthesizer and
/// replaced whole on capture, never patched field by field.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct OrbitDescriptor {
    pub radius: f64,           // > 0 for a usable orbit
    pub eccentricity: f64,     // [0, 0.95]
    pub period: f64,           // seconds
    pub angular_velocity: f64, // 2*pi*radius/period
    pub tilt: f64,             // radians, rotation about world x
}

impl OrbitDescriptor {
    pub fn new(radius: f64, eccentricity: f64, period: f64, tilt: f64) -> Self {
        Self {
            radius,
            eccentricity,
            period,
            angular_velocity: TAU * radius / period,
            tilt,
        }
    }

    /// True when the orbit cannot be integrated (non-positive radius or period, or any non-finite field)
    pub fn is_degenerate(&self) -> bool {
        let all_finite = self.radius.is_finite()
            && self.eccentricity.is_finite()
            && self.period.is_finite()
            && self.angular_velocity.is_finite()
            && self.tilt.is_finite();
        !all_finite || self.radius <= 0.0 || self.period <= 0.0
    }

    /// Tilt as a rotation about the world x axis
    pub fn rotation(&self) -> Rotation3<f64> {
        Rotation3::from_axis_angle(&Vector3::x_axis(), self.tilt)
    }
}

/// One simulated body.
///
/// With `parent_id = None` the orbit describes absolute motion about the
/// system origin. With `parent_id = Some(p)` it describes motion relative to
/// entity `p`. Major bodies never have a parent.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Entity {
    pub id: EntityId,
    pub position: NVec3,   // absolute, recomputed every tick
    pub orbit: OrbitDescriptor,
    pub arm_index: usize,  // galaxy arm; kept for diagnostics once captured
    pub phase_angle: f64,  // [0, 2*pi)
    pub scale: f64,
    pub kind: EntityKind,
    pub parent_id: Option<EntityId>,
    pub created_at: f64,   // simulation clock, seconds
    pub source_amount: f64,
}

impl Entity {
    pub fn is_captured(&self) -> bool {
        self.parent_id.is_some()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransactionDirection {
    #[default]
    Buy,
    Sell,
}

/// Input event from the transaction source
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Transaction {
    pub id: String,
    pub amount: f64,
    pub timestamp: f64,
    pub direction: TransactionDirection,
}

impl Transaction {
    pub fn new(id: impl Into<String>, amount: f64) -> Self {
        Self {
            id: id.into(),
            amount,
            timestamp: 0.0,
            direction: TransactionDirection::Buy,
        }
    }
}
