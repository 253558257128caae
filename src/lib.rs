//! Endless Marble Run - a procedurally chained marble track simulation
//!
//! Core modules:
//! - `sim`: Frame-stepped simulation (track catalog, chain builder, collisions, world)
//! - `config`: Data-driven simulation and world configuration
//! - `render`: Plain-data hand-off for an external renderer
//! - `error`: Error types shared across the crate

pub mod config;
pub mod error;
pub mod render;
pub mod sim;

pub use config::{SimConfig, WorldConfig};
pub use error::{ConfigError, GenerationError, PlacementError, SimError};

use glam::{Vec2, Vec3};

/// Simulation constants
pub mod consts {
    /// Ball defaults
    pub const BALL_RADIUS: f32 = 0.18;
    /// Restitution used for ball/groove and ball/ball contacts
    pub const BALL_BOUNCINESS: f32 = 0.3;
    /// Ceiling on horizontal ball speed (units per frame)
    pub const BALL_VELOCITY_LIMIT: f32 = 0.03;

    /// Half-width of the groove cut into every piece
    pub const GROOVE_RADIUS: f32 = 1.0 / 5.0;

    /// Broad phase reach around a piece center (the cube's diagonal)
    pub const BROAD_PHASE_REACH: f32 = 1.732_050_8;
    /// Footprint circle of a grid cell, used to detect free-falling balls
    pub const FREE_FALL_REACH: f32 = std::f32::consts::FRAC_1_SQRT_2;

    /// Pieces this far above the top ball start drifting away
    pub const RETIRE_ABOVE_TOP: f32 = 2.0;
    /// Pieces this far above the top ball are dropped
    pub const PRUNE_ABOVE_TOP: f32 = 10.0;
    /// Generate more track once the chain end is less than this below the bottom ball
    pub const GENERATE_BELOW_BOTTOM: f32 = 2.0;
    /// Upward drift speed range given to retiring pieces
    pub const DRIFT_SPEED_MIN: f32 = 0.05;
    pub const DRIFT_SPEED_MAX: f32 = 0.1;

    /// Maximum placement attempts per generation call to prevent endless retries
    pub const MAX_PLACEMENT_ATTEMPTS: u32 = 1000;
}

/// Round half up, the grid convention used for piece placement.
///
/// Differs from `f32::round` for negative halves: `-2.5` becomes `-2.0`.
#[inline]
pub fn round_half_up(value: f32) -> f32 {
    (value + 0.5).floor()
}

/// Rotate a vector about the vertical (Z) axis
#[inline]
pub fn rotate_z(v: Vec3, angle: f32) -> Vec3 {
    let (sin, cos) = angle.sin_cos();
    Vec3::new(v.x * cos - v.y * sin, v.x * sin + v.y * cos, v.z)
}

/// Signed angle that rotates `from` onto `to` in the XY plane.
///
/// Positive is counter-clockwise. Z components are ignored.
#[inline]
pub fn signed_angle_xy(from: Vec3, to: Vec3) -> f32 {
    let a = from.truncate();
    let b = to.truncate();
    a.perp_dot(b).atan2(a.dot(b))
}

/// Normalize angle to [-PI, PI)
pub fn normalize_angle(mut angle: f32) -> f32 {
    use std::f32::consts::PI;
    while angle >= PI {
        angle -= 2.0 * PI;
    }
    while angle < -PI {
        angle += 2.0 * PI;
    }
    angle
}

/// Distance between two points ignoring Z
#[inline]
pub fn distance_xy(a: Vec3, b: Vec3) -> f32 {
    a.truncate().distance(b.truncate())
}

/// Snap a planar position onto the integer grid
#[inline]
pub fn grid_cell(pos: Vec2) -> (i32, i32) {
    (round_half_up(pos.x) as i32, round_half_up(pos.y) as i32)
}
