//! The ball: the only dynamic body

use glam::Vec3;
use serde::{Deserialize, Serialize};

use super::geom::{Pose, Shape};
use crate::consts::{BALL_RADIUS, BALL_VELOCITY_LIMIT};

/// A ball entity
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Ball {
    pub pose: Pose,
    pub velocity: Vec3,
    pub radius: f32,
    acceleration: Vec3,
    /// Set by any contact, cleared when a diagnostic reader takes it
    #[serde(skip)]
    collided: bool,
}

impl Ball {
    pub fn new(position: Vec3) -> Self {
        Self {
            pose: Pose {
                position,
                rotation: Vec3::ZERO,
            },
            velocity: Vec3::ZERO,
            radius: BALL_RADIUS,
            acceleration: Vec3::ZERO,
            collided: false,
        }
    }

    #[inline]
    pub fn position(&self) -> Vec3 {
        self.pose.position
    }

    pub fn shape(&self) -> Shape {
        Shape::Sphere(self.radius)
    }

    pub fn acceleration(&self) -> Vec3 {
        self.acceleration
    }

    /// Accumulate a force for this frame (unit mass)
    pub fn apply_force(&mut self, force: Vec3) {
        self.acceleration += force;
    }

    pub(crate) fn mark_collided(&mut self) {
        self.collided = true;
    }

    pub fn collided(&self) -> bool {
        self.collided
    }

    /// Read and clear the collision flag
    pub fn take_collided(&mut self) -> bool {
        std::mem::take(&mut self.collided)
    }

    /// Cosmetic rolling from the horizontal velocity
    ///
    /// Rotation is applied in Z, Y, X order by the renderer for this to look right.
    pub fn roll(&mut self) {
        let horizontal = self.velocity.truncate();
        self.pose.rotation.z = self.velocity.y.atan2(self.velocity.x);
        self.pose.rotation.y += horizontal.length() / self.radius;
    }

    /// Semi-implicit Euler step with the horizontal speed ceiling
    pub fn update(&mut self) {
        self.velocity += self.acceleration;
        let limited = self.velocity.truncate().clamp_length_max(BALL_VELOCITY_LIMIT);
        self.velocity.x = limited.x;
        self.velocity.y = limited.y;
        self.pose.position += self.velocity;
        self.acceleration = Vec3::ZERO;
    }
}
