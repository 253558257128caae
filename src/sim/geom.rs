//! Pose and shape descriptors shared by pieces and balls

use glam::Vec3;
use serde::{Deserialize, Serialize};

use crate::rotate_z;

/// World placement of an item
///
/// Only `rotation.z` affects chaining and collisions. Balls use `rotation.x`
/// and `rotation.y` for their cosmetic rolling.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Pose {
    pub position: Vec3,
    pub rotation: Vec3,
}

impl Pose {
    pub fn new(position: Vec3, heading: f32) -> Self {
        Self {
            position,
            rotation: Vec3::new(0.0, 0.0, heading),
        }
    }

    /// Heading about the vertical axis
    #[inline]
    pub fn heading(&self) -> f32 {
        self.rotation.z
    }

    /// Map a point from the local frame into the world
    #[inline]
    pub fn place(&self, local: Vec3) -> Vec3 {
        self.position + rotate_z(local, self.rotation.z)
    }
}

/// Sizing descriptor (never used for intersection)
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum Shape {
    Sphere(f32),
    /// Unit footprint cube, value is the vertical half-extent
    Cube(f32),
}

impl Shape {
    /// Radius for spheres, full height for cubes
    pub fn size(&self) -> f32 {
        match *self {
            Shape::Sphere(radius) => radius,
            Shape::Cube(half_extent) => half_extent * 2.0,
        }
    }
}
