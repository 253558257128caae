//! Collision primitives and anchors in a piece's local unit-cube frame
//!
//! Local coordinates span `[-1/2, 1/2]` on every axis. Pieces never tilt, so
//! moving a primitive into the world only needs a translation and a rotation
//! about Z.

use glam::Vec3;
use serde::{Deserialize, Serialize};

use super::geom::Pose;

/// A collidable surface of a groove
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum CollisionPrimitive {
    /// Segment with capsule-like end caps
    Line { v0: Vec3, v1: Vec3 },
    /// Axis-aligned quad at constant Z
    Plane { v0: Vec3, v1: Vec3, v2: Vec3, v3: Vec3 },
}

impl CollisionPrimitive {
    pub fn line(v0: Vec3, v1: Vec3) -> Self {
        CollisionPrimitive::Line { v0, v1 }
    }

    /// Full-cell floor at height `z`
    pub fn floor(z: f32) -> Self {
        CollisionPrimitive::Plane {
            v0: Vec3::new(-0.5, -0.5, z),
            v1: Vec3::new(-0.5, 0.5, z),
            v2: Vec3::new(0.5, 0.5, z),
            v3: Vec3::new(0.5, -0.5, z),
        }
    }

    /// Move the primitive from the piece frame into the world
    pub fn transformed(&self, pose: &Pose) -> Self {
        match *self {
            CollisionPrimitive::Line { v0, v1 } => CollisionPrimitive::Line {
                v0: pose.place(v0),
                v1: pose.place(v1),
            },
            CollisionPrimitive::Plane { v0, v1, v2, v3 } => CollisionPrimitive::Plane {
                v0: pose.place(v0),
                v1: pose.place(v1),
                v2: pose.place(v2),
                v3: pose.place(v3),
            },
        }
    }
}

/// A way through a piece: where the ball enters and, unless terminal, leaves
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Anchor {
    pub enter: Vec3,
    pub exit: Option<Vec3>,
}

impl Anchor {
    pub const fn new(enter: Vec3, exit: Vec3) -> Self {
        Self {
            enter,
            exit: Some(exit),
        }
    }

    pub const fn terminal(enter: Vec3) -> Self {
        Self { enter, exit: None }
    }

    pub fn is_terminal(&self) -> bool {
        self.exit.is_none()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f32::consts::FRAC_PI_2;

    #[test]
    fn test_transformed_line() {
        let pose = Pose::new(Vec3::new(1.0, 1.0, 0.0), FRAC_PI_2);
        let line = CollisionPrimitive::line(Vec3::new(0.5, 0.0, 0.0), Vec3::new(-0.5, 0.0, 0.0));
        let CollisionPrimitive::Line { v0, v1 } = line.transformed(&pose) else {
            panic!("line expected");
        };
        assert!((v0 - Vec3::new(1.0, 1.5, 0.0)).length() < 1e-6);
        assert!((v1 - Vec3::new(1.0, 0.5, 0.0)).length() < 1e-6);
    }

    #[test]
    fn test_floor_keeps_height_after_transform() {
        let pose = Pose::new(Vec3::new(0.0, 0.0, 2.0), 1.0);
        let CollisionPrimitive::Plane { v0, v1, v2, v3 } =
            CollisionPrimitive::floor(-0.2).transformed(&pose)
        else {
            panic!("plane expected");
        };
        for v in [v0, v1, v2, v3] {
            assert!((v.z - 1.8).abs() < 1e-6);
        }
    }
}
