//! A placed track piece

use glam::Vec3;
use serde::{Deserialize, Serialize};

use super::catalog::PieceKind;
use super::geom::{Pose, Shape};
use super::primitive::{Anchor, CollisionPrimitive};

/// One grid-aligned piece of track
///
/// Geometry comes from the catalog; only the pose and the retirement drift
/// change over the piece's life.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrackPiece {
    pub kind: PieceKind,
    pub pose: Pose,
    /// Vertical drift speed, non-zero once the piece is retiring
    pub drift: f32,
}

impl TrackPiece {
    pub fn new(kind: PieceKind, position: Vec3, heading: f32) -> Self {
        Self {
            kind,
            pose: Pose::new(position, heading),
            drift: 0.0,
        }
    }

    #[inline]
    pub fn position(&self) -> Vec3 {
        self.pose.position
    }

    pub fn shape(&self) -> Shape {
        self.kind.footprint().shape()
    }

    pub fn anchors(&self) -> &'static [Anchor] {
        self.kind.anchors()
    }

    pub fn is_retiring(&self) -> bool {
        self.drift != 0.0
    }

    /// Collision primitives in world space
    pub fn world_primitives(&self) -> impl Iterator<Item = CollisionPrimitive> + '_ {
        self.kind
            .primitives()
            .iter()
            .map(move |primitive| primitive.transformed(&self.pose))
    }

    /// Local point mapped into world space
    #[inline]
    pub fn place(&self, local: Vec3) -> Vec3 {
        self.pose.place(local)
    }

    /// Advance retirement drift by one frame
    pub fn update(&mut self) {
        self.pose.position.z += self.drift;
    }
}
