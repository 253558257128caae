//! Groove geometry generators
//!
//! Free functions that emit collision primitives for the recurring groove
//! shapes. Catalog entries combine them through [`GeometryBuilder`].

use glam::Vec3;
use std::f32::consts::{FRAC_PI_2, PI, TAU};

use super::primitive::{Anchor, CollisionPrimitive};
use crate::consts::GROOVE_RADIUS;

const R: f32 = GROOVE_RADIUS;

/// Accumulates the primitives and anchors of one piece kind
#[derive(Debug, Default)]
pub struct GeometryBuilder {
    pub primitives: Vec<CollisionPrimitive>,
    pub anchors: Vec<Anchor>,
}

impl GeometryBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Straight groove without anchors
    pub fn straight(mut self, start: Vec3, end: Vec3) -> Self {
        self.primitives.extend(straight_lines(start, end));
        self
    }

    /// Straight groove plus the two anchors running along it, the second
    /// mirrored through the vertical axis
    pub fn straight_through(mut self, start: Vec3, end: Vec3) -> Self {
        self.primitives.extend(straight_lines(start, end));
        let mirror = |v: Vec3| Vec3::new(-v.x, -v.y, v.z);
        self.anchors.push(Anchor::new(start, end));
        self.anchors.push(Anchor::new(mirror(start), mirror(end)));
        self
    }

    /// Quarter-circle groove around the corner `center` with a floor under it
    pub fn curve(mut self, enter: Vec3, exit: Vec3, center: Vec3) -> Self {
        self.primitives.extend(curve_lines(center, 0.5 + R, 6));
        self.primitives.extend(curve_lines(center, 0.5 - R, 6));
        self.primitives.push(CollisionPrimitive::floor(center.z - R));
        let swap = |v: Vec3| Vec3::new(v.y, v.x, v.z);
        self.anchors.push(Anchor::new(enter, exit));
        self.anchors.push(Anchor::new(swap(enter), swap(exit)));
        self
    }

    pub fn floor(mut self, z: f32) -> Self {
        self.primitives.push(CollisionPrimitive::floor(z));
        self
    }

    pub fn primitives(mut self, primitives: impl IntoIterator<Item = CollisionPrimitive>) -> Self {
        self.primitives.extend(primitives);
        self
    }

    pub fn anchor(mut self, enter: Vec3, exit: Vec3) -> Self {
        self.anchors.push(Anchor::new(enter, exit));
        self
    }

    /// Same exit reached from several entries
    pub fn funnel_into(mut self, enters: &[Vec3], exit: Vec3) -> Self {
        self.anchors
            .extend(enters.iter().map(|&enter| Anchor::new(enter, exit)));
        self
    }

    pub fn terminal(mut self, enters: &[Vec3]) -> Self {
        self.anchors
            .extend(enters.iter().map(|&enter| Anchor::terminal(enter)));
        self
    }
}

/// Bottom, left and right rails of a straight groove from `start` to `end`
pub fn straight_lines(start: Vec3, end: Vec3) -> [CollisionPrimitive; 3] {
    // Vertical holes have no horizontal direction to derive the rails from
    let (horizontal, vertical) = if start.x != end.x || start.y != end.y {
        let direction = (end - start).normalize();
        (Vec3::Z.cross(direction).normalize(), Vec3::Z)
    } else {
        (Vec3::X, Vec3::Y)
    };

    let bottom = vertical * -R;
    let left = horizontal * R;
    let right = horizontal * -R;

    [
        CollisionPrimitive::line(start + bottom, end + bottom),
        CollisionPrimitive::line(start + left, end + left),
        CollisionPrimitive::line(start + right, end + right),
    ]
}

/// Polyline approximating a quarter circle of `radius` from angle π to 3π/2
pub fn curve_lines(center: Vec3, radius: f32, segments: usize) -> Vec<CollisionPrimitive> {
    let step = FRAC_PI_2 / segments as f32;
    (0..segments)
        .map(|i| {
            let a = PI + i as f32 * step;
            let b = a + step;
            CollisionPrimitive::line(
                center + Vec3::new(radius * a.cos(), radius * a.sin(), 0.0),
                center + Vec3::new(radius * b.cos(), radius * b.sin(), 0.0),
            )
        })
        .collect()
}

/// Four grooves on the top face meeting at a central hole
pub fn cross_hole() -> Vec<CollisionPrimitive> {
    let top = 0.5;
    [
        (Vec3::new(R, 0.0, top), Vec3::new(0.5, 0.0, top)),
        (Vec3::new(-R, 0.0, top), Vec3::new(-0.5, 0.0, top)),
        (Vec3::new(0.0, R, top), Vec3::new(0.0, 0.5, top)),
        (Vec3::new(0.0, -R, top), Vec3::new(0.0, -0.5, top)),
    ]
    .into_iter()
    .flat_map(|(start, end)| straight_lines(start, end))
    .collect()
}

/// Drop from the central hole to the bottom-level exit
pub fn ramp_a() -> Vec<CollisionPrimitive> {
    [
        (Vec3::new(0.0, 0.0, R), Vec3::ZERO),
        (Vec3::new(0.0, -R, R), Vec3::ZERO),
        (Vec3::new(0.0, -R, 0.0), Vec3::new(0.0, 0.5, 0.0)),
    ]
    .into_iter()
    .flat_map(|(start, end)| straight_lines(start, end))
    .collect()
}

/// Drop from the central hole through the floor into the cell below
pub fn ramp_b() -> Vec<CollisionPrimitive> {
    [
        (Vec3::new(0.0, 0.0, R), Vec3::new(0.0, 0.0, -0.5 + R)),
        (Vec3::new(0.0, -R, -0.5 + 2.0 * R), Vec3::new(0.0, 0.0, -0.5 + R)),
        (Vec3::new(0.0, -R, -0.5 + R), Vec3::new(0.0, 0.5, -0.5 + R)),
    ]
    .into_iter()
    .flat_map(|(start, end)| straight_lines(start, end))
    .collect()
}

/// Two mirrored curved grooves on the top face opening toward -Y
pub fn three_way_turn() -> Vec<CollisionPrimitive> {
    let segments = 8;
    let step = FRAC_PI_2 / segments as f32;
    let radius_inner = 0.5 - R;
    let radius_bottom = 0.5;
    let radius_outer = 0.5 + R;
    let limit = 0.5 - R;

    // Arc point around the (-1/2, -1/2) corner, mirrored in X when `sign` is -1
    let arc = |sign: f32, radius: f32, angle: f32, z: f32| {
        Vec3::new(
            sign * (-0.5 + radius * angle.cos()),
            -0.5 + radius * angle.sin(),
            z,
        )
    };

    let mut lines = Vec::new();
    for i in 0..segments {
        let a = i as f32 * step;
        let b = a + step;
        for sign in [1.0, -1.0] {
            lines.push(CollisionPrimitive::line(
                arc(sign, radius_inner, a, 0.5),
                arc(sign, radius_inner, b, 0.5),
            ));
        }
        if radius_bottom * a.cos() < limit {
            for sign in [-1.0, 1.0] {
                lines.push(CollisionPrimitive::line(
                    arc(sign, radius_bottom, a, 0.5 - R),
                    arc(sign, radius_bottom, b, 0.5 - R),
                ));
            }
        }
        if radius_outer * a.cos() < limit {
            for sign in [-1.0, 1.0] {
                lines.push(CollisionPrimitive::line(
                    arc(sign, radius_outer, a, 0.5),
                    arc(sign, radius_outer, b, 0.5),
                ));
            }
        }
    }
    lines
}

/// Cone narrowing from the top face into a central hole
pub fn funnel() -> Vec<CollisionPrimitive> {
    let mut lines = Vec::with_capacity(32);
    for i in 0..16 {
        let alpha = i as f32 * TAU / 16.0;
        let (sin, cos) = alpha.sin_cos();
        lines.push(CollisionPrimitive::line(
            Vec3::new(cos / 2.0, sin / 2.0, 0.5),
            Vec3::new(R * cos, R * sin, R),
        ));
        lines.push(CollisionPrimitive::line(
            Vec3::new(cos / 2.0, sin / 2.0, 1.0 - R),
            Vec3::new(cos / 2.0, sin / 2.0, 0.5),
        ));
    }
    lines
}

/// Grooves at height `z` leading into a hole that ends at `depth`
pub fn end_hole(z: f32, depth: f32) -> Vec<CollisionPrimitive> {
    let hole_radius = 3.7 / 5.0 / 2.0;
    let mut primitives: Vec<CollisionPrimitive> = [
        (Vec3::new(0.5, 0.0, z), Vec3::new(hole_radius, 0.0, z)),
        (Vec3::new(-0.5, 0.0, z), Vec3::new(-hole_radius, 0.0, z)),
        (Vec3::new(0.0, hole_radius, z), Vec3::new(0.0, 0.5, z)),
        (Vec3::new(0.0, -hole_radius, z), Vec3::new(0.0, -0.5, z)),
    ]
    .into_iter()
    .flat_map(|(start, end)| straight_lines(start, end))
    .collect();

    for i in 0..16 {
        let angle = i as f32 * TAU / 16.0;
        let x = hole_radius * angle.cos();
        let y = hole_radius * angle.sin();
        primitives.push(CollisionPrimitive::line(
            Vec3::new(x, y, z - R),
            Vec3::new(x, y, depth),
        ));
    }
    primitives.push(CollisionPrimitive::floor(depth));
    primitives
}
