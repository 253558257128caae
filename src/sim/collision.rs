//! Collision detection and response for balls in grooves
//!
//! Balls are spheres; grooves are built from line segments and flat quads.
//! Every contact is resolved immediately by snapping the ball back onto the
//! surface and removing (then partly reflecting) the normal velocity.

use glam::Vec3;

use super::ball::Ball;
use super::piece::TrackPiece;
use super::primitive::CollisionPrimitive;
use crate::consts::{BALL_BOUNCINESS, BROAD_PHASE_REACH};
use crate::distance_xy;

/// Cheap reach test before the per-primitive checks
#[inline]
pub fn in_broad_phase(ball: &Ball, piece: &TrackPiece) -> bool {
    distance_xy(ball.position(), piece.position()) <= BROAD_PHASE_REACH + ball.radius
}

/// Test a ball against every groove primitive of a piece, resolving contacts
///
/// Returns true if any primitive was touched.
pub fn ball_piece_collision(ball: &mut Ball, piece: &TrackPiece) -> bool {
    if !in_broad_phase(ball, piece) {
        return false;
    }

    let mut collision = false;
    for primitive in piece.world_primitives() {
        collision |= ball_primitive_collision(ball, &primitive);
    }
    if collision {
        ball.mark_collided();
    }
    collision
}

/// Test a ball against a single world-space primitive
pub fn ball_primitive_collision(ball: &mut Ball, primitive: &CollisionPrimitive) -> bool {
    let contact = match *primitive {
        CollisionPrimitive::Line { v0, v1 } => line_contact(ball.position(), ball.radius, v0, v1),
        CollisionPrimitive::Plane { v0, v1, v2, v3 } => {
            plane_contact(ball.position(), ball.radius, [v0, v1, v2, v3])
        }
    };

    match contact {
        Some(point) => {
            resolve_point_collision(ball, point);
            true
        }
        None => false,
    }
}

/// Contact point between a sphere and a segment, if they overlap
///
/// Inside the segment the contact is the projection of the center; past
/// either end the endpoint acts as a cap.
pub fn line_contact(center: Vec3, radius: f32, v0: Vec3, v1: Vec3) -> Option<Vec3> {
    let d01 = (v1 - v0).normalize();
    let d10 = (v0 - v1).normalize();

    let along_from_v0 = d01.dot(center - v0);
    let projected = v0 + d01 * along_from_v0;
    if center.distance(projected) >= radius {
        return None;
    }

    let along_from_v1 = d10.dot(center - v1);
    if along_from_v0 > 0.0 && along_from_v1 > 0.0 {
        Some(projected)
    } else if center.distance(v0) < radius {
        Some(v0)
    } else if center.distance(v1) < radius {
        Some(v1)
    } else {
        None
    }
}

/// Contact point between a sphere and a horizontal quad, if they overlap
pub fn plane_contact(center: Vec3, radius: f32, corners: [Vec3; 4]) -> Option<Vec3> {
    let (min_x, max_x) = corners
        .iter()
        .fold((f32::INFINITY, f32::NEG_INFINITY), |(lo, hi), v| (lo.min(v.x), hi.max(v.x)));
    let (min_y, max_y) = corners
        .iter()
        .fold((f32::INFINITY, f32::NEG_INFINITY), |(lo, hi), v| (lo.min(v.y), hi.max(v.y)));

    let inside = center.x > min_x && center.x < max_x && center.y > min_y && center.y < max_y;
    if !inside {
        return None;
    }

    let projected = Vec3::new(center.x, center.y, corners[0].z);
    (center.distance(projected) < radius).then_some(projected)
}

/// Resolve a contact at `point`: damp and bounce the normal velocity, then
/// push the ball out so its surface touches the point
pub fn resolve_point_collision(ball: &mut Ball, point: Vec3) {
    let offset = ball.position() - point;
    let normal = offset.normalize_or_zero();

    let normal_velocity = normal * ball.velocity.dot(normal);
    ball.velocity -= normal_velocity;
    ball.velocity -= normal_velocity * BALL_BOUNCINESS;

    let penetration = offset.length() - ball.radius;
    ball.pose.position -= normal * penetration;
}

/// Sphere-sphere contact: exchange part of the normal velocity and separate
/// the pair symmetrically
pub fn ball_ball_collision(a: &mut Ball, b: &mut Ball) -> bool {
    let distance = a.position().distance(b.position());
    let reach = a.radius + b.radius;
    if distance >= reach {
        return false;
    }

    let normal = (a.position() - b.position()).normalize_or_zero();

    let relative = a.velocity - b.velocity;
    let transfer = normal * relative.dot(normal) * BALL_BOUNCINESS;
    a.velocity -= transfer;
    b.velocity += transfer;

    let delta = normal * ((reach - distance) / 2.0);
    a.pose.position += delta;
    b.pose.position -= delta;

    a.mark_collided();
    b.mark_collided();
    true
}
