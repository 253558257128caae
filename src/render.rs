//! Render hand-off
//!
//! Flattens the world into plain `#[repr(C)]` records an external renderer can
//! upload as-is. Meshes are the renderer's business; it keys them by kind id.

use bytemuck::{Pod, Zeroable};
use glam::Vec3;

use crate::sim::{Ball, CollisionPrimitive, PieceKind, TrackPiece, World};

/// Kind id used for balls
pub const BALL_KIND: u32 = u32::MAX;

/// One drawable object
#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq, Pod, Zeroable)]
pub struct RenderInstance {
    pub translation: [f32; 3],
    /// Euler angles, applied Z then Y then X
    pub rotation: [f32; 3],
    /// Edge length for pieces, radius for balls
    pub size: f32,
    /// `PieceKind::id` or `BALL_KIND`
    pub kind: u32,
    pub color: [f32; 4],
}

/// World-space debug line
#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq, Pod, Zeroable)]
pub struct LineSegment {
    pub start: [f32; 3],
    pub end: [f32; 3],
    pub color: [f32; 4],
}

impl LineSegment {
    pub fn new(start: Vec3, end: Vec3, color: [f32; 4]) -> Self {
        Self {
            start: start.to_array(),
            end: end.to_array(),
            color,
        }
    }
}

/// Colors for world elements
pub mod colors {
    pub const BALL: [f32; 4] = [1.0, 1.0, 1.0, 1.0];
    pub const BALL_HIT: [f32; 4] = [1.0, 0.0, 0.0, 1.0];
    pub const BALL_FREE: [f32; 4] = [0.0, 1.0, 0.0, 1.0];
    pub const LINE: [f32; 4] = [1.0, 0.0, 0.0, 1.0];
    pub const PLANE: [f32; 4] = [1.0, 0.0, 1.0, 1.0];
    pub const ANCHOR: [f32; 4] = [1.0, 1.0, 0.0, 1.0];
}

/// Piece color, stable per kind
pub fn piece_color(kind: PieceKind) -> [f32; 4] {
    // Golden-ratio hue steps keep neighbouring ids apart
    let hue = (kind.id() as f32 * 0.618_034).fract();
    let channel = |offset: f32| {
        let t = (hue + offset).fract();
        (1.0 - (t * 6.0 - 3.0).abs()).mul_add(0.5, 0.5).clamp(0.25, 1.0)
    };
    [channel(0.0), channel(2.0 / 3.0), channel(1.0 / 3.0), 1.0]
}

fn piece_instance(piece: &TrackPiece) -> RenderInstance {
    RenderInstance {
        translation: piece.position().to_array(),
        rotation: piece.pose.rotation.to_array(),
        size: piece.shape().size(),
        kind: piece.kind.id(),
        color: piece_color(piece.kind),
    }
}

fn ball_instance(ball: &mut Ball, debug: bool) -> RenderInstance {
    let color = if debug {
        if ball.take_collided() {
            colors::BALL_HIT
        } else {
            colors::BALL_FREE
        }
    } else {
        colors::BALL
    };
    RenderInstance {
        translation: ball.position().to_array(),
        rotation: ball.pose.rotation.to_array(),
        size: ball.radius,
        kind: BALL_KIND,
        color,
    }
}

/// Pieces in chain order followed by balls
///
/// In debug mode each ball's collision flag is read and cleared.
pub fn instances(world: &mut World) -> Vec<RenderInstance> {
    let mut out: Vec<RenderInstance> = world.chain().pieces().map(piece_instance).collect();
    let debug = world.debug;
    out.extend(
        world
            .balls_mut()
            .iter_mut()
            .map(|ball| ball_instance(ball, debug)),
    );
    out
}

/// Collision geometry and anchors of every piece as world-space lines
pub fn debug_overlay(world: &World) -> Vec<LineSegment> {
    let mut lines = Vec::new();
    for piece in world.chain().pieces() {
        for primitive in piece.world_primitives() {
            match primitive {
                CollisionPrimitive::Line { v0, v1 } => {
                    lines.push(LineSegment::new(v0, v1, colors::LINE));
                }
                CollisionPrimitive::Plane { v0, v1, v2, v3 } => {
                    let corners = [v0, v1, v2, v3];
                    for i in 0..4 {
                        lines.push(LineSegment::new(
                            corners[i],
                            corners[(i + 1) % 4],
                            colors::PLANE,
                        ));
                    }
                }
            }
        }
        for anchor in piece.anchors() {
            let end = anchor.exit.unwrap_or(Vec3::ZERO);
            lines.push(LineSegment::new(
                piece.place(anchor.enter),
                piece.place(end),
                colors::ANCHOR,
            ));
        }
    }
    lines
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::WorldConfig;
    use rand::SeedableRng;
    use rand_pcg::Pcg32;

    fn world(kind: PieceKind, debug: bool) -> World {
        let config = WorldConfig {
            initial_kind: kind,
            debug,
            ..WorldConfig::default()
        };
        World::new(&config, &mut Pcg32::seed_from_u64(0))
    }

    #[test]
    fn test_instance_layout() {
        assert_eq!(std::mem::size_of::<RenderInstance>(), 48);
        let instance = RenderInstance::zeroed();
        let bytes: &[u8] = bytemuck::bytes_of(&instance);
        assert!(bytes.iter().all(|&b| b == 0));
    }

    #[test]
    fn test_instances_pieces_then_balls() {
        let mut world = world(PieceKind::FunnelRampA, false);
        let out = instances(&mut world);
        assert_eq!(out.len(), 2);
        assert_eq!(out[0].kind, PieceKind::FunnelRampA.id());
        assert_eq!(out[0].size, 1.0);
        assert_eq!(out[1].kind, BALL_KIND);
        assert_eq!(out[1].translation, [0.3, 0.2, 1.0]);
        assert_eq!(out[1].color, colors::BALL);
    }

    #[test]
    fn test_debug_colors_clear_collision_flag() {
        let mut world = world(PieceKind::Straight, true);
        world.balls_mut()[0].mark_collided();
        assert_eq!(instances(&mut world)[1].color, colors::BALL_HIT);
        assert_eq!(instances(&mut world)[1].color, colors::BALL_FREE);
    }

    #[test]
    fn test_debug_overlay_counts() {
        let world = world(PieceKind::HalfCross, false);
        let lines = debug_overlay(&world);
        let primitives = PieceKind::HalfCross.primitives();
        let planes = primitives
            .iter()
            .filter(|p| matches!(p, CollisionPrimitive::Plane { .. }))
            .count();
        let expected = primitives.len() - planes + planes * 4 + PieceKind::HalfCross.anchors().len();
        assert_eq!(lines.len(), expected);
    }

    #[test]
    fn test_terminal_anchor_points_at_center() {
        let world = world(PieceKind::End, false);
        let lines = debug_overlay(&world);
        let anchor_lines: Vec<_> = lines.iter().filter(|l| l.color == colors::ANCHOR).collect();
        assert_eq!(anchor_lines.len(), 4);
        assert!(anchor_lines.iter().all(|l| l.end == [0.0, 0.0, 0.0]));
    }

    #[test]
    fn test_piece_colors_differ() {
        assert_ne!(piece_color(PieceKind::Straight), piece_color(PieceKind::HalfStraight));
        for kind in PieceKind::ALL {
            let color = piece_color(kind);
            assert!(color.iter().all(|c| (0.0..=1.0).contains(c)));
        }
    }
}
