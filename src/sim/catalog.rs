//! Track piece catalog
//!
//! Every piece kind is a fixed record of collision primitives, anchors and
//! footprint. Records are built once and shared by all pieces of that kind.

use glam::Vec3;
use serde::{Deserialize, Serialize};
use std::sync::OnceLock;

use super::geom::Shape;
use super::groove::{self, GeometryBuilder};
use super::primitive::{Anchor, CollisionPrimitive};
use crate::consts::GROOVE_RADIUS;

const R: f32 = GROOVE_RADIUS;

/// Vertical extent of a piece
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Footprint {
    Full,
    Half,
}

impl Footprint {
    pub fn shape(self) -> Shape {
        match self {
            Footprint::Full => Shape::Cube(0.5),
            Footprint::Half => Shape::Cube(0.25),
        }
    }
}

/// Piece variants
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PieceKind {
    Straight,
    HalfStraight,
    Turn,
    HalfTurn,
    TurnStraightA,
    TurnStraightB,
    CrossStraight,
    CrossRampA,
    CrossRampB,
    CrossOpenRampA,
    CrossOpenRampB,
    CrossCrossRamp,
    FunnelRampA,
    FunnelRampB,
    StraightRamp,
    Diagonal,
    HalfCross,
    End,
    HalfEnd,
}

/// Immutable geometry of one piece kind
#[derive(Debug, Clone)]
pub struct PieceGeometry {
    pub primitives: Vec<CollisionPrimitive>,
    pub anchors: Vec<Anchor>,
    pub footprint: Footprint,
}

impl PieceKind {
    pub const ALL: [PieceKind; 19] = [
        PieceKind::Straight,
        PieceKind::HalfStraight,
        PieceKind::Turn,
        PieceKind::HalfTurn,
        PieceKind::TurnStraightA,
        PieceKind::TurnStraightB,
        PieceKind::CrossStraight,
        PieceKind::CrossRampA,
        PieceKind::CrossRampB,
        PieceKind::CrossOpenRampA,
        PieceKind::CrossOpenRampB,
        PieceKind::CrossCrossRamp,
        PieceKind::FunnelRampA,
        PieceKind::FunnelRampB,
        PieceKind::StraightRamp,
        PieceKind::Diagonal,
        PieceKind::HalfCross,
        PieceKind::End,
        PieceKind::HalfEnd,
    ];

    /// Stable numeric id, used by the renderer to pick a mesh
    pub fn id(self) -> u32 {
        self as u32
    }

    /// Shared geometry record for this kind
    pub fn geometry(self) -> &'static PieceGeometry {
        static CATALOG: OnceLock<Vec<PieceGeometry>> = OnceLock::new();
        let catalog = CATALOG.get_or_init(|| PieceKind::ALL.iter().map(|k| k.build()).collect());
        &catalog[self as usize]
    }

    pub fn anchors(self) -> &'static [Anchor] {
        &self.geometry().anchors
    }

    pub fn primitives(self) -> &'static [CollisionPrimitive] {
        &self.geometry().primitives
    }

    pub fn footprint(self) -> Footprint {
        self.geometry().footprint
    }

    /// True if the representative (first) anchor has no exit
    pub fn is_terminal(self) -> bool {
        self.anchors().first().is_some_and(Anchor::is_terminal)
    }

    fn build(self) -> PieceGeometry {
        let v = Vec3::new;
        // Entry points on the four sides at height z
        let sides = |z: f32| [v(0.5, 0.0, z), v(-0.5, 0.0, z), v(0.0, 0.5, z), v(0.0, -0.5, z)];
        let funnel_rim = [v(0.5, 0.0, 1.0), v(0.0, 0.5, 1.0), v(-0.5, 0.0, 1.0), v(0.0, -0.5, 1.0)];
        let bottom_exit = v(0.0, 0.5, 0.0);
        let lower_exit = v(0.0, 0.5, -0.5 + R);

        let (builder, footprint) = match self {
            PieceKind::Straight => (
                GeometryBuilder::new()
                    .straight_through(v(0.0, 0.5, 0.0), v(0.0, -0.5, 0.0))
                    .straight_through(v(0.0, 0.5, 0.5), v(0.0, -0.5, 0.5)),
                Footprint::Full,
            ),
            PieceKind::HalfStraight | PieceKind::Diagonal => (
                GeometryBuilder::new().straight_through(v(0.0, 0.5, 0.0), v(0.0, -0.5, 0.0)),
                if self == PieceKind::HalfStraight {
                    Footprint::Half
                } else {
                    Footprint::Full
                },
            ),
            PieceKind::Turn => (turn(), Footprint::Full),
            PieceKind::HalfTurn => (
                GeometryBuilder::new().curve(v(0.0, 0.5, 0.0), v(0.5, 0.0, 0.0), v(0.5, 0.5, 0.0)),
                Footprint::Half,
            ),
            PieceKind::TurnStraightA => (
                turn().straight_through(v(0.0, 0.5, 0.0), v(0.0, -0.5, 0.0)),
                Footprint::Full,
            ),
            PieceKind::TurnStraightB => (
                turn().straight_through(v(0.5, 0.0, 0.0), v(-0.5, 0.0, 0.0)),
                Footprint::Full,
            ),
            PieceKind::CrossStraight => (
                GeometryBuilder::new()
                    .primitives(groove::cross_hole())
                    .anchor(v(0.5, 0.0, 0.5), v(-0.5, 0.0, 0.5))
                    .anchor(v(-0.5, 0.0, 0.5), v(0.5, 0.0, 0.5))
                    .anchor(v(0.0, 0.5, 0.5), v(0.0, -0.5, 0.5))
                    .anchor(v(0.0, -0.5, 0.5), v(0.0, 0.5, 0.5))
                    .anchor(v(0.5, 0.0, 0.0), v(-0.5, 0.0, 0.0))
                    .anchor(v(-0.5, 0.0, 0.0), v(0.5, 0.0, 0.0))
                    .straight(v(0.5, 0.0, 0.0), v(-0.5, 0.0, 0.0))
                    .floor(0.5 - R),
                Footprint::Full,
            ),
            PieceKind::CrossRampA => (
                GeometryBuilder::new()
                    .primitives(groove::cross_hole())
                    .primitives(groove::ramp_a())
                    .funnel_into(
                        &[v(0.5, 0.0, 0.5), v(0.0, -0.5, 0.5), v(-0.5, 0.0, 0.5)],
                        bottom_exit,
                    ),
                Footprint::Full,
            ),
            PieceKind::CrossRampB => (
                GeometryBuilder::new()
                    .primitives(groove::cross_hole())
                    .primitives(groove::ramp_b())
                    .funnel_into(
                        &[
                            v(0.5, 0.0, 0.5),
                            v(0.0, 0.5, 0.5),
                            v(-0.5, 0.0, 0.5),
                            v(0.0, -0.5, 0.5),
                        ],
                        lower_exit,
                    ),
                Footprint::Full,
            ),
            PieceKind::CrossOpenRampA => (
                GeometryBuilder::new()
                    .primitives(groove::three_way_turn())
                    .funnel_into(
                        &[v(0.5, 0.0, 0.5), v(-0.5, 0.0, 0.5), v(0.0, -0.5, 0.5)],
                        bottom_exit,
                    )
                    .straight(v(0.0, -0.5 + 0.1, 0.5), v(0.0, -0.5, 0.5))
                    .straight(v(0.0, -0.5 + 0.1, 0.5), v(0.0, -1.0 / 16.0, 1.0 / 6.0))
                    .straight(v(0.0, -1.0 / 16.0, 1.0 / 6.0), v(0.0, 0.25, 1.0 / 32.0))
                    .straight(v(0.0, 0.25, 1.0 / 32.0), bottom_exit),
                Footprint::Full,
            ),
            PieceKind::CrossOpenRampB => (
                GeometryBuilder::new()
                    .primitives(groove::three_way_turn())
                    .funnel_into(
                        &[
                            v(0.5, 0.0, 0.5),
                            v(0.0, 0.5, 0.5),
                            v(-0.5, 0.0, 0.5),
                            v(0.0, -0.5, 0.5),
                        ],
                        lower_exit,
                    )
                    .straight(v(0.0, -0.5 + 0.1, 0.5), v(0.0, -0.5, 0.5))
                    .straight(v(0.0, -0.5 + 0.1, 0.5), v(0.0, -0.25, 0.125))
                    .straight(v(0.0, -0.25, 0.125), v(0.0, 0.0, -0.125))
                    .straight(v(0.0, 0.0, -0.125), v(0.0, 0.5, -0.5 + R + 0.1)),
                Footprint::Full,
            ),
            PieceKind::CrossCrossRamp => (
                GeometryBuilder::new()
                    .primitives(groove::cross_hole())
                    .funnel_into(
                        &[
                            v(0.5, 0.0, 0.5),
                            v(-0.5, 0.0, 0.5),
                            v(0.0, 0.5, 0.5),
                            v(0.0, -0.5, 0.5),
                            v(0.5, 0.0, 0.0),
                            v(-0.5, 0.0, 0.0),
                            v(0.0, -0.5, 0.0),
                        ],
                        lower_exit,
                    )
                    .straight(v(0.0, -0.5, 0.0), v(0.0, -R, -R))
                    .straight(v(0.0, -R, -R), lower_exit)
                    .straight(v(0.5, 0.0, 0.0), v(R, 0.0, 0.0))
                    .straight(v(-0.5, 0.0, 0.0), v(-R, 0.0, 0.0)),
                Footprint::Full,
            ),
            PieceKind::FunnelRampA => (
                GeometryBuilder::new()
                    .primitives(groove::funnel())
                    .primitives(groove::ramp_a())
                    .funnel_into(&funnel_rim, bottom_exit),
                Footprint::Full,
            ),
            PieceKind::FunnelRampB => (
                GeometryBuilder::new()
                    .primitives(groove::funnel())
                    .primitives(groove::ramp_b())
                    .funnel_into(&funnel_rim, lower_exit),
                Footprint::Full,
            ),
            PieceKind::StraightRamp => (
                GeometryBuilder::new()
                    .funnel_into(&[v(0.0, 0.5, 0.5), v(0.0, -0.5, 0.5)], lower_exit)
                    .straight(v(0.0, 0.5 - 0.2, 0.5), v(0.0, 0.5, 0.5))
                    .straight(v(0.0, -0.5 + 0.2, 0.5), v(0.0, -0.5, 0.5))
                    .straight(v(0.0, -0.5 + 0.2, 0.5), lower_exit),
                Footprint::Full,
            ),
            PieceKind::HalfCross => (
                GeometryBuilder::new()
                    .anchor(v(0.5, 0.0, 0.0), v(-0.5, 0.0, 0.0))
                    .anchor(v(-0.5, 0.0, 0.0), v(0.5, 0.0, 0.0))
                    .anchor(v(0.0, 0.5, 0.0), v(0.0, -0.5, 0.0))
                    .anchor(v(0.0, -0.5, 0.0), v(0.0, 0.5, 0.0))
                    .straight(v(R, 0.0, 0.0), v(0.5, 0.0, 0.0))
                    .straight(v(-R, 0.0, 0.0), v(-0.5, 0.0, 0.0))
                    .straight(v(0.0, R, 0.0), v(0.0, 0.5, 0.0))
                    .straight(v(0.0, -R, 0.0), v(0.0, -0.5, 0.0))
                    .floor(-R),
                Footprint::Half,
            ),
            PieceKind::End => (
                GeometryBuilder::new()
                    .terminal(&sides(0.5))
                    .primitives(groove::end_hole(0.5, -0.5 + 1.0 / 5.0)),
                Footprint::Full,
            ),
            PieceKind::HalfEnd => (
                GeometryBuilder::new()
                    .terminal(&sides(0.0))
                    .primitives(groove::end_hole(0.0, -0.5 + 1.0 / 7.0)),
                Footprint::Half,
            ),
        };

        PieceGeometry {
            primitives: builder.primitives,
            anchors: builder.anchors,
            footprint,
        }
    }
}

/// Upper-level quarter turn shared by the turn variants
fn turn() -> GeometryBuilder {
    GeometryBuilder::new().curve(
        Vec3::new(0.0, 0.5, 0.5),
        Vec3::new(0.5, 0.0, 0.5),
        Vec3::new(0.5, 0.5, 0.5),
    )
}
