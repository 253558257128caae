//! Deterministic simulation module
//!
//! All track and ball logic lives here. This module must be pure and deterministic:
//! - One fixed step per frame
//! - Injected RNG only
//! - Stable iteration order (chain order, ball insertion order)
//! - No rendering or platform dependencies

pub mod ball;
pub mod catalog;
pub mod chain;
pub mod collision;
pub mod geom;
pub mod groove;
pub mod piece;
pub mod primitive;
pub mod world;

pub use ball::Ball;
pub use catalog::{Footprint, PieceGeometry, PieceKind};
pub use chain::{Chain, Link};
pub use collision::{ball_ball_collision, ball_piece_collision, ball_primitive_collision};
pub use geom::{Pose, Shape};
pub use piece::TrackPiece;
pub use primitive::{Anchor, CollisionPrimitive};
pub use world::{FrameReport, World};
