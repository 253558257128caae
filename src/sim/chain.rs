//! Chain builder
//!
//! Pieces are joined anchor to anchor: the new piece is turned so its entry
//! faces back along the previous piece's exit, then snapped to the grid.
//! When a placement collides with the existing track the last two pieces are
//! dropped, so the next random draw can take the path somewhere else.

use glam::Vec3;
use rand::Rng;
use rand::seq::IteratorRandom;
use serde::{Deserialize, Serialize};
use std::f32::consts::PI;

use super::catalog::PieceKind;
use super::piece::TrackPiece;
use super::primitive::Anchor;
use crate::error::PlacementError;
use crate::{grid_cell, normalize_angle, rotate_z, round_half_up, signed_angle_xy};

/// A placed piece together with its world-space exit direction
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Link {
    pub piece: TrackPiece,
    /// Index of the anchor the piece was entered through
    pub anchor: usize,
    /// Exit offset from the piece center, `None` for terminal pieces
    pub exit: Option<Vec3>,
}

/// Ordered track, in placement order
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Chain {
    links: Vec<Link>,
}

impl Chain {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.links.len()
    }

    pub fn is_empty(&self) -> bool {
        self.links.is_empty()
    }

    pub fn links(&self) -> &[Link] {
        &self.links
    }

    pub fn pieces(&self) -> impl Iterator<Item = &TrackPiece> {
        self.links.iter().map(|link| &link.piece)
    }

    pub fn pieces_mut(&mut self) -> impl Iterator<Item = &mut TrackPiece> {
        self.links.iter_mut().map(|link| &mut link.piece)
    }

    pub fn last(&self) -> Option<&Link> {
        self.links.last()
    }

    /// False once the chain ends in a terminal piece
    pub fn can_continue(&self) -> bool {
        self.links.last().is_none_or(|link| link.exit.is_some())
    }

    /// Drop links that fail the predicate, keeping order
    pub fn retain(&mut self, mut keep: impl FnMut(&TrackPiece) -> bool) {
        self.links.retain(|link| keep(&link.piece));
    }

    /// Place a piece of `kind` at the end of the chain
    ///
    /// Without `anchor_index` the entry anchor is drawn at random. The first
    /// piece of an empty chain always uses anchor 0 at the origin.
    pub fn place_piece<R: Rng + ?Sized>(
        &mut self,
        kind: PieceKind,
        anchor_index: Option<usize>,
        rng: &mut R,
    ) -> Result<(), PlacementError> {
        let mut piece = TrackPiece::new(kind, Vec3::ZERO, 0.0);
        let anchors = kind.anchors();
        let mut exit = anchors.first().and_then(|anchor| anchor.exit);
        let mut entered = 0;

        if let Some(last) = self.links.last() {
            let (index, anchor) = pick_anchor(anchors, anchor_index, rng)?;
            entered = index;
            let last_exit = last.exit.ok_or(PlacementError::DeadEnd)?;
            let last_position = last.piece.position();

            // A downward exit can only feed a piece entered from its top face
            if last_exit.z < 0.0 && anchor.enter.z < 0.5 {
                return Err(PlacementError::Incompatible);
            }

            let joined = last_position + last_exit;
            piece.pose.position = Vec3::new(
                round_half_up(last_position.x + last_exit.x * 2.0),
                round_half_up(last_position.y + last_exit.y * 2.0),
                round_half_up((joined.z - anchor.enter.z) * 2.0) / 2.0,
            );
            piece.pose.rotation.z = normalize_angle(PI + signed_angle_xy(anchor.enter, last_exit));
            exit = anchor.exit.map(|local| rotate_z(local, piece.pose.heading()));
        }

        if let Some(conflict) = self.find_conflict(&piece, exit) {
            let backtracked = self.links.len() > 2;
            if backtracked {
                self.links.truncate(self.links.len() - 2);
            }
            log::trace!(
                "Rejected {:?} at {}: {:?}, chain length {}",
                kind,
                piece.position(),
                conflict,
                self.links.len()
            );
            return Err(match conflict {
                Conflict::Overlap => PlacementError::Overlap { backtracked },
                Conflict::ExitBlocked => PlacementError::ExitBlocked { backtracked },
            });
        }

        log::debug!(
            "Placed {:?} at {} heading {:.2}",
            kind,
            piece.position(),
            piece.pose.heading()
        );
        self.links.push(Link {
            piece,
            anchor: entered,
            exit,
        });
        Ok(())
    }

    /// First placed piece that would overlap `candidate` or block its exit
    fn find_conflict(&self, candidate: &TrackPiece, exit: Option<Vec3>) -> Option<Conflict> {
        let position = candidate.position();
        let cell = grid_cell(position.truncate());
        let top = position.z + candidate.shape().size() / 2.0;
        let exit_cell = exit.map(|exit| grid_cell(position.truncate() + exit.truncate() * 2.0));

        for other in self.pieces() {
            let other_position = other.position();
            let other_cell = grid_cell(other_position.truncate());

            if other_cell == cell && other_position.z - other.shape().size() / 2.0 < top {
                return Some(Conflict::Overlap);
            }

            // Assumes a full-height neighbour; half pieces in the exit cell are
            // judged by the same clearance
            if let (Some(exit), Some(exit_cell)) = (exit, exit_cell) {
                if other_cell == exit_cell && other_position.z - 0.5 <= position.z + exit.z {
                    return Some(Conflict::ExitBlocked);
                }
            }
        }
        None
    }
}

#[derive(Debug, Clone, Copy)]
enum Conflict {
    Overlap,
    ExitBlocked,
}

fn pick_anchor<'a, R: Rng + ?Sized>(
    anchors: &'a [Anchor],
    index: Option<usize>,
    rng: &mut R,
) -> Result<(usize, &'a Anchor), PlacementError> {
    match index {
        Some(index) => anchors
            .get(index)
            .map(|anchor| (index, anchor))
            .ok_or(PlacementError::NoAnchor { index }),
        None => anchors
            .iter()
            .enumerate()
            .choose(rng)
            .ok_or(PlacementError::NoAnchor { index: 0 }),
    }
}
