//! World orchestration
//!
//! Owns the live chain and the balls. One frame keeps the track window
//! around the balls (retire, prune, extend), steps every ball, then lets
//! retiring pieces drift.

use glam::Vec3;
use rand::Rng;
use rand::seq::IndexedRandom;
use serde::{Deserialize, Serialize};

use super::ball::Ball;
use super::catalog::PieceKind;
use super::chain::Chain;
use super::collision::{ball_ball_collision, ball_piece_collision};
use crate::config::{SimConfig, WorldConfig};
use crate::consts::*;
use crate::distance_xy;
use crate::error::{GenerationError, SimError};

/// Outcome of one simulation step
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FrameReport {
    /// Ball/piece and ball/ball contacts resolved this frame
    pub collisions: usize,
    /// Balls that touched a terminal piece
    pub terminal: Vec<usize>,
}

/// Complete simulation state (serializable)
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct World {
    chain: Chain,
    balls: Vec<Ball>,
    /// Collision diagnostics for the renderer
    pub debug: bool,
    /// Set once a ball leaves the track; stepping stops from then on
    #[serde(skip)]
    fault: Option<SimError>,
    frames: u64,
}

impl World {
    /// Create a world with the initial piece and balls from `config`
    pub fn new<R: Rng + ?Sized>(config: &WorldConfig, rng: &mut R) -> Self {
        let mut world = Self {
            debug: config.debug,
            ..Self::default()
        };
        if let Err(err) = world.chain.place_piece(config.initial_kind, None, rng) {
            log::warn!("Initial piece {:?} rejected: {}", config.initial_kind, err);
        }
        for &position in &config.balls {
            world.add_ball(position);
        }
        log::info!(
            "World created: initial piece {:?}, {} balls",
            config.initial_kind,
            world.balls.len()
        );
        world
    }

    pub fn add_ball(&mut self, position: Vec3) {
        self.balls.push(Ball::new(position));
    }

    pub fn balls(&self) -> &[Ball] {
        &self.balls
    }

    pub fn balls_mut(&mut self) -> &mut [Ball] {
        &mut self.balls
    }

    pub fn chain(&self) -> &Chain {
        &self.chain
    }

    pub fn chain_mut(&mut self) -> &mut Chain {
        &mut self.chain
    }

    pub fn fault(&self) -> Option<SimError> {
        self.fault
    }

    /// Completed simulation steps
    pub fn frames(&self) -> u64 {
        self.frames
    }

    /// Run one full frame: track maintenance, simulation, piece drift
    pub fn frame<R: Rng + ?Sized>(
        &mut self,
        config: &SimConfig,
        allowed: &[PieceKind],
        rng: &mut R,
    ) -> Result<FrameReport, SimError> {
        if let Some(fault) = self.fault {
            return Err(fault);
        }
        if let Err(err) = self.infinite_path(allowed, rng) {
            log::warn!("Track generation stopped: {}", err);
        }
        let report = self.simulate(config)?;
        self.advance_pieces();
        Ok(report)
    }

    /// Step every ball once
    pub fn simulate(&mut self, config: &SimConfig) -> Result<FrameReport, SimError> {
        if let Some(fault) = self.fault {
            return Err(fault);
        }

        let mut report = FrameReport::default();
        for i in 0..self.balls.len() {
            let (head, tail) = self.balls.split_at_mut(i + 1);
            let ball = &mut head[i];

            ball.apply_force(Vec3::new(0.0, 0.0, config.gravity_force));
            let drag = -ball.velocity.normalize_or_zero() * config.friction_force;
            ball.apply_force(drag);

            let mut terminal = false;
            let mut supported = false;
            for piece in self.chain.pieces() {
                if ball_piece_collision(ball, piece) {
                    report.collisions += 1;
                    terminal |= piece.kind.is_terminal();
                }
                if distance_xy(ball.position(), piece.position()) < FREE_FALL_REACH + ball.radius {
                    supported = true;
                }
            }

            if !supported {
                let fault = SimError::FreeFall { ball: i };
                log::warn!("{} at {} after {} frames", fault, ball.position(), self.frames);
                self.fault = Some(fault);
                return Err(fault);
            }

            if terminal {
                report.terminal.push(i);
            } else {
                ball.roll();
                if ball.velocity.length() < config.max_velocity {
                    let push = ball.velocity.normalize_or_zero() * config.push_force;
                    ball.apply_force(push);
                }
            }

            for other in tail.iter_mut() {
                if ball_ball_collision(ball, other) {
                    report.collisions += 1;
                }
            }

            ball.update();
        }

        self.frames += 1;
        Ok(report)
    }

    /// Keep the track window around the balls
    ///
    /// Pieces well above the highest ball start drifting up and are dropped
    /// once far enough; new track is added when the chain end comes close to
    /// the lowest ball.
    pub fn infinite_path<R: Rng + ?Sized>(
        &mut self,
        allowed: &[PieceKind],
        rng: &mut R,
    ) -> Result<(), GenerationError> {
        let Some((bottom, top)) = self.ball_span() else {
            return Ok(());
        };

        let retire = self.chain.pieces().position(|piece| {
            piece.position().z + piece.shape().size() > top + RETIRE_ABOVE_TOP && !piece.is_retiring()
        });
        if let Some(index) = retire {
            for piece in self.chain.pieces_mut().take(index + 1) {
                piece.drift = rng.random_range(DRIFT_SPEED_MIN..DRIFT_SPEED_MAX);
            }
            log::debug!("Retiring pieces 0..={}", index);
        }

        let before = self.chain.len();
        self.chain
            .retain(|piece| piece.position().z < top + PRUNE_ABOVE_TOP);
        let pruned = before - self.chain.len();
        if pruned > 0 {
            log::debug!("Pruned {} pieces, {} left", pruned, self.chain.len());
        }

        let needs_track = self
            .chain
            .last()
            .is_none_or(|link| link.piece.position().z > bottom - GENERATE_BELOW_BOTTOM);
        if needs_track && self.chain.can_continue() {
            self.generate(1, allowed, rng)?;
        }
        Ok(())
    }

    /// Grow the chain by `count` pieces drawn from `allowed`
    ///
    /// Backtracking can shrink the chain, so the loop runs until the target
    /// length is reached, the chain dead-ends, or the attempt budget is spent.
    pub fn generate<R: Rng + ?Sized>(
        &mut self,
        count: usize,
        allowed: &[PieceKind],
        rng: &mut R,
    ) -> Result<(), GenerationError> {
        if allowed.is_empty() {
            return Err(GenerationError::NoCandidates);
        }

        let target = self.chain.len() + count;
        let mut attempts = 0;
        while self.chain.len() < target {
            if !self.chain.can_continue() {
                log::debug!("Chain dead-ended at {} pieces", self.chain.len());
                return Ok(());
            }
            if attempts >= MAX_PLACEMENT_ATTEMPTS {
                return Err(GenerationError::Exhausted { attempts });
            }
            attempts += 1;

            let Some(&kind) = allowed.choose(rng) else {
                return Err(GenerationError::NoCandidates);
            };
            if let Err(err) = self.chain.place_piece(kind, None, rng) {
                log::trace!("Placing {:?} failed: {}", kind, err);
            }
        }
        Ok(())
    }

    /// Integrate retirement drift of every piece
    pub fn advance_pieces(&mut self) {
        for piece in self.chain.pieces_mut() {
            piece.update();
        }
    }

    /// Lowest and highest ball heights
    fn ball_span(&self) -> Option<(f32, f32)> {
        self.balls.iter().map(|ball| ball.position().z).fold(None, |span, z| {
            Some(match span {
                None => (z, z),
                Some((lo, hi)) => (f32::min(lo, z), f32::max(hi, z)),
            })
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::chain::Link;
    use proptest::prelude::*;
    use rand::SeedableRng;
    use rand_pcg::Pcg32;

    fn empty_config(initial_kind: PieceKind) -> WorldConfig {
        WorldConfig {
            initial_kind,
            balls: Vec::new(),
            ..WorldConfig::default()
        }
    }

    fn world_with(initial_kind: PieceKind, balls: &[Vec3]) -> World {
        let mut world = World::new(&empty_config(initial_kind), &mut Pcg32::seed_from_u64(1));
        for &ball in balls {
            world.add_ball(ball);
        }
        world
    }

    #[test]
    fn test_new_world_from_default_config() {
        let config = WorldConfig::default();
        let world = World::new(&config, &mut Pcg32::seed_from_u64(config.seed));
        assert_eq!(world.chain().len(), 1);
        assert_eq!(world.chain().links()[0].piece.kind, PieceKind::FunnelRampA);
        assert_eq!(world.balls().len(), 1);
        assert_eq!(world.balls()[0].position(), Vec3::new(0.3, 0.2, 1.0));
        assert_eq!(world.fault(), None);
    }

    #[test]
    fn test_ball_rests_in_groove() {
        let rest = -GROOVE_RADIUS + BALL_RADIUS;
        let mut world = world_with(PieceKind::Straight, &[Vec3::new(0.0, 0.0, rest + 0.05)]);
        let config = SimConfig::default();
        for _ in 0..200 {
            world.simulate(&config).unwrap();
        }
        let ball = &world.balls()[0];
        assert!((ball.position().z - rest).abs() < 0.01, "z = {}", ball.position().z);
        assert!(ball.velocity.truncate().length() < 1e-6);
        assert_eq!(world.frames(), 200);
    }

    #[test]
    fn test_free_fall_halts_stepping() {
        let mut world = world_with(PieceKind::Straight, &[Vec3::new(5.0, 5.0, 0.0)]);
        let config = SimConfig::default();
        assert_eq!(world.simulate(&config), Err(SimError::FreeFall { ball: 0 }));
        let frozen = world.balls()[0].position();

        let mut rng = Pcg32::seed_from_u64(3);
        assert_eq!(
            world.frame(&config, &[PieceKind::Straight], &mut rng),
            Err(SimError::FreeFall { ball: 0 })
        );
        assert_eq!(world.balls()[0].position(), frozen);
        assert_eq!(world.fault(), Some(SimError::FreeFall { ball: 0 }));
        assert_eq!(world.frames(), 0);
    }

    #[test]
    fn test_terminal_piece_reported() {
        // Sunk into the floor of the end hole
        let floor = -0.5 + 1.0 / 5.0;
        let mut world = world_with(PieceKind::End, &[Vec3::new(0.0, 0.0, floor + BALL_RADIUS - 0.01)]);
        let report = world.simulate(&SimConfig::default()).unwrap();
        assert_eq!(report.terminal, vec![0]);
        assert!(report.collisions >= 1);
        // No roll on a terminal piece
        assert_eq!(world.balls()[0].pose.rotation.y, 0.0);
    }

    #[test]
    fn test_ball_pair_collision_counted() {
        let z = -GROOVE_RADIUS + BALL_RADIUS;
        let mut world = world_with(
            PieceKind::Straight,
            &[Vec3::new(0.0, 0.0, z), Vec3::new(0.0, 0.3, z)],
        );
        let report = world.simulate(&SimConfig::default()).unwrap();
        assert!(report.collisions >= 1);
        assert!(world.balls()[0].collided());
        assert!(world.balls()[1].collided());
    }

    #[test]
    fn test_generate_reaches_target() {
        let mut world = world_with(PieceKind::FunnelRampA, &[]);
        let mut rng = Pcg32::seed_from_u64(11);
        let allowed = WorldConfig::default().allowed_kinds;
        world.generate(12, &allowed, &mut rng).unwrap();
        assert_eq!(world.chain().len(), 13);
    }

    #[test]
    fn test_generate_without_candidates() {
        let mut world = world_with(PieceKind::FunnelRampA, &[]);
        let result = world.generate(1, &[], &mut Pcg32::seed_from_u64(0));
        assert_eq!(result, Err(GenerationError::NoCandidates));
    }

    #[test]
    fn test_generate_stops_at_dead_end() {
        let mut world = world_with(PieceKind::FunnelRampA, &[]);
        world
            .generate(5, &[PieceKind::End], &mut Pcg32::seed_from_u64(5))
            .unwrap();
        assert_eq!(world.chain().len(), 2);
        assert!(!world.chain().can_continue());
    }

    #[test]
    fn test_generate_gives_up_when_nothing_fits() {
        // A downward exit only accepts pieces entered from the top
        let mut world = world_with(PieceKind::FunnelRampB, &[]);
        let result = world.generate(1, &[PieceKind::HalfStraight], &mut Pcg32::seed_from_u64(5));
        assert_eq!(
            result,
            Err(GenerationError::Exhausted {
                attempts: MAX_PLACEMENT_ATTEMPTS
            })
        );
        assert_eq!(world.chain().len(), 1);
    }

    #[test]
    fn test_empty_chain_is_reseeded() {
        let mut world = world_with(PieceKind::Straight, &[Vec3::new(0.0, 0.0, -20.0)]);
        // Everything is far above the ball and gets pruned
        world.chain_mut().retain(|_| false);
        world
            .infinite_path(&[PieceKind::HalfStraight], &mut Pcg32::seed_from_u64(2))
            .unwrap();
        assert_eq!(world.chain().len(), 1);
        assert_eq!(world.chain().links()[0].piece.kind, PieceKind::HalfStraight);
    }

    #[test]
    fn test_no_balls_leaves_track_alone() {
        let mut world = world_with(PieceKind::Straight, &[]);
        world
            .infinite_path(&[PieceKind::Straight], &mut Pcg32::seed_from_u64(2))
            .unwrap();
        assert_eq!(world.chain().len(), 1);
    }

    #[test]
    fn test_retire_prefix_then_prune() {
        let mut world = world_with(PieceKind::FunnelRampA, &[]);
        let mut rng = Pcg32::seed_from_u64(21);
        let allowed = WorldConfig::default().allowed_kinds;
        world.generate(20, &allowed, &mut rng).unwrap();
        let lowest = world
            .chain()
            .pieces()
            .map(|piece| piece.position().z)
            .fold(f32::INFINITY, f32::min);
        let top = lowest - 3.0;
        world.add_ball(Vec3::new(0.0, 0.0, top));
        let snapshot: Vec<Link> = world.chain().links().to_vec();

        // No candidates, so only retirement and pruning touch the chain
        let result = world.infinite_path(&[], &mut rng);
        assert_eq!(result, Err(GenerationError::NoCandidates));
        let retiring: Vec<bool> = world.chain().pieces().map(|p| p.is_retiring()).collect();
        let first_still = retiring.iter().position(|r| !r).unwrap_or(retiring.len());
        assert!(first_still > 0);
        assert!(retiring[first_still..].iter().all(|r| !r));
        for piece in world.chain().pieces().filter(|p| p.is_retiring()) {
            assert!((DRIFT_SPEED_MIN..DRIFT_SPEED_MAX).contains(&piece.drift));
        }

        for _ in 0..400 {
            world.advance_pieces();
            let _ = world.infinite_path(&[], &mut rng);

            // Survivors are an ordered subset of the snapshot, exits included
            let mut originals = snapshot.iter();
            for link in world.chain().links() {
                assert!(link.piece.position().z < top + PRUNE_ABOVE_TOP);
                let matched = originals.any(|original| {
                    original.piece.kind == link.piece.kind
                        && original.piece.position().truncate() == link.piece.position().truncate()
                        && original.exit == link.exit
                });
                assert!(matched, "{:?} lost its exit", link.piece);
            }
        }
        assert!(world.chain().len() < snapshot.len());
    }

    #[test]
    fn test_same_seed_same_run() {
        let run = |seed: u64| {
            let config = WorldConfig::default();
            let mut rng = Pcg32::seed_from_u64(seed);
            let mut world = World::new(&config, &mut rng);
            for _ in 0..300 {
                if world.frame(&config.sim, &config.allowed_kinds, &mut rng).is_err() {
                    break;
                }
            }
            (
                world.frames(),
                world.chain().len(),
                world.balls()[0].position(),
                world.fault(),
            )
        };
        assert_eq!(run(9), run(9));
    }

    proptest! {
        #[test]
        fn prop_speed_ceiling(
            vx in -0.2f32..0.2,
            vy in -0.2f32..0.2,
            vz in -0.2f32..0.2,
            x in -0.3f32..0.3,
            y in -0.4f32..0.4,
        ) {
            let mut world = world_with(PieceKind::Straight, &[Vec3::new(x, y, 0.0)]);
            world.balls_mut()[0].velocity = Vec3::new(vx, vy, vz);
            let config = SimConfig {
                push_force: 0.01,
                max_velocity: 1.0,
                ..SimConfig::default()
            };
            for _ in 0..5 {
                if world.simulate(&config).is_err() {
                    break;
                }
                let speed = world.balls()[0].velocity.truncate().length();
                prop_assert!(speed <= BALL_VELOCITY_LIMIT + 1e-6, "speed {}", speed);
            }
        }
    }
}
