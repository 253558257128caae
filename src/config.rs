//! Simulation and world configuration
//!
//! Loaded from JSON; every field is optional and falls back to its default.

use std::path::Path;

use glam::Vec3;
use serde::{Deserialize, Serialize};

use crate::error::ConfigError;
use crate::sim::PieceKind;

/// Per-frame forces and speed thresholds
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimConfig {
    /// Vertical force applied every frame (negative pulls down)
    pub gravity_force: f32,
    /// Drag magnitude opposing the ball's velocity
    pub friction_force: f32,
    /// Balls slower than this get pushed along their direction of travel
    pub max_velocity: f32,
    /// Magnitude of that push
    pub push_force: f32,
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            gravity_force: -0.002,
            friction_force: 0.0,
            max_velocity: 0.01,
            push_force: 0.0001,
        }
    }
}

/// Everything needed to start and run a world
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WorldConfig {
    /// Run seed for reproducibility
    pub seed: u64,
    /// Track collision flags for the renderer
    pub debug: bool,
    /// First piece of the chain
    pub initial_kind: PieceKind,
    /// Kinds drawn from when extending the chain
    pub allowed_kinds: Vec<PieceKind>,
    /// Starting ball positions
    pub balls: Vec<Vec3>,
    /// Frames the runner steps before stopping
    pub frames: u64,
    pub sim: SimConfig,
}

impl Default for WorldConfig {
    fn default() -> Self {
        Self {
            seed: 0,
            debug: false,
            initial_kind: PieceKind::FunnelRampA,
            allowed_kinds: vec![
                PieceKind::Straight,
                PieceKind::TurnStraightA,
                PieceKind::TurnStraightB,
                PieceKind::CrossRampA,
                PieceKind::CrossOpenRampA,
                PieceKind::FunnelRampA,
                PieceKind::HalfStraight,
                PieceKind::HalfTurn,
                PieceKind::Diagonal,
                PieceKind::CrossCrossRamp,
            ],
            balls: vec![Vec3::new(0.3, 0.2, 1.0)],
            frames: 3600,
            sim: SimConfig::default(),
        }
    }
}

impl WorldConfig {
    /// Read a JSON config file
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let json = std::fs::read_to_string(path.as_ref())?;
        let config = Self::from_json(&json)?;
        log::info!("Loaded config from {}", path.as_ref().display());
        Ok(config)
    }

    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn to_json(&self) -> Result<String, ConfigError> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = WorldConfig::default();
        assert_eq!(config.initial_kind, PieceKind::FunnelRampA);
        assert_eq!(config.allowed_kinds.len(), 10);
        assert!(config.allowed_kinds.iter().all(|kind| !kind.is_terminal()));
        assert_eq!(config.sim.gravity_force, -0.002);
        assert_eq!(config.sim.push_force, 0.0001);
    }

    #[test]
    fn test_partial_json_fills_defaults() {
        let config = WorldConfig::from_json(
            r#"{ "seed": 42, "balls": [[0.0, 0.0, 2.0]], "sim": { "friction_force": 0.0005 } }"#,
        )
        .unwrap();
        assert_eq!(config.seed, 42);
        assert_eq!(config.balls, vec![Vec3::new(0.0, 0.0, 2.0)]);
        assert_eq!(config.sim.friction_force, 0.0005);
        assert_eq!(config.sim.max_velocity, 0.01);
        assert_eq!(config.initial_kind, PieceKind::FunnelRampA);
    }

    #[test]
    fn test_json_round_trip() {
        let mut config = WorldConfig::default();
        config.allowed_kinds = vec![PieceKind::End, PieceKind::HalfTurn];
        config.debug = true;
        let json = config.to_json().unwrap();
        assert_eq!(WorldConfig::from_json(&json).unwrap(), config);
    }

    #[test]
    fn test_parse_error() {
        let err = WorldConfig::from_json(r#"{ "initial_kind": "Spiral" }"#).unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }

    #[test]
    fn test_missing_file() {
        let err = WorldConfig::load("/nonexistent/marble-run.json").unwrap_err();
        assert!(matches!(err, ConfigError::Io(_)));
    }
}
