//! Configuration module - environment variable parsing

use std::env;
use std::str::FromStr;

use crate::game::actor::DeviceClass;
use crate::game::physics::{SEPARATION_MARGIN, WALL_MARGIN};
use crate::game::round::{MatchSetup, DEFAULT_AGGRESSION, ROUND_SECONDS};
use crate::util::time::REFERENCE_FPS;

/// Runner configuration loaded from environment variables. Every variable is optional.
#[derive(Clone, Debug, PartialEq)]
pub struct Config {
    /// Log level (trace, debug, info, warn, error)
    pub log_level: String,

    /// Device class that sizes fighters and reach
    pub device: DeviceClass,
    /// Arena width in pixels
    pub arena_width: f32,
    /// Canvas height in pixels
    pub arena_height: f32,
    /// Round countdown length in seconds
    pub round_seconds: u32,
    /// Real-time frame rate
    pub fps: u32,
    /// Seed for the AI random source; drawn from entropy when unset
    pub seed: Option<u64>,
    /// Let the AI drive both fighters
    pub autoplay: bool,
    /// Frames between logged snapshots
    pub snapshot_every: u32,
    /// Bot aggression in [0, 1]
    pub aggression: f32,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            device: DeviceClass::Desktop,
            arena_width: 1280.0,
            arena_height: 720.0,
            round_seconds: ROUND_SECONDS,
            fps: REFERENCE_FPS,
            seed: None,
            autoplay: true,
            snapshot_every: 30,
            aggression: DEFAULT_AGGRESSION,
        }
    }
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Load configuration through an arbitrary variable lookup
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&'static str) -> Option<String>,
    {
        let defaults = Self::default();

        let device = match lookup("DUEL_DEVICE") {
            Some(raw) => DeviceClass::parse(&raw).ok_or(ConfigError::Invalid {
                var: "DUEL_DEVICE",
                value: raw,
            })?,
            None => defaults.device,
        };

        let config = Self {
            log_level: lookup("LOG_LEVEL").unwrap_or(defaults.log_level),
            device,
            arena_width: parse_or(&lookup, "DUEL_ARENA_WIDTH", defaults.arena_width)?,
            arena_height: parse_or(&lookup, "DUEL_ARENA_HEIGHT", defaults.arena_height)?,
            round_seconds: parse_or(&lookup, "DUEL_ROUND_SECONDS", defaults.round_seconds)?,
            fps: parse_or(&lookup, "DUEL_FPS", defaults.fps)?,
            seed: match lookup("DUEL_SEED") {
                Some(raw) => Some(parse_value("DUEL_SEED", raw)?),
                None => None,
            },
            autoplay: parse_or(&lookup, "DUEL_AUTOPLAY", defaults.autoplay)?,
            snapshot_every: parse_or(&lookup, "DUEL_SNAPSHOT_EVERY", defaults.snapshot_every)?,
            aggression: parse_or(&lookup, "DUEL_AGGRESSION", defaults.aggression)?,
        };
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.fps == 0 {
            return Err(ConfigError::OutOfRange {
                var: "DUEL_FPS",
                reason: "must be at least 1",
            });
        }
        let profile = self.device.profile();
        if !self.arena_width.is_finite() || self.arena_width < min_arena_width(self.device) {
            return Err(ConfigError::OutOfRange {
                var: "DUEL_ARENA_WIDTH",
                reason: "too narrow to spawn both fighters apart",
            });
        }
        if !self.arena_height.is_finite()
            || self.arena_height <= profile.floor_margin + profile.height
        {
            return Err(ConfigError::OutOfRange {
                var: "DUEL_ARENA_HEIGHT",
                reason: "too short to fit a fighter above the floor",
            });
        }
        if !(0.0..=1.0).contains(&self.aggression) {
            return Err(ConfigError::OutOfRange {
                var: "DUEL_AGGRESSION",
                reason: "must be within [0, 1]",
            });
        }
        Ok(())
    }

    pub fn match_setup(&self) -> MatchSetup {
        MatchSetup {
            device: self.device,
            arena_width: self.arena_width,
            canvas_height: self.arena_height,
            round_seconds: self.round_seconds,
            aggression: self.aggression,
            autoplay: self.autoplay,
        }
    }
}

/// Narrowest arena that spawns both fighters clear of each other and of the walls
fn min_arena_width(device: DeviceClass) -> f32 {
    let profile = device.profile();
    let separated = 2.0 * (profile.width + WALL_MARGIN + SEPARATION_MARGIN);
    let spawned = profile.left_spawn_x + profile.width + profile.right_spawn_inset;
    separated.max(spawned)
}

fn parse_or<T, F>(lookup: &F, var: &'static str, default: T) -> Result<T, ConfigError>
where
    T: FromStr,
    F: Fn(&'static str) -> Option<String>,
{
    match lookup(var) {
        Some(raw) => parse_value(var, raw),
        None => Ok(default),
    }
}

fn parse_value<T: FromStr>(var: &'static str, raw: String) -> Result<T, ConfigError> {
    raw.trim()
        .parse()
        .map_err(|_| ConfigError::Invalid { var, value: raw })
}

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid value for {var}: {value:?}")]
    Invalid { var: &'static str, value: String },

    #[error("{var} out of range: {reason}")]
    OutOfRange {
        var: &'static str,
        reason: &'static str,
    },
}
