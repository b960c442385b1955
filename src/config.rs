//! Tick rate, playfield geometry and gameplay tuning.
//!
//! Everything here is fixed at compile time except [`JumpTuning`], which is a
//! value type so the physics can be exercised with arbitrary jump shapes.

use std::path::PathBuf;
use std::time::Duration;

use crate::error::ConfigError;

// ── Timing ──────────────────────────────────────────────────────────────────

/// Simulation ticks per second. One tick is one rendered frame.
pub const FPS: u32 = 24;

/// Length of one simulation tick.
pub const TICK: Duration = Duration::from_nanos(1_000_000_000 / FPS as u64);

// ── Playfield ───────────────────────────────────────────────────────────────

/// Rows occupied by the playfield (HUD row included).
pub const PLAYFIELD_HEIGHT: u16 = 15;

/// Row the player's feet and the cacti rest on.
pub const GROUND_ROW: i32 = 12;

/// Row of the ground line, just under the feet.
pub const GROUND_LINE_ROW: i32 = GROUND_ROW + 1;

/// Row of the pebbles under the ground line.
pub const TEXTURE_ROW: i32 = GROUND_ROW + 2;

/// Fixed column of the player's left edge.
pub const PLAYER_X: i32 = 4;

/// Width the spawn gaps in the stage table are tuned for.
pub const REFERENCE_WIDTH: f64 = 80.0;

/// Spawn distance cap so that very wide terminals don't trivialise the game.
pub const MAX_EFFECTIVE_WIDTH: u16 = 120;

// ── Player ──────────────────────────────────────────────────────────────────

pub const JUMP_HEIGHT: f64 = 5.0;
pub const JUMP_DURATION: u32 = FPS / 4;
pub const HANG_DURATION: u32 = 2;
pub const DUCK_HOLD: u32 = FPS * 2 / 3;
pub const ANIM_PERIOD: u32 = FPS / 6;

/// Fast-drop speed as a fraction of the jump speed magnitude.
pub const FAST_DROP_SPEED_RATIO: f64 = 0.8;

/// Gravity multiplier while fast-dropping.
pub const FAST_DROP_GRAVITY_SCALE: f64 = 1.5;

/// Tolerance for the up-to-down velocity sign change at the apex.
pub const VELOCITY_EPSILON: f64 = 1e-9;

// ── Obstacles ───────────────────────────────────────────────────────────────

/// No spawn gap is ever shorter than this many ticks.
pub const MIN_SPAWN_GAP: u32 = 18;

/// Obstacles left of this column are dropped.
pub const DESPAWN_X: f64 = -10.0;

pub const MAX_ACTIVE_OBSTACLES: usize = 4;

/// Fraction of the effective width the right-most obstacle must have crossed
/// before an early spawn may happen.
pub const EARLY_SPAWN_THRESHOLD: f64 = 0.7;

/// Per-tick early spawn probability added for every stage above the first.
pub const EARLY_SPAWN_CHANCE_PER_STAGE: f64 = 0.004;

// ── Stages and scoring ──────────────────────────────────────────────────────

pub const STAGE_TRANSITION: Duration = Duration::from_secs(2);
pub const SCORE_BLINK: Duration = Duration::from_millis(1500);
pub const SCORE_BLINK_INTERVAL: Duration = Duration::from_millis(250);
pub const SCORE_MILESTONE: u64 = 1000;

// ── Scenery ─────────────────────────────────────────────────────────────────

pub const INITIAL_GROUND_LENGTH: i32 = 12;
pub const GROUND_EXTEND_SPEED: i32 = 2;

pub const CLOUD_MIN_COUNT: usize = 2;
pub const CLOUD_MAX_COUNT: usize = 4;
pub const CLOUD_MIN_ROW: i32 = 1;
pub const CLOUD_MAX_ROW: i32 = 4;
pub const CLOUD_MIN_SPEED: f64 = 0.05;
pub const CLOUD_MAX_SPEED: f64 = 0.2;
pub const CLOUD_BUFFER: i32 = 6;
pub const CLOUD_RIGHT_EDGE_BUFFER: i32 = 20;
pub const CLOUD_MIN_EXTRA_SPACE: i32 = 10;
pub const CLOUD_MAX_EXTRA_SPACE: i32 = 30;

// ── Files ───────────────────────────────────────────────────────────────────

pub const HIGH_SCORE_FILE: &str = ".term-rex-highscore";
pub const SETTINGS_FILE: &str = ".term-rex.json";
pub const LOG_FILE: &str = "term-rex.log";

/// `name` inside the user's home directory, if there is one.
pub fn home_file(name: &str) -> Option<PathBuf> {
    std::env::var_os("HOME")
        .or_else(|| std::env::var_os("USERPROFILE"))
        .filter(|home| !home.is_empty())
        .map(|home| PathBuf::from(home).join(name))
}

/// Effective playfield width for a terminal `width` columns wide.
pub fn effective_width(width: u16) -> u16 {
    width.min(MAX_EFFECTIVE_WIDTH)
}

// ── Jump tuning ─────────────────────────────────────────────────────────────

/// Shape of the jump and the related per-tick timers.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct JumpTuning {
    /// Apex height in rows.
    pub height: f64,
    /// Ticks from take-off until the velocity turns non-negative.
    pub duration: u32,
    /// Ticks spent motionless at the apex.
    pub hang: u32,
    /// Ticks a single duck command keeps the player crouched.
    pub duck_hold: u32,
    /// Ticks between animation frame toggles.
    pub anim_period: u32,
}

impl Default for JumpTuning {
    fn default() -> Self {
        Self {
            height: JUMP_HEIGHT,
            duration: JUMP_DURATION,
            hang: HANG_DURATION,
            duck_hold: DUCK_HOLD,
            anim_period: ANIM_PERIOD,
        }
    }
}

impl JumpTuning {
    /// Take-off velocity, `-2H/D` (negative is up).
    pub fn jump_velocity(&self) -> f64 {
        -2.0 * self.height / self.duration as f64
    }

    /// Per-tick gravity that brings the take-off velocity to zero in `D` ticks.
    pub fn gravity(&self) -> f64 {
        -self.jump_velocity() / self.duration as f64
    }

    pub fn fast_drop_velocity(&self) -> f64 {
        -self.jump_velocity() * FAST_DROP_SPEED_RATIO
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(self.height > 0.0) {
            return Err(ConfigError::Jump("height must be positive"));
        }
        if self.duration < 2 {
            return Err(ConfigError::Jump("duration must be at least two ticks"));
        }
        if self.anim_period == 0 {
            return Err(ConfigError::Jump("animation period must be positive"));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_tuning_is_valid() {
        assert!(JumpTuning::default().validate().is_ok());
    }

    #[test]
    fn test_jump_velocity_and_gravity() {
        let tuning = JumpTuning {
            height: 5.0,
            duration: 6,
            ..Default::default()
        };
        assert!((tuning.jump_velocity() + 10.0 / 6.0).abs() < 1e-12);
        assert!((tuning.gravity() - 10.0 / 36.0).abs() < 1e-12);
        assert!((tuning.fast_drop_velocity() - 0.8 * 10.0 / 6.0).abs() < 1e-12);
    }

    #[test]
    fn test_rejects_degenerate_tuning() {
        let flat = JumpTuning {
            height: 0.0,
            ..Default::default()
        };
        assert!(flat.validate().is_err());

        let instant = JumpTuning {
            duration: 1,
            ..Default::default()
        };
        assert!(instant.validate().is_err());
    }

    #[test]
    fn test_effective_width_is_capped() {
        assert_eq!(effective_width(80), 80);
        assert_eq!(effective_width(300), MAX_EFFECTIVE_WIDTH);
    }
}
