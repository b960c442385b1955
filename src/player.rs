//! Player physics: jump, apex hang, duck and fast drop.
//!
//! Rows grow downwards, so an upward velocity is negative and "landing"
//! means reaching a vertical position at or below the ground row.

use crate::collision::Hitbox;
use crate::config::{FAST_DROP_GRAVITY_SCALE, JumpTuning, VELOCITY_EPSILON};
use crate::sprite::{PLAYER_DUCK, PLAYER_JUMP, PLAYER_RUN, Sprite};

/// Vertical motion phase.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Motion {
    Grounded,
    Rising,
    /// Motionless at the top of a jump while the hang timer runs down
    ApexHang,
    Falling,
}

#[derive(Debug, Clone)]
pub struct Player {
    pub x: i32,
    /// Bottom row of the sprite, continuous
    pub y: f64,
    pub velocity: f64,
    pub motion: Motion,
    pub hang_ticks: u32,
    pub duck_ticks: u32,
    pub fast_dropping: bool,
    /// Set while the down input is considered held
    pub down_held: bool,
    pub anim_frame: usize,
    anim_counter: u32,
    ground: f64,
    tuning: JumpTuning,
}

impl Player {
    pub fn new(x: i32, ground_row: i32, tuning: JumpTuning) -> Self {
        let ground = ground_row as f64;
        Self {
            x,
            y: ground,
            velocity: 0.0,
            motion: Motion::Grounded,
            hang_ticks: 0,
            duck_ticks: 0,
            fast_dropping: false,
            down_held: false,
            anim_frame: 0,
            anim_counter: 0,
            ground,
            tuning,
        }
    }

    pub fn tuning(&self) -> &JumpTuning {
        &self.tuning
    }

    pub fn is_grounded(&self) -> bool {
        self.motion == Motion::Grounded
    }

    pub fn is_airborne(&self) -> bool {
        !self.is_grounded()
    }

    pub fn is_ducking(&self) -> bool {
        self.is_grounded() && self.duck_ticks > 0
    }

    /// Start a jump. Only possible from the ground.
    pub fn jump(&mut self) -> bool {
        if !self.is_grounded() {
            return false;
        }
        self.velocity = self.tuning.jump_velocity();
        self.motion = Motion::Rising;
        self.duck_ticks = 0;
        self.fast_dropping = false;
        true
    }

    /// Crouch (or keep crouching) for the configured hold time.
    pub fn duck(&mut self) -> bool {
        if !self.is_grounded() {
            return false;
        }
        self.duck_ticks = self.tuning.duck_hold;
        true
    }

    /// Dive towards the ground. Only possible in the air, and only once per
    /// jump so repeated key events don't reset the accelerating fall.
    pub fn fast_drop(&mut self) -> bool {
        if self.is_grounded() || self.fast_dropping {
            return false;
        }
        self.velocity = self.tuning.fast_drop_velocity();
        self.hang_ticks = 0;
        self.fast_dropping = true;
        self.motion = Motion::Falling;
        true
    }

    /// Advance one tick.
    pub fn tick(&mut self) {
        self.advance_animation();

        if self.is_grounded() {
            if self.duck_ticks > 0 {
                self.duck_ticks -= 1;
                if self.duck_ticks == 0 {
                    self.down_held = false;
                }
            }
            return;
        }

        if self.hang_ticks > 0 {
            self.hang_ticks -= 1;
            if self.hang_ticks == 0 {
                self.motion = Motion::Falling;
            }
            return;
        }

        let gravity = if self.fast_dropping {
            self.tuning.gravity() * FAST_DROP_GRAVITY_SCALE
        } else {
            self.tuning.gravity()
        };
        let next = self.velocity + gravity;

        // Apex: hold still instead of moving on the up-to-down sign change
        if self.velocity < 0.0 && next >= -VELOCITY_EPSILON && !self.fast_dropping {
            self.velocity = 0.0;
            self.hang_ticks = self.tuning.hang;
            self.motion = if self.hang_ticks > 0 {
                Motion::ApexHang
            } else {
                Motion::Falling
            };
            return;
        }

        self.y += self.velocity;
        self.velocity = next;
        self.motion = if self.velocity < 0.0 {
            Motion::Rising
        } else {
            Motion::Falling
        };

        if self.y >= self.ground {
            self.land();
        }
    }

    fn land(&mut self) {
        self.y = self.ground;
        self.velocity = 0.0;
        self.hang_ticks = 0;
        self.motion = Motion::Grounded;
        if self.fast_dropping {
            self.fast_dropping = false;
            if self.down_held {
                self.duck_ticks = self.tuning.duck_hold;
            }
        }
    }

    fn advance_animation(&mut self) {
        self.anim_counter += 1;
        if self.anim_counter >= self.tuning.anim_period {
            self.anim_counter = 0;
            self.anim_frame = (self.anim_frame + 1) % 2;
        }
    }

    /// Bottom row the sprite is drawn on.
    pub fn row(&self) -> i32 {
        self.y.round() as i32
    }

    pub fn sprite(&self) -> Sprite {
        if self.is_airborne() {
            PLAYER_JUMP
        } else if self.is_ducking() {
            PLAYER_DUCK[self.anim_frame % PLAYER_DUCK.len()]
        } else {
            PLAYER_RUN[self.anim_frame % PLAYER_RUN.len()]
        }
    }

    pub fn hitbox(&self) -> Hitbox {
        Hitbox::standing_on(self.x, self.row(), self.sprite())
    }
}
