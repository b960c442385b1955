//! The simulation aggregate. One [`Session::tick`] per frame.
//!
//! A session knows nothing about terminals, audio or files: it consumes
//! [`Action`]s, advances the world and reports what happened as
//! [`GameEvent`]s for the orchestrator to turn into side effects.

use std::time::Duration;

use crate::collision::first_hit;
use crate::config::{
    EARLY_SPAWN_CHANCE_PER_STAGE, GROUND_ROW, JumpTuning, PLAYER_X, SCORE_BLINK,
    SCORE_BLINK_INTERVAL, SCORE_MILESTONE, TICK, effective_width,
};
use crate::input::Action;
use crate::obstacle::ObstacleField;
use crate::player::Player;
use crate::scenery::{CloudField, Ground};
use crate::stage::{StageController, StageTable};

/// Something the outside world may want to react to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GameEvent {
    Jumped,
    Dropped,
    Collided,
    StageUp { stage: usize },
    Milestone { score: u64 },
}

pub struct Session {
    pub player: Player,
    pub obstacles: ObstacleField,
    pub stages: StageController,
    pub clouds: CloudField,
    pub ground: Ground,
    pub score: u64,
    pub high_score: u64,
    /// The score of the run that just ended beat the previous high score
    pub new_record: bool,
    pub started: bool,
    pub collided: bool,
    pub paused: bool,
    /// Simulation time since the current run began
    clock: Duration,
    blink_start: Option<Duration>,
    width: u16,
    events: Vec<GameEvent>,
}

impl Session {
    pub fn new(table: StageTable, tuning: JumpTuning, width: u16, seed: u64, high_score: u64) -> Self {
        Self {
            player: Player::new(PLAYER_X, GROUND_ROW, tuning),
            obstacles: ObstacleField::new(seed, tuning.anim_period),
            stages: StageController::new(table),
            clouds: CloudField::new(width, seed.wrapping_add(1)),
            ground: Ground::new(PLAYER_X + 3, width, seed.wrapping_add(2)),
            score: 0,
            high_score,
            new_record: false,
            started: false,
            collided: false,
            paused: false,
            clock: Duration::ZERO,
            blink_start: None,
            width,
            events: Vec::new(),
        }
    }

    pub fn width(&self) -> u16 {
        self.width
    }

    pub fn effective_width(&self) -> u16 {
        effective_width(self.width)
    }

    pub fn set_width(&mut self, width: u16) {
        self.width = width;
        self.ground.resize(width);
    }

    pub fn clock(&self) -> Duration {
        self.clock
    }

    pub fn is_running(&self) -> bool {
        self.started && !self.collided
    }

    pub fn is_blinking(&self) -> bool {
        self.blink_start
            .is_some_and(|start| self.clock.saturating_sub(start) < SCORE_BLINK)
    }

    /// Whether the score should be drawn this frame.
    pub fn score_visible(&self) -> bool {
        match self.blink_start {
            Some(start) if self.is_blinking() => {
                let elapsed = self.clock.saturating_sub(start).as_nanos();
                (elapsed / SCORE_BLINK_INTERVAL.as_nanos()) % 2 == 0
            }
            _ => true,
        }
    }

    pub fn drain_events(&mut self) -> std::vec::Drain<'_, GameEvent> {
        self.events.drain(..)
    }

    /// Apply one player command.
    pub fn apply(&mut self, action: Action) {
        if self.collided {
            return;
        }

        match action {
            Action::Jump => {
                self.player.down_held = false;
                if !self.started {
                    self.started = true;
                    self.ground.begin_reveal();
                    log::info!("run started");
                }
                if !self.paused && self.player.jump() {
                    self.events.push(GameEvent::Jumped);
                }
            }
            Action::Duck => {
                if !self.started || self.paused {
                    return;
                }
                self.player.down_held = true;
                if self.player.is_grounded() {
                    self.player.duck();
                } else if self.player.fast_drop() {
                    self.events.push(GameEvent::Dropped);
                }
            }
            Action::Pause => {
                if self.is_running() {
                    self.paused = !self.paused;
                }
            }
            Action::Mute => {
                // Muting mid-crouch keeps the dino down
                if self.player.is_ducking() {
                    self.player.duck();
                }
            }
            Action::Quit | Action::Restart | Action::Other => {
                self.player.down_held = false;
            }
        }
    }

    /// Advance the world by one tick.
    pub fn tick(&mut self) {
        self.clouds.update(self.width);

        if self.collided || (self.paused && self.started) {
            return;
        }

        self.player.tick();

        if !self.started {
            return;
        }

        self.clock += TICK;

        if let Some(stage) = self.stages.update(self.score, self.clock) {
            log::info!("stage {} reached at score {}", stage, self.score);
            self.blink_start = Some(self.clock);
            self.events.push(GameEvent::StageUp { stage });
        }

        let difficulty = *self.stages.difficulty();
        let early_chance = EARLY_SPAWN_CHANCE_PER_STAGE * self.stages.active() as f64;
        let spawn_x = self.effective_width();
        self.obstacles.update(&difficulty, spawn_x, early_chance);
        self.ground.scroll(difficulty.speed, self.width);

        let player = self.player.hitbox();
        let hit = first_hit(&player, self.obstacles.iter().map(|o| o.hitbox())).is_some();
        self.ground.extend(self.width);
        if hit {
            self.collide();
            return;
        }

        if !self.is_blinking() {
            self.score += 1;
            if self.score % SCORE_MILESTONE == 0 {
                self.events.push(GameEvent::Milestone { score: self.score });
            }
        }
    }

    fn collide(&mut self) {
        self.collided = true;
        self.paused = false;
        if self.score > self.high_score {
            self.high_score = self.score;
            self.new_record = true;
        }
        log::info!("collision at score {} (high score {})", self.score, self.high_score);
        self.events.push(GameEvent::Collided);
    }

    /// Start a new run. Clouds, ground and the high score carry over.
    pub fn reset(&mut self) {
        let tuning = *self.player.tuning();
        self.player = Player::new(PLAYER_X, GROUND_ROW, tuning);
        self.obstacles.clear();
        self.stages.reset();
        self.score = 0;
        self.new_record = false;
        self.collided = false;
        self.paused = false;
        self.clock = Duration::ZERO;
        self.blink_start = None;
        self.events.clear();
    }
}
