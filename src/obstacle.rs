//! Obstacles and the probability-table driven generator.

use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;

use crate::collision::Hitbox;
use crate::config::{
    DESPAWN_X, EARLY_SPAWN_THRESHOLD, GROUND_ROW, MAX_ACTIVE_OBSTACLES, MIN_SPAWN_GAP,
    REFERENCE_WIDTH,
};
use crate::sprite::{BIG_BIRD, CACTUS_GROUP, CACTUS_SHORT, CACTUS_SINGLE, SMALL_BIRD, Sprite};
use crate::stage::DifficultyState;

/// Every obstacle variant. Variants differ only in sprites and lane.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ObstacleKind {
    Single,
    Short,
    Group,
    SmallBird,
    BigBird,
}

impl ObstacleKind {
    pub const ALL: [ObstacleKind; 5] = [
        ObstacleKind::Single,
        ObstacleKind::Short,
        ObstacleKind::Group,
        ObstacleKind::SmallBird,
        ObstacleKind::BigBird,
    ];

    pub fn frames(self) -> &'static [Sprite] {
        match self {
            ObstacleKind::Single => &CACTUS_SINGLE,
            ObstacleKind::Short => &CACTUS_SHORT,
            ObstacleKind::Group => &CACTUS_GROUP,
            ObstacleKind::SmallBird => &SMALL_BIRD,
            ObstacleKind::BigBird => &BIG_BIRD,
        }
    }

    /// Rows between the ground row and the bottom of the sprite.
    ///
    /// Small birds skim the ground and must be jumped; big birds fly at head
    /// height and must be ducked.
    pub fn lift(self) -> i32 {
        match self {
            ObstacleKind::Single | ObstacleKind::Short | ObstacleKind::Group => 0,
            ObstacleKind::SmallBird => 1,
            ObstacleKind::BigBird => 2,
        }
    }

    pub fn is_bird(self) -> bool {
        matches!(self, ObstacleKind::SmallBird | ObstacleKind::BigBird)
    }
}

#[derive(Debug, Clone)]
pub struct Obstacle {
    pub kind: ObstacleKind,
    /// Left edge, continuous so that sub-cell speeds accumulate
    pub x: f64,
    pub anim_frame: usize,
    anim_counter: u32,
}

impl Obstacle {
    pub fn new(kind: ObstacleKind, x: f64) -> Self {
        Self {
            kind,
            x,
            anim_frame: 0,
            anim_counter: 0,
        }
    }

    /// Scroll left by `speed` cells and step the animation.
    pub fn advance(&mut self, speed: f64, anim_period: u32) {
        self.x -= speed;
        self.anim_counter += 1;
        if self.anim_counter >= anim_period {
            self.anim_counter = 0;
            self.anim_frame = (self.anim_frame + 1) % self.kind.frames().len();
        }
    }

    /// Bottom row of the sprite.
    pub fn row(&self) -> i32 {
        GROUND_ROW - self.kind.lift()
    }

    pub fn column(&self) -> i32 {
        self.x.round() as i32
    }

    pub fn sprite(&self) -> Sprite {
        let frames = self.kind.frames();
        frames[self.anim_frame % frames.len()]
    }

    pub fn hitbox(&self) -> Hitbox {
        Hitbox::standing_on(self.column(), self.row(), self.sprite())
    }

    pub fn is_gone(&self) -> bool {
        self.x < DESPAWN_X
    }
}

/// The set of active obstacles plus the spawn timer that feeds it.
#[derive(Debug, Clone)]
pub struct ObstacleField {
    obstacles: Vec<Obstacle>,
    spawn_timer: u32,
    anim_period: u32,
    rng: Pcg32,
}

impl ObstacleField {
    pub fn new(seed: u64, anim_period: u32) -> Self {
        Self {
            obstacles: Vec::new(),
            spawn_timer: 0,
            anim_period,
            rng: Pcg32::seed_from_u64(seed),
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = &Obstacle> {
        self.obstacles.iter()
    }

    pub fn len(&self) -> usize {
        self.obstacles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.obstacles.is_empty()
    }

    pub fn spawn_timer(&self) -> u32 {
        self.spawn_timer
    }

    #[cfg(test)]
    pub(crate) fn insert(&mut self, obstacle: Obstacle) {
        self.obstacles.push(obstacle);
    }

    /// Drop every obstacle and re-arm the timer. The RNG keeps its stream.
    pub fn clear(&mut self) {
        self.obstacles.clear();
        self.spawn_timer = 0;
    }

    /// Advance one tick: scroll, despawn, then spawn on timer or by chance.
    pub fn update(&mut self, difficulty: &DifficultyState, effective_width: u16, early_chance: f64) {
        for obstacle in &mut self.obstacles {
            obstacle.advance(difficulty.speed, self.anim_period);
        }

        let mut i = 0;
        while i < self.obstacles.len() {
            if self.obstacles[i].is_gone() {
                self.obstacles.swap_remove(i);
            } else {
                i += 1;
            }
        }

        self.spawn_timer = self.spawn_timer.saturating_sub(1);
        if self.obstacles.len() >= MAX_ACTIVE_OBSTACLES {
            return;
        }

        if self.spawn_timer == 0 || self.obstacles.is_empty() {
            self.spawn(difficulty, effective_width);
        } else if self.rightmost_x().is_some_and(|x| x < effective_width as f64 * EARLY_SPAWN_THRESHOLD)
            && self.rng.random::<f64>() < early_chance
        {
            self.spawn(difficulty, effective_width);
        }
    }

    fn rightmost_x(&self) -> Option<f64> {
        self.obstacles.iter().map(|o| o.x).reduce(f64::max)
    }

    fn spawn(&mut self, difficulty: &DifficultyState, effective_width: u16) {
        let kind = self.roll_kind(difficulty);
        self.obstacles.push(Obstacle::new(kind, effective_width as f64));
        self.spawn_timer = self.roll_gap(difficulty, effective_width);
    }

    /// Pick a variant: category first, then the sub-type within it.
    pub fn roll_kind(&mut self, difficulty: &DifficultyState) -> ObstacleKind {
        if self.rng.random::<f64>() < difficulty.cactus {
            let roll = self.rng.random::<f64>();
            if roll < difficulty.short_cactus {
                ObstacleKind::Short
            } else if roll < difficulty.short_cactus + difficulty.group_cactus {
                ObstacleKind::Group
            } else {
                ObstacleKind::Single
            }
        } else if self.rng.random::<f64>() < difficulty.big_bird {
            ObstacleKind::BigBird
        } else {
            ObstacleKind::SmallBird
        }
    }

    /// Uniform gap in `[min_gap, max_gap]` ticks, before width correction.
    pub fn roll_base_gap(&mut self, difficulty: &DifficultyState) -> f64 {
        if difficulty.max_gap <= difficulty.min_gap {
            return difficulty.min_gap;
        }
        self.rng.random_range(difficulty.min_gap..=difficulty.max_gap)
    }

    /// Ticks until the next spawn, scaled for the playfield width and floored
    /// so every gap stays dodgeable.
    pub fn roll_gap(&mut self, difficulty: &DifficultyState, effective_width: u16) -> u32 {
        let scaled = self.roll_base_gap(difficulty) * width_correction(effective_width);
        scaled.max(MIN_SPAWN_GAP as f64).round() as u32
    }
}

/// Gap multiplier that keeps perceived difficulty constant across widths.
pub fn width_correction(effective_width: u16) -> f64 {
    effective_width as f64 / REFERENCE_WIDTH
}
