//! Decorative scenery: drifting clouds and the ground strip.
//!
//! Nothing here takes part in collision. Clouds outlive restarts; the ground
//! reveals itself once at the start of the first run.

use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;

use crate::config::{
    CLOUD_BUFFER, CLOUD_MAX_COUNT, CLOUD_MAX_EXTRA_SPACE, CLOUD_MAX_ROW, CLOUD_MAX_SPEED,
    CLOUD_MIN_COUNT, CLOUD_MIN_EXTRA_SPACE, CLOUD_MIN_ROW, CLOUD_MIN_SPEED,
    CLOUD_RIGHT_EDGE_BUFFER, GROUND_EXTEND_SPEED, INITIAL_GROUND_LENGTH,
};
use crate::sprite::{CLOUDS, Sprite};

// ── Clouds ──────────────────────────────────────────────────────────────────

#[derive(Debug, Clone)]
pub struct Cloud {
    pub x: f64,
    pub row: i32,
    pub speed: f64,
    pub sprite: Sprite,
}

impl Cloud {
    pub fn column(&self) -> i32 {
        self.x as i32
    }
}

#[derive(Debug, Clone)]
pub struct CloudField {
    clouds: Vec<Cloud>,
    rng: Pcg32,
}

impl CloudField {
    /// Scatter a few clouds across a `width`-wide sky, keeping them apart.
    pub fn new(width: u16, seed: u64) -> Self {
        let mut rng = Pcg32::seed_from_u64(seed);
        let width = (width as i32).max(1);
        let count = rng.random_range(CLOUD_MIN_COUNT..=CLOUD_MAX_COUNT);
        let mut taken = vec![false; width as usize];
        let mut clouds = Vec::with_capacity(count);

        for _ in 0..count {
            let sprite = CLOUDS[rng.random_range(0..CLOUDS.len())];
            let cloud_w = sprite.width();

            let mut start = 0;
            for _ in 0..20 {
                start = rng.random_range(0..width);
                let half = (cloud_w + CLOUD_BUFFER) / 2;
                let clear = (start - half..start + half)
                    .filter(|&x| x >= 0 && x < width)
                    .all(|x| !taken[x as usize]);
                if clear {
                    break;
                }
            }
            for x in (start - cloud_w / 2..start + cloud_w / 2).filter(|&x| x >= 0 && x < width) {
                taken[x as usize] = true;
            }

            clouds.push(Cloud {
                x: start as f64,
                row: rng.random_range(CLOUD_MIN_ROW..=CLOUD_MAX_ROW),
                speed: rng.random_range(CLOUD_MIN_SPEED..CLOUD_MAX_SPEED),
                sprite,
            });
        }

        Self { clouds, rng }
    }

    pub fn iter(&self) -> impl Iterator<Item = &Cloud> {
        self.clouds.iter()
    }

    pub fn len(&self) -> usize {
        self.clouds.len()
    }

    /// Drift every cloud left, recycling any that left the screen.
    pub fn update(&mut self, width: u16) {
        for i in 0..self.clouds.len() {
            let cloud = &mut self.clouds[i];
            cloud.x -= cloud.speed;
            if cloud.column() + cloud.sprite.width() < -5 {
                self.clouds[i] = self.spawn_right(width);
            }
        }
    }

    fn spawn_right(&mut self, width: u16) -> Cloud {
        let width = width as i32;
        let crowded = self
            .clouds
            .iter()
            .any(|c| c.column() > width - CLOUD_RIGHT_EDGE_BUFFER);
        let extra = if crowded {
            self.rng.random_range(CLOUD_MIN_EXTRA_SPACE..=CLOUD_MAX_EXTRA_SPACE)
        } else {
            0
        };

        Cloud {
            x: (width + extra) as f64,
            row: self.rng.random_range(CLOUD_MIN_ROW..=CLOUD_MAX_ROW),
            speed: self.rng.random_range(CLOUD_MIN_SPEED..CLOUD_MAX_SPEED),
            sprite: CLOUDS[self.rng.random_range(0..CLOUDS.len())],
        }
    }
}

// ── Ground ──────────────────────────────────────────────────────────────────

const PEBBLES: [char; 4] = ['.', ',', '`', '-'];
const LINE_MARKS: [char; 4] = ['=', '~', '-', '^'];

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Decoration {
    pub x: f64,
    pub glyph: char,
}

/// The ground line, its reveal animation, and the glyphs scrolling on it.
#[derive(Debug, Clone)]
pub struct Ground {
    start: i32,
    end: i32,
    extending: bool,
    /// Pebbles under the ground line, wrapping around
    pebbles: Vec<Decoration>,
    /// Occasional marks on the ground line itself, dropped once passed
    marks: Vec<Decoration>,
    mark_countdown: u32,
    rng: Pcg32,
}

impl Ground {
    /// A short stretch of ground centred on `anchor`.
    pub fn new(anchor: i32, width: u16, seed: u64) -> Self {
        let mut rng = Pcg32::seed_from_u64(seed);
        let last = (width as i32 - 1).max(0);
        let half = INITIAL_GROUND_LENGTH / 2;

        let span = (width as f64 * 2.0).max(1.0);
        let pebbles = (0..(width as usize / 6).max(1))
            .map(|_| Decoration {
                x: rng.random_range(0.0..span),
                glyph: PEBBLES[rng.random_range(0..PEBBLES.len())],
            })
            .collect();
        let mark_countdown = rng.random_range(200..300);

        Self {
            start: (anchor - half).max(0),
            end: (anchor + half).min(last),
            extending: false,
            pebbles,
            marks: Vec::new(),
            mark_countdown,
            rng,
        }
    }

    /// Inclusive revealed column range.
    pub fn revealed(&self) -> (i32, i32) {
        (self.start, self.end)
    }

    pub fn is_revealed(&self, x: i32) -> bool {
        x >= self.start && x <= self.end
    }

    pub fn is_extending(&self) -> bool {
        self.extending
    }

    pub fn begin_reveal(&mut self) {
        self.extending = true;
    }

    /// Grow the revealed stretch outward until it spans the screen.
    pub fn extend(&mut self, width: u16) {
        if !self.extending {
            return;
        }
        let last = (width as i32 - 1).max(0);
        self.start = (self.start - GROUND_EXTEND_SPEED).max(0);
        self.end = (self.end + GROUND_EXTEND_SPEED).min(last);
        if self.start == 0 && self.end == last {
            self.extending = false;
        }
    }

    /// Keep the revealed range consistent with a new screen width.
    pub fn resize(&mut self, width: u16) {
        let last = (width as i32 - 1).max(0);
        let fully_revealed = self.start == 0 && !self.extending;
        self.end = if fully_revealed { last } else { self.end.min(last) };
        self.start = self.start.min(self.end);
    }

    pub fn pebbles(&self) -> impl Iterator<Item = &Decoration> {
        self.pebbles.iter()
    }

    pub fn marks(&self) -> impl Iterator<Item = &Decoration> {
        self.marks.iter()
    }

    /// Move all decorations left at the world scroll `speed`.
    pub fn scroll(&mut self, speed: f64, width: u16) {
        let span = (width as f64 * 2.0).max(1.0);
        for pebble in &mut self.pebbles {
            pebble.x -= speed;
            if pebble.x < -5.0 {
                pebble.x += span;
            }
        }

        for mark in &mut self.marks {
            mark.x -= speed;
        }
        self.marks.retain(|mark| mark.x >= -1.0);

        self.mark_countdown = self.mark_countdown.saturating_sub(1);
        if self.mark_countdown == 0 {
            self.mark_countdown = self.rng.random_range(200..300);
            self.marks.push(Decoration {
                x: width as f64,
                glyph: LINE_MARKS[self.rng.random_range(0..LINE_MARKS.len())],
            });
        }
    }
}
