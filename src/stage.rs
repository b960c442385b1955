//! Score-indexed difficulty table and the controller that eases between
//! stages.

use std::time::Duration;

use crate::config::STAGE_TRANSITION;
use crate::error::ConfigError;

/// One row of the difficulty table.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Stage {
    /// Lowest score at which this stage applies
    pub threshold: u64,
    /// Scroll speed in cells per tick
    pub speed: f64,
    /// Probability that a spawn is a cactus (otherwise a bird)
    pub cactus: f64,
    /// Share of cacti that are short; `1 - short - group` are single
    pub short_cactus: f64,
    /// Share of cacti that are groups
    pub group_cactus: f64,
    /// Share of birds that are big; the rest are small
    pub big_bird: f64,
    /// Spawn gap bounds in ticks, before width correction
    pub min_gap: f64,
    pub max_gap: f64,
}

#[rustfmt::skip]
pub const STAGES: [Stage; 6] = [
    Stage { threshold: 0,    speed: 1.0, cactus: 0.90, short_cactus: 0.30, group_cactus: 0.10, big_bird: 0.00, min_gap: 30.0, max_gap: 55.0 },
    Stage { threshold: 500,  speed: 1.2, cactus: 0.80, short_cactus: 0.30, group_cactus: 0.20, big_bird: 0.20, min_gap: 26.0, max_gap: 48.0 },
    Stage { threshold: 1200, speed: 1.4, cactus: 0.70, short_cactus: 0.25, group_cactus: 0.30, big_bird: 0.35, min_gap: 22.0, max_gap: 42.0 },
    Stage { threshold: 2000, speed: 1.6, cactus: 0.65, short_cactus: 0.20, group_cactus: 0.35, big_bird: 0.45, min_gap: 20.0, max_gap: 38.0 },
    Stage { threshold: 3000, speed: 1.8, cactus: 0.60, short_cactus: 0.20, group_cactus: 0.40, big_bird: 0.50, min_gap: 18.0, max_gap: 34.0 },
    Stage { threshold: 4500, speed: 2.0, cactus: 0.55, short_cactus: 0.15, group_cactus: 0.45, big_bird: 0.50, min_gap: 18.0, max_gap: 30.0 },
];

/// A validated, non-empty stage table.
#[derive(Debug, Clone)]
pub struct StageTable {
    stages: Vec<Stage>,
}

impl StageTable {
    pub fn new(stages: Vec<Stage>) -> Result<Self, ConfigError> {
        let first = stages.first().ok_or(ConfigError::EmptyTable)?;
        if first.threshold != 0 {
            return Err(ConfigError::FirstThreshold(first.threshold));
        }

        for (index, stage) in stages.iter().enumerate() {
            if index > 0 {
                let previous = stages[index - 1].threshold;
                if stage.threshold <= previous {
                    return Err(ConfigError::ThresholdOrder {
                        index,
                        threshold: stage.threshold,
                        previous,
                    });
                }
            }
            validate_stage(index, stage)?;
        }

        Ok(Self { stages })
    }

    /// The built-in table.
    pub fn builtin() -> Result<Self, ConfigError> {
        Self::new(STAGES.to_vec())
    }

    pub fn len(&self) -> usize {
        self.stages.len()
    }

    pub fn get(&self, index: usize) -> &Stage {
        &self.stages[index.min(self.stages.len() - 1)]
    }

    /// Highest-indexed stage whose threshold is at or below `score`.
    pub fn target_for(&self, score: u64) -> usize {
        self.stages
            .iter()
            .rposition(|stage| stage.threshold <= score)
            .unwrap_or(0)
    }
}

fn validate_stage(index: usize, stage: &Stage) -> Result<(), ConfigError> {
    let probabilities = [
        ("cactus", stage.cactus),
        ("short_cactus", stage.short_cactus),
        ("group_cactus", stage.group_cactus),
        ("big_bird", stage.big_bird),
    ];
    for (field, value) in probabilities {
        if !(0.0..=1.0).contains(&value) {
            return Err(ConfigError::Probability { index, field, value });
        }
    }

    let sum = stage.short_cactus + stage.group_cactus;
    if sum > 1.0 + 1e-9 {
        return Err(ConfigError::CactusRatios { index, sum });
    }

    if !(stage.speed > 0.0) {
        return Err(ConfigError::Speed {
            index,
            speed: stage.speed,
        });
    }

    if !(stage.min_gap > 0.0 && stage.min_gap <= stage.max_gap) {
        return Err(ConfigError::GapBounds {
            index,
            min: stage.min_gap,
            max: stage.max_gap,
        });
    }

    Ok(())
}

/// Difficulty parameters in effect for the current tick.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DifficultyState {
    pub speed: f64,
    pub cactus: f64,
    pub short_cactus: f64,
    pub group_cactus: f64,
    pub big_bird: f64,
    pub min_gap: f64,
    pub max_gap: f64,
}

impl From<&Stage> for DifficultyState {
    fn from(stage: &Stage) -> Self {
        Self {
            speed: stage.speed,
            cactus: stage.cactus,
            short_cactus: stage.short_cactus,
            group_cactus: stage.group_cactus,
            big_bird: stage.big_bird,
            min_gap: stage.min_gap,
            max_gap: stage.max_gap,
        }
    }
}

impl DifficultyState {
    /// Linear blend of every parameter; `t` is clamped to [0, 1].
    pub fn lerp(a: &Self, b: &Self, t: f64) -> Self {
        let t = t.clamp(0.0, 1.0);
        let mix = |x: f64, y: f64| x + (y - x) * t;
        Self {
            speed: mix(a.speed, b.speed),
            cactus: mix(a.cactus, b.cactus),
            short_cactus: mix(a.short_cactus, b.short_cactus),
            group_cactus: mix(a.group_cactus, b.group_cactus),
            big_bird: mix(a.big_bird, b.big_bird),
            min_gap: mix(a.min_gap, b.min_gap),
            max_gap: mix(a.max_gap, b.max_gap),
        }
    }
}

/// Tracks the active and target stages and eases between them.
#[derive(Debug, Clone)]
pub struct StageController {
    table: StageTable,
    active: usize,
    target: usize,
    transition_start: Option<Duration>,
    transition: Duration,
    difficulty: DifficultyState,
}

impl StageController {
    pub fn new(table: StageTable) -> Self {
        Self::with_transition(table, STAGE_TRANSITION)
    }

    pub fn with_transition(table: StageTable, transition: Duration) -> Self {
        let difficulty = DifficultyState::from(table.get(0));
        Self {
            table,
            active: 0,
            target: 0,
            transition_start: None,
            transition,
            difficulty,
        }
    }

    /// Back to the first stage, with no transition in flight.
    pub fn reset(&mut self) {
        self.active = 0;
        self.target = 0;
        self.transition_start = None;
        self.difficulty = DifficultyState::from(self.table.get(0));
    }

    pub fn active(&self) -> usize {
        self.active
    }

    pub fn target(&self) -> usize {
        self.target
    }

    pub fn is_transitioning(&self) -> bool {
        self.transition_start.is_some()
    }

    pub fn difficulty(&self) -> &DifficultyState {
        &self.difficulty
    }

    /// Recompute the difficulty for `score` at simulation time `now`.
    ///
    /// Returns the new target index when a stage-up transition begins.
    pub fn update(&mut self, score: u64, now: Duration) -> Option<usize> {
        let mut stage_up = None;

        let target = self.table.target_for(score);
        if target != self.target {
            self.target = target;
            self.transition_start = Some(now);
            if target > self.active {
                stage_up = Some(target);
            }
        }

        match self.transition_start {
            Some(start) if self.active != self.target => {
                let elapsed = now.saturating_sub(start);
                let frac = elapsed.as_secs_f64() / self.transition.as_secs_f64().max(f64::EPSILON);
                if frac >= 1.0 {
                    self.active = self.target;
                    self.transition_start = None;
                    self.difficulty = DifficultyState::from(self.table.get(self.active));
                } else {
                    let from = DifficultyState::from(self.table.get(self.active));
                    let to = DifficultyState::from(self.table.get(self.target));
                    self.difficulty = DifficultyState::lerp(&from, &to, frac);
                }
            }
            _ => {
                self.transition_start = None;
                self.difficulty = DifficultyState::from(self.table.get(self.active));
            }
        }

        stage_up
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn secs(s: f64) -> Duration {
        Duration::from_secs_f64(s)
    }

    #[test]
    fn test_builtin_table_is_valid() {
        let table = StageTable::builtin().unwrap();
        assert_eq!(table.len(), STAGES.len());
    }

    #[test]
    fn test_rejects_empty_table() {
        assert_eq!(StageTable::new(vec![]).unwrap_err(), ConfigError::EmptyTable);
    }

    #[test]
    fn test_rejects_nonzero_first_threshold() {
        let mut stages = STAGES.to_vec();
        stages[0].threshold = 10;
        assert_eq!(
            StageTable::new(stages).unwrap_err(),
            ConfigError::FirstThreshold(10)
        );
    }

    #[test]
    fn test_rejects_unordered_thresholds() {
        let mut stages = STAGES.to_vec();
        stages[2].threshold = stages[1].threshold;
        assert!(matches!(
            StageTable::new(stages),
            Err(ConfigError::ThresholdOrder { index: 2, .. })
        ));
    }

    #[test]
    fn test_rejects_bad_probabilities() {
        let mut stages = STAGES.to_vec();
        stages[1].big_bird = 1.5;
        assert!(matches!(
            StageTable::new(stages),
            Err(ConfigError::Probability {
                index: 1,
                field: "big_bird",
                ..
            })
        ));

        let mut stages = STAGES.to_vec();
        stages[3].short_cactus = 0.7;
        stages[3].group_cactus = 0.6;
        assert!(matches!(
            StageTable::new(stages),
            Err(ConfigError::CactusRatios { index: 3, .. })
        ));
    }

    #[test]
    fn test_rejects_bad_speed_and_gaps() {
        let mut stages = STAGES.to_vec();
        stages[0].speed = 0.0;
        assert!(matches!(
            StageTable::new(stages),
            Err(ConfigError::Speed { index: 0, .. })
        ));

        let mut stages = STAGES.to_vec();
        stages[4].min_gap = 40.0;
        stages[4].max_gap = 20.0;
        assert!(matches!(
            StageTable::new(stages),
            Err(ConfigError::GapBounds { index: 4, .. })
        ));
    }

    #[test]
    fn test_target_for_score() {
        let table = StageTable::builtin().unwrap();
        assert_eq!(table.target_for(0), 0);
        assert_eq!(table.target_for(499), 0);
        assert_eq!(table.target_for(500), 1);
        assert_eq!(table.target_for(1999), 2);
        assert_eq!(table.target_for(u64::MAX), STAGES.len() - 1);
    }

    #[test]
    fn test_target_is_monotonic_in_score() {
        let table = StageTable::builtin().unwrap();
        let mut last = 0;
        for score in (0..6000).step_by(7) {
            let target = table.target_for(score);
            assert!(target >= last);
            last = target;
        }
    }

    #[test]
    fn test_pinned_to_active_stage_without_transition() {
        let mut ctl = StageController::new(StageTable::builtin().unwrap());
        assert_eq!(ctl.update(100, secs(1.0)), None);
        assert_eq!(*ctl.difficulty(), DifficultyState::from(&STAGES[0]));
        assert!(!ctl.is_transitioning());
    }

    #[test]
    fn test_transition_interpolates_then_snaps() {
        let mut ctl = StageController::with_transition(StageTable::builtin().unwrap(), secs(2.0));

        assert_eq!(ctl.update(500, secs(10.0)), Some(1));
        assert_eq!(ctl.active(), 0);
        assert_eq!(ctl.target(), 1);
        assert!(ctl.is_transitioning());
        assert_eq!(ctl.difficulty().speed, STAGES[0].speed);

        // Halfway
        assert_eq!(ctl.update(520, secs(11.0)), None);
        let mid = ctl.difficulty();
        assert!((mid.speed - 1.1).abs() < 1e-9);
        assert!((mid.cactus - 0.85).abs() < 1e-9);
        assert!((mid.min_gap - 28.0).abs() < 1e-9);

        // Done: exactly the target values, no drift
        ctl.update(540, secs(12.0));
        assert_eq!(ctl.active(), 1);
        assert!(!ctl.is_transitioning());
        assert_eq!(*ctl.difficulty(), DifficultyState::from(&STAGES[1]));
    }

    #[test]
    fn test_stage_up_fires_once() {
        let mut ctl = StageController::new(StageTable::builtin().unwrap());
        assert_eq!(ctl.update(500, secs(1.0)), Some(1));
        for tick in 0..10 {
            assert_eq!(ctl.update(501 + tick, secs(1.1 + tick as f64 * 0.05)), None);
        }
    }

    #[test]
    fn test_skipping_a_stage_retargets() {
        let mut ctl = StageController::with_transition(StageTable::builtin().unwrap(), secs(2.0));
        ctl.update(500, secs(0.0));
        // Score jumps past stage 2 mid-transition
        assert_eq!(ctl.update(1200, secs(1.0)), Some(2));
        ctl.update(1201, secs(3.0));
        assert_eq!(ctl.active(), 2);
        assert_eq!(*ctl.difficulty(), DifficultyState::from(&STAGES[2]));
    }

    #[test]
    fn test_reset_returns_to_first_stage() {
        let mut ctl = StageController::with_transition(StageTable::builtin().unwrap(), secs(1.0));
        ctl.update(3000, secs(0.0));
        ctl.update(3000, secs(5.0));
        assert_eq!(ctl.active(), 4);
        ctl.reset();
        assert_eq!(ctl.active(), 0);
        assert_eq!(ctl.target(), 0);
        assert_eq!(*ctl.difficulty(), DifficultyState::from(&STAGES[0]));
    }

    #[test]
    fn test_active_parameters_match_table_after_every_transition() {
        let mut ctl = StageController::with_transition(StageTable::builtin().unwrap(), secs(2.0));
        let tick = 1.0 / 24.0;
        let mut now = 0.0;
        for score in 0..6000u64 {
            now += tick;
            ctl.update(score, secs(now));
            if !ctl.is_transitioning() {
                assert_eq!(*ctl.difficulty(), DifficultyState::from(&STAGES[ctl.active()]));
            }
        }
        assert_eq!(ctl.active(), STAGES.len() - 1);
    }
}
